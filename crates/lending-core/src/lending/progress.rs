//! Time-based amortization progress.
//!
//! Projects how much of a loan's total cost has notionally been paid as of a
//! given date, independent of whether the scheduled deductions actually
//! succeeded. Pure and idempotent: no I/O, no state, safe to call from any
//! number of threads.

use chrono::{Datelike, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::LendingError;
use crate::lending::calculation::{calculate_loan, LoanQuote, LoanTerms};
use crate::rounding::round_whole;
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::LendingResult;

// ---------------------------------------------------------------------------
// Output Types
// ---------------------------------------------------------------------------

/// Lifecycle of a loan as seen by the time-based projection. Servicing states
/// tied to actual payment events (late, defaulted) live upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoanStatus {
    Active,
    Completed,
}

/// Amortization progress as of a given date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanProgress {
    /// Installments elapsed since the start date, capped at the duration.
    pub months_paid: u32,
    /// months_paid * monthly_payment.
    pub paid_amount: Money,
    /// total_cost - paid_amount.
    pub remaining_payment: Money,
    /// Whole percentage points, capped at 100.
    pub progress_pct: u32,
    pub status: LoanStatus,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Project a loan's progress from its quote and start date.
///
/// A month counts once the start date's day-of-month comes round again; dates
/// before the start clamp to zero rather than going negative.
pub fn project_progress(
    quote: &LoanQuote,
    start_date: NaiveDate,
    as_of_date: NaiveDate,
) -> LendingResult<LoanProgress> {
    if quote.total_cost <= Decimal::ZERO {
        return Err(LendingError::DivisionByZero {
            context: "progress percentage over non-positive total cost".into(),
        });
    }

    let months_paid = whole_months_between(start_date, as_of_date).min(quote.duration_months);
    let paid_amount = Decimal::from(months_paid) * quote.monthly_payment;
    let remaining_payment = quote.total_cost - paid_amount;

    let pct = round_whole(paid_amount / quote.total_cost * dec!(100)).min(dec!(100));
    // Bounded to [0, 100] by the cap above, so the conversion cannot fail.
    let progress_pct = pct.to_u32().unwrap_or(0);

    let status = if months_paid >= quote.duration_months {
        LoanStatus::Completed
    } else {
        LoanStatus::Active
    };

    Ok(LoanProgress {
        months_paid,
        paid_amount,
        remaining_payment,
        progress_pct,
        status,
    })
}

/// Quote the terms and project their progress, wrapped in the standard
/// computation envelope. Convenience entry point for the CLI and bindings.
pub fn progress_report(
    terms: &LoanTerms,
    start_date: NaiveDate,
    as_of_date: NaiveDate,
) -> LendingResult<ComputationOutput<LoanProgress>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if as_of_date < start_date {
        warnings.push(format!(
            "As-of date {} precedes start date {}; projecting zero elapsed months",
            as_of_date, start_date
        ));
    }

    let quote = calculate_loan(terms)?;
    let progress = project_progress(&quote, start_date, as_of_date)?;

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Amortization progress — whole calendar months elapsed against total cost",
        &serde_json::json!({
            "start_date": start_date.to_string(),
            "as_of_date": as_of_date.to_string(),
            "monthly_payment": quote.monthly_payment.to_string(),
            "total_cost": quote.total_cost.to_string(),
        }),
        warnings,
        elapsed,
        progress,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Whole calendar months from `start` to `as_of`, floored at zero.
///
/// Anchored on the start day-of-month: Jan 15 to Jul 14 is five months, to
/// Jul 15 six. When a short month swallows the anchor day (start Jan 31,
/// as-of Feb 28) the month is credited only once it has fully rolled past.
fn whole_months_between(start: NaiveDate, as_of: NaiveDate) -> u32 {
    if as_of <= start {
        return 0;
    }

    let mut months =
        (as_of.year() - start.year()) * 12 + as_of.month() as i32 - start.month() as i32;
    if as_of.day() < start.day() {
        months -= 1;
    }
    months.max(0) as u32
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
