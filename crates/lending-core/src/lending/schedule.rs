//! Per-installment amortization schedule.
//!
//! Expands a quote into one row per month: interest accrued on the open
//! balance, the principal share of the level payment, and the insurance
//! fraction. The final row repays the remaining balance exactly, absorbing
//! the cents the level payment over- or under-collects along the way.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::lending::calculation::{calculate_loan, LoanQuote, LoanTerms};
use crate::rounding::round_to_cents;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::LendingResult;

// ---------------------------------------------------------------------------
// Output Types
// ---------------------------------------------------------------------------

/// A single monthly installment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installment {
    /// 1-based month number.
    pub period: u32,
    pub beginning_balance: Money,
    /// Interest accrued on the beginning balance for the month.
    pub interest: Money,
    /// Principal repaid this month.
    pub principal: Money,
    /// Insurance fraction collected this month.
    pub insurance: Money,
    /// Amount due: the level payment, except the adjusted final row.
    pub payment: Money,
    pub ending_balance: Money,
}

/// Full month-by-month breakdown of a loan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub quote: LoanQuote,
    pub installments: Vec<Installment>,
    /// quote.total_cost minus the sum of row payments. The level payment
    /// carries up to half a cent of rounding per month; the adjusted final
    /// row returns most of it and this field holds what is left.
    pub rounding_residue: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Build the full installment schedule for the given terms.
///
/// Reconciles with [`calculate_loan`]: same level payment, principals summing
/// exactly to the amount, insurance rows summing exactly to the insurance
/// cost, and a zero ending balance on the last row.
pub fn amortization_schedule(terms: &LoanTerms) -> LendingResult<AmortizationSchedule> {
    let quote = calculate_loan(terms)?;

    let months = quote.duration_months;
    // From the raw terms, not the quote's 2dp echo, so interest rows accrue
    // at the same rate the payment was computed with.
    let monthly_rate: Rate = terms.annual_rate_pct / dec!(100) / dec!(12);

    // Equal cents per month, with the last row taking the remainder.
    let insurance_row = round_to_cents(quote.insurance_cost / Decimal::from(months));
    let insurance_final =
        quote.insurance_cost - insurance_row * Decimal::from(months - 1);

    let mut installments: Vec<Installment> = Vec::with_capacity(months as usize);
    let mut balance = quote.amount;
    let mut payments_total = Decimal::ZERO;

    for period in 1..=months {
        let beginning_balance = balance;
        let interest = round_to_cents(beginning_balance * monthly_rate);

        let row = if period < months {
            let payment = quote.monthly_payment;
            let principal = payment - interest - insurance_row;
            Installment {
                period,
                beginning_balance,
                interest,
                principal,
                insurance: insurance_row,
                payment,
                ending_balance: beginning_balance - principal,
            }
        } else {
            // Close out whatever is still open, whatever the level payment says.
            let principal = beginning_balance;
            Installment {
                period,
                beginning_balance,
                interest,
                principal,
                insurance: insurance_final,
                payment: round_to_cents(principal + interest + insurance_final),
                ending_balance: Decimal::ZERO,
            }
        };

        payments_total += row.payment;
        balance = row.ending_balance;
        installments.push(row);
    }

    let rounding_residue = quote.total_cost - payments_total;

    Ok(AmortizationSchedule {
        quote,
        installments,
        rounding_residue,
    })
}

/// Schedule wrapped in the standard computation envelope.
pub fn schedule_report(
    terms: &LoanTerms,
) -> LendingResult<ComputationOutput<AmortizationSchedule>> {
    let start = Instant::now();
    let schedule = amortization_schedule(terms)?;

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Amortization schedule — level annuity payment, final row closes the balance",
        &serde_json::json!({
            "amount": schedule.quote.amount.to_string(),
            "duration_months": schedule.quote.duration_months,
            "monthly_payment": schedule.quote.monthly_payment.to_string(),
            "rounding_residue": schedule.rounding_residue.to_string(),
        }),
        Vec::new(),
        elapsed,
        schedule,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
