//! Fixed-rate loan quoting.
//!
//! Standard annuity formula with a flat insurance premium recovered from the
//! borrower in equal monthly fractions. All math uses `rust_decimal::Decimal`;
//! monetary values are rounded to cents at each checkpoint, never accumulating
//! unrounded fractional cents across steps.

use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::LendingError;
use crate::rounding::{round_percent, round_to_cents};
use crate::types::{with_metadata, ComputationOutput, Money, Percent, Rate};
use crate::LendingResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Published underwriting ranges. The hard contract is enforced upstream by
/// the origination layer; the engine only emits warnings when terms fall
/// outside them (see [`quote_loan`]).
pub const MIN_AMOUNT: Decimal = dec!(100);
pub const MIN_DURATION_MONTHS: u32 = 3;
pub const MAX_DURATION_MONTHS: u32 = 372;
pub const MIN_ANNUAL_RATE_PCT: Decimal = dec!(0.1);
pub const MAX_ANNUAL_RATE_PCT: Decimal = dec!(20);
pub const MAX_INSURANCE_RATE_PCT: Decimal = dec!(7);

const HUNDRED: Decimal = dec!(100);
const MONTHS_PER_YEAR: Decimal = dec!(12);
/// Payment rounding can shave at most half a cent per installment off the
/// exact total, so totals may dip this far below the unrounded sum.
const HALF_CENT: Decimal = dec!(0.005);

// ---------------------------------------------------------------------------
// Input / Output Types
// ---------------------------------------------------------------------------

/// Terms requested by the borrower. Never mutated by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Borrowed amount in currency units.
    pub amount: Money,
    /// Number of monthly installments.
    pub duration_months: u32,
    /// Nominal annual rate in percentage points (3.5 = 3.5%).
    pub annual_rate_pct: Percent,
    /// Flat insurance rate as a percentage of principal.
    pub insurance_rate_pct: Percent,
}

/// Summary of a fixed-rate amortizing loan. A stateless projection of the
/// terms, recomputed on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanQuote {
    /// Principal rounded to cents; basis for every other figure.
    pub amount: Money,
    pub duration_months: u32,
    /// Echo of the requested rate, rounded to two decimal places.
    pub annual_rate_pct: Percent,
    pub insurance_rate_pct: Percent,
    /// Credit installment plus amortized insurance, due each month.
    pub monthly_payment: Money,
    /// monthly_payment * duration_months, rounded to cents.
    pub total_cost: Money,
    /// total_cost - amount - insurance_cost.
    pub total_interest: Money,
    /// Flat insurance amount recovered over the term.
    pub insurance_cost: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute the amortization summary for the given terms.
///
/// The monthly rate is `annual_rate / 12` with no day-count or compounding
/// convention, matching conventional consumer-loan quoting. A zero rate takes
/// the linear limit of the annuity formula instead of dividing by zero.
pub fn calculate_loan(terms: &LoanTerms) -> LendingResult<LoanQuote> {
    validate_terms(terms)?;

    let principal = round_to_cents(terms.amount);
    let monthly_rate: Rate = terms.annual_rate_pct / HUNDRED / MONTHS_PER_YEAR;
    let duration = Decimal::from(terms.duration_months);

    let insurance_cost = round_to_cents(principal * terms.insurance_rate_pct / HUNDRED);
    // Kept unrounded: folded into the payment once, rounded there.
    let monthly_insurance = insurance_cost / duration;

    let base_payment = annuity_payment(principal, monthly_rate, terms.duration_months)?;

    let monthly_payment = round_to_cents(base_payment + monthly_insurance);
    let total_cost = round_to_cents(monthly_payment * duration);
    let total_interest = round_to_cents(total_cost - principal - insurance_cost);

    let quote = LoanQuote {
        amount: principal,
        duration_months: terms.duration_months,
        annual_rate_pct: round_percent(terms.annual_rate_pct),
        insurance_rate_pct: round_percent(terms.insurance_rate_pct),
        monthly_payment,
        total_cost,
        total_interest,
        insurance_cost,
    };

    check_quote(&quote)?;
    Ok(quote)
}

/// Quote a loan wrapped in the standard computation envelope, with warnings
/// for terms outside the published underwriting ranges.
pub fn quote_loan(terms: &LoanTerms) -> LendingResult<ComputationOutput<LoanQuote>> {
    let start = Instant::now();
    let warnings = underwriting_warnings(terms);

    let quote = calculate_loan(terms)?;

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fixed-rate annuity quote — flat insurance amortized monthly",
        &serde_json::json!({
            "amount": quote.amount.to_string(),
            "duration_months": quote.duration_months,
            "annual_rate_pct": quote.annual_rate_pct.to_string(),
            "insurance_rate_pct": quote.insurance_rate_pct.to_string(),
            "monthly_rate_convention": "annual_rate / 12, no day-count adjustment",
        }),
        warnings,
        elapsed,
        quote,
    ))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_terms(terms: &LoanTerms) -> LendingResult<()> {
    if terms.amount <= Decimal::ZERO {
        return Err(LendingError::InvalidInput {
            field: "amount".into(),
            reason: "Amount must be positive".into(),
        });
    }
    if terms.duration_months == 0 {
        return Err(LendingError::InvalidInput {
            field: "duration_months".into(),
            reason: "Duration must be at least 1 month".into(),
        });
    }
    if terms.annual_rate_pct < Decimal::ZERO {
        return Err(LendingError::InvalidInput {
            field: "annual_rate_pct".into(),
            reason: "Annual rate cannot be negative".into(),
        });
    }
    if terms.insurance_rate_pct < Decimal::ZERO {
        return Err(LendingError::InvalidInput {
            field: "insurance_rate_pct".into(),
            reason: "Insurance rate cannot be negative".into(),
        });
    }
    Ok(())
}

fn underwriting_warnings(terms: &LoanTerms) -> Vec<String> {
    let mut warnings = Vec::new();
    if terms.amount < MIN_AMOUNT {
        warnings.push(format!(
            "Amount {} is below the underwriting minimum of {}",
            terms.amount, MIN_AMOUNT
        ));
    }
    if terms.duration_months < MIN_DURATION_MONTHS || terms.duration_months > MAX_DURATION_MONTHS {
        warnings.push(format!(
            "Duration {} months is outside the underwriting range {}-{}",
            terms.duration_months, MIN_DURATION_MONTHS, MAX_DURATION_MONTHS
        ));
    }
    if terms.annual_rate_pct < MIN_ANNUAL_RATE_PCT || terms.annual_rate_pct > MAX_ANNUAL_RATE_PCT {
        warnings.push(format!(
            "Annual rate {}% is outside the underwriting range {}%-{}%",
            terms.annual_rate_pct, MIN_ANNUAL_RATE_PCT, MAX_ANNUAL_RATE_PCT
        ));
    }
    if terms.insurance_rate_pct > MAX_INSURANCE_RATE_PCT {
        warnings.push(format!(
            "Insurance rate {}% exceeds the underwriting maximum of {}%",
            terms.insurance_rate_pct, MAX_INSURANCE_RATE_PCT
        ));
    }
    warnings
}

/// Reject quotes with nonsensical monetary fields instead of returning them.
fn check_quote(quote: &LoanQuote) -> LendingResult<()> {
    if quote.monthly_payment <= Decimal::ZERO || quote.total_cost <= Decimal::ZERO {
        return Err(LendingError::FinancialImpossibility(format!(
            "Non-positive payment computed: monthly {} / total {}",
            quote.monthly_payment, quote.total_cost
        )));
    }
    // At a zero rate the rounded total can land up to half a cent per
    // installment below the principal; anything beyond that is a defect.
    let rounding_allowance = Decimal::from(quote.duration_months) * HALF_CENT;
    if quote.total_interest < -rounding_allowance {
        return Err(LendingError::FinancialImpossibility(format!(
            "Negative total interest computed: {}",
            quote.total_interest
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Credit-only monthly payment from the standard annuity formula:
/// `principal * r * f / (f - 1)` with `f = (1 + r)^n`. A zero rate is the
/// linear limit `principal / n`.
fn annuity_payment(principal: Money, monthly_rate: Rate, months: u32) -> LendingResult<Money> {
    if monthly_rate.is_zero() {
        return Ok(principal / Decimal::from(months));
    }

    let one_plus_r = Decimal::ONE + monthly_rate;
    let factor = one_plus_r.powd(Decimal::from(months));
    let denominator = factor - Decimal::ONE;
    if denominator.is_zero() {
        return Err(LendingError::DivisionByZero {
            context: "annuity factor".into(),
        });
    }

    Ok(principal * monthly_rate * factor / denominator)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    /// Helper: the reference quote used across the suite.
    fn standard_terms() -> LoanTerms {
        LoanTerms {
            amount: dec!(12000),
            duration_months: 12,
            annual_rate_pct: dec!(3.5),
            insurance_rate_pct: dec!(0.5),
        }
    }

    // -----------------------------------------------------------------------
    // 1. Regression fixture locked by the reference formula
    // -----------------------------------------------------------------------
    #[test]
    fn test_reference_quote() {
        let quote = calculate_loan(&standard_terms()).unwrap();

        assert_eq!(quote.amount, dec!(12000.00));
        assert_eq!(quote.duration_months, 12);
        assert_eq!(quote.annual_rate_pct, dec!(3.50));
        assert_eq!(quote.insurance_rate_pct, dec!(0.50));
        assert_eq!(quote.insurance_cost, dec!(60.00));
        assert_eq!(quote.monthly_payment, dec!(1024.06));
        assert_eq!(quote.total_cost, dec!(12288.72));
        assert_eq!(quote.total_interest, dec!(228.72));
    }

    // -----------------------------------------------------------------------
    // 2. Principal is rounded to cents before anything else
    // -----------------------------------------------------------------------
    #[test]
    fn test_principal_rounded_first() {
        let mut terms = standard_terms();
        terms.amount = dec!(12000.004);

        let quote = calculate_loan(&terms).unwrap();
        assert_eq!(quote.amount, dec!(12000.00));
        // Same basis, same outputs as the reference quote.
        assert_eq!(quote.monthly_payment, dec!(1024.06));
        assert_eq!(quote.total_cost, dec!(12288.72));
    }

    // -----------------------------------------------------------------------
    // 3. Insurance-free quote isolates the annuity payment
    // -----------------------------------------------------------------------
    #[test]
    fn test_quote_without_insurance() {
        let mut terms = standard_terms();
        terms.insurance_rate_pct = Decimal::ZERO;

        let quote = calculate_loan(&terms).unwrap();
        assert_eq!(quote.insurance_cost, dec!(0.00));
        assert_eq!(quote.monthly_payment, dec!(1019.06));
        assert_eq!(quote.total_cost, dec!(12228.72));
        assert_eq!(quote.total_interest, dec!(228.72));
    }

    // -----------------------------------------------------------------------
    // 4. Long-tenor fixture
    // -----------------------------------------------------------------------
    #[test]
    fn test_long_tenor_quote() {
        let terms = LoanTerms {
            amount: dec!(100000),
            duration_months: 240,
            annual_rate_pct: dec!(4.2),
            insurance_rate_pct: dec!(0.36),
        };

        let quote = calculate_loan(&terms).unwrap();
        assert_eq!(quote.insurance_cost, dec!(360.00));
        assert_eq!(quote.monthly_payment, dec!(618.07));
        assert_eq!(quote.total_cost, dec!(148336.80));
        assert_eq!(quote.total_interest, dec!(47976.80));
    }

    // -----------------------------------------------------------------------
    // 5. Reconciliation: total cost is the rounded payment times duration
    // -----------------------------------------------------------------------
    #[test]
    fn test_total_cost_reconciles_with_payment() {
        let fixtures = [
            (dec!(12000), 12, dec!(3.5), dec!(0.5)),
            (dec!(100000), 240, dec!(4.2), dec!(0.36)),
            (dec!(250000), 300, dec!(3.1), dec!(0.34)),
            (dec!(750.50), 6, dec!(12), dec!(0)),
        ];

        for (amount, duration_months, rate, insurance) in fixtures {
            let quote = calculate_loan(&LoanTerms {
                amount,
                duration_months,
                annual_rate_pct: rate,
                insurance_rate_pct: insurance,
            })
            .unwrap();

            let replayed =
                round_to_cents(quote.monthly_payment * Decimal::from(quote.duration_months));
            assert_eq!(quote.total_cost, replayed);
        }
    }

    // -----------------------------------------------------------------------
    // 6. Accounting identity: total = amount + interest + insurance (±0.01)
    // -----------------------------------------------------------------------
    #[test]
    fn test_accounting_identity() {
        let quote = calculate_loan(&standard_terms()).unwrap();
        let recomposed = quote.amount + quote.total_interest + quote.insurance_cost;
        assert!(
            (quote.total_cost - recomposed).abs() <= dec!(0.01),
            "total {} should recompose from {} + {} + {}",
            quote.total_cost,
            quote.amount,
            quote.total_interest,
            quote.insurance_cost
        );
    }

    // -----------------------------------------------------------------------
    // 7. Monotonicity in the rate
    // -----------------------------------------------------------------------
    #[test]
    fn test_interest_increases_with_rate() {
        let base = calculate_loan(&standard_terms()).unwrap();

        let mut dearer = standard_terms();
        dearer.annual_rate_pct = dec!(4.5);
        let dearer = calculate_loan(&dearer).unwrap();

        assert!(dearer.total_interest > base.total_interest);
        assert_eq!(dearer.total_interest, dec!(294.48));
    }

    // -----------------------------------------------------------------------
    // 8. Monotonicity in the amount
    // -----------------------------------------------------------------------
    #[test]
    fn test_payment_increases_with_amount() {
        let base = calculate_loan(&standard_terms()).unwrap();

        let mut larger = standard_terms();
        larger.amount = dec!(15000);
        let larger = calculate_loan(&larger).unwrap();

        assert!(larger.monthly_payment > base.monthly_payment);
        assert!(larger.total_cost > base.total_cost);
        assert_eq!(larger.monthly_payment, dec!(1280.07));
    }

    // -----------------------------------------------------------------------
    // 9. Zero rate: linear division instead of the annuity singularity
    // -----------------------------------------------------------------------
    #[test]
    fn test_zero_rate_linear_division() {
        let terms = LoanTerms {
            amount: dec!(5000),
            duration_months: 24,
            annual_rate_pct: Decimal::ZERO,
            insurance_rate_pct: Decimal::ZERO,
        };

        let quote = calculate_loan(&terms).unwrap();
        assert_eq!(quote.monthly_payment, dec!(208.33));
        assert_eq!(quote.total_cost, dec!(4999.92));
        // Rounding the payment down by a third of a cent per installment
        // leaves the total a few cents short of the principal.
        assert_eq!(quote.total_interest, dec!(-0.08));
    }

    // -----------------------------------------------------------------------
    // 10. Zero rate with insurance still carries the premium
    // -----------------------------------------------------------------------
    #[test]
    fn test_zero_rate_with_insurance() {
        let terms = LoanTerms {
            amount: dec!(5000),
            duration_months: 24,
            annual_rate_pct: Decimal::ZERO,
            insurance_rate_pct: dec!(1.2),
        };

        let quote = calculate_loan(&terms).unwrap();
        assert_eq!(quote.insurance_cost, dec!(60.00));
        assert_eq!(quote.monthly_payment, dec!(210.83));
        assert_eq!(quote.total_cost, dec!(5059.92));
    }

    // -----------------------------------------------------------------------
    // 11. Positivity over a grid of valid terms
    // -----------------------------------------------------------------------
    #[test]
    fn test_positive_outputs_for_valid_terms() {
        for amount in [dec!(100), dec!(4999.99), dec!(320000)] {
            for duration_months in [3u32, 48, 372] {
                for rate in [dec!(0.1), dec!(5.25), dec!(20)] {
                    let quote = calculate_loan(&LoanTerms {
                        amount,
                        duration_months,
                        annual_rate_pct: rate,
                        insurance_rate_pct: dec!(0.4),
                    })
                    .unwrap();

                    assert!(quote.monthly_payment > Decimal::ZERO);
                    assert!(quote.total_cost > Decimal::ZERO);
                    assert!(quote.total_interest > Decimal::ZERO);
                    assert!(quote.insurance_cost >= Decimal::ZERO);
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // 12. Validation: impossible inputs are rejected, not computed
    // -----------------------------------------------------------------------
    #[test]
    fn test_validation_rejects_impossible_terms() {
        let cases = [
            (dec!(0), 12u32, dec!(3.5), dec!(0.5), "amount"),
            (dec!(-500), 12, dec!(3.5), dec!(0.5), "amount"),
            (dec!(12000), 0, dec!(3.5), dec!(0.5), "duration_months"),
            (dec!(12000), 12, dec!(-1), dec!(0.5), "annual_rate_pct"),
            (dec!(12000), 12, dec!(3.5), dec!(-0.1), "insurance_rate_pct"),
        ];

        for (amount, duration_months, rate, insurance, expected_field) in cases {
            let err = calculate_loan(&LoanTerms {
                amount,
                duration_months,
                annual_rate_pct: rate,
                insurance_rate_pct: insurance,
            })
            .unwrap_err();

            match err {
                LendingError::InvalidInput { field, .. } => assert_eq!(field, expected_field),
                other => panic!("Expected InvalidInput, got {:?}", other),
            }
        }
    }

    // -----------------------------------------------------------------------
    // 13. Underwriting-range warnings on the envelope
    // -----------------------------------------------------------------------
    #[test]
    fn test_out_of_range_terms_warn() {
        let output = quote_loan(&LoanTerms {
            amount: dec!(50),
            duration_months: 2,
            annual_rate_pct: dec!(25),
            insurance_rate_pct: dec!(8),
        })
        .unwrap();

        assert_eq!(output.warnings.len(), 4);
        assert!(output.warnings[0].contains("underwriting minimum"));
        assert!(output.warnings[1].contains("3-372"));
    }

    #[test]
    fn test_in_range_terms_do_not_warn() {
        let output = quote_loan(&standard_terms()).unwrap();
        assert!(output.warnings.is_empty());
    }

    // -----------------------------------------------------------------------
    // 14. Envelope metadata populated
    // -----------------------------------------------------------------------
    #[test]
    fn test_envelope_metadata() {
        let output = quote_loan(&standard_terms()).unwrap();

        assert!(output.methodology.contains("annuity"));
        assert_eq!(output.metadata.precision, "rust_decimal_128bit");
        assert_eq!(output.result.monthly_payment, dec!(1024.06));
    }
}
