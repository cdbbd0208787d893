use chrono::NaiveDate;
use napi::Result as NapiResult;
use napi_derive::napi;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use lending_core::lending::calculation::{self, LoanTerms};
use lending_core::lending::{progress, schedule};
use lending_core::LendingError;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Parse an input payload, routing malformed JSON through the core error
/// taxonomy so Node callers see the same messages as native ones.
fn parse_input<T: DeserializeOwned>(input_json: &str) -> NapiResult<T> {
    serde_json::from_str(input_json).map_err(|e| to_napi_error(LendingError::from(e)))
}

// ---------------------------------------------------------------------------
// Quoting
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_loan(input_json: String) -> NapiResult<String> {
    let terms: LoanTerms = parse_input(&input_json)?;
    let output = calculation::quote_loan(&terms).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn amortization_schedule(input_json: String) -> NapiResult<String> {
    let terms: LoanTerms = parse_input(&input_json)?;
    let output = schedule::schedule_report(&terms).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Terms plus the projection window, as sent by the backend.
#[derive(Deserialize)]
struct ProgressInput {
    #[serde(flatten)]
    terms: LoanTerms,
    start_date: NaiveDate,
    as_of_date: NaiveDate,
}

#[napi]
pub fn loan_progress(input_json: String) -> NapiResult<String> {
    let input: ProgressInput = parse_input(&input_json)?;
    let output = progress::progress_report(&input.terms, input.start_date, input.as_of_date)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
