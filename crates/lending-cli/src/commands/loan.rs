use chrono::{Local, NaiveDate};
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use lending_core::lending::calculation::{self, LoanTerms};
use lending_core::lending::progress;
use lending_core::lending::schedule;

use crate::input;

/// Loan terms from flags, a JSON file, or piped stdin.
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct QuoteArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Borrowed amount
    #[arg(long)]
    pub amount: Option<Decimal>,

    /// Number of monthly installments
    #[arg(long)]
    pub duration_months: Option<u32>,

    /// Nominal annual rate in percentage points (3.5 = 3.5%)
    #[arg(long, alias = "rate")]
    pub annual_rate: Option<Decimal>,

    /// Flat insurance rate as a percentage of principal (default 0)
    #[arg(long, alias = "insurance")]
    pub insurance_rate: Option<Decimal>,
}

/// Arguments for progress projection
#[derive(Args)]
pub struct ProgressArgs {
    #[command(flatten)]
    pub terms: QuoteArgs,

    /// First installment date (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: String,

    /// Projection date (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    pub as_of: Option<String>,
}

/// Arguments for the installment schedule
#[derive(Args)]
pub struct ScheduleArgs {
    #[command(flatten)]
    pub terms: QuoteArgs,
}

pub fn run_quote(args: QuoteArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let terms = resolve_terms(&args)?;
    let result = calculation::quote_loan(&terms)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_progress(args: ProgressArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let terms = resolve_terms(&args.terms)?;
    let start_date = parse_date("start date", &args.start_date)?;
    let as_of = match args.as_of {
        Some(ref raw) => parse_date("as-of date", raw)?,
        None => Local::now().date_naive(),
    };

    let result = progress::progress_report(&terms, start_date, as_of)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let terms = resolve_terms(&args.terms)?;
    let schedule = schedule::amortization_schedule(&terms)?;
    // Rows as a top-level array so table/csv render one line per installment.
    Ok(serde_json::to_value(schedule.installments)?)
}

fn resolve_terms(args: &QuoteArgs) -> Result<LoanTerms, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        return Ok(input::file::read_json(path)?);
    }
    if let Some(data) = input::stdin::read_stdin()? {
        return Ok(serde_json::from_value(data)?);
    }

    Ok(LoanTerms {
        amount: args
            .amount
            .ok_or("--amount is required (or provide --input)")?,
        duration_months: args
            .duration_months
            .ok_or("--duration-months is required (or provide --input)")?,
        annual_rate_pct: args
            .annual_rate
            .ok_or("--annual-rate is required (or provide --input)")?,
        insurance_rate_pct: args.insurance_rate.unwrap_or(Decimal::ZERO),
    })
}

fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| format!("Invalid {field} '{raw}': {e} (expected YYYY-MM-DD)").into())
}
