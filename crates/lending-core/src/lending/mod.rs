//! Retail lending calculations: fixed-rate annuity quoting, per-installment
//! amortization schedules, and time-based progress projection.

pub mod calculation;
pub mod progress;
pub mod schedule;
