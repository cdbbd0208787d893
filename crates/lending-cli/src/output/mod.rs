pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Route a quote or progress envelope, or a schedule row array, to the
/// formatter selected with `--output`.
pub fn format_output(format: &OutputFormat, payload: &Value) {
    match format {
        OutputFormat::Json => json::print_json(payload),
        OutputFormat::Table => table::print_table(payload),
        OutputFormat::Csv => csv_out::print_csv(payload),
        OutputFormat::Minimal => minimal::print_minimal(payload),
    }
}
