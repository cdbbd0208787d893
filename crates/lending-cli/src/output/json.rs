use serde_json::Value;

/// Pretty-print the full payload as JSON: for quote and progress that is the
/// whole envelope (result, warnings, methodology, metadata), for schedules
/// the installment rows. The default `lend` output format.
pub fn print_json(payload: &Value) {
    match serde_json::to_string_pretty(payload) {
        Ok(rendered) => println!("{}", rendered),
        Err(e) => eprintln!("Could not render output as JSON: {}", e),
    }
}
