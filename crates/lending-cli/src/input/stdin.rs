use serde_json::Value;
use std::io::{self, Read};

/// Read piped JSON (loan terms, optionally with progress dates) from stdin.
///
/// Returns None when stdin is an interactive TTY or the pipe is empty, so
/// commands fall back to their individual flags.
pub fn read_stdin() -> Result<Option<Value>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut piped = String::new();
    io::stdin().read_to_string(&mut piped)?;

    let body = piped.trim();
    if body.is_empty() {
        return Ok(None);
    }

    let value: Value =
        serde_json::from_str(body).map_err(|e| format!("Piped input is not valid JSON: {e}"))?;
    Ok(Some(value))
}
