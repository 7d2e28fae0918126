//! Output formatting for human and JSON modes

use serde::Serialize;

/// Output format selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Trait for formatting CLI output
pub trait OutputFormatter {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
    fn warn(&self, message: &str);
    fn info(&self, message: &str);
    /// One entry of a list, e.g. a planned action
    fn item(&self, marker: &str, message: &str);
    fn print_json(&self, value: &serde_json::Value);
}

/// Human-readable output with check, cross and warning marks
pub struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn success(&self, message: &str) {
        println!("\u{2713} {message}");
    }
    fn error(&self, message: &str) {
        eprintln!("\u{2717} Error: {message}");
    }
    fn warn(&self, message: &str) {
        eprintln!("\u{26a0} Warning: {message}");
    }
    fn info(&self, message: &str) {
        println!("  {message}");
    }
    fn item(&self, marker: &str, message: &str) {
        println!("  {marker} {message}");
    }
    fn print_json(&self, _value: &serde_json::Value) {}
}

/// JSON output: structured documents on stdout, messages on stderr
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn success(&self, _message: &str) {}
    fn error(&self, message: &str) {
        eprintln!("{}", serde_json::json!({"success": false, "error": message}));
    }
    fn warn(&self, message: &str) {
        eprintln!("{}", serde_json::json!({"level": "warning", "message": message}));
    }
    fn info(&self, _message: &str) {}
    fn item(&self, _marker: &str, _message: &str) {}
    fn print_json(&self, value: &serde_json::Value) {
        println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
    }
}

pub fn get_formatter(json: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter)
    } else {
        Box::new(HumanFormatter)
    }
}

/// Serializes `value` and prints it through the formatter
pub fn print_serialized<T: Serialize>(
    formatter: &dyn OutputFormatter,
    value: &T,
) -> anyhow::Result<()> {
    let json = serde_json::to_value(value)?;
    formatter.print_json(&json);
    Ok(())
}

/// `"1 reminder"`, `"2 reminders"`
pub fn plural(count: impl Into<u64>, word: &str) -> String {
    let count = count.into();
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}

pub fn format_duration(ms: u64) -> String {
    if ms >= 1000 {
        format!("{:.1}s", ms as f64 / 1000.0)
    } else {
        format!("{ms}ms")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plural() {
        assert_eq!(plural(1u32, "error"), "1 error");
        assert_eq!(plural(0u32, "error"), "0 errors");
        assert_eq!(plural(3u64, "task"), "3 tasks");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(250), "250ms");
        assert_eq!(format_duration(1500), "1.5s");
    }
}
