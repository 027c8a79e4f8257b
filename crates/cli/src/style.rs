//! Console styling for report lines printed to stdout.

use console::Style;

/// Prefix `msg` with a green check mark, e.g. a file with no markers left.
pub fn success(msg: &str) -> String {
    format!("{} {}", Style::new().green().apply_to("✓"), msg)
}

/// Prefix `msg` with a yellow warning sign, e.g. an unterminated conflict.
pub fn warn(msg: &str) -> String {
    format!("{} {}", Style::new().yellow().apply_to("⚠"), msg)
}

/// Bold title line above a table.
pub fn header(msg: &str) -> String {
    Style::new().bold().apply_to(msg).to_string()
}

/// De-emphasised path label shown before each file's report.
pub fn dim(msg: &str) -> String {
    Style::new().dim().apply_to(msg).to_string()
}
