//! Shared styling utilities for the CLI.

use console::Style;

/// Create a success-styled string (green with checkmark).
pub fn success(msg: &str) -> String {
    let style = Style::new().green();
    format!("{} {}", style.apply_to("✓"), msg)
}

/// Create an error-styled string (red with cross).
pub fn error(msg: &str) -> String {
    let style = Style::new().red();
    format!("{} {}", style.apply_to("✗"), msg)
}

/// Create a warning-styled string (yellow).
pub fn warn(msg: &str) -> String {
    let style = Style::new().yellow();
    format!("{} {}", style.apply_to("⚠"), msg)
}

/// Create a header-styled string (bold, white).
pub fn header(msg: &str) -> String {
    let style = Style::new().bold();
    style.apply_to(msg).to_string()
}

/// Create a dim-styled string.
pub fn dim(msg: &str) -> String {
    let style = Style::new().dim();
    style.apply_to(msg).to_string()
}

/// Label for the HEAD side of a conflict (blue).
pub fn ours_label() -> String {
    let style = Style::new().blue().bold();
    style.apply_to("Ours (HEAD):").to_string()
}

/// Label for the incoming side of a conflict (magenta).
pub fn theirs_label() -> String {
    let style = Style::new().magenta().bold();
    style.apply_to("Theirs (incoming):").to_string()
}

/// Label for the proposed resolution (green).
pub fn suggestion_label() -> String {
    let style = Style::new().green().bold();
    style.apply_to("Suggested resolution:").to_string()
}
