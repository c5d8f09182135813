//! Output formatting: table, JSON, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! JSON uses serde, plain emits whitespace-separated values for scripts.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}

/// Outcome word, green for a write and yellow for a skip.
pub fn status(word: &str, wrote: bool, color: bool) -> String {
    match (color, wrote) {
        (false, _) => word.to_owned(),
        (true, true) => word.green().bold().to_string(),
        (true, false) => word.yellow().to_string(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render one serde-serializable item in the chosen format.
///
/// - `table`: `table_fn` builds the human view
/// - `json`: pretty-printed serde output of the item itself
/// - `plain`: `plain_fn` builds a script-friendly line
pub fn render<T>(
    format: OutputFormat,
    data: &T,
    table_fn: impl FnOnce(&T) -> String,
    plain_fn: impl FnOnce(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize + ?Sized,
{
    Ok(match format {
        OutputFormat::Table => table_fn(data),
        OutputFormat::Json => serde_json::to_string_pretty(data)?,
        OutputFormat::Plain => plain_fn(data),
    })
}

/// Print the rendered output to stdout.
pub fn print_output(output: &str) {
    if output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Table builders ───────────────────────────────────────────────────

/// Two-column key/value table for single-item detail views.
pub fn detail(pairs: &[(&str, String)]) -> String {
    let mut builder = Builder::default();
    for (key, value) in pairs {
        builder.push_record([(*key).to_owned(), value.clone()]);
    }
    builder.build().with(Style::rounded()).to_string()
}

/// Table with a header row and any number of columns.
pub fn grid(header: Vec<String>, rows: Vec<Vec<String>>) -> String {
    let mut builder = Builder::default();
    builder.push_record(header);
    for row in rows {
        builder.push_record(row);
    }
    builder.build().with(Style::rounded()).to_string()
}

// ── Value formatting ─────────────────────────────────────────────────

/// Unix seconds as RFC 3339, or the raw number if out of range.
pub fn timestamp(secs: i64) -> String {
    chrono::DateTime::from_timestamp(secs, 0)
        .map_or_else(|| secs.to_string(), |t| t.to_rfc3339())
}

/// A stored value, `U` when unknown.
pub fn value(v: Option<f64>) -> String {
    v.map_or_else(|| "U".to_owned(), |v| format!("{v:.2}"))
}
