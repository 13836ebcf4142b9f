//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line.
//! Status lines on stderr are colored with `owo-colors` when enabled.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::{ColorMode, OutputFormat};

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stderr().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Success line, e.g. "✓ Booking confirmed".
pub fn success(message: &str, color: bool) -> String {
    if color {
        format!("{} {}", "✓".green().bold(), message.bold())
    } else {
        format!("✓ {message}")
    }
}

/// Warning line for degraded-but-usable states.
pub fn warning(message: &str, color: bool) -> String {
    if color {
        format!("{} {}", "!".yellow().bold(), message.yellow())
    } else {
        format!("! {message}")
    }
}

/// Print a status line to stderr, respecting quiet mode.
pub fn print_status(line: &str, quiet: bool) {
    if !quiet {
        eprintln!("{line}");
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable items in the chosen format.
///
/// - `table`: builds rows with `to_row` and renders them with `tabled`
/// - `json` / `json-compact` / `yaml`: serializes the original data
/// - `plain`: calls `id_fn` on each item to emit one identifier per line
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            render_table(&rows)
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => data.iter().map(&id_fn).collect::<Vec<_>>().join("\n"),
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses `detail_fn`, which returns a pre-formatted string.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => detail_fn(data),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => id_fn(data),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> String {
    let rendered = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    rendered.expect("serialization should not fail")
}

fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_yaml::to_string(data).expect("serialization should not fail")
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use super::*;

    #[derive(Serialize)]
    struct Item {
        label: &'static str,
    }

    #[derive(Tabled)]
    struct Row {
        #[tabled(rename = "Time")]
        label: &'static str,
    }

    fn items() -> Vec<Item> {
        vec![Item { label: "08:00 - 08:40" }, Item { label: "08:40 - 09:20" }]
    }

    #[test]
    fn plain_emits_one_id_per_line() {
        let out = render_list(
            &OutputFormat::Plain,
            &items(),
            |i| Row { label: i.label },
            |i| i.label.to_owned(),
        );
        assert_eq!(out, "08:00 - 08:40\n08:40 - 09:20");
    }

    #[test]
    fn table_and_compact_json() {
        let table = render_list(
            &OutputFormat::Table,
            &items(),
            |i| Row { label: i.label },
            |i| i.label.to_owned(),
        );
        assert!(table.contains("Time"));
        assert!(table.contains("08:40 - 09:20"));

        let json = render_list(
            &OutputFormat::JsonCompact,
            &items(),
            |i| Row { label: i.label },
            |i| i.label.to_owned(),
        );
        assert_eq!(json, r#"[{"label":"08:00 - 08:40"},{"label":"08:40 - 09:20"}]"#);
    }

    #[test]
    fn status_lines_without_color() {
        assert_eq!(success("Booking confirmed", false), "✓ Booking confirmed");
        assert_eq!(warning("careful", false), "! careful");
    }
}
