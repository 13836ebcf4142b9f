//! Shared helpers for command handlers.

use std::time::Duration;

use chrono::{Days, NaiveDate};
use indicatif::{ProgressBar, ProgressStyle};

use slotbook_core::local_today;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;

/// Parse a `--date` value: `YYYY-MM-DD`, `today` or `tomorrow`.
pub fn parse_date(raw: &str) -> Result<NaiveDate, CliError> {
    let raw = raw.trim();
    match raw.to_ascii_lowercase().as_str() {
        "today" => return Ok(local_today()),
        "tomorrow" => {
            return local_today()
                .checked_add_days(Days::new(1))
                .ok_or_else(|| CliError::Validation {
                    field: "date".into(),
                    reason: "date out of range".into(),
                });
        }
        _ => {}
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| CliError::Validation {
        field: "date".into(),
        reason: format!("expected YYYY-MM-DD, 'today' or 'tomorrow', got '{raw}'"),
    })
}

/// Resolve an optional `--date` value, defaulting to today.
pub fn date_or_today(raw: Option<&str>) -> Result<NaiveDate, CliError> {
    raw.map_or_else(|| Ok(local_today()), parse_date)
}

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Prompt {
        reason: e.to_string(),
    }
}

/// Ask a yes/no question. `--yes` answers yes, `--no-input` answers
/// `unattended` without prompting.
pub fn confirm(
    message: &str,
    default: bool,
    global: &GlobalOpts,
    unattended: bool,
) -> Result<bool, CliError> {
    if global.yes {
        return Ok(true);
    }
    if global.no_input {
        return Ok(unattended);
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(default)
        .interact()
        .map_err(prompt_err)
}

/// Spinner on stderr for table output; hidden for machine-readable or
/// quiet runs so stdout stays clean.
pub fn spinner(message: &str, global: &GlobalOpts) -> ProgressBar {
    if global.quiet || !matches!(global.output, OutputFormat::Table) {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_owned());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_and_relative_dates() {
        assert_eq!(
            parse_date("2030-03-04").ok(),
            NaiveDate::from_ymd_opt(2030, 3, 4)
        );
        assert_eq!(parse_date("Today").ok(), Some(local_today()));
        assert_eq!(
            parse_date("tomorrow").ok(),
            local_today().checked_add_days(Days::new(1))
        );
    }

    #[test]
    fn rejects_other_formats() {
        for raw in ["04/03/2030", "2030-13-01", "next week", ""] {
            assert!(
                matches!(parse_date(raw), Err(CliError::Validation { .. })),
                "accepted {raw:?}"
            );
        }
    }
}
