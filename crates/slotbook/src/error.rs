//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text and a process exit code.

use miette::Diagnostic;
use thiserror::Error;

use slotbook_config::ConfigError;
use slotbook_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Unable to connect to the booking service")]
    #[diagnostic(
        code(slotbook::connection_failed),
        help(
            "{reason}\n\
             Check the endpoint URL and your network connection.\n\
             Retry with --fallback to send the booking as URL parameters."
        )
    )]
    ConnectionFailed { reason: String },

    #[error("Alternative method also failed")]
    #[diagnostic(
        code(slotbook::fallback_failed),
        help(
            "{reason}\n\
             The booking was not sent. Check your network connection and try again later."
        )
    )]
    FallbackFailed { reason: String },

    // ── Booking outcome ──────────────────────────────────────────────
    #[error("Booking failed: {message}")]
    #[diagnostic(
        code(slotbook::slot_conflict),
        help("Someone else booked this slot first. Run: slotbook slots --available")
    )]
    SlotConflict { message: String },

    #[error("Time slot {label} is already booked")]
    #[diagnostic(
        code(slotbook::slot_unavailable),
        help("Pick another slot. Run: slotbook slots --available")
    )]
    SlotUnavailable { label: String },

    #[error("No available time slots for {date}. Please select another date.")]
    #[diagnostic(code(slotbook::no_availability))]
    NoAvailability { date: String },

    #[error("Booking failed: {message}")]
    #[diagnostic(code(slotbook::rejected))]
    Rejected { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(slotbook::validation))]
    Validation { field: String, reason: String },

    #[error("Booking details are incomplete or invalid")]
    #[diagnostic(code(slotbook::invalid_booking), help("{details}"))]
    InvalidBooking { details: String },

    #[error("Please select a time slot.")]
    #[diagnostic(
        code(slotbook::no_slot),
        help("Pass --slot \"HH:MM - HH:MM\" or run without --no-input to pick one.")
    )]
    NoSlotSelected,

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(slotbook::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: slotbook config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No booking endpoint configured")]
    #[diagnostic(
        code(slotbook::no_config),
        help(
            "Create a profile with: slotbook config init\n\
             Or pass --endpoint / set SLOTBOOK_ENDPOINT.\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(slotbook::config))]
    Config { message: String },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Prompt failed: {reason}")]
    #[diagnostic(
        code(slotbook::prompt),
        help("Use --no-input and pass every value as a flag in non-interactive contexts.")
    )]
    Prompt { reason: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(slotbook::api_error))]
    Api { message: String },

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::FallbackFailed { .. } => exit_code::CONNECTION,
            Self::SlotConflict { .. } | Self::SlotUnavailable { .. } => exit_code::CONFLICT,
            Self::Validation { .. }
            | Self::InvalidBooking { .. }
            | Self::NoSlotSelected
            | Self::Prompt { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::PastDate { date, today } => CliError::Validation {
                field: "date".into(),
                reason: format!("{date} is in the past (today is {today})"),
            },

            CoreError::NoAvailability { date } => CliError::NoAvailability {
                date: date.to_string(),
            },

            CoreError::NoSlotSelected => CliError::NoSlotSelected,

            CoreError::UnknownSlot { label, date } => CliError::Validation {
                field: "slot".into(),
                reason: format!("'{label}' is not a time slot on {date}"),
            },

            CoreError::SlotUnavailable { label } => CliError::SlotUnavailable { label },

            CoreError::FieldValidation(report) => CliError::InvalidBooking {
                details: report.to_string(),
            },

            CoreError::SubmissionTransport {
                reason,
                fallback_available: false,
            } => CliError::FallbackFailed { reason },

            CoreError::AvailabilityFetch { reason, .. }
            | CoreError::SubmissionTransport { reason, .. } => {
                CliError::ConnectionFailed { reason }
            }

            CoreError::SubmissionServer {
                message,
                slot_conflict: true,
            } => CliError::SlotConflict { message },

            CoreError::SubmissionServer { message, .. } => CliError::Rejected { message },

            CoreError::Config { message } => CliError::Config { message },

            other @ (CoreError::InvalidTransition { .. }
            | CoreError::SlotsNotLoaded { .. }
            | CoreError::Api { .. }) => {
                CliError::Api {
                    message: other.to_string(),
                }
            }
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::ProfileNotFound { name, available } => CliError::ProfileNotFound {
                name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn booking_outcomes_map_to_exit_codes() {
        let conflict = CliError::from(CoreError::SubmissionServer {
            message: "Slot already booked".into(),
            slot_conflict: true,
        });
        assert_eq!(conflict.exit_code(), exit_code::CONFLICT);
        assert_eq!(conflict.to_string(), "Booking failed: Slot already booked");

        let transport = CliError::from(CoreError::SubmissionTransport {
            reason: "connection refused".into(),
            fallback_available: true,
        });
        assert_eq!(transport.exit_code(), exit_code::CONNECTION);

        let rejected = CliError::from(CoreError::SubmissionServer {
            message: "Unknown error".into(),
            slot_conflict: false,
        });
        assert_eq!(rejected.exit_code(), exit_code::GENERAL);
    }

    #[test]
    fn failed_fallback_does_not_suggest_fallback() {
        let primary = CliError::from(CoreError::SubmissionTransport {
            reason: "HTTP error 502".into(),
            fallback_available: true,
        });
        let fallback = CliError::from(CoreError::SubmissionTransport {
            reason: "HTTP error 503".into(),
            fallback_available: false,
        });

        assert!(matches!(fallback, CliError::FallbackFailed { .. }));
        assert_eq!(fallback.exit_code(), exit_code::CONNECTION);
        assert_eq!(fallback.to_string(), "Alternative method also failed");

        let help = |e: &CliError| e.help().map(|h| h.to_string()).unwrap_or_default();
        assert!(help(&primary).contains("--fallback"));
        assert!(!help(&fallback).contains("--fallback"));
        assert!(help(&fallback).contains("HTTP error 503"));
    }

    #[test]
    fn input_problems_are_usage_errors() {
        assert_eq!(
            CliError::from(CoreError::NoSlotSelected).exit_code(),
            exit_code::USAGE
        );

        let date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default();
        let past = CliError::from(CoreError::PastDate { date, today: date });
        assert_eq!(past.exit_code(), exit_code::USAGE);
    }

    #[test]
    fn missing_profile_lists_alternatives() {
        let err = CliError::from(ConfigError::ProfileNotFound {
            name: "work".into(),
            available: Vec::new(),
        });
        match err {
            CliError::ProfileNotFound { available, .. } => assert_eq!(available, "(none)"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
