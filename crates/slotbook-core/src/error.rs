// ── Core error types ──
//
// User-facing errors from slotbook-core. The submission and availability
// paths translate `slotbook_api::Error` into the booking-specific variants
// themselves; the blanket `From` impl covers everything else.

use chrono::NaiveDate;
use thiserror::Error;

use crate::validate::ValidationReport;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Date & slot selection ────────────────────────────────────────
    #[error("Cannot book {date}: dates before {today} are not bookable")]
    PastDate { date: NaiveDate, today: NaiveDate },

    #[error("No available time slots for {date}. Please select another date.")]
    NoAvailability { date: NaiveDate },

    #[error("Please select a time slot.")]
    NoSlotSelected,

    #[error("'{label}' is not a time slot on {date}")]
    UnknownSlot { label: String, date: NaiveDate },

    #[error("Time slot {label} is already booked")]
    SlotUnavailable { label: String },

    /// No listing for the active date has arrived yet, so availability of
    /// a slot cannot be checked.
    #[error("Time slots for {date} have not been loaded yet")]
    SlotsNotLoaded { date: NaiveDate },

    // ── Form ─────────────────────────────────────────────────────────
    #[error("Invalid booking details: {0}")]
    FieldValidation(ValidationReport),

    // ── Remote endpoint ──────────────────────────────────────────────
    /// Availability could not be verified. Callers degrade to "nothing
    /// booked" rather than surfacing this as fatal.
    #[error("Could not check availability for {date}: {reason}")]
    AvailabilityFetch { date: NaiveDate, reason: String },

    /// The booking could not be delivered. The fallback transport may be
    /// offered when `fallback_available` is set.
    #[error("Unable to connect to the booking service: {reason}")]
    SubmissionTransport {
        reason: String,
        fallback_available: bool,
    },

    /// The endpoint rejected the booking. `message` is the server's text,
    /// unchanged.
    #[error("Booking failed: {message}")]
    SubmissionServer { message: String, slot_conflict: bool },

    // ── State machine ────────────────────────────────────────────────
    #[error("Cannot {action} while {phase}")]
    InvalidTransition { action: &'static str, phase: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },
}

impl CoreError {
    /// Whether the user may retry the same booking over the fallback
    /// transport.
    pub fn offers_fallback(&self) -> bool {
        matches!(
            self,
            Self::SubmissionTransport {
                fallback_available: true,
                ..
            }
        )
    }

    /// Whether the failure means the chosen slot was taken by someone else.
    pub fn is_slot_conflict(&self) -> bool {
        matches!(
            self,
            Self::SubmissionServer {
                slot_conflict: true,
                ..
            } | Self::SlotUnavailable { .. }
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<slotbook_api::Error> for CoreError {
    fn from(err: slotbook_api::Error) -> Self {
        match err {
            slotbook_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid endpoint URL: {e}"),
            },
            slotbook_api::Error::Tls(message) => CoreError::Config {
                message: format!("TLS setup failed: {message}"),
            },
            other => CoreError::Api {
                status: other.status(),
                message: other.to_string(),
            },
        }
    }
}
