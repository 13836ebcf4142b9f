//! Booking logic between `slotbook-api` and view layers (the CLI today).
//!
//! This crate owns the domain model and every rule a booking has to pass
//! before it reaches the endpoint:
//!
//! - **[`BookingFlow`]**: the session (active date, selected slot) and the
//!   submission state machine. Slot listings and phases are published on
//!   `tokio::sync::watch` channels so a view can render from them without
//!   keeping its own copy of the selection.
//!
//! - **[`slots`]**: pure slot generation. A [`SlotSchedule`] is tiled into
//!   fixed-length [`TimeSlot`]s identified by their `"HH:MM - HH:MM"` label.
//!
//! - **[`availability`]**: reads booked labels and degrades to "all
//!   available" with a warning when the endpoint cannot be reached.
//!
//! - **[`Validator`] / [`FormState`]**: required fields, phone digit count,
//!   and the inline error behaviour of a form (validate on blur, revalidate
//!   on input once a field is invalid).

pub mod availability;
pub mod config;
pub mod error;
pub mod flow;
pub mod form;
pub mod model;
pub mod slots;
pub mod validate;

// ── Primary re-exports ──────────────────────────────────────────────
pub use availability::UNVERIFIED_WARNING;
pub use config::BookingConfig;
pub use error::CoreError;
pub use flow::{
    BookingFlow, SessionState, SubmissionFailure, SubmissionPhase, Transport, local_today,
};
pub use form::FormState;
pub use validate::{Field, FormFields, ValidationReport, Validator, normalize_phone};

pub use model::{
    BookingConfirmation, BookingRequest, IdSource, SlotListing, SlotSchedule, SlotTime, TimeSlot,
    day_name,
};
