// ── Booking domain types ──

use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use strum::Display;

use slotbook_api::BookingPayload;

const REFERENCE_PREFIX: &str = "REF-";
const REFERENCE_LEN: usize = 8;
const REFERENCE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// A fully validated booking, ready to send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub date: NaiveDate,
    pub time_slot: String,
    pub test_type: String,
    pub timestamp: DateTime<Utc>,
}

impl BookingRequest {
    /// Weekday name of the booked date, e.g. "Monday".
    pub fn day_name(&self) -> String {
        day_name(self.date)
    }
}

impl From<&BookingRequest> for BookingPayload {
    fn from(req: &BookingRequest) -> Self {
        Self {
            name: req.name.clone(),
            address: req.address.clone(),
            phone: req.phone.clone(),
            date: req.date,
            day: req.day_name(),
            time_slot: req.time_slot.clone(),
            test_type: req.test_type.clone(),
            timestamp: req.timestamp,
        }
    }
}

/// Full English weekday name for a date.
pub fn day_name(date: NaiveDate) -> String {
    date.format("%A").to_string()
}

// ── Confirmation ────────────────────────────────────────────────────

/// Who issued the booking identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum IdSource {
    /// Returned by the endpoint.
    Server,
    /// Synthesized locally because the endpoint returned none.
    Reference,
}

/// Result of a successful submission round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingConfirmation {
    pub booking_id: String,
    pub id_source: IdSource,
    pub request: BookingRequest,
}

impl BookingConfirmation {
    /// Use the server id when present and non-blank, else a fresh reference.
    pub fn new(server_id: Option<String>, request: BookingRequest) -> Self {
        match server_id.filter(|id| !id.trim().is_empty()) {
            Some(booking_id) => Self {
                booking_id,
                id_source: IdSource::Server,
                request,
            },
            None => Self {
                booking_id: generate_reference_id(),
                id_source: IdSource::Reference,
                request,
            },
        }
    }

    /// Long-form date for display, e.g. "Monday, March 4, 2030".
    pub fn formatted_date(&self) -> String {
        self.request.date.format("%A, %B %-d, %Y").to_string()
    }
}

/// `REF-` followed by eight random characters from `A-Z0-9`.
pub fn generate_reference_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..REFERENCE_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..REFERENCE_CHARSET.len());
            char::from(REFERENCE_CHARSET[idx])
        })
        .collect();
    format!("{REFERENCE_PREFIX}{suffix}")
}
