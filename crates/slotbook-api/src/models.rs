// Booking endpoint wire types
//
// The endpoint is a spreadsheet script that answers every call with a flat
// JSON object carrying a `success` flag. Optional fields use
// `#[serde(default)]` because the script omits them freely, and sometimes
// sends `null` where a list is expected.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ── Availability ─────────────────────────────────────────────────────

/// Response to `GET {base}?action=getBookings&date=YYYY-MM-DD`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingsResponse {
    pub success: bool,
    #[serde(default)]
    pub booked_slots: Option<Vec<String>>,
    #[serde(default)]
    pub error: Option<String>,
}

// ── Submission ───────────────────────────────────────────────────────

/// A booking as sent to the endpoint, either as a JSON body or as query
/// parameters on the fallback transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingPayload {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub date: NaiveDate,
    /// Weekday name of `date` (e.g. "Monday").
    pub day: String,
    /// Slot label, e.g. `"09:20 - 10:00"`.
    pub time_slot: String,
    pub test_type: String,
    pub timestamp: DateTime<Utc>,
}

/// Response to a submission on either transport.
///
/// Success is signalled by the `success` flag only; the HTTP status is not
/// authoritative.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResponse {
    pub success: bool,
    #[serde(default)]
    pub booking_id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl SubmissionResponse {
    /// The server's explanation for a rejected booking: `error`, then
    /// `message`, then a generic fallback.
    pub fn failure_message(&self) -> String {
        self.error
            .as_deref()
            .or(self.message.as_deref())
            .filter(|m| !m.is_empty())
            .unwrap_or("Unknown error")
            .to_owned()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn payload_uses_camel_case_wire_names() {
        let payload = BookingPayload {
            name: "Ada".into(),
            address: "1 Loop Rd".into(),
            phone: "5551234567".into(),
            date: NaiveDate::from_ymd_opt(2030, 3, 4).unwrap(),
            day: "Monday".into(),
            time_slot: "09:20 - 10:00".into(),
            test_type: "B".into(),
            timestamp: DateTime::parse_from_rfc3339("2030-03-01T12:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        };

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["timeSlot"], "09:20 - 10:00");
        assert_eq!(value["testType"], "B");
        assert_eq!(value["date"], "2030-03-04");
        assert_eq!(value["day"], "Monday");
        assert!(value["timestamp"].as_str().unwrap().starts_with("2030-03-01T12:00:00"));
    }

    #[test]
    fn bookings_response_tolerates_null_slots() {
        let resp: BookingsResponse =
            serde_json::from_str(r#"{"success": true, "bookedSlots": null}"#).unwrap();
        assert!(resp.success);
        assert!(resp.booked_slots.is_none());
    }

    #[test]
    fn failure_message_prefers_error_then_message() {
        let resp = SubmissionResponse {
            error: Some("Slot already booked".into()),
            message: Some("ignored".into()),
            ..SubmissionResponse::default()
        };
        assert_eq!(resp.failure_message(), "Slot already booked");

        let resp = SubmissionResponse {
            message: Some("Sheet locked".into()),
            ..SubmissionResponse::default()
        };
        assert_eq!(resp.failure_message(), "Sheet locked");

        assert_eq!(SubmissionResponse::default().failure_message(), "Unknown error");
    }
}
