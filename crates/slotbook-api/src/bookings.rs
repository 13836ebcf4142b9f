// Booking endpoint operations
//
// Availability reads and the two submission transports. The endpoint keys
// every operation off the single base URL.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::client::{BookingClient, StatusPolicy};
use crate::error::Error;
use crate::models::{BookingPayload, BookingsResponse, SubmissionResponse};

/// Query string of the fallback transport: every payload field followed by
/// `action=submit`.
#[derive(Serialize)]
struct FallbackQuery<'a> {
    #[serde(flatten)]
    payload: &'a BookingPayload,
    action: &'static str,
}

impl BookingClient {
    /// Fetch the labels of every slot already booked on `date`.
    ///
    /// `GET {base}?action=getBookings&date=YYYY-MM-DD`
    ///
    /// Any non-2xx status, undecodable body, or `success: false` is an
    /// error; the caller decides how to degrade.
    pub async fn get_bookings(&self, date: NaiveDate) -> Result<Vec<String>, Error> {
        let date = date.format("%Y-%m-%d").to_string();
        debug!(%date, "fetching booked slots");

        let resp: BookingsResponse = self
            .get(
                &[("action", "getBookings"), ("date", date.as_str())],
                StatusPolicy::Strict,
            )
            .await?;

        if !resp.success {
            return Err(Error::Remote {
                message: resp
                    .error
                    .unwrap_or_else(|| "Failed to load booked slots".into()),
            });
        }

        Ok(resp.booked_slots.unwrap_or_default())
    }

    /// Submit a booking as a JSON body.
    ///
    /// `POST {base}` with `Content-Type: application/json`
    ///
    /// Returns the decoded payload even when `success` is `false`; only a
    /// transport failure or an undecodable response is an `Err`.
    pub async fn submit(&self, payload: &BookingPayload) -> Result<SubmissionResponse, Error> {
        debug!(date = %payload.date, slot = %payload.time_slot, "submitting booking");
        self.post(payload, StatusPolicy::PayloadFirst).await
    }

    /// Submit a booking with every field encoded as query parameters.
    ///
    /// `GET {base}?name=..&..&timestamp=..&action=submit`
    ///
    /// A degraded alternative to [`submit`](Self::submit): the booking
    /// details travel in the URL, so this is only ever used on explicit
    /// user request.
    pub async fn submit_via_query(
        &self,
        payload: &BookingPayload,
    ) -> Result<SubmissionResponse, Error> {
        debug!(date = %payload.date, slot = %payload.time_slot, "submitting booking via query");
        let query = FallbackQuery {
            payload,
            action: "submit",
        };
        self.get(&query, StatusPolicy::PayloadFirst).await
    }
}
