// ── Availability ──
//
// Reads the booked labels for a date and turns them into a slot listing.
// A failed read never blocks the user: the listing falls back to "nothing
// booked" and carries a warning instead.

use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::{debug, warn};

use slotbook_api::BookingClient;

use crate::error::CoreError;
use crate::model::{SlotListing, SlotSchedule};
use crate::slots;

/// Shown when availability could not be verified.
pub const UNVERIFIED_WARNING: &str = "Could not check availability. All slots shown as available.";

/// Fetch the set of booked slot labels for `date`.
pub async fn fetch_booked(
    client: &BookingClient,
    date: NaiveDate,
) -> Result<HashSet<String>, CoreError> {
    match client.get_bookings(date).await {
        Ok(labels) => {
            debug!(%date, booked = labels.len(), "availability loaded");
            Ok(labels.into_iter().collect())
        }
        Err(e) => Err(CoreError::AvailabilityFetch {
            date,
            reason: e.to_string(),
        }),
    }
}

/// Fetch availability and generate the day's slots, degrading on failure.
pub async fn load_slots(
    client: &BookingClient,
    date: NaiveDate,
    schedule: &SlotSchedule,
) -> SlotListing {
    match fetch_booked(client, date).await {
        Ok(booked) => build_listing(date, &booked, schedule, None),
        Err(e) => {
            warn!(error = %e, "showing all slots as available");
            build_listing(
                date,
                &HashSet::new(),
                schedule,
                Some(UNVERIFIED_WARNING.into()),
            )
        }
    }
}

/// Generate a listing from an already-known booked set.
pub fn build_listing(
    date: NaiveDate,
    booked: &HashSet<String>,
    schedule: &SlotSchedule,
    warning: Option<String>,
) -> SlotListing {
    let slots = match slots::generate(date, booked, schedule) {
        Ok(slots) => slots,
        Err(e) => {
            debug!(%date, reason = %e, "no bookable slots");
            Vec::new()
        }
    };

    SlotListing {
        date,
        slots,
        warning,
    }
}
