//! Slot listing handler.

use serde::Serialize;
use tabled::Tabled;

use slotbook_core::{BookingFlow, SlotListing, TimeSlot};

use crate::cli::{GlobalOpts, SlotsArgs};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Views ───────────────────────────────────────────────────────────

/// Serialized form of one slot for json/yaml output.
#[derive(Debug, Serialize)]
pub struct SlotEntry {
    pub date: String,
    pub label: String,
    pub start: String,
    pub end: String,
    pub available: bool,
}

impl SlotEntry {
    fn new(listing: &SlotListing, slot: &TimeSlot) -> Self {
        Self {
            date: listing.date.to_string(),
            label: slot.label.clone(),
            start: slot.start.to_string(),
            end: slot.end.to_string(),
            available: slot.is_available(),
        }
    }
}

#[derive(Tabled)]
struct SlotRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Status")]
    status: &'static str,
}

fn status_label(available: bool) -> &'static str {
    if available { "available" } else { "booked" }
}

/// Print the listing's warning (if any) and the no-availability notice.
pub fn print_notices(listing: &SlotListing, global: &GlobalOpts) {
    let color = output::should_color(&global.color);
    if let Some(ref warning) = listing.warning {
        output::print_status(&output::warning(warning, color), global.quiet);
    }
    if listing.has_no_availability() {
        output::print_status(
            &output::warning(
                &format!(
                    "No available time slots for {}. Please select another date.",
                    listing.date
                ),
                color,
            ),
            global.quiet,
        );
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(flow: &BookingFlow, args: SlotsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let date = util::date_or_today(args.date.as_deref())?;

    let pb = util::spinner(&format!("Checking availability for {date}…"), global);
    let listing = flow.select_date(date).await;
    pb.finish_and_clear();
    let listing = listing?;

    print_notices(&listing, global);

    let entries: Vec<SlotEntry> = listing
        .slots
        .iter()
        .filter(|s| !args.available || s.is_available())
        .map(|s| SlotEntry::new(&listing, s))
        .collect();

    let out = output::render_list(
        &global.output,
        &entries,
        |e| SlotRow {
            time: e.label.clone(),
            status: status_label(e.available),
        },
        |e| e.label.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
