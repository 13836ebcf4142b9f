// ── Time slot domain types ──
//
// A day is cut into fixed-length slots between an opening and a closing
// hour. Slots are identified on the wire only by their label
// ("08:00 - 08:40"), so the label format is part of the contract.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Minutes past midnight for a slot boundary, rendered as zero-padded `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SlotTime {
    pub hour: u8,
    pub minute: u8,
}

impl SlotTime {
    pub fn new(hour: u8, minute: u8) -> Self {
        Self { hour, minute }
    }

    /// Build from minutes since midnight.
    pub(crate) fn from_minutes(total: u32) -> Self {
        // Schedules are validated to end by 24:00, so both parts fit in u8.
        let hour = u8::try_from(total / 60).unwrap_or(u8::MAX);
        let minute = u8::try_from(total % 60).unwrap_or(0);
        Self { hour, minute }
    }

    pub fn as_minutes(self) -> u32 {
        u32::from(self.hour) * 60 + u32::from(self.minute)
    }
}

impl fmt::Display for SlotTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// One bookable interval on a given day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    /// `"{start} - {end}"`, the identifier the endpoint stores.
    pub label: String,
    pub start: SlotTime,
    pub end: SlotTime,
    pub booked: bool,
}

impl TimeSlot {
    pub fn new(start: SlotTime, end: SlotTime, booked: bool) -> Self {
        Self {
            label: format!("{start} - {end}"),
            start,
            end,
            booked,
        }
    }

    pub fn is_available(&self) -> bool {
        !self.booked
    }
}

// ── SlotSchedule ────────────────────────────────────────────────────

/// Opening hours and slot length used to tile a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSchedule {
    /// First slot starts at this hour.
    pub start_hour: u8,
    /// No slot may end after this hour.
    pub end_hour: u8,
    /// Length of every slot.
    pub slot_minutes: u8,
}

impl Default for SlotSchedule {
    fn default() -> Self {
        Self {
            start_hour: 8,
            end_hour: 18,
            slot_minutes: 40,
        }
    }
}

impl SlotSchedule {
    /// Reject schedules that cannot produce a sensible tiling.
    pub fn validate(&self) -> Result<(), CoreError> {
        let reason = if self.end_hour > 24 {
            Some(format!("end hour {} is past midnight", self.end_hour))
        } else if self.start_hour >= self.end_hour {
            Some(format!(
                "start hour {} must be before end hour {}",
                self.start_hour, self.end_hour
            ))
        } else if self.slot_minutes == 0 || self.slot_minutes > 60 {
            Some(format!(
                "slot length must be 1-60 minutes, got {}",
                self.slot_minutes
            ))
        } else {
            None
        };

        match reason {
            Some(message) => Err(CoreError::Config {
                message: format!("invalid schedule: {message}"),
            }),
            None => Ok(()),
        }
    }

    pub fn opens_at(&self) -> SlotTime {
        SlotTime::new(self.start_hour, 0)
    }

    pub fn closes_at(&self) -> SlotTime {
        SlotTime::new(self.end_hour, 0)
    }
}

// ── SlotListing ─────────────────────────────────────────────────────

/// The slots shown for one date, as produced by a single availability load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotListing {
    pub date: NaiveDate,
    /// Generated slots in day order. Empty when nothing is bookable.
    pub slots: Vec<TimeSlot>,
    /// Set when availability could not be verified and every slot is shown
    /// as available.
    pub warning: Option<String>,
}

impl SlotListing {
    pub fn find(&self, label: &str) -> Option<&TimeSlot> {
        self.slots.iter().find(|s| s.label == label)
    }

    pub fn available(&self) -> impl Iterator<Item = &TimeSlot> {
        self.slots.iter().filter(|s| s.is_available())
    }

    /// `true` when the date offers no bookable slot at all.
    pub fn has_no_availability(&self) -> bool {
        self.available().next().is_none()
    }
}
