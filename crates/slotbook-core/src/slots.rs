// ── Slot generation ──
//
// Pure interval arithmetic: tile the schedule's opening hours into
// fixed-length slots and mark the ones whose labels are already booked.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::error::CoreError;
use crate::model::{SlotSchedule, SlotTime, TimeSlot};

/// Produce the ordered slots for `date`.
///
/// Slots start at the opening hour and follow each other without gaps. A
/// slot that would end after the closing hour is dropped, so every slot has
/// the full length. A slot is booked iff its exact label is in `booked`.
///
/// Returns [`CoreError::NoAvailability`] when the day has no bookable slot,
/// either because the schedule yields none or because all are booked.
pub fn generate(
    date: NaiveDate,
    booked: &HashSet<String>,
    schedule: &SlotSchedule,
) -> Result<Vec<TimeSlot>, CoreError> {
    let slots = tile(schedule, booked);

    if slots.iter().all(|s| s.booked) {
        return Err(CoreError::NoAvailability { date });
    }

    Ok(slots)
}

/// All slot labels for a schedule, in order, regardless of bookings.
pub fn labels(schedule: &SlotSchedule) -> Vec<String> {
    tile(schedule, &HashSet::new())
        .into_iter()
        .map(|s| s.label)
        .collect()
}

fn tile(schedule: &SlotSchedule, booked: &HashSet<String>) -> Vec<TimeSlot> {
    let step = u32::from(schedule.slot_minutes);
    let close = schedule.closes_at().as_minutes();
    let mut start = schedule.opens_at().as_minutes();
    let mut slots = Vec::new();

    if step == 0 {
        return slots;
    }

    while start + step <= close {
        let slot_start = SlotTime::from_minutes(start);
        let slot_end = SlotTime::from_minutes(start + step);
        let mut slot = TimeSlot::new(slot_start, slot_end, false);
        slot.booked = booked.contains(&slot.label);
        slots.push(slot);
        start += step;
    }

    slots
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 3, 4).unwrap()
    }

    fn booked(labels: &[&str]) -> HashSet<String> {
        labels.iter().map(|l| (*l).to_owned()).collect()
    }

    #[test]
    fn default_schedule_tiles_the_day() {
        let slots = generate(date(), &HashSet::new(), &SlotSchedule::default()).unwrap();

        assert_eq!(slots.len(), 15);
        assert_eq!(slots[0].label, "08:00 - 08:40");
        assert_eq!(slots[1].label, "08:40 - 09:20");
        assert_eq!(slots[2].label, "09:20 - 10:00");
        assert_eq!(slots[14].label, "17:20 - 18:00");
        assert!(slots.iter().all(TimeSlot::is_available));

        for pair in slots.windows(2) {
            assert_eq!(pair[0].end, pair[1].start, "slots must be contiguous");
        }
    }

    #[test]
    fn booked_label_is_marked() {
        let slots = generate(
            date(),
            &booked(&["09:20 - 10:00"]),
            &SlotSchedule::default(),
        )
        .unwrap();

        let booked: Vec<_> = slots.iter().filter(|s| s.booked).collect();
        assert_eq!(booked.len(), 1);
        assert_eq!(booked[0].label, "09:20 - 10:00");
        assert_eq!(slots.iter().filter(|s| s.is_available()).count(), 14);
    }

    #[test]
    fn label_match_is_exact() {
        let slots = generate(
            date(),
            &booked(&["9:20 - 10:00", "09:20-10:00"]),
            &SlotSchedule::default(),
        )
        .unwrap();
        assert!(slots.iter().all(TimeSlot::is_available));
    }

    #[test]
    fn partial_trailing_slot_is_dropped() {
        let schedule = SlotSchedule {
            start_hour: 8,
            end_hour: 10,
            slot_minutes: 45,
        };
        let labels = labels(&schedule);
        assert_eq!(
            labels,
            vec!["08:00 - 08:45", "08:45 - 09:30"],
            "09:30 - 10:15 passes the closing hour"
        );
    }

    #[test]
    fn fully_booked_day_has_no_availability() {
        let all = labels(&SlotSchedule::default()).into_iter().collect();
        let err = generate(date(), &all, &SlotSchedule::default()).unwrap_err();
        assert!(matches!(err, CoreError::NoAvailability { date: d } if d == date()));
    }

    #[test]
    fn empty_schedule_has_no_availability() {
        let schedule = SlotSchedule {
            start_hour: 8,
            end_hour: 9,
            slot_minutes: 61,
        };
        let err = generate(date(), &HashSet::new(), &schedule).unwrap_err();
        assert!(matches!(err, CoreError::NoAvailability { .. }));
    }

    #[test]
    fn generation_is_deterministic() {
        let a = generate(date(), &booked(&["12:40 - 13:20"]), &SlotSchedule::default());
        let b = generate(date(), &booked(&["12:40 - 13:20"]), &SlotSchedule::default());
        assert_eq!(a.unwrap(), b.unwrap());
    }
}
