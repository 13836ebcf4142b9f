// ── Domain model ──

pub mod booking;
pub mod slot;

pub use booking::{
    BookingConfirmation, BookingRequest, IdSource, day_name, generate_reference_id,
};
pub use slot::{SlotListing, SlotSchedule, SlotTime, TimeSlot};
