// slotbook-api: Async Rust client for spreadsheet-backed booking endpoints

pub mod bookings;
pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::BookingClient;
pub use error::Error;
pub use models::{BookingPayload, BookingsResponse, SubmissionResponse};
pub use transport::{TlsMode, TransportConfig};
