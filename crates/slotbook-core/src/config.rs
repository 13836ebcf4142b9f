// ── Runtime booking configuration ──
//
// Describes *where* bookings go and how the day is sliced. Never touches
// disk: the CLI builds a `BookingConfig` from its profile and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use slotbook_api::{TlsMode, TransportConfig};

use crate::error::CoreError;
use crate::model::SlotSchedule;

/// Configuration for one booking endpoint.
#[derive(Debug, Clone)]
pub struct BookingConfig {
    /// Endpoint base URL (the spreadsheet script's `/exec` URL).
    pub endpoint: Url,
    /// Request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Extra CA certificate to trust.
    pub ca_cert: Option<PathBuf>,
    /// Opening hours and slot length.
    pub schedule: SlotSchedule,
    /// Accepted test type codes. Empty accepts any code.
    pub test_types: Vec<String>,
    /// Delay before the slot list is refreshed after a confirmed booking.
    pub refresh_delay: Duration,
}

impl BookingConfig {
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            timeout: None,
            ca_cert: None,
            schedule: SlotSchedule::default(),
            test_types: Vec::new(),
            refresh_delay: Duration::from_secs(1),
        }
    }

    /// Check the parts of the config that cannot be enforced by types.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !matches!(self.endpoint.scheme(), "http" | "https") {
            return Err(CoreError::Config {
                message: format!(
                    "endpoint must be an http(s) URL, got '{}'",
                    self.endpoint
                ),
            });
        }
        self.schedule.validate()
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        let tls = self
            .ca_cert
            .clone()
            .map_or(TlsMode::System, TlsMode::CustomCa);
        TransportConfig {
            tls,
            timeout: self.timeout,
            ..TransportConfig::default()
        }
    }
}
