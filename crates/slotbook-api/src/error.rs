use thiserror::Error;

/// Top-level error type for the `slotbook-api` crate.
///
/// Covers every failure mode of the booking endpoint: transport,
/// HTTP status, payload decoding, and the endpoint's own `success: false`
/// flag on reads. `slotbook-core` maps these into booking-flow errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Endpoint ────────────────────────────────────────────────────
    /// Non-success HTTP status with a body that is not a booking payload.
    #[error("HTTP error {status}: {body}")]
    Http { status: u16, body: String },

    /// The endpoint answered with `success: false` on a read.
    #[error("{message}")]
    Remote { message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// HTTP status associated with this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
