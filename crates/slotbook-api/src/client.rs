// Booking endpoint HTTP client
//
// Wraps `reqwest::Client` with the endpoint's query conventions and
// flat `{ success, ... }` payload decoding. The three endpoint operations
// live in `bookings.rs` as inherent methods so this module stays focused on
// transport mechanics.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Longest body excerpt carried in error messages.
const BODY_PREVIEW_CHARS: usize = 200;

/// How strictly a response's HTTP status is checked before decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StatusPolicy {
    /// Any non-2xx status is an error, whatever the body says.
    Strict,
    /// Decode the body regardless of status; only fail on status when the
    /// body is not a valid payload.
    PayloadFirst,
}

/// Raw HTTP client for a booking endpoint.
///
/// Every operation targets the same base URL; the endpoint distinguishes
/// them by method and the `action` query parameter.
pub struct BookingClient {
    http: reqwest::Client,
    base_url: Url,
}

impl BookingClient {
    /// Create a new client from a `TransportConfig`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The endpoint base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request with the given query and decode the payload.
    pub(crate) async fn get<T, Q>(
        &self,
        query: &Q,
        policy: StatusPolicy,
    ) -> Result<T, Error>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized + Sync,
    {
        debug!("GET {}", self.base_url);

        let resp = self
            .http
            .get(self.base_url.clone())
            .query(query)
            .send()
            .await
            .map_err(Error::Transport)?;

        Self::decode(resp, policy).await
    }

    /// Send a POST request with a JSON body and decode the payload.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        body: &(impl Serialize + Sync),
        policy: StatusPolicy,
    ) -> Result<T, Error> {
        debug!("POST {}", self.base_url);

        let resp = self
            .http
            .post(self.base_url.clone())
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;

        Self::decode(resp, policy).await
    }

    /// Decode a JSON payload from the response under the given status policy.
    async fn decode<T: DeserializeOwned>(
        resp: reqwest::Response,
        policy: StatusPolicy,
    ) -> Result<T, Error> {
        let status = resp.status();
        trace!(%status, "endpoint responded");

        if policy == StatusPolicy::Strict && !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Http {
                status: status.as_u16(),
                body: preview(&body),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;

        serde_json::from_str(&body).map_err(|e| {
            if status.is_success() {
                Error::Deserialization {
                    message: format!("{e} (body preview: {:?})", preview(&body)),
                    body,
                }
            } else {
                Error::Http {
                    status: status.as_u16(),
                    body: preview(&body),
                }
            }
        })
    }
}

/// Truncate a body to a short, char-boundary-safe excerpt.
fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}
