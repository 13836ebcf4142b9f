// ── Booking flow ──
//
// Owns the session state (active date, selected slot) and drives the
// submission state machine:
//
//   Idle -> Validating -> Submitting{Primary|Fallback} -> Confirmed | Failed
//
// `Failed` after a transport error offers one retry over the fallback
// transport; `Confirmed` returns to `Idle` on reset. Slot loads are
// sequenced by a generation counter so a late response for a date the user
// has already left is dropped instead of overwriting the current listing.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{Local, NaiveDate, Utc};
use strum::Display;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use slotbook_api::{BookingClient, BookingPayload, SubmissionResponse};

use crate::availability;
use crate::config::BookingConfig;
use crate::error::CoreError;
use crate::model::{BookingConfirmation, BookingRequest, SlotListing};
use crate::slots;
use crate::validate::{FormFields, Validator, normalize_phone};

/// Substring of a server rejection that means the slot was taken meanwhile.
const CONFLICT_MARKER: &str = "already booked";

// ── Phases ───────────────────────────────────────────────────────

/// Which transport carries a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Transport {
    /// JSON body on a POST.
    Primary,
    /// Fields as query parameters on a GET.
    Fallback,
}

/// Why the last submission did not produce a booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionFailure {
    Transport {
        reason: String,
        fallback_available: bool,
    },
    Server {
        message: String,
        slot_conflict: bool,
    },
}

/// Submission state observable by views.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum SubmissionPhase {
    Idle,
    Validating,
    Submitting { transport: Transport },
    Confirmed(Arc<BookingConfirmation>),
    Failed(SubmissionFailure),
}

// ── Session ──────────────────────────────────────────────────────

/// Date and slot the user is currently working with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub active_date: NaiveDate,
    pub selected_slot: Option<String>,
    /// Bumped on every date change so stale loads can be recognized.
    generation: u64,
}

impl SessionState {
    fn new(date: NaiveDate) -> Self {
        Self {
            active_date: date,
            selected_slot: None,
            generation: 0,
        }
    }
}

/// Today's date in the local time zone.
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

// ── BookingFlow ──────────────────────────────────────────────────

/// The booking submitter and its session.
///
/// Cheaply cloneable via `Arc<FlowInner>`. Views read slot listings and
/// phases from it (directly or through `watch` subscriptions) and never
/// keep their own copy of the selected date or slot.
#[derive(Clone)]
pub struct BookingFlow {
    inner: Arc<FlowInner>,
}

struct FlowInner {
    config: BookingConfig,
    client: BookingClient,
    validator: Validator,
    session: Mutex<SessionState>,
    phase: watch::Sender<SubmissionPhase>,
    listing: watch::Sender<Option<Arc<SlotListing>>>,
    /// Request kept after a transport failure for the fallback retry.
    pending: Mutex<Option<BookingRequest>>,
    /// Cancels the post-confirmation refresh, if one is scheduled.
    scheduled_refresh: Mutex<Option<CancellationToken>>,
    cancel: CancellationToken,
}

impl BookingFlow {
    /// Create a flow for the configured endpoint. Does not touch the
    /// network; call [`select_date`](Self::select_date) to load slots.
    pub fn new(config: BookingConfig) -> Result<Self, CoreError> {
        config.validate()?;
        let client = BookingClient::new(config.endpoint.clone(), &config.transport())?;
        let validator = Validator::new(config.test_types.clone());
        debug!(endpoint = %client.base_url(), "booking flow ready");
        let (phase, _) = watch::channel(SubmissionPhase::Idle);
        let (listing, _) = watch::channel(None);

        Ok(Self {
            inner: Arc::new(FlowInner {
                config,
                client,
                validator,
                session: Mutex::new(SessionState::new(local_today())),
                phase,
                listing,
                pending: Mutex::new(None),
                scheduled_refresh: Mutex::new(None),
                cancel: CancellationToken::new(),
            }),
        })
    }

    pub fn config(&self) -> &BookingConfig {
        &self.inner.config
    }

    pub fn validator(&self) -> &Validator {
        &self.inner.validator
    }

    /// Snapshot of the session state.
    pub fn session(&self) -> SessionState {
        self.lock_session().clone()
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.inner.phase.borrow().clone()
    }

    pub fn subscribe_phase(&self) -> watch::Receiver<SubmissionPhase> {
        self.inner.phase.subscribe()
    }

    /// The listing currently on display, if any load has completed.
    pub fn listing(&self) -> Option<Arc<SlotListing>> {
        self.inner.listing.borrow().clone()
    }

    pub fn subscribe_listing(&self) -> watch::Receiver<Option<Arc<SlotListing>>> {
        self.inner.listing.subscribe()
    }

    // ── Date & slot selection ────────────────────────────────────

    /// Make `date` the active date and load its slots.
    ///
    /// Clears the slot selection. Dates before today are rejected.
    pub async fn select_date(&self, date: NaiveDate) -> Result<Arc<SlotListing>, CoreError> {
        self.ensure_not_submitting("change the date")?;

        let today = local_today();
        if date < today {
            return Err(CoreError::PastDate { date, today });
        }

        let generation = {
            let mut session = self.lock_session();
            session.active_date = date;
            session.selected_slot = None;
            session.generation += 1;
            session.generation
        };
        self.abandon_failed_submission();

        debug!(%date, generation, "date selected");
        Ok(self.load(date, generation).await)
    }

    /// Reload the active date's slots without changing the selection.
    pub async fn refresh_slots(&self) -> Arc<SlotListing> {
        let (date, generation) = self.current_target();
        self.load(date, generation).await
    }

    /// Select an available slot of the active date's listing.
    ///
    /// Picking a different slot abandons a failed submission, so the
    /// fallback can no longer send the old one.
    pub fn select_slot(&self, label: &str) -> Result<(), CoreError> {
        self.ensure_not_submitting("select a slot")?;
        self.ensure_selectable(label)?;
        let previous = self.lock_session().selected_slot.replace(label.to_owned());
        if previous.as_deref() != Some(label) {
            self.abandon_failed_submission();
        }
        Ok(())
    }

    /// Click semantics: selecting the selected slot deselects it.
    ///
    /// Returns whether the slot is selected afterwards.
    pub fn toggle_slot(&self, label: &str) -> Result<bool, CoreError> {
        if self.lock_session().selected_slot.as_deref() == Some(label) {
            self.clear_slot();
            return Ok(false);
        }
        self.select_slot(label)?;
        Ok(true)
    }

    pub fn clear_slot(&self) {
        if self.lock_session().selected_slot.take().is_some() {
            self.abandon_failed_submission();
        }
    }

    // ── Submission ───────────────────────────────────────────────

    /// Validate `fields` against the session and send the booking over the
    /// primary transport.
    ///
    /// Allowed from `Idle` and `Failed`. Validation problems return the
    /// flow to `Idle`; delivery outcomes end in `Confirmed` or `Failed`.
    pub async fn submit(&self, fields: &FormFields) -> Result<Arc<BookingConfirmation>, CoreError> {
        self.transition("submit", |phase| {
            matches!(phase, SubmissionPhase::Idle | SubmissionPhase::Failed(_))
                .then_some(SubmissionPhase::Validating)
        })?;

        let request = match self.build_request(fields) {
            Ok(request) => request,
            Err(e) => {
                debug!(error = %e, "booking rejected by validation");
                self.set_phase(SubmissionPhase::Idle);
                return Err(e);
            }
        };

        *self.lock_pending() = Some(request.clone());
        self.deliver(request, Transport::Primary).await
    }

    /// Retry the last booking over the fallback transport.
    ///
    /// Only allowed after a primary transport failure. The booking details
    /// travel as URL query parameters, so views should ask before calling.
    pub async fn submit_fallback(&self) -> Result<Arc<BookingConfirmation>, CoreError> {
        self.transition("use the fallback transport", |phase| {
            matches!(
                phase,
                SubmissionPhase::Failed(SubmissionFailure::Transport {
                    fallback_available: true,
                    ..
                })
            )
            .then_some(SubmissionPhase::Submitting {
                transport: Transport::Fallback,
            })
        })?;

        let Some(request) = self.lock_pending().take() else {
            self.set_phase(SubmissionPhase::Idle);
            return Err(CoreError::InvalidTransition {
                action: "use the fallback transport",
                phase: "no booking is pending".into(),
            });
        };

        self.deliver(request, Transport::Fallback).await
    }

    /// Start over: drop the confirmation and selection, return to today.
    pub async fn reset(&self) -> Result<Arc<SlotListing>, CoreError> {
        self.ensure_not_submitting("reset")?;

        if let Some(token) = self.lock_refresh().take() {
            token.cancel();
        }
        self.lock_pending().take();

        let today = local_today();
        let generation = {
            let mut session = self.lock_session();
            session.active_date = today;
            session.selected_slot = None;
            session.generation += 1;
            session.generation
        };
        self.set_phase(SubmissionPhase::Idle);

        debug!(%today, "booking flow reset");
        Ok(self.load(today, generation).await)
    }

    /// Cancel background work. Pending scheduled refreshes never fire.
    pub fn shutdown(&self) {
        self.inner.cancel.cancel();
    }

    // ── Internals ────────────────────────────────────────────────

    fn build_request(&self, fields: &FormFields) -> Result<BookingRequest, CoreError> {
        let session = self.session();

        self.inner
            .validator
            .validate(fields, session.selected_slot.as_deref())
            .into_result()?;

        let Some(label) = session.selected_slot else {
            return Err(CoreError::NoSlotSelected);
        };

        let today = local_today();
        if session.active_date < today {
            return Err(CoreError::PastDate {
                date: session.active_date,
                today,
            });
        }

        self.ensure_selectable(&label)?;

        Ok(BookingRequest {
            name: fields.name.trim().to_owned(),
            address: fields.address.trim().to_owned(),
            phone: normalize_phone(fields.phone.trim()),
            date: session.active_date,
            time_slot: label,
            test_type: fields.test_type.trim().to_owned(),
            timestamp: Utc::now(),
        })
    }

    async fn deliver(
        &self,
        request: BookingRequest,
        transport: Transport,
    ) -> Result<Arc<BookingConfirmation>, CoreError> {
        self.set_phase(SubmissionPhase::Submitting { transport });

        let payload = BookingPayload::from(&request);
        let client = &self.inner.client;
        let result = match transport {
            Transport::Primary => client.submit(&payload).await,
            Transport::Fallback => client.submit_via_query(&payload).await,
        };

        match result {
            Ok(resp) if resp.success => Ok(self.confirm(resp, request)),
            Ok(resp) => Err(self.reject(&resp, &request).await),
            Err(e) => {
                let fallback_available = transport == Transport::Primary;
                warn!(error = %e, %transport, "booking could not be delivered");
                if !fallback_available {
                    self.lock_pending().take();
                }
                let reason = e.to_string();
                self.set_phase(SubmissionPhase::Failed(SubmissionFailure::Transport {
                    reason: reason.clone(),
                    fallback_available,
                }));
                Err(CoreError::SubmissionTransport {
                    reason,
                    fallback_available,
                })
            }
        }
    }

    fn confirm(&self, resp: SubmissionResponse, request: BookingRequest) -> Arc<BookingConfirmation> {
        let date = request.date;
        let confirmation = Arc::new(BookingConfirmation::new(resp.booking_id, request));
        info!(
            booking_id = %confirmation.booking_id,
            source = %confirmation.id_source,
            slot = %confirmation.request.time_slot,
            "booking confirmed"
        );

        self.lock_pending().take();
        self.lock_session().selected_slot = None;
        self.set_phase(SubmissionPhase::Confirmed(Arc::clone(&confirmation)));
        self.schedule_refresh(date);
        confirmation
    }

    async fn reject(&self, resp: &SubmissionResponse, request: &BookingRequest) -> CoreError {
        let message = resp.failure_message();
        let slot_conflict = message.contains(CONFLICT_MARKER);
        warn!(%message, slot_conflict, "booking rejected by server");

        self.lock_pending().take();
        if slot_conflict {
            self.reload_date(request.date).await;
        }

        self.set_phase(SubmissionPhase::Failed(SubmissionFailure::Server {
            message: message.clone(),
            slot_conflict,
        }));
        CoreError::SubmissionServer {
            message,
            slot_conflict,
        }
    }

    /// Refresh `date` after the configured delay, unless cancelled first.
    fn schedule_refresh(&self, date: NaiveDate) {
        let token = self.inner.cancel.child_token();
        if let Some(previous) = self.lock_refresh().replace(token.clone()) {
            previous.cancel();
        }

        let flow = self.clone();
        let delay = self.inner.config.refresh_delay;
        tokio::spawn(async move {
            tokio::select! {
                () = token.cancelled() => debug!(%date, "scheduled refresh cancelled"),
                () = tokio::time::sleep(delay) => flow.reload_date(date).await,
            }
        });
    }

    /// Reload `date` if it is still the active date.
    async fn reload_date(&self, date: NaiveDate) {
        let (active, generation) = self.current_target();
        if active != date {
            debug!(%date, %active, "skipping refresh for inactive date");
            return;
        }
        self.load(date, generation).await;
    }

    /// Load and, if still current, publish the listing for `date`.
    async fn load(&self, date: NaiveDate, generation: u64) -> Arc<SlotListing> {
        let listing = Arc::new(
            availability::load_slots(&self.inner.client, date, &self.inner.config.schedule).await,
        );

        let published = {
            let mut session = self.lock_session();
            let current = session.active_date == date && session.generation == generation;
            if current {
                let still_open = session
                    .selected_slot
                    .as_deref()
                    .is_none_or(|label| listing.find(label).is_some_and(|s| s.is_available()));
                if !still_open {
                    debug!("selected slot is no longer available");
                    session.selected_slot = None;
                }
            }
            current
        };

        if published {
            self.inner.listing.send_replace(Some(Arc::clone(&listing)));
        } else {
            debug!(%date, generation, "discarding stale slot listing");
        }
        listing
    }

    fn ensure_selectable(&self, label: &str) -> Result<(), CoreError> {
        let date = self.lock_session().active_date;

        if !slots::labels(&self.inner.config.schedule)
            .iter()
            .any(|l| l == label)
        {
            return Err(CoreError::UnknownSlot {
                label: label.to_owned(),
                date,
            });
        }

        let Some(listing) = self.listing().filter(|listing| listing.date == date) else {
            return Err(CoreError::SlotsNotLoaded { date });
        };
        if listing.find(label).is_none_or(|s| s.booked) {
            return Err(CoreError::SlotUnavailable {
                label: label.to_owned(),
            });
        }
        Ok(())
    }

    /// Drop an undelivered booking and leave `Failed` once the session no
    /// longer describes it.
    fn abandon_failed_submission(&self) {
        if self.lock_pending().take().is_some() {
            debug!("abandoning undelivered booking");
        }
        self.inner.phase.send_if_modified(|phase| {
            if matches!(phase, SubmissionPhase::Failed(_)) {
                *phase = SubmissionPhase::Idle;
                true
            } else {
                false
            }
        });
    }

    fn ensure_not_submitting(&self, action: &'static str) -> Result<(), CoreError> {
        let phase = self.phase();
        if matches!(
            phase,
            SubmissionPhase::Validating | SubmissionPhase::Submitting { .. }
        ) {
            return Err(CoreError::InvalidTransition {
                action,
                phase: phase.to_string(),
            });
        }
        Ok(())
    }

    /// Atomically move to the phase chosen by `next`, or fail if it
    /// declines the current phase.
    fn transition(
        &self,
        action: &'static str,
        next: impl FnOnce(&SubmissionPhase) -> Option<SubmissionPhase>,
    ) -> Result<(), CoreError> {
        let mut rejected = None;
        self.inner.phase.send_if_modified(|phase| match next(phase) {
            Some(new_phase) => {
                *phase = new_phase;
                true
            }
            None => {
                rejected = Some(phase.to_string());
                false
            }
        });

        match rejected {
            Some(phase) => Err(CoreError::InvalidTransition { action, phase }),
            None => Ok(()),
        }
    }

    fn set_phase(&self, phase: SubmissionPhase) {
        debug!(%phase, "submission phase");
        self.inner.phase.send_replace(phase);
    }

    fn current_target(&self) -> (NaiveDate, u64) {
        let session = self.lock_session();
        (session.active_date, session.generation)
    }

    // Guarded values are plain data, so a poisoned lock is still usable.

    fn lock_session(&self) -> MutexGuard<'_, SessionState> {
        self.inner
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_pending(&self) -> MutexGuard<'_, Option<BookingRequest>> {
        self.inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_refresh(&self) -> MutexGuard<'_, Option<CancellationToken>> {
        self.inner
            .scheduled_refresh
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn poisoned_session_lock_is_recovered() {
        let config = BookingConfig::new("https://example.com/exec".parse().unwrap());
        let flow = BookingFlow::new(config).unwrap();

        let holder = flow.clone();
        let joined = std::thread::spawn(move || {
            let _guard = holder.inner.session.lock().unwrap();
            panic!("panic while holding the session lock");
        })
        .join();
        assert!(joined.is_err());
        assert!(flow.inner.session.is_poisoned());

        assert_eq!(flow.session().active_date, local_today());
        flow.clear_slot();
        assert!(flow.session().selected_slot.is_none());
    }
}
