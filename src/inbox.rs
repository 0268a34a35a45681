//! Reply inbox refresh: replies and message statuses fetched side by side.
//!
//! Each half of a refresh is applied on its own, so a failing status endpoint
//! never hides fresh replies (and vice versa). Overlapping refreshes are
//! ignored rather than queued.

use crate::gateway_client::LeadGateway;
use crate::handlers::AppState;
use crate::models::{InboxSnapshot, Persona};
use chrono::Utc;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// What a call to `refresh` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Another refresh was already running.
    Skipped,
    /// The owner went away while the fetches were in flight.
    Discarded,
    /// Results were applied; `false` marks the half that failed.
    Applied { replies: bool, statuses: bool },
}

#[derive(Debug, Default)]
pub struct InboxMonitor {
    snapshot: RwLock<InboxSnapshot>,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag even when the refresh future is dropped.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn or_empty(value: Value) -> Value {
    if value.is_null() {
        Value::Array(Vec::new())
    } else {
        value
    }
}

impl InboxMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last applied snapshot, whichever persona it belongs to.
    pub async fn snapshot(&self) -> InboxSnapshot {
        self.snapshot.read().await.clone()
    }

    /// Snapshot for `persona`; empty until a refresh under that persona lands.
    pub async fn snapshot_for(&self, persona: Persona) -> InboxSnapshot {
        let snapshot = self.snapshot.read().await;
        if snapshot.persona == persona {
            snapshot.clone()
        } else {
            InboxSnapshot::empty(persona)
        }
    }

    /// Refreshes replies and message statuses once.
    pub async fn refresh(&self, gateway: &dyn LeadGateway) -> RefreshOutcome {
        self.refresh_while(gateway, None).await
    }

    async fn refresh_while(
        &self,
        gateway: &dyn LeadGateway,
        alive: Option<&AtomicBool>,
    ) -> RefreshOutcome {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("Inbox refresh already running, skipping");
            return RefreshOutcome::Skipped;
        }
        let _guard = InFlightGuard(&self.in_flight);

        let (replies, statuses) =
            tokio::join!(gateway.list_replies(), gateway.list_message_statuses());

        if alive.is_some_and(|flag| !flag.load(Ordering::Acquire)) {
            tracing::debug!("Inbox watcher stopped, discarding refresh results");
            return RefreshOutcome::Discarded;
        }

        let mut snapshot = self.snapshot.write().await;
        if snapshot.persona != gateway.persona() {
            // Never keep the other persona's half when this one fails.
            *snapshot = InboxSnapshot::empty(gateway.persona());
        }
        let mut errors = Vec::new();

        let replies_ok = match replies {
            Ok(value) => {
                snapshot.replies = or_empty(value);
                true
            }
            Err(e) => {
                tracing::warn!("Failed to refresh replies: {}", e);
                errors.push(format!("replies: {}", e));
                false
            }
        };
        let statuses_ok = match statuses {
            Ok(value) => {
                snapshot.message_statuses = or_empty(value);
                true
            }
            Err(e) => {
                tracing::warn!("Failed to refresh message statuses: {}", e);
                errors.push(format!("message statuses: {}", e));
                false
            }
        };

        if replies_ok || statuses_ok {
            snapshot.refreshed_at = Some(Utc::now());
        }
        snapshot.last_error = (!errors.is_empty()).then(|| errors.join("; "));

        RefreshOutcome::Applied {
            replies: replies_ok,
            statuses: statuses_ok,
        }
    }

    /// Starts the periodic refresh loop for `state.inbox`.
    ///
    /// The gateway is resolved on every tick so persona switches take effect
    /// on the next refresh. Dropping the returned handle stops the loop.
    pub fn spawn(state: Arc<AppState>, interval: Duration) -> InboxWatch {
        let alive = Arc::new(AtomicBool::new(true));
        let task_alive = alive.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                if !task_alive.load(Ordering::Acquire) {
                    break;
                }

                match state.gateway() {
                    Ok(gateway) => {
                        let outcome = state
                            .inbox
                            .refresh_while(gateway.as_ref(), Some(&task_alive))
                            .await;
                        tracing::debug!("Inbox refresh: {:?}", outcome);
                    }
                    Err(e) => tracing::debug!("Inbox refresh skipped: {}", e),
                }
            }
        });

        tracing::info!("Inbox refresh loop started (every {:?})", interval);
        InboxWatch { alive, handle }
    }
}

/// Handle of a running inbox refresh loop.
#[derive(Debug)]
pub struct InboxWatch {
    alive: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl InboxWatch {
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }
}

impl Drop for InboxWatch {
    fn drop(&mut self) {
        self.alive.store(false, Ordering::Release);
        self.handle.abort();
    }
}
