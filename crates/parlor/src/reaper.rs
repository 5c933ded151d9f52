//! The expiry reaper: one coalesced sweep per TTL period.
//!
//! No per-session timers — each tick lists every session and destroys the
//! ones whose last significant change is older than the TTL (or whose
//! status is gone entirely). A failure on one session is logged and the
//! sweep moves on; one broken session must never shield the rest from
//! expiry.

use std::sync::Arc;
use std::time::Duration;

use parlor_protocol::SessionCode;
use parlor_room::Rooms;
use parlor_session::{SessionError, SessionRegistry};
use parlor_store::SessionStore;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

/// Periodic idle-session sweeper.
pub struct ExpiryReaper<S> {
    store: Arc<S>,
    registry: Arc<SessionRegistry<S>>,
    rooms: Arc<Mutex<Rooms>>,
    ttl: Duration,
}

impl<S: SessionStore> ExpiryReaper<S> {
    pub fn new(
        store: Arc<S>,
        registry: Arc<SessionRegistry<S>>,
        rooms: Arc<Mutex<Rooms>>,
        ttl: Duration,
    ) -> Self {
        Self {
            store,
            registry,
            rooms,
            ttl,
        }
    }

    /// Starts the sweep loop in its own task. The returned handle stops
    /// it; dropping the handle stops it too, so an aborted server never
    /// leaks a reaper.
    pub fn spawn(self) -> ReaperHandle {
        let (stop_tx, mut stop_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut ticks = tokio::time::interval(self.ttl);
            ticks.set_missed_tick_behavior(
                tokio::time::MissedTickBehavior::Delay,
            );
            tracing::debug!(ttl_secs = self.ttl.as_secs(), "reaper started");

            loop {
                tokio::select! {
                    _ = ticks.tick() => {
                        let reaped = self.sweep().await;
                        if reaped > 0 {
                            tracing::info!(reaped, "sweep reclaimed idle sessions");
                        }
                    }
                    _ = stop_rx.changed() => {
                        tracing::debug!("reaper stopped");
                        break;
                    }
                }
            }
        });

        ReaperHandle {
            stop: stop_tx,
            task,
        }
    }

    /// One full sweep. Returns how many sessions were destroyed.
    pub async fn sweep(&self) -> usize {
        let codes = match self.store.session_codes().await {
            Ok(codes) => codes,
            Err(err) => {
                tracing::error!(error = %err, "sweep could not list sessions");
                return 0;
            }
        };

        let mut reaped = 0;
        for code in codes {
            match self.reap_if_stale(code).await {
                Ok(true) => reaped += 1,
                Ok(false) => {}
                Err(err) => {
                    tracing::warn!(%code, error = %err, "sweep skipped session");
                }
            }
        }
        reaped
    }

    async fn reap_if_stale(
        &self,
        code: SessionCode,
    ) -> Result<bool, SessionError> {
        // Take the session's critical section so the reap cannot
        // interleave with a join or removal in flight on the same code.
        let _guard = self.store.guard(code).await;

        let stale = match self.store.status(code).await? {
            // A session with no status document is garbage either way.
            None => true,
            Some(status) => status.idle_for() > self.ttl,
        };
        if !stale {
            return Ok(false);
        }

        self.registry.destroy_session(code).await?;
        self.rooms.lock().await.close(code);
        tracing::info!(%code, "idle session reaped");
        Ok(true)
    }
}

/// Handle to a running reaper task.
pub struct ReaperHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ReaperHandle {
    /// Signals the loop to exit and waits for it.
    pub async fn stop(self) {
        let _ = self.stop.send(true);
        let _ = self.task.await;
    }
}
