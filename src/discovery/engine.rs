//! The polling state machine.
//!
//! One background task loops `Idle → Polling → Diffing → (Stable |
//! Publishing) → Idle` until shut down. Poll failures are absorbed: the
//! published catalog stays as-is (stale-but-available beats flapping to
//! empty) and the next regular tick retries. Only a genuine content
//! difference (gain, loss, or in-place modification of a capability)
//! advances the version and reaches the dispatcher.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;

use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::catalog::capability::CatalogCell;
use crate::catalog::mapper::map_representation;
use crate::catalog::CapabilityCatalog;
use crate::discovery::config::DiscoveryConfig;
use crate::dispatch::dispatcher::NotificationDispatcher;
use crate::dispatch::events::CatalogChangedEvent;
use crate::error::ResourceError;
use crate::hypermedia::client::ResourceFetch;

// ---------------------------------------------------------------------------
// PollState
// ---------------------------------------------------------------------------

/// Observable state of the poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PollState {
    /// Waiting for the next tick.
    Idle = 0,
    /// Fetch in flight.
    Polling = 1,
    /// Comparing the candidate catalog against the published one.
    Diffing = 2,
    /// Last poll produced no change.
    Stable = 3,
    /// Installing and announcing a new catalog.
    Publishing = 4,
}

impl PollState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Polling,
            2 => Self::Diffing,
            3 => Self::Stable,
            4 => Self::Publishing,
            _ => Self::Idle,
        }
    }
}

// ---------------------------------------------------------------------------
// DiscoveryHandle
// ---------------------------------------------------------------------------

/// Handle to a running discovery engine.
///
/// Cheap reads (`current_catalog`, `state`, counters) plus the two
/// control operations: `refresh_now` and graceful `shutdown`.
pub struct DiscoveryHandle {
    cell: Arc<CatalogCell>,
    state: Arc<AtomicU8>,
    polls_completed: Arc<AtomicU64>,
    polls_failed: Arc<AtomicU64>,
    refresh: Arc<Notify>,
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl DiscoveryHandle {
    /// Snapshot of the currently published catalog.
    pub fn current_catalog(&self) -> Arc<CapabilityCatalog> {
        self.cell.load()
    }

    /// Current loop state.
    pub fn state(&self) -> PollState {
        PollState::from_u8(self.state.load(Ordering::Relaxed))
    }

    /// Polls that fetched and diffed successfully.
    pub fn polls_completed(&self) -> u64 {
        self.polls_completed.load(Ordering::Relaxed)
    }

    /// Polls absorbed as failures.
    pub fn polls_failed(&self) -> u64 {
        self.polls_failed.load(Ordering::Relaxed)
    }

    /// Nudge the loop to poll immediately instead of waiting out the
    /// interval. Useful after a mutation known to have changed resource
    /// state. The nudge coalesces: calling this while a poll is already
    /// in flight schedules at most one extra poll.
    pub fn refresh_now(&self) {
        self.refresh.notify_one();
    }

    /// Stop the engine gracefully: the in-flight poll iteration is
    /// finished or abandoned at its next await point, the timer is
    /// cancelled, and the last-published catalog stays in the cell for
    /// any still-connected reader.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        let _ = self.task.await;
    }
}

// ---------------------------------------------------------------------------
// DiscoveryEngine
// ---------------------------------------------------------------------------

/// Spawns the poll loop. The engine itself holds no state; everything
/// observable lives behind the returned [`DiscoveryHandle`].
pub struct DiscoveryEngine;

impl DiscoveryEngine {
    /// Validate `config` and start the background poll loop.
    ///
    /// The engine is the exclusive writer of `cell`; `dispatcher`
    /// receives every published catalog. The first tick fires
    /// immediately, so a reachable resource is reflected in the catalog
    /// right after startup.
    ///
    /// # Errors
    ///
    /// [`ResourceError::InvalidResource`] if the configuration is
    /// invalid. The loop itself never returns an error.
    pub fn spawn(
        config: DiscoveryConfig,
        fetcher: Arc<dyn ResourceFetch>,
        dispatcher: Arc<NotificationDispatcher>,
        cell: Arc<CatalogCell>,
    ) -> Result<DiscoveryHandle, ResourceError> {
        config.validate()?;

        let state = Arc::new(AtomicU8::new(PollState::Idle as u8));
        let polls_completed = Arc::new(AtomicU64::new(0));
        let polls_failed = Arc::new(AtomicU64::new(0));
        let refresh = Arc::new(Notify::new());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(Self::run(
            config,
            fetcher,
            dispatcher,
            cell.clone(),
            state.clone(),
            polls_completed.clone(),
            polls_failed.clone(),
            refresh.clone(),
            shutdown_rx,
        ));

        Ok(DiscoveryHandle {
            cell,
            state,
            polls_completed,
            polls_failed,
            refresh,
            shutdown_tx,
            task,
        })
    }

    #[allow(clippy::too_many_arguments)]
    async fn run(
        config: DiscoveryConfig,
        fetcher: Arc<dyn ResourceFetch>,
        dispatcher: Arc<NotificationDispatcher>,
        cell: Arc<CatalogCell>,
        state: Arc<AtomicU8>,
        polls_completed: Arc<AtomicU64>,
        polls_failed: Arc<AtomicU64>,
        refresh: Arc<Notify>,
        mut shutdown_rx: watch::Receiver<bool>,
    ) {
        log::info!(
            "Discovery engine started: account='{}', interval={:?}",
            config.account_id,
            config.poll_interval
        );

        let mut ticker = tokio::time::interval(config.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            state.store(PollState::Idle as u8, Ordering::Relaxed);

            tokio::select! {
                _ = ticker.tick() => {}
                _ = refresh.notified() => {
                    log::debug!("Poll nudged ahead of schedule");
                }
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        break;
                    }
                }
            }

            state.store(PollState::Polling as u8, Ordering::Relaxed);

            // The fetch may suspend this task; no lock is held here. A
            // shutdown signal abandons the in-flight poll.
            let fetched = tokio::select! {
                result = fetcher.fetch(&config.account_id) => result,
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        break;
                    }
                    continue;
                }
            };

            let representation = match fetched {
                Ok(rep) => rep,
                Err(err) => {
                    polls_failed.fetch_add(1, Ordering::Relaxed);
                    match &err {
                        ResourceError::NotFound { resource_id } => log::warn!(
                            "Poll failed: resource '{}' not found; published catalog retained (stale)",
                            resource_id
                        ),
                        other => log::warn!(
                            "Poll failed: {}; published catalog retained, retrying next tick",
                            other
                        ),
                    }
                    continue;
                }
            };

            state.store(PollState::Diffing as u8, Ordering::Relaxed);
            let candidate = map_representation(&representation);
            let current = cell.load();

            if candidate.same_capabilities(&current) {
                state.store(PollState::Stable as u8, Ordering::Relaxed);
                log::debug!(
                    "Poll stable: version={}, capabilities={}",
                    current.version,
                    current.len()
                );
            } else {
                state.store(PollState::Publishing as u8, Ordering::Relaxed);
                let diff = candidate.diff(&current);
                let next = Arc::new(candidate.into_published(current.version + 1));
                // Single atomic swap; readers either see the old catalog
                // or the complete new one, never a partial state.
                cell.store(next.clone());
                dispatcher.publish(CatalogChangedEvent::new(next, diff));
            }

            polls_completed.fetch_add(1, Ordering::Relaxed);
        }

        state.store(PollState::Idle as u8, Ordering::Relaxed);
        log::info!(
            "Discovery engine stopped: last published version={}",
            cell.load().version
        );
    }
}
