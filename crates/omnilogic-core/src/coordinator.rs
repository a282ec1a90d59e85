// ── Poll coordinator ──
//
// Owns the refresh cycle for one controller: fetch both payloads, parse,
// walk, build, publish. Also routes commands and applies their
// optimistic predictions to the published index.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::api::OmniApi;
use crate::command::{Command, CommandResult};
use crate::config::CoordinatorConfig;
use crate::diagnostics::Diagnostics;
use crate::error::CoreError;
use crate::index::EntityIndex;
use crate::model::SystemId;
use crate::parse::{parse_config, parse_telemetry};
use crate::store::{DataStore, ListenerId, RawPayloads};
use crate::stream::IndexStream;

// ── Observable state ─────────────────────────────────────────────────

/// Where the refresh state machine currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PollState {
    Idle,
    Fetching,
}

/// Outcome bookkeeping across refresh cycles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateStatus {
    pub last_update_success: bool,
    pub last_error: Option<String>,
    pub last_success_at: Option<DateTime<Utc>>,
    pub consecutive_failures: u32,
}

// ── Coordinator ──────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<CoordinatorInner>`. Hand a clone to every
/// consumer that needs the index or issues commands.
pub struct Coordinator<A: OmniApi> {
    inner: Arc<CoordinatorInner<A>>,
}

impl<A: OmniApi> Clone for Coordinator<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct CoordinatorInner<A> {
    config: CoordinatorConfig,
    api: A,
    store: DataStore,
    status: watch::Sender<UpdateStatus>,
    state: watch::Sender<PollState>,
    /// Held for the whole of a refresh cycle.
    cycle: Mutex<()>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl<A: OmniApi> Coordinator<A> {
    /// Create a coordinator. Does NOT fetch anything -- call
    /// [`start()`](Self::start) to run the first cycle and begin polling.
    pub fn new(config: CoordinatorConfig, api: A) -> Self {
        let (status, _) = watch::channel(UpdateStatus::default());
        let (state, _) = watch::channel(PollState::Idle);

        Self {
            inner: Arc::new(CoordinatorInner {
                config,
                api,
                store: DataStore::new(),
                status,
                state,
                cycle: Mutex::new(()),
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &DataStore {
        &self.inner.store
    }

    pub fn api(&self) -> &A {
        &self.inner.api
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Run the first refresh, then spawn the polling task.
    ///
    /// A failed first refresh is returned as-is and nothing is spawned.
    pub async fn start(&self) -> Result<(), CoreError> {
        self.inner.config.validate()?;
        self.refresh().await?;

        let mut handles = self.inner.task_handles.lock().await;
        if !handles.is_empty() {
            return Ok(());
        }

        let period = self.inner.config.effective_poll_interval();
        if period != self.inner.config.poll_interval {
            warn!(
                requested = ?self.inner.config.poll_interval,
                used = ?period,
                "poll interval below minimum, clamping"
            );
        }
        let coordinator = self.clone();
        let cancel = self.inner.cancel.clone();
        handles.push(tokio::spawn(poll_task(coordinator, period, cancel)));

        info!(interval = ?period, "coordinator started");
        Ok(())
    }

    /// Stop polling and wait for background tasks to finish.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        debug!("coordinator stopped");
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }

    // ── Refresh cycle ────────────────────────────────────────────────

    /// Run one full fetch + parse + build cycle and publish the result.
    ///
    /// At most one cycle runs at a time; a second caller waits for the
    /// first to finish. On failure the published index is left exactly
    /// as it was and the cause comes back wrapped in `UpdateFailed`.
    pub async fn refresh(&self) -> Result<(), CoreError> {
        if self.is_stopped() {
            return Err(CoreError::CoordinatorStopped);
        }

        let _cycle = self.inner.cycle.lock().await;
        self.inner.state.send_replace(PollState::Fetching);

        let budget = self.inner.config.update_timeout;
        let outcome = match tokio::time::timeout(budget, self.fetch_cycle()).await {
            Ok(result) => result,
            Err(_) => Err(CoreError::Timeout { timeout: budget }),
        };

        let result = match outcome {
            Ok((index, payloads)) => {
                let entries = index.len();
                let fetched_at = payloads.fetched_at;
                self.inner.store.replace(index, payloads);

                let recovered = self.inner.status.borrow().consecutive_failures > 0;
                self.inner.status.send_modify(|status| {
                    status.last_update_success = true;
                    status.last_error = None;
                    status.last_success_at = Some(fetched_at);
                    status.consecutive_failures = 0;
                });
                if recovered {
                    info!("controller updates recovered");
                }
                debug!(entries, "index refresh complete");
                Ok(())
            }
            Err(e) => {
                let err = CoreError::update_failed(e);
                self.inner.status.send_modify(|status| {
                    status.last_update_success = false;
                    status.last_error = Some(err.to_string());
                    status.consecutive_failures = status.consecutive_failures.saturating_add(1);
                });
                warn!(error = %err, "index refresh failed");
                Err(err)
            }
        };

        self.inner.state.send_replace(PollState::Idle);
        result
    }

    async fn fetch_cycle(&self) -> Result<(EntityIndex, RawPayloads), CoreError> {
        // Configuration is refetched every cycle: set points live there.
        let (configuration, telemetry): (Bytes, Bytes) = tokio::try_join!(
            self.inner.api.fetch_configuration(),
            self.inner.api.fetch_telemetry(),
        )?;

        let config = parse_config(&configuration)?;
        let snapshot = parse_telemetry(&telemetry)?;
        let index = EntityIndex::from_payloads(&config, &snapshot);

        Ok((
            index,
            RawPayloads {
                configuration,
                telemetry,
                fetched_at: Utc::now(),
            },
        ))
    }

    // ── Consumers ────────────────────────────────────────────────────

    /// The current index snapshot.
    pub fn index(&self) -> Arc<EntityIndex> {
        self.inner.store.index()
    }

    /// Register a callback run once per successful refresh or
    /// optimistic update.
    pub fn subscribe<F>(&self, callback: F) -> ListenerId
    where
        F: Fn(&EntityIndex) + Send + Sync + 'static,
    {
        self.inner.store.subscribe(Arc::new(callback))
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.inner.store.unsubscribe(id)
    }

    /// Stream of index snapshots. Counts as a listener while alive.
    pub fn watch(&self) -> IndexStream {
        self.inner.store.watch()
    }

    pub fn status(&self) -> watch::Receiver<UpdateStatus> {
        self.inner.status.subscribe()
    }

    pub fn state(&self) -> watch::Receiver<PollState> {
        self.inner.state.subscribe()
    }

    pub fn last_update_success(&self) -> bool {
        self.inner.status.borrow().last_update_success
    }

    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics::capture(&self.inner.store, &self.inner.status.borrow())
    }

    // ── Command execution ────────────────────────────────────────────

    /// Send `command` to device `system_id`, then write its predicted
    /// effect into the index ahead of the next poll.
    ///
    /// Nothing is sent for an unknown id or a command the device cannot
    /// take, and nothing is predicted if the send fails.
    pub async fn dispatch_command(
        &self,
        system_id: SystemId,
        command: Command,
    ) -> Result<CommandResult, CoreError> {
        if self.is_stopped() {
            return Err(CoreError::CoordinatorStopped);
        }

        let (bow_id, request, prediction) = {
            let index = self.index();
            let entry = index
                .get(system_id)
                .ok_or(CoreError::UnknownDevice { system_id })?;
            let request = command.request(&index, entry)?;
            (
                entry.msp_config.bow_id,
                request,
                command.prediction(&index, entry),
            )
        };

        debug!(system_id, command = command.name(), ?request, "dispatching command");
        self.inner
            .api
            .send_command(bow_id, system_id, request)
            .await
            .map_err(|source| CoreError::CommandDispatch { system_id, source })?;

        let result = if prediction.is_empty() {
            CommandResult::Sent
        } else {
            match self.inner.store.apply_mutation(system_id, &prediction) {
                Ok(()) => CommandResult::Applied,
                Err(e) => {
                    warn!(system_id, error = %e, "optimistic update not applied");
                    CommandResult::Unconfirmed {
                        reason: e.to_string(),
                    }
                }
            }
        };

        if self.inner.config.refresh_after_command {
            let coordinator = self.clone();
            tokio::spawn(async move {
                // Failures are recorded in the update status.
                let _ = coordinator.refresh().await;
            });
        }

        Ok(result)
    }
}

// ── Background tasks ─────────────────────────────────────────────────

/// Periodically refresh while anyone is listening.
async fn poll_task<A: OmniApi>(
    coordinator: Coordinator<A>,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if coordinator.store().listener_count() == 0 {
                    trace!("no listeners, skipping poll");
                    continue;
                }
                // Failures are logged and recorded by `refresh` itself.
                let _ = coordinator.refresh().await;
            }
        }
    }
}
