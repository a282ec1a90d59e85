// ── Central index store ──
//
// The published `EntityIndex` lives in a `watch` channel. A refresh
// swaps in a whole new snapshot; an optimistic update copies on write,
// so readers holding an older `Arc` keep a consistent view.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::watch;

use crate::error::CoreError;
use crate::index::EntityIndex;
use crate::model::SystemId;
use crate::mutation::Mutation;
use crate::stream::IndexStream;

/// Callback invoked once per published change.
pub type Listener = Arc<dyn Fn(&EntityIndex) + Send + Sync>;

/// Handle returned by [`DataStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// Raw payloads behind the current index, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPayloads {
    pub configuration: Bytes,
    pub telemetry: Bytes,
    pub fetched_at: DateTime<Utc>,
}

/// Single source of truth for the published index.
pub struct DataStore {
    index: watch::Sender<Arc<EntityIndex>>,
    listeners: DashMap<ListenerId, Listener>,
    next_listener: AtomicU64,
    payloads: watch::Sender<Option<Arc<RawPayloads>>>,
    last_full_refresh: watch::Sender<Option<DateTime<Utc>>>,
}

impl DataStore {
    pub fn new() -> Self {
        let (index, _) = watch::channel(Arc::new(EntityIndex::default()));
        let (payloads, _) = watch::channel(None);
        let (last_full_refresh, _) = watch::channel(None);

        Self {
            index,
            listeners: DashMap::new(),
            next_listener: AtomicU64::new(1),
            payloads,
            last_full_refresh,
        }
    }

    // ── Snapshot access ──────────────────────────────────────────────

    /// The current index. Cheap: clones an `Arc`.
    pub fn index(&self) -> Arc<EntityIndex> {
        self.index.borrow().clone()
    }

    pub fn payloads(&self) -> Option<Arc<RawPayloads>> {
        self.payloads.borrow().clone()
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Publish a freshly built index, replacing the previous one whole.
    pub(crate) fn replace(&self, index: EntityIndex, payloads: RawPayloads) {
        let fetched_at = payloads.fetched_at;
        self.payloads.send_replace(Some(Arc::new(payloads)));
        self.index.send_replace(Arc::new(index));
        self.last_full_refresh.send_replace(Some(fetched_at));
        self.notify();
    }

    /// Write an optimistic update into the published index.
    ///
    /// Fails softly (`UnknownDevice` / `WrongDeviceKind`) without
    /// publishing anything when the mutation does not fit.
    pub(crate) fn apply_mutation(
        &self,
        system_id: SystemId,
        mutation: &Mutation,
    ) -> Result<(), CoreError> {
        let mut outcome = Ok(());
        self.index.send_if_modified(|current| {
            match current.preview_mutation(system_id, mutation) {
                Ok(_) => {
                    outcome = Arc::make_mut(current).apply_mutation(system_id, mutation);
                    outcome.is_ok()
                }
                Err(e) => {
                    outcome = Err(e);
                    false
                }
            }
        });
        if outcome.is_ok() {
            self.notify();
        }
        outcome
    }

    // ── Listeners ────────────────────────────────────────────────────

    pub fn subscribe(&self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        self.listeners.insert(id, listener);
        id
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    /// A `watch`-backed stream of index snapshots.
    pub fn watch(&self) -> IndexStream {
        IndexStream::new(self.index.subscribe())
    }

    /// Callbacks plus live streams.
    pub fn listener_count(&self) -> usize {
        self.listeners.len() + self.index.receiver_count()
    }

    fn notify(&self) {
        // Collect first: a callback may subscribe or unsubscribe.
        let listeners: Vec<Listener> = self
            .listeners
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        if listeners.is_empty() {
            return;
        }
        let index = self.index();
        for listener in listeners {
            listener(&index);
        }
    }

    // ── Metadata ─────────────────────────────────────────────────────

    pub fn last_full_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_full_refresh.borrow()
    }
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new()
    }
}
