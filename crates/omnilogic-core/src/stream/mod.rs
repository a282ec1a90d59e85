// ── Reactive index streams ──
//
// Subscription type for consuming index changes from the DataStore.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::index::EntityIndex;

/// A subscription to the published index.
///
/// Provides both point-in-time snapshot access and reactive change
/// notification via the `changed()` method or by converting to a `Stream`.
/// While alive it counts as a listener, which keeps polling running.
pub struct IndexStream {
    current: Arc<EntityIndex>,
    receiver: watch::Receiver<Arc<EntityIndex>>,
}

impl IndexStream {
    pub(crate) fn new(receiver: watch::Receiver<Arc<EntityIndex>>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// Get the snapshot captured at creation time (or at the last `changed()`).
    pub fn current(&self) -> &Arc<EntityIndex> {
        &self.current
    }

    /// Get the latest snapshot (may have changed since creation).
    pub fn latest(&self) -> Arc<EntityIndex> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next change, returning the new snapshot.
    /// Returns `None` if the store has been dropped.
    pub async fn changed(&mut self) -> Option<Arc<EntityIndex>> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    pub fn into_stream(self) -> IndexWatchStream {
        IndexWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
///
/// Yields the current snapshot first, then a new one each time the
/// index is replaced or mutated.
pub struct IndexWatchStream {
    inner: WatchStream<Arc<EntityIndex>>,
}

impl Stream for IndexWatchStream {
    type Item = Arc<EntityIndex>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bytes::Bytes;
    use chrono::Utc;
    use futures_util::StreamExt;
    use tokio_test::{assert_pending, assert_ready, task};

    use crate::model::RelayState;
    use crate::mutation::{Mutation, TelemetryField};
    use crate::parse::{parse_config, parse_telemetry};
    use crate::store::{DataStore, RawPayloads};

    use super::*;

    const CONFIG: &[u8] = br"<MSPConfig><Backyard>
        <System-Id>0</System-Id>
        <Relay><System-Id>42</System-Id></Relay>
    </Backyard></MSPConfig>";

    const STATUS: &[u8] =
        br#"<STATUS><Backyard systemId="0" state="1"/><Relay systemId="42" relayState="0"/></STATUS>"#;

    fn load(store: &DataStore) {
        let index = EntityIndex::from_payloads(
            &parse_config(CONFIG).unwrap(),
            &parse_telemetry(STATUS).unwrap(),
        );
        store.replace(
            index,
            RawPayloads {
                configuration: Bytes::from_static(CONFIG),
                telemetry: Bytes::from_static(STATUS),
                fetched_at: Utc::now(),
            },
        );
    }

    #[test]
    fn changed_waits_for_the_next_publish() {
        let store = DataStore::new();
        let mut stream = store.watch();
        assert!(stream.current().is_empty());

        let mut changed = task::spawn(stream.changed());
        assert_pending!(changed.poll());

        load(&store);
        assert!(changed.is_woken());
        let snapshot = assert_ready!(changed.poll()).unwrap();
        assert_eq!(snapshot.len(), 2);
    }

    #[test]
    fn latest_sees_changes_current_does_not() {
        let store = DataStore::new();
        let stream = store.watch();
        load(&store);

        assert!(stream.current().is_empty());
        assert_eq!(stream.latest().len(), 2);
    }

    #[tokio::test]
    async fn stream_yields_snapshot_then_mutations() {
        let store = DataStore::new();
        load(&store);
        let mut updates = store.watch().into_stream();

        let first = updates.next().await.unwrap();
        assert_eq!(first.len(), 2);

        let mutation = Mutation::new().telemetry(TelemetryField::RelayState(RelayState::On));
        store.apply_mutation(42, &mutation).unwrap();

        let second = updates.next().await.unwrap();
        assert_ne!(*first, *second);
    }
}
