// ── Reactive index store ──
//
// Holds the published entity index and pushes changes to listeners.

mod data_store;

pub use data_store::{DataStore, Listener, ListenerId, RawPayloads};
