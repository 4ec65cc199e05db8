//! In-memory stores
//!
//! - [`SubscriberStore`]: subscribers, tags, recovery notes, attachments, castings
//! - [`SalesStore`]: plans, promotions, videos, sales, casting ↔ project links
//! - [`ProjectStore`]: production projects
//!
//! Each store owns its state behind one lock. A mutation works on a copy of
//! the state and swaps it in only when every step succeeded, so a rejected
//! operation never leaves a half-applied change behind.

pub mod delivery;
pub mod project;
pub mod sales;
pub mod subscriber;

pub use project::ProjectStore;
pub use sales::SalesStore;
pub use subscriber::SubscriberStore;

use crate::storage::SnapshotStorage;
use parking_lot::RwLock;
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::AppResult;

/// Store state plus its optional snapshot backing
pub(crate) struct StateCell<S> {
    state: RwLock<S>,
    storage: Option<SnapshotStorage>,
    key: &'static str,
}

impl<S> StateCell<S>
where
    S: Clone + Default + Serialize + DeserializeOwned,
{
    pub(crate) fn in_memory(key: &'static str) -> Self {
        Self {
            state: RwLock::new(S::default()),
            storage: None,
            key,
        }
    }

    /// Load the last snapshot (or start empty) and keep writing through
    pub(crate) fn open(key: &'static str, storage: SnapshotStorage) -> AppResult<Self> {
        let state = storage.load::<S>(key)?.unwrap_or_default();
        tracing::debug!(store = key, "Store snapshot loaded");
        Ok(Self {
            state: RwLock::new(state),
            storage: Some(storage),
            key,
        })
    }

    pub(crate) fn read<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.state.read())
    }

    /// Run `op` against a copy of the state and commit it on success
    pub(crate) fn mutate<R>(&self, op: impl FnOnce(&mut S) -> AppResult<R>) -> AppResult<R> {
        let mut guard = self.state.write();
        let mut next = guard.clone();
        let out = op(&mut next)?;
        *guard = next;
        self.persist(&guard);
        Ok(out)
    }

    fn persist(&self, state: &S) {
        let Some(storage) = &self.storage else {
            return;
        };
        if let Err(e) = storage.save(self.key, state) {
            tracing::error!(store = self.key, error = %e, "Failed to persist store snapshot");
        }
    }
}
