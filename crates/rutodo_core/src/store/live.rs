//! Live (auto-refreshing) queries over the store.
//!
//! # Invariants
//! - The first `next()` resolves immediately with the current result.
//! - Later calls resolve once per observed revision change; bursts of
//!   writes between two calls collapse into one re-query.
//! - `next()` is cancel-safe: a change observed by a dropped call is
//!   re-queried by the following call instead of being lost.

use super::{join_worker, StoreError, StoreInner, StoreResult};
use crate::repo::RepoResult;
use rusqlite::Connection;
use std::sync::Arc;
use tokio::sync::watch;

type QueryFn<T> = Arc<dyn Fn(&Connection) -> RepoResult<T> + Send + Sync>;

/// A query re-run every time the store reports a data change.
pub struct LiveQuery<T> {
    inner: Arc<StoreInner>,
    changes: watch::Receiver<u64>,
    query: QueryFn<T>,
    label: &'static str,
    stale: bool,
}

impl<T: Send + 'static> LiveQuery<T> {
    pub(super) fn new(
        inner: Arc<StoreInner>,
        label: &'static str,
        query: impl Fn(&Connection) -> RepoResult<T> + Send + Sync + 'static,
    ) -> Self {
        let changes = inner.subscribe();
        Self {
            inner,
            changes,
            query: Arc::new(query),
            label,
            stale: true,
        }
    }

    /// Waits for the next snapshot.
    pub async fn next(&mut self) -> StoreResult<T> {
        if !self.stale {
            self.changes
                .changed()
                .await
                .map_err(|_| StoreError::Worker("change feed closed".to_string()))?;
            self.stale = true;
        }
        self.changes.borrow_and_update();

        let inner = Arc::clone(&self.inner);
        let query = Arc::clone(&self.query);
        let label = self.label;
        let result = join_worker(
            tokio::task::spawn_blocking(move || inner.read(label, |conn| query(conn))).await,
        );
        self.stale = false;
        result
    }
}
