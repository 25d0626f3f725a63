//! Batched create and delete.
//!
//! Batch operations never fail as a whole: each input item gets its own
//! `Result` at the same index in the output, and one item's failure does
//! not stop the others.

use futures_util::stream::{self, StreamExt};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::client::Client;
use crate::error::Error;

impl Client {
    /// Create one resource per item under `path`, in order.
    ///
    /// The result has the same length and order as `items`.
    #[instrument(skip(self, items), fields(count = items.len()))]
    pub async fn post_all(&self, path: &str, items: &[Value]) -> Vec<Result<Value, Error>> {
        let mut results = Vec::with_capacity(items.len());
        for item in items {
            results.push(self.post(path, item).await);
        }
        log_summary(&results);
        results
    }

    /// Delete each path, in order.
    ///
    /// The result has the same length and order as `paths`.
    #[instrument(skip(self, paths), fields(count = paths.len()))]
    pub async fn delete_all<S: AsRef<str>>(&self, paths: &[S]) -> Vec<Result<(), Error>> {
        let mut results = Vec::with_capacity(paths.len());
        for path in paths {
            results.push(self.delete(path.as_ref()).await);
        }
        log_summary(&results);
        results
    }

    /// Like [`Client::post_all`], with up to `limit` requests in flight.
    #[instrument(skip(self, items), fields(count = items.len()))]
    pub async fn post_all_concurrent(
        &self,
        path: &str,
        items: &[Value],
        limit: usize,
    ) -> Vec<Result<Value, Error>> {
        let results: Vec<_> = stream::iter(items.iter().map(|item| self.post(path, item)))
            .buffered(limit.max(1))
            .collect()
            .await;
        log_summary(&results);
        results
    }

    /// Like [`Client::delete_all`], with up to `limit` requests in flight.
    #[instrument(skip(self, paths), fields(count = paths.len()))]
    pub async fn delete_all_concurrent<S: AsRef<str>>(
        &self,
        paths: &[S],
        limit: usize,
    ) -> Vec<Result<(), Error>> {
        let results: Vec<_> = stream::iter(paths.iter().map(|path| self.delete(path.as_ref())))
            .buffered(limit.max(1))
            .collect()
            .await;
        log_summary(&results);
        results
    }
}

/// Success and failure counts of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: usize,
    /// Indices of failed items, ascending.
    pub failed: Vec<usize>,
}

impl BatchSummary {
    pub fn of<T>(results: &[Result<T, Error>]) -> Self {
        let failed: Vec<usize> = results
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_err())
            .map(|(i, _)| i)
            .collect();
        Self {
            succeeded: results.len() - failed.len(),
            failed,
        }
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

fn log_summary<T>(results: &[Result<T, Error>]) {
    let summary = BatchSummary::of(results);
    debug!(
        succeeded = summary.succeeded,
        failed = summary.failed.len(),
        "Batch finished"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;

    fn failure() -> Error {
        TransportError::Http {
            message: "boom".into(),
        }
        .into()
    }

    #[test]
    fn summary_counts_failures_by_index() {
        let results: Vec<Result<(), Error>> = vec![Ok(()), Err(failure()), Ok(()), Err(failure())];
        let summary = BatchSummary::of(&results);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, vec![1, 3]);
        assert!(!summary.all_succeeded());
    }

    #[test]
    fn empty_batch_succeeds() {
        let summary = BatchSummary::of::<Value>(&[]);
        assert_eq!(summary.succeeded, 0);
        assert!(summary.all_succeeded());
    }
}
