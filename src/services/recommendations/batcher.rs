//! Detail batching: resolves candidate titles into full records one batch at a time

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;

use super::wave::{settle, Settled};
use crate::models::{FavoritesSnapshot, MovieDetail, MovieId};
use crate::services::providers::DetailProvider;

/// Looks up every title of one batch at once.
///
/// Returns one slot per title, in title order. Misses, failures, and lookups that outlive
/// `timeout` leave their slot empty. Blank titles are never sent to the provider.
pub async fn resolve_batch(
    provider: &Arc<dyn DetailProvider>,
    titles: &[String],
    timeout: Duration,
) -> Vec<Option<MovieDetail>> {
    let lookups: Vec<_> = titles
        .iter()
        .map(|title| {
            let provider = Arc::clone(provider);
            let title = title.clone();
            tokio::spawn(async move {
                if title.trim().is_empty() {
                    return Ok(None);
                }
                provider.lookup(&title).await
            })
        })
        .collect();

    let settled = join_all(lookups.into_iter().map(|handle| settle(handle, timeout))).await;

    titles
        .iter()
        .zip(settled)
        .map(|(title, outcome)| match outcome {
            Settled::Ready(detail) => {
                if detail.is_none() {
                    tracing::debug!(candidate = %title, "No detail record for candidate");
                }
                detail
            }
            Settled::Failed(e) => {
                tracing::warn!(candidate = %title, error = %e, "Detail lookup failed");
                None
            }
            Settled::TimedOut => {
                tracing::warn!(candidate = %title, timeout_ms = timeout.as_millis() as u64, "Detail lookup timed out");
                None
            }
        })
        .collect()
}

/// The growing recommendation list of one run
#[derive(Debug, Clone, Default)]
pub struct PublishedSet {
    movies: Vec<MovieDetail>,
    ids: HashSet<MovieId>,
}

impl PublishedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the batch's usable records, returning how many were admitted.
    ///
    /// A record is dropped when it is malformed, already a favorite, or already published.
    pub fn admit(
        &mut self,
        batch: Vec<Option<MovieDetail>>,
        favorites: &FavoritesSnapshot,
    ) -> usize {
        let before = self.movies.len();

        for detail in batch.into_iter().flatten() {
            if !detail.is_well_formed() {
                tracing::debug!(title = %detail.title(), "Skipping malformed record");
                continue;
            }
            if favorites.contains(detail.id()) {
                tracing::debug!(id = %detail.id(), "Skipping candidate already in favorites");
                continue;
            }
            if self.ids.insert(detail.id().clone()) {
                self.movies.push(detail);
            }
        }

        self.movies.len() - before
    }

    pub fn movies(&self) -> &[MovieDetail] {
        &self.movies
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    pub fn into_movies(self) -> Vec<MovieDetail> {
        self.movies
    }
}
