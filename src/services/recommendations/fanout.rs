//! Similarity fan-out: one concurrent lookup per seed title

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;

use super::wave::{settle, Settled};
use crate::services::providers::SimilarityProvider;

/// Outcome of one seed's similarity lookup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimilarityResult {
    pub success: bool,
    pub candidate_titles: Vec<String>,
}

impl SimilarityResult {
    pub fn found(candidate_titles: Vec<String>) -> Self {
        Self {
            success: true,
            candidate_titles,
        }
    }

    pub fn failed() -> Self {
        Self::default()
    }
}

/// Looks up similar titles for every seed at once.
///
/// Returns one result per seed, in seed order. A seed whose lookup errors or outlives
/// `timeout` yields [`SimilarityResult::failed`]; the other seeds are unaffected.
pub async fn fan_out(
    provider: &Arc<dyn SimilarityProvider>,
    seeds: &[String],
    limit: usize,
    timeout: Duration,
) -> Vec<SimilarityResult> {
    let lookups: Vec<_> = seeds
        .iter()
        .map(|seed| {
            let provider = Arc::clone(provider);
            let seed = seed.clone();
            tokio::spawn(async move { provider.similar_titles(&seed, limit).await })
        })
        .collect();

    let settled = join_all(lookups.into_iter().map(|handle| settle(handle, timeout))).await;

    seeds
        .iter()
        .zip(settled)
        .map(|(seed, outcome)| match outcome {
            Settled::Ready(titles) => {
                tracing::debug!(seed = %seed, candidates = titles.len(), "Similarity lookup succeeded");
                SimilarityResult::found(titles)
            }
            Settled::Failed(e) => {
                tracing::warn!(seed = %seed, error = %e, "Similarity lookup failed");
                SimilarityResult::failed()
            }
            Settled::TimedOut => {
                tracing::warn!(seed = %seed, timeout_ms = timeout.as_millis() as u64, "Similarity lookup timed out");
                SimilarityResult::failed()
            }
        })
        .collect()
}
