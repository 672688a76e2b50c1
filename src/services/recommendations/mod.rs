//! Recommendation pipeline
//!
//! A run walks four stages in order: seed selection from the favorites, a concurrent
//! similarity fan-out per seed, a merge of the returned titles into one capped candidate
//! list, and detail resolution of those candidates in sequential batches. After every
//! batch the cumulative result is published as a [`RecommendationSnapshot`], so callers
//! can show a growing list before the run is over.
//!
//! Only run-level problems surface as [`RecommendationError`]; a failing or slow lookup
//! merely contributes nothing.
use std::fmt::Display;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use async_stream::stream;
use futures::{Stream, StreamExt};
use serde::Serialize;

use crate::{
    models::{FavoritesSnapshot, MovieDetail},
    services::providers::{DetailProvider, SimilarityProvider},
};

pub mod batcher;
pub mod fanout;
pub mod merger;
pub mod selector;
mod wave;

pub use batcher::{resolve_batch, PublishedSet};
pub use fanout::{fan_out, SimilarityResult};
pub use merger::{merge_candidates, CandidateSet};
pub use selector::select_seeds;

/// Tuning knobs for one pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// How many favorites seed the similarity fan-out
    pub seed_count: usize,
    /// Similar titles requested per seed
    pub per_seed_candidate_limit: usize,
    /// Upper bound on merged candidates
    pub candidate_cap: usize,
    /// Detail lookups issued together
    pub batch_size: usize,
    pub fanout_timeout_ms: u64,
    pub detail_timeout_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            seed_count: 5,
            per_seed_candidate_limit: 8,
            candidate_cap: 30,
            batch_size: 8,
            fanout_timeout_ms: 8000,
            detail_timeout_ms: 5000,
        }
    }
}

impl PipelineConfig {
    pub fn fanout_timeout(&self) -> Duration {
        Duration::from_millis(self.fanout_timeout_ms)
    }

    pub fn detail_timeout(&self) -> Duration {
        Duration::from_millis(self.detail_timeout_ms)
    }

    /// Rejects settings that would make a run meaningless
    pub fn validate(self) -> Result<Self, RecommendationError> {
        let zero = [
            ("seed_count", self.seed_count == 0),
            ("per_seed_candidate_limit", self.per_seed_candidate_limit == 0),
            ("candidate_cap", self.candidate_cap == 0),
            ("batch_size", self.batch_size == 0),
            ("fanout_timeout_ms", self.fanout_timeout_ms == 0),
            ("detail_timeout_ms", self.detail_timeout_ms == 0),
        ];

        match zero.iter().find(|(_, is_zero)| *is_zero) {
            Some((name, _)) => Err(RecommendationError::InvalidConfig(format!(
                "{} must be greater than zero",
                name
            ))),
            None => Ok(self),
        }
    }
}

/// Conditions that abort a whole run
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecommendationError {
    #[error("Cannot compute recommendations: no favorites to start from")]
    NoFavorites,

    #[error("Cannot compute recommendations: no favorite has a usable title")]
    NoSeedTitles,

    #[error("Invalid recommendation settings: {0}")]
    InvalidConfig(String),
}

/// Where a run currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    FanningOut,
    Merging,
    /// 1-based batch number
    Batching(usize),
    Done,
}

impl Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineState::Idle => write!(f, "idle"),
            PipelineState::FanningOut => write!(f, "fanning-out"),
            PipelineState::Merging => write!(f, "merging"),
            PipelineState::Batching(k) => write!(f, "batching({})", k),
            PipelineState::Done => write!(f, "done"),
        }
    }
}

/// Cumulative result published after a batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationSnapshot {
    /// 1-based number of the batch just finished
    pub batch: usize,
    pub total_batches: usize,
    pub movies: Vec<MovieDetail>,
}

/// Final result of a run that was not aborted
#[derive(Debug, Clone, PartialEq)]
pub enum RecommendationOutcome {
    Found(Vec<MovieDetail>),
    NoneFound,
}

impl RecommendationOutcome {
    fn from_movies(movies: Vec<MovieDetail>) -> Self {
        if movies.is_empty() {
            RecommendationOutcome::NoneFound
        } else {
            RecommendationOutcome::Found(movies)
        }
    }

    pub fn into_movies(self) -> Vec<MovieDetail> {
        match self {
            RecommendationOutcome::Found(movies) => movies,
            RecommendationOutcome::NoneFound => Vec::new(),
        }
    }
}

/// One item of a run's output; a run always ends with exactly one `Finished`
#[derive(Debug, Clone, PartialEq)]
pub enum RecommendationUpdate {
    Snapshot(RecommendationSnapshot),
    Finished(RecommendationOutcome),
}

pub type RecommendationStream = Pin<Box<dyn Stream<Item = RecommendationUpdate> + Send>>;

/// Runs the recommendation pipeline against a pair of providers
#[derive(Clone)]
pub struct RecommendationEngine {
    similarity: Arc<dyn SimilarityProvider>,
    details: Arc<dyn DetailProvider>,
    config: PipelineConfig,
}

impl RecommendationEngine {
    pub fn new(
        similarity: Arc<dyn SimilarityProvider>,
        details: Arc<dyn DetailProvider>,
        config: PipelineConfig,
    ) -> Result<Self, RecommendationError> {
        Ok(Self {
            similarity,
            details,
            config: config.validate()?,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Starts a run over `favorites`.
    ///
    /// Seeds are chosen before anything is sent, so a run with nothing to seed fails here
    /// without touching a provider. The returned stream yields one snapshot per batch and
    /// then the outcome.
    pub fn compute_recommendations(
        &self,
        favorites: FavoritesSnapshot,
    ) -> Result<RecommendationStream, RecommendationError> {
        if favorites.is_empty() {
            return Err(RecommendationError::NoFavorites);
        }

        let seeds = select_seeds(favorites.records(), self.config.seed_count);
        if seeds.is_empty() {
            return Err(RecommendationError::NoSeedTitles);
        }

        let similarity = Arc::clone(&self.similarity);
        let details = Arc::clone(&self.details);
        let config = self.config;

        let updates = stream! {
            let mut state = PipelineState::Idle;
            tracing::debug!(%state, seeds = seeds.len(), "Recommendation run started");

            state = PipelineState::FanningOut;
            tracing::debug!(%state, "Requesting similar titles");
            let results = fan_out(
                &similarity,
                &seeds,
                config.per_seed_candidate_limit,
                config.fanout_timeout(),
            )
            .await;

            state = PipelineState::Merging;
            let candidates = merge_candidates(&results, config.candidate_cap);
            tracing::debug!(
                %state,
                succeeded = results.iter().filter(|r| r.success).count(),
                candidates = candidates.len(),
                "Similar titles merged"
            );

            let total_batches = candidates.batch_count(config.batch_size);
            let mut published = PublishedSet::new();

            for (index, batch) in candidates.batches(config.batch_size).enumerate() {
                state = PipelineState::Batching(index + 1);
                let slots = resolve_batch(&details, batch, config.detail_timeout()).await;
                let admitted = published.admit(slots, &favorites);

                tracing::debug!(
                    %state,
                    batch = index + 1,
                    admitted,
                    published = published.len(),
                    "Batch resolved"
                );

                yield RecommendationUpdate::Snapshot(RecommendationSnapshot {
                    batch: index + 1,
                    total_batches,
                    movies: published.movies().to_vec(),
                });
            }

            state = PipelineState::Done;
            tracing::info!(
                %state,
                seeds = seeds.len(),
                candidates = candidates.len(),
                published = published.len(),
                "Recommendation run finished"
            );

            yield RecommendationUpdate::Finished(RecommendationOutcome::from_movies(
                published.into_movies(),
            ));
        };

        Ok(Box::pin(updates))
    }

    /// Runs to completion and returns only the outcome
    pub async fn recommend(
        &self,
        favorites: FavoritesSnapshot,
    ) -> Result<RecommendationOutcome, RecommendationError> {
        let mut updates = self.compute_recommendations(favorites)?;
        let mut outcome = RecommendationOutcome::NoneFound;

        while let Some(update) = updates.next().await {
            if let RecommendationUpdate::Finished(finished) = update {
                outcome = finished;
            }
        }

        Ok(outcome)
    }
}
