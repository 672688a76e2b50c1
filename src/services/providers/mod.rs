//! Movie data providers
//!
//! The recommendation pipeline talks to two collaborators: a similarity backend that
//! turns one title into related titles, and a catalog that resolves a title into a full
//! record. Both are traits so the pipeline can be driven by in-process fakes in tests.
//! Implementations report failures as errors; the pipeline stages decide how a failure
//! degrades.
use futures::future::join_all;
use rand::seq::SliceRandom;

use crate::{
    error::AppResult,
    models::{MovieDetail, MovieId, MovieSummary, SearchFilters, SearchPage},
};

pub mod omdb;
pub mod similarity;

pub use omdb::OmdbClient;
pub use similarity::SimilarityClient;

/// Source of "more like this" titles
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SimilarityProvider: Send + Sync {
    /// Titles similar to `title`, best first, at most `limit` of them
    async fn similar_titles(&self, title: &str, limit: usize) -> AppResult<Vec<String>>;
}

/// Resolves a title into a full movie record
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait DetailProvider: Send + Sync {
    /// `Ok(None)` when the catalog has no usable record for the title
    async fn lookup(&self, title: &str) -> AppResult<Option<MovieDetail>>;
}

/// Queries behind the popular listing; page N uses entry N-1, wrapping around
pub const POPULAR_QUERIES: [&str; 4] = ["Avengers", "Batman", "Spider-Man", "Star Wars"];

/// Pool the random listing samples its queries from
pub const RANDOM_QUERIES: [&str; 13] = [
    "Avengers",
    "Batman",
    "Spider-Man",
    "Iron Man",
    "Superman",
    "Wonder Woman",
    "Black Panther",
    "Thor",
    "Captain America",
    "Jurassic Park",
    "Star Wars",
    "Lord of the Rings",
    "Harry Potter",
];

/// Catalog browsing used by the HTTP API
#[async_trait::async_trait]
pub trait MovieCatalog: Send + Sync {
    /// Search titles by free text, one catalog page at a time
    async fn search(
        &self,
        query: &str,
        page: u32,
        filters: &SearchFilters,
    ) -> AppResult<SearchPage>;

    /// Full record by IMDb id
    async fn details_by_id(&self, id: &MovieId) -> AppResult<MovieDetail>;

    /// Browsing page shown before the user searches
    async fn popular(&self, page: u32) -> AppResult<SearchPage> {
        let page = page.max(1);
        let query = POPULAR_QUERIES[(page as usize - 1) % POPULAR_QUERIES.len()];
        self.search(query, page, &SearchFilters::default()).await
    }

    /// Up to `count` movies from a random mix of queries, in random order.
    ///
    /// A query that fails contributes nothing.
    async fn random(&self, count: usize) -> AppResult<SearchPage> {
        let queries = sample_queries(count);
        let filters = SearchFilters::default();

        let pages = join_all(queries.iter().map(|query| self.search(query, 1, &filters))).await;

        let mut movies: Vec<MovieSummary> = Vec::new();
        for (query, page) in queries.iter().zip(pages) {
            match page {
                Ok(page) => movies.extend(page.movies),
                Err(e) => tracing::warn!(query = %query, error = %e, "Random listing query failed"),
            }
        }

        movies.shuffle(&mut rand::rng());
        movies.truncate(count);

        let total = movies.len() as u32;
        Ok(SearchPage {
            total_pages: u32::from(total > 0),
            movies,
            total_results: total,
            page: 1,
        })
    }
}

fn sample_queries(count: usize) -> Vec<&'static str> {
    let mut queries = RANDOM_QUERIES.to_vec();
    queries.shuffle(&mut rand::rng());
    queries.truncate(count.min(RANDOM_QUERIES.len()));
    queries
}
