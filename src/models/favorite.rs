use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::movie::{MediaType, MovieId, MovieSummary};

/// A saved favorite as it arrives from a client or a store.
///
/// Records come in two shapes: catalog-style (`imdbID`, `Title`, `Poster`, ...) and
/// store-style (`imdb_id`, `movie_title`, `movie_poster`, ...). Title fields are kept
/// apart so a reader can walk them in a fixed order, see [`FavoriteRecord::seed_title`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FavoriteRecord {
    #[serde(rename = "imdb_id", alias = "imdbID", default)]
    pub imdb_id: Option<String>,
    #[serde(rename = "Title", default, skip_serializing_if = "Option::is_none")]
    pub display_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movie_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "movie_poster", alias = "Poster", default)]
    pub poster: Option<String>,
    #[serde(rename = "movie_year", alias = "Year", default)]
    pub year: Option<String>,
    #[serde(rename = "movie_type", alias = "Type", default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub added_at: Option<DateTime<Utc>>,
}

impl FavoriteRecord {
    pub fn id(&self) -> Option<MovieId> {
        self.imdb_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(MovieId::new)
    }

    /// First non-blank title among `Title`, `movie_title`, `title`
    pub fn seed_title(&self) -> Option<&str> {
        [&self.display_title, &self.movie_title, &self.title]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|t| !t.trim().is_empty())
    }

    /// Normalized view; `None` when the record lacks an id or a title
    pub fn to_summary(&self) -> Option<MovieSummary> {
        Some(MovieSummary {
            id: self.id()?,
            title: self.seed_title()?.to_string(),
            year: self.year.clone().unwrap_or_default(),
            poster_url: self.poster.clone().filter(|p| !p.trim().is_empty()),
            media_type: self
                .media_type
                .as_deref()
                .map(MediaType::from_label)
                .unwrap_or_default(),
        })
    }
}

impl From<&MovieSummary> for FavoriteRecord {
    fn from(movie: &MovieSummary) -> Self {
        Self {
            imdb_id: Some(movie.id.to_string()),
            movie_title: Some(movie.title.clone()),
            poster: movie.poster_url.clone(),
            year: Some(movie.year.clone()),
            media_type: Some(movie.media_type.as_label().to_string()),
            ..Default::default()
        }
    }
}

/// Read-only view of the favorites collection for one recommendation run
#[derive(Debug, Clone, Default)]
pub struct FavoritesSnapshot {
    records: Vec<FavoriteRecord>,
    ids: HashSet<MovieId>,
}

impl FavoritesSnapshot {
    pub fn from_records(records: Vec<FavoriteRecord>) -> Self {
        let ids = records.iter().filter_map(FavoriteRecord::id).collect();
        Self { records, ids }
    }

    pub fn records(&self) -> &[FavoriteRecord] {
        &self.records
    }

    pub fn contains(&self, id: &MovieId) -> bool {
        self.ids.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Keeps only the chosen favorites as seeds, in stored order.
    ///
    /// An empty selection keeps everything. Exclusion still covers every favorite.
    pub fn restrict_to(mut self, selected: &[MovieId]) -> Self {
        if !selected.is_empty() {
            self.records
                .retain(|record| record.id().is_some_and(|id| selected.contains(&id)));
        }
        self
    }
}
