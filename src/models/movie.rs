use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// IMDb identifier of a movie, series, or episode (e.g. "tt0133093")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovieId(String);

impl MovieId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for MovieId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MovieId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Kind of catalog entry
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[default]
    Movie,
    Series,
    Episode,
}

impl MediaType {
    /// Maps a catalog label to a media type, treating unknown labels as movies
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "series" | "tv_series" => MediaType::Series,
            "episode" => MediaType::Episode,
            _ => MediaType::Movie,
        }
    }

    pub fn as_label(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Series => "series",
            MediaType::Episode => "episode",
        }
    }
}

/// Compact catalog entry, as shown in search results and favorites
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieSummary {
    pub id: MovieId,
    pub title: String,
    pub year: String,
    pub poster_url: Option<String>,
    #[serde(rename = "type")]
    pub media_type: MediaType,
}

/// Full record produced by a successful detail lookup
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieDetail {
    #[serde(flatten)]
    pub summary: MovieSummary,
    pub plot: Option<String>,
    /// Ordered, duplicate-free genre labels
    pub genres: Vec<String>,
}

impl MovieDetail {
    pub fn id(&self) -> &MovieId {
        &self.summary.id
    }

    pub fn title(&self) -> &str {
        &self.summary.title
    }

    /// A record is usable only with a non-blank id and title
    pub fn is_well_formed(&self) -> bool {
        !self.summary.id.as_str().trim().is_empty() && !self.summary.title.trim().is_empty()
    }
}

/// Splits a comma separated genre list into an ordered set
pub fn parse_genres(raw: &str) -> Vec<String> {
    let mut genres: Vec<String> = Vec::new();
    for genre in raw.split(',').map(str::trim).filter(|g| !g.is_empty()) {
        if !genres.iter().any(|existing| existing == genre) {
            genres.push(genre.to_string());
        }
    }
    genres
}

/// Narrowing applied by the catalog itself
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    /// Defaults to movies when unset
    #[serde(rename = "type", default)]
    pub media_type: Option<MediaType>,
    /// Release year, e.g. "1999"
    #[serde(default)]
    pub year: Option<String>,
}

impl SearchFilters {
    pub fn media_type(&self) -> MediaType {
        self.media_type.unwrap_or_default()
    }

    /// Year with blanks treated as unset
    pub fn year(&self) -> Option<&str> {
        self.year.as_deref().map(str::trim).filter(|y| !y.is_empty())
    }

    /// Stable text form, used in cache keys
    pub fn tag(&self) -> String {
        format!("{}:{}", self.media_type().as_label(), self.year().unwrap_or("any"))
    }
}

/// Ordering applied to one page of search results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Catalog order
    #[default]
    Relevance,
    /// Newest first; entries without a year go last
    Year,
    /// Case-insensitive A to Z
    Title,
}

/// Leading four digits of a year label such as "2010" or "2008–2013"
fn release_year(movie: &MovieSummary) -> Option<u32> {
    movie.year.get(..4).and_then(|y| y.parse().ok())
}

/// One page of catalog search results
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchPage {
    pub movies: Vec<MovieSummary>,
    pub total_results: u32,
    pub page: u32,
    pub total_pages: u32,
}

impl SearchPage {
    /// Catalog pages hold ten entries
    pub const PAGE_SIZE: u32 = 10;

    pub fn new(movies: Vec<MovieSummary>, total_results: u32, page: u32) -> Self {
        Self {
            movies,
            total_results,
            page,
            total_pages: total_results.div_ceil(Self::PAGE_SIZE),
        }
    }

    /// Reorders the entries of this page; totals are unaffected
    pub fn sorted(mut self, order: SortOrder) -> Self {
        match order {
            SortOrder::Relevance => {}
            SortOrder::Year => self
                .movies
                .sort_by_key(|movie| std::cmp::Reverse(release_year(movie))),
            SortOrder::Title => self
                .movies
                .sort_by_cached_key(|movie| movie.title.to_lowercase()),
        }
        self
    }
}
