// ============================================================================
// OMDb API Types
// ============================================================================

use serde::Deserialize;

use super::movie::{parse_genres, MediaType, MovieDetail, MovieId, MovieSummary};

/// Placeholder OMDb uses for fields it has no value for
const NOT_AVAILABLE: &str = "N/A";

/// Raw OMDb record, shared by title/id lookups and search entries
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OmdbMovie {
    #[serde(rename = "Title", default)]
    pub title: Option<String>,
    #[serde(rename = "Year", default)]
    pub year: Option<String>,
    #[serde(rename = "imdbID", default)]
    pub imdb_id: Option<String>,
    #[serde(rename = "Type", default)]
    pub media_type: Option<String>,
    #[serde(rename = "Poster", default)]
    pub poster: Option<String>,
    #[serde(rename = "Plot", default)]
    pub plot: Option<String>,
    #[serde(rename = "Genre", default)]
    pub genre: Option<String>,
    /// "True" or "False"; errors are reported in-band
    #[serde(rename = "Response", default)]
    pub response: Option<String>,
    #[serde(rename = "Error", default)]
    pub error: Option<String>,
}

impl OmdbMovie {
    pub fn is_success(&self) -> bool {
        self.response.as_deref() == Some("True")
    }
}

/// Raw OMDb search response (`s=` query)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OmdbSearchResponse {
    #[serde(rename = "Search", default)]
    pub search: Vec<OmdbMovie>,
    #[serde(rename = "totalResults", default)]
    pub total_results: Option<String>,
    #[serde(rename = "Response", default)]
    pub response: Option<String>,
    #[serde(rename = "Error", default)]
    pub error: Option<String>,
}

impl OmdbSearchResponse {
    pub fn is_success(&self) -> bool {
        self.response.as_deref() == Some("True")
    }

    pub fn total_results(&self) -> u32 {
        self.total_results
            .as_deref()
            .and_then(|n| n.parse().ok())
            .unwrap_or(0)
    }
}

/// Why an OMDb record could not be turned into a catalog entry
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedRecord {
    #[error("record has no IMDb id")]
    MissingId,
    #[error("record has no title")]
    MissingTitle,
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && v != NOT_AVAILABLE)
}

impl TryFrom<OmdbMovie> for MovieSummary {
    type Error = MalformedRecord;

    fn try_from(movie: OmdbMovie) -> Result<Self, Self::Error> {
        let id = present(movie.imdb_id).ok_or(MalformedRecord::MissingId)?;
        let title = present(movie.title).ok_or(MalformedRecord::MissingTitle)?;

        Ok(MovieSummary {
            id: MovieId::new(id),
            title,
            year: present(movie.year).unwrap_or_default(),
            poster_url: present(movie.poster),
            media_type: movie
                .media_type
                .as_deref()
                .map(MediaType::from_label)
                .unwrap_or_default(),
        })
    }
}

impl TryFrom<OmdbMovie> for MovieDetail {
    type Error = MalformedRecord;

    fn try_from(mut movie: OmdbMovie) -> Result<Self, Self::Error> {
        let plot = present(movie.plot.take());
        let genres = present(movie.genre.take())
            .map(|g| parse_genres(&g))
            .unwrap_or_default();

        Ok(MovieDetail {
            summary: MovieSummary::try_from(movie)?,
            plot,
            genres,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_deserialization() {
        let json = r#"{
            "Title": "Inception",
            "Year": "2010",
            "Genre": "Action, Adventure, Sci-Fi",
            "Plot": "A thief who steals corporate secrets.",
            "Poster": "https://m.media-amazon.com/images/inception.jpg",
            "imdbID": "tt1375666",
            "Type": "movie",
            "Response": "True"
        }"#;

        let raw: OmdbMovie = serde_json::from_str(json).unwrap();
        assert!(raw.is_success());

        let detail = MovieDetail::try_from(raw).unwrap();
        assert_eq!(detail.id(), &MovieId::new("tt1375666"));
        assert_eq!(detail.title(), "Inception");
        assert_eq!(detail.summary.year, "2010");
        assert_eq!(detail.genres, vec!["Action", "Adventure", "Sci-Fi"]);
        assert_eq!(
            detail.plot.as_deref(),
            Some("A thief who steals corporate secrets.")
        );
    }

    #[test]
    fn test_in_band_error() {
        let raw: OmdbMovie =
            serde_json::from_str(r#"{"Response":"False","Error":"Movie not found!"}"#).unwrap();
        assert!(!raw.is_success());
        assert_eq!(raw.error.as_deref(), Some("Movie not found!"));
    }

    #[test]
    fn test_not_available_fields_are_dropped() {
        let raw = OmdbMovie {
            title: Some("Obscure Short".to_string()),
            imdb_id: Some("tt0000001".to_string()),
            poster: Some("N/A".to_string()),
            plot: Some("N/A".to_string()),
            genre: Some("N/A".to_string()),
            media_type: Some("episode".to_string()),
            ..Default::default()
        };

        let detail = MovieDetail::try_from(raw).unwrap();
        assert_eq!(detail.summary.poster_url, None);
        assert_eq!(detail.plot, None);
        assert!(detail.genres.is_empty());
        assert_eq!(detail.summary.media_type, MediaType::Episode);
    }

    #[test]
    fn test_malformed_records_rejected() {
        let no_id = OmdbMovie {
            title: Some("Nameless".to_string()),
            ..Default::default()
        };
        assert_eq!(
            MovieSummary::try_from(no_id).unwrap_err(),
            MalformedRecord::MissingId
        );

        let blank_title = OmdbMovie {
            title: Some("  ".to_string()),
            imdb_id: Some("tt0000002".to_string()),
            ..Default::default()
        };
        assert_eq!(
            MovieDetail::try_from(blank_title).unwrap_err(),
            MalformedRecord::MissingTitle
        );
    }

    #[test]
    fn test_search_response_total() {
        let json = r#"{
            "Search": [
                {"Title": "The Lord of the Rings", "Year": "2001", "imdbID": "tt0120737", "Type": "movie", "Poster": "N/A"}
            ],
            "totalResults": "42",
            "Response": "True"
        }"#;

        let response: OmdbSearchResponse = serde_json::from_str(json).unwrap();
        assert!(response.is_success());
        assert_eq!(response.total_results(), 42);
        assert_eq!(response.search.len(), 1);
    }
}
