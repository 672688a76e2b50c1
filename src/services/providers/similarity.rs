/// Similarity backend provider
///
/// Wraps `GET /api/ml/recommendations/similar?title=<t>&limit=<n>`, which answers
/// `{ "success": bool, "similar_movies": [{ "title": ... }, ...], "error": ... }`.
/// The backend matches titles fuzzily on its side; this client forwards them verbatim.
use reqwest::Client as HttpClient;
use serde::Deserialize;

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    services::providers::SimilarityProvider,
};

const SIMILAR_CACHE_TTL: u64 = 1800; // 30 minutes

#[derive(Debug, Deserialize)]
struct SimilarResponse {
    success: bool,
    #[serde(default)]
    similar_movies: Vec<SimilarMovie>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SimilarMovie {
    title: String,
}

impl SimilarResponse {
    fn into_titles(self, limit: usize) -> AppResult<Vec<String>> {
        if !self.success {
            return Err(AppError::ExternalApi(format!(
                "Similarity backend failed: {}",
                self.error.unwrap_or_else(|| "unknown error".to_string())
            )));
        }

        Ok(self
            .similar_movies
            .into_iter()
            .map(|movie| movie.title)
            .take(limit)
            .collect())
    }
}

#[derive(Clone)]
pub struct SimilarityClient {
    http_client: HttpClient,
    api_url: String,
    cache: Option<Cache>,
}

impl SimilarityClient {
    pub fn new(http_client: HttpClient, api_url: String, cache: Option<Cache>) -> Self {
        Self {
            http_client,
            api_url: api_url.trim_end_matches('/').to_string(),
            cache,
        }
    }

    async fn fetch_similar(&self, title: &str, limit: usize) -> AppResult<Vec<String>> {
        let url = format!("{}/api/ml/recommendations/similar", self.api_url);
        let limit_param = limit.to_string();

        let response = self
            .http_client
            .get(&url)
            .query(&[("title", title), ("limit", limit_param.as_str())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        // The backend answers 400 with a regular body when it cannot match the title
        let parsed: SimilarResponse = serde_json::from_str(&body).map_err(|e| {
            AppError::ExternalApi(format!(
                "Similarity backend returned status {} with unreadable body: {}",
                status, e
            ))
        })?;

        let titles = parsed.into_titles(limit)?;
        tracing::debug!(seed = %title, results = titles.len(), "Similar titles fetched");
        Ok(titles)
    }
}

#[async_trait::async_trait]
impl SimilarityProvider for SimilarityClient {
    async fn similar_titles(&self, title: &str, limit: usize) -> AppResult<Vec<String>> {
        cached!(
            self.cache.as_ref(),
            CacheKey::Similar(title.to_string(), limit),
            SIMILAR_CACHE_TTL,
            self.fetch_similar(title, limit)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_titles_in_order() {
        let json = r#"{
            "success": true,
            "movie_title": "Alien",
            "similar_movies": [
                {"title": "Aliens", "similarity_score": 0.91},
                {"title": "Prometheus", "similarity_score": 0.84},
                {"title": "Life", "similarity_score": 0.77}
            ]
        }"#;

        let response: SimilarResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            response.into_titles(10).unwrap(),
            vec!["Aliens", "Prometheus", "Life"]
        );
    }

    #[test]
    fn test_response_respects_limit() {
        let json = r#"{"success": true, "similar_movies": [{"title": "A"}, {"title": "B"}, {"title": "C"}]}"#;
        let response: SimilarResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.into_titles(2).unwrap(), vec!["A", "B"]);
    }

    #[test]
    fn test_unsuccessful_response_is_error() {
        let json = r#"{"success": false, "error": "Movie not found", "similar_movies": []}"#;
        let response: SimilarResponse = serde_json::from_str(json).unwrap();

        let err = response.into_titles(5).unwrap_err();
        assert!(err.to_string().contains("Movie not found"));
    }

    #[test]
    fn test_missing_list_defaults_to_empty() {
        let response: SimilarResponse = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(response.into_titles(5).unwrap().is_empty());
    }
}
