/// OMDb catalog provider
///
/// One endpoint, three query shapes:
/// 1. Search: `?s=<query>&page=<n>&type=<kind>[&y=<year>]` → list of compact entries
/// 2. By title: `?t=<title>` → single record, used by the recommendation pipeline
/// 3. By id: `?i=<imdb id>&plot=full` → single record, used by the detail page
///
/// OMDb answers HTTP 200 even for misses and reports them in-band through
/// `Response: "False"` plus an `Error` message.
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{
        MovieDetail, MovieId, MovieSummary, OmdbMovie, OmdbSearchResponse, SearchFilters,
        SearchPage,
    },
    services::providers::{DetailProvider, MovieCatalog},
};

const SEARCH_CACHE_TTL: u64 = 3600; // 1 hour
const DETAIL_CACHE_TTL: u64 = 86400; // 1 day

#[derive(Clone)]
pub struct OmdbClient {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    cache: Option<Cache>,
}

impl OmdbClient {
    pub fn new(
        http_client: HttpClient,
        api_key: String,
        api_url: String,
        cache: Option<Cache>,
    ) -> Self {
        Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            cache,
        }
    }

    async fn query<T: DeserializeOwned>(&self, params: &[(&str, &str)]) -> AppResult<T> {
        let response = self
            .http_client
            .get(format!("{}/", self.api_url))
            .query(&[("apikey", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "OMDb returned status {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }

    async fn fetch_by_title(&self, title: &str) -> AppResult<Option<MovieDetail>> {
        let movie: OmdbMovie = self.query(&[("t", title), ("plot", "short")]).await?;
        Ok(Self::into_detail(movie, title))
    }

    async fn fetch_by_id(&self, id: &MovieId) -> AppResult<Option<MovieDetail>> {
        let movie: OmdbMovie = self.query(&[("i", id.as_str()), ("plot", "full")]).await?;
        Ok(Self::into_detail(movie, id.as_str()))
    }

    async fn fetch_search(
        &self,
        query: &str,
        page: u32,
        filters: &SearchFilters,
    ) -> AppResult<SearchPage> {
        let page_param = page.to_string();
        let response: OmdbSearchResponse = self
            .query(&Self::search_params(query, &page_param, filters))
            .await?;

        if !response.is_success() {
            tracing::debug!(
                query = %query,
                error = response.error.as_deref().unwrap_or("unknown"),
                "OMDb search returned no results"
            );
            return Ok(SearchPage::new(Vec::new(), 0, page));
        }

        let total = response.total_results();
        let movies: Vec<MovieSummary> = response
            .search
            .into_iter()
            .filter_map(|movie| MovieSummary::try_from(movie).ok())
            .collect();

        tracing::info!(
            query = %query,
            page,
            results = movies.len(),
            total,
            "Movie search completed"
        );

        Ok(SearchPage::new(movies, total, page))
    }

    fn search_params<'a>(
        query: &'a str,
        page: &'a str,
        filters: &'a SearchFilters,
    ) -> Vec<(&'static str, &'a str)> {
        let mut params = vec![
            ("s", query),
            ("page", page),
            ("type", filters.media_type().as_label()),
        ];
        if let Some(year) = filters.year() {
            params.push(("y", year));
        }
        params
    }

    /// Turns an in-band miss or a malformed record into `None`
    fn into_detail(movie: OmdbMovie, requested: &str) -> Option<MovieDetail> {
        if !movie.is_success() {
            tracing::debug!(
                requested = %requested,
                error = movie.error.as_deref().unwrap_or("unknown"),
                "OMDb has no record"
            );
            return None;
        }

        match MovieDetail::try_from(movie) {
            Ok(detail) => Some(detail),
            Err(e) => {
                tracing::warn!(requested = %requested, error = %e, "Discarding malformed OMDb record");
                None
            }
        }
    }
}

#[async_trait::async_trait]
impl DetailProvider for OmdbClient {
    async fn lookup(&self, title: &str) -> AppResult<Option<MovieDetail>> {
        cached!(
            self.cache.as_ref(),
            CacheKey::MovieDetail(title.to_string()),
            DETAIL_CACHE_TTL,
            self.fetch_by_title(title)
        )
    }
}

#[async_trait::async_trait]
impl MovieCatalog for OmdbClient {
    async fn search(
        &self,
        query: &str,
        page: u32,
        filters: &SearchFilters,
    ) -> AppResult<SearchPage> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        cached!(
            self.cache.as_ref(),
            CacheKey::MovieSearch(query.to_string(), page, filters.tag()),
            SEARCH_CACHE_TTL,
            self.fetch_search(query, page, filters)
        )
    }

    async fn details_by_id(&self, id: &MovieId) -> AppResult<MovieDetail> {
        let detail: Option<MovieDetail> = cached!(
            self.cache.as_ref(),
            CacheKey::MovieById(id.to_string()),
            DETAIL_CACHE_TTL,
            self.fetch_by_id(id)
        )?;

        detail.ok_or_else(|| AppError::NotFound(format!("Movie {} not found", id)))
    }
}
