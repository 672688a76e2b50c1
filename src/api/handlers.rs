use std::convert::Infallible;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::AppState;
use crate::{
    error::{AppError, AppResult},
    models::{
        FavoriteRecord, FavoritesSnapshot, MediaType, MovieDetail, MovieId, RecommendationResponse,
        SearchFilters, SearchPage, SortOrder,
    },
    services::recommendations::RecommendationUpdate,
};

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub page: Option<u32>,
    #[serde(rename = "type")]
    pub media_type: Option<MediaType>,
    pub year: Option<String>,
    #[serde(default)]
    pub sort: SortOrder,
}

impl SearchQuery {
    fn filters(&self) -> SearchFilters {
        SearchFilters {
            media_type: self.media_type,
            year: self.year.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
}

/// Largest listing the random endpoint will assemble
const MAX_RANDOM_COUNT: usize = 50;

#[derive(Debug, Deserialize)]
pub struct RandomQuery {
    pub count: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RecommendRequest {
    /// Favorites to seed from; all favorites when absent or empty
    #[serde(default)]
    pub selected: Vec<MovieId>,
}

#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    /// Comma separated IMDb ids
    pub selected: Option<String>,
}

impl StreamQuery {
    fn selected_ids(&self) -> Vec<MovieId> {
        self.selected
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(MovieId::from)
            .collect()
    }
}

#[derive(Debug, Serialize)]
pub struct FavoriteStatus {
    pub imdb_id: MovieId,
    pub is_favorite: bool,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Catalog search, one page at a time
pub async fn search_movies(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<SearchPage>> {
    let page = params.page.unwrap_or(1).max(1);
    let results = state
        .catalog
        .search(&params.q, page, &params.filters())
        .await?;
    Ok(Json(results.sorted(params.sort)))
}

/// Browsing listing shown before any search
pub async fn popular_movies(
    State(state): State<AppState>,
    Query(params): Query<PageQuery>,
) -> AppResult<Json<SearchPage>> {
    let page = params.page.unwrap_or(1).max(1);
    Ok(Json(state.catalog.popular(page).await?))
}

pub async fn random_movies(
    State(state): State<AppState>,
    Query(params): Query<RandomQuery>,
) -> AppResult<Json<SearchPage>> {
    let count = params.count.unwrap_or(10);
    if count == 0 || count > MAX_RANDOM_COUNT {
        return Err(AppError::InvalidInput(format!(
            "count must be between 1 and {}",
            MAX_RANDOM_COUNT
        )));
    }
    Ok(Json(state.catalog.random(count).await?))
}

pub async fn get_movie(
    State(state): State<AppState>,
    Path(imdb_id): Path<String>,
) -> AppResult<Json<MovieDetail>> {
    let detail = state.catalog.details_by_id(&MovieId::new(imdb_id)).await?;
    Ok(Json(detail))
}

pub async fn list_favorites(State(state): State<AppState>) -> AppResult<Json<Vec<FavoriteRecord>>> {
    Ok(Json(state.favorites.list().await?))
}

/// Saves a favorite; answers 201 when new and 200 when it was already saved
pub async fn add_favorite(
    State(state): State<AppState>,
    Json(record): Json<FavoriteRecord>,
) -> AppResult<(StatusCode, Json<FavoriteRecord>)> {
    let added = state.favorites.add(record.clone()).await?;
    let status = if added {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(record)))
}

pub async fn favorite_status(
    State(state): State<AppState>,
    Path(imdb_id): Path<String>,
) -> AppResult<Json<FavoriteStatus>> {
    let imdb_id = MovieId::new(imdb_id);
    let is_favorite = state.favorites.contains(&imdb_id).await?;
    Ok(Json(FavoriteStatus {
        imdb_id,
        is_favorite,
    }))
}

pub async fn remove_favorite(
    State(state): State<AppState>,
    Path(imdb_id): Path<String>,
) -> AppResult<StatusCode> {
    let imdb_id = MovieId::new(imdb_id);
    if state.favorites.remove(&imdb_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Favorite {} not found", imdb_id)))
    }
}

async fn run_snapshot(state: &AppState, selected: &[MovieId]) -> AppResult<FavoritesSnapshot> {
    Ok(state.favorites.snapshot().await?.restrict_to(selected))
}

impl RecommendRequest {
    /// An empty body means "all favorites"; anything else must be a valid request
    fn from_body(body: &[u8]) -> AppResult<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        Json::<Self>::from_bytes(body)
            .map(|Json(request)| request)
            .map_err(|rejection| AppError::InvalidInput(rejection.body_text()))
    }
}

/// Runs the recommendation pipeline to completion
pub async fn recommend(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<RecommendationResponse>> {
    let request = RecommendRequest::from_body(&body)?;
    let favorites = run_snapshot(&state, &request.selected).await?;

    let outcome = state.recommender.recommend(favorites).await?;
    Ok(Json(RecommendationResponse::new(outcome.into_movies())))
}

/// Streams one `snapshot` event per resolved batch, then a `done` event
pub async fn stream_recommendations(
    State(state): State<AppState>,
    Query(params): Query<StreamQuery>,
) -> AppResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let favorites = run_snapshot(&state, &params.selected_ids()).await?;
    let updates = state.recommender.compute_recommendations(favorites)?;

    let events = updates
        .filter_map(|update| async move { update_to_event(update) })
        .map(Ok::<Event, Infallible>);

    Ok(Sse::new(events).keep_alive(KeepAlive::new()))
}

fn update_to_event(update: RecommendationUpdate) -> Option<Event> {
    let (name, encoded) = match update {
        RecommendationUpdate::Snapshot(snapshot) => ("snapshot", serde_json::to_string(&snapshot)),
        RecommendationUpdate::Finished(outcome) => (
            "done",
            serde_json::to_string(&RecommendationResponse::new(outcome.into_movies())),
        ),
    };

    match encoded {
        Ok(data) => Some(Event::default().event(name).data(data)),
        Err(e) => {
            tracing::warn!(event = name, error = %e, "Failed to encode recommendation event");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::recommendations::{RecommendationOutcome, RecommendationSnapshot};

    #[test]
    fn test_stream_query_splits_ids() {
        let query = StreamQuery {
            selected: Some("tt1, tt2,,tt3 ".to_string()),
        };
        assert_eq!(
            query.selected_ids(),
            vec![MovieId::new("tt1"), MovieId::new("tt2"), MovieId::new("tt3")]
        );
        assert!(StreamQuery { selected: None }.selected_ids().is_empty());
    }

    #[test]
    fn test_recommend_body_parsing() {
        assert!(RecommendRequest::from_body(b"").unwrap().selected.is_empty());
        assert!(RecommendRequest::from_body(b"  \n").unwrap().selected.is_empty());
        assert_eq!(
            RecommendRequest::from_body(br#"{"selected": ["tt1"]}"#)
                .unwrap()
                .selected,
            vec![MovieId::new("tt1")]
        );

        let malformed: [&[u8]; 3] = [br#"{"selected": "tt1"}"#, br#"{"selected": [1]}"#, b"not json"];
        for malformed in malformed {
            assert!(matches!(
                RecommendRequest::from_body(malformed),
                Err(AppError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn test_search_query_builds_filters() {
        let query = SearchQuery {
            q: "batman".to_string(),
            page: None,
            media_type: Some(MediaType::Series),
            year: Some("2008".to_string()),
            sort: SortOrder::Title,
        };
        assert_eq!(query.filters().tag(), "series:2008");
    }

    #[test]
    fn test_updates_become_named_events() {
        let snapshot = RecommendationUpdate::Snapshot(RecommendationSnapshot {
            batch: 1,
            total_batches: 2,
            movies: vec![],
        });
        assert!(update_to_event(snapshot).is_some());

        let done = RecommendationUpdate::Finished(RecommendationOutcome::NoneFound);
        assert!(update_to_event(done).is_some());
    }
}
