use std::sync::Arc;

use crate::services::{FavoritesStore, MovieCatalog, RecommendationEngine};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn MovieCatalog>,
    pub favorites: Arc<dyn FavoritesStore>,
    pub recommender: Arc<RecommendationEngine>,
}

impl AppState {
    pub fn new(
        catalog: Arc<dyn MovieCatalog>,
        favorites: Arc<dyn FavoritesStore>,
        recommender: RecommendationEngine,
    ) -> Self {
        Self {
            catalog,
            favorites,
            recommender: Arc::new(recommender),
        }
    }
}
