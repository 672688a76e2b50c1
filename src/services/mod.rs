pub mod favorites;
pub mod providers;
pub mod recommendations;

pub use favorites::{FavoritesStore, InMemoryFavorites, PgFavorites};
pub use providers::{DetailProvider, MovieCatalog, OmdbClient, SimilarityClient, SimilarityProvider};
pub use recommendations::{PipelineConfig, RecommendationEngine, RecommendationError};
