pub mod favorite;
pub mod movie;
pub mod omdb;
pub mod recommendation;

pub use favorite::{FavoriteRecord, FavoritesSnapshot};
pub use movie::{
    parse_genres, MediaType, MovieDetail, MovieId, MovieSummary, SearchFilters, SearchPage,
    SortOrder,
};
pub use omdb::{MalformedRecord, OmdbMovie, OmdbSearchResponse};
pub use recommendation::{group_by_genre, GenreGroups, RecommendationResponse, RecommendationStatus};
