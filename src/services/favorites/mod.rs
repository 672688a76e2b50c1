//! Favorites collection
//!
//! The recommendation pipeline never reads a store directly; it is handed a
//! [`FavoritesSnapshot`] taken when the run starts.
use crate::{
    error::{AppError, AppResult},
    models::{FavoriteRecord, FavoritesSnapshot, MovieId},
};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryFavorites;
pub use postgres::PgFavorites;

#[async_trait::async_trait]
pub trait FavoritesStore: Send + Sync {
    /// All favorites in stored order, oldest first
    async fn list(&self) -> AppResult<Vec<FavoriteRecord>>;

    /// Saves a favorite; `false` when its id was already saved
    async fn add(&self, record: FavoriteRecord) -> AppResult<bool>;

    /// Deletes a favorite; `false` when there was nothing to delete
    async fn remove(&self, id: &MovieId) -> AppResult<bool>;

    async fn contains(&self, id: &MovieId) -> AppResult<bool>;

    /// Point-in-time copy for one recommendation run
    async fn snapshot(&self) -> AppResult<FavoritesSnapshot> {
        Ok(FavoritesSnapshot::from_records(self.list().await?))
    }
}

/// Id of a record about to be stored
fn required_id(record: &FavoriteRecord) -> AppResult<MovieId> {
    record
        .id()
        .ok_or_else(|| AppError::InvalidInput("Favorite must carry an IMDb id".to_string()))
}
