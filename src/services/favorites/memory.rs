use chrono::Utc;
use tokio::sync::RwLock;

use super::{required_id, FavoritesStore};
use crate::{
    error::AppResult,
    models::{FavoriteRecord, MovieId},
};

/// Process-local favorites, lost on restart
#[derive(Default)]
pub struct InMemoryFavorites {
    records: RwLock<Vec<FavoriteRecord>>,
}

impl InMemoryFavorites {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with `records`, in the given order
    pub fn with_records(records: Vec<FavoriteRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }
}

#[async_trait::async_trait]
impl FavoritesStore for InMemoryFavorites {
    async fn list(&self) -> AppResult<Vec<FavoriteRecord>> {
        Ok(self.records.read().await.clone())
    }

    async fn add(&self, mut record: FavoriteRecord) -> AppResult<bool> {
        let id = required_id(&record)?;
        let mut records = self.records.write().await;

        if records.iter().any(|r| r.id().as_ref() == Some(&id)) {
            return Ok(false);
        }

        record.imdb_id = Some(id.to_string());
        record.added_at.get_or_insert_with(Utc::now);
        records.push(record);

        tracing::debug!(id = %id, total = records.len(), "Favorite added");
        Ok(true)
    }

    async fn remove(&self, id: &MovieId) -> AppResult<bool> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.id().as_ref() != Some(id));
        Ok(records.len() != before)
    }

    async fn contains(&self, id: &MovieId) -> AppResult<bool> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .any(|r| r.id().as_ref() == Some(id)))
    }
}
