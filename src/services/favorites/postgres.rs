use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::{required_id, FavoritesStore};
use crate::{
    error::AppResult,
    models::{FavoriteRecord, MovieId},
};

#[derive(Debug, sqlx::FromRow)]
struct FavoriteRow {
    imdb_id: String,
    movie_title: Option<String>,
    movie_poster: Option<String>,
    movie_year: Option<String>,
    movie_type: Option<String>,
    added_at: DateTime<Utc>,
}

impl From<FavoriteRow> for FavoriteRecord {
    fn from(row: FavoriteRow) -> Self {
        Self {
            imdb_id: Some(row.imdb_id),
            movie_title: row.movie_title,
            poster: row.movie_poster,
            year: row.movie_year,
            media_type: row.movie_type,
            added_at: Some(row.added_at),
            ..Default::default()
        }
    }
}

/// Favorites kept in the `favorites` table
#[derive(Clone)]
pub struct PgFavorites {
    pool: PgPool,
}

impl PgFavorites {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl FavoritesStore for PgFavorites {
    async fn list(&self) -> AppResult<Vec<FavoriteRecord>> {
        let rows = sqlx::query_as::<_, FavoriteRow>(
            r#"
            SELECT imdb_id, movie_title, movie_poster, movie_year, movie_type, added_at
            FROM favorites
            ORDER BY added_at ASC, imdb_id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(FavoriteRecord::from).collect())
    }

    async fn add(&self, record: FavoriteRecord) -> AppResult<bool> {
        let id = required_id(&record)?;

        let result = sqlx::query(
            r#"
            INSERT INTO favorites (imdb_id, movie_title, movie_poster, movie_year, movie_type)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (imdb_id) DO NOTHING
            "#,
        )
        .bind(id.as_str())
        .bind(record.seed_title())
        .bind(record.poster.as_deref())
        .bind(record.year.as_deref())
        .bind(record.media_type.as_deref())
        .execute(&self.pool)
        .await?;

        let added = result.rows_affected() > 0;
        if added {
            tracing::debug!(id = %id, "Favorite stored");
        }
        Ok(added)
    }

    async fn remove(&self, id: &MovieId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM favorites WHERE imdb_id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn contains(&self, id: &MovieId) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM favorites WHERE imdb_id = $1)")
                .bind(id.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_maps_to_store_style_record() {
        let row = FavoriteRow {
            imdb_id: "tt0120737".to_string(),
            movie_title: Some("The Fellowship of the Ring".to_string()),
            movie_poster: None,
            movie_year: Some("2001".to_string()),
            movie_type: Some("movie".to_string()),
            added_at: Utc::now(),
        };

        let record = FavoriteRecord::from(row);
        assert_eq!(record.id(), Some(MovieId::new("tt0120737")));
        assert_eq!(record.seed_title(), Some("The Fellowship of the Ring"));
        assert!(record.to_summary().is_some());
    }

    // Requires a PostgreSQL instance at DATABASE_URL
    #[tokio::test]
    #[ignore]
    async fn test_round_trip_against_database() {
        let url = std::env::var("DATABASE_URL").unwrap();
        let pool = crate::db::create_pool(&url).await.unwrap();
        crate::db::run_migrations(&pool).await.unwrap();

        let store = PgFavorites::new(pool);
        let id = MovieId::new("tt9999999");
        store.remove(&id).await.unwrap();

        let record = FavoriteRecord {
            imdb_id: Some(id.to_string()),
            movie_title: Some("Integration".to_string()),
            ..Default::default()
        };
        assert!(store.add(record.clone()).await.unwrap());
        assert!(!store.add(record).await.unwrap());
        assert!(store.contains(&id).await.unwrap());
        assert!(store.remove(&id).await.unwrap());
    }
}
