use redis::AsyncCommands;
use redis::Client;
use std::fmt::Display;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::error::AppError;
use crate::error::AppResult;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Catalog search by query, page, and filter tag
    MovieSearch(String, u32, String),
    /// Detail lookup by exact title
    MovieDetail(String),
    /// Detail lookup by IMDb id
    MovieById(String),
    /// Similar titles for a seed title, capped at a limit
    Similar(String, usize),
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::MovieSearch(query, page, filters) => write!(
                f,
                "omdb:search:{}:{}:{}",
                query.trim().to_lowercase(),
                page,
                filters
            ),
            CacheKey::MovieDetail(title) => write!(f, "omdb:title:{}", title.to_lowercase()),
            CacheKey::MovieById(id) => write!(f, "omdb:id:{}", id),
            CacheKey::Similar(title, limit) => write!(f, "similar:{}:{}", limit, title),
        }
    }
}

/// Opens a Redis client for the provider cache
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Pending write handed to the background writer
struct CacheWrite {
    key: String,
    value: String,
    ttl: u64,
}

/// Read-through cache for provider responses.
///
/// Reads go straight to Redis. Writes are queued and applied by a background task so a
/// slow Redis never holds up a lookup.
#[derive(Clone)]
pub struct Cache {
    redis_client: Client,
    write_tx: mpsc::UnboundedSender<CacheWrite>,
}

/// Stops the background writer after draining queued writes
pub struct CacheWriterHandle {
    shutdown_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl CacheWriterHandle {
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Cache writer task failed");
        }
        tracing::info!("Cache writer stopped");
    }
}

impl Cache {
    /// Creates the cache and spawns its writer task
    pub async fn new(redis_client: Client) -> (Self, CacheWriterHandle) {
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let task = tokio::spawn(Self::run_writer(
            redis_client.clone(),
            write_rx,
            shutdown_rx,
        ));

        (
            Self {
                redis_client,
                write_tx,
            },
            CacheWriterHandle { shutdown_tx, task },
        )
    }

    async fn run_writer(
        client: Client,
        mut write_rx: mpsc::UnboundedReceiver<CacheWrite>,
        mut shutdown_rx: oneshot::Receiver<()>,
    ) {
        tracing::debug!("Cache writer started");

        loop {
            tokio::select! {
                Some(write) = write_rx.recv() => {
                    if let Err(e) = Self::write_to_redis(&client, write).await {
                        tracing::warn!(error = %e, "Cache write failed");
                    }
                }
                _ = &mut shutdown_rx => break,
            }
        }

        // Senders live in every Cache clone, so drain what is queued instead of waiting for close
        let mut flushed = 0usize;
        while let Ok(write) = write_rx.try_recv() {
            match Self::write_to_redis(&client, write).await {
                Ok(()) => flushed += 1,
                Err(e) => tracing::warn!(error = %e, "Cache write failed during shutdown"),
            }
        }
        tracing::debug!(flushed, "Cache writer drained");
    }

    async fn write_to_redis(client: &Client, write: CacheWrite) -> AppResult<()> {
        let mut conn = client.get_multiplexed_async_connection().await?;
        let _: () = conn.set_ex(write.key, write.value, write.ttl).await?;
        Ok(())
    }

    /// Reads and deserializes a cached value, `None` on a miss
    pub async fn get_from_cache<T: serde::de::DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> AppResult<Option<T>> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let cached: Option<String> = conn.get(key.to_string()).await?;

        cached
            .map(|json| {
                serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Cache deserialization error: {}", e))
                })
            })
            .transpose()
    }

    /// Queues a value for writing; never waits on Redis
    pub fn set_in_background<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl: u64) {
        let value = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(error = %e, key = %key, "Cache serialization error");
                return;
            }
        };

        let write = CacheWrite {
            key: key.to_string(),
            value,
            ttl,
        };

        if self.write_tx.send(write).is_err() {
            tracing::warn!(key = %key, "Cache writer is gone, dropping write");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_display_movie_search() {
        let key = CacheKey::MovieSearch(
            "  Lord of the RINGS ".to_string(),
            2,
            "movie:any".to_string(),
        );
        assert_eq!(format!("{}", key), "omdb:search:lord of the rings:2:movie:any");
    }

    #[test]
    fn test_cache_key_display_movie_detail_is_case_insensitive() {
        let upper = CacheKey::MovieDetail("THE MATRIX".to_string());
        let lower = CacheKey::MovieDetail("the matrix".to_string());
        assert_eq!(format!("{}", upper), format!("{}", lower));
        assert_eq!(format!("{}", lower), "omdb:title:the matrix");
    }

    #[test]
    fn test_cache_key_display_movie_by_id() {
        let key = CacheKey::MovieById("tt1375666".to_string());
        assert_eq!(format!("{}", key), "omdb:id:tt1375666");
    }

    #[test]
    fn test_cache_key_display_similar_keeps_case() {
        // Similar-title lookups match titles exactly, so the key must too
        let key = CacheKey::Similar("The Thing".to_string(), 8);
        assert_eq!(format!("{}", key), "similar:8:The Thing");
        assert_ne!(
            format!("{}", key),
            format!("{}", CacheKey::Similar("the thing".to_string(), 8))
        );
    }

    // The tests below need a running Redis; run with `cargo test -- --ignored`.

    fn redis_url() -> String {
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string())
    }

    #[tokio::test]
    #[ignore]
    async fn test_cache_miss() {
        let client = create_redis_client(&redis_url()).unwrap();
        let (cache, _handle) = Cache::new(client).await;

        let key = CacheKey::MovieDetail("nonexistent_title_12345".to_string());
        let retrieved: Option<Vec<String>> = cache.get_from_cache(&key).await.unwrap();

        assert_eq!(retrieved, None);
    }

    #[tokio::test]
    #[ignore]
    async fn test_cache_writer_flushes_on_shutdown() {
        let client = create_redis_client(&redis_url()).unwrap();
        let (cache, handle) = Cache::new(client.clone()).await;

        let key = CacheKey::Similar("shutdown_test".to_string(), 3);
        let value = vec!["Alien".to_string(), "Aliens".to_string()];

        cache.set_in_background(&key, &value, 60);
        handle.shutdown().await;
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        let retrieved: Option<Vec<String>> = cache.get_from_cache(&key).await.unwrap();
        assert_eq!(retrieved, Some(value));

        let mut conn = client.get_multiplexed_async_connection().await.unwrap();
        let _: () = conn.del(format!("{}", key)).await.unwrap();
    }
}
