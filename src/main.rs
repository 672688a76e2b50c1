use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use moviehub::{
    api::{create_router, AppState},
    config::Config,
    db,
    services::{
        FavoritesStore, InMemoryFavorites, OmdbClient, PgFavorites, RecommendationEngine,
        SimilarityClient,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("moviehub=debug,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;
    let pipeline = config.pipeline()?;

    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.http_timeout_secs))
        .build()?;

    let (cache, cache_writer) = match config.redis_url.as_deref() {
        Some(url) => {
            let client = db::create_redis_client(url)?;
            let (cache, writer) = db::Cache::new(client).await;
            tracing::info!("Redis cache enabled");
            (Some(cache), Some(writer))
        }
        None => {
            tracing::info!("REDIS_URL not set, provider responses are not cached");
            (None, None)
        }
    };

    let favorites: Arc<dyn FavoritesStore> = match config.database_url.as_deref() {
        Some(url) => {
            let pool = db::create_pool(url).await?;
            db::run_migrations(&pool).await?;
            tracing::info!("Favorites stored in PostgreSQL");
            Arc::new(PgFavorites::new(pool))
        }
        None => {
            tracing::info!("DATABASE_URL not set, favorites kept in memory");
            Arc::new(InMemoryFavorites::new())
        }
    };

    let omdb = Arc::new(OmdbClient::new(
        http_client.clone(),
        config.omdb_api_key.clone(),
        config.omdb_api_url.clone(),
        cache.clone(),
    ));
    let similarity = Arc::new(SimilarityClient::new(
        http_client,
        config.similarity_api_url.clone(),
        cache,
    ));

    let recommender = RecommendationEngine::new(similarity, omdb.clone(), pipeline)?;
    let state = AppState::new(omdb, favorites, recommender);
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, ?pipeline, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(writer) = cache_writer {
        writer.shutdown().await;
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
