use serde::Deserialize;

use crate::services::recommendations::{PipelineConfig, RecommendationError};

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// OMDb API key
    pub omdb_api_key: String,

    /// OMDb API base URL
    #[serde(default = "default_omdb_api_url")]
    pub omdb_api_url: String,

    /// Base URL of the similarity backend
    #[serde(default = "default_similarity_api_url")]
    pub similarity_api_url: String,

    /// PostgreSQL connection URL; favorites are kept in memory when unset
    #[serde(default)]
    pub database_url: Option<String>,

    /// Redis connection URL; provider responses are not cached when unset
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Outer timeout applied by the shared HTTP client
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    #[serde(default = "default_seed_count")]
    pub seed_count: usize,

    #[serde(default = "default_per_seed_candidate_limit")]
    pub per_seed_candidate_limit: usize,

    #[serde(default = "default_candidate_cap")]
    pub candidate_cap: usize,

    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    #[serde(default = "default_fanout_timeout_ms")]
    pub fanout_timeout_ms: u64,

    #[serde(default = "default_detail_timeout_ms")]
    pub detail_timeout_ms: u64,
}

fn default_omdb_api_url() -> String {
    "https://www.omdbapi.com".to_string()
}

fn default_similarity_api_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_http_timeout_secs() -> u64 {
    10
}

fn default_seed_count() -> usize {
    PipelineConfig::default().seed_count
}

fn default_per_seed_candidate_limit() -> usize {
    PipelineConfig::default().per_seed_candidate_limit
}

fn default_candidate_cap() -> usize {
    PipelineConfig::default().candidate_cap
}

fn default_batch_size() -> usize {
    PipelineConfig::default().batch_size
}

fn default_fanout_timeout_ms() -> u64 {
    PipelineConfig::default().fanout_timeout_ms
}

fn default_detail_timeout_ms() -> u64 {
    PipelineConfig::default().detail_timeout_ms
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Builds the recommendation pipeline settings, rejecting unusable values
    pub fn pipeline(&self) -> Result<PipelineConfig, RecommendationError> {
        PipelineConfig {
            seed_count: self.seed_count,
            per_seed_candidate_limit: self.per_seed_candidate_limit,
            candidate_cap: self.candidate_cap,
            batch_size: self.batch_size,
            fanout_timeout_ms: self.fanout_timeout_ms,
            detail_timeout_ms: self.detail_timeout_ms,
        }
        .validate()
    }
}
