use std::env;
use std::time::Duration;

use crate::api::DEFAULT_LEADERBOARD_LIMIT;
use crate::state::DEFAULT_PAGE_SIZE;

const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_FETCH_PARALLELISM: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub base_url: String,
    pub request_timeout: Duration,
    pub page_size: u32,
    pub leaderboard_limit: u32,
    pub fetch_parallelism: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            page_size: DEFAULT_PAGE_SIZE,
            leaderboard_limit: DEFAULT_LEADERBOARD_LIMIT,
            fetch_parallelism: DEFAULT_FETCH_PARALLELISM,
        }
    }
}

impl StoreConfig {
    pub fn from_env() -> Self {
        let base_url = env::var("STATS_API_BASE_URL")
            .ok()
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout_secs = env::var("STATS_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
            .clamp(1, 120);
        let page_size = env::var("STATS_PAGE_SIZE")
            .ok()
            .and_then(|val| val.parse::<u32>().ok())
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, 200);
        let leaderboard_limit = env::var("STATS_LEADERBOARD_LIMIT")
            .ok()
            .and_then(|val| val.parse::<u32>().ok())
            .unwrap_or(DEFAULT_LEADERBOARD_LIMIT)
            .clamp(1, 100);
        let fetch_parallelism = env::var("FETCH_PARALLELISM")
            .ok()
            .and_then(|val| val.parse::<usize>().ok())
            .unwrap_or(DEFAULT_FETCH_PARALLELISM)
            .clamp(2, 32);

        Self {
            base_url,
            request_timeout: Duration::from_secs(timeout_secs),
            page_size,
            leaderboard_limit,
            fetch_parallelism,
        }
    }
}
