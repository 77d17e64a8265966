use std::time::Duration;

use serde::Serialize;

/// Application-level constants
pub const APP_NAME: &str = "labtrend";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Session store backend the upload service listens on by default.
pub const DEFAULT_STORE_URL: &str = "http://localhost:8000";

/// Upper bound on the whole corpus fetch (listing + every detail).
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// Upper bound on a single HTTP request to the store.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 5;

/// Session detail fetches in flight at once.
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 8;

const ENV_STORE_URL: &str = "LABTREND_STORE_URL";
const ENV_REQUEST_TIMEOUT: &str = "LABTREND_REQUEST_TIMEOUT_SECS";
const ENV_FETCH_TIMEOUT: &str = "LABTREND_FETCH_TIMEOUT_SECS";
const ENV_MAX_CONCURRENCY: &str = "LABTREND_MAX_CONCURRENCY";

/// Default tracing filter when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "labtrend_lib=info,labtrend=info"
}

/// How the session corpus is fetched from the external store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchConfig {
    /// Base URL of the session store (no trailing slash required).
    pub store_url: String,
    /// Per-request timeout for the HTTP client.
    pub request_timeout: Duration,
    /// Caller-level deadline for the whole corpus. Sessions that have not
    /// arrived by then are left out of the trend.
    pub corpus_timeout: Duration,
    /// Maximum concurrent session detail fetches. Always >= 1.
    pub max_concurrency: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            store_url: DEFAULT_STORE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            corpus_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            max_concurrency: DEFAULT_MAX_CONCURRENT_FETCHES,
        }
    }
}

impl FetchConfig {
    /// Defaults overridden by `LABTREND_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. Unparseable values are
    /// logged and the default is kept.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_STORE_URL) {
            let url = url.trim();
            if !url.is_empty() {
                config.store_url = url.to_string();
            }
        }
        if let Some(secs) = parse_setting::<u64>(&lookup, ENV_REQUEST_TIMEOUT) {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_setting::<u64>(&lookup, ENV_FETCH_TIMEOUT) {
            config.corpus_timeout = Duration::from_secs(secs);
        }
        if let Some(n) = parse_setting::<usize>(&lookup, ENV_MAX_CONCURRENCY) {
            config.max_concurrency = n;
        }

        config.normalized()
    }

    /// Clamp values that would stall the fetch.
    pub fn normalized(mut self) -> Self {
        self.max_concurrency = self.max_concurrency.max(1);
        self
    }
}

fn parse_setting<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Ignoring invalid setting, keeping default");
            None
        }
    }
}
