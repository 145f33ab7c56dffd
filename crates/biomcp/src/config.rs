//! Configuration for the BioMCP server.

use std::path::PathBuf;
use std::time::Duration;

use crate::client::CacheTtl;

/// Upstream endpoints and engine defaults.
pub mod api {
    use std::time::Duration;

    /// PubTator3 API root (search, autocomplete, BioC export).
    pub const PUBTATOR3_BASE: &str = "https://www.ncbi.nlm.nih.gov/research/pubtator3-api";

    /// ClinicalTrials.gov v2 studies endpoint.
    pub const CT_GOV_STUDIES: &str = "https://clinicaltrials.gov/api/v2/studies";

    /// Public study page, used to build trial links.
    pub const CT_GOV_STUDY_PAGE: &str = "https://clinicaltrials.gov/study";

    /// MyVariant.info v1 API root.
    pub const MYVARIANT_BASE: &str = "https://myvariant.info/v1";

    /// Request timeout.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Default cache TTL (one week).
    pub const CACHE_TTL: Duration = Duration::from_secs(60 * 60 * 24 * 7);

    /// Maximum number of entries held by the in-memory cache.
    pub const CACHE_MAX_SIZE: u64 = 10_000;

    /// Page size requested from upstream search endpoints.
    pub const SYSTEM_PAGE_SIZE: u32 = 40;
}

/// Where raw response bodies are cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheBackend {
    /// One JSON file per entry under the given directory.
    Disk(PathBuf),
    /// Process-local moka cache.
    Memory,
}

impl CacheBackend {
    /// Disk cache in the platform cache directory, falling back to memory
    /// when no home directory can be resolved.
    #[must_use]
    pub fn platform_default() -> Self {
        directories::ProjectDirs::from("", "", "biomcp")
            .map(|dirs| Self::Disk(dirs.cache_dir().join("http_cache")))
            .unwrap_or(Self::Memory)
    }
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// PubTator3 API root (overridable for mock servers).
    pub pubtator_url: String,

    /// ClinicalTrials.gov studies endpoint.
    pub ctgov_url: String,

    /// MyVariant.info API root.
    pub myvariant_url: String,

    /// Request timeout.
    pub request_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// TTL applied when a domain call does not override it.
    pub cache_ttl: CacheTtl,

    /// Cache storage.
    pub cache_backend: CacheBackend,

    /// Capacity of the in-memory cache.
    pub cache_max_size: u64,
}

impl Config {
    /// Create the production configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pubtator_url: api::PUBTATOR3_BASE.to_string(),
            ctgov_url: api::CT_GOV_STUDIES.to_string(),
            myvariant_url: api::MYVARIANT_BASE.to_string(),
            request_timeout: api::REQUEST_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
            cache_ttl: CacheTtl::For(api::CACHE_TTL),
            cache_backend: CacheBackend::platform_default(),
            cache_max_size: api::CACHE_MAX_SIZE,
        }
    }

    /// Create a test configuration pointing every upstream at a mock server.
    ///
    /// Uses an in-memory cache so tests never touch the user's cache directory.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            pubtator_url: format!("{}/pubtator3-api", base),
            ctgov_url: format!("{}/api/v2/studies", base),
            myvariant_url: format!("{}/v1", base),
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            cache_ttl: CacheTtl::For(api::CACHE_TTL),
            cache_backend: CacheBackend::Memory,
            cache_max_size: 1_000,
        }
    }

    /// Create configuration from the environment.
    ///
    /// Loads `.env` if present, then reads:
    /// - `BIOMCP_CACHE_DIR`: disk cache directory
    /// - `BIOMCP_CACHE_BACKEND`: `disk` or `memory`
    /// - `BIOMCP_CACHE_TTL_SECS`: TTL in seconds (`0` disables, `-1` never expires)
    /// - `BIOMCP_PUBTATOR_URL`, `BIOMCP_CTGOV_URL`, `BIOMCP_MYVARIANT_URL`
    ///
    /// # Errors
    ///
    /// Returns error if environment variables are invalid.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        let mut config = Self::new();

        if let Ok(url) = std::env::var("BIOMCP_PUBTATOR_URL") {
            config.pubtator_url = url;
        }
        if let Ok(url) = std::env::var("BIOMCP_CTGOV_URL") {
            config.ctgov_url = url;
        }
        if let Ok(url) = std::env::var("BIOMCP_MYVARIANT_URL") {
            config.myvariant_url = url;
        }

        if let Ok(raw) = std::env::var("BIOMCP_CACHE_TTL_SECS") {
            let secs: i64 = raw.trim().parse().map_err(|e| {
                anyhow::anyhow!("BIOMCP_CACHE_TTL_SECS must be an integer: {e}")
            })?;
            config.cache_ttl = CacheTtl::from_secs(secs);
        }

        if let Ok(dir) = std::env::var("BIOMCP_CACHE_DIR") {
            config.cache_backend = CacheBackend::Disk(PathBuf::from(dir));
        }

        if let Ok(backend) = std::env::var("BIOMCP_CACHE_BACKEND") {
            match backend.trim().to_ascii_lowercase().as_str() {
                "memory" => config.cache_backend = CacheBackend::Memory,
                "disk" => {
                    if config.cache_backend == CacheBackend::Memory {
                        anyhow::bail!("disk cache requested but no cache directory is available");
                    }
                }
                other => anyhow::bail!("unknown BIOMCP_CACHE_BACKEND '{other}'"),
            }
        }

        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.pubtator_url, api::PUBTATOR3_BASE);
        assert_eq!(config.ctgov_url, api::CT_GOV_STUDIES);
        assert_eq!(config.myvariant_url, api::MYVARIANT_BASE);
        assert_eq!(
            config.cache_ttl,
            CacheTtl::For(Duration::from_secs(604_800))
        );
    }

    #[test]
    fn test_config_for_testing() {
        let config = Config::for_testing("http://127.0.0.1:9999/");
        assert_eq!(config.pubtator_url, "http://127.0.0.1:9999/pubtator3-api");
        assert_eq!(config.ctgov_url, "http://127.0.0.1:9999/api/v2/studies");
        assert_eq!(config.myvariant_url, "http://127.0.0.1:9999/v1");
        assert_eq!(config.cache_backend, CacheBackend::Memory);
    }
}
