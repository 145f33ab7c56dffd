//! Cached HTTP request engine.
//!
//! Provides an async HTTP client with:
//! - Exactly one network attempt per call (no retries)
//! - Per-call TLS version pinning
//! - Raw-body caching keyed by a SHA-256 digest of method, URL and parameters
//! - Typed or sniffed (JSON/CSV/text) parsing into `Result<T, RequestError>`

mod cache;
mod parse;

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

pub use cache::{DiskCache, MemoryCache, ResponseCache};
pub use parse::{parse_csv, parse_typed, parse_value};

use crate::config::{CacheBackend, Config, api};
use crate::error::{RequestError, RequestResult, TRANSPORT_ERROR_STATUS, UNSUPPORTED_METHOD_STATUS};

/// How long a response body stays cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheTtl {
    /// Bypass the cache entirely: no reads, no writes.
    Disabled,
    /// Cache without expiry.
    Forever,
    /// Cache for a fixed duration from write time.
    For(Duration),
}

impl CacheTtl {
    /// Interpret a TTL in seconds: `0` disables, negative never expires.
    #[must_use]
    pub fn from_secs(secs: i64) -> Self {
        match secs {
            0 => Self::Disabled,
            s if s < 0 => Self::Forever,
            s => Self::For(Duration::from_secs(s.unsigned_abs())),
        }
    }

    /// Whether the cache is bypassed.
    #[must_use]
    pub fn is_disabled(self) -> bool {
        match self {
            Self::Disabled => true,
            Self::Forever => false,
            Self::For(ttl) => ttl.is_zero(),
        }
    }

    /// Expiry handed to a cache backend (`None` = never).
    #[must_use]
    pub const fn expiry(self) -> Option<Duration> {
        match self {
            Self::For(ttl) => Some(ttl),
            Self::Disabled | Self::Forever => None,
        }
    }
}

impl Default for CacheTtl {
    fn default() -> Self {
        Self::For(api::CACHE_TTL)
    }
}

/// TLS protocol policy for a single call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TlsPolicy {
    /// Let the client and server negotiate.
    #[default]
    Negotiate,
    /// Pin TLS 1.2.
    Tls12,
    /// Pin TLS 1.3.
    Tls13,
}

impl TlsPolicy {
    fn version(self) -> Option<reqwest::tls::Version> {
        match self {
            Self::Negotiate => None,
            Self::Tls12 => Some(reqwest::tls::Version::TLS_1_2),
            Self::Tls13 => Some(reqwest::tls::Version::TLS_1_3),
        }
    }
}

/// Status and body of a single network attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status, or 599 for transport failure, or 405 for unsupported verbs.
    pub status: u16,
    /// Response body, or the error text.
    pub body: String,
}

impl RawResponse {
    fn transport(err: impl std::fmt::Display) -> Self {
        Self {
            status: TRANSPORT_ERROR_STATUS,
            body: err.to_string(),
        }
    }
}

/// Description of one upstream call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// HTTP verb (GET or POST; anything else is rejected).
    pub method: String,
    /// Absolute URL.
    pub url: String,
    /// Query parameters (GET) or JSON body (POST).
    pub params: Map<String, Value>,
    /// Cache TTL for this call.
    pub cache_ttl: CacheTtl,
    /// TLS policy for this call.
    pub tls: TlsPolicy,
}

impl ApiRequest {
    /// Create a request with an arbitrary verb.
    #[must_use]
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            params: Map::new(),
            cache_ttl: CacheTtl::default(),
            tls: TlsPolicy::default(),
        }
    }

    /// Create a GET request.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self::new("GET", url)
    }

    /// Create a POST request.
    #[must_use]
    pub fn post(url: impl Into<String>) -> Self {
        Self::new("POST", url)
    }

    /// Add a single parameter.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Replace the parameters with the fields of a serializable struct or map.
    pub fn params_from<P: Serialize>(mut self, params: &P) -> RequestResult<Self> {
        match serde_json::to_value(params).map_err(RequestError::parse)? {
            Value::Object(map) => self.params = map,
            Value::Null => self.params.clear(),
            other => {
                return Err(RequestError::parse(format!(
                    "request parameters must be an object, got {other}"
                )));
            }
        }
        Ok(self)
    }

    /// Override the cache TTL.
    #[must_use]
    pub fn cache_ttl(mut self, ttl: CacheTtl) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Override the TLS policy.
    #[must_use]
    pub fn tls(mut self, tls: TlsPolicy) -> Self {
        self.tls = tls;
        self
    }

    /// Cache key for this request.
    #[must_use]
    pub fn cache_key(&self) -> String {
        compute_cache_key(&self.method, &self.url, &self.params)
    }
}

/// Serialize a value as compact JSON with object keys sorted at every level.
#[must_use]
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (idx, key) in keys.into_iter().enumerate() {
                if idx > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(&map[key], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (idx, item) in items.iter().enumerate() {
                if idx > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// Deterministic cache key: SHA-256 hex of `METHOD:url:canonical-params`.
#[must_use]
pub fn compute_cache_key(method: &str, url: &str, params: &Map<String, Value>) -> String {
    let canonical = canonical_json(&Value::Object(params.clone()));
    let mut hasher = Sha256::new();
    hasher.update(method.to_ascii_uppercase().as_bytes());
    hasher.update(b":");
    hasher.update(url.as_bytes());
    hasher.update(b":");
    hasher.update(canonical.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Append GET parameters to a URL as a query string.
///
/// Arrays become repeated keys, nulls are skipped, nested objects are
/// JSON-encoded.
pub fn build_get_url(url: &str, params: &Map<String, Value>) -> Result<url::Url, url::ParseError> {
    let mut parsed = url::Url::parse(url)?;
    if !params.is_empty() {
        let mut pairs = parsed.query_pairs_mut();
        for (key, value) in params {
            match value {
                Value::Array(items) => {
                    for item in items {
                        if let Some(encoded) = query_value(item) {
                            pairs.append_pair(key, &encoded);
                        }
                    }
                }
                other => {
                    if let Some(encoded) = query_value(other) {
                        pairs.append_pair(key, &encoded);
                    }
                }
            }
        }
    }
    Ok(parsed)
}

fn query_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(_) | Value::Number(_) | Value::Array(_) | Value::Object(_) => {
            Some(value.to_string())
        }
    }
}

/// HTTP client shared by every domain operation.
#[derive(Clone)]
pub struct HttpClient {
    negotiate: Client,
    tls12: Client,
    tls13: Client,
    cache: Arc<dyn ResponseCache>,
}

impl HttpClient {
    /// Create a client with the cache backend selected by `config`.
    ///
    /// # Errors
    ///
    /// Returns error if the cache directory or the HTTP clients cannot be created.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let cache: Arc<dyn ResponseCache> = match &config.cache_backend {
            CacheBackend::Disk(dir) => Arc::new(DiskCache::new(dir)?),
            CacheBackend::Memory => Arc::new(MemoryCache::new(config.cache_max_size)),
        };
        Self::with_cache(config, cache)
    }

    /// Create a client around an existing cache.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn with_cache(config: &Config, cache: Arc<dyn ResponseCache>) -> anyhow::Result<Self> {
        let build = |tls: TlsPolicy| -> reqwest::Result<Client> {
            let mut builder = Client::builder()
                .use_rustls_tls()
                .user_agent(concat!("biomcp/", env!("CARGO_PKG_VERSION")))
                .timeout(config.request_timeout)
                .connect_timeout(config.connect_timeout)
                .gzip(true);
            if let Some(version) = tls.version() {
                builder = builder.min_tls_version(version).max_tls_version(version);
            }
            builder.build()
        };

        Ok(Self {
            negotiate: build(TlsPolicy::Negotiate)?,
            tls12: build(TlsPolicy::Tls12)?,
            tls13: build(TlsPolicy::Tls13)?,
            cache,
        })
    }

    /// The shared cache.
    #[must_use]
    pub fn cache(&self) -> &Arc<dyn ResponseCache> {
        &self.cache
    }

    fn client_for(&self, tls: TlsPolicy) -> &Client {
        match tls {
            TlsPolicy::Negotiate => &self.negotiate,
            TlsPolicy::Tls12 => &self.tls12,
            TlsPolicy::Tls13 => &self.tls13,
        }
    }

    /// Perform one network attempt. Never touches the cache.
    pub async fn fetch_raw(
        &self,
        method: &str,
        url: &str,
        params: &Map<String, Value>,
        tls: TlsPolicy,
    ) -> RawResponse {
        let client = self.client_for(tls);
        let builder = match method.to_ascii_uppercase().as_str() {
            "GET" => match build_get_url(url, params) {
                Ok(full_url) => client.get(full_url),
                Err(e) => return RawResponse::transport(format!("invalid URL {url}: {e}")),
            },
            "POST" => client.post(url).json(params),
            _ => {
                return RawResponse {
                    status: UNSUPPORTED_METHOD_STATUS,
                    body: format!("Unsupported method {method}"),
                };
            }
        };

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(url, error = %e, "Transport failure");
                return RawResponse::transport(e);
            }
        };

        let status = response.status().as_u16();
        match response.text().await {
            Ok(body) => RawResponse { status, body },
            Err(e) => RawResponse::transport(e),
        }
    }

    async fn fetch_ok(&self, req: &ApiRequest) -> RequestResult<String> {
        let raw = self.fetch_raw(&req.method, &req.url, &req.params, req.tls).await;
        if raw.status == 200 {
            Ok(raw.body)
        } else {
            tracing::debug!(url = %req.url, status = raw.status, "Upstream returned an error");
            Err(RequestError::from_status(raw.status, raw.body))
        }
    }

    /// Resolve a request to its raw 200 body, consulting the cache first.
    pub async fn request_text(&self, req: &ApiRequest) -> RequestResult<String> {
        let method = req.method.to_ascii_uppercase();
        if method != "GET" && method != "POST" {
            return Err(RequestError::UnsupportedMethod(req.method.clone()));
        }

        if req.cache_ttl.is_disabled() {
            return self.fetch_ok(req).await;
        }

        let key = compute_cache_key(&method, &req.url, &req.params);
        match self.cache.get(&key).await {
            Ok(Some(body)) => {
                tracing::debug!(url = %req.url, "Cache hit");
                return Ok(body);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "Cache read failed, treating as miss"),
        }

        let body = self.fetch_ok(req).await?;
        if let Err(e) = self.cache.set(&key, &body, req.cache_ttl.expiry()).await {
            tracing::warn!(error = %e, "Cache write failed");
        }
        Ok(body)
    }

    /// Resolve a request and deserialize the body into `T`.
    pub async fn request<T: DeserializeOwned>(&self, req: &ApiRequest) -> RequestResult<T> {
        let body = self.request_text(req).await?;
        parse_typed(&body)
    }

    /// Resolve a request and sniff the body as JSON, CSV or text.
    pub async fn request_value(&self, req: &ApiRequest) -> RequestResult<Value> {
        let body = self.request_text(req).await?;
        parse_value(&body)
    }

    /// Close the cache backend. Failures are logged.
    pub async fn close(&self) {
        if let Err(e) = self.cache.close().await {
            tracing::warn!(error = %e, "Failed to close cache");
        }
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient").field("cache", &self.cache).finish()
    }
}
