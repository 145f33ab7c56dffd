//! Cache backend tests: expiry, purge on close and persistence across clients.

use std::time::Duration;

use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use biomcp::client::{ApiRequest, DiskCache, HttpClient, MemoryCache, ResponseCache};
use biomcp::config::{CacheBackend, Config};

fn disk_config(mock_server: &MockServer, dir: &TempDir) -> Config {
    let mut config = Config::for_testing(&mock_server.uri());
    config.cache_backend = CacheBackend::Disk(dir.path().to_path_buf());
    config
}

fn json_files(dir: &TempDir) -> usize {
    std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
        .count()
}

// =============================================================================
// DiskCache
// =============================================================================

#[tokio::test]
async fn test_disk_entry_expires_and_is_deleted() {
    let dir = TempDir::new().unwrap();
    let cache = DiskCache::new(dir.path()).unwrap();

    cache.set("short", "body", Some(Duration::from_millis(50))).await.unwrap();
    assert_eq!(cache.get("short").await.unwrap().as_deref(), Some("body"));

    tokio::time::sleep(Duration::from_millis(120)).await;
    assert_eq!(cache.get("short").await.unwrap(), None);
    assert!(!dir.path().join("short.json").exists());
}

#[tokio::test]
async fn test_disk_entry_without_ttl_never_expires() {
    let dir = TempDir::new().unwrap();
    let cache = DiskCache::new(dir.path()).unwrap();

    cache.set("forever", "body", None).await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(cache.get("forever").await.unwrap().as_deref(), Some("body"));
    assert_eq!(cache.purge_expired().await.unwrap(), 0);
}

#[tokio::test]
async fn test_disk_set_overwrites_previous_entry() {
    let dir = TempDir::new().unwrap();
    let cache = DiskCache::new(dir.path()).unwrap();

    cache.set("k", "old", None).await.unwrap();
    cache.set("k", "new", None).await.unwrap();

    assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("new"));
    assert_eq!(json_files(&dir), 1);
}

#[tokio::test]
async fn test_disk_close_sweeps_expired_entries() {
    let dir = TempDir::new().unwrap();
    let cache = DiskCache::new(dir.path()).unwrap();

    cache.set("stale", "old", Some(Duration::from_millis(10))).await.unwrap();
    cache.set("live", "new", Some(Duration::from_secs(3600))).await.unwrap();
    std::fs::write(dir.path().join("garbage.json"), "not an entry").unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    cache.close().await.unwrap();

    assert!(!dir.path().join("stale.json").exists());
    assert!(!dir.path().join("garbage.json").exists());
    assert_eq!(cache.get("live").await.unwrap().as_deref(), Some("new"));
}

#[tokio::test]
async fn test_disk_cache_creates_missing_directory() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("a").join("b");

    let cache = DiskCache::new(&nested).unwrap();
    cache.set("k", "v", None).await.unwrap();

    assert_eq!(cache.dir(), nested.as_path());
    assert!(nested.join("k.json").exists());
}

// =============================================================================
// MemoryCache
// =============================================================================

#[tokio::test]
async fn test_memory_entry_expires() {
    let cache = MemoryCache::new(16);

    cache.set("short", "body", Some(Duration::from_millis(50))).await.unwrap();
    assert_eq!(cache.get("short").await.unwrap().as_deref(), Some("body"));

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(cache.get("short").await.unwrap(), None);
}

#[tokio::test]
async fn test_memory_close_runs_pending_tasks() {
    let cache = MemoryCache::new(16);
    cache.set("a", "1", None).await.unwrap();
    cache.set("b", "2", None).await.unwrap();

    cache.close().await.unwrap();
    assert_eq!(cache.entry_count(), 2);
}

// =============================================================================
// Engine with a disk backend
// =============================================================================

#[tokio::test]
async fn test_disk_cache_survives_client_restart() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/persisted"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": 1})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let req = ApiRequest::get(format!("{}/persisted", mock_server.uri()));

    let first = HttpClient::new(&disk_config(&mock_server, &dir)).unwrap();
    let value = first.request_value(&req).await.unwrap();
    assert_eq!(value, json!({"value": 1}));
    first.close().await;

    let second = HttpClient::new(&disk_config(&mock_server, &dir)).unwrap();
    let value = second.request_value(&req).await.unwrap();
    assert_eq!(value, json!({"value": 1}));
    assert_eq!(json_files(&dir), 1);
}

#[tokio::test]
async fn test_corrupt_disk_entry_is_refetched() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/corrupt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("fresh"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let req = ApiRequest::get(format!("{}/corrupt", mock_server.uri()));
    let entry = dir.path().join(format!("{}.json", req.cache_key()));
    std::fs::write(entry, "{truncated").unwrap();

    let client = HttpClient::new(&disk_config(&mock_server, &dir)).unwrap();
    assert_eq!(client.request_text(&req).await.unwrap(), "fresh");
    assert_eq!(client.request_text(&req).await.unwrap(), "fresh");
}
