use propass_store::{KeyValueStore, MemoryStore, RedisRestConfig, RedisRestStore};
use wiremock::matchers::{body_string, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── MemoryStore ──────────────────────────────────────────────────

#[tokio::test]
async fn memory_set_get_roundtrip() {
    let store = MemoryStore::new();
    store.set("token:abc", "hello", None).await.unwrap();
    assert_eq!(store.get("token:abc").await.unwrap().as_deref(), Some("hello"));
}

#[tokio::test]
async fn memory_get_absent_is_none() {
    let store = MemoryStore::new();
    assert!(store.get("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn memory_zero_ttl_expires_immediately() {
    let store = MemoryStore::new();
    store.set("token:abc", "hello", Some(0)).await.unwrap();
    assert!(store.get("token:abc").await.unwrap().is_none());
}

#[tokio::test]
async fn memory_long_ttl_survives() {
    let store = MemoryStore::new();
    store.set("token:abc", "hello", Some(604_800)).await.unwrap();
    assert!(store.get("token:abc").await.unwrap().is_some());
}

#[tokio::test]
async fn memory_delete_removes() {
    let store = MemoryStore::new();
    store.set("k", "v", None).await.unwrap();
    store.delete("k").await.unwrap();
    assert!(store.get("k").await.unwrap().is_none());
}

#[tokio::test]
async fn memory_delete_absent_is_ok() {
    let store = MemoryStore::new();
    assert!(store.delete("never-written").await.is_ok());
}

#[tokio::test]
async fn memory_overwrite_replaces_value_and_ttl() {
    let store = MemoryStore::new();
    store.set("k", "old", Some(0)).await.unwrap();
    store.set("k", "new", None).await.unwrap();
    assert_eq!(store.get("k").await.unwrap().as_deref(), Some("new"));
}

#[tokio::test]
async fn memory_keys_pattern() {
    let store = MemoryStore::new();
    store.set("token:a", "1", None).await.unwrap();
    store.set("token:b", "2", None).await.unwrap();
    store.set("user:a:isSubscribed", "true", None).await.unwrap();

    let mut keys = store.keys("token:*").await.unwrap();
    keys.sort();
    assert_eq!(keys, vec!["token:a", "token:b"]);

    let keys = store.keys("user:*:isSubscribed").await.unwrap();
    assert_eq!(keys, vec!["user:a:isSubscribed"]);
}

#[tokio::test]
async fn memory_keys_skips_expired() {
    let store = MemoryStore::new();
    store.set("token:live", "1", None).await.unwrap();
    store.set("token:dead", "2", Some(0)).await.unwrap();
    let keys = store.keys("token:*").await.unwrap();
    assert_eq!(keys, vec!["token:live"]);
}

// ── RedisRestStore ───────────────────────────────────────────────

fn rest_store(server: &MockServer) -> RedisRestStore {
    RedisRestStore::new(RedisRestConfig {
        url: server.uri(),
        token: "test-token".to_string(),
    })
    .unwrap()
}

#[tokio::test]
async fn rest_get_returns_string_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get/token%3Aabc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": "stored-value"
        })))
        .mount(&server)
        .await;

    let store = rest_store(&server);
    let value = store.get("token:abc").await.unwrap();
    assert_eq!(value.as_deref(), Some("stored-value"));
}

#[tokio::test]
async fn rest_get_null_result_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get/token%3Amissing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": null
        })))
        .mount(&server)
        .await;

    let store = rest_store(&server);
    assert!(store.get("token:missing").await.unwrap().is_none());
}

#[tokio::test]
async fn rest_set_posts_body_with_ttl() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/set/token%3Aabc"))
        .and(query_param("EX", "604800"))
        .and(body_string("{\"email\":\"a@b.co\"}"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": "OK"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = rest_store(&server);
    store
        .set("token:abc", "{\"email\":\"a@b.co\"}", Some(604_800))
        .await
        .unwrap();
}

#[tokio::test]
async fn rest_error_envelope_is_backend_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get/token%3Aabc"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": "WRONGPASS invalid token"
        })))
        .mount(&server)
        .await;

    let store = rest_store(&server);
    let err = store.get("token:abc").await.unwrap_err();
    assert!(err.to_string().contains("WRONGPASS"));
}

#[tokio::test]
async fn rest_keys_returns_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/keys/token%3A%2A"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": ["token:a", "token:b"]
        })))
        .mount(&server)
        .await;

    let store = rest_store(&server);
    let keys = store.keys("token:*").await.unwrap();
    assert_eq!(keys, vec!["token:a", "token:b"]);
}

#[test]
fn rest_empty_config_rejected() {
    let result = RedisRestStore::new(RedisRestConfig {
        url: String::new(),
        token: String::new(),
    });
    assert!(result.is_err());
}
