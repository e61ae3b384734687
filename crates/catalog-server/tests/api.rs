//! End-to-end tests driving the full router over the in-memory store.

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use catalog_core::OwnerId;
use catalog_server::auth::create_token;
use catalog_server::{AppState, ServerConfig, build_app};
use catalog_store::TvStore;
use serde_json::{Value, json};
use tower::ServiceExt;

const SECRET: &str = "integration-secret";

struct TestApp {
    state: AppState,
    router: Router,
}

impl TestApp {
    fn new() -> Self {
        let config = ServerConfig {
            jwt_secret: Some(SECRET.to_string()),
            allow_dev_identity: true,
            ..ServerConfig::default()
        };
        let state = AppState::new(TvStore::in_memory(), config);
        let router = build_app(state.clone());
        Self { state, router }
    }

    async fn request(
        &self,
        method: &str,
        uri: &str,
        user: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value, http::HeaderMap) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header("X-User-Id", user);
        }
        let body = match body {
            Some(json) => {
                builder = builder.header("Content-Type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value, headers)
    }

    async fn create(&self, user: &str, manufacturer: &str, model: &str, date: &str) -> Value {
        let (status, body, _) = self
            .request(
                "POST",
                "/tv",
                Some(user),
                Some(tv_body(manufacturer, model, true, date)),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body
    }
}

fn tv_body(manufacturer: &str, model: &str, smart: bool, date: &str) -> Value {
    json!({
        "manufacturer": manufacturer,
        "model": model,
        "isSmart": smart,
        "fabricationDate": date,
        "price": 449.0,
    })
}

fn models(body: &Value) -> Vec<String> {
    body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|tv| tv["model"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let (status, body, headers) = app.request("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn test_missing_identity_is_unauthorized() {
    let app = TestApp::new();
    let (status, body, _) = app.request("GET", "/tv", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_bearer_token_identity() {
    let app = TestApp::new();
    app.create("alice", "Samsung", "a", "2019-01-01").await;

    let token = create_token("alice", SECRET, 1).unwrap();
    let request = Request::builder()
        .uri("/tv")
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(models(&body), vec!["a"]);
}

#[tokio::test]
async fn test_create_assigns_id_owner_and_version() {
    let app = TestApp::new();
    let mut payload = tv_body("Samsung", "43TUS6804", true, "2019-10-10");
    payload["ownerId"] = json!("mallory");
    payload["version"] = json!(7);

    let (status, body, _) = app.request("POST", "/tv", Some("alice"), Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["version"], 1);
    assert_eq!(body["ownerId"], "alice");
    assert!(body["id"].as_str().is_some());
}

#[tokio::test]
async fn test_create_missing_fields_is_bad_request() {
    let app = TestApp::new();
    let (status, body, _) = app
        .request("POST", "/tv", Some("alice"), Some(json!({"manufacturer": "LG"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    let message = body["error"]["message"].as_str().unwrap();
    assert!(message.contains("'model'"));
    assert!(message.contains("'isSmart'"));
}

#[tokio::test]
async fn test_create_wrong_type_is_bad_request() {
    let app = TestApp::new();
    let mut payload = tv_body("LG", "x", true, "2020-01-01");
    payload["isSmart"] = json!("yes");
    let (status, _, _) = app.request("POST", "/tv", Some("alice"), Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_by_id_ownership_statuses() {
    let app = TestApp::new();
    let tv = app.create("alice", "LG", "x", "2020-01-01").await;
    let uri = format!("/tv/{}", tv["id"].as_str().unwrap());

    let (status, body, _) = app.request("GET", &uri, Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, tv);

    let (status, _, _) = app.request("GET", &uri, Some("bob"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let missing = format!("/tv/{}", uuid::Uuid::new_v4());
    let (status, _, _) = app.request("GET", &missing, Some("alice"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = app.request("GET", "/tv/not-a-uuid", Some("alice"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_is_scoped_to_caller() {
    let app = TestApp::new();
    app.create("alice", "Samsung", "a", "2019-01-01").await;
    app.create("bob", "Samsung", "b", "2019-01-01").await;

    let (status, body, _) = app.request("GET", "/tv", Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(models(&body), vec!["a"]);
    assert_eq!(body["totalPages"], 1);
}

#[tokio::test]
async fn test_pagination_second_page() {
    let app = TestApp::new();
    for model in ["m1", "m2", "m3", "m4"] {
        app.create("alice", "Philips", model, "2020-06-06").await;
    }

    let (status, body, _) = app
        .request("GET", "/tv?page=2&limit=2", Some("alice"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(models(&body), vec!["m3", "m4"]);
    assert_eq!(body["totalPages"], 2);
}

#[tokio::test]
async fn test_search_is_case_insensitive() {
    let app = TestApp::new();
    app.create("alice", "Samsung", "50TUS7853", "2019-02-10").await;
    app.create("alice", "LG", "32LWG6000", "2020-07-08").await;
    app.create("alice", "Philips", "SAMple", "2020-06-06").await;

    let (status, body, _) = app.request("GET", "/tv?search=sam", Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(models(&body), vec!["50TUS7853", "SAMple"]);
    assert_eq!(body["totalPages"], 1);
}

#[tokio::test]
async fn test_date_and_type_filters() {
    let app = TestApp::new();
    app.create("alice", "LG", "old", "2018-05-01").await;
    app.create("alice", "LG", "new", "2020-05-01").await;
    app.request(
            "POST",
            "/tv",
            Some("alice"),
            Some(tv_body("LG", "dumb", false, "2020-06-01")),
        )
        .await;

    let (status, body, _) = app
        .request(
            "GET",
            "/tv?startDate=2019-01-01&endDate=2021-01-01&type=smart",
            Some("alice"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(models(&body), vec!["new"]);

    let (status, body, _) = app
        .request("GET", "/tv?type=nonSmart&endDate=undefined", Some("alice"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(models(&body), vec!["dumb"]);
}

#[tokio::test]
async fn test_bad_date_query_is_bad_request() {
    let app = TestApp::new();
    let (status, body, _) = app
        .request("GET", "/tv?startDate=yesterday", Some("alice"), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_QUERY");
}

#[tokio::test]
async fn test_update_increments_version() {
    let app = TestApp::new();
    let tv = app.create("alice", "LG", "x", "2020-01-01").await;
    let uri = format!("/tv/{}", tv["id"].as_str().unwrap());

    let mut payload = tv.clone();
    payload["price"] = json!(199.0);
    let (status, body, _) = app.request("PUT", &uri, Some("alice"), Some(payload)).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["version"], 2);
    assert_eq!(body["price"], 199.0);
    assert_eq!(body["id"], tv["id"]);
}

#[tokio::test]
async fn test_update_version_conflict_body() {
    let app = TestApp::new();
    let tv = app.create("alice", "LG", "x", "2020-01-01").await;
    let uri = format!("/tv/{}", tv["id"].as_str().unwrap());

    let (status, _, _) = app.request("PUT", &uri, Some("alice"), Some(tv.clone())).await;
    assert_eq!(status, StatusCode::OK);

    let mut stale = tv.clone();
    stale["model"] = json!("lost update");
    let (status, body, _) = app.request("PUT", &uri, Some("alice"), Some(stale)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["versionError"], true);
    assert_eq!(body["submittedVersion"], 1);
    assert_eq!(body["storedVersion"], 2);
    assert!(body["message"].as_str().unwrap().contains("latest stored version is 2"));

    let (_, current, _) = app.request("GET", &uri, Some("alice"), None).await;
    assert_eq!(current["model"], "x");
    assert_eq!(current["version"], 2);
}

#[tokio::test]
async fn test_update_id_mismatch() {
    let app = TestApp::new();
    let tv = app.create("alice", "LG", "x", "2020-01-01").await;
    let uri = format!("/tv/{}", tv["id"].as_str().unwrap());

    let mut payload = tv.clone();
    payload["id"] = json!(uuid::Uuid::new_v4().to_string());
    let (status, body, _) = app.request("PUT", &uri, Some("alice"), Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "ID_MISMATCH");
}

#[tokio::test]
async fn test_update_foreign_record_is_forbidden() {
    let app = TestApp::new();
    let tv = app.create("alice", "LG", "x", "2020-01-01").await;
    let uri = format!("/tv/{}", tv["id"].as_str().unwrap());

    let (status, _, _) = app.request("PUT", &uri, Some("bob"), Some(tv.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_delete_statuses() {
    let app = TestApp::new();
    let tv = app.create("alice", "LG", "x", "2020-01-01").await;
    let uri = format!("/tv/{}", tv["id"].as_str().unwrap());

    let (status, _, _) = app.request("DELETE", &uri, Some("bob"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, body, _) = app.request("GET", &uri, Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, tv);

    let (status, body, _) = app.request("DELETE", &uri, Some("alice"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _, _) = app.request("DELETE", &uri, Some("alice"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_mutations_notify_owner_sessions() {
    let app = TestApp::new();
    let mut alice = app.state.hub().subscribe(OwnerId::new("alice")).await;
    let mut bob = app.state.hub().subscribe(OwnerId::new("bob")).await;

    let tv = app.create("alice", "LG", "x", "2020-01-01").await;
    let uri = format!("/tv/{}", tv["id"].as_str().unwrap());
    app.request("PUT", &uri, Some("alice"), Some(tv.clone())).await;
    app.request("DELETE", &uri, Some("alice"), None).await;

    let mut actions = Vec::new();
    for _ in 0..3 {
        let text = alice.receiver.recv().await.unwrap();
        let event: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(event["payload"]["tv"]["id"], tv["id"]);
        actions.push(event["action"].as_str().unwrap().to_string());
    }
    assert_eq!(actions, vec!["create", "update", "delete"]);
    assert!(alice.receiver.try_recv().is_err());
    assert!(bob.receiver.try_recv().is_err());
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = TestApp::new();
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "req-123")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "req-123");
}
