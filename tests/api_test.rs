//! End-to-end tests for the search endpoint.
//!
//! The real router runs on an ephemeral port; the GitHub API is stubbed
//! with wiremock.

use std::sync::Arc;

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use repolang::api;
use repolang::api::envelope::{ErrorEnvelope, ListEnvelope};
use repolang::cache::MemoryCache;
use repolang::config::Config;
use repolang::github::GitHubClient;
use repolang::state::AppState;

fn http_client() -> Client {
    Client::builder().no_proxy().build().unwrap()
}

/// Start the proxy against `upstream` and return its base URL.
async fn spawn_app(upstream: &MockServer, config: Config) -> String {
    let config = Config {
        api_base_url: Some(upstream.uri()),
        ..config
    };
    let transport = Arc::new(GitHubClient::with_client(http_client()));
    let state = AppState::with_parts(config, transport, Arc::new(MemoryCache::new()));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, api::router(state)).await.unwrap();
    });

    format!("http://{}", addr)
}

fn item(upstream: &MockServer, owner: &str, name: &str, license: Option<&str>) -> Value {
    json!({
        "id": name.len(),
        "name": name,
        "full_name": format!("{}/{}", owner, name),
        "owner": { "login": owner },
        "description": format!("{} description", name),
        "html_url": format!("https://github.com/{}/{}", owner, name),
        "languages_url": format!("{}/repos/{}/{}/languages", upstream.uri(), owner, name),
        "license": license.map(|key| json!({ "key": key })),
        "size": 156464,
        "created_at": "2024-10-19T10:17:16Z",
        "updated_at": "2024-10-20T16:36:13Z"
    })
}

/// Stub a search returning two repositories, each with its own languages.
async fn mount_two_repositories(upstream: &MockServer, q: &str, expected_searches: u64) {
    let body = json!({
        "total_count": 606814,
        "incomplete_results": false,
        "items": [
            item(upstream, "alice", "one", Some("apache-2.0")),
            item(upstream, "bob", "two", None),
        ]
    });

    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .and(query_param("q", q))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(expected_searches)
        .mount(upstream)
        .await;
}

async fn mount_languages(upstream: &MockServer, full_name: &str, body: Value, expected: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/repos/{}/languages", full_name)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(expected)
        .mount(upstream)
        .await;
}

#[tokio::test]
async fn test_search_with_filters() {
    let upstream = MockServer::start().await;
    mount_two_repositories(&upstream, "is:public language:Python license:apache2.0", 1).await;
    mount_languages(&upstream, "alice/one", json!({ "Python": 1548, "Shell": 250 }), 1).await;
    mount_languages(&upstream, "bob/two", json!({ "Go": 42 }), 1).await;

    let app = spawn_app(&upstream, Config::default()).await;
    let response = http_client()
        .get(format!("{}/repos?language=Python&license=apache2.0", app))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let envelope: ListEnvelope = response.json().await.unwrap();
    assert_eq!(envelope.total_count, 606814);
    assert_eq!(envelope.count, 2);
    assert!(!envelope.incomplete_result);
    assert!(envelope.next.contains("page=2"));
    assert!(envelope.previous.is_null);
    assert_eq!(envelope.page, 1);

    let one = &envelope.content[0];
    assert_eq!(one.full_name, "alice/one");
    assert_eq!(one.owner, "alice");
    assert_eq!(one.repository, "one");
    assert_eq!(one.repository_url, "https://github.com/alice/one");
    assert_eq!(one.license.value, "apache-2.0");
    assert_eq!(one.languages["Python"].bytes, 1548);
    assert_eq!(one.languages["Shell"].bytes, 250);

    let two = &envelope.content[1];
    assert_eq!(two.full_name, "bob/two");
    assert!(two.license.is_null);
    assert_eq!(two.languages["Go"].bytes, 42);
}

#[tokio::test]
async fn test_wire_shape() {
    let upstream = MockServer::start().await;
    mount_two_repositories(&upstream, "is:public", 1).await;
    mount_languages(&upstream, "alice/one", json!({ "Rust": 10 }), 1).await;
    mount_languages(&upstream, "bob/two", json!({}), 1).await;

    let app = spawn_app(&upstream, Config::default()).await;
    let body: Value = http_client()
        .get(format!("{}/repos", app))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    for key in [
        "total_count",
        "count",
        "content",
        "incomplete_result",
        "page",
        "previous",
        "next",
    ] {
        assert!(body.get(key).is_some(), "missing {}", key);
    }
    assert_eq!(body["previous"], json!({ "value": "", "is_null": true }));

    let repo = &body["content"][0];
    assert_eq!(repo["languages"], json!({ "Rust": { "bytes": 10 } }));
    assert_eq!(repo["license"], json!({ "value": "apache-2.0", "is_null": false }));
    assert_eq!(repo["size"], 156464);
    assert_eq!(repo["created_at"], "2024-10-19T10:17:16Z");
}

#[tokio::test]
async fn test_first_page_has_previous_link() {
    let upstream = MockServer::start().await;
    mount_two_repositories(&upstream, "is:public", 1).await;
    mount_languages(&upstream, "alice/one", json!({ "Rust": 1 }), 1).await;
    mount_languages(&upstream, "bob/two", json!({ "C": 2 }), 1).await;

    let app = spawn_app(&upstream, Config::default()).await;
    let envelope: ListEnvelope = http_client()
        .get(format!("{}/repos?page=1", app))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert!(!envelope.previous.is_null);
    assert!(envelope.previous.value.contains("page=0"));
    assert!(envelope.next.contains("page=2"));
}

#[tokio::test]
async fn test_unsupported_parameter_rejected() {
    let upstream = MockServer::start().await;
    let app = spawn_app(&upstream, Config::default()).await;

    let response = http_client()
        .get(format!("{}/repos?unsupported=x&limit=500", app))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let envelope: ErrorEnvelope = response.json().await.unwrap();
    assert_eq!(envelope.status, 400);
    assert_eq!(envelope.reasons.len(), 2);
    assert!(envelope.reasons.iter().any(|r| r.contains("unsupported")));
    assert!(envelope.reasons.iter().any(|r| r.contains("limit 500")));
    assert!(upstream.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_non_get_rejected() {
    let upstream = MockServer::start().await;
    let app = spawn_app(&upstream, Config::default()).await;

    let response = http_client()
        .post(format!("{}/repos", app))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let envelope: ErrorEnvelope = response.json().await.unwrap();
    assert_eq!(envelope.reasons, vec!["GET only endpoint".to_string()]);
}

#[tokio::test]
async fn test_unsupported_api_version() {
    let upstream = MockServer::start().await;
    let config = Config {
        api_version: "1999-01-01".to_string(),
        ..Config::default()
    };
    let app = spawn_app(&upstream, config).await;

    let response = http_client()
        .get(format!("{}/repos", app))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_upstream_failure() {
    let upstream = MockServer::start().await;
    Mock::given(path("/search/repositories"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&upstream)
        .await;

    let app = spawn_app(&upstream, Config::default()).await;
    let response = http_client()
        .get(format!("{}/repos", app))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let envelope: ErrorEnvelope = response.json().await.unwrap();
    assert_eq!(envelope.status, 500);
    assert_eq!(envelope.reasons.len(), 1);
}

#[tokio::test]
async fn test_partial_failure_is_not_cached() {
    let upstream = MockServer::start().await;
    mount_two_repositories(&upstream, "is:public", 2).await;
    mount_languages(&upstream, "alice/one", json!({ "Rust": 1 }), 1).await;
    Mock::given(path("/repos/bob/two/languages"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&upstream)
        .await;

    let app = spawn_app(&upstream, Config::default()).await;
    for _ in 0..2 {
        let response = http_client()
            .get(format!("{}/repos", app))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let envelope: ListEnvelope = response.json().await.unwrap();
        assert!(envelope.incomplete_result);
        assert_eq!(envelope.count, 2);
        assert_eq!(envelope.content[1].full_name, "bob/two");
        assert!(envelope.content[1].languages.is_empty());
        assert_eq!(envelope.content[0].languages["Rust"].bytes, 1);
    }
}

#[tokio::test]
async fn test_repeated_request_served_from_cache() {
    let upstream = MockServer::start().await;
    mount_two_repositories(&upstream, "is:public language:Rust", 1).await;
    mount_languages(&upstream, "alice/one", json!({ "Rust": 1 }), 1).await;
    mount_languages(&upstream, "bob/two", json!({ "Rust": 2 }), 1).await;

    let app = spawn_app(&upstream, Config::default()).await;
    let mut bodies = Vec::new();
    for _ in 0..3 {
        let body: Value = http_client()
            .get(format!("{}/repos?language=Rust", app))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        bodies.push(body);
    }

    assert_eq!(bodies[0], bodies[1]);
    assert_eq!(bodies[1], bodies[2]);
}

#[tokio::test]
async fn test_limit_and_page_forwarded() {
    let upstream = MockServer::start().await;
    Mock::given(path("/search/repositories"))
        .and(query_param("per_page", "5"))
        .and(query_param("page", "3"))
        .and(query_param("sort", "stars"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "total_count": 0, "incomplete_results": false, "items": [] })),
        )
        .expect(1)
        .mount(&upstream)
        .await;

    let app = spawn_app(&upstream, Config::default()).await;
    let envelope: ListEnvelope = http_client()
        .get(format!("{}/repos?limit=5&page=3&sort=stars", app))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(envelope.count, 0);
    assert_eq!(envelope.page, 3);
    assert!(envelope.previous.value.contains("page=2"));
    assert!(envelope.next.contains("page=4"));
}

#[tokio::test]
async fn test_ping() {
    let upstream = MockServer::start().await;
    let app = spawn_app(&upstream, Config::default()).await;

    let body: Value = http_client()
        .get(format!("{}/ping", app))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, json!({ "status": "pong" }));
}
