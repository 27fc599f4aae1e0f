//! HTTP tests against the in-memory backend
//!
//! Each test serves the full application (middleware included) on an
//! ephemeral port; no database is needed.

use std::collections::HashMap;
use std::net::SocketAddr;

use blog_api::{create_app, create_app_state, AppState};
use blog_common::AppConfig;
use blog_core::UserId;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// Test server instance; the serving task ends with the runtime
struct TestServer {
    addr: SocketAddr,
    client: Client,
    state: AppState,
}

impl TestServer {
    async fn start() -> Self {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("API_PORT", "0"),
            ("STORAGE_BACKEND", "memory"),
            ("JWT_SECRET", "router-test-secret"),
            ("RATE_LIMIT_REQUESTS_PER_SECOND", "1000"),
            ("RATE_LIMIT_BURST", "1000"),
        ]);
        let config = AppConfig::from_lookup(|key| vars.get(key).map(|v| (*v).to_string())).unwrap();

        let state = create_app_state(config).await.unwrap();
        let app = create_app(state.clone()).unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self {
            addr,
            client: Client::new(),
            state,
        }
    }

    fn token_for(&self, user: &str) -> String {
        self.state
            .jwt_service()
            .issue_token(&UserId::new(user).unwrap())
            .unwrap()
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path))
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.url(path))
    }

    async fn create_post(&self, token: &str) -> String {
        let (status, body) = send(
            self.post("/api/v1/posts").bearer_auth(token).json(&json!({
                "title": "Reconciling votes",
                "excerpt": "How toggles work",
                "content": "Every cast is a toggle or a flip.",
                "category": "engineering"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_str().unwrap().to_string()
    }
}

/// Send a request and parse the JSON body (Null when empty)
async fn send(request: RequestBuilder) -> (StatusCode, Value) {
    let response = request.send().await.unwrap();
    let status = response.status();
    let text = response.text().await.unwrap();
    let body = if text.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).unwrap()
    };
    (status, body)
}

#[tokio::test]
async fn test_health_endpoints() {
    let server = TestServer::start().await;

    let (status, body) = send(server.get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(server.get("/health/ready")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["checks"]["storage"], "healthy");
}

#[tokio::test]
async fn test_vote_sequence_over_http() {
    let server = TestServer::start().await;
    let alice = server.token_for("alice");
    let bob = server.token_for("bob");
    let post_id = server.create_post(&alice).await;

    let upvote = format!("/api/v1/posts/{post_id}/upvote");
    let downvote = format!("/api/v1/posts/{post_id}/downvote");

    let (status, body) = send(server.post(&upvote).bearer_auth(&alice)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["upvote_count"], 1);
    assert_eq!(body["downvote_count"], 0);
    assert_eq!(body["removed"], false);
    assert_eq!(body["vote"], "upvote");

    let (_, body) = send(server.post(&upvote).bearer_auth(&alice)).await;
    assert_eq!(body["upvote_count"], 0);
    assert_eq!(body["removed"], true);
    assert_eq!(body["vote"], Value::Null);

    let (_, body) = send(server.post(&downvote).bearer_auth(&alice)).await;
    assert_eq!(body["downvote_count"], 1);

    let (_, body) = send(server.post(&upvote).bearer_auth(&bob)).await;
    assert_eq!(body["upvote_count"], 1);
    assert_eq!(body["downvote_count"], 1);

    let (status, body) = send(server.get(&format!("/api/v1/posts/{post_id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["score"], 0);

    let (status, body) = send(
        server
            .get(&format!("/api/v1/posts/{post_id}/votes/@me"))
            .bearer_auth(&alice),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["vote"], "downvote");
}

#[tokio::test]
async fn test_single_endpoint_vote() {
    let server = TestServer::start().await;
    let alice = server.token_for("alice");
    let post_id = server.create_post(&alice).await;

    let (status, body) = send(
        server
            .post("/api/v1/posts/vote")
            .bearer_auth(&alice)
            .json(&json!({ "post_id": post_id, "direction": "downvote" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["downvote_count"], 1);
    assert_eq!(body["vote"], "downvote");

    let (status, body) = send(
        server
            .post("/api/v1/posts/vote")
            .bearer_auth(&alice)
            .json(&json!({ "post_id": post_id, "direction": "sideways" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "INVALID_VOTE_DIRECTION");

    // non-positive ids are rejected as bad input in either JSON form
    for post_id in [json!(-5), json!("-5")] {
        let (status, _) = send(
            server
                .post("/api/v1/posts/vote")
                .bearer_auth(&alice)
                .json(&json!({ "post_id": post_id, "direction": "upvote" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{post_id}");
    }

    // the rejected casts left the vote alone
    let (_, body) = send(server.get(&format!("/api/v1/posts/{post_id}"))).await;
    assert_eq!(body["downvote_count"], 1);
}

#[tokio::test]
async fn test_vote_errors() {
    let server = TestServer::start().await;
    let alice = server.token_for("alice");

    let (status, body) = send(server.post("/api/v1/posts/42/upvote")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "MISSING_AUTHORIZATION");

    let (status, _) = send(server.post("/api/v1/posts/42/upvote").bearer_auth("not-a-token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(server.post("/api/v1/posts/42/upvote").bearer_auth(&alice)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "UNKNOWN_POST");

    let (status, body) = send(server.post("/api/v1/posts/abc/upvote").bearer_auth(&alice)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "INVALID_PATH_PARAMETER");
}

#[tokio::test]
async fn test_create_post_validation() {
    let server = TestServer::start().await;
    let alice = server.token_for("alice");

    let (status, body) = send(server.post("/api/v1/posts").bearer_auth(&alice).json(&json!({
        "title": "Hi",
        "excerpt": "short",
        "content": "body text",
        "category": "misc"
    })))
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(body["error"]["details"]["title"].is_array());
}

#[tokio::test]
async fn test_list_posts_newest_first() {
    let server = TestServer::start().await;
    let alice = server.token_for("alice");
    let first = server.create_post(&alice).await;
    let second = server.create_post(&alice).await;

    let (status, body) = send(server.get("/api/v1/posts?limit=10")).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![second.as_str(), first.as_str()]);

    let (_, body) = send(server.get(&format!("/api/v1/posts?before={second}"))).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], first.as_str());
}
