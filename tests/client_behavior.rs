//! Request/recovery behavior of the authenticated HTTP core

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use postline_client::auth::Session;
use postline_client::error::Error;
use postline_client::posts::NewPost;
use postline_client::Postline;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

fn post_json(id: &str, content: &str) -> serde_json::Value {
    json!({
        "id": id,
        "content": content,
        "status": "draft",
        "scheduled_at": null,
        "published_at": null,
        "media_ids": [],
        "source_idea_id": null,
        "created_at": "2025-01-01T00:00:00Z",
        "updated_at": "2025-01-01T00:00:00Z"
    })
}

fn refresh_success() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "access_token": "fresh",
        "refresh_token": "refresh-2",
        "token_type": "bearer",
        "expires_in": 3600
    }))
}

#[tokio::test]
async fn concurrent_requests_share_a_single_refresh() {
    let server = MockServer::start().await;

    // The delayed response keeps the refresh in flight while every task
    // piles up behind it; the mock asserts exactly one call arrives.
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(refresh_success().set_delay(Duration::from_millis(150)))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/posts"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(5)
        .mount(&server)
        .await;

    let postline = Arc::new(Postline::new(&server.uri()));
    postline.auth().set_session(Session {
        access_token: "stale".to_string(),
        refresh_token: "refresh-1".to_string(),
        expires_at: unix_now() - 10,
    });

    let mut handles = Vec::new();
    for _ in 0..5 {
        let postline = postline.clone();
        handles.push(tokio::spawn(async move {
            postline.posts().list(None).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let session = postline.auth().session().unwrap();
    assert_eq!(session.access_token, "fresh");
}

#[tokio::test]
async fn token_inside_skew_window_refreshes_before_sending() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(refresh_success())
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/posts"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let postline = Postline::new(&server.uri());
    // Thirty seconds of life left: not yet elapsed, but inside the
    // sixty-second skew, so it must be treated as expired.
    postline.auth().set_session(Session {
        access_token: "nearly-stale".to_string(),
        refresh_token: "refresh-1".to_string(),
        expires_at: unix_now() + 30,
    });

    postline.posts().list(None).await.unwrap();
}

#[tokio::test]
async fn redriven_post_preserves_method_and_body() {
    let server = MockServer::start().await;
    let body = json!({ "content": "Hello LinkedIn" });

    // The server rejects the stale token once; the redriven request must
    // arrive as the same POST with the same body and only a new token.
    Mock::given(method("POST"))
        .and(path("/api/v1/posts"))
        .and(header("authorization", "Bearer stale"))
        .and(body_json(&body))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "token revoked server-side"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(refresh_success())
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/posts"))
        .and(header("authorization", "Bearer fresh"))
        .and(body_json(&body))
        .respond_with(ResponseTemplate::new(201).set_body_json(post_json("post-1", "Hello LinkedIn")))
        .expect(1)
        .mount(&server)
        .await;

    let postline = Postline::new(&server.uri());
    postline.auth().set_session(Session {
        access_token: "stale".to_string(),
        refresh_token: "refresh-1".to_string(),
        expires_at: unix_now() + 3600,
    });

    let post = postline
        .posts()
        .create(&NewPost::new("Hello LinkedIn"))
        .await
        .unwrap();
    assert_eq!(post.id, "post-1");
}

#[tokio::test]
async fn no_content_resolves_without_a_body_parse() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1/posts/post-1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let postline = Postline::new(&server.uri());
    postline.auth().set_session(Session {
        access_token: "access-1".to_string(),
        refresh_token: "refresh-1".to_string(),
        expires_at: unix_now() + 3600,
    });

    postline.posts().delete("post-1").await.unwrap();
}

#[tokio::test]
async fn validation_details_assemble_in_source_order() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/posts"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "details": [
                { "msg": "A" },
                { "ctx": { "error": "B" } },
                { "type": "C" }
            ]
        })))
        .mount(&server)
        .await;

    let postline = Postline::new(&server.uri());
    postline.auth().set_session(Session {
        access_token: "access-1".to_string(),
        refresh_token: "refresh-1".to_string(),
        expires_at: unix_now() + 3600,
    });

    let err = postline
        .posts()
        .create(&NewPost::new(""))
        .await
        .unwrap_err();

    match err {
        Error::Validation(message) => assert_eq!(message, "A; B; C"),
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[tokio::test]
async fn connection_refused_maps_to_network_error() {
    // Nothing listens on port 1.
    let postline = Postline::new("http://127.0.0.1:1");

    let err = postline.posts().list(None).await.unwrap_err();
    match err {
        Error::Network(_) => {
            assert!(err.to_string().starts_with("Network error:"));
        }
        other => panic!("expected network error, got {:?}", other),
    }
}

#[tokio::test]
async fn missing_social_connection_is_an_empty_state() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/social/linkedin"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "detail": "no connection"
        })))
        .mount(&server)
        .await;

    let postline = Postline::new(&server.uri());
    postline.auth().set_session(Session {
        access_token: "access-1".to_string(),
        refresh_token: "refresh-1".to_string(),
        expires_at: unix_now() + 3600,
    });

    let connection = postline.social().linkedin().await.unwrap();
    assert!(connection.is_none());
}

#[tokio::test]
async fn present_social_connection_deserializes() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/social/linkedin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "provider": "linkedin",
            "account_name": "Maya Chen",
            "connected_at": "2025-03-01T10:00:00Z",
            "expires_at": null
        })))
        .mount(&server)
        .await;

    let postline = Postline::new(&server.uri());
    postline.auth().set_session(Session {
        access_token: "access-1".to_string(),
        refresh_token: "refresh-1".to_string(),
        expires_at: unix_now() + 3600,
    });

    let connection = postline.social().linkedin().await.unwrap().unwrap();
    assert_eq!(connection.account_name, "Maya Chen");
}

#[tokio::test]
async fn media_upload_sends_multipart() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/media"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "media-1",
            "file_name": "chart.png",
            "content_type": "image/png",
            "url": "https://cdn.postline.app/media-1",
            "size_bytes": 4,
            "created_at": "2025-03-01T10:00:00Z"
        })))
        .mount(&server)
        .await;

    let postline = Postline::new(&server.uri());
    postline.auth().set_session(Session {
        access_token: "access-1".to_string(),
        refresh_token: "refresh-1".to_string(),
        expires_at: unix_now() + 3600,
    });

    let asset = postline
        .media()
        .upload("chart.png", "image/png", vec![1, 2, 3, 4])
        .await
        .unwrap();
    assert_eq!(asset.id, "media-1");
}
