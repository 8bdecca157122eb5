//! HTTP API Tests
//!
//! Drives the full router in-process: cookie sessions, authorization on
//! reviewer endpoints, error envelopes and the static pages.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use roomwarden::auth::{Credentials, NewAdmin, PasswordPolicy, ReviewerDirectory};
use roomwarden::config::Config;
use roomwarden::http_server::{build_router, AppState};
use roomwarden::store::SqliteStore;

struct TestApp {
    router: Router,
    _public: tempfile::TempDir,
}

impl TestApp {
    fn new(admins: &[&str]) -> Self {
        let public = tempfile::tempdir().unwrap();
        std::fs::write(public.path().join("index.html"), "<h1>public</h1>").unwrap();
        std::fs::write(public.path().join("admin.html"), "<h1>admin</h1>").unwrap();

        let store = Arc::new(SqliteStore::in_memory().unwrap());
        for username in admins {
            let credentials = Credentials::new(*username, "password123");
            let admin =
                NewAdmin::from_credentials(&credentials, &PasswordPolicy::default()).unwrap();
            store.add(&admin).unwrap();
        }

        let mut config = Config::default();
        config.server.public_dir = public.path().to_path_buf();
        let state = Arc::new(AppState::new(store, &config));

        Self {
            router: build_router(state, &config.server),
            _public: public,
        }
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Option<String>, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        (status, set_cookie, json)
    }

    /// Log in and return the `token=...` pair for the Cookie header
    async fn login(&self, username: &str) -> String {
        let (status, set_cookie, body) = self
            .send(
                Method::POST,
                "/api/login",
                None,
                Some(json!({"username": username, "password": "password123"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], username);

        let set_cookie = set_cookie.unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }

    async fn submit_request(&self, name: &str) -> i64 {
        let (status, _, body) = self
            .send(
                Method::POST,
                "/api/requests",
                None,
                Some(json!({
                    "name": name,
                    "email": "guest@example.com",
                    "reason": "Study group",
                    "requested_date": "2024-05-10",
                    "requested_time": "14:00"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        body["requestId"].as_i64().unwrap()
    }
}

#[tokio::test]
async fn test_login_sets_http_only_cookie() {
    let app = TestApp::new(&["alice"]);
    let (status, set_cookie, _) = app
        .send(
            Method::POST,
            "/api/login",
            None,
            Some(json!({"username": "alice", "password": "password123"})),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    let set_cookie = set_cookie.unwrap();
    assert!(set_cookie.starts_with("token="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Strict"));

    let max_age: i64 = set_cookie
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("Max-Age="))
        .unwrap()
        .parse()
        .unwrap();
    let week = 7 * 24 * 60 * 60;
    assert!(max_age <= week && max_age > week - 60, "max-age {}", max_age);
}

#[tokio::test]
async fn test_bad_credentials_are_unauthorized() {
    let app = TestApp::new(&["alice"]);

    let (status, set_cookie, body) = app
        .send(
            Method::POST,
            "/api/login",
            None,
            Some(json!({"username": "alice", "password": "wrong-password"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(set_cookie.is_none());
    assert!(body["error"].is_string());

    let (status, _, _) = app
        .send(
            Method::POST,
            "/api/login",
            None,
            Some(json!({"username": "alice"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reviewer_endpoints_require_session() {
    let app = TestApp::new(&["alice"]);

    for (method, uri) in [
        (Method::GET, "/api/verify"),
        (Method::GET, "/api/requests"),
        (Method::GET, "/api/admins"),
        (Method::POST, "/api/occupy"),
        (Method::POST, "/api/release"),
    ] {
        let (status, _, _) = app.send(method, uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", uri);
    }

    let (status, _, _) = app
        .send(Method::GET, "/api/verify", Some("token=garbage"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_revokes_session() {
    let app = TestApp::new(&["alice"]);
    let cookie = app.login("alice").await;

    let (status, _, body) = app
        .send(Method::GET, "/api/verify", Some(&cookie), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["authenticated"], true);

    let (status, set_cookie, _) = app
        .send(Method::POST, "/api/logout", Some(&cookie), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(set_cookie.unwrap().contains("Max-Age=0"));

    let (status, _, _) = app
        .send(Method::GET, "/api/verify", Some(&cookie), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_room_occupancy_flow() {
    let app = TestApp::new(&["alice"]);

    let (status, _, body) = app.send(Method::GET, "/api/status", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isOccupied"], false);
    assert!(body["occupiedBy"].is_null());
    assert!(body["occupiedSince"].is_null());
    assert_eq!(body["roomName"], "Sala");

    let cookie = app.login("alice").await;
    let (status, _, body) = app
        .send(Method::POST, "/api/occupy", Some(&cookie), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["status"]["isOccupied"], true);
    assert_eq!(body["status"]["occupiedBy"], "alice");

    let (_, _, body) = app.send(Method::GET, "/api/status", None, None).await;
    assert_eq!(body["occupiedBy"], "alice");
    assert!(body["occupiedSince"].is_i64());

    let (_, _, body) = app
        .send(Method::POST, "/api/release", Some(&cookie), None)
        .await;
    assert_eq!(body["status"]["isOccupied"], false);
    assert!(body["status"]["occupiedBy"].is_null());
}

#[tokio::test]
async fn test_request_review_flow() {
    let app = TestApp::new(&["alice", "bob"]);
    let alice = app.login("alice").await;
    let bob = app.login("bob").await;

    let id = app.submit_request("Grace Hopper").await;

    let (status, _, body) = app
        .send(Method::GET, &format!("/api/requests/{}", id), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["finalStatus"], "pending");
    assert_eq!(body["totalAdmins"], 2);

    let review_uri = format!("/api/requests/{}/review", id);
    let (status, _, body) = app
        .send(
            Method::POST,
            &review_uri,
            Some(&alice),
            Some(json!({"decision": "rejected"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["newStatus"], "pending");

    let (status, _, body) = app
        .send(
            Method::POST,
            &review_uri,
            Some(&alice),
            Some(json!({"decision": "approved"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (_, _, body) = app
        .send(
            Method::POST,
            &review_uri,
            Some(&bob),
            Some(json!({"decision": "rejected"})),
        )
        .await;
    assert_eq!(body["newStatus"], "rejected");

    let (status, _, body) = app
        .send(Method::GET, "/api/requests", Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["finalStatus"], "rejected");
    assert_eq!(rows[0]["rejections"], 2);
    assert_eq!(rows[0]["total_admins"], 2);

    let (status, _, body) = app
        .send(Method::GET, &format!("/api/requests/{}", id), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let reviews = body["reviews"].as_array().unwrap();
    assert_eq!(reviews.len(), 2);
    assert_eq!(reviews[0]["admin_username"], "bob");
    assert_eq!(reviews[1]["admin_username"], "alice");
}

#[tokio::test]
async fn test_request_validation_and_not_found() {
    let app = TestApp::new(&["alice"]);
    let cookie = app.login("alice").await;

    let (status, _, body) = app
        .send(
            Method::POST,
            "/api/requests",
            None,
            Some(json!({"name": "Al", "requested_date": "2024-05-10", "requested_time": "09:00"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (_, _, body) = app
        .send(Method::GET, "/api/requests", Some(&cookie), None)
        .await;
    assert!(body.as_array().unwrap().is_empty());

    let (status, _, _) = app
        .send(Method::GET, "/api/requests/999", None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, body) = app
        .send(Method::GET, "/api/requests/not-a-number", None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Request not found");

    let (status, _, _) = app
        .send(
            Method::POST,
            "/api/requests/abc/review",
            Some(&cookie),
            Some(json!({"decision": "approved"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = app
        .send(Method::DELETE, "/api/requests/abc", Some(&cookie), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let id = app.submit_request("Ada Lovelace").await;
    let (status, _, _) = app
        .send(
            Method::POST,
            &format!("/api/requests/{}/review", id),
            Some(&cookie),
            Some(json!({"decision": "maybe"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = app
        .send(Method::DELETE, &format!("/api/requests/{}", id), Some(&cookie), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _, _) = app
        .send(Method::GET, &format!("/api/requests/{}", id), None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_management() {
    let app = TestApp::new(&["alice"]);
    let cookie = app.login("alice").await;

    let (status, _, body) = app
        .send(
            Method::POST,
            "/api/admins",
            Some(&cookie),
            Some(json!({"username": "bob", "password": "short"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _, body) = app
        .send(
            Method::POST,
            "/api/admins",
            Some(&cookie),
            Some(json!({"username": "bob", "password": "longenough"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _, _) = app
        .send(
            Method::POST,
            "/api/admins",
            Some(&cookie),
            Some(json!({"username": "bob", "password": "longenough"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, _, body) = app
        .send(Method::GET, "/api/admins", Some(&cookie), None)
        .await;
    let admins = body.as_array().unwrap();
    assert_eq!(admins.len(), 2);
    assert!(admins.iter().all(|a| a.get("password_hash").is_none()));

    let alice_id = admins[0]["id"].as_i64().unwrap();
    let bob_id = admins[1]["id"].as_i64().unwrap();

    let (status, _, _) = app
        .send(
            Method::DELETE,
            &format!("/api/admins/{}", alice_id),
            Some(&cookie),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = app
        .send(
            Method::DELETE,
            &format!("/api/admins/{}", bob_id),
            Some(&cookie),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = app
        .send(
            Method::DELETE,
            &format!("/api/admins/{}", bob_id),
            Some(&cookie),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_static_pages() {
    let app = TestApp::new(&[]);

    let request = Request::builder().uri("/admin").body(Body::empty()).unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"<h1>admin</h1>");

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"<h1>public</h1>");
}
