//! Integration tests — `/api/session` and `/api/health` through the full router.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration, Utc};
use common::{USER_ID, get_authed, json_body, test_app};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn health_reports_version_without_database() {
    let server = MockServer::start().await;
    let app = test_app(&server);

    let req = Request::builder()
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();
    let resp = app.send(req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let json = json_body(resp).await;
    assert_eq!(json["version"], castnote_core::version());
    assert_eq!(json["dbConnected"], false);
}

#[tokio::test]
async fn session_requires_app_token() {
    let server = MockServer::start().await;
    let app = test_app(&server);

    let req = Request::builder()
        .uri("/api/session")
        .body(Body::empty())
        .unwrap();
    let resp = app.send(req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(resp).await["error"], "unauthorized");
}

#[tokio::test]
async fn session_rejects_token_signed_with_other_secret() {
    let server = MockServer::start().await;
    let app = test_app(&server);
    let forged =
        castnote_core::auth::jwt::generate_session_token(USER_ID, b"other-secret").unwrap();

    let req = Request::builder()
        .uri("/api/session")
        .header("authorization", format!("Bearer {forged}"))
        .body(Body::empty())
        .unwrap();
    let resp = app.send(req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn session_without_credential_is_unauthenticated() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    let app = test_app(&server);

    let resp = app.send(get_authed("/api/session")).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        json_body(resp).await,
        serde_json::json!({"userId": USER_ID, "error": "unauthenticated"})
    );
}

#[tokio::test]
async fn session_returns_fresh_token_without_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    let app = test_app(&server);
    app.seed("A1", Utc::now() + Duration::minutes(30)).await;

    let resp = app.send(get_authed("/api/session")).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let json = json_body(resp).await;
    assert_eq!(json["accessToken"], "A1");
    assert!(json.get("error").is_none());
}

#[tokio::test]
async fn session_refreshes_expired_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=R1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "A2",
            "token_type": "Bearer",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;
    let app = test_app(&server);
    let old_expiry = Utc::now() - Duration::seconds(10);
    app.seed("A1", old_expiry).await;

    let resp = app.send(get_authed("/api/session")).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let json = json_body(resp).await;
    assert_eq!(json["accessToken"], "A2");

    let stored = app.stored().await;
    assert_eq!(stored.access_token, "A2");
    assert_eq!(stored.refresh_token, "R1");
    assert!(stored.expires_at > Utc::now() + Duration::seconds(3500));
}

#[tokio::test]
async fn session_reports_reauth_on_invalid_grant() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(serde_json::json!({"error": "invalid_grant"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    let app = test_app(&server);
    app.seed("A1", Utc::now() - Duration::seconds(10)).await;

    let resp = app.send(get_authed("/api/session")).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let json = json_body(resp).await;
    assert_eq!(json["error"], "reauth-required");
    assert!(json.get("accessToken").is_none());

    let stored = app.stored().await;
    assert_eq!(stored.access_token, "A1");
    assert_eq!(stored.refresh_token, "R1");
}

#[tokio::test]
async fn session_accepts_cookie() {
    let server = MockServer::start().await;
    let app = test_app(&server);
    app.seed("A1", Utc::now() + Duration::minutes(30)).await;
    let token = common::bearer().trim_start_matches("Bearer ").to_string();

    let req = Request::builder()
        .uri("/api/session")
        .header("cookie", format!("castnote_session={token}"))
        .body(Body::empty())
        .unwrap();
    let resp = app.send(req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["accessToken"], "A1");
}

#[tokio::test]
async fn concurrent_sessions_refresh_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"access_token": "A2", "expires_in": 3600}))
                .set_delay(std::time::Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;
    let app = test_app(&server);
    app.seed("A1", Utc::now() - Duration::seconds(10)).await;

    let (a, b) = tokio::join!(
        app.send(get_authed("/api/session")),
        app.send(get_authed("/api/session")),
    );

    assert_eq!(json_body(a).await["accessToken"], "A2");
    assert_eq!(json_body(b).await["accessToken"], "A2");
}
