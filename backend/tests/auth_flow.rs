//! End-to-end tests for the credential lifecycle and route gating.
//!
//! Each test builds the full router over an in-memory database and drives
//! it with `tower::ServiceExt::oneshot`, asserting on status codes, cookie
//! headers and response bodies the way a browser client would observe them.

use axum::Router;
use axum::body::Body;
use axum::http::{
    Request, StatusCode,
    header::{CONTENT_TYPE, COOKIE, SET_COOKIE},
};
use echeck_backend::app;
use echeck_backend::config::Config;
use echeck_backend::database::MIGRATOR;
use echeck_backend::database::models::{CreateUser, UserRole};
use echeck_backend::services::user_service::UserService;
use echeck_backend::utils::jwt::{Claims, TokenCodec};
use jsonwebtoken::{EncodingKey, Header};
use serde_json::{Value, json};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

const ACCESS_SECRET: &str = "access-secret-for-tests";
const REFRESH_SECRET: &str = "refresh-secret-for-tests";

fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        max_connections: 1,
        acquire_timeout_seconds: 3,
        server_port: 0,
        access_token_secret: ACCESS_SECRET.to_string(),
        refresh_token_secret: REFRESH_SECRET.to_string(),
        access_token_ttl_seconds: 3600,
        refresh_token_ttl_seconds: 7200,
    }
}

async fn test_app() -> (Router, SqlitePool) {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    MIGRATOR.run(&pool).await.unwrap();

    let codec = TokenCodec::new(&test_config());
    (app(pool.clone(), codec), pool)
}

async fn seed_user(pool: &SqlitePool, user_id: &str, admin: bool) -> String {
    let service = UserService::new(pool);
    let user = service
        .create_user(CreateUser {
            user_id: user_id.to_string(),
            user_password: "Tbell1234!!".to_string(),
            user_nickname: "hj.park".to_string(),
            user_email: "hj.park@tbell.co.kr".to_string(),
        })
        .await
        .unwrap();

    if admin {
        service.toggle_role(&user.user_idx).await.unwrap();
    }

    user.user_idx
}

fn login_request(user_id: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "user_id": user_id, "user_password": password }).to_string(),
        ))
        .unwrap()
}

/// Returns the `name=value` pair from the first `Set-Cookie` header for the
/// given cookie name, if any.
fn set_cookie_pair(response: &axum::response::Response, name: &str) -> Option<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with(&format!("{}=", name)))
        .map(|value| value.split(';').next().unwrap().to_string())
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn login_sets_session_cookies_and_sanitizes_body() {
    let (app, pool) = test_app().await;
    seed_user(&pool, "tbell123", false).await;

    let response = app
        .oneshot(login_request("tbell123", "Tbell1234!!"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let access = set_cookie_pair(&response, "LOGIN_TOKEN").unwrap();
    let refresh = set_cookie_pair(&response, "REFRESH_LOGIN_TOKEN").unwrap();
    let login_id = set_cookie_pair(&response, "LOGIN_USER_ID").unwrap();
    assert!(access.len() > "LOGIN_TOKEN=".len());
    assert!(refresh.len() > "REFRESH_LOGIN_TOKEN=".len());
    assert_eq!(login_id, "LOGIN_USER_ID=tbell123");

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["user_id"], "tbell123");
    assert_eq!(body["data"]["user_role"], "user");
    assert!(body["data"].get("user_password").is_none());
    assert!(body["data"].get("current_hashed_refresh_token").is_none());
}

#[tokio::test]
async fn login_rejects_bad_credentials_without_detail() {
    let (app, pool) = test_app().await;
    seed_user(&pool, "tbell123", false).await;

    let wrong_password = app
        .clone()
        .oneshot(login_request("tbell123", "WrongPass1!"))
        .await
        .unwrap();
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookie_pair(&wrong_password, "LOGIN_TOKEN").is_none());

    let unknown_id = app
        .oneshot(login_request("nobody", "Tbell1234!!"))
        .await
        .unwrap();
    assert_eq!(unknown_id.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn refresh_reissues_access_token_under_both_cookie_names() {
    let (app, pool) = test_app().await;
    seed_user(&pool, "tbell123", false).await;

    let login = app
        .clone()
        .oneshot(login_request("tbell123", "Tbell1234!!"))
        .await
        .unwrap();
    let refresh_cookie = set_cookie_pair(&login, "REFRESH_LOGIN_TOKEN").unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/refresh")
                .header(COOKIE, &refresh_cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(set_cookie_pair(&response, "LOGIN_TOKEN").is_some());
    assert!(set_cookie_pair(&response, "Authorization").is_some());
    // The refresh token itself is not rotated.
    assert!(set_cookie_pair(&response, "REFRESH_LOGIN_TOKEN").is_none());

    let body = body_json(response).await;
    assert_eq!(body["data"]["user_id"], "tbell123");
}

#[tokio::test]
async fn refresh_without_cookie_is_unauthorized() {
    let (app, _pool) = test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/refresh")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn second_login_invalidates_first_refresh_token() {
    let (app, pool) = test_app().await;
    seed_user(&pool, "tbell123", false).await;

    let first = app
        .clone()
        .oneshot(login_request("tbell123", "Tbell1234!!"))
        .await
        .unwrap();
    let first_refresh = set_cookie_pair(&first, "REFRESH_LOGIN_TOKEN").unwrap();

    // Token timestamps have second resolution; make sure the second login
    // issues a distinct refresh token.
    tokio::time::sleep(std::time::Duration::from_millis(1100)).await;

    let _second = app
        .clone()
        .oneshot(login_request("tbell123", "Tbell1234!!"))
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/refresh")
                .header(COOKIE, &first_refresh)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_clears_cookies_and_revokes_refresh_token() {
    let (app, pool) = test_app().await;
    let user_idx = seed_user(&pool, "tbell123", false).await;

    let login = app
        .clone()
        .oneshot(login_request("tbell123", "Tbell1234!!"))
        .await
        .unwrap();
    let access_cookie = set_cookie_pair(&login, "LOGIN_TOKEN").unwrap();
    let refresh_cookie = set_cookie_pair(&login, "REFRESH_LOGIN_TOKEN").unwrap();

    let logout = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/auth/logout/{}", user_idx))
                .header(COOKIE, &access_cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(logout.status(), StatusCode::OK);
    // All four cookie names are expired.
    for name in [
        "LOGIN_TOKEN",
        "Authorization",
        "REFRESH_LOGIN_TOKEN",
        "LOGIN_USER_ID",
    ] {
        assert_eq!(set_cookie_pair(&logout, name).unwrap(), format!("{}=", name));
    }

    // The refresh token the client still holds no longer works.
    let refresh = app
        .oneshot(
            Request::builder()
                .uri("/auth/refresh")
                .header(COOKIE, &refresh_cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(refresh.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn double_logout_reports_not_found_and_touches_no_cookies() {
    let (app, pool) = test_app().await;
    let user_idx = seed_user(&pool, "tbell123", false).await;

    let login = app
        .clone()
        .oneshot(login_request("tbell123", "Tbell1234!!"))
        .await
        .unwrap();
    let access_cookie = set_cookie_pair(&login, "LOGIN_TOKEN").unwrap();

    let logout_uri = format!("/auth/logout/{}", user_idx);
    let first = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(&logout_uri)
                .header(COOKIE, &access_cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    // The access token is stateless and still verifies, but the stored hash
    // is already null.
    let second = app
        .oneshot(
            Request::builder()
                .uri(&logout_uri)
                .header(COOKIE, &access_cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(second.status(), StatusCode::NOT_FOUND);
    assert!(second.headers().get(SET_COOKIE).is_none());
}

#[tokio::test]
async fn logout_rejects_malformed_idx() {
    let (app, pool) = test_app().await;
    seed_user(&pool, "tbell123", false).await;

    let login = app
        .clone()
        .oneshot(login_request("tbell123", "Tbell1234!!"))
        .await
        .unwrap();
    let access_cookie = set_cookie_pair(&login, "LOGIN_TOKEN").unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/logout/not-a-uuid")
                .header(COOKIE, &access_cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_listing_enforces_role_without_hierarchy() {
    let (app, pool) = test_app().await;
    seed_user(&pool, "tbell123", false).await;
    seed_user(&pool, "admin01", true).await;

    // No credential at all.
    let anonymous = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/user/user_all")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    // Authenticated but not admin.
    let user_login = app
        .clone()
        .oneshot(login_request("tbell123", "Tbell1234!!"))
        .await
        .unwrap();
    let user_cookie = set_cookie_pair(&user_login, "LOGIN_TOKEN").unwrap();
    let forbidden = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/user/user_all")
                .header(COOKIE, &user_cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

    // The denial uses the standard error envelope.
    let forbidden_body = body_json(forbidden).await;
    assert_eq!(forbidden_body["success"], false);
    assert_eq!(forbidden_body["error"]["error_type"], "permission_denied");

    // Admin.
    let admin_login = app
        .clone()
        .oneshot(login_request("admin01", "Tbell1234!!"))
        .await
        .unwrap();
    let admin_cookie = set_cookie_pair(&admin_login, "LOGIN_TOKEN").unwrap();
    let allowed = app
        .oneshot(
            Request::builder()
                .uri("/user/user_all?take=10&page=1")
                .header(COOKIE, &admin_cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(allowed.status(), StatusCode::OK);

    let body = body_json(allowed).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["pagination"]["total_items"], 2);
}

#[tokio::test]
async fn expired_refresh_token_is_rejected() {
    let (app, pool) = test_app().await;
    let user_idx = seed_user(&pool, "tbell123", false).await;

    // Signed with the real refresh secret but already expired, well past
    // the verifier's leeway.
    let now = chrono::Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: user_idx,
        user_id: "tbell123".to_string(),
        user_nickname: "hj.park".to_string(),
        user_role: UserRole::User,
        exp: now - 3600,
        iat: now - 7200,
    };
    let token = jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(REFRESH_SECRET.as_bytes()),
    )
    .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/refresh")
                .header(COOKIE, format!("REFRESH_LOGIN_TOKEN={}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn access_token_does_not_pass_the_refresh_gate() {
    let (app, pool) = test_app().await;
    seed_user(&pool, "tbell123", false).await;

    let login = app
        .clone()
        .oneshot(login_request("tbell123", "Tbell1234!!"))
        .await
        .unwrap();
    let access_token = set_cookie_pair(&login, "LOGIN_TOKEN")
        .unwrap()
        .split_once('=')
        .unwrap()
        .1
        .to_string();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/refresh")
                .header(COOKIE, format!("REFRESH_LOGIN_TOKEN={}", access_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn registration_and_id_probe_are_open_endpoints() {
    let (app, _pool) = test_app().await;

    let created = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/user/create_user")
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({
                        "user_id": "tbell123",
                        "user_password": "Tbell1234!!",
                        "user_nickname": "hj.park",
                        "user_email": "hj.park@tbell.co.kr"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::OK);

    let body = body_json(created).await;
    assert_eq!(body["data"]["user_id"], "tbell123");
    assert!(body["data"].get("user_password").is_none());

    let taken = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/user/check_user?user_id=tbell123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(taken.status(), StatusCode::OK);
    assert_eq!(body_json(taken).await["data"], true);

    let available = app
        .oneshot(
            Request::builder()
                .uri("/user/check_user?user_id=someone_else")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(body_json(available).await["data"], false);
}

#[tokio::test]
async fn read_user_requires_a_credential() {
    let (app, pool) = test_app().await;
    let user_idx = seed_user(&pool, "tbell123", false).await;

    let anonymous = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/user/read_user?idx={}", user_idx))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let login = app
        .clone()
        .oneshot(login_request("tbell123", "Tbell1234!!"))
        .await
        .unwrap();
    let access_cookie = set_cookie_pair(&login, "LOGIN_TOKEN").unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/user/read_user?idx={}", user_idx))
                .header(COOKIE, &access_cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["user_id"], "tbell123");
}
