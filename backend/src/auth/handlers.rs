//! Handler functions for authentication-related API endpoints.
//!
//! These functions implement the three credential state transitions (login,
//! refresh, logout), parse request data, and interact with the
//! `auth::service` for core business logic.

use crate::api::common::{ApiResponse, service_error_to_http, validation_error_response};
use crate::auth::models::{LoginRequest, UserInfo};
use crate::auth::service::AuthService;
use crate::database::models::User;
use crate::errors::ServiceError;
use crate::services::user_service::UserService;
use crate::utils::jwt::{TokenCodec, TokenPayload};
use axum::{
    extract::{Extension, Json, Path},
    http::{HeaderMap, StatusCode, header::USER_AGENT},
    response::Json as ResponseJson,
};
use axum_extra::extract::cookie::CookieJar;
use sqlx::SqlitePool;
use uuid::Uuid;
use validator::Validate;

fn token_payload(user: &User) -> TokenPayload {
    TokenPayload {
        user_idx: user.user_idx.clone(),
        user_id: user.user_id.clone(),
        user_nickname: user.user_nickname.clone(),
        user_role: user.user_role,
    }
}

fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn client_device(headers: &HeaderMap) -> String {
    headers
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Handle user login request.
///
/// On success, sets the access, refresh and login-id cookies and responds
/// with the sanitized identity projection. The refresh hash is persisted
/// before any cookie is added to the response: a client must never hold a
/// refresh cookie the server cannot verify.
#[axum::debug_handler]
pub async fn login(
    Extension(pool): Extension<SqlitePool>,
    Extension(codec): Extension<TokenCodec>,
    jar: CookieJar,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, ResponseJson<ApiResponse<UserInfo>>), (StatusCode, String)> {
    if let Err(validation_errors) = payload.validate() {
        return Err(validation_error_response(validation_errors));
    }

    let auth_service = AuthService::new(&pool, codec);

    let user = auth_service
        .authenticate(&payload.user_id, &payload.user_password)
        .await
        .map_err(service_error_to_http)?
        .ok_or_else(|| service_error_to_http(ServiceError::AuthenticationFailed))?;

    let token_payload = token_payload(&user);

    let access_cookies = auth_service
        .access_cookies(&token_payload, false)
        .map_err(service_error_to_http)?;
    let (refresh_cookie, raw_refresh_token) = auth_service
        .refresh_cookie(&token_payload)
        .map_err(service_error_to_http)?;
    let login_id_cookie = auth_service.login_user_id_cookie(&token_payload);

    auth_service
        .persist_refresh_hash(&raw_refresh_token, &user.user_idx)
        .await
        .map_err(service_error_to_http)?;

    let user_service = UserService::new(&pool);
    let login_user = user_service
        .record_last_login(&client_ip(&headers), &client_device(&headers), &user.user_idx)
        .await
        .map_err(service_error_to_http)?;

    tracing::info!("User {} logged in", login_user.user_idx);

    let mut jar = jar;
    for cookie in access_cookies {
        jar = jar.add(cookie);
    }
    jar = jar.add(refresh_cookie).add(login_id_cookie);

    Ok((
        jar,
        ResponseJson(ApiResponse::success(
            UserInfo::from(&login_user),
            "Login successful",
        )),
    ))
}

/// Handle access-token refresh.
///
/// Runs behind the refresh gate (`jwt_refresh_auth`), which has already
/// verified the refresh cookie's signature and its hash against the store
/// and attached the re-fetched identity. A new access token is issued under
/// both the dedicated and the bearer-style cookie names; the refresh token
/// itself is not rotated.
#[axum::debug_handler]
pub async fn refresh(
    Extension(pool): Extension<SqlitePool>,
    Extension(codec): Extension<TokenCodec>,
    Extension(user): Extension<UserInfo>,
    jar: CookieJar,
) -> Result<(CookieJar, ResponseJson<ApiResponse<UserInfo>>), (StatusCode, String)> {
    let auth_service = AuthService::new(&pool, codec);

    let payload = TokenPayload {
        user_idx: user.user_idx.clone(),
        user_id: user.user_id.clone(),
        user_nickname: user.user_nickname.clone(),
        user_role: user.user_role,
    };

    let access_cookies = auth_service
        .access_cookies(&payload, true)
        .map_err(service_error_to_http)?;

    let mut jar = jar;
    for cookie in access_cookies {
        jar = jar.add(cookie);
    }

    Ok((
        jar,
        ResponseJson(ApiResponse::success(user, "Token refreshed")),
    ))
}

/// Handle logout request.
///
/// Clears the stored refresh hash for the subject, then expires all auth
/// cookies. If the store update fails or affects zero rows the error is
/// surfaced and no cookie is touched; silently logging the client out while
/// the server still holds a verifiable session would be worse.
#[axum::debug_handler]
pub async fn logout(
    Extension(pool): Extension<SqlitePool>,
    Extension(codec): Extension<TokenCodec>,
    jar: CookieJar,
    Path(idx): Path<String>,
) -> Result<(CookieJar, ResponseJson<ApiResponse<bool>>), (StatusCode, String)> {
    if Uuid::parse_str(&idx).is_err() {
        return Err(service_error_to_http(ServiceError::validation(
            "Invalid user idx",
        )));
    }

    let auth_service = AuthService::new(&pool, codec);
    let cleared = auth_service
        .clear_refresh_hash(&idx)
        .await
        .map_err(service_error_to_http)?;

    tracing::info!("User {} logged out", idx);

    let mut jar = jar;
    for cookie in auth_service.logout_cookies() {
        jar = jar.add(cookie);
    }

    Ok((
        jar,
        ResponseJson(ApiResponse::success(cleared, "Logout successful")),
    ))
}
