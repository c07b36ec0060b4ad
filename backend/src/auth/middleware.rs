//! Middleware for protecting authenticated routes and handling authorization.
//!
//! Two gates run before handlers: `jwt_auth` verifies the access-token
//! cookie purely cryptographically (no database round-trip per request),
//! and `jwt_refresh_auth` verifies the refresh-token cookie against both
//! its signature and the stored hash. `require_role` runs after a gate and
//! enforces the role set declared by the route. Routes that must stay
//! reachable without a credential (login, account creation, id check)
//! simply carry no gate layer.

use crate::api::common::service_error_to_http;
use crate::auth::models::UserInfo;
use crate::auth::service::AuthService;
use crate::database::models::UserRole;
use crate::errors::ServiceError;
use crate::utils::jwt::{Claims, TokenCodec, TokenKind};
use axum::{
    extract::{Extension, Request},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use sqlx::SqlitePool;

use super::cookies::{ACCESS_COOKIE, REFRESH_COOKIE};

/// Access-token authentication gate.
///
/// Verification here is stateless by design: a token stays valid for its
/// full TTL even after logout. The short TTL bounds that window.
pub async fn jwt_auth(
    Extension(codec): Extension<TokenCodec>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    // A prior gate may already have resolved the identity.
    if request.extensions().get::<Claims>().is_some() {
        return Ok(next.run(request).await);
    }

    let token = jar
        .get(ACCESS_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    match codec.verify(TokenKind::Access, &token) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            Ok(next.run(request).await)
        }
        Err(error) => {
            tracing::debug!("Access token rejected: {}", error);
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

/// Refresh-token gate, used only by the refresh endpoint.
///
/// A refresh token is accepted only if its signature verifies under the
/// refresh secret AND its hash matches the one stored for the claimed
/// subject. The resolved identity is re-fetched from the store so demotions
/// and profile changes take effect on refresh.
pub async fn jwt_refresh_auth(
    Extension(codec): Extension<TokenCodec>,
    Extension(pool): Extension<SqlitePool>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = jar
        .get(REFRESH_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let claims = codec
        .verify(TokenKind::Refresh, &token)
        .map_err(|error| {
            tracing::debug!("Refresh token rejected: {}", error);
            StatusCode::UNAUTHORIZED
        })?;

    let service = AuthService::new(&pool, codec);
    let user = service
        .verify_refresh_against_store(&token, &claims.sub)
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    request.extensions_mut().insert(UserInfo::from(&user));
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Role-based authorization guard, layered inside a gate on routes that
/// declare a required role set. Denials go through the service error
/// taxonomy so the client sees the standard envelope.
pub async fn require_role(
    allowed: &'static [UserRole],
    request: Request,
    next: Next,
) -> Result<Response, (StatusCode, String)> {
    let claims = request
        .extensions()
        .get::<Claims>()
        .ok_or_else(|| service_error_to_http(ServiceError::AuthenticationFailed))?;

    if role_allowed(claims.user_role, allowed) {
        Ok(next.run(request).await)
    } else {
        Err(service_error_to_http(ServiceError::authorization_denied(
            "Role not permitted for this route",
        )))
    }
}

/// An empty role set means any authenticated identity is authorized. There
/// is no role hierarchy: admin passes only where admin is listed.
fn role_allowed(role: UserRole, allowed: &[UserRole]) -> bool {
    allowed.is_empty() || allowed.contains(&role)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_role_set_admits_any_role() {
        assert!(role_allowed(UserRole::User, &[]));
        assert!(role_allowed(UserRole::Admin, &[]));
    }

    #[test]
    fn role_must_be_listed_explicitly() {
        assert!(!role_allowed(UserRole::User, &[UserRole::Admin]));
        assert!(role_allowed(UserRole::Admin, &[UserRole::Admin]));

        // No implicit hierarchy: admin is denied where only user is listed.
        assert!(!role_allowed(UserRole::Admin, &[UserRole::User]));
        assert!(role_allowed(
            UserRole::Admin,
            &[UserRole::User, UserRole::Admin]
        ));
    }
}
