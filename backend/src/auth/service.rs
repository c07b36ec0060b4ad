//! Core business logic for the authentication system.
//!
//! Orchestrates the credential lifecycle: password verification, cookie
//! issuance for both token classes, server-side storage of the hashed
//! refresh token and its later verification, and cookie invalidation on
//! logout. Only the refresh token's hash ever touches the database; the
//! plaintext token lives exclusively in the client cookie.

use crate::auth::cookies;
use crate::database::models::User;
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::user_repository::UserRepository;
use crate::utils::jwt::{TokenCodec, TokenKind, TokenPayload};
use axum_extra::extract::cookie::Cookie;
use bcrypt::DEFAULT_COST;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;

/// Refresh tokens are longer than bcrypt's 72-byte input limit, and two
/// tokens for the same subject share a long common prefix. Digesting first
/// makes the full token participate in the comparison.
fn refresh_token_digest(raw_refresh_token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw_refresh_token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Authentication service for handling login, token issuance and refresh
/// session management.
pub struct AuthService<'a> {
    pool: &'a SqlitePool,
    codec: TokenCodec,
}

impl<'a> AuthService<'a> {
    pub fn new(pool: &'a SqlitePool, codec: TokenCodec) -> Self {
        AuthService { pool, codec }
    }

    /// Verifies a login id and password against the stored hash. This is the
    /// only place plaintext passwords are handled; they are never logged or
    /// persisted. Returns `None` on unknown id or wrong password without
    /// distinguishing the two.
    pub async fn authenticate(
        &self,
        user_id: &str,
        password: &str,
    ) -> ServiceResult<Option<User>> {
        let repo = UserRepository::new(self.pool);
        let Some(user) = repo.find_by_user_id(user_id).await? else {
            return Ok(None);
        };

        let matches = bcrypt::verify(password, &user.user_password)
            .map_err(|e| ServiceError::internal_error(format!("Password verification failed: {}", e)))?;

        Ok(matches.then_some(user))
    }

    /// Builds the access-token cookie set. Refresh responses additionally
    /// duplicate the token under the bearer-style `Authorization` name;
    /// both cookies are kept for the two client consumption patterns that
    /// exist.
    pub fn access_cookies(
        &self,
        payload: &TokenPayload,
        with_authorization: bool,
    ) -> ServiceResult<Vec<Cookie<'static>>> {
        let token = self.codec.issue(TokenKind::Access, payload)?;
        let ttl = self.codec.ttl_seconds(TokenKind::Access);

        let mut set = vec![cookies::access_cookie(&token, ttl)];
        if with_authorization {
            set.push(cookies::authorization_cookie(&token, ttl));
        }

        Ok(set)
    }

    /// Signs a refresh token and returns both the cookie and the raw token
    /// string so the caller can hash-and-store it.
    pub fn refresh_cookie(
        &self,
        payload: &TokenPayload,
    ) -> ServiceResult<(Cookie<'static>, String)> {
        let token = self.codec.issue(TokenKind::Refresh, payload)?;
        let cookie = cookies::refresh_cookie(&token, self.codec.ttl_seconds(TokenKind::Refresh));

        Ok((cookie, token))
    }

    /// Display-only cookie carrying the login id, never verified.
    pub fn login_user_id_cookie(&self, payload: &TokenPayload) -> Cookie<'static> {
        cookies::login_user_id_cookie(
            &payload.user_id,
            self.codec.ttl_seconds(TokenKind::Refresh),
        )
    }

    /// The clearing cookie set sent on logout.
    pub fn logout_cookies(&self) -> [Cookie<'static>; 4] {
        cookies::logout_cookies()
    }

    /// Hashes a freshly issued refresh token and stores it as the user's
    /// single valid refresh credential, invalidating any previous one.
    pub async fn persist_refresh_hash(
        &self,
        raw_refresh_token: &str,
        user_idx: &str,
    ) -> ServiceResult<()> {
        let hash = bcrypt::hash(refresh_token_digest(raw_refresh_token), DEFAULT_COST)
            .map_err(|e| ServiceError::internal_error(format!("Refresh hashing failed: {}", e)))?;

        let repo = UserRepository::new(self.pool);
        if !repo.update_refresh_hash(user_idx, &hash).await? {
            return Err(ServiceError::not_found("User", user_idx));
        }

        Ok(())
    }

    /// Verifies a raw refresh token against the stored hash for the claimed
    /// subject. "No stored hash" and "hash mismatch" are indistinguishable
    /// to callers; revealing the difference would leak whether an account
    /// has an active session.
    pub async fn verify_refresh_against_store(
        &self,
        raw_refresh_token: &str,
        user_idx: &str,
    ) -> ServiceResult<User> {
        let repo = UserRepository::new(self.pool);
        let Some(user) = repo.find_by_user_idx(user_idx).await? else {
            return Err(ServiceError::AuthenticationFailed);
        };

        let Some(stored_hash) = user.current_hashed_refresh_token.as_deref() else {
            return Err(ServiceError::AuthenticationFailed);
        };

        let matches = bcrypt::verify(refresh_token_digest(raw_refresh_token), stored_hash)
            .map_err(|e| ServiceError::internal_error(format!("Refresh verification failed: {}", e)))?;

        if matches {
            Ok(user)
        } else {
            Err(ServiceError::AuthenticationFailed)
        }
    }

    /// Nulls out the stored refresh hash on logout. `NotFound` covers both a
    /// vanished subject and a hash that is already cleared (zero rows
    /// affected).
    pub async fn clear_refresh_hash(&self, user_idx: &str) -> ServiceResult<bool> {
        let repo = UserRepository::new(self.pool);
        if !repo.clear_refresh_hash(user_idx).await? {
            return Err(ServiceError::not_found("User", user_idx));
        }

        Ok(true)
    }
}
