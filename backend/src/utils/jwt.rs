//! JWT token utilities for authentication and authorization.
//!
//! The codec signs and verifies two classes of bearer tokens. Access and
//! refresh tokens carry the same claims but are signed with distinct secrets
//! and distinct lifetimes, so a token issued for one class never verifies
//! under the keys of the other.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;
use crate::database::models::UserRole;
use crate::errors::ServiceError;

/// Verification failure, discriminated for logging. All variants collapse to
/// a generic authentication failure at the API boundary.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("token malformed")]
    Malformed,
    #[error("token signature invalid")]
    SignatureInvalid,
}

/// Which key pair a token is issued and verified against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Identity data embedded in every issued token. Regenerated fresh on each
/// issuance, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPayload {
    pub user_idx: String,
    pub user_id: String,
    pub user_nickname: String,
    pub user_role: UserRole,
}

/// JWT claims. The shape is closed: a token whose decoded payload carries
/// unknown or missing fields is rejected as malformed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Claims {
    /// User unique number (user_idx)
    pub sub: String,
    pub user_id: String,
    pub user_nickname: String,
    pub user_role: UserRole,
    /// Token expiration timestamp
    pub exp: usize,
    /// Token issued at timestamp
    pub iat: usize,
}

impl Claims {
    /// Rebuilds the identity payload for re-issuing a token.
    pub fn payload(&self) -> TokenPayload {
        TokenPayload {
            user_idx: self.sub.clone(),
            user_id: self.user_id.clone(),
            user_nickname: self.user_nickname.clone(),
            user_role: self.user_role,
        }
    }
}

#[derive(Clone)]
struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_seconds: u64,
}

impl TokenKeys {
    fn new(secret: &str, ttl_seconds: u64) -> Self {
        TokenKeys {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_seconds,
        }
    }
}

/// Token codec holding both key pairs. Built once at startup from the
/// injected configuration and cloned into the router.
#[derive(Clone)]
pub struct TokenCodec {
    access: TokenKeys,
    refresh: TokenKeys,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(config: &Config) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        TokenCodec {
            access: TokenKeys::new(
                &config.access_token_secret,
                config.access_token_ttl_seconds,
            ),
            refresh: TokenKeys::new(
                &config.refresh_token_secret,
                config.refresh_token_ttl_seconds,
            ),
            validation,
        }
    }

    fn keys(&self, kind: TokenKind) -> &TokenKeys {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    /// Lifetime of tokens of the given kind, in seconds.
    pub fn ttl_seconds(&self, kind: TokenKind) -> u64 {
        self.keys(kind).ttl_seconds
    }

    /// Signs a new token of the given kind. Fails only on codec error,
    /// never on business logic.
    pub fn issue(&self, kind: TokenKind, payload: &TokenPayload) -> Result<String, ServiceError> {
        let keys = self.keys(kind);
        let now = Utc::now();
        let exp = now + Duration::seconds(keys.ttl_seconds as i64);

        let claims = Claims {
            sub: payload.user_idx.clone(),
            user_id: payload.user_id.clone(),
            user_nickname: payload.user_nickname.clone(),
            user_role: payload.user_role,
            exp: exp.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        encode(&Header::default(), &claims, &keys.encoding)
            .map_err(|e| ServiceError::internal_error(format!("Token generation failed: {}", e)))
    }

    /// Validates and decodes a token against the keys of the given kind.
    pub fn verify(&self, kind: TokenKind, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.keys(kind).decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::SignatureInvalid,
                _ => TokenError::Malformed,
            })
    }
}
