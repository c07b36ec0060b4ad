//! Global application error types and handlers.
//!
//! This module defines the error taxonomy used across the backend. The key
//! distinction is between authentication rejections (business outcomes that
//! map to 401/403 with a deliberately generic message) and storage failures
//! (internal errors that are logged in full and never echoed to clients).

use thiserror::Error;

/// Generic service error used across all entities.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Bad credentials or a bad/expired/malformed token. The message never
    /// reveals which factor failed.
    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("Permission denied: {message}")]
    AuthorizationDenied { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("{entity} not found: {identifier}")]
    NotFound { entity: String, identifier: String },

    #[error("{entity} already exists: {identifier}")]
    AlreadyExists { entity: String, identifier: String },

    #[error("Database error: {source}")]
    Database {
        #[from]
        source: anyhow::Error,
    },

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    // Helper constructors for common patterns

    pub fn authorization_denied(message: impl Into<String>) -> Self {
        Self::AuthorizationDenied {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(entity: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            identifier: identifier.into(),
        }
    }

    pub fn already_exists(entity: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self::AlreadyExists {
            entity: entity.into(),
            identifier: identifier.into(),
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }
}
