//! Rust structs that represent database table mappings.
//!
//! These models define the structure of data as it is stored in and retrieved
//! from the database. Note that these may differ from API-specific models;
//! handlers never serialize a `User` row directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

/// Role assigned to a user account. There is no implicit hierarchy; a route
/// that admits `admin` must list it explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    User,
}

/// Lifecycle state of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum UserState {
    Active,
    Inactive,
    Dormancy,
    Delete,
}

/// One row of the `users` table. `current_hashed_refresh_token` holds the
/// bcrypt hash of the most recently issued refresh token; `None` means the
/// user has no active refresh session.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub user_idx: String,
    pub user_id: String,
    pub user_password: String,
    pub user_nickname: String,
    pub user_email: String,
    pub user_email_yn: bool,
    pub user_role: UserRole,
    pub user_state: UserState,
    pub current_hashed_refresh_token: Option<String>,
    pub user_last_login_date: Option<DateTime<Utc>>,
    pub user_last_login_ip: Option<String>,
    pub user_last_login_device: Option<String>,
    pub user_create_date: DateTime<Utc>,
    pub user_update_date: DateTime<Utc>,
}

/// Payload for creating a new user.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateUser {
    #[validate(length(min = 1, max = 50, message = "User id must be between 1-50 characters"))]
    pub user_id: String,

    #[validate(
        length(min = 8, max = 16, message = "Password must be between 8-16 characters"),
        custom(function = validate_password_complexity)
    )]
    pub user_password: String,

    #[validate(length(
        min = 1,
        max = 20,
        message = "Nickname must be between 1-20 characters"
    ))]
    pub user_nickname: String,

    #[validate(
        email(message = "Must be a valid email"),
        length(min = 10, max = 100, message = "Email must be between 10-100 characters")
    )]
    pub user_email: String,
}

/// Internal creation record, produced by the service after hashing.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub user_id: String,
    pub password_hash: String,
    pub user_nickname: String,
    pub user_email: String,
}

/// Payload for changing a user's lifecycle state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateChange {
    pub user_idx: String,
    pub user_state: UserState,
}

/// Requires at least one lowercase letter, one uppercase letter, one digit
/// and one special character, with no characters outside the allowed set.
fn validate_password_complexity(password: &str) -> Result<(), ValidationError> {
    const SPECIALS: &str = "@$!%*?&";

    let mut lower = false;
    let mut upper = false;
    let mut digit = false;
    let mut special = false;

    for c in password.chars() {
        match c {
            'a'..='z' => lower = true,
            'A'..='Z' => upper = true,
            '0'..='9' => digit = true,
            c if SPECIALS.contains(c) => special = true,
            _ => return Err(ValidationError::new("password_charset")),
        }
    }

    if lower && upper && digit && special {
        Ok(())
    } else {
        Err(ValidationError::new("password_complexity"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_complexity_accepts_valid_password() {
        assert!(validate_password_complexity("Tbell1234!!").is_ok());
    }

    #[test]
    fn password_complexity_rejects_missing_classes() {
        assert!(validate_password_complexity("alllowercase1!").is_err());
        assert!(validate_password_complexity("NoDigits!!").is_err());
        assert!(validate_password_complexity("NoSpecial123").is_err());
    }

    #[test]
    fn password_complexity_rejects_forbidden_characters() {
        assert!(validate_password_complexity("Tbell1234!#").is_err());
        assert!(validate_password_complexity("Tbell 1234!").is_err());
    }
}
