//! Data structures for authentication-related entities.
//!
//! Defines the login request payload and the sanitized identity projection
//! returned by the credential endpoints. The password hash never leaves the
//! service layer.

use crate::database::models::{User, UserRole};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Login request payload
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "User id is required"))]
    pub user_id: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub user_password: String,
}

/// Sanitized user projection returned by login and refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub user_idx: String,
    pub user_id: String,
    pub user_nickname: String,
    pub user_email: String,
    pub user_role: UserRole,
    pub login_date: Option<DateTime<Utc>>,
    pub login_ip: Option<String>,
    pub login_device: Option<String>,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        UserInfo {
            user_idx: user.user_idx.clone(),
            user_id: user.user_id.clone(),
            user_nickname: user.user_nickname.clone(),
            user_email: user.user_email.clone(),
            user_role: user.user_role,
            login_date: user.user_last_login_date,
            login_ip: user.user_last_login_ip.clone(),
            login_device: user.user_last_login_device.clone(),
        }
    }
}
