//! User business logic service.
//!
//! Handles account creation, lookups, role and state changes, and the
//! last-login bookkeeping consumed by the login flow. Password hashing
//! happens here; handlers and repositories never see a plaintext password
//! hash operation.

use crate::api::common::PaginationFilter;
use crate::auth::models::UserInfo;
use crate::database::models::{CreateUser, NewUser, User, UserRole, UserState};
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::user_repository::UserRepository;
use bcrypt::DEFAULT_COST;
use sqlx::SqlitePool;
use validator::Validate;

pub struct UserService<'a> {
    /// Shared database connection pool
    pool: &'a SqlitePool,
}

impl<'a> UserService<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates a new user with full validation.
    ///
    /// # Errors
    /// Returns `ServiceError` for validation failures and duplicate ids.
    pub async fn create_user(&self, create_user: CreateUser) -> ServiceResult<User> {
        if let Err(validation_errors) = create_user.validate() {
            let error_messages: Vec<String> = validation_errors
                .field_errors()
                .into_iter()
                .flat_map(|(field, errors)| {
                    errors.iter().map(move |error| {
                        format!(
                            "{}: {}",
                            field,
                            error.message.as_ref().unwrap_or(&"Invalid value".into())
                        )
                    })
                })
                .collect();
            return Err(ServiceError::validation(error_messages.join(", ")));
        }

        let repo = UserRepository::new(self.pool);
        if repo.user_id_exists(&create_user.user_id).await? {
            return Err(ServiceError::already_exists("User", &create_user.user_id));
        }

        let password_hash = Self::hash_password(&create_user.user_password)?;

        let user = repo
            .create_user(NewUser {
                user_id: create_user.user_id,
                password_hash,
                user_nickname: create_user.user_nickname,
                user_email: create_user.user_email,
            })
            .await?;

        Ok(user)
    }

    fn hash_password(password: &str) -> ServiceResult<String> {
        bcrypt::hash(password, DEFAULT_COST)
            .map_err(|e| ServiceError::internal_error(format!("Password hashing failed: {}", e)))
    }

    /// Checks whether a login id is already taken.
    pub async fn check_user_id(&self, user_id: &str) -> ServiceResult<bool> {
        let repo = UserRepository::new(self.pool);
        Ok(repo.user_id_exists(user_id).await?)
    }

    /// Retrieves a user by unique number with existence verification.
    pub async fn get_user_required(&self, user_idx: &str) -> ServiceResult<User> {
        let repo = UserRepository::new(self.pool);
        let user = repo
            .find_by_user_idx(user_idx)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", user_idx))?;
        Ok(user)
    }

    /// Records the IP address and device of a successful login and returns
    /// the updated row.
    pub async fn record_last_login(
        &self,
        ip_address: &str,
        user_agent: &str,
        user_idx: &str,
    ) -> ServiceResult<User> {
        let repo = UserRepository::new(self.pool);
        let user = repo
            .update_last_login(ip_address, user_agent, user_idx)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", user_idx))?;
        Ok(user)
    }

    /// Toggles a user's role between admin and user.
    pub async fn toggle_role(&self, user_idx: &str) -> ServiceResult<UserRole> {
        let repo = UserRepository::new(self.pool);
        let role = repo
            .toggle_role(user_idx)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", user_idx))?;
        Ok(role)
    }

    /// Sets a user's lifecycle state.
    pub async fn update_state(&self, user_idx: &str, state: UserState) -> ServiceResult<bool> {
        let repo = UserRepository::new(self.pool);
        if !repo.update_state(user_idx, state).await? {
            return Err(ServiceError::not_found("User", user_idx));
        }
        Ok(true)
    }

    /// Lists users in a given state, sanitized, newest first.
    pub async fn list_users(
        &self,
        state: UserState,
        pagination: &PaginationFilter,
    ) -> ServiceResult<(Vec<UserInfo>, u64)> {
        let repo = UserRepository::new(self.pool);
        let users = repo.list_by_state(state, pagination).await?;
        let total = repo.count_by_state(state).await?;

        Ok((users.iter().map(UserInfo::from).collect(), total))
    }
}
