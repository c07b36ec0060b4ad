//! Database repository for user management operations.
//!
//! This is the single owner of the `users` table, including the stored
//! refresh-token hash consumed by the credential flows. Row updates are
//! atomic per statement; two concurrent logins for the same user resolve
//! by last-write-wins on `current_hashed_refresh_token`, which is the
//! intended single-session-per-user behavior.

use crate::api::common::PaginationFilter;
use crate::database::models::{NewUser, User, UserRole, UserState};
use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

const USER_COLUMNS: &str = r#"
    user_idx, user_id, user_password, user_nickname, user_email, user_email_yn,
    user_role, user_state, current_hashed_refresh_token,
    user_last_login_date, user_last_login_ip, user_last_login_device,
    user_create_date, user_update_date
"#;

/// Repository for user database operations.
pub struct UserRepository<'a> {
    /// Shared SQLite connection pool
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates a new user row with a fresh UUID.
    pub async fn create_user(&self, new_user: NewUser) -> Result<User> {
        let user_idx = Uuid::new_v4().to_string();
        let now = Utc::now();

        let sql = format!(
            r#"
            INSERT INTO users
            (user_idx, user_id, user_password, user_nickname, user_email, user_email_yn,
             user_role, user_state, user_create_date, user_update_date)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {USER_COLUMNS}
            "#
        );

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(&user_idx)
            .bind(&new_user.user_id)
            .bind(&new_user.password_hash)
            .bind(&new_user.user_nickname)
            .bind(&new_user.user_email)
            .bind(false)
            .bind(UserRole::User)
            .bind(UserState::Active)
            .bind(now)
            .bind(now)
            .fetch_one(self.pool)
            .await?;

        Ok(user)
    }

    /// Retrieves a user by their login id.
    pub async fn find_by_user_id(&self, user_id: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?;

        Ok(user)
    }

    /// Retrieves a user by their unique number.
    pub async fn find_by_user_idx(&self, user_idx: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE user_idx = ?");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(user_idx)
            .fetch_optional(self.pool)
            .await?;

        Ok(user)
    }

    /// Checks whether a login id is already taken.
    pub async fn user_id_exists(&self, user_id: &str) -> Result<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE user_id = ?")
                .bind(user_id)
                .fetch_one(self.pool)
                .await?;

        Ok(count > 0)
    }

    /// Overwrites the stored refresh-token hash for a user. Returns `false`
    /// when the user row does not exist.
    pub async fn update_refresh_hash(&self, user_idx: &str, hash: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET current_hashed_refresh_token = ?, user_update_date = ?
            WHERE user_idx = ?
            "#,
        )
        .bind(hash)
        .bind(Utc::now())
        .bind(user_idx)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Nulls out the stored refresh-token hash. Returns `false` when the
    /// user does not exist or the hash is already cleared.
    pub async fn clear_refresh_hash(&self, user_idx: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET current_hashed_refresh_token = NULL, user_update_date = ?
            WHERE user_idx = ? AND current_hashed_refresh_token IS NOT NULL
            "#,
        )
        .bind(Utc::now())
        .bind(user_idx)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Records last-login metadata and returns the updated row.
    pub async fn update_last_login(
        &self,
        ip_address: &str,
        user_agent: &str,
        user_idx: &str,
    ) -> Result<Option<User>> {
        let sql = format!(
            r#"
            UPDATE users
            SET user_last_login_date = ?, user_last_login_ip = ?,
                user_last_login_device = ?, user_update_date = ?
            WHERE user_idx = ?
            RETURNING {USER_COLUMNS}
            "#
        );

        let now = Utc::now();
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(now)
            .bind(ip_address)
            .bind(user_agent)
            .bind(now)
            .bind(user_idx)
            .fetch_optional(self.pool)
            .await?;

        Ok(user)
    }

    /// Toggles a user's role between admin and user. Returns the new role.
    pub async fn toggle_role(&self, user_idx: &str) -> Result<Option<UserRole>> {
        let role: Option<UserRole> = sqlx::query_scalar(
            r#"
            UPDATE users
            SET user_role = CASE user_role WHEN 'admin' THEN 'user' ELSE 'admin' END,
                user_update_date = ?
            WHERE user_idx = ?
            RETURNING user_role
            "#,
        )
        .bind(Utc::now())
        .bind(user_idx)
        .fetch_optional(self.pool)
        .await?;

        Ok(role)
    }

    /// Sets a user's lifecycle state. Returns `false` when the user does
    /// not exist.
    pub async fn update_state(&self, user_idx: &str, state: UserState) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE users SET user_state = ?, user_update_date = ? WHERE user_idx = ?",
        )
        .bind(state)
        .bind(Utc::now())
        .bind(user_idx)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists users in a given state, newest first.
    pub async fn list_by_state(
        &self,
        state: UserState,
        pagination: &PaginationFilter,
    ) -> Result<Vec<User>> {
        let sql = format!(
            r#"
            SELECT {USER_COLUMNS} FROM users
            WHERE user_state = ?
            ORDER BY user_create_date DESC
            LIMIT ? OFFSET ?
            "#
        );

        let users = sqlx::query_as::<_, User>(&sql)
            .bind(state)
            .bind(pagination.limit() as i64)
            .bind(pagination.offset() as i64)
            .fetch_all(self.pool)
            .await?;

        Ok(users)
    }

    /// Total count of users in a given state.
    pub async fn count_by_state(&self, state: UserState) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE user_state = ?")
            .bind(state)
            .fetch_one(self.pool)
            .await?;

        Ok(count as u64)
    }
}
