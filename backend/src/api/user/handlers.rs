//! Handler functions for user management endpoints.
//!
//! Account creation and the login-id availability probe are allow-listed;
//! everything else runs behind the access gate, with the listing and the
//! role/state mutations further restricted to admins by the route layer.

use crate::api::common::{
    ApiResponse, PaginationFilter, PaginationMeta, service_error_to_http,
    validation_error_response,
};
use crate::auth::models::UserInfo;
use crate::database::models::{CreateUser, StateChange, UserRole, UserState};
use crate::services::user_service::UserService;
use axum::{
    extract::{Extension, Json, Path, Query},
    http::StatusCode,
    response::Json as ResponseJson,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use validator::Validate;

/// Query parameters for the login-id availability probe
#[derive(Debug, Deserialize)]
pub struct CheckUserQuery {
    pub user_id: String,
}

/// Query parameters for single-user lookup
#[derive(Debug, Deserialize)]
pub struct ReadUserQuery {
    pub idx: String,
}

/// Query parameters for the admin user listing
#[derive(Debug, Deserialize, Validate)]
pub struct ListUsersQuery {
    #[validate(range(min = 1))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 100))]
    pub take: Option<u32>,
    /// Lifecycle state to filter on, `active` when absent
    #[serde(rename = "type")]
    pub state: Option<UserState>,
}

/// Handle user registration.
///
/// Field validation and the duplicate-id check live in the service; the
/// response carries the sanitized projection, never the password hash.
#[axum::debug_handler]
pub async fn create_user(
    Extension(pool): Extension<SqlitePool>,
    Json(payload): Json<CreateUser>,
) -> Result<ResponseJson<ApiResponse<UserInfo>>, (StatusCode, String)> {
    let user_service = UserService::new(&pool);

    let user = user_service
        .create_user(payload)
        .await
        .map_err(service_error_to_http)?;

    tracing::info!("User {} created", user.user_idx);

    Ok(ResponseJson(ApiResponse::success(
        UserInfo::from(&user),
        "User created successfully",
    )))
}

/// Handle login-id availability probe. Responds `true` when the id is
/// already taken.
#[axum::debug_handler]
pub async fn check_user(
    Extension(pool): Extension<SqlitePool>,
    Query(query): Query<CheckUserQuery>,
) -> Result<ResponseJson<ApiResponse<bool>>, (StatusCode, String)> {
    let user_service = UserService::new(&pool);

    let exists = user_service
        .check_user_id(&query.user_id)
        .await
        .map_err(service_error_to_http)?;

    let message = if exists {
        "User id is already in use"
    } else {
        "User id is available"
    };

    Ok(ResponseJson(ApiResponse::success(exists, message)))
}

/// Handle single-user lookup by unique number.
#[axum::debug_handler]
pub async fn read_user(
    Extension(pool): Extension<SqlitePool>,
    Query(query): Query<ReadUserQuery>,
) -> Result<ResponseJson<ApiResponse<UserInfo>>, (StatusCode, String)> {
    let user_service = UserService::new(&pool);

    let user = user_service
        .get_user_required(&query.idx)
        .await
        .map_err(service_error_to_http)?;

    Ok(ResponseJson(ApiResponse::success(
        UserInfo::from(&user),
        "User retrieved successfully",
    )))
}

/// Handle the admin user listing, filtered by lifecycle state.
#[axum::debug_handler]
pub async fn list_users(
    Extension(pool): Extension<SqlitePool>,
    Query(query): Query<ListUsersQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<UserInfo>>>, (StatusCode, String)> {
    if let Err(validation_errors) = query.validate() {
        return Err(validation_error_response(validation_errors));
    }

    let state = query.state.unwrap_or(UserState::Active);
    let pagination = PaginationFilter {
        page: query.page,
        take: query.take,
    };

    let user_service = UserService::new(&pool);
    let (users, total) = user_service
        .list_users(state, &pagination)
        .await
        .map_err(service_error_to_http)?;

    Ok(ResponseJson(ApiResponse::paginated(
        users,
        PaginationMeta::from_filter(&pagination, total),
        "Users retrieved successfully",
    )))
}

/// Handle role toggle for a user. Admin only.
#[axum::debug_handler]
pub async fn update_role(
    Extension(pool): Extension<SqlitePool>,
    Path(idx): Path<String>,
) -> Result<ResponseJson<ApiResponse<UserRole>>, (StatusCode, String)> {
    let user_service = UserService::new(&pool);

    let role = user_service
        .toggle_role(&idx)
        .await
        .map_err(service_error_to_http)?;

    tracing::info!("User {} role changed to {:?}", idx, role);

    Ok(ResponseJson(ApiResponse::success(
        role,
        "User role updated successfully",
    )))
}

/// Handle lifecycle state change for a user. Admin only.
#[axum::debug_handler]
pub async fn update_state(
    Extension(pool): Extension<SqlitePool>,
    Json(payload): Json<StateChange>,
) -> Result<ResponseJson<ApiResponse<bool>>, (StatusCode, String)> {
    let user_service = UserService::new(&pool);

    let updated = user_service
        .update_state(&payload.user_idx, payload.user_state)
        .await
        .map_err(service_error_to_http)?;

    tracing::info!(
        "User {} state changed to {:?}",
        payload.user_idx,
        payload.user_state
    );

    Ok(ResponseJson(ApiResponse::success(
        updated,
        "User state updated successfully",
    )))
}
