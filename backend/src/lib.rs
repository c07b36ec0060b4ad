//! Cookie-session authentication backend for the internal admin console.
//!
//! Wires the credential endpoints, the user management API, and the shared
//! request state (connection pool and token codec) into a single router.

pub mod api;
pub mod auth;
pub mod config;
pub mod database;
pub mod errors;
pub mod repositories;
pub mod services;
pub mod utils;

use crate::api::common::ApiResponse;
use crate::utils::jwt::TokenCodec;
use axum::{Extension, Router, response::Json, routing::get};
use sqlx::SqlitePool;

async fn root_handler() -> Json<ApiResponse<serde_json::Value>> {
    Json(ApiResponse::success(
        serde_json::json!({
            "service": "Echeck Backend",
            "version": "0.1.0"
        }),
        "Welcome to Echeck API",
    ))
}

/// Builds the application router with all routes and shared state attached.
///
/// The codec is constructed once at startup from explicit configuration and
/// injected here; nothing below this point reads the environment.
pub fn app(pool: SqlitePool, codec: TokenCodec) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .nest("/auth", auth::routes::auth_router())
        .nest("/user", api::user::routes::user_router())
        .layer(Extension(pool))
        .layer(Extension(codec))
}
