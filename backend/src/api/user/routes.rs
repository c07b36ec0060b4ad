//! Defines the HTTP routes for user management.
//!
//! Registration and the login-id probe are reachable without credentials.
//! The remaining routes sit behind the access gate; listing, role and state
//! mutations additionally require the admin role. Gates are layered per
//! route so the role check always runs after the identity is attached.

use crate::api::user::handlers::*;
use crate::auth::middleware::{jwt_auth, require_role};
use crate::database::models::UserRole;
use axum::{
    Router, middleware,
    routing::{get, patch, post},
};

const ADMIN_ONLY: &[UserRole] = &[UserRole::Admin];

/// Creates the user router with all user-related routes
pub fn user_router() -> Router {
    Router::new()
        .route("/create_user", post(create_user))
        .route("/check_user", get(check_user))
        .route(
            "/read_user",
            get(read_user).layer(middleware::from_fn(jwt_auth)),
        )
        .route(
            "/user_all",
            get(list_users)
                .layer(middleware::from_fn(|req, next| {
                    require_role(ADMIN_ONLY, req, next)
                }))
                .layer(middleware::from_fn(jwt_auth)),
        )
        .route(
            "/update_role/{idx}",
            patch(update_role)
                .layer(middleware::from_fn(|req, next| {
                    require_role(ADMIN_ONLY, req, next)
                }))
                .layer(middleware::from_fn(jwt_auth)),
        )
        .route(
            "/update_state",
            patch(update_state)
                .layer(middleware::from_fn(|req, next| {
                    require_role(ADMIN_ONLY, req, next)
                }))
                .layer(middleware::from_fn(jwt_auth)),
        )
}
