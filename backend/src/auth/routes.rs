//! Defines the HTTP routes specifically for authentication.
//!
//! These routes cover the three credential state transitions. `/login` is
//! allow-listed (no gate); `/refresh` runs behind the refresh gate and
//! `/logout` behind the access gate.

use crate::auth::handlers::*;
use crate::auth::middleware::{jwt_auth, jwt_refresh_auth};
use axum::{
    Router, middleware,
    routing::{get, post},
};

/// Creates the authentication router with all auth-related routes
pub fn auth_router() -> Router {
    Router::new()
        .route("/login", post(login))
        .route(
            "/refresh",
            get(refresh).layer(middleware::from_fn(jwt_refresh_auth)),
        )
        .route(
            "/logout/{idx}",
            get(logout).layer(middleware::from_fn(jwt_auth)),
        )
}
