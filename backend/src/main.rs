//! Main entry point for the Echeck backend.
//!
//! This file initializes the Axum web server, sets up database connections,
//! and registers all API routes and middleware.
//! It orchestrates the application's startup and defines its overall structure.

use echeck_backend::app;
use echeck_backend::config::Config;
use echeck_backend::database::Database;
use echeck_backend::utils::jwt::TokenCodec;
use tracing::info;
use tracing_subscriber::fmt::init;

#[tokio::main]
async fn main() {
    init();

    let config = Config::from_env().unwrap();
    let db = Database::new(&config).await.unwrap();
    let pool = db.pool().clone();
    let codec = TokenCodec::new(&config);

    let app = app(pool, codec);

    let bind_address = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&bind_address).await.unwrap();

    info!("Starting Echeck server on port {}", config.server_port);
    axum::serve(listener, app).await.unwrap();
}
