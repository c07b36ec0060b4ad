//! Authentication module for managing user sessions and access control.
//!
//! This module provides the credential lifecycle (login, token refresh,
//! logout), cookie transport, and the request-gating middleware that
//! protects the rest of the API.

pub mod cookies;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod service;
