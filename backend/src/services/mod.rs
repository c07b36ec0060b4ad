//! Module for core business logic services.

pub mod user_service;
