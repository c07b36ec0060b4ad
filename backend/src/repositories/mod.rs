//! Database repositories, one per aggregate.

pub mod user_repository;
