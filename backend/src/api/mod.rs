//! API module containing all HTTP endpoint handlers and routing logic.

pub mod common;
pub mod user;
