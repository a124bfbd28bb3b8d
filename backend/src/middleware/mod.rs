//! Middleware for the Ziel Analytics dashboard

pub mod auth;

pub use auth::{auth_middleware, require_admin, AuthUser, CurrentUser};
