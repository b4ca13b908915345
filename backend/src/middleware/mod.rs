//! Middleware modules

pub mod auth;

pub use auth::{auth_middleware, AuthUser, CurrentUser};
