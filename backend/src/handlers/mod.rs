//! HTTP request handlers

pub mod analytics;
pub mod auth;
pub mod expiration;
pub mod pos;
pub mod product;
pub mod production;
pub mod purchase;
pub mod reporting;
pub mod store;
pub mod user;
