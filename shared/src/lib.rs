//! Shared types and models for BakePOS
//!
//! This crate contains types shared between the backend, the browser POS
//! screen (via WASM), and other components of the system. It has no I/O:
//! everything here is pure data and computation, which is what makes the
//! cart math and report reducers unit-testable and compilable to WASM.

pub mod models;
pub mod reports;
pub mod types;
pub mod validation;

pub use models::*;
pub use reports::*;
pub use types::*;
pub use validation::*;
