//! Data models
//!
//! Domain models live in the `shared` crate so the WASM bindings and the
//! server agree on the same types. This module re-exports them for
//! convenience.

pub use shared::models::*;
pub use shared::types::*;
