//! Domain models for BakePOS

pub mod cart;
pub mod product;
pub mod production;
pub mod sale;
pub mod store;
pub mod user;

pub use cart::*;
pub use product::*;
pub use production::*;
pub use sale::*;
pub use store::*;
pub use user::*;
