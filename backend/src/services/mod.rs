//! Business logic services

pub mod analytics;
pub mod auth;
pub mod expiration;
pub mod export;
pub mod product;
pub mod production;
pub mod purchase;
pub mod reporting;
pub mod sale;
pub mod store;
pub mod user;

pub use analytics::AnalyticsService;
pub use auth::AuthService;
pub use expiration::ExpirationService;
pub use product::ProductService;
pub use production::ProductionService;
pub use purchase::PurchaseService;
pub use reporting::ReportingService;
pub use sale::SaleService;
pub use store::StoreService;
pub use user::UserService;
