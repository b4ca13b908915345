//! Route definitions for the BakePOS API

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes. The state is handed to the auth layer so token
/// verification uses the configured JWT secret.
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Auth routes (public login/refresh, protected /me)
        .nest("/auth", auth_routes(state.clone()))
        // Protected routes - stores
        .nest("/stores", store_routes(state.clone()))
        // Protected routes - product catalog and inventory
        .nest("/products", product_routes(state.clone()))
        // Protected routes - POS checkout and sales
        .nest("/pos", pos_routes(state.clone()))
        // Protected routes - purchasing
        .nest("/purchases", purchase_routes(state.clone()))
        // Protected routes - recipes and production
        .nest("/production", production_routes(state.clone()))
        // Protected routes - batch expiration
        .nest("/expiration", expiration_routes(state.clone()))
        // Protected routes - reports
        .nest("/reports", reporting_routes(state.clone()))
        // Protected routes - cross-store analytics
        .nest("/analytics", analytics_routes(state.clone()))
        // Protected routes - user administration
        .nest("/users", user_routes(state))
}

/// Authentication routes
fn auth_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/refresh", post(handlers::auth::refresh))
        .merge(protected_auth_routes(state))
}

fn protected_auth_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/me", get(handlers::auth::me))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Store management routes (protected)
fn store_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::store::list_stores).post(handlers::store::create_store),
        )
        .route(
            "/:store_id",
            get(handlers::store::get_store)
                .put(handlers::store::update_store)
                .delete(handlers::store::deactivate_store),
        )
        .route(
            "/:store_id/inventory",
            get(handlers::product::store_stock).put(handlers::product::adjust_stock),
        )
        .route("/:store_id/low-stock", get(handlers::product::low_stock))
        .route("/:store_id/dashboard", get(handlers::reporting::dashboard))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Product catalog routes (protected)
fn product_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::product::list_products).post(handlers::product::create_product),
        )
        .route(
            "/categories",
            get(handlers::product::list_categories).post(handlers::product::create_category),
        )
        .route(
            "/:product_id",
            get(handlers::product::get_product)
                .put(handlers::product::update_product)
                .delete(handlers::product::deactivate_product),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// POS routes (protected)
fn pos_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/checkout", post(handlers::pos::checkout))
        .route("/sales", get(handlers::pos::list_sales))
        .route("/sales/:sale_id", get(handlers::pos::get_sale))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Purchasing routes (protected)
fn purchase_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::purchase::list_purchases).post(handlers::purchase::create_purchase),
        )
        .route(
            "/suppliers",
            get(handlers::purchase::list_suppliers).post(handlers::purchase::create_supplier),
        )
        .route(
            "/suppliers/:supplier_id",
            put(handlers::purchase::update_supplier),
        )
        .route("/:purchase_id", get(handlers::purchase::get_purchase))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Production routes (protected)
fn production_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/runs", get(handlers::production::list_runs).post(handlers::production::record_run))
        .route(
            "/recipes",
            get(handlers::production::list_recipes).post(handlers::production::create_recipe),
        )
        .route(
            "/recipes/:recipe_id",
            get(handlers::production::get_recipe)
                .put(handlers::production::update_recipe)
                .delete(handlers::production::deactivate_recipe),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Expiration tracking routes (protected)
fn expiration_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/batches", get(handlers::expiration::expiring_batches))
        .route("/wastage", post(handlers::expiration::mark_wastage))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Report routes (protected); every report has a matching CSV export
fn reporting_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/daily-sales", get(handlers::reporting::daily_sales))
        .route(
            "/product-performance",
            get(handlers::reporting::product_performance),
        )
        .route("/summary", get(handlers::reporting::sales_summary))
        .route("/net-profit", get(handlers::reporting::net_profit))
        .route("/stock", get(handlers::reporting::stock_report))
        .route(
            "/daily-sales/export",
            get(handlers::reporting::export_daily_sales),
        )
        .route(
            "/product-performance/export",
            get(handlers::reporting::export_product_performance),
        )
        .route(
            "/summary/export",
            get(handlers::reporting::export_sales_summary),
        )
        .route(
            "/net-profit/export",
            get(handlers::reporting::export_net_profit),
        )
        .route("/stock/export", get(handlers::reporting::export_stock_report))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Multi-store analytics routes (protected, manager and above)
fn analytics_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/store-comparison",
            get(handlers::analytics::store_comparison),
        )
        .route("/sales-trend", get(handlers::analytics::sales_trend))
        .route(
            "/reorder-recommendations",
            get(handlers::analytics::reorder_recommendations),
        )
        .route(
            "/day-of-week",
            get(handlers::analytics::day_of_week_pattern),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// User administration routes (protected, admin only)
fn user_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::user::list_users).post(handlers::user::create_user),
        )
        .route("/:user_id", put(handlers::user::update_user))
        .route(
            "/:user_id/stores",
            put(handlers::user::set_store_assignments),
        )
        .route(
            "/:user_id/default-store",
            put(handlers::user::set_default_store),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
