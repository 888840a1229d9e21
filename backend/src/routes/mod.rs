//! Route definitions for the point-of-sale API

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (login public, register protected)
        .nest("/auth", auth_routes(state.clone()))
        // Protected routes
        .merge(protected_routes(state))
}

/// Authentication routes
fn auth_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
        .route("/login", post(handlers::login))
}

/// Routes requiring a valid access token
fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/products", product_routes())
        .nest("/suppliers", supplier_routes())
        .nest("/purchases", purchase_routes())
        .nest("/sales", sales_routes())
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Product catalog routes
fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_products).post(handlers::create_product))
        .route("/:id", get(handlers::get_product))
}

/// Supplier routes
fn supplier_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_suppliers).post(handlers::create_supplier))
        .route(
            "/:id",
            get(handlers::get_supplier)
                .put(handlers::update_supplier)
                .delete(handlers::delete_supplier),
        )
}

/// Purchase routes
fn purchase_routes() -> Router<AppState> {
    Router::new().route("/", get(handlers::list_purchases).post(handlers::create_purchase))
}

/// Sales invoice routes
fn sales_routes() -> Router<AppState> {
    Router::new()
        .route("/invoices", get(handlers::list_invoices).post(handlers::create_invoice))
        .route(
            "/invoices/:id",
            get(handlers::get_invoice).put(handlers::update_invoice),
        )
}
