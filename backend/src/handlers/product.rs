//! Product catalog handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use crate::error::AppResult;
use crate::handlers::{path_id, respond, ApiJson, CreatedId, Envelope};
use crate::services::product::{Product, ProductSummary};
use crate::services::ProductService;
use crate::AppState;
use shared::models::ProductInput;

/// Create product handler
pub async fn create_product(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ProductInput>,
) -> AppResult<Envelope<CreatedId>> {
    let service = ProductService::new(state.db.clone());
    let id = service.create_product(&body).await?;
    Ok(respond(StatusCode::CREATED, CreatedId { id }, "Product created"))
}

/// List products handler
pub async fn list_products(
    State(state): State<AppState>,
) -> AppResult<Envelope<Vec<ProductSummary>>> {
    let service = ProductService::new(state.db.clone());
    let products = service.list_products().await?;
    Ok(respond(StatusCode::OK, products, "Products fetched successfully"))
}

/// Get product handler
pub async fn get_product(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<Envelope<Product>> {
    let id = path_id(&raw_id, "invalid product id")?;
    let service = ProductService::new(state.db.clone());
    let product = service.get_product(id).await?;
    Ok(respond(StatusCode::OK, product, "Product details fetched successfully"))
}
