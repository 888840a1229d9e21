//! Supplier handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
};

use crate::error::AppResult;
use crate::handlers::{acknowledge, path_id, respond, ApiJson, CreatedId, Envelope};
use crate::services::supplier::Supplier;
use crate::services::SupplierService;
use crate::AppState;
use shared::models::SupplierInput;

const INVALID_ID: &str = "invalid id";

pub async fn create_supplier(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SupplierInput>,
) -> AppResult<Envelope<CreatedId>> {
    let id = SupplierService::new(state.db.clone())
        .create_supplier(&body)
        .await?;
    Ok(respond(StatusCode::CREATED, CreatedId { id }, "supplier created"))
}

pub async fn list_suppliers(State(state): State<AppState>) -> AppResult<Envelope<Vec<Supplier>>> {
    let suppliers = SupplierService::new(state.db.clone()).list_suppliers().await?;
    Ok(respond(StatusCode::OK, suppliers, "Suppliers fetched successfully"))
}

pub async fn get_supplier(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<Envelope<Supplier>> {
    let id = path_id(&raw_id, INVALID_ID)?;
    let supplier = SupplierService::new(state.db.clone()).get_supplier(id).await?;
    Ok(respond(StatusCode::OK, supplier, "Supplier details fetched successfully"))
}

pub async fn update_supplier(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    ApiJson(body): ApiJson<SupplierInput>,
) -> AppResult<Envelope<()>> {
    let id = path_id(&raw_id, INVALID_ID)?;
    SupplierService::new(state.db.clone())
        .update_supplier(id, &body)
        .await?;
    Ok(acknowledge("supplier updated"))
}

/// Soft-delete a supplier
pub async fn delete_supplier(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<Envelope<()>> {
    let id = path_id(&raw_id, INVALID_ID)?;
    SupplierService::new(state.db.clone()).delete_supplier(id).await?;
    Ok(acknowledge("supplier deleted"))
}
