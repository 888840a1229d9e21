//! Purchase handlers

use axum::{extract::State, http::StatusCode};

use crate::error::AppResult;
use crate::handlers::{respond, ApiJson, Envelope};
use crate::middleware::CurrentUser;
use crate::services::purchase::{PurchaseCreated, PurchaseListItem};
use crate::services::PurchaseService;
use crate::AppState;
use shared::models::PurchaseRequest;

/// Record a purchase; the caller becomes `created_by`
pub async fn create_purchase(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(body): ApiJson<PurchaseRequest>,
) -> AppResult<Envelope<PurchaseCreated>> {
    let created = PurchaseService::new(state.db.clone())
        .create_purchase(user.user_id, &body)
        .await?;
    Ok(respond(StatusCode::CREATED, created, "Purchase recorded"))
}

pub async fn list_purchases(
    State(state): State<AppState>,
) -> AppResult<Envelope<Vec<PurchaseListItem>>> {
    let purchases = PurchaseService::new(state.db.clone()).list_purchases().await?;
    Ok(respond(StatusCode::OK, purchases, "Purchases fetched successfully"))
}
