//! Sales invoice handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
};

use crate::error::{AppError, AppResult};
use crate::handlers::{path_id, respond, ApiJson, ApiQuery, Envelope};
use crate::services::sales::{InvoiceDetail, InvoicePage, InvoiceSaved};
use crate::services::{InvoiceDocumentService, SalesService};
use crate::AppState;
use shared::models::{InvoiceRequest, InvoiceStatus, ListInvoicesQuery};

const INVALID_INVOICE_ID: &str = "invalid invoice id";

pub async fn create_invoice(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<InvoiceRequest>,
) -> AppResult<Envelope<InvoiceSaved>> {
    let saved = SalesService::new(state.db.clone())
        .create_invoice(&body)
        .await?;
    publish_document(&state, saved).await;
    Ok(respond(StatusCode::CREATED, saved, "invoice created"))
}

pub async fn update_invoice(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    ApiJson(body): ApiJson<InvoiceRequest>,
) -> AppResult<Envelope<InvoiceSaved>> {
    let id = path_id(&raw_id, INVALID_INVOICE_ID)?;
    let saved = SalesService::new(state.db.clone())
        .update_invoice(id, &body)
        .await?;
    publish_document(&state, saved).await;
    Ok(respond(StatusCode::OK, saved, "invoice updated"))
}

pub async fn get_invoice(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<Envelope<InvoiceDetail>> {
    let id = path_id(&raw_id, INVALID_INVOICE_ID)?;
    let detail = SalesService::new(state.db.clone()).get_invoice(id).await?;
    Ok(respond(StatusCode::OK, detail, "Invoice details fetched successfully"))
}

/// List invoices filtered by status and creation date
pub async fn list_invoices(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListInvoicesQuery>,
) -> AppResult<Envelope<InvoicePage>> {
    let filter = query.resolve().map_err(AppError::Validation)?;
    let page = SalesService::new(state.db.clone())
        .list_invoices(&filter)
        .await?;
    Ok(respond(StatusCode::OK, page, "Invoices fetched successfully"))
}

/// Render and upload the PDF of a finalized invoice. The invoice is already
/// committed, so failures are only logged.
async fn publish_document(state: &AppState, saved: InvoiceSaved) {
    if saved.final_status != InvoiceStatus::Invoiced {
        return;
    }

    let service = InvoiceDocumentService::new(state.db.clone(), state.storage.clone());
    match service.generate_and_upload(saved.invoice_id).await {
        Ok(key) => tracing::info!(invoice_id = saved.invoice_id, key = %key, "Invoice PDF uploaded"),
        Err(e) => tracing::error!(
            invoice_id = saved.invoice_id,
            "Failed to generate or upload invoice PDF: {}",
            e
        ),
    }
}
