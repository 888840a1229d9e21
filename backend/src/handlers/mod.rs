//! HTTP handlers for the point-of-sale API

pub mod auth;
pub mod health;
pub mod product;
pub mod purchase;
pub mod sales;
pub mod supplier;

pub use auth::*;
pub use health::*;
pub use product::*;
pub use purchase::*;
pub use sales::*;
pub use supplier::*;

use axum::{extract::FromRequest, extract::FromRequestParts, http::StatusCode, Json};
use serde::Serialize;
use shared::types::ApiResponse;

use crate::error::{AppError, AppResult};

/// JSON body whose rejections render as validation errors in the envelope
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Query string whose rejections render as validation errors in the envelope
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// Payload of create endpoints
#[derive(Debug, Serialize)]
pub struct CreatedId {
    pub id: i64,
}

/// Envelope response with a payload
pub type Envelope<T> = (StatusCode, Json<ApiResponse<T>>);

pub(crate) fn respond<T: Serialize>(status: StatusCode, data: T, message: &str) -> Envelope<T> {
    (status, Json(ApiResponse::success(status.as_u16(), data, message)))
}

/// Envelope response without a payload
pub(crate) fn acknowledge(message: &str) -> Envelope<()> {
    (
        StatusCode::OK,
        Json(ApiResponse::message(StatusCode::OK.as_u16(), message)),
    )
}

/// Parse a path id, rejecting malformed and non-positive values with `message`
pub(crate) fn path_id(raw: &str, message: &str) -> AppResult<i64> {
    shared::validation::parse_id(raw).ok_or_else(|| AppError::Validation(message.to_string()))
}
