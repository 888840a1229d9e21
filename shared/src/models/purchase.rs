//! Purchase (stock inward) models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// One line of a supplier purchase invoice
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PurchaseItemInput {
    #[validate(range(min = 1, message = "product_id must be positive"))]
    pub product_id: i64,
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: i32,
    pub purchase_price: Decimal,
    #[serde(default)]
    pub gst_percent: Decimal,
}

/// Input for recording a purchase
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PurchaseRequest {
    #[validate(range(min = 1, message = "supplier_id must be positive"))]
    pub supplier_id: i64,
    /// Supplier's own invoice number
    #[serde(default)]
    pub invoice_number: String,
    #[serde(default)]
    pub notes: String,
    #[validate(length(min = 1, message = "at least one item is required"))]
    pub items: Vec<PurchaseItemInput>,
}
