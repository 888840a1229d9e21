//! Product catalogue models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Input for creating a product
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProductInput {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub barcode: String,
    /// Harmonized System of Nomenclature code used on tax invoices
    #[serde(default)]
    pub hsn_code: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub purchase_price: Decimal,
    #[serde(default)]
    pub sales_price: Decimal,
    #[serde(default)]
    pub gst_percent: Decimal,
}
