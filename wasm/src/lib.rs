//! WebAssembly module for the point-of-sale checkout screen
//!
//! Provides client-side computation for:
//! - Live invoice totals while the cashier builds a bill
//! - Single line totals
//! - Discount code interpretation

use std::str::FromStr;

use rust_decimal::Decimal;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::billing::*;
pub use shared::models::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::log_1(&JsValue::from_str("pos-wasm billing preview loaded"));
}

/// Calculate invoice totals from a JSON array of invoice items.
/// Returns the totals as JSON, amounts encoded as strings.
#[wasm_bindgen]
pub fn calculate_invoice_totals(items_json: &str) -> Result<String, JsValue> {
    let items: Vec<InvoiceItemInput> = serde_json::from_str(items_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid items JSON: {}", e)))?;

    let totals =
        compute_invoice_totals(&items).map_err(|e| JsValue::from_str(&e.to_string()))?;
    serde_json::to_string(&totals).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Calculate a single line total
#[wasm_bindgen]
pub fn calculate_line_total(
    quantity: i32,
    sales_rate: &str,
    discount_type: &str,
    discount_value: &str,
    gst_percent: &str,
) -> Result<String, JsValue> {
    let amounts = compute_line(
        quantity,
        parse_decimal(sales_rate, "sales_rate")?,
        discount_type,
        parse_decimal(discount_value, "discount_value")?,
        parse_decimal(gst_percent, "gst_percent")?,
    )
    .map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(format!("{:.2}", money(amounts.line_total)))
}

/// Whether a discount code is treated as a percentage
#[wasm_bindgen]
pub fn is_percent_discount(discount_type: &str) -> bool {
    DiscountKind::parse(discount_type) == DiscountKind::Percent
}

fn parse_decimal(value: &str, field: &str) -> Result<Decimal, JsValue> {
    if value.trim().is_empty() {
        return Ok(Decimal::ZERO);
    }
    Decimal::from_str(value.trim())
        .map_err(|_| JsValue::from_str(&format!("{} is not a number", field)))
}
