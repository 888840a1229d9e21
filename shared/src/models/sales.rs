//! Sales invoice models

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::types::Pagination;

/// Lifecycle of a sales invoice. An `Invoiced` invoice is locked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    Draft,
    Invoiced,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "DRAFT",
            InvoiceStatus::Invoiced => "INVOICED",
        }
    }

    /// Status an invoice ends up in after a create or update
    pub fn from_confirmation(is_confirmed: bool) -> Self {
        if is_confirmed {
            InvoiceStatus::Invoiced
        } else {
            InvoiceStatus::Draft
        }
    }

    pub fn is_locked(&self) -> bool {
        matches!(self, InvoiceStatus::Invoiced)
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DRAFT" => Ok(InvoiceStatus::Draft),
            "INVOICED" => Ok(InvoiceStatus::Invoiced),
            other => Err(format!("unknown invoice status: {}", other)),
        }
    }
}

/// One line of a sales invoice as submitted by the counter
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct InvoiceItemInput {
    #[validate(range(min = 1, message = "product_id must be positive"))]
    pub product_id: i64,
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: i32,
    #[serde(default)]
    pub mrp: Decimal,
    pub sales_rate: Decimal,
    /// `INR`/`FLAT`/empty for an amount, `%`/`PCT`/`PERCENT` for a percentage
    #[serde(default)]
    pub discount_type: String,
    #[serde(default)]
    pub discount_value: Decimal,
    #[serde(default)]
    pub gst_percent: Decimal,
}

/// Customer and payment details of a sales invoice
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvoiceMeta {
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_mobile: String,
    /// cash / card / upi
    #[serde(default)]
    pub payment_mode: String,
    /// Finalizes the invoice when true
    #[serde(default, deserialize_with = "deserialize_boolish")]
    pub is_confirmed: bool,
}

/// Body of the create and update invoice endpoints
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct InvoiceRequest {
    #[serde(default)]
    pub invoice: InvoiceMeta,
    #[validate(length(min = 1, message = "at least one item is required"))]
    pub items: Vec<InvoiceItemInput>,
}

impl InvoiceRequest {
    pub fn final_status(&self) -> InvoiceStatus {
        InvoiceStatus::from_confirmation(self.invoice.is_confirmed)
    }
}

/// Interpret a loosely typed flag: bools, non-zero numbers, and the strings
/// `"true"`/`"1"` are true; anything else is false.
pub fn parse_boolish(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => matches!(s.trim().to_lowercase().as_str(), "true" | "1"),
        _ => false,
    }
}

/// Serde adapter for [`parse_boolish`]
pub fn deserialize_boolish<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(parse_boolish).unwrap_or(false))
}

/// Query string of the invoice listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListInvoicesQuery {
    pub status: Option<String>,
    /// Inclusive start date, `YYYY-MM-DD`
    pub from: Option<String>,
    /// Inclusive end date, `YYYY-MM-DD`
    pub to: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Parsed and bounded invoice listing filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceFilter {
    pub status: Option<InvoiceStatus>,
    pub created_from: Option<NaiveDateTime>,
    pub created_to: Option<NaiveDateTime>,
    pub pagination: Pagination,
}

impl ListInvoicesQuery {
    /// Validate the query; empty strings count as absent
    pub fn resolve(&self) -> Result<InvoiceFilter, String> {
        let status = non_empty(&self.status)
            .map(InvoiceStatus::from_str)
            .transpose()?;

        let created_from = non_empty(&self.from)
            .map(|d| parse_day(d, "from"))
            .transpose()?
            .and_then(|d| d.and_hms_opt(0, 0, 0));

        let created_to = non_empty(&self.to)
            .map(|d| parse_day(d, "to"))
            .transpose()?
            .and_then(|d| d.and_hms_opt(23, 59, 59));

        Ok(InvoiceFilter {
            status,
            created_from,
            created_to,
            pagination: Pagination::new(self.page, self.limit),
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_day(value: &str, field: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, crate::format::DATE_FORMAT)
        .map_err(|_| format!("{} must be a date in YYYY-MM-DD format", field))
}
