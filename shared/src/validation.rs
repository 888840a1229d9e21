//! Validation utilities for the point-of-sale backend
//!
//! Request DTOs derive `validator::Validate` for field rules; the checks here
//! add the money rules and flatten errors into one client-facing message.

use rust_decimal::Decimal;
use validator::{Validate, ValidationErrors};

use crate::billing::{compute_invoice_totals, compute_purchase_totals, money, MONEY_PLACES};
use crate::models::{InvoiceRequest, ProductInput, PurchaseRequest, SupplierInput};

/// Largest money value a `NUMERIC(12,2)` column holds: 9999999999.99
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

/// Largest quantity accepted on a single line
pub const MAX_QUANTITY: i32 = 9999;

// ============================================================================
// Error Formatting
// ============================================================================

/// First field error as a readable message, fields in name order
pub fn describe_errors(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));

    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
        })
        .next()
        .unwrap_or_else(|| "invalid input".to_string())
}

/// Run derive-based validation and flatten the result
pub fn check<T: Validate>(input: &T) -> Result<(), String> {
    input.validate().map_err(|e| describe_errors(&e))
}

// ============================================================================
// Money Validations
// ============================================================================

/// Validate a value has at most two decimal places (trailing zeros ignored)
pub fn validate_money_places(value: Decimal, field: &str) -> Result<(), String> {
    if value.normalize().scale() > MONEY_PLACES {
        return Err(format!(
            "{} must have at most {} decimal places",
            field, MONEY_PLACES
        ));
    }
    Ok(())
}

/// Validate a value fits the stored money range
pub fn validate_max_amount(value: Decimal, field: &str) -> Result<(), String> {
    if value.abs() > MAX_AMOUNT {
        return Err(format!(
            "{} exceeds maximum allowed ({})",
            field, MAX_AMOUNT
        ));
    }
    Ok(())
}

/// Validate a price or amount is not negative, fits the money range and has
/// at most two decimal places
pub fn validate_amount(value: Decimal, field: &str) -> Result<(), String> {
    if value < Decimal::ZERO {
        return Err(format!("{} cannot be negative", field));
    }
    validate_max_amount(value, field)?;
    validate_money_places(value, field)
}

/// Validate a line discount. Negative values are allowed and count as no
/// discount.
pub fn validate_discount_value(value: Decimal) -> Result<(), String> {
    validate_max_amount(value, "discount_value")?;
    validate_money_places(value, "discount_value")
}

/// Validate a GST rate is within 0-100%
pub fn validate_gst_percent(value: Decimal) -> Result<(), String> {
    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        return Err("gst_percent must be between 0 and 100".to_string());
    }
    validate_money_places(value, "gst_percent")
}

/// Validate a line quantity does not exceed the per-line maximum
pub fn validate_quantity(quantity: i32) -> Result<(), String> {
    if quantity > MAX_QUANTITY {
        return Err(format!(
            "quantity exceeds maximum allowed ({})",
            MAX_QUANTITY
        ));
    }
    Ok(())
}

// ============================================================================
// General Validations
// ============================================================================

/// Parse a path id; only positive integers are valid
pub fn parse_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|id| *id > 0)
}

// ============================================================================
// Request Checks
// ============================================================================

impl ProductInput {
    pub fn check(&self) -> Result<(), String> {
        check(self)?;
        validate_amount(self.purchase_price, "purchase_price")?;
        validate_amount(self.sales_price, "sales_price")?;
        validate_gst_percent(self.gst_percent)
    }
}

impl SupplierInput {
    pub fn check(&self) -> Result<(), String> {
        check(self)
    }
}

impl PurchaseRequest {
    pub fn check(&self) -> Result<(), String> {
        check(self)?;
        for (i, item) in self.items.iter().enumerate() {
            check(item)
                .and_then(|_| validate_quantity(item.quantity))
                .and_then(|_| validate_amount(item.purchase_price, "purchase_price"))
                .and_then(|_| validate_gst_percent(item.gst_percent))
                .map_err(|e| format!("items[{}]: {}", i, e))?;
        }

        let totals = compute_purchase_totals(&self.items).map_err(|e| e.to_string())?;
        validate_max_amount(totals.total_amount_before_discount, "total_amount_before_discount")?;
        validate_max_amount(money(totals.total_amount), "total_amount")
    }
}

impl InvoiceRequest {
    pub fn check(&self) -> Result<(), String> {
        check(self)?;
        for (i, item) in self.items.iter().enumerate() {
            check(item)
                .and_then(|_| validate_quantity(item.quantity))
                .and_then(|_| validate_amount(item.sales_rate, "sales_rate"))
                .and_then(|_| validate_amount(item.mrp, "mrp"))
                .and_then(|_| validate_discount_value(item.discount_value))
                .and_then(|_| validate_gst_percent(item.gst_percent))
                .map_err(|e| format!("items[{}]: {}", i, e))?;
        }

        // Header columns share the line money range
        let totals = compute_invoice_totals(&self.items).map_err(|e| e.to_string())?;
        validate_max_amount(totals.total_amount_before_discount, "total_amount_before_discount")?;
        validate_max_amount(totals.total_discount, "total_discount")?;
        validate_max_amount(totals.total_invoice_amount, "total_invoice_amount")
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InvoiceItemInput, InvoiceMeta, PurchaseItemInput};

    fn invoice_item(product_id: i64, quantity: i32) -> InvoiceItemInput {
        InvoiceItemInput {
            product_id,
            quantity,
            mrp: Decimal::ZERO,
            sales_rate: Decimal::from(10),
            discount_type: String::new(),
            discount_value: Decimal::ZERO,
            gst_percent: Decimal::from(5),
        }
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42"), Some(42));
        assert_eq!(parse_id("0"), None);
        assert_eq!(parse_id("-3"), None);
        assert_eq!(parse_id("abc"), None);
    }

    #[test]
    fn test_gst_percent_bounds() {
        assert!(validate_gst_percent(Decimal::ZERO).is_ok());
        assert!(validate_gst_percent(Decimal::from(28)).is_ok());
        assert!(validate_gst_percent(Decimal::from(101)).is_err());
        assert!(validate_gst_percent(Decimal::from(-1)).is_err());
    }

    #[test]
    fn test_max_amount_value() {
        assert_eq!(MAX_AMOUNT.to_string(), "9999999999.99");
    }

    #[test]
    fn test_amount_upper_bound() {
        assert!(validate_amount(MAX_AMOUNT, "sales_rate").is_ok());
        assert_eq!(
            validate_amount(Decimal::from(100_000_000_000_i64), "sales_rate"),
            Err("sales_rate exceeds maximum allowed (9999999999.99)".to_string())
        );
    }

    #[test]
    fn test_money_places() {
        assert!(validate_amount(Decimal::new(1050, 2), "mrp").is_ok());
        assert!(validate_amount(Decimal::new(10500, 3), "mrp").is_ok());
        assert_eq!(
            validate_amount(Decimal::new(10005, 3), "mrp"),
            Err("mrp must have at most 2 decimal places".to_string())
        );
        assert_eq!(
            validate_gst_percent(Decimal::new(12345, 3)),
            Err("gst_percent must have at most 2 decimal places".to_string())
        );
    }

    #[test]
    fn test_discount_value_allows_negative_within_range() {
        assert!(validate_discount_value(Decimal::from(-20)).is_ok());
        assert!(validate_discount_value(Decimal::from(100_000_000_000_i64)).is_err());
        assert!(validate_discount_value(Decimal::new(1001, 3)).is_err());
    }

    #[test]
    fn test_quantity_upper_bound() {
        assert!(validate_quantity(MAX_QUANTITY).is_ok());
        assert_eq!(
            validate_quantity(MAX_QUANTITY + 1),
            Err("quantity exceeds maximum allowed (9999)".to_string())
        );
    }

    #[test]
    fn test_invoice_rejects_huge_sales_rate() {
        let mut item = invoice_item(1, 9999);
        item.sales_rate = Decimal::MAX;
        let req = InvoiceRequest {
            invoice: InvoiceMeta::default(),
            items: vec![item],
        };
        assert_eq!(
            req.check(),
            Err("items[0]: sales_rate exceeds maximum allowed (9999999999.99)".to_string())
        );
    }

    #[test]
    fn test_invoice_rejects_total_beyond_column_range() {
        let mut item = invoice_item(1, 9999);
        item.sales_rate = MAX_AMOUNT;
        let req = InvoiceRequest {
            invoice: InvoiceMeta::default(),
            items: vec![item],
        };
        assert_eq!(
            req.check(),
            Err("total_amount_before_discount exceeds maximum allowed (9999999999.99)".to_string())
        );
    }

    #[test]
    fn test_product_requires_name() {
        let input = ProductInput {
            name: String::new(),
            sku: "SKU-1".into(),
            barcode: String::new(),
            hsn_code: String::new(),
            gender: String::new(),
            category: String::new(),
            purchase_price: Decimal::ZERO,
            sales_price: Decimal::ZERO,
            gst_percent: Decimal::ZERO,
        };
        assert_eq!(input.check(), Err("name is required".to_string()));
    }

    #[test]
    fn test_invoice_requires_items() {
        let req = InvoiceRequest {
            invoice: InvoiceMeta::default(),
            items: vec![],
        };
        assert_eq!(req.check(), Err("at least one item is required".to_string()));
    }

    #[test]
    fn test_invoice_item_errors_are_indexed() {
        let req = InvoiceRequest {
            invoice: InvoiceMeta::default(),
            items: vec![invoice_item(1, 1), invoice_item(2, 0)],
        };
        assert_eq!(
            req.check(),
            Err("items[1]: quantity must be at least 1".to_string())
        );
    }

    #[test]
    fn test_purchase_rejects_negative_price() {
        let req = PurchaseRequest {
            supplier_id: 1,
            invoice_number: "SUP-9".into(),
            notes: String::new(),
            items: vec![PurchaseItemInput {
                product_id: 1,
                quantity: 1,
                purchase_price: Decimal::from(-5),
                gst_percent: Decimal::ZERO,
            }],
        };
        assert_eq!(
            req.check(),
            Err("items[0]: purchase_price cannot be negative".to_string())
        );
    }
}
