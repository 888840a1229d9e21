//! Request validation tests
//!
//! Tests for catalog, purchase and account inputs including:
//! - Required fields and money bounds
//! - Path id parsing
//! - User registration rules

use proptest::prelude::*;
use rust_decimal::Decimal;
use serde_json::json;
use shared::models::{ProductInput, PurchaseRequest, RegisterInput, SupplierInput};
use shared::validation::{check, parse_id};

fn product(value: serde_json::Value) -> ProductInput {
    serde_json::from_value(value).unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_product_defaults() {
        let input = product(json!({ "name": "Cotton Saree" }));
        assert!(input.check().is_ok());
        assert_eq!(input.sku, "");
        assert_eq!(input.gst_percent, Decimal::ZERO);
    }

    #[test]
    fn test_product_requires_name() {
        let input = product(json!({ "name": "", "sales_price": "100" }));
        assert_eq!(input.check().unwrap_err(), "name is required");
    }

    #[test]
    fn test_product_money_bounds() {
        let input = product(json!({ "name": "Shirt", "sales_price": "-1" }));
        assert_eq!(input.check().unwrap_err(), "sales_price cannot be negative");

        let input = product(json!({ "name": "Shirt", "gst_percent": "120" }));
        assert_eq!(input.check().unwrap_err(), "gst_percent must be between 0 and 100");

        let input = product(json!({ "name": "Shirt", "sales_price": "100000000000" }));
        assert_eq!(
            input.check().unwrap_err(),
            "sales_price exceeds maximum allowed (9999999999.99)"
        );

        let input = product(json!({ "name": "Shirt", "purchase_price": "12.345" }));
        assert_eq!(
            input.check().unwrap_err(),
            "purchase_price must have at most 2 decimal places"
        );
    }

    #[test]
    fn test_supplier_requires_name() {
        let input = SupplierInput {
            name: String::new(),
            contact_info: "98450 00000".to_string(),
        };
        assert_eq!(input.check().unwrap_err(), "name is required");
    }

    #[test]
    fn test_purchase_requires_items() {
        let input: PurchaseRequest = serde_json::from_value(json!({
            "supplier_id": 4,
            "invoice_number": "SUP-991",
            "items": []
        }))
        .unwrap();
        assert_eq!(input.check().unwrap_err(), "at least one item is required");
    }

    #[test]
    fn test_purchase_item_errors() {
        let input: PurchaseRequest = serde_json::from_value(json!({
            "supplier_id": 4,
            "items": [{ "product_id": 0, "quantity": 5, "purchase_price": "10" }]
        }))
        .unwrap();
        assert_eq!(input.check().unwrap_err(), "items[0]: product_id must be positive");
    }

    #[test]
    fn test_purchase_bounds() {
        let input: PurchaseRequest = serde_json::from_value(json!({
            "supplier_id": 4,
            "items": [{ "product_id": 1, "quantity": 10000, "purchase_price": "10" }]
        }))
        .unwrap();
        assert_eq!(
            input.check().unwrap_err(),
            "items[0]: quantity exceeds maximum allowed (9999)"
        );

        let input: PurchaseRequest = serde_json::from_value(json!({
            "supplier_id": 4,
            "items": [{ "product_id": 1, "quantity": 9999, "purchase_price": "9999999999.99" }]
        }))
        .unwrap();
        assert_eq!(
            input.check().unwrap_err(),
            "total_amount_before_discount exceeds maximum allowed (9999999999.99)"
        );
    }

    #[test]
    fn test_register_rules() {
        let valid = RegisterInput {
            name: "Meena".to_string(),
            email: "meena@store.in".to_string(),
            password: "counter-01".to_string(),
            role: "cashier".to_string(),
        };
        assert!(check(&valid).is_ok());

        let short = RegisterInput {
            password: "short".to_string(),
            ..valid.clone()
        };
        assert_eq!(check(&short).unwrap_err(), "password must be at least 8 characters");

        let bad_email = RegisterInput {
            email: "meena".to_string(),
            ..valid
        };
        assert_eq!(check(&bad_email).unwrap_err(), "invalid email");
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("17"), Some(17));
        assert_eq!(parse_id(" 17 "), Some(17));
        assert_eq!(parse_id("0"), None);
        assert_eq!(parse_id("-3"), None);
        assert_eq!(parse_id("abc"), None);
        assert_eq!(parse_id(""), None);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Positive ids always parse back to themselves
        #[test]
        fn prop_positive_ids_parse(id in 1i64..i64::MAX) {
            prop_assert_eq!(parse_id(&id.to_string()), Some(id));
        }

        /// Non-positive ids are always rejected
        #[test]
        fn prop_non_positive_ids_rejected(id in i64::MIN..=0i64) {
            prop_assert_eq!(parse_id(&id.to_string()), None);
        }

        /// Amounts with more than two decimal places are rejected
        #[test]
        fn prop_sub_cent_prices_rejected(mills in 1i64..1_000_000) {
            prop_assume!(mills % 10 != 0);
            let input = product(json!({ "name": "Stole", "sales_price": Decimal::new(mills, 3).to_string() }));
            prop_assert_eq!(
                input.check().unwrap_err(),
                "sales_price must have at most 2 decimal places".to_string()
            );
        }

        /// Any GST rate within 0-100 is accepted on a product
        #[test]
        fn prop_gst_range(cents in 0i64..=10_000) {
            let input = ProductInput {
                name: "Dupatta".to_string(),
                sku: String::new(),
                barcode: String::new(),
                hsn_code: String::new(),
                gender: String::new(),
                category: String::new(),
                purchase_price: Decimal::ZERO,
                sales_price: Decimal::ZERO,
                gst_percent: Decimal::new(cents, 2),
            };
            prop_assert!(input.check().is_ok());
        }
    }
}
