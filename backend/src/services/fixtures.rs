//! Database fixtures for service tests
//!
//! Tests using these run under `#[sqlx::test]` against a migrated scratch
//! database created from `DATABASE_URL`. They are ignored by default; run them
//! with `cargo test -p pos-backend -- --ignored`.

use serde_json::json;
use sqlx::PgPool;

use crate::services::{ProductService, SupplierService};
use shared::models::{ProductInput, SupplierInput};

pub async fn seed_product(pool: &PgPool, name: &str) -> i64 {
    let input: ProductInput =
        serde_json::from_value(json!({ "name": name, "sales_price": "100", "gst_percent": "5" }))
            .unwrap();
    ProductService::new(pool.clone())
        .create_product(&input)
        .await
        .unwrap()
}

pub async fn seed_supplier(pool: &PgPool, name: &str) -> i64 {
    let input = SupplierInput {
        name: name.to_string(),
        contact_info: "98450 00000".to_string(),
    };
    SupplierService::new(pool.clone())
        .create_supplier(&input)
        .await
        .unwrap()
}

pub async fn seed_user(pool: &PgPool, email: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO users (name, email, password_hash) VALUES ('Clerk', $1, 'x') RETURNING id",
    )
    .bind(email)
    .fetch_one(pool)
    .await
    .unwrap()
}

/// Ledger rows written for one document, as `(product_id, signed quantity)`
pub async fn movements(pool: &PgPool, ref_type: &str, ref_id: i64) -> Vec<(i64, i32)> {
    sqlx::query_as::<_, (i64, i32)>(
        r#"
        SELECT product_id, quantity
        FROM inventory_transactions
        WHERE ref_type = $1 AND ref_id = $2
        ORDER BY id
        "#,
    )
    .bind(ref_type)
    .bind(ref_id)
    .fetch_all(pool)
    .await
    .unwrap()
}
