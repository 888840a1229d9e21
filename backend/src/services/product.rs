//! Product catalogue service

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgConnection, PgPool};

use crate::error::{AppError, AppResult};
use shared::models::ProductInput;

/// Product catalogue service
#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
}

/// Full product record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub sku: String,
    pub barcode: String,
    pub hsn_code: String,
    pub gender: String,
    pub category: String,
    pub purchase_price: Decimal,
    pub sales_price: Decimal,
    pub gst_percent: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Product row shown in the catalogue listing
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProductSummary {
    pub id: i64,
    pub name: String,
    pub sku: String,
    pub barcode: String,
    pub category: String,
    pub gender: String,
    pub sales_price: Decimal,
}

/// Fail with `NotFound("product")` unless every id names a live product.
/// Runs on the caller's connection so it shares the document's transaction.
pub async fn ensure_products_exist(conn: &mut PgConnection, ids: &[i64]) -> AppResult<()> {
    let mut wanted = ids.to_vec();
    wanted.sort_unstable();
    wanted.dedup();

    let found = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM products WHERE id = ANY($1) AND deleted_at IS NULL",
    )
    .bind(&wanted)
    .fetch_all(conn)
    .await?;

    if let Some(missing) = wanted.iter().find(|id| !found.contains(id)) {
        tracing::debug!(product_id = missing, "Unknown product referenced");
        return Err(AppError::NotFound("product"));
    }

    Ok(())
}

impl ProductService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a product and return its id
    pub async fn create_product(&self, input: &ProductInput) -> AppResult<i64> {
        input.check().map_err(AppError::Validation)?;

        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO products
                (name, sku, barcode, hsn_code, gender, category, purchase_price, sales_price, gst_percent)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(&input.name)
        .bind(&input.sku)
        .bind(&input.barcode)
        .bind(&input.hsn_code)
        .bind(&input.gender)
        .bind(&input.category)
        .bind(input.purchase_price)
        .bind(input.sales_price)
        .bind(input.gst_percent)
        .fetch_one(&self.db)
        .await?;

        Ok(id)
    }

    /// List products that are not deleted
    pub async fn list_products(&self) -> AppResult<Vec<ProductSummary>> {
        let products = sqlx::query_as::<_, ProductSummary>(
            r#"
            SELECT id, name, sku, barcode, category, gender, sales_price
            FROM products
            WHERE deleted_at IS NULL
            ORDER BY name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(products)
    }

    /// Get a product by id
    pub async fn get_product(&self, id: i64) -> AppResult<Product> {
        sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, sku, barcode, hsn_code, gender, category,
                   purchase_price, sales_price, gst_percent, created_at
            FROM products
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::NotFound("product"))
    }
}
