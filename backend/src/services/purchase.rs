//! Purchase recording service
//!
//! A purchase writes its header, its lines, and one inward stock movement per
//! line in a single transaction.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use crate::error::{AppError, AppResult};
use crate::services::inventory::{record_movement, MovementKind};
use crate::services::product::ensure_products_exist;
use shared::billing::{compute_purchase_totals, money};
use shared::format::format_datetime;
use shared::models::PurchaseRequest;

/// Purchase recording service
#[derive(Clone)]
pub struct PurchaseService {
    db: PgPool,
}

/// Result of a recorded purchase
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseCreated {
    pub purchase_id: i64,
    pub total_amount: Decimal,
    pub total_quantity: i64,
}

#[derive(Debug, FromRow)]
struct PurchaseRow {
    id: i64,
    invoice_number: String,
    supplier_name: String,
    created_at: DateTime<Utc>,
}

/// Purchase row in the listing
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseListItem {
    pub id: i64,
    pub invoice_number: String,
    pub supplier_name: String,
    pub created_at: String,
}

impl From<PurchaseRow> for PurchaseListItem {
    fn from(row: PurchaseRow) -> Self {
        Self {
            id: row.id,
            invoice_number: row.invoice_number,
            supplier_name: row.supplier_name,
            created_at: format_datetime(Some(&row.created_at)),
        }
    }
}

impl PurchaseService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record a supplier purchase and its inward stock movements
    pub async fn create_purchase(
        &self,
        created_by: i64,
        input: &PurchaseRequest,
    ) -> AppResult<PurchaseCreated> {
        input.check().map_err(AppError::Validation)?;

        let totals = compute_purchase_totals(&input.items)?;

        let mut tx = self.db.begin().await?;

        let supplier_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM suppliers WHERE id = $1 AND deleted_at IS NULL)",
        )
        .bind(input.supplier_id)
        .fetch_one(&mut *tx)
        .await?;

        if !supplier_exists {
            return Err(AppError::NotFound("supplier"));
        }

        let product_ids: Vec<i64> = input.items.iter().map(|i| i.product_id).collect();
        ensure_products_exist(&mut tx, &product_ids).await?;

        let purchase_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO purchase_invoices
                (invoice_number, supplier_id, total_amount_before_discount, discount_amount,
                 total_gst, total_invoice_amount, total_items, total_quantity, notes, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(&input.invoice_number)
        .bind(input.supplier_id)
        .bind(money(totals.total_amount_before_discount))
        .bind(Decimal::ZERO)
        .bind(money(totals.total_gst))
        .bind(money(totals.total_amount))
        .bind(totals.total_items)
        .bind(totals.total_quantity)
        .bind(&input.notes)
        .bind(created_by)
        .fetch_one(&mut *tx)
        .await?;

        for (item, line) in input.items.iter().zip(&totals.lines) {
            sqlx::query(
                r#"
                INSERT INTO purchase_invoice_items
                    (purchase_invoice_id, product_id, quantity, purchase_price,
                     gst_percent, gst_amount, line_total)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(purchase_id)
            .bind(item.product_id)
            .bind(item.quantity)
            .bind(item.purchase_price)
            .bind(item.gst_percent)
            .bind(money(line.gst))
            .bind(money(line.line_total))
            .execute(&mut *tx)
            .await?;

            record_movement(
                &mut tx,
                MovementKind::Purchase,
                item.product_id,
                item.quantity,
                purchase_id,
                Some(created_by),
            )
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            purchase_id,
            supplier_id = input.supplier_id,
            items = totals.total_items,
            "Purchase recorded"
        );

        Ok(PurchaseCreated {
            purchase_id,
            total_amount: money(totals.total_amount),
            total_quantity: totals.total_quantity,
        })
    }

    /// Purchases that are not deleted, newest first
    pub async fn list_purchases(&self) -> AppResult<Vec<PurchaseListItem>> {
        let rows = sqlx::query_as::<_, PurchaseRow>(
            r#"
            SELECT pi.id, pi.invoice_number, s.name AS supplier_name, pi.created_at
            FROM purchase_invoices pi
            JOIN suppliers s ON s.id = pi.supplier_id
            WHERE pi.deleted_at IS NULL
            ORDER BY pi.created_at DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(PurchaseListItem::from).collect())
    }
}
