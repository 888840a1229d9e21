//! Sales invoice service
//!
//! Create and update share one upsert path. An invoice moves from DRAFT to
//! INVOICED when the counter confirms it; once INVOICED it can no longer be
//! changed. Stock leaves the ledger only when an invoice is finalized.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use crate::error::{AppError, AppResult};
use crate::services::inventory::{record_movement, MovementKind};
use crate::services::product::ensure_products_exist;
use shared::billing::{compute_invoice_totals, format_invoice_number, header_discount, money};
use shared::format::format_datetime;
use shared::models::{InvoiceFilter, InvoiceRequest, InvoiceStatus};

/// Sales invoice service
#[derive(Clone)]
pub struct SalesService {
    db: PgPool,
}

/// Outcome of a create or update
#[derive(Debug, Clone, Copy, Serialize)]
pub struct InvoiceSaved {
    pub invoice_id: i64,
    pub final_status: InvoiceStatus,
}

#[derive(Debug, FromRow)]
struct InvoiceHeaderRow {
    id: i64,
    invoice_number: String,
    customer_name: String,
    customer_mobile: String,
    status: String,
    total_amount_before_discount: Decimal,
    total_discount: Decimal,
    taxable_amount: Decimal,
    total_gst: Decimal,
    round_off: Decimal,
    total_invoice_amount: Decimal,
    payment_mode: String,
    created_at: DateTime<Utc>,
    invoice_pdf_key: Option<String>,
}

/// Invoice header as returned by the detail endpoint
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceHeader {
    pub id: i64,
    pub invoice_number: String,
    pub customer_name: String,
    pub customer_mobile: String,
    pub status: String,
    pub total_amount_before_discount: Decimal,
    pub total_discount: Decimal,
    pub taxable_amount: Decimal,
    pub total_gst: Decimal,
    pub round_off: Decimal,
    pub total_invoice_amount: Decimal,
    pub payment_mode: String,
    pub created_at: String,
    pub invoice_pdf_key: Option<String>,
}

impl From<InvoiceHeaderRow> for InvoiceHeader {
    fn from(row: InvoiceHeaderRow) -> Self {
        Self {
            id: row.id,
            invoice_number: row.invoice_number,
            customer_name: row.customer_name,
            customer_mobile: row.customer_mobile,
            status: row.status,
            total_amount_before_discount: row.total_amount_before_discount,
            total_discount: row.total_discount,
            taxable_amount: row.taxable_amount,
            total_gst: row.total_gst,
            round_off: row.round_off,
            total_invoice_amount: row.total_invoice_amount,
            payment_mode: row.payment_mode,
            created_at: format_datetime(Some(&row.created_at)),
            invoice_pdf_key: row.invoice_pdf_key,
        }
    }
}

/// Live invoice line with its product name
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct InvoiceLine {
    pub id: i64,
    pub product_name: String,
    pub quantity: i32,
    pub sales_rate: Decimal,
    pub discount_amount: Decimal,
    pub gst_percent: Decimal,
    pub gst_amount: Decimal,
    pub line_total: Decimal,
}

/// Invoice with its lines
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceDetail {
    pub invoice: InvoiceHeader,
    pub items: Vec<InvoiceLine>,
}

#[derive(Debug, FromRow)]
struct InvoiceListRow {
    id: i64,
    invoice_number: String,
    customer_name: String,
    customer_mobile: String,
    status: String,
    total_invoice_amount: Decimal,
    created_at: DateTime<Utc>,
}

/// Invoice row in the listing
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceListItem {
    pub id: i64,
    pub invoice_number: String,
    pub customer_name: String,
    pub customer_mobile: String,
    pub status: String,
    pub total_invoice_amount: Decimal,
    pub created_at: String,
}

impl From<InvoiceListRow> for InvoiceListItem {
    fn from(row: InvoiceListRow) -> Self {
        Self {
            id: row.id,
            invoice_number: row.invoice_number,
            customer_name: row.customer_name,
            customer_mobile: row.customer_mobile,
            status: row.status,
            total_invoice_amount: row.total_invoice_amount,
            created_at: format_datetime(Some(&row.created_at)),
        }
    }
}

/// One page of the invoice listing
#[derive(Debug, Clone, Serialize)]
pub struct InvoicePage {
    pub page: u32,
    pub limit: u32,
    pub invoices: Vec<InvoiceListItem>,
}

impl SalesService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn create_invoice(&self, input: &InvoiceRequest) -> AppResult<InvoiceSaved> {
        self.upsert_invoice(None, input).await
    }

    pub async fn update_invoice(&self, invoice_id: i64, input: &InvoiceRequest) -> AppResult<InvoiceSaved> {
        self.upsert_invoice(Some(invoice_id), input).await
    }

    /// Shared create/update path. `None` creates a new invoice.
    async fn upsert_invoice(
        &self,
        invoice_id: Option<i64>,
        input: &InvoiceRequest,
    ) -> AppResult<InvoiceSaved> {
        input.check().map_err(AppError::Validation)?;

        let mut tx = self.db.begin().await?;

        if let Some(id) = invoice_id {
            // Lock the row so concurrent updates cannot both pass the status check
            let status = sqlx::query_scalar::<_, String>(
                r#"
                SELECT status
                FROM sales_invoices
                WHERE id = $1 AND deleted_at IS NULL
                FOR UPDATE
                "#,
            )
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(AppError::NotFound("invoice"))?;

            let status = status.parse::<InvoiceStatus>().map_err(AppError::Internal)?;
            if status.is_locked() {
                return Err(AppError::InvoiceLocked);
            }
        }

        let product_ids: Vec<i64> = input.items.iter().map(|i| i.product_id).collect();
        ensure_products_exist(&mut tx, &product_ids).await?;

        let totals = compute_invoice_totals(&input.items)?;
        let (discount_type, discount_value) = header_discount(&input.items);
        let final_status = input.final_status();
        let meta = &input.invoice;
        let now = Utc::now();

        let id = match invoice_id {
            None => {
                let serial = sqlx::query_scalar::<_, i64>("SELECT nextval('sales_invoice_number_seq')")
                    .fetch_one(&mut *tx)
                    .await?;
                let invoice_number = format_invoice_number(now.date_naive(), serial);

                sqlx::query_scalar::<_, i64>(
                    r#"
                    INSERT INTO sales_invoices (
                        invoice_number, customer_name, customer_mobile, status,
                        total_amount_before_discount, discount_type, discount_value, total_discount,
                        taxable_amount, total_gst, round_off, total_invoice_amount,
                        total_items, total_quantity, payment_mode
                    ) VALUES (
                        $1, $2, $3, $4,
                        $5, $6, $7, $8,
                        $9, $10, $11, $12,
                        $13, $14, $15
                    )
                    RETURNING id
                    "#,
                )
                .bind(&invoice_number)
                .bind(&meta.customer_name)
                .bind(&meta.customer_mobile)
                .bind(final_status.as_str())
                .bind(money(totals.total_amount_before_discount))
                .bind(&discount_type)
                .bind(discount_value)
                .bind(money(totals.total_discount))
                .bind(money(totals.taxable_amount))
                .bind(money(totals.total_gst))
                .bind(money(totals.round_off))
                .bind(totals.total_invoice_amount)
                .bind(totals.total_items)
                .bind(totals.total_quantity)
                .bind(&meta.payment_mode)
                .fetch_one(&mut *tx)
                .await?
            }
            Some(id) => {
                sqlx::query(
                    r#"
                    UPDATE sales_invoices
                    SET customer_name = $1,
                        customer_mobile = $2,
                        status = $3,
                        total_amount_before_discount = $4,
                        discount_type = $5,
                        discount_value = $6,
                        total_discount = $7,
                        taxable_amount = $8,
                        total_gst = $9,
                        round_off = $10,
                        total_invoice_amount = $11,
                        total_items = $12,
                        total_quantity = $13,
                        payment_mode = $14,
                        updated_at = $15
                    WHERE id = $16 AND deleted_at IS NULL
                    "#,
                )
                .bind(&meta.customer_name)
                .bind(&meta.customer_mobile)
                .bind(final_status.as_str())
                .bind(money(totals.total_amount_before_discount))
                .bind(&discount_type)
                .bind(discount_value)
                .bind(money(totals.total_discount))
                .bind(money(totals.taxable_amount))
                .bind(money(totals.total_gst))
                .bind(money(totals.round_off))
                .bind(totals.total_invoice_amount)
                .bind(totals.total_items)
                .bind(totals.total_quantity)
                .bind(&meta.payment_mode)
                .bind(now)
                .bind(id)
                .execute(&mut *tx)
                .await?;

                // Replace the previous lines
                sqlx::query(
                    r#"
                    UPDATE sales_invoice_items
                    SET deleted_at = $1
                    WHERE sales_invoice_id = $2 AND deleted_at IS NULL
                    "#,
                )
                .bind(now)
                .bind(id)
                .execute(&mut *tx)
                .await?;

                id
            }
        };

        for (item, line) in input.items.iter().zip(&totals.lines) {
            sqlx::query(
                r#"
                INSERT INTO sales_invoice_items (
                    sales_invoice_id, product_id, quantity, mrp, sales_rate,
                    discount_type, discount_value, discount_amount,
                    gst_percent, gst_amount, line_total
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                "#,
            )
            .bind(id)
            .bind(item.product_id)
            .bind(item.quantity)
            .bind(item.mrp)
            .bind(item.sales_rate)
            .bind(&item.discount_type)
            .bind(item.discount_value)
            .bind(money(line.discount))
            .bind(item.gst_percent)
            .bind(money(line.gst))
            .bind(money(line.line_total))
            .execute(&mut *tx)
            .await?;
        }

        if final_status == InvoiceStatus::Invoiced {
            for item in &input.items {
                record_movement(&mut tx, MovementKind::Sale, item.product_id, item.quantity, id, None)
                    .await?;
            }
        }

        tx.commit().await?;

        tracing::info!(
            invoice_id = id,
            status = %final_status,
            total = %totals.total_invoice_amount,
            "Sales invoice saved"
        );

        Ok(InvoiceSaved {
            invoice_id: id,
            final_status,
        })
    }

    /// Invoice header and its live lines
    pub async fn get_invoice(&self, invoice_id: i64) -> AppResult<InvoiceDetail> {
        let header = sqlx::query_as::<_, InvoiceHeaderRow>(
            r#"
            SELECT id, invoice_number, customer_name, customer_mobile, status,
                   total_amount_before_discount, total_discount, taxable_amount,
                   total_gst, round_off, total_invoice_amount, payment_mode,
                   created_at, invoice_pdf_key
            FROM sales_invoices
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(invoice_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::NotFound("invoice"))?;

        let items = sqlx::query_as::<_, InvoiceLine>(
            r#"
            SELECT sii.id, p.name AS product_name, sii.quantity, sii.sales_rate,
                   sii.discount_amount, sii.gst_percent, sii.gst_amount, sii.line_total
            FROM sales_invoice_items sii
            JOIN products p ON p.id = sii.product_id
            WHERE sii.sales_invoice_id = $1 AND sii.deleted_at IS NULL
            ORDER BY sii.id
            "#,
        )
        .bind(invoice_id)
        .fetch_all(&self.db)
        .await?;

        Ok(InvoiceDetail {
            invoice: header.into(),
            items,
        })
    }

    /// Filtered, paginated invoice listing, newest first
    pub async fn list_invoices(&self, filter: &InvoiceFilter) -> AppResult<InvoicePage> {
        let mut query = list_query(filter);
        let rows = query
            .build_query_as::<InvoiceListRow>()
            .fetch_all(&self.db)
            .await?;

        Ok(InvoicePage {
            page: filter.pagination.page,
            limit: filter.pagination.limit,
            invoices: rows.into_iter().map(InvoiceListItem::from).collect(),
        })
    }
}

/// Build the listing query for a filter
fn list_query(filter: &InvoiceFilter) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(
        r#"
        SELECT id, invoice_number, customer_name, customer_mobile,
               status, total_invoice_amount, created_at
        FROM sales_invoices
        WHERE deleted_at IS NULL"#,
    );

    if let Some(status) = filter.status {
        query.push(" AND status = ").push_bind(status.as_str());
    }
    if let Some(from) = filter.created_from {
        query.push(" AND created_at >= ").push_bind(from.and_utc());
    }
    if let Some(to) = filter.created_to {
        query.push(" AND created_at <= ").push_bind(to.and_utc());
    }

    query
        .push(" ORDER BY created_at DESC LIMIT ")
        .push_bind(i64::from(filter.pagination.limit))
        .push(" OFFSET ")
        .push_bind(filter.pagination.offset());

    query
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fixtures::{movements, seed_product};
    use serde_json::json;
    use shared::models::ListInvoicesQuery;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn request(confirmed: bool, items: serde_json::Value) -> InvoiceRequest {
        serde_json::from_value(json!({
            "invoice": { "customer_name": "Ravi", "customer_mobile": "9876543210", "is_confirmed": confirmed },
            "items": items
        }))
        .unwrap()
    }

    async fn item_counts(pool: &PgPool, invoice_id: i64) -> (i64, i64) {
        sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT COUNT(*) FILTER (WHERE deleted_at IS NULL),
                   COUNT(*) FILTER (WHERE deleted_at IS NOT NULL)
            FROM sales_invoice_items
            WHERE sales_invoice_id = $1
            "#,
        )
        .bind(invoice_id)
        .fetch_one(pool)
        .await
        .unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at a PostgreSQL server"]
    async fn test_draft_stores_totals_without_stock_movement(pool: PgPool) {
        let product = seed_product(&pool, "Cotton Kurta").await;
        let service = SalesService::new(pool.clone());

        let saved = service
            .create_invoice(&request(
                false,
                json!([{ "product_id": product, "quantity": 3, "sales_rate": "33.33", "gst_percent": "12" }]),
            ))
            .await
            .unwrap();
        assert_eq!(saved.final_status, InvoiceStatus::Draft);

        let detail = service.get_invoice(saved.invoice_id).await.unwrap();
        assert_eq!(detail.invoice.status, "DRAFT");
        assert!(detail.invoice.invoice_number.starts_with("INV"));
        assert_eq!(detail.invoice.invoice_number.len(), 15);
        assert_eq!(detail.invoice.total_amount_before_discount, dec("99.99"));
        assert_eq!(detail.invoice.taxable_amount, dec("99.99"));
        assert_eq!(detail.invoice.total_gst, dec("12.00"));
        assert_eq!(detail.invoice.round_off, dec("0.01"));
        assert_eq!(detail.invoice.total_invoice_amount, dec("112"));
        assert_eq!(detail.items.len(), 1);
        assert_eq!(detail.items[0].product_name, "Cotton Kurta");
        assert_eq!(detail.items[0].line_total, dec("111.99"));

        assert!(movements(&pool, "sale", saved.invoice_id).await.is_empty());
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at a PostgreSQL server"]
    async fn test_update_replaces_items_and_finalizes(pool: PgPool) {
        let kurta = seed_product(&pool, "Cotton Kurta").await;
        let saree = seed_product(&pool, "Silk Saree").await;
        let service = SalesService::new(pool.clone());

        let draft = service
            .create_invoice(&request(
                false,
                json!([
                    { "product_id": kurta, "quantity": 2, "sales_rate": "500" },
                    { "product_id": saree, "quantity": 1, "sales_rate": "2500" }
                ]),
            ))
            .await
            .unwrap();
        assert_eq!(item_counts(&pool, draft.invoice_id).await, (2, 0));

        let saved = service
            .update_invoice(
                draft.invoice_id,
                &request(
                    true,
                    json!([{ "product_id": kurta, "quantity": 5, "sales_rate": "500", "discount_type": "%", "discount_value": "10" }]),
                ),
            )
            .await
            .unwrap();
        assert_eq!(saved.invoice_id, draft.invoice_id);
        assert_eq!(saved.final_status, InvoiceStatus::Invoiced);

        assert_eq!(item_counts(&pool, draft.invoice_id).await, (1, 2));

        let detail = service.get_invoice(draft.invoice_id).await.unwrap();
        assert_eq!(detail.invoice.status, "INVOICED");
        assert_eq!(detail.invoice.total_discount, dec("250"));
        assert_eq!(detail.invoice.total_invoice_amount, dec("2250"));
        assert_eq!(detail.items[0].quantity, 5);

        assert_eq!(movements(&pool, "sale", draft.invoice_id).await, vec![(kurta, -5)]);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at a PostgreSQL server"]
    async fn test_invoiced_invoice_rejects_updates(pool: PgPool) {
        let product = seed_product(&pool, "Linen Shirt").await;
        let service = SalesService::new(pool.clone());
        let items = json!([{ "product_id": product, "quantity": 1, "sales_rate": "899" }]);

        let saved = service.create_invoice(&request(true, items.clone())).await.unwrap();
        assert_eq!(saved.final_status, InvoiceStatus::Invoiced);

        let err = service
            .update_invoice(saved.invoice_id, &request(false, items))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvoiceLocked));

        let detail = service.get_invoice(saved.invoice_id).await.unwrap();
        assert_eq!(detail.invoice.status, "INVOICED");
        assert_eq!(item_counts(&pool, saved.invoice_id).await, (1, 0));
        assert_eq!(movements(&pool, "sale", saved.invoice_id).await, vec![(product, -1)]);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at a PostgreSQL server"]
    async fn test_update_of_missing_invoice_is_not_found(pool: PgPool) {
        let product = seed_product(&pool, "Linen Shirt").await;
        let service = SalesService::new(pool.clone());

        let err = service
            .update_invoice(
                999_999,
                &request(false, json!([{ "product_id": product, "quantity": 1, "sales_rate": "10" }])),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound("invoice")));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at a PostgreSQL server"]
    async fn test_unknown_product_is_not_found(pool: PgPool) {
        let product = seed_product(&pool, "Linen Shirt").await;
        let service = SalesService::new(pool.clone());

        let err = service
            .create_invoice(&request(
                true,
                json!([
                    { "product_id": product, "quantity": 1, "sales_rate": "10" },
                    { "product_id": 424_242, "quantity": 1, "sales_rate": "10" }
                ]),
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound("product")));

        let invoices = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM sales_invoices")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(invoices, 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL pointing at a PostgreSQL server"]
    async fn test_invoice_numbers_are_distinct(pool: PgPool) {
        let product = seed_product(&pool, "Dupatta").await;
        let service = SalesService::new(pool.clone());
        let items = json!([{ "product_id": product, "quantity": 1, "sales_rate": "350" }]);

        let first = service.create_invoice(&request(false, items.clone())).await.unwrap();
        let second = service.create_invoice(&request(false, items)).await.unwrap();

        let first = service.get_invoice(first.invoice_id).await.unwrap();
        let second = service.get_invoice(second.invoice_id).await.unwrap();
        assert_ne!(first.invoice.invoice_number, second.invoice.invoice_number);
    }

    #[test]
    fn test_list_query_without_filters() {
        let filter = ListInvoicesQuery::default().resolve().unwrap();
        let query = list_query(&filter);
        assert!(query.sql().contains("WHERE deleted_at IS NULL ORDER BY created_at DESC LIMIT $1 OFFSET $2"));
    }

    #[test]
    fn test_list_query_with_all_filters() {
        let filter = ListInvoicesQuery {
            status: Some("INVOICED".into()),
            from: Some("2024-05-01".into()),
            to: Some("2024-05-31".into()),
            page: Some(2),
            limit: Some(50),
        }
        .resolve()
        .unwrap();

        let query = list_query(&filter);
        let sql = query.sql();
        assert!(sql.contains("AND status = $1"));
        assert!(sql.contains("AND created_at >= $2"));
        assert!(sql.contains("AND created_at <= $3"));
        assert!(sql.contains("LIMIT $4 OFFSET $5"));
        assert_eq!(filter.pagination.offset(), 50);
    }
}
