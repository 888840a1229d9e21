//! Supplier management service

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use crate::error::{AppError, AppResult};
use shared::models::SupplierInput;

/// Supplier management service
#[derive(Clone)]
pub struct SupplierService {
    db: PgPool,
}

/// Supplier record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Supplier {
    pub id: i64,
    pub name: String,
    pub contact_info: String,
    pub created_at: DateTime<Utc>,
}

impl SupplierService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn create_supplier(&self, input: &SupplierInput) -> AppResult<i64> {
        input.check().map_err(AppError::Validation)?;

        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO suppliers (name, contact_info)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(&input.name)
        .bind(&input.contact_info)
        .fetch_one(&self.db)
        .await?;

        Ok(id)
    }

    /// Suppliers that are not deleted, newest first
    pub async fn list_suppliers(&self) -> AppResult<Vec<Supplier>> {
        let suppliers = sqlx::query_as::<_, Supplier>(
            r#"
            SELECT id, name, contact_info, created_at
            FROM suppliers
            WHERE deleted_at IS NULL
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(suppliers)
    }

    pub async fn get_supplier(&self, id: i64) -> AppResult<Supplier> {
        sqlx::query_as::<_, Supplier>(
            r#"
            SELECT id, name, contact_info, created_at
            FROM suppliers
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::NotFound("supplier"))
    }

    pub async fn update_supplier(&self, id: i64, input: &SupplierInput) -> AppResult<()> {
        input.check().map_err(AppError::Validation)?;

        let result = sqlx::query(
            r#"
            UPDATE suppliers
            SET name = $1, contact_info = $2
            WHERE id = $3 AND deleted_at IS NULL
            "#,
        )
        .bind(&input.name)
        .bind(&input.contact_info)
        .bind(id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("supplier"));
        }

        Ok(())
    }

    /// Soft delete a supplier
    pub async fn delete_supplier(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE suppliers
            SET deleted_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("supplier"));
        }

        Ok(())
    }
}
