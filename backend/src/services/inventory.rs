//! Stock movement ledger written alongside purchases and sales

use sqlx::PgConnection;

use crate::error::AppResult;

/// Document that caused a stock movement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementKind {
    /// Goods received from a supplier (adds stock)
    Purchase,
    /// Goods sold on a finalized invoice (removes stock)
    Sale,
}

impl MovementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::Purchase => "purchase",
            MovementKind::Sale => "sale",
        }
    }

    /// Signed ledger quantity for a line quantity
    pub fn signed_quantity(&self, quantity: i32) -> i32 {
        match self {
            MovementKind::Purchase => quantity,
            MovementKind::Sale => -quantity,
        }
    }
}

/// Record one stock movement inside the caller's transaction
pub async fn record_movement(
    conn: &mut PgConnection,
    kind: MovementKind,
    product_id: i64,
    quantity: i32,
    ref_id: i64,
    created_by: Option<i64>,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO inventory_transactions (product_id, quantity, ref_type, ref_id, created_by)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(product_id)
    .bind(kind.signed_quantity(quantity))
    .bind(kind.as_str())
    .bind(ref_id)
    .bind(created_by)
    .execute(conn)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_quantity() {
        assert_eq!(MovementKind::Purchase.signed_quantity(5), 5);
        assert_eq!(MovementKind::Sale.signed_quantity(5), -5);
    }

    #[test]
    fn test_ref_types() {
        assert_eq!(MovementKind::Purchase.as_str(), "purchase");
        assert_eq!(MovementKind::Sale.as_str(), "sale");
    }
}
