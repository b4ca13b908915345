//! Batch expiration tracking and wastage

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::production::expiry_status;
use shared::types::ExpiryStatus;

/// Expiration service
#[derive(Clone)]
pub struct ExpirationService {
    db: PgPool,
}

/// A batch approaching or past its expiration date
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct ExpiringBatch {
    pub batch_id: Uuid,
    pub batch_number: String,
    pub product_id: Uuid,
    pub product_name: String,
    pub store_id: Uuid,
    pub store_name: String,
    pub production_date: NaiveDate,
    pub expiration_date: NaiveDate,
    pub quantity_remaining: Decimal,
    pub days_until_expiry: i64,
    #[sqlx(skip)]
    pub status: Option<ExpiryStatus>,
}

/// Input for writing off a batch
#[derive(Debug, Deserialize)]
pub struct WastageInput {
    pub batch_id: Uuid,
    pub reason: String,
}

/// Result of a wastage write-off
#[derive(Debug, Serialize)]
pub struct WastageResponse {
    pub wastage_id: Uuid,
    pub batch_id: Uuid,
    pub quantity_wasted: Decimal,
    pub cost_written_off: Decimal,
}

#[derive(Debug, sqlx::FromRow)]
struct BatchRow {
    product_id: Uuid,
    store_id: Uuid,
    quantity_remaining: Decimal,
    status: String,
}

impl ExpirationService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Batches expiring within the horizon (default 7 days), soonest
    /// first, classified by urgency
    pub async fn expiring_batches(
        &self,
        store_id: Option<Uuid>,
        horizon_days: Option<i64>,
    ) -> AppResult<Vec<ExpiringBatch>> {
        let horizon = horizon_days.unwrap_or(7);

        let mut batches = sqlx::query_as::<_, ExpiringBatch>(
            r#"
            SELECT batch_id, batch_number, product_id, product_name, store_id,
                   store_name, production_date, expiration_date,
                   quantity_remaining, days_until_expiry
            FROM expiring_finished_goods
            WHERE ($1::uuid IS NULL OR store_id = $1)
              AND days_until_expiry <= $2
            ORDER BY expiration_date
            "#,
        )
        .bind(store_id)
        .bind(horizon)
        .fetch_all(&self.db)
        .await?;

        for batch in &mut batches {
            batch.status = Some(expiry_status(batch.days_until_expiry));
        }

        Ok(batches)
    }

    /// Write off a batch's remaining quantity: the batch is marked
    /// expired, a wastage row records the cost, and the store stock is
    /// reduced, all in one transaction
    pub async fn mark_wastage(&self, input: WastageInput, by: Uuid) -> AppResult<WastageResponse> {
        if input.reason.trim().is_empty() {
            return Err(AppError::validation("reason", "A wastage reason is required"));
        }

        let mut tx = self.db.begin().await?;

        let batch = sqlx::query_as::<_, BatchRow>(
            r#"
            SELECT product_id, store_id, quantity_remaining, status
            FROM finished_goods_batches
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(input.batch_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Batch".to_string()))?;

        if batch.status != "active" {
            return Err(AppError::Conflict {
                resource: "batch".to_string(),
                message: "Batch has already been depleted or written off".to_string(),
            });
        }
        if batch.quantity_remaining <= Decimal::ZERO {
            return Err(AppError::Conflict {
                resource: "batch".to_string(),
                message: "Batch has no remaining quantity".to_string(),
            });
        }

        let unit_cost = sqlx::query_scalar::<_, Decimal>(
            "SELECT weighted_avg_cost FROM products WHERE id = $1",
        )
        .bind(batch.product_id)
        .fetch_one(&mut *tx)
        .await?;
        let cost_written_off = unit_cost * batch.quantity_remaining;

        let wastage_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO wastage (batch_id, product_id, store_id, quantity, cost, reason, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(input.batch_id)
        .bind(batch.product_id)
        .bind(batch.store_id)
        .bind(batch.quantity_remaining)
        .bind(cost_written_off)
        .bind(&input.reason)
        .bind(by)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE finished_goods_batches
            SET status = 'expired', quantity_remaining = 0, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(input.batch_id)
        .execute(&mut *tx)
        .await?;

        // Wasted goods leave store stock, floored at zero in case a
        // stocktake already removed them
        sqlx::query(
            r#"
            UPDATE store_inventory
            SET current_stock = GREATEST(current_stock - $1, 0), updated_at = NOW()
            WHERE store_id = $2 AND product_id = $3
            "#,
        )
        .bind(batch.quantity_remaining)
        .bind(batch.store_id)
        .bind(batch.product_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE products
            SET current_stock = GREATEST(current_stock - $1, 0), updated_at = NOW()
            WHERE id = $2
            "#,
        )
        .bind(batch.quantity_remaining)
        .bind(batch.product_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(batch_id = %input.batch_id, cost = %cost_written_off, "batch written off");

        Ok(WastageResponse {
            wastage_id,
            batch_id: input.batch_id,
            quantity_wasted: batch.quantity_remaining,
            cost_written_off,
        })
    }
}
