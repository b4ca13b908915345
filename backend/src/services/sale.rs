//! Point-of-sale checkout service
//!
//! Checkout recomputes every total server-side from the product table,
//! writes the sale header, its lines, and the stock decrements in a
//! single transaction, and retries the whole transaction when the
//! generated bill number collides with a concurrent sale.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::CheckoutConfig;
use crate::error::{AppError, AppResult};
use shared::models::cart::{Cart, CartItem};
use shared::models::sale::{Sale, SaleLine};
use shared::types::{PaymentMode, Pagination};

/// Sale service
#[derive(Clone)]
pub struct SaleService {
    db: PgPool,
    checkout: CheckoutConfig,
}

/// One line of a checkout request. Prices are intentionally absent, the
/// server looks them up itself.
#[derive(Debug, Deserialize)]
pub struct CheckoutItemInput {
    pub product_id: Uuid,
    pub quantity: u32,
    #[serde(default)]
    pub discount_percent: Decimal,
}

/// Input for completing a sale
#[derive(Debug, Deserialize)]
pub struct CheckoutInput {
    pub store_id: Uuid,
    pub items: Vec<CheckoutItemInput>,
    pub payment_mode: PaymentMode,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
}

/// Response after a completed sale: the header figures plus the lines
/// as persisted, so the receipt can print without a second fetch
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub sale_id: Uuid,
    pub bill_number: String,
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
    pub sale_date: DateTime<Utc>,
    pub lines: Vec<SaleLine>,
}

/// Product pricing snapshot used to price a checkout line
#[derive(Debug, sqlx::FromRow)]
struct PricingRow {
    id: Uuid,
    name: String,
    unit: String,
    selling_price: Decimal,
    weighted_avg_cost: Decimal,
    is_active: bool,
}

/// Filters for listing sales
#[derive(Debug, Deserialize)]
pub struct SaleFilter {
    pub store_id: Option<Uuid>,
    pub start_date: Option<chrono::NaiveDate>,
    pub end_date: Option<chrono::NaiveDate>,
    pub payment_mode: Option<PaymentMode>,
}

/// Sale header row as stored
#[derive(Debug, sqlx::FromRow)]
struct SaleRow {
    id: Uuid,
    bill_number: String,
    store_id: Uuid,
    subtotal: Decimal,
    discount_amount: Decimal,
    total_amount: Decimal,
    payment_mode: String,
    customer_name: Option<String>,
    customer_phone: Option<String>,
    sale_date: DateTime<Utc>,
    created_by: Option<Uuid>,
}

impl SaleRow {
    fn into_sale(self) -> AppResult<Sale> {
        let payment_mode = self
            .payment_mode
            .parse()
            .map_err(|e: String| AppError::Internal(e))?;
        Ok(Sale {
            id: self.id,
            bill_number: self.bill_number,
            store_id: self.store_id,
            subtotal: self.subtotal,
            discount_amount: self.discount_amount,
            total_amount: self.total_amount,
            payment_mode,
            customer_name: self.customer_name,
            customer_phone: self.customer_phone,
            sale_date: self.sale_date,
            created_by: self.created_by,
        })
    }
}

/// Sale line row as stored
#[derive(Debug, sqlx::FromRow)]
struct SaleLineRow {
    id: Uuid,
    sale_id: Uuid,
    product_id: Uuid,
    product_name: String,
    quantity: Decimal,
    unit_price: Decimal,
    discount_percent: Decimal,
    line_total: Decimal,
    cost_price: Decimal,
    created_at: DateTime<Utc>,
}

impl From<SaleLineRow> for SaleLine {
    fn from(row: SaleLineRow) -> Self {
        SaleLine {
            id: row.id,
            sale_id: row.sale_id,
            product_id: row.product_id,
            product_name: row.product_name,
            quantity: row.quantity,
            unit_price: row.unit_price,
            discount_percent: row.discount_percent,
            line_total: row.line_total,
            cost_price: row.cost_price,
            created_at: row.created_at,
        }
    }
}

impl SaleService {
    pub fn new(db: PgPool, checkout: CheckoutConfig) -> Self {
        Self { db, checkout }
    }

    /// Complete a sale: price the cart, allocate a bill number, and
    /// persist header, lines, and stock decrements atomically.
    ///
    /// The bill number comes from a SQL function that counts the day's
    /// sales, so two concurrent checkouts can compute the same number.
    /// The unique index on `sales.bill_number` turns the loser into a
    /// 23505 error, which we classify and retry a bounded number of
    /// times with a short pause.
    pub async fn checkout(&self, input: CheckoutInput, cashier: Uuid) -> AppResult<CheckoutResponse> {
        if input.items.is_empty() {
            return Err(AppError::validation("items", "Cart is empty"));
        }
        if input.payment_mode == PaymentMode::Credit
            && input.customer_name.is_none()
            && input.customer_phone.is_none()
        {
            return Err(AppError::validation(
                "customer_name",
                "Credit sales require a customer name or phone",
            ));
        }

        let cart = self.price_cart(&input.items).await?;

        let mut attempt = 1;
        loop {
            match self.try_checkout(&input, &cart, cashier).await {
                Ok(response) => return Ok(response),
                Err(e) if is_bill_number_collision(&e) => {
                    if attempt >= self.checkout.bill_number_attempts {
                        tracing::warn!(
                            attempts = attempt,
                            "bill number collisions exhausted retry budget"
                        );
                        return Err(AppError::BillNumberExhausted);
                    }
                    tracing::debug!(attempt, "bill number collision, retrying checkout");
                    attempt += 1;
                    tokio::time::sleep(std::time::Duration::from_millis(
                        self.checkout.retry_delay_ms,
                    ))
                    .await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Build a priced cart from the product table. Client-sent prices
    /// are never trusted.
    async fn price_cart(&self, items: &[CheckoutItemInput]) -> AppResult<Cart> {
        let ids: Vec<Uuid> = items.iter().map(|i| i.product_id).collect();

        let rows = sqlx::query_as::<_, PricingRow>(
            r#"
            SELECT id, name, unit, selling_price, weighted_avg_cost, is_active
            FROM products
            WHERE id = ANY($1)
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.db)
        .await?;

        let mut lines = Vec::with_capacity(items.len());
        for item in items {
            let row = rows
                .iter()
                .find(|r| r.id == item.product_id)
                .ok_or_else(|| AppError::NotFound("Product".to_string()))?;
            if !row.is_active {
                return Err(AppError::validation(
                    "items",
                    format!("Product '{}' is no longer sold", row.name),
                ));
            }
            if item.quantity < 1 {
                return Err(AppError::validation("quantity", "Quantity must be at least 1"));
            }
            if item.discount_percent < Decimal::ZERO
                || item.discount_percent > Decimal::from(100)
            {
                return Err(AppError::validation(
                    "discount_percent",
                    "Discount must be between 0 and 100",
                ));
            }
            lines.push(CartItem {
                product_id: row.id,
                name: row.name.clone(),
                selling_price: row.selling_price,
                unit: row.unit.clone(),
                quantity: item.quantity,
                discount_percent: item.discount_percent,
            });
        }

        Ok(Cart::from_items(lines))
    }

    /// One checkout attempt as a single transaction
    async fn try_checkout(
        &self,
        input: &CheckoutInput,
        cart: &Cart,
        cashier: Uuid,
    ) -> AppResult<CheckoutResponse> {
        let mut tx = self.db.begin().await?;

        let bill_number =
            sqlx::query_scalar::<_, String>("SELECT generate_bill_number($1)")
                .bind(input.store_id)
                .fetch_one(&mut *tx)
                .await?;

        let subtotal = cart.subtotal();
        let discount_amount = cart.discount_total();
        let total_amount = cart.total();

        let (sale_id, sale_date) = sqlx::query_as::<_, (Uuid, DateTime<Utc>)>(
            r#"
            INSERT INTO sales
                (bill_number, store_id, subtotal, discount_amount, total_amount,
                 payment_mode, customer_name, customer_phone, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, sale_date
            "#,
        )
        .bind(&bill_number)
        .bind(input.store_id)
        .bind(subtotal)
        .bind(discount_amount)
        .bind(total_amount)
        .bind(input.payment_mode.as_str())
        .bind(&input.customer_name)
        .bind(&input.customer_phone)
        .bind(cashier)
        .fetch_one(&mut *tx)
        .await?;

        let mut lines = Vec::with_capacity(cart.items().len());
        for item in cart.items() {
            // cost_price is snapshotted at sale time so later purchase
            // price changes do not rewrite historical profit
            let line = sqlx::query_as::<_, SaleLineRow>(
                r#"
                INSERT INTO sales_lines
                    (sale_id, product_id, product_name, quantity, unit_price,
                     discount_percent, line_total, cost_price)
                SELECT $1, p.id, $2, $3, $4, $5, $6, p.weighted_avg_cost
                FROM products p
                WHERE p.id = $7
                RETURNING id, sale_id, product_id, product_name, quantity,
                          unit_price, discount_percent, line_total, cost_price,
                          created_at
                "#,
            )
            .bind(sale_id)
            .bind(&item.name)
            .bind(Decimal::from(item.quantity))
            .bind(item.selling_price)
            .bind(item.discount_percent)
            .bind(item.line_total())
            .bind(item.product_id)
            .fetch_one(&mut *tx)
            .await?;
            lines.push(SaleLine::from(line));

            let updated = sqlx::query(
                r#"
                UPDATE store_inventory
                SET current_stock = current_stock - $1, updated_at = NOW()
                WHERE store_id = $2 AND product_id = $3 AND current_stock >= $1
                "#,
            )
            .bind(Decimal::from(item.quantity))
            .bind(input.store_id)
            .bind(item.product_id)
            .execute(&mut *tx)
            .await?;

            if updated.rows_affected() == 0 {
                return Err(AppError::InsufficientStock(format!(
                    "Not enough stock for '{}'",
                    item.name
                )));
            }

            // Keep the chain-wide aggregate on products in step with the
            // per-store row
            sqlx::query(
                r#"
                UPDATE products
                SET current_stock = current_stock - $1, updated_at = NOW()
                WHERE id = $2
                "#,
            )
            .bind(Decimal::from(item.quantity))
            .bind(item.product_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(%bill_number, %total_amount, "sale completed");

        Ok(CheckoutResponse {
            sale_id,
            bill_number,
            subtotal,
            discount_amount,
            total_amount,
            sale_date,
            lines,
        })
    }

    /// List sales with optional filters, newest first
    pub async fn list_sales(
        &self,
        filter: SaleFilter,
        pagination: Pagination,
    ) -> AppResult<Vec<Sale>> {
        let offset = (pagination.page.saturating_sub(1) * pagination.per_page) as i64;

        let rows = sqlx::query_as::<_, SaleRow>(
            r#"
            SELECT id, bill_number, store_id, subtotal, discount_amount, total_amount,
                   payment_mode, customer_name, customer_phone, sale_date, created_by
            FROM sales
            WHERE ($1::uuid IS NULL OR store_id = $1)
              AND ($2::date IS NULL OR sale_date::date >= $2)
              AND ($3::date IS NULL OR sale_date::date <= $3)
              AND ($4::text IS NULL OR payment_mode = $4)
            ORDER BY sale_date DESC
            LIMIT $5 OFFSET $6
            "#,
        )
        .bind(filter.store_id)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(filter.payment_mode.map(|m| m.as_str()))
        .bind(pagination.per_page as i64)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(SaleRow::into_sale).collect()
    }

    /// Fetch a sale with its lines
    pub async fn get_sale(&self, sale_id: Uuid) -> AppResult<(Sale, Vec<SaleLine>)> {
        let sale = sqlx::query_as::<_, SaleRow>(
            r#"
            SELECT id, bill_number, store_id, subtotal, discount_amount, total_amount,
                   payment_mode, customer_name, customer_phone, sale_date, created_by
            FROM sales
            WHERE id = $1
            "#,
        )
        .bind(sale_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Sale".to_string()))?
        .into_sale()?;

        let lines = sqlx::query_as::<_, SaleLineRow>(
            r#"
            SELECT id, sale_id, product_id, product_name, quantity, unit_price,
                   discount_percent, line_total, cost_price, created_at
            FROM sales_lines
            WHERE sale_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .map(SaleLine::from)
        .collect();

        Ok((sale, lines))
    }
}

/// True when the error is the bill-number unique index losing a race.
/// Any other error, including other unique violations, must not be
/// retried.
pub fn is_bill_number_collision(err: &AppError) -> bool {
    match err {
        AppError::DatabaseError(sqlx::Error::Database(db_err)) => is_unique_violation_on(
            db_err.code().as_deref(),
            db_err.constraint(),
            "sales_bill_number",
        ),
        _ => false,
    }
}

/// Classification on raw code and constraint name, kept separate from
/// `sqlx::Error` so it can be unit tested without a database handle
pub fn is_unique_violation_on(
    code: Option<&str>,
    constraint: Option<&str>,
    expected: &str,
) -> bool {
    code == Some("23505") && constraint.is_some_and(|c| c.contains(expected))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bill_number_collision_requires_unique_violation_code() {
        assert!(is_unique_violation_on(
            Some("23505"),
            Some("sales_bill_number_key"),
            "sales_bill_number"
        ));
        // Foreign key violation on the same table must not retry
        assert!(!is_unique_violation_on(
            Some("23503"),
            Some("sales_bill_number_key"),
            "sales_bill_number"
        ));
    }

    #[test]
    fn other_unique_violations_do_not_retry() {
        assert!(!is_unique_violation_on(
            Some("23505"),
            Some("products_sku_key"),
            "sales_bill_number"
        ));
        assert!(!is_unique_violation_on(Some("23505"), None, "sales_bill_number"));
    }
}
