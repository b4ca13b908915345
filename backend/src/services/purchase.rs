//! Purchasing service: suppliers and stock purchases
//!
//! Inserting purchase lines fires a database trigger that bumps
//! `store_inventory.current_stock` and recomputes the product's weighted
//! average cost, so the service only writes the documents.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::types::Pagination;
use shared::validation::validate_phone;

/// Purchase service
#[derive(Clone)]
pub struct PurchaseService {
    db: PgPool,
}

/// Input for creating or updating a supplier
#[derive(Debug, Deserialize)]
pub struct SupplierInput {
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub gstin: Option<String>,
}

/// A supplier record
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct Supplier {
    pub id: Uuid,
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub gstin: Option<String>,
    pub is_active: bool,
}

/// One line of a purchase request
#[derive(Debug, Deserialize)]
pub struct PurchaseLineInput {
    pub product_id: Uuid,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
}

/// Input for recording a purchase
#[derive(Debug, Deserialize)]
pub struct PurchaseInput {
    pub store_id: Uuid,
    pub supplier_id: Uuid,
    pub lines: Vec<PurchaseLineInput>,
    pub invoice_number: Option<String>,
    pub notes: Option<String>,
}

/// Purchase header
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct Purchase {
    pub id: Uuid,
    pub purchase_number: String,
    pub store_id: Uuid,
    pub supplier_id: Uuid,
    pub supplier_name: Option<String>,
    pub total_amount: Decimal,
    pub invoice_number: Option<String>,
    pub notes: Option<String>,
    pub purchase_date: DateTime<Utc>,
    pub created_by: Option<Uuid>,
}

/// Purchase line
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct PurchaseLine {
    pub id: Uuid,
    pub purchase_id: Uuid,
    pub product_id: Uuid,
    pub product_name: Option<String>,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
    pub line_total: Decimal,
}

/// Filters for listing purchases
#[derive(Debug, Default, Deserialize)]
pub struct PurchaseFilter {
    pub store_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
    pub start_date: Option<chrono::NaiveDate>,
    pub end_date: Option<chrono::NaiveDate>,
}

impl PurchaseService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record a purchase: header, lines, and the trigger-driven stock and
    /// cost updates all commit together
    pub async fn create_purchase(&self, input: PurchaseInput, buyer: Uuid) -> AppResult<Purchase> {
        if input.lines.is_empty() {
            return Err(AppError::validation("lines", "A purchase needs at least one line"));
        }
        for line in &input.lines {
            if line.quantity <= Decimal::ZERO {
                return Err(AppError::validation("quantity", "Quantity must be positive"));
            }
            if line.unit_cost < Decimal::ZERO {
                return Err(AppError::validation("unit_cost", "Unit cost cannot be negative"));
            }
        }

        let total: Decimal = input.lines.iter().map(|l| l.quantity * l.unit_cost).sum();

        let mut tx = self.db.begin().await?;

        let purchase_number =
            sqlx::query_scalar::<_, String>("SELECT generate_purchase_number()")
                .fetch_one(&mut *tx)
                .await?;

        let (id, purchase_date) = sqlx::query_as::<_, (Uuid, DateTime<Utc>)>(
            r#"
            INSERT INTO purchases
                (purchase_number, store_id, supplier_id, total_amount,
                 invoice_number, notes, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, purchase_date
            "#,
        )
        .bind(&purchase_number)
        .bind(input.store_id)
        .bind(input.supplier_id)
        .bind(total)
        .bind(&input.invoice_number)
        .bind(&input.notes)
        .bind(buyer)
        .fetch_one(&mut *tx)
        .await?;

        for line in &input.lines {
            sqlx::query(
                r#"
                INSERT INTO purchase_lines
                    (purchase_id, product_id, quantity, unit_cost, line_total)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(id)
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(line.unit_cost)
            .bind(line.quantity * line.unit_cost)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(%purchase_number, %total, "purchase recorded");

        let supplier_name =
            sqlx::query_scalar::<_, String>("SELECT name FROM suppliers WHERE id = $1")
                .bind(input.supplier_id)
                .fetch_optional(&self.db)
                .await?;

        Ok(Purchase {
            id,
            purchase_number,
            store_id: input.store_id,
            supplier_id: input.supplier_id,
            supplier_name,
            total_amount: total,
            invoice_number: input.invoice_number,
            notes: input.notes,
            purchase_date,
            created_by: Some(buyer),
        })
    }

    pub async fn list_purchases(
        &self,
        filter: PurchaseFilter,
        pagination: Pagination,
    ) -> AppResult<Vec<Purchase>> {
        let offset = (pagination.page.saturating_sub(1) * pagination.per_page) as i64;

        let purchases = sqlx::query_as::<_, Purchase>(
            r#"
            SELECT pu.id, pu.purchase_number, pu.store_id, pu.supplier_id,
                   s.name AS supplier_name, pu.total_amount, pu.invoice_number,
                   pu.notes, pu.purchase_date, pu.created_by
            FROM purchases pu
            LEFT JOIN suppliers s ON s.id = pu.supplier_id
            WHERE ($1::uuid IS NULL OR pu.store_id = $1)
              AND ($2::uuid IS NULL OR pu.supplier_id = $2)
              AND ($3::date IS NULL OR pu.purchase_date::date >= $3)
              AND ($4::date IS NULL OR pu.purchase_date::date <= $4)
            ORDER BY pu.purchase_date DESC
            LIMIT $5 OFFSET $6
            "#,
        )
        .bind(filter.store_id)
        .bind(filter.supplier_id)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(pagination.per_page as i64)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        Ok(purchases)
    }

    pub async fn get_purchase(&self, id: Uuid) -> AppResult<(Purchase, Vec<PurchaseLine>)> {
        let purchase = sqlx::query_as::<_, Purchase>(
            r#"
            SELECT pu.id, pu.purchase_number, pu.store_id, pu.supplier_id,
                   s.name AS supplier_name, pu.total_amount, pu.invoice_number,
                   pu.notes, pu.purchase_date, pu.created_by
            FROM purchases pu
            LEFT JOIN suppliers s ON s.id = pu.supplier_id
            WHERE pu.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Purchase".to_string()))?;

        let lines = sqlx::query_as::<_, PurchaseLine>(
            r#"
            SELECT pl.id, pl.purchase_id, pl.product_id, p.name AS product_name,
                   pl.quantity, pl.unit_cost, pl.line_total
            FROM purchase_lines pl
            LEFT JOIN products p ON p.id = pl.product_id
            WHERE pl.purchase_id = $1
            ORDER BY pl.id
            "#,
        )
        .bind(id)
        .fetch_all(&self.db)
        .await?;

        Ok((purchase, lines))
    }

    pub async fn list_suppliers(&self) -> AppResult<Vec<Supplier>> {
        let suppliers = sqlx::query_as::<_, Supplier>(
            r#"
            SELECT id, name, contact_person, phone, email, address, gstin, is_active
            FROM suppliers
            WHERE is_active = true
            ORDER BY name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(suppliers)
    }

    pub async fn create_supplier(&self, input: SupplierInput) -> AppResult<Supplier> {
        Self::validate_supplier(&input)?;

        let supplier = sqlx::query_as::<_, Supplier>(
            r#"
            INSERT INTO suppliers (name, contact_person, phone, email, address, gstin)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, contact_person, phone, email, address, gstin, is_active
            "#,
        )
        .bind(&input.name)
        .bind(&input.contact_person)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.address)
        .bind(&input.gstin)
        .fetch_one(&self.db)
        .await?;

        Ok(supplier)
    }

    pub async fn update_supplier(&self, id: Uuid, input: SupplierInput) -> AppResult<Supplier> {
        Self::validate_supplier(&input)?;

        let supplier = sqlx::query_as::<_, Supplier>(
            r#"
            UPDATE suppliers
            SET name = $2, contact_person = $3, phone = $4, email = $5,
                address = $6, gstin = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, contact_person, phone, email, address, gstin, is_active
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.contact_person)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.address)
        .bind(&input.gstin)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Supplier".to_string()))?;

        Ok(supplier)
    }

    fn validate_supplier(input: &SupplierInput) -> AppResult<()> {
        if input.name.trim().is_empty() {
            return Err(AppError::validation("name", "Supplier name is required"));
        }
        if let Some(phone) = &input.phone {
            if let Err(e) = validate_phone(phone) {
                return Err(AppError::validation("phone", e.to_string()));
            }
        }
        Ok(())
    }
}
