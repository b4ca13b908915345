//! Product catalog and store inventory service

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::product::{stock_status, Category, Product};
use shared::types::{PaginatedResponse, Pagination, PaginationMeta, StockStatus};

/// Product service
#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
}

/// Input for creating or updating a product
#[derive(Debug, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub category_id: Option<Uuid>,
    pub sku: Option<String>,
    pub barcode: Option<String>,
    pub unit: String,
    pub selling_price: Decimal,
    pub reorder_level: Decimal,
    #[serde(default)]
    pub is_raw_material: bool,
    #[serde(default = "default_true")]
    pub is_finished_good: bool,
}

fn default_true() -> bool {
    true
}

/// Query parameters for listing products
#[derive(Debug, Default, Deserialize)]
pub struct ProductFilter {
    pub search: Option<String>,
    pub category_id: Option<Uuid>,
    pub is_active: Option<bool>,
    pub raw_materials_only: Option<bool>,
}

/// Product row as stored
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    category_id: Option<Uuid>,
    sku: Option<String>,
    barcode: Option<String>,
    unit: String,
    selling_price: Decimal,
    current_stock: Decimal,
    weighted_avg_cost: Decimal,
    reorder_level: Decimal,
    is_raw_material: bool,
    is_finished_good: bool,
    is_active: bool,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            category_id: row.category_id,
            sku: row.sku,
            barcode: row.barcode,
            unit: row.unit,
            selling_price: row.selling_price,
            current_stock: row.current_stock,
            weighted_avg_cost: row.weighted_avg_cost,
            reorder_level: row.reorder_level,
            is_raw_material: row.is_raw_material,
            is_finished_good: row.is_finished_good,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// One product's stock position in one store
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct StoreStockItem {
    pub product_id: Uuid,
    pub product_name: String,
    pub unit: String,
    pub current_stock: Decimal,
    pub reorder_level: Decimal,
    #[sqlx(skip)]
    pub status: Option<StockStatus>,
}

const PRODUCT_COLUMNS: &str = "id, name, category_id, sku, barcode, unit, selling_price, \
     current_stock, weighted_avg_cost, reorder_level, is_raw_material, \
     is_finished_good, is_active, created_at, updated_at";

impl ProductService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List products with search and category filters
    pub async fn list_products(
        &self,
        filter: ProductFilter,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<Product>> {
        let offset = (pagination.page.saturating_sub(1) * pagination.per_page) as i64;
        let search = filter.search.as_ref().map(|s| format!("%{}%", s));

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM products
            WHERE ($1::text IS NULL OR name ILIKE $1 OR sku ILIKE $1 OR barcode ILIKE $1)
              AND ($2::uuid IS NULL OR category_id = $2)
              AND ($3::bool IS NULL OR is_active = $3)
              AND ($4::bool IS NULL OR is_raw_material = $4)
            "#,
        )
        .bind(&search)
        .bind(filter.category_id)
        .bind(filter.is_active)
        .bind(filter.raw_materials_only)
        .fetch_one(&self.db)
        .await?;

        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS} FROM products
            WHERE ($1::text IS NULL OR name ILIKE $1 OR sku ILIKE $1 OR barcode ILIKE $1)
              AND ($2::uuid IS NULL OR category_id = $2)
              AND ($3::bool IS NULL OR is_active = $3)
              AND ($4::bool IS NULL OR is_raw_material = $4)
            ORDER BY name
            LIMIT $5 OFFSET $6
            "#
        ))
        .bind(&search)
        .bind(filter.category_id)
        .bind(filter.is_active)
        .bind(filter.raw_materials_only)
        .bind(pagination.per_page as i64)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        let total_pages = ((total as u64) as f64 / pagination.per_page as f64).ceil() as u32;

        Ok(PaginatedResponse {
            data: rows.into_iter().map(Product::from).collect(),
            pagination: PaginationMeta {
                page: pagination.page,
                per_page: pagination.per_page,
                total_items: total as u64,
                total_pages,
            },
        })
    }

    pub async fn get_product(&self, id: Uuid) -> AppResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        Ok(row.into())
    }

    pub async fn create_product(&self, input: ProductInput) -> AppResult<Product> {
        Self::validate_input(&input)?;

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            INSERT INTO products
                (name, category_id, sku, barcode, unit, selling_price,
                 reorder_level, is_raw_material, is_finished_good)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(&input.name)
        .bind(input.category_id)
        .bind(&input.sku)
        .bind(&input.barcode)
        .bind(&input.unit)
        .bind(input.selling_price)
        .bind(input.reorder_level)
        .bind(input.is_raw_material)
        .bind(input.is_finished_good)
        .fetch_one(&self.db)
        .await
        .map_err(map_duplicate_sku)?;

        Ok(row.into())
    }

    pub async fn update_product(&self, id: Uuid, input: ProductInput) -> AppResult<Product> {
        Self::validate_input(&input)?;

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            UPDATE products
            SET name = $2, category_id = $3, sku = $4, barcode = $5, unit = $6,
                selling_price = $7, reorder_level = $8, is_raw_material = $9,
                is_finished_good = $10, updated_at = NOW()
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&input.name)
        .bind(input.category_id)
        .bind(&input.sku)
        .bind(&input.barcode)
        .bind(&input.unit)
        .bind(input.selling_price)
        .bind(input.reorder_level)
        .bind(input.is_raw_material)
        .bind(input.is_finished_good)
        .fetch_optional(&self.db)
        .await
        .map_err(map_duplicate_sku)?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        Ok(row.into())
    }

    /// Soft delete: deactivated products keep their sales history
    pub async fn deactivate_product(&self, id: Uuid) -> AppResult<()> {
        let result =
            sqlx::query("UPDATE products SET is_active = false, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .execute(&self.db)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Product".to_string()));
        }
        Ok(())
    }

    pub async fn list_categories(&self) -> AppResult<Vec<Category>> {
        let categories =
            sqlx::query_as::<_, (Uuid, String)>("SELECT id, name FROM categories ORDER BY name")
                .fetch_all(&self.db)
                .await?
                .into_iter()
                .map(|(id, name)| Category { id, name })
                .collect();

        Ok(categories)
    }

    pub async fn create_category(&self, name: &str) -> AppResult<Category> {
        if name.trim().is_empty() {
            return Err(AppError::validation("name", "Category name is required"));
        }

        let id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO categories (name) VALUES ($1) RETURNING id",
        )
        .bind(name)
        .fetch_one(&self.db)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
                AppError::DuplicateEntry("name".to_string())
            }
            _ => AppError::DatabaseError(e),
        })?;

        Ok(Category {
            id,
            name: name.to_string(),
        })
    }

    /// Stock position for every product stocked in a store
    pub async fn store_stock(&self, store_id: Uuid) -> AppResult<Vec<StoreStockItem>> {
        let mut items = sqlx::query_as::<_, StoreStockItem>(
            r#"
            SELECT si.product_id, p.name AS product_name, p.unit,
                   si.current_stock, si.reorder_level
            FROM store_inventory si
            JOIN products p ON p.id = si.product_id
            WHERE si.store_id = $1 AND p.is_active = true
            ORDER BY p.name
            "#,
        )
        .bind(store_id)
        .fetch_all(&self.db)
        .await?;

        for item in &mut items {
            item.status = Some(stock_status(item.current_stock, item.reorder_level));
        }

        Ok(items)
    }

    /// Products at or below their reorder level in a store
    pub async fn low_stock(&self, store_id: Uuid) -> AppResult<Vec<StoreStockItem>> {
        let mut items = self.store_stock(store_id).await?;
        items.retain(|i| {
            matches!(
                i.status,
                Some(StockStatus::Low) | Some(StockStatus::Out)
            )
        });
        Ok(items)
    }

    /// Set the absolute stock level for a product in a store, used for
    /// stocktake corrections
    pub async fn adjust_stock(
        &self,
        store_id: Uuid,
        product_id: Uuid,
        new_stock: Decimal,
    ) -> AppResult<()> {
        if new_stock < Decimal::ZERO {
            return Err(AppError::validation(
                "current_stock",
                "Stock cannot be negative",
            ));
        }

        let mut tx = self.db.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO store_inventory (store_id, product_id, current_stock, reorder_level)
            VALUES ($1, $2, $3, (SELECT reorder_level FROM products WHERE id = $2))
            ON CONFLICT (store_id, product_id)
            DO UPDATE SET current_stock = $3, updated_at = NOW()
            "#,
        )
        .bind(store_id)
        .bind(product_id)
        .bind(new_stock)
        .execute(&mut *tx)
        .await?;

        // A stocktake sets an absolute level, so re-derive the aggregate
        // from the per-store rows rather than applying a delta
        sqlx::query(
            r#"
            UPDATE products
            SET current_stock = (SELECT COALESCE(SUM(current_stock), 0)
                                 FROM store_inventory WHERE product_id = $1),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(product_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }

    fn validate_input(input: &ProductInput) -> AppResult<()> {
        if input.name.trim().is_empty() {
            return Err(AppError::validation("name", "Product name is required"));
        }
        if input.selling_price < Decimal::ZERO {
            return Err(AppError::validation(
                "selling_price",
                "Selling price cannot be negative",
            ));
        }
        if input.reorder_level < Decimal::ZERO {
            return Err(AppError::validation(
                "reorder_level",
                "Reorder level cannot be negative",
            ));
        }
        Ok(())
    }
}

fn map_duplicate_sku(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
            AppError::DuplicateEntry("sku".to_string())
        }
        _ => AppError::DatabaseError(e),
    }
}
