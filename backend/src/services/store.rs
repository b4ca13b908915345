//! Store management service
//!
//! Admins and managers see every store; cashiers and bakers only see the
//! stores they are assigned to via `user_stores`.

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use shared::models::store::Store;
use shared::validation::validate_store_code;

/// Store service
#[derive(Clone)]
pub struct StoreService {
    db: PgPool,
}

/// Input for creating or updating a store
#[derive(Debug, Deserialize)]
pub struct StoreInput {
    pub name: String,
    pub code: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub gstin: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct StoreRow {
    id: Uuid,
    name: String,
    code: String,
    address: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    gstin: Option<String>,
    is_active: bool,
}

impl From<StoreRow> for Store {
    fn from(row: StoreRow) -> Self {
        Store {
            id: row.id,
            name: row.name,
            code: row.code,
            address: row.address,
            phone: row.phone,
            email: row.email,
            gstin: row.gstin,
            is_active: row.is_active,
        }
    }
}

const STORE_COLUMNS: &str = "id, name, code, address, phone, email, gstin, is_active";

impl StoreService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Stores visible to a user, scoped by role
    pub async fn list_stores_for(&self, user: &AuthUser) -> AppResult<Vec<Store>> {
        let rows = if user.can_access_all_stores() {
            sqlx::query_as::<_, StoreRow>(&format!(
                "SELECT {STORE_COLUMNS} FROM stores WHERE is_active = true ORDER BY name"
            ))
            .fetch_all(&self.db)
            .await?
        } else {
            sqlx::query_as::<_, StoreRow>(&format!(
                r#"
                SELECT {STORE_COLUMNS} FROM stores s
                JOIN user_stores us ON us.store_id = s.id
                WHERE us.user_id = $1 AND s.is_active = true
                ORDER BY us.is_default DESC, s.name
                "#
            ))
            .bind(user.user_id)
            .fetch_all(&self.db)
            .await?
        };

        Ok(rows.into_iter().map(Store::from).collect())
    }

    pub async fn get_store(&self, id: Uuid) -> AppResult<Store> {
        let row = sqlx::query_as::<_, StoreRow>(&format!(
            "SELECT {STORE_COLUMNS} FROM stores WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Store".to_string()))?;

        Ok(row.into())
    }

    /// The user's default store, falling back to their first assignment
    pub async fn default_store_for(&self, user_id: Uuid) -> AppResult<Option<Store>> {
        let row = sqlx::query_as::<_, StoreRow>(&format!(
            r#"
            SELECT {STORE_COLUMNS} FROM stores s
            JOIN user_stores us ON us.store_id = s.id
            WHERE us.user_id = $1 AND s.is_active = true
            ORDER BY us.is_default DESC, s.name
            LIMIT 1
            "#
        ))
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Store::from))
    }

    pub async fn create_store(&self, input: StoreInput) -> AppResult<Store> {
        Self::validate_input(&input)?;

        let row = sqlx::query_as::<_, StoreRow>(&format!(
            r#"
            INSERT INTO stores (name, code, address, phone, email, gstin)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {STORE_COLUMNS}
            "#
        ))
        .bind(&input.name)
        .bind(&input.code)
        .bind(&input.address)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.gstin)
        .fetch_one(&self.db)
        .await
        .map_err(map_duplicate_code)?;

        Ok(row.into())
    }

    pub async fn update_store(&self, id: Uuid, input: StoreInput) -> AppResult<Store> {
        Self::validate_input(&input)?;

        let row = sqlx::query_as::<_, StoreRow>(&format!(
            r#"
            UPDATE stores
            SET name = $2, code = $3, address = $4, phone = $5, email = $6,
                gstin = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING {STORE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&input.name)
        .bind(&input.code)
        .bind(&input.address)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.gstin)
        .fetch_optional(&self.db)
        .await
        .map_err(map_duplicate_code)?
        .ok_or_else(|| AppError::NotFound("Store".to_string()))?;

        Ok(row.into())
    }

    pub async fn deactivate_store(&self, id: Uuid) -> AppResult<()> {
        let result =
            sqlx::query("UPDATE stores SET is_active = false, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .execute(&self.db)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Store".to_string()));
        }
        Ok(())
    }

    fn validate_input(input: &StoreInput) -> AppResult<()> {
        if input.name.trim().is_empty() {
            return Err(AppError::validation("name", "Store name is required"));
        }
        if let Err(e) = validate_store_code(&input.code) {
            return Err(AppError::validation("code", e.to_string()));
        }
        Ok(())
    }
}

fn map_duplicate_code(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
            AppError::DuplicateEntry("code".to_string())
        }
        _ => AppError::DatabaseError(e),
    }
}
