//! User administration service

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::auth::AuthService;
use shared::models::user::Profile;
use shared::types::UserRole;
use shared::validation::validate_email;

/// User service
#[derive(Clone)]
pub struct UserService {
    db: PgPool,
}

/// Input for creating a user account
#[derive(Debug, Deserialize)]
pub struct CreateUserInput {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
    /// Stores the user can operate in; the first becomes the default
    pub store_ids: Vec<Uuid>,
}

/// Input for updating a user account
#[derive(Debug, Deserialize)]
pub struct UpdateUserInput {
    pub full_name: String,
    pub role: UserRole,
    pub is_active: bool,
}

#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    id: Uuid,
    full_name: String,
    email: String,
    role: String,
    is_active: bool,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl ProfileRow {
    fn into_profile(self) -> AppResult<Profile> {
        let role = self.role.parse().map_err(|e: String| AppError::Internal(e))?;
        Ok(Profile {
            id: self.id,
            full_name: self.full_name,
            email: self.email,
            role,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const PROFILE_COLUMNS: &str = "id, full_name, email, role, is_active, created_at, updated_at";

impl UserService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn list_users(&self) -> AppResult<Vec<Profile>> {
        let rows = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles ORDER BY full_name"
        ))
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(ProfileRow::into_profile).collect()
    }

    pub async fn get_user(&self, id: Uuid) -> AppResult<Profile> {
        sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?
        .into_profile()
    }

    /// Create an account and its store assignments together
    pub async fn create_user(&self, input: CreateUserInput) -> AppResult<Profile> {
        if input.full_name.trim().is_empty() {
            return Err(AppError::validation("full_name", "Name is required"));
        }
        if let Err(e) = validate_email(&input.email) {
            return Err(AppError::validation("email", e.to_string()));
        }
        if input.password.len() < 8 {
            return Err(AppError::validation(
                "password",
                "Password must be at least 8 characters",
            ));
        }

        let password_hash = AuthService::hash_password(&input.password)?;

        let mut tx = self.db.begin().await?;

        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            r#"
            INSERT INTO profiles (full_name, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(&input.full_name)
        .bind(&input.email)
        .bind(&password_hash)
        .bind(input.role.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
                AppError::DuplicateEntry("email".to_string())
            }
            _ => AppError::DatabaseError(e),
        })?;

        for (i, store_id) in input.store_ids.iter().enumerate() {
            sqlx::query(
                "INSERT INTO user_stores (user_id, store_id, is_default) VALUES ($1, $2, $3)",
            )
            .bind(row.id)
            .bind(store_id)
            .bind(i == 0)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        row.into_profile()
    }

    pub async fn update_user(&self, id: Uuid, input: UpdateUserInput) -> AppResult<Profile> {
        if input.full_name.trim().is_empty() {
            return Err(AppError::validation("full_name", "Name is required"));
        }

        sqlx::query_as::<_, ProfileRow>(&format!(
            r#"
            UPDATE profiles
            SET full_name = $2, role = $3, is_active = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&input.full_name)
        .bind(input.role.as_str())
        .bind(input.is_active)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?
        .into_profile()
    }

    /// Replace a user's store assignments; the first store becomes the
    /// default
    pub async fn set_store_assignments(
        &self,
        user_id: Uuid,
        store_ids: &[Uuid],
    ) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        sqlx::query("DELETE FROM user_stores WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        for (i, store_id) in store_ids.iter().enumerate() {
            sqlx::query(
                "INSERT INTO user_stores (user_id, store_id, is_default) VALUES ($1, $2, $3)",
            )
            .bind(user_id)
            .bind(store_id)
            .bind(i == 0)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Mark one of the user's assigned stores as their default
    pub async fn set_default_store(&self, user_id: Uuid, store_id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        sqlx::query("UPDATE user_stores SET is_default = false WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let updated = sqlx::query(
            "UPDATE user_stores SET is_default = true WHERE user_id = $1 AND store_id = $2",
        )
        .bind(user_id)
        .bind(store_id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound("Store assignment".to_string()));
        }

        tx.commit().await?;
        Ok(())
    }
}
