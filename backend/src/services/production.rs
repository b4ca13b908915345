//! Production service: recipes and production runs
//!
//! A production run consumes raw materials per the recipe, books a
//! finished-goods batch with a timestamp batch number, and puts the
//! produced quantity into store stock, all in one transaction.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::production::{batch_number_for, production_cost};

/// Production service
#[derive(Clone)]
pub struct ProductionService {
    db: PgPool,
}

/// One ingredient line of a recipe
#[derive(Debug, Deserialize)]
pub struct RecipeLineInput {
    pub ingredient_id: Uuid,
    pub quantity: Decimal,
}

/// Input for creating or updating a recipe
#[derive(Debug, Deserialize)]
pub struct RecipeInput {
    pub product_id: Uuid,
    pub name: String,
    /// Units of the finished good one batch of this recipe yields
    pub yield_quantity: Decimal,
    pub shelf_life_days: i32,
    pub lines: Vec<RecipeLineInput>,
}

/// Recipe header with its computed per-unit cost
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct Recipe {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: Option<String>,
    pub name: String,
    pub yield_quantity: Decimal,
    pub shelf_life_days: i32,
    pub cost_per_unit: Decimal,
    pub is_active: bool,
}

/// Recipe ingredient line
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct RecipeLine {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub ingredient_id: Uuid,
    pub ingredient_name: Option<String>,
    pub quantity: Decimal,
    pub unit: Option<String>,
}

/// Input for recording a production run
#[derive(Debug, Deserialize)]
pub struct ProductionRunInput {
    pub recipe_id: Uuid,
    pub store_id: Uuid,
    pub quantity_produced: Decimal,
    pub notes: Option<String>,
}

/// A completed production run and the batch it created
#[derive(Debug, Serialize)]
pub struct ProductionRunResponse {
    pub run_id: Uuid,
    pub batch_id: Uuid,
    pub batch_number: String,
    pub quantity_produced: Decimal,
    pub expiration_date: NaiveDate,
    pub total_cost: Decimal,
}

/// Production run header
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct ProductionRun {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub recipe_name: Option<String>,
    pub store_id: Uuid,
    pub quantity_produced: Decimal,
    pub total_cost: Decimal,
    pub notes: Option<String>,
    pub run_date: DateTime<Utc>,
    pub created_by: Option<Uuid>,
}

#[derive(Debug, sqlx::FromRow)]
struct RecipeHeaderRow {
    product_id: Uuid,
    yield_quantity: Decimal,
    shelf_life_days: i32,
    is_active: bool,
}

impl ProductionService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record a production run. Ingredient stock goes down, a batch is
    /// created, and the finished good's store stock goes up, atomically.
    pub async fn record_run(
        &self,
        input: ProductionRunInput,
        baker: Uuid,
    ) -> AppResult<ProductionRunResponse> {
        if input.quantity_produced <= Decimal::ZERO {
            return Err(AppError::validation(
                "quantity_produced",
                "Produced quantity must be positive",
            ));
        }

        let mut tx = self.db.begin().await?;

        let recipe = sqlx::query_as::<_, RecipeHeaderRow>(
            "SELECT product_id, yield_quantity, shelf_life_days, is_active FROM recipes WHERE id = $1",
        )
        .bind(input.recipe_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Recipe".to_string()))?;

        if !recipe.is_active {
            return Err(AppError::validation("recipe_id", "Recipe is inactive"));
        }
        if recipe.yield_quantity <= Decimal::ZERO {
            return Err(AppError::Internal("Recipe has a zero yield".to_string()));
        }

        // Per-unit cost from current ingredient costs
        let cost_per_unit =
            sqlx::query_scalar::<_, Decimal>("SELECT calculate_recipe_cost($1)")
                .bind(input.recipe_id)
                .fetch_one(&mut *tx)
                .await?;
        let total_cost = production_cost(cost_per_unit, input.quantity_produced);

        // Ingredient consumption scales with produced quantity relative
        // to the recipe yield
        let scale = input.quantity_produced / recipe.yield_quantity;
        let lines = sqlx::query_as::<_, (Uuid, Decimal, String)>(
            r#"
            SELECT rl.ingredient_id, rl.quantity, p.name
            FROM recipe_lines rl
            JOIN products p ON p.id = rl.ingredient_id
            WHERE rl.recipe_id = $1
            "#,
        )
        .bind(input.recipe_id)
        .fetch_all(&mut *tx)
        .await?;

        for (ingredient_id, quantity, name) in &lines {
            let needed = *quantity * scale;
            let updated = sqlx::query(
                r#"
                UPDATE store_inventory
                SET current_stock = current_stock - $1, updated_at = NOW()
                WHERE store_id = $2 AND product_id = $3 AND current_stock >= $1
                "#,
            )
            .bind(needed)
            .bind(input.store_id)
            .bind(ingredient_id)
            .execute(&mut *tx)
            .await?;

            if updated.rows_affected() == 0 {
                return Err(AppError::InsufficientStock(format!(
                    "Not enough '{}' for this run",
                    name
                )));
            }

            // Aggregate stock on products mirrors the per-store row
            sqlx::query(
                r#"
                UPDATE products
                SET current_stock = current_stock - $1, updated_at = NOW()
                WHERE id = $2
                "#,
            )
            .bind(needed)
            .bind(ingredient_id)
            .execute(&mut *tx)
            .await?;
        }

        let run_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO production_runs
                (recipe_id, store_id, quantity_produced, total_cost, notes, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(input.recipe_id)
        .bind(input.store_id)
        .bind(input.quantity_produced)
        .bind(total_cost)
        .bind(&input.notes)
        .bind(baker)
        .fetch_one(&mut *tx)
        .await?;

        let now = Utc::now();
        let batch_number = batch_number_for(now.naive_utc());
        let production_date = now.date_naive();
        let expiration_date = production_date + chrono::Days::new(recipe.shelf_life_days as u64);

        let batch_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO finished_goods_batches
                (batch_number, production_run_id, product_id, store_id,
                 production_date, expiration_date, quantity_produced, quantity_remaining)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING id
            "#,
        )
        .bind(&batch_number)
        .bind(run_id)
        .bind(recipe.product_id)
        .bind(input.store_id)
        .bind(production_date)
        .bind(expiration_date)
        .bind(input.quantity_produced)
        .fetch_one(&mut *tx)
        .await?;

        // Finished good enters store stock
        sqlx::query(
            r#"
            INSERT INTO store_inventory (store_id, product_id, current_stock, reorder_level)
            VALUES ($1, $2, $3, (SELECT reorder_level FROM products WHERE id = $2))
            ON CONFLICT (store_id, product_id)
            DO UPDATE SET current_stock = store_inventory.current_stock + $3, updated_at = NOW()
            "#,
        )
        .bind(input.store_id)
        .bind(recipe.product_id)
        .bind(input.quantity_produced)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE products
            SET current_stock = current_stock + $1, updated_at = NOW()
            WHERE id = $2
            "#,
        )
        .bind(input.quantity_produced)
        .bind(recipe.product_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(%batch_number, quantity = %input.quantity_produced, "production run recorded");

        Ok(ProductionRunResponse {
            run_id,
            batch_id,
            batch_number,
            quantity_produced: input.quantity_produced,
            expiration_date,
            total_cost,
        })
    }

    pub async fn list_runs(&self, store_id: Option<Uuid>) -> AppResult<Vec<ProductionRun>> {
        let runs = sqlx::query_as::<_, ProductionRun>(
            r#"
            SELECT pr.id, pr.recipe_id, r.name AS recipe_name, pr.store_id,
                   pr.quantity_produced, pr.total_cost, pr.notes, pr.run_date, pr.created_by
            FROM production_runs pr
            LEFT JOIN recipes r ON r.id = pr.recipe_id
            WHERE ($1::uuid IS NULL OR pr.store_id = $1)
            ORDER BY pr.run_date DESC
            LIMIT 20
            "#,
        )
        .bind(store_id)
        .fetch_all(&self.db)
        .await?;

        Ok(runs)
    }

    pub async fn create_recipe(&self, input: RecipeInput) -> AppResult<Recipe> {
        Self::validate_recipe(&input)?;

        let mut tx = self.db.begin().await?;

        let recipe_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO recipes (product_id, name, yield_quantity, shelf_life_days)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(input.product_id)
        .bind(&input.name)
        .bind(input.yield_quantity)
        .bind(input.shelf_life_days)
        .fetch_one(&mut *tx)
        .await?;

        for line in &input.lines {
            sqlx::query(
                "INSERT INTO recipe_lines (recipe_id, ingredient_id, quantity) VALUES ($1, $2, $3)",
            )
            .bind(recipe_id)
            .bind(line.ingredient_id)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.get_recipe(recipe_id).await.map(|(r, _)| r)
    }

    /// Replace a recipe's header and ingredient lines
    pub async fn update_recipe(&self, id: Uuid, input: RecipeInput) -> AppResult<Recipe> {
        Self::validate_recipe(&input)?;

        let mut tx = self.db.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE recipes
            SET product_id = $2, name = $3, yield_quantity = $4,
                shelf_life_days = $5, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(input.product_id)
        .bind(&input.name)
        .bind(input.yield_quantity)
        .bind(input.shelf_life_days)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound("Recipe".to_string()));
        }

        sqlx::query("DELETE FROM recipe_lines WHERE recipe_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        for line in &input.lines {
            sqlx::query(
                "INSERT INTO recipe_lines (recipe_id, ingredient_id, quantity) VALUES ($1, $2, $3)",
            )
            .bind(id)
            .bind(line.ingredient_id)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.get_recipe(id).await.map(|(r, _)| r)
    }

    pub async fn list_recipes(&self) -> AppResult<Vec<Recipe>> {
        let recipes = sqlx::query_as::<_, Recipe>(
            r#"
            SELECT r.id, r.product_id, p.name AS product_name, r.name,
                   r.yield_quantity, r.shelf_life_days,
                   calculate_recipe_cost(r.id) AS cost_per_unit, r.is_active
            FROM recipes r
            LEFT JOIN products p ON p.id = r.product_id
            WHERE r.is_active = true
            ORDER BY r.name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(recipes)
    }

    pub async fn get_recipe(&self, id: Uuid) -> AppResult<(Recipe, Vec<RecipeLine>)> {
        let recipe = sqlx::query_as::<_, Recipe>(
            r#"
            SELECT r.id, r.product_id, p.name AS product_name, r.name,
                   r.yield_quantity, r.shelf_life_days,
                   calculate_recipe_cost(r.id) AS cost_per_unit, r.is_active
            FROM recipes r
            LEFT JOIN products p ON p.id = r.product_id
            WHERE r.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Recipe".to_string()))?;

        let lines = sqlx::query_as::<_, RecipeLine>(
            r#"
            SELECT rl.id, rl.recipe_id, rl.ingredient_id, p.name AS ingredient_name,
                   rl.quantity, p.unit
            FROM recipe_lines rl
            LEFT JOIN products p ON p.id = rl.ingredient_id
            WHERE rl.recipe_id = $1
            ORDER BY p.name
            "#,
        )
        .bind(id)
        .fetch_all(&self.db)
        .await?;

        Ok((recipe, lines))
    }

    pub async fn deactivate_recipe(&self, id: Uuid) -> AppResult<()> {
        let result =
            sqlx::query("UPDATE recipes SET is_active = false, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .execute(&self.db)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Recipe".to_string()));
        }
        Ok(())
    }

    fn validate_recipe(input: &RecipeInput) -> AppResult<()> {
        if input.name.trim().is_empty() {
            return Err(AppError::validation("name", "Recipe name is required"));
        }
        if input.yield_quantity <= Decimal::ZERO {
            return Err(AppError::validation(
                "yield_quantity",
                "Yield must be positive",
            ));
        }
        if input.shelf_life_days < 0 {
            return Err(AppError::validation(
                "shelf_life_days",
                "Shelf life cannot be negative",
            ));
        }
        if input.lines.is_empty() {
            return Err(AppError::validation(
                "lines",
                "A recipe needs at least one ingredient",
            ));
        }
        for line in &input.lines {
            if line.quantity <= Decimal::ZERO {
                return Err(AppError::validation(
                    "quantity",
                    "Ingredient quantity must be positive",
                ));
            }
        }
        Ok(())
    }
}
