//! # Database Module
//!
//! SQLite persistence for the cookbook and the weekly plan. Recipes own their
//! ingredient lines and steps; deleting a recipe removes them together with
//! any plan slots that reference it.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use log::info;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::path::Path;

use crate::ingredient_model::{IngredientLine, NewRecipe, Recipe, RecipeSource, RecipeSummary};
use crate::ingredient_parser::parse_quantity;
use crate::planner::{MealSlot, PlanSlot, Week};

/// Open (and create if needed) the database file at `path`
pub async fn connect(path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create database directory {}", parent.display()))?;
    }

    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to open database {}", path.display()))?;

    init_database_schema(&pool).await?;
    Ok(pool)
}

/// Initialize the database schema
pub async fn init_database_schema(pool: &SqlitePool) -> Result<()> {
    info!("Initializing database schema...");

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS recipes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL CHECK (length(title) BETWEEN 1 AND 255),
            base_servings INTEGER NOT NULL CHECK (base_servings >= 1),
            source TEXT NOT NULL,
            source_url TEXT,
            total_time TEXT,
            image_url TEXT,
            raw_text TEXT,
            created_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create recipes table")?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS ingredient_lines (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            recipe_id INTEGER NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            name TEXT NOT NULL,
            quantity TEXT,
            unit TEXT NOT NULL DEFAULT '',
            note TEXT
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create ingredient_lines table")?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS steps (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            recipe_id INTEGER NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            text TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create steps table")?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS plan_slots (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            plan_date TEXT NOT NULL,
            meal_slot TEXT NOT NULL CHECK (meal_slot IN ('breakfast', 'lunch', 'dinner')),
            recipe_id INTEGER NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
            servings INTEGER NOT NULL CHECK (servings >= 1),
            created_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create plan_slots table")?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_plan_slots_date ON plan_slots(plan_date)")
        .execute(pool)
        .await
        .context("Failed to create plan_slots index")?;

    info!("Database schema initialized successfully");
    Ok(())
}

/// Store a new recipe with its ingredient lines and steps
pub async fn create_recipe(pool: &SqlitePool, recipe: &NewRecipe) -> Result<i64> {
    info!("Creating recipe: {}", recipe.title);

    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let recipe_id = sqlx::query(
        "INSERT INTO recipes (title, base_servings, source, source_url, total_time, image_url, raw_text, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&recipe.title)
    .bind(i64::from(recipe.base_servings))
    .bind(recipe.source.as_str())
    .bind(&recipe.source_url)
    .bind(&recipe.total_time)
    .bind(&recipe.image_url)
    .bind(&recipe.raw_text)
    .bind(Utc::now())
    .execute(&mut *tx)
    .await
    .context("Failed to insert recipe")?
    .last_insert_rowid();

    insert_ingredient_lines(&mut tx, recipe_id, &recipe.ingredients).await?;
    insert_steps(&mut tx, recipe_id, &recipe.steps).await?;

    tx.commit().await.context("Failed to commit recipe")?;

    info!("Recipe created with ID: {}", recipe_id);
    Ok(recipe_id)
}

async fn insert_ingredient_lines(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    recipe_id: i64,
    lines: &[IngredientLine],
) -> Result<()> {
    for (position, line) in lines.iter().enumerate() {
        sqlx::query(
            "INSERT INTO ingredient_lines (recipe_id, position, name, quantity, unit, note)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(recipe_id)
        .bind(position as i64)
        .bind(&line.name)
        .bind(line.quantity.as_ref().map(|q| q.to_storage()))
        .bind(&line.unit)
        .bind(&line.note)
        .execute(&mut **tx)
        .await
        .context("Failed to insert ingredient line")?;
    }
    Ok(())
}

async fn insert_steps(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    recipe_id: i64,
    steps: &[String],
) -> Result<()> {
    for (position, step) in steps.iter().enumerate() {
        sqlx::query("INSERT INTO steps (recipe_id, position, text) VALUES (?, ?, ?)")
            .bind(recipe_id)
            .bind(position as i64)
            .bind(step)
            .execute(&mut **tx)
            .await
            .context("Failed to insert step")?;
    }
    Ok(())
}

fn servings_from_row(row: &SqliteRow, column: &str) -> Result<u32> {
    let value: i64 = row.try_get(column)?;
    u32::try_from(value).with_context(|| format!("Invalid {column} value: {value}"))
}

fn summary_from_row(row: &SqliteRow) -> Result<RecipeSummary> {
    Ok(RecipeSummary {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        base_servings: servings_from_row(row, "base_servings")?,
        total_time: row.try_get("total_time")?,
        image_url: row.try_get("image_url")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

/// Read a recipe with its ingredient lines and steps
pub async fn get_recipe(pool: &SqlitePool, recipe_id: i64) -> Result<Option<Recipe>> {
    info!("Reading recipe with ID: {}", recipe_id);

    let row = sqlx::query(
        "SELECT id, title, base_servings, source, source_url, total_time, image_url, raw_text, created_at
         FROM recipes WHERE id = ?",
    )
    .bind(recipe_id)
    .fetch_optional(pool)
    .await
    .context("Failed to read recipe")?;

    let Some(row) = row else {
        info!("No recipe found with ID: {}", recipe_id);
        return Ok(None);
    };

    let source: String = row.try_get("source")?;
    let source = source
        .parse::<RecipeSource>()
        .map_err(anyhow::Error::msg)?;

    let ingredients = sqlx::query(
        "SELECT name, quantity, unit, note FROM ingredient_lines
         WHERE recipe_id = ? ORDER BY position",
    )
    .bind(recipe_id)
    .fetch_all(pool)
    .await
    .context("Failed to read ingredient lines")?
    .iter()
    .map(|row| -> Result<IngredientLine> {
        let quantity: Option<String> = row.try_get("quantity")?;
        Ok(IngredientLine {
            name: row.try_get("name")?,
            quantity: quantity.as_deref().map(parse_quantity),
            unit: row.try_get("unit")?,
            note: row.try_get("note")?,
        })
    })
    .collect::<Result<Vec<_>>>()?;

    let steps = sqlx::query("SELECT text FROM steps WHERE recipe_id = ? ORDER BY position")
        .bind(recipe_id)
        .fetch_all(pool)
        .await
        .context("Failed to read steps")?
        .iter()
        .map(|row| row.try_get::<String, _>("text"))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(Recipe {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        base_servings: servings_from_row(&row, "base_servings")?,
        ingredients,
        steps,
        source,
        source_url: row.try_get("source_url")?,
        total_time: row.try_get("total_time")?,
        image_url: row.try_get("image_url")?,
        raw_text: row.try_get("raw_text")?,
        created_at: row.try_get("created_at")?,
    }))
}

/// List recipes, newest first, optionally filtered by a title substring
pub async fn list_recipes(pool: &SqlitePool, search: Option<&str>) -> Result<Vec<RecipeSummary>> {
    let pattern = format!("%{}%", search.unwrap_or("").trim());
    let rows = sqlx::query(
        "SELECT id, title, base_servings, total_time, image_url, created_at
         FROM recipes WHERE title LIKE ? ORDER BY created_at DESC, id DESC",
    )
    .bind(pattern)
    .fetch_all(pool)
    .await
    .context("Failed to list recipes")?;

    rows.iter().map(summary_from_row).collect()
}

/// Replace a recipe's editable fields, ingredient lines and steps
pub async fn update_recipe(pool: &SqlitePool, recipe_id: i64, recipe: &NewRecipe) -> Result<bool> {
    info!("Updating recipe with ID: {}", recipe_id);

    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let rows_affected = sqlx::query(
        "UPDATE recipes SET title = ?, base_servings = ?, source_url = ?, total_time = ?, image_url = ?
         WHERE id = ?",
    )
    .bind(&recipe.title)
    .bind(i64::from(recipe.base_servings))
    .bind(&recipe.source_url)
    .bind(&recipe.total_time)
    .bind(&recipe.image_url)
    .bind(recipe_id)
    .execute(&mut *tx)
    .await
    .context("Failed to update recipe")?
    .rows_affected();

    if rows_affected == 0 {
        info!("No recipe found with ID: {}", recipe_id);
        return Ok(false);
    }

    sqlx::query("DELETE FROM ingredient_lines WHERE recipe_id = ?")
        .bind(recipe_id)
        .execute(&mut *tx)
        .await
        .context("Failed to clear ingredient lines")?;
    sqlx::query("DELETE FROM steps WHERE recipe_id = ?")
        .bind(recipe_id)
        .execute(&mut *tx)
        .await
        .context("Failed to clear steps")?;

    insert_ingredient_lines(&mut tx, recipe_id, &recipe.ingredients).await?;
    insert_steps(&mut tx, recipe_id, &recipe.steps).await?;

    tx.commit().await.context("Failed to commit recipe update")?;

    info!("Recipe updated successfully with ID: {}", recipe_id);
    Ok(true)
}

/// Delete a recipe; its lines, steps and plan slots go with it
pub async fn delete_recipe(pool: &SqlitePool, recipe_id: i64) -> Result<bool> {
    info!("Deleting recipe with ID: {}", recipe_id);

    let rows_affected = sqlx::query("DELETE FROM recipes WHERE id = ?")
        .bind(recipe_id)
        .execute(pool)
        .await
        .context("Failed to delete recipe")?
        .rows_affected();

    Ok(rows_affected > 0)
}

/// Assign a recipe to a day and meal slot
pub async fn add_plan_slot(
    pool: &SqlitePool,
    date: NaiveDate,
    meal_slot: MealSlot,
    recipe_id: i64,
    servings: u32,
) -> Result<i64> {
    anyhow::ensure!(servings >= 1, "Servings must be at least 1");
    info!(
        "Planning recipe {} on {} ({}) for {} servings",
        recipe_id, date, meal_slot, servings
    );

    let slot_id = sqlx::query(
        "INSERT INTO plan_slots (plan_date, meal_slot, recipe_id, servings, created_at)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(date)
    .bind(meal_slot.as_str())
    .bind(recipe_id)
    .bind(i64::from(servings))
    .bind(Utc::now())
    .execute(pool)
    .await
    .context("Failed to insert plan slot")?
    .last_insert_rowid();

    Ok(slot_id)
}

/// All plan slots from Monday to Sunday of `week`
pub async fn list_plan_slots(pool: &SqlitePool, week: Week) -> Result<Vec<PlanSlot>> {
    let rows = sqlx::query(
        "SELECT id, plan_date, meal_slot, recipe_id, servings, created_at FROM plan_slots
         WHERE plan_date BETWEEN ? AND ?
         ORDER BY plan_date, CASE meal_slot WHEN 'breakfast' THEN 0 WHEN 'lunch' THEN 1 ELSE 2 END, id",
    )
    .bind(week.monday())
    .bind(week.sunday())
    .fetch_all(pool)
    .await
    .context("Failed to list plan slots")?;

    rows.iter()
        .map(|row| -> Result<PlanSlot> {
            let meal_slot: String = row.try_get("meal_slot")?;
            Ok(PlanSlot {
                id: row.try_get("id")?,
                date: row.try_get("plan_date")?,
                meal_slot: meal_slot.parse().map_err(anyhow::Error::msg)?,
                recipe_id: row.try_get("recipe_id")?,
                servings: servings_from_row(row, "servings")?,
                created_at: row.try_get("created_at")?,
            })
        })
        .collect()
}

/// Change the target servings of one plan slot
pub async fn update_plan_slot_servings(pool: &SqlitePool, slot_id: i64, servings: u32) -> Result<bool> {
    anyhow::ensure!(servings >= 1, "Servings must be at least 1");
    info!("Setting plan slot {} to {} servings", slot_id, servings);

    let rows_affected = sqlx::query("UPDATE plan_slots SET servings = ? WHERE id = ?")
        .bind(i64::from(servings))
        .bind(slot_id)
        .execute(pool)
        .await
        .context("Failed to update plan slot")?
        .rows_affected();

    Ok(rows_affected > 0)
}

/// Remove a plan slot
pub async fn delete_plan_slot(pool: &SqlitePool, slot_id: i64) -> Result<bool> {
    info!("Deleting plan slot with ID: {}", slot_id);

    let rows_affected = sqlx::query("DELETE FROM plan_slots WHERE id = ?")
        .bind(slot_id)
        .execute(pool)
        .await
        .context("Failed to delete plan slot")?
        .rows_affected();

    Ok(rows_affected > 0)
}
