//! Database migrations
//!
//! Schema creation and migration logic.

use rusqlite::Connection;
use tracing::info;

use super::connection::DbResult;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        info!("Applying schema migration v1");
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
    }

    Ok(())
}

/// Migration v1: Initial schema
///
/// Foreign keys carry no ON DELETE action; dependent rows are removed by the
/// store before their parent.
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- CHILDREN
        -- ============================================
        CREATE TABLE children (
            child_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            gender TEXT NOT NULL CHECK(gender IN ('M', 'F')),
            date_of_birth TEXT NOT NULL,         -- ISO date: "2019-04-02"
            meals_per_day INTEGER CHECK(meals_per_day BETWEEN 1 AND 10),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        -- ============================================
        -- MEALS
        -- ============================================
        CREATE TABLE meals (
            meal_id INTEGER PRIMARY KEY AUTOINCREMENT,
            meal_name TEXT NOT NULL,
            servings_fruit REAL NOT NULL DEFAULT 0 CHECK(servings_fruit >= 0),
            servings_grain REAL NOT NULL DEFAULT 0 CHECK(servings_grain >= 0),
            servings_meat_fish_eggs_nuts_seeds REAL NOT NULL DEFAULT 0
                CHECK(servings_meat_fish_eggs_nuts_seeds >= 0),
            servings_milk_yoghurt_cheese REAL NOT NULL DEFAULT 0
                CHECK(servings_milk_yoghurt_cheese >= 0),
            servings_veg_legumes_beans REAL NOT NULL DEFAULT 0
                CHECK(servings_veg_legumes_beans >= 0),
            child_id INTEGER NOT NULL REFERENCES children(child_id),
            meal_type TEXT NOT NULL
                CHECK(meal_type IN ('Breakfast', 'Lunch', 'Dinner', 'Snack', 'Dessert')),
            created_at TEXT NOT NULL
        );

        CREATE INDEX idx_meals_child ON meals(child_id);

        -- ============================================
        -- MOOD LOGS
        -- ============================================
        CREATE TABLE mood_logs (
            mood_log_id INTEGER PRIMARY KEY AUTOINCREMENT,
            child_id INTEGER NOT NULL REFERENCES children(child_id),
            mood TEXT NOT NULL CHECK(mood IN ('laugh', 'happy', 'neutral', 'sad', 'angry')),
            notes TEXT,
            created_at TEXT NOT NULL
        );

        CREATE INDEX idx_mood_logs_child_created ON mood_logs(child_id, created_at);

        -- ============================================
        -- RECIPES
        -- ============================================
        CREATE TABLE recipes (
            recipe_id INTEGER PRIMARY KEY AUTOINCREMENT,
            recipe_name TEXT NOT NULL,
            recipe_type TEXT,
            cuisine_type TEXT,
            dietary_preferences TEXT,
            cooking_steps TEXT,
            servings_veg_legumes_beans REAL,
            servings_fruit REAL,
            servings_grain REAL,
            servings_meat_fish_eggs_nuts_seeds REAL,
            servings_milk_yoghurt_cheese REAL
        );

        CREATE INDEX idx_recipes_name ON recipes(recipe_name);

        -- ============================================
        -- INGREDIENTS
        -- ============================================
        CREATE TABLE ingredients (
            ingredient_id INTEGER PRIMARY KEY AUTOINCREMENT,
            ingredient_name TEXT NOT NULL UNIQUE,
            category TEXT NOT NULL,
            emoji TEXT
        );

        CREATE INDEX idx_ingredients_category ON ingredients(category);

        -- ============================================
        -- RECIPE INGREDIENTS
        -- Junction table: which ingredients in which recipes
        -- ============================================
        CREATE TABLE recipe_ingredients (
            recipe_ingredient_id INTEGER PRIMARY KEY AUTOINCREMENT,
            recipe_id INTEGER NOT NULL REFERENCES recipes(recipe_id),
            ingredient_id INTEGER NOT NULL REFERENCES ingredients(ingredient_id),
            grams INTEGER CHECK(grams >= 0)
        );

        CREATE INDEX idx_recipe_ingredients_recipe ON recipe_ingredients(recipe_id);
        CREATE INDEX idx_recipe_ingredients_ingredient ON recipe_ingredients(ingredient_id);

        -- ============================================
        -- DIETARY GUIDELINES
        -- ============================================
        CREATE TABLE dietary_guidelines (
            guideline_id INTEGER PRIMARY KEY AUTOINCREMENT,
            gender TEXT NOT NULL CHECK(gender IN ('M', 'F')),
            age_group TEXT NOT NULL,
            servings_veg_legumes_beans REAL,
            servings_fruit REAL,
            servings_grain REAL,
            servings_meat_fish_eggs_nuts_seeds REAL,
            servings_milk_yoghurt_cheese REAL,
            min_age INTEGER NOT NULL CHECK(min_age >= 0),
            max_age INTEGER NOT NULL CHECK(max_age >= 0)
        );

        CREATE INDEX idx_dietary_guidelines_ages ON dietary_guidelines(min_age, max_age);
        "#,
    )?;

    Ok(())
}

/// Get the current schema version
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn needs_migration(conn: &Connection) -> DbResult<bool> {
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'schema_migrations')",
            [],
            |row| row.get(0),
        )?;
        if !exists {
            return Ok(true);
        }
        Ok(get_schema_version(conn)? < SCHEMA_VERSION)
    }

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(needs_migration(&conn).unwrap());

        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
        assert!(!needs_migration(&conn).unwrap());
    }

    #[test]
    fn test_ingredient_name_unique_index() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        conn.execute(
            "INSERT INTO ingredients (ingredient_name, category) VALUES ('Apple', 'Fruit')",
            [],
        )
        .unwrap();
        let duplicate = conn.execute(
            "INSERT INTO ingredients (ingredient_name, category) VALUES ('Apple', 'Fruit')",
            [],
        );
        assert!(duplicate.is_err());
    }
}
