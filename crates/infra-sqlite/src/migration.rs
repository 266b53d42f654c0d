// Schema creation and forward-only migration sweep.
//
// §4.1: "The store detects schema age by inspecting its table/column
// metadata and adds missing columns... at open time. Never drops columns."
// Ported column-for-column from the Python source's `_run_migrations`, using
// SQLite's `PRAGMA table_info` the same way the donor's migration runner
// checks `schema_version` before applying a numbered SQL file.

use sqlx::{Row, SqlitePool};
use tracing::info;

const SCHEMA: &str = include_str!("../schema/001_initial_schema.sql");

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), Box<dyn std::error::Error>> {
    info!("applying base schema");
    for statement in SCHEMA.split(';') {
        let clean = clean_statement(statement);
        if !clean.is_empty() {
            sqlx::query(&clean).execute(pool).await?;
        }
    }

    add_column_if_missing(pool, "decision_makers", "email", "TEXT").await?;
    add_column_if_missing(pool, "decision_makers", "linkedin_url", "TEXT").await?;
    add_column_if_missing(pool, "companies", "first_seen_date", "TEXT").await?;
    add_column_if_missing(pool, "companies", "last_csv_date", "TEXT").await?;
    add_column_if_missing(pool, "companies", "current_run_id", "TEXT").await?;
    add_column_if_missing(pool, "jobs", "verification_status", "TEXT NOT NULL DEFAULT 'unverified'").await?;

    info!("schema up to date");
    Ok(())
}

fn clean_statement(statement: &str) -> String {
    statement
        .lines()
        .filter(|line| !line.trim().starts_with("--"))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

async fn column_exists(pool: &SqlitePool, table: &str, column: &str) -> Result<bool, sqlx::Error> {
    let rows = sqlx::query(&format!("PRAGMA table_info({table})")).fetch_all(pool).await?;
    Ok(rows.iter().any(|row| row.get::<String, _>("name") == column))
}

async fn add_column_if_missing(
    pool: &SqlitePool,
    table: &str,
    column: &str,
    sql_type: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    if !column_exists(pool, table, column).await? {
        info!(table, column, "adding missing column");
        sqlx::query(&format!("ALTER TABLE {table} ADD COLUMN {column} {sql_type}"))
            .execute(pool)
            .await?;
    }
    Ok(())
}
