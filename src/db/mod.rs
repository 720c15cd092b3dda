mod models;
pub mod sponsors;

pub use models::*;

use anyhow::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

pub type DbPool = SqlitePool;

const CREATE_SPONSORS: &str = r#"
CREATE TABLE IF NOT EXISTS sponsors (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    contact_name TEXT NOT NULL,
    email TEXT NOT NULL,
    contact_number TEXT NOT NULL,
    tier_id TEXT NOT NULL,
    tier_name TEXT NOT NULL,
    tier_price INTEGER NOT NULL,
    email_separately INTEGER NOT NULL DEFAULT 0,
    socials_image_name TEXT,
    print_image_name TEXT,
    created_at TEXT NOT NULL
)
"#;

const CREATE_ADMIN_USERS: &str = r#"
CREATE TABLE IF NOT EXISTS admin_users (
    id TEXT PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    created_at TEXT NOT NULL
)
"#;

/// Columns added after the initial schema shipped. Applied idempotently so
/// existing databases pick them up on startup.
const SPONSOR_COLUMN_ADDITIONS: [(&str, &str); 6] = [
    ("socials_image_url", "TEXT"),
    ("print_image_url", "TEXT"),
    ("sponsorship_start_date", "TEXT"),
    ("renewal_date", "TEXT"),
    ("custom_amount_note", "TEXT"),
    ("inactive", "INTEGER NOT NULL DEFAULT 0"),
];

pub async fn init(data_dir: &Path) -> Result<DbPool> {
    let db_path = data_dir.join("sponsorlink.db");
    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    info!("Initializing database at {}", db_path.display());

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await?;

    // Enable WAL mode for better concurrency
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&pool)
        .await?;

    ensure_schema(&pool).await?;

    info!("Database initialized successfully");
    Ok(pool)
}

/// Create tables if absent and apply additive column migrations.
pub async fn ensure_schema(pool: &DbPool) -> Result<()> {
    sqlx::query(CREATE_SPONSORS).execute(pool).await?;
    sqlx::query(CREATE_ADMIN_USERS).execute(pool).await?;

    for (column, ddl) in SPONSOR_COLUMN_ADDITIONS {
        let present: Option<(String,)> = sqlx::query_as(
            "SELECT name FROM pragma_table_info('sponsors') WHERE name = ?",
        )
        .bind(column)
        .fetch_optional(pool)
        .await?;
        if present.is_none() {
            info!("Adding sponsors.{} column", column);
            sqlx::query(&format!("ALTER TABLE sponsors ADD COLUMN {} {}", column, ddl))
                .execute(pool)
                .await?;
        }
    }

    Ok(())
}

#[cfg(test)]
pub async fn test_pool() -> DbPool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    ensure_schema(&pool).await.expect("schema");
    pool
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ensure_schema_is_idempotent() {
        let pool = test_pool().await;
        // Second run must be a no-op, not an error
        ensure_schema(&pool).await.unwrap();

        let columns: Vec<(String,)> =
            sqlx::query_as("SELECT name FROM pragma_table_info('sponsors')")
                .fetch_all(&pool)
                .await
                .unwrap();
        let names: Vec<&str> = columns.iter().map(|(n,)| n.as_str()).collect();
        for (column, _) in SPONSOR_COLUMN_ADDITIONS {
            assert!(names.contains(&column), "missing column {}", column);
        }
    }
}
