//! Database initialization, migrations, and demo seed.

use sqlx::sqlite::{SqliteConnection, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use tracing::info;

/// Initialize the SQLite database with schema and pragmas.
pub async fn init_db(db_path: &str) -> Result<SqlitePool, sqlx::Error> {
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).ok();
        }
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .after_connect(|conn, _meta| Box::pin(async move { configure_pragmas_conn(conn).await }))
        .connect(&format!("sqlite:{}?mode=rwc", db_path))
        .await?;

    run_migrations(&pool).await?;

    info!("Database initialized successfully at {}", db_path);
    Ok(pool)
}

/// Apply the bundled demo seed: two users, a handful of equities, the ARS
/// currency instrument (id 66), and one trading day of market data.
pub async fn apply_seed(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    info!("Applying demo seed data...");
    let seed_sql = include_str!("seed.sql");
    run_statements(pool, seed_sql).await?;
    info!("Demo seed applied");
    Ok(())
}

/// Run all database migrations.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    info!("Running database migrations...");
    let schema_sql = include_str!("schema.sql");
    run_statements(pool, schema_sql).await?;
    info!("Migrations completed successfully");
    Ok(())
}

async fn run_statements(pool: &SqlitePool, sql: &str) -> Result<(), sqlx::Error> {
    for statement in sql.split(';') {
        let trimmed = statement.trim();
        if !trimmed.is_empty() {
            sqlx::query(trimmed).execute(pool).await?;
        }
    }
    Ok(())
}

/// Configure SQLite pragmas for reliability under concurrent requests.
async fn configure_pragmas_conn(conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    use sqlx::Row;

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&mut *conn)
        .await?;

    // journal_mode returns the actual mode set; must use fetch to get result
    let row = sqlx::query("PRAGMA journal_mode = WAL")
        .fetch_one(&mut *conn)
        .await?;
    let journal_mode: String = row.get(0);
    info!("SQLite journal_mode set to: {}", journal_mode);

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&mut *conn)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&mut *conn)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn init_temp_db() -> (SqlitePool, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir
            .path()
            .join("test.db")
            .to_string_lossy()
            .to_string();
        let pool = init_db(&db_path).await.expect("init_db failed");
        (pool, temp_dir)
    }

    #[tokio::test]
    async fn test_migrations_create_tables() {
        let (pool, _temp) = init_temp_db().await;

        let result: (String,) =
            sqlx::query_as("SELECT name FROM sqlite_master WHERE type='table' AND name='orders'")
                .fetch_one(&pool)
                .await
                .expect("query failed");
        assert_eq!(result.0, "orders");
    }

    #[tokio::test]
    async fn test_migrations_idempotent() {
        let (pool, _temp) = init_temp_db().await;

        run_migrations(&pool)
            .await
            .expect("second migration run failed");

        let result: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM sqlite_master WHERE type='table'")
                .fetch_one(&pool)
                .await
                .expect("query failed");
        assert!(result.0 > 0);
    }

    #[tokio::test]
    async fn test_seed_idempotent() {
        let (pool, _temp) = init_temp_db().await;

        apply_seed(&pool).await.expect("first seed failed");
        apply_seed(&pool).await.expect("second seed failed");

        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM instruments")
            .fetch_one(&pool)
            .await
            .expect("query failed");
        assert_eq!(result.0, 6);

        let result: (String,) =
            sqlx::query_as("SELECT category FROM instruments WHERE id = 66")
                .fetch_one(&pool)
                .await
                .expect("query failed");
        assert_eq!(result.0, "MONEDA");
    }

    #[tokio::test]
    async fn test_pragmas_configured() {
        let (pool, _temp) = init_temp_db().await;

        let result: (i64,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(&pool)
            .await
            .expect("query failed");
        assert_eq!(result.0, 1);
    }
}
