use std::path::Path;
use std::str::FromStr;

use report_core::AnalysisError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

/// Database connection for the report store.
#[derive(Clone)]
pub struct ReportDb {
    pool: SqlitePool,
}

impl ReportDb {
    /// Open (and create if missing) the database and initialize the schema.
    pub async fn new(database_url: &str) -> Result<Self, AnalysisError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AnalysisError::DatabaseError(e.to_string()))?
            .create_if_missing(true);

        // A single connection keeps in-memory databases coherent and is
        // plenty for a nightly batch writer.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| AnalysisError::DatabaseError(e.to_string()))?;

        let db = Self { pool };
        db.init_schema().await?;

        Ok(db)
    }

    /// Initialize database schema.
    async fn init_schema(&self) -> Result<(), AnalysisError> {
        let schema = include_str!("../schema.sql");

        // Execute statement by statement since sqlx does not run multiple
        // statements per query.
        for statement in schema.split(';') {
            let stmt = statement.trim();
            if !stmt.is_empty() {
                sqlx::query(stmt)
                    .execute(&self.pool)
                    .await
                    .map_err(|e| AnalysisError::DatabaseError(e.to_string()))?;
            }
        }

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Check if the database file exists.
    pub fn exists(path: &str) -> bool {
        let file_path = path.strip_prefix("sqlite:").unwrap_or(path);
        Path::new(file_path).exists()
    }
}
