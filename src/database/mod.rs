//! MySQL access for the harvest
//!
//! [`SqlStore`] is the statement-execution seam the loader and schema steps
//! depend on; [`Database`] is the sqlx-backed production implementation. Every
//! statement runs on its own pooled connection, acquired for exactly that
//! statement and released on drop.

pub mod escape;
pub mod loader;
pub mod schema;

use anyhow::Result;
use async_trait::async_trait;
use sqlx::mysql::MySqlPoolOptions;
use sqlx::{MySql, Pool};

use crate::config::DatabaseConfig;

/// Statement execution surface of the destination store.
#[async_trait]
pub trait SqlStore: Send + Sync {
    /// Executes one SQL statement, returning the number of affected rows.
    async fn execute(&self, statement: &str) -> Result<u64>;

    /// Releases every held connection and shuts the pool down.
    async fn close(&self);
}

/// Connection pool wrapper for the destination MySQL database.
#[derive(Clone)]
pub struct Database {
    pool: Pool<MySql>,
}

impl Database {
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections.unwrap_or(5))
            .connect(&config.connection_url())
            .await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl SqlStore for Database {
    async fn execute(&self, statement: &str) -> Result<u64> {
        // Scoped acquisition: the connection lives for this statement only.
        let mut conn = self.pool.acquire().await?;
        let result = sqlx::query(statement).execute(&mut *conn).await?;
        drop(conn);

        Ok(result.rows_affected())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
