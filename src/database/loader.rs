//! Chunked bulk INSERT execution.

use tracing::{debug, info};

use crate::errors::LoadError;
use crate::models::SqlValue;

use super::escape;
use super::SqlStore;

/// Issues escaped multi-row INSERT statements against the store.
///
/// Rows are split into chunks; each chunk becomes exactly one statement, so
/// every row is delivered to exactly one statement.
pub struct BulkLoader<'a> {
    store: &'a dyn SqlStore,
    chunk_size: usize,
}

impl<'a> BulkLoader<'a> {
    pub fn new(store: &'a dyn SqlStore, chunk_size: usize) -> Self {
        Self {
            store,
            chunk_size: chunk_size.max(1),
        }
    }

    /// Inserts `rows` into `table`, returning how many rows were submitted.
    ///
    /// The first failed statement aborts this table's load; chunks already
    /// executed stay committed.
    pub async fn load(
        &self,
        table: &str,
        columns: &[&str],
        rows: Vec<Vec<SqlValue>>,
    ) -> Result<u64, LoadError> {
        if rows.is_empty() {
            debug!("no rows for {}, skipping load", table);
            return Ok(0);
        }

        let total = rows.len();
        let mut loaded = 0u64;
        for chunk in rows.chunks(self.chunk_size) {
            let statement = insert_statement(table, columns, chunk);
            let affected = self
                .store
                .execute(&statement)
                .await
                .map_err(|e| LoadError::new(table, chunk.len(), e.to_string()))?;
            debug!(
                "inserted chunk of {} rows into {} ({} affected)",
                chunk.len(),
                table,
                affected
            );
            loaded += chunk.len() as u64;
        }

        info!("loaded {} rows into {}", total, table);
        Ok(loaded)
    }
}

/// Renders one multi-row INSERT statement with escaped literals.
fn insert_statement(table: &str, columns: &[&str], rows: &[Vec<SqlValue>]) -> String {
    let mut statement = format!("INSERT INTO {} ({}) VALUES ", table, columns.join(", "));
    for (row_index, row) in rows.iter().enumerate() {
        if row_index > 0 {
            statement.push_str(", ");
        }
        statement.push('(');
        for (cell_index, cell) in row.iter().enumerate() {
            if cell_index > 0 {
                statement.push_str(", ");
            }
            statement.push_str(&escape::literal(cell));
        }
        statement.push(')');
    }
    statement.push(';');
    statement
}
