use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Everything that can go wrong at the storage layer.
///
/// Constraint violations and unknown table/column errors all arrive
/// through the `rusqlite::Error` conversion; `UnexpectedType` covers a
/// stored value that doesn't decode into the column's expected shape.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("query failed: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("unexpected value in column '{0}'")]
    UnexpectedType(&'static str),
}

/// Storage engine over a single SQLite connection.
///
/// SQLite was chosen because:
/// - Zero-config embedded database
/// - Battle-tested and reliable
/// - Doesn't require a separate process
///
/// The engine owns its connection for the whole lifetime of the value;
/// dropping the `Database` closes the connection. Every statement runs
/// in autocommit mode, so each write is committed before the call
/// returns. Values are always bound parameters; only table and column
/// identifiers (trusted configuration, never user input) are spliced
/// into query text.
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    /// In-memory database, discarded on drop. Used by tests.
    pub fn open_in_memory() -> crate::Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Creates `table` with the given `(name, type)` column definitions.
    /// Safe to call on every startup - no-op if the table exists.
    pub fn create_table(&self, table: &str, columns: &[(&str, &str)]) -> crate::Result<()> {
        let defs: Vec<String> = columns
            .iter()
            .map(|(name, data_type)| format!("{} {}", name, data_type))
            .collect();
        let statement = format!("CREATE TABLE IF NOT EXISTS {} ({})", table, defs.join(", "));
        debug!(%statement, "create table");
        self.conn.execute(&statement, [])?;
        Ok(())
    }

    /// Inserts one row; the column list comes from the record's keys.
    /// The row id is assigned by SQLite's autoincrement, not returned here.
    pub fn insert(&self, table: &str, record: &[(&str, Value)]) -> crate::Result<()> {
        let columns: Vec<&str> = record.iter().map(|(name, _)| *name).collect();
        let placeholders: Vec<String> = (1..=record.len()).map(|n| format!("?{}", n)).collect();
        let statement = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            columns.join(", "),
            placeholders.join(", ")
        );
        debug!(%statement, "insert");
        self.conn.execute(
            &statement,
            params_from_iter(record.iter().map(|(_, value)| value)),
        )?;
        Ok(())
    }

    /// Selects rows matching every equality predicate in `criteria`
    /// (AND-joined; empty criteria selects everything). Rows come back
    /// as positional values in the table's column order; without
    /// `order_by` they arrive in storage order.
    pub fn select(
        &self,
        table: &str,
        criteria: &[(&str, Value)],
        order_by: Option<&str>,
    ) -> crate::Result<Vec<Vec<Value>>> {
        let mut statement = format!("SELECT * FROM {}", table);
        if !criteria.is_empty() {
            statement.push_str(" WHERE ");
            statement.push_str(&where_clause(criteria, 1));
        }
        if let Some(column) = order_by {
            statement.push_str(" ORDER BY ");
            statement.push_str(column);
        }
        debug!(%statement, "select");

        let mut prepared = self.conn.prepare(&statement)?;
        let column_count = prepared.column_count();
        let mut rows = prepared.query(params_from_iter(criteria.iter().map(|(_, v)| v)))?;

        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(column_count);
            for index in 0..column_count {
                values.push(row.get::<_, Value>(index)?);
            }
            result.push(values);
        }
        Ok(result)
    }

    /// Sets the listed columns on every row matching the criteria.
    /// Returns the number of rows touched.
    pub fn update(
        &self,
        table: &str,
        criteria: &[(&str, Value)],
        data: &[(&str, Value)],
    ) -> crate::Result<usize> {
        let assignments: Vec<String> = data
            .iter()
            .enumerate()
            .map(|(index, (name, _))| format!("{} = ?{}", name, index + 1))
            .collect();
        let statement = format!(
            "UPDATE {} SET {} WHERE {}",
            table,
            assignments.join(", "),
            where_clause(criteria, data.len() + 1)
        );
        debug!(%statement, "update");

        let values = data.iter().chain(criteria.iter()).map(|(_, value)| value);
        let affected = self.conn.execute(&statement, params_from_iter(values))?;
        Ok(affected)
    }

    /// Removes every row matching the criteria. Returns the number of
    /// rows removed; 0 is a legal no-op.
    pub fn delete(&self, table: &str, criteria: &[(&str, Value)]) -> crate::Result<usize> {
        let statement = format!("DELETE FROM {} WHERE {}", table, where_clause(criteria, 1));
        debug!(%statement, "delete");
        let affected = self
            .conn
            .execute(&statement, params_from_iter(criteria.iter().map(|(_, v)| v)))?;
        Ok(affected)
    }
}

/// `col1 = ?n AND col2 = ?n+1 ...` with placeholders starting at `first`.
fn where_clause(criteria: &[(&str, Value)], first: usize) -> String {
    criteria
        .iter()
        .enumerate()
        .map(|(index, (name, _))| format!("{} = ?{}", name, first + index))
        .collect::<Vec<_>>()
        .join(" AND ")
}
