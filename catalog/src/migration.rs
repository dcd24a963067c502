//! Migration lifecycle operations for the catalog tables.
//!
//! [`Migration`] creates, drops and clears the catalog tables and reports
//! their status. All mutation operations run in a transaction.
//!
//! # Example
//!
//! ```
//! use rusqlite::Connection;
//! use svp_dict_catalog::Migration;
//!
//! let conn = Connection::open_in_memory().unwrap();
//! let mut migration = Migration::new(conn, "svp_").unwrap();
//!
//! migration.up().unwrap();
//! let status = migration.status().unwrap();
//! assert!(status.tables_exist);
//! assert_eq!(status.srvpgm_count, 0);
//! ```

use rusqlite::Connection;
use serde::Serialize;
use tracing::info;

use crate::error::{CatalogError, Result};
use crate::schema::{generate_drop_sql, generate_schema_sql, validate_prefix};

/// Manages the lifecycle of the catalog tables.
pub struct Migration {
    conn: Connection,
    prefix: String,
}

impl Migration {
    /// Creates a migration manager for the given connection and table prefix.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidPrefix`] if the prefix contains invalid characters.
    pub fn new(conn: Connection, prefix: impl Into<String>) -> Result<Self> {
        let prefix = prefix.into();
        validate_prefix(&prefix)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn, prefix })
    }

    /// Creates all catalog tables and indexes.
    ///
    /// Uses `CREATE TABLE IF NOT EXISTS` so it is safe to call multiple times.
    pub fn up(&mut self) -> Result<()> {
        let sql = generate_schema_sql(&self.prefix)?;
        let tx = self.conn.transaction()?;
        tx.execute_batch(&sql)
            .map_err(|e| CatalogError::MigrationError(format!("failed to create tables: {e}")))?;
        tx.commit()?;
        info!(prefix = %self.prefix, "catalog tables ready");
        Ok(())
    }

    /// Drops all catalog tables.
    pub fn down(&mut self) -> Result<()> {
        let sql = generate_drop_sql(&self.prefix)?;
        let tx = self.conn.transaction()?;
        tx.execute_batch(&sql)
            .map_err(|e| CatalogError::MigrationError(format!("failed to drop tables: {e}")))?;
        tx.commit()?;
        info!(prefix = %self.prefix, "catalog tables dropped");
        Ok(())
    }

    /// Deletes every row while keeping the tables.
    ///
    /// Returns the number of service programs removed. Does nothing when the
    /// tables do not exist yet.
    pub fn clear(&mut self) -> Result<usize> {
        if !self.tables_exist()? {
            return Ok(0);
        }
        let tx = self.conn.transaction()?;
        tx.execute(&format!("DELETE FROM {}srvpgm_method", self.prefix), [])?;
        let removed = tx.execute(&format!("DELETE FROM {}srvpgm", self.prefix), [])?;
        tx.commit()?;
        info!(removed, "catalog cleared");
        Ok(removed)
    }

    /// Returns whether the tables exist and how many rows they hold.
    pub fn status(&self) -> Result<MigrationStatus> {
        if !self.tables_exist()? {
            return Ok(MigrationStatus::default());
        }

        let srvpgm_count = self.count(&format!("SELECT COUNT(*) FROM {}srvpgm", self.prefix))?;
        let procedure_count =
            self.count(&format!("SELECT COUNT(*) FROM {}srvpgm_method", self.prefix))?;
        let described_count = self.count(&format!(
            "SELECT COUNT(*) FROM {}srvpgm_method \
             WHERE description IS NOT NULL AND TRIM(description) <> ''",
            self.prefix
        ))?;

        Ok(MigrationStatus {
            tables_exist: true,
            srvpgm_count,
            procedure_count,
            described_count,
        })
    }

    /// Returns a reference to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Consumes the migration and returns the underlying connection.
    pub fn into_connection(self) -> Connection {
        self.conn
    }

    fn tables_exist(&self) -> Result<bool> {
        let table_name = format!("{}srvpgm_method", self.prefix);
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
            [&table_name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn count(&self, sql: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

/// Snapshot of the catalog returned by [`Migration::status`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationStatus {
    /// Whether the catalog tables exist in the database.
    pub tables_exist: bool,
    /// Number of service programs.
    pub srvpgm_count: usize,
    /// Number of exported procedures.
    pub procedure_count: usize,
    /// Number of procedures with a non-blank description.
    pub described_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn migration() -> Migration {
        Migration::new(Connection::open_in_memory().unwrap(), "svp_").unwrap()
    }

    #[test]
    fn test_migration_new_validates_prefix() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(Migration::new(conn, "").is_err());

        let conn = Connection::open_in_memory().unwrap();
        assert!(matches!(
            Migration::new(conn, "drop;--"),
            Err(CatalogError::InvalidPrefix(_))
        ));
    }

    #[test]
    fn test_status_on_empty_database() {
        let status = migration().status().unwrap();
        assert_eq!(status, MigrationStatus::default());
    }

    #[test]
    fn test_up_is_idempotent() {
        let mut migration = migration();
        migration.up().unwrap();
        migration.up().unwrap();
        assert!(migration.status().unwrap().tables_exist);
    }

    #[test]
    fn test_down_removes_tables() {
        let mut migration = migration();
        migration.up().unwrap();
        migration.down().unwrap();
        assert!(!migration.status().unwrap().tables_exist);
        migration.down().unwrap();
    }

    #[test]
    fn test_clear_keeps_tables() {
        let mut migration = migration();
        assert_eq!(migration.clear().unwrap(), 0);
        migration.up().unwrap();
        let conn = migration.connection();
        conn.execute("INSERT INTO svp_srvpgm (library, name) VALUES ('LIB', 'SVP')", [])
            .unwrap();
        conn.execute(
            "INSERT INTO svp_srvpgm_method (library, srvpgm_name, method_name, description) \
             VALUES ('LIB', 'SVP', 'SVP_A', 'Obtiene a')",
            [],
        )
        .unwrap();

        let status = migration.status().unwrap();
        assert_eq!(status.srvpgm_count, 1);
        assert_eq!(status.procedure_count, 1);
        assert_eq!(status.described_count, 1);

        assert_eq!(migration.clear().unwrap(), 1);
        let status = migration.status().unwrap();
        assert!(status.tables_exist);
        assert_eq!(status.procedure_count, 0);
    }

    #[test]
    fn test_prefixes_are_isolated() {
        let conn = Connection::open_in_memory().unwrap();
        let mut prod = Migration::new(conn, "prod_").unwrap();
        prod.up().unwrap();
        let conn = prod.into_connection();
        let test = Migration::new(conn, "test_").unwrap();
        assert!(!test.status().unwrap().tables_exist);
    }
}
