//! SQL schema generation with customizable table prefixes.
//!
//! # Table structure
//!
//! - `{prefix}srvpgm`: one row per service program, keyed by
//!   `(library, name)`.
//! - `{prefix}srvpgm_method`: one row per exported procedure, keyed by
//!   `(library, srvpgm_name, method_name)`; deleting a service program
//!   cascades to its procedures.
//!
//! Prefixes must contain only alphanumeric characters and underscores, so
//! several catalogs (e.g. `prod_`, `test_`) can share one database file.

use crate::error::{CatalogError, Result};

/// Validates that a table prefix contains only alphanumeric characters and underscores.
pub(crate) fn validate_prefix(prefix: &str) -> Result<()> {
    if prefix.is_empty() {
        return Err(CatalogError::InvalidPrefix(prefix.to_string()));
    }
    if !prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(CatalogError::InvalidPrefix(prefix.to_string()));
    }
    Ok(())
}

/// Generates the `CREATE` statements for all catalog tables and indexes.
///
/// # Errors
///
/// Returns [`CatalogError::InvalidPrefix`] if the prefix is empty or contains
/// characters other than alphanumerics and underscores.
pub fn generate_schema_sql(prefix: &str) -> Result<String> {
    validate_prefix(prefix)?;

    let sql = format!(
        r#"
CREATE TABLE IF NOT EXISTS {prefix}srvpgm (
    library TEXT NOT NULL,
    name TEXT NOT NULL,
    source_file TEXT NOT NULL DEFAULT 'QFUENTES',
    notes TEXT,
    source_checksum TEXT,
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (library, name)
);

CREATE TABLE IF NOT EXISTS {prefix}srvpgm_method (
    library TEXT NOT NULL,
    srvpgm_name TEXT NOT NULL,
    method_name TEXT NOT NULL,
    description TEXT,
    description_source TEXT CHECK (
        description_source IS NULL
        OR description_source IN ('inline_label', 'block_header', 'name_inference', 'manual')
    ),
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (library, srvpgm_name, method_name),
    FOREIGN KEY (library, srvpgm_name) REFERENCES {prefix}srvpgm(library, name) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_{prefix}srvpgm_method_srvpgm ON {prefix}srvpgm_method(library, srvpgm_name);
CREATE INDEX IF NOT EXISTS idx_{prefix}srvpgm_method_name ON {prefix}srvpgm_method(method_name);
"#
    );

    Ok(sql)
}

/// Generates SQL to drop the catalog tables, procedures first.
///
/// # Errors
///
/// Returns [`CatalogError::InvalidPrefix`] if the prefix is invalid.
pub fn generate_drop_sql(prefix: &str) -> Result<String> {
    validate_prefix(prefix)?;

    Ok(format!(
        r#"
DROP TABLE IF EXISTS {prefix}srvpgm_method;
DROP TABLE IF EXISTS {prefix}srvpgm;
"#
    ))
}
