//! Conversion between catalog types and SQLite rows.

use chrono::Utc;
use rusqlite::Row;
use sha2::{Digest, Sha256};
use svp_dict_core::{DescriptionSource, ProcedureRecord, ServiceProgram};

use crate::error::{CatalogError, Result};

/// Columns selected by [`service_program_from_row`], in order.
pub(crate) const SRVPGM_COLUMNS: &str = "library, name, source_file, notes, source_checksum, updated_at";

/// Columns selected by [`procedure_from_row`], in order.
pub(crate) const METHOD_COLUMNS: &str =
    "library, srvpgm_name, method_name, description, description_source, updated_at";

/// Current UTC time in the format SQLite's `datetime('now')` produces.
pub(crate) fn now_timestamp() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Hex-encoded SHA-256 of a source text.
pub(crate) fn source_checksum(text: &str) -> String {
    format!("{:x}", Sha256::digest(text.as_bytes()))
}

pub(crate) fn source_to_string(source: DescriptionSource) -> &'static str {
    source.as_str()
}

pub(crate) fn string_to_source(s: &str) -> Result<DescriptionSource> {
    s.parse()
        .map_err(|err| CatalogError::ConversionError(format!("{err}")))
}

pub(crate) fn service_program_from_row(row: &Row<'_>) -> rusqlite::Result<ServiceProgram> {
    Ok(ServiceProgram {
        library: row.get(0)?,
        name: row.get(1)?,
        source_file: row.get(2)?,
        notes: row.get(3)?,
        source_checksum: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

/// Raw procedure row; the description source is parsed afterwards so a bad
/// value surfaces as [`CatalogError::ConversionError`].
pub(crate) struct MethodRow {
    record: ProcedureRecord,
    source: Option<String>,
}

pub(crate) fn procedure_from_row(row: &Row<'_>) -> rusqlite::Result<MethodRow> {
    Ok(MethodRow {
        record: ProcedureRecord {
            library: row.get(0)?,
            srvpgm_name: row.get(1)?,
            procedure_name: row.get(2)?,
            description: row.get(3)?,
            description_source: None,
            updated_at: row.get(5)?,
        },
        source: row.get(4)?,
    })
}

impl MethodRow {
    pub(crate) fn into_record(self) -> Result<ProcedureRecord> {
        let mut record = self.record;
        record.description_source = self.source.as_deref().map(string_to_source).transpose()?;
        Ok(record)
    }
}
