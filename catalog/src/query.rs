//! Runtime catalog access.
//!
//! [`CatalogQuery`] reads and writes service programs and their exported
//! procedures. Every mutation runs in a single transaction, and deleting a
//! service program cascades to its procedures.
//!
//! Descriptions written by hand ([`DescriptionSource::Manual`]) are never
//! replaced by an automatic strategy.
//!
//! # Example
//!
//! ```
//! use rusqlite::Connection;
//! use svp_dict_catalog::{CatalogQuery, Migration};
//!
//! let mut migration = Migration::new(Connection::open_in_memory().unwrap(), "svp_").unwrap();
//! migration.up().unwrap();
//! let conn = migration.into_connection();
//!
//! let query = CatalogQuery::new(&conn, "svp_").unwrap();
//! query.sync_exports("AXA.PGMR", "SPVSPO", ["SPVSPO_GETCABECERA"]).unwrap();
//!
//! let source = "// SPVSPO_getCabecera : Obtiene la cabecera\n";
//! let report = query.fill_from_source("AXA.PGMR", "SPVSPO", source, false).unwrap();
//! assert_eq!(report.updated, 1);
//!
//! let found = query.search("cabecera").unwrap();
//! assert_eq!(found[0].description.as_deref(), Some("Obtiene la cabecera"));
//! ```

use std::collections::{BTreeSet, HashSet};

use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use svp_dict_core::{
    DescriptionSource, MAX_DESCRIPTION_CHARS, ObjectKind, ProcedureRecord, ServiceProgram,
    validate_object_name,
};
use svp_dict_extract::{ExpectedNames, ExtractionResult, Extractor, infer, normalize};
use tracing::{debug, info};

use crate::convert::{
    METHOD_COLUMNS, MethodRow, SRVPGM_COLUMNS, now_timestamp, procedure_from_row,
    service_program_from_row, source_checksum, source_to_string,
};
use crate::error::{CatalogError, Result};
use crate::schema::validate_prefix;

const MANUAL: &str = "manual";

/// Query interface for reading and writing the catalog.
pub struct CatalogQuery<'a> {
    conn: &'a Connection,
    prefix: String,
}

/// A service program together with its procedure counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceProgramSummary {
    #[serde(flatten)]
    pub program: ServiceProgram,
    pub procedure_count: usize,
    pub described_count: usize,
}

/// Outcome of [`CatalogQuery::sync_exports`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Procedures exported after the sync.
    pub total: usize,
    /// Procedures that were not cataloged before.
    pub added: usize,
    /// Cataloged procedures that are no longer exported.
    pub removed: usize,
}

/// Outcome of a description fill.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FillReport {
    /// Procedures or candidates considered.
    pub examined: usize,
    /// Descriptions written.
    pub updated: usize,
    /// Candidates left alone: manual descriptions, or already described
    /// procedures when not forced.
    pub skipped: usize,
    /// The source text matched the one last extracted from, so nothing ran.
    pub source_unchanged: bool,
}

impl<'a> CatalogQuery<'a> {
    /// Creates a query interface for the given connection and table prefix.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidPrefix`] if the prefix is invalid.
    pub fn new(conn: &'a Connection, prefix: impl Into<String>) -> Result<Self> {
        let prefix = prefix.into();
        validate_prefix(&prefix)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn, prefix })
    }

    /// Lists every service program ordered by library and name.
    pub fn list_service_programs(&self) -> Result<Vec<ServiceProgramSummary>> {
        let p = &self.prefix;
        let mut stmt = self.conn.prepare(&format!(
            "SELECT s.library, s.name, s.source_file, s.notes, s.source_checksum, s.updated_at, \
                    COUNT(m.method_name), \
                    COUNT(CASE WHEN m.description IS NOT NULL AND TRIM(m.description) <> '' THEN 1 END) \
             FROM {p}srvpgm s \
             LEFT JOIN {p}srvpgm_method m ON m.library = s.library AND m.srvpgm_name = s.name \
             GROUP BY s.library, s.name \
             ORDER BY s.library, s.name"
        ))?;

        let rows = stmt
            .query_map([], |row| {
                let procedure_count: i64 = row.get(6)?;
                let described_count: i64 = row.get(7)?;
                Ok(ServiceProgramSummary {
                    program: service_program_from_row(row)?,
                    procedure_count: procedure_count as usize,
                    described_count: described_count as usize,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Loads one service program.
    pub fn service_program(&self, library: &str, name: &str) -> Result<Option<ServiceProgram>> {
        let program = self
            .conn
            .query_row(
                &format!(
                    "SELECT {SRVPGM_COLUMNS} FROM {}srvpgm WHERE library = ?1 AND name = ?2",
                    self.prefix
                ),
                params![library, name],
                service_program_from_row,
            )
            .optional()?;
        Ok(program)
    }

    /// Lists the procedures of one service program ordered by name.
    pub fn procedures(&self, library: &str, srvpgm: &str) -> Result<Vec<ProcedureRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {METHOD_COLUMNS} FROM {}srvpgm_method \
             WHERE library = ?1 AND srvpgm_name = ?2 ORDER BY method_name",
            self.prefix
        ))?;
        let rows = stmt
            .query_map(params![library, srvpgm], procedure_from_row)?
            .collect::<std::result::Result<Vec<MethodRow>, _>>()?;
        rows.into_iter().map(MethodRow::into_record).collect()
    }

    /// Finds procedures whose name or description contains `pattern`.
    ///
    /// The pattern is matched with `LIKE`, so `%` and `_` keep their SQL
    /// meaning and the match is case-insensitive for ASCII.
    pub fn search(&self, pattern: &str) -> Result<Vec<ProcedureRecord>> {
        let like = format!("%{}%", pattern.trim());
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {METHOD_COLUMNS} FROM {}srvpgm_method \
             WHERE method_name LIKE ?1 OR description LIKE ?1 \
             ORDER BY library, srvpgm_name, method_name",
            self.prefix
        ))?;
        let rows = stmt
            .query_map(params![like], procedure_from_row)?
            .collect::<std::result::Result<Vec<MethodRow>, _>>()?;
        rows.into_iter().map(MethodRow::into_record).collect()
    }

    /// Returns the cataloged procedure names of one service program.
    pub fn procedure_names(&self, library: &str, srvpgm: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT method_name FROM {}srvpgm_method \
             WHERE library = ?1 AND srvpgm_name = ?2 ORDER BY method_name",
            self.prefix
        ))?;
        let names = stmt
            .query_map(params![library, srvpgm], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(names)
    }

    /// Replaces the procedure list of a service program with `symbols`.
    ///
    /// The service program is created if needed and its timestamp touched.
    /// Procedures that are still exported keep their descriptions; those no
    /// longer exported are deleted. Adding procedures clears the stored
    /// source checksum so the next source fill runs again.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidName`] if the library or service
    /// program name is not a valid object name.
    pub fn sync_exports<I, S>(&self, library: &str, srvpgm: &str, symbols: I) -> Result<SyncReport>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        validate_object_name(ObjectKind::Library, library)?;
        validate_object_name(ObjectKind::Object, srvpgm)?;

        let wanted: BTreeSet<String> = symbols
            .into_iter()
            .map(|s| s.as_ref().trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let p = &self.prefix;
        let now = now_timestamp();

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            &format!(
                "INSERT INTO {p}srvpgm (library, name, updated_at) VALUES (?1, ?2, ?3) \
                 ON CONFLICT(library, name) DO UPDATE SET updated_at = excluded.updated_at"
            ),
            params![library, srvpgm, now],
        )?;

        let existing: HashSet<String> = {
            let mut stmt = tx.prepare(&format!(
                "SELECT method_name FROM {p}srvpgm_method WHERE library = ?1 AND srvpgm_name = ?2"
            ))?;
            let names = stmt
                .query_map(params![library, srvpgm], |row| row.get::<_, String>(0))?
                .collect::<std::result::Result<_, _>>()?;
            names
        };

        let mut report = SyncReport {
            total: wanted.len(),
            ..SyncReport::default()
        };

        {
            let mut insert = tx.prepare(&format!(
                "INSERT INTO {p}srvpgm_method (library, srvpgm_name, method_name, updated_at) \
                 VALUES (?1, ?2, ?3, ?4) \
                 ON CONFLICT(library, srvpgm_name, method_name) DO NOTHING"
            ))?;
            for name in &wanted {
                report.added += insert.execute(params![library, srvpgm, name, now])?;
            }

            let mut delete = tx.prepare(&format!(
                "DELETE FROM {p}srvpgm_method \
                 WHERE library = ?1 AND srvpgm_name = ?2 AND method_name = ?3"
            ))?;
            for name in existing.iter().filter(|name| !wanted.contains(*name)) {
                report.removed += delete.execute(params![library, srvpgm, name])?;
            }
        }

        if report.added > 0 {
            tx.execute(
                &format!("UPDATE {p}srvpgm SET source_checksum = NULL WHERE library = ?1 AND name = ?2"),
                params![library, srvpgm],
            )?;
        }
        tx.commit()?;

        info!(
            library,
            srvpgm,
            total = report.total,
            added = report.added,
            removed = report.removed,
            "synced exports"
        );
        Ok(report)
    }

    /// Writes the descriptions of an extraction result.
    ///
    /// Only procedures already in the catalog are touched; manual
    /// descriptions are kept.
    pub fn apply_descriptions(
        &self,
        library: &str,
        srvpgm: &str,
        result: &ExtractionResult,
    ) -> Result<FillReport> {
        let tx = self.conn.unchecked_transaction()?;
        let report = self.apply_in(&tx, library, srvpgm, result)?;
        tx.commit()?;
        Ok(report)
    }

    /// Sets a description by hand, marking it [`DescriptionSource::Manual`].
    ///
    /// The text is normalized first. Returns `false` if the procedure is not
    /// cataloged.
    pub fn set_description(
        &self,
        library: &str,
        srvpgm: &str,
        procedure: &str,
        description: &str,
    ) -> Result<bool> {
        let text = normalize(description.trim());
        let (text, source) = if text.is_empty() {
            (None, None)
        } else {
            (Some(text), Some(source_to_string(DescriptionSource::Manual)))
        };
        let changed = self.conn.execute(
            &format!(
                "UPDATE {}srvpgm_method \
                 SET description = ?1, description_source = ?2, updated_at = ?3 \
                 WHERE library = ?4 AND srvpgm_name = ?5 AND method_name = ?6",
                self.prefix
            ),
            params![text, source, now_timestamp(), library, srvpgm, procedure],
        )?;
        Ok(changed > 0)
    }

    /// Fills descriptions from procedure names alone.
    ///
    /// Without `force` only undescribed procedures are filled; with it every
    /// non-manual description is replaced.
    pub fn fill_from_names(&self, library: &str, srvpgm: &str, force: bool) -> Result<FillReport> {
        let records = self.procedures(library, srvpgm)?;
        let source = source_to_string(DescriptionSource::NameInference);
        let mut report = FillReport::default();

        let tx = self.conn.unchecked_transaction()?;
        {
            let mut update = tx.prepare(&format!(
                "UPDATE {}srvpgm_method \
                 SET description = ?1, description_source = ?2, updated_at = ?3 \
                 WHERE library = ?4 AND srvpgm_name = ?5 AND method_name = ?6",
                self.prefix
            ))?;
            let now = now_timestamp();
            for record in &records {
                report.examined += 1;
                let manual = record.description_source == Some(DescriptionSource::Manual);
                if manual || (!force && record.is_described()) {
                    report.skipped += 1;
                    continue;
                }
                let Some(text) = infer(&record.procedure_name) else {
                    continue;
                };
                report.updated += update.execute(params![
                    text,
                    source,
                    now,
                    library,
                    srvpgm,
                    record.procedure_name
                ])?;
            }
        }
        tx.commit()?;

        info!(library, srvpgm, updated = report.updated, "filled descriptions from names");
        Ok(report)
    }

    /// Extracts descriptions from a source member and stores them.
    ///
    /// The SHA-256 of `source_text` is kept on the service program; when it
    /// matches the previous run nothing happens unless `force` is set.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::ServiceProgramNotFound`] if the service
    /// program has not been synced.
    pub fn fill_from_source(
        &self,
        library: &str,
        srvpgm: &str,
        source_text: &str,
        force: bool,
    ) -> Result<FillReport> {
        let program = self.service_program(library, srvpgm)?.ok_or_else(|| {
            CatalogError::ServiceProgramNotFound {
                library: library.to_string(),
                name: srvpgm.to_string(),
            }
        })?;

        let checksum = source_checksum(source_text);
        if !force && program.source_checksum.as_deref() == Some(checksum.as_str()) {
            debug!(library, srvpgm, "source unchanged since last extraction");
            return Ok(FillReport {
                source_unchanged: true,
                ..FillReport::default()
            });
        }

        let expected = ExpectedNames::new(self.procedure_names(library, srvpgm)?);
        if expected.is_empty() {
            return Ok(FillReport::default());
        }
        let result = Extractor::new(&expected).extract(source_text);

        let tx = self.conn.unchecked_transaction()?;
        let report = self.apply_in(&tx, library, srvpgm, &result)?;
        tx.execute(
            &format!(
                "UPDATE {}srvpgm SET source_checksum = ?1 WHERE library = ?2 AND name = ?3",
                self.prefix
            ),
            params![checksum, library, srvpgm],
        )?;
        tx.commit()?;

        info!(
            library,
            srvpgm,
            procedures = expected.len(),
            extracted = result.len(),
            updated = report.updated,
            "filled descriptions from source"
        );
        Ok(report)
    }

    /// Re-normalizes stored descriptions that are decorated or too long.
    ///
    /// `filter` restricts the pass to one `(library, srvpgm)`. Returns the
    /// number of descriptions changed.
    pub fn shorten_descriptions(&self, filter: Option<(&str, &str)>) -> Result<usize> {
        let p = &self.prefix;
        let decorated = format!(
            "(LTRIM(description) LIKE '-%' OR LTRIM(description) LIKE '//%' \
             OR LENGTH(description) > {MAX_DESCRIPTION_CHARS})"
        );
        let candidates: Vec<(String, String, String, String)> = {
            let (sql, args) = match filter {
                Some((library, srvpgm)) => (
                    format!(
                        "SELECT library, srvpgm_name, method_name, description FROM {p}srvpgm_method \
                         WHERE library = ?1 AND srvpgm_name = ?2 AND {decorated}"
                    ),
                    vec![library.to_string(), srvpgm.to_string()],
                ),
                None => (
                    format!(
                        "SELECT library, srvpgm_name, method_name, description FROM {p}srvpgm_method \
                         WHERE {decorated}"
                    ),
                    Vec::new(),
                ),
            };
            let mut stmt = self.conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params_from_iter(args), |row| {
                    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
                })?
                .collect::<std::result::Result<_, _>>()?;
            rows
        };

        let tx = self.conn.unchecked_transaction()?;
        let mut changed = 0;
        {
            let mut update = tx.prepare(&format!(
                "UPDATE {p}srvpgm_method \
                 SET description = ?1, description_source = CASE WHEN ?1 IS NULL THEN NULL ELSE description_source END, \
                     updated_at = ?2 \
                 WHERE library = ?3 AND srvpgm_name = ?4 AND method_name = ?5"
            ))?;
            let now = now_timestamp();
            for (library, srvpgm, method, description) in &candidates {
                let shortened = normalize(description);
                if shortened == *description {
                    continue;
                }
                let text = (!shortened.is_empty()).then_some(shortened);
                changed += update.execute(params![text, now, library, srvpgm, method])?;
            }
        }
        tx.commit()?;

        info!(changed, "shortened descriptions");
        Ok(changed)
    }

    /// Deletes a service program and, by cascade, its procedures.
    ///
    /// Returns `false` if it was not cataloged.
    pub fn delete_service_program(&self, library: &str, srvpgm: &str) -> Result<bool> {
        let tx = self.conn.unchecked_transaction()?;
        let deleted = tx.execute(
            &format!("DELETE FROM {}srvpgm WHERE library = ?1 AND name = ?2", self.prefix),
            params![library, srvpgm],
        )?;
        tx.commit()?;
        Ok(deleted > 0)
    }

    fn apply_in(
        &self,
        conn: &Connection,
        library: &str,
        srvpgm: &str,
        result: &ExtractionResult,
    ) -> Result<FillReport> {
        let mut update = conn.prepare(&format!(
            "UPDATE {}srvpgm_method \
             SET description = ?1, description_source = ?2, updated_at = ?3 \
             WHERE library = ?4 AND srvpgm_name = ?5 AND method_name = ?6 \
               AND (description_source IS NULL OR description_source <> '{MANUAL}')",
            self.prefix
        ))?;
        let now = now_timestamp();
        let mut report = FillReport::default();
        for (name, description) in result.iter() {
            report.examined += 1;
            let source = source_to_string(description.strategy.source());
            let written = update.execute(params![
                description.text,
                source,
                now,
                library,
                srvpgm,
                name
            ])?;
            if written == 0 {
                report.skipped += 1;
            }
            report.updated += written;
        }
        Ok(report)
    }
}
