//! High-level remote operations.

use std::collections::BTreeSet;

use svp_dict_core::{ObjectKind, validate_object_name};
use svp_dict_extract::parse_export_symbols;
use tracing::debug;

use crate::commands::{self, OutfileQuery};
use crate::error::{RemoteError, Result};
use crate::runner::CommandRunner;

/// IBM i operations over a [`CommandRunner`].
///
/// # Examples
///
/// ```no_run
/// use svp_dict_remote::{DictConfig, Remote, SshRunner};
///
/// let config = DictConfig::load("svp-dict.yml").unwrap();
/// let remote = Remote::new(SshRunner::from_config(&config.host).unwrap());
/// let symbols = remote.export_symbols("AXA.PGMR", "SPVSPO").unwrap();
/// println!("{} exported procedures", symbols.len());
/// ```
#[derive(Debug, Clone)]
pub struct Remote<R> {
    runner: R,
}

impl<R: CommandRunner> Remote<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Runs a shell command as-is.
    pub fn exec(&self, command: &str) -> Result<String> {
        let command = command.trim();
        if command.is_empty() {
            return Err(RemoteError::EmptyInput("command"));
        }
        self.runner.run(command)
    }

    /// Runs an SQL statement through `db2` and returns its text output.
    pub fn query(&self, sql: &str) -> Result<String> {
        self.runner.run(&commands::db2_command(sql)?)
    }

    /// Column list of a table from `QSYS2.SYSCOLUMNS`.
    pub fn describe_table(&self, schema: &str, table: &str) -> Result<String> {
        self.query(&commands::describe_table_sql(schema, table))
    }

    pub fn list_tables(&self, schema: &str, limit: Option<u32>) -> Result<String> {
        self.query(&commands::list_tables_sql(schema, limit))
    }

    pub fn find_table(&self, pattern: &str, limit: Option<u32>) -> Result<String> {
        if pattern.trim().is_empty() {
            return Err(RemoteError::EmptyInput("pattern"));
        }
        self.query(&commands::find_table_sql(pattern.trim(), limit))
    }

    /// Members of a physical file. Needs write authority on `output_library`.
    pub fn list_file_members(
        &self,
        library: &str,
        file: &str,
        output_library: &str,
    ) -> Result<String> {
        self.outfile(commands::file_members(library, file, output_library)?)
    }

    /// Logical files and programs depending on a physical file.
    pub fn table_dependents(&self, library: &str, file: &str, output_library: &str) -> Result<String> {
        self.outfile(commands::database_relations(library, file, output_library)?)
    }

    /// Objects referenced by a program.
    pub fn program_references(
        &self,
        library: &str,
        program: &str,
        output_library: &str,
    ) -> Result<String> {
        self.outfile(commands::program_references(library, program, output_library)?)
    }

    /// Exported symbols of a service program with their usage columns.
    pub fn list_exports(&self, library: &str, srvpgm: &str) -> Result<String> {
        self.query(&commands::list_exports_sql(library, srvpgm))
    }

    /// Exported procedure names of a service program, uppercased and sorted.
    pub fn export_symbols(&self, library: &str, srvpgm: &str) -> Result<BTreeSet<String>> {
        validate_object_name(ObjectKind::Library, library)?;
        validate_object_name(ObjectKind::Object, srvpgm)?;
        let listing = self.query(&commands::export_symbols_sql(library, srvpgm))?;
        let symbols = parse_export_symbols(&listing, srvpgm);
        debug!(library, srvpgm, count = symbols.len(), "parsed export symbols");
        Ok(symbols)
    }

    /// Text of a source member.
    pub fn read_source_member(&self, library: &str, file: &str, member: &str) -> Result<String> {
        self.runner
            .run(&commands::read_source_command(library, file, member)?)
    }

    fn outfile(&self, query: OutfileQuery) -> Result<String> {
        self.runner.run(&query.command)?;
        self.query(&query.sql)
    }
}
