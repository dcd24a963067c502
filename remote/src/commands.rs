//! IBM i command and SQL builders.
//!
//! Every remote operation ends up as a single shell command run through
//! `qsh`: SQL goes through `db2`, CL commands through `system`. Object names
//! are validated before they are interpolated into CL; values placed in SQL
//! string literals are escaped by doubling `'`.

use svp_dict_core::{ObjectKind, validate_object_name};

use crate::error::{RemoteError, Result};

/// Default and maximum row counts for [`list_tables_sql`].
pub const LIST_TABLES_DEFAULT_LIMIT: u32 = 500;
pub const LIST_TABLES_MAX_LIMIT: u32 = 5000;

/// Default and maximum row counts for [`find_table_sql`].
pub const FIND_TABLE_DEFAULT_LIMIT: u32 = 100;
pub const FIND_TABLE_MAX_LIMIT: u32 = 1000;

/// Escapes a value for use inside an SQL string literal.
pub fn sql_literal(value: &str) -> String {
    value.replace('\'', "''")
}

/// Escapes text placed inside a single-quoted shell argument.
pub fn shell_single_quoted(value: &str) -> String {
    value.replace('\'', r"'\''")
}

/// Wraps an SQL statement as `qsh -c "db2 \"…\""`.
///
/// # Examples
///
/// ```
/// use svp_dict_remote::commands::db2_command;
///
/// assert_eq!(
///     db2_command("SELECT * FROM QSYS2.SYSTABLES").unwrap(),
///     r#"qsh -c "db2 \"SELECT * FROM QSYS2.SYSTABLES\"""#
/// );
/// ```
pub fn db2_command(sql: &str) -> Result<String> {
    let statement = sql.trim();
    if statement.is_empty() {
        return Err(RemoteError::EmptyInput("SQL"));
    }
    let escaped = statement.replace('\\', r"\\").replace('"', r#"\""#);
    Ok(format!(r#"qsh -c "db2 \"{escaped}\"""#))
}

/// Wraps a CL command as `qsh -c 'system "…"'`.
pub fn system_command(cl: &str) -> String {
    format!(r#"qsh -c 'system "{}"'"#, shell_single_quoted(cl))
}

/// Clamps an optional row limit to `1..=max`, using `default` when unset.
pub fn clamp_limit(limit: Option<u32>, default: u32, max: u32) -> u32 {
    limit.unwrap_or(default).clamp(1, max)
}

pub fn describe_table_sql(schema: &str, table: &str) -> String {
    format!(
        "SELECT COLUMN_NAME, ORDINAL_POSITION, DATA_TYPE, LENGTH, NUMERIC_SCALE \
         FROM QSYS2.SYSCOLUMNS WHERE TABLE_SCHEMA = '{}' AND TABLE_NAME = '{}' \
         ORDER BY ORDINAL_POSITION",
        sql_literal(schema),
        sql_literal(table)
    )
}

pub fn list_tables_sql(schema: &str, limit: Option<u32>) -> String {
    let limit = clamp_limit(limit, LIST_TABLES_DEFAULT_LIMIT, LIST_TABLES_MAX_LIMIT);
    format!(
        "SELECT TABLE_SCHEMA, TABLE_NAME FROM QSYS2.SYSTABLES WHERE TABLE_SCHEMA = '{}' \
         ORDER BY TABLE_NAME FETCH FIRST {limit} ROWS ONLY",
        sql_literal(schema)
    )
}

/// Searches tables by name across all libraries.
///
/// A pattern without `%` is wrapped as `%pattern%`.
pub fn find_table_sql(pattern: &str, limit: Option<u32>) -> String {
    let limit = clamp_limit(limit, FIND_TABLE_DEFAULT_LIMIT, FIND_TABLE_MAX_LIMIT);
    let like = if pattern.contains('%') {
        pattern.to_string()
    } else {
        format!("%{pattern}%")
    };
    format!(
        "SELECT TABLE_SCHEMA, TABLE_NAME FROM QSYS2.SYSTABLES WHERE TABLE_NAME LIKE '{}' \
         ORDER BY TABLE_SCHEMA, TABLE_NAME FETCH FIRST {limit} ROWS ONLY",
        sql_literal(&like)
    )
}

/// Exported symbols of a service program with their usage columns.
pub fn list_exports_sql(library: &str, srvpgm: &str) -> String {
    format!(
        "SELECT PROGRAM_LIBRARY, PROGRAM_NAME, OBJECT_TYPE, TRIM(CHAR(SYMBOL_NAME)) AS SYMBOL_NAME, \
         TRIM(CHAR(SYMBOL_USAGE)) AS SYMBOL_USAGE FROM QSYS2.PROGRAM_EXPORT_IMPORT_INFO \
         WHERE PROGRAM_LIBRARY = '{}' AND PROGRAM_NAME = '{}' ORDER BY SYMBOL_NAME",
        sql_literal(library),
        sql_literal(srvpgm)
    )
}

/// Symbol names only, as fed to catalog syncs.
pub fn export_symbols_sql(library: &str, srvpgm: &str) -> String {
    // CHAR() avoids CCSID 1200/65535 conversion errors on the text columns.
    format!(
        "SELECT TRIM(CHAR(SYMBOL_NAME)) AS SYMBOL_NAME FROM QSYS2.PROGRAM_EXPORT_IMPORT_INFO \
         WHERE PROGRAM_LIBRARY = '{}' AND PROGRAM_NAME = '{}' ORDER BY SYMBOL_NAME",
        sql_literal(library),
        sql_literal(srvpgm)
    )
}

/// A CL command that writes to an outfile, and the query that reads it back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutfileQuery {
    pub command: String,
    pub sql: String,
}

/// `DSPFD TYPE(*MBRLIST)` into `<output_library>/MBRLIST`.
pub fn file_members(library: &str, file: &str, output_library: &str) -> Result<OutfileQuery> {
    validate_object_name(ObjectKind::Library, library)?;
    validate_object_name(ObjectKind::File, file)?;
    validate_object_name(ObjectKind::Library, output_library)?;
    let cl = format!(
        "DSPFD FILE({library}/{file}) TYPE(*MBRLIST) OUTPUT(*OUTFILE) \
         OUTFILE({output_library}/MBRLIST)"
    );
    Ok(OutfileQuery {
        command: system_command(&cl),
        sql: format!("SELECT MBMEMBER FROM {output_library}.MBRLIST ORDER BY MBMEMBER"),
    })
}

/// `DSPDBR` into `<output_library>/TMPDBR`.
pub fn database_relations(library: &str, file: &str, output_library: &str) -> Result<OutfileQuery> {
    validate_object_name(ObjectKind::Library, library)?;
    validate_object_name(ObjectKind::File, file)?;
    validate_object_name(ObjectKind::Library, output_library)?;
    let cl = format!(
        "DSPDBR FILE({library}/{file}) OUTPUT(*OUTFILE) OUTFILE({output_library}/TMPDBR)"
    );
    Ok(OutfileQuery {
        command: system_command(&cl),
        sql: format!("SELECT * FROM {output_library}.TMPDBR"),
    })
}

/// `DSPPGMREF` into `<output_library>/TMPPGR`.
pub fn program_references(
    library: &str,
    program: &str,
    output_library: &str,
) -> Result<OutfileQuery> {
    validate_object_name(ObjectKind::Library, library)?;
    validate_object_name(ObjectKind::Object, program)?;
    validate_object_name(ObjectKind::Library, output_library)?;
    let cl = format!(
        "DSPPGMREF PGM({library}/{program}) OUTPUT(*OUTFILE) OUTFILE({output_library}/TMPPGR)"
    );
    Ok(OutfileQuery {
        command: system_command(&cl),
        sql: format!("SELECT * FROM {output_library}.TMPPGR"),
    })
}

/// Stream file a source member is copied to before it is read.
///
/// Unique per library, file and member.
pub fn source_stream_file(library: &str, file: &str, member: &str) -> String {
    format!("/tmp/srcread_{library}_{file}_{member}.txt")
}

/// Copies a source member to the IFS with `CPYTOSTMF` and prints it.
///
/// # Examples
///
/// ```
/// use svp_dict_remote::commands::read_source_command;
///
/// let cmd = read_source_command("AXA.PGMR", "QFUENTES", "SPVSPO").unwrap();
/// assert!(cmd.starts_with("qsh -c 'system \"CPYTOSTMF FROMMBR('\\''/QSYS.LIB/AXA.PGMR.LIB/"));
/// assert!(cmd.ends_with("&& cat \"/tmp/srcread_AXA.PGMR_QFUENTES_SPVSPO.txt\"'"));
/// ```
pub fn read_source_command(library: &str, file: &str, member: &str) -> Result<String> {
    validate_object_name(ObjectKind::Library, library)?;
    validate_object_name(ObjectKind::File, file)?;
    validate_object_name(ObjectKind::Member, member)?;
    let stmf = source_stream_file(library, file, member);
    let from_member = format!("/QSYS.LIB/{library}.LIB/{file}.FILE/{member}.MBR");
    let cl = format!("CPYTOSTMF FROMMBR('{from_member}') TOSTMF('{stmf}') STMFOPT(*REPLACE)");
    Ok(format!(
        r#"qsh -c 'system "{}" && cat "{stmf}"'"#,
        shell_single_quoted(&cl)
    ))
}
