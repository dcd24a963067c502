use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use rusqlite::Connection;
use svp_dict_catalog::{CatalogQuery, FillReport, Migration, MigrationStatus};
use svp_dict_core::ProcedureRecord;
use svp_dict_extract::{ExpectedNames, ExtractionResult, Extractor, Strategy, parse_export_symbols};
use svp_dict_remote::{DictConfig, Remote, SshRunner};
use tracing::{debug, info, warn};

/// Output format for listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
enum CliOutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "svp-dict", version)]
#[command(about = "IBM i service program catalog: remote queries and procedure descriptions")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct GlobalArgs {
    /// Configuration file.
    #[arg(long, global = true, default_value = "svp-dict.yml")]
    config: PathBuf,
    /// SQLite catalog database (overrides catalog.db_path).
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Catalog table prefix (overrides catalog.prefix).
    #[arg(long, global = true)]
    prefix: Option<String>,
    /// Remote host (overrides host.host).
    #[arg(long, global = true)]
    host: Option<String>,
    /// Remote user profile (overrides host.user).
    #[arg(long, global = true)]
    user: Option<String>,
    /// SSH port (overrides host.port).
    #[arg(long, global = true)]
    port: Option<u16>,
    /// SSH private key (overrides host.key).
    #[arg(long, global = true)]
    key: Option<PathBuf>,
    /// Per-command timeout in milliseconds (overrides host.timeout_ms).
    #[arg(long, global = true)]
    timeout: Option<u64>,
    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run a shell command on the remote host.
    Exec(ExecArgs),
    /// Run an SQL statement through db2.
    Query(QueryArgs),
    /// List the columns of a table.
    DescribeTable(DescribeTableArgs),
    /// List the tables of a library.
    ListTables(ListTablesArgs),
    /// Search tables by name across all libraries.
    FindTable(FindTableArgs),
    /// List the members of a physical file.
    ListMembers(OutfileArgs),
    /// List logical files and programs depending on a physical file.
    Dependents(OutfileArgs),
    /// List the objects a program references.
    References(ReferencesArgs),
    /// List the exported symbols of a service program.
    Exports(ServiceProgramArgs),
    /// Print a source member.
    ReadSource(ReadSourceArgs),
    /// Local catalog of service programs and procedure descriptions.
    Dict(DictArgs),
    /// Extract descriptions from a local source file without a catalog.
    Extract(ExtractArgs),
}

#[derive(Debug, Args)]
struct ExecArgs {
    /// Shell command; remaining words are joined with spaces.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

#[derive(Debug, Args)]
struct QueryArgs {
    /// SQL statement.
    sql: String,
}

#[derive(Debug, Args)]
struct DescribeTableArgs {
    /// Library (schema).
    schema: String,
    /// Table name.
    table: String,
}

#[derive(Debug, Args)]
struct ListTablesArgs {
    /// Library (schema).
    schema: String,
    /// Maximum rows (1-5000, default 500).
    #[arg(long)]
    limit: Option<u32>,
}

#[derive(Debug, Args)]
struct FindTableArgs {
    /// Table name or LIKE pattern.
    pattern: String,
    /// Maximum rows (1-1000, default 100).
    #[arg(long)]
    limit: Option<u32>,
}

#[derive(Debug, Args)]
struct OutfileArgs {
    /// Library of the file.
    library: String,
    /// Physical file.
    file: String,
    /// Library for the temporary outfile (needs write authority).
    #[arg(long)]
    output_library: String,
}

#[derive(Debug, Args)]
struct ReferencesArgs {
    /// Library of the program.
    library: String,
    /// Program name.
    program: String,
    /// Library for the temporary outfile (needs write authority).
    #[arg(long)]
    output_library: String,
}

#[derive(Debug, Args)]
struct ServiceProgramArgs {
    /// Library of the service program.
    library: String,
    /// Service program name.
    srvpgm: String,
}

#[derive(Debug, Args)]
struct ReadSourceArgs {
    /// Library of the source file.
    library: String,
    /// Member name.
    member: String,
    /// Source physical file (overrides catalog.source_file).
    #[arg(long)]
    file: Option<String>,
}

#[derive(Debug, Args)]
struct DictArgs {
    #[command(subcommand)]
    operation: DictOperation,
}

#[derive(Debug, Subcommand)]
enum DictOperation {
    /// Create the catalog tables.
    Init,
    /// Delete every row, keeping the tables.
    Clear,
    /// Show table status and counts.
    Status(FormatArgs),
    /// List service programs, the procedures of one, or search procedures.
    List(DictListArgs),
    /// Store the exported procedures of a service program.
    Sync(DictSyncArgs),
    /// Fill descriptions from the comments in a source member.
    FillFromSource(FillFromSourceArgs),
    /// Fill descriptions from source for every cataloged service program.
    FillFromSourceAll(FillFromSourceAllArgs),
    /// Fill descriptions inferred from procedure names.
    FillNames(FillNamesArgs),
    /// Condense decorated or overly long descriptions.
    Shorten(OptionalServiceProgramArgs),
    /// Remove a service program and its procedures.
    Delete(ServiceProgramArgs),
    /// Set a procedure description by hand.
    Describe(DescribeArgs),
}

#[derive(Debug, Args)]
struct FormatArgs {
    /// Output format.
    #[arg(long, default_value = "table")]
    format: CliOutputFormat,
}

#[derive(Debug, Args)]
struct DictListArgs {
    /// Library of the service program.
    library: Option<String>,
    /// Service program name.
    #[arg(requires = "library")]
    srvpgm: Option<String>,
    /// Search procedures whose name or description contains this text.
    #[arg(long, conflicts_with_all = ["library", "srvpgm"])]
    pattern: Option<String>,
    /// Output format.
    #[arg(long, default_value = "table")]
    format: CliOutputFormat,
}

#[derive(Debug, Args)]
struct DictSyncArgs {
    /// Library of the service program.
    library: String,
    /// Service program name.
    srvpgm: String,
    /// Read the export listing from a file instead of the remote host.
    #[arg(long)]
    from_file: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct FillFromSourceArgs {
    /// Library of the service program and its source file.
    library: String,
    /// Service program name; also the source member name.
    srvpgm: String,
    /// Read the source from a local file.
    #[arg(long, conflicts_with = "stdin")]
    input: Option<PathBuf>,
    /// Read the source from standard input.
    #[arg(long)]
    stdin: bool,
    /// Source physical file (overrides catalog.source_file).
    #[arg(long)]
    source_file: Option<String>,
    /// Re-extract even if the source is unchanged, replacing existing descriptions.
    #[arg(long)]
    force: bool,
}

#[derive(Debug, Args)]
struct FillFromSourceAllArgs {
    /// Number of parallel source downloads.
    #[arg(long, default_value_t = 4)]
    jobs: usize,
    /// Source physical file (overrides catalog.source_file).
    #[arg(long)]
    source_file: Option<String>,
    /// Re-extract even if sources are unchanged.
    #[arg(long)]
    force: bool,
}

#[derive(Debug, Args)]
struct FillNamesArgs {
    #[command(flatten)]
    target: OptionalServiceProgramArgs,
    /// Replace existing descriptions too (manual ones are kept).
    #[arg(long)]
    force: bool,
}

#[derive(Debug, Args)]
struct OptionalServiceProgramArgs {
    /// Library of the service program (default: all).
    library: Option<String>,
    /// Service program name.
    #[arg(requires = "library")]
    srvpgm: Option<String>,
}

#[derive(Debug, Args)]
struct DescribeArgs {
    /// Library of the service program.
    library: String,
    /// Service program name.
    srvpgm: String,
    /// Procedure name.
    procedure: String,
    /// New description; empty clears it.
    description: String,
}

#[derive(Debug, Args)]
struct ExtractArgs {
    /// Source file to read.
    #[arg(long)]
    input: PathBuf,
    /// Comma-separated procedure names.
    #[arg(long, required_unless_present = "exports")]
    names: Option<String>,
    /// Export listing to take the procedure names from.
    #[arg(long, requires = "srvpgm", conflicts_with = "names")]
    exports: Option<PathBuf>,
    /// Service program whose symbols are read from --exports.
    #[arg(long)]
    srvpgm: Option<String>,
    /// Also infer descriptions from names for undocumented procedures.
    #[arg(long)]
    infer: bool,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = init_tracing(cli.global.quiet, cli.global.verbose) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }

    let result = load_config(&cli.global).and_then(|config| match cli.command {
        Command::Exec(args) => run_exec(&config, args),
        Command::Query(args) => print_remote(&config, |r| r.query(&args.sql)),
        Command::DescribeTable(args) => {
            print_remote(&config, |r| r.describe_table(&args.schema, &args.table))
        }
        Command::ListTables(args) => {
            print_remote(&config, |r| r.list_tables(&args.schema, args.limit))
        }
        Command::FindTable(args) => {
            print_remote(&config, |r| r.find_table(&args.pattern, args.limit))
        }
        Command::ListMembers(args) => print_remote(&config, |r| {
            r.list_file_members(&args.library, &args.file, &args.output_library)
        }),
        Command::Dependents(args) => print_remote(&config, |r| {
            r.table_dependents(&args.library, &args.file, &args.output_library)
        }),
        Command::References(args) => print_remote(&config, |r| {
            r.program_references(&args.library, &args.program, &args.output_library)
        }),
        Command::Exports(args) => {
            print_remote(&config, |r| r.list_exports(&args.library, &args.srvpgm))
        }
        Command::ReadSource(args) => {
            let file = args.file.unwrap_or_else(|| config.catalog.source_file.clone());
            print_remote(&config, |r| r.read_source_member(&args.library, &file, &args.member))
        }
        Command::Dict(args) => run_dict(&config, args),
        Command::Extract(args) => run_extract(args),
    });

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(quiet: bool, verbose: bool) -> Result<(), String> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("SVP_DICT_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| format!("failed to initialize tracing subscriber: {err}"))
}

/// Loads the configuration file (if present) and applies flag overrides.
fn load_config(global: &GlobalArgs) -> Result<DictConfig, String> {
    let mut config = DictConfig::load_or_default(&global.config)
        .map_err(|err| format!("Failed to load config '{}': {err}", global.config.display()))?;

    if let Some(db) = &global.db {
        config.catalog.db_path = db.clone();
    }
    if let Some(prefix) = &global.prefix {
        config.catalog.prefix = prefix.clone();
    }
    if let Some(host) = &global.host {
        config.host.host = Some(host.clone());
    }
    if let Some(user) = &global.user {
        config.host.user = Some(user.clone());
    }
    if let Some(port) = global.port {
        config.host.port = port;
    }
    if let Some(key) = &global.key {
        config.host.key = Some(key.clone());
    }
    if let Some(timeout) = global.timeout {
        config.host.timeout_ms = timeout;
    }
    debug!(config = %global.config.display(), db = %config.catalog.db_path.display(), "configuration loaded");
    Ok(config)
}

// ---------------------------------------------------------------------------
// remote commands
// ---------------------------------------------------------------------------

fn connect(config: &DictConfig) -> Result<Remote<SshRunner>, String> {
    let runner = SshRunner::from_config(&config.host).map_err(|err| err.to_string())?;
    Ok(Remote::new(runner))
}

fn print_remote<F>(config: &DictConfig, op: F) -> Result<(), String>
where
    F: FnOnce(&Remote<SshRunner>) -> svp_dict_remote::Result<String>,
{
    let remote = connect(config)?;
    let output = op(&remote).map_err(|err| err.to_string())?;
    print!("{output}");
    Ok(())
}

fn run_exec(config: &DictConfig, args: ExecArgs) -> Result<(), String> {
    let command = args.command.join(" ");
    print_remote(config, |r| r.exec(&command))
}

// ---------------------------------------------------------------------------
// dict command
// ---------------------------------------------------------------------------

fn run_dict(config: &DictConfig, args: DictArgs) -> Result<(), String> {
    match args.operation {
        DictOperation::Init => run_dict_init(config),
        DictOperation::Clear => run_dict_clear(config),
        DictOperation::Status(a) => run_dict_status(config, a),
        DictOperation::List(a) => run_dict_list(config, a),
        DictOperation::Sync(a) => run_dict_sync(config, a),
        DictOperation::FillFromSource(a) => run_dict_fill_from_source(config, a),
        DictOperation::FillFromSourceAll(a) => run_dict_fill_from_source_all(config, a),
        DictOperation::FillNames(a) => run_dict_fill_names(config, a),
        DictOperation::Shorten(a) => run_dict_shorten(config, a),
        DictOperation::Delete(a) => run_dict_delete(config, a),
        DictOperation::Describe(a) => run_dict_describe(config, a),
    }
}

/// Opens the catalog database, creating the file and tables as needed.
fn open_catalog(config: &DictConfig) -> Result<Connection, String> {
    let db_path = &config.catalog.db_path;
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| {
                format!("Failed to create database directory '{}': {err}", parent.display())
            })?;
        }
    }
    let conn = Connection::open(db_path)
        .map_err(|e| format!("Failed to open database '{}': {e}", db_path.display()))?;
    let mut migration = Migration::new(conn, &config.catalog.prefix)
        .map_err(|e| format!("Failed to initialize migration: {e}"))?;
    migration
        .up()
        .map_err(|e| format!("Migration up failed: {e}"))?;
    Ok(migration.into_connection())
}

fn catalog_query<'a>(config: &DictConfig, conn: &'a Connection) -> Result<CatalogQuery<'a>, String> {
    CatalogQuery::new(conn, &config.catalog.prefix).map_err(|err| err.to_string())
}

fn run_dict_init(config: &DictConfig) -> Result<(), String> {
    open_catalog(config)?;
    println!(
        "Catalog ready. Tables created with prefix '{}' in '{}'.",
        config.catalog.prefix,
        config.catalog.db_path.display()
    );
    Ok(())
}

fn run_dict_clear(config: &DictConfig) -> Result<(), String> {
    let conn = open_catalog(config)?;
    let mut migration = Migration::new(conn, &config.catalog.prefix)
        .map_err(|e| format!("Failed to initialize migration: {e}"))?;
    let removed = migration
        .clear()
        .map_err(|e| format!("Clear failed: {e}"))?;
    println!("Catalog cleared: {removed} service program(s) removed.");
    Ok(())
}

fn run_dict_status(config: &DictConfig, args: FormatArgs) -> Result<(), String> {
    let db_path = &config.catalog.db_path;
    let status = if db_path.exists() {
        let conn = Connection::open(db_path)
            .map_err(|e| format!("Failed to open database '{}': {e}", db_path.display()))?;
        let migration = Migration::new(conn, &config.catalog.prefix)
            .map_err(|e| format!("Failed to initialize migration: {e}"))?;
        migration
            .status()
            .map_err(|e| format!("Failed to get catalog status: {e}"))?
    } else {
        MigrationStatus::default()
    };

    match args.format {
        CliOutputFormat::Json => print_json(&status)?,
        CliOutputFormat::Table => {
            println!("Catalog Status:");
            println!(
                "  Tables exist: {}",
                if status.tables_exist { "yes" } else { "no" }
            );
            println!("  Service programs: {}", status.srvpgm_count);
            println!("  Procedures: {}", status.procedure_count);
            println!("  Described: {}", status.described_count);
        }
    }
    Ok(())
}

fn run_dict_list(config: &DictConfig, args: DictListArgs) -> Result<(), String> {
    let conn = open_catalog(config)?;
    let query = catalog_query(config, &conn)?;

    if let Some(pattern) = &args.pattern {
        let records = query.search(pattern).map_err(|err| err.to_string())?;
        return print_procedures(&records, args.format, true);
    }

    match (&args.library, &args.srvpgm) {
        (Some(library), Some(srvpgm)) => {
            let records = query
                .procedures(library, srvpgm)
                .map_err(|err| err.to_string())?;
            print_procedures(&records, args.format, false)
        }
        (Some(library), None) => {
            let programs: Vec<_> = query
                .list_service_programs()
                .map_err(|err| err.to_string())?
                .into_iter()
                .filter(|summary| summary.program.library.eq_ignore_ascii_case(library))
                .collect();
            print_service_programs(&programs, args.format)
        }
        _ => {
            let programs = query.list_service_programs().map_err(|err| err.to_string())?;
            print_service_programs(&programs, args.format)
        }
    }
}

fn run_dict_sync(config: &DictConfig, args: DictSyncArgs) -> Result<(), String> {
    let symbols = match &args.from_file {
        Some(path) => {
            let listing = read_text(path)?;
            parse_export_symbols(&listing, &args.srvpgm)
        }
        None => connect(config)?
            .export_symbols(&args.library, &args.srvpgm)
            .map_err(|err| err.to_string())?,
    };
    if symbols.is_empty() {
        warn!(library = %args.library, srvpgm = %args.srvpgm, "no exported procedures found");
    }

    let conn = open_catalog(config)?;
    let query = catalog_query(config, &conn)?;
    let report = query
        .sync_exports(&args.library, &args.srvpgm, &symbols)
        .map_err(|err| format!("Sync failed: {err}"))?;

    println!(
        "Synced {}/{}: {} procedure(s), {} added, {} removed.",
        args.library, args.srvpgm, report.total, report.added, report.removed
    );
    Ok(())
}

fn run_dict_fill_from_source(config: &DictConfig, args: FillFromSourceArgs) -> Result<(), String> {
    let source_file = args
        .source_file
        .clone()
        .unwrap_or_else(|| config.catalog.source_file.clone());
    let source = if args.stdin {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(|err| format!("Failed to read stdin: {err}"))?;
        text
    } else if let Some(path) = &args.input {
        read_text(path)?
    } else {
        connect(config)?
            .read_source_member(&args.library, &source_file, &args.srvpgm)
            .map_err(|err| err.to_string())?
    };

    let conn = open_catalog(config)?;
    let query = catalog_query(config, &conn)?;
    let report = query
        .fill_from_source(&args.library, &args.srvpgm, &source, args.force)
        .map_err(|err| err.to_string())?;

    println!(
        "{}/{}: {}",
        args.library,
        args.srvpgm,
        describe_fill(&report)
    );
    Ok(())
}

fn run_dict_fill_from_source_all(
    config: &DictConfig,
    args: FillFromSourceAllArgs,
) -> Result<(), String> {
    use rayon::prelude::*;

    let conn = open_catalog(config)?;
    let query = catalog_query(config, &conn)?;
    let programs = query.list_service_programs().map_err(|err| err.to_string())?;
    if programs.is_empty() {
        println!("No service programs in the catalog. Run `svp-dict dict sync` first.");
        return Ok(());
    }

    let remote = connect(config)?;
    let source_file = args
        .source_file
        .clone()
        .unwrap_or_else(|| config.catalog.source_file.clone());
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(args.jobs.max(1))
        .build()
        .map_err(|e| format!("Failed to create thread pool: {e}"))?;

    info!(count = programs.len(), jobs = args.jobs, "fetching sources");
    let fetched: Vec<_> = pool.install(|| {
        programs
            .par_iter()
            .map(|summary| {
                let program = &summary.program;
                let source = remote
                    .read_source_member(&program.library, &source_file, &program.name)
                    .map_err(|err| err.to_string());
                (program, source)
            })
            .collect()
    });

    let mut failures = 0usize;
    for (program, source) in fetched {
        let outcome = source.and_then(|text| {
            query
                .fill_from_source(&program.library, &program.name, &text, args.force)
                .map_err(|err| err.to_string())
        });
        match outcome {
            Ok(report) => println!("{}: {}", program.qualified_name(), describe_fill(&report)),
            Err(err) => {
                failures += 1;
                eprintln!("{}: ERROR {err}", program.qualified_name());
            }
        }
    }

    if failures > 0 {
        return Err(format!(
            "{failures} of {} service program(s) failed",
            programs.len()
        ));
    }
    Ok(())
}

fn run_dict_fill_names(config: &DictConfig, args: FillNamesArgs) -> Result<(), String> {
    let conn = open_catalog(config)?;
    let query = catalog_query(config, &conn)?;

    let targets: Vec<(String, String)> = match (args.target.library, args.target.srvpgm) {
        (Some(library), Some(srvpgm)) => vec![(library, srvpgm)],
        (library, _) => query
            .list_service_programs()
            .map_err(|err| err.to_string())?
            .into_iter()
            .map(|summary| summary.program)
            .filter(|program| {
                library
                    .as_deref()
                    .is_none_or(|lib| program.library.eq_ignore_ascii_case(lib))
            })
            .map(|program| (program.library, program.name))
            .collect(),
    };

    let mut total = 0usize;
    for (library, srvpgm) in &targets {
        let report = query
            .fill_from_names(library, srvpgm, args.force)
            .map_err(|err| err.to_string())?;
        if report.updated > 0 {
            println!("{library}/{srvpgm}: {} description(s)", report.updated);
        }
        total += report.updated;
    }
    println!("Filled {total} description(s) from procedure names.");
    Ok(())
}

fn run_dict_shorten(config: &DictConfig, args: OptionalServiceProgramArgs) -> Result<(), String> {
    let conn = open_catalog(config)?;
    let query = catalog_query(config, &conn)?;
    let filter = match (&args.library, &args.srvpgm) {
        (Some(library), Some(srvpgm)) => Some((library.as_str(), srvpgm.as_str())),
        (Some(_), None) => {
            return Err("shorten needs both a library and a service program, or neither".into());
        }
        _ => None,
    };
    let changed = query
        .shorten_descriptions(filter)
        .map_err(|err| err.to_string())?;
    println!("Shortened {changed} description(s).");
    Ok(())
}

fn run_dict_delete(config: &DictConfig, args: ServiceProgramArgs) -> Result<(), String> {
    let conn = open_catalog(config)?;
    let query = catalog_query(config, &conn)?;
    let deleted = query
        .delete_service_program(&args.library, &args.srvpgm)
        .map_err(|err| err.to_string())?;
    if !deleted {
        return Err(format!(
            "Service program {}/{} is not in the catalog",
            args.library, args.srvpgm
        ));
    }
    println!("Deleted {}/{}.", args.library, args.srvpgm);
    Ok(())
}

fn run_dict_describe(config: &DictConfig, args: DescribeArgs) -> Result<(), String> {
    let conn = open_catalog(config)?;
    let query = catalog_query(config, &conn)?;
    let updated = query
        .set_description(&args.library, &args.srvpgm, &args.procedure, &args.description)
        .map_err(|err| err.to_string())?;
    if !updated {
        return Err(format!(
            "Procedure {} of {}/{} is not in the catalog",
            args.procedure, args.library, args.srvpgm
        ));
    }
    println!("Updated {}.", args.procedure);
    Ok(())
}

// ---------------------------------------------------------------------------
// extract command
// ---------------------------------------------------------------------------

fn run_extract(args: ExtractArgs) -> Result<(), String> {
    let source = read_text(&args.input)?;
    let expected = match (&args.exports, &args.srvpgm) {
        (Some(path), Some(srvpgm)) => {
            let listing = read_text(path)?;
            parse_export_symbols(&listing, srvpgm).into_iter().collect()
        }
        _ => ExpectedNames::new(parse_csv_list(args.names)),
    };
    if expected.is_empty() {
        return Err("No procedure names to look for".to_string());
    }

    let extractor = if args.infer {
        Extractor::with_strategies(&expected, Strategy::ALL)
    } else {
        Extractor::new(&expected)
    };
    let result = extractor.extract(&source);

    match args.format {
        CliOutputFormat::Json => print_json(&result)?,
        CliOutputFormat::Table => print_extraction(&expected, &result),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_text(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|err| format!("Failed to read '{}': {err}", path.display()))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    let raw = serde_json::to_string_pretty(value)
        .map_err(|e| format!("JSON serialization failed: {e}"))?;
    println!("{raw}");
    Ok(())
}

fn print_service_programs(
    programs: &[svp_dict_catalog::ServiceProgramSummary],
    format: CliOutputFormat,
) -> Result<(), String> {
    if format == CliOutputFormat::Json {
        return print_json(&programs);
    }
    if programs.is_empty() {
        println!("(empty; run `svp-dict dict sync` first)");
    }
    for summary in programs {
        let program = &summary.program;
        println!(
            "{}\t{}\t{}/{}\t{}",
            program.library,
            program.name,
            summary.described_count,
            summary.procedure_count,
            program.updated_at.as_deref().unwrap_or("")
        );
    }
    println!("Total: {}", programs.len());
    Ok(())
}

fn print_procedures(
    records: &[ProcedureRecord],
    format: CliOutputFormat,
    qualified: bool,
) -> Result<(), String> {
    if format == CliOutputFormat::Json {
        return print_json(&records);
    }
    if records.is_empty() {
        println!("(none)");
    }
    for record in records {
        let description = record.description.as_deref().unwrap_or("");
        if qualified {
            println!(
                "{}\t{}\t{}\t{description}",
                record.library, record.srvpgm_name, record.procedure_name
            );
        } else {
            println!("{}\t{description}", record.procedure_name);
        }
    }
    println!("Total: {}", records.len());
    Ok(())
}

fn print_extraction(expected: &ExpectedNames, result: &ExtractionResult) {
    for name in expected.iter() {
        match result.get(name) {
            Some(found) => {
                let line = found.line.map(|l| l.to_string()).unwrap_or_else(|| "-".into());
                println!(
                    "{name}\t{}\t{line}\t{}",
                    found.strategy.source(),
                    found.text
                );
            }
            None => println!("{name}\t-\t-\t"),
        }
    }
    println!("Described: {}/{}", result.len(), expected.len());
}

fn describe_fill(report: &FillReport) -> String {
    if report.source_unchanged {
        "source unchanged, skipped (use --force to re-extract)".to_string()
    } else {
        format!(
            "{} description(s) updated, {} kept",
            report.updated, report.skipped
        )
    }
}

fn parse_csv_list(raw: Option<String>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(ToOwned::to_owned)
            .collect()
    })
    .unwrap_or_default()
}
