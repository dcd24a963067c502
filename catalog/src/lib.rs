//! SQLite catalog of service programs and their exported procedures.
//!
//! The catalog is the persistent side of the extraction engine: export
//! listings are synced into it, source members are run through
//! [`svp_dict_extract`] and the resulting descriptions are stored next to
//! each procedure.
//!
//! # Architecture
//!
//! - **`schema`**: SQL generation with customizable table prefixes
//! - **`migration`**: lifecycle operations (up/down/clear/status)
//! - **`convert`**: row ↔ [`svp_dict_core`] type conversion
//! - **`query`**: runtime access: listing, search, sync and description fills
//!
//! # Quick start
//!
//! ```no_run
//! use rusqlite::Connection;
//! use svp_dict_catalog::{CatalogQuery, Migration};
//!
//! let conn = Connection::open("data/svp_dict.sqlite").unwrap();
//! let mut migration = Migration::new(conn, "svp_").unwrap();
//! migration.up().unwrap();
//!
//! let conn = migration.into_connection();
//! let query = CatalogQuery::new(&conn, "svp_").unwrap();
//! for summary in query.list_service_programs().unwrap() {
//!     println!(
//!         "{} ({}/{} described)",
//!         summary.program.qualified_name(),
//!         summary.described_count,
//!         summary.procedure_count
//!     );
//! }
//! ```
//!
//! # Table prefix customization
//!
//! All table and index names carry a configurable prefix, so several
//! catalogs can live in one SQLite file. Prefixes must contain only ASCII
//! alphanumeric characters and underscores.

mod convert;
mod error;
mod migration;
mod query;
mod schema;

pub use error::{CatalogError, Result};
pub use migration::{Migration, MigrationStatus};
pub use query::{CatalogQuery, FillReport, ServiceProgramSummary, SyncReport};
pub use schema::{generate_drop_sql, generate_schema_sql};
