//! Remote access to an IBM i host for the service program catalog.
//!
//! Commands run over the system `ssh` client. SQL is executed with `db2`
//! inside `qsh`, CL commands with `system`, and source members are read by
//! copying them to the IFS first.
//!
//! # Quick start
//!
//! ```no_run
//! use svp_dict_remote::{DictConfig, Remote, SshRunner};
//!
//! let config = DictConfig::load_or_default("svp-dict.yml").unwrap();
//! let remote = Remote::new(SshRunner::from_config(&config.host).unwrap());
//!
//! let source = remote
//!     .read_source_member("AXA.PGMR", &config.catalog.source_file, "SPVSPO")
//!     .unwrap();
//! println!("{source}");
//! ```

mod client;
pub mod commands;
mod config;
mod error;
mod runner;

pub use client::Remote;
pub use config::{
    CatalogConfig, DEFAULT_DB_PATH, DEFAULT_PORT, DEFAULT_PREFIX, DEFAULT_TIMEOUT_MS, DictConfig,
    HostConfig,
};
pub use error::{RemoteError, Result};
pub use runner::{CommandRunner, ProcessRunner, SshRunner};
