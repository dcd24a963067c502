//! Core types shared by the service-program catalog crates.
//!
//! This crate defines the data model exchanged between the extraction
//! engine, the SQLite catalog and the remote collaborator:
//!
//! - [`ServiceProgram`]: one cataloged service program (library + name).
//! - [`ProcedureRecord`]: one exported procedure and its description.
//! - [`DescriptionSource`]: which strategy produced a description.
//!
//! Validation ([`validate_object_name`]) rejects IBM i object names that are
//! empty, too long, or contain characters that would break out of the CL and
//! SQL strings they get interpolated into.
//!
//! # Example
//!
//! ```
//! use svp_dict_core::*;
//!
//! let mut record = ProcedureRecord::new("AXA.PGMR", "SPVSPO", "SPVSPO_GETCABECERA");
//! assert!(!record.is_described());
//!
//! record.set_description("Obtiene cabecera", DescriptionSource::NameInference);
//! assert_eq!(record.description.as_deref(), Some("Obtiene cabecera"));
//! assert!(validate_object_name(ObjectKind::Library, &record.library).is_ok());
//! ```

mod types;
mod validate;

pub use types::*;
pub use validate::{ObjectKind, ValidationError, validate_object_name};
