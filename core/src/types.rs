//! Catalog type definitions.
//!
//! These types mirror the rows of the catalog store and are designed for
//! serialization with [`serde`], so the CLI can print them as JSON and the
//! SQLite backend can round-trip them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Maximum length, in characters, of a stored procedure description.
pub const MAX_DESCRIPTION_CHARS: usize = 280;

/// Source file that holds service-program source members when none is given.
pub const DEFAULT_SOURCE_FILE: &str = "QFUENTES";

/// Strategy that produced a procedure description.
///
/// Ordered by precedence: an earlier variant always wins over a later one
/// when both produce a description for the same procedure.
///
/// # Examples
///
/// ```
/// use svp_dict_core::DescriptionSource;
///
/// let source: DescriptionSource = "block_header".parse().unwrap();
/// assert_eq!(source, DescriptionSource::BlockHeader);
/// assert_eq!(source.as_str(), "block_header");
/// assert!(DescriptionSource::InlineLabel < DescriptionSource::BlockHeader);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DescriptionSource {
    /// `NAME : description` annotation inside a comment.
    InlineLabel,
    /// Comment block directly above the procedure declaration.
    BlockHeader,
    /// Synthesized from the procedure's naming convention.
    NameInference,
    /// Written by hand into the catalog.
    Manual,
}

impl DescriptionSource {
    /// Returns the identifier stored in the catalog for this source.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InlineLabel => "inline_label",
            Self::BlockHeader => "block_header",
            Self::NameInference => "name_inference",
            Self::Manual => "manual",
        }
    }
}

impl fmt::Display for DescriptionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown [`DescriptionSource`] identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown description source: {0}")]
pub struct UnknownDescriptionSource(pub String);

impl FromStr for DescriptionSource {
    type Err = UnknownDescriptionSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inline_label" => Ok(Self::InlineLabel),
            "block_header" => Ok(Self::BlockHeader),
            "name_inference" => Ok(Self::NameInference),
            "manual" => Ok(Self::Manual),
            other => Err(UnknownDescriptionSource(other.to_string())),
        }
    }
}

/// A cataloged service program.
///
/// Identified by `(library, name)`. The source member holding its code is
/// assumed to be named like the service program and to live in
/// `source_file` within the same library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceProgram {
    /// Library containing the service program (e.g. `AXA.PGMR`).
    pub library: String,
    /// Service program object name (e.g. `SPVSPO`).
    pub name: String,
    /// Source physical file holding the member (default `QFUENTES`).
    pub source_file: String,
    /// Free-form operator notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// SHA-256 of the last source text descriptions were extracted from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_checksum: Option<String>,
    /// Timestamp of the last export sync.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl ServiceProgram {
    /// Creates a service program entry with the default source file.
    pub fn new(library: &str, name: &str) -> Self {
        Self {
            library: library.to_string(),
            name: name.to_string(),
            source_file: DEFAULT_SOURCE_FILE.to_string(),
            notes: None,
            source_checksum: None,
            updated_at: None,
        }
    }

    /// Returns `LIBRARY/NAME`, the qualified form used in CL commands.
    ///
    /// # Examples
    ///
    /// ```
    /// use svp_dict_core::ServiceProgram;
    ///
    /// let svp = ServiceProgram::new("AXA.PGMR", "SPVSPO");
    /// assert_eq!(svp.qualified_name(), "AXA.PGMR/SPVSPO");
    /// ```
    pub fn qualified_name(&self) -> String {
        format!("{}/{}", self.library, self.name)
    }
}

/// One exported procedure of a service program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcedureRecord {
    /// Library containing the owning service program.
    pub library: String,
    /// Owning service program name.
    pub srvpgm_name: String,
    /// Exported symbol name (e.g. `SPVSPO_GETCABECERA`).
    pub procedure_name: String,
    /// One-line description, at most [`MAX_DESCRIPTION_CHARS`] characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// How the description was obtained.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_source: Option<DescriptionSource>,
    /// Timestamp of the last change to this record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl ProcedureRecord {
    /// Creates an undescribed procedure record.
    pub fn new(library: &str, srvpgm_name: &str, procedure_name: &str) -> Self {
        Self {
            library: library.to_string(),
            srvpgm_name: srvpgm_name.to_string(),
            procedure_name: procedure_name.to_string(),
            description: None,
            description_source: None,
            updated_at: None,
        }
    }

    /// Returns `true` if the record carries a non-blank description.
    pub fn is_described(&self) -> bool {
        self.description
            .as_deref()
            .is_some_and(|desc| !desc.trim().is_empty())
    }

    /// Sets the description together with the strategy that produced it.
    pub fn set_description(&mut self, description: &str, source: DescriptionSource) {
        self.description = Some(description.to_string());
        self.description_source = Some(source);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_description_source_roundtrip_identifiers() {
        for source in [
            DescriptionSource::InlineLabel,
            DescriptionSource::BlockHeader,
            DescriptionSource::NameInference,
            DescriptionSource::Manual,
        ] {
            assert_eq!(source.as_str().parse::<DescriptionSource>().unwrap(), source);
        }
        assert!("comment".parse::<DescriptionSource>().is_err());
    }

    #[test]
    fn test_description_source_serializes_snake_case() {
        let json = serde_json::to_string(&DescriptionSource::NameInference).unwrap();
        assert_eq!(json, "\"name_inference\"");
    }

    #[test]
    fn test_blank_description_is_not_described() {
        let mut record = ProcedureRecord::new("LIB", "SVP", "SVP_GET");
        record.description = Some("   ".into());
        assert!(!record.is_described());
        record.set_description("Obtiene", DescriptionSource::Manual);
        assert!(record.is_described());
        assert_eq!(record.description_source, Some(DescriptionSource::Manual));
    }

    #[test]
    fn test_service_program_defaults_source_file() {
        let svp = ServiceProgram::new("LIB", "SVP");
        assert_eq!(svp.source_file, DEFAULT_SOURCE_FILE);
        assert!(svp.source_checksum.is_none());
    }
}
