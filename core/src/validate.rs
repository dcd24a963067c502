//! IBM i object name validation.
//!
//! Library, object, file and member names end up interpolated into CL
//! commands (`DSPFD FILE(LIB/FILE)`), IFS paths and SQL literals. Only
//! names made of the characters the system itself accepts are let through,
//! which keeps quoting problems out of the remote command builders.
//!
//! # Examples
//!
//! ```
//! use svp_dict_core::{ObjectKind, ValidationError, validate_object_name};
//!
//! assert!(validate_object_name(ObjectKind::Library, "AXA.PGMR").is_ok());
//! assert!(validate_object_name(ObjectKind::Object, "SPVSPO").is_ok());
//!
//! let err = validate_object_name(ObjectKind::File, "QF');DROP").unwrap_err();
//! assert!(matches!(err, ValidationError::InvalidCharacter { .. }));
//! ```

use std::fmt;

use thiserror::Error;

/// Maximum length of an IBM i system object name.
pub const MAX_OBJECT_NAME_LEN: usize = 10;

/// Kind of object a name refers to, used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Library,
    Object,
    File,
    Member,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Library => "library",
            Self::Object => "object",
            Self::File => "file",
            Self::Member => "member",
        };
        f.write_str(label)
    }
}

/// Object name validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Name is empty or whitespace-only.
    #[error("{kind} name cannot be empty")]
    EmptyName { kind: ObjectKind },
    /// Name exceeds [`MAX_OBJECT_NAME_LEN`] characters.
    #[error("{kind} name '{name}' is longer than 10 characters")]
    TooLong { kind: ObjectKind, name: String },
    /// Name contains a character outside `A-Z 0-9 $ # @ _ .`.
    #[error("{kind} name '{name}' contains invalid character '{ch}'")]
    InvalidCharacter {
        kind: ObjectKind,
        name: String,
        ch: char,
    },
    /// Name starts with a digit, `_` or `.`.
    #[error("{kind} name '{name}' must start with a letter, '$', '#' or '@'")]
    InvalidStart { kind: ObjectKind, name: String },
}

/// Validates an IBM i system object name.
///
/// Names are compared case-insensitively by the system, so lowercase ASCII
/// letters are accepted as well.
///
/// # Errors
///
/// Returns the first [`ValidationError`] found.
pub fn validate_object_name(kind: ObjectKind, name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName { kind });
    }
    if name.chars().count() > MAX_OBJECT_NAME_LEN {
        return Err(ValidationError::TooLong {
            kind,
            name: name.to_string(),
        });
    }
    if let Some(ch) = name.chars().find(|ch| !is_name_char(*ch)) {
        return Err(ValidationError::InvalidCharacter {
            kind,
            name: name.to_string(),
            ch,
        });
    }
    let first = name.chars().next().unwrap_or('_');
    if !(first.is_ascii_alphabetic() || matches!(first, '$' | '#' | '@')) {
        return Err(ValidationError::InvalidStart {
            kind,
            name: name.to_string(),
        });
    }
    Ok(())
}

fn is_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '$' | '#' | '@' | '_' | '.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_typical_names() {
        for name in ["AXA.PGMR", "QFUENTES", "SPVSPO", "PEDS_0002", "QSYS2", "$TMP", "axarealx"] {
            assert!(validate_object_name(ObjectKind::Object, name).is_ok(), "{name}");
        }
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(
            validate_object_name(ObjectKind::Library, "  "),
            Err(ValidationError::EmptyName {
                kind: ObjectKind::Library
            })
        );
    }

    #[test]
    fn test_rejects_too_long() {
        let err = validate_object_name(ObjectKind::Member, "ABCDEFGHIJK").unwrap_err();
        assert!(matches!(err, ValidationError::TooLong { .. }));
    }

    #[test]
    fn test_rejects_quotes_and_slashes() {
        for name in ["A'B", "A\"B", "A/B", "A B", "A;B"] {
            let err = validate_object_name(ObjectKind::File, name).unwrap_err();
            assert!(matches!(err, ValidationError::InvalidCharacter { .. }), "{name}");
        }
    }

    #[test]
    fn test_rejects_leading_digit() {
        let err = validate_object_name(ObjectKind::Object, "1ABC").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidStart { .. }));
        assert_eq!(
            err.to_string(),
            "object name '1ABC' must start with a letter, '$', '#' or '@'"
        );
    }
}
