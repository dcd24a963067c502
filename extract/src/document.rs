//! Extraction inputs: the source document and the expected procedure names.

use std::collections::HashSet;

/// A source member split into lines.
///
/// Borrowed from the caller's text for the duration of one extraction.
/// Both `\n` and `\r\n` line endings are accepted.
#[derive(Debug, Clone)]
pub struct SourceDocument<'a> {
    lines: Vec<&'a str>,
}

impl<'a> SourceDocument<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().collect(),
        }
    }

    pub fn lines(&self) -> &[&'a str] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Exported procedure names of one service program.
///
/// Names keep the spelling they were supplied with (so results key back to
/// catalog rows), are compared case-insensitively, and iterate in insertion
/// order. Duplicates and blank names are dropped.
///
/// # Examples
///
/// ```
/// use svp_dict_extract::ExpectedNames;
///
/// let names = ExpectedNames::new(["SVP_GET", "svp_get", " ", "SVP_SET"]);
/// assert_eq!(names.len(), 2);
/// assert!(names.contains("svp_set"));
/// assert_eq!(names.iter().collect::<Vec<_>>(), vec!["SVP_GET", "SVP_SET"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpectedNames {
    names: Vec<String>,
}

impl ExpectedNames {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut kept = Vec::new();
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() {
                continue;
            }
            if seen.insert(name.to_ascii_uppercase()) {
                kept.push(name.to_string());
            }
        }
        Self { names: kept }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.names.iter().map(String::as_str)
    }

    /// Returns the stored spelling of `name`, compared case-insensitively.
    pub fn find(&self, name: &str) -> Option<&str> {
        self.iter().find(|candidate| candidate.eq_ignore_ascii_case(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for ExpectedNames {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}
