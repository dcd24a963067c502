//! Inline label extraction (first pass).
//!
//! Finds comment lines of the form `NAME : description` or
//! `NAME(): description` and follows the description onto the comment lines
//! below it, the way SEU-edited members wrap long annotations:
//!
//! ```text
//!       * SVPSIN_chgEstadosReclamo : Cambia Estados del
//!       *                            Reclamo          ******
//!       * SVPSIN_getReclamo : Obtiene un reclamo
//! ```

use std::collections::HashSet;

use regex::Regex;
use tracing::{debug, warn};

use crate::classify::{LineClass, classify, trim_decoration};
use crate::document::{ExpectedNames, SourceDocument};
use crate::names::escape_for_pattern;
use crate::normalize::{collapse_whitespace, normalize};
use crate::pipeline::{Candidate, Strategy};

/// Label patterns compiled once per expected-name set.
#[derive(Debug)]
pub struct LabelPatterns<'n> {
    labels: Vec<(&'n str, Regex)>,
    any_header: Option<Regex>,
}

impl<'n> LabelPatterns<'n> {
    pub fn new(expected: &'n ExpectedNames) -> Self {
        let labels = expected
            .iter()
            .filter_map(|name| {
                let pattern = format!(
                    r"(?i)^\s*{}\s*(?:\(\))?\s*:\s*(.+)$",
                    escape_for_pattern(name)
                );
                match Regex::new(&pattern) {
                    Ok(re) => Some((name, re)),
                    Err(err) => {
                        warn!(name, error = %err, "skipping label pattern that failed to compile");
                        None
                    }
                }
            })
            .collect::<Vec<_>>();

        let any_header = if labels.is_empty() {
            None
        } else {
            let alternation = labels
                .iter()
                .map(|(name, _)| escape_for_pattern(name))
                .collect::<Vec<_>>()
                .join("|");
            match Regex::new(&format!(r"(?i)^\s*(?:{alternation})\s*(?:\(\))?\s*:")) {
                Ok(re) => Some(re),
                Err(err) => {
                    warn!(error = %err, "combined label header pattern failed to compile");
                    None
                }
            }
        };

        Self { labels, any_header }
    }

    /// Matches `content` against the label pattern of each name for which
    /// `is_resolved` returns `false`, in expected-name order.
    ///
    /// Returns the matched name and the raw description text.
    pub fn match_label<'c>(
        &self,
        content: &'c str,
        is_resolved: impl Fn(&str) -> bool,
    ) -> Option<(&'n str, &'c str)> {
        self.labels
            .iter()
            .filter(|(name, _)| !is_resolved(name))
            .find_map(|(name, re)| {
                re.captures(content)
                    .and_then(|caps| caps.get(1))
                    .map(|text| (*name, text.as_str()))
            })
    }

    /// Returns `true` if `content` opens a label for any expected name.
    pub fn is_label_header(&self, content: &str) -> bool {
        match &self.any_header {
            Some(re) => re.is_match(content),
            // Per-name fallback: a header is a label line with any text
            // after the colon, or nothing at all.
            None => self.labels.iter().any(|(_, re)| {
                re.is_match(content) || re.is_match(&format!("{} .", content.trim_end()))
            }),
        }
    }
}

/// Collects the continuation of a label starting at line `start`.
///
/// Walks forward while lines are comments, skipping those that are blank
/// once decoration is trimmed. Only a line that opens a label for any
/// expected name ends the walk early. Returns the space-joined text and the index
/// of the first line not consumed.
pub fn collect_continuation(
    lines: &[&str],
    start: usize,
    patterns: &LabelPatterns<'_>,
) -> (String, usize) {
    let mut text = String::new();
    let mut idx = start;
    while let Some(line) = lines.get(idx) {
        let LineClass::Comment(content) = classify(line) else {
            break;
        };
        let fragment = trim_decoration(content);
        if !fragment.is_empty() {
            if patterns.is_label_header(fragment) {
                break;
            }
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(fragment);
        }
        idx += 1;
    }
    (text, idx)
}

/// Runs the inline label pass over the whole document.
///
/// Each expected name is captured at most once; the first label wins.
pub fn extract_inline_labels<'n>(
    doc: &SourceDocument<'_>,
    patterns: &LabelPatterns<'n>,
) -> Vec<Candidate<'n>> {
    let lines = doc.lines();
    let mut resolved: HashSet<&'n str> = HashSet::new();
    let mut found = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let content = classify(line).content();
        if content.is_empty() {
            continue;
        }
        let Some((name, captured)) = patterns.match_label(content, |n| resolved.contains(n)) else {
            continue;
        };

        let (continuation, stop) = collect_continuation(lines, idx + 1, patterns);
        let mut text = trim_decoration(captured).to_string();
        if !continuation.is_empty() {
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(&continuation);
        }

        let description = normalize(&collapse_whitespace(&text));
        if description.is_empty() {
            debug!(name, line = idx + 1, "label without description text");
            continue;
        }

        debug!(name, line = idx + 1, continued_to = stop, "inline label");
        resolved.insert(name);
        found.push(Candidate {
            name,
            description,
            line: Some(idx + 1),
            strategy: Strategy::InlineLabel,
        });
    }

    found
}
