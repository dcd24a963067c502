//! Block header extraction (second pass).
//!
//! Locates exported procedure declarations and harvests the comment block
//! sitting directly above each one.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace};

use crate::classify::{LineClass, classify, is_decorative};
use crate::document::{ExpectedNames, SourceDocument};
use crate::names::resolve_declared_name;
use crate::normalize::{collapse_whitespace, normalize};
use crate::pipeline::{Candidate, Strategy};

// SAFETY: These regexes are compile-time constants and are validated by tests.
static EXPORT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bEXPORT\b").expect("static regex must compile"));
static FREE_DCL_PROC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^DCL-PROC\s+([\w$#@]+)").expect("static regex must compile")
});
static FIXED_PSPEC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^P\s+([\w$#@]+)\s").expect("static regex must compile")
});
static LOOSE_DECL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:DCL-[A-Z]+\s+)?([A-Za-z$#@][\w$#@]*)\s")
        .expect("static regex must compile")
});

/// Resolves the procedure declared on `line` to an expected name.
///
/// Only code lines carrying the `EXPORT` keyword are considered. A
/// `DCL-PROC` declaration names its procedure outright. Otherwise a
/// fixed-form `P` spec is tried, then the first identifier on the line
/// (after a `DCL-xx` keyword, if any), so prototypes and other loose styles
/// still resolve.
pub fn resolve_declaration<'n>(line: &str, expected: &'n ExpectedNames) -> Option<&'n str> {
    if classify(line) != LineClass::Code {
        return None;
    }
    let trimmed = line.trim();
    let export = EXPORT_RE.find(trimmed)?;
    let head = &trimmed[..export.start()];

    if let Some(declared) = FREE_DCL_PROC_RE.captures(head).and_then(|caps| caps.get(1)) {
        return resolve_declared_name(declared.as_str(), expected);
    }
    if let Some(name) = FIXED_PSPEC_RE
        .captures(head)
        .and_then(|caps| caps.get(1))
        .and_then(|declared| resolve_declared_name(declared.as_str(), expected))
    {
        return Some(name);
    }
    LOOSE_DECL_RE
        .captures(head)
        .and_then(|caps| caps.get(1))
        .and_then(|declared| resolve_declared_name(declared.as_str(), expected))
}

/// Walks upward from the line above `decl_idx` over blank and comment lines.
///
/// Returns the surviving fragments in top-to-bottom order and the index of
/// the topmost line consumed (equal to `decl_idx` when nothing was).
pub fn harvest_preceding_block<'a>(lines: &[&'a str], decl_idx: usize) -> (Vec<&'a str>, usize) {
    let mut fragments = Vec::new();
    let mut start = decl_idx.min(lines.len());
    while start > 0 {
        let class = classify(lines[start - 1]);
        if !class.is_transparent() {
            break;
        }
        start -= 1;
        let fragment = strip_comment_markers(class.content());
        if !is_decorative(fragment) {
            fragments.push(fragment);
        }
    }
    fragments.reverse();
    (fragments, start)
}

fn strip_comment_markers(content: &str) -> &str {
    content.trim_start_matches(['*', '/']).trim()
}

/// Runs the block header pass over the whole document.
///
/// Candidates come back in declaration order; a name declared twice keeps
/// only its first non-empty block.
pub fn extract_block_headers<'n>(
    doc: &SourceDocument<'_>,
    expected: &'n ExpectedNames,
) -> Vec<Candidate<'n>> {
    let lines = doc.lines();
    let mut found: Vec<Candidate<'n>> = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let Some(name) = resolve_declaration(line, expected) else {
            continue;
        };
        if found.iter().any(|c| c.name == name) {
            trace!(name, line = idx + 1, "block header already captured");
            continue;
        }

        let (fragments, start) = harvest_preceding_block(lines, idx);
        let description = normalize(&collapse_whitespace(&fragments.join(" ")));
        if description.is_empty() {
            debug!(name, line = idx + 1, "declaration without a preceding comment block");
            continue;
        }

        debug!(name, line = idx + 1, block_start = start + 1, "block header");
        found.push(Candidate {
            name,
            description,
            line: Some(idx + 1),
            strategy: Strategy::BlockHeader,
        });
    }

    found
}
