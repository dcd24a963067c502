//! Description normalization.
//!
//! Turns whatever a comment block produced into a single bounded line.
//! Banner headers of the form `-------- // proc(): real text // v2` are
//! reduced to the text after `():`.

use std::sync::LazyLock;

use regex::Regex;
use svp_dict_core::MAX_DESCRIPTION_CHARS;

const ELLIPSIS: &str = "...";

/// Collapses every whitespace run to a single space and trims the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Condenses a raw description to at most [`MAX_DESCRIPTION_CHARS`]
/// characters.
///
/// Text that does not start with `-` or `//` and is already short enough is
/// returned unchanged. The function is idempotent.
///
/// # Examples
///
/// ```
/// use svp_dict_extract::normalize;
///
/// assert_eq!(normalize("Obtiene cabecera"), "Obtiene cabecera");
/// assert_eq!(
///     normalize("-------- // MOD_PROCX(): retrieves header // v2"),
///     "retrieves header"
/// );
/// assert_eq!(normalize("-- computes total -- for the order"), "computes total for the order");
/// ```
pub fn normalize(text: &str) -> String {
    // SAFETY: These regexes are compile-time constants and are validated by tests.
    static BANNER_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"\):\s*([^/]+?)(?:\s*//|$)").expect("static regex must compile")
    });
    static SEGMENT_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\s*//\s*").expect("static regex must compile"));
    static DASH_RUN_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"-+").expect("static regex must compile"));

    if !is_decorated(text) && text.chars().count() <= MAX_DESCRIPTION_CHARS {
        return text.to_string();
    }

    let stripped = strip_leading_markers(text);

    if let Some(captured) = BANNER_RE.captures(stripped).and_then(|caps| caps.get(1)) {
        let collapsed = collapse_whitespace(captured.as_str());
        let cleaned = strip_leading_decoration(&collapsed);
        return truncate_chars(cleaned, MAX_DESCRIPTION_CHARS)
            .trim_end()
            .to_string();
    }

    let first_segment = SEGMENT_RE
        .split(stripped)
        .map(|segment| collapse_whitespace(&DASH_RUN_RE.replace_all(segment, " ")))
        .find(|segment| !segment.is_empty())
        .unwrap_or_else(|| stripped.to_string());
    let cleaned = strip_leading_decoration(&first_segment);

    if cleaned.chars().count() > MAX_DESCRIPTION_CHARS {
        let keep = MAX_DESCRIPTION_CHARS - ELLIPSIS.len();
        format!("{}{ELLIPSIS}", truncate_chars(cleaned, keep))
    } else {
        cleaned.to_string()
    }
}

fn is_decorated(text: &str) -> bool {
    let text = text.trim_start();
    text.starts_with('-') || text.starts_with("//")
}

/// Strips a leading dash run and then one leading `//` marker.
fn strip_leading_markers(text: &str) -> &str {
    let text = text.trim_start().trim_start_matches('-').trim_start();
    text.strip_prefix("//").unwrap_or(text).trim()
}

/// Removes every leading dash run and `//` marker so the output never
/// re-enters the decorated path.
fn strip_leading_decoration(text: &str) -> &str {
    let mut text = text.trim();
    loop {
        let next = if text.starts_with('-') {
            text.trim_start_matches('-').trim_start()
        } else if let Some(rest) = text.strip_prefix("//") {
            rest.trim_start()
        } else {
            return text;
        };
        text = next;
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_plain_text_unchanged() {
        assert_eq!(normalize("Obtiene  cabecera"), "Obtiene  cabecera");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_banner_header_extracts_text_after_parens() {
        assert_eq!(
            normalize("-------- // MOD_PROCX(): retrieves header // v2"),
            "retrieves header"
        );
        assert_eq!(
            normalize("// SVPCOA_getPoliza():   Devuelve   la póliza"),
            "Devuelve la póliza"
        );
    }

    #[test]
    fn test_segments_take_first_non_empty() {
        assert_eq!(normalize("---- //  // Calcula ---- prima // autor: X"), "Calcula prima");
    }

    #[test]
    fn test_only_decoration_becomes_empty() {
        assert_eq!(normalize("------"), "");
        assert_eq!(normalize("-- // //"), "");
    }

    #[test]
    fn test_long_text_truncated_with_ellipsis() {
        let long = "palabra ".repeat(60);
        let out = normalize(&long);
        assert_eq!(out.chars().count(), MAX_DESCRIPTION_CHARS);
        assert!(out.ends_with("..."));
    }

    #[test]
    fn test_exact_limit_is_not_truncated() {
        let text = format!("-{}", "a".repeat(MAX_DESCRIPTION_CHARS));
        let out = normalize(&text);
        assert_eq!(out, "a".repeat(MAX_DESCRIPTION_CHARS));
    }

    #[test]
    fn test_banner_truncated_without_ellipsis() {
        let text = format!("-- x(): {}", "b".repeat(400));
        let out = normalize(&text);
        assert_eq!(out, "b".repeat(MAX_DESCRIPTION_CHARS));
    }

    #[test]
    fn test_banner_content_starting_with_dash_is_cleaned() {
        assert_eq!(normalize("-- x(): -- hace algo // v1"), "hace algo");
    }

    #[test]
    fn test_idempotent_on_samples() {
        let long = format!("// {}", "desc ".repeat(100));
        let samples = [
            "Obtiene cabecera",
            "-------- // MOD_PROCX(): retrieves header // v2",
            "-- computes total -- for the order",
            "// // //",
            "- / /",
            "-- x(): - y",
            "  -- indented banner",
            long.as_str(),
            "ñandú // ---- // fin",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "not idempotent for {sample:?}");
            assert!(once.chars().count() <= MAX_DESCRIPTION_CHARS);
        }
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \t b\n c  "), "a b c");
    }
}
