//! Resolution of declared procedure identifiers to exported names.

use tracing::debug;

use crate::document::ExpectedNames;

/// Escapes every regex metacharacter in `name`.
///
/// Procedure names may contain `$`, `#` or `@`, which must not leak into a
/// constructed pattern as syntax.
pub fn escape_for_pattern(name: &str) -> String {
    regex::escape(name)
}

/// Resolves an identifier found in a declaration to an expected name.
///
/// An exact case-insensitive match wins. Otherwise the first expected name
/// ending in `_<declared>` is returned, which covers the usual
/// `MODULE_PROCNAME` export convention for a procedure declared as
/// `PROCNAME`. When several expected names share that suffix the first one in
/// iteration order is used.
///
/// # Examples
///
/// ```
/// use svp_dict_extract::{ExpectedNames, resolve_declared_name};
///
/// let expected = ExpectedNames::new(["SPVSPO_GETCABECERA", "SPVSPO_SETCABECERA"]);
/// assert_eq!(resolve_declared_name("getCabecera", &expected), Some("SPVSPO_GETCABECERA"));
/// assert_eq!(resolve_declared_name("INTERNA", &expected), None);
/// ```
pub fn resolve_declared_name<'n>(declared: &str, expected: &'n ExpectedNames) -> Option<&'n str> {
    let declared = declared.trim().to_ascii_uppercase();
    if declared.is_empty() {
        return None;
    }
    if let Some(exact) = expected.find(&declared) {
        return Some(exact);
    }

    let suffix = format!("_{declared}");
    let mut matches = expected
        .iter()
        .filter(|name| name.to_ascii_uppercase().ends_with(&suffix));
    let chosen = matches.next()?;
    if let Some(other) = matches.next() {
        debug!(
            declared = %declared,
            chosen,
            other,
            "ambiguous suffix match, keeping first expected name"
        );
    }
    Some(chosen)
}
