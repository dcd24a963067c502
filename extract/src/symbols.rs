//! Exported symbol discovery from `DSPSRVPGM DETAIL(*PROCEXP)` listings.

use std::collections::BTreeSet;

use regex::Regex;
use tracing::warn;

use crate::names::escape_for_pattern;

/// Collects the procedure names exported by `srvpgm` from a listing.
///
/// Any token of the form `<SRVPGM>_<NAME>` counts, so the listing layout
/// (spooled file, qsh output, page headers) does not matter. Matching is
/// case-insensitive; names come back uppercase, sorted and deduplicated.
///
/// # Examples
///
/// ```
/// use svp_dict_extract::parse_export_symbols;
///
/// let listing = "  Procedure Exports:\n  SPVSPO_GETCABECERA   *YES\n  SPVSPO_SETCAB  SPVSPO_GETCABECERA\n";
/// let names = parse_export_symbols(listing, "spvspo");
/// assert_eq!(names.into_iter().collect::<Vec<_>>(), vec!["SPVSPO_GETCABECERA", "SPVSPO_SETCAB"]);
/// ```
pub fn parse_export_symbols(listing: &str, srvpgm: &str) -> BTreeSet<String> {
    let srvpgm = srvpgm.trim();
    if srvpgm.is_empty() {
        return BTreeSet::new();
    }
    let pattern = format!(r"(?i)\b{}_[A-Z0-9]+\b", escape_for_pattern(srvpgm));
    let symbol_re = match Regex::new(&pattern) {
        Ok(re) => re,
        Err(err) => {
            warn!(srvpgm, error = %err, "export symbol pattern failed to compile");
            return BTreeSet::new();
        }
    };

    symbol_re
        .find_iter(listing)
        .map(|m| m.as_str().to_ascii_uppercase())
        .collect()
}
