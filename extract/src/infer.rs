//! Name-based description inference.
//!
//! Exported procedures follow a `MODULE_VERBNOUN` naming convention, so a
//! procedure with no documentation at all can still get a rough Spanish
//! description: `SPVSPO_GETCABECERA` becomes `Obtiene cabecera`.

use crate::document::ExpectedNames;
use crate::pipeline::{Candidate, Strategy};

/// Names that map to a phrase as a whole.
const WHOLE_NAMES: &[(&str, &str)] = &[
    ("ERROR", "Error"),
    ("CUOTAS", "Cuotas"),
    ("PENDPROC", "Pendiente proceso"),
    ("ULTSEC", "Última secuencia"),
    ("UPDC", "Actualiza"),
];

/// Three-letter verb abbreviations, looked up against the leading characters.
const VERBS: &[(&str, &str)] = &[
    ("CHK", "Verifica"),
    ("GET", "Obtiene"),
    ("SET", "Establece"),
    ("UPD", "Actualiza"),
    ("DLT", "Elimina"),
    ("INZ", "Inicialización"),
    ("END", "Fin"),
];

/// Irregular prefixes, tried in order when no three-letter verb matched.
const IRREGULAR: &[(&str, &str)] = &[
    ("ANULA", "Anula"),
    ("IS", "Indica si"),
    ("ULTSEC", "Última secuencia"),
    ("PEND", "Pendiente"),
    ("TIENE", "Indica si tiene"),
];

/// Synthesizes a description from a procedure name alone.
///
/// Returns `None` when nothing is left once the module prefix is removed.
///
/// # Examples
///
/// ```
/// use svp_dict_extract::infer;
///
/// assert_eq!(infer("SPVSPO_GETCABECERA").as_deref(), Some("Obtiene cabecera"));
/// assert_eq!(infer("SVPSIN_ISVIGENTE").as_deref(), Some("Indica si vigente"));
/// assert_eq!(infer("SVPSIN_CALCULA").as_deref(), Some("calcula"));
/// assert_eq!(infer("SVPSIN_"), None);
/// ```
pub fn infer(procedure_name: &str) -> Option<String> {
    let upper = procedure_name.trim().to_ascii_uppercase();
    let name = strip_module_prefix(&upper);
    if name.is_empty() {
        return None;
    }

    if let Some((_, phrase)) = WHOLE_NAMES.iter().find(|(whole, _)| *whole == name) {
        return Some((*phrase).to_string());
    }

    let verb = VERBS
        .iter()
        .find(|(token, _)| name.get(..3) == Some(*token))
        .or_else(|| IRREGULAR.iter().find(|(token, _)| name.starts_with(token)));

    match verb {
        Some((token, phrase)) => {
            let rest = name[token.len()..].trim_matches('_').to_lowercase();
            if rest.is_empty() {
                Some((*phrase).to_string())
            } else {
                Some(format!("{phrase} {rest}"))
            }
        }
        None => Some(name.to_lowercase()),
    }
}

/// Removes a leading `MODULE_` prefix made of letters and digits.
fn strip_module_prefix(name: &str) -> &str {
    match name.split_once('_') {
        Some((prefix, rest))
            if !prefix.is_empty() && prefix.chars().all(|ch| ch.is_ascii_alphanumeric()) =>
        {
            rest
        }
        _ => name,
    }
}

/// Produces an inference candidate for every expected name that yields one.
pub fn infer_candidates(expected: &ExpectedNames) -> Vec<Candidate<'_>> {
    expected
        .iter()
        .filter_map(|name| {
            infer(name).map(|description| Candidate {
                name,
                description,
                line: None,
                strategy: Strategy::NameInference,
            })
        })
        .collect()
}
