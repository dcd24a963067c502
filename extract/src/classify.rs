//! Comment line classification.
//!
//! Recognizes the three comment dialects found in service-program sources:
//! free-form `//`, the `**` banner style, and fixed-form comments marked by
//! `*` in column 7.

/// Classification of one source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass<'a> {
    /// Empty or whitespace-only line.
    Blank,
    /// Comment line with its marker stripped and content trimmed.
    Comment(&'a str),
    /// Anything else.
    Code,
}

impl<'a> LineClass<'a> {
    pub fn is_comment(&self) -> bool {
        matches!(self, Self::Comment(_))
    }

    /// Blank and comment lines are transparent to the backward header walk.
    pub fn is_transparent(&self) -> bool {
        matches!(self, Self::Blank | Self::Comment(_))
    }

    /// Returns the comment content, or `""` for blank and code lines.
    pub fn content(&self) -> &'a str {
        match self {
            Self::Comment(content) => content,
            Self::Blank | Self::Code => "",
        }
    }
}

/// Classifies a line of source text.
///
/// Rules are checked in order: a trimmed line starting with `//`, a trimmed
/// line starting with `**`, then a line whose 7th character is `*`.
pub fn classify(line: &str) -> LineClass<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineClass::Blank;
    }
    if let Some(rest) = trimmed.strip_prefix("//") {
        return LineClass::Comment(rest.trim());
    }
    if let Some(rest) = trimmed.strip_prefix("**") {
        return LineClass::Comment(rest.trim());
    }
    if let Some((idx, '*')) = line.char_indices().nth(6) {
        return LineClass::Comment(line[idx + 1..].trim());
    }
    LineClass::Code
}

/// Strips trailing whitespace and a trailing run of `*` decoration.
pub fn trim_decoration(text: &str) -> &str {
    text.trim_end().trim_end_matches('*').trim()
}

/// Returns `true` if a fragment carries no text: only `-`, `*`, `/` and
/// whitespace, or nothing at all.
pub fn is_decorative(fragment: &str) -> bool {
    fragment
        .chars()
        .all(|ch| matches!(ch, '-' | '*' | '/') || ch.is_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_form_slash_comment() {
        assert_eq!(classify("   // Obtiene cabecera  "), LineClass::Comment("Obtiene cabecera"));
        assert_eq!(classify("//"), LineClass::Comment(""));
    }

    #[test]
    fn test_double_star_comment() {
        assert_eq!(classify("** PROCA : hace algo"), LineClass::Comment("PROCA : hace algo"));
    }

    #[test]
    fn test_fixed_form_column_seven() {
        assert_eq!(classify("     C* calcula total"), LineClass::Comment("calcula total"));
        assert_eq!(classify("      * banner"), LineClass::Comment("banner"));
        assert_eq!(classify("00010*"), LineClass::Code);
        assert_eq!(classify("000100*"), LineClass::Comment(""));
    }

    #[test]
    fn test_code_and_blank_lines() {
        assert_eq!(classify("dcl-proc PROCA export;"), LineClass::Code);
        assert_eq!(classify("     P PROCA           B                   EXPORT"), LineClass::Code);
        assert_eq!(classify("   \t "), LineClass::Blank);
        assert!(!classify("").is_comment());
        assert!(classify("").is_transparent());
        assert!(!classify("x = 1;").is_transparent());
    }

    #[test]
    fn test_content_is_empty_for_non_comments() {
        assert_eq!(classify("eval x = 1;").content(), "");
        assert_eq!(classify("// hola").content(), "hola");
    }

    #[test]
    fn test_fixed_form_uses_character_columns() {
        // Multi-byte characters before column 7 must not shift the marker.
        assert_eq!(classify("ñññññ * nota"), LineClass::Comment("nota"));
    }

    #[test]
    fn test_trim_decoration() {
        assert_eq!(trim_decoration("Obtiene cabecera   ****  "), "Obtiene cabecera");
        assert_eq!(trim_decoration("*****"), "");
        assert_eq!(trim_decoration("a * b"), "a * b");
    }

    #[test]
    fn test_decoration() {
        assert!(is_decorative("-----"));
        assert!(is_decorative("// -- //"));
        assert!(is_decorative("*** ***"));
        assert!(is_decorative(""));
        assert!(!is_decorative("*====*"));
        assert!(!is_decorative("-- nota"));
    }
}
