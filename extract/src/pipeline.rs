//! Extraction orchestration.
//!
//! Strategies run in a fixed priority order. Each produces candidates for
//! any number of names; the first strategy to describe a name owns it and
//! later candidates for that name are dropped.

use std::collections::BTreeMap;

use serde::Serialize;
use svp_dict_core::DescriptionSource;
use tracing::{debug, trace};

use crate::block::extract_block_headers;
use crate::document::{ExpectedNames, SourceDocument};
use crate::infer::infer_candidates;
use crate::inline::{LabelPatterns, extract_inline_labels};

/// An extraction strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// `NAME : description` comment labels.
    InlineLabel,
    /// The comment block above an exported declaration.
    BlockHeader,
    /// Synthesized from the procedure name.
    NameInference,
}

impl Strategy {
    /// Default priority order for source-based extraction.
    pub const SOURCE: [Strategy; 2] = [Strategy::InlineLabel, Strategy::BlockHeader];

    /// Source-based extraction followed by name inference.
    pub const ALL: [Strategy; 3] = [
        Strategy::InlineLabel,
        Strategy::BlockHeader,
        Strategy::NameInference,
    ];

    /// Catalog provenance recorded for descriptions found by this strategy.
    pub fn source(self) -> DescriptionSource {
        match self {
            Strategy::InlineLabel => DescriptionSource::InlineLabel,
            Strategy::BlockHeader => DescriptionSource::BlockHeader,
            Strategy::NameInference => DescriptionSource::NameInference,
        }
    }
}

/// A description proposed by one strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate<'n> {
    pub name: &'n str,
    pub description: String,
    /// 1-based line of the label or declaration, when there is one.
    pub line: Option<usize>,
    pub strategy: Strategy,
}

/// A description retained in the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Description {
    pub text: String,
    pub strategy: Strategy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

/// Procedure name to description, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ExtractionResult {
    entries: BTreeMap<String, Description>,
}

impl ExtractionResult {
    pub fn get(&self, name: &str) -> Option<&Description> {
        self.entries.get(name)
    }

    /// Shorthand for the description text of `name`.
    pub fn description(&self, name: &str) -> Option<&str> {
        self.get(name).map(|d| d.text.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Description)> {
        self.entries.iter().map(|(name, d)| (name.as_str(), d))
    }

    /// Stores a candidate unless its name is already described.
    ///
    /// Returns `true` if the candidate was stored.
    pub fn insert_if_absent(&mut self, candidate: Candidate<'_>) -> bool {
        if self.entries.contains_key(candidate.name) {
            return false;
        }
        self.entries.insert(
            candidate.name.to_string(),
            Description {
                text: candidate.description,
                strategy: candidate.strategy,
                line: candidate.line,
            },
        );
        true
    }

    pub fn into_map(self) -> BTreeMap<String, Description> {
        self.entries
    }
}

/// Runs a configured list of strategies against source documents.
///
/// Label patterns are compiled once when the extractor is built and reused
/// for every document it processes.
#[derive(Debug)]
pub struct Extractor<'n> {
    expected: &'n ExpectedNames,
    labels: LabelPatterns<'n>,
    strategies: Vec<Strategy>,
}

impl<'n> Extractor<'n> {
    /// Creates an extractor using [`Strategy::SOURCE`].
    pub fn new(expected: &'n ExpectedNames) -> Self {
        Self::with_strategies(expected, Strategy::SOURCE)
    }

    pub fn with_strategies(
        expected: &'n ExpectedNames,
        strategies: impl IntoIterator<Item = Strategy>,
    ) -> Self {
        Self {
            expected,
            labels: LabelPatterns::new(expected),
            strategies: strategies.into_iter().collect(),
        }
    }

    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    /// Extracts descriptions from one source text.
    pub fn extract(&self, source: &str) -> ExtractionResult {
        let mut result = ExtractionResult::default();
        if self.expected.is_empty() {
            return result;
        }
        let doc = SourceDocument::new(source);

        for &strategy in &self.strategies {
            let candidates = self.run(strategy, &doc);
            let offered = candidates.len();
            let mut kept = 0usize;
            for candidate in candidates {
                let name = candidate.name;
                if result.insert_if_absent(candidate) {
                    kept += 1;
                } else {
                    trace!(name, ?strategy, "already described by a higher-priority strategy");
                }
            }
            debug!(?strategy, offered, kept, "strategy finished");
        }

        result
    }

    fn run(&self, strategy: Strategy, doc: &SourceDocument<'_>) -> Vec<Candidate<'n>> {
        match strategy {
            Strategy::InlineLabel => extract_inline_labels(doc, &self.labels),
            Strategy::BlockHeader => extract_block_headers(doc, self.expected),
            Strategy::NameInference => infer_candidates(self.expected),
        }
    }
}

/// Extracts descriptions with the default source strategies.
///
/// # Examples
///
/// ```
/// use svp_dict_extract::{ExpectedNames, extract_descriptions};
///
/// let source = "\
/// // SVP_GETA : Obtiene A
/// dcl-s total packed(9:2);
///
/// // Calcula el total
/// dcl-proc calcTotal export;
/// ";
/// let expected = ExpectedNames::new(["SVP_GETA", "SVP_CALCTOTAL", "SVP_SINDOC"]);
/// let result = extract_descriptions(source, &expected);
/// assert_eq!(result.description("SVP_GETA"), Some("Obtiene A"));
/// assert_eq!(result.description("SVP_CALCTOTAL"), Some("Calcula el total"));
/// assert!(!result.contains("SVP_SINDOC"));
/// ```
pub fn extract_descriptions(source: &str, expected: &ExpectedNames) -> ExtractionResult {
    Extractor::new(expected).extract(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_label_takes_precedence_over_block() {
        let source = "\
// PROCA : from the label
dcl-s x int(10);
// block text
dcl-proc PROCA export;
";
        let expected = ExpectedNames::new(["PROCA"]);
        let result = extract_descriptions(source, &expected);
        let entry = result.get("PROCA").unwrap();
        assert_eq!(entry.text, "from the label");
        assert_eq!(entry.strategy, Strategy::InlineLabel);
        assert_eq!(entry.line, Some(1));
    }

    #[test]
    fn test_empty_inputs_yield_empty_result() {
        let expected = ExpectedNames::new(["PROCA"]);
        assert!(extract_descriptions("", &expected).is_empty());
        assert!(extract_descriptions("// PROCA : x", &ExpectedNames::default()).is_empty());
    }

    #[test]
    fn test_inference_only_fills_gaps() {
        let source = "// MOD_GETA : documentada\n";
        let expected = ExpectedNames::new(["MOD_GETA", "MOD_SETB"]);
        let result = Extractor::with_strategies(&expected, Strategy::ALL).extract(source);
        assert_eq!(result.description("MOD_GETA"), Some("documentada"));
        assert_eq!(result.description("MOD_SETB"), Some("Establece b"));
        assert_eq!(result.get("MOD_SETB").unwrap().strategy, Strategy::NameInference);
    }

    #[test]
    fn test_strategy_order_is_respected() {
        let source = "// block\ndcl-proc PROCA export;\n";
        let expected = ExpectedNames::new(["X_PROCA"]);
        let result =
            Extractor::with_strategies(&expected, [Strategy::NameInference, Strategy::BlockHeader])
                .extract(source);
        assert_eq!(result.get("X_PROCA").unwrap().strategy, Strategy::NameInference);
    }

    #[test]
    fn test_insert_if_absent() {
        let mut result = ExtractionResult::default();
        let candidate = |text: &str| Candidate {
            name: "A",
            description: text.to_string(),
            line: None,
            strategy: Strategy::BlockHeader,
        };
        assert!(result.insert_if_absent(candidate("first")));
        assert!(!result.insert_if_absent(candidate("second")));
        assert_eq!(result.description("A"), Some("first"));
    }

    #[test]
    fn test_strategy_maps_to_description_source() {
        assert_eq!(Strategy::BlockHeader.source(), DescriptionSource::BlockHeader);
        assert_eq!(Strategy::NameInference.source().as_str(), "name_inference");
    }

    #[test]
    fn test_result_serializes_as_map() {
        let expected = ExpectedNames::new(["PROCA"]);
        let result = extract_descriptions("// PROCA : hola\n", &expected);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["PROCA"]["text"], "hola");
        assert_eq!(json["PROCA"]["strategy"], "inline_label");
    }
}
