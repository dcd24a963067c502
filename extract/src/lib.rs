//! Procedure description extraction from service-program source.
//!
//! Given the text of a source member and the procedure names its service
//! program exports, this crate infers a one-line description for as many
//! procedures as the comments allow. Strategies run in priority order:
//!
//! 1. **Inline labels** ([`inline`]): `NAME : text` or `NAME(): text`
//!    comments, including wrapped continuation lines.
//! 2. **Block headers** ([`block`]): the comment block directly above an
//!    exported `DCL-PROC` or fixed-form `P` specification.
//! 3. **Name inference** ([`infer`](mod@infer)): optional; synthesizes a
//!    description from the `MODULE_VERBNOUN` naming convention.
//!
//! A name described by an earlier strategy is never overwritten by a later
//! one. Every description goes through [`normalize`], so it is a single line
//! of at most [`MAX_DESCRIPTION_CHARS`](svp_dict_core::MAX_DESCRIPTION_CHARS)
//! characters. Extraction never fails; a procedure with no usable comment is
//! simply absent from the result.
//!
//! # Example
//!
//! ```
//! use svp_dict_extract::{ExpectedNames, Strategy, extract_descriptions};
//!
//! let source = "
//!       * SPVSPO_getCabecera : Obtiene la cabecera
//!       *                      de la póliza
//!      P SPVSPO_getCabecera...
//!
//! // -------------------------------------------------------
//! // Graba el detalle
//! // -------------------------------------------------------
//! dcl-proc setDetalle export;
//! ";
//!
//! let expected = ExpectedNames::new(["SPVSPO_GETCABECERA", "SPVSPO_SETDETALLE"]);
//! let result = extract_descriptions(source, &expected);
//!
//! assert_eq!(result.description("SPVSPO_GETCABECERA"), Some("Obtiene la cabecera de la póliza"));
//! let detalle = result.get("SPVSPO_SETDETALLE").unwrap();
//! assert_eq!(detalle.text, "Graba el detalle");
//! assert_eq!(detalle.strategy, Strategy::BlockHeader);
//! ```

pub mod block;
pub mod classify;
pub mod document;
pub mod infer;
pub mod inline;
pub mod names;
pub mod normalize;
pub mod pipeline;
pub mod symbols;

pub use classify::{LineClass, classify};
pub use document::{ExpectedNames, SourceDocument};
pub use infer::infer;
pub use names::{escape_for_pattern, resolve_declared_name};
pub use normalize::normalize;
pub use pipeline::{
    Candidate, Description, ExtractionResult, Extractor, Strategy, extract_descriptions,
};
pub use symbols::parse_export_symbols;
