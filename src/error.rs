//! Structured error types for the foldout typesetting engine.
//!
//! Every error here is fatal and deterministic: the same input produces the
//! same error, so callers should fix the input (add pages, trim fields,
//! lower the minimum font size) rather than retry.

use thiserror::Error;

/// The unified error type returned by all public foldout API functions.
#[derive(Debug, Error)]
pub enum FoldoutError {
    /// A glyph the engine cannot work without (the fallback, or the word
    /// space) is missing from a font. The font set is unusable; this is a
    /// configuration defect, not a data problem.
    #[error("font {font}: required glyph {glyph:?} is missing; the font set is unusable")]
    GlyphResolutionFailure { font: String, glyph: String },

    /// The non-ASCII glyph repertoire exceeded the output-encoding ceiling
    /// for a single font. The character set in use is too large for one
    /// encoding run.
    #[error("font {font}: non-ASCII glyph repertoire exceeds the {ceiling:#x} codepoint ceiling")]
    CodepointExhaustion { font: String, ceiling: u32 },

    /// Even the minimum font size cannot fit the content into the
    /// configured page/column budget.
    #[error(
        "content does not fit the configured pages even at the minimum font size {minimum}; \
         add pages, reduce included fields, or lower the minimum"
    )]
    ContentTooLargeForPages { minimum: f64 },

    /// The layout still fits past the maximum font size, so the search
    /// never found an infeasible upper bound.
    #[error(
        "layout still fits above the maximum font size {maximum}; \
         not enough content for the configured page count"
    )]
    NotEnoughContentForPageCount { maximum: f64 },

    /// Zero entries, or a line/column collapsed to nothing where the
    /// geometry needs at least one line.
    #[error("degenerate layout: {0}")]
    DegenerateLayout(String),

    /// A `LayoutConfig` failed validation at startup.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// An AFM metric file or glyph list could not be parsed.
    #[error("failed to parse font metrics: {0}")]
    FontParse(String),
}
