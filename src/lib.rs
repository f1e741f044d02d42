//! # Foldout
//!
//! A fixed-page directory typesetter.
//!
//! Most typesetters hold the font size constant and let the page count
//! fall where it may. A printed contact directory works the other way
//! around: the paper is fixed (so many pages, so many columns) and the
//! text must be as large as possible while still fitting. Foldout
//! searches for that size, then justifies every line and every column
//! exactly.
//!
//! ## Architecture
//!
//! ```text
//! Input (families / tokens)
//!       ↓
//!   [font]    — AFM metrics, glyph mapping, codepoint allocation
//!       ↓
//!   [text]    — Measured boxes; optimal line/column segmentation
//!       ↓
//!   [layout]  — Font-size search, line materialization, placement
//!       ↓
//! Placed columns + font usage, ready for an external serializer
//! ```
//!
//! All text measurement happens in font-size-independent units of
//! 1/1000 em, so one pass of measurement serves every trial size.

pub mod config;
pub mod error;
pub mod font;
pub mod layout;
pub mod text;

pub use config::LayoutConfig;
pub use error::FoldoutError;
pub use font::{FontEncoder, FontMetrics, FontRole, FontSet, FontUsage};
pub use layout::column::{Column, PlacedLine, TextRun};
pub use text::entry::{family_tokens, Family, Person, Token};

use layout::column::render_columns;
use layout::materialize::split_into_lines;
use layout::LayoutEngine;
use serde::Deserialize;

/// The finished layout: placed columns plus everything an external
/// serializer needs to embed and encode the fonts.
#[derive(Debug, Clone)]
pub struct Layout {
    pub font_size: f64,
    /// Trial layouts the size search ran.
    pub rounds: u32,
    /// One entry per column, in reading order across pages.
    pub columns: Vec<Column>,
    /// Codepoint assignments per font that actually rendered text.
    pub usage: Vec<(FontRole, FontUsage)>,
}

/// Typeset token streams into placed, justified columns.
///
/// This is the primary entry point. Each inner slice of `entries` is
/// one directory entry; boxes never break across entries.
pub fn typeset(
    entries: &[Vec<Token>],
    fonts: &FontSet,
    config: &LayoutConfig,
) -> Result<Layout, FoldoutError> {
    let engine = LayoutEngine::new(fonts, config)?;
    let mut enc = FontEncoder::new();

    let boxes = text::entry::format_entries(entries, fonts, &mut enc)?;
    let result = engine.find_font_size(&boxes)?;
    let lines = split_into_lines(
        &boxes,
        &result.line_breaks,
        fonts,
        config,
        result.font_size,
        &mut enc,
    )?;
    let columns = render_columns(&lines, &result.column_breaks, fonts, config, result.font_size)?;

    let usage = font::FontRole::ALL
        .iter()
        .filter_map(|&role| enc.usage(role).map(|u| (role, u)))
        .collect();

    Ok(Layout {
        font_size: result.font_size,
        rounds: result.rounds,
        columns,
        usage,
    })
}

/// Typeset family records directly, formatting each into its token
/// stream first.
pub fn typeset_families(
    families: &[Family],
    fonts: &FontSet,
    config: &LayoutConfig,
) -> Result<Layout, FoldoutError> {
    let entries: Vec<Vec<Token>> = families.iter().map(family_tokens).collect();
    typeset(&entries, fonts, config)
}

/// Input document for [`typeset_json`]: a layout configuration plus the
/// family records to set. Fonts stay out of the document; AFM data is a
/// separate input with its own parser.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DirectoryInput {
    pub config: LayoutConfig,
    pub families: Vec<Family>,
}

/// Typeset a directory described as JSON.
pub fn typeset_json(json: &str, fonts: &FontSet) -> Result<Layout, FoldoutError> {
    let input: DirectoryInput = serde_json::from_str(json)
        .map_err(|e| FoldoutError::Config(format!("invalid input document: {e}")))?;
    typeset_families(&input.families, fonts, &input.config)
}
