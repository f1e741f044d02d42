//! # Output-Codepoint Allocation
//!
//! Each typeset run writes text in a private output encoding per font:
//! printable ASCII glyphs keep their own codes, everything else is handed
//! the next free slot starting at 0x80. Assignment is append-only and
//! first-come order-dependent, which is why one [`FontEncoder`] is owned
//! by a single run and all measurement for a font happens sequentially.
//!
//! The ceiling of 0x200 exists because show-text commands write non-ASCII
//! codes as three-digit octal escapes, and `\777` = 0x1FF is the largest
//! code an escape can carry.

use std::collections::{BTreeMap, HashMap};

use crate::error::FoldoutError;
use crate::font::{FontRole, GlyphMetrics};

/// First code handed out to a glyph without a printable ASCII code.
pub const FIRST_PRIVATE_CODE: u32 = 0x80;
/// Codes at or above this value cannot be emitted; allocation fails.
pub const CODE_CEILING: u32 = 0x200;

/// Per-font encoding state for one typeset run.
#[derive(Debug, Default)]
struct EncodingState {
    name_to_code: HashMap<String, u32>,
    /// Only private (non-ASCII) assignments; ASCII codes are implicit.
    code_to_name: BTreeMap<u32, String>,
    next_code: u32,
    first_code: Option<u32>,
    last_code: Option<u32>,
}

impl EncodingState {
    fn allocate(&mut self, glyph: &GlyphMetrics, font_name: &str) -> Result<u32, FoldoutError> {
        let code = if let Some(code) = glyph.ascii_code() {
            code
        } else if let Some(code) = self.name_to_code.get(&glyph.name) {
            *code
        } else {
            if self.next_code == 0 {
                self.next_code = FIRST_PRIVATE_CODE;
            }
            if self.next_code >= CODE_CEILING {
                return Err(FoldoutError::CodepointExhaustion {
                    font: font_name.to_string(),
                    ceiling: CODE_CEILING,
                });
            }
            let code = self.next_code;
            self.next_code += 1;
            self.name_to_code.insert(glyph.name.clone(), code);
            self.code_to_name.insert(code, glyph.name.clone());
            code
        };

        self.first_code = Some(self.first_code.map_or(code, |c| c.min(code)));
        self.last_code = Some(self.last_code.map_or(code, |c| c.max(code)));
        Ok(code)
    }
}

/// The code range a font actually used during a run, for the external
/// serializer's width arrays and encoding-difference tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontUsage {
    pub first_code: u32,
    pub last_code: u32,
    /// Private code → glyph name, in code order.
    pub assignments: Vec<(u32, String)>,
}

/// Mutable output-encoding state for every font in a set, owned by one
/// typeset run and never shared across runs.
#[derive(Debug, Default)]
pub struct FontEncoder {
    states: HashMap<FontRole, EncodingState>,
}

impl FontEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign (or recall) the output code for a glyph in a font.
    pub fn allocate(
        &mut self,
        role: FontRole,
        glyph: &GlyphMetrics,
        font_name: &str,
    ) -> Result<u32, FoldoutError> {
        self.states
            .entry(role)
            .or_default()
            .allocate(glyph, font_name)
    }

    /// Usage summary for a font, or `None` if no glyph was ever encoded
    /// in it (the serializer then omits the font entirely).
    pub fn usage(&self, role: FontRole) -> Option<FontUsage> {
        let state = self.states.get(&role)?;
        Some(FontUsage {
            first_code: state.first_code?,
            last_code: state.last_code?,
            assignments: state
                .code_to_name
                .iter()
                .map(|(code, name)| (*code, name.clone()))
                .collect(),
        })
    }
}
