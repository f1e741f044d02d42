//! # Text Measurement
//!
//! Turns a string into a [`TextBox`]: a measured fragment with a
//! ready-to-emit show-text command. Measurement walks the glyph sequence
//! once — resolve each character, merge ligatures against the previous
//! glyph, accumulate widths and kerning — while the command is synthesized
//! alongside, grouping directly-encodable runs and dropping an explicit
//! offset marker wherever a kerning or space-compression adjustment lands.
//!
//! Widths are in 1/1000 em units; they are scaled by the font size only at
//! render time, so one measurement serves every candidate size the search
//! tries.

pub mod breaker;
pub mod entry;

use std::fmt::Write as _;

use crate::error::FoldoutError;
use crate::font::encoding::FontEncoder;
use crate::font::{FontRole, FontSet, GlyphMetrics};

/// An immutable measured fragment of styled text.
#[derive(Debug, Clone)]
pub struct TextBox {
    pub role: FontRole,
    /// The source text, kept so materialization can re-measure merges.
    pub text: String,
    /// Natural width in 1/1000 em units, kerning included.
    pub width: f64,
    /// Show-text command for the external serializer.
    pub command: String,
    /// No breakable or visible space may follow this box.
    pub join_next: bool,
    /// < 0 never occurs on a finished box; 0 marks an ordinary breakable
    /// point after it; > 0 discourages (but does not forbid) a break.
    pub penalty: i32,
}

impl FontSet {
    /// Measure `text` in the given role's font and build its show-text
    /// command.
    ///
    /// `space_compress` shrinks every word space to that fraction of its
    /// nominal width. The adjustment is folded into the kerning offset
    /// after the space glyph rather than its width, so the emitted command
    /// encodes per-run offsets and never substitutes glyphs.
    ///
    /// Allocates output codepoints in `enc` as a side effect; calls for
    /// one font must happen sequentially and in a stable order.
    pub fn make_box(
        &self,
        role: FontRole,
        text: &str,
        space_compress: f64,
        enc: &mut FontEncoder,
    ) -> Result<TextBox, FoldoutError> {
        let font = self.font(role);

        // Resolve characters to glyphs, merging ligatures with a single
        // lookahead: if the previous glyph declares a ligature keyed by
        // this one's name, the pair collapses into the combined glyph.
        let mut glyphs: Vec<GlyphMetrics> = Vec::with_capacity(text.len());
        for ch in text.chars() {
            let mut glyph = self.resolve(role, ch)?;
            if let Some(prev) = glyphs.last() {
                if let Some(combined) = prev.ligatures.get(&glyph.name) {
                    if let Some(merged) = font.glyph(combined) {
                        glyphs.pop();
                        glyph = merged;
                    }
                }
            }
            glyphs.push(glyph.clone());
        }

        let codes = glyphs
            .iter()
            .map(|g| enc.allocate(role, g, &font.name))
            .collect::<Result<Vec<_>, _>>()?;

        // One pass for width and command together.
        let mut width = 0.0;
        let mut cmd = String::new();
        let mut pending = String::new();
        let mut simple = true;
        for (i, glyph) in glyphs.iter().enumerate() {
            let mut kern = match glyphs.get(i + 1) {
                Some(next) => f64::from(glyph.kerning.get(&next.name).copied().unwrap_or(0)),
                None => 0.0,
            };

            // Space compression rides on the kerning offset after the
            // space, even for a trailing space.
            if space_compress != 1.0 && codes[i] == 0x20 {
                let w = f64::from(glyph.width);
                kern -= w - w * space_compress;
            }
            width += f64::from(glyph.width) + kern;

            match codes[i] {
                0x28 => pending.push_str("\\("),
                0x29 => pending.push_str("\\)"),
                0x5c => pending.push_str("\\\\"),
                c @ 0x20..=0x7e => pending.push(char::from_u32(c).unwrap_or('?')),
                c => {
                    let _ = write!(pending, "\\{c:03o}");
                }
            }
            if kern != 0.0 {
                let _ = write!(cmd, "({pending}){}", format_offset(-kern));
                pending.clear();
                simple = false;
            }
        }
        if !pending.is_empty() {
            let _ = write!(cmd, "({pending})");
        }
        let command = if simple {
            format!("{cmd} Tj")
        } else {
            format!("[{cmd}] TJ")
        };

        Ok(TextBox {
            role,
            text: text.to_string(),
            width,
            command,
            join_next: false,
            penalty: 0,
        })
    }
}

/// Offsets are integers in the common case; fractional values only appear
/// after space compression, and three decimals is plenty at 1/1000 em.
fn format_offset(value: f64) -> String {
    if value == value.trunc() {
        format!("{}", value as i64)
    } else {
        format!("{value:.3}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::testutil::small_font_set;

    #[test]
    fn test_plain_word_width_and_command() {
        let fonts = small_font_set();
        let mut enc = FontEncoder::new();
        let b = fonts.make_box(FontRole::Body, "oo", 1.0, &mut enc).unwrap();
        assert!((b.width - 900.0).abs() < 1e-9);
        assert_eq!(b.command, "(oo) Tj");
        assert!(!b.join_next);
        assert_eq!(b.penalty, 0);
    }

    #[test]
    fn test_kerning_emits_offset_marker() {
        let fonts = small_font_set();
        let mut enc = FontEncoder::new();
        let b = fonts.make_box(FontRole::Body, "AV", 1.0, &mut enc).unwrap();
        // 600 + 650 - 80
        assert!((b.width - 1170.0).abs() < 1e-9);
        assert_eq!(b.command, "[(A)80(V)] TJ");
    }

    #[test]
    fn test_ligature_merges_and_gets_private_code() {
        let fonts = small_font_set();
        let mut enc = FontEncoder::new();
        let b = fonts.make_box(FontRole::Body, "fi", 1.0, &mut enc).unwrap();
        // The fi ligature replaces f + i entirely.
        assert!((b.width - 550.0).abs() < 1e-9);
        assert_eq!(b.command, "(\\200) Tj");
        let usage = enc.usage(FontRole::Body).unwrap();
        assert_eq!(usage.assignments, vec![(0x80, "fi".to_string())]);
    }

    #[test]
    fn test_parens_are_escaped() {
        let fonts = small_font_set();
        let mut enc = FontEncoder::new();
        let b = fonts
            .make_box(FontRole::Body, "(A)", 1.0, &mut enc)
            .unwrap();
        assert_eq!(b.command, "(\\(A\\)) Tj");
    }

    #[test]
    fn test_unknown_character_uses_fallback_glyph() {
        let fonts = small_font_set();
        let mut enc = FontEncoder::new();
        let b = fonts.make_box(FontRole::Body, "Z", 1.0, &mut enc).unwrap();
        // question is 450 wide
        assert!((b.width - 450.0).abs() < 1e-9);
        assert_eq!(b.command, "(?) Tj");
    }

    #[test]
    fn test_space_compression_rides_on_kerning() {
        let fonts = small_font_set();
        let mut enc = FontEncoder::new();
        let natural = fonts
            .make_box(FontRole::Body, "o o", 1.0, &mut enc)
            .unwrap();
        let squeezed = fonts
            .make_box(FontRole::Body, "o o", 0.8, &mut enc)
            .unwrap();
        // space is 250 wide; at 0.8 it gives back 50
        assert!((natural.width - squeezed.width - 50.0).abs() < 1e-9);
        assert_eq!(natural.command, "(o o) Tj");
        assert_eq!(squeezed.command, "[(o )50(o)] TJ");
    }

    #[test]
    fn test_trailing_space_is_compressed_too() {
        let fonts = small_font_set();
        let mut enc = FontEncoder::new();
        let b = fonts
            .make_box(FontRole::Body, "o ", 0.8, &mut enc)
            .unwrap();
        assert!((b.width - (450.0 + 200.0)).abs() < 1e-9);
        assert_eq!(b.command, "[(o )50] TJ");
    }

    #[test]
    fn test_format_offset() {
        assert_eq!(format_offset(-80.0), "-80");
        assert_eq!(format_offset(50.0), "50");
        assert_eq!(format_offset(12.5), "12.500");
    }
}
