//! # Font Metrics & Glyph Resolution
//!
//! Per-font glyph metrics (widths, kerning, ligatures) plus the shared
//! unicode→glyph-name mapping that all fonts in a set resolve through.
//!
//! Metric tables are read-only after parsing and safe to share between
//! typeset runs. The mutable part of encoding — which output codepoint a
//! glyph was assigned during one run — lives in [`encoding::FontEncoder`],
//! which is created fresh per run.

pub mod afm;
pub mod encoding;
pub mod glyphlist;

pub use encoding::{FontEncoder, FontUsage};

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::FoldoutError;

/// The glyph name substituted when a character cannot be resolved.
pub const FALLBACK_GLYPH: &str = "question";

/// Metrics for a single glyph from a font.
///
/// Widths and kerning adjustments are in 1/1000 em units: multiply by the
/// font size and divide by 1000 to get points.
#[derive(Debug, Clone, Default)]
pub struct GlyphMetrics {
    pub name: String,
    /// The code assigned by the font's built-in encoding, if any. Codes in
    /// 0x20–0x7F pass straight through to the output encoding.
    pub code: Option<u32>,
    pub width: i32,
    pub bbox: [i32; 4],
    /// next-glyph-name → combined-glyph-name
    pub ligatures: HashMap<String, String>,
    /// next-glyph-name → adjustment in 1/1000 em
    pub kerning: HashMap<String, i32>,
}

impl GlyphMetrics {
    /// Whether this glyph's own code is directly usable in the output
    /// encoding (printable ASCII).
    pub fn ascii_code(&self) -> Option<u32> {
        self.code.filter(|c| (0x20..0x80).contains(c))
    }
}

/// Metrics for an entire font, parsed from an AFM file.
#[derive(Debug, Clone)]
pub struct FontMetrics {
    /// PostScript font name, e.g. `Times-Roman`.
    pub name: String,
    /// Short resource label the serializer uses, e.g. `FR`.
    pub label: String,
    pub glyphs: HashMap<String, GlyphMetrics>,
    pub cap_height: i32,
    pub ascent: i32,
    pub descent: i32,
    pub stem_v: i32,
    pub italic_angle: i32,
    pub bbox: [i32; 4],
    pub flags: u32,
}

impl FontMetrics {
    pub fn glyph(&self, name: &str) -> Option<&GlyphMetrics> {
        self.glyphs.get(name)
    }

    /// Width of the word space, in 1/1000 em units.
    pub fn space_width(&self) -> Option<f64> {
        self.glyphs.get("space").map(|g| f64::from(g.width))
    }
}

/// The closed set of font roles a token can be styled with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontRole {
    /// Running text: names, phone numbers, addresses.
    Body,
    /// Surnames and other lead-in text.
    Emphasis,
    /// Email addresses and anything else set in a typewriter face.
    Mono,
}

impl FontRole {
    pub const ALL: [FontRole; 3] = [FontRole::Body, FontRole::Emphasis, FontRole::Mono];
}

/// One font per role plus the shared unicode→glyph-name mapping derived
/// across all three.
///
/// The shared mapping prefers glyph names present in *every* font over
/// names only some fonts know, so a resolved name usually works no matter
/// which font the token ends up in.
#[derive(Debug)]
pub struct FontSet {
    body: FontMetrics,
    emphasis: FontMetrics,
    mono: FontMetrics,
    mapping: HashMap<char, String>,
}

impl FontSet {
    /// Build a set from three parsed fonts and an Adobe-glyph-list style
    /// mapping file (`name;hex [hex…]` lines).
    pub fn new(
        body: FontMetrics,
        emphasis: FontMetrics,
        mono: FontMetrics,
        glyphlist: &str,
    ) -> Result<Self, FoldoutError> {
        let mapping = glyphlist::glyph_mapping(&[&body, &emphasis, &mono], glyphlist)?;

        // The fallback must resolve in every font, or layout can fail at
        // an arbitrary point mid-run. Reject the set up front instead.
        for font in [&body, &emphasis, &mono] {
            if !font.glyphs.contains_key(FALLBACK_GLYPH) {
                return Err(FoldoutError::GlyphResolutionFailure {
                    font: font.name.clone(),
                    glyph: FALLBACK_GLYPH.to_string(),
                });
            }
        }

        Ok(Self {
            body,
            emphasis,
            mono,
            mapping,
        })
    }

    pub fn font(&self, role: FontRole) -> &FontMetrics {
        match role {
            FontRole::Body => &self.body,
            FontRole::Emphasis => &self.emphasis,
            FontRole::Mono => &self.mono,
        }
    }

    /// Resolve a character to a glyph in the given role's font, falling
    /// back to [`FALLBACK_GLYPH`] when the character is unmapped or the
    /// font lacks the mapped glyph.
    pub fn resolve(&self, role: FontRole, ch: char) -> Result<&GlyphMetrics, FoldoutError> {
        let font = self.font(role);
        if let Some(name) = self.mapping.get(&ch) {
            if let Some(glyph) = font.glyph(name) {
                return Ok(glyph);
            }
        }
        font.glyph(FALLBACK_GLYPH)
            .ok_or_else(|| FoldoutError::GlyphResolutionFailure {
                font: font.name.clone(),
                glyph: FALLBACK_GLYPH.to_string(),
            })
    }

    /// Width of the body font's word space, in 1/1000 em units.
    ///
    /// Line costs and materialization both measure gaps with this width
    /// regardless of which fonts surround the gap.
    pub fn body_space_width(&self) -> Result<f64, FoldoutError> {
        self.body
            .space_width()
            .ok_or_else(|| FoldoutError::GlyphResolutionFailure {
                font: self.body.name.clone(),
                glyph: "space".to_string(),
            })
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    use super::*;

    /// A small AFM covering printable ASCII-ish needs plus a ligature and
    /// a kern pair, with every width set to a round number so expected
    /// values in tests stay readable.
    pub fn small_afm(name: &str) -> String {
        format!(
            "StartFontMetrics 4.1\n\
             FontName {name}\n\
             CapHeight 700\n\
             Ascender 720\n\
             Descender -200\n\
             StdVW 85\n\
             FontBBox -100 -250 1100 900\n\
             StartCharMetrics 12\n\
             C 32 ; WX 250 ; N space ; B 0 0 0 0 ;\n\
             C 44 ; WX 250 ; N comma ; B 0 -100 200 100 ;\n\
             C 40 ; WX 300 ; N parenleft ; B 0 -150 250 700 ;\n\
             C 41 ; WX 300 ; N parenright ; B 0 -150 250 700 ;\n\
             C 63 ; WX 450 ; N question ; B 0 0 400 700 ;\n\
             C 65 ; WX 600 ; N A ; B 0 0 600 700 ;\n\
             C 86 ; WX 650 ; N V ; B 0 0 650 700 ;\n\
             C 101 ; WX 400 ; N e ; B 0 0 380 480 ;\n\
             C 102 ; WX 350 ; N f ; B 0 0 340 700 ; L i fi ;\n\
             C 105 ; WX 250 ; N i ; B 0 0 230 700 ;\n\
             C 111 ; WX 450 ; N o ; B 0 0 430 480 ;\n\
             C -1 ; WX 550 ; N fi ; B 0 0 540 700 ;\n\
             EndCharMetrics\n\
             StartKernPairs 1\n\
             KPX A V -80\n\
             EndKernPairs\n\
             EndFontMetrics\n"
        )
    }

    pub const SMALL_GLYPHLIST: &str = "# test glyph list\n\
        space;0020\n\
        comma;002C\n\
        parenleft;0028\n\
        parenright;0029\n\
        question;003F\n\
        A;0041\n\
        V;0056\n\
        e;0065\n\
        f;0066\n\
        i;0069\n\
        o;006F\n\
        fi;FB01\n";

    pub fn small_font_set() -> FontSet {
        let body = afm::parse(&small_afm("Test-Roman"), "FR").unwrap();
        let emphasis = afm::parse(&small_afm("Test-Bold"), "FB").unwrap();
        let mono = afm::parse(&small_afm("Test-Mono"), "FT").unwrap();
        FontSet::new(body, emphasis, mono, SMALL_GLYPHLIST).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::testutil::*;
    use super::*;

    #[test]
    fn test_resolve_known_character() {
        let fonts = small_font_set();
        let glyph = fonts.resolve(FontRole::Body, 'A').unwrap();
        assert_eq!(glyph.name, "A");
        assert_eq!(glyph.width, 600);
    }

    #[test]
    fn test_resolve_unknown_character_falls_back() {
        let fonts = small_font_set();
        let glyph = fonts.resolve(FontRole::Body, 'Z').unwrap();
        assert_eq!(glyph.name, FALLBACK_GLYPH);
    }

    #[test]
    fn test_missing_fallback_is_fatal() {
        let strip = |name: &str| {
            let mut font = afm::parse(&small_afm(name), "FR").unwrap();
            font.glyphs.remove(FALLBACK_GLYPH);
            font
        };
        let body = strip("Test-Roman");
        let emphasis = afm::parse(&small_afm("Test-Bold"), "FB").unwrap();
        let mono = afm::parse(&small_afm("Test-Mono"), "FT").unwrap();
        let err = FontSet::new(body, emphasis, mono, SMALL_GLYPHLIST).unwrap_err();
        assert!(matches!(
            err,
            FoldoutError::GlyphResolutionFailure { .. }
        ));
    }

    #[test]
    fn test_body_space_width() {
        let fonts = small_font_set();
        assert!((fonts.body_space_width().unwrap() - 250.0).abs() < 1e-9);
    }
}
