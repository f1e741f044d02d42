//! # AFM Parsing
//!
//! A parser for Adobe Font Metrics files: the font-wide header keys, the
//! `StartCharMetrics` glyph table (widths, bounding boxes, ligature `L`
//! clauses), and the `StartKernPairs` kerning table.
//!
//! Only the keys the layout engine needs are interpreted; everything else
//! in the file is skipped without complaint, since AFM files carry plenty
//! of fields (comments, composites, track kerning) we never look at.

use std::collections::HashMap;

use crate::error::FoldoutError;
use crate::font::{FontMetrics, GlyphMetrics};

/// Parse an AFM file into font metrics, attaching the given resource label.
pub fn parse(file: &str, label: &str) -> Result<FontMetrics, FoldoutError> {
    let mut font = FontMetrics {
        name: String::new(),
        label: label.to_string(),
        glyphs: HashMap::new(),
        cap_height: 0,
        ascent: 0,
        descent: 0,
        stem_v: 0,
        italic_angle: 0,
        bbox: [0; 4],
        // nonsymbolic, serif
        flags: 1 << 1 | 1 << 5,
    };

    let mut lines = file.lines().map(str::trim);
    while let Some(line) = lines.next() {
        let mut fields = line.split_whitespace();
        let key = fields.next().unwrap_or("");
        match key {
            "FontName" => {
                if let Some(name) = fields.next() {
                    font.name = name.to_string();
                }
            }
            "CapHeight" => font.cap_height = parse_int(fields.next(), line)?,
            "Ascender" => font.ascent = parse_int(fields.next(), line)?,
            "Descender" => font.descent = parse_int(fields.next(), line)?,
            "StdVW" => font.stem_v = parse_int(fields.next(), line)?,
            // Oblique faces commonly carry fractional angles.
            "ItalicAngle" => font.italic_angle = parse_float(fields.next(), line)?.round() as i32,
            "FontBBox" => {
                for slot in &mut font.bbox {
                    *slot = parse_int(fields.next(), line)?;
                }
            }
            "IsFixedPitch" => {
                if fields.next() == Some("true") {
                    font.flags |= 1;
                }
            }
            "StartCharMetrics" => {
                let count = parse_int(fields.next(), line)? as usize;
                for _ in 0..count {
                    let glyph_line = lines.next().ok_or_else(|| {
                        FoldoutError::FontParse("char metrics ended early".into())
                    })?;
                    add_glyph(&mut font, glyph_line)?;
                }
            }
            "StartKernPairs" => {
                let count = parse_int(fields.next(), line)? as usize;
                let mut seen = 0;
                while seen < count {
                    let kern_line = lines.next().ok_or_else(|| {
                        FoldoutError::FontParse("kern pairs ended early".into())
                    })?;
                    if kern_line.is_empty() {
                        continue;
                    }
                    add_kerning(&mut font, kern_line)?;
                    seen += 1;
                }
            }
            _ => {}
        }
    }

    Ok(font)
}

/// Parse one glyph metric line, e.g.
/// `C 102 ; WX 333 ; N f ; B 20 0 383 683 ; L i fi ; L l fl ;`
fn add_glyph(font: &mut FontMetrics, line: &str) -> Result<(), FoldoutError> {
    let mut glyph = GlyphMetrics::default();

    for clause in line.split(';') {
        let clause = clause.trim();
        if clause.is_empty() {
            continue;
        }
        let mut fields = clause.split_whitespace();
        let key = fields.next().unwrap_or("");
        match key {
            "C" => {
                let code = parse_int(fields.next(), line)?;
                glyph.code = u32::try_from(code).ok();
            }
            "CH" => {
                let hex = fields.next().unwrap_or("");
                let hex = hex.trim_start_matches('<').trim_end_matches('>');
                glyph.code = u32::from_str_radix(hex, 16).ok();
            }
            "WX" => glyph.width = parse_int(fields.next(), line)?,
            "N" => {
                glyph.name = fields
                    .next()
                    .ok_or_else(|| {
                        FoldoutError::FontParse(format!("glyph name missing in [{line}]"))
                    })?
                    .to_string();
            }
            "B" => {
                for slot in &mut glyph.bbox {
                    *slot = parse_int(fields.next(), line)?;
                }
            }
            "L" => {
                let next = fields.next();
                let combined = fields.next();
                match (next, combined) {
                    (Some(next), Some(combined)) => {
                        glyph.ligatures.insert(next.to_string(), combined.to_string());
                    }
                    _ => {
                        return Err(FoldoutError::FontParse(format!(
                            "malformed ligature clause in [{line}]"
                        )))
                    }
                }
            }
            _ => {
                return Err(FoldoutError::FontParse(format!(
                    "unknown glyph metric field [{clause}] in [{line}]"
                )))
            }
        }
    }

    if glyph.name.is_empty() {
        return Err(FoldoutError::FontParse(format!(
            "no glyph name in metric line [{line}]"
        )));
    }

    // Some AFM files list a glyph twice (once encoded, once not); keep the
    // copy that carries a printable ASCII code.
    match font.glyphs.get(&glyph.name) {
        Some(existing) if existing.ascii_code().is_some() => {}
        _ => {
            font.glyphs.insert(glyph.name.clone(), glyph);
        }
    }

    Ok(())
}

/// Parse one kern pair line, e.g. `KPX f i -20`.
fn add_kerning(font: &mut FontMetrics, line: &str) -> Result<(), FoldoutError> {
    let mut fields = line.split_whitespace();
    if fields.next() != Some("KPX") {
        return Err(FoldoutError::FontParse(format!(
            "unknown kerning line [{line}]"
        )));
    }
    let left = fields
        .next()
        .ok_or_else(|| FoldoutError::FontParse(format!("truncated kerning line [{line}]")))?;
    let right = fields
        .next()
        .ok_or_else(|| FoldoutError::FontParse(format!("truncated kerning line [{line}]")))?;
    let adjust = parse_int(fields.next(), line)?;

    let glyph = font.glyphs.get_mut(left).ok_or_else(|| {
        FoldoutError::FontParse(format!("kerning for unknown glyph in [{line}]"))
    })?;
    glyph.kerning.insert(right.to_string(), adjust);
    Ok(())
}

fn parse_int(field: Option<&str>, line: &str) -> Result<i32, FoldoutError> {
    field
        .and_then(|f| f.parse::<i32>().ok())
        .ok_or_else(|| FoldoutError::FontParse(format!("expected integer in [{line}]")))
}

fn parse_float(field: Option<&str>, line: &str) -> Result<f64, FoldoutError> {
    field
        .and_then(|f| f.parse::<f64>().ok())
        .ok_or_else(|| FoldoutError::FontParse(format!("expected number in [{line}]")))
}
