//! Shared unicode→glyph-name mapping.
//!
//! The mapping is derived once for a whole font set from an Adobe glyph
//! list (`name;hex [hex…]` lines). When two glyph names claim the same
//! code point, a name known to *every* font in the set beats a name only
//! some fonts know; between equals, the first writer in file order wins,
//! which keeps the result deterministic.

use std::collections::{HashMap, HashSet};

use crate::error::FoldoutError;
use crate::font::FontMetrics;

/// Build the unicode→glyph-name mapping shared by all fonts in a set.
pub fn glyph_mapping(
    fonts: &[&FontMetrics],
    glyphlist: &str,
) -> Result<HashMap<char, String>, FoldoutError> {
    let mut known: HashSet<&str> = HashSet::new();
    for font in fonts {
        known.extend(font.glyphs.keys().map(String::as_str));
    }

    let universal: HashSet<&str> = known
        .iter()
        .copied()
        .filter(|name| fonts.iter().all(|f| f.glyphs.contains_key(*name)))
        .collect();

    let mut mapping: HashMap<char, String> = HashMap::new();
    for (lineno, line) in glyphlist.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (name, codes) = line.split_once(';').ok_or_else(|| {
            FoldoutError::FontParse(format!(
                "glyph list line {}: expected name;codes, got [{line}]",
                lineno + 1
            ))
        })?;
        let name = name.trim();
        if !known.contains(name) {
            continue;
        }
        for code in codes.split_whitespace() {
            let n = u32::from_str_radix(code, 16).map_err(|e| {
                FoldoutError::FontParse(format!(
                    "glyph list line {}: bad code [{code}]: {e}",
                    lineno + 1
                ))
            })?;
            let Some(ch) = char::from_u32(n) else {
                continue;
            };
            match mapping.get(&ch) {
                // A universal name displaces a partial one; otherwise the
                // earlier entry stands.
                Some(existing)
                    if !universal.contains(existing.as_str()) && universal.contains(name) =>
                {
                    mapping.insert(ch, name.to_string());
                }
                Some(_) => {}
                None => {
                    mapping.insert(ch, name.to_string());
                }
            }
        }
    }

    Ok(mapping)
}
