//! # Layout
//!
//! Drives the whole fitting process: break every entry into lines, break
//! the entries into columns, and search for the largest font size at
//! which everything still fits on the configured pages.
//!
//! The search brackets by factors of √2 and then bisects. Layout cost is
//! dominated by the quadratic breakers, so the round count is logged for
//! tuning tolerance against runtime.

pub mod column;
pub mod materialize;

use crate::config::LayoutConfig;
use crate::error::FoldoutError;
use crate::font::FontSet;
use crate::text::breaker::{break_sequence, ColumnCosts, LineCosts};
use crate::text::TextBox;

/// The winning font size and the breaks found at it.
#[derive(Debug, Clone)]
pub struct LayoutResult {
    pub font_size: f64,
    /// Number of trial layouts the search ran.
    pub rounds: u32,
    /// Per entry, the box index starting each line.
    pub line_breaks: Vec<Vec<usize>>,
    /// The entry index starting each column.
    pub column_breaks: Vec<usize>,
}

pub struct LayoutEngine<'a> {
    fonts: &'a FontSet,
    config: &'a LayoutConfig,
    space_width: f64,
}

impl<'a> LayoutEngine<'a> {
    pub fn new(fonts: &'a FontSet, config: &'a LayoutConfig) -> Result<Self, FoldoutError> {
        config.validate()?;
        let space_width = fonts.body_space_width()?;
        Ok(LayoutEngine {
            fonts,
            config,
            space_width,
        })
    }

    pub fn fonts(&self) -> &FontSet {
        self.fonts
    }

    /// Try one font size. Returns the line breaks per entry and the
    /// column breaks, or `None` when any entry cannot be broken or the
    /// columns exceed the page budget.
    pub fn do_layout(
        &self,
        entries: &[Vec<TextBox>],
        font_size: f64,
    ) -> Option<(Vec<Vec<usize>>, Vec<usize>)> {
        let line_width = self.config.column_width() * 1000.0 / font_size;
        let dedent = self.config.first_line_dedent_multiplier * 1000.0;

        let mut line_breaks = Vec::with_capacity(entries.len());
        for boxes in entries {
            let costs = LineCosts {
                boxes,
                line_width,
                dedent,
                space_width: self.space_width,
                minimum_space: self.config.minimum_space_multiplier,
            };
            line_breaks.push(break_sequence(&costs)?);
        }

        let line_counts: Vec<usize> = line_breaks.iter().map(Vec::len).collect();
        log::trace!(
            "size {font_size:.3}: {} entries broke into {} lines",
            entries.len(),
            line_counts.iter().sum::<usize>()
        );
        let costs = ColumnCosts {
            line_counts: &line_counts,
            column_height: self.config.column_height() * 1000.0 / font_size,
            leading: self.config.leading_multiplier,
            minimum_line_height: self.config.minimum_line_height_multiplier,
        };
        let column_breaks = break_sequence(&costs)?;

        if column_breaks.len() > self.config.column_budget() {
            return None;
        }
        Some((line_breaks, column_breaks))
    }

    /// Find the largest font size at which the entries fit, to within
    /// the configured tolerance.
    pub fn find_font_size(&self, entries: &[Vec<TextBox>]) -> Result<LayoutResult, FoldoutError> {
        let mut low = self.config.starting_font_size;
        let mut high = low;
        let mut rounds = 1;

        if self.do_layout(entries, low).is_some() {
            // Content fits at the starting size. Push the upper bound
            // out until it breaks.
            loop {
                high *= std::f64::consts::SQRT_2;
                if high > self.config.maximum_font_size {
                    return Err(FoldoutError::NotEnoughContentForPageCount {
                        maximum: self.config.maximum_font_size,
                    });
                }
                rounds += 1;
                log::debug!("round {rounds}: probing upper bound {high:.3}");
                if self.do_layout(entries, high).is_none() {
                    break;
                }
                low = high;
            }
        } else {
            // Too big already. Pull the lower bound in until it fits.
            loop {
                low /= std::f64::consts::SQRT_2;
                if low < self.config.minimum_font_size {
                    return Err(FoldoutError::ContentTooLargeForPages {
                        minimum: self.config.minimum_font_size,
                    });
                }
                rounds += 1;
                log::debug!("round {rounds}: probing lower bound {low:.3}");
                if self.do_layout(entries, low).is_some() {
                    break;
                }
                high = low;
            }
        }

        while high - low > self.config.font_size_tolerance {
            let mid = (high + low) / 2.0;
            rounds += 1;
            log::debug!("round {rounds}: bisecting at {mid:.3}");
            if self.do_layout(entries, mid).is_some() {
                low = mid;
            } else {
                high = mid;
            }
        }

        // One confirming run at the size we will actually use, to get
        // the breaks that belong to it.
        rounds += 1;
        let (line_breaks, column_breaks) =
            self.do_layout(entries, low)
                .ok_or_else(|| FoldoutError::DegenerateLayout(format!(
                    "layout failed at confirmed font size {low:.3}"
                )))?;

        log::debug!(
            "settled on font size {low:.3} after {rounds} rounds, {} columns",
            column_breaks.len()
        );

        Ok(LayoutResult {
            font_size: low,
            rounds,
            line_breaks,
            column_breaks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::testutil::small_font_set;
    use crate::font::{FontEncoder, FontRole};

    fn measured_entries(
        fonts: &crate::font::FontSet,
        enc: &mut FontEncoder,
        words_per_entry: &[usize],
    ) -> Vec<Vec<TextBox>> {
        words_per_entry
            .iter()
            .map(|&n| {
                (0..n)
                    .map(|_| fonts.make_box(FontRole::Body, "offiee", 1.0, enc).unwrap())
                    .collect()
            })
            .collect()
    }

    fn narrow_config() -> LayoutConfig {
        LayoutConfig {
            page_width: 200.0,
            page_height: 200.0,
            top_margin: 10.0,
            bottom_margin: 10.0,
            left_margin: 10.0,
            right_margin: 10.0,
            pages: 1,
            columns_per_page: 2,
            column_sep: 10.0,
            ..LayoutConfig::default()
        }
    }

    #[test]
    fn test_do_layout_two_words_and_a_space() {
        // Column width 85pt at size 10 is 8500 units; two 2150-unit
        // words plus a compressible 250-unit space fit on one line.
        let fonts = small_font_set();
        let mut enc = FontEncoder::new();
        let entries = measured_entries(&fonts, &mut enc, &[2]);
        assert_eq!(entries[0][0].width, 2150.0);

        let config = narrow_config();
        let engine = LayoutEngine::new(&fonts, &config).unwrap();

        let (lines, columns) = engine.do_layout(&entries, 10.0).unwrap();
        assert_eq!(lines, vec![vec![0]]);
        assert_eq!(columns, vec![0]);

        // At 20pt the column is 4250 units and the pair needs at least
        // 4462.5 even with the space fully squeezed, so the words split.
        let (lines, _) = engine.do_layout(&entries, 20.0).unwrap();
        assert_eq!(lines, vec![vec![0, 1]]);
    }

    #[test]
    fn test_do_layout_rejects_overfull_page() {
        let fonts = small_font_set();
        let mut enc = FontEncoder::new();
        let entries = measured_entries(&fonts, &mut enc, &[6, 6, 6, 6, 6, 6, 6, 6]);

        let config = narrow_config();
        let engine = LayoutEngine::new(&fonts, &config).unwrap();
        assert!(engine.do_layout(&entries, 60.0).is_none());
    }

    #[test]
    fn test_find_font_size_brackets_and_bisects() {
        let fonts = small_font_set();
        let mut enc = FontEncoder::new();
        let entries = measured_entries(&fonts, &mut enc, &[4, 4, 4, 4, 3, 4, 2, 4]);

        let config = narrow_config();
        let engine = LayoutEngine::new(&fonts, &config).unwrap();

        let result = engine.find_font_size(&entries).unwrap();
        let size = result.font_size;

        // The answer fits, a tolerance step above it does not.
        assert!(engine.do_layout(&entries, size).is_some());
        assert!(engine
            .do_layout(&entries, size + config.font_size_tolerance * 2.0)
            .is_none());
        assert!(size >= config.minimum_font_size && size <= config.maximum_font_size);
        assert!(result.rounds > 1);
        assert_eq!(result.line_breaks.len(), entries.len());
        assert!(!result.column_breaks.is_empty());
    }

    #[test]
    fn test_find_font_size_too_much_content_errors() {
        let fonts = small_font_set();
        let mut enc = FontEncoder::new();
        // One enormous unbreakable word can never fit a narrow column.
        let entries = vec![vec![fonts
            .make_box(
                FontRole::Body,
                &"offiee".repeat(200),
                1.0,
                &mut enc,
            )
            .unwrap()]];

        let mut config = narrow_config();
        config.minimum_font_size = 4.0;
        let engine = LayoutEngine::new(&fonts, &config).unwrap();

        match engine.find_font_size(&entries) {
            Err(FoldoutError::ContentTooLargeForPages { .. }) => {}
            other => panic!("expected too-large error, got {other:?}"),
        }
    }

    #[test]
    fn test_find_font_size_too_little_content_errors() {
        let fonts = small_font_set();
        let mut enc = FontEncoder::new();
        let entries = measured_entries(&fonts, &mut enc, &[1]);

        let mut config = narrow_config();
        config.maximum_font_size = 20.0;
        let engine = LayoutEngine::new(&fonts, &config).unwrap();

        match engine.find_font_size(&entries) {
            Err(FoldoutError::NotEnoughContentForPageCount { .. }) => {}
            other => panic!("expected not-enough-content error, got {other:?}"),
        }
    }
}
