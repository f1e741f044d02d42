//! # Layout Configuration
//!
//! Page and column geometry plus all tunable multipliers, deserializable
//! from JSON. Units are PostScript points (1/72 inch) unless a field name
//! says "multiplier", in which case it scales the current font size.
//!
//! A config is validated once, up front. Anything that would later divide
//! by zero or panic on an unhandled font pairing is rejected here instead.

use serde::{Deserialize, Serialize};

use crate::error::FoldoutError;
use crate::font::FontRole;

/// Page/column geometry and the tunables that drive the font-size search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    /// Page width in points. Default is US letter (612 × 792).
    pub page_width: f64,
    /// Page height in points.
    pub page_height: f64,
    pub top_margin: f64,
    pub bottom_margin: f64,
    pub left_margin: f64,
    pub right_margin: f64,
    /// Number of pages available for the listing.
    pub pages: usize,
    pub columns_per_page: usize,
    /// Horizontal gap between adjacent columns, in points.
    pub column_sep: f64,
    /// Baseline-to-baseline distance as a multiple of the font size.
    pub leading_multiplier: f64,
    /// How far a space may be squeezed before a line is infeasible.
    pub minimum_space_multiplier: f64,
    /// How far lines may be squeezed together before a column is infeasible.
    pub minimum_line_height_multiplier: f64,
    /// Continuation lines of an entry are indented by this many ems.
    pub first_line_dedent_multiplier: f64,
    pub starting_font_size: f64,
    pub minimum_font_size: f64,
    pub maximum_font_size: f64,
    /// The search stops once the feasible bracket is narrower than this.
    pub font_size_tolerance: f64,
    /// When a space is inserted between boxes of different fonts, it is
    /// attributed to whichever neighbor's role appears first in this list.
    pub space_priority: Vec<FontRole>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page_width: 612.0,
            page_height: 792.0,
            top_margin: 72.0,
            bottom_margin: 54.0,
            left_margin: 36.0,
            right_margin: 36.0,
            pages: 2,
            columns_per_page: 2,
            column_sep: 10.0,
            leading_multiplier: 1.15,
            minimum_space_multiplier: 0.65,
            minimum_line_height_multiplier: 0.9,
            first_line_dedent_multiplier: 2.0,
            starting_font_size: 10.0,
            minimum_font_size: 1.0,
            maximum_font_size: 100.0,
            font_size_tolerance: 0.01,
            space_priority: vec![FontRole::Body, FontRole::Emphasis, FontRole::Mono],
        }
    }
}

impl LayoutConfig {
    /// Width of one column in points, margins and separators subtracted.
    pub fn column_width(&self) -> f64 {
        let inner = self.page_width
            - self.left_margin
            - self.right_margin
            - self.column_sep * (self.columns_per_page as f64 - 1.0);
        inner / self.columns_per_page as f64
    }

    /// Height of one column in points.
    pub fn column_height(&self) -> f64 {
        self.page_height - self.top_margin - self.bottom_margin
    }

    /// Total number of columns across all pages.
    pub fn column_budget(&self) -> usize {
        self.pages * self.columns_per_page
    }

    /// Reject geometry and tunables that would make layout meaningless.
    pub fn validate(&self) -> Result<(), FoldoutError> {
        if self.pages == 0 || self.columns_per_page == 0 {
            return Err(FoldoutError::Config(
                "pages and columnsPerPage must both be at least 1".into(),
            ));
        }
        if self.column_width() <= 0.0 {
            return Err(FoldoutError::Config(format!(
                "column width is {:.3}pt after margins and separators; must be positive",
                self.column_width()
            )));
        }
        if self.column_height() <= 0.0 {
            return Err(FoldoutError::Config(format!(
                "column height is {:.3}pt after margins; must be positive",
                self.column_height()
            )));
        }
        if !(self.minimum_space_multiplier > 0.0 && self.minimum_space_multiplier <= 1.0) {
            return Err(FoldoutError::Config(
                "minimumSpaceMultiplier must be in (0, 1]".into(),
            ));
        }
        if self.leading_multiplier <= 0.0 || self.minimum_line_height_multiplier <= 0.0 {
            return Err(FoldoutError::Config(
                "leadingMultiplier and minimumLineHeightMultiplier must be positive".into(),
            ));
        }
        if self.first_line_dedent_multiplier < 0.0 {
            return Err(FoldoutError::Config(
                "firstLineDedentMultiplier must not be negative".into(),
            ));
        }
        if !(self.minimum_font_size > 0.0
            && self.minimum_font_size <= self.starting_font_size
            && self.starting_font_size <= self.maximum_font_size)
        {
            return Err(FoldoutError::Config(
                "font sizes must satisfy 0 < minimum <= starting <= maximum".into(),
            ));
        }
        if self.font_size_tolerance <= 0.0 {
            return Err(FoldoutError::Config(
                "fontSizeTolerance must be positive".into(),
            ));
        }

        // Every role must appear exactly once so that space attribution
        // between any pair of fonts is decided up front.
        for role in FontRole::ALL {
            match self.space_priority.iter().filter(|r| **r == role).count() {
                1 => {}
                0 => {
                    return Err(FoldoutError::Config(format!(
                        "spacePriority is missing the {role:?} role"
                    )))
                }
                _ => {
                    return Err(FoldoutError::Config(format!(
                        "spacePriority lists the {role:?} role more than once"
                    )))
                }
            }
        }

        Ok(())
    }

    /// Rank of a role in the space-attribution priority list. Lower wins.
    ///
    /// Only meaningful after `validate` has passed.
    pub fn priority_rank(&self, role: FontRole) -> usize {
        self.space_priority
            .iter()
            .position(|r| *r == role)
            .unwrap_or(usize::MAX)
    }
}
