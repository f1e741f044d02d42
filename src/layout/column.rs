//! # Column Placement
//!
//! Assigns every simplified line an absolute position on its page.
//! Columns fill left to right within a page; within a column, lines are
//! spread on a uniform grid so the text block exactly fills the column
//! height, top line flush with the top, bottom line flush with the
//! bottom.

use crate::config::LayoutConfig;
use crate::error::FoldoutError;
use crate::font::FontSet;
use crate::text::TextBox;

/// One font run on a placed line.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    /// Resource label of the font, e.g. `FR` for the body face.
    pub font_label: String,
    pub command: String,
}

/// A line pinned to its baseline origin, in points from the page's
/// bottom-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub x: f64,
    pub y: f64,
    pub runs: Vec<TextRun>,
}

/// All the placed lines of one column. The page a column belongs to is
/// its index divided by the columns per page.
#[derive(Debug, Clone, Default)]
pub struct Column {
    pub lines: Vec<PlacedLine>,
}

/// Place every column's lines. `lines` and `column_breaks` come from
/// the materializer and the layout search respectively.
pub fn render_columns(
    lines: &[Vec<Vec<TextBox>>],
    column_breaks: &[usize],
    fonts: &FontSet,
    config: &LayoutConfig,
    font_size: f64,
) -> Result<Vec<Column>, FoldoutError> {
    let mut columns = Vec::with_capacity(column_breaks.len());
    for (i, &start) in column_breaks.iter().enumerate() {
        let end = column_breaks.get(i + 1).copied().unwrap_or(lines.len());
        let number = i % config.columns_per_page;
        columns.push(render_column(
            &lines[start..end],
            number,
            fonts,
            config,
            font_size,
        )?);
    }
    Ok(columns)
}

fn render_column(
    entries: &[Vec<Vec<TextBox>>],
    number: usize,
    fonts: &FontSet,
    config: &LayoutConfig,
    font_size: f64,
) -> Result<Column, FoldoutError> {
    let x = config.left_margin + (config.column_width() + config.column_sep) * number as f64;
    let mut y = config.bottom_margin + config.column_height() - font_size;

    // Continuation lines of an entry start indented.
    let xi = x + font_size * config.first_line_dedent_multiplier;

    let count: usize = entries.iter().map(Vec::len).sum();
    if count == 0 {
        return Err(FoldoutError::DegenerateLayout(
            "column with no lines".into(),
        ));
    }

    // Spread the lines to exactly fill the column. A single line stays
    // pinned at the top.
    let dy = if count == 1 {
        0.0
    } else {
        (config.column_height() - font_size) / (count as f64 - 1.0)
    };

    let mut column = Column::default();
    for entry in entries {
        for (i, line) in entry.iter().enumerate() {
            let runs = line
                .iter()
                .map(|b| TextRun {
                    font_label: fonts.font(b.role).label.clone(),
                    command: b.command.clone(),
                })
                .collect();
            column.lines.push(PlacedLine {
                x: if i == 0 { x } else { xi },
                y,
                runs,
            });
            y -= dy;
        }
    }
    Ok(column)
}
