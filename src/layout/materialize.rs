//! # Line Materialization
//!
//! After breaking decides where each line ends, the boxes on a line are
//! still separate words. This pass welds them back together: same-font
//! neighbors merge into one box with an explicit (possibly squeezed)
//! space so ligatures and kerning apply across the seam, and a space
//! between different fonts is attributed to one side by role priority.
//!
//! Simplification is idempotent. Once a space has crossed a font change
//! the left box is marked joined, so a second pass leaves the pair alone.

use crate::config::LayoutConfig;
use crate::error::FoldoutError;
use crate::font::{FontEncoder, FontSet};
use crate::text::TextBox;

/// Slice every entry into its lines and simplify each one. The first
/// line of an entry is full width; continuation lines are indented.
pub fn split_into_lines(
    entries: &[Vec<TextBox>],
    line_breaks: &[Vec<usize>],
    fonts: &FontSet,
    config: &LayoutConfig,
    font_size: f64,
    enc: &mut FontEncoder,
) -> Result<Vec<Vec<Vec<TextBox>>>, FoldoutError> {
    let first_width = config.column_width() * 1000.0 / font_size;
    let rest_width = first_width - config.first_line_dedent_multiplier * 1000.0;

    let mut out = Vec::with_capacity(entries.len());
    for (entry, breaks) in entries.iter().zip(line_breaks) {
        let mut lines = Vec::with_capacity(breaks.len());
        for (j, &start) in breaks.iter().enumerate() {
            let end = breaks.get(j + 1).copied().unwrap_or(entry.len());
            let width = if j == 0 { first_width } else { rest_width };
            lines.push(simplify_line(&entry[start..end], width, fonts, config, enc)?);
        }
        out.push(lines);
    }
    Ok(out)
}

/// Replace implicit inter-box gaps with real space characters, sized so
/// the line exactly fills its measure when it has to squeeze.
pub fn simplify_line(
    boxes: &[TextBox],
    line_width: f64,
    fonts: &FontSet,
    config: &LayoutConfig,
    enc: &mut FontEncoder,
) -> Result<Vec<TextBox>, FoldoutError> {
    let space_size = fonts.body_space_width()?;

    let mut natural = 0.0;
    let mut gaps = 0.0;
    for (i, b) in boxes.iter().enumerate() {
        natural += b.width;
        if !b.join_next && i + 1 < boxes.len() {
            gaps += 1.0;
        }
    }

    // Every gap is squeezed by the same factor, so spacing stays even
    // across font changes.
    let max_width = natural + gaps * space_size;
    let space_factor = if max_width > line_width && gaps > 0.0 {
        let extra = max_width - line_width;
        (space_size - extra / gaps) / space_size
    } else {
        1.0
    };

    let mut work = boxes.to_vec();
    let mut simple = Vec::new();
    let mut i = 0;
    while i < work.len() {
        if i + 1 == work.len() {
            simple.push(work[i].clone());
            break;
        }

        let current = work[i].clone();
        let next = &work[i + 1];

        if current.join_next && current.role != next.role {
            // A cross-font join is already as tight as it gets; the two
            // commands simply render back to back.
            simple.push(current);
        } else if current.join_next || current.role == next.role {
            // Merge into one box, with a space in the gap case, and
            // remeasure so ligatures and kerning span the seam.
            let mut text = current.text.clone();
            if !current.join_next {
                text.push(' ');
            }
            text.push_str(&next.text);
            let join = next.join_next;
            let mut merged = fonts.make_box(current.role, &text, space_factor, enc)?;
            merged.join_next = join;
            work[i + 1] = merged;
        } else {
            // Different fonts with a space between. Give the space to
            // the higher-priority side, then mark the pair joined so
            // this decision sticks.
            if config.priority_rank(current.role) <= config.priority_rank(next.role) {
                let mut text = current.text.clone();
                text.push(' ');
                let mut owner = fonts.make_box(current.role, &text, space_factor, enc)?;
                owner.join_next = true;
                simple.push(owner);
            } else {
                let mut text = String::from(" ");
                text.push_str(&next.text);
                let join = next.join_next;
                let mut owner = fonts.make_box(next.role, &text, space_factor, enc)?;
                owner.join_next = join;
                work[i + 1] = owner;
                let mut left = current;
                left.join_next = true;
                simple.push(left);
            }
        }
        i += 1;
    }

    Ok(simple)
}
