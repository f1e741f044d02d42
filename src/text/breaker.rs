//! # Optimal Segmentation
//!
//! The generic O(n²) dynamic program that splits a sequence into
//! contiguous chunks at minimum total cost. It is instantiated twice: over
//! an entry's boxes with [`LineCosts`] (line breaking) and over per-entry
//! line counts with [`ColumnCosts`] (column breaking).
//!
//! The inner scan stops early once a chunk's cost goes infinite, on the
//! assumption that costs never become finite again as a chunk grows. Both
//! cost functions honor that: a chunk that is merely *unbreakable at its
//! end* (join-next) reports `f64::MAX` instead of infinity, because
//! extending it can make it breakable again.

use crate::text::TextBox;

/// A sequence the breaker can partition.
pub trait Segmentable {
    fn len(&self) -> usize;
    /// Cost of making `[from, to)` one chunk. `first`/`last` flag the
    /// chunks touching the ends of the whole sequence. Infinity means
    /// infeasible.
    fn cost(&self, from: usize, to: usize, first: bool, last: bool) -> f64;
}

#[derive(Clone, Copy)]
struct Breakpoint {
    cost: f64,
    /// Start of the next chunk, for reconstructing the partition.
    next: usize,
}

/// Compute the minimum-cost partition of the sequence into contiguous
/// chunks. Returns the start index of each chunk, or `None` when the
/// sequence is empty or no feasible partition exists.
pub fn break_sequence<S: Segmentable>(seq: &S) -> Option<Vec<usize>> {
    solve(seq, true)
}

fn solve<S: Segmentable>(seq: &S, early_exit: bool) -> Option<Vec<usize>> {
    let dim = seq.len();
    if dim == 0 {
        return None;
    }

    // matrix[from][to] = best cost of partitioning [from, to], stored in
    // one flat arena and index-addressed.
    let mut matrix = vec![
        Breakpoint {
            cost: f64::INFINITY,
            next: usize::MAX,
        };
        dim * dim
    ];

    for from in (0..dim).rev() {
        for to in (from..dim).rev() {
            let mut best = Breakpoint {
                cost: f64::INFINITY,
                next: usize::MAX,
            };
            for i in from..=to {
                let mut cost = seq.cost(from, i + 1, from == 0, i + 1 == dim);
                if early_exit && cost.is_infinite() {
                    // A longer chunk will not fit any better.
                    break;
                }
                if i + 1 <= to {
                    cost += matrix[(i + 1) * dim + to].cost;
                }
                if cost < best.cost {
                    best = Breakpoint { cost, next: i + 1 };
                }
            }
            matrix[from * dim + to] = best;
        }
    }

    if matrix[dim - 1].cost.is_infinite() {
        return None;
    }

    let mut starts = Vec::new();
    let mut next = 0;
    while next < dim {
        starts.push(next);
        next = matrix[next * dim + dim - 1].next;
    }
    Some(starts)
}

/// Line-breaking costs over one entry's boxes, in font-size-normalized
/// units (1/1000 em).
pub struct LineCosts<'a> {
    pub boxes: &'a [TextBox],
    /// Column width × 1000 / font size.
    pub line_width: f64,
    /// Continuation-line indent in the same units.
    pub dedent: f64,
    /// Width of one word space.
    pub space_width: f64,
    /// How far a space may be squeezed, as a fraction of its width.
    pub minimum_space: f64,
}

impl Segmentable for LineCosts<'_> {
    fn len(&self) -> usize {
        self.boxes.len()
    }

    fn cost(&self, from: usize, to: usize, first: bool, last: bool) -> f64 {
        let words = &self.boxes[from..to];

        // No break is allowed after a joined box. Not infinity: one more
        // box can complete the join and make the chunk breakable.
        if words[words.len() - 1].join_next {
            return f64::MAX;
        }

        let mut natural = 0.0;
        let mut gaps = 0.0;
        for (i, b) in words.iter().enumerate() {
            natural += b.width;
            if !b.join_next && i + 1 < words.len() {
                gaps += 1.0;
            }
        }
        let max_width = natural + gaps * self.space_width;
        let min_width = natural + gaps * self.space_width * self.minimum_space;

        let width = if first {
            self.line_width
        } else {
            self.line_width - self.dedent
        };

        // Declining a discouraged break costs as much as that many blank
        // lines of slack.
        let blank = width / self.space_width;
        let penalty = blank * blank * f64::from(words[words.len() - 1].penalty);

        if min_width > width {
            f64::INFINITY
        } else if max_width <= width {
            // Trailing slack on the entry's final line is free; justified
            // text never stretches its last line.
            let excess = if last {
                0.0
            } else {
                (width - max_width) / self.space_width
            };
            excess * excess + penalty
        } else {
            // Squeezing is worse than stretching.
            let squeeze = (max_width - width) / self.space_width;
            squeeze * squeeze * squeeze + penalty
        }
    }
}

/// Column-breaking costs over per-entry line counts, normalized so one
/// line per 1000 units of column height costs nothing.
pub struct ColumnCosts<'a> {
    pub line_counts: &'a [usize],
    /// Column height × 1000 / font size.
    pub column_height: f64,
    /// Baseline-to-baseline distance as a multiple of the font size.
    pub leading: f64,
    /// Lines may not be squeezed below this fraction of the leading.
    pub minimum_line_height: f64,
}

impl Segmentable for ColumnCosts<'_> {
    fn len(&self) -> usize {
        self.line_counts.len()
    }

    fn cost(&self, from: usize, to: usize, _first: bool, _last: bool) -> f64 {
        let count: usize = self.line_counts[from..to].iter().sum();
        if count == 0 {
            return f64::INFINITY;
        }

        let headroom = self.column_height / 1000.0 - 1.0;
        let needed = (count as f64 - 1.0) * self.leading;

        // The implied per-line scale; a single line divides by zero and
        // comes out infinitely roomy, which is correct.
        let scale = headroom / needed;
        if scale < self.minimum_line_height {
            return f64::INFINITY;
        }

        let extra = headroom - needed;
        if extra < 0.0 {
            -extra * extra * extra
        } else {
            extra * extra
        }
    }
}
