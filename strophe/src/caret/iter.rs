// Copyright 2025 the Strophe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::ops::Range;

use crate::analysis::CharFlags;
use crate::caret::{Affinity, TextPosition};
use crate::layout::Layout;
use crate::style::{Brush, Direction};

/// One caret cell: the span of a single grapheme in visual order, with
/// the caret positions at its two visual edges.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct CaretStep {
    /// Absolute x of the cell's left edge.
    pub x: f32,
    /// Width of the cell. Graphemes inside a ligature receive an equal
    /// share of the cluster advance.
    pub advance: f32,
    pub left: CaretSide,
    pub right: CaretSide,
}

/// A caret position at one visual edge of a cell.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct CaretSide {
    pub position: TextPosition,
    /// Visual index of the layout run within its line.
    pub run_index: usize,
    /// Index of the cluster's first glyph in the layout glyph array.
    pub glyph_index: usize,
    pub direction: Direction,
}

/// Walks every grapheme boundary on a line in visual order, including
/// boundaries interior to ligatures.
///
/// This is the single primitive behind hit testing, caret rendering and
/// selection geometry. The iterator is finite and non-restartable;
/// rebuild it to walk again.
pub struct CaretIter<'a, B: Brush> {
    layout: &'a Layout<B>,
    item_range: Range<usize>,
    item_cursor: usize,
    /// Visual cluster position within the current item.
    visual_cluster: usize,
    /// Visual grapheme position within the current cluster.
    grapheme: usize,
    x: f32,
}

impl<'a, B: Brush> CaretIter<'a, B> {
    pub(crate) fn new(layout: &'a Layout<B>, line_index: usize) -> Self {
        let item_range = layout
            .data
            .lines
            .get(line_index)
            .map(|line| line.item_range.clone())
            .unwrap_or(0..0);
        Self {
            layout,
            item_cursor: item_range.start,
            item_range,
            visual_cluster: 0,
            grapheme: 0,
            x: 0.,
        }
    }

    /// Advances to the next grapheme cell.
    #[expect(clippy::should_implement_trait, reason = "explicit state struct")]
    pub fn next(&mut self) -> Option<CaretStep> {
        loop {
            if self.item_cursor >= self.item_range.end {
                return None;
            }
            let data = &self.layout.data;
            let item = &data.line_items[self.item_cursor];
            let entering = self.visual_cluster == 0 && self.grapheme == 0;
            if entering {
                self.x = item.x;
            }
            if item.synthetic || item.cluster_range.is_empty() {
                self.item_cursor += 1;
                self.visual_cluster = 0;
                self.grapheme = 0;
                continue;
            }
            let len = item.cluster_range.len();
            if self.visual_cluster >= len {
                self.item_cursor += 1;
                self.visual_cluster = 0;
                self.grapheme = 0;
                continue;
            }
            let rtl = item.is_rtl();
            let logical_cluster = if rtl {
                len - 1 - self.visual_cluster
            } else {
                self.visual_cluster
            };
            let cluster = &data.clusters[item.cluster_range.start + logical_cluster];
            let text_range = cluster.text_range();
            let graphemes = grapheme_count(data, text_range.clone());
            if self.grapheme >= graphemes || text_range.is_empty() {
                self.visual_cluster += 1;
                self.grapheme = 0;
                continue;
            }
            let advance = cluster.advance / graphemes as f32;
            let logical_grapheme = if rtl {
                graphemes - 1 - self.grapheme
            } else {
                self.grapheme
            };
            let (start, end) = grapheme_bounds(data, text_range, logical_grapheme);
            let direction = Direction::from_level(item.bidi_level);
            let run_index = self.item_cursor - self.item_range.start;
            let glyph_index = cluster.glyph_range().start;
            let side = |offset, affinity| CaretSide {
                position: TextPosition { offset, affinity },
                run_index,
                glyph_index,
                direction,
            };
            let (left, right) = if rtl {
                (side(end, Affinity::Trailing), side(start, Affinity::Leading))
            } else {
                (side(start, Affinity::Leading), side(end, Affinity::Trailing))
            };
            let x = self.x;
            self.x += advance;
            self.grapheme += 1;
            return Some(CaretStep {
                x,
                advance,
                left,
                right,
            });
        }
    }
}

fn grapheme_count<B: Brush>(
    data: &crate::layout::data::LayoutData<B>,
    range: Range<usize>,
) -> usize {
    if range.is_empty() {
        return 0;
    }
    range
        .filter(|&i| data.props[i].flags.contains(CharFlags::GRAPHEME_BREAK))
        .count()
        .max(1)
}

/// Codepoint bounds of the `index`-th grapheme of a cluster.
fn grapheme_bounds<B: Brush>(
    data: &crate::layout::data::LayoutData<B>,
    range: Range<usize>,
    index: usize,
) -> (usize, usize) {
    let mut start = range.start;
    let mut seen = 0;
    let mut i = range.start;
    while i < range.end {
        if data.props[i].flags.contains(CharFlags::GRAPHEME_BREAK) {
            if seen == index {
                start = i;
                break;
            }
            seen += 1;
        }
        i += 1;
    }
    if seen != index && i >= range.end {
        // Degenerate cluster with no marked boundary.
        start = range.start;
    }
    let mut end = start + 1;
    while end < range.end && !data.props[end].flags.contains(CharFlags::GRAPHEME_BREAK) {
        end += 1;
    }
    (start, end)
}
