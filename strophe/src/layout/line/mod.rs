// Copyright 2025 the Strophe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

pub(crate) mod finish;
pub(crate) mod greedy;

use core::ops::Range;

use crate::layout::data::{BreakReason, LineData};
use crate::layout::{Decoration, Layout, Run};
use crate::style::Brush;
use crate::util::Rect;

/// A finalized line of the layout.
pub struct Line<'a, B: Brush> {
    pub(crate) layout: &'a Layout<B>,
    pub(crate) index: u32,
    pub(crate) data: &'a LineData,
}

impl<B: Brush> Copy for Line<'_, B> {}

impl<B: Brush> Clone for Line<'_, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, B: Brush> Line<'a, B> {
    /// Returns the index of the line within the layout.
    pub fn index(&self) -> usize {
        self.index as usize
    }

    pub fn metrics(&self) -> LineMetrics {
        let data = self.data;
        LineMetrics {
            ascent: data.ascent,
            descent: data.descent,
            leading: data.line_height - (data.descent - data.ascent),
            line_height: data.line_height,
            baseline: data.baseline,
            offset: data.x,
            advance: data.advance,
            trailing_whitespace: data.trailing_whitespace,
            min_coord: data.y,
            max_coord: data.y + data.line_height,
        }
    }

    /// Returns the range of codepoints for the line. Inserted ellipses
    /// are not part of the range.
    pub fn text_range(&self) -> Range<usize> {
        self.data.text_range.clone()
    }

    /// Offset of the start of the last grapheme on the line.
    pub fn last_grapheme_offset(&self) -> usize {
        self.data.last_grapheme_offset
    }

    pub fn break_reason(&self) -> BreakReason {
        self.data.break_reason
    }

    /// Returns `true` if the line was truncated by overflow handling.
    pub fn is_truncated(&self) -> bool {
        self.data.truncated
    }

    /// Returns the number of runs on the line.
    pub fn len(&self) -> usize {
        self.data.item_range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.item_range.is_empty()
    }

    pub fn bounds(&self) -> Rect {
        self.data.bounds
    }

    /// Tight union of the glyph ink bounds on the line.
    pub fn cull_bounds(&self) -> Rect {
        self.data.cull_bounds
    }

    /// A glyph-relative bound large enough to contain any glyph on the
    /// line, for cheap per-glyph culling.
    pub fn common_glyph_bounds(&self) -> Rect {
        self.data.common_glyph_bounds
    }

    /// Returns the run at `index`, in visual order.
    pub fn run(&self, index: usize) -> Option<Run<'a, B>> {
        let item_index = self.data.item_range.start + index;
        if item_index >= self.data.item_range.end {
            return None;
        }
        let item = self.layout.data.line_items.get(item_index)?;
        Some(Run {
            layout: self.layout,
            line_index: self.index,
            index: index as u32,
            data: self.layout.data.runs.get(item.run_index as usize)?,
            item,
        })
    }

    /// Returns an iterator over the runs of the line in visual order.
    pub fn runs(&self) -> impl Iterator<Item = Run<'a, B>> + Clone + 'a {
        let copy = *self;
        (0..self.len()).filter_map(move |index| copy.run(index))
    }

    /// Returns the decorations anchored to the line.
    pub fn decorations(&self) -> &'a [Decoration<B>] {
        &self.layout.data.decorations[self.data.decoration_range.clone()]
    }
}

/// Metrics information for a line.
#[derive(Copy, Clone, Default, Debug)]
pub struct LineMetrics {
    /// Distance above the baseline; non-positive.
    pub ascent: f32,
    /// Distance below the baseline; non-negative.
    pub descent: f32,
    /// Extra space distributed around the ascent-to-descent span.
    pub leading: f32,
    pub line_height: f32,
    /// Absolute y of the dominant baseline.
    pub baseline: f32,
    /// Absolute x of the visual left edge.
    pub offset: f32,
    /// Full advance including trailing whitespace.
    pub advance: f32,
    pub trailing_whitespace: f32,
    /// Top of the line box.
    pub min_coord: f32,
    /// Bottom of the line box.
    pub max_coord: f32,
}

impl LineMetrics {
    /// Width of the line without trailing whitespace.
    pub fn width(&self) -> f32 {
        self.advance - self.trailing_whitespace
    }
}
