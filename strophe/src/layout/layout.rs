// Copyright 2025 the Strophe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::cmp::Ordering;
use core::ops::Range;

use crate::analysis::{CharFlags, CharProps};
use crate::layout::data::LayoutData;
use crate::layout::{Decoration, Glyph, Line};
use crate::resolve::RunStyle;
use crate::style::{Brush, Direction};

/// A built text layout: positioned glyphs arranged in lines, plus the
/// read-only caret and selection queries over them.
///
/// A layout is created empty, populated by a
/// [`LayoutContext`](crate::LayoutContext) build, and read-only
/// afterwards; [`Layout::clear`] resets it for reuse.
pub struct Layout<B: Brush> {
    pub(crate) data: LayoutData<B>,
}

impl<B: Brush> Default for Layout<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Brush> Layout<B> {
    /// Creates an empty layout.
    pub fn new() -> Self {
        Self {
            data: LayoutData::default(),
        }
    }

    /// Resets the layout, retaining allocations.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Returns the scale factor the layout was built with.
    pub fn scale(&self) -> f32 {
        self.data.scale
    }

    /// Width of the widest line, excluding trailing whitespace.
    pub fn width(&self) -> f32 {
        self.data.width
    }

    /// Width of the widest line, including trailing whitespace.
    pub fn full_width(&self) -> f32 {
        self.data.full_width
    }

    /// Total advance of the line stack, including vertical padding.
    pub fn height(&self) -> f32 {
        self.data.height
    }

    /// Resolved base direction of the layout (the first paragraph's).
    pub fn direction(&self) -> Direction {
        self.data.direction
    }

    pub fn is_rtl(&self) -> bool {
        self.data.is_rtl()
    }

    /// The codepoints of the layout in logical order.
    pub fn codepoints(&self) -> &[char] {
        &self.data.chars
    }

    /// Per-codepoint text properties, parallel to
    /// [`codepoints`](Self::codepoints).
    pub fn properties(&self) -> &[CharProps] {
        &self.data.props
    }

    /// All glyphs of the layout. Positions are absolute after building.
    pub fn glyphs(&self) -> &[Glyph] {
        &self.data.glyphs
    }

    /// All decorations of the layout.
    pub fn decorations(&self) -> &[Decoration<B>] {
        &self.data.decorations
    }

    /// Resolved style of the content run at `index`.
    pub fn content_run_style(&self, index: usize) -> Option<&RunStyle<B>> {
        self.data.content_runs.get(index).map(|run| &run.style)
    }

    /// Codepoint range of the content run at `index`.
    pub fn content_run_range(&self, index: usize) -> Option<Range<usize>> {
        self.data
            .content_runs
            .get(index)
            .map(|run| run.text_range.clone())
    }

    pub fn content_run_count(&self) -> usize {
        self.data.content_runs.len()
    }

    /// Returns the number of lines.
    pub fn len(&self) -> usize {
        self.data.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.lines.is_empty()
    }

    /// Returns the line at `index`.
    pub fn get(&self, index: usize) -> Option<Line<'_, B>> {
        Some(Line {
            layout: self,
            index: index as u32,
            data: self.data.lines.get(index)?,
        })
    }

    /// Returns an iterator over the lines of the layout.
    pub fn lines(&self) -> impl Iterator<Item = Line<'_, B>> + Clone + '_ {
        self.data.lines.iter().enumerate().map(|(index, data)| Line {
            layout: self,
            index: index as u32,
            data,
        })
    }

    /// Lower and upper bounds on the layout width: the width if every
    /// soft break opportunity is taken, and if none is.
    pub fn content_widths(&self) -> (f32, f32) {
        let mut min_width = 0_f32;
        let mut max_width = 0_f32;
        let mut word = 0.;
        let mut para = 0.;
        let mut para_trailing = 0.;
        for cluster in &self.data.clusters {
            let range = cluster.text_range();
            if range.is_empty() {
                continue;
            }
            let flags = self.data.props[range.start].flags;
            if flags.contains(CharFlags::MUST_LINE_BREAK) {
                max_width = max_width.max(para - para_trailing);
                para = 0.;
                para_trailing = 0.;
                min_width = min_width.max(word);
                word = 0.;
            } else if flags.contains(CharFlags::ALLOW_LINE_BREAK) {
                min_width = min_width.max(word);
                word = 0.;
            }
            let ws = self.data.props[range.start].is_whitespace();
            if !ws {
                word += cluster.advance;
                para_trailing = 0.;
            } else {
                para_trailing += cluster.advance;
            }
            para += cluster.advance;
        }
        min_width = min_width.max(word);
        max_width = max_width.max(para - para_trailing);
        (min_width, max_width)
    }

    /// Returns the index of the line containing the codepoint `index`.
    pub(crate) fn line_for_text_offset(&self, index: usize) -> usize {
        if self.data.lines.is_empty() {
            return 0;
        }
        self.data
            .lines
            .binary_search_by(|line| {
                if index < line.text_range.start {
                    Ordering::Greater
                } else if index >= line.text_range.end {
                    Ordering::Less
                } else {
                    Ordering::Equal
                }
            })
            .unwrap_or_else(|_| {
                // Boundary offsets and the past-the-end position resolve
                // to the nearest line containing them.
                let mut best = self.data.lines.len() - 1;
                for (i, line) in self.data.lines.iter().enumerate() {
                    if index < line.text_range.end {
                        best = i;
                        break;
                    }
                }
                best
            })
    }

    /// Returns the index of the line containing the vertical offset.
    /// Out-of-range offsets clamp to the first or last line.
    pub(crate) fn line_for_y(&self, y: f32) -> usize {
        if self.data.lines.is_empty() {
            return 0;
        }
        if y < 0. {
            return 0;
        }
        for (index, line) in self.data.lines.iter().enumerate() {
            if y < line.y + line.line_height {
                return index;
            }
        }
        self.data.lines.len() - 1
    }
}
