// Copyright 2025 the Strophe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Read-only caret queries over a built layout: grapheme and word
//! navigation, hit testing and caret geometry.
//!
//! A [`TextPosition`] pairs a codepoint offset with an [`Affinity`]
//! because the same offset can sit at two visual x coordinates: at the
//! boundary between runs of opposite direction, and at a line wrap.

mod iter;
mod selection;

pub use iter::{CaretIter, CaretSide, CaretStep};

use crate::analysis::CharFlags;
use crate::layout::Layout;
use crate::style::Brush;

/// Side of a grapheme boundary a caret is attached to.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
pub enum Affinity {
    /// No preference; trailing is assumed where it matters.
    #[default]
    None,
    /// Attached to the grapheme logically before the offset.
    Trailing,
    /// Attached to the grapheme logically after the offset.
    Leading,
    /// Pinned to the visual start of the line.
    StartOfLine,
    /// Pinned to the visual end of the line.
    EndOfLine,
}

/// A caret position within the text.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
pub struct TextPosition {
    /// Codepoint offset; `text_len` is valid and means insertion at the
    /// end.
    pub offset: usize,
    pub affinity: Affinity,
}

impl TextPosition {
    pub fn new(offset: usize, affinity: Affinity) -> Self {
        Self { offset, affinity }
    }
}

/// What a hit test positions: a caret follows stricter snapping rules
/// than a selection endpoint.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Movement {
    Caret,
    Selection,
}

/// Resolved geometry of a caret position.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct CaretGeometry {
    pub x: f32,
    pub line_index: usize,
    /// Top of the caret, the line box top.
    pub top: f32,
    pub height: f32,
}

impl<B: Brush> Layout<B> {
    fn grapheme_flag(&self, offset: usize) -> bool {
        self.data.props[offset]
            .flags
            .contains(CharFlags::GRAPHEME_BREAK)
    }

    /// Returns the start of the grapheme containing `offset`.
    pub fn align_grapheme(&self, offset: usize) -> usize {
        let len = self.data.chars.len();
        if offset >= len {
            return len;
        }
        let mut i = offset;
        while i > 0 && !self.grapheme_flag(i) {
            i -= 1;
        }
        i
    }

    /// Returns the offset just past the grapheme containing `offset`.
    pub fn next_grapheme(&self, offset: usize) -> usize {
        let len = self.data.chars.len();
        if offset >= len {
            return len;
        }
        let mut i = offset + 1;
        while i < len && !self.grapheme_flag(i) {
            i += 1;
        }
        i
    }

    /// Returns the start of the grapheme before `offset`.
    pub fn prev_grapheme(&self, offset: usize) -> usize {
        if offset == 0 {
            return 0;
        }
        let len = self.data.chars.len();
        let mut i = offset.min(len) - 1;
        while i > 0 && !self.grapheme_flag(i) {
            i -= 1;
        }
        i
    }

    /// Returns the next word boundary after `offset`.
    pub fn next_word(&self, offset: usize) -> usize {
        let len = self.data.chars.len();
        if offset >= len {
            return len;
        }
        let mut i = offset + 1;
        while i < len
            && !self.data.props[i].flags.contains(CharFlags::WORD_BREAK)
        {
            i += 1;
        }
        i
    }

    /// Returns the previous word boundary before `offset`.
    pub fn prev_word(&self, offset: usize) -> usize {
        if offset == 0 {
            return 0;
        }
        let len = self.data.chars.len();
        let mut i = offset.min(len) - 1;
        while i > 0 && !self.data.props[i].flags.contains(CharFlags::WORD_BREAK) {
            i -= 1;
        }
        i
    }

    /// Returns the index of the line containing a text offset, honoring
    /// affinity at line boundaries: a trailing caret at a wrap belongs
    /// to the earlier line.
    pub fn line_containing(&self, position: TextPosition) -> usize {
        if self.data.lines.is_empty() {
            return 0;
        }
        let last = self.data.lines.len() - 1;
        let offset = position.offset.min(self.data.chars.len());
        match position.affinity {
            Affinity::Trailing | Affinity::EndOfLine => {
                for (index, line) in self.data.lines.iter().enumerate() {
                    if offset <= line.text_range.end && offset > line.text_range.start {
                        return index;
                    }
                    if offset <= line.text_range.start {
                        return index;
                    }
                }
                last
            }
            _ => self.line_for_text_offset(offset),
        }
    }

    /// The caret position pinned to the visual start of a line.
    pub fn line_start_position(&self, line_index: usize) -> TextPosition {
        let offset = self
            .data
            .lines
            .get(line_index)
            .map(|line| line.text_range.start)
            .unwrap_or(0);
        TextPosition::new(offset, Affinity::StartOfLine)
    }

    /// The caret position pinned to the visual end of a line.
    pub fn line_end_position(&self, line_index: usize) -> TextPosition {
        let offset = self
            .data
            .lines
            .get(line_index)
            .map(|line| line.text_range.end)
            .unwrap_or(self.data.chars.len());
        TextPosition::new(offset, Affinity::EndOfLine)
    }

    /// Returns a caret iterator over the grapheme boundaries of a line.
    pub fn caret_iter(&self, line_index: usize) -> CaretIter<'_, B> {
        CaretIter::new(self, line_index)
    }

    /// Hit tests an x coordinate against one line.
    pub fn hit_test_line(&self, line_index: usize, x: f32, movement: Movement) -> TextPosition {
        let Some(line) = self.data.lines.get(line_index) else {
            return TextPosition::new(0, Affinity::StartOfLine);
        };
        let rtl = self.is_rtl();
        let left = line.x;
        let right = line.x + line.advance;
        if x < left {
            return if rtl {
                self.line_end_position(line_index)
            } else {
                self.line_start_position(line_index)
            };
        }
        if x > right {
            return if rtl {
                self.line_start_position(line_index)
            } else {
                self.line_end_position(line_index)
            };
        }

        let mut iter = self.caret_iter(line_index);
        let mut result = None;
        let mut last = None;
        while let Some(step) = iter.next() {
            if x >= step.x && x <= step.x + step.advance {
                let side = if x <= step.x + step.advance * 0.5 {
                    step.left
                } else {
                    step.right
                };
                result = Some(side.position);
                break;
            }
            last = Some(step);
        }
        let position = result
            .or_else(|| last.map(|step| step.right.position))
            .unwrap_or_else(|| self.line_end_position(line_index));

        // A caret cannot rest on the trailing edge of a control character
        // that ends the line; snap it onto the character instead. A
        // selection endpoint may sit there.
        if movement == Movement::Caret
            && position.affinity == Affinity::Trailing
            && position.offset == line.text_range.end
            && !line.text_range.is_empty()
        {
            let last_grapheme = line.last_grapheme_offset;
            if self.data.props[last_grapheme].is_control() {
                return TextPosition::new(last_grapheme, Affinity::Trailing);
            }
        }
        position
    }

    /// Hit tests a point against the layout. Vertical misses clamp to
    /// the first or last line.
    pub fn hit_test_point(&self, x: f32, y: f32, movement: Movement) -> TextPosition {
        let line_index = self.line_for_y(y);
        self.hit_test_line(line_index, x, movement)
    }

    /// Returns the visual geometry of a caret position.
    pub fn caret_geometry(&self, position: TextPosition) -> Option<CaretGeometry> {
        if self.data.lines.is_empty() {
            return None;
        }
        let offset = position.offset.min(self.data.chars.len());
        let line_index = self.line_containing(TextPosition::new(offset, position.affinity));
        let line = &self.data.lines[line_index];
        let geometry = |x: f32| CaretGeometry {
            x,
            line_index,
            top: line.y,
            height: line.line_height,
        };
        let rtl = self.is_rtl();
        let visual_start = if rtl { line.x + line.width() } else { line.x };
        let visual_end = if rtl { line.x } else { line.x + line.width() };
        match position.affinity {
            Affinity::StartOfLine => return Some(geometry(visual_start)),
            Affinity::EndOfLine => return Some(geometry(visual_end)),
            _ => {}
        }
        let want_leading = match position.affinity {
            Affinity::Leading => true,
            Affinity::Trailing => false,
            _ => offset == 0,
        };
        let mut iter = self.caret_iter(line_index);
        while let Some(step) = iter.next() {
            for (side, x) in [(step.left, step.x), (step.right, step.x + step.advance)] {
                if side.position.offset != offset {
                    continue;
                }
                let leading = side.position.affinity == Affinity::Leading;
                if leading == want_leading {
                    return Some(geometry(x));
                }
            }
        }
        // The offset is on this line but no edge matched the requested
        // affinity: fall back to the other edge, then the line edges.
        let mut iter = self.caret_iter(line_index);
        while let Some(step) = iter.next() {
            for (side, x) in [(step.left, step.x), (step.right, step.x + step.advance)] {
                if side.position.offset == offset {
                    return Some(geometry(x));
                }
            }
        }
        Some(geometry(if offset >= line.text_range.end {
            visual_end
        } else {
            visual_start
        }))
    }
}
