// Copyright 2025 the Strophe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Selection rectangle construction.

use core::ops::Range;

use crate::caret::Affinity;
use crate::layout::Layout;
use crate::style::Brush;
use crate::util::Rect;

impl<B: Brush> Layout<B> {
    /// Returns the rectangles covering the selected codepoint range,
    /// one or more per line.
    pub fn selection_bounds(&self, range: Range<usize>) -> Vec<Rect> {
        let mut rects = Vec::new();
        self.selection_bounds_with(range, |rect| rects.push(rect));
        rects
    }

    /// Calls `f` for every selection rectangle.
    ///
    /// Rectangles accumulate visually contiguous selected graphemes and
    /// flush when the visual chain breaks or the direction reverses, so
    /// a bidi selection yields one rectangle per visually contiguous
    /// piece.
    pub fn selection_bounds_with(&self, range: Range<usize>, mut f: impl FnMut(Rect)) {
        if range.is_empty() {
            return;
        }
        for (line_index, line) in self.data.lines.iter().enumerate() {
            if line.text_range.start >= range.end || line.text_range.end <= range.start {
                continue;
            }
            let top = line.y;
            let bottom = line.y + line.line_height;
            let mut current: Option<(Rect, bool)> = None;
            let mut iter = self.caret_iter(line_index);
            while let Some(step) = iter.next() {
                let rtl = step.left.position.affinity == Affinity::Trailing;
                let start = if rtl {
                    step.right.position.offset
                } else {
                    step.left.position.offset
                };
                let selected = range.contains(&start);
                if !selected {
                    if let Some((rect, _)) = current.take() {
                        f(rect);
                    }
                    continue;
                }
                let cell = Rect::new(step.x, top, step.x + step.advance, bottom);
                match &mut current {
                    Some((rect, dir)) if *dir == rtl && (rect.x1 - cell.x0).abs() < 0.01 => {
                        rect.x1 = cell.x1;
                    }
                    Some((rect, _)) => {
                        f(*rect);
                        current = Some((cell, rtl));
                    }
                    None => current = Some((cell, rtl)),
                }
            }
            if let Some((rect, _)) = current.take() {
                f(rect);
            }
        }
    }
}
