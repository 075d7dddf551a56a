// Copyright 2025 the Strophe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::ops::Range;

use unicode_script::Script;

use crate::font::{FontId, FontMetrics};
use crate::layout::cluster::Cluster;
use crate::layout::data::{LineItemData, RunData, RunKind};
use crate::layout::{Glyph, Layout};
use crate::style::{Brush, Direction};
use crate::util::Rect;

/// A layout run: the slice of a shaping run that landed on one line,
/// after visual reordering.
pub struct Run<'a, B: Brush> {
    pub(crate) layout: &'a Layout<B>,
    pub(crate) line_index: u32,
    /// Visual index of the run within its line.
    pub(crate) index: u32,
    pub(crate) data: &'a RunData,
    pub(crate) item: &'a LineItemData,
}

impl<B: Brush> Copy for Run<'_, B> {}

impl<B: Brush> Clone for Run<'_, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, B: Brush> Run<'a, B> {
    /// Returns the visual index of the run within its line.
    pub fn index(&self) -> usize {
        self.index as usize
    }

    pub fn kind(&self) -> RunKind {
        self.item.kind
    }

    pub fn direction(&self) -> Direction {
        Direction::from_level(self.item.bidi_level)
    }

    pub fn is_rtl(&self) -> bool {
        self.item.bidi_level & 1 != 0
    }

    pub fn bidi_level(&self) -> u8 {
        self.item.bidi_level
    }

    pub fn script(&self) -> Script {
        self.data.script
    }

    pub fn is_emoji(&self) -> bool {
        self.data.is_emoji
    }

    /// The font handle for text runs; `None` for objects and icons.
    pub fn font(&self) -> Option<FontId> {
        self.data.font
    }

    pub fn font_size(&self) -> f32 {
        self.data.font_size
    }

    pub fn metrics(&self) -> &FontMetrics {
        &self.data.metrics
    }

    /// Returns `true` for list-marker and ellipsis runs the layouter
    /// inserted; they carry no source text.
    pub fn is_synthetic(&self) -> bool {
        self.item.synthetic
    }

    /// User id of the content run this layout run came from.
    pub fn content_run_id(&self) -> Option<u64> {
        self.layout
            .data
            .content_runs
            .get(self.item.content_run as usize)
            .map(|content| content.id)
    }

    /// Source codepoint range of the run's slice on this line.
    pub fn text_range(&self) -> Range<usize> {
        self.item.text_range.clone()
    }

    /// Advance of the run's slice on this line.
    pub fn advance(&self) -> f32 {
        self.item.advance
    }

    /// Absolute x of the run's visual left edge.
    pub fn offset(&self) -> f32 {
        self.item.x
    }

    /// Absolute y of the run's alphabetic baseline, with the dominant
    /// baseline shift applied.
    pub fn baseline(&self) -> f32 {
        self.layout.data.lines[self.line_index as usize].baseline + self.item.baseline_offset
    }

    pub fn bounds(&self) -> Rect {
        self.item.bounds
    }

    /// Positioned glyphs of the run's slice, in visual order.
    pub fn glyphs(&self) -> &'a [Glyph] {
        &self.layout.data.glyphs[self.item.glyph_range.clone()]
    }

    /// Returns the number of clusters in the run's slice.
    pub fn len(&self) -> usize {
        self.item.cluster_range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.item.cluster_range.is_empty()
    }

    /// Returns the cluster at `index` in logical order.
    pub fn get(&self, index: usize) -> Option<Cluster<'a, B>> {
        let cluster_index = self.item.cluster_range.start + index;
        if cluster_index >= self.item.cluster_range.end {
            return None;
        }
        Some(Cluster {
            run: *self,
            index: cluster_index,
        })
    }

    /// Returns an iterator over the clusters in logical order.
    pub fn clusters(&self) -> impl Iterator<Item = Cluster<'a, B>> + Clone + 'a {
        let copy = *self;
        (0..self.len()).filter_map(move |index| copy.get(index))
    }

    /// Returns an iterator over the clusters in visual order.
    pub fn visual_clusters(&self) -> impl Iterator<Item = Cluster<'a, B>> + Clone + 'a {
        let copy = *self;
        let rtl = self.is_rtl();
        let len = self.len();
        (0..len).filter_map(move |index| copy.get(if rtl { len - 1 - index } else { index }))
    }

    /// Maps a logical cluster index to its visual position in the run.
    pub fn logical_to_visual(&self, logical_index: usize) -> Option<usize> {
        let len = self.len();
        if logical_index >= len {
            return None;
        }
        Some(if self.is_rtl() {
            len - 1 - logical_index
        } else {
            logical_index
        })
    }

    /// Maps a visual cluster position to its logical index in the run.
    pub fn visual_to_logical(&self, visual_index: usize) -> Option<usize> {
        // The mapping is an involution.
        self.logical_to_visual(visual_index)
    }
}
