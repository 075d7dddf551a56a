// Copyright 2025 the Strophe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::ops::Range;

use crate::analysis::CharFlags;
use crate::layout::run::Run;
use crate::layout::Glyph;
use crate::style::{Brush, Direction};

/// Smallest indivisible shaping unit: a contiguous codepoint range
/// mapped to a contiguous glyph range.
pub struct Cluster<'a, B: Brush> {
    pub(crate) run: Run<'a, B>,
    /// Index into the layout's cluster array.
    pub(crate) index: usize,
}

impl<B: Brush> Copy for Cluster<'_, B> {}

impl<B: Brush> Clone for Cluster<'_, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, B: Brush> Cluster<'a, B> {
    /// Returns the run that contains the cluster.
    pub fn run(&self) -> Run<'a, B> {
        self.run
    }

    /// Logical index of the cluster within its run slice.
    pub fn logical_index(&self) -> usize {
        self.index - self.run.item.cluster_range.start
    }

    pub fn text_range(&self) -> Range<usize> {
        self.data().text_range()
    }

    pub fn advance(&self) -> f32 {
        self.data().advance
    }

    pub fn direction(&self) -> Direction {
        self.run.direction()
    }

    pub fn is_rtl(&self) -> bool {
        self.run.is_rtl()
    }

    pub fn is_whitespace(&self) -> bool {
        self.first_props().is_whitespace()
    }

    pub fn is_control(&self) -> bool {
        self.first_props().is_control()
    }

    pub fn is_emoji(&self) -> bool {
        self.first_props().is_emoji()
    }

    /// Returns `true` if a word boundary precedes the cluster.
    pub fn is_word_boundary(&self) -> bool {
        self.first_flags().contains(CharFlags::WORD_BREAK)
    }

    /// Returns `true` if a line may break before the cluster.
    pub fn is_line_break_opportunity(&self) -> bool {
        self.first_flags().contains(CharFlags::ALLOW_LINE_BREAK)
    }

    /// Returns the number of graphemes covered by the cluster. A value
    /// above one means the cluster is a ligature.
    pub fn grapheme_count(&self) -> usize {
        let range = self.text_range();
        let props = &self.run.layout.data.props;
        range
            .clone()
            .filter(|&i| props[i].flags.contains(CharFlags::GRAPHEME_BREAK))
            .count()
            .max(usize::from(!range.is_empty()))
    }

    /// Returns the glyphs of the cluster, in visual order.
    pub fn glyphs(&self) -> &'a [Glyph] {
        &self.run.layout.data.glyphs[self.data().glyph_range()]
    }

    fn data(&self) -> &'a crate::layout::data::ClusterData {
        &self.run.layout.data.clusters[self.index]
    }

    fn first_props(&self) -> crate::analysis::CharProps {
        let range = self.text_range();
        if range.is_empty() {
            crate::analysis::CharProps::default()
        } else {
            self.run.layout.data.props[range.start]
        }
    }

    fn first_flags(&self) -> CharFlags {
        self.first_props().flags
    }
}
