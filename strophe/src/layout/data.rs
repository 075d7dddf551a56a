// Copyright 2025 the Strophe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::ops::Range;

use unicode_script::Script;

use crate::analysis::CharProps;
use crate::font::{FontId, FontMetrics};
use crate::layout::{Decoration, Glyph, LayoutFlags};
use crate::resolve::{LayoutStyle, RunStyle};
use crate::style::{Brush, Direction};
use crate::util::Rect;

/// What a run of layout content is made of.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum RunKind {
    Text,
    Object,
    Icon,
}

/// Why a line ended.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
pub enum BreakReason {
    /// Last line.
    #[default]
    None,
    /// A break opportunity was taken.
    Regular,
    /// A mandatory break character.
    Explicit,
    /// A word had to be split to guarantee progress.
    Emergency,
}

/// Dimensions of an inline object or icon.
#[derive(Copy, Clone, PartialEq, Debug)]
pub(crate) struct ObjectDims {
    pub(crate) width: f32,
    pub(crate) height: f32,
    /// Fraction of the height above the object's reference baseline.
    pub(crate) baseline_ratio: f32,
    pub(crate) icon: Option<u64>,
}

impl Default for ObjectDims {
    fn default() -> Self {
        Self {
            width: 0.,
            height: 0.,
            baseline_ratio: 1.,
            icon: None,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct ContentRunData<B: Brush> {
    pub(crate) kind: RunKind,
    /// Codepoint range in the layout buffer.
    pub(crate) text_range: Range<usize>,
    /// Byte range in the analyzed string.
    pub(crate) byte_range: Range<usize>,
    pub(crate) style: RunStyle<B>,
    pub(crate) id: u64,
    pub(crate) object: Option<ObjectDims>,
}

/// One cluster: a contiguous codepoint range mapped to a contiguous
/// glyph range. Clusters are stored in logical order per run.
#[derive(Copy, Clone, Default, Debug)]
pub(crate) struct ClusterData {
    pub(crate) text_offset: u32,
    pub(crate) text_len: u16,
    pub(crate) glyph_offset: u32,
    pub(crate) glyph_len: u16,
    pub(crate) advance: f32,
}

impl ClusterData {
    pub(crate) fn text_range(&self) -> Range<usize> {
        let start = self.text_offset as usize;
        start..start + self.text_len as usize
    }

    pub(crate) fn glyph_range(&self) -> Range<usize> {
        let start = self.glyph_offset as usize;
        start..start + self.glyph_len as usize
    }
}

/// A shaping run promoted into the layout.
#[derive(Clone, Debug)]
pub(crate) struct RunData {
    pub(crate) content_run: u32,
    pub(crate) kind: RunKind,
    pub(crate) text_range: Range<usize>,
    pub(crate) bidi_level: u8,
    pub(crate) script: Script,
    pub(crate) is_emoji: bool,
    pub(crate) font: Option<FontId>,
    pub(crate) font_size: f32,
    pub(crate) cluster_range: Range<usize>,
    pub(crate) glyph_range: Range<usize>,
    pub(crate) advance: f32,
    /// Metrics of the run's font, already scaled.
    pub(crate) metrics: FontMetrics,
    /// Offset of the layout's dominant baseline from the alphabetic
    /// baseline for this run's font.
    pub(crate) dominant_baseline: f32,
    /// Resolved absolute line height contribution.
    pub(crate) line_height: f32,
    pub(crate) baseline_shift: f32,
    /// Ellipsis and list-marker runs; excluded from text ranges.
    pub(crate) synthetic: bool,
}

impl RunData {
    pub(crate) fn direction(&self) -> Direction {
        Direction::from_level(self.bidi_level)
    }
}

/// A slice of a run as it appears on a line. After a line is finalized
/// its items are stored in visual order.
#[derive(Clone, Debug)]
pub(crate) struct LineItemData {
    pub(crate) run_index: u32,
    pub(crate) kind: RunKind,
    pub(crate) bidi_level: u8,
    pub(crate) content_run: u32,
    pub(crate) cluster_range: Range<usize>,
    pub(crate) glyph_range: Range<usize>,
    pub(crate) text_range: Range<usize>,
    pub(crate) advance: f32,
    /// Absolute x of the item's visual left edge.
    pub(crate) x: f32,
    /// Shift applied to glyph baselines: dominant baseline plus any
    /// baseline-shift attribute and object alignment.
    pub(crate) baseline_offset: f32,
    pub(crate) is_whitespace: bool,
    pub(crate) has_trailing_whitespace: bool,
    pub(crate) bounds: Rect,
    pub(crate) synthetic: bool,
}

impl LineItemData {
    pub(crate) fn is_rtl(&self) -> bool {
        self.bidi_level & 1 != 0
    }
}

#[derive(Clone, Default, Debug)]
pub(crate) struct LineData {
    pub(crate) item_range: Range<usize>,
    pub(crate) text_range: Range<usize>,
    pub(crate) last_grapheme_offset: usize,
    pub(crate) break_reason: BreakReason,
    /// Non-positive; distance above the baseline.
    pub(crate) ascent: f32,
    /// Non-negative; distance below the baseline.
    pub(crate) descent: f32,
    pub(crate) cap_height: f32,
    pub(crate) line_height: f32,
    /// Absolute y of the dominant baseline.
    pub(crate) baseline: f32,
    /// Absolute x of the visual left edge of the line content.
    pub(crate) x: f32,
    /// Absolute y of the top of the line box.
    pub(crate) y: f32,
    /// Width including trailing whitespace.
    pub(crate) advance: f32,
    pub(crate) trailing_whitespace: f32,
    pub(crate) truncated: bool,
    pub(crate) decoration_range: Range<usize>,
    pub(crate) bounds: Rect,
    /// Tight union of glyph ink bounds.
    pub(crate) cull_bounds: Rect,
    /// Bound, relative to a glyph position, large enough to contain any
    /// glyph on the line.
    pub(crate) common_glyph_bounds: Rect,
}

impl LineData {
    pub(crate) fn width(&self) -> f32 {
        self.advance - self.trailing_whitespace
    }
}

pub(crate) struct LayoutData<B: Brush> {
    pub(crate) scale: f32,
    pub(crate) base_level: u8,
    pub(crate) direction: Direction,
    pub(crate) flags: LayoutFlags,
    pub(crate) list_marker_counter: u32,
    /// Available width and height from the layout params.
    pub(crate) max_width: f32,
    pub(crate) max_height: f32,
    /// Measured extents after building.
    pub(crate) width: f32,
    pub(crate) full_width: f32,
    pub(crate) height: f32,

    pub(crate) text: String,
    pub(crate) chars: Vec<char>,
    pub(crate) props: Vec<CharProps>,

    pub(crate) layout_style: LayoutStyle<B>,
    pub(crate) content_runs: Vec<ContentRunData<B>>,

    // Output of shaping.
    pub(crate) runs: Vec<RunData>,
    pub(crate) clusters: Vec<ClusterData>,
    pub(crate) glyphs: Vec<Glyph>,

    // Output of line breaking and finalization.
    pub(crate) lines: Vec<LineData>,
    pub(crate) line_items: Vec<LineItemData>,
    pub(crate) decorations: Vec<Decoration<B>>,
}

impl<B: Brush> Default for LayoutData<B> {
    fn default() -> Self {
        Self {
            scale: 1.,
            base_level: 0,
            direction: Direction::LeftToRight,
            flags: LayoutFlags::empty(),
            list_marker_counter: 0,
            max_width: f32::MAX,
            max_height: f32::MAX,
            width: 0.,
            full_width: 0.,
            height: 0.,
            text: String::new(),
            chars: Vec::new(),
            props: Vec::new(),
            layout_style: LayoutStyle::default(),
            content_runs: Vec::new(),
            runs: Vec::new(),
            clusters: Vec::new(),
            glyphs: Vec::new(),
            lines: Vec::new(),
            line_items: Vec::new(),
            decorations: Vec::new(),
        }
    }
}

impl<B: Brush> LayoutData<B> {
    /// Resets the layout for reuse, retaining allocations.
    pub(crate) fn clear(&mut self) {
        self.scale = 1.;
        self.base_level = 0;
        self.direction = Direction::LeftToRight;
        self.flags = LayoutFlags::empty();
        self.list_marker_counter = 0;
        self.max_width = f32::MAX;
        self.max_height = f32::MAX;
        self.width = 0.;
        self.full_width = 0.;
        self.height = 0.;
        self.text.clear();
        self.chars.clear();
        self.props.clear();
        self.layout_style = LayoutStyle::default();
        self.content_runs.clear();
        self.runs.clear();
        self.clusters.clear();
        self.glyphs.clear();
        self.lines.clear();
        self.line_items.clear();
        self.decorations.clear();
    }

    pub(crate) fn is_rtl(&self) -> bool {
        self.base_level & 1 != 0
    }
}
