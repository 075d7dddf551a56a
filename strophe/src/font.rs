// Copyright 2025 the Strophe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Contracts for the external font, shaping and word-break collaborators.
//!
//! The layout core never loads fonts or runs a shaper itself; it talks to
//! a [`FontSystem`] through opaque [`FontId`] handles and stores those
//! handles in the layout. Everything a host needs to implement lives in
//! this module.

use unicode_script::Script;

use crate::style::{Direction, FontStretch, FontStyle, FontWeight, Lang};
use crate::util::Rect;

/// Opaque handle to a font held by the host's font collection.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct FontId(u32);

impl FontId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn to_raw(self) -> u32 {
        self.0
    }
}

/// Baseline kinds a font can report.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
pub enum Baseline {
    #[default]
    Alphabetic,
    Ideographic,
    Central,
    Hanging,
    Mathematical,
    Middle,
    TextTop,
    TextBottom,
}

/// Offsets of every baseline kind from the alphabetic baseline, in layout
/// units, y-down.
#[derive(Copy, Clone, Default, PartialEq, Debug)]
pub struct BaselineSet {
    pub alphabetic: f32,
    pub ideographic: f32,
    pub central: f32,
    pub hanging: f32,
    pub mathematical: f32,
    pub middle: f32,
    pub text_top: f32,
    pub text_bottom: f32,
}

impl BaselineSet {
    pub fn get(&self, which: Baseline) -> f32 {
        match which {
            Baseline::Alphabetic => self.alphabetic,
            Baseline::Ideographic => self.ideographic,
            Baseline::Central => self.central,
            Baseline::Hanging => self.hanging,
            Baseline::Mathematical => self.mathematical,
            Baseline::Middle => self.middle,
            Baseline::TextTop => self.text_top,
            Baseline::TextBottom => self.text_bottom,
        }
    }
}

/// Metrics of a font at a given size, y-down: `ascent` is at or above the
/// baseline and therefore non-positive, `descent` non-negative.
#[derive(Copy, Clone, Default, PartialEq, Debug)]
pub struct FontMetrics {
    pub ascent: f32,
    pub descent: f32,
    pub line_gap: f32,
    pub x_height: f32,
    pub cap_height: f32,
    pub underline_offset: f32,
    pub underline_size: f32,
    pub strikeout_offset: f32,
    pub strikeout_size: f32,
}

/// A font request, matched by the collection following the CSS fonts-3
/// narrowing order (stretch, then style, then weight).
#[derive(Copy, Clone, Debug)]
pub struct FontQuery<'a> {
    pub family: &'a str,
    pub script: Script,
    pub language: Option<&'a Lang>,
    pub weight: FontWeight,
    pub style: FontStyle,
    pub stretch: FontStretch,
}

/// An OpenType feature setting.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct FontFeature {
    pub tag: [u8; 4],
    pub value: u16,
}

impl FontFeature {
    pub const fn new(tag: &[u8; 4], value: u16) -> Self {
        Self { tag: *tag, value }
    }
}

/// One run of text handed to the shaper.
#[derive(Copy, Clone, Debug)]
pub struct ShapeRequest<'a> {
    pub font: FontId,
    pub font_size: f32,
    /// The codepoints of the run, in logical order.
    pub text: &'a [char],
    pub direction: Direction,
    pub script: Script,
    pub language: Option<&'a Lang>,
    pub features: &'a [FontFeature],
}

/// A glyph as produced by the shaper.
///
/// `cluster` indexes into [`ShapeRequest::text`] and identifies the first
/// codepoint of the glyph's cluster. Glyphs arrive in visual order; for a
/// right-to-left request cluster values therefore decrease.
#[derive(Copy, Clone, Default, PartialEq, Debug)]
pub struct RawGlyph {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub advance: f32,
    pub cluster: u32,
}

/// The font collection and shaper contract.
///
/// All metric values are expected in layout units, already scaled by the
/// requested font size, with the y-down sign convention of
/// [`FontMetrics`].
pub trait FontSystem {
    /// Appends candidate fonts for the query to `out`, best match first.
    fn match_fonts(&self, query: &FontQuery<'_>, out: &mut Vec<FontId>);

    /// Last-resort font for a family, used when no candidate covers a
    /// codepoint.
    fn default_font(&self, family: &str) -> Option<FontId>;

    fn has_codepoint(&self, font: FontId, ch: char) -> bool;

    /// Nominal glyph for a codepoint, used for ellipses, list markers and
    /// control-character replacement.
    fn glyph_for_char(&self, font: FontId, ch: char) -> Option<u32>;

    fn metrics(&self, font: FontId, font_size: f32) -> FontMetrics;

    /// Offsets of every baseline from the alphabetic baseline.
    fn baseline_set(
        &self,
        font: FontId,
        direction: Direction,
        script: Script,
        font_size: f32,
    ) -> BaselineSet;

    /// Offset of a single baseline from the alphabetic baseline.
    fn baseline(
        &self,
        font: FontId,
        which: Baseline,
        direction: Direction,
        script: Script,
        font_size: f32,
    ) -> f32 {
        self.baseline_set(font, direction, script, font_size).get(which)
    }

    /// Ink bounds of a glyph, for culling.
    fn glyph_bounds(&self, font: FontId, glyph_id: u32, font_size: f32) -> Rect;

    /// Shapes one run, invoking `glyph` once per output glyph in visual
    /// order. A failing shaper emits nothing; the layout accounts for the
    /// run's text either way.
    fn shape(&self, request: &ShapeRequest<'_>, glyph: &mut dyn FnMut(RawGlyph));
}

/// Language-specific word segmentation for scripts without inter-word
/// spacing (Japanese, Chinese, Thai).
///
/// Implementations push the byte offset one past each word (including the
/// word's trailing whitespace) into `breaks`, in increasing order, and
/// return `true`. Returning `false` keeps the generic line-break
/// properties for the range.
pub trait WordBreakProvider {
    fn word_breaks(
        &self,
        language: &Lang,
        script: Script,
        text: &str,
        breaks: &mut Vec<usize>,
    ) -> bool;
}
