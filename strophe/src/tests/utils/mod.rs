// Copyright 2025 the Strophe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deterministic test doubles for the external font and shaping
//! collaborators.
//!
//! Every glyph advances half the font size, control characters advance
//! zero, and glyph ids equal codepoints, so tests can assert on exact
//! geometry. The `sans-serif` family ligates "fi" unless ligatures are
//! disabled through features, which exercises caret interpolation
//! inside ligatures.

use unicode_script::Script;

use crate::font::{
    Baseline, BaselineSet, FontId, FontMetrics, FontQuery, FontSystem, RawGlyph, ShapeRequest,
};
use crate::style::Direction;
use crate::util::Rect;

pub(crate) const SANS: FontId = FontId::new(0);
pub(crate) const HEBREW: FontId = FontId::new(1);
pub(crate) const EMOJI: FontId = FontId::new(2);

/// Advance of one glyph at the given font size.
pub(crate) fn cell(font_size: f32) -> f32 {
    font_size * 0.5
}

pub(crate) struct TestFonts;

impl TestFonts {
    fn covers(font: FontId, ch: char) -> bool {
        if ch.is_control() || ch == '\u{fffc}' {
            return true;
        }
        match font {
            SANS => {
                ch.is_ascii()
                    || ('\u{a0}'..'\u{370}').contains(&ch)
                    || ch == '\u{2026}'
                    || ch.is_whitespace()
            }
            HEBREW => ('\u{590}'..'\u{600}').contains(&ch) || ch == ' ',
            EMOJI => !ch.is_ascii(),
            _ => false,
        }
    }
}

impl FontSystem for TestFonts {
    fn match_fonts(&self, query: &FontQuery<'_>, out: &mut Vec<FontId>) {
        if query.family == "emoji" {
            out.push(EMOJI);
            return;
        }
        if query.script == Script::Hebrew {
            out.push(HEBREW);
        }
        out.push(SANS);
    }

    fn default_font(&self, _family: &str) -> Option<FontId> {
        Some(SANS)
    }

    fn has_codepoint(&self, font: FontId, ch: char) -> bool {
        Self::covers(font, ch)
    }

    fn glyph_for_char(&self, font: FontId, ch: char) -> Option<u32> {
        Self::covers(font, ch).then_some(ch as u32)
    }

    fn metrics(&self, _font: FontId, font_size: f32) -> FontMetrics {
        FontMetrics {
            ascent: -0.8 * font_size,
            descent: 0.2 * font_size,
            line_gap: 0.,
            x_height: 0.5 * font_size,
            cap_height: 0.7 * font_size,
            underline_offset: 0.1 * font_size,
            underline_size: 0.05 * font_size,
            strikeout_offset: -0.3 * font_size,
            strikeout_size: 0.05 * font_size,
        }
    }

    fn baseline_set(
        &self,
        _font: FontId,
        _direction: Direction,
        _script: Script,
        font_size: f32,
    ) -> BaselineSet {
        BaselineSet {
            alphabetic: 0.,
            ideographic: 0.2 * font_size,
            central: -0.3 * font_size,
            hanging: -0.6 * font_size,
            mathematical: -0.25 * font_size,
            middle: -0.25 * font_size,
            text_top: -0.8 * font_size,
            text_bottom: 0.2 * font_size,
        }
    }

    fn glyph_bounds(&self, _font: FontId, _glyph_id: u32, font_size: f32) -> Rect {
        Rect::new(0., -0.7 * font_size, 0.5 * font_size, 0.)
    }

    fn shape(&self, request: &ShapeRequest<'_>, glyph: &mut dyn FnMut(RawGlyph)) {
        let advance_of = |ch: char| {
            if ch.is_control() {
                0.
            } else {
                cell(request.font_size)
            }
        };
        let ligatures_enabled = !request
            .features
            .iter()
            .any(|feature| feature.tag == *b"liga" && feature.value == 0);
        if request.direction.is_rtl() {
            for (i, &ch) in request.text.iter().enumerate().rev() {
                glyph(RawGlyph {
                    id: ch as u32,
                    x: 0.,
                    y: 0.,
                    advance: advance_of(ch),
                    cluster: i as u32,
                });
            }
            return;
        }
        let mut i = 0;
        while i < request.text.len() {
            let ch = request.text[i];
            if ligatures_enabled
                && request.font == SANS
                && ch == 'f'
                && request.text.get(i + 1) == Some(&'i')
            {
                glyph(RawGlyph {
                    id: 0xf001,
                    x: 0.,
                    y: 0.,
                    advance: 2. * cell(request.font_size),
                    cluster: i as u32,
                });
                i += 2;
                continue;
            }
            glyph(RawGlyph {
                id: ch as u32,
                x: 0.,
                y: 0.,
                advance: advance_of(ch),
                cluster: i as u32,
            });
            i += 1;
        }
    }

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
}

use crate::attribute::{AttrSet, Attribute};
use crate::context::{ContentRun, LayoutContext, LayoutParams};
use crate::layout::Layout;

/// Builds a layout for one text run with layout-level attributes.
pub(crate) fn build_layout(text: &str, width: f32, attrs: &[Attribute<()>]) -> Layout<()> {
    let mut layout = Layout::new();
    let mut cx = LayoutContext::new();
    let params = LayoutParams {
        layout_width: width,
        attributes: AttrSet::new(attrs),
        ..LayoutParams::default()
    };
    cx.build(
        &TestFonts,
        &params,
        &[ContentRun::text(text, AttrSet::default())],
        &mut layout,
    );
    layout
}

/// Builds a layout from explicit content runs.
pub(crate) fn build_runs(
    runs: &[ContentRun<'_, ()>],
    width: f32,
    attrs: &[Attribute<()>],
) -> Layout<()> {
    let mut layout = Layout::new();
    let mut cx = LayoutContext::new();
    let params = LayoutParams {
        layout_width: width,
        attributes: AttrSet::new(attrs),
        ..LayoutParams::default()
    };
    cx.build(&TestFonts, &params, runs, &mut layout);
    layout
}
