// Copyright 2025 the Strophe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Itemization: splitting analyzed text into shaping runs of uniform
//! bidi level, script, emoji-ness, content run and font.

use core::ops::Range;

use unicode_script::Script;

use crate::analysis::CharProps;
use crate::font::{FontId, FontQuery, FontSystem};
use crate::layout::data::{ContentRunData, RunKind};
use crate::resolve::RunStyle;
use crate::style::Brush;

/// Family name requested for emoji sequences.
const EMOJI_FAMILY: &str = "emoji";

/// A maximal run of text that can be shaped in one shaper call.
#[derive(Clone, Debug)]
pub(crate) struct ShapingRun {
    pub(crate) content_run: u32,
    pub(crate) kind: RunKind,
    /// Codepoint range in the layout buffer.
    pub(crate) text_range: Range<usize>,
    pub(crate) bidi_level: u8,
    pub(crate) script: Script,
    pub(crate) is_emoji: bool,
    pub(crate) font: Option<FontId>,
}

#[derive(Default)]
pub(crate) struct ItemizeScratch {
    candidates: Vec<FontId>,
}

impl ItemizeScratch {
    pub(crate) fn clear(&mut self) {
        self.candidates.clear();
    }
}

/// Produces shaping runs in logical order.
pub(crate) fn itemize<B: Brush>(
    chars: &[char],
    props: &[CharProps],
    content_runs: &[ContentRunData<B>],
    fonts: &dyn FontSystem,
    scratch: &mut ItemizeScratch,
    out: &mut Vec<ShapingRun>,
) {
    for (content_index, content) in content_runs.iter().enumerate() {
        let range = content.text_range.clone();
        if range.is_empty() {
            continue;
        }
        match content.kind {
            RunKind::Object | RunKind::Icon => {
                // Objects occupy exactly one replacement codepoint.
                let p = props[range.start];
                out.push(ShapingRun {
                    content_run: content_index as u32,
                    kind: content.kind,
                    text_range: range,
                    bidi_level: p.bidi_level,
                    script: p.script,
                    is_emoji: false,
                    font: None,
                });
            }
            RunKind::Text => {
                itemize_text(
                    chars,
                    props,
                    content_index as u32,
                    range,
                    &content.style,
                    fonts,
                    scratch,
                    out,
                );
            }
        }
    }
}

/// Splits one text content run by bidi level, script and emoji-ness,
/// then chooses a font per codepoint within each uniform range.
fn itemize_text<B: Brush>(
    chars: &[char],
    props: &[CharProps],
    content_run: u32,
    range: Range<usize>,
    style: &RunStyle<B>,
    fonts: &dyn FontSystem,
    scratch: &mut ItemizeScratch,
    out: &mut Vec<ShapingRun>,
) {
    let mut start = range.start;
    while start < range.end {
        let level = props[start].bidi_level;
        let script = props[start].script;
        let emoji = props[start].is_emoji();
        let mut end = start + 1;
        while end < range.end
            && props[end].bidi_level == level
            && props[end].script == script
            && props[end].is_emoji() == emoji
        {
            end += 1;
        }
        select_fonts(
            chars,
            content_run,
            start..end,
            level,
            script,
            emoji,
            style,
            fonts,
            scratch,
            out,
        );
        start = end;
    }
}

/// Walks a uniform range choosing the font per codepoint and emits a new
/// shaping run whenever the chosen font changes.
fn select_fonts<B: Brush>(
    chars: &[char],
    content_run: u32,
    range: Range<usize>,
    bidi_level: u8,
    script: Script,
    is_emoji: bool,
    style: &RunStyle<B>,
    fonts: &dyn FontSystem,
    scratch: &mut ItemizeScratch,
    out: &mut Vec<ShapingRun>,
) {
    let family: &str = if is_emoji {
        EMOJI_FAMILY
    } else {
        &style.font_family
    };
    let query = FontQuery {
        family,
        script,
        language: style.language.as_ref(),
        weight: style.font_weight,
        style: style.font_style,
        stretch: style.font_stretch,
    };
    scratch.candidates.clear();
    fonts.match_fonts(&query, &mut scratch.candidates);

    let mut run_start = range.start;
    let mut current: Option<FontId> = None;
    for i in range.clone() {
        let ch = chars[i];
        // Control characters render as a space later; probe them as one
        // so they never force a font switch on their own.
        let probe = if ch.is_control() { ' ' } else { ch };
        let chosen = match current {
            Some(font) if fonts.has_codepoint(font, probe) => Some(font),
            _ => scratch
                .candidates
                .iter()
                .copied()
                .find(|&font| fonts.has_codepoint(font, probe))
                .or_else(|| {
                    fonts
                        .default_font(family)
                        .filter(|&font| fonts.has_codepoint(font, probe))
                })
                // No coverage anywhere: tofu from the best candidate is
                // the error signal.
                .or_else(|| scratch.candidates.first().copied())
                .or_else(|| fonts.default_font(family)),
        };
        if chosen != current {
            if i > run_start {
                out.push(ShapingRun {
                    content_run,
                    kind: RunKind::Text,
                    text_range: run_start..i,
                    bidi_level,
                    script,
                    is_emoji,
                    font: current,
                });
                run_start = i;
            }
            current = chosen;
        }
    }
    out.push(ShapingRun {
        content_run,
        kind: RunKind::Text,
        text_range: run_start..range.end,
        bidi_level,
        script,
        is_emoji,
        font: current,
    });
}
