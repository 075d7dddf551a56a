// Copyright 2025 the Strophe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The shaper driver: turns itemized shaping runs into clusters and
//! glyphs through the [`FontSystem::shape`] contract.
//!
//! Clusters are recorded in logical order even for right-to-left runs;
//! glyphs stay in visual order. Each glyph records its owning cluster.

use core::ops::Range;

use smallvec::SmallVec;
use unicode_script::Script;

use crate::font::{FontFeature, FontMetrics, FontSystem, RawGlyph, ShapeRequest};
use crate::itemize::ShapingRun;
use crate::layout::data::{ClusterData, LayoutData, RunData, RunKind};
use crate::layout::Glyph;
use crate::style::{Brush, Direction, LineHeight};
use crate::util::nearly_zero;

/// Ligature features suppressed when letter spacing is positive.
const LIGATURE_FEATURES: [&[u8; 4]; 6] = [b"liga", b"clig", b"dlig", b"rlig", b"hlig", b"calt"];

#[derive(Clone, Debug)]
struct Group {
    text_start: usize,
    text_end: usize,
    glyphs: Range<usize>,
    advance: f32,
}

#[derive(Default)]
pub(crate) struct ShapeScratch {
    glyphs: Vec<RawGlyph>,
    groups: Vec<Group>,
    features: SmallVec<[FontFeature; 8]>,
}

impl ShapeScratch {
    pub(crate) fn clear(&mut self) {
        self.glyphs.clear();
        self.groups.clear();
        self.features.clear();
    }
}

pub(crate) fn shape_runs<B: Brush>(
    data: &mut LayoutData<B>,
    fonts: &dyn FontSystem,
    shaping_runs: &[ShapingRun],
    scratch: &mut ShapeScratch,
) {
    for run in shaping_runs {
        match run.kind {
            RunKind::Object | RunKind::Icon => shape_object(data, run),
            RunKind::Text => shape_text(data, fonts, run, scratch),
        }
    }
}

/// Emits a single synthetic glyph and cluster for an inline object.
fn shape_object<B: Brush>(data: &mut LayoutData<B>, run: &ShapingRun) {
    let content = &data.content_runs[run.content_run as usize];
    let style = &content.style;
    let dims = content.object.unwrap_or_default();
    let advance = dims.width + style.object_padding.0 + style.object_padding.1;
    let glyph_start = data.glyphs.len();
    let cluster_start = data.clusters.len();
    data.glyphs.push(Glyph {
        id: 0,
        x: 0.,
        y: 0.,
        advance,
        cluster: cluster_start as u32,
    });
    data.clusters.push(ClusterData {
        text_offset: run.text_range.start as u32,
        text_len: run.text_range.len() as u16,
        glyph_offset: glyph_start as u32,
        glyph_len: 1,
        advance,
    });
    data.runs.push(RunData {
        content_run: run.content_run,
        kind: run.kind,
        text_range: run.text_range.clone(),
        bidi_level: run.bidi_level,
        script: run.script,
        is_emoji: false,
        font: None,
        font_size: style.font_size,
        cluster_range: cluster_start..cluster_start + 1,
        glyph_range: glyph_start..glyph_start + 1,
        advance,
        metrics: FontMetrics {
            ascent: -(dims.height * dims.baseline_ratio),
            descent: dims.height * (1. - dims.baseline_ratio),
            ..FontMetrics::default()
        },
        dominant_baseline: 0.,
        line_height: dims.height,
        baseline_shift: style.baseline_shift,
        synthetic: false,
    });
}

fn shape_text<B: Brush>(
    data: &mut LayoutData<B>,
    fonts: &dyn FontSystem,
    run: &ShapingRun,
    scratch: &mut ShapeScratch,
) {
    let content = &data.content_runs[run.content_run as usize];
    let style = &content.style;
    let direction = Direction::from_level(run.bidi_level);
    let font_size = style.font_size;

    scratch.clear();
    if let Some(font) = run.font {
        // Positive letter spacing pulls ligatures apart; suppress them so
        // spacing applies between every grapheme.
        if style.letter_spacing > 0. {
            scratch
                .features
                .extend(LIGATURE_FEATURES.iter().map(|tag| FontFeature::new(tag, 0)));
        }
        scratch.features.extend_from_slice(&style.features);
        let request = ShapeRequest {
            font,
            font_size,
            text: &data.chars[run.text_range.clone()],
            direction,
            script: run.script,
            language: style.language.as_ref(),
            features: &scratch.features,
        };
        let glyphs = &mut scratch.glyphs;
        fonts.shape(&request, &mut |glyph| glyphs.push(glyph));
    }

    let cluster_start = data.clusters.len();
    let glyph_start = data.glyphs.len();
    let run_len = run.text_range.len();

    if scratch.glyphs.is_empty() {
        // Shaper failure or missing font: the text is still accounted for
        // by an empty cluster so offsets stay consistent.
        data.clusters.push(ClusterData {
            text_offset: run.text_range.start as u32,
            text_len: run_len as u16,
            glyph_offset: glyph_start as u32,
            glyph_len: 0,
            advance: 0.,
        });
    } else {
        group_clusters(&scratch.glyphs, &mut scratch.groups, run_len, direction);
        if direction.is_rtl() {
            // Clusters stay logical even when the glyphs are visual.
            scratch.groups.reverse();
        }
        merge_crlf(data, run, scratch);
        replace_controls(data, fonts, run, scratch);
        apply_spacing(data, run, scratch, style.letter_spacing, style.word_spacing);

        for glyph in &scratch.glyphs {
            data.glyphs.push(Glyph {
                id: glyph.id,
                x: glyph.x,
                y: glyph.y,
                advance: glyph.advance,
                cluster: 0,
            });
        }
        for group in &scratch.groups {
            let cluster_index = data.clusters.len() as u32;
            let glyph_offset = glyph_start + group.glyphs.start;
            data.clusters.push(ClusterData {
                text_offset: (run.text_range.start + group.text_start) as u32,
                text_len: (group.text_end - group.text_start) as u16,
                glyph_offset: glyph_offset as u32,
                glyph_len: group.glyphs.len() as u16,
                advance: group.advance,
            });
            for glyph in &mut data.glyphs[glyph_offset..glyph_offset + group.glyphs.len()] {
                glyph.cluster = cluster_index;
            }
        }
    }

    let cluster_range = cluster_start..data.clusters.len();
    let glyph_range = glyph_start..data.glyphs.len();
    let advance = data.clusters[cluster_range.clone()]
        .iter()
        .map(|c| c.advance)
        .sum();
    let metrics = run
        .font
        .map(|font| fonts.metrics(font, font_size))
        .unwrap_or_default();
    let dominant_baseline = run
        .font
        .map(|font| {
            fonts.baseline(
                font,
                data.layout_style.dominant_baseline,
                direction,
                run.script,
                font_size,
            )
        })
        .unwrap_or(0.);
    data.runs.push(RunData {
        content_run: run.content_run,
        kind: RunKind::Text,
        text_range: run.text_range.clone(),
        bidi_level: run.bidi_level,
        script: run.script,
        is_emoji: run.is_emoji,
        font: run.font,
        font_size,
        cluster_range,
        glyph_range,
        advance,
        metrics,
        dominant_baseline,
        line_height: resolve_line_height(style.line_height, &metrics, font_size),
        baseline_shift: style.baseline_shift,
        synthetic: false,
    });
}

/// Groups shaper output by cluster id, walking glyphs in memory (visual)
/// order. Text range endpoints are inferred from the neighbouring group's
/// cluster id; for right-to-left runs the logically next offset is the
/// cluster id of the previous glyph in memory.
fn group_clusters(
    glyphs: &[RawGlyph],
    groups: &mut Vec<Group>,
    run_len: usize,
    direction: Direction,
) {
    let mut i = 0;
    while i < glyphs.len() {
        let id = glyphs[i].cluster;
        let mut end = i + 1;
        let mut advance = glyphs[i].advance;
        while end < glyphs.len() && glyphs[end].cluster == id {
            advance += glyphs[end].advance;
            end += 1;
        }
        let text_start = (id as usize).min(run_len.saturating_sub(1));
        let text_end = if direction.is_rtl() {
            groups
                .last()
                .map(|prev| prev.text_start)
                .unwrap_or(run_len)
        } else {
            glyphs
                .get(end)
                .map(|next| next.cluster as usize)
                .unwrap_or(run_len)
        };
        groups.push(Group {
            text_start,
            text_end: text_end.max(text_start + 1).min(run_len),
            glyphs: i..end,
            advance,
        });
        i = end;
    }
}

/// Merges a CR cluster followed by an LF cluster into a single cluster
/// with a single glyph.
fn merge_crlf<B: Brush>(data: &LayoutData<B>, run: &ShapingRun, scratch: &mut ShapeScratch) {
    let chars = &data.chars[run.text_range.clone()];
    let mut i = 0;
    while i + 1 < scratch.groups.len() {
        let a = &scratch.groups[i];
        let b = &scratch.groups[i + 1];
        if chars[a.text_start] == '\r' && a.text_end == b.text_start && chars[b.text_start] == '\n'
        {
            let dropped = b.glyphs.clone();
            let text_end = b.text_end;
            scratch.groups.remove(i + 1);
            let merged = &mut scratch.groups[i];
            merged.text_end = text_end;
            scratch.glyphs.drain(dropped.clone());
            let removed = dropped.len();
            for group in scratch.groups.iter_mut() {
                if group.glyphs.start >= dropped.end {
                    group.glyphs.start -= removed;
                    group.glyphs.end -= removed;
                }
            }
        } else {
            i += 1;
        }
    }
}

/// Points control-character glyphs at the font's space glyph so they do
/// not render as tofu. Advances are left untouched.
fn replace_controls<B: Brush>(
    data: &LayoutData<B>,
    fonts: &dyn FontSystem,
    run: &ShapingRun,
    scratch: &mut ShapeScratch,
) {
    let Some(font) = run.font else {
        return;
    };
    let mut space = None;
    for group in &scratch.groups {
        let offset = run.text_range.start + group.text_start;
        if !data.props[offset].is_control() {
            continue;
        }
        let space = *space.get_or_insert_with(|| fonts.glyph_for_char(font, ' ').unwrap_or(0));
        for glyph in &mut scratch.glyphs[group.glyphs.clone()] {
            glyph.id = space;
        }
    }
}

/// Applies letter and word spacing to the last glyph of each cluster.
/// Scripts with mandatory cursive connection are exempt.
fn apply_spacing<B: Brush>(
    data: &LayoutData<B>,
    run: &ShapingRun,
    scratch: &mut ShapeScratch,
    letter_spacing: f32,
    word_spacing: f32,
) {
    if (nearly_zero(letter_spacing) && nearly_zero(word_spacing))
        || is_cursive_script(run.script)
    {
        return;
    }
    for group in &mut scratch.groups {
        let offset = run.text_range.start + group.text_start;
        let mut spacing = letter_spacing;
        if data.props[offset].is_whitespace() {
            spacing += word_spacing;
        }
        if nearly_zero(spacing) {
            continue;
        }
        group.advance += spacing;
        if let Some(last) = scratch.glyphs[group.glyphs.clone()].last_mut() {
            last.advance += spacing;
        }
    }
}

pub(crate) fn resolve_line_height(
    line_height: LineHeight,
    metrics: &FontMetrics,
    font_size: f32,
) -> f32 {
    let span = metrics.descent - metrics.ascent;
    match line_height {
        LineHeight::Normal => span,
        LineHeight::MetricsRelative(factor) => span * factor,
        LineHeight::FontSizeRelative(factor) => font_size * factor,
        LineHeight::Absolute(value) => value,
    }
}

fn is_cursive_script(script: Script) -> bool {
    matches!(
        script,
        Script::Arabic
            | Script::Syriac
            | Script::Mongolian
            | Script::Nko
            | Script::Mandaic
            | Script::Manichaean
            | Script::Adlam
            | Script::Devanagari
            | Script::Bengali
            | Script::Gurmukhi
            | Script::Gujarati
            | Script::Oriya
            | Script::Tamil
            | Script::Telugu
            | Script::Kannada
            | Script::Malayalam
    )
}
