// Copyright 2025 the Strophe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Greedy line breaking over candidate words.

use crate::analysis::CharFlags;
use crate::layout::data::{BreakReason, LayoutData, LineData, LineItemData};
use crate::layout::LayoutFlags;
use crate::style::{Brush, Wrap};
use crate::util::Rect;

struct BreakState {
    /// First cluster of the line under construction.
    line_start: usize,
    /// Run cursor for item emission; only moves forward.
    run_cursor: usize,
    /// Advance committed to the line so far, including whitespace.
    line_advance: f32,
    tab_overflow: bool,
}

/// Effective wrap width for a line: the layout width minus padding,
/// indentation, the list-marker indent and, on the first line, the
/// first-line increment.
pub(crate) fn wrap_width<B: Brush>(data: &LayoutData<B>, first_line: bool) -> f32 {
    if data.max_width == f32::MAX {
        return f32::MAX;
    }
    let style = &data.layout_style;
    let mut width = data.max_width
        - style.padding_horizontal * 2.
        - style.indent_level as f32 * style.level_increment;
    if let Some(marker) = style.list_marker {
        width -= marker.indent;
    }
    if first_line {
        width -= style.first_line_increment;
    }
    width.max(0.)
}

pub(crate) fn break_lines<B: Brush>(data: &mut LayoutData<B>) {
    data.lines.clear();
    data.line_items.clear();
    data.decorations.clear();

    if data.clusters.is_empty() {
        data.lines.push(LineData::default());
        return;
    }

    let wrap = data.layout_style.wrap;
    let tab_increment = data.layout_style.tab_stop_increment;
    let ignore_must = data.flags.contains(LayoutFlags::IGNORE_MUST_LINE_BREAKS);
    let layout_rtl = data.is_rtl();

    let mut state = BreakState {
        line_start: 0,
        run_cursor: 0,
        line_advance: 0.,
        tab_overflow: false,
    };
    let mut width = wrap_width(data, true);

    let total = data.clusters.len();
    let mut word_start = 0_usize;
    let mut word_advance = 0_f32;
    // A tab overflow forces a break before the word after the tab, so
    // the flag is sampled when a word begins.
    let mut tab_overflow_armed = false;

    let mut j = 0;
    while j < total {
        if j == word_start {
            tab_overflow_armed = state.tab_overflow;
        }
        // Resolve tab advances against the occupied width before the tab.
        if tab_increment > 0. && is_tab(data, j) {
            let occupied = state.line_advance + word_advance;
            let next_stop = ((occupied / tab_increment).floor() + 1.) * tab_increment;
            let mut advance = next_stop - occupied;
            if next_stop > width {
                advance = tab_increment;
                state.tab_overflow = true;
            }
            retab(data, j, advance);
        }
        word_advance += data.clusters[j].advance;

        // The boundary after this cluster decides whether the candidate
        // word is complete. The end of the text always is.
        let (allow, must) = if j + 1 < total {
            let flags = data.props[data.clusters[j + 1].text_offset as usize].flags;
            (
                flags.contains(CharFlags::ALLOW_LINE_BREAK),
                flags.contains(CharFlags::MUST_LINE_BREAK),
            )
        } else {
            (true, false)
        };
        if !(allow || must) {
            j += 1;
            continue;
        }

        let word_end = j + 1;
        let run_width = word_advance - trailing_whitespace(data, word_start..word_end, layout_rtl);
        let overflow =
            wrap != Wrap::None && (state.line_advance + run_width > width || tab_overflow_armed);
        if overflow && wrap == Wrap::WordChar && run_width > width {
            // The word alone cannot fit; wrap it character by character,
            // always emitting at least one cluster per line.
            if word_start > state.line_start {
                commit_line(data, &mut state, word_start, BreakReason::Regular);
                width = wrap_width(data, false);
            }
            for k in word_start..word_end {
                let advance = data.clusters[k].advance;
                if k > state.line_start && state.line_advance + advance > width {
                    commit_line(data, &mut state, k, BreakReason::Emergency);
                    width = wrap_width(data, false);
                }
                state.line_advance += advance;
            }
        } else if overflow {
            if word_start > state.line_start {
                commit_line(data, &mut state, word_start, BreakReason::Regular);
                width = wrap_width(data, false);
            }
            // An overflowing word on an otherwise empty line is accepted.
            state.line_advance += word_advance;
        } else {
            state.line_advance += word_advance;
        }

        if must && !ignore_must {
            commit_line(data, &mut state, word_end, BreakReason::Explicit);
            width = wrap_width(data, false);
        }
        word_start = word_end;
        word_advance = 0.;
        j += 1;
    }

    if state.line_start < total || data.lines.is_empty() {
        commit_line(data, &mut state, total, BreakReason::None);
    }
}

fn is_tab<B: Brush>(data: &LayoutData<B>, cluster: usize) -> bool {
    let offset = data.clusters[cluster].text_offset as usize;
    data.chars[offset] == '\t'
}

/// Overwrites a resolved tab cluster's advance, keeping its glyphs and
/// owning run consistent.
fn retab<B: Brush>(data: &mut LayoutData<B>, cluster: usize, advance: f32) {
    let old = data.clusters[cluster].advance;
    data.clusters[cluster].advance = advance;
    let glyph_range = data.clusters[cluster].glyph_range();
    if let Some(last) = data.glyphs[glyph_range].last_mut() {
        last.advance += advance - old;
    }
    for run in &mut data.runs {
        if run.cluster_range.contains(&cluster) {
            run.advance += advance - old;
            break;
        }
    }
}

/// Advance of the trailing whitespace of a candidate word, counting only
/// clusters whose direction matches the layout direction.
fn trailing_whitespace<B: Brush>(
    data: &LayoutData<B>,
    word: core::ops::Range<usize>,
    layout_rtl: bool,
) -> f32 {
    let mut advance = 0.;
    for cluster in data.clusters[word].iter().rev() {
        let props = data.props[cluster.text_offset as usize];
        if !props.is_whitespace() {
            break;
        }
        if (props.bidi_level & 1 != 0) != layout_rtl {
            break;
        }
        advance += cluster.advance;
    }
    advance
}

/// Seals the clusters `[state.line_start, end)` into a line, emitting one
/// line item per overlapped run.
fn commit_line<B: Brush>(
    data: &mut LayoutData<B>,
    state: &mut BreakState,
    end: usize,
    break_reason: BreakReason,
) {
    let item_start = data.line_items.len();
    let mut text_start = usize::MAX;
    let mut text_end = 0_usize;
    let mut advance = 0.;

    let mut run_index = state.run_cursor;
    while run_index < data.runs.len() {
        let run = &data.runs[run_index];
        if run.cluster_range.start >= end {
            break;
        }
        if run.cluster_range.end <= state.line_start {
            run_index += 1;
            continue;
        }
        let cluster_range = run.cluster_range.start.max(state.line_start)
            ..run.cluster_range.end.min(end);
        if cluster_range.is_empty() {
            run_index += 1;
            continue;
        }
        let first = &data.clusters[cluster_range.start];
        let last = &data.clusters[cluster_range.end - 1];
        let item_text = first.text_offset as usize..last.text_range().end;
        let mut glyph_start = usize::MAX;
        let mut glyph_end = 0_usize;
        let mut item_advance = 0.;
        for cluster in &data.clusters[cluster_range.clone()] {
            let range = cluster.glyph_range();
            glyph_start = glyph_start.min(range.start);
            glyph_end = glyph_end.max(range.end);
            item_advance += cluster.advance;
        }
        if glyph_start == usize::MAX {
            glyph_start = 0;
            glyph_end = 0;
        }
        text_start = text_start.min(item_text.start);
        text_end = text_end.max(item_text.end);
        advance += item_advance;
        data.line_items.push(LineItemData {
            run_index: run_index as u32,
            kind: run.kind,
            bidi_level: run.bidi_level,
            content_run: run.content_run,
            cluster_range,
            glyph_range: glyph_start..glyph_end,
            text_range: item_text,
            advance: item_advance,
            x: 0.,
            baseline_offset: 0.,
            is_whitespace: false,
            has_trailing_whitespace: false,
            bounds: Rect::default(),
            synthetic: run.synthetic,
        });
        if run.cluster_range.end > end {
            break;
        }
        run_index += 1;
    }
    state.run_cursor = run_index.min(data.runs.len().saturating_sub(1));

    if text_start == usize::MAX {
        text_start = data
            .line_items
            .get(item_start.wrapping_sub(1))
            .map(|item| item.text_range.end)
            .unwrap_or(0);
        text_end = text_start;
    }
    data.lines.push(LineData {
        item_range: item_start..data.line_items.len(),
        text_range: text_start..text_end,
        break_reason,
        advance,
        ..LineData::default()
    });

    state.line_start = end;
    state.line_advance = 0.;
    state.tab_overflow = false;
}
