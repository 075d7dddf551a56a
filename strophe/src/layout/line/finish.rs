// Copyright 2025 the Strophe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Line finalization: visual reorder, list markers, metrics and
//! baselines, overflow, alignment, absolute positioning and decorations.

use core::ops::Range;

use unicode_script::Script;

use crate::analysis::CharFlags;
use crate::font::{FontId, FontMetrics, FontQuery, FontSystem, RawGlyph, ShapeRequest};
use crate::layout::data::{ClusterData, LayoutData, LineItemData, RunData, RunKind};
use crate::layout::line::greedy::wrap_width;
use crate::layout::{Decoration, Glyph, LayoutFlags};
use crate::shape::resolve_line_height;
use crate::style::{
    AlignHorizontal, AlignVertical, Brush, CounterSystem, Direction, DecorationPosition,
    MarkerKind, ObjectAlignRef, Overflow, VerticalTrim,
};
use crate::util::Rect;

/// Content-run id of the out-of-flow list marker item.
pub(crate) const MARKER_CONTENT_RUN: u32 = u32::MAX;
/// Content-run id of inserted ellipsis items.
pub(crate) const ELLIPSIS_CONTENT_RUN: u32 = u32::MAX - 1;

pub(crate) fn finish_lines<B: Brush>(data: &mut LayoutData<B>, fonts: &dyn FontSystem) {
    compute_item_flags(data);
    compute_line_text(data);
    compute_metrics(data, fonts);
    reorder_lines(data);
    inject_list_marker(data, fonts);
    handle_overflow(data, fonts);
    position_lines(data, fonts);
    build_decorations(data);
}

/// Marks whitespace-only items and items with logical trailing
/// whitespace, and records each line's trailing whitespace advance.
fn compute_item_flags<B: Brush>(data: &mut LayoutData<B>) {
    for index in 0..data.line_items.len() {
        let range = data.line_items[index].cluster_range.clone();
        let mut all_whitespace = true;
        let mut trailing = false;
        for (i, cluster) in data.clusters[range.clone()].iter().enumerate().rev() {
            let ws = data.props[cluster.text_offset as usize].is_whitespace();
            if ws {
                if i + 1 == range.len() {
                    trailing = true;
                }
            } else {
                all_whitespace = false;
            }
        }
        let item = &mut data.line_items[index];
        item.is_whitespace = all_whitespace && !range.is_empty();
        item.has_trailing_whitespace = trailing;
    }
    for line_index in 0..data.lines.len() {
        let line = &data.lines[line_index];
        let mut trailing = 0.;
        'outer: for item in data.line_items[line.item_range.clone()].iter().rev() {
            for cluster in data.clusters[item.cluster_range.clone()].iter().rev() {
                let props = data.props[cluster.text_offset as usize];
                if props.is_whitespace() || props.is_control() {
                    trailing += cluster.advance;
                } else {
                    break 'outer;
                }
            }
        }
        data.lines[line_index].trailing_whitespace = trailing;
    }
}

/// Derives each line's last-grapheme offset from the property table.
fn compute_line_text<B: Brush>(data: &mut LayoutData<B>) {
    for line in &mut data.lines {
        let range = line.text_range.clone();
        line.last_grapheme_offset = range.start;
        for i in (range.start..range.end).rev() {
            if data.props[i].flags.contains(CharFlags::GRAPHEME_BREAK) {
                line.last_grapheme_offset = i;
                break;
            }
        }
    }
}

/// Computes per-line vertical metrics and per-item baseline offsets,
/// including baseline alignment of inline objects against a reference
/// text run.
fn compute_metrics<B: Brush>(data: &mut LayoutData<B>, fonts: &dyn FontSystem) {
    for line_index in 0..data.lines.len() {
        let item_range = data.lines[line_index].item_range.clone();

        // Text runs first; objects align against them afterwards.
        for index in item_range.clone() {
            let item = &data.line_items[index];
            if item.kind != RunKind::Text {
                continue;
            }
            let run = &data.runs[item.run_index as usize];
            data.line_items[index].baseline_offset =
                -run.dominant_baseline - run.baseline_shift;
        }
        for index in item_range.clone() {
            if data.line_items[index].kind == RunKind::Text {
                continue;
            }
            let align = data.content_runs[data.line_items[index].content_run as usize]
                .style
                .object_align;
            let reference = find_reference_run(data, item_range.clone(), index, align);
            data.line_items[index].baseline_offset = reference
                .map(|i| data.line_items[i].baseline_offset)
                .unwrap_or(0.);
        }

        let mut ascent = 0_f32;
        let mut descent = 0_f32;
        let mut cap_height = 0_f32;
        let mut line_height = 0_f32;
        let mut have_metrics = false;
        for index in item_range.clone().rev() {
            let item = &data.line_items[index];
            // Ignore trailing whitespace-only runs so a stray space in a
            // larger font does not grow the line.
            if !have_metrics && item.is_whitespace {
                continue;
            }
            let run = &data.runs[item.run_index as usize];
            let offset = item.baseline_offset;
            ascent = ascent.min(run.metrics.ascent + offset);
            descent = descent.max(run.metrics.descent + offset);
            cap_height = cap_height.max(run.metrics.cap_height);
            line_height = line_height.max(run.line_height);
            have_metrics = true;
        }
        if !have_metrics {
            if let Some(first) = data.line_items[item_range.clone()].first() {
                let run = &data.runs[first.run_index as usize];
                ascent = run.metrics.ascent;
                descent = run.metrics.descent;
                cap_height = run.metrics.cap_height;
                line_height = run.line_height;
            } else if let Some((metrics, height)) = default_metrics(data, fonts) {
                ascent = metrics.ascent;
                descent = metrics.descent;
                cap_height = metrics.cap_height;
                line_height = height;
            }
        }
        let line = &mut data.lines[line_index];
        line.ascent = ascent.min(0.);
        line.descent = descent.max(0.);
        line.cap_height = cap_height;
        line.line_height = line_height.max(0.);
    }
}

/// Picks the text run an object is aligned against, trying the preferred
/// side first and falling back to the other one.
fn find_reference_run<B: Brush>(
    data: &LayoutData<B>,
    item_range: Range<usize>,
    index: usize,
    align: ObjectAlignRef,
) -> Option<usize> {
    let before = || {
        data.line_items[item_range.start..index]
            .iter()
            .rposition(|item| item.kind == RunKind::Text)
            .map(|i| item_range.start + i)
    };
    let after = || {
        data.line_items[index + 1..item_range.end]
            .iter()
            .position(|item| item.kind == RunKind::Text)
            .map(|i| index + 1 + i)
    };
    match align {
        ObjectAlignRef::Before => before(),
        ObjectAlignRef::After => after(),
        ObjectAlignRef::BeforeOrAfter => before().or_else(after),
        ObjectAlignRef::AfterOrBefore => after().or_else(before),
    }
}

/// Metrics of the layout's default font, used for empty lines.
fn default_metrics<B: Brush>(
    data: &LayoutData<B>,
    fonts: &dyn FontSystem,
) -> Option<(FontMetrics, f32)> {
    let style = &data.layout_style.default_run;
    let font = default_font(data, fonts)?;
    let metrics = fonts.metrics(font, style.font_size);
    let height = resolve_line_height(style.line_height, &metrics, style.font_size);
    Some((metrics, height))
}

fn default_font<B: Brush>(data: &LayoutData<B>, fonts: &dyn FontSystem) -> Option<FontId> {
    let style = &data.layout_style.default_run;
    let mut candidates = Vec::new();
    fonts.match_fonts(
        &FontQuery {
            family: &style.font_family,
            script: Script::Latin,
            language: style.language.as_ref(),
            weight: style.font_weight,
            style: style.font_style,
            stretch: style.font_stretch,
        },
        &mut candidates,
    );
    candidates
        .first()
        .copied()
        .or_else(|| fonts.default_font(&style.font_family))
}

/// Reorders each line's items into visual order using the standard UBA
/// level-run reversal.
fn reorder_lines<B: Brush>(data: &mut LayoutData<B>) {
    for line in &data.lines {
        let items = &mut data.line_items[line.item_range.clone()];
        if items.len() > 1 && items.iter().any(|item| item.bidi_level != 0) {
            reorder_visual(items);
        }
    }
}

fn reorder_visual(items: &mut [LineItemData]) {
    let mut max_level = 0;
    let mut lowest_odd_level = u8::MAX;
    for item in items.iter() {
        let level = item.bidi_level;
        if level > max_level {
            max_level = level;
        }
        if level & 1 != 0 && level < lowest_odd_level {
            lowest_odd_level = level;
        }
    }
    if lowest_odd_level == u8::MAX {
        return;
    }
    for level in (lowest_odd_level..=max_level).rev() {
        let mut i = 0;
        while i < items.len() {
            if items[i].bidi_level >= level {
                let mut end = i + 1;
                while end < items.len() && items[end].bidi_level >= level {
                    end += 1;
                }
                items[i..end].reverse();
                i = end;
            }
            i += 1;
        }
    }
}

/// Builds the list-marker glyphs and injects them at the visual start of
/// the first line.
fn inject_list_marker<B: Brush>(data: &mut LayoutData<B>, fonts: &dyn FontSystem) {
    let Some(marker) = data.layout_style.list_marker else {
        return;
    };
    if data.lines.is_empty() {
        return;
    }
    let Some(font) = default_font(data, fonts) else {
        return;
    };
    let mut text = String::new();
    match marker.kind {
        MarkerKind::Symbol(ch) => text.push(ch),
        MarkerKind::Counter(system) => {
            format_counter(system, data.list_marker_counter, &mut text);
        }
    }
    let font_size = data.layout_style.default_run.font_size;
    let Some(item) = shape_synthetic(data, fonts, font, font_size, &text, MARKER_CONTENT_RUN)
    else {
        return;
    };
    // The marker sits at the visual start: the front of the item array,
    // or the back when the layout is right-to-left.
    let insert_at = if data.is_rtl() {
        data.lines[0].item_range.end
    } else {
        data.lines[0].item_range.start
    };
    data.line_items.insert(insert_at, item);
    data.lines[0].item_range.end += 1;
    for line in &mut data.lines[1..] {
        line.item_range.start += 1;
        line.item_range.end += 1;
    }
}

/// Renders a counter value with the given system, appending a trailing
/// full stop. Alphabetic systems pre-decrement each step, which yields
/// the spreadsheet progression a..z, aa..az, ba..
fn format_counter(system: CounterSystem, mut value: u32, out: &mut String) {
    let (base, radix, alphabetic) = match system {
        CounterSystem::Decimal => ('0', 10_u32, false),
        CounterSystem::LowerAlpha => ('a', 26, true),
        CounterSystem::UpperAlpha => ('A', 26, true),
    };
    let mut digits = [0_u32; 8];
    let mut len = 0;
    loop {
        if alphabetic {
            value = value.saturating_sub(1);
        }
        digits[len] = value % radix;
        len += 1;
        value /= radix;
        if value == 0 || len == digits.len() {
            break;
        }
    }
    for digit in digits[..len].iter().rev() {
        out.push(char::from_u32(base as u32 + digit).unwrap_or(base));
    }
    out.push('.');
}

/// Shapes an out-of-band run (list marker or ellipsis) and appends its
/// run, cluster and glyphs to the layout. The produced item carries no
/// text range.
fn shape_synthetic<B: Brush>(
    data: &mut LayoutData<B>,
    fonts: &dyn FontSystem,
    font: FontId,
    font_size: f32,
    text: &str,
    content_run: u32,
) -> Option<LineItemData> {
    let chars: Vec<char> = text.chars().collect();
    let request = ShapeRequest {
        font,
        font_size,
        text: &chars,
        direction: Direction::LeftToRight,
        script: Script::Latin,
        language: None,
        features: &[],
    };
    let mut raw: Vec<RawGlyph> = Vec::new();
    fonts.shape(&request, &mut |glyph| raw.push(glyph));
    if raw.is_empty() {
        return None;
    }
    let glyph_start = data.glyphs.len();
    let cluster_index = data.clusters.len();
    let run_index = data.runs.len();
    let mut advance = 0.;
    for glyph in &raw {
        data.glyphs.push(Glyph {
            id: glyph.id,
            x: glyph.x,
            y: glyph.y,
            advance: glyph.advance,
            cluster: cluster_index as u32,
        });
        advance += glyph.advance;
    }
    let text_offset = data.chars.len() as u32;
    data.clusters.push(ClusterData {
        text_offset,
        text_len: 0,
        glyph_offset: glyph_start as u32,
        glyph_len: raw.len() as u16,
        advance,
    });
    let metrics = fonts.metrics(font, font_size);
    data.runs.push(RunData {
        content_run,
        kind: RunKind::Text,
        text_range: data.chars.len()..data.chars.len(),
        bidi_level: 0,
        script: Script::Latin,
        is_emoji: false,
        font: Some(font),
        font_size,
        cluster_range: cluster_index..cluster_index + 1,
        glyph_range: glyph_start..data.glyphs.len(),
        advance,
        metrics,
        dominant_baseline: 0.,
        line_height: resolve_line_height(
            data.layout_style.default_run.line_height,
            &metrics,
            font_size,
        ),
        baseline_shift: 0.,
        synthetic: true,
    });
    Some(LineItemData {
        run_index: run_index as u32,
        kind: RunKind::Text,
        bidi_level: 0,
        content_run,
        cluster_range: cluster_index..cluster_index + 1,
        glyph_range: glyph_start..data.glyphs.len(),
        text_range: data.chars.len()..data.chars.len(),
        advance,
        x: 0.,
        baseline_offset: 0.,
        is_whitespace: false,
        has_trailing_whitespace: false,
        bounds: Rect::default(),
        synthetic: true,
    })
}

/// Applies per-line horizontal overflow handling and drops lines that
/// overflow the layout height.
fn handle_overflow<B: Brush>(data: &mut LayoutData<B>, fonts: &dyn FontSystem) {
    let overflow = data.layout_style.overflow;
    if overflow != Overflow::None && data.max_width != f32::MAX {
        for line_index in 0..data.lines.len() {
            let avail = wrap_width(data, line_index == 0);
            if data.lines[line_index].width() <= avail {
                continue;
            }
            match overflow {
                Overflow::Clip => {
                    prune_line(data, line_index, avail, 0.);
                    trim_visual_end_whitespace(data, line_index);
                }
                Overflow::Ellipsis => {
                    ellipsify_line(data, fonts, line_index, avail);
                }
                Overflow::None => unreachable!("checked above"),
            }
            refresh_line(data, line_index);
        }
    }

    if data.max_height != f32::MAX {
        let mut bottom = data.layout_style.padding_vertical;
        let mut keep = data.lines.len();
        for (index, line) in data.lines.iter().enumerate() {
            bottom += line.line_height;
            if bottom > data.max_height && index > 0 {
                keep = index;
                break;
            }
        }
        if keep < data.lines.len() {
            let first_dropped = data.lines[keep].item_range.start;
            data.lines.truncate(keep);
            data.line_items.truncate(first_dropped);
            let last = keep - 1;
            let already_truncated = data.lines[last].truncated;
            data.lines[last].truncated = true;
            if overflow == Overflow::Ellipsis && !already_truncated {
                let avail = wrap_width(data, last == 0);
                ellipsify_line(data, fonts, last, avail);
                refresh_line(data, last);
            }
        }
    }
}

/// Removes clusters from the visual end of a line until its width plus
/// `reserve` fits within `avail`. At least one cluster is kept.
fn prune_line<B: Brush>(data: &mut LayoutData<B>, line_index: usize, avail: f32, reserve: f32) {
    loop {
        let line = &data.lines[line_index];
        if line.width() + reserve <= avail || line_is_bare(data, line_index) {
            break;
        }
        let item_range = line.item_range.clone();
        // Visual end: last item for left-to-right layouts, first for
        // right-to-left ones.
        let visual_end = if data.is_rtl() {
            data.line_items[item_range.clone()]
                .iter()
                .position(|item| !item.synthetic && !item.cluster_range.is_empty())
                .map(|i| item_range.start + i)
        } else {
            data.line_items[item_range.clone()]
                .iter()
                .rposition(|item| !item.synthetic && !item.cluster_range.is_empty())
                .map(|i| item_range.start + i)
        };
        let Some(index) = visual_end else {
            break;
        };
        let data_is_rtl = data.is_rtl();
        let item = &mut data.line_items[index];
        // Within the item, the visually outermost cluster depends on the
        // item's own direction.
        let remove = if data_is_rtl != item.is_rtl() {
            let i = item.cluster_range.start;
            item.cluster_range.start += 1;
            i
        } else {
            item.cluster_range.end -= 1;
            item.cluster_range.end
        };
        let advance = data.clusters[remove].advance;
        let item_empty = item.cluster_range.is_empty();
        item.advance -= advance;
        refresh_item_ranges(&mut data.line_items[index], &data.clusters);
        let line = &mut data.lines[line_index];
        line.advance -= advance;
        line.trailing_whitespace = 0.;
        if item_empty {
            remove_item(data, line_index, index);
        }
    }
}

/// A line keeps at least one cluster no matter how narrow the layout is.
fn line_is_bare<B: Brush>(data: &LayoutData<B>, line_index: usize) -> bool {
    let line = &data.lines[line_index];
    data.line_items[line.item_range.clone()]
        .iter()
        .filter(|item| !item.synthetic)
        .map(|item| item.cluster_range.len())
        .sum::<usize>()
        <= 1
}

fn refresh_item_ranges(item: &mut LineItemData, clusters: &[ClusterData]) {
    if item.cluster_range.is_empty() {
        item.text_range = item.text_range.start..item.text_range.start;
        item.glyph_range = item.glyph_range.start..item.glyph_range.start;
        return;
    }
    let first = &clusters[item.cluster_range.start];
    let last = &clusters[item.cluster_range.end - 1];
    item.text_range = first.text_offset as usize..last.text_range().end;
    let mut glyph_start = usize::MAX;
    let mut glyph_end = 0;
    for cluster in &clusters[item.cluster_range.clone()] {
        let range = cluster.glyph_range();
        glyph_start = glyph_start.min(range.start);
        glyph_end = glyph_end.max(range.end);
    }
    item.glyph_range = glyph_start..glyph_end;
}

fn remove_item<B: Brush>(data: &mut LayoutData<B>, line_index: usize, index: usize) {
    data.line_items.remove(index);
    data.lines[line_index].item_range.end -= 1;
    for line in &mut data.lines[line_index + 1..] {
        line.item_range.start -= 1;
        line.item_range.end -= 1;
    }
}

/// Drops whitespace and control clusters from the visual end of a line.
fn trim_visual_end_whitespace<B: Brush>(data: &mut LayoutData<B>, line_index: usize) {
    loop {
        let item_range = data.lines[line_index].item_range.clone();
        let index = if data.is_rtl() {
            data.line_items[item_range.clone()]
                .iter()
                .position(|item| !item.synthetic && !item.cluster_range.is_empty())
                .map(|i| item_range.start + i)
        } else {
            data.line_items[item_range.clone()]
                .iter()
                .rposition(|item| !item.synthetic && !item.cluster_range.is_empty())
                .map(|i| item_range.start + i)
        };
        let Some(index) = index else {
            break;
        };
        let item = &data.line_items[index];
        let cluster_index = if data.is_rtl() != item.is_rtl() {
            item.cluster_range.start
        } else {
            item.cluster_range.end - 1
        };
        let props = data.props[data.clusters[cluster_index].text_offset as usize];
        if !(props.is_whitespace() || props.is_control()) {
            break;
        }
        let advance = data.clusters[cluster_index].advance;
        let item = &mut data.line_items[index];
        if cluster_index == item.cluster_range.start {
            item.cluster_range.start += 1;
        } else {
            item.cluster_range.end -= 1;
        }
        item.advance -= advance;
        let empty = item.cluster_range.is_empty();
        refresh_item_ranges(&mut data.line_items[index], &data.clusters);
        let line = &mut data.lines[line_index];
        line.advance -= advance;
        if empty {
            remove_item(data, line_index, index);
            if data.lines[line_index].item_range.is_empty() {
                break;
            }
        }
    }
    data.lines[line_index].trailing_whitespace = 0.;
}

/// Prunes a line to make room for an ellipsis run and inserts the run at
/// the visual tail. Marks the line truncated.
fn ellipsify_line<B: Brush>(
    data: &mut LayoutData<B>,
    fonts: &dyn FontSystem,
    line_index: usize,
    avail: f32,
) {
    // The ellipsis inherits font and size from the visually-last text
    // run, falling back to the layout default.
    let line = &data.lines[line_index];
    let tail = if data.is_rtl() {
        data.line_items[line.item_range.clone()]
            .iter()
            .find(|item| item.kind == RunKind::Text && !item.synthetic)
    } else {
        data.line_items[line.item_range.clone()]
            .iter()
            .rev()
            .find(|item| item.kind == RunKind::Text && !item.synthetic)
    };
    let (font, font_size) = match tail {
        Some(item) => {
            let run = &data.runs[item.run_index as usize];
            match run.font {
                Some(font) => (font, run.font_size),
                None => match default_font(data, fonts) {
                    Some(font) => (font, data.layout_style.default_run.font_size),
                    None => return,
                },
            }
        }
        None => match default_font(data, fonts) {
            Some(font) => (font, data.layout_style.default_run.font_size),
            None => return,
        },
    };
    let text = if fonts.glyph_for_char(font, '\u{2026}').is_some() {
        "\u{2026}"
    } else {
        "..."
    };
    let Some(item) = shape_synthetic(data, fonts, font, font_size, text, ELLIPSIS_CONTENT_RUN)
    else {
        return;
    };
    let reserve = item.advance;
    prune_line(data, line_index, avail, reserve);
    trim_visual_end_whitespace(data, line_index);
    let insert_at = if data.is_rtl() {
        data.lines[line_index].item_range.start
    } else {
        data.lines[line_index].item_range.end
    };
    data.line_items.insert(insert_at, item);
    let line = &mut data.lines[line_index];
    line.item_range.end += 1;
    line.advance += reserve;
    line.truncated = true;
    for line in &mut data.lines[line_index + 1..] {
        line.item_range.start += 1;
        line.item_range.end += 1;
    }
}

/// Recomputes a line's text range and last grapheme after pruning.
fn refresh_line<B: Brush>(data: &mut LayoutData<B>, line_index: usize) {
    let line = &data.lines[line_index];
    let mut start = usize::MAX;
    let mut end = 0;
    for item in &data.line_items[line.item_range.clone()] {
        if item.synthetic || item.cluster_range.is_empty() {
            continue;
        }
        start = start.min(item.text_range.start);
        end = end.max(item.text_range.end);
    }
    if start == usize::MAX {
        let anchor = data.lines[line_index].text_range.start;
        data.lines[line_index].text_range = anchor..anchor;
        data.lines[line_index].last_grapheme_offset = anchor;
        return;
    }
    let line = &mut data.lines[line_index];
    line.text_range = start..end;
    line.last_grapheme_offset = start;
    for i in (start..end).rev() {
        if data.props[i].flags.contains(CharFlags::GRAPHEME_BREAK) {
            line.last_grapheme_offset = i;
            break;
        }
    }
}

/// Assigns line origins and baselines, then absolute glyph positions,
/// and computes culling bounds.
fn position_lines<B: Brush>(data: &mut LayoutData<B>, fonts: &dyn FontSystem) {
    let style = &data.layout_style;
    let padding_h = style.padding_horizontal;
    let padding_v = style.padding_vertical;
    let align_h = style.align_horizontal;
    let align_v = style.align_vertical;
    let trim = style.vertical_trim;
    let indent_base =
        style.indent_level as f32 * style.level_increment
            + style.list_marker.map(|m| m.indent).unwrap_or(0.);
    let first_line_increment = style.first_line_increment;
    let layout_rtl = data.is_rtl();

    let mut total_height: f32 = data.lines.iter().map(|line| line.line_height).sum();
    let mut top_trim = 0.;
    if trim == VerticalTrim::CapToBaseline {
        if let (Some(first), Some(last)) = (data.lines.first(), data.lines.last()) {
            top_trim = ((-first.ascent) - first.cap_height).max(0.);
            let bottom_trim = last.descent.max(0.);
            total_height = (total_height - top_trim - bottom_trim).max(0.);
        }
    }
    let mut y = padding_v - top_trim;
    if data.max_height != f32::MAX && !data.flags.contains(LayoutFlags::IGNORE_VERTICAL_ALIGN) {
        let free = (data.max_height - 2. * padding_v - total_height).max(0.);
        y += match align_v {
            AlignVertical::Top => 0.,
            AlignVertical::Center => free * 0.5,
            AlignVertical::Bottom => free,
        };
    }

    for line_index in 0..data.lines.len() {
        let first = line_index == 0;
        let avail = wrap_width(data, first);
        let line = &data.lines[line_index];
        let free = if avail == f32::MAX {
            0.
        } else {
            (avail - line.width()).max(0.)
        };
        let offset = align_offset(align_h, layout_rtl, free);
        let indent = indent_base + if first { first_line_increment } else { 0. };
        let x = padding_h + if layout_rtl { offset } else { indent + offset };

        let leading = line.line_height - (line.descent - line.ascent);
        let baseline = y + leading * 0.5 - line.ascent;
        let line = &mut data.lines[line_index];
        line.x = x;
        line.y = y;
        line.baseline = baseline;
        line.bounds = Rect::new(x, y, x + line.advance, y + line.line_height);
        y += line.line_height;

        position_line_items(data, fonts, line_index);
    }

    let mut width = 0_f32;
    let mut full_width = 0_f32;
    for line in &data.lines {
        width = width.max(line.width());
        full_width = full_width.max(line.advance);
    }
    data.width = width;
    data.full_width = full_width;
    data.height = (y + padding_v).max(0.);
}

fn align_offset(align: AlignHorizontal, layout_rtl: bool, free: f32) -> f32 {
    match align {
        AlignHorizontal::Start => {
            if layout_rtl {
                free
            } else {
                0.
            }
        }
        AlignHorizontal::End => {
            if layout_rtl {
                0.
            } else {
                free
            }
        }
        AlignHorizontal::Left => 0.,
        AlignHorizontal::Right => free,
        AlignHorizontal::Center => free * 0.5,
    }
}

fn position_line_items<B: Brush>(
    data: &mut LayoutData<B>,
    fonts: &dyn FontSystem,
    line_index: usize,
) {
    let line = data.lines[line_index].clone();
    let mut cursor = line.x;
    let mut cull = Rect::default();
    let mut common = Rect::default();
    for index in line.item_range.clone() {
        let item = &data.line_items[index];
        let run_index = item.run_index as usize;
        let baseline = line.baseline + item.baseline_offset;
        let is_marker = item.synthetic && item.content_run == MARKER_CONTENT_RUN;
        let item_x = if is_marker {
            // The marker occupies the indent area beside the line.
            if data.is_rtl() {
                line.x + line.advance
            } else {
                line.x - item.advance
            }
        } else {
            cursor
        };
        let glyph_range = item.glyph_range.clone();
        let advance = item.advance;
        let metrics = data.runs[run_index].metrics;
        let font = data.runs[run_index].font;
        let font_size = data.runs[run_index].font_size;
        data.line_items[index].x = item_x;
        data.line_items[index].bounds = Rect::new(
            item_x,
            baseline + metrics.ascent,
            item_x + advance,
            baseline + metrics.descent,
        );
        let mut glyph_x = item_x;
        for glyph_index in glyph_range {
            let glyph = &mut data.glyphs[glyph_index];
            let x = glyph_x + glyph.x;
            let y = baseline + glyph.y;
            glyph_x += glyph.advance;
            glyph.x = x;
            glyph.y = y;
            if let Some(font) = font {
                let ink = fonts.glyph_bounds(font, glyph.id, font_size);
                common = common.union(&ink);
                cull = cull.union(&Rect::new(x + ink.x0, y + ink.y0, x + ink.x1, y + ink.y1));
            } else {
                // Objects cull by their box.
                let ink = Rect::new(0., metrics.ascent, glyph.advance, metrics.descent);
                common = common.union(&ink);
                cull = cull.union(&Rect::new(x, y + ink.y0, x + ink.x1, y + ink.y1));
            }
        }
        if !is_marker {
            cursor += advance;
        }
    }
    let line = &mut data.lines[line_index];
    line.cull_bounds = cull;
    line.common_glyph_bounds = common;
}

/// Builds decorations for spans of consecutive layout runs that share a
/// content run.
fn build_decorations<B: Brush>(data: &mut LayoutData<B>) {
    for line_index in 0..data.lines.len() {
        let decoration_start = data.decorations.len();
        let item_range = data.lines[line_index].item_range.clone();
        let mut span_start = item_range.start;
        while span_start < item_range.end {
            let content_run = data.line_items[span_start].content_run;
            let mut span_end = span_start + 1;
            while span_end < item_range.end
                && data.line_items[span_end].content_run == content_run
            {
                span_end += 1;
            }
            if !data.line_items[span_start].synthetic
                && (content_run as usize) < data.content_runs.len()
            {
                decorate_span(data, line_index, span_start..span_end, content_run);
            }
            span_start = span_end;
        }
        data.lines[line_index].decoration_range = decoration_start..data.decorations.len();
    }
}

fn decorate_span<B: Brush>(
    data: &mut LayoutData<B>,
    line_index: usize,
    span: Range<usize>,
    content_run: u32,
) {
    let decorations = data.content_runs[content_run as usize].style.decorations.clone();
    if decorations.is_empty() {
        return;
    }
    let line = &data.lines[line_index];
    let fill = data.content_runs[content_run as usize].style.fill.clone();

    let x0 = data.line_items[span.clone()]
        .iter()
        .map(|item| item.x)
        .fold(f32::MAX, f32::min);
    let x1 = data.line_items[span.clone()]
        .iter()
        .map(|item| item.x + item.advance)
        .fold(f32::MIN, f32::max);
    // Trailing whitespace and controls at the visual end do not get
    // decorated.
    let mut trim = 0.;
    'outer: for index in span.clone().rev() {
        let item = &data.line_items[index];
        let clusters = &data.clusters[item.cluster_range.clone()];
        let visual_rev: Box<dyn Iterator<Item = &ClusterData> + '_> = if item.is_rtl() {
            Box::new(clusters.iter())
        } else {
            Box::new(clusters.iter().rev())
        };
        for cluster in visual_rev {
            let props = data.props[cluster.text_offset as usize];
            if props.is_whitespace() || props.is_control() {
                trim += cluster.advance;
            } else {
                break 'outer;
            }
        }
    }
    let length = (x1 - x0 - trim).max(0.);
    if length <= 0. {
        return;
    }

    let baseline = line.baseline + data.line_items[span.start].baseline_offset;
    let descent = line.descent;
    let mut under_pos = f32::MIN;
    let mut over_pos = f32::MAX;
    let mut through_sum = 0.;
    let mut under_size_sum = 0.;
    let mut through_size_sum = 0.;
    let mut font_count = 0_u32;
    for index in span.clone() {
        let run = &data.runs[data.line_items[index].run_index as usize];
        if run.kind != RunKind::Text {
            continue;
        }
        under_pos = under_pos.max(run.metrics.underline_offset);
        over_pos = over_pos.min(run.metrics.ascent);
        through_sum += run.metrics.strikeout_offset;
        under_size_sum += run.metrics.underline_size;
        through_size_sum += run.metrics.strikeout_size;
        font_count += 1;
    }
    if font_count == 0 {
        return;
    }
    let n = font_count as f32;

    for decoration in &decorations {
        let y_rel = match decoration.position {
            DecorationPosition::Under => under_pos,
            DecorationPosition::Bottom => descent,
            DecorationPosition::Over => over_pos,
            DecorationPosition::Through => through_sum / n,
        };
        let thickness = decoration.thickness.unwrap_or(match decoration.position {
            DecorationPosition::Through => through_size_sum / n,
            _ => under_size_sum / n,
        });
        data.decorations.push(Decoration {
            x: x0,
            y: baseline + y_rel,
            length,
            pattern_offset: x0,
            thickness,
            brush: decoration.brush.clone().unwrap_or_else(|| fill.clone()),
            position: decoration.position,
            style: decoration.style,
            item_index: span.start as u32,
        });
    }
}
