// Copyright 2025 the Strophe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::tests::utils::{build_layout, build_runs, TestFonts};
use crate::{
    AlignVertical, AttrSet, Attribute, Baseline, ContentRun, CounterSystem, DecorationPosition,
    LayoutContext, LayoutParams, LineHeight, ListMarker, MarkerKind, TextDecoration, VerticalTrim,
};

#[test]
fn underline_decoration_spans_the_text() {
    let deco = [Attribute::Decoration(TextDecoration {
        position: DecorationPosition::Under,
        ..TextDecoration::default()
    })];
    let layout = build_runs(
        &[ContentRun::text("hello ", AttrSet::new(&deco))],
        f32::MAX,
        &[],
    );
    assert_eq!(layout.decorations().len(), 1);
    let deco = &layout.decorations()[0];
    assert_eq!(deco.position, DecorationPosition::Under);
    // Underline offset of the test font at size 16, below the baseline.
    assert_eq!(deco.y, 12.8 + 1.6);
    assert_eq!(deco.thickness, 0.8);
    assert_eq!(deco.x, 0.);
    assert_eq!(deco.pattern_offset, 0.);
    // The trailing space is not decorated.
    assert_eq!(deco.length, 40.);
}

#[test]
fn strikethrough_uses_the_mean_offset() {
    let deco = [Attribute::Decoration(TextDecoration {
        position: DecorationPosition::Through,
        ..TextDecoration::default()
    })];
    let layout = build_runs(
        &[ContentRun::text("abc", AttrSet::new(&deco))],
        f32::MAX,
        &[],
    );
    let deco = &layout.decorations()[0];
    // Strikeout offset is above the baseline.
    assert_eq!(deco.y, 12.8 - 4.8);
}

#[test]
fn explicit_thickness_overrides_the_font() {
    let deco = [Attribute::Decoration(TextDecoration {
        position: DecorationPosition::Under,
        thickness: Some(3.),
        ..TextDecoration::default()
    })];
    let layout = build_runs(
        &[ContentRun::text("abc", AttrSet::new(&deco))],
        f32::MAX,
        &[],
    );
    assert_eq!(layout.decorations()[0].thickness, 3.);
}

#[test]
fn decoration_spans_stop_at_content_run_boundaries() {
    let deco = [Attribute::<()>::Decoration(TextDecoration::default())];
    let layout = build_runs(
        &[
            ContentRun::text("ab", AttrSet::new(&deco)),
            ContentRun::text("cd", AttrSet::default()),
            ContentRun::text("ef", AttrSet::new(&deco)),
        ],
        f32::MAX,
        &[],
    );
    // Two separate decorated spans, one per decorated content run.
    assert_eq!(layout.decorations().len(), 2);
    assert_eq!(layout.decorations()[0].x, 0.);
    assert_eq!(layout.decorations()[0].length, 16.);
    assert_eq!(layout.decorations()[1].x, 32.);
}

#[test]
fn numbered_list_marker_renders_counter_and_dot() {
    let attrs = [Attribute::<()>::ListMarker(ListMarker {
        indent: 20.,
        kind: MarkerKind::Counter(CounterSystem::Decimal),
    })];
    let mut layout = crate::Layout::<()>::new();
    let mut cx = LayoutContext::new();
    let params = LayoutParams {
        list_marker_counter: 3,
        attributes: AttrSet::new(&attrs),
        ..LayoutParams::default()
    };
    cx.build(
        &TestFonts,
        &params,
        &[ContentRun::text("item\nmore", AttrSet::default())],
        &mut layout,
    );
    // Only the first line carries the marker.
    let first = layout.get(0).unwrap();
    let marker = first.run(0).unwrap();
    assert!(marker.is_synthetic());
    let ids: Vec<_> = marker.glyphs().iter().map(|glyph| glyph.id).collect();
    assert_eq!(ids, vec!['3' as u32, '.' as u32]);
    // Text starts after the marker indent; the marker sits inside it.
    assert_eq!(first.metrics().offset, 20.);
    assert_eq!(marker.offset(), 4.);
    let second = layout.get(1).unwrap();
    assert!(second.runs().all(|run| !run.is_synthetic()));
}

#[test]
fn symbol_list_marker_uses_the_codepoint() {
    let attrs = [Attribute::<()>::ListMarker(ListMarker {
        indent: 16.,
        kind: MarkerKind::Symbol('-'),
    })];
    let layout = build_layout("x", f32::MAX, &attrs);
    let marker = layout.get(0).unwrap().run(0).unwrap();
    assert_eq!(marker.glyphs().len(), 1);
    assert_eq!(marker.glyphs()[0].id, '-' as u32);
}

#[test]
fn dominant_baseline_shifts_runs() {
    let attrs = [Attribute::<()>::AlignBaseline(Baseline::Ideographic)];
    let layout = build_layout("ab", f32::MAX, &attrs);
    let line = layout.get(0).unwrap();
    let run = line.run(0).unwrap();
    // The ideographic baseline of the test font sits 3.2 units below the
    // alphabetic one, so glyphs shift up by that much.
    assert_eq!(run.baseline(), line.metrics().baseline - 3.2);
    assert_eq!(run.glyphs()[0].y, run.baseline());
}

#[test]
fn baseline_shift_moves_a_run() {
    let shifted = [Attribute::<()>::BaselineShift(2.)];
    let layout = build_runs(
        &[
            ContentRun::text("ab", AttrSet::default()),
            ContentRun::text("cd", AttrSet::new(&shifted)),
        ],
        f32::MAX,
        &[],
    );
    let line = layout.get(0).unwrap();
    let plain = line.run(0).unwrap();
    let raised = line.run(1).unwrap();
    assert_eq!(raised.baseline(), plain.baseline() - 2.);
}

#[test]
fn line_height_modes() {
    for (mode, expected) in [
        (LineHeight::Normal, 16.),
        (LineHeight::MetricsRelative(1.5), 24.),
        (LineHeight::FontSizeRelative(2.), 32.),
        (LineHeight::Absolute(40.), 40.),
    ] {
        let attrs = [Attribute::<()>::LineHeight(mode)];
        let layout = build_layout("x", f32::MAX, &attrs);
        assert_eq!(
            layout.get(0).unwrap().metrics().line_height,
            expected,
            "mode {mode:?}"
        );
    }
}

#[test]
fn vertical_alignment_moves_the_stack() {
    let attrs = [Attribute::<()>::AlignVertical(AlignVertical::Bottom)];
    let mut layout = crate::Layout::<()>::new();
    let mut cx = LayoutContext::new();
    let params = LayoutParams {
        layout_height: 100.,
        attributes: AttrSet::new(&attrs),
        ..LayoutParams::default()
    };
    cx.build(
        &TestFonts,
        &params,
        &[ContentRun::text("x", AttrSet::default())],
        &mut layout,
    );
    let metrics = layout.get(0).unwrap().metrics();
    assert_eq!(metrics.min_coord, 84.);
}

#[test]
fn cap_to_baseline_trim_pulls_the_cap_line_to_the_top() {
    let attrs = [Attribute::<()>::VerticalTrim(VerticalTrim::CapToBaseline)];
    let layout = build_layout("X", f32::MAX, &attrs);
    let metrics = layout.get(0).unwrap().metrics();
    // Ascent 12.8, cap height 11.2: the 1.6 above the cap is trimmed,
    // leaving the baseline at the cap height.
    assert!((metrics.baseline - 11.2).abs() < 1e-4);
}

#[test]
fn padding_offsets_the_content() {
    let attrs = [Attribute::<()>::Padding {
        horizontal: 5.,
        vertical: 7.,
    }];
    let layout = build_layout("ab", f32::MAX, &attrs);
    let metrics = layout.get(0).unwrap().metrics();
    assert_eq!(metrics.offset, 5.);
    assert_eq!(metrics.min_coord, 7.);
    assert_eq!(layout.height(), 16. + 14.);
}
