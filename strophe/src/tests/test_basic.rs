// Copyright 2025 the Strophe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::tests::utils::build_layout;
use crate::Direction;

#[test]
fn single_line_geometry() {
    let layout = build_layout("Hello world", f32::MAX, &[]);
    assert_eq!(layout.len(), 1);
    let line = layout.get(0).unwrap();
    assert_eq!(line.text_range(), 0..11);
    // Eleven cells of 8 units at the default 16 size.
    assert_eq!(layout.width(), 88.);
    let metrics = line.metrics();
    assert_eq!(metrics.ascent, -12.8);
    assert_eq!(metrics.descent, 3.2);
    assert_eq!(metrics.line_height, 16.);
    assert_eq!(metrics.baseline, 12.8);
    assert_eq!(layout.height(), 16.);

    // Glyphs advance uniformly from the line origin.
    let run = line.run(0).unwrap();
    for (i, glyph) in run.glyphs().iter().enumerate() {
        assert_eq!(glyph.x, i as f32 * 8.);
        assert_eq!(glyph.y, 12.8);
    }
}

#[test]
fn empty_text_single_line() {
    let layout = build_layout("", f32::MAX, &[]);
    assert_eq!(layout.len(), 1);
    let line = layout.get(0).unwrap();
    assert!(line.text_range().is_empty());
    assert_eq!(line.last_grapheme_offset(), 0);
    // Metrics fall back to the default font.
    assert_eq!(line.metrics().line_height, 16.);
    assert_eq!(line.metrics().ascent, -12.8);
}

#[test]
fn hard_break_makes_two_lines() {
    let layout = build_layout("abc\ndef", f32::MAX, &[]);
    assert_eq!(layout.len(), 2);
    let first = layout.get(0).unwrap();
    let second = layout.get(1).unwrap();
    assert_eq!(first.text_range(), 0..4);
    assert_eq!(second.text_range(), 4..7);
    assert_eq!(first.last_grapheme_offset(), 3);
    assert_eq!(first.break_reason(), crate::BreakReason::Explicit);
}

#[test]
fn crlf_merges_into_one_cluster_and_glyph() {
    let layout = build_layout("\r\n", f32::MAX, &[]);
    assert_eq!(layout.len(), 1);
    let line = layout.get(0).unwrap();
    let run = line.run(0).unwrap();
    assert_eq!(run.len(), 1);
    let cluster = run.get(0).unwrap();
    assert_eq!(cluster.text_range(), 0..2);
    assert_eq!(cluster.glyphs().len(), 1);
}

#[test]
fn clusters_cover_the_text_exactly() {
    let text = "Quick fox\n\u{5d0}\u{5d1} ok";
    let layout = build_layout(text, f32::MAX, &[]);
    let total: usize = text.chars().count();
    let mut covered = 0;
    let mut next_offset = 0;
    for line in layout.lines() {
        // Collect this line's clusters in logical order.
        let mut clusters: Vec<_> = line
            .runs()
            .filter(|run| !run.is_synthetic())
            .flat_map(|run| run.clusters().collect::<Vec<_>>())
            .map(|cluster| cluster.text_range())
            .collect();
        clusters.sort_by_key(|range| range.start);
        for range in clusters {
            assert_eq!(range.start, next_offset, "cluster ranges are contiguous");
            next_offset = range.end;
            covered += range.len();
        }
    }
    assert_eq!(covered, total);
}

#[test]
fn layout_run_glyph_ranges_match_their_clusters() {
    let layout = build_layout("abc \u{5d0}\u{5d1}\u{5d2} xy", f32::MAX, &[]);
    for line in layout.lines() {
        for run in line.runs() {
            let from_clusters: usize = run.clusters().map(|c| c.glyphs().len()).sum();
            assert_eq!(run.glyphs().len(), from_clusters);
        }
    }
}

#[test]
fn resolved_direction_follows_first_paragraph() {
    assert_eq!(
        build_layout("abc", f32::MAX, &[]).direction(),
        Direction::LeftToRight
    );
    assert_eq!(
        build_layout("\u{5d0}\u{5d1}\u{5d2}", f32::MAX, &[]).direction(),
        Direction::RightToLeft
    );
    // A trailing Latin paragraph does not flip the document direction.
    assert_eq!(
        build_layout("\u{5d0}\u{5d1}\n abc", f32::MAX, &[]).direction(),
        Direction::RightToLeft
    );
}

#[test]
fn content_widths_bound_the_layout() {
    let layout = build_layout("ab cd", f32::MAX, &[]);
    let (min, max) = layout.content_widths();
    assert_eq!(min, 16.);
    assert_eq!(max, 40.);
}

#[test]
fn layout_reuse_clears_previous_content() {
    use crate::tests::utils::TestFonts;
    use crate::{AttrSet, ContentRun, LayoutContext, LayoutParams};

    let mut layout = crate::Layout::<()>::new();
    let mut cx = LayoutContext::new();
    let params = LayoutParams::default();
    cx.build(
        &TestFonts,
        &params,
        &[ContentRun::text("first build", AttrSet::default())],
        &mut layout,
    );
    assert_eq!(layout.codepoints().len(), 11);
    cx.build(
        &TestFonts,
        &params,
        &[ContentRun::text("re", AttrSet::default())],
        &mut layout,
    );
    assert_eq!(layout.codepoints().len(), 2);
    assert_eq!(layout.len(), 1);
    assert_eq!(layout.width(), 16.);
}
