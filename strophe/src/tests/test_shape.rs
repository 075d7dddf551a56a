// Copyright 2025 the Strophe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::tests::utils::{build_runs, EMOJI, SANS};
use crate::{AttrSet, Attribute, ContentRun, RunKind};

fn text_run<'a>(text: &'a str, attrs: AttrSet<'a, ()>) -> ContentRun<'a, ()> {
    ContentRun::text(text, attrs)
}

#[test]
fn ligature_covers_two_codepoints() {
    let layout = build_runs(&[text_run("fi", AttrSet::default())], f32::MAX, &[]);
    let line = layout.get(0).unwrap();
    let run = line.run(0).unwrap();
    // One cluster, one glyph, two codepoints.
    assert_eq!(run.len(), 1);
    let cluster = run.get(0).unwrap();
    assert_eq!(cluster.text_range(), 0..2);
    assert_eq!(cluster.glyphs().len(), 1);
    assert_eq!(cluster.grapheme_count(), 2);

    // The caret iterator still stops inside the ligature, splitting the
    // advance evenly.
    let mut iter = layout.caret_iter(0);
    let mut cells = Vec::new();
    while let Some(step) = iter.next() {
        cells.push(step);
    }
    assert_eq!(cells.len(), 2);
    assert_eq!(cells[0].advance, 8.);
    assert_eq!(cells[1].x, 8.);
}

#[test]
fn positive_letter_spacing_disables_ligatures() {
    let attrs = [Attribute::LetterSpacing(2.)];
    let layout = build_runs(&[text_run("fi", AttrSet::new(&attrs))], f32::MAX, &[]);
    let line = layout.get(0).unwrap();
    let run = line.run(0).unwrap();
    assert_eq!(run.len(), 2);
    // Spacing lands on the last glyph of each cluster.
    assert_eq!(run.get(0).unwrap().advance(), 10.);
    assert_eq!(run.get(1).unwrap().advance(), 10.);
    assert_eq!(layout.width(), 20.);
}

#[test]
fn word_spacing_applies_to_spaces() {
    let attrs = [Attribute::WordSpacing(4.)];
    let layout = build_runs(&[text_run("a b", AttrSet::new(&attrs))], f32::MAX, &[]);
    let run = layout.get(0).unwrap().run(0).unwrap();
    assert_eq!(run.get(0).unwrap().advance(), 8.);
    assert_eq!(run.get(1).unwrap().advance(), 12.);
    assert_eq!(run.get(2).unwrap().advance(), 8.);
}

#[test]
fn cursive_scripts_are_exempt_from_letter_spacing() {
    let attrs = [Attribute::LetterSpacing(2.)];
    let layout = build_runs(
        &[text_run("\u{627}\u{628}\u{62a}", AttrSet::new(&attrs))],
        f32::MAX,
        &[],
    );
    let run = layout.get(0).unwrap().run(0).unwrap();
    for cluster in run.clusters() {
        assert_eq!(cluster.advance(), 8.);
    }
}

#[test]
fn missing_coverage_falls_back_to_tofu_from_the_first_candidate() {
    // No test font covers Arabic; the run still shapes with the first
    // candidate and the tofu is the error signal.
    let layout = build_runs(
        &[text_run("\u{627}\u{628}", AttrSet::default())],
        f32::MAX,
        &[],
    );
    let run = layout.get(0).unwrap().run(0).unwrap();
    assert_eq!(run.font(), Some(SANS));
    assert_eq!(run.glyphs().len(), 2);
}

#[test]
fn emoji_runs_use_the_emoji_family() {
    let layout = build_runs(
        &[text_run("a\u{1f600}b", AttrSet::default())],
        f32::MAX,
        &[],
    );
    let line = layout.get(0).unwrap();
    assert_eq!(line.len(), 3);
    let emoji = line.run(1).unwrap();
    assert!(emoji.is_emoji());
    assert_eq!(emoji.font(), Some(EMOJI));
    assert_eq!(line.run(0).unwrap().font(), Some(SANS));
}

#[test]
fn font_change_splits_shaping_runs() {
    // Hebrew inside Latin forces a font change mid-content-run.
    let layout = build_runs(
        &[text_run("ab\u{5d0}cd", AttrSet::default())],
        f32::MAX,
        &[],
    );
    let line = layout.get(0).unwrap();
    assert_eq!(line.len(), 3);
    let fonts: Vec<_> = line.runs().map(|run| run.font()).collect();
    assert_eq!(fonts[1], Some(crate::tests::utils::HEBREW));
}

#[test]
fn control_characters_render_as_spaces() {
    let layout = build_runs(&[text_run("a\u{7}b", AttrSet::default())], f32::MAX, &[]);
    let run = layout.get(0).unwrap().run(0).unwrap();
    let glyphs = run.glyphs();
    assert_eq!(glyphs[1].id, ' ' as u32);
}

#[test]
fn content_runs_split_layout_runs() {
    let bold = [Attribute::FontWeight(crate::FontWeight::BOLD)];
    let layout = build_runs(
        &[
            text_run("ab", AttrSet::default()),
            text_run("cd", AttrSet::new(&bold)),
        ],
        f32::MAX,
        &[],
    );
    let line = layout.get(0).unwrap();
    assert_eq!(line.len(), 2);
    assert_eq!(line.run(0).unwrap().text_range(), 0..2);
    assert_eq!(line.run(1).unwrap().text_range(), 2..4);
    assert_eq!(line.run(1).unwrap().offset(), 16.);
}

#[test]
fn icon_run_reports_its_kind() {
    let runs = [
        ContentRun {
            content: crate::RunContent::Icon {
                icon: 42,
                width: 12.,
                height: 12.,
            },
            attrs: AttrSet::default(),
            id: 1,
        },
        text_run("x", AttrSet::default()),
    ];
    let layout = build_runs(&runs, f32::MAX, &[]);
    let line = layout.get(0).unwrap();
    let icon = line.run(0).unwrap();
    assert_eq!(icon.kind(), RunKind::Icon);
    assert_eq!(icon.advance(), 12.);
    // The icon occupies exactly one replacement codepoint.
    assert_eq!(icon.text_range(), 0..1);
    assert_eq!(layout.codepoints()[0], '\u{fffc}');
}
