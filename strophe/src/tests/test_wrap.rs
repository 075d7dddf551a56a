// Copyright 2025 the Strophe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::tests::utils::build_layout;
use crate::{Attribute, BreakReason, LayoutFlags, Wrap};

#[test]
fn word_wrap_breaks_between_words() {
    let layout = build_layout(
        "Quick fox jumps over lazy dog.",
        100.,
        &[Attribute::Wrap(Wrap::Word)],
    );
    assert_eq!(layout.len(), 3);
    let ranges: Vec<_> = layout.lines().map(|line| line.text_range()).collect();
    assert_eq!(ranges, vec![0..10, 10..21, 21..30]);
    for line in layout.lines() {
        assert!(line.metrics().width() <= 100.);
    }
    // No line starts mid-word: every line start is a word boundary.
    for line in layout.lines().skip(1) {
        assert!(layout.properties()[line.text_range().start]
            .flags
            .contains(crate::CharFlags::WORD_BREAK));
    }
}

#[test]
fn no_wrap_keeps_one_line() {
    let layout = build_layout("Quick fox jumps over lazy dog.", 100., &[]);
    assert_eq!(layout.len(), 1);
}

#[test]
fn word_char_wrap_splits_long_words() {
    let layout = build_layout("abcdefghij", 30., &[Attribute::Wrap(Wrap::WordChar)]);
    let ranges: Vec<_> = layout.lines().map(|line| line.text_range()).collect();
    assert_eq!(ranges, vec![0..3, 3..6, 6..9, 9..10]);
    assert_eq!(layout.get(0).unwrap().break_reason(), BreakReason::Emergency);
    for line in layout.lines() {
        assert!(line.metrics().width() <= 30.);
    }
}

#[test]
fn word_wrap_accepts_overflowing_word() {
    // A word wider than the line is emitted anyway under plain word
    // wrapping; progress is guaranteed.
    let layout = build_layout("ab abcdefghij", 30., &[Attribute::Wrap(Wrap::Word)]);
    assert_eq!(layout.len(), 2);
    assert_eq!(layout.get(1).unwrap().text_range(), 3..13);
    assert!(layout.get(1).unwrap().metrics().width() > 30.);
}

#[test]
fn tab_advances_to_next_stop() {
    let layout = build_layout("a\tb", f32::MAX, &[Attribute::TabStopIncrement(50.)]);
    assert_eq!(layout.len(), 1);
    let line = layout.get(0).unwrap();
    let run = line.run(0).unwrap();
    // 'a' occupies [0, 8); the tab fills to the stop at 50.
    assert_eq!(run.get(0).unwrap().advance(), 8.);
    assert_eq!(run.get(1).unwrap().advance(), 42.);
    let glyphs = run.glyphs();
    assert_eq!(glyphs[0].x, 0.);
    assert_eq!(glyphs[2].x, 50.);
}

#[test]
fn overflowing_tab_forces_a_break() {
    let layout = build_layout(
        "a\tb",
        40.,
        &[
            Attribute::Wrap(Wrap::Word),
            Attribute::TabStopIncrement(50.),
        ],
    );
    // The next stop exceeds the wrap width, so the tab is marked
    // overflowing and 'b' lands on a new line with a full-increment tab.
    assert_eq!(layout.len(), 2);
    assert_eq!(layout.get(1).unwrap().text_range().start, 2);
}

#[test]
fn must_breaks_can_be_ignored() {
    use crate::tests::utils::TestFonts;
    use crate::{AttrSet, ContentRun, LayoutContext, LayoutParams};

    let mut layout = crate::Layout::<()>::new();
    let mut cx = LayoutContext::new();
    let params = LayoutParams {
        flags: LayoutFlags::IGNORE_MUST_LINE_BREAKS,
        ..LayoutParams::default()
    };
    cx.build(
        &TestFonts,
        &params,
        &[ContentRun::text("abc\ndef", AttrSet::default())],
        &mut layout,
    );
    assert_eq!(layout.len(), 1);
}

#[test]
fn first_line_indent_narrows_the_first_line() {
    let layout = build_layout(
        "aaaa bbbb cccc",
        100.,
        &[
            Attribute::Wrap(Wrap::Word),
            Attribute::IndentLevel(1),
            Attribute::IndentIncrements {
                level: 10.,
                first_line: 20.,
            },
        ],
    );
    assert_eq!(layout.len(), 2);
    // First line carries level and first-line indentation, later lines
    // only the level indentation.
    assert_eq!(layout.get(0).unwrap().metrics().offset, 30.);
    assert_eq!(layout.get(1).unwrap().metrics().offset, 10.);
}

#[test]
fn trailing_whitespace_hangs() {
    let layout = build_layout("abcd efgh ", 40., &[Attribute::Wrap(Wrap::Word)]);
    // Both words fit exactly when their trailing spaces hang.
    assert_eq!(layout.len(), 2);
    let first = layout.get(0).unwrap().metrics();
    assert_eq!(first.width(), 32.);
    assert_eq!(first.advance, 40.);
    assert_eq!(first.trailing_whitespace, 8.);
}
