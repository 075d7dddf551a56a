// Copyright 2025 the Strophe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-codepoint text properties: segmentation boundaries, character
//! classes, resolved scripts and bidi levels.
//!
//! Flags describing a boundary (grapheme, word, line break) refer to the
//! boundary *before* the flagged codepoint; the boundary after the last
//! codepoint is implicit and always a valid break.

use bitflags::bitflags;
use unicode_bidi::{BidiInfo, Level};
use unicode_linebreak::BreakOpportunity;
use unicode_properties::{GeneralCategoryGroup, UnicodeEmoji, UnicodeGeneralCategory};
use unicode_script::{Script, UnicodeScript};
use unicode_segmentation::UnicodeSegmentation;

use crate::font::WordBreakProvider;
use crate::style::{BaseDirection, Direction, Lang};

bitflags! {
    /// Boundary and class flags for one codepoint.
    #[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
    pub struct CharFlags: u16 {
        /// A grapheme cluster boundary precedes this codepoint.
        const GRAPHEME_BREAK = 1 << 0;
        /// A word boundary precedes this codepoint.
        const WORD_BREAK = 1 << 1;
        /// A line may break before this codepoint.
        const ALLOW_LINE_BREAK = 1 << 2;
        /// A line must break before this codepoint.
        const MUST_LINE_BREAK = 1 << 3;
        const WHITESPACE = 1 << 4;
        const CONTROL = 1 << 5;
        const PUNCTUATION = 1 << 6;
        const EMOJI = 1 << 7;
    }
}

/// Resolved properties of one codepoint.
#[derive(Copy, Clone, Debug)]
pub struct CharProps {
    pub flags: CharFlags,
    /// Script after common/inherited resolution.
    pub script: Script,
    /// Resolved bidi embedding level; odd levels are right-to-left.
    pub bidi_level: u8,
}

impl Default for CharProps {
    fn default() -> Self {
        Self {
            flags: CharFlags::default(),
            script: Script::Latin,
            bidi_level: 0,
        }
    }
}

impl CharProps {
    pub fn is_whitespace(self) -> bool {
        self.flags.contains(CharFlags::WHITESPACE)
    }

    pub fn is_control(self) -> bool {
        self.flags.contains(CharFlags::CONTROL)
    }

    pub fn is_emoji(self) -> bool {
        self.flags.contains(CharFlags::EMOJI)
    }

    pub fn direction(self) -> Direction {
        Direction::from_level(self.bidi_level)
    }
}

/// A language-tagged slice of the text, used to route language-specific
/// word breaking.
pub(crate) struct LanguageSpan {
    /// Byte range in the analyzed string.
    pub(crate) range: core::ops::Range<usize>,
    pub(crate) language: Option<Lang>,
}

/// Analyzes `text`, appending one [`CharProps`] per codepoint to `props`.
/// Returns the resolved base direction of the text (the base level of the
/// first paragraph).
pub(crate) fn analyze(
    text: &str,
    base: BaseDirection,
    spans: &[LanguageSpan],
    word_breaker: Option<&dyn WordBreakProvider>,
    char_starts: &mut Vec<usize>,
    props: &mut Vec<CharProps>,
) -> Direction {
    let start = props.len();
    char_starts.clear();
    for (byte_index, ch) in text.char_indices() {
        char_starts.push(byte_index);
        props.push(CharProps {
            flags: classify(ch),
            script: ch.script(),
            bidi_level: 0,
        });
    }
    let props = &mut props[start..];
    if props.is_empty() {
        return match base {
            BaseDirection::RightToLeft => Direction::RightToLeft,
            _ => Direction::LeftToRight,
        };
    }

    resolve_scripts(props);
    mark_emoji(text, props);
    mark_boundaries(text, char_starts, props);
    apply_language_breaks(text, char_starts, props, spans, word_breaker);
    resolve_levels(text, base, char_starts, props)
}

fn classify(ch: char) -> CharFlags {
    let mut flags = CharFlags::empty();
    if ch.is_whitespace() {
        flags |= CharFlags::WHITESPACE;
    }
    if ch.is_control() {
        flags |= CharFlags::CONTROL;
    }
    if ch.general_category_group() == GeneralCategoryGroup::Punctuation {
        flags |= CharFlags::PUNCTUATION;
    }
    flags
}

/// Propagates strong scripts over common and inherited codepoints: a
/// leading run takes the first strong script that follows (Latin when the
/// text has none), later codepoints take the preceding resolved script.
fn resolve_scripts(props: &mut [CharProps]) {
    let mut leading = props.len();
    let mut current = None;
    for (i, p) in props.iter_mut().enumerate() {
        if is_real_script(p.script) {
            if current.is_none() {
                leading = i;
            }
            current = Some(p.script);
        } else if let Some(script) = current {
            p.script = script;
        }
    }
    let first = current.map_or(Script::Latin, |_| props[leading].script);
    let leading = leading.min(props.len());
    for p in &mut props[..leading] {
        p.script = first;
    }
}

fn is_real_script(script: Script) -> bool {
    !matches!(script, Script::Common | Script::Inherited | Script::Unknown)
}

fn mark_emoji(text: &str, props: &mut [CharProps]) {
    let mut prev = usize::MAX;
    for (i, ch) in text.chars().enumerate() {
        let emoji = match ch {
            // Variation selector 16 requests emoji presentation for the
            // preceding codepoint.
            '\u{fe0f}' => {
                if prev != usize::MAX {
                    props[prev].flags |= CharFlags::EMOJI;
                }
                true
            }
            // Joiners and modifiers continue an emoji sequence.
            '\u{200d}' | '\u{20e3}' => prev != usize::MAX && props[prev].is_emoji(),
            '\u{1f3fb}'..='\u{1f3ff}' => true,
            // Regional indicator pairs (flags).
            '\u{1f1e6}'..='\u{1f1ff}' => true,
            _ => !ch.is_ascii() && ch.is_emoji_char(),
        };
        if emoji {
            props[i].flags |= CharFlags::EMOJI;
        }
        prev = i;
    }
}

fn mark_boundaries(text: &str, char_starts: &[usize], props: &mut [CharProps]) {
    for (byte_index, _) in text.grapheme_indices(true) {
        let i = char_index(char_starts, byte_index);
        props[i].flags |= CharFlags::GRAPHEME_BREAK;
    }
    for (byte_index, _) in text.split_word_bound_indices() {
        let i = char_index(char_starts, byte_index);
        props[i].flags |= CharFlags::WORD_BREAK;
    }
    for (byte_index, opportunity) in unicode_linebreak::linebreaks(text) {
        if byte_index >= text.len() {
            continue;
        }
        let i = char_index(char_starts, byte_index);
        props[i].flags |= match opportunity {
            BreakOpportunity::Mandatory => CharFlags::MUST_LINE_BREAK,
            BreakOpportunity::Allowed => CharFlags::ALLOW_LINE_BREAK,
        };
    }
    // A tab always offers a break opportunity before itself, whatever the
    // generic algorithm said.
    for (i, ch) in text.chars().enumerate() {
        if ch == '\t' {
            props[i].flags |= CharFlags::ALLOW_LINE_BREAK;
        }
    }
}

/// Replaces generic break opportunities with language-specific word
/// breaks over spans whose language has a dedicated breaker.
fn apply_language_breaks(
    text: &str,
    char_starts: &[usize],
    props: &mut [CharProps],
    spans: &[LanguageSpan],
    word_breaker: Option<&dyn WordBreakProvider>,
) {
    let Some(breaker) = word_breaker else {
        return;
    };
    let mut breaks = Vec::new();
    for span in spans {
        let Some(language) = span.language else {
            continue;
        };
        if !matches!(language.language(), "ja" | "zh" | "th") {
            continue;
        }
        let slice = &text[span.range.clone()];
        let script = props[char_index(char_starts, span.range.start)].script;
        breaks.clear();
        if !breaker.word_breaks(&language, script, slice, &mut breaks) {
            continue;
        }
        let start = char_index(char_starts, span.range.start);
        let end = char_starts
            .binary_search(&span.range.end)
            .unwrap_or_else(|i| i);
        for p in &mut props[start + 1..end] {
            p.flags &= !CharFlags::ALLOW_LINE_BREAK;
        }
        for &b in &breaks {
            let byte = span.range.start + b;
            if byte >= span.range.end {
                continue;
            }
            let i = char_index(char_starts, byte);
            if i > start {
                props[i].flags |= CharFlags::ALLOW_LINE_BREAK;
            }
        }
    }
}

fn resolve_levels(
    text: &str,
    base: BaseDirection,
    char_starts: &[usize],
    props: &mut [CharProps],
) -> Direction {
    let level = match base {
        BaseDirection::Auto => None,
        BaseDirection::LeftToRight => Some(Level::ltr()),
        BaseDirection::RightToLeft => Some(Level::rtl()),
    };
    let bidi = BidiInfo::new(text, level);
    for (i, &byte_index) in char_starts.iter().enumerate() {
        props[i].bidi_level = bidi.levels[byte_index].number();
    }
    // The document direction follows the first paragraph; later
    // paragraphs keep their own base level but do not flip the layout.
    let resolved = bidi
        .paragraphs
        .first()
        .map(|p| p.level)
        .unwrap_or(Level::ltr());
    if resolved.is_rtl() {
        Direction::RightToLeft
    } else {
        Direction::LeftToRight
    }
}

fn char_index(char_starts: &[usize], byte_index: usize) -> usize {
    char_starts
        .binary_search(&byte_index)
        .unwrap_or_else(|i| i.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze_plain(text: &str) -> Vec<CharProps> {
        let mut props = Vec::new();
        let mut starts = Vec::new();
        analyze(
            text,
            BaseDirection::Auto,
            &[],
            None,
            &mut starts,
            &mut props,
        );
        props
    }

    #[test]
    fn scripts_inherit_across_common() {
        let props = analyze_plain("!? abc");
        // Leading punctuation takes the first strong script.
        assert!(props.iter().all(|p| p.script == Script::Latin));

        let props = analyze_plain("\u{5d0}\u{5d1}, abc");
        assert_eq!(props[0].script, Script::Hebrew);
        // The comma and space inherit the preceding Hebrew.
        assert_eq!(props[2].script, Script::Hebrew);
        assert_eq!(props[3].script, Script::Hebrew);
        assert_eq!(props[4].script, Script::Latin);
    }

    #[test]
    fn scripts_fall_back_to_latin() {
        let props = analyze_plain("., !");
        assert!(props.iter().all(|p| p.script == Script::Latin));
    }

    #[test]
    fn tab_allows_break_before_itself() {
        let props = analyze_plain("ab\tcd");
        assert!(props[2].flags.contains(CharFlags::ALLOW_LINE_BREAK));
    }

    #[test]
    fn newline_forces_break_before_next() {
        let props = analyze_plain("abc\ndef");
        assert!(props[4].flags.contains(CharFlags::MUST_LINE_BREAK));
        assert!(!props[3].flags.contains(CharFlags::MUST_LINE_BREAK));
    }

    #[test]
    fn space_allows_break_before_next_word() {
        let props = analyze_plain("hello world");
        assert!(props[6].flags.contains(CharFlags::ALLOW_LINE_BREAK));
        assert!(props[6].flags.contains(CharFlags::WORD_BREAK));
    }

    #[test]
    fn hebrew_gets_odd_levels() {
        let props = analyze_plain("abc\u{5d0}\u{5d1}\u{5d2}def");
        assert_eq!(props[0].bidi_level, 0);
        assert_eq!(props[3].bidi_level, 1);
        assert_eq!(props[4].bidi_level, 1);
        assert_eq!(props[6].bidi_level, 0);
    }

    #[test]
    fn emoji_flagged() {
        let props = analyze_plain("a\u{1f600}b");
        assert!(!props[0].is_emoji());
        assert!(props[1].is_emoji());
        assert!(!props[2].is_emoji());
    }

    #[test]
    fn language_override_replaces_generic_breaks() {
        struct EveryThree;
        impl WordBreakProvider for EveryThree {
            fn word_breaks(
                &self,
                _language: &Lang,
                _script: Script,
                text: &str,
                breaks: &mut Vec<usize>,
            ) -> bool {
                for (n, (byte, _)) in text.char_indices().enumerate() {
                    if n > 0 && n % 3 == 0 {
                        breaks.push(byte);
                    }
                }
                true
            }
        }
        let text = "\u{0e01}\u{0e02}\u{0e03}\u{0e04}\u{0e05}\u{0e06}";
        let mut props = Vec::new();
        let mut starts = Vec::new();
        analyze(
            text,
            BaseDirection::Auto,
            &[LanguageSpan {
                range: 0..text.len(),
                language: Lang::parse("th"),
            }],
            Some(&EveryThree),
            &mut starts,
            &mut props,
        );
        let allowed: Vec<usize> = props
            .iter()
            .enumerate()
            .filter(|(_, p)| p.flags.contains(CharFlags::ALLOW_LINE_BREAK))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(allowed, vec![3]);
    }
}
