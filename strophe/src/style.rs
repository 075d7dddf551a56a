// Copyright 2025 the Strophe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared style primitives.

use core::fmt;

/// Trait for types that represent the color of glyphs or decorations.
pub trait Brush: Clone + PartialEq + Default + fmt::Debug {}

impl<T: Clone + PartialEq + Default + fmt::Debug> Brush for T {}

/// Visual weight class of a font, on a scale from 1.0 to 1000.0.
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug)]
pub struct FontWeight(f32);

impl FontWeight {
    pub const THIN: Self = Self(100.0);
    pub const LIGHT: Self = Self(300.0);
    pub const NORMAL: Self = Self(400.0);
    pub const MEDIUM: Self = Self(500.0);
    pub const SEMI_BOLD: Self = Self(600.0);
    pub const BOLD: Self = Self(700.0);
    pub const BLACK: Self = Self(900.0);

    pub fn new(weight: f32) -> Self {
        Self(weight.clamp(1.0, 1000.0))
    }

    pub fn value(self) -> f32 {
        self.0
    }
}

impl Default for FontWeight {
    fn default() -> Self {
        Self::NORMAL
    }
}

/// Visual style or 'slope' of a font.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
    Oblique,
}

/// Width of a font relative to the normal design, as a fraction.
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug)]
pub struct FontStretch(f32);

impl FontStretch {
    pub const CONDENSED: Self = Self(0.75);
    pub const NORMAL: Self = Self(1.0);
    pub const EXPANDED: Self = Self(1.25);

    pub fn new(ratio: f32) -> Self {
        Self(ratio.clamp(0.5, 2.0))
    }

    pub fn ratio(self) -> f32 {
        self.0
    }
}

impl Default for FontStretch {
    fn default() -> Self {
        Self::NORMAL
    }
}

/// Resolved direction of a run of text.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
pub enum Direction {
    #[default]
    LeftToRight,
    RightToLeft,
}

impl Direction {
    pub fn is_rtl(self) -> bool {
        self == Self::RightToLeft
    }

    pub(crate) fn from_level(level: u8) -> Self {
        if level & 1 != 0 {
            Self::RightToLeft
        } else {
            Self::LeftToRight
        }
    }
}

/// Requested base direction of a layout.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
pub enum BaseDirection {
    /// Detect from the first strong character of the first paragraph.
    #[default]
    Auto,
    LeftToRight,
    RightToLeft,
}

/// Line wrapping mode.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
pub enum Wrap {
    /// Break only at mandatory break characters.
    #[default]
    None,
    /// Break between words.
    Word,
    /// Break between words; fall back to breaking inside a word that is
    /// wider than a whole line.
    WordChar,
}

/// Handling of lines wider than the layout.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
pub enum Overflow {
    /// Leave overflowing lines untouched.
    #[default]
    None,
    /// Remove clusters from the visual end until the line fits.
    Clip,
    /// Remove clusters from the visual end and terminate the line with an
    /// ellipsis.
    Ellipsis,
}

/// Horizontal alignment of lines within the layout width.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
pub enum AlignHorizontal {
    /// Aligned towards the leading edge of the base direction.
    #[default]
    Start,
    Center,
    /// Aligned towards the trailing edge of the base direction.
    End,
    Left,
    Right,
}

/// Vertical alignment of the line stack within the layout height.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
pub enum AlignVertical {
    #[default]
    Top,
    Center,
    Bottom,
}

/// Trimming of the space above the first and below the last line.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
pub enum VerticalTrim {
    #[default]
    Standard,
    /// Trim to the cap height of the first line and the baseline of the
    /// last line.
    CapToBaseline,
}

/// Line height of a run.
#[derive(Copy, Clone, PartialEq, Default, Debug)]
pub enum LineHeight {
    /// The ascender to descender span of the font.
    #[default]
    Normal,
    /// The ascender to descender span of the font times a factor.
    MetricsRelative(f32),
    /// The font size times a factor.
    FontSizeRelative(f32),
    /// A fixed value in layout units.
    Absolute(f32),
}

/// Side of the text a decoration line is drawn on.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
pub enum DecorationPosition {
    #[default]
    Under,
    Over,
    Through,
    /// Under the lowest descender of the line rather than relative to the
    /// baseline.
    Bottom,
}

/// Stroke style of a decoration line.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
pub enum DecorationStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
    Wavy,
}

/// Choice of the text run an inline object is baseline-aligned against.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
pub enum ObjectAlignRef {
    Before,
    After,
    #[default]
    BeforeOrAfter,
    AfterOrBefore,
}

/// Counter system for numbered list markers.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum CounterSystem {
    /// 0, 1, .. 9, 10, 11, ..
    Decimal,
    /// a, b, .. z, aa, ab, ..
    LowerAlpha,
    /// A, B, .. Z, AA, AB, ..
    UpperAlpha,
}

/// Shape of a list marker.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum MarkerKind {
    /// A single codepoint, such as a bullet.
    Symbol(char),
    /// A counter rendered with a trailing full stop.
    Counter(CounterSystem),
}

/// List marker configuration.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct ListMarker {
    /// Extra indentation reserved for the marker.
    pub indent: f32,
    pub kind: MarkerKind,
}

impl Default for ListMarker {
    fn default() -> Self {
        Self {
            indent: 0.,
            kind: MarkerKind::Symbol('\u{2022}'),
        }
    }
}

/// A BCP-47 style language tag, stored inline.
///
/// Only the pieces the layout engine consumes are modelled: the primary
/// language subtag and an optional script subtag ("zh-Hans").
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct Lang {
    tag: [u8; 16],
    len: u8,
}

impl Lang {
    /// Parses a language tag. Returns `None` for tags that are empty,
    /// overlong or not ASCII.
    pub fn parse(tag: &str) -> Option<Self> {
        if tag.is_empty() || tag.len() > 16 || !tag.is_ascii() {
            return None;
        }
        let mut bytes = [0_u8; 16];
        for (dst, src) in bytes.iter_mut().zip(tag.bytes()) {
            *dst = match src {
                b'_' => b'-',
                _ => src.to_ascii_lowercase(),
            };
        }
        Some(Self {
            tag: bytes,
            len: tag.len() as u8,
        })
    }

    pub fn as_str(&self) -> &str {
        // Constructed from checked ASCII in `parse`.
        core::str::from_utf8(&self.tag[..self.len as usize]).unwrap_or("")
    }

    /// The primary language subtag ("zh" for "zh-Hans").
    pub fn language(&self) -> &str {
        let s = self.as_str();
        s.split('-').next().unwrap_or(s)
    }

    /// The script subtag, if present ("hans" for "zh-Hans").
    pub fn script(&self) -> Option<&str> {
        self.as_str()
            .split('-')
            .skip(1)
            .find(|part| part.len() == 4 && part.chars().all(|c| c.is_ascii_alphabetic()))
    }
}
