// Copyright 2025 the Strophe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout types.

mod cluster;
mod glyph;
mod run;

pub(crate) mod line;

#[expect(
    clippy::module_inception,
    reason = "Private inner module for code organisation"
)]
mod layout;

pub(crate) mod data;

use bitflags::bitflags;

pub use cluster::Cluster;
pub use data::{BreakReason, RunKind};
pub use glyph::Glyph;
pub use layout::Layout;
pub use line::{Line, LineMetrics};
pub use run::Run;

use crate::style::{Brush, DecorationPosition, DecorationStyle};

bitflags! {
    /// Behavior switches for a layout build.
    #[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
    pub struct LayoutFlags: u32 {
        /// Treat mandatory break characters as ordinary codepoints.
        const IGNORE_MUST_LINE_BREAKS = 1 << 0;
        /// Pin the line stack to the top regardless of vertical
        /// alignment attributes.
        const IGNORE_VERTICAL_ALIGN = 1 << 1;
    }
}

/// A positioned decoration line (underline, overline, strikethrough).
///
/// `y` is the absolute position of the decoration line; renderers grow
/// the thickness downward for `Under`/`Bottom` and upward for
/// `Over`/`Through`.
#[derive(Clone, PartialEq, Debug)]
pub struct Decoration<B: Brush> {
    pub x: f32,
    pub y: f32,
    pub length: f32,
    /// Visual start of the decorated span, letting dash patterns tile
    /// coherently across adjacent runs.
    pub pattern_offset: f32,
    pub thickness: f32,
    pub brush: B,
    pub position: DecorationPosition,
    pub style: DecorationStyle,
    /// First layout run of the decorated span within its line.
    pub item_index: u32,
}
