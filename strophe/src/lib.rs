// Copyright 2025 the Strophe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Strophe is a library for shaping and laying out attributed rich text.
//!
//! Some key types are:
//! - [`LayoutContext`] is reusable scratch space for builds; keep one per
//!   thread.
//! - [`FontSystem`] is the contract to the host's font collection and
//!   shaper; Strophe never loads fonts itself.
//! - [`ContentRun`] describes one run of build input: UTF-8 or UTF-32
//!   text, an inline object, or an icon, plus its [`AttrSet`] chain.
//! - [`Layout`] is the built result: lines of positioned glyphs,
//!   decorations, and the caret and selection queries over them.
//!
//! A build is a single synchronous call:
//!
//! ```ignore
//! let mut cx = LayoutContext::new();
//! let mut layout = Layout::new();
//! let params = LayoutParams {
//!     layout_width: 240.0,
//!     attributes: AttrSet::new(&defaults),
//!     ..LayoutParams::default()
//! };
//! cx.build(&fonts, &params, &[ContentRun::text(text, AttrSet::default())], &mut layout);
//! for line in layout.lines() {
//!     for run in line.runs() {
//!         // draw run.glyphs()
//!     }
//! }
//! ```
//!
//! The layout is read-only after the build; rebuild it when the text or
//! attributes change.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(clippy::print_stdout, clippy::print_stderr)]
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
#![allow(missing_docs, reason = "We have many as-yet undocumented items.")]
#![expect(missing_debug_implementations, reason = "Deferred")]
#![allow(
    clippy::cast_possible_truncation,
    reason = "Narrowing index stores are bounded by construction."
)]

mod analysis;
mod context;
mod font;
mod itemize;
mod resolve;
mod shape;
mod util;

pub mod attribute;
pub mod caret;
pub mod layout;
pub mod style;

#[cfg(test)]
mod tests;

pub use analysis::{CharFlags, CharProps};
pub use attribute::{AttrCollection, AttrKind, AttrSet, Attribute, GroupId, SetHandle, TextDecoration};
pub use caret::{Affinity, CaretGeometry, CaretIter, CaretSide, CaretStep, Movement, TextPosition};
pub use context::{ContentRun, LayoutContext, LayoutParams, RunContent};
pub use font::{
    Baseline, BaselineSet, FontFeature, FontId, FontMetrics, FontQuery, FontSystem, RawGlyph,
    ShapeRequest, WordBreakProvider,
};
pub use layout::{
    BreakReason, Cluster, Decoration, Glyph, Layout, LayoutFlags, Line, LineMetrics, Run, RunKind,
};
pub use resolve::{LayoutStyle, RunStyle};
pub use style::*;
pub use util::Rect;

// The script type in font queries and run metadata is the provider's.
pub use unicode_script::Script;
