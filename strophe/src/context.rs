// Copyright 2025 the Strophe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Build context and build inputs.

use core::fmt;

use crate::analysis::{analyze, LanguageSpan};
use crate::attribute::{AttrCollection, AttrSet};
use crate::font::{FontSystem, WordBreakProvider};
use crate::itemize::{itemize, ItemizeScratch, ShapingRun};
use crate::layout::data::{ContentRunData, ObjectDims, RunKind};
use crate::layout::line::finish::finish_lines;
use crate::layout::line::greedy::break_lines;
use crate::layout::{Layout, LayoutFlags};
use crate::resolve::{resolve_layout_style, resolve_run_style};
use crate::shape::{shape_runs, ShapeScratch};
use crate::style::Brush;

/// Options for a layout build.
///
/// Geometry is unbounded where `f32::MAX` (or any non-finite value) is
/// given. Everything stylistic, including wrap and overflow modes, comes
/// from `attributes`.
pub struct LayoutParams<'a, B: Brush> {
    pub layout_width: f32,
    pub layout_height: f32,
    pub flags: LayoutFlags,
    /// Value rendered by counter-style list markers.
    pub list_marker_counter: u32,
    /// Layout-level attribute chain; also the default for content runs.
    pub attributes: AttrSet<'a, B>,
    pub attribute_collection: Option<&'a AttrCollection<B>>,
    /// Language-specific word breakers for CJK and Thai.
    pub word_breaker: Option<&'a dyn WordBreakProvider>,
    /// Display scale applied to resolved lengths.
    pub scale: f32,
}

impl<'a, B: Brush> Default for LayoutParams<'a, B> {
    fn default() -> Self {
        Self {
            layout_width: f32::MAX,
            layout_height: f32::MAX,
            flags: LayoutFlags::empty(),
            list_marker_counter: 0,
            attributes: AttrSet::default(),
            attribute_collection: None,
            word_breaker: None,
            scale: 1.,
        }
    }
}

impl<B: Brush> fmt::Debug for LayoutParams<'_, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutParams")
            .field("layout_width", &self.layout_width)
            .field("layout_height", &self.layout_height)
            .field("flags", &self.flags)
            .field("list_marker_counter", &self.list_marker_counter)
            .field("scale", &self.scale)
            .finish_non_exhaustive()
    }
}

/// The payload of one content run.
#[derive(Copy, Clone, Debug)]
pub enum RunContent<'a> {
    Utf8(&'a str),
    Utf32(&'a [char]),
    /// An inline box; `baseline_ratio` is the fraction of the height
    /// above the object's reference baseline.
    Object {
        width: f32,
        height: f32,
        baseline_ratio: f32,
    },
    Icon {
        icon: u64,
        width: f32,
        height: f32,
    },
}

/// One run of build input: content plus its attribute chain.
///
/// Content runs partition the text in logical order; text is copied into
/// the layout's own buffer during the build, so the borrows end with the
/// build call.
#[derive(Debug)]
pub struct ContentRun<'a, B: Brush> {
    pub content: RunContent<'a>,
    pub attrs: AttrSet<'a, B>,
    /// Free-form id reported back on layout runs.
    pub id: u64,
}

impl<B: Brush> Copy for ContentRun<'_, B> {}

impl<B: Brush> Clone for ContentRun<'_, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, B: Brush> ContentRun<'a, B> {
    pub fn text(text: &'a str, attrs: AttrSet<'a, B>) -> Self {
        Self {
            content: RunContent::Utf8(text),
            attrs,
            id: 0,
        }
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = id;
        self
    }
}

/// Scratch space for layout builds.
///
/// A context owns every reusable allocation of the build pipeline.
/// Builds are synchronous and run to completion; nothing borrowed from
/// the context outlives a build call. Use one context per thread.
#[derive(Default)]
pub struct LayoutContext {
    char_starts: Vec<usize>,
    spans: Vec<LanguageSpan>,
    shaping_runs: Vec<ShapingRun>,
    itemize_scratch: ItemizeScratch,
    shape_scratch: ShapeScratch,
}

impl LayoutContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds `layout` from a sequence of content runs.
    ///
    /// The layout is cleared first; configuration problems degrade to a
    /// deterministic fallback (empty or partial layout) rather than an
    /// error.
    pub fn build<B: Brush>(
        &mut self,
        fonts: &dyn FontSystem,
        params: &LayoutParams<'_, B>,
        runs: &[ContentRun<'_, B>],
        layout: &mut Layout<B>,
    ) {
        let collection = params.attribute_collection;
        let scale = if params.scale > 0. { params.scale } else { 1. };
        let data = &mut layout.data;
        data.clear();
        data.scale = scale;
        data.max_width = sanitize_extent(params.layout_width);
        data.max_height = sanitize_extent(params.layout_height);
        data.flags = params.flags;
        data.list_marker_counter = params.list_marker_counter;
        data.layout_style = resolve_layout_style(&params.attributes, collection, scale);

        for run in runs {
            let char_start = data.chars.len();
            let byte_start = data.text.len();
            let (kind, object) = match run.content {
                RunContent::Utf8(text) => {
                    data.text.push_str(text);
                    data.chars.extend(text.chars());
                    (RunKind::Text, None)
                }
                RunContent::Utf32(chars) => {
                    data.chars.extend_from_slice(chars);
                    data.text.extend(chars.iter());
                    (RunKind::Text, None)
                }
                RunContent::Object {
                    width,
                    height,
                    baseline_ratio,
                } => {
                    data.text.push('\u{fffc}');
                    data.chars.push('\u{fffc}');
                    (
                        RunKind::Object,
                        Some(ObjectDims {
                            width,
                            height,
                            baseline_ratio,
                            icon: None,
                        }),
                    )
                }
                RunContent::Icon {
                    icon,
                    width,
                    height,
                } => {
                    data.text.push('\u{fffc}');
                    data.chars.push('\u{fffc}');
                    (
                        RunKind::Icon,
                        Some(ObjectDims {
                            width,
                            height,
                            baseline_ratio: 1.,
                            icon: Some(icon),
                        }),
                    )
                }
            };
            let attrs = run.attrs.with_parent(&params.attributes);
            data.content_runs.push(ContentRunData {
                kind,
                text_range: char_start..data.chars.len(),
                byte_range: byte_start..data.text.len(),
                style: resolve_run_style(&attrs, collection, scale),
                id: run.id,
                object,
            });
        }

        self.spans.clear();
        self.spans
            .extend(data.content_runs.iter().map(|content| LanguageSpan {
                range: content.byte_range.clone(),
                language: content.style.language,
            }));
        data.direction = analyze(
            &data.text,
            data.layout_style.base_direction,
            &self.spans,
            params.word_breaker,
            &mut self.char_starts,
            &mut data.props,
        );
        data.base_level = u8::from(data.direction.is_rtl());

        self.shaping_runs.clear();
        self.itemize_scratch.clear();
        itemize(
            &data.chars,
            &data.props,
            &data.content_runs,
            fonts,
            &mut self.itemize_scratch,
            &mut self.shaping_runs,
        );
        shape_runs(data, fonts, &self.shaping_runs, &mut self.shape_scratch);
        break_lines(data);
        finish_lines(data, fonts);
    }
}

fn sanitize_extent(value: f32) -> f32 {
    if value.is_finite() && value > 0. {
        value
    } else {
        f32::MAX
    }
}
