// Copyright 2025 the Strophe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Resolution of attribute chains into concrete style values.

use crate::attribute::{AttrCollection, AttrKind, AttrSet, Attribute, TextDecoration};
use crate::font::{Baseline, FontFeature};
use crate::style::{
    AlignHorizontal, AlignVertical, BaseDirection, Brush, FontStretch, FontStyle, FontWeight, Lang,
    LineHeight, ListMarker, ObjectAlignRef, Overflow, VerticalTrim, Wrap,
};

/// Effective style of one content run, with every default applied.
#[derive(Clone, PartialEq, Debug)]
pub struct RunStyle<B: Brush> {
    pub font_family: String,
    pub font_size: f32,
    pub font_weight: FontWeight,
    pub font_style: FontStyle,
    pub font_stretch: FontStretch,
    pub language: Option<Lang>,
    pub line_height: LineHeight,
    pub letter_spacing: f32,
    pub word_spacing: f32,
    pub fill: B,
    /// Requested decorations, nearest attribute first.
    pub decorations: Vec<TextDecoration<B>>,
    /// Feature settings, outermost attribute first.
    pub features: Vec<FontFeature>,
    pub object_align: ObjectAlignRef,
    pub object_padding: (f32, f32),
    pub baseline_shift: f32,
}

impl<B: Brush> Default for RunStyle<B> {
    fn default() -> Self {
        Self {
            font_family: "sans-serif".to_owned(),
            font_size: 16.,
            font_weight: FontWeight::default(),
            font_style: FontStyle::default(),
            font_stretch: FontStretch::default(),
            language: None,
            line_height: LineHeight::default(),
            letter_spacing: 0.,
            word_spacing: 0.,
            fill: B::default(),
            decorations: Vec::new(),
            features: Vec::new(),
            object_align: ObjectAlignRef::default(),
            object_padding: (0., 0.),
            baseline_shift: 0.,
        }
    }
}

/// Effective layout-level parameters resolved from the layout attributes.
#[derive(Clone, PartialEq, Debug)]
pub struct LayoutStyle<B: Brush> {
    pub base_direction: BaseDirection,
    pub wrap: Wrap,
    pub overflow: Overflow,
    pub vertical_trim: VerticalTrim,
    pub align_horizontal: AlignHorizontal,
    pub align_vertical: AlignVertical,
    pub dominant_baseline: Baseline,
    /// Zero disables tab stops; tabs then keep their shaped advance.
    pub tab_stop_increment: f32,
    pub padding_horizontal: f32,
    pub padding_vertical: f32,
    pub indent_level: u32,
    pub level_increment: f32,
    pub first_line_increment: f32,
    pub list_marker: Option<ListMarker>,
    /// Style markers, ellipses and empty layouts fall back to.
    pub default_run: RunStyle<B>,
}

impl<B: Brush> Default for LayoutStyle<B> {
    fn default() -> Self {
        Self {
            base_direction: BaseDirection::default(),
            wrap: Wrap::default(),
            overflow: Overflow::default(),
            vertical_trim: VerticalTrim::default(),
            align_horizontal: AlignHorizontal::default(),
            align_vertical: AlignVertical::default(),
            dominant_baseline: Baseline::default(),
            tab_stop_increment: 0.,
            padding_horizontal: 0.,
            padding_vertical: 0.,
            indent_level: 0,
            level_increment: 0.,
            first_line_increment: 0.,
            list_marker: None,
            default_run: RunStyle::default(),
        }
    }
}

pub(crate) fn resolve_run_style<B: Brush>(
    attrs: &AttrSet<'_, B>,
    collection: Option<&AttrCollection<B>>,
    scale: f32,
) -> RunStyle<B> {
    let mut style = RunStyle::default();
    style.font_size *= scale;
    if let Some(Attribute::FontFamily(family)) = attrs.get(AttrKind::FontFamily, collection) {
        style.font_family = family.clone();
    }
    if let Some(Attribute::FontSize(size)) = attrs.get(AttrKind::FontSize, collection) {
        style.font_size = size * scale;
    }
    if let Some(Attribute::FontWeight(weight)) = attrs.get(AttrKind::FontWeight, collection) {
        style.font_weight = *weight;
    }
    if let Some(Attribute::FontStyle(font_style)) = attrs.get(AttrKind::FontStyle, collection) {
        style.font_style = *font_style;
    }
    if let Some(Attribute::FontStretch(stretch)) = attrs.get(AttrKind::FontStretch, collection) {
        style.font_stretch = *stretch;
    }
    if let Some(Attribute::Language(lang)) = attrs.get(AttrKind::Language, collection) {
        style.language = Some(*lang);
    }
    if let Some(Attribute::LineHeight(lh)) = attrs.get(AttrKind::LineHeight, collection) {
        style.line_height = match *lh {
            LineHeight::Absolute(v) => LineHeight::Absolute(v * scale),
            other => other,
        };
    }
    if let Some(Attribute::LetterSpacing(v)) = attrs.get(AttrKind::LetterSpacing, collection) {
        style.letter_spacing = v * scale;
    }
    if let Some(Attribute::WordSpacing(v)) = attrs.get(AttrKind::WordSpacing, collection) {
        style.word_spacing = v * scale;
    }
    if let Some(Attribute::Fill(brush)) = attrs.get(AttrKind::Fill, collection) {
        style.fill = brush.clone();
    }
    if let Some(Attribute::ObjectAlign(align)) = attrs.get(AttrKind::ObjectAlign, collection) {
        style.object_align = *align;
    }
    if let Some(Attribute::ObjectPadding { left, right }) =
        attrs.get(AttrKind::ObjectPadding, collection)
    {
        style.object_padding = (left * scale, right * scale);
    }
    if let Some(Attribute::BaselineShift(v)) = attrs.get(AttrKind::BaselineShift, collection) {
        style.baseline_shift = v * scale;
    }

    let mut found = Vec::new();
    attrs.collect(AttrKind::Decoration, collection, &mut found);
    for attr in &found {
        if let Attribute::Decoration(decoration) = attr {
            let mut decoration = decoration.clone();
            decoration.thickness = decoration.thickness.map(|t| t * scale);
            style.decorations.push(decoration);
        }
    }
    found.clear();
    attrs.collect(AttrKind::FontFeature, collection, &mut found);
    // Collection order is nearest-first; features apply outermost first.
    for attr in found.iter().rev() {
        if let Attribute::FontFeature(feature) = attr {
            style.features.push(*feature);
        }
    }
    style
}

pub(crate) fn resolve_layout_style<B: Brush>(
    attrs: &AttrSet<'_, B>,
    collection: Option<&AttrCollection<B>>,
    scale: f32,
) -> LayoutStyle<B> {
    let mut style = LayoutStyle {
        default_run: resolve_run_style(attrs, collection, scale),
        ..LayoutStyle::default()
    };
    if let Some(Attribute::Direction(direction)) = attrs.get(AttrKind::Direction, collection) {
        style.base_direction = *direction;
    }
    if let Some(Attribute::Wrap(wrap)) = attrs.get(AttrKind::Wrap, collection) {
        style.wrap = *wrap;
    }
    if let Some(Attribute::Overflow(overflow)) = attrs.get(AttrKind::Overflow, collection) {
        style.overflow = *overflow;
    }
    if let Some(Attribute::VerticalTrim(trim)) = attrs.get(AttrKind::VerticalTrim, collection) {
        style.vertical_trim = *trim;
    }
    if let Some(Attribute::AlignHorizontal(align)) =
        attrs.get(AttrKind::AlignHorizontal, collection)
    {
        style.align_horizontal = *align;
    }
    if let Some(Attribute::AlignVertical(align)) = attrs.get(AttrKind::AlignVertical, collection) {
        style.align_vertical = *align;
    }
    if let Some(Attribute::AlignBaseline(baseline)) =
        attrs.get(AttrKind::AlignBaseline, collection)
    {
        style.dominant_baseline = *baseline;
    }
    if let Some(Attribute::TabStopIncrement(v)) =
        attrs.get(AttrKind::TabStopIncrement, collection)
    {
        style.tab_stop_increment = v * scale;
    }
    if let Some(Attribute::Padding {
        horizontal,
        vertical,
    }) = attrs.get(AttrKind::Padding, collection)
    {
        style.padding_horizontal = horizontal * scale;
        style.padding_vertical = vertical * scale;
    }
    if let Some(Attribute::IndentLevel(level)) = attrs.get(AttrKind::IndentLevel, collection) {
        style.indent_level = *level;
    }
    if let Some(Attribute::IndentIncrements { level, first_line }) =
        attrs.get(AttrKind::IndentIncrements, collection)
    {
        style.level_increment = level * scale;
        style.first_line_increment = first_line * scale;
    }
    if let Some(Attribute::ListMarker(marker)) = attrs.get(AttrKind::ListMarker, collection) {
        style.list_marker = Some(ListMarker {
            indent: marker.indent * scale,
            kind: marker.kind,
        });
    }
    style
}
