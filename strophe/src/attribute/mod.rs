// Copyright 2025 the Strophe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Attributes, inheriting attribute chains and named attribute sets.
//!
//! Content runs describe their styling with an [`AttrSet`]: a borrowed
//! slice of [`Attribute`]s, an optional parent chain and an optional
//! reference to a named set in an [`AttrCollection`]. The effective value
//! of a kind is the nearest match walking the chain; see
//! [`AttrSet::get`].

mod collection;

pub use collection::{AttrCollection, GroupId, SetHandle};

use core::hash::{Hash, Hasher};

use crate::font::{Baseline, FontFeature};
use crate::style::{
    AlignHorizontal, AlignVertical, BaseDirection, Brush, DecorationPosition, DecorationStyle,
    FontStretch, FontStyle, FontWeight, Lang, LineHeight, ListMarker, ObjectAlignRef, Overflow,
    VerticalTrim, Wrap,
};

/// An underline, overline or strikethrough request.
///
/// `brush` and `thickness` fall back to the fill brush and the font's
/// metrics when `None`.
#[derive(Clone, PartialEq, Debug)]
pub struct TextDecoration<B: Brush> {
    pub position: DecorationPosition,
    pub style: DecorationStyle,
    pub brush: Option<B>,
    pub thickness: Option<f32>,
}

impl<B: Brush> Default for TextDecoration<B> {
    fn default() -> Self {
        Self {
            position: DecorationPosition::Under,
            style: DecorationStyle::Solid,
            brush: None,
            thickness: None,
        }
    }
}

/// A single styling attribute.
#[derive(Clone, PartialEq, Debug)]
pub enum Attribute<B: Brush> {
    FontFamily(String),
    FontSize(f32),
    FontWeight(FontWeight),
    FontStyle(FontStyle),
    FontStretch(FontStretch),
    /// OpenType feature setting; repeat to set several.
    FontFeature(FontFeature),
    Language(Lang),
    Direction(BaseDirection),
    LineHeight(LineHeight),
    LetterSpacing(f32),
    WordSpacing(f32),
    Fill(B),
    /// Decoration request; repeat for multiple decorations.
    Decoration(TextDecoration<B>),
    ObjectAlign(ObjectAlignRef),
    ObjectPadding {
        left: f32,
        right: f32,
    },
    Wrap(Wrap),
    Overflow(Overflow),
    VerticalTrim(VerticalTrim),
    AlignHorizontal(AlignHorizontal),
    AlignVertical(AlignVertical),
    /// Dominant baseline runs on a line align to.
    AlignBaseline(Baseline),
    BaselineShift(f32),
    TabStopIncrement(f32),
    Padding {
        horizontal: f32,
        vertical: f32,
    },
    IndentLevel(u32),
    IndentIncrements {
        level: f32,
        first_line: f32,
    },
    ListMarker(ListMarker),
    /// Free-form tag grouping semantically equivalent styling.
    Group(u64),
    /// Splices a named set from the collection into the chain.
    Reference(SetHandle),
}

/// Discriminant of an [`Attribute`].
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum AttrKind {
    FontFamily,
    FontSize,
    FontWeight,
    FontStyle,
    FontStretch,
    FontFeature,
    Language,
    Direction,
    LineHeight,
    LetterSpacing,
    WordSpacing,
    Fill,
    Decoration,
    ObjectAlign,
    ObjectPadding,
    Wrap,
    Overflow,
    VerticalTrim,
    AlignHorizontal,
    AlignVertical,
    AlignBaseline,
    BaselineShift,
    TabStopIncrement,
    Padding,
    IndentLevel,
    IndentIncrements,
    ListMarker,
    Group,
    Reference,
}

impl<B: Brush> Attribute<B> {
    pub fn kind(&self) -> AttrKind {
        match self {
            Self::FontFamily(_) => AttrKind::FontFamily,
            Self::FontSize(_) => AttrKind::FontSize,
            Self::FontWeight(_) => AttrKind::FontWeight,
            Self::FontStyle(_) => AttrKind::FontStyle,
            Self::FontStretch(_) => AttrKind::FontStretch,
            Self::FontFeature(_) => AttrKind::FontFeature,
            Self::Language(_) => AttrKind::Language,
            Self::Direction(_) => AttrKind::Direction,
            Self::LineHeight(_) => AttrKind::LineHeight,
            Self::LetterSpacing(_) => AttrKind::LetterSpacing,
            Self::WordSpacing(_) => AttrKind::WordSpacing,
            Self::Fill(_) => AttrKind::Fill,
            Self::Decoration(_) => AttrKind::Decoration,
            Self::ObjectAlign(_) => AttrKind::ObjectAlign,
            Self::ObjectPadding { .. } => AttrKind::ObjectPadding,
            Self::Wrap(_) => AttrKind::Wrap,
            Self::Overflow(_) => AttrKind::Overflow,
            Self::VerticalTrim(_) => AttrKind::VerticalTrim,
            Self::AlignHorizontal(_) => AttrKind::AlignHorizontal,
            Self::AlignVertical(_) => AttrKind::AlignVertical,
            Self::AlignBaseline(_) => AttrKind::AlignBaseline,
            Self::BaselineShift(_) => AttrKind::BaselineShift,
            Self::TabStopIncrement(_) => AttrKind::TabStopIncrement,
            Self::Padding { .. } => AttrKind::Padding,
            Self::IndentLevel(_) => AttrKind::IndentLevel,
            Self::IndentIncrements { .. } => AttrKind::IndentIncrements,
            Self::ListMarker(_) => AttrKind::ListMarker,
            Self::Group(_) => AttrKind::Group,
            Self::Reference(_) => AttrKind::Reference,
        }
    }
}

/// A borrowed attribute chain: own attributes, an optional parent and an
/// optional named set reference.
#[derive(Debug)]
pub struct AttrSet<'a, B: Brush> {
    attrs: &'a [Attribute<B>],
    parent: Option<&'a AttrSet<'a, B>>,
    reference: Option<SetHandle>,
}

// Not derived: the set is a bundle of borrows and copies regardless of
// whether the brush type does.
impl<'a, B: Brush> Copy for AttrSet<'a, B> {}

impl<'a, B: Brush> Clone for AttrSet<'a, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, B: Brush> Default for AttrSet<'a, B> {
    fn default() -> Self {
        Self {
            attrs: &[],
            parent: None,
            reference: None,
        }
    }
}

impl<'a, B: Brush> AttrSet<'a, B> {
    pub fn new(attrs: &'a [Attribute<B>]) -> Self {
        Self {
            attrs,
            parent: None,
            reference: None,
        }
    }

    pub fn with_parent(mut self, parent: &'a AttrSet<'a, B>) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_reference(mut self, reference: SetHandle) -> Self {
        self.reference = Some(reference);
        self
    }

    pub fn attrs(&self) -> &'a [Attribute<B>] {
        self.attrs
    }

    pub fn parent(&self) -> Option<&'a AttrSet<'a, B>> {
        self.parent
    }

    pub fn reference(&self) -> Option<SetHandle> {
        self.reference
    }

    /// Returns the effective attribute of `kind`.
    ///
    /// The chain is walked in override order: own attributes from last to
    /// first, sets referenced by [`Attribute::Reference`] at their
    /// position in that walk, the set's own reference, then the parent
    /// chain. Returns `None` when no link of the chain carries the kind;
    /// callers fall back to the kind's documented default.
    pub fn get<'s>(
        self,
        kind: AttrKind,
        collection: Option<&'s AttrCollection<B>>,
    ) -> Option<&'s Attribute<B>>
    where
        'a: 's,
    {
        for attr in self.attrs.iter().rev() {
            if attr.kind() == kind {
                return Some(attr);
            }
            if let Attribute::Reference(handle) = attr {
                if let Some(found) = collection
                    .and_then(|c| c.get(*handle))
                    .and_then(|set| set.get(kind, collection))
                {
                    return Some(found);
                }
            }
        }
        if let Some(found) = self
            .reference
            .and_then(|handle| collection.and_then(|c| c.get(handle)))
            .and_then(|set| set.get(kind, collection))
        {
            return Some(found);
        }
        self.parent.and_then(|p| p.get(kind, collection))
    }

    /// Collects every attribute of `kind` in the chain, in override order
    /// of encounter (nearest first).
    pub fn collect<'s>(
        self,
        kind: AttrKind,
        collection: Option<&'s AttrCollection<B>>,
        out: &mut Vec<&'s Attribute<B>>,
    ) where
        'a: 's,
    {
        for attr in self.attrs.iter().rev() {
            if attr.kind() == kind {
                out.push(attr);
            }
            if let Attribute::Reference(handle) = attr {
                if let Some(set) = collection.and_then(|c| c.get(*handle)) {
                    set.collect_references(kind, collection, out);
                }
            }
        }
        if let Some(set) = self
            .reference
            .and_then(|handle| collection.and_then(|c| c.get(handle)))
        {
            set.collect_references(kind, collection, out);
        }
        if let Some(parent) = self.parent {
            parent.collect(kind, collection, out);
        }
    }

    // `collect` over a referenced set: identical walk, but referenced
    // sets never contribute a parent of their own.
    fn collect_references<'s>(
        self,
        kind: AttrKind,
        collection: Option<&'s AttrCollection<B>>,
        out: &mut Vec<&'s Attribute<B>>,
    ) where
        'a: 's,
    {
        for attr in self.attrs.iter().rev() {
            if attr.kind() == kind {
                out.push(attr);
            }
            if let Attribute::Reference(handle) = attr {
                if let Some(set) = collection.and_then(|c| c.get(*handle)) {
                    set.collect_references(kind, collection, out);
                }
            }
        }
    }

    /// Number of attributes [`Self::flatten_into`] would emit.
    pub fn flatten_len(&self) -> usize {
        let mut len = self.attrs.len();
        if self.reference.is_some() {
            len += 1;
        }
        if let Some(parent) = self.parent {
            len += parent.flatten_len();
        }
        len
    }

    /// Flattens the chain into a single attribute list, parents first.
    ///
    /// Referenced sets are not expanded; each one is emitted as a single
    /// [`Attribute::Reference`] so the result can be stored in a
    /// collection and later spliced back into a chain.
    pub fn flatten_into(&self, out: &mut Vec<Attribute<B>>) {
        if let Some(parent) = self.parent {
            parent.flatten_into(out);
        }
        if let Some(handle) = self.reference {
            out.push(Attribute::Reference(handle));
        }
        out.extend(self.attrs.iter().cloned());
    }

    /// Semantic equality of two chains.
    ///
    /// Chains are equal when their flattened attribute sequences are
    /// equal, with referenced sets compared by *group* rather than by
    /// handle, so that two differently named sets from the same group
    /// ("link" styles, say) compare equal.
    pub fn eq_in(&self, other: &Self, collection: Option<&AttrCollection<B>>) -> bool {
        let mut a = Vec::with_capacity(self.flatten_len());
        let mut b = Vec::with_capacity(other.flatten_len());
        self.flatten_into(&mut a);
        other.flatten_into(&mut b);
        if a.len() != b.len() {
            return false;
        }
        a.iter().zip(&b).all(|(x, y)| match (x, y) {
            (Attribute::Reference(hx), Attribute::Reference(hy)) => {
                let groups =
                    collection.map(|c| (c.group_of(*hx), c.group_of(*hy)));
                match groups {
                    Some((Some(gx), Some(gy))) => gx == gy,
                    _ => hx == hy,
                }
            }
            _ => x == y,
        })
    }

    /// Structure-aware hash of the chain, following references into the
    /// collection so that equivalent chains hash alike. Used by hosts as
    /// a layout cache key component.
    pub fn hash_into<H: Hasher>(&self, collection: Option<&AttrCollection<B>>, state: &mut H)
    where
        B: Hash,
    {
        if let Some(parent) = self.parent {
            parent.hash_into(collection, state);
        }
        if let Some(handle) = self.reference {
            hash_reference(handle, collection, state);
        }
        for attr in self.attrs {
            hash_attr(attr, collection, state);
        }
    }
}

fn hash_attr<B: Brush + Hash, H: Hasher>(
    attr: &Attribute<B>,
    collection: Option<&AttrCollection<B>>,
    state: &mut H,
) {
    core::mem::discriminant(attr).hash(state);
    match attr {
        Attribute::Reference(handle) => hash_reference(*handle, collection, state),
        Attribute::FontFamily(family) => family.hash(state),
        Attribute::FontSize(v)
        | Attribute::LetterSpacing(v)
        | Attribute::WordSpacing(v)
        | Attribute::BaselineShift(v)
        | Attribute::TabStopIncrement(v) => v.to_bits().hash(state),
        Attribute::FontWeight(w) => w.value().to_bits().hash(state),
        Attribute::FontStyle(s) => (*s as u8).hash(state),
        Attribute::FontStretch(s) => s.ratio().to_bits().hash(state),
        Attribute::FontFeature(f) => {
            f.tag.hash(state);
            f.value.hash(state);
        }
        Attribute::Language(lang) => lang.hash(state),
        Attribute::Direction(d) => (*d as u8).hash(state),
        Attribute::LineHeight(lh) => match lh {
            LineHeight::Normal => 0_u8.hash(state),
            LineHeight::MetricsRelative(v) => {
                1_u8.hash(state);
                v.to_bits().hash(state);
            }
            LineHeight::FontSizeRelative(v) => {
                2_u8.hash(state);
                v.to_bits().hash(state);
            }
            LineHeight::Absolute(v) => {
                3_u8.hash(state);
                v.to_bits().hash(state);
            }
        },
        Attribute::Fill(brush) => brush.hash(state),
        Attribute::Decoration(d) => {
            (d.position as u8).hash(state);
            (d.style as u8).hash(state);
            d.brush.hash(state);
            d.thickness.map(f32::to_bits).hash(state);
        }
        Attribute::ObjectAlign(a) => (*a as u8).hash(state),
        Attribute::ObjectPadding { left, right } => {
            left.to_bits().hash(state);
            right.to_bits().hash(state);
        }
        Attribute::Wrap(w) => (*w as u8).hash(state),
        Attribute::Overflow(o) => (*o as u8).hash(state),
        Attribute::VerticalTrim(t) => (*t as u8).hash(state),
        Attribute::AlignHorizontal(a) => (*a as u8).hash(state),
        Attribute::AlignVertical(a) => (*a as u8).hash(state),
        Attribute::AlignBaseline(b) => (*b as u8).hash(state),
        Attribute::Padding {
            horizontal,
            vertical,
        } => {
            horizontal.to_bits().hash(state);
            vertical.to_bits().hash(state);
        }
        Attribute::IndentLevel(level) => level.hash(state),
        Attribute::IndentIncrements { level, first_line } => {
            level.to_bits().hash(state);
            first_line.to_bits().hash(state);
        }
        Attribute::ListMarker(marker) => {
            marker.indent.to_bits().hash(state);
            match marker.kind {
                crate::style::MarkerKind::Symbol(ch) => {
                    0_u8.hash(state);
                    ch.hash(state);
                }
                crate::style::MarkerKind::Counter(system) => {
                    1_u8.hash(state);
                    (system as u8).hash(state);
                }
            }
        }
        Attribute::Group(tag) => tag.hash(state),
    }
}

fn hash_reference<B: Brush + Hash, H: Hasher>(
    handle: SetHandle,
    collection: Option<&AttrCollection<B>>,
    state: &mut H,
) {
    match collection.and_then(|c| c.get(handle)) {
        Some(set) => {
            for attr in set.attrs() {
                hash_attr(attr, collection, state);
            }
        }
        None => handle.hash(state),
    }
}
