// Copyright 2025 the Strophe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::hash::{DefaultHasher, Hasher};

use crate::{AttrCollection, AttrKind, AttrSet, Attribute, FontWeight};

type Attr = Attribute<()>;

fn hash_of(set: &AttrSet<'_, ()>, collection: Option<&AttrCollection<()>>) -> u64 {
    let mut hasher = DefaultHasher::new();
    set.hash_into(collection, &mut hasher);
    hasher.finish()
}

#[test]
fn own_attributes_win_from_last_to_first() {
    let own = [
        Attr::FontSize(10.),
        Attr::FontSize(20.),
        Attr::FontWeight(FontWeight::BOLD),
    ];
    let set = AttrSet::new(&own);
    let Some(Attribute::FontSize(size)) = set.get(AttrKind::FontSize, None) else {
        panic!("font size expected");
    };
    assert_eq!(*size, 20.);
}

#[test]
fn parent_chain_supplies_missing_kinds() {
    let base = [Attr::FontSize(12.)];
    let base_set = AttrSet::new(&base);
    let own = [Attr::FontWeight(FontWeight::BOLD)];
    let set = AttrSet::new(&own).with_parent(&base_set);
    assert!(matches!(
        set.get(AttrKind::FontSize, None),
        Some(Attribute::FontSize(_))
    ));
    // Absent everywhere: the caller's default applies.
    assert!(set.get(AttrKind::LetterSpacing, None).is_none());
}

#[test]
fn reference_attributes_splice_at_their_position() {
    let mut collection = AttrCollection::new();
    let linkish = collection.add_set("link", None, &[Attr::FontSize(30.)]);
    // An attribute after the reference wins over the referenced set;
    // one before it does not.
    let own = [Attr::FontSize(10.), Attr::Reference(linkish)];
    let set = AttrSet::new(&own);
    let Some(Attribute::FontSize(size)) = set.get(AttrKind::FontSize, Some(&collection)) else {
        panic!("font size expected");
    };
    assert_eq!(*size, 30.);

    let own = [Attr::Reference(linkish), Attr::FontSize(10.)];
    let set = AttrSet::new(&own);
    let Some(Attribute::FontSize(size)) = set.get(AttrKind::FontSize, Some(&collection)) else {
        panic!("font size expected");
    };
    assert_eq!(*size, 10.);
}

#[test]
fn set_reference_beats_the_parent() {
    let mut collection = AttrCollection::new();
    let named = collection.add_set("named", None, &[Attr::FontSize(30.)]);
    let base = [Attr::FontSize(12.)];
    let base_set = AttrSet::new(&base);
    let set = AttrSet::new(&[])
        .with_parent(&base_set)
        .with_reference(named);
    let Some(Attribute::FontSize(size)) = set.get(AttrKind::FontSize, Some(&collection)) else {
        panic!("font size expected");
    };
    assert_eq!(*size, 30.);
}

#[test]
fn collect_preserves_encounter_order() {
    let base = [Attr::FontFeature(crate::FontFeature::new(b"ss01", 1))];
    let base_set = AttrSet::new(&base);
    let own = [
        Attr::FontFeature(crate::FontFeature::new(b"liga", 0)),
        Attr::FontFeature(crate::FontFeature::new(b"kern", 1)),
    ];
    let set = AttrSet::new(&own).with_parent(&base_set);
    let mut found = Vec::new();
    set.collect(AttrKind::FontFeature, None, &mut found);
    let tags: Vec<&[u8; 4]> = found
        .iter()
        .map(|attr| match attr {
            Attribute::FontFeature(feature) => &feature.tag,
            _ => unreachable!("only features collected"),
        })
        .collect();
    // Nearest first: own attributes from last to first, then the parent.
    assert_eq!(tags, vec![b"kern", b"liga", b"ss01"]);
}

#[test]
fn equality_matches_references_by_group() {
    let mut collection = AttrCollection::new();
    let link_a = collection.add_set("link/a", Some("link"), &[Attr::FontSize(30.)]);
    let link_b = collection.add_set("link/b", Some("link"), &[Attr::FontSize(32.)]);
    let plain = collection.add_set("plain", Some("body"), &[Attr::FontSize(30.)]);

    let a = [Attr::Reference(link_a)];
    let b = [Attr::Reference(link_b)];
    let c = [Attr::Reference(plain)];
    let set_a = AttrSet::new(&a);
    let set_b = AttrSet::new(&b);
    let set_c = AttrSet::new(&c);
    // Same group: semantically equivalent even with different content.
    assert!(set_a.eq_in(&set_b, Some(&collection)));
    assert!(!set_a.eq_in(&set_c, Some(&collection)));
}

#[test]
fn flatten_emits_parents_first_and_keeps_references() {
    let mut collection = AttrCollection::new();
    let named = collection.add_set("named", None, &[Attr::FontSize(30.)]);
    let base = [Attr::FontSize(12.)];
    let base_set = AttrSet::new(&base);
    let own = [Attr::FontWeight(FontWeight::BOLD)];
    let set = AttrSet::new(&own)
        .with_parent(&base_set)
        .with_reference(named);

    assert_eq!(set.flatten_len(), 3);
    let mut flat = Vec::new();
    set.flatten_into(&mut flat);
    assert!(matches!(flat[0], Attribute::FontSize(_)));
    assert!(matches!(flat[1], Attribute::Reference(handle) if handle == named));
    assert!(matches!(flat[2], Attribute::FontWeight(_)));

    // A flattened chain resolves like the original.
    let flat_set = AttrSet::new(&flat);
    let original = set.get(AttrKind::FontWeight, Some(&collection)).cloned();
    let flattened = flat_set.get(AttrKind::FontWeight, Some(&collection)).cloned();
    assert_eq!(original, flattened);
}

#[test]
fn deep_hash_follows_references() {
    let mut collection = AttrCollection::new();
    let first = collection.add_set("first", None, &[Attr::FontSize(30.)]);
    let second = collection.add_set("second", None, &[Attr::FontSize(30.)]);
    let different = collection.add_set("third", None, &[Attr::FontSize(31.)]);

    let a = [Attr::Reference(first)];
    let b = [Attr::Reference(second)];
    let c = [Attr::Reference(different)];
    // Distinct handles with identical content hash alike; different
    // content does not.
    assert_eq!(
        hash_of(&AttrSet::new(&a), Some(&collection)),
        hash_of(&AttrSet::new(&b), Some(&collection))
    );
    assert_ne!(
        hash_of(&AttrSet::new(&a), Some(&collection)),
        hash_of(&AttrSet::new(&c), Some(&collection))
    );
}

#[test]
fn collection_finds_sets_by_name_and_dedupes_groups() {
    let mut collection = AttrCollection::<()>::new();
    let a = collection.add_set("a", Some("g"), &[]);
    let b = collection.add_set("b", Some("g"), &[]);
    let c = collection.add_set("c", Some("other"), &[]);
    assert_eq!(collection.find_by_name("b"), Some(b));
    assert_eq!(collection.group_of(a), collection.group_of(b));
    assert_ne!(collection.group_of(a), collection.group_of(c));
    assert_eq!(collection.group_name(collection.group_of(a).unwrap()), Some("g"));

    // Re-adding a name replaces its attributes and keeps the handle.
    let a2 = collection.add_set("a", None, &[Attr::FontSize(9.)]);
    assert_eq!(a, a2);
    assert_eq!(collection.len(), 3);
}

#[test]
fn collection_ids_are_unique() {
    let a = AttrCollection::<()>::new();
    let b = AttrCollection::<()>::new();
    assert_ne!(a.id(), b.id());
}
