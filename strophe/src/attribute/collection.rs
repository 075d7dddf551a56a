// Copyright 2025 the Strophe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Named attribute set collection.

use std::sync::atomic::{AtomicU64, Ordering};

use hashbrown::HashMap;

use super::{AttrSet, Attribute};
use crate::style::Brush;

// Collection ids key host-side caches; they are never reused, even
// across collections created on different threads.
static NEXT_COLLECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Handle to a named set within an [`AttrCollection`].
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct SetHandle(u32);

/// Handle to a named group of sets within an [`AttrCollection`].
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct GroupId(u32);

struct SetData<B: Brush> {
    name: String,
    group: Option<GroupId>,
    attrs: Vec<Attribute<B>>,
}

/// A collection of named, optionally grouped attribute sets.
///
/// Collections are read-only once populated and may be shared across
/// threads; handles they issue stay valid for the collection's lifetime.
pub struct AttrCollection<B: Brush> {
    id: u64,
    sets: Vec<SetData<B>>,
    set_names: HashMap<String, u32>,
    group_names: Vec<String>,
    groups: HashMap<String, u32>,
}

impl<B: Brush> Default for AttrCollection<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Brush> AttrCollection<B> {
    pub fn new() -> Self {
        Self {
            id: NEXT_COLLECTION_ID.fetch_add(1, Ordering::Relaxed),
            sets: Vec::new(),
            set_names: HashMap::new(),
            group_names: Vec::new(),
            groups: HashMap::new(),
        }
    }

    /// Unique id of this collection, usable as a cache key component.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Adds a named set, replacing the attributes of an existing set with
    /// the same name. Groups are deduplicated by name.
    pub fn add_set(
        &mut self,
        name: &str,
        group_name: Option<&str>,
        attrs: &[Attribute<B>],
    ) -> SetHandle {
        let group = group_name.map(|group_name| {
            let next = self.group_names.len() as u32;
            let index = *self.groups.entry_ref(group_name).or_insert(next);
            if index == next {
                self.group_names.push(group_name.to_owned());
            }
            GroupId(index)
        });
        if let Some(&index) = self.set_names.get(name) {
            let set = &mut self.sets[index as usize];
            set.group = group.or(set.group);
            set.attrs.clear();
            set.attrs.extend(attrs.iter().cloned());
            return SetHandle(index);
        }
        let index = self.sets.len() as u32;
        self.sets.push(SetData {
            name: name.to_owned(),
            group,
            attrs: attrs.to_vec(),
        });
        self.set_names.insert(name.to_owned(), index);
        SetHandle(index)
    }

    pub fn find_by_name(&self, name: &str) -> Option<SetHandle> {
        self.set_names.get(name).copied().map(SetHandle)
    }

    /// Returns the set for a handle as a chain link with no parent.
    pub fn get(&self, handle: SetHandle) -> Option<AttrSet<'_, B>> {
        self.sets
            .get(handle.0 as usize)
            .map(|set| AttrSet::new(&set.attrs))
    }

    pub fn name_of(&self, handle: SetHandle) -> Option<&str> {
        self.sets.get(handle.0 as usize).map(|set| set.name.as_str())
    }

    pub fn group_of(&self, handle: SetHandle) -> Option<GroupId> {
        self.sets.get(handle.0 as usize).and_then(|set| set.group)
    }

    pub fn group_name(&self, group: GroupId) -> Option<&str> {
        self.group_names.get(group.0 as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

impl<B: Brush> core::fmt::Debug for AttrCollection<B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AttrCollection")
            .field("id", &self.id)
            .field("sets", &self.sets.len())
            .field("groups", &self.group_names)
            .finish()
    }
}
