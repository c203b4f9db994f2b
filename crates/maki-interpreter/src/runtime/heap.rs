// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Generational arena holding live instances.
//!
//! Handles carry the generation of the slot they were issued for. Removing an
//! entry bumps the slot's generation, so every outstanding handle to it stops
//! resolving; that is how back-references between instances behave as weak
//! references without any bookkeeping on the referrer's side.

use std::fmt;

/// A reference to an entry in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectRef {
    index: u32,
    generation: u32,
}

impl ObjectRef {
    /// Creates a new reference.
    pub fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Returns the slot index of this reference.
    pub fn index(&self) -> usize {
        self.index as usize
    }

    /// Returns the slot generation this reference was issued for.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.index, self.generation)
    }
}

struct Slot<T> {
    generation: u32,
    entry: Option<T>,
}

/// Slot arena with generation-checked handles.
pub struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    live: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    /// Stores an entry, reusing a freed slot when one is available.
    pub fn insert(&mut self, entry: T) -> ObjectRef {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.entry = Some(entry);
            return ObjectRef::new(index, slot.generation);
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            entry: Some(entry),
        });
        ObjectRef::new(index, 0)
    }

    /// Resolves a handle; `None` once the entry was removed.
    #[inline]
    pub fn get(&self, r: ObjectRef) -> Option<&T> {
        self.slots
            .get(r.index())
            .filter(|s| s.generation == r.generation)
            .and_then(|s| s.entry.as_ref())
    }

    /// Mutable variant of [`Self::get`].
    #[inline]
    pub fn get_mut(&mut self, r: ObjectRef) -> Option<&mut T> {
        self.slots
            .get_mut(r.index())
            .filter(|s| s.generation == r.generation)
            .and_then(|s| s.entry.as_mut())
    }

    /// Whether the handle still resolves.
    #[inline]
    pub fn contains(&self, r: ObjectRef) -> bool {
        self.get(r).is_some()
    }

    /// Removes an entry and invalidates every handle to it.
    pub fn remove(&mut self, r: ObjectRef) -> Option<T> {
        let slot = self.slots.get_mut(r.index())?;
        if slot.generation != r.generation {
            return None;
        }
        let entry = slot.entry.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(r.index);
        self.live -= 1;
        Some(entry)
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Whether no entries are live.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Iterates live entries with their handles.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectRef, &T)> {
        self.slots.iter().enumerate().filter_map(|(i, s)| {
            s.entry
                .as_ref()
                .map(|e| (ObjectRef::new(i as u32, s.generation), e))
        })
    }

    /// Handles of every live entry.
    pub fn handles(&self) -> Vec<ObjectRef> {
        self.iter().map(|(r, _)| r).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arena_insert_get() {
        let mut arena = Arena::new();
        let a = arena.insert("a");
        let b = arena.insert("b");
        assert_eq!(arena.get(a), Some(&"a"));
        assert_eq!(arena.get(b), Some(&"b"));
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn test_removed_handles_stop_resolving() {
        let mut arena = Arena::new();
        let a = arena.insert(1);
        assert_eq!(arena.remove(a), Some(1));
        assert!(!arena.contains(a));
        assert_eq!(arena.remove(a), None);
        assert!(arena.is_empty());
    }

    #[test]
    fn test_slot_reuse_bumps_generation() {
        let mut arena = Arena::new();
        let old = arena.insert(1);
        arena.remove(old);
        let new = arena.insert(2);
        assert_eq!(old.index(), new.index());
        assert_ne!(old, new);
        assert_eq!(arena.get(old), None);
        assert_eq!(arena.get(new), Some(&2));
    }

    #[test]
    fn test_iter_skips_free_slots() {
        let mut arena = Arena::new();
        let a = arena.insert('a');
        let b = arena.insert('b');
        arena.remove(a);
        let live: Vec<_> = arena.iter().map(|(r, v)| (r, *v)).collect();
        assert_eq!(live, vec![(b, 'b')]);
    }
}
