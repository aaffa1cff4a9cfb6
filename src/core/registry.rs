//! Slot-keyed entity storage shared by cells and meshes.

use crate::math::Index;

/// Dense map from a slot to an entity or entity id.
///
/// Insertion never overwrites: a second insert at an occupied slot is
/// rejected and leaves the stored entity untouched. Slots index straight
/// into the backing vector, so insert, lookup and removal are O(1)
/// (amortized for insert) and iteration follows ascending slot order.
/// Storage grows to the largest occupied slot.
#[derive(Clone, Debug)]
pub struct Registry<T> {
    entities: Vec<Option<T>>,
    len: usize,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            len: 0,
        }
    }

    /// Insert `entity` at `slot`; returns `false` if the slot is taken.
    pub fn insert(&mut self, slot: Index, entity: T) -> bool {
        if slot >= self.entities.len() {
            self.entities.resize_with(slot + 1, || None);
        }
        let entry = &mut self.entities[slot];
        if entry.is_some() {
            return false;
        }
        *entry = Some(entity);
        self.len += 1;
        true
    }

    /// Remove the entity at `slot`; returns `false` if the slot was empty.
    pub fn remove(&mut self, slot: Index) -> bool {
        self.take(slot).is_some()
    }

    pub fn take(&mut self, slot: Index) -> Option<T> {
        let entity = self.entities.get_mut(slot)?.take()?;
        self.len -= 1;
        while matches!(self.entities.last(), Some(None)) {
            self.entities.pop();
        }
        Some(entity)
    }

    pub fn get(&self, slot: Index) -> Option<&T> {
        self.entities.get(slot)?.as_ref()
    }

    pub fn get_mut(&mut self, slot: Index) -> Option<&mut T> {
        self.entities.get_mut(slot)?.as_mut()
    }

    pub fn contains(&self, slot: Index) -> bool {
        self.get(slot).is_some()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn slots(&self) -> impl Iterator<Item = Index> + '_ {
        self.iter().map(|(slot, _)| slot)
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entities.iter().flatten()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Index, &T)> {
        self.entities
            .iter()
            .enumerate()
            .filter_map(|(slot, entity)| entity.as_ref().map(|entity| (slot, entity)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Index, &mut T)> {
        self.entities
            .iter_mut()
            .enumerate()
            .filter_map(|(slot, entity)| entity.as_mut().map(|entity| (slot, entity)))
    }

    /// Apply `f` to every entity in slot order.
    pub fn for_each<F>(&self, f: F)
    where
        F: FnMut(&T),
    {
        self.values().for_each(f);
    }

    /// Apply a mutating `f` to every entity in slot order.
    pub fn for_each_mut<F>(&mut self, f: F)
    where
        F: FnMut(&mut T),
    {
        self.entities.iter_mut().flatten().for_each(f);
    }
}
