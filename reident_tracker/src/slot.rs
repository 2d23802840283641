// Copyright 2025 the Reident Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fixed-capacity track slots addressed by a hash of the entity handle.

use core::ops::Index;

use glam::{Quat, Vec3};

use crate::category::{Category, Identity};
use crate::payload::{Payload, downcast_mut, downcast_ref};

/// One cell of a [`SlotTable`]: the last known state of a track.
#[derive(Debug, Default)]
pub struct TrackSlot {
    pub(crate) identity: Option<Identity>,
    pub(crate) age: u32,
    pub(crate) position: Vec3,
    pub(crate) orientation: Quat,
    pub(crate) payload: Option<Box<dyn Payload>>,
}

impl TrackSlot {
    /// Identity occupying the slot, `None` when the slot is empty.
    #[inline]
    pub fn identity(&self) -> Option<Identity> {
        self.identity
    }

    /// Whether an entity occupies the slot.
    #[inline]
    pub fn is_occupied(&self) -> bool {
        self.identity.is_some()
    }

    /// Category of the occupant, `Unknown` when empty.
    #[inline]
    pub fn category(&self) -> Category {
        self.identity.map_or(Category::Unknown, Identity::category)
    }

    /// Ticks of continuous occupancy by the current identity.
    #[inline]
    pub fn age(&self) -> u32 {
        self.age
    }

    /// Last sampled world position.
    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Last sampled world orientation.
    ///
    /// Head slots carry the zero quaternion, which only matches queries
    /// with an angular tolerance above 1.
    #[inline]
    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    /// Whether a payload is attached.
    #[inline]
    pub fn has_payload(&self) -> bool {
        self.payload.is_some()
    }

    /// Borrow the payload if it is a `T`.
    pub fn payload<T: Payload>(&self) -> Option<&T> {
        self.payload.as_deref().and_then(downcast_ref::<T>)
    }

    /// Mutably borrow the payload if it is a `T`.
    pub fn payload_mut<T: Payload>(&mut self) -> Option<&mut T> {
        self.payload.as_deref_mut().and_then(downcast_mut::<T>)
    }

    /// Borrow the `T` payload, attaching `f()` first if there is none.
    ///
    /// A payload of another type is replaced.
    pub fn payload_or_insert_with<T: Payload>(&mut self, f: impl FnOnce() -> T) -> &mut T {
        if self.payload::<T>().is_none() {
            self.payload = Some(Box::new(f()));
        }
        self.payload_mut::<T>()
            .expect("slot invariant violated: payload is not a `T` right after insertion")
    }

    /// Attach a payload, returning the one it replaces.
    pub fn set_payload(&mut self, payload: Box<dyn Payload>) -> Option<Box<dyn Payload>> {
        self.payload.replace(payload)
    }

    /// Detach and return the payload.
    pub fn take_payload(&mut self) -> Option<Box<dyn Payload>> {
        self.payload.take()
    }
}

/// Fixed-capacity array of [`TrackSlot`]s.
///
/// An entity handle addresses its slot through
/// `(handle >> shift) & (capacity / 2 - 1)`, so primary slots live in the
/// lower half of the table and head slots mirror them in the upper half.
/// Two entities that hash to the same slot in one tick collide: the later
/// write wins.
#[derive(Debug)]
pub struct SlotTable {
    slots: Box<[TrackSlot]>,
    handle_shift: u32,
}

impl SlotTable {
    /// Create an empty table.
    ///
    /// `capacity` must be a power of two of at least 2 and `handle_shift`
    /// below 32; [`TrackerConfig::validate`](crate::TrackerConfig::validate)
    /// checks both.
    pub fn new(capacity: usize, handle_shift: u32) -> Self {
        debug_assert!(
            capacity >= 2 && capacity.is_power_of_two(),
            "slot capacity must be a power of two"
        );
        debug_assert!(handle_shift < 32, "handle shift must be below 32");
        Self {
            slots: (0..capacity).map(|_| TrackSlot::default()).collect(),
            handle_shift,
        }
    }

    /// Number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Primary slot address of an entity handle.
    #[inline]
    pub fn primary_slot(&self, handle: u32) -> usize {
        ((handle >> self.handle_shift) as usize) & (self.capacity() / 2 - 1)
    }

    /// Head slot paired with a primary slot.
    #[inline]
    pub fn head_slot(&self, primary: usize) -> usize {
        primary + self.capacity() / 2
    }

    /// Borrow a slot.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&TrackSlot> {
        self.slots.get(index)
    }

    /// Mutably borrow a slot, typically to attach a payload.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut TrackSlot> {
        self.slots.get_mut(index)
    }

    /// Iterate over all slots, empty ones included.
    pub fn iter(&self) -> impl Iterator<Item = &TrackSlot> + '_ {
        self.slots.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut TrackSlot> + '_ {
        self.slots.iter_mut()
    }

    /// Iterate over occupied slots with their indices.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, &TrackSlot)> + '_ {
        self.slots.iter().enumerate().filter(|(_, s)| s.is_occupied())
    }

    /// Number of occupied slots.
    pub fn occupied_len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_occupied()).count()
    }

    /// Empty every slot and drop every payload.
    pub(crate) fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            slot.identity = None;
            slot.payload = None;
        }
    }

    /// Overwrite slot `index` with a fresh occupant.
    ///
    /// Returns the identity that was already written there, if any.
    pub(crate) fn write(
        &mut self,
        index: usize,
        identity: Identity,
        position: Vec3,
        orientation: Quat,
    ) -> Option<Identity> {
        let slot = &mut self.slots[index];
        let previous = slot.identity;
        *slot = TrackSlot {
            identity: Some(identity),
            age: 0,
            position,
            orientation,
            payload: None,
        };
        previous
    }
}

impl Index<usize> for SlotTable {
    type Output = TrackSlot;

    #[inline]
    fn index(&self, index: usize) -> &TrackSlot {
        &self.slots[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Notes(Vec<&'static str>);

    fn id(handle: u32) -> Identity {
        Identity::new(Category::Vehicle, handle).unwrap()
    }

    #[test]
    fn addresses_use_the_lower_half() {
        let table = SlotTable::new(16, 8);
        assert_eq!(table.capacity(), 16);
        assert_eq!(table.primary_slot(0x0000_0300), 3);
        // Bits above the half-capacity mask wrap around.
        assert_eq!(table.primary_slot(0x0000_0b00), 3);
        assert_eq!(table.primary_slot(0x0000_00ff), 0);
        assert_eq!(table.head_slot(3), 11);
    }

    #[test]
    fn writes_report_collisions() {
        let mut table = SlotTable::new(8, 0);
        assert_eq!(table.write(1, id(1), Vec3::ZERO, Quat::IDENTITY), None);
        assert_eq!(
            table.write(1, id(5), Vec3::X, Quat::IDENTITY),
            Some(id(1))
        );
        assert_eq!(table[1].identity(), Some(id(5)));
        assert_eq!(table[1].position(), Vec3::X);
        assert_eq!(table.occupied_len(), 1);

        table.clear();
        assert_eq!(table.occupied().count(), 0);
    }

    #[test]
    fn payload_downcasting() {
        let mut table = SlotTable::new(4, 0);
        table.write(0, id(1), Vec3::ZERO, Quat::IDENTITY);
        let slot = table.get_mut(0).unwrap();
        assert!(!slot.has_payload());

        slot.payload_or_insert_with(|| Notes(vec![])).0.push("seen");
        slot.payload_or_insert_with(|| Notes(vec!["fresh"])).0.push("again");
        assert_eq!(slot.payload::<Notes>(), Some(&Notes(vec!["seen", "again"])));
        assert!(slot.payload::<u64>().is_none());

        // A payload of another type is replaced.
        assert_eq!(*slot.payload_or_insert_with(|| 9_u64), 9);
        assert!(slot.payload::<Notes>().is_none());

        let old = slot.set_payload(Box::new(Notes(vec![])));
        assert!(old.is_some());
        assert!(slot.take_payload().is_some());
        assert!(!slot.has_payload());
    }

    #[test]
    fn empty_slots_have_unknown_category() {
        let table = SlotTable::new(2, 0);
        assert_eq!(table[0].category(), Category::Unknown);
        assert!(!table[0].is_occupied());
    }
}
