// Copyright 2025 the Reident Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Opaque per-track payloads.
//!
//! A payload is consumer state attached to a track slot. The tracker never
//! looks inside it: it only keeps it while the slot's identity is continuous
//! and drops it when the identity lapses. Consumers downcast on access with
//! [`TrackSlot::payload`](crate::TrackSlot::payload) and friends.
//!
//! [`TrackHistory`] is a ready-made payload building block: a double-buffered
//! cache of per-attachment values, rotated once per rendered frame.

use core::any::Any;
use core::fmt::Debug;
use core::mem;

use hashbrown::HashMap;

/// Type-erased consumer state owned by a track slot.
///
/// Implemented for every `'static + Send + Debug` type.
pub trait Payload: Any + Send + Debug {}

impl<T: Any + Send + Debug> Payload for T {}

/// Borrow a payload as `&T` if it has that concrete type.
pub(crate) fn downcast_ref<'a, T: Payload>(
    payload: &'a (dyn Payload + 'static),
) -> Option<&'a T> {
    let any: &'a (dyn Any + 'static) = payload;
    any.downcast_ref::<T>()
}

/// Borrow a payload as `&mut T` if it has that concrete type.
pub(crate) fn downcast_mut<'a, T: Payload>(
    payload: &'a mut (dyn Payload + 'static),
) -> Option<&'a mut T> {
    let any: &'a mut (dyn Any + 'static) = payload;
    any.downcast_mut::<T>()
}

/// Outcome of [`TrackHistory::advance`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Advance {
    /// The history was already at this frame; nothing changed.
    Unchanged,
    /// The previous frame was the one before; current moved to previous.
    Continued,
    /// There was a gap (or no prior frame); both buffers were cleared.
    Restarted,
}

/// Double-buffered per-track values keyed by a secondary id.
///
/// Each rendered frame the consumer calls [`advance`](Self::advance) once and
/// then [`record`](Self::record)s the values it observed. Values recorded
/// during the previous frame are available through
/// [`previous`](Self::previous) as long as the track was seen on every frame
/// in between. A track that drops out for a frame and comes back starts over,
/// so stale history never leaks across a gap.
#[derive(Clone, Debug)]
pub struct TrackHistory<T> {
    last_frame: Option<u64>,
    previous: HashMap<u32, T>,
    current: HashMap<u32, T>,
}

impl<T> Default for TrackHistory<T> {
    fn default() -> Self {
        Self {
            last_frame: None,
            previous: HashMap::new(),
            current: HashMap::new(),
        }
    }
}

impl<T> TrackHistory<T> {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the history to `frame`.
    pub fn advance(&mut self, frame: u64) -> Advance {
        let outcome = match self.last_frame {
            Some(last) if last == frame => return Advance::Unchanged,
            Some(last) if frame.checked_sub(1) == Some(last) => {
                mem::swap(&mut self.previous, &mut self.current);
                self.current.clear();
                Advance::Continued
            }
            _ => {
                self.previous.clear();
                self.current.clear();
                Advance::Restarted
            }
        };
        self.last_frame = Some(frame);
        outcome
    }

    /// Frame passed to the last [`advance`](Self::advance).
    pub fn last_frame(&self) -> Option<u64> {
        self.last_frame
    }

    /// Record the value of `id` for the current frame, replacing any earlier one.
    pub fn record(&mut self, id: u32, value: T) -> Option<T> {
        self.current.insert(id, value)
    }

    /// Record the value of `id` unless one was already recorded this frame.
    ///
    /// Returns the value held for the current frame.
    pub fn record_first(&mut self, id: u32, value: T) -> &T {
        self.current.entry(id).or_insert(value)
    }

    /// Value of `id` recorded this frame.
    pub fn current(&self, id: u32) -> Option<&T> {
        self.current.get(&id)
    }

    /// Value of `id` recorded on the previous frame.
    pub fn previous(&self, id: u32) -> Option<&T> {
        self.previous.get(&id)
    }

    /// Previous value of `id`, or the current one when there is no history yet.
    pub fn previous_or_current(&self, id: u32) -> Option<&T> {
        self.previous(id).or_else(|| self.current(id))
    }

    /// Whether any value survived from the previous frame.
    pub fn has_previous(&self) -> bool {
        !self.previous.is_empty()
    }

    /// Drop both buffers and forget the last frame.
    pub fn clear(&mut self) {
        self.last_frame = None;
        self.previous.clear();
        self.current.clear();
    }
}
