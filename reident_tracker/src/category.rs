// Copyright 2025 the Reident Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Entity categories and the encoded per-tick identity.

use core::fmt;
use core::num::NonZeroU32;

/// Coarse entity type attached to every track.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Category {
    /// No type hint. As a query filter, accepts every category.
    #[default]
    Unknown = 0,
    /// A pedestrian.
    Pedestrian = 1,
    /// A vehicle.
    Vehicle = 2,
    /// A world object (props, debris).
    Object = 3,
    /// A pickup.
    Pickup = 4,
    /// The controlled pedestrian.
    Player = 5,
}

impl Category {
    /// Decode a category from its 4-bit tag. Unassigned tags map to `Unknown`.
    pub const fn from_bits(bits: u32) -> Self {
        match bits & 0xf {
            1 => Self::Pedestrian,
            2 => Self::Vehicle,
            3 => Self::Object,
            4 => Self::Pickup,
            5 => Self::Player,
            _ => Self::Unknown,
        }
    }

    /// The 4-bit tag of this category.
    pub const fn bits(self) -> u32 {
        self as u32
    }

    /// Whether a track of category `candidate` satisfies a query for `self`.
    ///
    /// `Unknown` accepts everything and `Pedestrian` also accepts `Player`.
    pub fn accepts(self, candidate: Self) -> bool {
        self == Self::Unknown
            || self == candidate
            || (self == Self::Pedestrian && candidate == Self::Player)
    }
}

/// Entity lists enumerated by a sampling source, in sampling order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// Pedestrians, including the controlled one.
    Pedestrian,
    /// World objects.
    Object,
    /// Pickups.
    Pickup,
    /// Vehicles.
    Vehicle,
}

impl EntityKind {
    /// Every kind, in the order the sampler walks them.
    pub const ALL: [Self; 4] = [Self::Pedestrian, Self::Object, Self::Pickup, Self::Vehicle];

    /// Category assigned to entities of this kind.
    pub const fn category(self) -> Category {
        match self {
            Self::Pedestrian => Category::Pedestrian,
            Self::Object => Category::Object,
            Self::Pickup => Category::Pickup,
            Self::Vehicle => Category::Vehicle,
        }
    }
}

/// Encoded `(category, handle)` pair distinguishing entities within a tick.
///
/// The category occupies the top 4 bits, the low 28 bits of the handle the
/// rest. The encoding is never zero; an empty slot has no identity.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Identity(NonZeroU32);

impl Identity {
    /// Bits of the handle kept in the identity.
    pub const HANDLE_BITS: u32 = 28;
    const HANDLE_MASK: u32 = (1 << Self::HANDLE_BITS) - 1;

    /// Encode a category and a handle.
    ///
    /// Returns `None` when the encoding would be zero (an `Unknown` entity
    /// whose truncated handle is zero).
    pub fn new(category: Category, handle: u32) -> Option<Self> {
        NonZeroU32::new((category.bits() << Self::HANDLE_BITS) | (handle & Self::HANDLE_MASK))
            .map(Self)
    }

    /// Rebuild an identity from its raw encoding.
    pub fn from_raw(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(Self)
    }

    /// Raw 32-bit encoding.
    pub const fn raw(self) -> u32 {
        self.0.get()
    }

    /// Category encoded in the identity.
    pub const fn category(self) -> Category {
        Category::from_bits(self.raw() >> Self::HANDLE_BITS)
    }

    /// Truncated entity handle encoded in the identity.
    pub const fn handle(self) -> u32 {
        self.raw() & Self::HANDLE_MASK
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({:?}, {:#x})", self.category(), self.handle())
    }
}
