//! # Entity Management
//!
//! An entity is two identifiers:
//! - An [`EntityId`], monotonically increasing and never reused, which is
//!   what gameplay code holds on to and what the registry sorts by
//! - A [`SlotKey`], an index into the component arrays plus a generation
//!   counter, which is recycled after the entity is flushed

use std::fmt;

use super::component::ComponentKind;

/// Public identity of an entity.
///
/// Ids start at 1 and only ever grow. Zero is reserved for [`EntityId::NULL`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Null/invalid entity ID.
    pub const NULL: Self = Self(0);

    /// Wraps a raw id value.
    #[inline]
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw id value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Checks if this entity ID is null/invalid.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Storage address of an entity.
///
/// - Lower 32 bits: Index into component arrays
/// - Upper 32 bits: Generation counter for detecting stale references
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct SlotKey(u64);

impl SlotKey {
    /// Creates a slot key from index and generation.
    ///
    /// # Arguments
    ///
    /// * `index` - The index into component arrays
    /// * `generation` - The generation counter of that slot
    #[inline]
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self(((generation as u64) << 32) | (index as u64))
    }

    /// Returns the index portion of the key.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0 as u32
    }

    /// Returns the generation portion of the key.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }
}

/// Semantic classification used by gameplay queries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Tag {
    /// No particular role.
    #[default]
    Standard,
    /// Removed after a timeout.
    KillByTime,
    /// Static scenery.
    Background,
    /// Map tile.
    Tile,
    /// Hostile actor; the default radar target.
    Enemy,
    /// The distinguished player entity.
    Player,
    /// Defensive pickup or effect.
    Shield,
    /// Projectile.
    Bullet,
    /// Melee hit volume.
    Blade,
    /// Collectible.
    Coin,
    /// Screen-space interface element.
    Ui,
}

/// Coarse draw-order bucket.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Layer {
    /// Drawn first, ordered by z-index.
    Background,
    /// Drawn second, ordered by world y.
    #[default]
    Middle,
    /// Drawn last, ordered by z-index.
    Foreground,
}

/// A live entity record held by the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Entity {
    id: EntityId,
    slot: SlotKey,
    component_mask: u64,
    /// Draw-order bucket.
    pub layer: Layer,
    /// Tie-break within background and foreground layers.
    pub z_index: i16,
    /// Primary and secondary classification.
    pub tags: (Tag, Tag),
}

impl Entity {
    pub(crate) const fn new(id: EntityId, slot: SlotKey, tag: Tag) -> Self {
        Self {
            id,
            slot,
            component_mask: 0,
            layer: Layer::Middle,
            z_index: 0,
            tags: (tag, Tag::Standard),
        }
    }

    /// The entity's public id.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// The entity's storage slot.
    #[inline]
    #[must_use]
    pub const fn slot(&self) -> SlotKey {
        self.slot
    }

    /// Primary tag, the one tag queries match against.
    #[inline]
    #[must_use]
    pub const fn tag(&self) -> Tag {
        self.tags.0
    }

    /// Bitmask of attached component kinds.
    #[inline]
    #[must_use]
    pub const fn component_mask(&self) -> u64 {
        self.component_mask
    }

    /// Checks if this entity has a component of the given kind.
    #[inline]
    #[must_use]
    pub const fn has(&self, kind: ComponentKind) -> bool {
        self.component_mask & kind.bit() != 0
    }

    #[inline]
    pub(crate) fn mark(&mut self, kind: ComponentKind) {
        self.component_mask |= kind.bit();
    }

    #[inline]
    pub(crate) fn unmark(&mut self, kind: ComponentKind) {
        self.component_mask &= !kind.bit();
    }
}
