//! # Component Storage
//!
//! Dense per-type columns indexed by slot:
//! - Access is O(1) via the slot index
//! - Each occupied cell records the owning entity's id
//! - Removing a component leaves a hole that the next owner of the slot reuses

use super::entity::EntityId;

/// Storage column for a single component type.
///
/// # Type Parameters
///
/// * `C` - The component type to store
pub struct ComponentStorage<C> {
    /// Cells indexed by slot; `None` means no component.
    cells: Vec<Option<(EntityId, C)>>,
    /// Number of occupied cells.
    len: usize,
}

impl<C> ComponentStorage<C> {
    /// Creates an empty column.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cells: Vec::new(),
            len: 0,
        }
    }

    /// Number of stored components.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true when no component is stored.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Gets a component by slot index.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&C> {
        self.cells.get(index)?.as_ref().map(|(_, c)| c)
    }

    /// Gets a mutable component by slot index.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut C> {
        self.cells.get_mut(index)?.as_mut().map(|(_, c)| c)
    }

    /// Gets the component at `index` only if `owner` is stamped on it.
    #[inline]
    #[must_use]
    pub fn get_owned(&self, index: usize, owner: EntityId) -> Option<&C> {
        match self.cells.get(index)? {
            Some((stamp, c)) if *stamp == owner => Some(c),
            _ => None,
        }
    }

    /// Mutable counterpart of [`Self::get_owned`].
    #[inline]
    pub fn get_owned_mut(&mut self, index: usize, owner: EntityId) -> Option<&mut C> {
        match self.cells.get_mut(index)? {
            Some((stamp, c)) if *stamp == owner => Some(c),
            _ => None,
        }
    }

    /// Id of the entity owning the component at `index`.
    #[inline]
    #[must_use]
    pub fn owner(&self, index: usize) -> Option<EntityId> {
        self.cells.get(index)?.as_ref().map(|(owner, _)| *owner)
    }

    /// Stores `component` at `index`, stamped with `owner`.
    ///
    /// # Returns
    ///
    /// The component previously stored in the cell, if any.
    pub fn insert(&mut self, index: usize, owner: EntityId, component: C) -> Option<C> {
        if index >= self.cells.len() {
            self.cells.resize_with(index + 1, || None);
        }
        let previous = self.cells[index].replace((owner, component));
        if previous.is_none() {
            self.len += 1;
        }
        previous.map(|(_, c)| c)
    }

    /// Removes and returns the component at `index`.
    pub fn remove(&mut self, index: usize) -> Option<C> {
        let (_, component) = self.cells.get_mut(index)?.take()?;
        self.len -= 1;
        Some(component)
    }

    /// Iterates over stored components with their owners, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &C)> {
        self.cells
            .iter()
            .filter_map(|cell| cell.as_ref().map(|(owner, c)| (*owner, c)))
    }

    /// Drops every stored component.
    pub fn clear(&mut self) {
        self.cells.clear();
        self.len = 0;
    }
}

impl<C> Default for ComponentStorage<C> {
    fn default() -> Self {
        Self::new()
    }
}
