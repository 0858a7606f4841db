//! # Slot Arena
//!
//! Hands out generation-checked [`SlotKey`]s for component storage.
//!
//! Releasing a slot bumps its generation and pushes the index onto a free
//! list, so a key held past its entity's deletion no longer validates and
//! can't read the next occupant's components.

use super::entity::SlotKey;

/// Allocator of recyclable storage slots.
#[derive(Debug, Default)]
pub struct SlotArena {
    /// Current generation of every slot ever handed out.
    generations: Vec<u32>,
    /// Whether each slot is currently in use.
    occupied: Vec<bool>,
    /// Released indices, reused most recent first.
    free_list: Vec<u32>,
    /// Number of slots in use.
    live: usize,
}

impl SlotArena {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of slots in use.
    #[inline]
    #[must_use]
    pub const fn live_count(&self) -> usize {
        self.live
    }

    /// Number of slots ever created (used plus free).
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.generations.len()
    }

    /// Takes a free slot, or grows the arena by one.
    pub fn allocate(&mut self) -> SlotKey {
        self.live += 1;
        if let Some(index) = self.free_list.pop() {
            let i = index as usize;
            self.occupied[i] = true;
            return SlotKey::new(index, self.generations[i]);
        }

        let index = u32::try_from(self.generations.len()).unwrap_or(u32::MAX);
        self.generations.push(0);
        self.occupied.push(true);
        SlotKey::new(index, 0)
    }

    /// Returns a slot to the free list.
    ///
    /// # Returns
    ///
    /// `false` if the key is stale or was never handed out.
    pub fn release(&mut self, key: SlotKey) -> bool {
        if !self.is_live(key) {
            return false;
        }
        let i = key.index() as usize;
        self.occupied[i] = false;
        self.generations[i] = self.generations[i].wrapping_add(1);
        self.free_list.push(key.index());
        self.live -= 1;
        true
    }

    /// Checks that `key` refers to the current occupant of its slot.
    #[inline]
    #[must_use]
    pub fn is_live(&self, key: SlotKey) -> bool {
        let i = key.index() as usize;
        self.occupied.get(i).copied().unwrap_or(false) && self.generations[i] == key.generation()
    }
}
