//! # ECS World
//!
//! The entity registry: the single store every system reads and writes.
//!
//! ```text
//!  create_entity ──> append to `entities` (ids only grow, order is kept)
//!  entity(id)    ──> binary search over `entities`
//!  kill_entity   ──> insert into `pending_kill` (entity stays valid)
//!  update        ──> drop pending entities, release components + slots
//! ```
//!
//! Deletions are only applied by [`World::update`], which the frame loop
//! calls once at the end of every frame. Systems running during the frame
//! therefore see a stable entity set.

use std::collections::BTreeSet;

use tracing::{debug, info};

use super::component::{Component, ComponentStore};
use super::components::Transform;
use super::entity::{Entity, EntityId, Layer, SlotKey, Tag};
use super::group::{Group, GroupMember};
use super::slots::SlotArena;
use crate::error::{CoreError, CoreResult};

/// The ECS World - container for all game state.
///
/// # Example
///
/// ```rust,ignore
/// let mut world = World::new();
///
/// let hero = world.create_entity_with_tag(100.0, 100.0, Tag::Player);
/// world.add_component(hero, RigidBody::with_velocity(Vec2::new(30.0, 0.0)))?;
/// ```
#[derive(Default)]
pub struct World {
    /// Live entities, ascending by id.
    entities: Vec<Entity>,
    /// Entities scheduled for removal at the next `update`.
    pending_kill: BTreeSet<EntityId>,
    /// Last id handed out.
    last_id: u64,
    /// Cached id of the entity tagged `Player`.
    player: Option<EntityId>,
    /// Slot allocator for component storage.
    slots: SlotArena,
    /// Component columns.
    components: ComponentStore,
}

impl World {
    /// Creates an empty world.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of live entities (including pending kills).
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns true if there are no live entities.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Creates an entity at `(x, y)` with the default tag.
    pub fn create_entity(&mut self, x: f32, y: f32) -> EntityId {
        self.create_entity_with_tag(x, y, Tag::Standard)
    }

    /// Creates an entity at `(x, y)` with a primary tag.
    ///
    /// The entity gets the next id and a [`Transform`] at the given
    /// position. Tagging it [`Tag::Player`] makes it the cached player.
    pub fn create_entity_with_tag(&mut self, x: f32, y: f32, tag: Tag) -> EntityId {
        self.last_id += 1;
        let id = EntityId::new(self.last_id);
        let slot = self.slots.allocate();

        let mut entity = Entity::new(id, slot, tag);
        Transform::storage_mut(&mut self.components).insert(
            slot.index() as usize,
            id,
            Transform::at(x, y),
        );
        entity.mark(Transform::KIND);
        self.entities.push(entity);

        if tag == Tag::Player {
            self.player = Some(id);
        }
        id
    }

    /// Schedules an entity for removal at the next [`World::update`].
    ///
    /// The entity stays fully usable until then. Killing the same entity
    /// twice is harmless.
    ///
    /// # Returns
    ///
    /// `true` if the entity exists and was not already scheduled.
    pub fn kill_entity(&mut self, id: EntityId) -> bool {
        if self.index_of(id).is_none() {
            return false;
        }
        self.pending_kill.insert(id)
    }

    /// Returns true if `id` is scheduled for removal.
    #[must_use]
    pub fn is_pending_kill(&self, id: EntityId) -> bool {
        self.pending_kill.contains(&id)
    }

    /// Applies every pending kill.
    ///
    /// Components are released and slots recycled before the entity records
    /// are dropped. Call once per frame, after all systems have run.
    ///
    /// # Returns
    ///
    /// The number of entities removed.
    pub fn update(&mut self) -> usize {
        if self.pending_kill.is_empty() {
            return 0;
        }

        let pending = std::mem::take(&mut self.pending_kill);
        let Self {
            entities,
            slots,
            components,
            ..
        } = self;

        let before = entities.len();
        entities.retain(|entity| {
            if !pending.contains(&entity.id()) {
                return true;
            }
            components.release(entity.slot().index() as usize);
            slots.release(entity.slot());
            false
        });
        let removed = before - entities.len();

        if self.player.is_some_and(|p| pending.contains(&p)) {
            self.player = None;
        }

        debug!(removed, live = self.entities.len(), "flushed pending entity deletions");
        removed
    }

    /// Removes every entity and component at once.
    ///
    /// Ids keep counting from where they were; an id is never handed out
    /// twice in the lifetime of a world.
    pub fn clear(&mut self) {
        let count = self.entities.len();
        for entity in self.entities.drain(..) {
            self.slots.release(entity.slot());
        }
        self.components.clear();
        self.pending_kill.clear();
        self.player = None;
        info!(count, "world cleared");
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    fn index_of(&self, id: EntityId) -> Option<usize> {
        self.entities.binary_search_by_key(&id, Entity::id).ok()
    }

    fn slot_of(&self, id: EntityId) -> Option<SlotKey> {
        let slot = self.entities[self.index_of(id)?].slot();
        self.slots.is_live(slot).then_some(slot)
    }

    /// Gets an entity by id.
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.index_of(id).map(|i| &self.entities[i])
    }

    /// Gets a mutable entity by id, for changing its layer, z-index or tags.
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        let index = self.index_of(id)?;
        Some(&mut self.entities[index])
    }

    /// Returns true if the entity is live (pending kills included).
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.index_of(id).is_some()
    }

    /// Read-only view of every live entity, ascending by id.
    #[inline]
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Id of the cached player entity.
    #[inline]
    #[must_use]
    pub const fn player_id(&self) -> Option<EntityId> {
        self.player
    }

    /// Moves an entity to another layer.
    pub fn set_layer(&mut self, id: EntityId, layer: Layer) -> bool {
        self.entity_mut(id).map(|e| e.layer = layer).is_some()
    }

    /// Changes an entity's z-index.
    pub fn set_z_index(&mut self, id: EntityId, z_index: i16) -> bool {
        self.entity_mut(id).map(|e| e.z_index = z_index).is_some()
    }

    /// Replaces an entity's tags, updating the player cache.
    pub fn set_tags(&mut self, id: EntityId, primary: Tag, secondary: Tag) -> bool {
        let Some(entity) = self.entity_mut(id) else {
            return false;
        };
        entity.tags = (primary, secondary);
        if primary == Tag::Player {
            self.player = Some(id);
        } else if self.player == Some(id) {
            self.player = None;
        }
        true
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Ids of entities whose primary tag is `tag`.
    #[must_use]
    pub fn with_tag(&self, tag: Tag) -> Vec<EntityId> {
        self.collect_ids(|e| e.tag() == tag)
    }

    /// Ids of entities on `layer`.
    #[must_use]
    pub fn with_layer(&self, layer: Layer) -> Vec<EntityId> {
        self.collect_ids(|e| e.layer == layer)
    }

    /// Ids of entities carrying a `C`.
    #[must_use]
    pub fn with_component<C: Component>(&self) -> Vec<EntityId> {
        self.collect_ids(|e| e.has(C::KIND))
    }

    /// Entities in `group`, each with the kind that classified it.
    #[must_use]
    pub fn with_group(&self, group: Group) -> Vec<(EntityId, GroupMember)> {
        self.entities
            .iter()
            .filter_map(|e| group.classify(e).map(|member| (e.id(), member)))
            .collect()
    }

    fn collect_ids(&self, filter: impl Fn(&Entity) -> bool) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|e| filter(e))
            .map(Entity::id)
            .collect()
    }

    // =========================================================================
    // Components
    // =========================================================================

    /// Attaches a component, replacing any existing one of the same type.
    ///
    /// # Returns
    ///
    /// The replaced component, if there was one.
    ///
    /// # Errors
    ///
    /// [`CoreError::UnknownEntity`] if `id` is not live; the component is
    /// dropped.
    pub fn add_component<C: Component>(
        &mut self,
        id: EntityId,
        component: C,
    ) -> CoreResult<Option<C>> {
        let index = self.index_of(id).ok_or(CoreError::UnknownEntity(id))?;
        let entity = &mut self.entities[index];
        entity.mark(C::KIND);
        let slot = entity.slot().index() as usize;
        Ok(C::storage_mut(&mut self.components).insert(slot, id, component))
    }

    /// Detaches and returns a component.
    pub fn remove_component<C: Component>(&mut self, id: EntityId) -> Option<C> {
        let index = self.index_of(id)?;
        let entity = &mut self.entities[index];
        entity.unmark(C::KIND);
        let slot = entity.slot().index() as usize;
        C::storage_mut(&mut self.components).remove(slot)
    }

    /// Returns true if the entity carries a `C`.
    #[must_use]
    pub fn has_component<C: Component>(&self, id: EntityId) -> bool {
        self.entity(id).is_some_and(|e| e.has(C::KIND))
    }

    /// Gets an entity's component.
    #[must_use]
    pub fn get_component<C: Component>(&self, id: EntityId) -> Option<&C> {
        let slot = self.slot_of(id)?;
        C::storage(&self.components).get_owned(slot.index() as usize, id)
    }

    /// Gets an entity's component mutably.
    pub fn get_component_mut<C: Component>(&mut self, id: EntityId) -> Option<&mut C> {
        let slot = self.slot_of(id)?;
        C::storage_mut(&mut self.components).get_owned_mut(slot.index() as usize, id)
    }

    /// Reads a component through a raw slot key.
    ///
    /// Keys from a released slot fail the generation check and read
    /// nothing, even after the slot has been handed to a new entity.
    #[must_use]
    pub fn component_at<C: Component>(&self, key: SlotKey) -> Option<&C> {
        if !self.slots.is_live(key) {
            return None;
        }
        C::storage(&self.components).get(key.index() as usize)
    }

    /// Fetches two components at once. Each lookup is independent.
    #[must_use]
    pub fn components2<A: Component, B: Component>(
        &self,
        id: EntityId,
    ) -> (Option<&A>, Option<&B>) {
        let Some(slot) = self.slot_of(id) else {
            return (None, None);
        };
        let i = slot.index() as usize;
        (
            A::storage(&self.components).get_owned(i, id),
            B::storage(&self.components).get_owned(i, id),
        )
    }

    /// Fetches three components at once. Each lookup is independent.
    #[must_use]
    pub fn components3<A: Component, B: Component, C: Component>(
        &self,
        id: EntityId,
    ) -> (Option<&A>, Option<&B>, Option<&C>) {
        let Some(slot) = self.slot_of(id) else {
            return (None, None, None);
        };
        let i = slot.index() as usize;
        (
            A::storage(&self.components).get_owned(i, id),
            B::storage(&self.components).get_owned(i, id),
            C::storage(&self.components).get_owned(i, id),
        )
    }

    /// Number of attached components of type `C` across all entities.
    #[must_use]
    pub fn component_count<C: Component>(&self) -> usize {
        C::storage(&self.components).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::{RigidBody, Sprite, Waypoint};
    use crate::ecs::group::RenderKind;
    use tessera_shared::{Dimension, TextureHandle, Vec2};

    fn is_sorted(world: &World) -> bool {
        world.entities().windows(2).all(|w| w[0].id() < w[1].id())
    }

    #[test]
    fn test_create_assigns_increasing_ids_and_transform() {
        let mut world = World::new();
        let a = world.create_entity(1.0, 2.0);
        let b = world.create_entity(3.0, 4.0);

        assert_eq!(a, EntityId::new(1));
        assert_eq!(b, EntityId::new(2));
        let t = world.get_component::<Transform>(b).unwrap();
        assert_eq!(t.position, Vec2::new(3.0, 4.0));
        assert!(world.has_component::<Transform>(a));
    }

    #[test]
    fn test_player_cache() {
        let mut world = World::new();
        world.create_entity(0.0, 0.0);
        let hero = world.create_entity_with_tag(0.0, 0.0, Tag::Player);
        assert_eq!(world.player_id(), Some(hero));

        world.kill_entity(hero);
        assert_eq!(world.player_id(), Some(hero), "kill is deferred");
        world.update();
        assert_eq!(world.player_id(), None);
    }

    #[test]
    fn test_deferred_kill_is_idempotent() {
        let mut world = World::new();
        let a = world.create_entity(0.0, 0.0);
        let b = world.create_entity(0.0, 0.0);

        assert!(world.kill_entity(a));
        assert!(!world.kill_entity(a));
        assert!(world.entity(a).is_some());
        assert!(world.is_pending_kill(a));

        assert_eq!(world.update(), 1);
        assert!(world.entity(a).is_none());
        assert!(world.entity(b).is_some());
        assert_eq!(world.update(), 0);
        assert!(!world.kill_entity(a), "flushed ids can't be killed again");
    }

    #[test]
    fn test_update_releases_components_and_recycles_slots() {
        let mut world = World::new();
        let a = world.create_entity(0.0, 0.0);
        world.add_component(a, RigidBody::default()).unwrap();
        assert_eq!(world.component_count::<RigidBody>(), 1);

        world.kill_entity(a);
        world.update();
        assert_eq!(world.component_count::<RigidBody>(), 0);
        assert_eq!(world.component_count::<Transform>(), 0);

        let b = world.create_entity(0.0, 0.0);
        assert!(b > a);
        assert!(world.get_component::<RigidBody>(b).is_none());
        assert_eq!(world.entity(b).unwrap().slot().generation(), 1);
    }

    #[test]
    fn test_stale_slot_key_misses_new_occupant() {
        let mut world = World::new();
        let a = world.create_entity(1.0, 1.0);
        world
            .add_component(a, RigidBody::with_velocity(Vec2::new(1.0, 0.0)))
            .unwrap();
        let stale = world.entity(a).unwrap().slot();
        assert_eq!(
            world.component_at::<RigidBody>(stale).unwrap().velocity,
            Vec2::new(1.0, 0.0)
        );

        world.kill_entity(a);
        world.update();
        let b = world.create_entity(2.0, 2.0);
        world
            .add_component(b, RigidBody::with_velocity(Vec2::new(2.0, 0.0)))
            .unwrap();
        let fresh = world.entity(b).unwrap().slot();
        assert_eq!(fresh.index(), stale.index());
        assert_ne!(fresh.generation(), stale.generation());

        assert!(world.component_at::<RigidBody>(stale).is_none());
        assert!(world.component_at::<Transform>(stale).is_none());
        assert!(world.get_component::<RigidBody>(a).is_none());
        assert_eq!(
            world.component_at::<RigidBody>(fresh).unwrap().velocity,
            Vec2::new(2.0, 0.0)
        );
    }

    #[test]
    fn test_sorted_after_churn() {
        let mut world = World::new();
        let ids: Vec<_> = (0..50).map(|i| world.create_entity(i as f32, 0.0)).collect();
        for id in ids.iter().step_by(3) {
            world.kill_entity(*id);
        }
        world.update();
        for _ in 0..10 {
            world.create_entity(0.0, 0.0);
        }
        assert!(is_sorted(&world));
        for id in ids.iter().skip(1).step_by(3) {
            assert_eq!(world.entity(*id).map(Entity::id), Some(*id));
        }
    }

    #[test]
    fn test_add_component_replaces() {
        let mut world = World::new();
        let a = world.create_entity(0.0, 0.0);
        let first = Waypoint::to(Vec2::new(1.0, 1.0));
        let second = Waypoint::to(Vec2::new(2.0, 2.0));

        assert_eq!(world.add_component(a, first.clone()), Ok(None));
        assert_eq!(world.add_component(a, second), Ok(Some(first)));
        assert_eq!(world.component_count::<Waypoint>(), 1);
    }

    #[test]
    fn test_add_component_unknown_entity() {
        let mut world = World::new();
        let ghost = EntityId::new(99);
        assert_eq!(
            world.add_component(ghost, RigidBody::default()),
            Err(CoreError::UnknownEntity(ghost))
        );
    }

    #[test]
    fn test_remove_component_clears_mask() {
        let mut world = World::new();
        let a = world.create_entity(0.0, 0.0);
        world.add_component(a, RigidBody::default()).unwrap();
        assert!(world.remove_component::<RigidBody>(a).is_some());
        assert!(!world.has_component::<RigidBody>(a));
        assert!(world.with_component::<RigidBody>().is_empty());
    }

    #[test]
    fn test_paired_lookup_is_independent() {
        let mut world = World::new();
        let a = world.create_entity(5.0, 5.0);
        let (t, b) = world.components2::<Transform, RigidBody>(a);
        assert!(t.is_some());
        assert!(b.is_none());
        let (t, b, w) = world.components3::<Transform, RigidBody, Waypoint>(EntityId::new(77));
        assert!(t.is_none() && b.is_none() && w.is_none());
    }

    #[test]
    fn test_queries() {
        let mut world = World::new();
        let enemy = world.create_entity_with_tag(0.0, 0.0, Tag::Enemy);
        let bg = world.create_entity(0.0, 0.0);
        world.set_layer(bg, Layer::Background);
        world
            .add_component(bg, Sprite::new(TextureHandle(1), Dimension::new(8, 8)))
            .unwrap();

        assert_eq!(world.with_tag(Tag::Enemy), vec![enemy]);
        assert_eq!(world.with_layer(Layer::Background), vec![bg]);
        assert_eq!(world.with_layer(Layer::Middle), vec![enemy]);
        assert_eq!(
            world.with_group(Group::Renderable),
            vec![(bg, GroupMember::Render(RenderKind::Sprite))]
        );
    }

    #[test]
    fn test_clear_keeps_counting() {
        let mut world = World::new();
        world.create_entity(0.0, 0.0);
        let p = world.create_entity_with_tag(0.0, 0.0, Tag::Player);
        world.kill_entity(p);
        world.clear();

        assert!(world.is_empty());
        assert_eq!(world.player_id(), None);
        assert_eq!(world.update(), 0);
        assert_eq!(world.create_entity(0.0, 0.0), EntityId::new(3));
    }

    #[test]
    fn test_set_tags_moves_player() {
        let mut world = World::new();
        let a = world.create_entity(0.0, 0.0);
        assert!(world.set_tags(a, Tag::Player, Tag::Shield));
        assert_eq!(world.player_id(), Some(a));
        assert!(world.set_tags(a, Tag::Enemy, Tag::Standard));
        assert_eq!(world.player_id(), None);
        assert!(world.set_z_index(a, 4));
        assert_eq!(world.entity(a).map(|e| e.z_index), Some(4));
    }
}
