//! Free movement: `position += velocity * dt`.

use tessera_core::{CoreResult, EntityId, RigidBody, Transform, Waypoint, World};
use tessera_shared::Vec2;

use super::Scheduler;

/// Integrates velocity for bodies that are not following a path.
///
/// Bodies with a [`Waypoint`] are left to the [`super::WaypointSystem`];
/// bodies with `is_moving == false` stay put.
#[derive(Debug, Default, Clone, Copy)]
pub struct MovementSystem;

impl MovementSystem {
    /// Creates the system.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Moves every eligible body by one step.
    ///
    /// # Returns
    ///
    /// The number of entities moved.
    ///
    /// # Errors
    ///
    /// Pool failures; positions are untouched in that case.
    pub fn update(&self, world: &mut World, scheduler: Scheduler<'_>, dt: f32) -> CoreResult<usize> {
        let items: Vec<(EntityId, Vec2, Vec2)> = world
            .with_component::<RigidBody>()
            .into_iter()
            .filter(|&id| !world.has_component::<Waypoint>(id))
            .filter_map(|id| match world.components2::<Transform, RigidBody>(id) {
                (Some(t), Some(body)) if body.is_moving => Some((id, t.position, body.velocity)),
                _ => None,
            })
            .collect();

        let moved = scheduler.map(items, move |(id, position, velocity)| {
            (id, position + velocity * dt)
        })?;

        let count = moved.len();
        for (id, position) in moved {
            if let Some(t) = world.get_component_mut::<Transform>(id) {
                t.position = position;
            }
        }
        Ok(count)
    }
}
