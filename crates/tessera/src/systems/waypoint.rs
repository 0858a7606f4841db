//! Path following.
//!
//! Each tick an entity steps toward the front point of its path. The step
//! is the body's velocity scaled per axis by the cached heading, so a body
//! with velocity `(S, S)` covers `S * dt` along the heading.

use tessera_core::{CoreResult, EntityId, RigidBody, Transform, Waypoint, World};
use tessera_shared::Vec2;

use super::Scheduler;

/// Advances `position` one step along `path`.
///
/// - An empty path does nothing.
/// - A zero heading is recomputed toward the front point.
/// - Within `epsilon` of the front point, the point is popped and the
///   heading reset.
/// - A step whose progress toward the point reaches it (to within
///   `epsilon`) lands exactly on it and pops it. Progress is the step
///   projected onto the line to the point, so a sideways or backwards step
///   never counts as arrival.
pub fn navigate(position: &mut Vec2, velocity: Vec2, path: &mut Waypoint, dt: f32, epsilon: f32) {
    let Some(target) = path.current() else {
        return;
    };

    if path.direction.is_zero() {
        path.direction = (target - *position).normalize();
    }

    let distance = position.distance(target);
    if distance <= epsilon {
        path.points.pop_front();
        path.direction = Vec2::ZERO;
        return;
    }

    let step = Vec2::new(
        velocity.x * dt * path.direction.x,
        velocity.y * dt * path.direction.y,
    );
    let toward = (target - *position).normalize();
    if step.dot(toward) >= distance - epsilon {
        *position = target;
        path.points.pop_front();
        path.direction = Vec2::ZERO;
    } else {
        *position += step;
    }
}

/// Moves bodies along their [`Waypoint`] paths.
#[derive(Debug, Clone, Copy)]
pub struct WaypointSystem {
    epsilon: f32,
}

impl WaypointSystem {
    /// System that treats a point as reached within `epsilon`.
    #[must_use]
    pub const fn new(epsilon: f32) -> Self {
        Self { epsilon }
    }

    /// Arrival distance.
    #[inline]
    #[must_use]
    pub const fn epsilon(&self) -> f32 {
        self.epsilon
    }

    /// Steps every pathing body once.
    ///
    /// Paths are moved out of the world for the parallel phase and put back
    /// afterwards.
    ///
    /// # Returns
    ///
    /// The number of entities with a path.
    ///
    /// # Errors
    ///
    /// Pool failures. Paths of the chunks that were lost are cleared.
    pub fn update(&self, world: &mut World, scheduler: Scheduler<'_>, dt: f32) -> CoreResult<usize> {
        let ids = world.with_component::<Waypoint>();
        let mut items: Vec<(EntityId, Vec2, Vec2, Waypoint)> = Vec::with_capacity(ids.len());
        for id in ids {
            let (Some(t), Some(body)) = world.components2::<Transform, RigidBody>(id) else {
                continue;
            };
            let (position, velocity) = (t.position, body.velocity);
            let Some(path) = world.get_component_mut::<Waypoint>(id) else {
                continue;
            };
            items.push((id, position, velocity, std::mem::take(path)));
        }

        let epsilon = self.epsilon;
        let stepped = scheduler.map(items, move |(id, mut position, velocity, mut path)| {
            navigate(&mut position, velocity, &mut path, dt, epsilon);
            (id, position, path)
        })?;

        let count = stepped.len();
        for (id, position, path) in stepped {
            if let Some(t) = world.get_component_mut::<Transform>(id) {
                t.position = position;
            }
            if let Some(slot) = world.get_component_mut::<Waypoint>(id) {
                *slot = path;
            }
        }
        Ok(count)
    }
}

impl Default for WaypointSystem {
    fn default() -> Self {
        Self::new(tessera_shared::WAYPOINT_EPSILON)
    }
}
