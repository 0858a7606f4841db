//! Pairwise collision detection and penetration correction.
//!
//! Circle/circle and box/box pairs are tested; mixed pairs are ignored.
//! Every pair is checked against the positions at the start of the pass,
//! then all contacts are resolved in ascending `(a, b)` order.

use tessera_core::{
    BoxCollider, CircleCollider, ColliderKind, Group, GroupMember, Transform, World,
};
use tessera_shared::{Rect, Vec2};
use tracing::trace;

use crate::events::{EngineEvent, EventBus};
use crate::physics::{box_box, circle_circle, resolve_penetration, Contact};

#[derive(Clone, Copy)]
enum Body {
    Box(Rect),
    Circle(Vec2, f32),
}

/// Detects overlaps, pushes bodies apart and publishes
/// [`EngineEvent::Collision`] for each contact.
#[derive(Clone)]
pub struct CollisionSystem {
    bus: EventBus,
}

impl CollisionSystem {
    /// Creates a system publishing to `bus`.
    #[must_use]
    pub fn new(bus: EventBus) -> Self {
        Self { bus }
    }

    /// Contacts between collider entities at their current positions.
    #[must_use]
    pub fn detect(&self, world: &World) -> Vec<Contact> {
        let bodies: Vec<_> = world
            .with_group(Group::Collider)
            .into_iter()
            .filter_map(|(id, member)| {
                let position = world.get_component::<Transform>(id)?.position;
                let body = match member {
                    GroupMember::Collider(ColliderKind::Box) => {
                        Body::Box(world.get_component::<BoxCollider>(id)?.bounds_at(position))
                    }
                    GroupMember::Collider(ColliderKind::Circle) => {
                        let circle = world.get_component::<CircleCollider>(id)?;
                        Body::Circle(circle.center_at(position), circle.radius)
                    }
                    _ => return None,
                };
                Some((id, body))
            })
            .collect();

        let mut contacts = Vec::new();
        for (i, &(a, body_a)) in bodies.iter().enumerate() {
            for &(b, body_b) in &bodies[i + 1..] {
                let hit = match (body_a, body_b) {
                    (Body::Box(ra), Body::Box(rb)) => box_box(&ra, &rb),
                    (Body::Circle(ca, ra), Body::Circle(cb, rb)) => circle_circle(ca, ra, cb, rb),
                    _ => None,
                };
                if let Some((normal, depth)) = hit {
                    contacts.push(Contact {
                        a,
                        b,
                        normal,
                        depth,
                    });
                }
            }
        }
        contacts
    }

    /// Detects, resolves and publishes.
    ///
    /// # Returns
    ///
    /// The contacts found this pass.
    pub fn update(&self, world: &mut World) -> Vec<Contact> {
        let contacts = self.detect(world);
        for contact in &contacts {
            let moved = resolve_penetration(world, contact);
            trace!(a = %contact.a, b = %contact.b, depth = contact.depth, moved, "collision");
            self.bus.publish(EngineEvent::Collision {
                a: contact.a,
                b: contact.b,
            });
        }
        contacts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use tessera_core::RigidBody;

    #[test]
    fn test_circles_pushed_apart_and_published() {
        let bus = EventBus::new(8);
        let rx = bus.subscribe(&[EventKind::Collision]);
        let mut world = World::new();

        let a = world.create_entity(0.0, 0.0);
        world.add_component(a, CircleCollider::new(10.0)).unwrap();
        world.add_component(a, RigidBody::default()).unwrap();
        let b = world.create_entity(16.0, 0.0);
        world.add_component(b, CircleCollider::new(10.0)).unwrap();
        world.add_component(b, RigidBody::default()).unwrap();
        let far = world.create_entity(500.0, 0.0);
        world.add_component(far, CircleCollider::new(10.0)).unwrap();

        let contacts = CollisionSystem::new(bus).update(&mut world);
        assert_eq!(contacts.len(), 1);
        assert_eq!(rx.drain(), vec![EngineEvent::Collision { a, b }]);

        let pos = |id| world.get_component::<Transform>(id).unwrap().position;
        assert_eq!(pos(a), Vec2::new(-2.0, 0.0));
        assert_eq!(pos(b), Vec2::new(18.0, 0.0));
    }

    #[test]
    fn test_mixed_shapes_are_ignored() {
        let mut world = World::new();
        let a = world.create_entity(0.0, 0.0);
        world.add_component(a, CircleCollider::new(10.0)).unwrap();
        let b = world.create_entity(0.0, 0.0);
        world.add_component(b, BoxCollider::new(10.0, 10.0)).unwrap();
        let c = world.create_entity(5.0, 5.0);
        world.add_component(c, BoxCollider::new(10.0, 10.0)).unwrap();

        let contacts = CollisionSystem::new(EventBus::default()).detect(&world);
        assert_eq!(contacts.len(), 1);
        assert_eq!((contacts[0].a, contacts[0].b), (b, c));
    }
}
