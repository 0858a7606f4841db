//! Lift-on-hover feedback for interface elements.

use tessera_core::{Clickable, Tag, Transform, World};

use crate::events::{EngineEvent, EventBus, EventKind, EventReceiver};

/// Raises [`Tag::Ui`] clickables by their `hover_offset` while the pointer
/// is over them and puts them back when it leaves.
///
/// Consumes the `Hover` events emitted by the input system, in the order
/// the pointer produced them.
pub struct GuiHoverSystem {
    events: EventReceiver,
}

impl GuiHoverSystem {
    /// Subscribes to hover events on `bus`.
    #[must_use]
    pub fn new(bus: &EventBus) -> Self {
        Self {
            events: bus.subscribe(&[EventKind::Hover]),
        }
    }

    /// Applies every hover event received since the last call.
    ///
    /// # Returns
    ///
    /// The number of elements that changed state.
    pub fn update(&self, world: &mut World) -> usize {
        let mut changed = 0;
        for event in self.events.drain() {
            let EngineEvent::Hover { entity, hovering } = event else {
                continue;
            };
            if world.entity(entity).map(|e| e.tag()) != Some(Tag::Ui) {
                continue;
            }
            let Some(clickable) = world.get_component_mut::<Clickable>(entity) else {
                continue;
            };
            if clickable.hovering == hovering {
                continue;
            }
            clickable.hovering = hovering;
            let lift = if hovering {
                clickable.hover_offset
            } else {
                -clickable.hover_offset
            };

            if let Some(t) = world.get_component_mut::<Transform>(entity) {
                t.position.y += lift;
            }
            changed += 1;
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::{ActionId, EntityId};
    use tessera_shared::Vec2;

    fn hover(bus: &EventBus, entity: EntityId, hovering: bool) {
        bus.publish(EngineEvent::Hover { entity, hovering });
    }

    #[test]
    fn test_lift_and_restore() {
        let bus = EventBus::new(32);
        let system = GuiHoverSystem::new(&bus);
        let mut world = World::new();
        let ui = world.create_entity_with_tag(10.0, 50.0, Tag::Ui);
        world
            .add_component(ui, Clickable::new(ActionId(1)).with_hover_offset(4.0))
            .unwrap();
        let scenery = world.create_entity(10.0, 50.0);
        world.add_component(scenery, Clickable::default()).unwrap();

        let y = |world: &World, id| world.get_component::<Transform>(id).unwrap().position.y;

        hover(&bus, ui, true);
        hover(&bus, ui, true);
        hover(&bus, scenery, true);
        assert_eq!(system.update(&mut world), 1);
        assert_eq!(y(&world, ui), 54.0);
        assert_eq!(y(&world, scenery), 50.0);
        assert!(world.get_component::<Clickable>(ui).unwrap().hovering);

        hover(&bus, ui, false);
        hover(&bus, ui, false);
        assert_eq!(system.update(&mut world), 1);
        assert_eq!(
            world.get_component::<Transform>(ui).unwrap().position,
            Vec2::new(10.0, 50.0)
        );
    }
}
