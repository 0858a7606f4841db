//! # Input Dispatch
//!
//! ```text
//! InputSource ──poll──> InputSystem ──┬── mouse ──> Pointer ──> Hover, Clicked
//!                                     ├── keys  ──> KeyboardHandler
//!                                     ├── pads  ──> JoypadHandler, Joypad components
//!                                     └── quit  ──> quit flag
//! ```
//!
//! The pointer is a small square centred on the mouse position. A clickable
//! is hovered when the pointer square lies entirely inside its collider box,
//! which is also centred on the entity.

use std::collections::{HashMap, VecDeque};

use crossbeam_channel::Receiver;
use tessera_core::{BoxCollider, Clickable, Group, Joypad, Transform, World};
use tessera_shared::constants::POINTER_SIZE;
use tessera_shared::{Rect, Vec2};
use tracing::{debug, info};

use crate::events::{EngineEvent, EventBus, MouseButton};

/// Platform key code.
pub type KeyCode = i32;

/// Raw events delivered by the platform layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlatformEvent {
    /// Window closed or quit requested.
    Quit,
    /// Key pressed.
    KeyDown(KeyCode),
    /// Key released.
    KeyUp(KeyCode),
    /// Pointer moved.
    MouseMotion {
        /// Screen x.
        x: f32,
        /// Screen y.
        y: f32,
    },
    /// Mouse button pressed.
    MouseButtonDown {
        /// Button.
        button: MouseButton,
        /// Screen x.
        x: f32,
        /// Screen y.
        y: f32,
    },
    /// Mouse button released.
    MouseButtonUp {
        /// Button.
        button: MouseButton,
        /// Screen x.
        x: f32,
        /// Screen y.
        y: f32,
    },
    /// Gamepad button pressed.
    JoyButtonDown {
        /// Pad index.
        joypad: u8,
        /// Button index.
        button: u8,
    },
    /// Gamepad button released.
    JoyButtonUp {
        /// Pad index.
        joypad: u8,
        /// Button index.
        button: u8,
    },
    /// Gamepad stick moved.
    JoyAxisMotion {
        /// Pad index.
        joypad: u8,
        /// Axis index; 0 is horizontal, 1 vertical.
        axis: u8,
        /// Raw value in `i16` range.
        value: i16,
    },
}

/// Where platform events come from.
pub trait InputSource {
    /// Next pending event, without blocking.
    fn poll(&mut self) -> Option<PlatformEvent>;
}

/// In-memory event queue for tests and scripted runs.
#[derive(Debug, Default)]
pub struct QueuedInput {
    queue: VecDeque<PlatformEvent>,
}

impl QueuedInput {
    /// Empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event.
    pub fn push(&mut self, event: PlatformEvent) {
        self.queue.push_back(event);
    }

    /// Number of events not yet polled.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns true when every event has been polled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl FromIterator<PlatformEvent> for QueuedInput {
    fn from_iter<I: IntoIterator<Item = PlatformEvent>>(iter: I) -> Self {
        Self {
            queue: iter.into_iter().collect(),
        }
    }
}

impl InputSource for QueuedInput {
    fn poll(&mut self) -> Option<PlatformEvent> {
        self.queue.pop_front()
    }
}

/// Events pushed from another thread, e.g. a platform event pump.
impl InputSource for Receiver<PlatformEvent> {
    fn poll(&mut self) -> Option<PlatformEvent> {
        self.try_recv().ok()
    }
}

/// Receives keyboard presses.
pub trait KeyboardHandler {
    /// A key went down.
    fn key_down(&mut self, key: KeyCode, world: &mut World);

    /// A key went up.
    fn key_up(&mut self, key: KeyCode, world: &mut World);
}

/// Receives gamepad input.
pub trait JoypadHandler {
    /// A button went down.
    fn button_down(&mut self, joypad: u8, button: u8, world: &mut World);

    /// A button went up.
    fn button_up(&mut self, joypad: u8, button: u8, world: &mut World);

    /// A stick moved.
    fn axis_motion(&mut self, joypad: u8, axis: u8, value: i16, world: &mut World);
}

type WorldAction = Box<dyn FnMut(&mut World) + Send>;
type AxisAction = Box<dyn FnMut(&mut World, i16) + Send>;

/// Closures bound to individual keys.
#[derive(Default)]
pub struct KeyBindings {
    down: HashMap<KeyCode, WorldAction>,
    up: HashMap<KeyCode, WorldAction>,
}

impl KeyBindings {
    /// No bindings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `action` when `key` goes down.
    #[must_use]
    pub fn on_down(mut self, key: KeyCode, action: impl FnMut(&mut World) + Send + 'static) -> Self {
        self.down.insert(key, Box::new(action));
        self
    }

    /// Runs `action` when `key` goes up.
    #[must_use]
    pub fn on_up(mut self, key: KeyCode, action: impl FnMut(&mut World) + Send + 'static) -> Self {
        self.up.insert(key, Box::new(action));
        self
    }
}

impl KeyboardHandler for KeyBindings {
    fn key_down(&mut self, key: KeyCode, world: &mut World) {
        if let Some(action) = self.down.get_mut(&key) {
            action(world);
        }
    }

    fn key_up(&mut self, key: KeyCode, world: &mut World) {
        if let Some(action) = self.up.get_mut(&key) {
            action(world);
        }
    }
}

/// Closures bound to `(pad, button)` and `(pad, axis)` pairs.
#[derive(Default)]
pub struct JoypadBindings {
    down: HashMap<(u8, u8), WorldAction>,
    up: HashMap<(u8, u8), WorldAction>,
    axes: HashMap<(u8, u8), AxisAction>,
}

impl JoypadBindings {
    /// No bindings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `action` when `button` on `joypad` goes down.
    #[must_use]
    pub fn on_down(
        mut self,
        joypad: u8,
        button: u8,
        action: impl FnMut(&mut World) + Send + 'static,
    ) -> Self {
        self.down.insert((joypad, button), Box::new(action));
        self
    }

    /// Runs `action` when `button` on `joypad` goes up.
    #[must_use]
    pub fn on_up(
        mut self,
        joypad: u8,
        button: u8,
        action: impl FnMut(&mut World) + Send + 'static,
    ) -> Self {
        self.up.insert((joypad, button), Box::new(action));
        self
    }

    /// Runs `action` with the raw value when `axis` on `joypad` moves.
    #[must_use]
    pub fn on_axis(
        mut self,
        joypad: u8,
        axis: u8,
        action: impl FnMut(&mut World, i16) + Send + 'static,
    ) -> Self {
        self.axes.insert((joypad, axis), Box::new(action));
        self
    }
}

impl JoypadHandler for JoypadBindings {
    fn button_down(&mut self, joypad: u8, button: u8, world: &mut World) {
        if let Some(action) = self.down.get_mut(&(joypad, button)) {
            action(world);
        }
    }

    fn button_up(&mut self, joypad: u8, button: u8, world: &mut World) {
        if let Some(action) = self.up.get_mut(&(joypad, button)) {
            action(world);
        }
    }

    fn axis_motion(&mut self, joypad: u8, axis: u8, value: i16, world: &mut World) {
        if let Some(action) = self.axes.get_mut(&(joypad, axis)) {
            action(world, value);
        }
    }
}

/// Mouse state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pointer {
    /// Last known position, screen space.
    pub position: Vec2,
    /// Button of the last press or release.
    pub button: MouseButton,
    /// Whether that button is held.
    pub pressed: bool,
}

impl Pointer {
    /// Hit square centred on the position.
    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::from_center(self.position, POINTER_SIZE, POINTER_SIZE)
    }
}

/// Polls the platform and routes input.
pub struct InputSystem {
    pointer: Pointer,
    quit: bool,
    keyboard: Option<Box<dyn KeyboardHandler + Send>>,
    joypad: Option<Box<dyn JoypadHandler + Send>>,
}

impl InputSystem {
    /// System with no handlers attached.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pointer: Pointer::default(),
            quit: false,
            keyboard: None,
            joypad: None,
        }
    }

    /// Attaches the keyboard handler, replacing any previous one.
    pub fn set_keyboard_handler(&mut self, handler: impl KeyboardHandler + Send + 'static) {
        self.keyboard = Some(Box::new(handler));
    }

    /// Attaches the gamepad handler, replacing any previous one.
    pub fn set_joypad_handler(&mut self, handler: impl JoypadHandler + Send + 'static) {
        self.joypad = Some(Box::new(handler));
    }

    /// Current mouse state.
    #[inline]
    #[must_use]
    pub const fn pointer(&self) -> Pointer {
        self.pointer
    }

    /// Returns true once a quit event has been seen.
    #[inline]
    #[must_use]
    pub const fn quit_requested(&self) -> bool {
        self.quit
    }

    /// Returns true when the pointer square lies inside the collider box
    /// centred on `position + collider.offset`.
    #[must_use]
    pub fn is_inside(pointer: &Pointer, position: Vec2, collider: &BoxCollider) -> bool {
        Rect::from_center(position + collider.offset, collider.size.w, collider.size.h)
            .contains_rect(&pointer.rect())
    }

    /// Drains `source` and dispatches every event.
    ///
    /// # Returns
    ///
    /// The number of events handled.
    pub fn update(
        &mut self,
        source: &mut dyn InputSource,
        world: &mut World,
        bus: &EventBus,
    ) -> usize {
        let mut handled = 0;
        while let Some(event) = source.poll() {
            handled += 1;
            match event {
                PlatformEvent::Quit => {
                    info!("quit requested");
                    self.quit = true;
                }
                PlatformEvent::KeyDown(key) => {
                    if let Some(handler) = self.keyboard.as_mut() {
                        handler.key_down(key, world);
                    }
                }
                PlatformEvent::KeyUp(key) => {
                    if let Some(handler) = self.keyboard.as_mut() {
                        handler.key_up(key, world);
                    }
                }
                PlatformEvent::MouseMotion { x, y } => {
                    self.pointer.position = Vec2::new(x, y);
                    self.dispatch_pointer(world, bus, false);
                }
                PlatformEvent::MouseButtonDown { button, x, y } => {
                    self.pointer = Pointer {
                        position: Vec2::new(x, y),
                        button,
                        pressed: true,
                    };
                    self.dispatch_pointer(world, bus, true);
                }
                PlatformEvent::MouseButtonUp { button, x, y } => {
                    self.pointer = Pointer {
                        position: Vec2::new(x, y),
                        button,
                        pressed: false,
                    };
                    self.dispatch_pointer(world, bus, false);
                }
                PlatformEvent::JoyButtonDown { joypad, button } => {
                    if let Some(handler) = self.joypad.as_mut() {
                        handler.button_down(joypad, button, world);
                    }
                }
                PlatformEvent::JoyButtonUp { joypad, button } => {
                    if let Some(handler) = self.joypad.as_mut() {
                        handler.button_up(joypad, button, world);
                    }
                }
                PlatformEvent::JoyAxisMotion { joypad, axis, value } => {
                    update_stick(world, joypad, axis, value);
                    if let Some(handler) = self.joypad.as_mut() {
                        handler.axis_motion(joypad, axis, value, world);
                    }
                }
            }
        }
        handled
    }

    /// Hover and click events go out in pointer order, so the last hover
    /// state published for an entity is always the current one.
    fn dispatch_pointer(&self, world: &World, bus: &EventBus, button_down: bool) {
        for (entity, _) in world.with_group(Group::Clickable) {
            let (Some(t), Some(collider), Some(clickable)) =
                world.components3::<Transform, BoxCollider, Clickable>(entity)
            else {
                continue;
            };
            let hovering = Self::is_inside(&self.pointer, t.position, collider);
            bus.publish(EngineEvent::Hover { entity, hovering });

            if button_down && hovering {
                debug!(%entity, button = ?self.pointer.button, "clicked");
                bus.publish(EngineEvent::Clicked {
                    entity,
                    button: self.pointer.button,
                    action: clickable.action,
                });
            }
        }
    }
}

impl Default for InputSystem {
    fn default() -> Self {
        Self::new()
    }
}

/// Mirrors stick motion into every [`Joypad`] with the matching index.
fn update_stick(world: &mut World, joypad: u8, axis: u8, value: i16) {
    let normalized = f32::from(value) / f32::from(i16::MAX);
    for id in world.with_component::<Joypad>() {
        let Some(pad) = world.get_component_mut::<Joypad>(id) else {
            continue;
        };
        if pad.index != joypad {
            continue;
        }
        match axis {
            0 => pad.direction.x = normalized.max(-1.0),
            1 => pad.direction.y = normalized.max(-1.0),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::events::EventKind;
    use tessera_core::{ActionId, RigidBody};

    fn button(entity_x: f32, entity_y: f32, world: &mut World) -> tessera_core::EntityId {
        let id = world.create_entity(entity_x, entity_y);
        world.add_component(id, BoxCollider::new(40.0, 20.0)).unwrap();
        world.add_component(id, Clickable::new(ActionId(7))).unwrap();
        id
    }

    #[test]
    fn test_pointer_containment_is_centred() {
        let collider = BoxCollider::new(40.0, 20.0);
        let at = |x, y| Pointer {
            position: Vec2::new(x, y),
            ..Pointer::default()
        };
        let center = Vec2::new(100.0, 100.0);
        assert!(InputSystem::is_inside(&at(100.0, 100.0), center, &collider));
        assert!(InputSystem::is_inside(&at(119.0, 109.0), center, &collider));
        assert!(!InputSystem::is_inside(&at(119.5, 100.0), center, &collider));
        assert!(!InputSystem::is_inside(&at(130.0, 100.0), center, &collider));
    }

    #[test]
    fn test_click_over_clickable() {
        let bus = EventBus::new(64);
        let clicks = bus.subscribe(&[EventKind::Clicked]);
        let hovers = bus.subscribe(&[EventKind::Hover]);
        let mut world = World::new();
        let ok = button(100.0, 100.0, &mut world);
        let _other = button(500.0, 500.0, &mut world);

        let mut input: QueuedInput = [
            PlatformEvent::MouseMotion { x: 10.0, y: 10.0 },
            PlatformEvent::MouseButtonDown {
                button: MouseButton::Left,
                x: 101.0,
                y: 99.0,
            },
        ]
        .into_iter()
        .collect();

        let mut system = InputSystem::new();
        assert_eq!(system.update(&mut input, &mut world, &bus), 2);

        assert_eq!(
            clicks.drain(),
            vec![EngineEvent::Clicked {
                entity: ok,
                button: MouseButton::Left,
                action: ActionId(7),
            }]
        );
        // Two clickables, two mouse events.
        let hover_events = hovers.drain();
        assert_eq!(hover_events.len(), 4);
        assert!(hover_events.contains(&EngineEvent::Hover {
            entity: ok,
            hovering: true
        }));
        assert!(system.pointer().pressed);
    }

    #[test]
    fn test_hover_events_follow_pointer_order() {
        let bus = EventBus::new(64);
        let hovers = bus.subscribe(&[EventKind::Hover]);
        let mut world = World::new();
        let target = button(100.0, 100.0, &mut world);

        let mut input: QueuedInput = [
            PlatformEvent::MouseMotion { x: 100.0, y: 100.0 },
            PlatformEvent::MouseMotion { x: 400.0, y: 400.0 },
            PlatformEvent::MouseMotion { x: 102.0, y: 98.0 },
            PlatformEvent::MouseMotion { x: 0.0, y: 0.0 },
        ]
        .into_iter()
        .collect();
        let mut system = InputSystem::new();
        assert_eq!(system.update(&mut input, &mut world, &bus), 4);

        let states: Vec<bool> = hovers
            .drain()
            .into_iter()
            .map(|event| match event {
                EngineEvent::Hover { entity, hovering } => {
                    assert_eq!(entity, target);
                    hovering
                }
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(states, vec![true, false, true, false]);
    }

    #[test]
    fn test_keyboard_joypad_and_quit() {
        let bus = EventBus::default();
        let mut world = World::new();
        let hero = world.create_entity(0.0, 0.0);
        world.add_component(hero, RigidBody::default()).unwrap();
        world.add_component(hero, Joypad::new(0)).unwrap();

        let presses = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&presses);
        let mut system = InputSystem::new();
        system.set_keyboard_handler(
            KeyBindings::new()
                .on_down(32, move |world| {
                    counter.fetch_add(1, Ordering::Relaxed);
                    if let Some(id) = world.with_component::<RigidBody>().first().copied() {
                        if let Some(body) = world.get_component_mut::<RigidBody>(id) {
                            body.velocity = Vec2::new(0.0, -100.0);
                        }
                    }
                })
                .on_up(32, |world| {
                    for id in world.with_component::<RigidBody>() {
                        if let Some(body) = world.get_component_mut::<RigidBody>(id) {
                            body.velocity = Vec2::ZERO;
                        }
                    }
                }),
        );
        let axis_seen = Arc::new(AtomicU32::new(0));
        let axis_counter = Arc::clone(&axis_seen);
        system.set_joypad_handler(JoypadBindings::new().on_axis(0, 0, move |_, _| {
            axis_counter.fetch_add(1, Ordering::Relaxed);
        }));

        let mut input: QueuedInput = [
            PlatformEvent::KeyDown(32),
            PlatformEvent::KeyDown(13),
            PlatformEvent::JoyAxisMotion {
                joypad: 0,
                axis: 0,
                value: i16::MIN,
            },
            PlatformEvent::JoyAxisMotion {
                joypad: 1,
                axis: 1,
                value: i16::MAX,
            },
        ]
        .into_iter()
        .collect();
        system.update(&mut input, &mut world, &bus);

        assert_eq!(presses.load(Ordering::Relaxed), 1);
        assert_eq!(axis_seen.load(Ordering::Relaxed), 1);
        assert_eq!(
            world.get_component::<RigidBody>(hero).unwrap().velocity,
            Vec2::new(0.0, -100.0)
        );
        assert_eq!(
            world.get_component::<Joypad>(hero).unwrap().direction,
            Vec2::new(-1.0, 0.0)
        );
        assert!(!system.quit_requested());

        let mut input: QueuedInput = [PlatformEvent::KeyUp(32), PlatformEvent::Quit]
            .into_iter()
            .collect();
        system.update(&mut input, &mut world, &bus);
        assert_eq!(world.get_component::<RigidBody>(hero).unwrap().velocity, Vec2::ZERO);
        assert!(system.quit_requested());
    }

    #[test]
    fn test_channel_source() {
        let (tx, mut rx) = crossbeam_channel::unbounded();
        tx.send(PlatformEvent::Quit).unwrap();
        assert_eq!(rx.poll(), Some(PlatformEvent::Quit));
        assert_eq!(rx.poll(), None);
    }
}
