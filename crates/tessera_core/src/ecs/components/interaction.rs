//! Pointer and controller bindings.

use tessera_shared::constants::DEFAULT_HOVER_OFFSET;
use tessera_shared::Vec2;

/// Opaque action code routed with click events.
///
/// Gameplay code decides what each code means; the engine only carries it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionId(pub u32);

/// Makes an entity respond to the pointer.
///
/// Requires a `BoxCollider` for hit testing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Clickable {
    /// Action reported when the entity is clicked.
    pub action: ActionId,
    /// Vertical lift applied while a UI element is hovered.
    pub hover_offset: f32,
    /// Whether the hover lift is currently applied.
    pub hovering: bool,
}

impl Clickable {
    /// Clickable reporting `action`, with the default hover lift.
    #[must_use]
    pub const fn new(action: ActionId) -> Self {
        Self {
            action,
            hover_offset: DEFAULT_HOVER_OFFSET,
            hovering: false,
        }
    }

    /// Changes the hover lift.
    #[must_use]
    pub const fn with_hover_offset(mut self, hover_offset: f32) -> Self {
        self.hover_offset = hover_offset;
        self
    }
}

impl Default for Clickable {
    fn default() -> Self {
        Self::new(ActionId::default())
    }
}

/// Binds an entity to a physical joypad.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Joypad {
    /// Device index as reported by the platform.
    pub index: u8,
    /// Last stick direction written by gameplay code.
    pub direction: Vec2,
}

impl Joypad {
    /// Binding for device `index`.
    #[must_use]
    pub const fn new(index: u8) -> Self {
        Self {
            index,
            direction: Vec2::ZERO,
        }
    }
}
