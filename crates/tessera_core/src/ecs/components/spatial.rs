//! Position, motion and collision shapes.

use bytemuck::{Pod, Zeroable};
use tessera_shared::{Dimension, Rect, Vec2};

/// World-space placement of an entity. Every entity gets one on creation.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Transform {
    /// Top-left position in world space.
    pub position: Vec2,
    /// Per-axis scale applied to drawn size.
    pub scale: Vec2,
    /// Rotation in degrees, clockwise, as the renderer expects it.
    pub rotation: f32,
}

impl Transform {
    /// Unscaled, unrotated transform at `(x, y)`.
    #[inline]
    #[must_use]
    pub const fn at(x: f32, y: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            scale: Vec2::ONE,
            rotation: 0.0,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::at(0.0, 0.0)
    }
}

/// Kinematic state of a moving entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RigidBody {
    /// Nominal speed, used by gameplay code to build velocities.
    pub speed: Vec2,
    /// Current velocity in pixels per second.
    pub velocity: Vec2,
    /// Mass; zero means immovable.
    pub mass: f32,
    /// Cached `1 / mass`, zero for immovable bodies.
    pub inverse_mass: f32,
    /// Movement integration is skipped while this is false.
    pub is_moving: bool,
}

impl RigidBody {
    /// Unit-mass body moving with `velocity`.
    #[must_use]
    pub fn with_velocity(velocity: Vec2) -> Self {
        Self {
            velocity,
            ..Self::default()
        }
    }

    /// Replaces the mass and recomputes the inverse.
    #[must_use]
    pub fn with_mass(mut self, mass: f32) -> Self {
        self.set_mass(mass);
        self
    }

    /// Sets the mass, keeping `inverse_mass` consistent.
    pub fn set_mass(&mut self, mass: f32) {
        self.mass = mass;
        self.inverse_mass = if mass == 0.0 { 0.0 } else { 1.0 / mass };
    }
}

impl Default for RigidBody {
    fn default() -> Self {
        Self {
            speed: Vec2::ZERO,
            velocity: Vec2::ZERO,
            mass: 1.0,
            inverse_mass: 1.0,
            is_moving: true,
        }
    }
}

/// Axis-aligned collision box, offset from the transform position.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoxCollider {
    /// Offset from the owner's position.
    pub offset: Vec2,
    /// Box size.
    pub size: Dimension<f32>,
}

impl BoxCollider {
    /// Box of `w` by `h` with no offset.
    #[must_use]
    pub const fn new(w: f32, h: f32) -> Self {
        Self {
            offset: Vec2::ZERO,
            size: Dimension::new(w, h),
        }
    }

    /// Sets the offset.
    #[must_use]
    pub const fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    /// World-space rectangle for an owner at `position`.
    #[must_use]
    pub fn bounds_at(&self, position: Vec2) -> Rect {
        let origin = position + self.offset;
        Rect::new(origin.x, origin.y, self.size.w, self.size.h)
    }
}

/// Circular collision shape, offset from the transform position.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CircleCollider {
    /// Circle radius.
    pub radius: f32,
    /// Offset of the centre from the owner's position.
    pub offset: Vec2,
}

impl CircleCollider {
    /// Circle of `radius` centred on the owner's position.
    #[must_use]
    pub const fn new(radius: f32) -> Self {
        Self {
            radius,
            offset: Vec2::ZERO,
        }
    }

    /// World-space centre for an owner at `position`.
    #[inline]
    #[must_use]
    pub fn center_at(&self, position: Vec2) -> Vec2 {
        position + self.offset
    }
}
