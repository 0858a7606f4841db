//! # Contact Physics
//!
//! Overlap tests and penetration correction. No impulses, no friction:
//! overlapping bodies are pushed apart along the contact normal in
//! proportion to their inverse masses, and velocities are left alone.
//!
//! ```text
//!   A ●───normal──> ● B       A moves by -normal * depth * invA / (invA + invB)
//!        <─depth─>            B moves by +normal * depth * invB / (invA + invB)
//! ```
//!
//! A body without a [`RigidBody`] has an inverse mass of zero and never
//! moves.

use tessera_core::{EntityId, RigidBody, Transform, World};
use tessera_shared::{Rect, Vec2};

// ============================================================================
// Contacts
// ============================================================================

/// Two overlapping shapes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contact {
    /// First body.
    pub a: EntityId,
    /// Second body.
    pub b: EntityId,
    /// Unit vector pointing from `a` toward `b`.
    pub normal: Vec2,
    /// Overlap along `normal`.
    pub depth: f32,
}

/// Overlap of two circles.
///
/// # Returns
///
/// `(normal, depth)` with the normal pointing from `a` to `b`, or `None`
/// when the circles don't overlap. Concentric circles separate along +x.
#[must_use]
pub fn circle_circle(a: Vec2, radius_a: f32, b: Vec2, radius_b: f32) -> Option<(Vec2, f32)> {
    let delta = b - a;
    let distance = delta.length();
    let reach = radius_a + radius_b;
    if distance >= reach {
        return None;
    }
    let normal = if distance == 0.0 {
        Vec2::new(1.0, 0.0)
    } else {
        delta / distance
    };
    Some((normal, reach - distance))
}

/// Overlap of two axis-aligned boxes, resolved along the shallower axis.
///
/// # Returns
///
/// `(normal, depth)` with the normal pointing from `a` to `b`, or `None`
/// when the boxes only touch or are apart.
#[must_use]
pub fn box_box(a: &Rect, b: &Rect) -> Option<(Vec2, f32)> {
    if !a.intersects(b) {
        return None;
    }
    let overlap_x = a.right().min(b.right()) - a.x.max(b.x);
    let overlap_y = a.bottom().min(b.bottom()) - a.y.max(b.y);
    let delta = b.center() - a.center();

    if overlap_x < overlap_y {
        let sign = if delta.x < 0.0 { -1.0 } else { 1.0 };
        Some((Vec2::new(sign, 0.0), overlap_x))
    } else {
        let sign = if delta.y < 0.0 { -1.0 } else { 1.0 };
        Some((Vec2::new(0.0, sign), overlap_y))
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Splits `depth` between two bodies by inverse mass.
///
/// # Returns
///
/// How far A and B each move, or `None` when both are immovable.
#[must_use]
pub fn penetration_offsets(depth: f32, inverse_mass_a: f32, inverse_mass_b: f32) -> Option<(f32, f32)> {
    let total = inverse_mass_a + inverse_mass_b;
    if total <= 0.0 {
        return None;
    }
    let per_unit = depth / total;
    Some((per_unit * inverse_mass_a, per_unit * inverse_mass_b))
}

fn inverse_mass(world: &World, id: EntityId) -> f32 {
    world
        .get_component::<RigidBody>(id)
        .map_or(0.0, |body| body.inverse_mass)
}

/// Pushes the two bodies of `contact` apart.
///
/// # Returns
///
/// `false` when neither body can move or one of them is gone.
pub fn resolve_penetration(world: &mut World, contact: &Contact) -> bool {
    if !world.has_component::<Transform>(contact.a) || !world.has_component::<Transform>(contact.b) {
        return false;
    }
    let Some((move_a, move_b)) = penetration_offsets(
        contact.depth,
        inverse_mass(world, contact.a),
        inverse_mass(world, contact.b),
    ) else {
        return false;
    };

    if let Some(t) = world.get_component_mut::<Transform>(contact.a) {
        t.position -= contact.normal * move_a;
    }
    if let Some(t) = world.get_component_mut::<Transform>(contact.b) {
        t.position += contact.normal * move_b;
    }
    true
}
