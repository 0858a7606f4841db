//! Derived entity classifications.
//!
//! A group is not stored anywhere; it is computed from an entity's component
//! mask on every query. When an entity carries several members of the same
//! family the first one in precedence order decides its kind.

use super::component::{Component, ComponentKind};
use super::components::{
    Animation, AnimationController, BoxCollider, BoxShape, CircleCollider, CircleShape,
    Clickable, LineShape, Sprite,
};
use super::entity::Entity;

/// Families of entities the systems iterate over.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Group {
    /// Textured: animation, animation controller or sprite.
    Renderable,
    /// Vector shapes: box, circle or line.
    Primitive,
    /// Pointer targets: clickable with a box collider.
    Clickable,
    /// Anything with a collision shape.
    Collider,
}

/// Which textured component an entity is drawn with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RenderKind {
    /// [`Animation`]
    Animation,
    /// [`AnimationController`]
    AnimationController,
    /// [`Sprite`]
    Sprite,
}

/// Which primitive shape an entity is drawn with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// [`BoxShape`]
    Box,
    /// [`CircleShape`]
    Circle,
    /// [`LineShape`]
    Line,
}

/// Which collision shape an entity uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColliderKind {
    /// [`BoxCollider`]
    Box,
    /// [`CircleCollider`]
    Circle,
}

/// Result of classifying an entity into a [`Group`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GroupMember {
    /// Member of [`Group::Renderable`].
    Render(RenderKind),
    /// Member of [`Group::Primitive`].
    Primitive(PrimitiveKind),
    /// Member of [`Group::Clickable`].
    Clickable,
    /// Member of [`Group::Collider`].
    Collider(ColliderKind),
}

fn first_of<K: Copy>(entity: &Entity, order: &[(ComponentKind, K)]) -> Option<K> {
    order
        .iter()
        .find(|(kind, _)| entity.has(*kind))
        .map(|(_, member)| *member)
}

impl Group {
    /// Classifies `entity`, or `None` if it is not in this group.
    #[must_use]
    pub fn classify(self, entity: &Entity) -> Option<GroupMember> {
        match self {
            Self::Renderable => first_of(
                entity,
                &[
                    (Animation::KIND, RenderKind::Animation),
                    (AnimationController::KIND, RenderKind::AnimationController),
                    (Sprite::KIND, RenderKind::Sprite),
                ],
            )
            .map(GroupMember::Render),
            Self::Primitive => first_of(
                entity,
                &[
                    (BoxShape::KIND, PrimitiveKind::Box),
                    (CircleShape::KIND, PrimitiveKind::Circle),
                    (LineShape::KIND, PrimitiveKind::Line),
                ],
            )
            .map(GroupMember::Primitive),
            Self::Clickable => (entity.has(Clickable::KIND) && entity.has(BoxCollider::KIND))
                .then_some(GroupMember::Clickable),
            Self::Collider => first_of(
                entity,
                &[
                    (BoxCollider::KIND, ColliderKind::Box),
                    (CircleCollider::KIND, ColliderKind::Circle),
                ],
            )
            .map(GroupMember::Collider),
        }
    }
}
