//! # Component System
//!
//! The engine works with a closed set of component types. Each one has a
//! [`ComponentKind`] (its bit in an entity's component mask) and a dense
//! storage column inside [`ComponentStore`]. The [`Component`] trait maps a
//! type to both at compile time, so lookups never go through runtime type
//! identity.
//!
//! Adding a component type means adding one line to the `component_set!`
//! invocation below.

use super::components::{
    Animation, AnimationController, BoxCollider, BoxShape, CameraFollow, CircleCollider,
    CircleShape, Clickable, Joypad, LineShape, Parallax, Radar, RigidBody, Sprite, TextLabel,
    Transform, Waypoint,
};
use super::storage::ComponentStorage;

/// A type that can be attached to an entity.
///
/// Implemented for every member of the engine's component set; the storage
/// accessors are what lets `World::get_component::<T>()` resolve the right
/// column without a type map.
pub trait Component: Sized + Send + Sync + 'static {
    /// Kind tag and mask bit of this type.
    const KIND: ComponentKind;

    /// Storage column for this type.
    fn storage(store: &ComponentStore) -> &ComponentStorage<Self>;

    /// Mutable storage column for this type.
    fn storage_mut(store: &mut ComponentStore) -> &mut ComponentStorage<Self>;
}

macro_rules! component_set {
    ($($ty:ident => $field:ident),* $(,)?) => {
        /// Discriminant of each component type; doubles as its mask bit index.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u8)]
        pub enum ComponentKind {
            $(
                #[doc = concat!("Kind of [`", stringify!($ty), "`].")]
                $ty,
            )*
        }

        impl ComponentKind {
            /// Every kind, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$ty),*];

            /// Bit of this kind in an entity's component mask.
            #[inline]
            #[must_use]
            pub const fn bit(self) -> u64 {
                1 << (self as u8)
            }
        }

        /// One storage column per component type.
        #[derive(Default)]
        pub struct ComponentStore {
            $($field: ComponentStorage<$ty>,)*
        }

        impl ComponentStore {
            /// Creates empty storage for every component type.
            #[must_use]
            pub fn new() -> Self {
                Self::default()
            }

            /// Drops every component held at `index`.
            ///
            /// # Returns
            ///
            /// The number of components released.
            pub fn release(&mut self, index: usize) -> usize {
                let mut released = 0;
                $(released += usize::from(self.$field.remove(index).is_some());)*
                released
            }

            /// Drops every component of every entity.
            pub fn clear(&mut self) {
                $(self.$field.clear();)*
            }
        }

        $(
            impl Component for $ty {
                const KIND: ComponentKind = ComponentKind::$ty;

                #[inline]
                fn storage(store: &ComponentStore) -> &ComponentStorage<Self> {
                    &store.$field
                }

                #[inline]
                fn storage_mut(store: &mut ComponentStore) -> &mut ComponentStorage<Self> {
                    &mut store.$field
                }
            }
        )*
    };
}

component_set! {
    Transform => transforms,
    RigidBody => rigid_bodies,
    BoxCollider => box_colliders,
    CircleCollider => circle_colliders,
    Waypoint => waypoints,
    Radar => radars,
    Clickable => clickables,
    CameraFollow => camera_follows,
    Joypad => joypads,
    Sprite => sprites,
    Animation => animations,
    AnimationController => animation_controllers,
    BoxShape => box_shapes,
    CircleShape => circle_shapes,
    LineShape => line_shapes,
    TextLabel => text_labels,
    Parallax => parallaxes,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::EntityId;

    #[test]
    fn test_kind_bits_are_distinct() {
        let mut seen = 0u64;
        for kind in ComponentKind::ALL {
            assert_eq!(seen & kind.bit(), 0, "{kind:?} shares a bit");
            seen |= kind.bit();
        }
        assert_eq!(seen.count_ones() as usize, ComponentKind::ALL.len());
    }

    #[test]
    fn test_store_release() {
        let mut store = ComponentStore::new();
        let owner = EntityId::new(1);
        Transform::storage_mut(&mut store).insert(3, owner, Transform::at(1.0, 2.0));
        Radar::storage_mut(&mut store).insert(3, owner, Radar::new(10.0));

        assert_eq!(store.release(3), 2);
        assert!(Transform::storage(&store).get(3).is_none());
        assert_eq!(store.release(3), 0);
    }
}
