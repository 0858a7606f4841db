//! # Entity Component System
//!
//! The registry every gameplay system works against.
//!
//! ## Design Philosophy
//!
//! - Entities are kept in a vector sorted by id, so lookup is a binary search
//! - Components live in dense per-type columns addressed by a recyclable slot
//! - Deletions are deferred to the end of the frame
//! - Group membership is derived from the component mask, never stored

mod component;
pub mod components;
mod entity;
mod group;
mod slots;
mod storage;
mod world;

pub use component::{Component, ComponentKind, ComponentStore};
pub use components::*;
pub use entity::{Entity, EntityId, Layer, SlotKey, Tag};
pub use group::{ColliderKind, Group, GroupMember, PrimitiveKind, RenderKind};
pub use slots::SlotArena;
pub use storage::ComponentStorage;
pub use world::World;
