//! # Tessera Core
//!
//! Entity registry and parallel scheduler for the Tessera 2D engine.
//!
//! ## Architecture Rules
//!
//! 1. **One store** - every system reads and writes the same [`World`]
//! 2. **Deferred deletion** - kills apply at the end-of-frame `update`
//! 3. **Disjoint chunks** - parallel systems split entities, never share them
//!
//! ## Example
//!
//! ```rust,ignore
//! use tessera_core::{RigidBody, Tag, World};
//!
//! let mut world = World::new();
//! let enemy = world.create_entity_with_tag(10.0, 20.0, Tag::Enemy);
//! world.add_component(enemy, RigidBody::default())?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod ecs;
pub mod error;
pub mod sync;

pub use ecs::{
    ColliderKind, Component, ComponentKind, Entity, EntityId, Group, GroupMember, Layer,
    PrimitiveKind, RenderKind, SlotKey, Tag, World,
};
pub use ecs::components::*;
pub use error::{CoreError, CoreResult};
pub use sync::{hardware_concurrency, ChunkPlan, PoolStats, SchedulerConfig, WorkerPool};
