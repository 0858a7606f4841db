//! # Gameplay Systems
//!
//! Every system follows the same shape: gather owned copies of the
//! components it needs, fan them out in chunks, write the results back.
//!
//! ```text
//!  &mut World ──gather──> Vec<Item> ──ChunkPlan──> chunks ──WorkerPool──> results
//!      ^                                                                     │
//!      └──────────────────────────── write back ─────────────────────────────┘
//! ```
//!
//! The world stays mutably borrowed by the system for the whole round trip,
//! so nothing can create or destroy entities while workers hold chunks.
//!
//! | System | Parallel | Publishes |
//! |---|---|---|
//! | [`MovementSystem`] | yes | |
//! | [`WaypointSystem`] | yes | |
//! | [`RadarSystem`] | yes | `TargetDetected` |
//! | [`CameraFollowSystem`] | no | |
//! | [`ParallaxSystem`] | no | |
//! | [`InputSystem`] | no | `Hover`, `Clicked` |
//! | [`GuiHoverSystem`] | no | |
//! | [`RenderSystem`] | bucket sort | |
//! | [`PrimitiveRenderSystem`] | bucket sort | |
//! | [`TextRenderSystem`] | no | |
//! | [`CollisionSystem`] | no | `Collision` |

mod camera;
mod collision;
mod hover;
mod input;
mod movement;
mod parallax;
mod primitive;
mod radar;
mod render;
mod text;
mod waypoint;

pub use camera::{Camera, CameraFollowSystem, MapBounds};
pub use collision::CollisionSystem;
pub use hover::GuiHoverSystem;
pub use input::{
    InputSource, InputSystem, JoypadBindings, JoypadHandler, KeyBindings, KeyCode,
    KeyboardHandler, Pointer, PlatformEvent, QueuedInput,
};
pub use movement::MovementSystem;
pub use parallax::ParallaxSystem;
pub use primitive::PrimitiveRenderSystem;
pub use radar::RadarSystem;
pub use render::{draw_order, DrawStats, RenderSystem};
pub use text::TextRenderSystem;
pub use waypoint::{navigate, WaypointSystem};

use tessera_core::{ChunkPlan, CoreResult, SchedulerConfig, WorkerPool};

/// Pool plus the rule for how many chunks to cut.
#[derive(Clone, Copy)]
pub struct Scheduler<'a> {
    /// Threads to run chunks on.
    pub pool: &'a WorkerPool,
    /// Worker count derivation.
    pub config: &'a SchedulerConfig,
}

impl<'a> Scheduler<'a> {
    /// Bundles a pool and a config.
    #[must_use]
    pub const fn new(pool: &'a WorkerPool, config: &'a SchedulerConfig) -> Self {
        Self { pool, config }
    }

    /// Applies `f` to every item in parallel chunks and returns the results
    /// in input order.
    ///
    /// # Errors
    ///
    /// Pool failures from [`WorkerPool::map_chunks`].
    pub fn map<T, R, F>(&self, items: Vec<T>, f: F) -> CoreResult<Vec<R>>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> R + Send + Sync + 'static,
    {
        if items.is_empty() {
            return Ok(Vec::new());
        }
        let plan = ChunkPlan::for_len(items.len(), self.config);
        let chunks = plan.split(items);
        let results = self.pool.map_chunks(chunks, move |chunk: Vec<T>| {
            chunk.into_iter().map(&f).collect::<Vec<R>>()
        })?;
        Ok(results.into_iter().flatten().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_keeps_order() {
        let pool = WorkerPool::new(3).unwrap();
        let config = SchedulerConfig {
            small_set_threshold: 0,
            entities_per_worker: 10,
            ..SchedulerConfig::new()
        };
        let scheduler = Scheduler::new(&pool, &config);

        let out = scheduler.map((0..250u32).collect(), |x| x * 2).unwrap();
        assert_eq!(out, (0..250u32).map(|x| x * 2).collect::<Vec<_>>());
        assert!(scheduler.map(Vec::<u32>::new(), |x| x).unwrap().is_empty());
    }
}
