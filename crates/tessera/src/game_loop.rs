//! # Tessera Game Loop
//!
//! ```text
//! Frame N:
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │ 1. INPUT                                                            │
//! │    └─ Drain the platform, route keys/pads, publish Hover/Clicked    │
//! │                                                                     │
//! │ 2. UPDATE                                                           │
//! │    ├─ GUI hover feedback (events from the previous input pass)      │
//! │    ├─ Waypoints, movement          (chunked across the pool)        │
//! │    ├─ Collision correction                                          │
//! │    ├─ Radar                        (chunked, publishes detections)  │
//! │    ├─ Camera follow                                                 │
//! │    └─ Parallax layers              (against the new camera)         │
//! │                                                                     │
//! │ 3. RENDER                                                           │
//! │    ├─ clear, parallax backgrounds                                   │
//! │    ├─ Sprites/animations, primitives (layer order, culled), text    │
//! │    └─ present                                                       │
//! │                                                                     │
//! │ 4. FLUSH                                                            │
//! │    └─ World::update applies this frame's kills                      │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The [`Engine`] owns every piece of shared state; there are no globals.
//! Scenes drive it through the phase methods, and [`Engine::step`] times
//! one whole frame.

use std::time::{Duration, Instant};

use tessera_core::{SchedulerConfig, World, WorkerPool};
use tessera_shared::Color;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::events::EventBus;
use crate::map::Map;
use crate::scene::Scene;
use crate::services::{AssetStore, Renderer};
use crate::systems::{
    Camera, CameraFollowSystem, CollisionSystem, DrawStats, GuiHoverSystem, InputSource,
    InputSystem, MapBounds, MovementSystem, ParallaxSystem, PrimitiveRenderSystem, RadarSystem,
    RenderSystem, Scheduler, TextRenderSystem, WaypointSystem,
};

/// Frame timing and work counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Frame number.
    pub frame: u64,
    /// Total frame time in microseconds.
    pub total_us: u64,
    /// Input phase in microseconds.
    pub input_us: u64,
    /// Update phase in microseconds.
    pub update_us: u64,
    /// Render phase in microseconds.
    pub render_us: u64,
    /// Deferred-deletion flush in microseconds.
    pub flush_us: u64,
    /// Platform events handled.
    pub events_processed: usize,
    /// Draw calls issued.
    pub drawn: usize,
    /// Renderables skipped as off screen.
    pub culled: usize,
    /// Entities removed at the end of the frame.
    pub removed: usize,
}

/// Wall clock for the frame loop.
///
/// Deltas are clamped so a stall (debugger, window drag) doesn't teleport
/// everything on the next frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameClock {
    start: Instant,
    last: Instant,
    max_delta: f32,
}

impl FrameClock {
    /// Starts the clock now.
    #[must_use]
    pub fn new(max_delta: f32) -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last: now,
            max_delta,
        }
    }

    /// Advances to now.
    ///
    /// # Returns
    ///
    /// `(delta_seconds, milliseconds_since_start)`.
    pub fn tick(&mut self) -> (f32, u64) {
        let now = Instant::now();
        let delta = now.duration_since(self.last).as_secs_f32().min(self.max_delta);
        self.last = now;
        let elapsed_ms = u64::try_from(now.duration_since(self.start).as_millis()).unwrap_or(u64::MAX);
        (delta, elapsed_ms)
    }
}

struct Systems {
    input: InputSystem,
    hover: GuiHoverSystem,
    waypoint: WaypointSystem,
    movement: MovementSystem,
    collision: CollisionSystem,
    radar: RadarSystem,
    camera_follow: CameraFollowSystem,
    parallax: ParallaxSystem,
    render: RenderSystem,
    primitive: PrimitiveRenderSystem,
    text: TextRenderSystem,
}

/// Everything a running game needs.
pub struct Engine {
    /// Entity registry.
    pub world: World,
    /// Viewport.
    pub camera: Camera,
    /// Size of the current map.
    pub map: MapBounds,
    /// Loaded textures and sounds.
    pub assets: AssetStore,
    /// Colour the frame is cleared to.
    pub clear_color: Color,
    bus: EventBus,
    pool: WorkerPool,
    scheduler: SchedulerConfig,
    config: EngineConfig,
    systems: Systems,
    clock: FrameClock,
    frame_count: u64,
    stats: FrameStatsAccumulator,
}

impl Engine {
    /// Builds an engine and starts its worker pool.
    ///
    /// # Errors
    ///
    /// [`crate::EngineError::Core`] if worker threads can't be spawned.
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        let scheduler = config.scheduler();
        let workers = scheduler.worker_cap().max(scheduler.min_workers);
        let pool = WorkerPool::new(workers)?;
        let bus = EventBus::new(config.events.channel_capacity);

        let systems = Systems {
            input: InputSystem::new(),
            hover: GuiHoverSystem::new(&bus),
            waypoint: WaypointSystem::new(config.navigation.waypoint_epsilon),
            movement: MovementSystem::new(),
            collision: CollisionSystem::new(bus.clone()),
            radar: RadarSystem::new(bus.clone(), config.radar_target_offset()),
            camera_follow: CameraFollowSystem::new(),
            parallax: ParallaxSystem::new(),
            render: RenderSystem::new(),
            primitive: PrimitiveRenderSystem::new(),
            text: TextRenderSystem::new(),
        };

        #[allow(clippy::cast_possible_wrap)]
        let camera = Camera::new(0, 0, config.window.width as i32, config.window.height as i32);
        let budget_us = 1_000_000 / u64::from(config.frame.target_fps.max(1));

        info!(
            workers,
            target_fps = config.frame.target_fps,
            width = config.window.width,
            height = config.window.height,
            "engine started"
        );

        Ok(Self {
            world: World::new(),
            camera,
            map: MapBounds::new(camera.w, camera.h),
            assets: AssetStore::new(),
            clear_color: Color::BLACK,
            clock: FrameClock::new(config.frame.max_delta),
            bus,
            pool,
            scheduler,
            config,
            systems,
            frame_count: 0,
            stats: FrameStatsAccumulator::new(budget_us),
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The event bus shared by all systems.
    #[inline]
    #[must_use]
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// The worker pool.
    #[inline]
    #[must_use]
    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// Active configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Makes `map` the playing field: the camera is clamped to its pixel
    /// bounds from the next update on.
    pub fn load_map(&mut self, map: &Map) {
        self.map = map.bounds();
        info!(
            map = %map.map_id,
            width = self.map.width,
            height = self.map.height,
            "map loaded"
        );
    }

    /// Input dispatch, e.g. to attach key bindings.
    pub fn input_mut(&mut self) -> &mut InputSystem {
        &mut self.systems.input
    }

    /// Returns true once the platform asked to quit.
    #[inline]
    #[must_use]
    pub fn quit_requested(&self) -> bool {
        self.systems.input.quit_requested()
    }

    /// Frames completed so far.
    #[inline]
    #[must_use]
    pub const fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Accumulated statistics.
    #[must_use]
    pub const fn stats(&self) -> &FrameStatsAccumulator {
        &self.stats
    }

    /// Frame budget at the target rate.
    #[must_use]
    pub fn frame_budget(&self) -> Duration {
        Duration::from_millis(self.config.frame_budget_ms())
    }

    // =========================================================================
    // Phases
    // =========================================================================

    /// Drains `source` and dispatches input. Returns the number of events
    /// handled.
    pub fn process_input(&mut self, source: &mut dyn InputSource) -> usize {
        self.systems
            .input
            .update(source, &mut self.world, &self.bus)
    }

    /// Runs the gameplay systems for one step of `dt` seconds.
    ///
    /// # Errors
    ///
    /// Pool failures in a parallel system.
    pub fn update_systems(&mut self, dt: f32) -> EngineResult<()> {
        let scheduler = Scheduler::new(&self.pool, &self.scheduler);
        let systems = &self.systems;

        systems.hover.update(&mut self.world);
        systems.waypoint.update(&mut self.world, scheduler, dt)?;
        systems.movement.update(&mut self.world, scheduler, dt)?;
        systems.collision.update(&mut self.world);
        systems.radar.update(&self.world, scheduler)?;
        systems
            .camera_follow
            .update(&self.world, &mut self.camera, self.map);
        systems.parallax.update(&mut self.world, &self.camera, dt);
        Ok(())
    }

    /// Draws the world: clear, backgrounds, sprites, primitives, text,
    /// present.
    ///
    /// # Errors
    ///
    /// Pool failures while ordering.
    pub fn render(&mut self, renderer: &mut dyn Renderer, now_ms: u64) -> EngineResult<DrawStats> {
        renderer.clear(self.clear_color);
        let backgrounds = self.systems.parallax.render(&self.world, renderer);
        let textured =
            self.systems
                .render
                .render(&mut self.world, &self.pool, &self.camera, renderer, now_ms)?;
        let shapes = self
            .systems
            .primitive
            .render(&self.world, &self.pool, &self.camera, renderer)?;
        let labels = self.systems.text.render(&self.world, &self.camera, renderer);
        renderer.present();

        Ok(DrawStats {
            drawn: backgrounds + textured.drawn + shapes.drawn + labels,
            culled: textured.culled + shapes.culled,
        })
    }

    /// Applies this frame's kills.
    pub fn flush(&mut self) -> usize {
        self.world.update()
    }

    // =========================================================================
    // Frames
    // =========================================================================

    /// Runs one frame of `scene` with an explicit delta and clock value.
    ///
    /// # Errors
    ///
    /// Whatever the scene's hooks return.
    pub fn step<S: Scene + ?Sized>(
        &mut self,
        scene: &mut S,
        input: &mut dyn InputSource,
        renderer: &mut dyn Renderer,
        dt: f32,
        now_ms: u64,
    ) -> EngineResult<FrameStats> {
        let frame_start = Instant::now();
        let mut stats = FrameStats {
            frame: self.frame_count,
            ..FrameStats::default()
        };

        let t = Instant::now();
        stats.events_processed = scene.input(self, input)?;
        stats.input_us = elapsed_us(t);

        let t = Instant::now();
        scene.update(self, dt)?;
        stats.update_us = elapsed_us(t);

        let t = Instant::now();
        let draws = scene.render(self, renderer, now_ms)?;
        stats.drawn = draws.drawn;
        stats.culled = draws.culled;
        stats.render_us = elapsed_us(t);

        let t = Instant::now();
        stats.removed = self.flush();
        stats.flush_us = elapsed_us(t);

        stats.total_us = elapsed_us(frame_start);
        self.end_frame(stats);
        Ok(stats)
    }

    /// Runs one frame of `scene` on the wall clock.
    ///
    /// # Errors
    ///
    /// Whatever the scene's hooks return.
    pub fn run_frame<S: Scene + ?Sized>(
        &mut self,
        scene: &mut S,
        input: &mut dyn InputSource,
        renderer: &mut dyn Renderer,
    ) -> EngineResult<FrameStats> {
        let (dt, now_ms) = self.clock.tick();
        self.step(scene, input, renderer, dt, now_ms)
    }

    fn end_frame(&mut self, stats: FrameStats) {
        self.frame_count += 1;
        self.stats.record(stats);
        if stats.removed > 0 {
            debug!(frame = stats.frame, removed = stats.removed, "entities flushed");
        }
        if self.config.frame.warn_on_overrun && stats.total_us > self.stats.budget_us {
            warn!(
                frame = stats.frame,
                total_ms = stats.total_us as f64 / 1000.0,
                budget_ms = self.stats.budget_us as f64 / 1000.0,
                "frame exceeded budget"
            );
        }
    }
}

fn elapsed_us(since: Instant) -> u64 {
    u64::try_from(since.elapsed().as_micros()).unwrap_or(u64::MAX)
}

/// Accumulator for frame statistics.
#[derive(Clone, Debug)]
pub struct FrameStatsAccumulator {
    /// Frame budget in microseconds.
    pub budget_us: u64,
    /// Total frames recorded.
    pub frames_recorded: u64,
    /// Sum of total frame times.
    pub total_us_sum: u64,
    /// Sum of input phase times.
    pub input_us_sum: u64,
    /// Sum of update phase times.
    pub update_us_sum: u64,
    /// Sum of render phase times.
    pub render_us_sum: u64,
    /// Min frame time.
    pub min_frame_us: u64,
    /// Max frame time.
    pub max_frame_us: u64,
    /// Frames that exceeded budget.
    pub frames_over_budget: u64,
    /// Entities removed across all frames.
    pub removed: u64,
}

impl FrameStatsAccumulator {
    /// Creates an accumulator measuring against `budget_us`.
    #[must_use]
    pub const fn new(budget_us: u64) -> Self {
        Self {
            budget_us,
            frames_recorded: 0,
            total_us_sum: 0,
            input_us_sum: 0,
            update_us_sum: 0,
            render_us_sum: 0,
            min_frame_us: u64::MAX,
            max_frame_us: 0,
            frames_over_budget: 0,
            removed: 0,
        }
    }

    /// Records a frame's statistics.
    pub fn record(&mut self, stats: FrameStats) {
        self.frames_recorded += 1;
        self.total_us_sum += stats.total_us;
        self.input_us_sum += stats.input_us;
        self.update_us_sum += stats.update_us;
        self.render_us_sum += stats.render_us;
        self.min_frame_us = self.min_frame_us.min(stats.total_us);
        self.max_frame_us = self.max_frame_us.max(stats.total_us);
        self.removed += stats.removed as u64;

        if stats.total_us > self.budget_us {
            self.frames_over_budget += 1;
        }
    }

    /// Returns average frame time in milliseconds.
    #[must_use]
    pub fn avg_frame_ms(&self) -> f64 {
        if self.frames_recorded == 0 {
            return 0.0;
        }
        (self.total_us_sum as f64 / self.frames_recorded as f64) / 1000.0
    }

    /// Returns average FPS.
    #[must_use]
    pub fn avg_fps(&self) -> f64 {
        let avg_ms = self.avg_frame_ms();
        if avg_ms <= 0.0 {
            return 0.0;
        }
        1000.0 / avg_ms
    }

    /// Returns the fraction of frames over budget.
    #[must_use]
    pub fn over_budget_ratio(&self) -> f64 {
        if self.frames_recorded == 0 {
            return 0.0;
        }
        self.frames_over_budget as f64 / self.frames_recorded as f64
    }

    /// Prints a summary of the statistics.
    pub fn print_summary(&self) {
        println!("╔══════════════════════════════════════════════════════════════════╗");
        println!("║                    FRAME STATISTICS SUMMARY                      ║");
        println!("╚══════════════════════════════════════════════════════════════════╝");
        println!();
        println!("┌─ TIMING ───────────────────────────────────────────────────────┐");
        println!("│ Frames Recorded:    {}", self.frames_recorded);
        println!(
            "│ Average Frame:      {:.3} ms ({:.1} FPS)",
            self.avg_frame_ms(),
            self.avg_fps()
        );
        if self.frames_recorded > 0 {
            println!("│ Min Frame:          {:.3} ms", self.min_frame_us as f64 / 1000.0);
            println!("│ Max Frame:          {:.3} ms", self.max_frame_us as f64 / 1000.0);
        }
        println!("└──────────────────────────────────────────────────────────────────┘");
        println!();
        println!("┌─ BUDGET ───────────────────────────────────────────────────────┐");
        println!("│ Target:             {:.3} ms", self.budget_us as f64 / 1000.0);
        println!(
            "│ Over Budget:        {} frames ({:.1}%)",
            self.frames_over_budget,
            self.over_budget_ratio() * 100.0
        );
        println!("│ Entities Removed:   {}", self.removed);
        println!("└──────────────────────────────────────────────────────────────────┘");

        if self.frames_recorded > 0 {
            let frames = self.frames_recorded as f64;
            println!();
            println!("┌─ BREAKDOWN ─────────────────────────────────────────────────────┐");
            println!("│ Input:              {:.3} ms", self.input_us_sum as f64 / frames / 1000.0);
            println!("│ Update:             {:.3} ms", self.update_us_sum as f64 / frames / 1000.0);
            println!("│ Render:             {:.3} ms", self.render_us_sum as f64 / frames / 1000.0);
            println!("└──────────────────────────────────────────────────────────────────┘");
        }
    }
}

impl Default for FrameStatsAccumulator {
    fn default() -> Self {
        Self::new(1_000_000 / u64::from(tessera_shared::TARGET_FPS))
    }
}
