//! # Engine Constants
//!
//! Defaults baked into the engine. Most of them can be overridden through
//! `EngineConfig`; these are the values used when no config file exists.

// =============================================================================
// DISPLAY
// =============================================================================

/// Default logical screen width in pixels.
pub const SCREEN_WIDTH: u32 = 1280;

/// Default logical screen height in pixels.
pub const SCREEN_HEIGHT: u32 = 720;

// =============================================================================
// FRAME TIMING
// =============================================================================

/// Target frames per second.
pub const TARGET_FPS: u32 = 125;

/// Frame budget in milliseconds at [`TARGET_FPS`].
pub const MILLISECS_PER_FRAME: u32 = 1000 / TARGET_FPS;

/// Largest delta time (seconds) handed to systems after a stall.
pub const MAX_DELTA_SECONDS: f32 = 0.1;

// =============================================================================
// GAMEPLAY
// =============================================================================

/// Distance at which a waypoint counts as reached.
pub const WAYPOINT_EPSILON: f32 = 0.2;

/// Default radar detection radius.
pub const DEFAULT_RADAR_RADIUS: f32 = 2.0;

/// Default vertical lift applied to hovered UI elements.
pub const DEFAULT_HOVER_OFFSET: f32 = 3.0;

/// Side length of the square pointer box used for hit testing.
pub const POINTER_SIZE: f32 = 2.0;

/// Default dash length for dashed circle outlines.
pub const DEFAULT_DASH_LENGTH: u32 = 8;

/// Default drift of a parallax layer in pixels per second.
pub const DEFAULT_PARALLAX_SPEED: f32 = 60.0;

// =============================================================================
// SCHEDULING
// =============================================================================

/// Entity count up to which systems use the minimum worker count.
pub const SMALL_SET_THRESHOLD: usize = 1000;

/// Extra worker granted per this many entities above the threshold.
pub const ENTITIES_PER_WORKER: usize = 1000;

/// Minimum number of workers a chunked system fans out to.
pub const MIN_WORKERS: usize = 2;

/// Default capacity of each event subscriber queue.
pub const EVENT_CHANNEL_CAPACITY: usize = 1024;
