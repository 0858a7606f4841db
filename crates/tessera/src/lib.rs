//! # Tessera
//!
//! The engine crate: gameplay systems, the event bus and the frame loop on
//! top of the `tessera_core` registry.
//!
//! ## Layout
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                          SceneDirector                           │
//! │        menu ──> level1 ──> level2 ──> ... (Scene hooks)          │
//! ├──────────────────────────────────────────────────────────────────┤
//! │                             Engine                               │
//! │  World · EventBus · WorkerPool · Camera · AssetStore · systems   │
//! ├───────────────────────┬──────────────────────┬───────────────────┤
//! │  systems (per frame)  │  services (borders)  │  physics          │
//! │  movement, waypoint,  │  Renderer, Audio,    │  contacts and     │
//! │  radar, input, render │  AssetLoader         │  penetration      │
//! └───────────────────────┴──────────────────────┴───────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `config`: TOML configuration with validated defaults
//! - `events`: typed publish/subscribe, synchronous or on the pool
//! - `game_loop`: [`Engine`] context and frame timing
//! - `map`: tile map dimensions and camera bounds
//! - `scene`: scene hooks and the director that chains them
//! - `services`: renderer, audio and asset boundaries
//! - `systems`: per-frame gameplay systems
//! - `physics`: overlap tests and penetration correction

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod events;
pub mod game_loop;
pub mod map;
pub mod physics;
pub mod scene;
pub mod services;
pub mod systems;

pub use tessera_core as core;
pub use tessera_shared as shared;

pub use config::EngineConfig;
pub use error::{AssetError, ConfigError, EngineError, EngineResult};
pub use events::{EngineEvent, EventBus, EventKind, EventReceiver, MouseButton};
pub use game_loop::{Engine, FrameClock, FrameStats, FrameStatsAccumulator};
pub use map::Map;
pub use physics::{box_box, circle_circle, penetration_offsets, resolve_penetration, Contact};
pub use scene::{Scene, SceneDirector};
