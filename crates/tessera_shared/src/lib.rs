//! # Tessera Shared
//!
//! Value types used across the engine crates.
//!
//! ## Rule
//!
//! Everything in here is plain data. If a type needs a thread, a channel or
//! a live platform resource it belongs in `tessera_core` or `tessera`.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod color;
pub mod constants;
pub mod handles;
pub mod math;

pub use color::Color;
pub use constants::{
    MILLISECS_PER_FRAME, SCREEN_HEIGHT, SCREEN_WIDTH, TARGET_FPS, WAYPOINT_EPSILON,
};
pub use handles::{ChannelHandle, FontHandle, SoundHandle, TextureHandle};
pub use math::{deg_to_rad, normalize_angle, rad_to_deg, Dimension, Rect, Vec2};
