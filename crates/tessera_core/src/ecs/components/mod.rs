//! The closed set of component types the engine knows about.

mod interaction;
mod navigation;
mod spatial;
mod visual;

pub use interaction::{ActionId, Clickable, Joypad};
pub use navigation::{CameraFollow, Radar, Waypoint};
pub use spatial::{BoxCollider, CircleCollider, RigidBody, Transform};
pub use visual::{
    Animation, AnimationController, BoxShape, CircleShape, Flip, LineShape, Parallax,
    ScrollDirection, Sprite, TextLabel,
};
