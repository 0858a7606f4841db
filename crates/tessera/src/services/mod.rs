//! External collaborators behind traits: drawing, audio and asset loading.
//!
//! Each boundary ships with an in-crate implementation that records what it
//! was asked to do, so the frame pipeline runs without a window.

mod assets;
mod audio;
mod renderer;

pub use assets::{
    asset_name, AssetLoader, AssetManifest, AssetStore, HeadlessLoader, TextureInfo,
    AUDIO_EXTENSIONS, IMAGE_EXTENSIONS,
};
pub use audio::{AudioCommand, AudioDevice, AudioManager, NullAudio};
pub use renderer::{
    CircleStyle, DrawCommand, PrimitiveDraw, RecordingRenderer, Renderer, TextDraw, TextureDraw,
};
