//! # Visual Components
//!
//! Draw data consumed by the render systems. Three families:
//!
//! ```text
//! renderable:  Animation > AnimationController > Sprite   (textured)
//! primitive:   BoxShape  > CircleShape         > LineShape (vector)
//! text:        TextLabel
//! background:  Parallax                                (tiled, screen-space)
//! ```
//!
//! The arrows give precedence when an entity carries more than one member of
//! a family: only the first one is drawn.

use tessera_shared::constants::{DEFAULT_DASH_LENGTH, DEFAULT_PARALLAX_SPEED};
use tessera_shared::{Color, Dimension, FontHandle, Rect, TextureHandle, Vec2};

/// Mirroring applied when a texture is drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Flip {
    /// Draw as stored.
    #[default]
    None,
    /// Mirror around the vertical axis.
    Horizontal,
    /// Mirror around the horizontal axis.
    Vertical,
}

// =============================================================================
// Textured
// =============================================================================

/// A static region of a texture.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sprite {
    /// Texture to sample.
    pub texture: TextureHandle,
    /// Drawn size before transform scale.
    pub size: Dimension<f32>,
    /// Region of the texture to sample.
    pub source: Rect,
    /// Mirroring.
    pub flip: Flip,
    /// Screen-space: ignores the camera and is never culled.
    pub fixed: bool,
}

impl Sprite {
    /// Sprite showing the whole texture of the given size.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn new(texture: TextureHandle, texture_size: Dimension<u32>) -> Self {
        let w = texture_size.w as f32;
        let h = texture_size.h as f32;
        Self {
            texture,
            size: Dimension::new(w, h),
            source: Rect::new(0.0, 0.0, w, h),
            flip: Flip::None,
            fixed: false,
        }
    }

    /// Sprite showing a sub-region of a texture atlas.
    #[must_use]
    pub fn region(texture: TextureHandle, source: Rect) -> Self {
        Self {
            texture,
            size: Dimension::new(source.w, source.h),
            source,
            flip: Flip::None,
            fixed: false,
        }
    }

    /// Marks the sprite as screen-space.
    #[must_use]
    pub const fn fixed(mut self) -> Self {
        self.fixed = true;
        self
    }
}

/// Horizontal strip of equally sized frames played over time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Animation {
    /// Sprite sheet.
    pub texture: TextureHandle,
    /// Size of one frame.
    pub frame_size: Dimension<u32>,
    /// Number of frames in the strip.
    pub frame_count: u16,
    /// Frames per second.
    pub frame_rate: u32,
    /// Wraps around after the last frame instead of stopping on it.
    pub looping: bool,
    /// Whether the animation advances and draws.
    pub playing: bool,
    /// Frame shown by the last [`Animation::advance`].
    pub current_frame: u16,
    /// Clock value the animation started at, in milliseconds.
    pub start_ms: u64,
    /// A frame index never shown (placeholder cells in a sheet).
    pub skip_frame: Option<u16>,
    /// Mirroring.
    pub flip: Flip,
    /// Screen-space: ignores the camera and is never culled.
    pub fixed: bool,
}

impl Animation {
    /// Looping animation over a sheet of `frame_count` frames laid out
    /// horizontally.
    ///
    /// # Arguments
    ///
    /// * `texture` - The sprite sheet
    /// * `sheet_size` - Size of the whole sheet
    /// * `frame_count` - Frames in the strip; zero is treated as one
    /// * `frame_rate` - Frames per second
    #[must_use]
    pub fn new(
        texture: TextureHandle,
        sheet_size: Dimension<u32>,
        frame_count: u16,
        frame_rate: u32,
    ) -> Self {
        let frame_count = frame_count.max(1);
        Self {
            texture,
            frame_size: Dimension::new(sheet_size.w / u32::from(frame_count), sheet_size.h),
            frame_count,
            frame_rate,
            looping: true,
            playing: true,
            current_frame: 0,
            start_ms: 0,
            skip_frame: None,
            flip: Flip::None,
            fixed: false,
        }
    }

    /// Plays once and stops on the last frame.
    #[must_use]
    pub const fn once(mut self) -> Self {
        self.looping = false;
        self
    }

    /// Resumes playback.
    pub fn play(&mut self) {
        self.playing = true;
    }

    /// Restarts from the first frame at `now_ms`.
    pub fn restart(&mut self, now_ms: u64) {
        self.start_ms = now_ms;
        self.current_frame = 0;
        self.playing = true;
    }

    /// Pauses playback.
    pub fn stop(&mut self) {
        self.playing = false;
    }

    /// Computes the frame for `now_ms` and stores it in `current_frame`.
    ///
    /// A non-looping animation stops itself once it lands on its last frame.
    pub fn advance(&mut self, now_ms: u64) -> u16 {
        let elapsed = now_ms.saturating_sub(self.start_ms);
        let ticks = elapsed.saturating_mul(u64::from(self.frame_rate)) / 1000;
        let frame = if self.looping {
            ticks % u64::from(self.frame_count)
        } else {
            ticks.min(u64::from(self.frame_count - 1))
        };
        #[allow(clippy::cast_possible_truncation)]
        let mut frame = frame as u16;

        if Some(frame) == self.skip_frame {
            frame = if frame == 0 { 1 % self.frame_count } else { 0 };
        }

        self.current_frame = frame;
        if !self.looping && frame == self.frame_count - 1 {
            self.stop();
        }
        frame
    }

    /// Source rectangle of `current_frame` within the sheet.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn source_rect(&self) -> Rect {
        let w = self.frame_size.w as f32;
        Rect::new(
            f32::from(self.current_frame) * w,
            0.0,
            w,
            self.frame_size.h as f32,
        )
    }
}

/// Named set of animations with one active at a time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnimationController {
    animations: Vec<(String, Animation)>,
    active: Option<usize>,
}

impl AnimationController {
    /// Empty controller.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an animation under `name`, replacing one with the same
    /// name. The first animation added becomes active.
    pub fn add(&mut self, name: impl Into<String>, animation: Animation) {
        let name = name.into();
        if let Some(slot) = self.animations.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = animation;
            return;
        }
        self.animations.push((name, animation));
        if self.active.is_none() {
            self.active = Some(0);
        }
    }

    /// Switches to and starts the named animation.
    ///
    /// # Returns
    ///
    /// `false` when no animation has that name.
    pub fn play(&mut self, name: &str) -> bool {
        let Some(index) = self.animations.iter().position(|(n, _)| n == name) else {
            return false;
        };
        self.active = Some(index);
        self.animations[index].1.play();
        true
    }

    /// Pauses the active animation.
    pub fn stop(&mut self) {
        if let Some(animation) = self.active_mut() {
            animation.stop();
        }
    }

    /// The active animation.
    #[must_use]
    pub fn active(&self) -> Option<&Animation> {
        self.active.map(|i| &self.animations[i].1)
    }

    /// The active animation, mutably.
    pub fn active_mut(&mut self) -> Option<&mut Animation> {
        self.active.map(|i| &mut self.animations[i].1)
    }

    /// Name of the active animation.
    #[must_use]
    pub fn active_name(&self) -> Option<&str> {
        self.active.map(|i| self.animations[i].0.as_str())
    }

    /// Number of registered animations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.animations.len()
    }

    /// Returns true when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }
}

// =============================================================================
// Primitives
// =============================================================================

/// Rectangle outline or fill.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxShape {
    /// Size before transform scale.
    pub size: Dimension<f32>,
    /// Filled instead of outlined.
    pub filled: bool,
    /// Stroke or fill color.
    pub color: Color,
    /// Screen-space: ignores the camera and is never culled.
    pub fixed: bool,
}

impl BoxShape {
    /// White outline of `w` by `h`.
    #[must_use]
    pub const fn new(w: f32, h: f32) -> Self {
        Self {
            size: Dimension::new(w, h),
            filled: false,
            color: Color::WHITE,
            fixed: false,
        }
    }
}

/// Circle outline, fill or dashed outline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CircleShape {
    /// Radius before transform scale.
    pub radius: f32,
    /// Filled instead of outlined. Ignored when dashed.
    pub filled: bool,
    /// Draw the outline as dashes.
    pub dashed: bool,
    /// Dash length in pixels.
    pub dash_length: u32,
    /// Stroke or fill color.
    pub color: Color,
    /// Screen-space: ignores the camera and is never culled.
    pub fixed: bool,
}

impl CircleShape {
    /// White outline of `radius`.
    #[must_use]
    pub const fn new(radius: f32) -> Self {
        Self {
            radius,
            filled: false,
            dashed: false,
            dash_length: DEFAULT_DASH_LENGTH,
            color: Color::WHITE,
            fixed: false,
        }
    }

    /// Bounding square side.
    #[inline]
    #[must_use]
    pub fn side(&self) -> f32 {
        self.radius * 2.0
    }
}

/// Line from the owner's position to `position + end`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineShape {
    /// End point relative to the owner's position.
    pub end: Vec2,
    /// Stroke color.
    pub color: Color,
    /// Screen-space: ignores the camera and is never culled.
    pub fixed: bool,
}

impl LineShape {
    /// White line to `end`.
    #[must_use]
    pub const fn new(end: Vec2) -> Self {
        Self {
            end,
            color: Color::WHITE,
            fixed: false,
        }
    }
}

// =============================================================================
// Text
// =============================================================================

/// A string drawn with a loaded font.
#[derive(Clone, Debug, PartialEq)]
pub struct TextLabel {
    /// Text to draw.
    pub text: String,
    /// Font to draw with.
    pub font: FontHandle,
    /// Point size.
    pub size: u16,
    /// Text color.
    pub color: Color,
    /// Offset from the owner's position.
    pub offset: Vec2,
    /// Screen-space: ignores the camera.
    pub fixed: bool,
}

impl TextLabel {
    /// White label at the owner's position.
    #[must_use]
    pub fn new(text: impl Into<String>, font: FontHandle, size: u16) -> Self {
        Self {
            text: text.into(),
            font,
            size,
            color: Color::WHITE,
            offset: Vec2::ZERO,
            fixed: false,
        }
    }
}

// =============================================================================
// Background
// =============================================================================

/// Axis a parallax layer drifts along.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ScrollDirection {
    /// Left to right.
    #[default]
    Horizontal,
    /// Top to bottom.
    Vertical,
    /// Left to right while rising.
    Diagonal,
}

impl ScrollDirection {
    /// Unit-per-axis drift direction.
    #[inline]
    #[must_use]
    pub const fn drift(self) -> Vec2 {
        match self {
            Self::Horizontal => Vec2::new(1.0, 0.0),
            Self::Vertical => Vec2::new(0.0, 1.0),
            Self::Diagonal => Vec2::new(1.0, -1.0),
        }
    }

    /// Mask of the axes the layer moves on.
    #[inline]
    #[must_use]
    pub const fn axes(self) -> Vec2 {
        match self {
            Self::Horizontal => Vec2::new(1.0, 0.0),
            Self::Vertical => Vec2::new(0.0, 1.0),
            Self::Diagonal => Vec2::new(1.0, 1.0),
        }
    }

    /// Number of texture copies needed to cover one texture-sized screen.
    #[inline]
    #[must_use]
    pub const fn tile_count(self) -> usize {
        match self {
            Self::Horizontal | Self::Vertical => 2,
            Self::Diagonal => 4,
        }
    }
}

/// A screen-space background that repeats one texture and scrolls it.
///
/// `phase` is where the first copy of the texture is drawn; the other
/// copies sit one texture width and/or height before it, so together they
/// always cover `[0, size)` on the scrolling axes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Parallax {
    /// Repeated texture.
    pub texture: TextureHandle,
    /// Size of one copy on screen.
    pub size: Dimension<f32>,
    /// Drift axis.
    pub direction: ScrollDirection,
    /// Drift in pixels per second.
    pub speed: f32,
    /// Share of camera motion applied against the drift. `0` pins the
    /// layer to the screen, `1` moves it with the world.
    pub camera_factor: f32,
    /// Static image drawn behind the layer at the screen origin.
    pub backdrop: Option<(TextureHandle, Dimension<f32>)>,
    /// Accumulated drift, wrapped to one texture size.
    pub scroll: Vec2,
    /// Offset of the first copy, wrapped to one texture size.
    pub phase: Vec2,
}

impl Parallax {
    /// Layer repeating a texture of the given size.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn new(texture: TextureHandle, texture_size: Dimension<u32>, direction: ScrollDirection) -> Self {
        Self {
            texture,
            size: Dimension::new(texture_size.w as f32, texture_size.h as f32),
            direction,
            speed: DEFAULT_PARALLAX_SPEED,
            camera_factor: 0.0,
            backdrop: None,
            scroll: Vec2::ZERO,
            phase: Vec2::ZERO,
        }
    }

    /// Replaces the drift speed.
    #[must_use]
    pub const fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Couples the layer to camera motion.
    #[must_use]
    pub const fn with_camera_factor(mut self, factor: f32) -> Self {
        self.camera_factor = factor;
        self
    }

    /// Adds a static image behind the layer.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn with_backdrop(mut self, texture: TextureHandle, texture_size: Dimension<u32>) -> Self {
        self.backdrop = Some((
            texture,
            Dimension::new(texture_size.w as f32, texture_size.h as f32),
        ));
        self
    }

    /// Wraps `v` into `[0, size)` on each axis. Degenerate sizes yield zero.
    #[must_use]
    pub fn wrap(&self, v: Vec2) -> Vec2 {
        let wrap = |value: f32, extent: f32| {
            if extent > 0.0 {
                value.rem_euclid(extent)
            } else {
                0.0
            }
        };
        Vec2::new(wrap(v.x, self.size.w), wrap(v.y, self.size.h))
    }

    /// Top-left corners of every copy to draw, first copy first.
    pub fn tiles(&self) -> impl Iterator<Item = Vec2> {
        let (x, y) = (self.phase.x, self.phase.y);
        let (w, h) = (self.size.w, self.size.h);
        let corners = match self.direction {
            ScrollDirection::Horizontal => [Vec2::new(x, y), Vec2::new(x - w, y), Vec2::ZERO, Vec2::ZERO],
            ScrollDirection::Vertical => [Vec2::new(x, y), Vec2::new(x, y - h), Vec2::ZERO, Vec2::ZERO],
            ScrollDirection::Diagonal => [
                Vec2::new(x, y),
                Vec2::new(x, y - h),
                Vec2::new(x - w, y),
                Vec2::new(x - w, y - h),
            ],
        };
        corners.into_iter().take(self.direction.tile_count())
    }
}
