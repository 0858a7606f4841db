//! # Renderer Boundary
//!
//! Systems never talk to a graphics API. They build draw records and hand
//! them to a [`Renderer`], in final draw order:
//!
//! ```text
//! RenderSystem ──┐
//! PrimitiveRS  ──┼──> Renderer::draw_* ──> platform backend
//! TextRS       ──┘                     └──> RecordingRenderer (tests, headless)
//! ```
//!
//! Positions handed over are already in screen space.

use tessera_core::Flip;
use tessera_shared::{Color, FontHandle, Rect, TextureHandle, Vec2};

/// One textured quad.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextureDraw {
    /// Texture to sample.
    pub texture: TextureHandle,
    /// Source region in texels.
    pub source: Rect,
    /// Destination on screen.
    pub dest: Rect,
    /// Rotation in degrees around the destination centre.
    pub rotation: f32,
    /// Mirroring.
    pub flip: Flip,
}

/// How a circle is stroked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CircleStyle {
    /// Outline only.
    Outline,
    /// Solid disc.
    Filled,
    /// Dashed outline.
    Dashed {
        /// Length of each dash in pixels.
        dash_length: u32,
    },
}

/// One vector shape.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PrimitiveDraw {
    /// Axis-aligned rectangle.
    Box {
        /// Screen rectangle.
        rect: Rect,
        /// Fill instead of outline.
        filled: bool,
        /// Colour.
        color: Color,
    },
    /// Circle.
    Circle {
        /// Screen centre.
        center: Vec2,
        /// Radius after scaling.
        radius: f32,
        /// Stroke style.
        style: CircleStyle,
        /// Colour.
        color: Color,
    },
    /// Line segment.
    Line {
        /// Screen start.
        from: Vec2,
        /// Screen end.
        to: Vec2,
        /// Colour.
        color: Color,
    },
}

/// One text run.
#[derive(Clone, Debug, PartialEq)]
pub struct TextDraw {
    /// UTF-8 text.
    pub text: String,
    /// Font face.
    pub font: FontHandle,
    /// Point size.
    pub size: u16,
    /// Colour.
    pub color: Color,
    /// Top-left corner on screen.
    pub position: Vec2,
}

/// Everything a renderer can be asked to do, as recorded data.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    /// [`Renderer::draw_texture`]
    Texture(TextureDraw),
    /// [`Renderer::draw_primitive`]
    Primitive(PrimitiveDraw),
    /// [`Renderer::draw_text`]
    Text(TextDraw),
    /// [`Renderer::clear`]
    Clear(Color),
    /// [`Renderer::present`]
    Present,
}

/// Drawing backend.
pub trait Renderer {
    /// Draws a textured quad.
    fn draw_texture(&mut self, draw: TextureDraw);

    /// Draws a vector shape.
    fn draw_primitive(&mut self, draw: PrimitiveDraw);

    /// Draws a text run.
    fn draw_text(&mut self, draw: TextDraw);

    /// Starts a frame by filling the target with `color`.
    fn clear(&mut self, color: Color);

    /// Ends a frame and shows it.
    fn present(&mut self);
}

/// Renderer that keeps every command in order instead of drawing.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    commands: Vec<DrawCommand>,
}

impl RecordingRenderer {
    /// Empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands recorded so far.
    #[inline]
    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Takes the recorded commands, leaving the recorder empty.
    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Textured quads recorded so far.
    pub fn textures(&self) -> impl Iterator<Item = &TextureDraw> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Texture(t) => Some(t),
            _ => None,
        })
    }

    /// Number of frames presented.
    #[must_use]
    pub fn frames(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Present))
            .count()
    }
}

impl Renderer for RecordingRenderer {
    fn draw_texture(&mut self, draw: TextureDraw) {
        self.commands.push(DrawCommand::Texture(draw));
    }

    fn draw_primitive(&mut self, draw: PrimitiveDraw) {
        self.commands.push(DrawCommand::Primitive(draw));
    }

    fn draw_text(&mut self, draw: TextDraw) {
        self.commands.push(DrawCommand::Text(draw));
    }

    fn clear(&mut self, color: Color) {
        self.commands.push(DrawCommand::Clear(color));
    }

    fn present(&mut self) {
        self.commands.push(DrawCommand::Present);
    }
}
