//! RGBA colors and their packed 32-bit forms.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// 8-bit-per-channel color.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize)]
pub struct Color {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
    /// Alpha
    pub a: u8,
}

impl Color {
    /// Opaque white.
    pub const WHITE: Self = Self::rgba(255, 255, 255, 255);
    /// Opaque black.
    pub const BLACK: Self = Self::rgba(0, 0, 0, 255);
    /// Opaque red.
    pub const RED: Self = Self::rgba(255, 0, 0, 255);
    /// Opaque green.
    pub const GREEN: Self = Self::rgba(0, 255, 0, 255);
    /// Opaque blue.
    pub const BLUE: Self = Self::rgba(0, 0, 255, 255);
    /// Opaque yellow.
    pub const YELLOW: Self = Self::rgba(255, 255, 0, 255);

    /// Creates a color from its four channels.
    #[inline]
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Packs as `0xRRGGBBAA`.
    #[must_use]
    pub const fn to_rgba_hex(self) -> u32 {
        u32::from_be_bytes([self.r, self.g, self.b, self.a])
    }

    /// Packs as `0xAARRGGBB`.
    #[must_use]
    pub const fn to_argb_hex(self) -> u32 {
        u32::from_be_bytes([self.a, self.r, self.g, self.b])
    }

    /// Unpacks `0xRRGGBBAA`.
    #[must_use]
    pub const fn from_rgba_hex(hex: u32) -> Self {
        let [r, g, b, a] = hex.to_be_bytes();
        Self::rgba(r, g, b, a)
    }

    /// Unpacks `0xAARRGGBB`.
    #[must_use]
    pub const fn from_argb_hex(hex: u32) -> Self {
        let [a, r, g, b] = hex.to_be_bytes();
        Self::rgba(r, g, b, a)
    }

    /// Scales the RGB channels by `intensity`, leaving alpha untouched.
    ///
    /// The factor is clamped to `[0, 1]`.
    #[must_use]
    pub fn with_intensity(self, intensity: f32) -> Self {
        let k = intensity.clamp(0.0, 1.0);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let scale = |c: u8| (f32::from(c) * k).round() as u8;
        Self::rgba(scale(self.r), scale(self.g), scale(self.b), self.a)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}
