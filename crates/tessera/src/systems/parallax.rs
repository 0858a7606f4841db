//! Scrolling background layers.
//!
//! ```text
//! scroll += drift * speed * dt              (wrapped to one texture)
//! phase   = (scroll - camera * factor) * axes  (wrapped to one texture)
//! ```
//!
//! Layers are drawn in screen space before anything else, in entity id
//! order, and are never culled.

use tessera_core::{Flip, Parallax, World};
use tessera_shared::{Rect, TextureHandle, Vec2};

use super::camera::Camera;
use crate::services::{Renderer, TextureDraw};

/// Advances and draws every [`Parallax`] layer.
#[derive(Debug, Default, Clone, Copy)]
pub struct ParallaxSystem;

impl ParallaxSystem {
    /// Creates the system.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Advances every layer by `dt` seconds against the current camera.
    ///
    /// # Returns
    ///
    /// The number of layers updated.
    pub fn update(&self, world: &mut World, camera: &Camera, dt: f32) -> usize {
        let origin = camera.origin();
        let mut updated = 0;
        for id in world.with_component::<Parallax>() {
            let Some(layer) = world.get_component_mut::<Parallax>(id) else {
                continue;
            };
            let drift = layer.direction.drift() * (layer.speed * dt);
            layer.scroll = layer.wrap(layer.scroll + drift);
            let shifted = (layer.scroll - origin * layer.camera_factor).scale(layer.direction.axes());
            layer.phase = layer.wrap(shifted);
            updated += 1;
        }
        updated
    }

    /// Draws backdrops and layer copies.
    ///
    /// # Returns
    ///
    /// The number of textures drawn.
    pub fn render(&self, world: &World, renderer: &mut dyn Renderer) -> usize {
        let mut drawn = 0;
        for id in world.with_component::<Parallax>() {
            let Some(layer) = world.get_component::<Parallax>(id) else {
                continue;
            };
            if let Some((texture, size)) = layer.backdrop {
                renderer.draw_texture(quad(texture, Vec2::ZERO, size.w, size.h));
                drawn += 1;
            }
            for corner in layer.tiles() {
                renderer.draw_texture(quad(layer.texture, corner, layer.size.w, layer.size.h));
                drawn += 1;
            }
        }
        drawn
    }
}

fn quad(texture: TextureHandle, at: Vec2, w: f32, h: f32) -> TextureDraw {
    TextureDraw {
        texture,
        source: Rect::new(0.0, 0.0, w, h),
        dest: Rect::new(at.x, at.y, w, h),
        rotation: 0.0,
        flip: Flip::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::RecordingRenderer;
    use tessera_core::ScrollDirection;
    use tessera_shared::Dimension;

    fn layer(world: &mut World, direction: ScrollDirection) -> tessera_core::EntityId {
        let id = world.create_entity(0.0, 0.0);
        world
            .add_component(
                id,
                Parallax::new(TextureHandle(9), Dimension::new(200, 100), direction).with_speed(50.0),
            )
            .unwrap();
        id
    }

    fn phase(world: &World, id: tessera_core::EntityId) -> Vec2 {
        world.get_component::<Parallax>(id).unwrap().phase
    }

    #[test]
    fn test_horizontal_drift_wraps() {
        let mut world = World::new();
        let id = layer(&mut world, ScrollDirection::Horizontal);
        let system = ParallaxSystem::new();
        let camera = Camera::new(0, 0, 200, 100);

        assert_eq!(system.update(&mut world, &camera, 1.0), 1);
        assert_eq!(phase(&world, id), Vec2::new(50.0, 0.0));
        for _ in 0..3 {
            system.update(&mut world, &camera, 1.0);
        }
        assert_eq!(phase(&world, id), Vec2::new(0.0, 0.0));
        system.update(&mut world, &camera, 0.5);
        assert_eq!(phase(&world, id), Vec2::new(25.0, 0.0));
    }

    #[test]
    fn test_vertical_and_diagonal_drift() {
        let mut world = World::new();
        let down = layer(&mut world, ScrollDirection::Vertical);
        let rising = layer(&mut world, ScrollDirection::Diagonal);
        let system = ParallaxSystem::new();
        let camera = Camera::new(0, 0, 200, 100);

        system.update(&mut world, &camera, 1.0);
        assert_eq!(phase(&world, down), Vec2::new(0.0, 50.0));
        // Rising wraps from the bottom of the texture.
        assert_eq!(phase(&world, rising), Vec2::new(50.0, 50.0));
        system.update(&mut world, &camera, 0.5);
        assert_eq!(phase(&world, rising), Vec2::new(75.0, 25.0));
    }

    #[test]
    fn test_camera_factor_counters_camera_motion() {
        let mut world = World::new();
        let id = world.create_entity(0.0, 0.0);
        world
            .add_component(
                id,
                Parallax::new(TextureHandle(1), Dimension::new(200, 100), ScrollDirection::Horizontal)
                    .with_speed(0.0)
                    .with_camera_factor(0.5),
            )
            .unwrap();
        let system = ParallaxSystem::new();

        system.update(&mut world, &Camera::new(40, 30, 200, 100), 1.0);
        assert_eq!(phase(&world, id), Vec2::new(180.0, 0.0));
        system.update(&mut world, &Camera::new(0, 0, 200, 100), 1.0);
        assert_eq!(phase(&world, id), Vec2::ZERO);
    }

    #[test]
    fn test_render_draws_backdrop_then_copies() {
        let mut world = World::new();
        let id = world.create_entity(0.0, 0.0);
        world
            .add_component(
                id,
                Parallax::new(TextureHandle(2), Dimension::new(200, 100), ScrollDirection::Horizontal)
                    .with_backdrop(TextureHandle(3), Dimension::new(640, 480)),
            )
            .unwrap();
        world.get_component_mut::<Parallax>(id).unwrap().phase = Vec2::new(20.0, 0.0);

        let mut renderer = RecordingRenderer::new();
        assert_eq!(ParallaxSystem::new().render(&world, &mut renderer), 3);
        let draws: Vec<(TextureHandle, Rect)> =
            renderer.textures().map(|t| (t.texture, t.dest)).collect();
        assert_eq!(
            draws,
            vec![
                (TextureHandle(3), Rect::new(0.0, 0.0, 640.0, 480.0)),
                (TextureHandle(2), Rect::new(20.0, 0.0, 200.0, 100.0)),
                (TextureHandle(2), Rect::new(-180.0, 0.0, 200.0, 100.0)),
            ]
        );
    }
}
