//! Viewport and camera tracking.

use tessera_core::{CameraFollow, Transform, World};
use tessera_shared::{Rect, Vec2, SCREEN_HEIGHT, SCREEN_WIDTH};

/// Viewport into the world, in whole pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Camera {
    /// Left edge in world space.
    pub x: i32,
    /// Top edge in world space.
    pub y: i32,
    /// Width.
    pub w: i32,
    /// Height.
    pub h: i32,
}

impl Camera {
    /// Creates a camera.
    #[must_use]
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Top-left corner as a vector.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn origin(&self) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32)
    }

    /// World-space rectangle covered by the camera.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn rect(&self) -> Rect {
        Rect::new(self.x as f32, self.y as f32, self.w as f32, self.h as f32)
    }

    /// Returns true when `bounds` (world space) lies entirely outside the
    /// viewport. Touching an edge counts as visible.
    #[must_use]
    pub fn is_outside(&self, bounds: &Rect) -> bool {
        let view = self.rect();
        bounds.right() < view.x
            || bounds.x > view.right()
            || bounds.bottom() < view.y
            || bounds.y > view.bottom()
    }

    /// Converts a world position to screen space. Fixed (screen-space)
    /// positions pass through.
    #[inline]
    #[must_use]
    pub fn to_screen(&self, position: Vec2, fixed: bool) -> Vec2 {
        if fixed {
            position
        } else {
            position - self.origin()
        }
    }
}

impl Default for Camera {
    #[allow(clippy::cast_possible_wrap)]
    fn default() -> Self {
        Self::new(0, 0, SCREEN_WIDTH as i32, SCREEN_HEIGHT as i32)
    }
}

/// Size of the playable map in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MapBounds {
    /// Width.
    pub width: i32,
    /// Height.
    pub height: i32,
}

impl MapBounds {
    /// Creates map bounds.
    #[must_use]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Centres the camera on [`CameraFollow`] entities and keeps it on the map.
#[derive(Debug, Default, Clone, Copy)]
pub struct CameraFollowSystem;

impl CameraFollowSystem {
    /// Creates the system.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Moves `camera` after every followed entity, in id order; the last
    /// one wins.
    ///
    /// The camera is centred on the target, then clamped to
    /// `[0, map - camera]` so it never shows past the map edges.
    #[allow(clippy::cast_possible_truncation)]
    pub fn update(&self, world: &World, camera: &mut Camera, map: MapBounds) {
        for id in world.with_component::<CameraFollow>() {
            let Some(t) = world.get_component::<Transform>(id) else {
                continue;
            };
            let half_w = camera.w / 2;
            let half_h = camera.h / 2;
            camera.x = t.position.x as i32 - half_w;
            camera.y = t.position.y as i32 - half_h;
            camera.x = camera.x.clamp(0, (map.width - camera.w).max(0));
            camera.y = camera.y.clamp(0, (map.height - camera.h).max(0));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_culling_edges() {
        let camera = Camera::default();
        assert!(camera.is_outside(&Rect::new(1000.0, 1000.0, 32.0, 32.0)));
        assert!(camera.is_outside(&Rect::new(-40.0, 10.0, 32.0, 32.0)));
        assert!(!camera.is_outside(&Rect::new(-32.0, 10.0, 32.0, 32.0)));
        assert!(!camera.is_outside(&Rect::new(1280.0, 700.0, 32.0, 32.0)));
    }

    #[test]
    fn test_to_screen() {
        let camera = Camera::new(100, 50, 640, 480);
        assert_eq!(camera.to_screen(Vec2::new(150.0, 60.0), false), Vec2::new(50.0, 10.0));
        assert_eq!(camera.to_screen(Vec2::new(150.0, 60.0), true), Vec2::new(150.0, 60.0));
    }

    #[test]
    fn test_follow_centres_then_clamps() {
        let mut world = World::new();
        let hero = world.create_entity(1000.0, 400.0);
        world.add_component(hero, CameraFollow).unwrap();

        let map = MapBounds::new(3000, 2000);
        let mut camera = Camera::new(0, 0, 800, 600);
        let system = CameraFollowSystem::new();

        system.update(&world, &mut camera, map);
        assert_eq!((camera.x, camera.y), (600, 100));

        world.get_component_mut::<Transform>(hero).unwrap().position = Vec2::new(50.0, 50.0);
        system.update(&world, &mut camera, map);
        assert_eq!((camera.x, camera.y), (0, 0));

        // Near the far corner the view pins to the map edge and still
        // contains the target.
        world.get_component_mut::<Transform>(hero).unwrap().position = Vec2::new(2900.0, 1990.0);
        system.update(&world, &mut camera, map);
        assert_eq!((camera.x, camera.y), (2200, 1400));
        assert!(!camera.is_outside(&Rect::new(2900.0, 1990.0, 1.0, 1.0)));

        world.get_component_mut::<Transform>(hero).unwrap().position = Vec2::new(2500.0, 1500.0);
        system.update(&world, &mut camera, map);
        assert_eq!((camera.x, camera.y), (2100, 1200));
    }

    #[test]
    fn test_map_smaller_than_camera() {
        let mut world = World::new();
        let hero = world.create_entity(100.0, 100.0);
        world.add_component(hero, CameraFollow).unwrap();
        let mut camera = Camera::default();
        CameraFollowSystem::new().update(&world, &mut camera, MapBounds::new(640, 480));
        assert_eq!((camera.x, camera.y), (0, 0));
    }
}
