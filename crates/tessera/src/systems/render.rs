//! # Render Ordering
//!
//! ```text
//! with_group ──> background ──sort by z──┐
//!            ──> middle     ──sort by y──┼──> draw in bucket order
//!            ──> foreground ──sort by z──┘
//!                (three buckets sorted concurrently on the pool)
//! ```
//!
//! Ties inside a bucket fall back to entity id, so the order is total and
//! stable from frame to frame.

use std::cmp::Ordering;

use tessera_core::{
    Animation, AnimationController, CoreResult, EntityId, Flip, Group, GroupMember, Layer,
    RenderKind, Sprite, Transform, World, WorkerPool,
};
use tessera_shared::{Dimension, Rect, TextureHandle};

use super::camera::Camera;
use crate::services::{Renderer, TextureDraw};

struct SortItem {
    id: EntityId,
    member: GroupMember,
    key: f32,
}

fn by_key(a: &SortItem, b: &SortItem) -> Ordering {
    a.key.total_cmp(&b.key).then(a.id.cmp(&b.id))
}

/// Members of `group` in draw order: background by z, then middle by y,
/// then foreground by z.
///
/// # Errors
///
/// Pool failures while sorting.
pub fn draw_order(
    world: &World,
    pool: &WorkerPool,
    group: Group,
) -> CoreResult<Vec<(EntityId, GroupMember)>> {
    let mut buckets: [Vec<SortItem>; 3] = [Vec::new(), Vec::new(), Vec::new()];

    for (id, member) in world.with_group(group) {
        let Some(entity) = world.entity(id) else {
            continue;
        };
        let (bucket, key) = match entity.layer {
            Layer::Background => (0, f32::from(entity.z_index)),
            Layer::Middle => (
                1,
                world
                    .get_component::<Transform>(id)
                    .map_or(0.0, |t| t.position.y),
            ),
            Layer::Foreground => (2, f32::from(entity.z_index)),
        };
        buckets[bucket].push(SortItem { id, member, key });
    }

    let sorted = pool.map_chunks(Vec::from(buckets), |mut bucket: Vec<SortItem>| {
        bucket.sort_unstable_by(by_key);
        bucket
    })?;

    Ok(sorted
        .into_iter()
        .flatten()
        .map(|item| (item.id, item.member))
        .collect())
}

/// What a render pass did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrawStats {
    /// Draw calls issued.
    pub drawn: usize,
    /// Entities skipped for being off screen.
    pub culled: usize,
}

struct Textured {
    texture: TextureHandle,
    source: Rect,
    size: Dimension<f32>,
    flip: Flip,
    fixed: bool,
}

#[allow(clippy::cast_precision_loss)]
fn animation_frame(animation: &mut Animation, now_ms: u64) -> Textured {
    if animation.playing {
        animation.advance(now_ms);
    }
    Textured {
        texture: animation.texture,
        source: animation.source_rect(),
        size: Dimension::new(
            animation.frame_size.w as f32,
            animation.frame_size.h as f32,
        ),
        flip: animation.flip,
        fixed: animation.fixed,
    }
}

/// Draws sprites and animations in layer order.
#[derive(Debug, Default, Clone, Copy)]
pub struct RenderSystem;

impl RenderSystem {
    /// Creates the system.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Advances animations to `now_ms` and draws every visible renderable.
    ///
    /// # Errors
    ///
    /// Pool failures while ordering; nothing is drawn in that case.
    pub fn render(
        &self,
        world: &mut World,
        pool: &WorkerPool,
        camera: &Camera,
        renderer: &mut dyn Renderer,
        now_ms: u64,
    ) -> CoreResult<DrawStats> {
        let order = draw_order(world, pool, Group::Renderable)?;
        let mut stats = DrawStats::default();

        for (id, member) in order {
            let Some(transform) = world.get_component::<Transform>(id).copied() else {
                continue;
            };
            let textured = match member {
                GroupMember::Render(RenderKind::Animation) => world
                    .get_component_mut::<Animation>(id)
                    .map(|a| animation_frame(a, now_ms)),
                GroupMember::Render(RenderKind::AnimationController) => world
                    .get_component_mut::<AnimationController>(id)
                    .and_then(AnimationController::active_mut)
                    .map(|a| animation_frame(a, now_ms)),
                GroupMember::Render(RenderKind::Sprite) => {
                    world.get_component::<Sprite>(id).map(|s| Textured {
                        texture: s.texture,
                        source: s.source,
                        size: s.size,
                        flip: s.flip,
                        fixed: s.fixed,
                    })
                }
                _ => None,
            };
            let Some(textured) = textured else {
                continue;
            };

            let w = textured.size.w * transform.scale.x;
            let h = textured.size.h * transform.scale.y;
            let position = transform.position;
            if !textured.fixed && camera.is_outside(&Rect::new(position.x, position.y, w, h)) {
                stats.culled += 1;
                continue;
            }

            let screen = camera.to_screen(position, textured.fixed);
            renderer.draw_texture(TextureDraw {
                texture: textured.texture,
                source: textured.source,
                dest: Rect::new(screen.x, screen.y, w, h),
                rotation: transform.rotation,
                flip: textured.flip,
            });
            stats.drawn += 1;
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::RecordingRenderer;
    use tessera_shared::Vec2;

    fn sprite(world: &mut World, x: f32, y: f32) -> EntityId {
        let id = world.create_entity(x, y);
        world
            .add_component(id, Sprite::new(TextureHandle(1), Dimension::new(32, 32)))
            .unwrap();
        id
    }

    #[test]
    fn test_layers_then_keys() {
        let pool = WorkerPool::new(2).unwrap();
        let mut world = World::new();
        let fg = sprite(&mut world, 0.0, 0.0);
        world.set_layer(fg, Layer::Foreground);
        let bg_high = sprite(&mut world, 0.0, 0.0);
        world.set_layer(bg_high, Layer::Background);
        world.set_z_index(bg_high, 5);
        let mid_low = sprite(&mut world, 0.0, 300.0);
        let bg_low = sprite(&mut world, 0.0, 0.0);
        world.set_layer(bg_low, Layer::Background);
        world.set_z_index(bg_low, -2);
        let mid_high = sprite(&mut world, 0.0, 100.0);

        let ids: Vec<EntityId> = draw_order(&world, &pool, Group::Renderable)
            .unwrap()
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        assert_eq!(ids, vec![bg_low, bg_high, mid_high, mid_low, fg]);
    }

    #[test]
    fn test_culled_and_fixed() {
        let pool = WorkerPool::new(2).unwrap();
        let mut world = World::new();
        let visible = sprite(&mut world, 200.0, 100.0);
        let _far = sprite(&mut world, 5000.0, 100.0);
        let hud = world.create_entity(5000.0, 10.0);
        world
            .add_component(hud, Sprite::new(TextureHandle(2), Dimension::new(8, 8)).fixed())
            .unwrap();
        world.get_component_mut::<Transform>(visible).unwrap().scale = Vec2::new(2.0, 1.0);

        let camera = Camera::new(100, 50, 640, 480);
        let mut renderer = RecordingRenderer::new();
        let stats = RenderSystem::new()
            .render(&mut world, &pool, &camera, &mut renderer, 0)
            .unwrap();

        assert_eq!(stats, DrawStats { drawn: 2, culled: 1 });
        let draws: Vec<&TextureDraw> = renderer.textures().collect();
        // The hud sits higher (y = 10) so it is drawn first.
        assert_eq!(draws[0].dest, Rect::new(5000.0, 10.0, 8.0, 8.0));
        assert_eq!(draws[1].dest, Rect::new(100.0, 50.0, 64.0, 32.0));
    }

    #[test]
    fn test_animation_frames_advance() {
        let pool = WorkerPool::new(1).unwrap();
        let mut world = World::new();
        let id = world.create_entity(0.0, 0.0);
        world
            .add_component(id, Animation::new(TextureHandle(3), Dimension::new(64, 16), 4, 10).once())
            .unwrap();

        let camera = Camera::default();
        let mut renderer = RecordingRenderer::new();
        let system = RenderSystem::new();
        system.render(&mut world, &pool, &camera, &mut renderer, 250).unwrap();
        system.render(&mut world, &pool, &camera, &mut renderer, 10_000).unwrap();

        let sources: Vec<Rect> = renderer.textures().map(|t| t.source).collect();
        assert_eq!(sources[0], Rect::new(32.0, 0.0, 16.0, 16.0));
        assert_eq!(sources[1], Rect::new(48.0, 0.0, 16.0, 16.0));
        assert!(!world.get_component::<Animation>(id).unwrap().playing);
    }
}
