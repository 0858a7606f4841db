//! Vector shape rendering: boxes, circles and lines.

use tessera_core::{
    BoxShape, CircleShape, CoreResult, Group, GroupMember, LineShape, PrimitiveKind, Transform,
    World, WorkerPool,
};
use tessera_shared::{Color, Rect, Vec2};

use super::camera::Camera;
use super::render::{draw_order, DrawStats};
use crate::services::{CircleStyle, PrimitiveDraw, Renderer};

/// A shape resolved to world space, before the camera is applied.
enum Shape {
    Box {
        origin: Vec2,
        w: f32,
        h: f32,
        filled: bool,
    },
    Circle {
        center: Vec2,
        radius: f32,
        style: CircleStyle,
    },
    Line {
        from: Vec2,
        to: Vec2,
    },
}

impl Shape {
    fn bounds(&self) -> Rect {
        match *self {
            Self::Box { origin, w, h, .. } => Rect::new(origin.x, origin.y, w, h),
            Self::Circle { center, radius, .. } => {
                Rect::from_center(center, radius * 2.0, radius * 2.0)
            }
            Self::Line { from, to } => Rect::new(
                from.x.min(to.x),
                from.y.min(to.y),
                (to.x - from.x).abs(),
                (to.y - from.y).abs(),
            ),
        }
    }

    fn to_screen(&self, camera: &Camera, fixed: bool, color: Color) -> PrimitiveDraw {
        match *self {
            Self::Box { origin, w, h, filled } => {
                let at = camera.to_screen(origin, fixed);
                PrimitiveDraw::Box {
                    rect: Rect::new(at.x, at.y, w, h),
                    filled,
                    color,
                }
            }
            Self::Circle {
                center,
                radius,
                style,
            } => PrimitiveDraw::Circle {
                center: camera.to_screen(center, fixed),
                radius,
                style,
                color,
            },
            Self::Line { from, to } => PrimitiveDraw::Line {
                from: camera.to_screen(from, fixed),
                to: camera.to_screen(to, fixed),
                color,
            },
        }
    }
}

/// Draws [`BoxShape`], [`CircleShape`] and [`LineShape`] entities in layer
/// order, culling the ones off screen.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrimitiveRenderSystem;

impl PrimitiveRenderSystem {
    /// Creates the system.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Draws every visible primitive.
    ///
    /// # Errors
    ///
    /// Pool failures while ordering.
    pub fn render(
        &self,
        world: &World,
        pool: &WorkerPool,
        camera: &Camera,
        renderer: &mut dyn Renderer,
    ) -> CoreResult<DrawStats> {
        let mut stats = DrawStats::default();

        for (id, member) in draw_order(world, pool, Group::Primitive)? {
            let Some(t) = world.get_component::<Transform>(id) else {
                continue;
            };
            let resolved = match member {
                GroupMember::Primitive(PrimitiveKind::Box) => {
                    world.get_component::<BoxShape>(id).map(|b| {
                        (
                            Shape::Box {
                                origin: t.position,
                                w: b.size.w * t.scale.x,
                                h: b.size.h * t.scale.y,
                                filled: b.filled,
                            },
                            b.color,
                            b.fixed,
                        )
                    })
                }
                GroupMember::Primitive(PrimitiveKind::Circle) => {
                    world.get_component::<CircleShape>(id).map(|c| {
                        let style = if c.dashed {
                            CircleStyle::Dashed {
                                dash_length: c.dash_length,
                            }
                        } else if c.filled {
                            CircleStyle::Filled
                        } else {
                            CircleStyle::Outline
                        };
                        (
                            Shape::Circle {
                                center: t.position,
                                radius: c.radius * t.scale.x,
                                style,
                            },
                            c.color,
                            c.fixed,
                        )
                    })
                }
                GroupMember::Primitive(PrimitiveKind::Line) => {
                    world.get_component::<LineShape>(id).map(|l| {
                        (
                            Shape::Line {
                                from: t.position,
                                to: t.position + l.end.scale(t.scale),
                            },
                            l.color,
                            l.fixed,
                        )
                    })
                }
                _ => None,
            };
            let Some((shape, color, fixed)) = resolved else {
                continue;
            };

            if !fixed && camera.is_outside(&shape.bounds()) {
                stats.culled += 1;
                continue;
            }
            renderer.draw_primitive(shape.to_screen(camera, fixed, color));
            stats.drawn += 1;
        }
        Ok(stats)
    }
}
