//! Text labels.

use tessera_core::{TextLabel, Transform, World};

use super::camera::Camera;
use crate::services::{Renderer, TextDraw};

/// Draws every [`TextLabel`] at its owner's position plus the label
/// offset, in entity id order. Labels are not culled.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextRenderSystem;

impl TextRenderSystem {
    /// Creates the system.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Draws all labels and returns how many were drawn.
    pub fn render(&self, world: &World, camera: &Camera, renderer: &mut dyn Renderer) -> usize {
        let mut drawn = 0;
        for id in world.with_component::<TextLabel>() {
            let (Some(t), Some(label)) = world.components2::<Transform, TextLabel>(id) else {
                continue;
            };
            renderer.draw_text(TextDraw {
                text: label.text.clone(),
                font: label.font,
                size: label.size,
                color: label.color,
                position: camera.to_screen(t.position + label.offset, label.fixed),
            });
            drawn += 1;
        }
        drawn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{DrawCommand, RecordingRenderer};
    use tessera_shared::{FontHandle, Vec2};

    #[test]
    fn test_labels_follow_camera_unless_fixed() {
        let mut world = World::new();
        let score = world.create_entity(10.0, 10.0);
        let mut label = TextLabel::new("Score: 0", FontHandle(1), 14);
        label.fixed = true;
        world.add_component(score, label).unwrap();

        let tag = world.create_entity(300.0, 200.0);
        let mut label = TextLabel::new("Tank", FontHandle(2), 10);
        label.offset = Vec2::new(0.0, -12.0);
        world.add_component(tag, label).unwrap();

        let camera = Camera::new(100, 100, 640, 480);
        let mut renderer = RecordingRenderer::new();
        assert_eq!(TextRenderSystem::new().render(&world, &camera, &mut renderer), 2);

        let positions: Vec<Vec2> = renderer
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text(t) => Some(t.position),
                _ => None,
            })
            .collect();
        assert_eq!(positions, vec![Vec2::new(10.0, 10.0), Vec2::new(200.0, 88.0)]);
    }
}
