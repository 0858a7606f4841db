//! # Scenes
//!
//! A scene is one screen of the game: a menu, a level, a credits roll. It
//! populates the world on `load`, may override any frame phase, and names
//! the scene that follows it.
//!
//! ```text
//! SceneDirector::run("menu")
//!     menu.load ─> frames while running ─> menu.unload ─> menu.next_scene() = "level1"
//!   level1.load ─> frames while running ─> level1.unload ─> None ─> done
//! ```

use std::collections::HashMap;
use std::time::Instant;

use tracing::info;

use crate::error::{EngineError, EngineResult};
use crate::game_loop::Engine;
use crate::services::Renderer;
use crate::systems::{DrawStats, InputSource};

/// One screen of the game.
///
/// Only [`Scene::load`] is required; every other hook defaults to the
/// engine's standard behaviour.
pub trait Scene {
    /// Creates the scene's entities and loads its assets.
    ///
    /// # Errors
    ///
    /// Any failure aborts the run.
    fn load(&mut self, engine: &mut Engine) -> EngineResult<()>;

    /// Handles platform input. Returns the number of events handled.
    ///
    /// # Errors
    ///
    /// Any failure aborts the run.
    fn input(&mut self, engine: &mut Engine, source: &mut dyn InputSource) -> EngineResult<usize> {
        Ok(engine.process_input(source))
    }

    /// Advances the simulation by `dt` seconds.
    ///
    /// # Errors
    ///
    /// Any failure aborts the run.
    fn update(&mut self, engine: &mut Engine, dt: f32) -> EngineResult<()> {
        engine.update_systems(dt)
    }

    /// Draws the frame.
    ///
    /// # Errors
    ///
    /// Any failure aborts the run.
    fn render(
        &mut self,
        engine: &mut Engine,
        renderer: &mut dyn Renderer,
        now_ms: u64,
    ) -> EngineResult<DrawStats> {
        engine.render(renderer, now_ms)
    }

    /// Tears the scene down. Defaults to emptying the world and the asset
    /// store.
    fn unload(&mut self, engine: &mut Engine) {
        engine.world.clear();
        engine.assets.clear();
    }

    /// Scene to run after this one, if any.
    fn next_scene(&self) -> Option<String> {
        None
    }

    /// Whether the scene wants more frames.
    fn is_running(&self) -> bool {
        true
    }
}

/// Runs named scenes one after another.
pub struct SceneDirector {
    scenes: HashMap<String, Box<dyn Scene>>,
    paced: bool,
    frame_limit: Option<u64>,
}

impl SceneDirector {
    /// Director that paces frames to the engine's target rate.
    #[must_use]
    pub fn new() -> Self {
        Self {
            scenes: HashMap::new(),
            paced: true,
            frame_limit: None,
        }
    }

    /// Runs frames back to back instead of sleeping out the budget.
    #[must_use]
    pub const fn unpaced(mut self) -> Self {
        self.paced = false;
        self
    }

    /// Ends each scene after at most `frames` frames.
    #[must_use]
    pub const fn with_frame_limit(mut self, frames: u64) -> Self {
        self.frame_limit = Some(frames);
        self
    }

    /// Registers a scene, replacing any scene with the same name.
    pub fn add(&mut self, name: impl Into<String>, scene: impl Scene + 'static) {
        self.scenes.insert(name.into(), Box::new(scene));
    }

    /// Returns true if a scene is registered as `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.scenes.contains_key(name)
    }

    /// Runs `first` and every scene it leads to.
    ///
    /// Stops when a scene names no successor or the platform asks to quit.
    ///
    /// # Returns
    ///
    /// The names of the scenes run, in order.
    ///
    /// # Errors
    ///
    /// [`EngineError::UnknownScene`] for an unregistered name, or the first
    /// error a scene hook returns. The failing scene is still unloaded.
    pub fn run(
        &mut self,
        engine: &mut Engine,
        first: &str,
        input: &mut dyn InputSource,
        renderer: &mut dyn Renderer,
    ) -> EngineResult<Vec<String>> {
        let mut visited = Vec::new();
        let mut current = Some(first.to_owned());

        while let Some(name) = current.take() {
            let scene = self
                .scenes
                .get_mut(&name)
                .ok_or_else(|| EngineError::UnknownScene(name.clone()))?;

            info!(scene = %name, "scene loading");
            let outcome = run_scene(
                engine,
                scene.as_mut(),
                input,
                renderer,
                self.paced,
                self.frame_limit,
            );
            scene.unload(engine);
            info!(scene = %name, "scene unloaded");
            let frames = outcome?;
            info!(scene = %name, frames, "scene finished");

            visited.push(name);
            if !engine.quit_requested() {
                current = scene.next_scene();
            }
        }
        Ok(visited)
    }
}

impl Default for SceneDirector {
    fn default() -> Self {
        Self::new()
    }
}

fn run_scene(
    engine: &mut Engine,
    scene: &mut dyn Scene,
    input: &mut dyn InputSource,
    renderer: &mut dyn Renderer,
    paced: bool,
    frame_limit: Option<u64>,
) -> EngineResult<u64> {
    scene.load(engine)?;
    let budget = engine.frame_budget();
    let mut frames = 0;

    while scene.is_running() && !engine.quit_requested() {
        if frame_limit.is_some_and(|limit| frames >= limit) {
            break;
        }
        let start = Instant::now();
        engine.run_frame(scene, input, renderer)?;
        frames += 1;

        if paced {
            if let Some(rest) = budget.checked_sub(start.elapsed()) {
                std::thread::sleep(rest);
            }
        }
    }
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::services::RecordingRenderer;
    use crate::systems::{PlatformEvent, QueuedInput};

    struct Timed {
        frames: u32,
        left: u32,
        next: Option<&'static str>,
    }

    impl Timed {
        fn new(frames: u32, next: Option<&'static str>) -> Self {
            Self {
                frames,
                left: 0,
                next,
            }
        }
    }

    impl Scene for Timed {
        fn load(&mut self, engine: &mut Engine) -> EngineResult<()> {
            self.left = self.frames;
            let _ = engine.world.create_entity(1.0, 1.0);
            Ok(())
        }

        fn update(&mut self, engine: &mut Engine, dt: f32) -> EngineResult<()> {
            self.left = self.left.saturating_sub(1);
            engine.update_systems(dt)
        }

        fn next_scene(&self) -> Option<String> {
            self.next.map(str::to_owned)
        }

        fn is_running(&self) -> bool {
            self.left > 0
        }
    }

    #[test]
    fn test_scenes_chain() {
        let mut engine = Engine::new(EngineConfig::default()).unwrap();
        let mut director = SceneDirector::new().unpaced();
        director.add("menu", Timed::new(2, Some("level")));
        director.add("level", Timed::new(3, None));

        let mut renderer = RecordingRenderer::new();
        let visited = director
            .run(&mut engine, "menu", &mut QueuedInput::new(), &mut renderer)
            .unwrap();

        assert_eq!(visited, vec!["menu".to_owned(), "level".to_owned()]);
        assert_eq!(engine.frame_count(), 5);
        assert_eq!(renderer.frames(), 5);
        assert!(engine.world.is_empty());
    }

    #[test]
    fn test_unknown_scene() {
        let mut engine = Engine::new(EngineConfig::default()).unwrap();
        let mut director = SceneDirector::new().unpaced();
        director.add("menu", Timed::new(1, Some("missing")));
        let result = director.run(
            &mut engine,
            "menu",
            &mut QueuedInput::new(),
            &mut RecordingRenderer::new(),
        );
        assert!(matches!(result, Err(EngineError::UnknownScene(name)) if name == "missing"));
    }

    #[test]
    fn test_quit_stops_the_chain() {
        let mut engine = Engine::new(EngineConfig::default()).unwrap();
        let mut director = SceneDirector::new().unpaced().with_frame_limit(50);
        director.add("menu", Timed::new(10, Some("level")));
        director.add("level", Timed::new(10, None));

        let mut input: QueuedInput = [PlatformEvent::Quit].into_iter().collect();
        let visited = director
            .run(&mut engine, "menu", &mut input, &mut RecordingRenderer::new())
            .unwrap();
        assert_eq!(visited, vec!["menu".to_owned()]);
        assert_eq!(engine.frame_count(), 1);
    }
}
