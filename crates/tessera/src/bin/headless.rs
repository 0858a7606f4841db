//! # Tessera Headless Run
//!
//! Plays a scripted two-scene game against the recording renderer:
//! a menu with one button, then an arena where patrols walk their routes
//! while the player's radar sweeps for them.
//!
//! ```text
//! tessera_headless [config.toml] [frames]
//! ```

use std::process::ExitCode;

use tessera::core::{
    ActionId, BoxCollider, CameraFollow, CircleCollider, CircleShape, Clickable, Layer, Parallax,
    Radar, RigidBody, ScrollDirection, Sprite, Tag, TextLabel, Waypoint,
};
use tessera::services::{AssetStore, AudioManager, HeadlessLoader, NullAudio, RecordingRenderer};
use tessera::shared::{Color, Dimension, FontHandle, Vec2};
use tessera::systems::{PlatformEvent, QueuedInput};
use tessera::{
    Engine, EngineConfig, EngineEvent, EngineResult, EventKind, EventReceiver, Map, MouseButton,
    Scene, SceneDirector,
};

const DEFAULT_CONFIG: &str = "tessera.toml";
const DEFAULT_FRAMES: u64 = 600;
const START_ACTION: ActionId = ActionId(1);
const PATROLS: usize = 64;

const ASSET_FILES: [&str; 5] = [
    "assets/images/clouds.png",
    "assets/images/tank.png",
    "assets/images/chopper.png",
    "assets/images/button.png",
    "assets/sounds/radar-ping.wav",
];

fn load_assets(assets: &mut AssetStore) -> EngineResult<()> {
    let mut loader = HeadlessLoader::new(Dimension::new(32, 32));
    assets.load_files(&mut loader, ASSET_FILES)?;
    Ok(())
}

// =============================================================================
// Menu
// =============================================================================

#[derive(Default)]
struct Menu {
    clicks: Option<EventReceiver>,
    started: bool,
}

impl Scene for Menu {
    fn load(&mut self, engine: &mut Engine) -> EngineResult<()> {
        load_assets(&mut engine.assets)?;
        let button = engine.assets.texture("button")?;

        let id = engine
            .world
            .create_entity_with_tag(640.0, 360.0, Tag::Ui);
        engine.world.set_layer(id, Layer::Foreground);
        engine
            .world
            .add_component(id, Sprite::new(button.handle, button.size).fixed())?;
        engine.world.add_component(id, BoxCollider::new(200.0, 60.0))?;
        engine.world.add_component(id, Clickable::new(START_ACTION))?;

        let title = engine.world.create_entity(560.0, 200.0);
        engine
            .world
            .add_component(title, TextLabel::new("TESSERA", FontHandle(0), 48))?;

        self.clicks = Some(engine.bus().subscribe(&[EventKind::Clicked]));
        self.started = false;
        Ok(())
    }

    fn update(&mut self, engine: &mut Engine, dt: f32) -> EngineResult<()> {
        if let Some(clicks) = &self.clicks {
            self.started |= clicks.drain().iter().any(|event| {
                matches!(event, EngineEvent::Clicked { action, .. } if *action == START_ACTION)
            });
        }
        engine.update_systems(dt)
    }

    fn unload(&mut self, engine: &mut Engine) {
        self.clicks = None;
        engine.world.clear();
        engine.assets.clear();
    }

    fn next_scene(&self) -> Option<String> {
        self.started.then(|| "arena".to_owned())
    }

    fn is_running(&self) -> bool {
        !self.started
    }
}

// =============================================================================
// Arena
// =============================================================================

struct Arena {
    audio: AudioManager<NullAudio>,
    detections: Option<EventReceiver>,
    detected: u64,
}

impl Arena {
    fn new() -> Self {
        Self {
            audio: AudioManager::new(NullAudio::default()),
            detections: None,
            detected: 0,
        }
    }
}

#[allow(clippy::cast_precision_loss)]
impl Scene for Arena {
    fn load(&mut self, engine: &mut Engine) -> EngineResult<()> {
        load_assets(&mut engine.assets)?;
        engine.load_map(&Map::new("desert", "arena", 32, 4, 32, 32));
        engine.clear_color = Color::rgba(16, 16, 32, 255);

        let clouds = engine.assets.texture("clouds")?;
        let sky = engine.world.create_entity(0.0, 0.0);
        engine.world.add_component(
            sky,
            Parallax::new(clouds.handle, clouds.size, ScrollDirection::Diagonal)
                .with_camera_factor(0.25),
        )?;

        let tank = engine.assets.texture("tank")?;
        let player = engine
            .world
            .create_entity_with_tag(200.0, 200.0, Tag::Player);
        engine
            .world
            .add_component(player, Sprite::new(tank.handle, tank.size))?;
        engine
            .world
            .add_component(player, RigidBody::with_velocity(Vec2::new(80.0, 40.0)))?;
        engine.world.add_component(player, CameraFollow)?;
        engine.world.add_component(player, Radar::new(150.0))?;
        engine.world.add_component(player, CircleCollider::new(16.0))?;
        let mut sweep = CircleShape::new(150.0);
        sweep.dashed = true;
        sweep.color = Color::GREEN;
        engine.world.add_component(player, sweep)?;

        let chopper = engine.assets.texture("chopper")?;
        for i in 0..PATROLS {
            let x = 100.0 + (i % 8) as f32 * 400.0;
            let y = 100.0 + (i / 8) as f32 * 400.0;
            let id = engine.world.create_entity_with_tag(x, y, Tag::Enemy);
            engine
                .world
                .add_component(id, Sprite::new(chopper.handle, chopper.size))?;
            engine
                .world
                .add_component(id, RigidBody::with_velocity(Vec2::new(60.0, 60.0)))?;
            engine.world.add_component(
                id,
                Waypoint::through([
                    Vec2::new(x + 200.0, y),
                    Vec2::new(x + 200.0, y + 200.0),
                    Vec2::new(x, y + 200.0),
                    Vec2::new(x, y),
                ]),
            )?;
            engine.world.add_component(id, CircleCollider::new(16.0))?;
        }

        let hud = engine.world.create_entity(16.0, 16.0);
        engine.world.set_layer(hud, Layer::Foreground);
        let mut label = TextLabel::new("ARENA", FontHandle(0), 24);
        label.fixed = true;
        engine.world.add_component(hud, label)?;

        self.detections = Some(engine.bus().subscribe(&[EventKind::TargetDetected]));
        self.detected = 0;
        Ok(())
    }

    fn update(&mut self, engine: &mut Engine, dt: f32) -> EngineResult<()> {
        engine.update_systems(dt)?;
        let found = self
            .detections
            .as_ref()
            .map_or(0, |rx| rx.drain().len());
        if found > 0 {
            self.detected += found as u64;
            self.audio.play_sound(&engine.assets, "radar-ping", 0)?;
        }
        Ok(())
    }

    fn unload(&mut self, engine: &mut Engine) {
        self.detections = None;
        println!(
            "Arena: {} detections, {} radar pings",
            self.detected,
            self.audio.device().log().len()
        );
        engine.world.clear();
        engine.assets.clear();
    }
}

// =============================================================================
// Entry point
// =============================================================================

fn script() -> QueuedInput {
    [
        PlatformEvent::MouseMotion { x: 10.0, y: 10.0 },
        PlatformEvent::MouseMotion { x: 640.0, y: 360.0 },
        PlatformEvent::MouseButtonDown {
            button: MouseButton::Left,
            x: 640.0,
            y: 360.0,
        },
        PlatformEvent::MouseButtonUp {
            button: MouseButton::Left,
            x: 640.0,
            y: 360.0,
        },
    ]
    .into_iter()
    .collect()
}

fn run(config_path: &str, frames: u64) -> EngineResult<()> {
    let config = EngineConfig::load_or_default(config_path)?;
    let mut engine = Engine::new(config)?;

    let mut director = SceneDirector::new().unpaced().with_frame_limit(frames);
    director.add("menu", Menu::default());
    director.add("arena", Arena::new());

    let mut renderer = RecordingRenderer::new();
    let visited = director.run(&mut engine, "menu", &mut script(), &mut renderer)?;

    println!("Scenes:  {}", visited.join(" -> "));
    println!("Frames:  {} ({} presented)", engine.frame_count(), renderer.frames());
    println!("Pool:    {:?}", engine.pool().stats());
    println!(
        "Events:  {} delivered, {} dropped",
        engine.bus().delivered_count(),
        engine.bus().dropped_count()
    );
    println!();
    engine.stats().print_summary();
    Ok(())
}

fn main() -> ExitCode {
    let mut args = std::env::args().skip(1);
    let config_path = args.next().unwrap_or_else(|| DEFAULT_CONFIG.to_owned());
    let frames = match args.next().map(|raw| raw.parse::<u64>()) {
        None => DEFAULT_FRAMES,
        Some(Ok(frames)) => frames,
        Some(Err(e)) => {
            eprintln!("invalid frame count: {e}");
            return ExitCode::FAILURE;
        }
    };

    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║                    TESSERA HEADLESS RUN                          ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!();

    match run(&config_path, frames) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
