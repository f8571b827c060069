//! Tilt Maze entry point
//!
//! Headless demo: places a maze in front of the origin, orbits a simulated
//! viewpoint around it so the tray tilts, and logs session events.
//!
//! Native usage: `tilt-maze [SEED] [SECONDS]`

use std::f32::consts::TAU;

use glam::Vec3;
use tilt_maze::consts::STAR_SPIN_INTERVAL;
use tilt_maze::scene::Pose;
use tilt_maze::{GameEvent, GameplayController, Settings, TallyStore, TickInput};

/// Host frame rate of the demo loop
const FRAME_DT: f32 = 1.0 / 60.0;
/// Where the maze is placed
const ANCHOR: Vec3 = Vec3::new(0.0, 0.0, -1.0);

fn log_event(event: &GameEvent) {
    match event {
        GameEvent::MazeCreated { rows, columns, seed } => {
            log::info!("New {rows}x{columns} maze (seed {seed})")
        }
        GameEvent::Solved => log::info!("Maze solved!"),
        GameEvent::StarCollected { session_stars, .. } => {
            log::info!("Star collected ({session_stars} this session)")
        }
        GameEvent::BallReset => log::info!("Ball reset"),
        GameEvent::RebuildScheduled { ticks } => log::info!("Rebuild in {ticks} ticks"),
        GameEvent::RebuildCancelled => log::info!("Rebuild cancelled"),
    }
}

/// Viewpoint orbiting the anchor once every 20 seconds
fn device_position(time: f32) -> Vec3 {
    let angle = time / 20.0 * TAU;
    ANCHOR + Vec3::new(angle.cos() * 1.5, 0.6, angle.sin() * 1.5)
}

/// Log the vertex/index totals a renderer would upload for the visible scene
fn log_mesh_budget<S: TallyStore>(controller: &GameplayController<S>) {
    let (vertices, indices) = controller
        .scene()
        .meshes()
        .filter(|(_, mesh)| mesh.visible)
        .map(|(_, mesh)| mesh.build())
        .fold((0, 0), |(v, i), data| (v + data.vertices.len(), i + data.indices.len()));
    log::info!("Scene meshes: {vertices} vertices, {indices} indices");
}

fn run_demo<S: TallyStore>(settings: Settings, store: S, seconds: f32) {
    let mut controller = GameplayController::new(settings, store);
    controller.place(Pose::from_translation(ANCHOR));
    log_mesh_budget(&controller);

    let frames = (seconds / FRAME_DT).round() as u32;
    let mut spin_timer = 0.0;
    for frame in 0..frames {
        let time = frame as f32 * FRAME_DT;
        let mut input = TickInput::with_device(device_position(time));
        // Every 15 seconds put the ball back so it keeps exploring
        input.reset_ball = frame > 0 && frame % (15 * 60) == 0;
        controller.advance(FRAME_DT, &input);

        spin_timer += FRAME_DT;
        while spin_timer >= STAR_SPIN_INTERVAL {
            controller.spin_stars();
            spin_timer -= STAR_SPIN_INTERVAL;
        }

        for event in controller.drain_events() {
            log_event(&event);
        }
    }

    let snapshot = controller.snapshot();
    match serde_json::to_string_pretty(&snapshot) {
        Ok(json) => log::info!("Final session state:\n{json}"),
        Err(e) => log::warn!("Failed to serialize session snapshot: {e}"),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    use tilt_maze::persistence::LocalStorageTallyStore;

    console_error_panic_hook::set_once();
    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::error_1(&format!("Failed to init logger: {e}").into());
    }
    log::info!("Tilt Maze starting...");

    run_demo(Settings::load(), LocalStorageTallyStore::default(), 10.0);
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use tilt_maze::persistence::{BackgroundTallyStore, JsonFileTallyStore};

    env_logger::init();
    log::info!("Tilt Maze (native) starting...");

    let mut args = std::env::args().skip(1);
    let mut settings = Settings::load_from_path("tilt_maze_settings.json");
    if let Some(arg) = args.next() {
        match arg.parse::<u64>() {
            Ok(seed) => settings.seed = Some(seed),
            Err(_) => log::warn!("Ignoring invalid seed {arg:?}"),
        }
    }
    let seconds = args
        .next()
        .and_then(|s| s.parse::<f32>().ok())
        .unwrap_or(60.0);

    let store = BackgroundTallyStore::new(JsonFileTallyStore::new("tilt_maze_tally.json"));
    run_demo(settings, store, seconds);
}
