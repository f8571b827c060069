//! Tilt Maze - a marble-in-a-tray maze anchored in a tracked world location
//!
//! Core modules:
//! - `maze`: Procedural grid generation and grid-to-scene construction
//! - `scene`: Entity-component store with TRS transforms
//! - `physics`: Physics engine port and the built-in sphere-vs-box world
//! - `gameplay`: Tilt control, gestures, contact handling, maze lifecycle
//! - `mesh`: CPU mesh buffers for the maze geometry
//! - `persistence`: Collectible tally storage port
//! - `settings`: Data-driven tuning

pub mod gameplay;
pub mod maze;
pub mod mesh;
pub mod persistence;
pub mod physics;
pub mod scene;
pub mod settings;

pub use gameplay::{GameEvent, GameplayController, SessionPhase, SessionSnapshot, TickInput};
pub use maze::{CellCode, Grid, Maze, MazeBuilder, MazeConfiguration, MazeGenerator};
pub use persistence::{MemoryTallyStore, TallyStore};
pub use settings::Settings;

use glam::Vec3;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz for stable rolling contact)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame the accumulator will accept (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// World gravity (m/s², along -Y)
    pub const GRAVITY: f32 = 9.81;

    /// Tilt defaults
    pub const MAX_TILT_ANGLE: f32 = std::f32::consts::PI / 6.0; // 30 degrees
    pub const REFERENCE_DISTANCE: f32 = 2.0;
    pub const SMOOTHING_FACTOR: f32 = 0.2;
    /// Horizontal distance under which the viewer counts as directly overhead
    pub const OVERHEAD_THRESHOLD: f32 = 0.1;

    /// Gesture defaults
    pub const PAN_SENSITIVITY: f32 = 0.0005;
    pub const MIN_PINCH_SCALE: f32 = 0.5;
    pub const MAX_PINCH_SCALE: f32 = 2.0;

    /// Maze defaults
    pub const DEFAULT_GRID_SIZE: usize = 10;
    /// Scale applied to the maze root before it is hung from the pivot
    pub const MAZE_DISPLAY_SCALE: f32 = 0.2;
    /// Seconds between reaching the finish and the automatic rebuild
    pub const REBUILD_DELAY_SECS: f32 = 2.0;

    /// Star spin advance per timer tick (radians)
    pub const STAR_SPIN_STEP: f32 = 0.05;
    /// Star spin timer period (~60 Hz)
    pub const STAR_SPIN_INTERVAL: f32 = 0.016;
}

/// Drop the vertical component of a vector
#[inline]
pub fn horizontal(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Convert a duration in seconds to whole simulation ticks
#[inline]
pub fn secs_to_ticks(secs: f32) -> u32 {
    (secs / consts::SIM_DT).round().max(0.0) as u32
}
