//! Session settings
//!
//! Tuning for tilt, gestures and the maze lifecycle. Persisted as JSON: a file
//! on native builds, LocalStorage on the web.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::maze::MazeConfiguration;
use crate::secs_to_ticks;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Viewpoint-tilt tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TiltSettings {
    /// Tilt at or beyond `reference_distance` (radians)
    pub max_angle: f32,
    /// Horizontal distance at which tilt saturates
    pub reference_distance: f32,
    /// Slerp fraction applied each tick
    pub smoothing: f32,
    /// Below this horizontal distance the player is treated as overhead
    pub overhead_threshold: f32,
}

impl Default for TiltSettings {
    fn default() -> Self {
        Self {
            max_angle: MAX_TILT_ANGLE,
            reference_distance: REFERENCE_DISTANCE,
            smoothing: SMOOTHING_FACTOR,
            overhead_threshold: OVERHEAD_THRESHOLD,
        }
    }
}

/// Pan and pinch tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureSettings {
    /// World units per screen point of pan
    pub pan_sensitivity: f32,
    pub min_scale: f32,
    pub max_scale: f32,
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self {
            pan_sensitivity: PAN_SENSITIVITY,
            min_scale: MIN_PINCH_SCALE,
            max_scale: MAX_PINCH_SCALE,
        }
    }
}

/// Everything a session needs besides its collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub rows: usize,
    pub columns: usize,
    /// Uniform scale applied to the built maze under the pivot
    pub display_scale: f32,
    pub tilt: TiltSettings,
    pub gestures: GestureSettings,
    /// Delay between solving and the automatic rebuild
    pub rebuild_delay_secs: f32,
    /// Star spin advance per `spin_stars` call (radians)
    pub star_spin_step: f32,
    /// Fixed session seed; random when absent
    pub seed: Option<u64>,
    pub maze: MazeConfiguration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rows: DEFAULT_GRID_SIZE,
            columns: DEFAULT_GRID_SIZE,
            display_scale: MAZE_DISPLAY_SCALE,
            tilt: TiltSettings::default(),
            gestures: GestureSettings::default(),
            rebuild_delay_secs: REBUILD_DELAY_SECS,
            star_spin_step: STAR_SPIN_STEP,
            seed: None,
            maze: MazeConfiguration::default(),
        }
    }
}

impl Settings {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Rebuild delay in fixed ticks
    pub fn rebuild_delay_ticks(&self) -> u32 {
        secs_to_ticks(self.rebuild_delay_secs)
    }

    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse settings, falling back to defaults on malformed input
    pub fn parse_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Ignoring invalid settings ({e}), using defaults");
                Self::default()
            }
        }
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "tilt_maze_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                log::info!("Loaded settings from LocalStorage");
                return Self::parse_or_default(&json);
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Load settings from a JSON file, or defaults if it is missing or invalid
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_path(path: impl AsRef<std::path::Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => {
                log::info!("Loaded settings from {}", path.display());
                Self::parse_or_default(&json)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No settings at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                log::warn!("Failed to read {}: {e}", path.display());
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!((s.rows, s.columns), (10, 10));
        assert_eq!(s.rebuild_delay_ticks(), 240);
        assert_eq!(s.gestures.max_scale, 2.0);
        assert!(s.seed.is_none());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let s = Settings::from_json(r#"{ "rows": 12, "tilt": { "smoothing": 0.5 }, "seed": 7 }"#)
            .expect("valid settings");
        assert_eq!(s.rows, 12);
        assert_eq!(s.columns, 10);
        assert_eq!(s.tilt.smoothing, 0.5);
        assert_eq!(s.tilt.reference_distance, 2.0);
        assert_eq!(s.seed, Some(7));
    }

    #[test]
    fn test_invalid_json_falls_back() {
        assert_eq!(Settings::parse_or_default("{ not json"), Settings::default());
    }

    #[test]
    fn test_json_round_trip() {
        let s = Settings::default().with_seed(42);
        let json = s.to_json().expect("serializable");
        assert_eq!(Settings::from_json(&json).expect("parses"), s);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_missing_file_uses_defaults() {
        let path = std::env::temp_dir().join("tilt_maze_settings_missing_does_not_exist.json");
        assert_eq!(Settings::load_from_path(path), Settings::default());
    }
    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_load_from_path_reads_file() {
        let path = std::env::temp_dir().join(format!(
            "tilt_maze_settings_load_{}.json",
            std::process::id()
        ));
        std::fs::write(&path, r#"{ "columns": 6, "seed": 3 }"#).expect("write settings");
        let s = Settings::load_from_path(&path);
        let _ = std::fs::remove_file(&path);
        assert_eq!(s.columns, 6);
        assert_eq!(s.rows, 10);
        assert_eq!(s.seed, Some(3));
    }
}
