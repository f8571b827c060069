//! Session state visible to the presentation layer

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::scene::{EntityId, Pose};

/// Session lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Not placed in the world yet
    #[default]
    NoMaze,
    /// Ball in play
    Active,
    /// Finish reached; an automatic rebuild is pending
    Solved,
}

/// Gesture lifecycle, as reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GesturePhase {
    Began,
    Changed,
    Ended,
}

/// Pan sample: translation is cumulative since the gesture began (screen points)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanSample {
    pub phase: GesturePhase,
    pub translation: Vec2,
}

/// Pinch sample: magnification is cumulative since the gesture began
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PinchSample {
    pub phase: GesturePhase,
    pub magnification: f32,
}

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// World pose of the tracked viewpoint; tilt is held while absent
    pub device_pose: Option<Pose>,
    pub pan: Option<PanSample>,
    pub pinch: Option<PinchSample>,
    /// Put the ball back at the start
    pub reset_ball: bool,
    /// Discard the maze and build a new one
    pub recreate: bool,
}

impl TickInput {
    pub fn with_device(position: Vec3) -> Self {
        Self {
            device_pose: Some(Pose::from_translation(position)),
            ..Default::default()
        }
    }

    pub fn has_one_shots(&self) -> bool {
        self.pan.is_some() || self.pinch.is_some() || self.reset_ball || self.recreate
    }

    /// Drop everything that must only apply once
    pub fn clear_one_shots(&mut self) {
        self.pan = None;
        self.pinch = None;
        self.reset_ball = false;
        self.recreate = false;
    }

    /// Fold another frame's one-shots into this one (newest samples win)
    pub fn merge_one_shots(&mut self, newer: &TickInput) {
        self.pan = newer.pan.or(self.pan);
        self.pinch = newer.pinch.or(self.pinch);
        self.reset_ball |= newer.reset_ball;
        self.recreate |= newer.recreate;
    }
}

/// Things that happened, drained by the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    MazeCreated { rows: usize, columns: usize, seed: u64 },
    Solved,
    StarCollected { star: EntityId, session_stars: u32 },
    BallReset,
    RebuildScheduled { ticks: u32 },
    RebuildCancelled,
}

/// Plain state snapshot for polling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub solved: bool,
    /// Stars collected since the session started
    pub session_stars: u32,
    /// Stars still on the current maze
    pub stars_remaining: usize,
    /// Persisted tally as last known to the session
    pub total_stars: u64,
    pub rebuild_in_ticks: Option<u32>,
    pub maze_seed: Option<u64>,
    pub mazes_built: u32,
    pub pan_offset: Vec3,
    pub zoom: f32,
    pub tick: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_keeps_latest_samples() {
        let mut pending = TickInput {
            reset_ball: true,
            pinch: Some(PinchSample {
                phase: GesturePhase::Began,
                magnification: 1.0,
            }),
            ..Default::default()
        };
        let newer = TickInput {
            pinch: Some(PinchSample {
                phase: GesturePhase::Changed,
                magnification: 1.5,
            }),
            ..Default::default()
        };
        pending.merge_one_shots(&newer);
        assert!(pending.reset_ball);
        assert_eq!(pending.pinch.map(|p| p.magnification), Some(1.5));

        pending.clear_one_shots();
        assert!(!pending.has_one_shots());
    }
}
