//! Pan and pinch handling for the maze anchor

use glam::Vec3;

use super::state::{GesturePhase, PanSample, PinchSample};
use crate::horizontal;
use crate::settings::GestureSettings;

/// Camera-relative horizontal basis `(right, forward)` for panning.
///
/// Forward points from the camera toward the maze, flattened onto the floor
/// plane; it falls back to +Z when the camera is straight above.
pub fn pan_basis(camera: Vec3, anchor: Vec3) -> (Vec3, Vec3) {
    let toward = horizontal((anchor - camera).normalize_or_zero());
    let forward = if toward.length() < 0.001 {
        Vec3::Z
    } else {
        toward.normalize()
    };
    let right = Vec3::Y.cross(forward).normalize();
    (right, forward)
}

/// Accumulated pan offset and zoom of the anchor
#[derive(Debug, Clone)]
pub struct GestureState {
    settings: GestureSettings,
    pan_offset: Vec3,
    pan_start: Option<Vec3>,
    zoom: f32,
    pinch_start: Option<f32>,
}

impl GestureState {
    pub fn new(settings: GestureSettings) -> Self {
        Self {
            settings,
            pan_offset: Vec3::ZERO,
            pan_start: None,
            zoom: 1.0,
            pinch_start: None,
        }
    }

    pub fn pan_offset(&self) -> Vec3 {
        self.pan_offset
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Back to rest: no offset, unit zoom, no gesture in progress
    pub fn reset(&mut self) {
        self.pan_offset = Vec3::ZERO;
        self.pan_start = None;
        self.zoom = 1.0;
        self.pinch_start = None;
    }

    /// Apply a pan sample seen from `camera`
    pub fn apply_pan(&mut self, sample: PanSample, camera: Vec3, anchor: Vec3) {
        let start = match (sample.phase, self.pan_start) {
            (GesturePhase::Began, _) | (_, None) => {
                self.pan_start = Some(self.pan_offset);
                self.pan_offset
            }
            (_, Some(start)) => start,
        };

        let (right, forward) = pan_basis(camera, anchor);
        let sensitivity = self.settings.pan_sensitivity;
        self.pan_offset = start
            + right * (-sample.translation.x * sensitivity)
            + forward * (-sample.translation.y * sensitivity);

        if sample.phase == GesturePhase::Ended {
            self.pan_start = None;
        }
    }

    /// Apply a pinch sample; zoom is relative to the value at gesture start
    pub fn apply_pinch(&mut self, sample: PinchSample) {
        let start = match (sample.phase, self.pinch_start) {
            (GesturePhase::Began, _) | (_, None) => {
                self.pinch_start = Some(self.zoom);
                self.zoom
            }
            (_, Some(start)) => start,
        };

        self.zoom = (start * sample.magnification)
            .clamp(self.settings.min_scale, self.settings.max_scale);

        if sample.phase == GesturePhase::Ended {
            self.pinch_start = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn pinch(phase: GesturePhase, magnification: f32) -> PinchSample {
        PinchSample {
            phase,
            magnification,
        }
    }

    #[test]
    fn test_pinch_clamps_to_max() {
        let mut g = GestureState::new(GestureSettings::default());
        g.apply_pinch(pinch(GesturePhase::Began, 1.0));
        g.apply_pinch(pinch(GesturePhase::Changed, 3.0));
        assert_eq!(g.zoom(), 2.0);
    }

    #[test]
    fn test_pinch_is_relative_to_gesture_start() {
        let mut g = GestureState::new(GestureSettings::default());
        g.apply_pinch(pinch(GesturePhase::Began, 1.0));
        g.apply_pinch(pinch(GesturePhase::Changed, 1.5));
        g.apply_pinch(pinch(GesturePhase::Ended, 1.5));
        assert!((g.zoom() - 1.5).abs() < 1e-6);

        // Second gesture starts from 1.5 and does not compound intermediate samples
        g.apply_pinch(pinch(GesturePhase::Began, 1.0));
        g.apply_pinch(pinch(GesturePhase::Changed, 0.9));
        g.apply_pinch(pinch(GesturePhase::Changed, 0.8));
        assert!((g.zoom() - 1.2).abs() < 1e-6);

        g.apply_pinch(pinch(GesturePhase::Changed, 0.1));
        assert_eq!(g.zoom(), 0.5);
    }

    #[test]
    fn test_pan_is_camera_relative() {
        let anchor = Vec3::ZERO;
        let mut g = GestureState::new(GestureSettings::default());

        // Camera on +Z looking toward -Z: right is -X
        let camera = Vec3::new(0.0, 1.0, 2.0);
        g.apply_pan(
            PanSample {
                phase: GesturePhase::Began,
                translation: Vec2::ZERO,
            },
            camera,
            anchor,
        );
        g.apply_pan(
            PanSample {
                phase: GesturePhase::Changed,
                translation: Vec2::new(100.0, 0.0),
            },
            camera,
            anchor,
        );
        assert!((g.pan_offset() - Vec3::new(0.05, 0.0, 0.0)).length() < 1e-6);
        assert_eq!(g.pan_offset().y, 0.0);
    }

    #[test]
    fn test_pan_basis_overhead_fallback() {
        let (right, forward) = pan_basis(Vec3::new(0.0, 2.0, 0.0), Vec3::ZERO);
        assert_eq!(forward, Vec3::Z);
        assert!((right - Vec3::X).length() < 1e-6);
    }
}
