//! Viewpoint-driven tilt
//!
//! The pivot leans according to where the player stands: the horizontal
//! offset from the maze anchor to the device picks the direction, and its
//! length (saturating at the reference distance) picks the magnitude. The
//! pivot eases toward that target every tick, which filters tracking noise.

use glam::{Quat, Vec3};

use crate::horizontal;
use crate::settings::TiltSettings;

/// Tilt angles about X and Z for a device at `device`, or `None` when the
/// player is overhead
pub fn tilt_angles(anchor: Vec3, device: Vec3, settings: &TiltSettings) -> Option<(f32, f32)> {
    let offset = horizontal(device - anchor);
    let distance = offset.length();
    if distance < settings.overhead_threshold {
        return None;
    }
    let direction = offset / distance;
    let factor = (distance / settings.reference_distance).min(1.0);
    let tilt_x = -direction.z * settings.max_angle * factor;
    let tilt_z = direction.x * settings.max_angle * factor;
    Some((tilt_x, tilt_z))
}

/// Target pivot rotation for the current device position
pub fn target_tilt(anchor: Vec3, device: Vec3, settings: &TiltSettings) -> Quat {
    match tilt_angles(anchor, device, settings) {
        Some((x, z)) => Quat::from_axis_angle(Vec3::X, x) * Quat::from_axis_angle(Vec3::Z, z),
        None => Quat::IDENTITY,
    }
}

/// One low-pass step from `current` toward `target`
pub fn smooth_toward(current: Quat, target: Quat, smoothing: f32) -> Quat {
    current.slerp(target, smoothing).normalize()
}
