//! SDF-based contact queries
//!
//! Uses signed distance fields for sphere-vs-box and sphere-vs-sphere
//! contacts. Boxes are evaluated in their own local frame.

use glam::{Quat, Vec3};

/// Signed distance to a sphere
#[inline]
pub fn sd_sphere(p: Vec3, center: Vec3, radius: f32) -> f32 {
    (p - center).length() - radius
}

/// Signed distance to an origin-centered box with the given half extents
pub fn sd_box(p: Vec3, half_extents: Vec3) -> f32 {
    let q = p.abs() - half_extents;
    q.max(Vec3::ZERO).length() + q.max_element().min(0.0)
}

/// Compute SDF gradient (surface normal) using central differences
pub fn sdf_gradient<F>(p: Vec3, eps: f32, sdf: F) -> Vec3
where
    F: Fn(Vec3) -> f32,
{
    let dx = sdf(p + Vec3::X * eps) - sdf(p - Vec3::X * eps);
    let dy = sdf(p + Vec3::Y * eps) - sdf(p - Vec3::Y * eps);
    let dz = sdf(p + Vec3::Z * eps) - sdf(p - Vec3::Z * eps);
    Vec3::new(dx, dy, dz).normalize_or_zero()
}

/// Result of a contact query
#[derive(Debug, Clone, Copy)]
pub struct Contact {
    /// World-space normal pointing from the obstacle toward the sphere
    pub normal: Vec3,
    /// Overlap depth (positive when touching)
    pub penetration: f32,
}

/// Contact between a sphere and an oriented box
pub fn sphere_box_contact(
    center: Vec3,
    radius: f32,
    box_center: Vec3,
    box_rotation: Quat,
    half_extents: Vec3,
) -> Option<Contact> {
    let inv = box_rotation.inverse();
    let local = inv * (center - box_center);
    let dist = sd_box(local, half_extents);
    if dist >= radius {
        return None;
    }

    let closest = local.clamp(-half_extents, half_extents);
    let offset = local - closest;
    let local_normal = if offset.length_squared() > 1e-12 {
        offset.normalize()
    } else {
        // Center is inside the box: push out through the nearest face
        let eps = half_extents.min_element().max(1e-4) * 1e-2;
        let g = sdf_gradient(local, eps, |q| sd_box(q, half_extents));
        if g == Vec3::ZERO { Vec3::Y } else { g }
    };

    Some(Contact {
        normal: box_rotation * local_normal,
        penetration: radius - dist,
    })
}

/// Contact between two spheres (normal points from `other` toward `center`)
pub fn sphere_sphere_contact(
    center: Vec3,
    radius: f32,
    other_center: Vec3,
    other_radius: f32,
) -> Option<Contact> {
    let dist = sd_sphere(center, other_center, other_radius);
    if dist >= radius {
        return None;
    }
    let normal = (center - other_center).normalize_or_zero();
    Some(Contact {
        normal: if normal == Vec3::ZERO { Vec3::Y } else { normal },
        penetration: radius - dist,
    })
}

/// Reflect velocity off a surface with given normal
#[inline]
pub fn reflect(vel: Vec3, normal: Vec3) -> Vec3 {
    vel - 2.0 * vel.dot(normal) * normal
}
