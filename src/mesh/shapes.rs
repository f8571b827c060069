//! Shape generators for maze geometry

use glam::Vec3;
use std::f32::consts::{PI, TAU};

use super::vertex::{MeshData, Vertex};

/// Generate an axis-aligned box centered at the origin
pub fn cuboid(size: Vec3) -> MeshData {
    let h = size * 0.5;
    // (normal, u axis, v axis) per face
    let faces = [
        (Vec3::X, Vec3::Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::Z, Vec3::NEG_X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::X, Vec3::Y),
    ];

    let mut mesh = MeshData::default();
    for (n, u, v) in faces {
        let base = mesh.vertices.len() as u32;
        let center = n * h;
        let du = u * h;
        let dv = v * h;
        for corner in [-du - dv, du - dv, du + dv, -du + dv] {
            mesh.vertices
                .push(Vertex::new((center + corner).to_array(), n.to_array()));
        }
        // Wind counter-clockwise when viewed from outside
        if u.cross(v).dot(n) > 0.0 {
            mesh.indices
                .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        } else {
            mesh.indices
                .extend_from_slice(&[base, base + 2, base + 1, base, base + 3, base + 2]);
        }
    }
    mesh
}

/// Generate a UV sphere
pub fn sphere(radius: f32, segments: u32, rings: u32) -> MeshData {
    let segments = segments.max(3);
    let rings = rings.max(2);
    let mut mesh = MeshData::default();

    for ring in 0..=rings {
        let phi = PI * ring as f32 / rings as f32;
        for seg in 0..=segments {
            let theta = TAU * seg as f32 / segments as f32;
            let n = Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());
            mesh.vertices
                .push(Vertex::new((n * radius).to_array(), n.to_array()));
        }
    }

    let stride = segments + 1;
    for ring in 0..rings {
        for seg in 0..segments {
            let a = ring * stride + seg;
            let b = a + stride;
            mesh.indices.extend_from_slice(&[a, a + 1, b, b, a + 1, b + 1]);
        }
    }
    mesh
}

/// Generate a flat five-pointed star lying in the XZ plane, extruded by `depth`
pub fn star(radius: f32, depth: f32) -> MeshData {
    const POINTS: u32 = 5;
    let inner_radius = radius * 0.4;
    let rim = POINTS * 2;
    let mut mesh = MeshData::default();

    let outline: Vec<Vec3> = (0..rim)
        .map(|i| {
            let angle = i as f32 * PI / POINTS as f32;
            let r = if i % 2 == 0 { radius } else { inner_radius };
            Vec3::new(r * angle.cos(), 0.0, r * angle.sin())
        })
        .collect();

    // Top and bottom caps as triangle fans
    for (y, normal) in [(depth / 2.0, Vec3::Y), (-depth / 2.0, Vec3::NEG_Y)] {
        let center = mesh.vertices.len() as u32;
        mesh.vertices
            .push(Vertex::new([0.0, y, 0.0], normal.to_array()));
        for p in &outline {
            mesh.vertices
                .push(Vertex::new([p.x, y, p.z], normal.to_array()));
        }
        for i in 1..=rim {
            let next = i % rim + 1;
            if normal.y > 0.0 {
                mesh.indices
                    .extend_from_slice(&[center, center + next, center + i]);
            } else {
                mesh.indices
                    .extend_from_slice(&[center, center + i, center + next]);
            }
        }
    }

    // Side walls, one quad per outline edge with a flat normal
    for i in 0..rim as usize {
        let p0 = outline[i];
        let p1 = outline[(i + 1) % rim as usize];
        let normal = (p1 - p0).cross(Vec3::Y).normalize_or_zero();
        let base = mesh.vertices.len() as u32;
        for p in [p0, p1] {
            mesh.vertices
                .push(Vertex::new([p.x, depth / 2.0, p.z], normal.to_array()));
            mesh.vertices
                .push(Vertex::new([p.x, -depth / 2.0, p.z], normal.to_array()));
        }
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 1, base + 3]);
    }

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cuboid_counts_and_bounds() {
        let mesh = cuboid(Vec3::new(0.5, 0.3, 0.1));
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.triangle_count(), 12);
        let (min, max) = mesh.bounds().expect("non-empty");
        assert!((max[0] - 0.25).abs() < 1e-6 && (min[0] + 0.25).abs() < 1e-6);
        assert!((max[1] - 0.15).abs() < 1e-6);
        assert!((max[2] - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_sphere_vertices_on_radius() {
        let mesh = sphere(0.08, 12, 8);
        for v in &mesh.vertices {
            let len = Vec3::from_array(v.position).length();
            assert!((len - 0.08).abs() < 1e-5);
        }
        assert_eq!(mesh.triangle_count(), (12 * 8 * 2) as usize);
    }

    #[test]
    fn test_star_outline() {
        let mesh = star(0.12, 0.01);
        let (min, max) = mesh.bounds().expect("non-empty");
        assert!((max[0] - 0.12).abs() < 1e-5);
        assert!((max[1] - 0.005).abs() < 1e-6);
        assert!((min[1] + 0.005).abs() < 1e-6);
        // 2 caps of 10 triangles, 10 side quads
        assert_eq!(mesh.triangle_count(), 20 + 20);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
    }
}
