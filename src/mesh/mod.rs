//! CPU mesh generation
//!
//! Scene entities carry a lightweight [`Mesh`] description; renderers call
//! [`Mesh::build`] to get upload-ready vertex/index buffers.

pub mod shapes;
pub mod vertex;

use glam::Vec3;
use serde::{Deserialize, Serialize};

pub use vertex::{MeshData, Vertex};

/// RGBA material colors used by the maze
pub mod colors {
    pub const FLOOR: [f32; 4] = [0.83, 0.83, 0.83, 1.0];
    pub const WALL: [f32; 4] = [0.6, 0.4, 0.2, 1.0];
    pub const BALL: [f32; 4] = [0.0, 0.0, 1.0, 1.0];
    pub const FINISH: [f32; 4] = [0.0, 1.0, 0.0, 1.0];
    pub const STAR: [f32; 4] = [1.0, 1.0, 0.0, 1.0];
    pub const CLEAR: [f32; 4] = [0.0, 0.0, 0.0, 0.0];
}

/// Geometry kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MeshKind {
    Cuboid { size: Vec3 },
    Sphere { radius: f32 },
    Star { radius: f32, depth: f32 },
}

/// Visual component of a scene entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub kind: MeshKind,
    pub color: [f32; 4],
    pub metallic: bool,
    pub visible: bool,
}

impl Mesh {
    pub fn new(kind: MeshKind, color: [f32; 4]) -> Self {
        Self {
            kind,
            color,
            metallic: false,
            visible: true,
        }
    }

    pub fn metallic(mut self) -> Self {
        self.metallic = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn build(&self) -> MeshData {
        match self.kind {
            MeshKind::Cuboid { size } => shapes::cuboid(size),
            MeshKind::Sphere { radius } => shapes::sphere(radius, 24, 16),
            MeshKind::Star { radius, depth } => shapes::star(radius, depth),
        }
    }

    /// Height of the built geometry along Y
    pub fn height(&self) -> f32 {
        match self.kind {
            MeshKind::Cuboid { size } => size.y,
            MeshKind::Sphere { radius } => radius * 2.0,
            MeshKind::Star { depth, .. } => depth,
        }
    }
}
