//! Maze geometry and physics configuration

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::physics::PhysicsMaterial;

/// Dimensions and physical tuning for a maze build (local units)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MazeConfiguration {
    pub cell_size: f32,
    pub wall_height: f32,
    pub wall_thickness: f32,
    pub ball_radius: f32,
    pub floor_height: f32,
    /// Ball start position in maze-local coordinates
    pub start_position: Vec3,

    // === Physics ===
    pub ball_mass: f32,
    pub ball_material: PhysicsMaterial,
    pub surface_material: PhysicsMaterial,
    /// Wall colliders are this much smaller than the visual prism on each axis
    pub wall_collider_inset: f32,

    // === Features ===
    /// Chance for an eligible empty cell to become a hole
    pub hole_chance: f64,
    pub hole_size: Vec3,
    pub finish_size: Vec3,
    pub max_stars: usize,
    pub star_trigger_size: f32,
    pub star_height: f32,
    pub star_radius: f32,
    pub star_depth: f32,
}

impl Default for MazeConfiguration {
    fn default() -> Self {
        Self {
            cell_size: 0.5,
            wall_height: 0.3,
            wall_thickness: 0.1,
            ball_radius: 0.08,
            floor_height: 0.05,
            start_position: Vec3::new(0.25, 0.5, 0.85),

            ball_mass: 10.0,
            ball_material: PhysicsMaterial::new(0.01, 0.05),
            surface_material: PhysicsMaterial::new(0.01, 0.01),
            wall_collider_inset: 0.05,

            hole_chance: 0.1,
            hole_size: Vec3::new(0.2, 0.1, 0.2),
            finish_size: Vec3::new(0.3, 0.01, 0.3),
            max_stars: 3,
            star_trigger_size: 0.3,
            star_height: 0.15,
            star_radius: 0.12,
            star_depth: 0.01,
        }
    }
}

impl MazeConfiguration {
    /// Center of a cell on the floor plane (y = 0)
    pub fn cell_center(&self, row: usize, column: usize) -> Vec3 {
        Vec3::new(
            column as f32 * self.cell_size + self.cell_size / 2.0,
            0.0,
            row as f32 * self.cell_size + self.cell_size / 2.0,
        )
    }

    /// Y of the floor tiles' centers
    pub fn floor_y(&self) -> f32 {
        -0.02
    }

    /// Local bounds of the visible geometry of a built maze with the given
    /// grid size, including the ball at its start and the star visuals
    pub fn bounds(&self, rows: usize, columns: usize) -> (Vec3, Vec3) {
        let half_t = self.wall_thickness / 2.0;
        let top = self
            .wall_height
            .max(self.start_position.y + self.ball_radius)
            .max(self.star_height + self.star_depth);
        let min = Vec3::new(
            -half_t,
            self.floor_y() - self.floor_height / 2.0,
            -half_t,
        );
        let max = Vec3::new(
            columns as f32 * self.cell_size + half_t,
            top,
            rows as f32 * self.cell_size + half_t,
        );
        (min, max)
    }
}
