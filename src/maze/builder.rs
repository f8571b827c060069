//! Grid-to-scene construction
//!
//! Turns a [`Grid`] and a [`MazeConfiguration`] into a scene subtree:
//! floor tiles and hole triggers, wall prisms (corners become two half-length
//! prisms), a double outer boundary, the dynamic ball, the finish trigger, and
//! up to three spinning stars.
//!
//! Maze-local coordinates: X runs along columns, Z along rows, Y is up. Cell
//! `(row, column)` is centered at `(column + 0.5, 0, row + 0.5) * cell_size`.

use glam::{Quat, Vec3};
use rand::Rng;
use rand::seq::SliceRandom;

use super::config::MazeConfiguration;
use super::generator::{CellCode, Grid};
use crate::mesh::{Mesh, MeshKind, colors};
use crate::physics::{Collider, ColliderShape, RigidBody};
use crate::scene::{EntityId, Scene, Transform};

/// Entities of one collectible star
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StarEntities {
    /// Static trigger root (what the ball touches)
    pub root: EntityId,
    /// Decorative child that spins
    pub visual: EntityId,
}

/// Quadrant of an L-shaped corner cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    fn from_code(code: CellCode) -> Option<Self> {
        match code {
            CellCode::CornerTopLeft => Some(Corner::TopLeft),
            CellCode::CornerTopRight => Some(Corner::TopRight),
            CellCode::CornerBottomLeft => Some(Corner::BottomLeft),
            CellCode::CornerBottomRight => Some(Corner::BottomRight),
            _ => None,
        }
    }

    /// Unit offsets (x sign, z sign) of the corner's quadrant
    fn signs(self) -> (f32, f32) {
        match self {
            Corner::TopLeft => (-1.0, -1.0),
            Corner::TopRight => (1.0, -1.0),
            Corner::BottomLeft => (-1.0, 1.0),
            Corner::BottomRight => (1.0, 1.0),
        }
    }
}

/// A built maze: the ids of everything it spawned
#[derive(Debug, Clone)]
pub struct Maze {
    pub root: EntityId,
    pub ball: EntityId,
    pub finish: EntityId,
    pub stars: Vec<StarEntities>,
    pub holes: Vec<EntityId>,
    pub floor_tiles: Vec<EntityId>,
    pub walls: Vec<EntityId>,
    grid: Grid,
    config: MazeConfiguration,
}

impl Maze {
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn config(&self) -> &MazeConfiguration {
        &self.config
    }

    /// Local-space bounds of the maze geometry
    pub fn local_bounds(&self) -> (Vec3, Vec3) {
        self.config.bounds(self.grid.rows(), self.grid.columns())
    }

    /// Set the root's scale to `factor` without moving the root.
    ///
    /// Scale is absolute, not compounded: `scale(2.0)` twice leaves the
    /// subtree at 2x.
    pub fn scale(&self, scene: &mut Scene, factor: f32) {
        let Some(t) = scene.transform_mut(self.root) else {
            return;
        };
        let original_position = t.translation;
        t.scale = Vec3::ONE;
        t.translation = Vec3::ZERO;
        t.scale *= factor;
        t.translation = original_position;
    }

    /// Scale for display and center the maze on its parent, resting its
    /// lowest point half a bounds-height up
    pub fn fit_to_parent(&self, scene: &mut Scene, display_scale: f32) {
        self.scale(scene, display_scale);
        let (min, max) = self.local_bounds();
        let center = (min + max) * 0.5 * display_scale;
        let height = (max.y - min.y) * display_scale;
        if let Some(t) = scene.transform_mut(self.root) {
            t.translation = Vec3::new(-center.x, height / 2.0, -center.z);
        }
    }

    /// Put the ball back at the start with a freshly built body.
    ///
    /// The old body is replaced in one insert, so the ball is never without a
    /// body and never has two.
    pub fn reset_ball_position(&self, scene: &mut Scene) {
        if let Some(t) = scene.transform_mut(self.ball) {
            t.translation = self.config.start_position;
            t.rotation = Quat::IDENTITY;
        }
        scene.insert_body(self.ball, ball_body(&self.config));
    }

    /// Whether `id` is a star trigger root still present in the scene
    pub fn is_live_star(&self, scene: &Scene, id: EntityId) -> bool {
        scene.is_alive(id) && self.stars.iter().any(|s| s.root == id)
    }

    pub fn is_hole(&self, id: EntityId) -> bool {
        self.holes.contains(&id)
    }

    /// Detach a star's whole subtree; returns false if it was not ours
    pub fn remove_star(&mut self, scene: &mut Scene, root: EntityId) -> bool {
        let Some(index) = self.stars.iter().position(|s| s.root == root) else {
            return false;
        };
        let star = self.stars.remove(index);
        scene.despawn_recursive(star.root);
        true
    }

    /// Rotate every star's visual child to `angle` about +Y
    pub fn set_star_spin(&self, scene: &mut Scene, angle: f32) {
        let rotation = Quat::from_rotation_y(angle);
        for star in &self.stars {
            if let Some(t) = scene.transform_mut(star.visual) {
                t.rotation = rotation;
            }
        }
    }

    /// Remove the whole subtree, including every physics body in it
    pub fn despawn(self, scene: &mut Scene) {
        scene.despawn_recursive(self.root);
    }
}

/// Fresh dynamic body for the ball at rest
fn ball_body(config: &MazeConfiguration) -> RigidBody {
    RigidBody::dynamic(config.ball_mass, config.ball_material)
        .with_damping(0.0, 0.0)
        .with_ccd(true)
}

/// Builds maze scenes from grids
#[derive(Debug, Clone, Default)]
pub struct MazeBuilder {
    config: MazeConfiguration,
}

impl MazeBuilder {
    pub fn new(config: MazeConfiguration) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MazeConfiguration {
        &self.config
    }

    /// Build the scene subtree for `grid` under `parent` (or as a root)
    pub fn build<R: Rng + ?Sized>(
        &self,
        scene: &mut Scene,
        parent: Option<EntityId>,
        grid: Grid,
        rng: &mut R,
    ) -> Maze {
        let config = &self.config;
        let root = match parent {
            Some(p) => scene.spawn_child(p, Transform::IDENTITY),
            None => scene.spawn(Transform::IDENTITY),
        };
        scene.set_name(root, "mazeScene");

        let (floor_tiles, holes) = self.build_floor(scene, root, &grid, rng);

        let mut walls = Vec::new();
        for (row, column, code) in grid.iter() {
            let center = config.cell_center(row, column);
            let y = config.wall_height / 2.0;
            match code {
                CellCode::Empty => {}
                CellCode::Horizontal => walls.push(self.spawn_wall(
                    scene,
                    root,
                    Vec3::new(center.x, y, center.z),
                    Vec3::new(config.cell_size, config.wall_height, config.wall_thickness),
                )),
                CellCode::Vertical => walls.push(self.spawn_wall(
                    scene,
                    root,
                    Vec3::new(center.x, y, center.z),
                    Vec3::new(config.wall_thickness, config.wall_height, config.cell_size),
                )),
                corner => {
                    if let Some(corner) = Corner::from_code(corner) {
                        walls.extend(self.spawn_corner(scene, root, center, corner));
                    }
                }
            }
        }
        walls.extend(self.spawn_outer_walls(scene, root, grid.rows(), grid.columns()));

        let ball = self.spawn_ball(scene, root);
        let (finish_row, finish_column) = grid.finish();
        let finish = self.spawn_finish(
            scene,
            root,
            config.cell_center(finish_row, finish_column) + Vec3::new(0.0, 0.005, 0.0),
        );
        let stars = self.place_stars(scene, root, &grid, rng);

        log::debug!(
            "Built {}x{} maze: {} walls, {} holes, {} stars",
            grid.rows(),
            grid.columns(),
            walls.len(),
            holes.len(),
            stars.len()
        );

        Maze {
            root,
            ball,
            finish,
            stars,
            holes,
            floor_tiles,
            walls,
            grid,
            config: config.clone(),
        }
    }

    /// Cells that may become holes: open interior cells away from start and finish
    fn is_hole_candidate(grid: &Grid, row: usize, column: usize) -> bool {
        grid.get(row, column).is_empty()
            && !grid.is_border(row, column)
            && (row, column) != Grid::START
            && !grid.finish_approach().contains(&(row, column))
    }

    fn build_floor<R: Rng + ?Sized>(
        &self,
        scene: &mut Scene,
        root: EntityId,
        grid: &Grid,
        rng: &mut R,
    ) -> (Vec<EntityId>, Vec<EntityId>) {
        let config = &self.config;
        let container = scene.spawn_child(root, Transform::IDENTITY);
        scene.set_name(container, "floor");

        let tile_size = Vec3::new(config.cell_size, config.floor_height, config.cell_size);
        let mut tiles = Vec::new();
        let mut holes = Vec::new();

        for (row, column, _) in grid.iter() {
            let position = config.cell_center(row, column) + Vec3::new(0.0, config.floor_y(), 0.0);

            if Self::is_hole_candidate(grid, row, column) && rng.random_bool(config.hole_chance) {
                let hole = scene.spawn_child(root, Transform::from_translation(position));
                scene.set_name(hole, format!("hole_{row}_{column}"));
                scene.insert_mesh(
                    hole,
                    Mesh::new(MeshKind::Cuboid { size: config.hole_size }, colors::CLEAR).hidden(),
                );
                scene.insert_collider(hole, Collider::trigger(ColliderShape::cuboid(config.hole_size)));
                holes.push(hole);
                continue;
            }

            let tile = scene.spawn_child(container, Transform::from_translation(position));
            scene.insert_mesh(tile, Mesh::new(MeshKind::Cuboid { size: tile_size }, colors::FLOOR));
            scene.insert_body(tile, RigidBody::fixed(config.surface_material));
            scene.insert_collider(
                tile,
                Collider::solid(ColliderShape::cuboid(tile_size), config.surface_material),
            );
            tiles.push(tile);
        }

        (tiles, holes)
    }

    fn spawn_wall(&self, scene: &mut Scene, parent: EntityId, position: Vec3, size: Vec3) -> EntityId {
        let config = &self.config;
        let wall = scene.spawn_child(parent, Transform::from_translation(position));
        scene.set_name(wall, "wall");
        scene.insert_mesh(wall, Mesh::new(MeshKind::Cuboid { size }, colors::WALL));

        let collision_size = (size - Vec3::splat(config.wall_collider_inset)).max(Vec3::splat(1e-3));
        scene.insert_body(wall, RigidBody::fixed(config.surface_material));
        scene.insert_collider(
            wall,
            Collider::solid(ColliderShape::cuboid(collision_size), config.surface_material),
        );
        wall
    }

    /// Two half-length prisms meeting in the corner's quadrant
    fn spawn_corner(
        &self,
        scene: &mut Scene,
        parent: EntityId,
        center: Vec3,
        corner: Corner,
    ) -> [EntityId; 2] {
        let config = &self.config;
        let half_cell = config.cell_size / 2.0;
        let quarter_cell = config.cell_size / 4.0;
        let y = config.wall_height / 2.0;
        let (sx, sz) = corner.signs();

        let along_x = self.spawn_wall(
            scene,
            parent,
            Vec3::new(center.x + sx * quarter_cell, y, center.z + sz * half_cell),
            Vec3::new(half_cell, config.wall_height, config.wall_thickness),
        );
        let along_z = self.spawn_wall(
            scene,
            parent,
            Vec3::new(center.x + sx * half_cell, y, center.z + sz * quarter_cell),
            Vec3::new(config.wall_thickness, config.wall_height, half_cell),
        );
        [along_x, along_z]
    }

    /// Boundary enclosing the full grid extent, independent of border codes
    fn spawn_outer_walls(
        &self,
        scene: &mut Scene,
        root: EntityId,
        rows: usize,
        columns: usize,
    ) -> [EntityId; 4] {
        let config = &self.config;
        let container = scene.spawn_child(root, Transform::IDENTITY);
        scene.set_name(container, "outerWalls");

        let width = columns as f32 * config.cell_size;
        let depth = rows as f32 * config.cell_size;
        let y = config.wall_height / 2.0;
        let across = Vec3::new(width, config.wall_height, config.wall_thickness);
        let along = Vec3::new(config.wall_thickness, config.wall_height, depth);

        [
            self.spawn_wall(scene, container, Vec3::new(width / 2.0, y, 0.0), across),
            self.spawn_wall(scene, container, Vec3::new(width / 2.0, y, depth), across),
            self.spawn_wall(scene, container, Vec3::new(0.0, y, depth / 2.0), along),
            self.spawn_wall(scene, container, Vec3::new(width, y, depth / 2.0), along),
        ]
    }

    fn spawn_ball(&self, scene: &mut Scene, root: EntityId) -> EntityId {
        let config = &self.config;
        let ball = scene.spawn_child(root, Transform::from_translation(config.start_position));
        scene.set_name(ball, "ball");
        scene.insert_mesh(
            ball,
            Mesh::new(MeshKind::Sphere { radius: config.ball_radius }, colors::BALL),
        );
        scene.insert_body(ball, ball_body(config));
        scene.insert_collider(
            ball,
            Collider::solid(
                ColliderShape::Ball {
                    radius: config.ball_radius,
                },
                config.ball_material,
            ),
        );
        ball
    }

    fn spawn_finish(&self, scene: &mut Scene, root: EntityId, position: Vec3) -> EntityId {
        let size = self.config.finish_size;
        let finish = scene.spawn_child(root, Transform::from_translation(position));
        scene.set_name(finish, "finish");
        scene.insert_mesh(finish, Mesh::new(MeshKind::Cuboid { size }, colors::FINISH));
        scene.insert_body(finish, RigidBody::fixed(self.config.surface_material));
        scene.insert_collider(finish, Collider::trigger(ColliderShape::cuboid(size)));
        finish
    }

    fn place_stars<R: Rng + ?Sized>(
        &self,
        scene: &mut Scene,
        root: EntityId,
        grid: &Grid,
        rng: &mut R,
    ) -> Vec<StarEntities> {
        let config = &self.config;
        let finish = grid.finish();
        let mut candidates: Vec<(usize, usize)> = grid
            .iter()
            .filter(|&(r, c, code)| code.is_empty() && (r, c) != Grid::START && (r, c) != finish)
            .map(|(r, c, _)| (r, c))
            .collect();
        candidates.shuffle(rng);

        candidates
            .into_iter()
            .take(config.max_stars)
            .map(|(row, column)| {
                let position = config.cell_center(row, column) + Vec3::new(0.0, config.star_height, 0.0);
                self.spawn_star(scene, root, position)
            })
            .collect()
    }

    fn spawn_star(&self, scene: &mut Scene, root: EntityId, position: Vec3) -> StarEntities {
        let config = &self.config;
        let star_root = scene.spawn_child(root, Transform::from_translation(position));
        scene.set_name(star_root, "starRoot");
        scene.insert_collider(
            star_root,
            Collider::trigger(ColliderShape::cuboid(Vec3::splat(config.star_trigger_size))),
        );

        let mesh = Mesh::new(
            MeshKind::Star {
                radius: config.star_radius,
                depth: config.star_depth,
            },
            colors::STAR,
        )
        .metallic();
        let visual = scene.spawn_child(
            star_root,
            Transform::from_translation(Vec3::new(0.0, mesh.height() / 2.0, 0.0)),
        );
        scene.set_name(visual, "starVisual");
        scene.insert_mesh(visual, mesh);

        StarEntities {
            root: star_root,
            visual,
        }
    }
}
