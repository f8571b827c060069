//! Session orchestration
//!
//! Owns the scene, the physics engine and the tally port for one session.
//! Hierarchy built on placement:
//!
//! ```text
//! anchor (world placement + pan offset, zoom)
//!   └─ pivot (tilt rotation)
//!        └─ maze root (display scale, centered)
//! ```
//!
//! Everything runs inside [`GameplayController::tick`] at a fixed timestep:
//! one-shot requests, the rebuild countdown, gestures, tilt, physics, then
//! contact events.

use std::f32::consts::TAU;

use glam::{Quat, Vec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::gestures::GestureState;
use super::state::{GameEvent, SessionPhase, SessionSnapshot, TickInput};
use super::tilt;
use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};
use crate::maze::{Maze, MazeBuilder, MazeGenerator};
use crate::persistence::TallyStore;
use crate::physics::{ContactEvent, PhysicsEngine, PhysicsWorld};
use crate::scene::{EntityId, Pose, Scene, Transform};
use crate::settings::Settings;

/// What a ball contact turned out to be
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContactKind {
    Finish,
    Star(EntityId),
    Hole(EntityId),
    Other,
    Stale,
}

pub struct GameplayController<S: TallyStore, P: PhysicsEngine = PhysicsWorld> {
    settings: Settings,
    scene: Scene,
    physics: P,
    store: S,
    rng: Pcg32,
    builder: MazeBuilder,

    placement: Pose,
    anchor: Option<EntityId>,
    pivot: Option<EntityId>,
    maze: Option<Maze>,

    phase: SessionPhase,
    rebuild_countdown: Option<u32>,
    gestures: GestureState,
    last_device_position: Option<Vec3>,

    session_stars: u32,
    total_stars: u64,
    star_spin: f32,
    maze_seed: Option<u64>,
    mazes_built: u32,

    accumulator: f32,
    pending_input: TickInput,
    tick_count: u64,
    events: Vec<GameEvent>,
}

impl<S: TallyStore> GameplayController<S, PhysicsWorld> {
    /// Session with the built-in physics world
    pub fn new(settings: Settings, store: S) -> Self {
        Self::with_physics(settings, store, PhysicsWorld::new())
    }
}

impl<S: TallyStore, P: PhysicsEngine> GameplayController<S, P> {
    pub fn with_physics(settings: Settings, store: S, physics: P) -> Self {
        let seed = settings.seed.unwrap_or_else(rand::random);
        log::info!("Session seed: {seed}");

        let total_stars = store.get_tally();
        log::info!("Stored star tally: {total_stars}");

        Self {
            builder: MazeBuilder::new(settings.maze.clone()),
            gestures: GestureState::new(settings.gestures),
            settings,
            scene: Scene::new(),
            physics,
            store,
            rng: Pcg32::seed_from_u64(seed),

            placement: Pose::default(),
            anchor: None,
            pivot: None,
            maze: None,

            phase: SessionPhase::NoMaze,
            rebuild_countdown: None,
            last_device_position: None,

            session_stars: 0,
            total_stars,
            star_spin: 0.0,
            maze_seed: None,
            mazes_built: 0,

            accumulator: 0.0,
            pending_input: TickInput::default(),
            tick_count: 0,
            events: Vec::new(),
        }
    }

    // === Accessors ===

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn physics_mut(&mut self) -> &mut P {
        &mut self.physics
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn maze(&self) -> Option<&Maze> {
        self.maze.as_ref()
    }

    pub fn anchor(&self) -> Option<EntityId> {
        self.anchor
    }

    pub fn pivot(&self) -> Option<EntityId> {
        self.pivot
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_solved(&self) -> bool {
        self.phase == SessionPhase::Solved
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            solved: self.is_solved(),
            session_stars: self.session_stars,
            stars_remaining: self.maze.as_ref().map_or(0, |m| m.stars.len()),
            total_stars: self.total_stars,
            rebuild_in_ticks: self.rebuild_countdown,
            maze_seed: self.maze_seed,
            mazes_built: self.mazes_built,
            pan_offset: self.gestures.pan_offset(),
            zoom: self.gestures.zoom(),
            tick: self.tick_count,
        }
    }

    /// Take every event since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    // === Lifecycle ===

    /// Anchor the session at a world pose. The first call builds the maze;
    /// later calls move the anchor and keep the current maze.
    pub fn place(&mut self, placement: Pose) {
        self.placement = placement;

        if let Some(anchor) = self.anchor {
            self.apply_anchor_transform(anchor);
            log::info!("Maze anchor moved to {:?}", placement.translation);
            return;
        }

        let anchor = self.scene.spawn(Transform::from_pose(placement));
        self.scene.set_name(anchor, "anchor");
        let pivot = self.scene.spawn_child(anchor, Transform::IDENTITY);
        self.scene.set_name(pivot, "pivot");
        self.anchor = Some(anchor);
        self.pivot = Some(pivot);
        log::info!("Maze placed at {:?}", placement.translation);

        self.build_maze();
    }

    /// Discard the current maze and build a fresh one.
    ///
    /// Cancels a pending automatic rebuild and returns pan and zoom to rest.
    pub fn recreate(&mut self) {
        if self.anchor.is_none() {
            log::debug!("Recreate ignored: maze not placed");
            return;
        }
        self.cancel_rebuild();
        self.rebuild_maze();
    }

    /// Put the ball back at the start; also clears a solved state
    pub fn reset_ball(&mut self) {
        let Some(maze) = &self.maze else {
            return;
        };
        maze.reset_ball_position(&mut self.scene);
        if self.phase == SessionPhase::Solved {
            self.phase = SessionPhase::Active;
            self.cancel_rebuild();
        }
        self.events.push(GameEvent::BallReset);
        log::info!("Ball reset");
    }

    /// Advance the star spin by one step; returns the new angle.
    ///
    /// Host-driven at ~60 Hz, independent of the simulation tick. Only star
    /// visual children are touched.
    pub fn spin_stars(&mut self) -> f32 {
        self.star_spin += self.settings.star_spin_step;
        if self.star_spin > TAU {
            self.star_spin = 0.0;
        }
        if let Some(maze) = &self.maze {
            maze.set_star_spin(&mut self.scene, self.star_spin);
        }
        self.star_spin
    }

    fn cancel_rebuild(&mut self) {
        if self.rebuild_countdown.take().is_some() {
            self.events.push(GameEvent::RebuildCancelled);
            log::info!("Pending rebuild cancelled");
        }
    }

    fn build_maze(&mut self) {
        let Some(pivot) = self.pivot else {
            return;
        };

        let seed: u64 = self.rng.random();
        let mut maze_rng = Pcg32::seed_from_u64(seed);
        let (rows, columns) = (self.settings.rows, self.settings.columns);
        let grid = MazeGenerator::generate(rows, columns, &mut maze_rng);
        log::debug!("Maze grid:\n{}", grid.to_ascii());

        let maze = self.builder.build(&mut self.scene, Some(pivot), grid, &mut maze_rng);
        maze.fit_to_parent(&mut self.scene, self.settings.display_scale);
        maze.set_star_spin(&mut self.scene, self.star_spin);

        log::info!(
            "Built {rows}x{columns} maze (seed {seed}, {} stars, {} holes)",
            maze.stars.len(),
            maze.holes.len()
        );
        self.maze = Some(maze);
        self.maze_seed = Some(seed);
        self.mazes_built += 1;
        self.phase = SessionPhase::Active;
        self.events.push(GameEvent::MazeCreated { rows, columns, seed });
    }

    /// Tear the old subtree down completely, then build the next one
    fn rebuild_maze(&mut self) {
        if let Some(old) = self.maze.take() {
            old.despawn(&mut self.scene);
        }
        self.gestures.reset();
        if let Some(anchor) = self.anchor {
            self.apply_anchor_transform(anchor);
        }
        self.build_maze();
    }

    fn apply_anchor_transform(&mut self, anchor: EntityId) {
        let translation = self.placement.translation + self.gestures.pan_offset();
        let rotation = self.placement.rotation;
        let zoom = self.gestures.zoom();
        if let Some(t) = self.scene.transform_mut(anchor) {
            t.translation = translation;
            t.rotation = rotation;
            t.scale = Vec3::splat(zoom);
        }
    }

    // === Simulation ===

    /// Run as many fixed ticks as `frame_dt` covers; returns how many ran.
    ///
    /// One-shot inputs apply to the first tick only; if the frame is too short
    /// to tick they carry over to the next frame.
    pub fn advance(&mut self, frame_dt: f32, input: &TickInput) -> u32 {
        self.accumulator += frame_dt.clamp(0.0, MAX_FRAME_DT);
        self.pending_input.merge_one_shots(input);

        let mut tick_input = input.clone();
        tick_input.clear_one_shots();
        tick_input.merge_one_shots(&self.pending_input);

        let mut ticks = 0;
        while self.accumulator >= SIM_DT && ticks < MAX_SUBSTEPS {
            self.tick(&tick_input);
            tick_input.clear_one_shots();
            self.pending_input.clear_one_shots();
            self.accumulator -= SIM_DT;
            ticks += 1;
        }
        if ticks == MAX_SUBSTEPS {
            // Drop the backlog rather than spiral
            self.accumulator = self.accumulator.min(SIM_DT);
        }
        ticks
    }

    /// One fixed simulation tick
    pub fn tick(&mut self, input: &TickInput) {
        self.tick_count += 1;

        if input.recreate {
            self.recreate();
        } else if input.reset_ball {
            self.reset_ball();
        }

        self.update_rebuild_countdown();

        if let Some(pose) = input.device_pose {
            self.last_device_position = Some(pose.translation);
        }

        let Some(anchor) = self.anchor else {
            return;
        };
        self.apply_gestures(anchor, input);
        if let Some(pose) = input.device_pose {
            self.apply_tilt(anchor, pose.translation);
        }

        let contacts = self.physics.step(&mut self.scene, SIM_DT);
        self.handle_contacts(&contacts);
    }

    fn update_rebuild_countdown(&mut self) {
        let Some(remaining) = self.rebuild_countdown else {
            return;
        };
        let remaining = remaining.saturating_sub(1);
        if remaining == 0 {
            self.rebuild_countdown = None;
            log::info!("Rebuilding solved maze");
            self.rebuild_maze();
        } else {
            self.rebuild_countdown = Some(remaining);
        }
    }

    fn apply_gestures(&mut self, anchor: EntityId, input: &TickInput) {
        if input.pan.is_none() && input.pinch.is_none() {
            return;
        }
        let anchor_position = self.scene.world_pose(anchor).translation;
        if let Some(pan) = input.pan {
            let camera = self.last_device_position.unwrap_or(anchor_position);
            self.gestures.apply_pan(pan, camera, anchor_position);
        }
        if let Some(pinch) = input.pinch {
            self.gestures.apply_pinch(pinch);
        }
        self.apply_anchor_transform(anchor);
    }

    fn apply_tilt(&mut self, anchor: EntityId, device: Vec3) {
        let Some(pivot) = self.pivot else {
            return;
        };
        let anchor_position = self.scene.world_pose(anchor).translation;
        let target = tilt::target_tilt(anchor_position, device, &self.settings.tilt);
        let smoothing = self.settings.tilt.smoothing;
        if let Some(t) = self.scene.transform_mut(pivot) {
            t.rotation = tilt::smooth_toward(t.rotation, target, smoothing);
            log::trace!("Pivot tilt {:.4} rad", t.rotation.angle_between(Quat::IDENTITY));
        }
    }

    fn classify(&self, contact: &ContactEvent) -> ContactKind {
        let Some(maze) = &self.maze else {
            return ContactKind::Stale;
        };
        let Some(other) = contact.other(maze.ball) else {
            return ContactKind::Stale;
        };
        if !self.scene.is_alive(maze.ball) || !self.scene.is_alive(other) {
            return ContactKind::Stale;
        }
        if other == maze.finish {
            ContactKind::Finish
        } else if maze.is_live_star(&self.scene, other) {
            ContactKind::Star(other)
        } else if maze.is_hole(other) {
            ContactKind::Hole(other)
        } else {
            ContactKind::Other
        }
    }

    fn handle_contacts(&mut self, contacts: &[ContactEvent]) {
        for contact in contacts {
            match self.classify(contact) {
                ContactKind::Finish => self.on_finish(),
                ContactKind::Star(star) => self.collect_star(star),
                ContactKind::Hole(hole) => log::debug!("Ball over hole {hole}; no handler"),
                ContactKind::Other => {}
                ContactKind::Stale => {
                    log::debug!("Discarding stale contact {} / {}", contact.a, contact.b)
                }
            }
        }
    }

    fn on_finish(&mut self) {
        if self.phase != SessionPhase::Active {
            return;
        }
        let ticks = self.settings.rebuild_delay_ticks();
        self.phase = SessionPhase::Solved;
        self.rebuild_countdown = Some(ticks);
        self.events.push(GameEvent::Solved);
        self.events.push(GameEvent::RebuildScheduled { ticks });
        log::info!("Maze solved; rebuilding in {ticks} ticks");
    }

    fn collect_star(&mut self, star: EntityId) {
        let Some(maze) = self.maze.as_mut() else {
            return;
        };
        if !maze.remove_star(&mut self.scene, star) {
            return;
        }
        self.session_stars += 1;
        self.total_stars = self.total_stars.saturating_add(1);
        self.store.increment_tally();
        self.events.push(GameEvent::StarCollected {
            star,
            session_stars: self.session_stars,
        });
        log::info!(
            "Star collected ({} this session, {} total)",
            self.session_stars,
            self.total_stars
        );
    }
}
