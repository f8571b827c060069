//! Built-in physics world
//!
//! Simulates dynamic spheres against static colliders in world space. Static
//! colliders follow their scene transforms, so rotating an ancestor node
//! (the maze pivot) tilts the whole tray under the ball.

use std::collections::BTreeSet;

use glam::{Quat, Vec3};

use super::sdf::{Contact, reflect, sphere_box_contact, sphere_sphere_contact};
use super::{ColliderMode, ColliderShape, ContactEvent, PhysicsEngine, PhysicsMaterial};
use crate::consts::GRAVITY;
use crate::scene::{EntityId, Scene, WorldPose};

/// Upper bound on CCD substeps per body per step
pub const MAX_CCD_SUBSTEPS: u32 = 16;

/// Collider snapshot in world space for one step
#[derive(Debug, Clone, Copy)]
struct WorldCollider {
    id: EntityId,
    center: Vec3,
    rotation: Quat,
    shape: ColliderShape,
    scale: f32,
    mode: ColliderMode,
    material: PhysicsMaterial,
}

impl WorldCollider {
    fn contact(&self, center: Vec3, radius: f32) -> Option<Contact> {
        match self.shape {
            ColliderShape::Cuboid { half_extents } => sphere_box_contact(
                center,
                radius,
                self.center,
                self.rotation,
                half_extents * self.scale,
            ),
            ColliderShape::Ball { radius: r } => {
                sphere_sphere_contact(center, radius, self.center, r * self.scale)
            }
        }
    }
}

/// Sphere-vs-static physics world
#[derive(Debug, Clone)]
pub struct PhysicsWorld {
    pub gravity: Vec3,
    /// Pairs that were touching at the end of the previous step
    touching: BTreeSet<(EntityId, EntityId)>,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsWorld {
    pub fn new() -> Self {
        Self {
            gravity: Vec3::new(0.0, -GRAVITY, 0.0),
            touching: BTreeSet::new(),
        }
    }

    pub fn with_gravity(gravity: Vec3) -> Self {
        Self {
            gravity,
            ..Self::new()
        }
    }

    fn snapshot_colliders(scene: &Scene) -> Vec<WorldCollider> {
        scene
            .colliders()
            .filter(|(id, _)| scene.body(*id).is_none_or(|b| !b.is_dynamic()))
            .map(|(id, collider)| {
                let pose = scene.world_pose(id);
                WorldCollider {
                    id,
                    center: pose.translation,
                    rotation: pose.rotation,
                    shape: collider.shape,
                    scale: pose.scale,
                    mode: collider.mode,
                    material: collider.material,
                }
            })
            .collect()
    }

    /// Integrate one dynamic sphere; returns the ids it touched
    fn step_body(
        &self,
        scene: &mut Scene,
        id: EntityId,
        statics: &[WorldCollider],
        dt: f32,
    ) -> BTreeSet<EntityId> {
        let mut touched = BTreeSet::new();

        let radius = match scene.collider(id).map(|c| c.shape) {
            Some(ColliderShape::Ball { radius }) => radius,
            _ => return touched,
        };
        let Some(body) = scene.body(id).cloned() else {
            return touched;
        };

        let pose = scene.world_pose(id);
        let radius = radius * pose.scale;
        let mut pos = pose.translation;
        let mut rot = pose.rotation;
        let mut vel = body.linear_velocity;
        let mut ang = body.angular_velocity;

        vel += self.gravity * dt;
        vel *= 1.0 / (1.0 + dt * body.linear_damping);
        ang *= 1.0 / (1.0 + dt * body.angular_damping);

        let substeps = if body.ccd && radius > 0.0 {
            let travel = vel.length() * dt;
            ((travel / (radius * 0.5)).ceil() as u32).clamp(1, MAX_CCD_SUBSTEPS)
        } else {
            1
        };
        let h = dt / substeps as f32;

        for _ in 0..substeps {
            pos += vel * h;

            for other in statics {
                let Some(contact) = other.contact(pos, radius) else {
                    continue;
                };
                touched.insert(other.id);
                if other.mode == ColliderMode::Trigger {
                    continue;
                }

                // Position correction
                let n = contact.normal;
                pos += n * contact.penetration;

                // Velocity response
                let vn = vel.dot(n);
                if vn < 0.0 {
                    let mat = body.material.combine(&other.material);
                    let normal_impulse = -(1.0 + mat.restitution) * vn;
                    // Blend from sticking (e = 0) to a full mirror (e = 1)
                    let mirrored = reflect(vel, n);
                    vel += (mirrored - vel) * (0.5 * (1.0 + mat.restitution));

                    let vt = vel - n * vel.dot(n);
                    let vt_len = vt.length();
                    if vt_len > 1e-6 {
                        let reduce = (mat.friction * normal_impulse).min(vt_len);
                        vel -= vt / vt_len * reduce;
                    }
                    // Rolling: spin to match the tangential motion
                    let vt = vel - n * vel.dot(n);
                    ang = n.cross(vt) / radius;
                }
            }

            let spin = ang * h;
            if spin.length_squared() > 0.0 {
                rot = (Quat::from_scaled_axis(spin) * rot).normalize();
            }
        }

        // Write back into the local frame
        let parent = scene.parent_matrix(id);
        let parent_rot = WorldPose::from_matrix(parent).rotation;
        let local_pos = parent.inverse().transform_point3(pos);
        let local_rot = (parent_rot.inverse() * rot).normalize();
        if let Some(t) = scene.transform_mut(id) {
            t.translation = local_pos;
            t.rotation = local_rot;
        }
        if let Some(b) = scene.body_mut(id) {
            b.linear_velocity = vel;
            b.angular_velocity = ang;
        }

        touched
    }
}

impl PhysicsEngine for PhysicsWorld {
    fn step(&mut self, scene: &mut Scene, dt: f32) -> Vec<ContactEvent> {
        let statics = Self::snapshot_colliders(scene);
        let dynamic: Vec<EntityId> = scene
            .bodies()
            .filter(|(_, b)| b.is_dynamic())
            .map(|(id, _)| id)
            .collect();

        let mut now_touching = BTreeSet::new();
        for id in dynamic {
            for other in self.step_body(scene, id, &statics, dt) {
                now_touching.insert((id, other));
            }
        }

        let began: Vec<ContactEvent> = now_touching
            .difference(&self.touching)
            .map(|&(a, b)| ContactEvent::new(a, b))
            .collect();
        self.touching = now_touching;
        began
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{Collider, RigidBody};
    use crate::scene::Transform;

    fn floor(scene: &mut Scene, parent: Option<EntityId>) -> EntityId {
        let t = Transform::from_translation(Vec3::new(0.0, -0.5, 0.0));
        let id = match parent {
            Some(p) => scene.spawn_child(p, t),
            None => scene.spawn(t),
        };
        let mat = PhysicsMaterial::new(0.01, 0.01);
        scene.insert_body(id, RigidBody::fixed(mat));
        scene.insert_collider(
            id,
            Collider::solid(ColliderShape::cuboid(Vec3::new(10.0, 1.0, 10.0)), mat),
        );
        id
    }

    fn ball(scene: &mut Scene, parent: Option<EntityId>, pos: Vec3) -> EntityId {
        let t = Transform::from_translation(pos);
        let id = match parent {
            Some(p) => scene.spawn_child(p, t),
            None => scene.spawn(t),
        };
        let mat = PhysicsMaterial::new(0.01, 0.05);
        scene.insert_body(id, RigidBody::dynamic(10.0, mat).with_ccd(true));
        scene.insert_collider(id, Collider::solid(ColliderShape::Ball { radius: 0.1 }, mat));
        id
    }

    #[test]
    fn test_ball_comes_to_rest_on_floor() {
        let mut scene = Scene::new();
        floor(&mut scene, None);
        let b = ball(&mut scene, None, Vec3::new(0.0, 1.0, 0.0));
        let mut world = PhysicsWorld::new();
        for _ in 0..600 {
            world.step(&mut scene, 1.0 / 120.0);
        }
        let y = scene.world_pose(b).translation.y;
        assert!((y - 0.1).abs() < 0.01, "ball rests on floor, y = {y}");
    }

    #[test]
    fn test_contact_began_reported_once() {
        let mut scene = Scene::new();
        let f = floor(&mut scene, None);
        let b = ball(&mut scene, None, Vec3::new(0.0, 0.2, 0.0));
        let mut world = PhysicsWorld::new();
        let mut began = 0;
        for _ in 0..240 {
            began += world
                .step(&mut scene, 1.0 / 120.0)
                .iter()
                .filter(|e| e.a == b && e.b == f)
                .count();
        }
        assert_eq!(began, 1);
    }

    #[test]
    fn test_trigger_reports_without_response() {
        let mut scene = Scene::new();
        let t = scene.spawn(Transform::IDENTITY);
        scene.insert_collider(t, Collider::trigger(ColliderShape::cuboid(Vec3::splat(1.0))));
        let b = ball(&mut scene, None, Vec3::ZERO);
        let mut world = PhysicsWorld::with_gravity(Vec3::ZERO);
        let events = world.step(&mut scene, 1.0 / 120.0);
        assert_eq!(events, vec![ContactEvent::new(b, t)]);
        assert_eq!(scene.world_pose(b).translation, Vec3::ZERO);
    }

    #[test]
    fn test_ccd_prevents_tunneling_through_thin_wall() {
        let mut scene = Scene::new();
        let wall = scene.spawn(Transform::from_translation(Vec3::new(1.0, 0.0, 0.0)));
        scene.insert_body(wall, RigidBody::fixed(PhysicsMaterial::default()));
        scene.insert_collider(
            wall,
            Collider::solid(
                ColliderShape::cuboid(Vec3::new(0.02, 2.0, 2.0)),
                PhysicsMaterial::default(),
            ),
        );
        let b = ball(&mut scene, None, Vec3::ZERO);
        if let Some(body) = scene.body_mut(b) {
            // 0.5 m per step at 120 Hz: far more than the wall thickness
            body.linear_velocity = Vec3::new(60.0, 0.0, 0.0);
        }
        let mut world = PhysicsWorld::with_gravity(Vec3::ZERO);
        for _ in 0..10 {
            world.step(&mut scene, 1.0 / 120.0);
        }
        assert!(scene.world_pose(b).translation.x < 1.0);
    }

    #[test]
    fn test_tilted_parent_makes_ball_roll_downhill() {
        let mut scene = Scene::new();
        let pivot = scene.spawn(
            Transform::IDENTITY.with_rotation(Quat::from_rotation_z(0.3)),
        );
        floor(&mut scene, Some(pivot));
        let b = ball(&mut scene, Some(pivot), Vec3::new(0.0, 0.1, 0.0));
        let mut world = PhysicsWorld::new();
        for _ in 0..120 {
            world.step(&mut scene, 1.0 / 120.0);
        }
        // Positive rotation about Z raises the +X edge
        let x = scene.world_pose(b).translation.x;
        assert!(x < -0.05, "ball should roll downhill, x = {x}");
        let body = scene.body(b).expect("ball body");
        assert!(body.angular_velocity.length() > 0.0);
    }

    #[test]
    fn test_elastic_bounce_mirrors_velocity() {
        let mut scene = Scene::new();
        let bouncy = PhysicsMaterial::new(0.0, 1.0);
        let f = scene.spawn(Transform::from_translation(Vec3::new(0.0, -0.5, 0.0)));
        scene.insert_body(f, RigidBody::fixed(bouncy));
        scene.insert_collider(f, Collider::solid(ColliderShape::cuboid(Vec3::ONE), bouncy));
        let b = scene.spawn(Transform::from_translation(Vec3::new(0.0, 0.105, 0.0)));
        scene.insert_body(b, RigidBody::dynamic(1.0, bouncy));
        scene.insert_collider(b, Collider::solid(ColliderShape::Ball { radius: 0.1 }, bouncy));
        if let Some(body) = scene.body_mut(b) {
            body.linear_velocity = Vec3::new(0.0, -2.0, 0.0);
        }

        let mut world = PhysicsWorld::with_gravity(Vec3::ZERO);
        world.step(&mut scene, 1.0 / 120.0);

        let vel = scene.body(b).expect("ball body").linear_velocity;
        assert!(vel.abs_diff_eq(Vec3::new(0.0, 2.0, 0.0), 1e-4), "vel = {vel}");
    }
}
