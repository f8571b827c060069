//! Physics port and components
//!
//! The gameplay layer drives physics only through [`PhysicsEngine`]. Engines
//! read bodies and colliders from the [`Scene`] and report contact-began
//! events carrying entity ids, never names.

pub mod sdf;
pub mod world;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::scene::{EntityId, Scene};

pub use sdf::{
    Contact, reflect, sd_box, sd_sphere, sdf_gradient, sphere_box_contact, sphere_sphere_contact,
};
pub use world::PhysicsWorld;

/// A physics engine that advances every body in a scene
pub trait PhysicsEngine {
    /// Advance the simulation by `dt` seconds and return the contacts that
    /// began during this step
    fn step(&mut self, scene: &mut Scene, dt: f32) -> Vec<ContactEvent>;
}

/// A pair of entities that started touching this step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContactEvent {
    pub a: EntityId,
    pub b: EntityId,
}

impl ContactEvent {
    pub fn new(a: EntityId, b: EntityId) -> Self {
        Self { a, b }
    }

    pub fn involves(&self, id: EntityId) -> bool {
        self.a == id || self.b == id
    }

    /// The partner of `id` in this contact, if `id` is part of it
    pub fn other(&self, id: EntityId) -> Option<EntityId> {
        if self.a == id {
            Some(self.b)
        } else if self.b == id {
            Some(self.a)
        } else {
            None
        }
    }
}

/// Surface response parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsMaterial {
    pub friction: f32,
    pub restitution: f32,
}

impl Default for PhysicsMaterial {
    fn default() -> Self {
        Self {
            friction: 0.5,
            restitution: 0.0,
        }
    }
}

impl PhysicsMaterial {
    pub fn new(friction: f32, restitution: f32) -> Self {
        Self {
            friction,
            restitution,
        }
    }

    /// Combined material for a contact between two surfaces (averaged)
    pub fn combine(&self, other: &PhysicsMaterial) -> PhysicsMaterial {
        PhysicsMaterial {
            friction: (self.friction + other.friction) * 0.5,
            restitution: (self.restitution + other.restitution) * 0.5,
        }
    }
}

/// How a body participates in simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    /// Never integrated; follows its scene transform
    Static,
    /// Integrated under gravity and contacts
    Dynamic,
}

/// A rigid body component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigidBody {
    pub kind: BodyKind,
    pub mass: f32,
    pub material: PhysicsMaterial,
    pub linear_damping: f32,
    pub angular_damping: f32,
    /// Continuous collision detection (substep fast motion)
    pub ccd: bool,
    /// World-space linear velocity
    pub linear_velocity: Vec3,
    /// World-space angular velocity (axis * rad/s)
    pub angular_velocity: Vec3,
}

impl RigidBody {
    pub fn new(kind: BodyKind, mass: f32, material: PhysicsMaterial) -> Self {
        Self {
            kind,
            mass,
            material,
            linear_damping: 0.0,
            angular_damping: 0.0,
            ccd: false,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
        }
    }

    pub fn fixed(material: PhysicsMaterial) -> Self {
        Self::new(BodyKind::Static, 0.0, material)
    }

    pub fn dynamic(mass: f32, material: PhysicsMaterial) -> Self {
        Self::new(BodyKind::Dynamic, mass, material)
    }

    pub fn with_damping(mut self, linear: f32, angular: f32) -> Self {
        self.linear_damping = linear;
        self.angular_damping = angular;
        self
    }

    pub fn with_ccd(mut self, enabled: bool) -> Self {
        self.ccd = enabled;
        self
    }

    pub fn is_dynamic(&self) -> bool {
        self.kind == BodyKind::Dynamic
    }

    pub fn is_at_rest(&self) -> bool {
        self.linear_velocity == Vec3::ZERO && self.angular_velocity == Vec3::ZERO
    }
}

/// Collision shape in the entity's local frame (before world scale)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ColliderShape {
    Cuboid { half_extents: Vec3 },
    Ball { radius: f32 },
}

impl ColliderShape {
    /// Cuboid from full edge lengths
    pub fn cuboid(size: Vec3) -> Self {
        ColliderShape::Cuboid {
            half_extents: size * 0.5,
        }
    }
}

/// Whether a collider pushes back or only reports overlap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColliderMode {
    Solid,
    Trigger,
}

/// A collider component
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Collider {
    pub shape: ColliderShape,
    pub mode: ColliderMode,
    pub material: PhysicsMaterial,
}

impl Collider {
    pub fn solid(shape: ColliderShape, material: PhysicsMaterial) -> Self {
        Self {
            shape,
            mode: ColliderMode::Solid,
            material,
        }
    }

    pub fn trigger(shape: ColliderShape) -> Self {
        Self {
            shape,
            mode: ColliderMode::Trigger,
            material: PhysicsMaterial::default(),
        }
    }

    pub fn is_trigger(&self) -> bool {
        self.mode == ColliderMode::Trigger
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Transform;

    #[test]
    fn test_contact_event_other() {
        let mut scene = Scene::new();
        let a = scene.spawn(Transform::IDENTITY);
        let b = scene.spawn(Transform::IDENTITY);
        let c = scene.spawn(Transform::IDENTITY);
        let ev = ContactEvent::new(a, b);
        assert_eq!(ev.other(a), Some(b));
        assert_eq!(ev.other(b), Some(a));
        assert_eq!(ev.other(c), None);
        assert!(!ev.involves(c));
    }

    #[test]
    fn test_material_combine_averages() {
        let m = PhysicsMaterial::new(0.2, 0.0).combine(&PhysicsMaterial::new(0.4, 1.0));
        assert!((m.friction - 0.3).abs() < 1e-6);
        assert!((m.restitution - 0.5).abs() < 1e-6);
    }
}
