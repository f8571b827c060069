//! Entity-component scene store
//!
//! Entities are opaque, never-reused ids. Components live in parallel tables
//! keyed by id, iterated in id order so simulation stays deterministic:
//! - transform + hierarchy (parent/children)
//! - mesh (visual only)
//! - rigid body and collider (physics)
//! - name (debugging only, never used for gameplay matching)

pub mod transform;

use std::collections::BTreeMap;
use std::fmt;

use glam::Mat4;
use serde::{Deserialize, Serialize};

use crate::mesh::Mesh;
use crate::physics::{Collider, RigidBody};

pub use transform::{Pose, Transform, WorldPose};

/// Stable entity identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The scene: every node and its optional components
#[derive(Debug, Default)]
pub struct Scene {
    next_id: u64,
    transforms: BTreeMap<EntityId, Transform>,
    parents: BTreeMap<EntityId, EntityId>,
    children: BTreeMap<EntityId, Vec<EntityId>>,
    meshes: BTreeMap<EntityId, Mesh>,
    bodies: BTreeMap<EntityId, RigidBody>,
    colliders: BTreeMap<EntityId, Collider>,
    names: BTreeMap<EntityId, String>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Default::default()
        }
    }

    fn allocate(&mut self) -> EntityId {
        // Default-constructed scenes start at 0; skip it so ids are always non-zero
        self.next_id = self.next_id.max(1);
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Spawn a root node
    pub fn spawn(&mut self, transform: Transform) -> EntityId {
        let id = self.allocate();
        self.transforms.insert(id, transform);
        id
    }

    /// Spawn a node under `parent`
    pub fn spawn_child(&mut self, parent: EntityId, transform: Transform) -> EntityId {
        let id = self.spawn(transform);
        self.parents.insert(id, parent);
        self.children.entry(parent).or_default().push(id);
        id
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        self.transforms.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Remove an entity, its whole subtree, and every component they carry
    pub fn despawn_recursive(&mut self, id: EntityId) {
        if !self.is_alive(id) {
            return;
        }
        if let Some(parent) = self.parents.remove(&id) {
            if let Some(siblings) = self.children.get_mut(&parent) {
                siblings.retain(|&c| c != id);
            }
        }

        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            if let Some(kids) = self.children.remove(&node) {
                stack.extend(kids);
            }
            self.parents.remove(&node);
            self.transforms.remove(&node);
            self.meshes.remove(&node);
            self.bodies.remove(&node);
            self.colliders.remove(&node);
            self.names.remove(&node);
        }
    }

    pub fn parent(&self, id: EntityId) -> Option<EntityId> {
        self.parents.get(&id).copied()
    }

    pub fn children(&self, id: EntityId) -> &[EntityId] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn transform(&self, id: EntityId) -> Option<&Transform> {
        self.transforms.get(&id)
    }

    pub fn transform_mut(&mut self, id: EntityId) -> Option<&mut Transform> {
        self.transforms.get_mut(&id)
    }

    /// Local-to-world matrix of the node's parent (identity for roots)
    pub fn parent_matrix(&self, id: EntityId) -> Mat4 {
        self.parent(id)
            .map(|p| self.world_matrix(p))
            .unwrap_or(Mat4::IDENTITY)
    }

    /// Local-to-world matrix, composed through the hierarchy
    pub fn world_matrix(&self, id: EntityId) -> Mat4 {
        let mut m = Mat4::IDENTITY;
        let mut node = Some(id);
        while let Some(n) = node {
            if let Some(t) = self.transforms.get(&n) {
                m = t.matrix() * m;
            }
            node = self.parent(n);
        }
        m
    }

    pub fn world_pose(&self, id: EntityId) -> WorldPose {
        WorldPose::from_matrix(self.world_matrix(id))
    }

    // === Components ===

    pub fn set_name(&mut self, id: EntityId, name: impl Into<String>) {
        if self.is_alive(id) {
            self.names.insert(id, name.into());
        }
    }

    pub fn name(&self, id: EntityId) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    pub fn insert_mesh(&mut self, id: EntityId, mesh: Mesh) {
        if self.is_alive(id) {
            self.meshes.insert(id, mesh);
        }
    }

    pub fn mesh(&self, id: EntityId) -> Option<&Mesh> {
        self.meshes.get(&id)
    }

    pub fn meshes(&self) -> impl Iterator<Item = (EntityId, &Mesh)> {
        self.meshes.iter().map(|(id, m)| (*id, m))
    }

    /// Attach a rigid body, replacing any existing one in a single step
    pub fn insert_body(&mut self, id: EntityId, body: RigidBody) -> Option<RigidBody> {
        if !self.is_alive(id) {
            return None;
        }
        self.bodies.insert(id, body)
    }

    pub fn body(&self, id: EntityId) -> Option<&RigidBody> {
        self.bodies.get(&id)
    }

    pub fn body_mut(&mut self, id: EntityId) -> Option<&mut RigidBody> {
        self.bodies.get_mut(&id)
    }

    pub fn bodies(&self) -> impl Iterator<Item = (EntityId, &RigidBody)> {
        self.bodies.iter().map(|(id, b)| (*id, b))
    }

    pub fn insert_collider(&mut self, id: EntityId, collider: Collider) {
        if self.is_alive(id) {
            self.colliders.insert(id, collider);
        }
    }

    pub fn collider(&self, id: EntityId) -> Option<&Collider> {
        self.colliders.get(&id)
    }

    pub fn colliders(&self) -> impl Iterator<Item = (EntityId, &Collider)> {
        self.colliders.iter().map(|(id, c)| (*id, c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{BodyKind, ColliderShape, PhysicsMaterial};
    use glam::{Quat, Vec3};

    #[test]
    fn test_ids_are_never_reused() {
        let mut scene = Scene::new();
        let a = scene.spawn(Transform::IDENTITY);
        scene.despawn_recursive(a);
        let b = scene.spawn(Transform::IDENTITY);
        assert_ne!(a, b);
        assert!(!scene.is_alive(a));
        assert!(scene.is_alive(b));
    }

    #[test]
    fn test_despawn_removes_subtree_and_components() {
        let mut scene = Scene::new();
        let root = scene.spawn(Transform::IDENTITY);
        let child = scene.spawn_child(root, Transform::IDENTITY);
        let grandchild = scene.spawn_child(child, Transform::IDENTITY);
        let sibling = scene.spawn(Transform::IDENTITY);
        scene.insert_body(
            grandchild,
            RigidBody::new(BodyKind::Static, 0.0, PhysicsMaterial::default()),
        );
        scene.insert_collider(
            grandchild,
            Collider::solid(ColliderShape::Ball { radius: 1.0 }, PhysicsMaterial::default()),
        );

        scene.despawn_recursive(child);

        assert!(scene.is_alive(root));
        assert!(scene.is_alive(sibling));
        assert!(!scene.is_alive(child));
        assert!(!scene.is_alive(grandchild));
        assert!(scene.body(grandchild).is_none());
        assert!(scene.collider(grandchild).is_none());
        assert!(scene.children(root).is_empty());
    }

    #[test]
    fn test_world_matrix_composes_hierarchy() {
        let mut scene = Scene::new();
        let root = scene.spawn(
            Transform::from_translation(Vec3::new(1.0, 0.0, 0.0)).with_scale(Vec3::splat(2.0)),
        );
        let pivot = scene.spawn_child(
            root,
            Transform::IDENTITY.with_rotation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2)),
        );
        let leaf = scene.spawn_child(pivot, Transform::from_translation(Vec3::X));

        let pose = scene.world_pose(leaf);
        // X rotated 90° about Y is -Z, scaled by 2, offset by root translation
        assert!((pose.translation - Vec3::new(1.0, 0.0, -2.0)).length() < 1e-5);
        assert!((pose.scale - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_components_on_dead_entities_are_ignored() {
        let mut scene = Scene::new();
        let id = scene.spawn(Transform::IDENTITY);
        scene.despawn_recursive(id);
        let body = RigidBody::new(BodyKind::Static, 0.0, PhysicsMaterial::default());
        assert!(scene.insert_body(id, body).is_none());
        assert!(scene.body(id).is_none());
    }
}
