//! Hierarchical transforms
//!
//! Every node owns a [`Transform`]: local position/rotation/scale plus two
//! lazily recomputed matrix caches. Mutations never recompute anything; they
//! only flag the local cache dirty, which cascades a world-dirty mark through
//! the whole subtree. The matrices are rebuilt on the next read.
//!
//! The split between the two dirty flags matters: a node whose parent moved
//! but whose own local values did not change recomputes only its world
//! matrix, reusing the cached local one.
//!
//! World-space operations live on [`SceneGraph`] because they convert
//! through the parent chain; [`Transform`] itself never sees its neighbors.

use crate::foundation::math::{
    compose_trs, euler_from_quat, extract_rotation, extract_scale, extract_translation,
    quat_from_euler, Mat4, Point3, Quat, Vec3, DEGENERATE_SCALE,
};
use crate::scene::graph::{NodeId, SceneGraph};

/// Local TRS state with cached local and world matrices
#[derive(Debug, Clone)]
pub struct Transform {
    position: Vec3,
    rotation: Quat,
    scale: Vec3,

    local_matrix: Mat4,
    world_matrix: Mat4,
    local_dirty: bool,
    world_dirty: bool,

    local_recomputes: u64,
    world_recomputes: u64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform {
    /// Create an identity transform with both caches flagged dirty
    pub fn new() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
            local_matrix: Mat4::identity(),
            world_matrix: Mat4::identity(),
            local_dirty: true,
            world_dirty: true,
            local_recomputes: 0,
            world_recomputes: 0,
        }
    }

    /// Local position
    pub fn local_position(&self) -> Vec3 {
        self.position
    }

    /// Local rotation quaternion
    pub fn local_rotation(&self) -> Quat {
        self.rotation
    }

    /// Local rotation as Euler angles in radians
    pub fn local_rotation_euler(&self) -> Vec3 {
        euler_from_quat(&self.rotation)
    }

    /// Local scale
    pub fn local_scale(&self) -> Vec3 {
        self.scale
    }

    /// Whether the local matrix cache needs a rebuild
    pub fn is_local_dirty(&self) -> bool {
        self.local_dirty
    }

    /// Whether the world matrix cache needs a rebuild
    pub fn is_world_dirty(&self) -> bool {
        self.world_dirty
    }

    /// How many times the local matrix has been rebuilt
    pub fn local_recompute_count(&self) -> u64 {
        self.local_recomputes
    }

    /// How many times the world matrix has been rebuilt
    pub fn world_recompute_count(&self) -> u64 {
        self.world_recomputes
    }

    /// Reset to identity, flagging both caches dirty
    pub fn reset(&mut self) {
        self.position = Vec3::zeros();
        self.rotation = Quat::identity();
        self.scale = Vec3::new(1.0, 1.0, 1.0);
        self.mark_local_dirty();
    }

    pub(crate) fn set_local_position(&mut self, position: Vec3) {
        self.position = position;
        self.mark_local_dirty();
    }

    pub(crate) fn set_local_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
        self.mark_local_dirty();
    }

    pub(crate) fn set_local_scale(&mut self, scale: Vec3) {
        self.scale = scale;
        self.mark_local_dirty();
    }

    /// Local dirt always implies world dirt; the graph cascades the world
    /// mark through the descendants.
    fn mark_local_dirty(&mut self) {
        self.local_dirty = true;
        self.world_dirty = true;
    }

    pub(crate) fn mark_world_dirty(&mut self) {
        self.world_dirty = true;
    }

    /// Cached local matrix, rebuilt as `translation * rotation * scale`
    /// when dirty.
    pub(crate) fn local_matrix(&mut self) -> Mat4 {
        if self.local_dirty {
            self.local_matrix = compose_trs(self.position, &self.rotation, self.scale);
            self.local_dirty = false;
            self.local_recomputes += 1;
        }
        self.local_matrix
    }

    pub(crate) fn cached_world_matrix(&self) -> Mat4 {
        self.world_matrix
    }

    pub(crate) fn store_world_matrix(&mut self, world: Mat4) {
        self.world_matrix = world;
        self.world_dirty = false;
        self.world_recomputes += 1;
    }
}

impl SceneGraph {
    /// Read access to a node's transform
    ///
    /// # Panics
    /// Panics on a stale node key.
    pub fn transform(&self, node: NodeId) -> &Transform {
        &self.nodes[node].transform
    }

    // ---- local space -----------------------------------------------------

    /// Overwrite the local position and dirty the subtree's world caches.
    pub fn set_local_position(&mut self, node: NodeId, position: Vec3) {
        self.nodes[node].transform.set_local_position(position);
        self.mark_world_dirty(node);
    }

    /// Local position of a node
    pub fn local_position(&self, node: NodeId) -> Vec3 {
        self.nodes[node].transform.local_position()
    }

    /// Overwrite the local rotation and dirty the subtree's world caches.
    pub fn set_local_rotation(&mut self, node: NodeId, rotation: Quat) {
        self.nodes[node].transform.set_local_rotation(rotation);
        self.mark_world_dirty(node);
    }

    /// Overwrite the local rotation from Euler angles in radians.
    pub fn set_local_rotation_euler(&mut self, node: NodeId, euler: Vec3) {
        self.set_local_rotation(node, quat_from_euler(euler));
    }

    /// Local rotation of a node
    pub fn local_rotation(&self, node: NodeId) -> Quat {
        self.nodes[node].transform.local_rotation()
    }

    /// Overwrite the local scale and dirty the subtree's world caches.
    pub fn set_local_scale(&mut self, node: NodeId, scale: Vec3) {
        self.nodes[node].transform.set_local_scale(scale);
        self.mark_world_dirty(node);
    }

    /// Local scale of a node
    pub fn local_scale(&self, node: NodeId) -> Vec3 {
        self.nodes[node].transform.local_scale()
    }

    /// Translate in the node's own local space.
    pub fn translate_local(&mut self, node: NodeId, offset: Vec3) {
        let position = self.local_position(node) + offset;
        self.set_local_position(node, position);
    }

    /// Compose a rotation onto the local rotation (about the local axes).
    pub fn rotate_local(&mut self, node: NodeId, delta: Quat) {
        let rotation = self.local_rotation(node) * delta;
        self.set_local_rotation(node, rotation);
    }

    /// [`Self::rotate_local`] from Euler angles in radians
    pub fn rotate_local_euler(&mut self, node: NodeId, euler: Vec3) {
        self.rotate_local(node, quat_from_euler(euler));
    }

    /// Multiply the local scale component-wise.
    pub fn scale_by_local(&mut self, node: NodeId, factor: Vec3) {
        let scale = self.local_scale(node).component_mul(&factor);
        self.set_local_scale(node, scale);
    }

    // ---- matrices --------------------------------------------------------

    /// Cached local matrix, recomputed on demand
    pub fn local_matrix(&mut self, node: NodeId) -> Mat4 {
        self.nodes[node].transform.local_matrix()
    }

    /// Cached world matrix, recomputed on demand through the parent chain
    pub fn world_matrix(&mut self, node: NodeId) -> Mat4 {
        if self.nodes[node].transform.is_world_dirty() {
            let parent_world = self.parent_world_matrix(node);
            let transform = &mut self.nodes[node].transform;
            let local = transform.local_matrix();
            transform.store_world_matrix(parent_world * local);
        }
        self.nodes[node].transform.cached_world_matrix()
    }

    fn parent_world_matrix(&mut self, node: NodeId) -> Mat4 {
        match self.nodes[node].parent {
            Some(parent) => self.world_matrix(parent),
            None => Mat4::identity(),
        }
    }

    // ---- world space -----------------------------------------------------

    /// World position, extracted from the world matrix
    pub fn world_position(&mut self, node: NodeId) -> Vec3 {
        extract_translation(&self.world_matrix(node))
    }

    /// World rotation, extracted from the scale-normalized world basis
    pub fn world_rotation(&mut self, node: NodeId) -> Quat {
        extract_rotation(&self.world_matrix(node))
    }

    /// World rotation as Euler angles in radians
    pub fn world_rotation_euler(&mut self, node: NodeId) -> Vec3 {
        euler_from_quat(&self.world_rotation(node))
    }

    /// World scale, extracted as the world basis column lengths
    pub fn world_scale(&mut self, node: NodeId) -> Vec3 {
        extract_scale(&self.world_matrix(node))
    }

    /// Place the node at a world position by converting it into the parent's
    /// local space through the inverse parent world matrix.
    pub fn set_world_position(&mut self, node: NodeId, position: Vec3) {
        let inverse_parent = self
            .parent_world_matrix(node)
            .try_inverse()
            .unwrap_or_else(Mat4::identity);
        let local = inverse_parent.transform_point(&Point3::from(position));
        self.set_local_position(node, local.coords);
    }

    /// Set a world rotation by composing with the inverse of the parent's
    /// world rotation.
    pub fn set_world_rotation(&mut self, node: NodeId, rotation: Quat) {
        let parent_rotation = match self.nodes[node].parent {
            Some(parent) => self.world_rotation(parent),
            None => Quat::identity(),
        };
        self.set_local_rotation(node, parent_rotation.inverse() * rotation);
    }

    /// [`Self::set_world_rotation`] from Euler angles in radians
    pub fn set_world_rotation_euler(&mut self, node: NodeId, euler: Vec3) {
        self.set_world_rotation(node, quat_from_euler(euler));
    }

    /// Set a world scale by dividing out the parent's world scale
    /// component-wise. A near-zero parent component cannot be divided out;
    /// the requested value is stored directly for that axis.
    pub fn set_world_scale(&mut self, node: NodeId, scale: Vec3) {
        let parent_scale = match self.nodes[node].parent {
            Some(parent) => self.world_scale(parent),
            None => Vec3::new(1.0, 1.0, 1.0),
        };

        let component = |target: f32, parent: f32| {
            if parent.abs() > DEGENERATE_SCALE {
                target / parent
            } else {
                target
            }
        };
        let local = Vec3::new(
            component(scale.x, parent_scale.x),
            component(scale.y, parent_scale.y),
            component(scale.z, parent_scale.z),
        );
        self.set_local_scale(node, local);
    }

    /// Translate by a world-space offset.
    ///
    /// Read-modify-write over the world position: the parent's rotation and
    /// scale are un-applied on the way back in, so the offset is honored in
    /// world units regardless of the ancestor chain.
    pub fn translate_world(&mut self, node: NodeId, offset: Vec3) {
        let position = self.world_position(node) + offset;
        self.set_world_position(node, position);
    }

    /// Compose a rotation in world space.
    pub fn rotate_world(&mut self, node: NodeId, delta: Quat) {
        let rotation = delta * self.world_rotation(node);
        self.set_world_rotation(node, rotation);
    }

    /// [`Self::rotate_world`] from Euler angles in radians
    pub fn rotate_world_euler(&mut self, node: NodeId, euler: Vec3) {
        self.rotate_world(node, quat_from_euler(euler));
    }

    /// Multiply the world scale component-wise.
    pub fn scale_by_world(&mut self, node: NodeId, factor: Vec3) {
        let scale = self.world_scale(node).component_mul(&factor);
        self.set_world_scale(node, scale);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::constants::HALF_PI;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-4;

    fn graph_with_child() -> (SceneGraph, NodeId) {
        let mut graph = SceneGraph::new();
        let child = graph.create_node("child");
        let root = graph.root();
        graph.add_child(root, child);
        (graph, child)
    }

    #[test]
    fn local_matrix_applies_scale_rotation_translation_in_order() {
        let mut transform = Transform::new();
        transform.set_local_position(Vec3::new(5.0, 0.0, 0.0));
        transform.set_local_rotation(Quat::from_axis_angle(&Vec3::z_axis(), HALF_PI));
        transform.set_local_scale(Vec3::new(3.0, 1.0, 1.0));

        let point = transform
            .local_matrix()
            .transform_point(&Point3::new(1.0, 0.0, 0.0));

        // Scaled to (3, 0, 0), rotated to (0, 3, 0), translated to (5, 3, 0).
        assert_relative_eq!(point, Point3::new(5.0, 3.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn mutation_flags_dirty_without_recompute() {
        let mut transform = Transform::new();
        let _ = transform.local_matrix();
        assert_eq!(transform.local_recompute_count(), 1);

        transform.set_local_position(Vec3::new(1.0, 2.0, 3.0));
        assert!(transform.is_local_dirty());
        assert!(transform.is_world_dirty());
        // Still one recompute: mutation only flags.
        assert_eq!(transform.local_recompute_count(), 1);
    }

    #[test]
    fn repeated_reads_recompute_at_most_once() {
        let (mut graph, child) = graph_with_child();
        graph.set_local_position(child, Vec3::new(1.0, 0.0, 0.0));

        let first = graph.world_matrix(child);
        let second = graph.world_matrix(child);

        assert_eq!(first, second);
        assert_eq!(graph.transform(child).world_recompute_count(), 1);
        assert_eq!(graph.transform(child).local_recompute_count(), 1);
    }

    #[test]
    fn world_matrix_composes_through_parent() {
        let (mut graph, child) = graph_with_child();
        let root = graph.root();

        graph.set_local_position(root, Vec3::new(10.0, 0.0, 0.0));
        graph.set_local_position(child, Vec3::new(0.0, 5.0, 0.0));

        let expected = graph.world_matrix(root) * graph.local_matrix(child);
        assert_relative_eq!(graph.world_matrix(child), expected, epsilon = EPSILON);
        assert_relative_eq!(
            graph.world_position(child),
            Vec3::new(10.0, 5.0, 0.0),
            epsilon = EPSILON
        );
    }

    #[test]
    fn parent_move_dirties_only_world_cache_of_child() {
        let (mut graph, child) = graph_with_child();
        let root = graph.root();

        let _ = graph.world_matrix(child);
        let local_before = graph.transform(child).local_recompute_count();

        graph.set_local_position(root, Vec3::new(1.0, 0.0, 0.0));
        assert!(graph.transform(child).is_world_dirty());
        assert!(!graph.transform(child).is_local_dirty());

        let _ = graph.world_matrix(child);
        assert_eq!(graph.transform(child).local_recompute_count(), local_before);
    }

    #[test]
    fn dirty_propagation_reaches_grandchild() {
        let (mut graph, child) = graph_with_child();
        let root = graph.root();
        let grandchild = graph.create_node("grandchild");
        graph.add_child(child, grandchild);

        graph.set_local_position(grandchild, Vec3::new(0.0, 0.0, 1.0));
        let _ = graph.world_matrix(grandchild);

        // Move the root without touching the grandchild.
        graph.set_local_position(root, Vec3::new(7.0, 0.0, 0.0));

        assert_relative_eq!(
            graph.world_position(grandchild),
            Vec3::new(7.0, 0.0, 1.0),
            epsilon = EPSILON
        );
    }

    #[test]
    fn world_position_round_trip_under_rotated_scaled_parent() {
        let (mut graph, child) = graph_with_child();
        let root = graph.root();

        graph.set_local_position(root, Vec3::new(3.0, -1.0, 0.0));
        graph.set_local_rotation(root, Quat::from_axis_angle(&Vec3::z_axis(), 0.8));
        graph.set_local_scale(root, Vec3::new(2.0, 0.5, 1.0));

        let target = Vec3::new(-4.0, 2.5, 1.0);
        graph.set_world_position(child, target);
        assert_relative_eq!(graph.world_position(child), target, epsilon = EPSILON);
    }

    #[test]
    fn world_rotation_composes_through_quaternions() {
        let (mut graph, child) = graph_with_child();
        let root = graph.root();

        graph.set_local_rotation(root, Quat::from_axis_angle(&Vec3::z_axis(), HALF_PI));

        let target = Quat::from_axis_angle(&Vec3::z_axis(), 0.3);
        graph.set_world_rotation(child, target);

        let world = graph.world_rotation(child);
        let dot = world.coords.dot(&target.coords);
        assert!(dot.abs() > 0.999, "world rotation mismatch: dot = {dot}");
    }

    #[test]
    fn world_scale_divides_out_parent_scale() {
        let (mut graph, child) = graph_with_child();
        let root = graph.root();

        graph.set_local_scale(root, Vec3::new(4.0, 2.0, 1.0));
        graph.set_world_scale(child, Vec3::new(2.0, 2.0, 2.0));

        assert_relative_eq!(
            graph.world_scale(child),
            Vec3::new(2.0, 2.0, 2.0),
            epsilon = EPSILON
        );
        assert_relative_eq!(
            graph.local_scale(child),
            Vec3::new(0.5, 1.0, 2.0),
            epsilon = EPSILON
        );
    }

    #[test]
    fn translate_world_ignores_parent_rotation() {
        let (mut graph, child) = graph_with_child();
        let root = graph.root();

        graph.set_local_rotation(root, Quat::from_axis_angle(&Vec3::z_axis(), HALF_PI));

        graph.translate_world(child, Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(
            graph.world_position(child),
            Vec3::new(1.0, 0.0, 0.0),
            epsilon = EPSILON
        );
    }

    #[test]
    fn reset_restores_identity() {
        let mut transform = Transform::new();
        transform.set_local_position(Vec3::new(1.0, 2.0, 3.0));
        transform.set_local_scale(Vec3::new(2.0, 2.0, 2.0));
        let _ = transform.local_matrix();

        transform.reset();
        assert!(transform.is_local_dirty());
        assert_eq!(transform.local_position(), Vec3::zeros());
        assert_eq!(transform.local_scale(), Vec3::new(1.0, 1.0, 1.0));
        assert_relative_eq!(transform.local_matrix(), Mat4::identity());
    }
}
