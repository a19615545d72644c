//! Velocity/acceleration driven motion
//!
//! A [`Movement`] component integrates its owner's world-space position and
//! orientation each frame. Direction and magnitude are stored separately:
//! velocity is a unit direction, speed is a signed scalar, and optional
//! min/max bounds clamp the speed after acceleration is applied.

use crate::foundation::math::{Mat3, Quat, Vec3, DEGENERATE_SCALE};
use crate::scene::component::{Component, ComponentKind, TypedComponent, UpdateContext};
use crate::scene::graph::{NodeId, SceneGraph};

/// World-space kinematic motion for the owning node
///
/// Angular velocity is a unit Euler axis mix in radians; angular speed
/// scales it the same way linear speed scales the linear direction.
#[derive(Default)]
pub struct Movement {
    velocity: Vec3,
    angular_velocity: Vec3,
    speed: f32,
    acceleration: f32,
    min_speed: f32,
    max_speed: f32,
    angular_speed: f32,
    angular_acceleration: f32,
    min_angular_speed: f32,
    max_angular_speed: f32,
}

/// Clamp in min-then-max order, so with an inverted range the max bound
/// wins. Avoids `f32::clamp`, which panics when `min > max`.
fn clamp_speed(value: f32, min: f32, max: f32) -> f32 {
    let value = if value < min { min } else { value };
    if value > max {
        max
    } else {
        value
    }
}

impl Movement {
    /// Create a movement component at rest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the movement direction. The vector is normalized; a zero vector
    /// stops linear motion.
    pub fn set_velocity(&mut self, velocity: Vec3) {
        let length = velocity.norm();
        self.velocity = if length > 0.0 {
            velocity / length
        } else {
            Vec3::zeros()
        };
    }

    /// Unit movement direction (zero when at rest)
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Direction scaled by the current speed
    pub fn velocity_with_speed(&self) -> Vec3 {
        self.velocity * self.speed
    }

    /// Set the linear speed in units per second.
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    /// Linear speed in units per second
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Set the linear acceleration in units per second squared.
    pub fn set_acceleration(&mut self, acceleration: f32) {
        self.acceleration = acceleration;
    }

    /// Linear acceleration
    pub fn acceleration(&self) -> f32 {
        self.acceleration
    }

    /// Set the lower speed bound, raising the upper bound to keep the range
    /// ordered. Negative values are treated as zero.
    pub fn set_min_speed(&mut self, min_speed: f32) {
        self.min_speed = min_speed.max(0.0);
        if self.max_speed < self.min_speed {
            self.max_speed = self.min_speed;
        }
    }

    /// Lower speed bound
    pub fn min_speed(&self) -> f32 {
        self.min_speed
    }

    /// Set the upper speed bound, lowering the lower bound to keep the range
    /// ordered. Negative values are treated as zero.
    pub fn set_max_speed(&mut self, max_speed: f32) {
        self.max_speed = max_speed.max(0.0);
        if self.min_speed > self.max_speed {
            self.min_speed = self.max_speed;
        }
    }

    /// Upper speed bound
    pub fn max_speed(&self) -> f32 {
        self.max_speed
    }

    /// Set both speed bounds at once, unvalidated.
    pub fn set_speed_range(&mut self, min_speed: f32, max_speed: f32) {
        self.min_speed = min_speed;
        self.max_speed = max_speed;
    }

    /// Set the rotation axis mix. The vector is normalized; a zero vector
    /// stops angular motion.
    pub fn set_angular_velocity(&mut self, angular_velocity: Vec3) {
        let length = angular_velocity.norm();
        self.angular_velocity = if length > 0.0 {
            angular_velocity / length
        } else {
            Vec3::zeros()
        };
    }

    /// Unit rotation axis mix (zero when not rotating)
    pub fn angular_velocity(&self) -> Vec3 {
        self.angular_velocity
    }

    /// Axis mix scaled by the current angular speed
    pub fn angular_velocity_with_speed(&self) -> Vec3 {
        self.angular_velocity * self.angular_speed
    }

    /// Set the angular speed in radians per second.
    pub fn set_angular_speed(&mut self, angular_speed: f32) {
        self.angular_speed = angular_speed;
    }

    /// Angular speed in radians per second
    pub fn angular_speed(&self) -> f32 {
        self.angular_speed
    }

    /// Set the angular acceleration in radians per second squared.
    pub fn set_angular_acceleration(&mut self, angular_acceleration: f32) {
        self.angular_acceleration = angular_acceleration;
    }

    /// Angular acceleration
    pub fn angular_acceleration(&self) -> f32 {
        self.angular_acceleration
    }

    /// Set the lower angular speed bound, raising the upper bound to keep
    /// the range ordered.
    pub fn set_min_angular_speed(&mut self, min_angular_speed: f32) {
        self.min_angular_speed = min_angular_speed;
        if self.max_angular_speed < self.min_angular_speed {
            self.max_angular_speed = self.min_angular_speed;
        }
    }

    /// Lower angular speed bound
    pub fn min_angular_speed(&self) -> f32 {
        self.min_angular_speed
    }

    /// Set the upper angular speed bound, lowering the lower bound to keep
    /// the range ordered.
    pub fn set_max_angular_speed(&mut self, max_angular_speed: f32) {
        self.max_angular_speed = max_angular_speed;
        if self.min_angular_speed > self.max_angular_speed {
            self.min_angular_speed = self.max_angular_speed;
        }
    }

    /// Upper angular speed bound
    pub fn max_angular_speed(&self) -> f32 {
        self.max_angular_speed
    }

    /// Set both angular speed bounds at once, unvalidated.
    pub fn set_angular_speed_range(&mut self, min_angular_speed: f32, max_angular_speed: f32) {
        self.min_angular_speed = min_angular_speed;
        self.max_angular_speed = max_angular_speed;
    }

    /// Rotate `node` so its forward (+Y) axis points at `target` in world
    /// space. No-op when the node is already at the target. A degenerate
    /// `up` (parallel to the aim direction) falls back to an alternate axis.
    pub fn look_at(graph: &mut SceneGraph, node: NodeId, target: Vec3, up: Vec3) {
        let direction = target - graph.world_position(node);
        let length = direction.norm();
        if length < DEGENERATE_SCALE {
            return;
        }
        let forward = direction / length;

        let mut right = forward.cross(&up);
        if right.norm() < DEGENERATE_SCALE {
            let alternate_up = if forward.y.abs() < 0.99 {
                Vec3::new(0.0, 0.0, 1.0)
            } else {
                Vec3::new(1.0, 0.0, 0.0)
            };
            right = forward.cross(&alternate_up);
        }
        right.normalize_mut();
        let new_up = right.cross(&forward);

        let basis = Mat3::from_columns(&[right, forward, new_up]);
        graph.set_world_rotation(node, Quat::from_matrix(&basis));
    }
}

impl Component for Movement {
    fn kind(&self) -> ComponentKind {
        Self::KIND
    }

    fn update(
        &mut self,
        owner: NodeId,
        graph: &mut SceneGraph,
        _ctx: &mut UpdateContext<'_>,
        delta_time: f32,
    ) {
        if self.acceleration != 0.0 {
            self.speed += self.acceleration * delta_time;
            // Bounds apply only once a range is configured.
            if self.min_speed != 0.0 || self.max_speed != 0.0 {
                self.speed = clamp_speed(self.speed, self.min_speed, self.max_speed);
            }
        }

        if self.velocity != Vec3::zeros() && self.speed != 0.0 {
            graph.translate_world(owner, self.velocity * self.speed * delta_time);
        }

        if self.angular_acceleration != 0.0 {
            self.angular_speed += self.angular_acceleration * delta_time;
            if self.min_angular_speed != 0.0 || self.max_angular_speed != 0.0 {
                self.angular_speed = clamp_speed(
                    self.angular_speed,
                    self.min_angular_speed,
                    self.max_angular_speed,
                );
            }
        }

        if self.angular_velocity != Vec3::zeros() && self.angular_speed != 0.0 {
            graph.rotate_world_euler(
                owner,
                self.angular_velocity * self.angular_speed * delta_time,
            );
        }
    }
}

impl TypedComponent for Movement {
    const KIND: ComponentKind = ComponentKind("movement");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::TextureCache;
    use crate::foundation::math::constants::HALF_PI;
    use crate::render::RecordingRenderer;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn step(graph: &mut SceneGraph, node: NodeId, movement: &mut Movement, dt: f32) {
        let mut renderer = RecordingRenderer::new();
        let mut textures = TextureCache::new();
        let mut ctx = UpdateContext {
            renderer: &mut renderer,
            textures: &mut textures,
        };
        movement.update(node, graph, &mut ctx, dt);
    }

    #[test]
    fn velocity_is_normalized_on_set() {
        let mut movement = Movement::new();
        movement.set_velocity(Vec3::new(3.0, 0.0, 4.0));
        assert_relative_eq!(movement.velocity().norm(), 1.0, epsilon = 1e-6);
        assert_relative_eq!(movement.velocity().x, 0.6, epsilon = 1e-6);

        movement.set_velocity(Vec3::zeros());
        assert_eq!(movement.velocity(), Vec3::zeros());
    }

    #[test]
    fn moves_in_world_space_regardless_of_parent_rotation() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let parent = graph.create_node("parent");
        let child = graph.create_node("child");
        graph.add_child(root, parent);
        graph.add_child(parent, child);
        graph.set_local_rotation_euler(parent, Vec3::new(0.0, 0.0, HALF_PI));

        let mut movement = Movement::new();
        movement.set_velocity(Vec3::new(-1.0, 0.0, 0.0));
        movement.set_speed(100.0);

        step(&mut graph, child, &mut movement, 0.5);

        let position = graph.world_position(child);
        assert_relative_eq!(position.x, -50.0, epsilon = 1e-3);
        assert_relative_eq!(position.y, 0.0, epsilon = 1e-3);
    }

    #[test]
    fn no_motion_without_speed() {
        let mut graph = SceneGraph::new();
        let node = graph.create_node("n");
        let root = graph.root();
        graph.add_child(root, node);

        let mut movement = Movement::new();
        movement.set_velocity(Vec3::new(1.0, 0.0, 0.0));

        step(&mut graph, node, &mut movement, 1.0);
        assert_eq!(graph.world_position(node), Vec3::zeros());
    }

    #[test]
    fn acceleration_clamps_only_when_range_is_set() {
        let mut graph = SceneGraph::new();
        let node = graph.root();

        // Unbounded: speed integrates freely.
        let mut movement = Movement::new();
        movement.set_acceleration(10.0);
        step(&mut graph, node, &mut movement, 1.0);
        assert_relative_eq!(movement.speed(), 10.0);

        // Bounded: speed pins to the upper bound.
        let mut bounded = Movement::new();
        bounded.set_acceleration(10.0);
        bounded.set_max_speed(4.0);
        step(&mut graph, node, &mut bounded, 1.0);
        assert_relative_eq!(bounded.speed(), 4.0);
    }

    #[test]
    fn speed_bounds_keep_range_ordered() {
        let mut movement = Movement::new();
        movement.set_min_speed(5.0);
        assert_relative_eq!(movement.max_speed(), 5.0);

        movement.set_max_speed(2.0);
        assert_relative_eq!(movement.min_speed(), 2.0);

        movement.set_min_speed(-3.0);
        assert_relative_eq!(movement.min_speed(), 0.0);
    }

    #[test]
    fn angular_motion_rotates_in_world_space() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let node = graph.create_node("spinner");
        graph.add_child(root, node);

        let mut movement = Movement::new();
        movement.set_angular_velocity(Vec3::new(0.0, 0.0, 1.0));
        movement.set_angular_speed(HALF_PI);

        step(&mut graph, node, &mut movement, 1.0);

        let euler = graph.world_rotation_euler(node);
        assert_relative_eq!(euler.z, HALF_PI, epsilon = 1e-4);
    }

    #[test]
    fn look_at_points_forward_axis_at_target() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let node = graph.create_node("turret");
        graph.add_child(root, node);

        Movement::look_at(
            &mut graph,
            node,
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
        );

        let forward = graph.world_rotation(node) * Vector3::y();
        assert_relative_eq!(forward.x, 1.0, epsilon = 1e-4);
        assert_relative_eq!(forward.y, 0.0, epsilon = 1e-4);
    }

    #[test]
    fn look_at_own_position_is_a_noop() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let node = graph.create_node("n");
        graph.add_child(root, node);
        let before = graph.world_rotation(node);

        Movement::look_at(&mut graph, node, Vec3::zeros(), Vec3::new(0.0, 0.0, 1.0));

        assert_relative_eq!(graph.world_rotation(node), before);
    }
}
