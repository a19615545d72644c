//! Named wrapper around a scene graph
//!
//! A scene is the unit the engine swaps between: it owns the node tree and
//! forwards lifecycle calls into it.

use crate::scene::graph::SceneGraph;
use crate::scene::{SceneError, UpdateContext};

/// A named node tree with a frame lifecycle
pub struct Scene {
    name: String,
    graph: SceneGraph,
}

impl Scene {
    /// Create a scene with an empty graph (just a root node).
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        log::info!("Created scene {name:?}");
        Self {
            name,
            graph: SceneGraph::new(),
        }
    }

    /// Scene name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The node tree
    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    /// The node tree, mutably
    pub fn graph_mut(&mut self) -> &mut SceneGraph {
        &mut self.graph
    }

    /// Initialize every component in the tree.
    pub fn init(&mut self, ctx: &mut UpdateContext<'_>) -> Result<(), SceneError> {
        log::debug!("Initializing scene {:?}", self.name);
        self.graph.init(ctx)
    }

    /// Run the first update phase.
    pub fn pre_update(&mut self, delta_time: f32, ctx: &mut UpdateContext<'_>) {
        self.graph.pre_update(delta_time, ctx);
    }

    /// Run the main update phase.
    pub fn update(&mut self, delta_time: f32, ctx: &mut UpdateContext<'_>) {
        self.graph.update(delta_time, ctx);
    }

    /// Run the final update phase.
    pub fn post_update(&mut self, delta_time: f32, ctx: &mut UpdateContext<'_>) {
        self.graph.post_update(delta_time, ctx);
    }

    /// Destroy everything under the root, leaving an empty tree.
    pub fn clear(&mut self) {
        log::debug!("Clearing scene {:?}", self.name);
        let root = self.graph.root();
        self.graph.clear(root);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_leaves_only_the_root() {
        let mut scene = Scene::new("test");
        let root = scene.graph().root();
        let child = scene.graph_mut().create_node("child");
        scene.graph_mut().add_child(root, child);

        scene.clear();

        assert_eq!(scene.graph().len(), 1);
        assert!(scene.graph().contains(root));
        assert_eq!(scene.name(), "test");
    }
}
