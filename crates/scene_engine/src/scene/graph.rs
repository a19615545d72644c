//! Arena-indexed node tree and the three-phase traversal
//!
//! Nodes live in a slab; parent and child links are [`NodeId`] keys, so the
//! back-reference to a parent is never a second owner. Destroying a node
//! removes its whole subtree from the arena.

use std::mem;

use slotmap::{new_key_type, SlotMap};

use crate::scene::component::{ComponentSlot, TypedComponent, UpdateContext};
use crate::scene::transform::Transform;
use crate::scene::SceneError;

new_key_type! {
    /// Handle to a node stored in a [`SceneGraph`]
    pub struct NodeId;
}

/// A tree element owning a transform, components, and children
pub(crate) struct Node {
    pub(crate) name: String,
    pub(crate) enabled: bool,
    pub(crate) transform: Transform,
    pub(crate) components: Vec<ComponentSlot>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) parent: Option<NodeId>,
}

impl Node {
    fn new(name: String) -> Self {
        Self {
            name,
            enabled: true,
            transform: Transform::new(),
            components: Vec::new(),
            children: Vec::new(),
            parent: None,
        }
    }
}

#[derive(Clone, Copy)]
enum Phase {
    Pre,
    Update,
    Post,
}

/// The scene hierarchy: a slab of nodes plus a designated root
///
/// Single-threaded by design; every mutation happens on the update thread
/// between frames or inside component hooks.
pub struct SceneGraph {
    pub(crate) nodes: SlotMap<NodeId, Node>,
    root: NodeId,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Create a graph containing only an enabled root node named `"root"`.
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::new("root".to_owned()));
        Self { nodes, root }
    }

    /// The root node
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes, including detached ones
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph holds no nodes (never true: the root always exists)
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `node` refers to a live node
    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(node)
    }

    /// Create a detached node; attach it with [`Self::add_child`].
    pub fn create_node(&mut self, name: impl Into<String>) -> NodeId {
        self.nodes.insert(Node::new(name.into()))
    }

    /// Node name
    ///
    /// # Panics
    /// Panics on a stale key.
    pub fn name(&self, node: NodeId) -> &str {
        &self.nodes[node].name
    }

    /// Whether the node participates in update phases
    pub fn is_enabled(&self, node: NodeId) -> bool {
        self.nodes[node].enabled
    }

    /// Enable or disable a node. A disabled node's entire subtree is skipped
    /// by every update phase.
    pub fn set_enabled(&mut self, node: NodeId, enabled: bool) {
        self.nodes[node].enabled = enabled;
    }

    /// Parent of a node, if attached
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node].parent
    }

    /// Children of a node, in execution order
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node].children
    }

    // ---- hierarchy -------------------------------------------------------

    /// Attach `child` under `parent`, reparenting it if it was attached
    /// elsewhere. The child's subtree is marked world-dirty: its world
    /// matrices now depend on a new parent chain.
    ///
    /// # Panics
    /// Panics if either key is stale or if the attachment would form a cycle.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        assert!(self.nodes.contains_key(parent), "add_child: stale parent key");
        assert!(self.nodes.contains_key(child), "add_child: stale child key");
        assert_ne!(parent, child, "add_child: node cannot parent itself");

        // Walking up from the prospective parent must never reach the child.
        let mut ancestor = Some(parent);
        while let Some(current) = ancestor {
            assert_ne!(current, child, "add_child: attachment would form a cycle");
            ancestor = self.nodes[current].parent;
        }

        if let Some(old_parent) = self.nodes[child].parent {
            self.detach(old_parent, child);
        }

        self.nodes[parent].children.push(child);
        self.nodes[child].parent = Some(parent);
        self.mark_world_dirty(child);
    }

    /// Detach `child` from `parent` by identity, clearing its parent link.
    /// No-op when `child` is not among `parent`'s children. The detached
    /// subtree stays alive (and re-attachable) until [`Self::despawn`].
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        let (Some(_), Some(_)) = (self.nodes.get(parent), self.nodes.get(child)) else {
            return;
        };
        if self.nodes[child].parent != Some(parent) {
            return;
        }
        self.detach(parent, child);
        self.mark_world_dirty(child);
    }

    fn detach(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent].children.retain(|c| *c != child);
        self.nodes[child].parent = None;
    }

    /// First direct child with the given name, if any. Not recursive.
    pub fn get_child_by_name(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.nodes[parent]
            .children
            .iter()
            .copied()
            .find(|child| self.nodes[*child].name == name)
    }

    /// Destroy a node, its components, and its whole subtree.
    pub fn despawn(&mut self, node: NodeId) {
        let Some(n) = self.nodes.get(node) else {
            return;
        };

        if let Some(parent) = n.parent {
            self.detach(parent, node);
        }

        let mut pending = vec![node];
        while let Some(current) = pending.pop() {
            if let Some(removed) = self.nodes.remove(current) {
                log::debug!("Despawned node {:?}", removed.name);
                pending.extend(removed.children);
            }
        }
    }

    /// Release a node's components and destroy all of its children. The node
    /// itself stays alive but empty.
    pub fn clear(&mut self, node: NodeId) {
        let Some(n) = self.nodes.get_mut(node) else {
            return;
        };
        n.components.clear();
        let children = mem::take(&mut n.children);
        for child in children {
            self.nodes[child].parent = None;
            self.despawn(child);
        }
    }

    // ---- components ------------------------------------------------------

    /// Construct, initialize, and attach a component, returning a reference
    /// to the stored instance. Execution order within a node is attachment
    /// order.
    ///
    /// # Panics
    /// Panics on a stale node key.
    pub fn add_component<T: TypedComponent>(
        &mut self,
        node: NodeId,
        mut component: T,
        ctx: &mut UpdateContext<'_>,
    ) -> Result<&mut T, SceneError> {
        assert!(self.nodes.contains_key(node), "add_component: stale node key");

        component.init(node, self, ctx)?;

        let slots = &mut self.nodes[node].components;
        slots.push(ComponentSlot {
            kind: T::KIND,
            enabled: true,
            initialized: true,
            owner: node,
            component: Box::new(component),
        });

        let slot = slots
            .last_mut()
            .expect("component slot was just pushed");
        Ok(slot
            .component
            .as_mut()
            .as_any_mut()
            .downcast_mut::<T>()
            .expect("component kind tag does not match its type"))
    }

    /// First attached component of the requested kind
    pub fn get_component<T: TypedComponent>(&self, node: NodeId) -> Option<&T> {
        self.nodes[node]
            .components
            .iter()
            .find(|slot| slot.kind == T::KIND)
            .and_then(|slot| slot.component.as_ref().as_any().downcast_ref::<T>())
    }

    /// First attached component of the requested kind, mutably
    pub fn get_component_mut<T: TypedComponent>(&mut self, node: NodeId) -> Option<&mut T> {
        self.nodes[node]
            .components
            .iter_mut()
            .find(|slot| slot.kind == T::KIND)
            .and_then(|slot| slot.component.as_mut().as_any_mut().downcast_mut::<T>())
    }

    /// Remove every attached component of the requested kind, returning how
    /// many were removed.
    pub fn remove_component<T: TypedComponent>(&mut self, node: NodeId) -> usize {
        let slots = &mut self.nodes[node].components;
        let before = slots.len();
        slots.retain(|slot| slot.kind != T::KIND);
        before - slots.len()
    }

    /// Whether the first component of the requested kind is enabled
    pub fn component_enabled<T: TypedComponent>(&self, node: NodeId) -> Option<bool> {
        self.nodes[node]
            .components
            .iter()
            .find(|slot| slot.kind == T::KIND)
            .map(|slot| slot.enabled)
    }

    /// Enable or disable the first component of the requested kind. The
    /// owning node checks this flag before each hook call.
    pub fn set_component_enabled<T: TypedComponent>(&mut self, node: NodeId, enabled: bool) {
        if let Some(slot) = self.nodes[node]
            .components
            .iter_mut()
            .find(|slot| slot.kind == T::KIND)
        {
            slot.enabled = enabled;
        }
    }

    // ---- dirty propagation ----------------------------------------------

    /// Recursively dirty the world matrix caches of `node` and every
    /// descendant. Local caches are untouched. This is pure bookkeeping,
    /// independent of any matrix math.
    pub fn mark_world_dirty(&mut self, node: NodeId) {
        let Some(n) = self.nodes.get_mut(node) else {
            return;
        };
        n.transform.mark_world_dirty();
        let children = n.children.clone();
        for child in children {
            self.mark_world_dirty(child);
        }
    }

    // ---- phases ----------------------------------------------------------

    /// Initialize every component, then every child, recursively from the
    /// root. Components that were already initialized at attachment are
    /// skipped, so nothing is initialized twice.
    pub fn init(&mut self, ctx: &mut UpdateContext<'_>) -> Result<(), SceneError> {
        self.init_node(self.root, ctx)
    }

    fn init_node(&mut self, node: NodeId, ctx: &mut UpdateContext<'_>) -> Result<(), SceneError> {
        let mut slots = match self.nodes.get_mut(node) {
            Some(n) => mem::take(&mut n.components),
            None => return Ok(()),
        };

        let mut result = Ok(());
        for slot in &mut slots {
            if slot.initialized {
                continue;
            }
            let owner = slot.owner;
            result = slot.component.init(owner, self, ctx);
            slot.initialized = true;
            if result.is_err() {
                break;
            }
        }
        self.restore_components(node, slots);
        result?;

        let children = match self.nodes.get(node) {
            Some(n) => n.children.clone(),
            None => return Ok(()),
        };
        for child in children {
            self.init_node(child, ctx)?;
        }
        Ok(())
    }

    /// Run the first update phase over the tree.
    pub fn pre_update(&mut self, delta_time: f32, ctx: &mut UpdateContext<'_>) {
        self.run_phase(self.root, Phase::Pre, delta_time, ctx);
    }

    /// Run the main update phase over the tree.
    pub fn update(&mut self, delta_time: f32, ctx: &mut UpdateContext<'_>) {
        self.run_phase(self.root, Phase::Update, delta_time, ctx);
    }

    /// Run the final update phase over the tree; rendering components draw
    /// here.
    pub fn post_update(&mut self, delta_time: f32, ctx: &mut UpdateContext<'_>) {
        self.run_phase(self.root, Phase::Post, delta_time, ctx);
    }

    /// Depth-first: a node's enabled components in attachment order, then
    /// its enabled children in child order. The enabled check for a subtree
    /// happens here, at the child-selection point.
    fn run_phase(
        &mut self,
        node: NodeId,
        phase: Phase,
        delta_time: f32,
        ctx: &mut UpdateContext<'_>,
    ) {
        let mut slots = match self.nodes.get_mut(node) {
            Some(n) => mem::take(&mut n.components),
            None => return,
        };

        for slot in &mut slots {
            if !slot.enabled {
                continue;
            }
            let owner = slot.owner;
            match phase {
                Phase::Pre => slot.component.pre_update(owner, self, ctx, delta_time),
                Phase::Update => slot.component.update(owner, self, ctx, delta_time),
                Phase::Post => slot.component.post_update(owner, self, ctx, delta_time),
            }
        }
        self.restore_components(node, slots);

        let children = match self.nodes.get(node) {
            Some(n) => n.children.clone(),
            None => return,
        };
        for child in children {
            if self.nodes.get(child).is_some_and(|n| n.enabled) {
                self.run_phase(child, phase, delta_time, ctx);
            }
        }
    }

    /// Put a node's taken-out component list back, keeping any components
    /// that hooks attached meanwhile. Dropped silently if the node despawned
    /// itself during the phase.
    fn restore_components(&mut self, node: NodeId, mut slots: Vec<ComponentSlot>) {
        if let Some(n) = self.nodes.get_mut(node) {
            let added = mem::take(&mut n.components);
            slots.extend(added);
            n.components = slots;
        }
    }
}
