//! Component trait and attachment records
//!
//! Components are behavior units attached to a node. Each participates in a
//! three-phase per-frame update (`pre_update`, `update`, `post_update`) plus
//! a one-time `init`. Hooks receive the owning node's id, the scene graph,
//! and the collaborator context, so behavior reaches its sibling transform
//! through the graph rather than through a global engine accessor.

use std::any::Any;
use std::fmt;

use crate::assets::TextureCache;
use crate::render::Renderer;
use crate::scene::graph::{NodeId, SceneGraph};
use crate::scene::SceneError;

/// Stable identity for a component kind.
///
/// Lookups compare tags before touching `Any`, so a `get_component` scan
/// never downcasts against a non-matching slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentKind(pub &'static str);

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Collaborators threaded through every component hook
pub struct UpdateContext<'a> {
    /// Draw-call sink for the current frame
    pub renderer: &'a mut dyn Renderer,
    /// Shared texture storage
    pub textures: &'a mut TextureCache,
}

/// Upcast helper so boxed components can be downcast at lookup time.
pub trait AsAny {
    /// Borrow as `Any`
    fn as_any(&self) -> &dyn Any;
    /// Mutably borrow as `Any`
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A pluggable behavior unit scoped to one node.
///
/// All hooks default to no-ops (`init` to success); concrete components
/// override the phases they care about. The owning node checks the enabled
/// flag before each hook call, not the component itself.
pub trait Component: AsAny + 'static {
    /// Stable tag for this component kind
    fn kind(&self) -> ComponentKind;

    /// One-time setup, run when the component is attached (or when the tree
    /// is initialized, whichever comes first).
    fn init(
        &mut self,
        owner: NodeId,
        graph: &mut SceneGraph,
        ctx: &mut UpdateContext<'_>,
    ) -> Result<(), SceneError> {
        let _ = (owner, graph, ctx);
        Ok(())
    }

    /// First update phase of the frame
    fn pre_update(
        &mut self,
        owner: NodeId,
        graph: &mut SceneGraph,
        ctx: &mut UpdateContext<'_>,
        delta_time: f32,
    ) {
        let _ = (owner, graph, ctx, delta_time);
    }

    /// Main update phase of the frame
    fn update(
        &mut self,
        owner: NodeId,
        graph: &mut SceneGraph,
        ctx: &mut UpdateContext<'_>,
        delta_time: f32,
    ) {
        let _ = (owner, graph, ctx, delta_time);
    }

    /// Final phase of the frame; rendering components issue their draw
    /// calls here.
    fn post_update(
        &mut self,
        owner: NodeId,
        graph: &mut SceneGraph,
        ctx: &mut UpdateContext<'_>,
        delta_time: f32,
    ) {
        let _ = (owner, graph, ctx, delta_time);
    }
}

/// Compile-time tag for concrete component types, used by the typed lookup
/// methods on [`SceneGraph`].
pub trait TypedComponent: Component {
    /// The tag every instance of this type reports from [`Component::kind`]
    const KIND: ComponentKind;
}

/// Attachment record pairing a boxed component with its per-node state.
pub(crate) struct ComponentSlot {
    pub(crate) kind: ComponentKind,
    pub(crate) enabled: bool,
    pub(crate) initialized: bool,
    pub(crate) owner: NodeId,
    pub(crate) component: Box<dyn Component>,
}
