//! Scene graph, transforms, and the component system
//!
//! A [`Scene`] owns a [`SceneGraph`] of nodes; each node carries a cached
//! [`Transform`](transform::Transform) and a list of components that run in
//! the three per-frame phases.

use thiserror::Error;

pub mod component;
pub mod components;
pub mod graph;
#[allow(clippy::module_inception)]
pub mod scene;
pub mod transform;

pub use component::{Component, ComponentKind, TypedComponent, UpdateContext};
pub use graph::{NodeId, SceneGraph};
pub use scene::Scene;

use crate::assets::AssetError;

/// Scene subsystem errors
#[derive(Error, Debug)]
pub enum SceneError {
    /// A component failed to initialize
    #[error("component error: {0}")]
    Component(String),

    /// Asset lookup or load failure surfaced through a component
    #[error(transparent)]
    Asset(#[from] AssetError),
}
