//! # Scene Engine
//!
//! A 2D real-time engine built around a hierarchical scene graph with
//! cached transforms and a component-based update loop.
//!
//! ## Features
//!
//! - **Scene Graph**: Arena-indexed node tree with lazily cached local and
//!   world matrices
//! - **Components**: Pluggable per-node behavior run in three update phases
//! - **Sprites**: Textured quads with frame animation
//! - **Headless Testing**: Recording renderer and null device for running
//!   the full loop without a GPU
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_engine::prelude::*;
//!
//! fn main() -> Result<(), EngineError> {
//!     scene_engine::foundation::logging::init();
//!
//!     let config = EngineConfig::default();
//!     let mut engine = Engine::new(config, NullDevice::new(), RecordingRenderer::new())?;
//!
//!     let mut scene = Scene::new("main");
//!     let node = scene.graph_mut().create_node("player");
//!     let root = scene.graph_mut().root();
//!     scene.graph_mut().add_child(root, node);
//!     engine.set_scene(scene)?;
//!
//!     engine.frame()?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod assets;
pub mod core;
pub mod foundation;
pub mod render;
pub mod scene;

mod application;
mod engine;

pub use application::{AppError, Application};
pub use engine::{Engine, EngineError};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        assets::{ImageData, TextureCache, TextureKey},
        core::config::{EngineConfig, WindowConfig},
        foundation::{
            math::{Mat4, Quat, Vec2, Vec3},
            time::Timer,
        },
        render::{GraphicsDevice, NullDevice, RecordingRenderer, Renderer},
        scene::{
            components::{Movement, Sprite},
            Component, ComponentKind, NodeId, Scene, SceneGraph, TypedComponent, UpdateContext,
        },
        AppError, Application, Engine, EngineError,
    };
}
