//! Application trait and lifecycle management

use thiserror::Error;

use crate::engine::Engine;
use crate::render::{GraphicsDevice, Renderer};
use crate::scene::SceneError;

/// Application lifecycle trait
///
/// Implement this trait to build a game on the engine. The engine calls
/// `initialize` once, `update` every frame before the scene phases run, and
/// `cleanup` on shutdown.
pub trait Application<D: GraphicsDevice, R: Renderer> {
    /// Set up initial scenes and assets.
    fn initialize(&mut self, engine: &mut Engine<D, R>) -> Result<(), AppError>;

    /// Per-frame game logic, run before the scene update phases.
    fn update(&mut self, engine: &mut Engine<D, R>, delta_time: f32) -> Result<(), AppError>;

    /// Release application resources on shutdown.
    fn cleanup(&mut self, engine: &mut Engine<D, R>) {
        let _ = engine;
    }
}

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Scene error propagated to application level
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// Custom application error
    #[error("Application error: {0}")]
    Custom(String),
}
