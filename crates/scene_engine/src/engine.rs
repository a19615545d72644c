//! Core engine implementation
//!
//! The engine owns the collaborators (device, renderer, texture cache), the
//! frame timer, and the active scene. It is generic over the rendering
//! backend, so tests and headless tools run it against the null device.

use thiserror::Error;

use crate::application::Application;
use crate::assets::{AssetError, TextureCache};
use crate::core::config::EngineConfig;
use crate::foundation::time::Timer;
use crate::render::{GraphicsDevice, RenderError, Renderer};
use crate::scene::{Scene, SceneError, UpdateContext};

/// Engine-level errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Rendering backend failure
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Scene lifecycle failure
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// Asset loading failure during startup
    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    /// Application error propagated out of the main loop
    #[error("Application error: {0}")]
    Application(String),
}

/// Main engine struct
///
/// Coordinates the frame loop: scene swap, timing, the three update phases,
/// and frame bracketing on the device.
pub struct Engine<D: GraphicsDevice, R: Renderer> {
    /// Rendering device owning the frame lifecycle
    pub device: D,
    /// Draw-call sink handed to components
    pub renderer: R,
    /// Shared texture storage
    pub textures: TextureCache,
    scene: Option<Scene>,
    pending_scene: Option<Scene>,
    timer: Timer,
    config: EngineConfig,
    running: bool,
}

impl<D: GraphicsDevice, R: Renderer> Engine<D, R> {
    /// Create an engine, initialize the device, and preload textures from
    /// the configured directory if it exists.
    pub fn new(config: EngineConfig, mut device: D, renderer: R) -> Result<Self, EngineError> {
        log::info!("Initializing engine...");

        device.init()?;

        let mut textures = TextureCache::new();
        if config.assets.texture_dir.is_dir() {
            textures.load_directory(&config.assets.texture_dir)?;
        } else {
            log::debug!(
                "Texture directory {:?} not found, starting with an empty cache",
                config.assets.texture_dir
            );
        }

        Ok(Self {
            device,
            renderer,
            textures,
            scene: None,
            pending_scene: None,
            timer: Timer::new(),
            config,
            running: true,
        })
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Frame timer
    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    /// The active scene, if one is set
    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    /// The active scene, mutably
    pub fn scene_mut(&mut self) -> Option<&mut Scene> {
        self.scene.as_mut()
    }

    /// Borrow the active scene together with an update context, so callers
    /// can attach components outside the frame loop.
    pub fn scene_and_context(&mut self) -> Option<(&mut Scene, UpdateContext<'_>)> {
        let scene = self.scene.as_mut()?;
        Some((
            scene,
            UpdateContext {
                renderer: &mut self.renderer,
                textures: &mut self.textures,
            },
        ))
    }

    /// Replace the active scene immediately, initializing the new one.
    ///
    /// Never call this from inside a component hook; use
    /// [`Self::change_scene`] there instead.
    pub fn set_scene(&mut self, mut scene: Scene) -> Result<(), EngineError> {
        log::info!("Switching to scene {:?}", scene.name());
        let mut ctx = UpdateContext {
            renderer: &mut self.renderer,
            textures: &mut self.textures,
        };
        scene.init(&mut ctx)?;
        self.scene = Some(scene);
        Ok(())
    }

    /// Queue a scene swap for the start of the next frame. The current
    /// scene finishes its frame untouched.
    pub fn change_scene(&mut self, scene: Scene) {
        log::debug!("Scene change to {:?} queued", scene.name());
        self.pending_scene = Some(scene);
    }

    /// Ask the main loop to stop after the current frame.
    pub fn request_exit(&mut self) {
        self.running = false;
    }

    /// Whether the main loop should keep going
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Run one frame: apply a pending scene swap, tick the timer, run the
    /// update phases, and bracket the draw phase on the device.
    pub fn frame(&mut self) -> Result<(), EngineError> {
        if let Some(next) = self.pending_scene.take() {
            self.set_scene(next)?;
        }

        self.timer.tick();
        let delta_time = self.timer.delta_time();

        if let Some(scene) = &mut self.scene {
            let mut ctx = UpdateContext {
                renderer: &mut self.renderer,
                textures: &mut self.textures,
            };
            scene.pre_update(delta_time, &mut ctx);
            scene.update(delta_time, &mut ctx);
        }

        self.device.begin_frame();
        self.device.clear(self.config.window.clear_color);

        if let Some(scene) = &mut self.scene {
            let mut ctx = UpdateContext {
                renderer: &mut self.renderer,
                textures: &mut self.textures,
            };
            scene.post_update(delta_time, &mut ctx);
        }

        self.device.end_frame();
        Ok(())
    }

    /// Run the main loop with the given application until it requests exit.
    pub fn run<A: Application<D, R>>(&mut self, app: &mut A) -> Result<(), EngineError> {
        app.initialize(self)
            .map_err(|e| EngineError::Application(format!("initialization: {e}")))?;

        log::info!("Starting main loop...");

        while self.running {
            let delta_time = self.timer.delta_time();
            app.update(self, delta_time)
                .map_err(|e| EngineError::Application(format!("update: {e}")))?;
            self.frame()?;
        }

        app.cleanup(self);
        log::info!("Engine shutdown complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::AppError;
    use crate::render::{NullDevice, RecordingRenderer};

    fn headless_engine() -> Engine<NullDevice, RecordingRenderer> {
        Engine::new(
            EngineConfig::default(),
            NullDevice::new(),
            RecordingRenderer::new(),
        )
        .unwrap()
    }

    #[test]
    fn frame_brackets_the_device() {
        let mut engine = headless_engine();
        engine.frame().unwrap();
        engine.frame().unwrap();
        assert_eq!(engine.device.frames_presented(), 2);
    }

    #[test]
    fn change_scene_is_deferred_to_next_frame() {
        let mut engine = headless_engine();
        engine.set_scene(Scene::new("first")).unwrap();

        engine.change_scene(Scene::new("second"));
        assert_eq!(engine.scene().unwrap().name(), "first");

        engine.frame().unwrap();
        assert_eq!(engine.scene().unwrap().name(), "second");
    }

    #[test]
    fn run_stops_when_exit_is_requested() {
        struct CountingApp {
            updates: u32,
        }

        impl Application<NullDevice, RecordingRenderer> for CountingApp {
            fn initialize(
                &mut self,
                engine: &mut Engine<NullDevice, RecordingRenderer>,
            ) -> Result<(), AppError> {
                engine.set_scene(Scene::new("main")).map_err(|e| AppError::Custom(e.to_string()))
            }

            fn update(
                &mut self,
                engine: &mut Engine<NullDevice, RecordingRenderer>,
                _delta_time: f32,
            ) -> Result<(), AppError> {
                self.updates += 1;
                if self.updates == 3 {
                    engine.request_exit();
                }
                Ok(())
            }
        }

        let mut engine = headless_engine();
        let mut app = CountingApp { updates: 0 };
        engine.run(&mut app).unwrap();

        assert_eq!(app.updates, 3);
        assert_eq!(engine.device.frames_presented(), 3);
    }
}
