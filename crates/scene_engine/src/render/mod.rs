//! Rendering collaborator interfaces
//!
//! The scene core never talks to a graphics API directly. It draws through
//! [`Renderer`] and brackets frames through [`GraphicsDevice`]; a backend
//! implements both against real hardware. The headless implementations here
//! are used by the tests and the demo app.

use thiserror::Error;

use crate::assets::TextureKey;
use crate::foundation::math::Mat4;

/// Rendering subsystem errors
#[derive(Error, Debug)]
pub enum RenderError {
    /// Device creation or setup failure
    #[error("device initialization failed: {0}")]
    DeviceInit(String),
}

/// Issues draw calls for textured unit quads.
///
/// `world` positions, rotates, and scales the quad; the implementation is
/// assumed to succeed whenever the device is valid.
pub trait Renderer {
    /// Draw one unit quad textured with `texture`, transformed by `world`.
    fn draw(&mut self, texture: TextureKey, world: &Mat4);
}

/// Owns the device/swap-chain lifecycle around a frame's rendering.
pub trait GraphicsDevice {
    /// One-time device setup
    fn init(&mut self) -> Result<(), RenderError>;

    /// Start a frame; called before the render pass
    fn begin_frame(&mut self);

    /// Clear the back buffer to an RGBA color
    fn clear(&mut self, color: [f32; 4]);

    /// Present the frame; called after the render pass
    fn end_frame(&mut self);
}

/// A single recorded draw call
#[derive(Debug, Clone)]
pub struct DrawCall {
    /// Texture bound for the quad
    pub texture: TextureKey,
    /// World matrix applied to the quad
    pub world: Mat4,
}

/// Renderer that records draw calls instead of submitting them
#[derive(Default)]
pub struct RecordingRenderer {
    draws: Vec<DrawCall>,
}

impl RecordingRenderer {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw calls recorded since the last [`Self::reset`]
    pub fn draws(&self) -> &[DrawCall] {
        &self.draws
    }

    /// Discard recorded draw calls
    pub fn reset(&mut self) {
        self.draws.clear();
    }
}

impl Renderer for RecordingRenderer {
    fn draw(&mut self, texture: TextureKey, world: &Mat4) {
        self.draws.push(DrawCall {
            texture,
            world: *world,
        });
    }
}

/// Device that tracks frame bracketing without touching any hardware
#[derive(Default)]
pub struct NullDevice {
    frames: u64,
    in_frame: bool,
}

impl NullDevice {
    /// Create a new null device
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of completed begin/end frame pairs
    pub fn frames_presented(&self) -> u64 {
        self.frames
    }
}

impl GraphicsDevice for NullDevice {
    fn init(&mut self) -> Result<(), RenderError> {
        log::info!("Null graphics device initialized");
        Ok(())
    }

    fn begin_frame(&mut self) {
        debug_assert!(!self.in_frame, "begin_frame called twice without end_frame");
        self.in_frame = true;
    }

    fn clear(&mut self, _color: [f32; 4]) {}

    fn end_frame(&mut self) {
        debug_assert!(self.in_frame, "end_frame called outside a frame");
        self.in_frame = false;
        self.frames += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn recording_renderer_captures_draws() {
        let mut keys: SlotMap<TextureKey, ()> = SlotMap::with_key();
        let texture = keys.insert(());

        let mut renderer = RecordingRenderer::new();
        renderer.draw(texture, &Mat4::identity());
        renderer.draw(texture, &Mat4::identity());

        assert_eq!(renderer.draws().len(), 2);
        assert_eq!(renderer.draws()[0].texture, texture);

        renderer.reset();
        assert!(renderer.draws().is_empty());
    }

    #[test]
    fn null_device_counts_frames() {
        let mut device = NullDevice::new();
        device.init().unwrap();

        device.begin_frame();
        device.clear([0.0, 0.0, 0.0, 1.0]);
        device.end_frame();

        assert_eq!(device.frames_presented(), 1);
    }
}
