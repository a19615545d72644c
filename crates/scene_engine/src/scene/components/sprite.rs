//! Textured quad rendering and frame animation
//!
//! A [`Sprite`] draws a textured quad at its owner's world transform during
//! `post_update`, and can flip through a sequence of texture frames on a
//! per-frame timer.

use crate::assets::TextureKey;
use crate::foundation::math::{Mat4, Vec2, Vec3};
use crate::scene::component::{Component, ComponentKind, TypedComponent, UpdateContext};
use crate::scene::graph::{NodeId, SceneGraph};
use crate::scene::SceneError;

/// One animation frame: a texture shown for a fixed duration
#[derive(Debug, Clone, Copy)]
struct SpriteFrame {
    texture: TextureKey,
    duration: f32,
}

/// Textured quad attached to a node
///
/// The quad is a unit square scaled to `size` and shifted by the anchor
/// point (default centered), then placed by the owner's world matrix.
pub struct Sprite {
    texture: TextureKey,
    frames: Vec<SpriteFrame>,
    playing: bool,
    looping: bool,
    size_dirty: bool,
    frame_timer: f32,
    current_frame: usize,
    size: Vec2,
    anchor: Vec2,
    on_complete: Option<Box<dyn FnMut()>>,
}

impl Sprite {
    /// Create a sprite showing `texture` at the texture's native size.
    pub fn new(texture: TextureKey) -> Self {
        Self {
            texture,
            frames: Vec::new(),
            playing: false,
            looping: true,
            size_dirty: false,
            frame_timer: 0.0,
            current_frame: 0,
            size: Vec2::zeros(),
            anchor: Vec2::new(0.5, 0.5),
            on_complete: None,
        }
    }

    /// Create a sprite showing `texture` resampled to the given size.
    pub fn with_size(texture: TextureKey, width: u32, height: u32) -> Self {
        let mut sprite = Self::new(texture);
        sprite.size = Vec2::new(width as f32, height as f32);
        sprite.size_dirty = true;
        sprite
    }

    /// Texture currently displayed
    pub fn texture(&self) -> TextureKey {
        self.texture
    }

    /// Quad size in world units
    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// Quad width in world units
    pub fn width(&self) -> u32 {
        self.size.x as u32
    }

    /// Quad height in world units
    pub fn height(&self) -> u32 {
        self.size.y as u32
    }

    /// Set the quad size. A matching size is a no-op; otherwise the backing
    /// texture is resampled before the next draw.
    pub fn set_size(&mut self, width: u32, height: u32) {
        if self.width() == width && self.height() == height {
            return;
        }
        self.size = Vec2::new(width as f32, height as f32);
        self.size_dirty = true;
    }

    /// Set only the quad width.
    pub fn set_width(&mut self, width: u32) {
        if self.width() == width {
            return;
        }
        self.size.x = width as f32;
        self.size_dirty = true;
    }

    /// Set only the quad height.
    pub fn set_height(&mut self, height: u32) {
        if self.height() == height {
            return;
        }
        self.size.y = height as f32;
        self.size_dirty = true;
    }

    /// Anchor point in quad-relative coordinates; `(0.5, 0.5)` centers the
    /// quad on the node.
    pub fn anchor(&self) -> Vec2 {
        self.anchor
    }

    /// Set the anchor point.
    pub fn set_anchor(&mut self, anchor: Vec2) {
        self.anchor = anchor;
    }

    /// Append an animation frame.
    ///
    /// # Panics
    /// Panics on a non-positive duration, which would stall the animation.
    pub fn add_frame(&mut self, texture: TextureKey, duration: f32) {
        assert!(duration > 0.0, "frame duration must be positive");
        self.frames.push(SpriteFrame { texture, duration });
    }

    /// Number of animation frames
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Index of the frame currently shown
    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    /// Seconds accumulated toward the current frame's duration
    pub fn frame_timer(&self) -> f32 {
        self.frame_timer
    }

    /// Start playback from the first frame.
    pub fn play(&mut self, looping: bool) {
        self.looping = looping;
        self.playing = true;
        self.current_frame = 0;
        self.frame_timer = 0.0;

        if let Some(first) = self.frames.first() {
            self.texture = first.texture;
        }
    }

    /// Stop playback and rewind to the first frame.
    pub fn stop(&mut self) {
        self.playing = false;
        self.current_frame = 0;
        self.frame_timer = 0.0;
    }

    /// Suspend playback, keeping the current frame and timer.
    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Continue playback from where [`Self::pause`] left off.
    pub fn resume(&mut self) {
        self.playing = true;
    }

    /// Whether the animation is advancing
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Register a callback fired once when a non-looping animation finishes.
    pub fn set_on_animation_complete(&mut self, callback: impl FnMut() + 'static) {
        self.on_complete = Some(Box::new(callback));
    }

    /// Advance the animation timer, switching frames as durations elapse.
    ///
    /// A large `delta_time` can skip several frames in one call; the
    /// remainder carries into the new frame's timer. A finished non-looping
    /// animation clamps to its last frame, stops, and fires the completion
    /// callback.
    pub fn update_animation(&mut self, delta_time: f32) {
        if !self.playing || self.frames.is_empty() {
            return;
        }

        self.frame_timer += delta_time;

        while self.frame_timer >= self.frames[self.current_frame].duration {
            self.frame_timer -= self.frames[self.current_frame].duration;
            self.current_frame += 1;

            if self.current_frame >= self.frames.len() {
                if self.looping {
                    self.current_frame = 0;
                } else {
                    self.current_frame = self.frames.len() - 1;
                    self.playing = false;
                    self.frame_timer = 0.0;
                    if let Some(callback) = &mut self.on_complete {
                        callback();
                    }
                    return;
                }
            }

            self.texture = self.frames[self.current_frame].texture;
        }
    }
}

impl Component for Sprite {
    fn kind(&self) -> ComponentKind {
        Self::KIND
    }

    fn init(
        &mut self,
        _owner: NodeId,
        _graph: &mut SceneGraph,
        ctx: &mut UpdateContext<'_>,
    ) -> Result<(), SceneError> {
        // A sprite built without an explicit size adopts its texture's.
        if self.size == Vec2::zeros() {
            let texture = ctx.textures.texture(self.texture);
            self.size = Vec2::new(texture.width() as f32, texture.height() as f32);
        }
        Ok(())
    }

    fn update(
        &mut self,
        _owner: NodeId,
        _graph: &mut SceneGraph,
        _ctx: &mut UpdateContext<'_>,
        delta_time: f32,
    ) {
        self.update_animation(delta_time);
    }

    fn post_update(
        &mut self,
        owner: NodeId,
        graph: &mut SceneGraph,
        ctx: &mut UpdateContext<'_>,
        _delta_time: f32,
    ) {
        if self.size_dirty {
            ctx.textures
                .resize(self.texture, self.size.x as u32, self.size.y as u32);
            self.size_dirty = false;
        }

        let offset = Vec3::new(
            -self.size.x * self.anchor.x,
            -self.size.y * self.anchor.y,
            0.0,
        );
        let world = graph.world_matrix(owner)
            * Mat4::new_translation(&offset)
            * Mat4::new_nonuniform_scaling(&Vec3::new(self.size.x, self.size.y, 1.0));

        ctx.renderer.draw(self.texture, &world);
    }
}

impl TypedComponent for Sprite {
    const KIND: ComponentKind = ComponentKind("sprite");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{ImageData, TextureCache};
    use crate::render::RecordingRenderer;
    use approx::assert_relative_eq;
    use std::cell::Cell;
    use std::rc::Rc;

    fn cache_with(name: &str, width: u32, height: u32) -> (TextureCache, TextureKey) {
        let mut cache = TextureCache::new();
        let key = cache.insert(name, ImageData::solid_color(width, height, [255, 0, 0, 255]));
        (cache, key)
    }

    fn three_frame_sprite(cache: &mut TextureCache) -> (Sprite, Vec<TextureKey>) {
        let keys: Vec<TextureKey> = (0..3)
            .map(|i| {
                cache.insert(
                    format!("frame{i}"),
                    ImageData::solid_color(8, 8, [0, 0, 0, 255]),
                )
            })
            .collect();

        let mut sprite = Sprite::new(keys[0]);
        sprite.add_frame(keys[0], 0.1);
        sprite.add_frame(keys[1], 0.2);
        sprite.add_frame(keys[2], 0.1);
        (sprite, keys)
    }

    #[test]
    fn one_tick_can_cross_several_frames() {
        let mut cache = TextureCache::new();
        let (mut sprite, keys) = three_frame_sprite(&mut cache);
        sprite.play(true);

        sprite.update_animation(0.35);

        assert_eq!(sprite.current_frame(), 2);
        assert_relative_eq!(sprite.frame_timer(), 0.05, epsilon = 1e-5);
        assert_eq!(sprite.texture(), keys[2]);
    }

    #[test]
    fn looping_animation_wraps_to_first_frame() {
        let mut cache = TextureCache::new();
        let (mut sprite, keys) = three_frame_sprite(&mut cache);
        sprite.play(true);

        // Total duration is 0.4; a hair over wraps around.
        sprite.update_animation(0.41);

        assert_eq!(sprite.current_frame(), 0);
        assert!(sprite.is_playing());
        assert_eq!(sprite.texture(), keys[0]);
    }

    #[test]
    fn non_looping_animation_stops_and_fires_callback_once() {
        let mut cache = TextureCache::new();
        let (mut sprite, keys) = three_frame_sprite(&mut cache);
        let fired = Rc::new(Cell::new(0u32));
        let fired_in_callback = Rc::clone(&fired);
        sprite.set_on_animation_complete(move || {
            fired_in_callback.set(fired_in_callback.get() + 1);
        });
        sprite.play(false);

        sprite.update_animation(1.0);
        assert_eq!(fired.get(), 1);
        assert!(!sprite.is_playing());
        assert_eq!(sprite.current_frame(), 2);
        assert_eq!(sprite.texture(), keys[2]);

        // Further ticks change nothing.
        sprite.update_animation(1.0);
        assert_eq!(fired.get(), 1);
        assert_eq!(sprite.current_frame(), 2);
    }

    #[test]
    fn pause_keeps_progress_and_stop_rewinds() {
        let mut cache = TextureCache::new();
        let (mut sprite, _) = three_frame_sprite(&mut cache);
        sprite.play(true);
        sprite.update_animation(0.15);
        assert_eq!(sprite.current_frame(), 1);

        sprite.pause();
        sprite.update_animation(10.0);
        assert_eq!(sprite.current_frame(), 1);
        assert_relative_eq!(sprite.frame_timer(), 0.05, epsilon = 1e-5);

        sprite.resume();
        assert!(sprite.is_playing());

        sprite.stop();
        assert_eq!(sprite.current_frame(), 0);
        assert_relative_eq!(sprite.frame_timer(), 0.0);
    }

    #[test]
    fn init_adopts_texture_size() {
        let (mut cache, key) = cache_with("player", 16, 32);
        let mut renderer = RecordingRenderer::new();
        let mut graph = SceneGraph::new();
        let root = graph.root();

        let mut ctx = UpdateContext {
            renderer: &mut renderer,
            textures: &mut cache,
        };
        let sprite = graph.add_component(root, Sprite::new(key), &mut ctx).unwrap();

        assert_eq!(sprite.width(), 16);
        assert_eq!(sprite.height(), 32);
    }

    #[test]
    fn post_update_flushes_resize_and_draws() {
        let (mut cache, key) = cache_with("tile", 8, 8);
        let mut renderer = RecordingRenderer::new();
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let node = graph.create_node("sprite");
        graph.add_child(root, node);
        graph.set_local_position(node, Vec3::new(10.0, 20.0, 0.0));

        {
            let mut ctx = UpdateContext {
                renderer: &mut renderer,
                textures: &mut cache,
            };
            graph
                .add_component(node, Sprite::with_size(key, 4, 2), &mut ctx)
                .unwrap();
            graph.post_update(0.016, &mut ctx);
        }

        // The backing texture was resampled to the sprite's size.
        assert_eq!(cache.texture(key).width(), 4);
        assert_eq!(cache.texture(key).height(), 2);

        let draws = renderer.draws();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].texture, key);

        // Centered anchor: quad center lands on the node's position.
        let center = draws[0].world * nalgebra::Vector4::new(0.5, 0.5, 0.0, 1.0);
        assert_relative_eq!(center.x, 10.0, epsilon = 1e-4);
        assert_relative_eq!(center.y, 20.0, epsilon = 1e-4);
    }
}
