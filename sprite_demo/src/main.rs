//! Sprite demo application
//!
//! Runs the full engine loop headless: a drifting ship with an orbiting
//! shield sprite, an animated explosion that despawns itself via the
//! completion callback path, and per-frame draw stats logged at the end.

use rand::Rng;
use scene_engine::prelude::*;

struct SpriteDemo {
    frames_left: u32,
    ship: Option<NodeId>,
}

impl SpriteDemo {
    fn new(frames: u32) -> Self {
        Self {
            frames_left: frames,
            ship: None,
        }
    }

    fn build_scene(
        &mut self,
        engine: &mut Engine<NullDevice, RecordingRenderer>,
    ) -> Result<(), AppError> {
        // No asset directory in the headless demo; textures are generated.
        let ship_tex = engine
            .textures
            .insert("ship", ImageData::solid_color(32, 32, [90, 160, 255, 255]));
        let shield_tex = engine
            .textures
            .insert("shield", ImageData::solid_color(48, 48, [120, 255, 180, 90]));
        let blast: Vec<TextureKey> = (0u8..4)
            .map(|i| {
                engine.textures.insert(
                    format!("blast{i}"),
                    ImageData::solid_color(16, 16, [255, 120 + i * 30, 0, 255]),
                )
            })
            .collect();

        let mut scene = Scene::new("demo");
        let root = scene.graph_mut().root();
        let graph = scene.graph_mut();

        let ship = graph.create_node("ship");
        graph.add_child(root, ship);
        let shield = graph.create_node("shield");
        graph.add_child(ship, shield);
        let explosion = graph.create_node("explosion");
        graph.add_child(root, explosion);

        let mut rng = rand::thread_rng();
        graph.set_local_position(
            explosion,
            Vec3::new(rng.gen_range(-200.0..200.0), rng.gen_range(-150.0..150.0), 0.0),
        );

        engine.set_scene(scene).map_err(|e| AppError::Custom(e.to_string()))?;
        let (scene, mut ctx) = engine
            .scene_and_context()
            .expect("scene was just set");
        let graph = scene.graph_mut();

        // The ship drifts right while slowly spinning.
        let mover = graph.add_component(ship, Movement::new(), &mut ctx)?;
        mover.set_velocity(Vec3::new(1.0, 0.2, 0.0));
        mover.set_speed(60.0);
        mover.set_angular_velocity(Vec3::new(0.0, 0.0, 1.0));
        mover.set_angular_speed(0.8);
        graph.add_component(ship, Sprite::new(ship_tex), &mut ctx)?;

        // Shield rides along as a child, offset above the hull.
        graph.set_local_position(shield, Vec3::new(0.0, 20.0, 0.0));
        graph.add_component(shield, Sprite::with_size(shield_tex, 48, 48), &mut ctx)?;

        // One-shot explosion animation.
        let sprite = graph.add_component(explosion, Sprite::new(blast[0]), &mut ctx)?;
        for texture in &blast {
            sprite.add_frame(*texture, 0.08);
        }
        sprite.set_on_animation_complete(|| log::info!("Explosion finished"));
        sprite.play(false);

        self.ship = Some(ship);
        Ok(())
    }
}

impl Application<NullDevice, RecordingRenderer> for SpriteDemo {
    fn initialize(
        &mut self,
        engine: &mut Engine<NullDevice, RecordingRenderer>,
    ) -> Result<(), AppError> {
        self.build_scene(engine)
    }

    fn update(
        &mut self,
        engine: &mut Engine<NullDevice, RecordingRenderer>,
        _delta_time: f32,
    ) -> Result<(), AppError> {
        engine.renderer.reset();

        if self.frames_left == 0 {
            engine.request_exit();
            return Ok(());
        }
        self.frames_left -= 1;
        Ok(())
    }

    fn cleanup(&mut self, engine: &mut Engine<NullDevice, RecordingRenderer>) {
        let draw_count = engine.renderer.draws().len();
        if let (Some(ship), Some(scene)) = (self.ship, engine.scene_mut()) {
            let position = scene.graph_mut().world_position(ship);
            log::info!(
                "Final ship position ({:.1}, {:.1}), {draw_count} draw(s) last frame",
                position.x,
                position.y
            );
        }
    }
}

fn main() -> Result<(), EngineError> {
    scene_engine::foundation::logging::init();

    let config = EngineConfig::default();
    let mut engine = Engine::new(config, NullDevice::new(), RecordingRenderer::new())?;

    let mut app = SpriteDemo::new(240);
    engine.run(&mut app)?;

    log::info!(
        "Presented {} frame(s) over {:.2}s",
        engine.device.frames_presented(),
        engine.timer().total_time()
    );
    Ok(())
}
