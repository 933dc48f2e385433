//! Falling boxes
//!
//! Headless demo: a row of dynamic boxes falls onto a static floor. The
//! outer boxes miss its edges, and a script teleports every box that drops
//! below the floor back to its spawn point, which exercises the
//! transform-to-body push. Each box carries a child "shadow" sprite that
//! inherits its render depth.
//!
//! Usage: `falling_boxes [config.toml|config.ron]`

use engine2d::foundation::logging;
use engine2d::prelude::*;
use thiserror::Error;

const BOX_COUNT: usize = 4;
const FLOOR_Y: f32 = -4.0;
const SPAWN_Y: f32 = 4.0;
const FLOOR_WIDTH: f32 = 8.0;
const FLOOR_HEIGHT: f32 = 0.2;
const BOX_SIDE: f32 = 1.0;

#[derive(Error, Debug)]
enum DemoError {
    #[error(transparent)]
    Config(#[from] engine2d::config::ConfigError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Resets boxes that fell through the floor
struct Respawner {
    boxes: Vec<(NodeId, Vec2)>,
    respawns: usize,
}

impl Component for Respawner {
    fn update(&mut self, cx: &mut FrameContext<'_>) {
        for &(node, spawn) in &self.boxes {
            let Some(position) = cx.scene.world_position(node) else {
                continue;
            };
            if position.y < FLOOR_Y {
                cx.scene.set_world_position(node, spawn);
                if let Some(body) = cx.scene.get_component::<RigidBody2D>(node).cloned() {
                    if let Err(err) = body.set_velocity(cx.scene.physics_mut(), Vec2::zeros()) {
                        log::error!("Could not reset velocity of '{:?}': {}", node, err);
                    }
                }
                self.respawns += 1;
                log::info!("Respawned box {:?} on frame {}", node, cx.frame());
            }
        }
    }
}

#[derive(Default)]
struct FallingBoxes {
    respawner: Option<ComponentId>,
}

impl Application for FallingBoxes {
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
        let scene = &mut engine.scene;
        let floor_size = Vec2::new(FLOOR_WIDTH, FLOOR_HEIGHT);
        let box_size = Vec2::new(BOX_SIDE, BOX_SIDE);

        let floor = scene.create_node("floor");
        scene.set_local_position(floor, Vec2::new(0.0, FLOOR_Y));
        if let Some(node) = scene.node_mut(floor) {
            node.set_render_depth(100.0);
        }
        scene.attach(floor, SpriteRenderer::new("floor").with_size(floor_size));
        let floor_desc = BodyDesc::new(BodyType::Static).with_collider(ColliderShape::Cuboid {
            half_extents: floor_size / 2.0,
        });
        RigidBody2D::attach_to(scene, floor, floor_desc);

        let row = scene.create_node("boxes");
        if let Some(node) = scene.node_mut(row) {
            node.set_render_depth(50.0);
        }
        let mut boxes = Vec::with_capacity(BOX_COUNT);
        for i in 0..BOX_COUNT {
            let spawn = Vec2::new(i as f32 * 3.0 - 4.5, SPAWN_Y + i as f32);
            let node = scene.create_child(row, format!("box{i}"));
            scene.set_world_position(node, spawn);
            scene.set_local_rotation(node, 15.0 * i as f32);
            scene.attach(
                node,
                SpriteRenderer::new("box")
                    .with_size(box_size)
                    .with_color([0.9, 0.6, 0.2, 1.0]),
            );

            let shadow = scene.create_child(node, format!("box{i}_shadow"));
            scene.set_local_position(shadow, Vec2::new(0.1, -0.1));
            scene.attach(shadow, SpriteRenderer::new("box").with_color([0.0, 0.0, 0.0, 0.4]));

            let desc = BodyDesc::new(BodyType::Dynamic)
                .with_angular_velocity(0.5 * i as f32)
                .with_gravity_scale(1.0 + 0.25 * i as f32)
                .with_collider(ColliderShape::Cuboid {
                    half_extents: box_size / 2.0,
                });
            RigidBody2D::attach_to(scene, node, desc);
            boxes.push((node, spawn));
        }

        self.respawner = Some(scene.attach_script(Respawner { boxes, respawns: 0 }));
        log::info!("Scene ready: {} nodes, {} bodies", scene.node_count(), scene.physics().body_count());
        Ok(())
    }

    fn update(&mut self, engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
        let frame = engine.stats().frame;
        if frame > 0 && frame % 60 == 0 {
            log::info!("Frame {}: {:?}", frame, engine.stats());
        }
        Ok(())
    }

    fn cleanup(&mut self, engine: &mut Engine) {
        let respawns = self
            .respawner
            .and_then(|id| engine.scene.component::<Respawner>(id))
            .map_or(0, |respawner| respawner.respawns);
        log::info!(
            "Finished: {} respawns, last frame drew {} sprites",
            respawns,
            engine.stats().drawn
        );
    }
}

fn main() -> Result<(), DemoError> {
    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::load_from_file(path)?,
        None => EngineConfig::default().with_max_frames(600).with_fixed_timestep(1.0 / 60.0),
    };
    logging::init_with_level(&config.log_level);

    let mut engine = Engine::headless(config)?;
    engine.set_timer(Timer::fixed(1.0 / 60.0));
    engine.run(&mut FallingBoxes::default())?;
    Ok(())
}
