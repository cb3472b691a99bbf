use std::cell::Cell;
use std::rc::Rc;

use fixstep::{Collider, Color, Entity, EntityId, Scene, SceneCommands, Transform, Vec2, Visual};
use tracing::info;

pub(crate) const PLAYER_SPRITE: &str = "player";

const LAYER_PLAYER: u32 = 0;
const LAYER_WALL: u32 = 1;
const LAYER_PICKUP: u32 = 2;
const LAYER_GHOST: u32 = 3;

const PLAYER_SPEED_UNITS_PER_SECOND: f32 = 120.0;
const WALL_X: f32 = 200.0;
const PICKUP_X: f32 = 100.0;
const SPARK_LIFETIME_TICKS: u32 = 10;

fn layer_bit(layer: u32) -> u32 {
    1 << layer
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct DemoIds {
    pub(crate) player: EntityId,
    pub(crate) pickup: EntityId,
    pub(crate) ghost: EntityId,
}

/// A player shuttling between two walls, a pickup that despawns into a
/// short-lived spark, and a ghost the player's mask ignores.
pub(crate) fn build_demo_scene() -> (Scene, DemoIds) {
    let mut scene = Scene::new();
    scene.set_background(Color::rgb(20, 20, 32));

    let direction = Rc::new(Cell::new(1.0f32));
    let behavior_direction = Rc::clone(&direction);
    let player = scene.add(
        Entity::new(Transform::default())
            .with_visual(Visual::sprite(PLAYER_SPRITE))
            .with_collider(
                Collider::new(32.0, 32.0)
                    .with_layer(LAYER_PLAYER)
                    .with_mask(layer_bit(LAYER_WALL) | layer_bit(LAYER_PICKUP)),
            )
            .with_z_order(10)
            .with_behavior(move |entity: &mut Entity, _: &mut SceneCommands, dt: f32| {
                let step = PLAYER_SPEED_UNITS_PER_SECOND * dt * behavior_direction.get();
                entity.transform.translate(step, 0.0);
            })
            .on_enter(move |entity: &mut Entity, other: &Entity, _: &mut SceneCommands| {
                let hit_wall = other
                    .collider
                    .is_some_and(|collider| collider.layer == LAYER_WALL);
                if hit_wall {
                    direction.set(-direction.get());
                    info!(player = %entity.id(), wall = %other.id(), "player_bounced");
                }
            }),
    );

    for wall_x in [-WALL_X, WALL_X] {
        scene.add(
            Entity::new(Transform::at(Vec2::new(wall_x, 0.0)))
                .with_visual(Visual::placeholder(Color::BLUE))
                .with_collider(
                    Collider::new(20.0, 400.0)
                        .with_layer(LAYER_WALL)
                        .with_mask(layer_bit(LAYER_PLAYER)),
                ),
        );
    }

    let pickup = scene.add(
        Entity::new(Transform::at(Vec2::new(PICKUP_X, 0.0)))
            .with_visual(Visual::placeholder(Color::GREEN))
            .with_collider(
                Collider::new(16.0, 16.0)
                    .with_layer(LAYER_PICKUP)
                    .with_mask(layer_bit(LAYER_PLAYER))
                    .as_trigger(),
            )
            .on_enter(|entity: &mut Entity, other: &Entity, commands: &mut SceneCommands| {
                commands.remove(entity.id());
                let spark = commands.spawn(spark_at(entity.transform.position));
                info!(
                    pickup = %entity.id(),
                    collector = %other.id(),
                    spark = %spark,
                    "pickup_collected"
                );
            }),
    );

    let ghost = scene.add(
        Entity::new(Transform::at(Vec2::new(-PICKUP_X, 0.0)))
            .with_visual(Visual::placeholder(Color::WHITE).with_tint(Color::rgb(180, 180, 255)))
            .with_collider(Collider::new(24.0, 24.0).with_layer(LAYER_GHOST))
            .with_z_order(-1)
            .on_enter(|entity: &mut Entity, _: &Entity, _: &mut SceneCommands| {
                // Unreachable while the player mask excludes the ghost layer.
                entity.active = false;
            }),
    );

    (
        scene,
        DemoIds {
            player,
            pickup,
            ghost,
        },
    )
}

fn spark_at(position: Vec2) -> Entity {
    let mut ticks_left = SPARK_LIFETIME_TICKS;
    Entity::new(Transform::at(position))
        .with_visual(Visual::placeholder(Color::RED))
        .with_z_order(5)
        .with_behavior(move |entity: &mut Entity, commands: &mut SceneCommands, _: f32| {
            entity.transform.rotate(36.0);
            ticks_left = ticks_left.saturating_sub(1);
            if ticks_left == 0 {
                commands.remove(entity.id());
            }
        })
}
