//! Resource drops and the proximity pickup animation.

use glam::DVec2;
use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use bulwark_core::components::{Pickup, Position, Size};
use bulwark_core::config::{GameConfig, ResourcesConfig};
use bulwark_core::constants::*;
use bulwark_core::enums::{EnemyKind, ResourceTier};
use bulwark_core::events::{GameEvent, GameEventKind};

use crate::world_setup;

/// Drop chances for one archetype before luck.
pub fn drop_table(kind: EnemyKind, config: &ResourcesConfig) -> Vec<(ResourceTier, f64)> {
    let t1 = config.energy_crystal.drop_rate;
    let t2 = config.quantum_core.drop_rate;
    let t3 = config.essence_fragment.drop_rate;
    match kind {
        EnemyKind::Basic => vec![(ResourceTier::EnergyCrystal, t1)],
        EnemyKind::Elite => vec![
            (ResourceTier::QuantumCore, t2),
            (ResourceTier::EnergyCrystal, t1 * ELITE_TIER1_FACTOR),
        ],
        EnemyKind::Boss => vec![
            (ResourceTier::EssenceFragment, t3),
            (ResourceTier::QuantumCore, (t2 * BOSS_TIER2_FACTOR).min(1.0)),
            (ResourceTier::EnergyCrystal, (t1 * BOSS_TIER1_FACTOR).min(1.0)),
        ],
    }
}

/// Roll the drop table for a kill. Luck scales every chance by `1 + luck`.
pub fn roll_drops(
    kind: EnemyKind,
    luck: f64,
    config: &ResourcesConfig,
    rng: &mut ChaCha8Rng,
) -> Vec<(ResourceTier, u32)> {
    drop_table(kind, config)
        .into_iter()
        .filter_map(|(tier, chance)| {
            let chance = (chance * (1.0 + luck)).clamp(0.0, 1.0);
            if rng.gen::<f64>() >= chance {
                return None;
            }
            let tier_cfg = config.tier(tier);
            let value = if tier_cfg.max_value > tier_cfg.min_value {
                rng.gen_range(tier_cfg.min_value..=tier_cfg.max_value)
            } else {
                tier_cfg.min_value
            };
            Some((tier, value))
        })
        .collect()
}

/// Roll and spawn the drops for a kill at `at`.
#[allow(clippy::too_many_arguments)]
pub fn drop_loot(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    kind: EnemyKind,
    at: DVec2,
    luck: f64,
    config: &GameConfig,
    now_ms: f64,
    events: &mut Vec<GameEvent>,
) {
    for (tier, value) in roll_drops(kind, luck, &config.resources, rng) {
        let scatter = DVec2::new(
            (rng.gen::<f64>() - 0.5) * 2.0 * DROP_SCATTER,
            (rng.gen::<f64>() - 0.5) * 2.0 * DROP_SCATTER,
        );
        let position = at + scatter;
        world_setup::spawn_pickup(world, position, tier, value, config);
        events.push(GameEvent::new(
            GameEventKind::ResourceDropped {
                tier,
                value,
                position,
            },
            now_ms,
        ));
    }
}

/// Pickup animation progress in `[0, 1]`.
pub fn pickup_progress(started_ms: f64, now_ms: f64, duration_ms: f64) -> f64 {
    if duration_ms <= 0.0 {
        return 1.0;
    }
    ((now_ms - started_ms) / duration_ms).clamp(0.0, 1.0)
}

/// Age idle pickups, start the animation for those within reach of the
/// player, and advance running animations. The credit itself travels as a
/// `ResourceCollected` event.
pub fn run(
    world: &mut World,
    player_pos: DVec2,
    config: &ResourcesConfig,
    delta_ms: f64,
    now_ms: f64,
    events: &mut Vec<GameEvent>,
    despawn_buffer: &mut Vec<Entity>,
) {
    despawn_buffer.clear();
    for (entity, (pos, size, pickup)) in
        world.query_mut::<(&mut Position, &mut Size, &mut Pickup)>()
    {
        let Some(started) = pickup.pickup_started_ms else {
            pickup.life_ms -= delta_ms;
            if pickup.life_ms <= 0.0 {
                events.push(GameEvent::new(
                    GameEventKind::ResourceExpired { tier: pickup.tier },
                    now_ms,
                ));
                despawn_buffer.push(entity);
            } else if pos.0.distance(player_pos) <= config.pickup_distance {
                pickup.pickup_started_ms = Some(now_ms);
                events.push(GameEvent::new(
                    GameEventKind::ResourcePickupStarted {
                        tier: pickup.tier,
                        value: pickup.value,
                    },
                    now_ms,
                ));
            }
            continue;
        };

        let progress = pickup_progress(started, now_ms, config.pickup_duration_ms);
        pos.0 += (player_pos - pos.0) * PICKUP_PULL_FRACTION * progress;
        size.0 = pickup.base_size * (1.0 - progress);

        if progress > PICKUP_CREDIT_PROGRESS && !pickup.credited {
            pickup.credited = true;
            events.push(GameEvent::new(
                GameEventKind::ResourceCollected {
                    tier: pickup.tier,
                    value: pickup.value,
                },
                now_ms,
            ));
        }
        if progress >= 1.0 {
            despawn_buffer.push(entity);
        }
    }
    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
}
