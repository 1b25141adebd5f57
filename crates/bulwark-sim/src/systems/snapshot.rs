//! Snapshot system: reads the world and singletons into a
//! `GameStateSnapshot`. Read-only.

use hecs::World;

use bulwark_core::components::*;
use bulwark_core::constants::HIT_FLASH_MS;
use bulwark_core::state::*;

use crate::systems::wave::WaveState;
use crate::systems::weapon::WeaponState;

/// Engine state that lives outside the ECS world.
pub struct SnapshotContext<'a> {
    pub now_ms: f64,
    /// Pause-aware clock for hit flashes and construction progress.
    pub sim_ms: f64,
    pub paused: bool,
    pub game_over: bool,
    pub player: &'a Player,
    pub base: &'a Base,
    pub wave: &'a WaveState,
    pub weapon: &'a WeaponState,
    pub max_ammo: u32,
    pub placement_type: Option<&'a str>,
    pub placement_preview: Option<&'a PlacementPreview>,
}

pub fn build_snapshot(world: &World, ctx: &SnapshotContext<'_>) -> GameStateSnapshot {
    let buildings = build_buildings(world, ctx.sim_ms);
    let power_links = build_power_links(&buildings);

    GameStateSnapshot {
        time_ms: ctx.now_ms,
        paused: ctx.paused,
        game_over: ctx.game_over,
        player: ctx.player.clone(),
        base: ctx.base.clone(),
        enemies: build_enemies(world, ctx.sim_ms),
        bullets: build_bullets(world),
        particles: build_particles(world),
        pickups: build_pickups(world),
        buildings,
        power_links,
        wave: ctx.wave.view(ctx.now_ms),
        ammo: AmmoView {
            current: ctx.weapon.ammo,
            max: ctx.max_ammo,
        },
        placement_mode: ctx.placement_type.is_some(),
        placement_type: ctx.placement_type.map(str::to_string),
        placement_preview: ctx.placement_preview.cloned(),
    }
}

fn build_enemies(world: &World, now_ms: f64) -> Vec<EnemyView> {
    world
        .query::<(&Position, &Size, &Color, &Enemy)>()
        .iter()
        .map(|(_, (pos, size, color, enemy))| EnemyView {
            position: pos.0,
            size: size.0,
            color: color.0.clone(),
            kind: enemy.kind,
            health: enemy.health,
            max_health: enemy.max_health,
            target: enemy.target,
            flashing: enemy
                .hit_flash_ms
                .is_some_and(|hit| now_ms - hit < HIT_FLASH_MS),
        })
        .collect()
}

fn build_bullets(world: &World) -> Vec<BulletView> {
    world
        .query::<(&Position, &Size, &Color, &Bullet)>()
        .iter()
        .map(|(_, (pos, size, color, bullet))| BulletView {
            position: pos.0,
            size: size.0,
            color: color.0.clone(),
            source: bullet.source,
        })
        .collect()
}

fn build_particles(world: &World) -> Vec<ParticleView> {
    world
        .query::<(&Position, &Size, &Color, &Particle)>()
        .iter()
        .map(|(_, (pos, size, color, particle))| ParticleView {
            position: pos.0,
            size: size.0,
            color: color.0.clone(),
            alpha: if particle.max_life > 0.0 {
                (particle.life / particle.max_life).clamp(0.0, 1.0)
            } else {
                0.0
            },
        })
        .collect()
}

fn build_pickups(world: &World) -> Vec<PickupView> {
    world
        .query::<(&Position, &Size, &Color, &Pickup)>()
        .iter()
        .map(|(_, (pos, size, color, pickup))| PickupView {
            position: pos.0,
            size: size.0,
            color: color.0.clone(),
            tier: pickup.tier,
            value: pickup.value,
            being_collected: pickup.pickup_started_ms.is_some(),
        })
        .collect()
}

fn build_buildings(world: &World, now_ms: f64) -> Vec<BuildingView> {
    let mut views: Vec<BuildingView> = world
        .query::<(&Position, &Size, &Color, &Building)>()
        .iter()
        .map(|(_, (pos, size, color, building))| BuildingView {
            id: building.id,
            type_id: building.type_id.clone(),
            status: building.status,
            position: pos.0,
            size: size.0,
            color: color.0.clone(),
            health: building.health,
            max_health: building.max_health,
            powered_by: building.powered_by.clone(),
            connected_to: building.connected_to.clone(),
            construction_progress: construction_progress(building, now_ms),
        })
        .collect();
    views.sort_by_key(|b| b.id);
    views
}

fn construction_progress(building: &Building, now_ms: f64) -> f64 {
    if building.construction_duration_ms <= 0.0 {
        return 1.0;
    }
    ((now_ms - building.construction_started_ms) / building.construction_duration_ms).clamp(0.0, 1.0)
}

/// One link per pylon-to-consumer connection. Expects `buildings` sorted
/// by id.
fn build_power_links(buildings: &[BuildingView]) -> Vec<PowerLink> {
    let by_id = |id: u32| {
        buildings
            .binary_search_by_key(&id, |b| b.id)
            .ok()
            .map(|idx| &buildings[idx])
    };
    let mut links = Vec::new();
    for pylon in buildings {
        for consumer_id in &pylon.connected_to {
            if let Some(consumer) = by_id(*consumer_id) {
                links.push(PowerLink {
                    pylon_id: pylon.id,
                    building_id: consumer.id,
                    from: pylon.position,
                    to: consumer.position,
                    distance: pylon.position.distance(consumer.position),
                });
            }
        }
    }
    links
}
