//! Building subsystem: placement validation, construction timers, the
//! power grid and turret auto-fire.
//!
//! The power grid is the one place a system rewrites other buildings'
//! records in place: every tick all links are dropped and rebuilt.

use std::collections::BTreeMap;

use glam::DVec2;
use hecs::{Entity, World};
use tracing::{debug, info};

use bulwark_core::components::{Building, Enemy, Position, Size};
use bulwark_core::config::{BuildingTypeConfig, GameConfig};
use bulwark_core::constants::*;
use bulwark_core::enums::BuildingStatus;
use bulwark_core::error::PlacementError;
use bulwark_core::events::{GameEvent, GameEventKind};
use bulwark_core::state::PlacementPreview;

use crate::world_setup;

// ---- Placement ----

/// Run every placement check and collect all failures, in check order:
/// type, level, availability, bounds, separation, max count. An unknown
/// type short-circuits since nothing else can be checked.
pub fn check_placement(
    world: &World,
    config: &GameConfig,
    type_id: &str,
    position: DVec2,
    player_level: u32,
) -> Vec<PlacementError> {
    let Some(kind) = config.buildings.types.get(type_id) else {
        return vec![PlacementError::UnknownType(type_id.to_string())];
    };
    let mut errors = Vec::new();

    if player_level < kind.required_level {
        errors.push(PlacementError::LevelTooLow {
            required: kind.required_level,
            current: player_level,
        });
    }
    if !config
        .buildings
        .available_at(player_level)
        .iter()
        .any(|id| id == type_id)
    {
        errors.push(PlacementError::NotAvailableAtLevel {
            type_id: type_id.to_string(),
            level: player_level,
        });
    }

    if !config.canvas.bounds().contains_box(position, kind.size) {
        errors.push(PlacementError::OutOfBounds);
    }

    let mut same_type = 0u32;
    let mut query = world.query::<(&Position, &Size, &Building)>();
    let mut existing: Vec<(u32, DVec2, f64)> = Vec::new();
    for (_entity, (pos, size, building)) in query.iter() {
        if building.status == BuildingStatus::Destroyed {
            continue;
        }
        if building.type_id == type_id {
            same_type += 1;
        }
        existing.push((building.id, pos.0, size.0));
    }
    existing.sort_by_key(|(id, _, _)| *id);
    for (id, pos, size) in existing {
        let min_gap = (kind.size + size) / 2.0 + BUILDING_BUFFER;
        if position.distance(pos) < min_gap {
            errors.push(PlacementError::TooClose { building_id: id });
        }
    }

    if let Some(max) = kind.max_count {
        if same_type >= max {
            errors.push(PlacementError::MaxCountReached {
                type_id: type_id.to_string(),
                max,
            });
        }
    }
    errors
}

/// First failing check, if any.
pub fn validate_placement(
    world: &World,
    config: &GameConfig,
    type_id: &str,
    position: DVec2,
    player_level: u32,
) -> Result<(), PlacementError> {
    match check_placement(world, config, type_id, position, player_level)
        .into_iter()
        .next()
    {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Preview for the pointer position while in placement mode.
pub fn preview(
    world: &World,
    config: &GameConfig,
    type_id: &str,
    position: DVec2,
    player_level: u32,
) -> PlacementPreview {
    let conflicts = check_placement(world, config, type_id, position, player_level);
    PlacementPreview {
        type_id: type_id.to_string(),
        position,
        size: config
            .buildings
            .types
            .get(type_id)
            .map_or(0.0, |kind| kind.size),
        valid: conflicts.is_empty(),
        conflicts: conflicts.iter().map(ToString::to_string).collect(),
    }
}

/// Validate and spawn a building in CONSTRUCTING status. Returns its id.
#[allow(clippy::too_many_arguments)]
pub fn place(
    world: &mut World,
    config: &GameConfig,
    type_id: &str,
    position: DVec2,
    player_level: u32,
    next_id: &mut u32,
    now_ms: f64,
    events: &mut Vec<GameEvent>,
) -> Result<u32, PlacementError> {
    if let Err(err) = validate_placement(world, config, type_id, position, player_level) {
        debug!(type_id, %err, "placement rejected");
        return Err(err);
    }
    let kind = config
        .buildings
        .types
        .get(type_id)
        .ok_or_else(|| PlacementError::UnknownType(type_id.to_string()))?;

    let id = *next_id;
    *next_id += 1;
    world_setup::spawn_building(world, id, type_id, kind, position, now_ms, CONSTRUCTION_TIME_MS);

    info!(id, type_id, x = position.x, y = position.y, "building placed");
    events.push(GameEvent::new(
        GameEventKind::BuildingPlaced {
            building_id: id,
            type_id: type_id.to_string(),
            position,
        },
        now_ms,
    ));
    Ok(id)
}

// ---- Per-tick update ----

/// Construction timers, then a full power-grid rebuild, then turret fire.
pub fn run(world: &mut World, config: &GameConfig, now_ms: f64, events: &mut Vec<GameEvent>) {
    advance_construction(world, now_ms, events);
    recompute_power(world, config, now_ms, events);
    fire_turrets(world, now_ms, events);
}

fn advance_construction(world: &mut World, now_ms: f64, events: &mut Vec<GameEvent>) {
    for (_entity, building) in world.query_mut::<&mut Building>() {
        if building.status == BuildingStatus::Constructing
            && now_ms - building.construction_started_ms >= building.construction_duration_ms
        {
            building.status = BuildingStatus::Active;
            events.push(GameEvent::new(
                GameEventKind::BuildingConstructed {
                    building_id: building.id,
                },
                now_ms,
            ));
        }
    }
}

struct GridNode {
    id: u32,
    position: DVec2,
    generates_power: bool,
    requires_power: bool,
    max_connections: usize,
}

fn type_of<'a>(config: &'a GameConfig, building: &Building) -> Option<&'a BuildingTypeConfig> {
    config.buildings.types.get(&building.type_id)
}

/// Pylon id -> consumer ids, built pylon by pylon in id order. Each pylon
/// takes the nearest power-requiring buildings within range, up to its
/// connection limit. Anything not destroyed takes part, including
/// buildings still under construction.
pub fn assign_power(world: &World, config: &GameConfig) -> BTreeMap<u32, Vec<u32>> {
    let mut nodes: Vec<GridNode> = world
        .query::<(&Position, &Building)>()
        .iter()
        .filter(|(_entity, (_pos, building))| building.status != BuildingStatus::Destroyed)
        .map(|(_entity, (pos, building))| {
            let kind = type_of(config, building);
            GridNode {
                id: building.id,
                position: pos.0,
                generates_power: kind.is_some_and(BuildingTypeConfig::generates_power),
                requires_power: kind.is_some_and(|k| k.requires_power),
                max_connections: kind.and_then(|k| k.max_connections).unwrap_or(0),
            }
        })
        .collect();
    nodes.sort_by_key(|n| n.id);

    let mut links = BTreeMap::new();
    for pylon in nodes.iter().filter(|n| n.generates_power) {
        let limit = pylon.max_connections;
        let mut candidates: Vec<(f64, u32)> = nodes
            .iter()
            .filter(|n| n.requires_power && n.id != pylon.id)
            .map(|n| (pylon.position.distance(n.position), n.id))
            .filter(|(d, _)| *d <= POWER_RANGE)
            .collect();
        candidates.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        let consumers: Vec<u32> = candidates.into_iter().take(limit).map(|(_, id)| id).collect();
        links.insert(pylon.id, consumers);
    }
    links
}

/// Drop every power link, rebuild them and resolve POWERED/UNPOWERED.
pub fn recompute_power(world: &mut World, config: &GameConfig, now_ms: f64, events: &mut Vec<GameEvent>) {
    let links = assign_power(world, config);
    let mut suppliers: BTreeMap<u32, Vec<u32>> = BTreeMap::new();
    for (pylon, consumers) in &links {
        for consumer in consumers {
            suppliers.entry(*consumer).or_default().push(*pylon);
        }
    }

    for (_entity, building) in world.query_mut::<&mut Building>() {
        building.connected_to = links.get(&building.id).cloned().unwrap_or_default();
        building.powered_by = suppliers.get(&building.id).cloned().unwrap_or_default();

        if !building.status.is_operational() {
            continue;
        }
        let requires_power = type_of(config, building).is_some_and(|k| k.requires_power);
        let status = if !requires_power || !building.powered_by.is_empty() {
            BuildingStatus::Powered
        } else {
            BuildingStatus::Unpowered
        };
        if status == building.status {
            continue;
        }
        building.status = status;
        let kind = if status == BuildingStatus::Powered {
            GameEventKind::BuildingPowered {
                building_id: building.id,
            }
        } else {
            GameEventKind::BuildingUnpowered {
                building_id: building.id,
            }
        };
        events.push(GameEvent::new(kind, now_ms));
    }
}

/// Powered turrets shoot the nearest enemy in range once their fire-rate
/// cooldown has passed. The projectile is spawned by the engine from the
/// `TurretFired` event.
fn fire_turrets(world: &mut World, now_ms: f64, events: &mut Vec<GameEvent>) {
    let enemies: Vec<DVec2> = world
        .query::<(&Position, &Enemy)>()
        .iter()
        .map(|(_entity, (pos, _enemy))| pos.0)
        .collect();
    if enemies.is_empty() {
        return;
    }

    for (_entity, (pos, building)) in world.query_mut::<(&Position, &mut Building)>() {
        if building.status != BuildingStatus::Powered {
            continue;
        }
        let (Some(damage), Some(range)) = (building.effects.damage, building.effects.range) else {
            continue;
        };
        let cooldown = building
            .effects
            .fire_rate_ms
            .unwrap_or(DEFAULT_TURRET_FIRE_RATE_MS);
        if building.last_fire_ms.is_some_and(|last| now_ms - last < cooldown) {
            continue;
        }
        let target = nearest_within(pos.0, &enemies, range);
        if let Some(target) = target {
            building.last_fire_ms = Some(now_ms);
            events.push(GameEvent::new(
                GameEventKind::TurretFired {
                    building_id: building.id,
                    origin: pos.0,
                    target,
                    damage,
                },
                now_ms,
            ));
        }
    }
}

fn nearest_within(from: DVec2, points: &[DVec2], range: f64) -> Option<DVec2> {
    points
        .iter()
        .map(|p| (from.distance(*p), *p))
        .filter(|(d, _)| *d <= range)
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, p)| p)
}

/// Entity handle for a building id.
pub fn find(world: &World, id: u32) -> Option<Entity> {
    world
        .query::<&Building>()
        .iter()
        .find(|(_, building)| building.id == id)
        .map(|(entity, _)| entity)
}
