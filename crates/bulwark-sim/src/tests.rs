//! Engine-level tests: determinism, the tick pipeline and the UI-facing
//! mutator surface.

use glam::DVec2;
use proptest::prelude::*;
use serde_json::json;

use bulwark_core::components::{Bullet, Building, Currencies, Enemy, Pickup, Position};
use bulwark_core::enums::*;
use bulwark_core::error::{ConfigError, PlacementError, UpgradeError};
use bulwark_core::events::GameEventKind;
use bulwark_core::input::InputSnapshot;

use crate::engine::{SimConfig, SimulationEngine};
use crate::render::{DrawSurface, Layer};
use crate::world_setup;

const TICK: f64 = 16.0;

fn engine() -> SimulationEngine {
    SimulationEngine::new(SimConfig::default())
}

fn seeded(seed: u64) -> SimulationEngine {
    SimulationEngine::new(SimConfig {
        seed,
        ..Default::default()
    })
}

/// Skip preparation and run one tick so the first enemy is out.
fn combat_engine() -> SimulationEngine {
    let mut engine = engine();
    assert!(engine.start_next_wave());
    engine.update(TICK, &InputSnapshot::new());
    engine
}

fn idle(engine: &mut SimulationEngine, ticks: usize) {
    for _ in 0..ticks {
        engine.update(TICK, &InputSnapshot::new());
    }
}

fn shoot() -> InputSnapshot {
    InputSnapshot::new().with_key(" ")
}

fn enemy_count(engine: &SimulationEngine) -> usize {
    let n = engine.world().query::<&Enemy>().iter().count();
    n
}

fn bullets(engine: &SimulationEngine) -> Vec<Bullet> {
    let v = engine
        .world()
        .query::<&Bullet>()
        .iter()
        .map(|(_, b)| *b)
        .collect();
    v
}

fn has_event(engine: &SimulationEngine, pred: impl Fn(&GameEventKind) -> bool) -> bool {
    engine.events().iter().any(|e| pred(&e.kind))
}

fn basic_enemy() -> Enemy {
    Enemy {
        kind: EnemyKind::Basic,
        speed: 1.0,
        health: 1.0,
        max_health: 1.0,
        experience_value: 1,
        base_damage: 10.0,
        wave: 1,
        hit_flash_ms: None,
        target: TargetKind::Base,
    }
}

// ---- Determinism ----

#[test]
fn test_determinism_same_seed() {
    let mut a = seeded(12345);
    let mut b = seeded(12345);
    a.start_next_wave();
    b.start_next_wave();

    for tick in 0..600 {
        let input = if tick % 3 == 0 { shoot() } else { InputSnapshot::new() };
        a.update(TICK, &input);
        b.update(TICK, &input);

        let json_a = serde_json::to_string(&a.snapshot()).unwrap();
        let json_b = serde_json::to_string(&b.snapshot()).unwrap();
        assert_eq!(json_a, json_b, "Snapshots diverged with same seed at tick {tick}");
        assert_eq!(a.events(), b.events());
    }
}

#[test]
fn test_determinism_different_seeds() {
    let mut a = seeded(111);
    let mut b = seeded(222);
    a.start_next_wave();
    b.start_next_wave();

    let mut diverged = false;
    for _ in 0..200 {
        a.update(TICK, &InputSnapshot::new());
        b.update(TICK, &InputSnapshot::new());
        if a.snapshot() != b.snapshot() {
            diverged = true;
            break;
        }
    }
    assert!(diverged, "Different seeds should produce divergent output");
}

// ---- Weapon ----

#[test]
fn test_two_shots_within_cooldown_fire_once() {
    let mut engine = engine();
    engine.update(TICK, &shoot());
    engine.update(TICK, &shoot());

    assert_eq!(bullets(&engine).len(), 1);
    assert_eq!(engine.ammo(), engine.max_ammo() - 1);
}

#[test]
fn test_no_ammo_no_projectile() {
    let mut engine = engine();
    engine.configure(&json!({ "weapons": { "max_ammo": 0 } })).unwrap();
    assert_eq!(engine.ammo(), 0);

    engine.update(TICK, &shoot());
    assert!(bullets(&engine).is_empty());
    assert!(!has_event(&engine, |k| matches!(k, GameEventKind::BulletFired { .. })));
}

#[test]
fn test_shots_after_cooldown() {
    let mut engine = engine();
    engine.update(TICK, &shoot());
    engine.update(300.0, &shoot());
    assert_eq!(bullets(&engine).len(), 2);
}

#[test]
fn test_click_fires_toward_pointer() {
    let mut engine = engine();
    let input = InputSnapshot::new().with_pointer(1500.0, 752.0).with_click();
    engine.update(TICK, &input);

    let fired = engine.events().iter().find_map(|e| match e.kind {
        GameEventKind::BulletFired { velocity, .. } => Some(velocity),
        _ => None,
    });
    let velocity = fired.expect("click should fire");
    assert!(velocity.x > 0.0);
    assert!(velocity.y.abs() < 1e-9);
}

#[test]
fn test_refill_ammo() {
    let mut engine = engine();
    engine.update(TICK, &shoot());
    assert!(engine.ammo() < engine.max_ammo());
    engine.refill_ammo();
    assert_eq!(engine.ammo(), engine.max_ammo());
}

#[test]
fn test_ammo_regenerates_one_per_interval() {
    let mut engine = engine();
    engine.configure(&json!({ "weapons": { "shoot_cooldown_ms": 50.0 } })).unwrap();
    for _ in 0..5 {
        engine.update(60.0, &shoot());
    }
    let after_burst = engine.ammo();
    assert!(after_burst < engine.max_ammo());

    // One interval later exactly one round is back.
    engine.update(500.0, &InputSnapshot::new());
    assert_eq!(engine.ammo(), after_burst + 1);
}

// ---- Enemies & waves ----

#[test]
fn test_enemy_moves_exactly_speed_toward_target() {
    let mut engine = combat_engine();
    assert_eq!(enemy_count(&engine), 1);

    let (before, speed) = {
        let mut q = engine.world().query::<(&Position, &Enemy)>();
        let (_, (pos, enemy)) = q.iter().next().unwrap();
        (pos.0, enemy.speed)
    };
    assert_eq!(before.x, engine.config().canvas.width + 20.0);

    engine.update(TICK, &InputSnapshot::new());

    let after = {
        let mut q = engine.world().query::<(&Position, &Enemy)>();
        let (_, (pos, _)) = q.iter().next().unwrap();
        pos.0
    };
    assert_eq!(enemy_count(&engine), 1);
    assert!((before.distance(after) - speed).abs() < 1e-9);
    let base = engine.base().position;
    assert!((before.distance(base) - after.distance(base) - speed).abs() < 1e-9);
}

#[test]
fn test_alive_count_matches_enemies_every_tick() {
    let mut engine = combat_engine();
    engine.configure(&json!({ "enemies": { "wave_spawn_delay_ms": 20.0 } })).unwrap();
    engine.spawn_dev_enemy(EnemyKind::Elite);

    for tick in 0..400 {
        let input = if tick % 2 == 0 { shoot() } else { InputSnapshot::new() };
        engine.update(TICK, &input);
        assert_eq!(
            engine.enemies_alive() as usize,
            enemy_count(&engine),
            "alive counter drifted at tick {tick}"
        );
    }
}

#[test]
fn test_dev_enemy_not_counted_as_spawned() {
    let mut engine = engine();
    engine.spawn_dev_enemy(EnemyKind::Boss);
    assert_eq!(engine.enemies_alive(), 1);
    assert_eq!(engine.enemies_spawned(), 0);

    engine.update(TICK, &InputSnapshot::new());
    assert!(has_event(&engine, |k| matches!(
        k,
        GameEventKind::EnemySpawned {
            kind: EnemyKind::Boss,
            ..
        }
    )));
}

#[test]
fn test_preparation_times_out_into_combat() {
    let mut engine = engine();
    let prep = engine.config().wave.preparation_duration_ms;
    engine.update(prep, &InputSnapshot::new());

    assert_eq!(engine.wave_phase(), WavePhase::Combat);
    assert_eq!(engine.enemy_quota(), 5);
    assert!(has_event(&engine, |k| matches!(
        k,
        GameEventKind::WaveCombatStarted { wave: 1, enemy_quota: 5, .. }
    )));
}

#[test]
fn test_start_next_wave_refused_in_combat() {
    let mut engine = combat_engine();
    assert!(!engine.start_next_wave());
    assert_eq!(engine.wave_phase(), WavePhase::Combat);
}

// ---- Collisions ----

#[test]
fn test_bullet_kills_enemy_and_grants_experience() {
    let mut engine = engine();
    let player_pos = engine.player().position;
    {
        let (world, _, _, wave) = engine.parts_mut();
        // Where the shot lands after its first step.
        world_setup::spawn_enemy(
            world,
            DVec2::new(player_pos.x, player_pos.y - 16.0),
            6.0,
            "#ff0066",
            Enemy {
                speed: 0.0,
                ..basic_enemy()
            },
        );
        wave.enemies_alive = 1;
    }

    engine.update(TICK, &shoot());

    assert_eq!(enemy_count(&engine), 0);
    assert!(bullets(&engine).is_empty());
    assert_eq!(engine.enemies_alive(), 0);
    assert_eq!(engine.player().experience, 1);
    assert!(has_event(&engine, |k| matches!(
        k,
        GameEventKind::EnemyDestroyed {
            cause: DestroyCause::Projectile,
            ..
        }
    )));
    assert!(has_event(&engine, |k| matches!(k, GameEventKind::ExplosionCreated { .. })));
}

#[test]
fn test_enemy_rams_player() {
    let mut engine = engine();
    let player_pos = engine.player().position;
    {
        let (world, _, _, _) = engine.parts_mut();
        world_setup::spawn_enemy(
            world,
            player_pos,
            6.0,
            "#ff0066",
            Enemy {
                speed: 0.0,
                ..basic_enemy()
            },
        );
    }

    engine.update(TICK, &InputSnapshot::new());

    assert_eq!(engine.player().health, 2.0);
    assert_eq!(enemy_count(&engine), 0);
    assert!(has_event(&engine, |k| matches!(
        k,
        GameEventKind::EnemyDestroyed {
            cause: DestroyCause::PlayerImpact,
            ..
        }
    )));
}

#[test]
fn test_base_destroyed_ends_game() {
    let mut engine = engine();
    let base_pos = engine.base().position;
    {
        let (world, _, base, _) = engine.parts_mut();
        base.health = 5.0;
        world_setup::spawn_enemy(world, base_pos, 6.0, "#ff0066", basic_enemy());
    }

    engine.update(TICK, &InputSnapshot::new());

    assert!(engine.is_game_over());
    assert_eq!(engine.base().health, 0.0);
    assert!(has_event(&engine, |k| matches!(k, GameEventKind::BaseDestroyed)));
    assert!(has_event(&engine, |k| matches!(
        k,
        GameEventKind::GameOver {
            reason: GameOverReason::BaseDestroyed,
            ..
        }
    )));

    // Frozen: the clock no longer advances and nothing else is emitted.
    let now = engine.now_ms();
    engine.update(TICK, &shoot());
    assert_eq!(engine.now_ms(), now);
    assert!(engine.events().is_empty());
}

#[test]
fn test_player_death_ends_game() {
    let mut engine = engine();
    {
        let (_, player, _, _) = engine.parts_mut();
        player.health = 0.0;
    }
    engine.update(TICK, &InputSnapshot::new());

    assert!(engine.is_game_over());
    assert!(has_event(&engine, |k| matches!(k, GameEventKind::PlayerDeath)));
    assert!(has_event(&engine, |k| matches!(
        k,
        GameEventKind::GameOver {
            reason: GameOverReason::PlayerDestroyed,
            ..
        }
    )));
}

// ---- Pause ----

#[test]
fn test_pause_freezes_entities_but_not_wave_timer() {
    let mut engine = combat_engine();
    idle(&mut engine, 5);
    engine.set_paused(true);
    engine.update(TICK, &InputSnapshot::new());
    assert!(has_event(&engine, |k| matches!(k, GameEventKind::GamePaused)));

    let frozen = engine.snapshot();
    idle(&mut engine, 20);
    let later = engine.snapshot();

    assert_eq!(frozen.enemies, later.enemies);
    assert_eq!(frozen.player, later.player);
    assert_eq!(frozen.ammo, later.ammo);
    assert!(later.wave.time_remaining_ms < frozen.wave.time_remaining_ms);
}

#[test]
fn test_pause_key_edge_and_debounce() {
    let mut engine = engine();
    let p = InputSnapshot::new().with_key("p");

    engine.update(TICK, &p);
    assert!(engine.is_paused());

    // Held: no new edge.
    engine.update(TICK, &p);
    assert!(engine.is_paused());

    // Released and pressed again inside the debounce window.
    engine.update(TICK, &InputSnapshot::new());
    engine.update(TICK, &p);
    assert!(engine.is_paused());

    engine.update(300.0, &InputSnapshot::new());
    engine.update(TICK, &InputSnapshot::new().with_key("Escape"));
    assert!(!engine.is_paused());
    assert!(has_event(&engine, |k| matches!(k, GameEventKind::GameResumed)));
}

#[test]
fn test_pause_freezes_construction() {
    let mut engine = engine();
    let id = engine.place_building("pylon", DVec2::new(400.0, 300.0)).unwrap();
    engine.update(1000.0, &InputSnapshot::new());

    engine.set_paused(true);
    for _ in 0..30 {
        engine.update(100.0, &InputSnapshot::new());
    }
    let paused = engine.snapshot();
    let view = paused.buildings.iter().find(|b| b.id == id).unwrap();
    assert_eq!(view.status, BuildingStatus::Constructing);
    assert_eq!(view.construction_progress, 0.5);
    assert_eq!(engine.sim_ms(), 1000.0);
    assert_eq!(engine.now_ms(), 4000.0);

    engine.set_paused(false);
    engine.update(500.0, &InputSnapshot::new());
    let resumed = engine.snapshot();
    let view = resumed.buildings.iter().find(|b| b.id == id).unwrap();
    assert_eq!(view.status, BuildingStatus::Constructing);
    assert_eq!(view.construction_progress, 0.75);

    engine.update(600.0, &InputSnapshot::new());
    assert!(has_event(&engine, |k| matches!(
        k,
        GameEventKind::BuildingConstructed { building_id } if *building_id == id
    )));
}

#[test]
fn test_pause_freezes_pickup_pull() {
    let mut engine = engine();
    let config = engine.config().clone();
    let player_pos = engine.player().position;
    {
        let (world, _, _, _) = engine.parts_mut();
        world_setup::spawn_pickup(
            world,
            player_pos + DVec2::new(10.0, 0.0),
            ResourceTier::EnergyCrystal,
            3,
            &config,
        );
    }
    engine.update(50.0, &InputSnapshot::new());
    assert!(has_event(&engine, |k| matches!(k, GameEventKind::ResourcePickupStarted { .. })));

    engine.set_paused(true);
    for _ in 0..10 {
        engine.update(100.0, &InputSnapshot::new());
    }
    engine.set_paused(false);
    engine.update(50.0, &InputSnapshot::new());

    assert!(!has_event(&engine, |k| matches!(k, GameEventKind::ResourceCollected { .. })));
    assert_eq!(engine.player().currencies.energy_crystals, 0);
    let left = engine.world().query::<&Pickup>().iter().count();
    assert_eq!(left, 1);
}

// ---- Config ----

#[test]
fn test_empty_configure_is_noop() {
    let mut engine = combat_engine();
    idle(&mut engine, 10);
    let before = engine.snapshot();
    let config_before = engine.config().clone();

    engine.configure(&json!({})).unwrap();

    assert_eq!(engine.snapshot(), before);
    assert_eq!(engine.config(), &config_before);
}

#[test]
fn test_configure_rederives_player() {
    let mut engine = engine();
    engine
        .configure(&json!({ "player": { "starting_speed": 14.0 } }))
        .unwrap();
    assert_eq!(engine.player().speed, 14.0);
    // Unpatched siblings survive the merge.
    assert_eq!(engine.config().player.starting_health, 3.0);
}

#[test]
fn test_configure_rejects_bad_patch() {
    let mut engine = engine();
    assert!(matches!(engine.configure(&json!(5)), Err(ConfigError::NotAnObject)));
    assert!(matches!(
        engine.configure(&json!({ "weapons": { "max_ammo": "lots" } })),
        Err(ConfigError::Invalid(_))
    ));
    assert_eq!(engine.config().weapons.max_ammo, 20);
}

#[test]
fn test_configure_clamps_wallet_to_new_capacity() {
    let mut engine = engine();
    {
        let (_, player, _, _) = engine.parts_mut();
        player.currencies = Currencies::new(500, 2, 0);
    }
    engine
        .configure(&json!({ "resources": { "energy_crystal": { "max_capacity": 100 } } }))
        .unwrap();
    assert_eq!(engine.player().currencies, Currencies::new(100, 2, 0));
}

// ---- Reset ----

#[test]
fn test_reset_restores_initial_state() {
    let mut engine = combat_engine();
    for _ in 0..100 {
        engine.update(TICK, &shoot());
    }
    engine.reset_game();

    let fresh = SimulationEngine::new(SimConfig::default()).snapshot();
    let snap = engine.snapshot();
    assert_eq!(snap.player, fresh.player);
    assert_eq!(snap.base, fresh.base);
    assert!(snap.enemies.is_empty());
    assert!(snap.bullets.is_empty());
    assert_eq!(snap.wave.number, 1);
    assert_eq!(snap.wave.phase, WavePhase::Preparation);
    assert_eq!(snap.ammo, fresh.ammo);

    engine.update(TICK, &InputSnapshot::new());
    assert!(has_event(&engine, |k| matches!(k, GameEventKind::GameReset)));
}

// ---- Resources ----

#[test]
fn test_pickup_credits_player_once() {
    let mut engine = engine();
    let config = engine.config().clone();
    let player_pos = engine.player().position;
    {
        let (world, _, _, _) = engine.parts_mut();
        world_setup::spawn_pickup(
            world,
            player_pos + DVec2::new(10.0, 0.0),
            ResourceTier::EnergyCrystal,
            3,
            &config,
        );
    }

    let mut collected = 0;
    for _ in 0..10 {
        engine.update(50.0, &InputSnapshot::new());
        collected += engine
            .events()
            .iter()
            .filter(|e| matches!(e.kind, GameEventKind::ResourceCollected { .. }))
            .count();
    }

    assert_eq!(collected, 1);
    assert_eq!(engine.player().currencies.energy_crystals, 3);
    let left = engine.world().query::<&Pickup>().iter().count();
    assert_eq!(left, 0);
}

// ---- Buildings ----

#[test]
fn test_placement_mode_flow() {
    let mut engine = engine();
    assert_eq!(
        engine.begin_placement("turret"),
        Err(PlacementError::LevelTooLow {
            required: 2,
            current: 1
        })
    );
    engine.begin_placement("pylon").unwrap();
    assert!(engine.is_placing());

    engine.update(TICK, &InputSnapshot::new().with_pointer(400.0, 300.0));
    let preview = engine.snapshot().placement_preview.unwrap();
    assert!(preview.valid);
    assert!(has_event(&engine, |k| matches!(k, GameEventKind::PlacementModeStarted { .. })));

    engine.update(TICK, &InputSnapshot::new().with_pointer(400.0, 300.0).with_click());
    assert!(!engine.is_placing());
    assert!(bullets(&engine).is_empty());
    assert!(has_event(&engine, |k| matches!(
        k,
        GameEventKind::BuildingPlaced { building_id: 1, .. }
    )));
    assert_eq!(engine.snapshot().buildings.len(), 1);
}

#[test]
fn test_cancel_placement() {
    let mut engine = engine();
    engine.begin_placement("pylon").unwrap();
    engine.cancel_placement();
    assert!(!engine.is_placing());
    engine.update(TICK, &InputSnapshot::new());
    assert!(has_event(&engine, |k| matches!(k, GameEventKind::PlacementModeCancelled)));
}

#[test]
fn test_powered_turret_fires_projectile() {
    let mut engine = engine();
    {
        let (_, player, _, _) = engine.parts_mut();
        player.level = 2;
    }
    let pylon = engine.place_building("pylon", DVec2::new(400.0, 300.0)).unwrap();
    let turret = engine.place_building("turret", DVec2::new(450.0, 300.0)).unwrap();
    assert_eq!((pylon, turret), (1, 2));

    engine.update(2100.0, &InputSnapshot::new());
    let snap = engine.snapshot();
    let turret_view = snap.buildings.iter().find(|b| b.id == turret).unwrap();
    assert_eq!(turret_view.status, BuildingStatus::Powered);
    assert_eq!(turret_view.powered_by, vec![pylon]);
    assert_eq!(snap.power_links.len(), 1);

    {
        let (world, _, _, _) = engine.parts_mut();
        world_setup::spawn_enemy(world, DVec2::new(500.0, 300.0), 6.0, "#ff0066", basic_enemy());
    }
    engine.update(TICK, &InputSnapshot::new());

    assert!(has_event(&engine, |k| matches!(
        k,
        GameEventKind::TurretFired { building_id: 2, .. }
    )));
    let turret_shots = bullets(&engine)
        .iter()
        .filter(|b| b.source == BulletSource::Turret)
        .count();
    assert_eq!(turret_shots, 1);
}

#[test]
fn test_unpowered_turret_holds_fire() {
    let mut engine = engine();
    {
        let (_, player, _, _) = engine.parts_mut();
        player.level = 2;
    }
    engine.place_building("turret", DVec2::new(450.0, 300.0)).unwrap();
    engine.update(2100.0, &InputSnapshot::new());
    {
        let (world, _, _, _) = engine.parts_mut();
        world_setup::spawn_enemy(world, DVec2::new(500.0, 300.0), 6.0, "#ff0066", basic_enemy());
    }
    engine.update(TICK, &InputSnapshot::new());

    let status = {
        let mut q = engine.world().query::<&Building>();
        let status = q.iter().next().map(|(_, b)| b.status);
        status
    };
    assert_eq!(status, Some(BuildingStatus::Unpowered));
    assert!(bullets(&engine).is_empty());
}

// ---- Upgrades ----

#[test]
fn test_upgrades_through_engine() {
    let mut engine = engine();
    assert_eq!(
        engine.upgrade_stat(StatKind::Speed),
        Err(UpgradeError::InsufficientResources)
    );
    {
        let (_, player, _, _) = engine.parts_mut();
        player.currencies = Currencies::new(200, 5, 5);
    }
    assert_eq!(engine.upgrade_stat(StatKind::Speed), Ok(1));
    assert!((engine.player().speed - 10.3).abs() < 1e-9);
    assert_eq!(engine.upgrade_base(BaseUpgradeKind::Shield), Ok(1));
    assert_eq!(engine.base().shield, 25.0);

    engine.update(TICK, &InputSnapshot::new());
    assert!(has_event(&engine, |k| matches!(k, GameEventKind::StatUpgraded { .. })));
    assert!(has_event(&engine, |k| matches!(k, GameEventKind::BaseUpgraded { .. })));
}

// ---- Render ----

#[derive(Default)]
struct Recorder {
    layers: Vec<Layer>,
    rects: usize,
    lines: usize,
}

impl DrawSurface for Recorder {
    fn clear(&mut self, _width: f64, _height: f64, _color: &str) {}
    fn grid(&mut self, _width: f64, _height: f64, _spacing: f64, _color: &str) {}
    fn rect(&mut self, _center: DVec2, _size: f64, _color: &str, _alpha: f64) {
        self.rects += 1;
    }
    fn circle(&mut self, _center: DVec2, _radius: f64, _color: &str, _alpha: f64) {}
    fn line(&mut self, _from: DVec2, _to: DVec2, _color: &str) {
        self.lines += 1;
    }
    fn bar(&mut self, _center: DVec2, _width: f64, _fraction: f64, _fill: &str, _back: &str) {}

    fn layer(&mut self, layer: Layer) {
        self.layers.push(layer);
    }
}

#[test]
fn test_render_layer_order() {
    let mut engine = engine();
    engine.update(TICK, &shoot());

    let mut surface = Recorder::default();
    engine.render(&mut surface);

    assert_eq!(surface.layers, Layer::ORDER.to_vec());
    // Base, bullet and player.
    assert_eq!(surface.rects, 3);
    assert_eq!(surface.lines, 0);
}

// ---- Properties ----

proptest! {
    #[test]
    fn prop_ammo_and_health_stay_bounded(
        steps in prop::collection::vec((1.0f64..120.0, any::<bool>()), 1..80)
    ) {
        let mut engine = engine();
        engine.start_next_wave();
        for (delta, fire) in steps {
            let input = if fire { shoot() } else { InputSnapshot::new() };
            engine.update(delta, &input);
            prop_assert!(engine.ammo() <= engine.max_ammo());
            let player = engine.player();
            prop_assert!(player.health >= 0.0 && player.health <= player.max_health);
        }
    }
}
