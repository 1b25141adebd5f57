//! Player progression: experience, leveling, derived stats, damage intake
//! and currency credit.

use tracing::{info, warn};

use bulwark_core::components::Player;
use bulwark_core::config::GameConfig;
use bulwark_core::constants::MIN_SHOOT_COOLDOWN_MS;
use bulwark_core::enums::{ResourceTier, StatKind};
use bulwark_core::events::{GameEvent, GameEventKind};

/// Recompute every config-derived player stat from level and purchased
/// stat levels. Health is clamped to the new maximum, never raised.
pub fn derive_stats(player: &mut Player, config: &GameConfig) {
    let p = &config.player;
    let stats = &config.stats;
    let levels = &player.stat_levels;
    let gained_levels = f64::from(player.level.saturating_sub(p.starting_level));
    let bonus = |kind: StatKind| stats.stat(kind).per_level * f64::from(levels.get(kind));

    player.max_health =
        (p.starting_health + p.health_per_level * gained_levels + bonus(StatKind::Health)).max(1.0);
    player.speed = p.starting_speed + p.speed_per_level * gained_levels + bonus(StatKind::Speed);
    player.damage = config.weapons.damage + bonus(StatKind::Damage);
    player.shoot_cooldown_ms =
        (config.weapons.shoot_cooldown_ms - bonus(StatKind::FireRate)).max(MIN_SHOOT_COOLDOWN_MS);
    player.luck = bonus(StatKind::Luck).max(0.0);
    player.armor = bonus(StatKind::Armor).clamp(0.0, 1.0);
    player.health = player.health.clamp(0.0, player.max_health);
}

pub fn gain_experience(player: &mut Player, amount: u32, now_ms: f64, events: &mut Vec<GameEvent>) {
    if amount == 0 {
        return;
    }
    player.experience = player.experience.saturating_add(amount);
    events.push(GameEvent::new(
        GameEventKind::PlayerExperienceGained {
            amount,
            experience: player.experience,
        },
        now_ms,
    ));
}

/// Subtract `damage`, clamped to `[0, max_health]`.
pub fn take_damage(player: &mut Player, damage: f64, now_ms: f64, events: &mut Vec<GameEvent>) {
    let damage = damage.max(0.0);
    player.health = (player.health - damage).clamp(0.0, player.max_health);
    events.push(GameEvent::new(
        GameEventKind::PlayerDamageTaken {
            damage,
            health: player.health,
        },
        now_ms,
    ));
}

/// Add a collected pickup to the wallet, clamped to tier capacity.
pub fn credit(player: &mut Player, tier: ResourceTier, value: u32, config: &GameConfig) -> u32 {
    let capacity = config.resources.capacity();
    player.currencies.credit(tier, value, &capacity)
}

/// Resolve pending level-ups and report death once.
pub fn run(player: &mut Player, config: &GameConfig, now_ms: f64, events: &mut Vec<GameEvent>) {
    if player.experience_to_next > 0 && player.experience >= player.experience_to_next {
        let gained = player.experience / player.experience_to_next;
        player.experience %= player.experience_to_next;
        player.level += gained;
        player.experience_to_next = player.level * config.player.experience_per_level;
        derive_stats(player, config);
        player.health = player.max_health;

        info!(level = player.level, gained, "player leveled up");
        events.push(GameEvent::new(
            GameEventKind::PlayerLevelUp {
                level: player.level,
                levels_gained: gained,
            },
            now_ms,
        ));
    }

    if player.health <= 0.0 && !player.dead {
        player.dead = true;
        warn!(level = player.level, "player died");
        events.push(GameEvent::new(GameEventKind::PlayerDeath, now_ms));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    use crate::world_setup::new_player;

    #[test]
    fn test_new_player_matches_config() {
        let config = GameConfig::default();
        let player = new_player(&config);
        assert_eq!(player.health, 3.0);
        assert_eq!(player.max_health, 3.0);
        assert_eq!(player.level, 1);
        assert_eq!(player.experience_to_next, 10);
        assert_eq!(player.speed, 10.0);
        assert_eq!(player.damage, 1.0);
        assert_eq!(player.shoot_cooldown_ms, 300.0);
    }

    #[test]
    fn test_level_up_keeps_remainder_and_heals() {
        let config = GameConfig::default();
        let mut player = new_player(&config);
        player.health = 1.0;
        let mut events = Vec::new();
        gain_experience(&mut player, 13, 0.0, &mut events);
        run(&mut player, &config, 0.0, &mut events);

        assert_eq!(player.level, 2);
        assert_eq!(player.experience, 3);
        assert_eq!(player.experience_to_next, 20);
        assert_eq!(player.max_health, 4.0);
        assert_eq!(player.health, 4.0);
        assert!((player.speed - 10.2).abs() < 1e-9);
    }

    #[test]
    fn test_multiple_levels_in_one_step() {
        let config = GameConfig::default();
        let mut player = new_player(&config);
        let mut events = Vec::new();
        gain_experience(&mut player, 25, 0.0, &mut events);
        run(&mut player, &config, 0.0, &mut events);
        assert_eq!(player.level, 3);
        assert_eq!(player.experience, 5);
        assert_eq!(player.experience_to_next, 30);
        assert!(events
            .iter()
            .any(|e| e.kind == GameEventKind::PlayerLevelUp { level: 3, levels_gained: 2 }));
    }

    #[test]
    fn test_death_reported_once() {
        let config = GameConfig::default();
        let mut player = new_player(&config);
        let mut events = Vec::new();
        take_damage(&mut player, 10.0, 0.0, &mut events);
        assert_eq!(player.health, 0.0);
        run(&mut player, &config, 0.0, &mut events);
        run(&mut player, &config, 1.0, &mut events);
        let deaths = events.iter().filter(|e| e.kind == GameEventKind::PlayerDeath).count();
        assert_eq!(deaths, 1);
    }

    #[test]
    fn test_fire_rate_floor() {
        let mut config = GameConfig::default();
        config.stats.fire_rate.per_level = 1000.0;
        let mut player = new_player(&config);
        player.stat_levels.fire_rate = 1;
        derive_stats(&mut player, &config);
        assert_eq!(player.shoot_cooldown_ms, MIN_SHOOT_COOLDOWN_MS);
    }

    proptest! {
        #[test]
        fn prop_player_health_stays_in_range(hits in proptest::collection::vec(-5.0f64..5.0, 0..20)) {
            let config = GameConfig::default();
            let mut player = new_player(&config);
            let mut events = Vec::new();
            for hit in hits {
                take_damage(&mut player, hit, 0.0, &mut events);
                prop_assert!(player.health >= 0.0);
                prop_assert!(player.health <= player.max_health);
            }
        }
    }
}
