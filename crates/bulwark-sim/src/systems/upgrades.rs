//! Purchases paid from the player's wallet: per-stat player upgrades and
//! base upgrade tracks.

use tracing::info;

use bulwark_core::components::{Base, Player};
use bulwark_core::config::GameConfig;
use bulwark_core::enums::{BaseUpgradeKind, StatKind};
use bulwark_core::error::UpgradeError;
use bulwark_core::events::{GameEvent, GameEventKind};

use crate::systems::progression::derive_stats;

/// Buy one level of `kind`. Returns the new level. A raised max health is
/// granted as current health too.
pub fn purchase_stat(
    player: &mut Player,
    kind: StatKind,
    config: &GameConfig,
    now_ms: f64,
    events: &mut Vec<GameEvent>,
) -> Result<u32, UpgradeError> {
    let stat = config.stats.stat(kind);
    let current = player.stat_levels.get(kind);
    if current >= stat.max_level {
        return Err(UpgradeError::StatMaxLevel(kind));
    }
    if !player.currencies.try_spend(&stat.cost) {
        return Err(UpgradeError::InsufficientResources);
    }

    let level = current + 1;
    *player.stat_levels.get_mut(kind) = level;

    let max_before = player.max_health;
    derive_stats(player, config);
    let gained = player.max_health - max_before;
    if gained > 0.0 {
        player.health = (player.health + gained).min(player.max_health);
    }

    info!(?kind, level, "stat upgraded");
    events.push(GameEvent::new(
        GameEventKind::StatUpgraded {
            stat: kind,
            level,
            cost: stat.cost,
        },
        now_ms,
    ));
    Ok(level)
}

/// Buy the next level on a base upgrade track. Returns the new level.
pub fn purchase_base(
    base: &mut Base,
    player: &mut Player,
    kind: BaseUpgradeKind,
    config: &GameConfig,
    now_ms: f64,
    events: &mut Vec<GameEvent>,
) -> Result<u32, UpgradeError> {
    let track = config.base.upgrades.track(kind);
    let current = base.upgrade_levels.get(kind);
    if current >= track.max_level() {
        return Err(UpgradeError::BaseMaxLevel(kind));
    }
    let idx = current as usize;
    let cost = track.costs[idx];
    if !player.currencies.try_spend(&cost) {
        return Err(UpgradeError::InsufficientResources);
    }

    let value = track.levels[idx];
    match kind {
        BaseUpgradeKind::Health => {
            let gained = value - base.max_health;
            base.max_health = value;
            base.health = (base.health + gained).clamp(0.0, value);
        }
        BaseUpgradeKind::Armor => base.armor = value.clamp(0.0, 1.0),
        BaseUpgradeKind::Shield => {
            base.max_shield = value;
            base.shield = value;
        }
        // Level only; read by the UI.
        BaseUpgradeKind::Turrets => {}
    }

    let level = current + 1;
    *base.upgrade_levels.get_mut(kind) = level;

    info!(?kind, level, "base upgraded");
    events.push(GameEvent::new(
        GameEventKind::BaseUpgraded {
            upgrade: kind,
            level,
            cost,
        },
        now_ms,
    ));
    Ok(level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bulwark_core::components::Currencies;

    use crate::world_setup::{new_base, new_player};

    fn rich_player(config: &GameConfig) -> Player {
        let mut player = new_player(config);
        player.currencies = Currencies::new(500, 50, 50);
        player
    }

    #[test]
    fn test_stat_purchase_spends_and_derives() {
        let config = GameConfig::default();
        let mut player = rich_player(&config);
        let mut events = Vec::new();

        let level = purchase_stat(&mut player, StatKind::Health, &config, 0.0, &mut events).unwrap();
        assert_eq!(level, 1);
        assert_eq!(player.max_health, 4.0);
        assert_eq!(player.health, 4.0);
        assert_eq!(player.currencies.energy_crystals, 470);
        assert!(matches!(events[0].kind, GameEventKind::StatUpgraded { level: 1, .. }));
    }

    #[test]
    fn test_stat_purchase_insufficient_leaves_state() {
        let config = GameConfig::default();
        let mut player = new_player(&config);
        let before = player.clone();
        let mut events = Vec::new();

        let err = purchase_stat(&mut player, StatKind::Damage, &config, 0.0, &mut events).unwrap_err();
        assert_eq!(err, UpgradeError::InsufficientResources);
        assert_eq!(player, before);
        assert!(events.is_empty());
    }

    #[test]
    fn test_stat_purchase_max_level() {
        let config = GameConfig::default();
        let mut player = rich_player(&config);
        player.stat_levels.armor = config.stats.armor.max_level;
        let mut events = Vec::new();

        let err = purchase_stat(&mut player, StatKind::Armor, &config, 0.0, &mut events).unwrap_err();
        assert_eq!(err, UpgradeError::StatMaxLevel(StatKind::Armor));
    }

    #[test]
    fn test_base_health_upgrade_heals_delta() {
        let config = GameConfig::default();
        let mut player = rich_player(&config);
        let mut base = new_base(&config);
        base.health = 80.0;
        let mut events = Vec::new();

        purchase_base(&mut base, &mut player, BaseUpgradeKind::Health, &config, 0.0, &mut events)
            .unwrap();
        assert_eq!(base.max_health, 150.0);
        assert_eq!(base.health, 130.0);
        assert_eq!(base.upgrade_levels.health, 1);
    }

    #[test]
    fn test_base_shield_upgrade_refills() {
        let config = GameConfig::default();
        let mut player = rich_player(&config);
        let mut base = new_base(&config);
        let mut events = Vec::new();

        purchase_base(&mut base, &mut player, BaseUpgradeKind::Shield, &config, 0.0, &mut events)
            .unwrap();
        assert_eq!(base.max_shield, 25.0);
        assert_eq!(base.shield, 25.0);
    }

    #[test]
    fn test_base_track_exhausts() {
        let config = GameConfig::default();
        let mut player = rich_player(&config);
        player.currencies = Currencies::new(100_000, 1_000, 1_000);
        let mut base = new_base(&config);
        let mut events = Vec::new();

        let max = config.base.upgrades.armor.max_level();
        for _ in 0..max {
            purchase_base(&mut base, &mut player, BaseUpgradeKind::Armor, &config, 0.0, &mut events)
                .unwrap();
        }
        let err = purchase_base(&mut base, &mut player, BaseUpgradeKind::Armor, &config, 0.0, &mut events)
            .unwrap_err();
        assert_eq!(err, UpgradeError::BaseMaxLevel(BaseUpgradeKind::Armor));
        assert_eq!(base.armor, 0.4);
    }
}
