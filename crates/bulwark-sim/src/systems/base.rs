//! Base subsystem: armor-reduced damage absorbed shield-first, and passive
//! repair after a quiet period.

use tracing::warn;

use bulwark_core::components::Base;
use bulwark_core::config::BaseConfig;
use bulwark_core::events::{GameEvent, GameEventKind};

/// Damage left after armor; every hit deals at least 1.
pub fn effective_damage(damage: f64, armor: f64) -> f64 {
    (damage * (1.0 - armor)).max(1.0)
}

/// Apply one hit. Shield soaks first, the remainder comes off health.
/// Returns the post-armor damage.
pub fn apply_damage(base: &mut Base, damage: f64, now_ms: f64, events: &mut Vec<GameEvent>) -> f64 {
    let effective = effective_damage(damage, base.armor);
    let mut remaining = effective;

    if base.shield > 0.0 {
        let absorbed = remaining.min(base.shield);
        base.shield = (base.shield - absorbed).max(0.0);
        remaining -= absorbed;
        events.push(GameEvent::new(
            GameEventKind::BaseShieldDamaged {
                damage: absorbed,
                shield: base.shield,
                max_shield: base.max_shield,
            },
            now_ms,
        ));
    }

    if remaining > 0.0 {
        base.health = (base.health - remaining).max(0.0);
        events.push(GameEvent::new(
            GameEventKind::BaseDamaged {
                damage: remaining,
                health: base.health,
                max_health: base.max_health,
            },
            now_ms,
        ));
    }

    base.last_damage_ms = Some(now_ms);

    if base.health <= 0.0 && !base.destroyed {
        base.destroyed = true;
        warn!("base destroyed");
        events.push(GameEvent::new(GameEventKind::BaseDestroyed, now_ms));
    }
    effective
}

/// Regain `repair_rate * delta / 1000` health once the base has gone
/// `repair_delay_ms` without a hit.
pub fn repair(
    base: &mut Base,
    config: &BaseConfig,
    delta_ms: f64,
    now_ms: f64,
    events: &mut Vec<GameEvent>,
) {
    if base.destroyed || base.health >= base.max_health {
        return;
    }
    let quiet = base
        .last_damage_ms
        .map_or(true, |last| now_ms - last >= config.repair_delay_ms);
    if !quiet {
        return;
    }
    let before = base.health;
    base.health = (base.health + base.repair_rate * delta_ms / 1000.0).min(base.max_health);
    let amount = base.health - before;
    if amount > 0.0 {
        events.push(GameEvent::new(
            GameEventKind::BaseRepaired {
                amount,
                health: base.health,
            },
            now_ms,
        ));
    }
}
