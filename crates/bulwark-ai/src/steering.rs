//! Target selection and per-tick steering for enemies.

use glam::DVec2;

use bulwark_core::enums::TargetKind;
use bulwark_core::math::direction;

use crate::profiles::EnemyBehaviorProfile;

/// Input for one enemy's steering step.
pub struct SteeringContext {
    pub position: DVec2,
    /// Units per tick.
    pub speed: f64,
    pub player: DVec2,
    pub base: DVec2,
}

/// Output of one steering step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteeringUpdate {
    pub target: TargetKind,
    pub position: DVec2,
    pub velocity: DVec2,
}

/// Pick the base or the player according to the archetype's profile.
pub fn select_target(profile: &EnemyBehaviorProfile, position: DVec2, player: DVec2) -> TargetKind {
    match profile.detection_radius {
        Some(radius) if position.distance(player) < radius => TargetKind::Player,
        _ => TargetKind::Base,
    }
}

/// Move `speed` units straight toward the selected target. An enemy already
/// sitting on its target stays put with zero velocity.
pub fn steer(profile: &EnemyBehaviorProfile, ctx: &SteeringContext) -> SteeringUpdate {
    let target = select_target(profile, ctx.position, ctx.player);
    let goal = match target {
        TargetKind::Player => ctx.player,
        TargetKind::Base => ctx.base,
    };
    match direction(ctx.position, goal) {
        Some(dir) => {
            let velocity = dir * ctx.speed;
            SteeringUpdate {
                target,
                position: ctx.position + velocity,
                velocity,
            }
        }
        None => SteeringUpdate {
            target,
            position: ctx.position,
            velocity: DVec2::ZERO,
        },
    }
}
