//! Archetype-specific targeting profiles.

use bulwark_core::config::EnemiesConfig;
use bulwark_core::enums::EnemyKind;

/// Targeting behaviour for one archetype.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyBehaviorProfile {
    /// Player distance below which the enemy abandons the base and chases
    /// the player. `None` = never chases.
    pub detection_radius: Option<f64>,
}

/// Look up the profile for `kind` under the current enemy config.
pub fn get_profile(kind: EnemyKind, config: &EnemiesConfig) -> EnemyBehaviorProfile {
    match kind {
        // Basic enemies are base-seekers regardless of config.
        EnemyKind::Basic => EnemyBehaviorProfile {
            detection_radius: None,
        },
        EnemyKind::Elite | EnemyKind::Boss => EnemyBehaviorProfile {
            detection_radius: config.archetype(kind).detection_radius,
        },
    }
}
