//! Fixed simulation constants that are not part of the tunable config.

// --- Buildings ---

/// Maximum pylon-to-consumer distance for a power link.
pub const POWER_RANGE: f64 = 100.0;
/// Extra clearance required between two building footprints.
pub const BUILDING_BUFFER: f64 = 5.0;
/// Time a freshly placed building spends in CONSTRUCTING (ms).
pub const CONSTRUCTION_TIME_MS: f64 = 2000.0;

// --- Turret projectiles ---

pub const TURRET_BULLET_SPEED: f64 = 6.0;
pub const TURRET_BULLET_SIZE: f64 = 3.0;
pub const TURRET_BULLET_COLOR: &str = "#ffff00";

/// Turret cooldown when a type sets no `fire_rate_ms`.
pub const DEFAULT_TURRET_FIRE_RATE_MS: f64 = 1000.0;

// --- Waves ---

/// Quota factor applied on boss waves (30% fewer enemies).
pub const BOSS_WAVE_QUOTA_FACTOR: f64 = 0.7;

// --- Enemies ---

/// Horizontal offset past the right edge where enemies appear.
pub const ENEMY_SPAWN_OFFSET_X: f64 = 20.0;

// --- Resources ---

/// Fraction of the remaining distance covered by the pickup animation.
pub const PICKUP_PULL_FRACTION: f64 = 0.8;
/// Pickup progress after which the value is credited.
pub const PICKUP_CREDIT_PROGRESS: f64 = 0.8;
/// Radius of the random scatter applied to drops around the kill point.
pub const DROP_SCATTER: f64 = 10.0;
/// Elite tier-1 drop chance relative to the base tier-1 rate.
pub const ELITE_TIER1_FACTOR: f64 = 0.5;
pub const BOSS_TIER2_FACTOR: f64 = 1.5;
pub const BOSS_TIER1_FACTOR: f64 = 2.0;

// --- Combat ---

/// Damage a player takes when an enemy rams them, before armor.
pub const PLAYER_COLLISION_DAMAGE: f64 = 1.0;
/// Floor on the player's shot cooldown after fire-rate upgrades (ms).
pub const MIN_SHOOT_COOLDOWN_MS: f64 = 50.0;

// --- Input ---

/// Minimum time between two accepted pause toggles (ms).
pub const PAUSE_DEBOUNCE_MS: f64 = 200.0;
pub const ESCAPE_KEY: &str = "Escape";

// --- Presentation ---

/// How long an enemy reports itself as flashing after a hit (ms).
pub const HIT_FLASH_MS: f64 = 100.0;
