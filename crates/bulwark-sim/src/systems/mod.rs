//! Per-tick subsystems.
//!
//! Systems are free functions over the world and the engine's singletons.
//! They do not own state. Cross-subsystem side effects travel as events
//! that the engine applies.

pub mod base;
pub mod buildings;
pub mod collision;
pub mod enemy;
pub mod movement;
pub mod particles;
pub mod progression;
pub mod resources;
pub mod snapshot;
pub mod upgrades;
pub mod wave;
pub mod weapon;
