//! Simulation engine for Bulwark.
//!
//! Owns the hecs ECS world, runs the per-frame subsystem pipeline and
//! produces `GameStateSnapshot`s plus domain events for the frontend.

pub mod engine;
pub mod render;
pub mod systems;
pub mod world_setup;

pub use bulwark_core as core;
pub use engine::{SimConfig, SimulationEngine};

#[cfg(test)]
mod tests;
