//! Core types and definitions for the BULWARK simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! components, configuration, state snapshots, events, input, errors and
//! constants. It holds no simulation loop and no rendering backend.

pub mod components;
pub mod config;
pub mod constants;
pub mod enums;
pub mod error;
pub mod events;
pub mod input;
pub mod math;
pub mod state;
