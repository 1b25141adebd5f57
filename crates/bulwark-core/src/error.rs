//! Rejections returned by engine mutators.
//!
//! None of these are fatal: the simulation keeps running and the caller
//! shows the message to the player.

use thiserror::Error;

use crate::enums::{BaseUpgradeKind, StatKind};

/// Why a building could not be placed, in validation order.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlacementError {
    #[error("unknown building type '{0}'")]
    UnknownType(String),

    #[error("requires player level {required} (current {current})")]
    LevelTooLow { required: u32, current: u32 },

    #[error("'{type_id}' is not available at level {level}")]
    NotAvailableAtLevel { type_id: String, level: u32 },

    #[error("position is outside the play area")]
    OutOfBounds,

    #[error("too close to building #{building_id}")]
    TooClose { building_id: u32 },

    #[error("maximum of {max} '{type_id}' buildings reached")]
    MaxCountReached { type_id: String, max: u32 },
}

/// Why a stat or base upgrade purchase failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UpgradeError {
    #[error("{0:?} upgrade is already at max level")]
    StatMaxLevel(StatKind),

    #[error("{0:?} base upgrade is already at max level")]
    BaseMaxLevel(BaseUpgradeKind),

    #[error("insufficient resources")]
    InsufficientResources,
}

/// A config patch that could not be applied.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config patch must be a JSON object")]
    NotAnObject,

    #[error("invalid config patch: {0}")]
    Invalid(#[from] serde_json::Error),
}
