//! Enemy AI for BULWARK.
//!
//! Archetype-driven target selection and straight-line steering.
//! Pure functions over plain data, no ECS dependency.

pub mod profiles;
pub mod steering;

pub use bulwark_core as core;
