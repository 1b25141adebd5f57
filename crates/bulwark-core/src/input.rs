//! Per-update input snapshot supplied by the host.

use std::collections::BTreeSet;

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Keys held down plus pointer state for one update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputSnapshot {
    /// Key names as reported by the host (`"w"`, `" "`, `"Escape"`).
    pub keys: BTreeSet<String>,
    /// Pointer in play-area coordinates, if over the play area.
    pub pointer: Option<DVec2>,
    /// Pointer was clicked since the previous update.
    pub clicked: bool,
}

impl InputSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.keys.insert(key.into());
        self
    }

    pub fn with_pointer(mut self, x: f64, y: f64) -> Self {
        self.pointer = Some(DVec2::new(x, y));
        self
    }

    pub fn with_click(mut self) -> Self {
        self.clicked = true;
        self
    }

    /// Case-insensitive for single letters, exact otherwise.
    pub fn is_down(&self, key: &str) -> bool {
        self.keys.contains(key)
            || (key.len() == 1
                && self
                    .keys
                    .iter()
                    .any(|k| k.len() == 1 && k.eq_ignore_ascii_case(key)))
    }
}
