//! Spatial helpers shared by every subsystem.
//!
//! All positions are `glam::DVec2` in play-area units, origin top-left,
//! y growing downward.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned play area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Point lies inside the area (edges inclusive).
    pub fn contains(&self, p: DVec2) -> bool {
        p.x >= 0.0 && p.x <= self.width && p.y >= 0.0 && p.y <= self.height
    }

    /// A square of side `size` centered on `p` lies fully inside the area.
    pub fn contains_box(&self, p: DVec2, size: f64) -> bool {
        let half = size / 2.0;
        p.x - half >= 0.0
            && p.x + half <= self.width
            && p.y - half >= 0.0
            && p.y + half <= self.height
    }

    /// Clamp a centered square of side `size` so it stays inside the area.
    pub fn clamp_box(&self, p: DVec2, size: f64) -> DVec2 {
        let half = size / 2.0;
        DVec2::new(
            clamp_axis(p.x, half, self.width - half),
            clamp_axis(p.y, half, self.height - half),
        )
    }
}

// f64::clamp panics when min > max; a box wider than the area pins to its low edge.
fn clamp_axis(v: f64, min: f64, max: f64) -> f64 {
    if max < min {
        min
    } else {
        v.clamp(min, max)
    }
}

/// Euclidean distance between two points.
pub fn distance(a: DVec2, b: DVec2) -> f64 {
    a.distance(b)
}

/// Axis-aligned box overlap, each box centered on its position with
/// `size` as both width and height.
pub fn boxes_overlap(a: DVec2, size_a: f64, b: DVec2, size_b: f64) -> bool {
    let reach = (size_a + size_b) / 2.0;
    (a.x - b.x).abs() < reach && (a.y - b.y).abs() < reach
}

/// Unit vector from `from` toward `to`, or `None` when they coincide.
pub fn direction(from: DVec2, to: DVec2) -> Option<DVec2> {
    (to - from).try_normalize()
}
