//! Read-only draw pass over a snapshot.
//!
//! The engine never draws. It walks the snapshot in a fixed layer order and
//! hands primitives to a caller-supplied `DrawSurface`.

use glam::DVec2;

use bulwark_core::config::CanvasConfig;
use bulwark_core::enums::BuildingStatus;
use bulwark_core::state::GameStateSnapshot;

const POWER_LINE_COLOR: &str = "#44ffff";
const PREVIEW_VALID_COLOR: &str = "#00ff0080";
const PREVIEW_INVALID_COLOR: &str = "#ff000080";
const HIT_FLASH_COLOR: &str = "#ffffff";
const SHIELD_COLOR: &str = "#66ccff";
const BAR_BACK_COLOR: &str = "#333333";
const BAR_FILL_COLOR: &str = "#00ff00";
const UNPOWERED_COLOR: &str = "#555555";

/// Draw order of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Layer {
    Background,
    Base,
    Buildings,
    PowerLines,
    Particles,
    Enemies,
    Projectiles,
    Resources,
    PlacementPreview,
    Player,
    HealthBar,
}

impl Layer {
    pub const ORDER: [Layer; 11] = [
        Layer::Background,
        Layer::Base,
        Layer::Buildings,
        Layer::PowerLines,
        Layer::Particles,
        Layer::Enemies,
        Layer::Projectiles,
        Layer::Resources,
        Layer::PlacementPreview,
        Layer::Player,
        Layer::HealthBar,
    ];
}

/// Drawing primitives a frontend provides. Positions are centers.
pub trait DrawSurface {
    fn clear(&mut self, width: f64, height: f64, color: &str);
    fn grid(&mut self, width: f64, height: f64, spacing: f64, color: &str);
    fn rect(&mut self, center: DVec2, size: f64, color: &str, alpha: f64);
    fn circle(&mut self, center: DVec2, radius: f64, color: &str, alpha: f64);
    fn line(&mut self, from: DVec2, to: DVec2, color: &str);
    /// Horizontal bar `fraction` full, centered on `center`.
    fn bar(&mut self, center: DVec2, width: f64, fraction: f64, fill: &str, back: &str);

    /// Called before each layer is drawn.
    fn layer(&mut self, _layer: Layer) {}
}

pub fn render(snapshot: &GameStateSnapshot, canvas: &CanvasConfig, surface: &mut impl DrawSurface) {
    for layer in Layer::ORDER {
        surface.layer(layer);
        match layer {
            Layer::Background => {
                surface.clear(canvas.width, canvas.height, &canvas.background_color);
                if canvas.show_grid {
                    surface.grid(canvas.width, canvas.height, canvas.grid_size, &canvas.grid_color);
                }
            }
            Layer::Base => {
                let base = &snapshot.base;
                surface.rect(base.position, base.size, &base.color, 1.0);
                if base.shield > 0.0 {
                    surface.circle(base.position, base.size, SHIELD_COLOR, 0.3);
                }
                if base.max_health > 0.0 {
                    surface.bar(
                        base.position - DVec2::new(0.0, base.size),
                        base.size,
                        base.health / base.max_health,
                        BAR_FILL_COLOR,
                        BAR_BACK_COLOR,
                    );
                }
            }
            Layer::Buildings => {
                for b in &snapshot.buildings {
                    let (color, alpha) = match b.status {
                        BuildingStatus::Constructing | BuildingStatus::Placing => {
                            (b.color.as_str(), 0.3 + 0.7 * b.construction_progress)
                        }
                        BuildingStatus::Unpowered => (UNPOWERED_COLOR, 1.0),
                        BuildingStatus::Destroyed => continue,
                        _ => (b.color.as_str(), 1.0),
                    };
                    surface.rect(b.position, b.size, color, alpha);
                }
            }
            Layer::PowerLines => {
                for link in &snapshot.power_links {
                    surface.line(link.from, link.to, POWER_LINE_COLOR);
                }
            }
            Layer::Particles => {
                for p in &snapshot.particles {
                    surface.rect(p.position, p.size, &p.color, p.alpha);
                }
            }
            Layer::Enemies => {
                for e in &snapshot.enemies {
                    let color = if e.flashing { HIT_FLASH_COLOR } else { e.color.as_str() };
                    surface.rect(e.position, e.size, color, 1.0);
                }
            }
            Layer::Projectiles => {
                for b in &snapshot.bullets {
                    surface.rect(b.position, b.size, &b.color, 1.0);
                }
            }
            Layer::Resources => {
                for p in &snapshot.pickups {
                    surface.circle(p.position, p.size / 2.0, &p.color, 1.0);
                }
            }
            Layer::PlacementPreview => {
                if let Some(preview) = &snapshot.placement_preview {
                    let color = if preview.valid {
                        PREVIEW_VALID_COLOR
                    } else {
                        PREVIEW_INVALID_COLOR
                    };
                    surface.rect(preview.position, preview.size, color, 0.5);
                }
            }
            Layer::Player => {
                let player = &snapshot.player;
                surface.rect(player.position, player.size, &player.color, 1.0);
            }
            Layer::HealthBar => {
                let player = &snapshot.player;
                if player.max_health > 0.0 {
                    surface.bar(
                        DVec2::new(canvas.width / 2.0, 20.0),
                        200.0,
                        player.health / player.max_health,
                        BAR_FILL_COLOR,
                        BAR_BACK_COLOR,
                    );
                }
            }
        }
    }
}
