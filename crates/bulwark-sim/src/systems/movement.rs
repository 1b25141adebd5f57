//! Player movement from held direction keys, clamped to the play area.

use glam::DVec2;

use bulwark_core::components::Player;
use bulwark_core::config::{GameConfig, KeyBindings};
use bulwark_core::events::{GameEvent, GameEventKind};
use bulwark_core::input::InputSnapshot;

/// Direction intent from the held keys. Each axis is -1, 0 or 1; opposing
/// keys cancel.
pub fn intent(input: &InputSnapshot, keys: &KeyBindings) -> DVec2 {
    let axis = |neg: &str, pos: &str| {
        let mut v = 0.0;
        if input.is_down(neg) {
            v -= 1.0;
        }
        if input.is_down(pos) {
            v += 1.0;
        }
        v
    };
    DVec2::new(axis(&keys.left, &keys.right), axis(&keys.up, &keys.down))
}

/// Move the player `speed` units per held axis and clamp to the canvas.
pub fn run(
    player: &mut Player,
    input: &InputSnapshot,
    config: &GameConfig,
    now_ms: f64,
    events: &mut Vec<GameEvent>,
) {
    let dir = intent(input, &config.movement.key_bindings);
    player.velocity = dir * player.speed;
    if dir == DVec2::ZERO {
        return;
    }

    let before = player.position;
    player.position = config
        .canvas
        .bounds()
        .clamp_box(player.position + player.velocity, player.size);

    if player.position != before {
        events.push(GameEvent::new(
            GameEventKind::PlayerMoved {
                position: player.position,
            },
            now_ms,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world_setup::new_player;

    #[test]
    fn test_opposing_keys_cancel() {
        let keys = KeyBindings::default();
        let input = InputSnapshot::new().with_key("a").with_key("d").with_key("s");
        assert_eq!(intent(&input, &keys), DVec2::new(0.0, 1.0));
    }

    #[test]
    fn test_move_and_clamp() {
        let config = GameConfig::default();
        let mut player = new_player(&config);
        player.position = DVec2::new(100.0, 100.0);
        let mut events = Vec::new();

        run(&mut player, &InputSnapshot::new().with_key("d"), &config, 16.0, &mut events);
        assert_eq!(player.position, DVec2::new(110.0, 100.0));
        assert_eq!(events.len(), 1);

        player.position = DVec2::new(5.0, 5.0);
        run(
            &mut player,
            &InputSnapshot::new().with_key("a").with_key("w"),
            &config,
            32.0,
            &mut events,
        );
        let half = config.player.size / 2.0;
        assert_eq!(player.position, DVec2::new(half, half));
    }

    #[test]
    fn test_no_keys_no_event() {
        let config = GameConfig::default();
        let mut player = new_player(&config);
        let start = player.position;
        let mut events = Vec::new();
        run(&mut player, &InputSnapshot::new(), &config, 16.0, &mut events);
        assert_eq!(player.position, start);
        assert!(events.is_empty());
    }
}
