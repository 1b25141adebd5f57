//! Explosion particles: burst creation and per-tick decay.

use std::f64::consts::TAU;

use glam::DVec2;
use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use bulwark_core::components::{Particle, Position, Velocity};
use bulwark_core::config::ParticlesConfig;
use bulwark_core::events::{GameEvent, GameEventKind};

use crate::world_setup;

/// Spawn a ring of particles at `center` in `color` and report it.
pub fn explode(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    center: DVec2,
    color: &str,
    config: &ParticlesConfig,
    now_ms: f64,
    events: &mut Vec<GameEvent>,
) {
    let count = config.explosion_count;
    for i in 0..count {
        let angle = TAU * f64::from(i) / f64::from(count) + rng.gen::<f64>() * 0.5;
        let speed = config.explosion_speed * (0.5 + rng.gen::<f64>());
        let velocity = DVec2::new(angle.cos(), angle.sin()) * speed;
        world_setup::spawn_particle(
            world,
            center,
            velocity,
            config.explosion_size,
            color,
            config.explosion_life,
        );
    }
    events.push(GameEvent::new(
        GameEventKind::ExplosionCreated {
            position: center,
            particles: count,
        },
        now_ms,
    ));
}

/// Drift, apply friction, decay life and remove spent particles.
pub fn run(world: &mut World, config: &ParticlesConfig, despawn_buffer: &mut Vec<Entity>) {
    despawn_buffer.clear();
    for (entity, (pos, vel, particle)) in
        world.query_mut::<(&mut Position, &mut Velocity, &mut Particle)>()
    {
        pos.0 += vel.0;
        vel.0 *= config.friction;
        particle.life -= config.life_decay;
        if particle.life <= 0.0 {
            despawn_buffer.push(entity);
        }
    }
    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_explosion_spawns_configured_count() {
        let config = ParticlesConfig::default();
        let mut world = World::new();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut events = Vec::new();
        explode(&mut world, &mut rng, DVec2::new(10.0, 10.0), "#f00", &config, 0.0, &mut events);
        assert_eq!(world.query_mut::<&Particle>().into_iter().count(), 8);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_particles_expire_after_life_decays() {
        let config = ParticlesConfig {
            explosion_life: 0.05,
            life_decay: 0.02,
            ..Default::default()
        };
        let mut world = World::new();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut events = Vec::new();
        let mut buffer = Vec::new();
        explode(&mut world, &mut rng, DVec2::ZERO, "#f00", &config, 0.0, &mut events);

        run(&mut world, &config, &mut buffer);
        run(&mut world, &config, &mut buffer);
        assert_eq!(world.query_mut::<&Particle>().into_iter().count(), 8);
        run(&mut world, &config, &mut buffer);
        assert_eq!(world.query_mut::<&Particle>().into_iter().count(), 0);
    }

    #[test]
    fn test_friction_slows_particles() {
        let config = ParticlesConfig::default();
        let mut world = World::new();
        world_setup::spawn_particle(&mut world, DVec2::ZERO, DVec2::new(2.0, 0.0), 2.0, "#fff", 1.0);
        let mut buffer = Vec::new();
        run(&mut world, &config, &mut buffer);
        let (_, (pos, vel)) = world
            .query_mut::<(&Position, &Velocity)>()
            .into_iter()
            .next()
            .unwrap();
        assert_eq!(pos.0, DVec2::new(2.0, 0.0));
        assert!((vel.0.x - 1.96).abs() < 1e-12);
    }
}
