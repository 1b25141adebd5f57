//! bulwark-run: drive the simulation headless with a fixed delta.
//!
//! Usage:
//!   bulwark-run --ticks 3600 --delta 16 --seed 7 --fire

use std::process;

use serde_json::json;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bulwark_core::input::InputSnapshot;
use bulwark_sim::{SimConfig, SimulationEngine};

struct RunOptions {
    ticks: u64,
    delta_ms: f64,
    seed: u64,
    fire: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            ticks: 3600,
            delta_ms: 16.0,
            seed: 42,
            fire: false,
        }
    }
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let opts = match parse_args(&args) {
        Ok(opts) => opts,
        Err(msg) => {
            eprintln!("{msg}");
            print_usage();
            process::exit(1);
        }
    };

    run(&opts);
}

fn print_usage() {
    eprintln!(
        "bulwark-run: headless wave-survival simulation\n\
         \n\
           --ticks <N>    Number of updates to run (default: 3600)\n\
           --delta <MS>   Milliseconds per update (default: 16)\n\
           --seed <S>     RNG seed (default: 42)\n\
           --fire         Hold the shoot key for the whole run\n"
    );
}

fn parse_args(args: &[String]) -> Result<RunOptions, String> {
    let mut opts = RunOptions::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--ticks" => opts.ticks = parse_value(arg, iter.next())?,
            "--delta" => opts.delta_ms = parse_value(arg, iter.next())?,
            "--seed" => opts.seed = parse_value(arg, iter.next())?,
            "--fire" => opts.fire = true,
            "help" | "--help" | "-h" => {
                print_usage();
                process::exit(0);
            }
            other => return Err(format!("Unknown argument: {other}")),
        }
    }
    if opts.delta_ms <= 0.0 {
        return Err("--delta must be positive".into());
    }
    Ok(opts)
}

fn parse_value<T: std::str::FromStr>(flag: &str, value: Option<&String>) -> Result<T, String> {
    let raw = value.ok_or_else(|| format!("{flag} needs a value"))?;
    raw.parse()
        .map_err(|_| format!("Invalid value for {flag}: {raw}"))
}

fn run(opts: &RunOptions) {
    let mut engine = SimulationEngine::new(SimConfig {
        seed: opts.seed,
        ..Default::default()
    });
    let shoot_key = engine.config().movement.key_bindings.shoot.clone();
    let input = if opts.fire {
        InputSnapshot::new().with_key(shoot_key)
    } else {
        InputSnapshot::new()
    };

    info!(ticks = opts.ticks, delta_ms = opts.delta_ms, seed = opts.seed, "starting run");

    let mut ticks_run = 0;
    let mut events = 0usize;
    for _ in 0..opts.ticks {
        engine.update(opts.delta_ms, &input);
        events += engine.events().len();
        ticks_run += 1;
        if engine.is_game_over() {
            break;
        }
    }

    let snap = engine.snapshot();
    let summary = json!({
        "ticks": ticks_run,
        "time_ms": snap.time_ms,
        "game_over": snap.game_over,
        "wave": snap.wave.number,
        "phase": snap.wave.phase,
        "player_level": snap.player.level,
        "player_health": snap.player.health,
        "base_health": snap.base.health,
        "currencies": snap.player.currencies,
        "enemies_alive": snap.enemies.len(),
        "buildings": snap.buildings.len(),
        "events": events,
    });
    match serde_json::to_string_pretty(&summary) {
        Ok(text) => println!("{text}"),
        Err(err) => {
            eprintln!("Failed to encode summary: {err}");
            process::exit(1);
        }
    }
    engine.dispose();
}
