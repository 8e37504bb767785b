#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Lane Defence simulation.
//!
//! Places one tower of each kind along a fixed lane, releases a wave of
//! enemies, and prints the event stream the engine produces while ticking at
//! a fixed cadence.

mod wave;

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use glam::Vec2;
use lane_defence_system_bootstrap::Session;
use lane_defence_core::{Event, TowerKind};
use lane_defence_system_timers::TimerFired;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::wave::Wave;

/// Seconds between consecutive enemy releases.
const SPAWN_GAP: f32 = 0.5;

#[derive(Debug, Parser)]
#[command(name = "lane-defence", about = "Headless Lane Defence simulation")]
struct Args {
    /// Number of ticks to simulate.
    #[arg(long, default_value_t = 600)]
    ticks: u64,

    /// Wall-clock milliseconds between ticks.
    #[arg(long, default_value_t = 16)]
    dt_ms: u64,

    /// Simulation speed multiplier.
    #[arg(long, default_value_t = 1.0)]
    speed: f32,

    /// Seed for the wave randomness.
    #[arg(long, default_value_t = 7)]
    seed: u64,

    /// Wave descriptor, COUNTxHEALTH@SPEED.
    #[arg(long, default_value = "5x40@60")]
    wave: Wave,
}

fn lane() -> [Vec2; 4] {
    [
        Vec2::new(0.0, 0.0),
        Vec2::new(120.0, 0.0),
        Vec2::new(120.0, 80.0),
        Vec2::new(240.0, 80.0),
    ]
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    anyhow::ensure!(args.dt_ms > 0, "tick duration must be positive");

    let wave: Wave = args.wave;
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut session = Session::new();
    session.set_speed(args.speed);

    for (kind, along) in [
        (TowerKind::Cannon, Vec2::new(60.0, 20.0)),
        (TowerKind::Frost, Vec2::new(120.0, 40.0)),
        (TowerKind::Ember, Vec2::new(180.0, 60.0)),
    ] {
        let jitter = Vec2::new(0.0, rng.gen_range(-8.0..8.0));
        let _ = session.place_tower(kind, along + jitter);
    }

    let lane = lane();
    let mut spawned = 0_u32;
    let mut next_spawn = 0.0_f32;
    let mut destroyed = 0_u32;
    let mut leaked = 0_u32;
    let mut events: Vec<Event> = Vec::new();
    let mut fired: Vec<TimerFired> = Vec::new();

    for tick in 0..args.ticks {
        if spawned < wave.count && session.current_time() >= next_spawn {
            let health = wave.health * rng.gen_range(0.9..1.1);
            let _ = session.spawn_enemy_along(&lane, wave.speed, health);
            spawned += 1;
            next_spawn += SPAWN_GAP;
        }

        let now = tick
            .checked_mul(args.dt_ms)
            .map(Duration::from_millis)
            .context("tick schedule overflowed")?;
        let _ = session.tick(now, &mut events, &mut fired);

        for event in events.drain(..) {
            match event {
                Event::EnemyDied { .. } => destroyed += 1,
                Event::EnemyReachedEnd { .. } => leaked += 1,
                _ => {}
            }
            println!("[{:8.3}] {event:?}", session.current_time());
        }
        fired.clear();
    }

    println!(
        "released {spawned} enemies: {destroyed} destroyed, {leaked} leaked, {} still walking",
        session.world().enemy_count()
    );
    Ok(())
}
