//! Race Sim - headless stage driver
//!
//! Run with: `cargo run --bin race_sim -- --ticks 600 --script circle`
//!
//! Builds a stage from a heightmap image (or procedural noise), feeds it
//! scripted input through a fixed-step frame loop and logs the player racer
//! and camera. `RUST_LOG=slope_racer_engine=debug` shows jumps, landings and
//! respawns.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use slope_racer_engine::config::StageConfig;
use slope_racer_engine::error::StageError;
use slope_racer_engine::input::{ControlLevels, IntentTracker};
use slope_racer_engine::world::{PixelGrid, Stage, Terrain};

/// Simulation ticks per second at `time_scale = 1.0`.
const TICK_RATE: f32 = 60.0;

/// Most ticks run for a single frame; older backlog is dropped.
const MAX_CATCH_UP_TICKS: u32 = 5;

#[derive(Parser, Debug)]
#[command(name = "race_sim")]
#[command(about = "Headless slope racer simulation", long_about = None)]
struct Args {
    /// Grayscale heightmap image; procedural terrain when omitted
    #[arg(long)]
    heightmap: Option<PathBuf>,

    /// Stage config JSON; defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Noise seed for procedural terrain
    #[arg(long)]
    seed: Option<u32>,

    /// Procedural heightmap size in pixels
    #[arg(long)]
    size: Option<u32>,

    /// Simulation ticks to run
    #[arg(long, default_value = "600")]
    ticks: u64,

    /// Simulated frame duration in milliseconds
    #[arg(long, default_value = "16.6667")]
    frame_ms: f32,

    /// Scripted driver input
    #[arg(long, value_enum, default_value = "circle")]
    script: Script,

    /// Log racer state every N ticks
    #[arg(long, default_value = "60")]
    log_every: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Script {
    /// Hold forward
    Straight,
    /// Hold forward and left
    Circle,
    /// Drive forward and tap jump once a second
    Hop,
    /// Forward then reverse, alternating every two seconds
    Shuttle,
}

impl Script {
    fn levels(self, tick: u64) -> ControlLevels {
        match self {
            Script::Straight => ControlLevels {
                forward: true,
                ..Default::default()
            },
            Script::Circle => ControlLevels {
                forward: true,
                left: true,
                ..Default::default()
            },
            Script::Hop => ControlLevels {
                forward: true,
                jump: tick % 60 < 10,
                ..Default::default()
            },
            Script::Shuttle => {
                let forward = (tick / 120) % 2 == 0;
                ControlLevels {
                    forward,
                    backward: !forward,
                    ..Default::default()
                }
            }
        }
    }
}

/// Converts frame time into a capped number of fixed ticks.
#[derive(Debug, Default)]
struct FixedStep {
    backlog: f32,
}

impl FixedStep {
    fn ticks_for_frame(&mut self, frame_seconds: f32) -> u32 {
        self.backlog += frame_seconds.max(0.0) * TICK_RATE;
        // Absorbs rounding so whole-tick frames never lose a tick
        let due = (self.backlog + 1e-4).floor();
        self.backlog -= due;
        (due as u32).min(MAX_CATCH_UP_TICKS)
    }
}

fn main() -> Result<(), StageError> {
    let args = Args::parse();

    let log_level = args.log_level.parse().unwrap_or(tracing::Level::INFO);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("race_sim={log_level},slope_racer_engine={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = match &args.config {
        Some(path) => StageConfig::load(path)?,
        None => StageConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.noise.seed = seed;
    }
    if let Some(size) = args.size {
        config.heightmap_size = size;
    }

    let mut stage = match &args.heightmap {
        Some(path) => {
            info!(path = %path.display(), "loading heightmap");
            let terrain = Terrain::from_pixels(&PixelGrid::open(path)?, config.terrain_scale)?;
            Stage::new(config, terrain)?
        }
        None => Stage::procedural(config)?,
    };

    let mut tracker = IntentTracker::new();
    let mut clock = FixedStep::default();
    let mut frame_seconds = args.frame_ms / 1000.0;
    if !(frame_seconds.is_finite() && frame_seconds > 0.0) {
        warn!(frame_ms = args.frame_ms, "frame duration must be positive, using one tick");
        frame_seconds = 1.0 / TICK_RATE;
    }
    let mut frames = 0u64;
    let mut respawns = 0usize;

    while stage.ticks() < args.ticks {
        frames += 1;
        for _ in 0..clock.ticks_for_frame(frame_seconds) {
            tracker.set_levels(args.script.levels(stage.ticks()));
            stage.update(&tracker.tick(), 1.0);
            respawns += stage.respawn_fallen();

            if args.log_every > 0 && stage.ticks() % args.log_every == 0 {
                let racer = stage.player().snapshot();
                let camera = stage.camera();
                info!(
                    tick = stage.ticks(),
                    pos = ?racer.position,
                    speed = racer.velocity.length(),
                    angle = racer.angle,
                    grounded = racer.grounded,
                    shadow = racer.shadow_scale,
                    camera = ?camera.position(),
                    "racer"
                );
            }
            if stage.ticks() >= args.ticks {
                break;
            }
        }
    }

    let mesh = stage.terrain().mesh();
    info!(
        ticks = stage.ticks(),
        frames,
        respawns,
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        "simulation finished"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_step_accumulates() {
        let mut clock = FixedStep::default();
        // Half-tick frames run a tick every other frame
        let half = 0.5 / TICK_RATE;
        let ticks: Vec<u32> = (0..4).map(|_| clock.ticks_for_frame(half)).collect();
        assert_eq!(ticks.iter().sum::<u32>(), 2);
    }

    #[test]
    fn test_fixed_step_caps_catch_up() {
        let mut clock = FixedStep::default();
        assert_eq!(clock.ticks_for_frame(1.0), MAX_CATCH_UP_TICKS);
        // Dropped backlog does not carry over
        assert_eq!(clock.ticks_for_frame(0.0), 0);
    }

    #[test]
    fn test_hop_script_taps_jump() {
        assert!(Script::Hop.levels(0).jump);
        assert!(!Script::Hop.levels(30).jump);
        assert!(Script::Shuttle.levels(130).backward);
    }
}
