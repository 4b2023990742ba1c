use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use trackway_input::Intent;
use trackway_kernel::{GameConfig, Session, SessionEvent, replay, weaving_script};
use trackway_render::{DebugTextRenderer, FrameGeometry, RenderView, Renderer};
use trackway_tools::Telemetry;

#[derive(Parser)]
#[command(
    name = "trackway-cli",
    about = "Procedural track and vehicle simulation"
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Drive a vehicle with scripted weaving input and report telemetry
    Simulate {
        /// Number of ticks to simulate
        #[arg(short, long, default_value = "2000")]
        ticks: u64,
        /// Track seed, overrides the config file
        #[arg(short, long)]
        seed: Option<u64>,
        /// JSON config file
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Emit telemetry as JSON lines
        #[arg(long)]
        json: bool,
        /// Ticks between telemetry reports
        #[arg(long, default_value = "250")]
        report_every: u64,
        /// Regenerate the track every N ticks
        #[arg(long)]
        regenerate_every: Option<u64>,
    },
    /// Build a track and print its mesh statistics
    Mesh {
        #[arg(short, long)]
        seed: Option<u64>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Run the same seed and input twice and compare state hashes
    Replay {
        #[arg(short, long, default_value = "1000")]
        ticks: u64,
        #[arg(short, long, default_value = "42")]
        seed: u64,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            let config = GameConfig::default();
            println!("trackway-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("input: {}", trackway_input::crate_info());
            println!("render: {}", trackway_render::crate_info());
            println!("tools: {}", trackway_tools::crate_info());
            println!(
                "defaults: seed={} segments={}x{:.0} width={:.1} samples={}",
                config.seed,
                config.track.segment_count,
                config.track.segment_length,
                config.track.road.width,
                config.track.road.sample_count
            );
        }
        Commands::Simulate {
            ticks,
            seed,
            config,
            json,
            report_every,
            regenerate_every,
        } => {
            let config = load_config(config, seed)?;
            simulate(config, ticks, json, report_every.max(1), regenerate_every)?;
        }
        Commands::Mesh { seed, config } => {
            let config = load_config(config, seed)?;
            let session = Session::new(config)?;
            let track = session.track();
            if let Some(err) = track.fault() {
                anyhow::bail!("track for seed {} is unusable: {err}", session.seed());
            }

            let geometry = FrameGeometry::new(&session);
            let buffers = geometry.track();
            println!(
                "Track: seed={} control_points={} length={:.1} parameterization={:?}",
                session.seed(),
                track.control_points().len(),
                track.length(),
                track.parameterization().unwrap_or_default()
            );
            for (name, mesh) in [
                ("surface", &buffers.surface),
                ("markings", &buffers.markings),
                ("barriers", &buffers.barriers),
                ("vehicle", geometry.vehicle()),
            ] {
                println!(
                    "  {name:<9} vertices={:>6} triangles={:>6} bytes={}",
                    mesh.vertices.len(),
                    mesh.triangle_count(),
                    mesh.vertex_bytes().len() + mesh.index_bytes().len()
                );
            }
        }
        Commands::Replay { ticks, seed } => {
            println!("Deterministic replay: seed={seed}, ticks={ticks}");
            let config = GameConfig {
                seed,
                ..GameConfig::default()
            };
            let script = weaving_script(ticks, 60);
            let dt = config.locomotion.reference_dt;

            let first = replay(config, &script, dt)?;
            let second = replay(config, &script, dt)?;

            println!(
                "Run 1: tick={}, laps={}, hash={:#x}",
                first.tick_count(),
                first.laps(),
                first.state_hash()
            );
            println!(
                "Run 2: tick={}, laps={}, hash={:#x}",
                second.tick_count(),
                second.laps(),
                second.state_hash()
            );
            if first.state_hash() != second.state_hash() {
                anyhow::bail!("replay diverged for seed {seed}");
            }
            println!("Match: OK");
        }
    }

    Ok(())
}

fn load_config(path: Option<PathBuf>, seed: Option<u64>) -> anyhow::Result<GameConfig> {
    let mut config = match path {
        Some(path) => GameConfig::load(&path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => GameConfig::default(),
    };
    if let Some(seed) = seed {
        config.seed = seed;
    }
    Ok(config)
}

fn simulate(
    config: GameConfig,
    ticks: u64,
    json: bool,
    report_every: u64,
    regenerate_every: Option<u64>,
) -> anyhow::Result<()> {
    let mut session = Session::new(config)?;
    let dt = config.locomotion.reference_dt;
    let script = weaving_script(ticks, 90);

    for (i, scripted) in script.iter().enumerate() {
        let tick = i as u64 + 1;
        let regenerate = regenerate_every.is_some_and(|n| n > 0 && tick % n == 0);
        let intent = if regenerate {
            Intent {
                regenerate: true,
                ..*scripted
            }
        } else {
            *scripted
        };
        session.tick(&intent, dt);

        for event in session.drain_events() {
            match event {
                SessionEvent::LapCompleted { lap, tick } => {
                    tracing::info!(lap, tick, "lap completed");
                }
                SessionEvent::TrackFault { reason, .. } => {
                    tracing::warn!(%reason, "track fault");
                }
                _ => {}
            }
        }

        if tick % report_every == 0 || tick == ticks {
            let telemetry = Telemetry::capture(&session);
            if json {
                println!("{}", serde_json::to_string(&telemetry)?);
            } else {
                println!("{telemetry}");
            }
        }
    }

    if !json {
        let renderer = DebugTextRenderer::new();
        let view = RenderView::of_session(&session);
        print!("{}", renderer.render(&session, &view));
    }
    Ok(())
}
