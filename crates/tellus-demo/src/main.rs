//! Command-line planet generator.
//!
//! Builds one planet mesh cooperatively, printing progress and final stats.
//! Settings come from an optional RON preset file with CLI flags layered on
//! top. Run with `cargo run -p tellus-demo -- --resolution 256 --shape
//! terrain` for a fractal planet, or add `--cancel-after-ms 5` to watch a
//! generation get cancelled mid-build and the buffer survive it.

mod preset;

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::{Duration, Instant};

use clap::Parser;
use tracing::{info, warn};

use tellus_mesh::{MeshBuffer, Topology};
use tellus_planet::{GenerationSettings, Shape, generate};
use tellus_task::{RunnerConfig, TaskOutcome, TickRunner};

use crate::preset::PlanetPreset;

/// Planet mesh generator.
///
/// CLI values override settings loaded from the preset file.
#[derive(Parser, Debug)]
#[command(name = "tellus", about = "Cooperative cube-sphere planet generator")]
struct CliArgs {
    /// Grid resolution (quads per cube-face edge, 2..=4096).
    #[arg(long)]
    resolution: Option<u32>,

    /// Shape: cube, sphere, or terrain.
    #[arg(long)]
    shape: Option<String>,

    /// Sphere radius (sphere shape only).
    #[arg(long)]
    radius: Option<f32>,

    /// Index topology: list or strip.
    #[arg(long)]
    topology: Option<String>,

    /// Terrain noise seed.
    #[arg(long)]
    seed: Option<u32>,

    /// Path to a RON preset file.
    #[arg(long)]
    preset: Option<PathBuf>,

    /// Scheduler slice budget in milliseconds.
    #[arg(long)]
    max_slice_ms: Option<u64>,

    /// Probe interval: loop iterations between deadline checks.
    #[arg(long)]
    check_every: Option<u32>,

    /// Cancel the generation after this many milliseconds.
    #[arg(long)]
    cancel_after_ms: Option<u64>,
}

fn apply_cli_overrides(settings: &mut GenerationSettings, args: &CliArgs) -> Result<(), String> {
    if let Some(resolution) = args.resolution {
        settings.resolution = resolution;
    }
    if let Some(ref shape) = args.shape {
        settings.shape = match shape.as_str() {
            "cube" => Shape::Cube,
            "sphere" => Shape::Sphere {
                radius: args.radius.unwrap_or(1.0),
            },
            "terrain" => Shape::Terrain,
            other => return Err(format!("unknown shape '{other}' (cube, sphere, terrain)")),
        };
    } else if let Some(radius) = args.radius {
        settings.shape = Shape::Sphere { radius };
    }
    if let Some(ref topology) = args.topology {
        settings.topology = match topology.as_str() {
            "list" => Topology::Triangles,
            "strip" => Topology::TriangleStrip,
            other => return Err(format!("unknown topology '{other}' (list, strip)")),
        };
    }
    if let Some(seed) = args.seed {
        settings.terrain.seed = seed;
    }
    Ok(())
}

fn main() {
    let args = CliArgs::parse();

    // Preset file first, CLI flags on top.
    let mut settings = match args.preset {
        Some(ref path) => match PlanetPreset::load(path) {
            Ok(preset) => preset.into_settings(),
            Err(e) => {
                eprintln!("Failed to load preset {}: {e}", path.display());
                std::process::exit(1);
            }
        },
        None => GenerationSettings::default(),
    };
    if let Err(message) = apply_cli_overrides(&mut settings, &args) {
        eprintln!("{message}");
        std::process::exit(1);
    }

    tellus_log::init_logging("info");

    let mut config = RunnerConfig::default();
    if let Some(ms) = args.max_slice_ms {
        config.max_slice = Duration::from_millis(ms);
    }
    if let Some(check_every) = args.check_every {
        config.check_every = check_every;
    }
    let cancel_after = args.cancel_after_ms.map(Duration::from_millis);

    info!(
        "generating: resolution {}, {:?}, {:?}, slice budget {:?}",
        settings.resolution, settings.shape, settings.topology, config.max_slice
    );

    let buffer = match MeshBuffer::new(settings.resolution) {
        Ok(buffer) => Rc::new(RefCell::new(buffer)),
        Err(e) => {
            eprintln!("Failed to allocate mesh buffer: {e}");
            std::process::exit(1);
        }
    };

    let mut runner = TickRunner::new(config);
    let handle = match generate(&mut runner, settings, &buffer) {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("Failed to start generation: {e}");
            std::process::exit(1);
        }
    };

    // The frame loop stand-in: one slice per iteration, with an optional
    // demonstration of mid-build cancellation.
    let started = Instant::now();
    let mut slices = 0_u64;
    let mut cancelled = false;
    loop {
        let live = runner.tick();
        slices += 1;
        if live == 0 {
            break;
        }
        if let Some(after) = cancel_after {
            if !cancelled && started.elapsed() >= after {
                info!("requesting cancellation after {} slices", slices);
                handle.cancel();
                cancelled = true;
            }
        }
    }

    match handle.take_outcome() {
        Some(TaskOutcome::Completed(report)) => {
            info!(
                "done in {} slices: {} vertices, {} indices, {} triangles, {:?} generation time",
                slices,
                report.vertex_count,
                report.index_count,
                report.triangle_count,
                report.elapsed
            );
            let shared = buffer.borrow();
            info!(
                "buffer: {} vertex bytes, {} index bytes, committed: {}",
                shared.vertex_bytes().len(),
                shared.index_bytes().len(),
                shared.is_committed()
            );
        }
        Some(TaskOutcome::Cancelled) => {
            let partial = buffer.borrow().vertex_count();
            warn!("generation cancelled after {slices} slices ({partial} vertices written)");
            // The buffer is reusable after a clear; prove it.
            buffer.borrow_mut().clear();
            info!("buffer cleared and ready for reuse");
        }
        Some(TaskOutcome::Failed(e)) => {
            eprintln!("Generation failed: {e}");
            std::process::exit(1);
        }
        None => {
            eprintln!("Generation never settled");
            std::process::exit(1);
        }
    }
}
