//! Tempo CLI
//!
//! Drives animation timelines headlessly:
//! - `tempo init` writes an example scene file
//! - `tempo simulate` plays a scene frame by frame and reports clip events
//! - `tempo curves` prints sampled values of the built-in tweening curves

mod config;
mod simulate;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use tempo_animation::Curve;

use crate::config::SceneConfig;
use crate::simulate::{FrameReport, Simulation};

#[derive(Parser, Debug)]
#[command(name = "tempo")]
#[command(about = "Drive animation timelines headlessly")]
#[command(version)]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write an example scene file
    Init {
        /// Where to write the scene
        #[arg(default_value = "scene.toml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Play a scene frame by frame
    Simulate {
        /// Scene file (TOML)
        scene: PathBuf,

        /// Frames per second
        #[arg(long, default_value_t = 60.0)]
        fps: f32,

        /// Number of frames to simulate
        #[arg(long, default_value_t = 120)]
        frames: u32,

        /// Print every frame as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print sampled values of the built-in curves
    Curves {
        /// Only print this curve
        curve: Option<Curve>,

        /// Number of intervals between 0 and 1
        #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..))]
        samples: u32,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Init { path, force } => cmd_init(path, force),
        Commands::Simulate {
            scene,
            fps,
            frames,
            json,
        } => cmd_simulate(scene, fps, frames, json),
        Commands::Curves { curve, samples } => cmd_curves(curve, samples),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_init(path: PathBuf, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite it.",
            path.display()
        );
    }

    let content = SceneConfig::example().to_toml()?;
    fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::info!("Wrote example scene to {}", path.display());
    Ok(())
}

fn cmd_simulate(scene: PathBuf, fps: f32, frames: u32, json: bool) -> Result<()> {
    let config = SceneConfig::load(&scene)?;
    let mut simulation = Simulation::new(config)?;

    tracing::info!(
        "Simulating {} for {} frames at {} fps",
        scene.display(),
        frames,
        fps
    );
    let reports = simulation.run(frames, fps)?;

    if json {
        let output =
            serde_json::to_string_pretty(&reports).context("Failed to serialize frames")?;
        println!("{}", output);
    } else {
        print_reports(&reports);
    }
    Ok(())
}

fn print_reports(reports: &[FrameReport]) {
    for report in reports {
        for event in &report.events {
            println!("frame {:>6}  {:>8}ms  {}", report.frame, report.time_ms, event);
        }
    }

    let Some(last) = reports.last() else {
        return;
    };
    println!();
    println!("Global time: {}ms", last.time_ms);
    println!(
        "{:<16} {:>8} {:>7} {:>8} {:>9}",
        "clip", "time", "loops", "playing", "finished"
    );
    for clip in &last.clips {
        println!(
            "{:<16} {:>6}ms {:>7} {:>8} {:>9}",
            clip.name, clip.time_ms, clip.times_looped, clip.playing, clip.finished
        );
    }
}

fn cmd_curves(curve: Option<Curve>, samples: u32) -> Result<()> {
    let curves = match curve {
        Some(curve) => vec![curve],
        None => Curve::ALL.to_vec(),
    };

    print!("{:>8}", "percent");
    for curve in &curves {
        print!(" {:>14}", curve.name());
    }
    println!();

    for step in 0..=samples {
        let percent = step as f32 / samples as f32;
        print!("{:>8.3}", percent);
        for curve in &curves {
            print!(" {:>14.4}", curve.apply(0.0, 1.0, percent));
        }
        println!();
    }
    Ok(())
}
