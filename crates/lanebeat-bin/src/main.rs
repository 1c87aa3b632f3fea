mod simulate;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lanebeat_chart::{Level, LoadOptions, load_chart_file};
use lanebeat_play::{LaneLayout, PlayConfig};

use simulate::{SimulateOptions, run_simulation};

#[derive(Parser, Debug)]
#[command(name = "lanebeat", about = "Lane rhythm timing and judgement engine")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play a chart headlessly with autoplay and print the result as JSON.
    Simulate(SimulateArgs),
    /// List levels and their asset paths.
    Levels,
    /// Write the default play config to a file.
    InitConfig {
        #[arg(default_value = "play.json")]
        path: PathBuf,
    },
}

#[derive(clap::Args, Debug)]
struct SimulateArgs {
    /// Chart JSON file. Takes precedence over --level.
    #[arg(long)]
    chart: Option<PathBuf>,

    /// Level to load from the asset root.
    #[arg(long, default_value_t = Level::Tutorial)]
    level: Level,

    /// Asset root for --level.
    #[arg(long, default_value = "assets", env = "LANEBEAT_ASSETS")]
    assets: PathBuf,

    /// Play config JSON. Missing file means defaults.
    #[arg(long, default_value = "play.json")]
    config: PathBuf,

    /// Drop chart notes before this many seconds.
    #[arg(long, default_value_t = 0.0)]
    skip_before: f64,

    /// Autoplay press offset in seconds; negative presses early.
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    offset: f64,

    /// Song time at which to pause.
    #[arg(long, requires = "pause_for")]
    pause_at: Option<f64>,

    /// Raw seconds to stay paused.
    #[arg(long, requires = "pause_at")]
    pause_for: Option<f64>,

    /// Simulated frames per second.
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Music that keeps playing after the last note, in seconds.
    #[arg(long, default_value_t = 1.0)]
    tail: f64,

    /// Distance from spawn to judge line.
    #[arg(long, default_value_t = 4.0)]
    distance: f32,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Command::Simulate(args) => simulate(args),
        Command::Levels => {
            for level in Level::ALL {
                let assets = level.assets();
                println!("{level}\t{}\t{}", assets.chart_path, assets.music_path);
            }
            Ok(())
        }
        Command::InitConfig { path } => {
            PlayConfig::default()
                .save_to(&path)
                .with_context(|| format!("failed to write config to {}", path.display()))?;
            log::info!("wrote default config to {}", path.display());
            Ok(())
        }
    }
}

fn simulate(args: SimulateArgs) -> Result<()> {
    let config = PlayConfig::load_from(&args.config)
        .with_context(|| format!("failed to load config from {}", args.config.display()))?;

    let chart_path = match &args.chart {
        Some(path) => path.clone(),
        None => args.assets.join(args.level.assets().chart_path),
    };
    let options = LoadOptions {
        skip_before: args.skip_before,
    };
    let chart = load_chart_file(&chart_path, &options)
        .with_context(|| format!("failed to load chart {}", chart_path.display()))?;
    log::info!("loaded {} notes from {}", chart.len(), chart_path.display());

    let report = run_simulation(
        chart,
        &config,
        LaneLayout::straight(args.distance, 1.0),
        &SimulateOptions {
            fps: args.fps,
            offset: args.offset,
            tail: args.tail,
            pause: args.pause_at.zip(args.pause_for),
        },
    );

    let json = serde_json::to_string_pretty(&report)?;
    println!("{json}");
    Ok(())
}
