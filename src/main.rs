//! Headless lucky wheel.
//!
//! Subcommands:
//!   spin  Run the spin animation in a Bevy app and print each winner
//!   draw  Sample the weighted selector many times and compare with the expected odds
//!   list  Print the stored segments with their effective probabilities
//!
//! Example:
//!   cargo run -- --seed 7 spin --count 3 --auto-remove

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;

use lucky_wheel::app::{SpinCompleted, SpinRequested, WheelFlowSet, WheelNotice, WinnerAcknowledged};
use lucky_wheel::store::{peek_segments, SegmentStore};
use lucky_wheel::wheel::probabilities;
use lucky_wheel::{choose_index, JsonFileStore, WheelConfig, WheelPlugin, WheelRng, WheelState, WheelStore};

const DEFAULT_CONFIG: &str = "assets/config/wheel.ron";
const LOCAL_CONFIG: &str = "assets/config/wheel.local.ron";

#[derive(Parser, Debug)]
#[command(author, version, about = "Weighted lucky wheel, headless", long_about = None)]
struct Cli {
    /// Config file(s), later files override earlier ones. Defaults to
    /// assets/config/wheel.ron plus wheel.local.ron when present.
    #[arg(long, global = true)]
    config: Vec<PathBuf>,
    /// Segment store (JSON). Overrides `store_path` from the config.
    #[arg(long, global = true)]
    store: Option<PathBuf>,
    /// Seed for draws and trajectories; entropy when omitted
    #[arg(long, global = true)]
    seed: Option<u64>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Spin the wheel and print each winner
    Spin(SpinArgs),
    /// Sample the selector and print observed vs expected odds
    Draw(DrawArgs),
    /// Print the stored segments (read-only)
    List,
}

#[derive(Args, Debug)]
struct SpinArgs {
    #[arg(long, default_value_t = 1)]
    count: u32,
    /// Remove each winner after it is shown (never below 2 segments).
    /// The choice is remembered in the store.
    #[arg(long)]
    auto_remove: bool,
    /// Animate in wall-clock time instead of one frame per update
    #[arg(long)]
    realtime: bool,
}

#[derive(Args, Debug)]
struct DrawArgs {
    #[arg(long, default_value_t = 10_000)]
    trials: u32,
}

fn load_config(cli: &Cli) -> WheelConfig {
    let paths: Vec<PathBuf> = if cli.config.is_empty() {
        [DEFAULT_CONFIG, LOCAL_CONFIG]
            .into_iter()
            .map(PathBuf::from)
            .filter(|p| p.exists())
            .collect()
    } else {
        cli.config.clone()
    };
    let (cfg, used, errors) = WheelConfig::load_layered(paths.iter());
    for e in errors {
        eprintln!("config: {e}");
    }
    if used.is_empty() {
        eprintln!("config: no config file loaded, using defaults");
    }
    for w in cfg.validate() {
        eprintln!("config warning: {w}");
    }
    cfg
}

fn store_path(cli: &Cli, cfg: &WheelConfig) -> PathBuf {
    cli.store
        .clone()
        .unwrap_or_else(|| PathBuf::from(&cfg.store_path))
}

fn rng_for(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

// ---------------- spin -----------------

/// Drives a fixed number of spins through the wheel events, acknowledging
/// every result.
#[derive(Resource, Debug)]
struct SpinScript {
    remaining: u32,
    winners: Vec<String>,
}

fn drive_spin_script(
    mut script: ResMut<SpinScript>,
    wheel: Res<WheelState>,
    mut completed: EventReader<SpinCompleted>,
    mut notices: EventReader<WheelNotice>,
    mut spin: EventWriter<SpinRequested>,
    mut ack: EventWriter<WinnerAcknowledged>,
    mut exit: EventWriter<AppExit>,
) {
    for notice in notices.read() {
        println!("note: {notice}");
        if matches!(notice, WheelNotice::TooFewSegments { .. }) {
            exit.write(AppExit::error());
            return;
        }
    }
    for SpinCompleted(outcome) in completed.read() {
        println!(
            "winner #{}: {} (segment {})",
            script.winners.len() + 1,
            outcome.label,
            outcome.index
        );
        script.winners.push(outcome.label.clone());
        ack.write(WinnerAcknowledged);
    }
    if !wheel.is_idle() {
        return;
    }
    if script.remaining == 0 {
        let left: Vec<&str> = wheel.segments().iter().map(|s| s.text.as_str()).collect();
        println!("segments left ({}): {}", left.len(), left.join(", "));
        exit.write(AppExit::Success);
        return;
    }
    script.remaining -= 1;
    spin.write(SpinRequested);
}

fn cmd_spin(cli: &Cli, a: &SpinArgs) -> Result<()> {
    if a.count == 0 {
        bail!("--count must be at least 1");
    }
    let mut cfg = load_config(cli);
    let mut store = JsonFileStore::new(store_path(cli, &cfg));
    if a.auto_remove {
        cfg.auto_remove = true;
        store
            .save_auto_remove(true)
            .context("storing the auto-remove preference")?;
    }
    let rng = match cli.seed {
        Some(s) => WheelRng::seeded(s),
        None => WheelRng::default(),
    };
    let frame = Duration::from_secs_f64(1.0 / cfg.frame_hz.max(1.0));

    let mut app = App::new();
    if a.realtime {
        app.add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(frame)));
    } else {
        app.add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::ZERO)))
            .insert_resource(TimeUpdateStrategy::ManualDuration(frame));
    }
    app.add_plugins(LogPlugin::default())
        .insert_resource(cfg)
        .insert_resource(rng)
        .insert_resource(WheelStore::new(store))
        .insert_resource(SpinScript {
            remaining: a.count,
            winners: Vec::new(),
        })
        .add_plugins(WheelPlugin::default())
        .add_systems(Update, drive_spin_script.after(WheelFlowSet::Resolve));

    match app.run() {
        AppExit::Success => Ok(()),
        AppExit::Error(code) => bail!("spin aborted (exit code {code})"),
    }
}

// ---------------- draw / list -----------------

fn print_table(path: &Path, seed: Option<u64>, trials: Option<u32>) -> Result<()> {
    let store = JsonFileStore::new(path);
    let mut rng = rng_for(seed);
    let segments = peek_segments(&store, &mut rng);
    let probs = probabilities(&segments);
    let mut counts = vec![0u32; segments.len()];
    if let Some(trials) = trials {
        for _ in 0..trials {
            if let Some(i) = choose_index(&segments, &mut rng) {
                counts[i] += 1;
            }
        }
    }
    println!("store: {}", path.display());
    for (i, (seg, p)) in segments.iter().zip(&probs).enumerate() {
        let weight = if seg.weight > 0.0 {
            format!("{:>5.1}", seg.weight)
        } else {
            "    -".to_string()
        };
        match trials {
            Some(t) => println!(
                "{i:>3}  {weight}  expected {:>6.2}%  observed {:>6.2}%  {}",
                p * 100.0,
                counts[i] as f64 * 100.0 / t.max(1) as f64,
                seg.text
            ),
            None => println!(
                "{i:>3}  {weight}  {:>6.2}%  {}  {}  [{}]",
                p * 100.0,
                seg.color,
                seg.text,
                seg.id
            ),
        }
    }
    Ok(())
}

fn cmd_draw(cli: &Cli, a: &DrawArgs) -> Result<()> {
    let cfg = load_config(cli);
    print_table(&store_path(cli, &cfg), cli.seed, Some(a.trials))
}

fn cmd_list(cli: &Cli) -> Result<()> {
    let cfg = load_config(cli);
    print_table(&store_path(cli, &cfg), cli.seed, None)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match &cli.command {
        Commands::Spin(a) => cmd_spin(&cli, a),
        Commands::Draw(a) => cmd_draw(&cli, a),
        Commands::List => cmd_list(&cli),
    }
}
