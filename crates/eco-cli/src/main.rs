//! CLI frontend for the ecosystem simulation.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use eco_core::{Species, Vec2};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "eco",
    about = "Plants, prey and predators on a bounded plane",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options that shape a fresh world.
#[derive(Args)]
struct WorldArgs {
    /// JSON configuration file (defaults for anything it omits)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Random seed, overrides the configuration file
    #[arg(short, long)]
    seed: Option<u64>,

    /// Override a named parameter, e.g. --set prey.speed=60
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = commands::parse_assignment)]
    sets: Vec<(String, f64)>,

    /// Add an entity before the first tick, e.g. --spawn predator@400,300
    #[arg(long = "spawn", value_name = "SPECIES@X,Y", value_parser = commands::parse_spawn)]
    spawns: Vec<(Species, Vec2)>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a fresh world for a number of ticks and print a report
    Run {
        #[command(flatten)]
        world: WorldArgs,

        /// Number of ticks to run
        #[arg(short, long, default_value_t = 600)]
        ticks: u64,

        /// Write the final state to this file
        #[arg(long)]
        save: Option<PathBuf>,

        /// Rows of population history to show
        #[arg(long, default_value_t = 10)]
        history: usize,

        /// Print every logged event
        #[arg(short, long)]
        verbose: bool,

        /// Print the final frame snapshot as JSON instead of tables
        #[arg(long)]
        json: bool,
    },

    /// Continue a saved run
    Resume {
        /// Save file written by `eco run --save`
        file: PathBuf,

        /// Number of additional ticks
        #[arg(short, long, default_value_t = 600)]
        ticks: u64,

        /// Write the final state to this file
        #[arg(long)]
        save: Option<PathBuf>,

        /// Rows of population history to show
        #[arg(long, default_value_t = 10)]
        history: usize,

        /// Print every logged event
        #[arg(short, long)]
        verbose: bool,
    },

    /// Drive a fresh world in real time, printing a status line per second
    Play {
        #[command(flatten)]
        world: WorldArgs,

        /// Wall-clock seconds to play
        #[arg(long, default_value_t = 10.0)]
        seconds: f64,

        /// Frames per second fed to the clock
        #[arg(long, default_value_t = 30)]
        fps: u32,

        /// Simulated seconds per wall-clock second
        #[arg(long, default_value_t = 1.0)]
        speed: f64,
    },

    /// List every tunable parameter with its current value
    Params {
        /// JSON configuration file to read values from
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            world,
            ticks,
            save,
            history,
            verbose,
            json,
        } => commands::run::run(
            &world.into_setup(),
            ticks,
            save.as_deref(),
            &commands::ReportOptions { history, verbose },
            json,
        ),
        Commands::Resume {
            file,
            ticks,
            save,
            history,
            verbose,
        } => commands::resume::run(
            &file,
            ticks,
            save.as_deref(),
            &commands::ReportOptions { history, verbose },
        ),
        Commands::Play {
            world,
            seconds,
            fps,
            speed,
        } => commands::play::run(&world.into_setup(), seconds, fps, speed),
        Commands::Params { config } => commands::params::run(config.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

impl WorldArgs {
    fn into_setup(self) -> commands::WorldSetup {
        commands::WorldSetup {
            config: self.config,
            seed: self.seed,
            sets: self.sets,
            spawns: self.spawns,
        }
    }
}
