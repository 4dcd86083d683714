pub mod params;
pub mod play;
pub mod resume;
pub mod run;

use std::fs;
use std::path::{Path, PathBuf};

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use eco_core::{Species, Vec2};
use eco_simulation::{Command, DeathReason, EcoEventKind, SimConfig, Simulation, TickStats};

/// Everything needed to build a fresh simulation from the command line.
pub struct WorldSetup {
    pub config: Option<PathBuf>,
    pub seed: Option<u64>,
    pub sets: Vec<(String, f64)>,
    pub spawns: Vec<(Species, Vec2)>,
}

impl WorldSetup {
    /// Resolve the configuration: file, then seed, then `--set` overrides.
    pub fn config(&self) -> Result<SimConfig, String> {
        let mut config = load_config(self.config.as_deref())?;
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        for (name, value) in &self.sets {
            config
                .set_parameter(name, *value)
                .map_err(|e| e.to_string())?;
        }
        Ok(config)
    }

    /// Build the simulation and place any requested entities.
    pub fn build(&self) -> Result<Simulation, String> {
        let mut sim = Simulation::new(self.config()?).map_err(|e| e.to_string())?;
        for &(species, position) in &self.spawns {
            sim.apply(Command::SpawnEntity { species, position })
                .map_err(|e| e.to_string())?;
        }
        Ok(sim)
    }
}

/// Read a JSON configuration, or the defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> Result<SimConfig, String> {
    let Some(path) = path else {
        return Ok(SimConfig::default());
    };
    let text = fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    let config: SimConfig = serde_json::from_str(&text)
        .map_err(|e| format!("invalid configuration {}: {e}", path.display()))?;
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

/// Parse `name=value`.
pub fn parse_assignment(s: &str) -> Result<(String, f64), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got `{s}`"))?;
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("`{value}` is not a number"))?;
    Ok((name.trim().to_string(), value))
}

/// Parse `species@x,y`.
pub fn parse_spawn(s: &str) -> Result<(Species, Vec2), String> {
    let (species, coords) = s
        .split_once('@')
        .ok_or_else(|| format!("expected SPECIES@X,Y, got `{s}`"))?;
    let species = Species::parse(species).map_err(|e| e.to_string())?;
    let (x, y) = coords
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got `{coords}`"))?;
    let coord = |c: &str| {
        c.trim()
            .parse::<f64>()
            .map_err(|_| format!("`{c}` is not a coordinate"))
    };
    Ok((species, Vec2::new(coord(x)?, coord(y)?)))
}

/// How much of a finished run to print.
pub struct ReportOptions {
    pub history: usize,
    pub verbose: bool,
}

fn save_to(sim: &Simulation, path: Option<&Path>) -> Result<(), String> {
    if let Some(path) = path {
        sim.save(path)
            .map_err(|e| format!("cannot save {}: {e}", path.display()))?;
        println!("  {} {}", "Saved".green().bold(), path.display());
        println!();
    }
    Ok(())
}

/// Print the population summary, events and history table.
pub fn print_report(sim: &Simulation, ticks: u64, options: &ReportOptions) {
    let eco = sim.ecosystem();
    let config = eco.config();
    println!(
        "  {} {}",
        "Ecosystem".bold(),
        format!(
            "({ticks} ticks, seed={}, timestep={}s)",
            config.seed, config.timestep
        )
        .dimmed()
    );
    println!(
        "  tick {}: {} plants, {} prey, {} predators",
        eco.current_tick(),
        eco.count(Species::Plante),
        eco.count(Species::Proie),
        eco.count(Species::Predateur),
    );
    let totals = eco.stats().totals();
    println!(
        "  {} births, {} deaths, {} plants eaten, {} prey eaten, {} dropped spawns",
        totals.births,
        totals.deaths,
        totals.plants_consumed,
        totals.prey_consumed,
        eco.dropped_spawns(),
    );
    if eco.population() == 0 {
        println!("  {}", "Every species has died out".red().bold());
    } else if eco.count(Species::Predateur) == 0 || eco.count(Species::Proie) == 0 {
        println!("  {}", "An animal species has died out".yellow());
    }
    println!();

    if options.verbose {
        println!("  {}", "Event Log".bold().underline());
        println!();
        for event in eco.events().events() {
            let tick_label = format!("[tick {:>4}]", event.tick).dimmed();
            println!("  {tick_label} {}", colorize_event(&event.kind));
        }
        if eco.events().is_empty() {
            println!("  {}", "(no events)".dimmed());
        }
        println!();
    }

    if options.history == 0 {
        return;
    }
    let history = eco.stats().history();
    let skip = history.len().saturating_sub(options.history);
    let rows: Vec<&TickStats> = history.skip(skip).collect();
    if rows.is_empty() {
        return;
    }

    println!("  {}", "Population History".bold().underline());
    println!();
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "Tick",
        "Plants",
        "Prey",
        "Predators",
        "Births",
        "Deaths",
        "Mean energy",
    ]);
    for stats in rows {
        table.add_row(vec![
            stats.tick.to_string(),
            stats.plants.to_string(),
            stats.prey.to_string(),
            stats.predators.to_string(),
            stats.births.to_string(),
            stats.deaths.to_string(),
            format!("{:.1}", stats.mean_energy),
        ]);
    }
    println!("{table}");
    println!();
}

fn colorize_event(kind: &EcoEventKind) -> colored::ColoredString {
    let description = kind.to_string();
    match kind {
        EcoEventKind::Born { .. } => description.green(),
        EcoEventKind::Died {
            cause: DeathReason::Starved,
            ..
        } => description.red().bold(),
        EcoEventKind::Died { .. } => description.red(),
        EcoEventKind::Consumed { .. } => description.magenta(),
        EcoEventKind::SpawnDropped { .. } => description.yellow(),
        EcoEventKind::Regrowth { .. } => description.cyan(),
    }
}
