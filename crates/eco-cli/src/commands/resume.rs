use std::path::Path;

use colored::Colorize;
use eco_simulation::Simulation;
use tracing::info;

use super::{ReportOptions, print_report, save_to};

pub fn run(
    file: &Path,
    ticks: u64,
    save: Option<&Path>,
    options: &ReportOptions,
) -> Result<(), String> {
    let mut sim =
        Simulation::load(file).map_err(|e| format!("cannot resume {}: {e}", file.display()))?;
    let start = sim.current_tick();
    println!(
        "  {} {} {}",
        "Resuming".bold(),
        file.display(),
        format!("(from tick {start})").dimmed()
    );
    info!(start, ticks, "resuming saved world");
    sim.run(ticks);
    print_report(&sim, ticks, options);
    save_to(&sim, save)
}
