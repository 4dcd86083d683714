use std::path::Path;

use tracing::info;

use super::{ReportOptions, WorldSetup, print_report, save_to};

pub fn run(
    setup: &WorldSetup,
    ticks: u64,
    save: Option<&Path>,
    options: &ReportOptions,
    json: bool,
) -> Result<(), String> {
    let mut sim = setup.build()?;
    info!(ticks, seed = sim.ecosystem().config().seed, "running fresh world");
    sim.run(ticks);

    if !json {
        print_report(&sim, ticks, options);
        return save_to(&sim, save);
    }

    // stdout carries only the snapshot here
    let snapshot = serde_json::to_string_pretty(&sim.snapshot())
        .map_err(|e| format!("cannot encode snapshot: {e}"))?;
    println!("{snapshot}");
    if let Some(path) = save {
        sim.save(path)
            .map_err(|e| format!("cannot save {}: {e}", path.display()))?;
    }
    Ok(())
}
