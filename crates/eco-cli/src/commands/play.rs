use std::thread;
use std::time::{Duration, Instant};

use colored::Colorize;
use eco_core::Species;
use eco_simulation::Simulation;
use tracing::debug;

use super::WorldSetup;

pub fn run(setup: &WorldSetup, seconds: f64, fps: u32, speed: f64) -> Result<(), String> {
    let deadline = Duration::try_from_secs_f64(seconds)
        .map_err(|e| format!("--seconds must be a non-negative duration, got {seconds}: {e}"))?;
    if fps == 0 {
        return Err("--fps must be at least 1".into());
    }
    if !speed.is_finite() || speed <= 0.0 {
        return Err(format!("--speed must be positive, got {speed}"));
    }

    let mut sim = setup.build()?;
    println!(
        "  {} {}",
        "Playing".bold(),
        format!(
            "({seconds}s at {fps} fps, speed x{speed}, seed={})",
            sim.ecosystem().config().seed
        )
        .dimmed()
    );

    let frame = Duration::from_secs(1) / fps;
    let start = Instant::now();
    let mut last = start;
    let mut next_status = Duration::from_secs(1);
    let mut frames = 0u64;

    loop {
        let now = Instant::now();
        let elapsed = scaled(now.duration_since(last), speed)?;
        let report = sim.frame(elapsed);
        last = now;
        frames += 1;
        debug!(ticks_run = report.ticks_run, alpha = report.alpha, "frame");

        let played = now.duration_since(start);
        if played >= next_status {
            print_status(&sim, played);
            next_status += Duration::from_secs(1);
        }
        if played >= deadline {
            break;
        }
        thread::sleep(frame.min(deadline - played));
    }

    print_status(&sim, start.elapsed());
    println!(
        "  {}",
        format!("{frames} frames, {} ticks", sim.current_tick()).dimmed()
    );
    Ok(())
}

/// Wall-clock time stretched by the speed factor.
fn scaled(elapsed: Duration, speed: f64) -> Result<Duration, String> {
    Duration::try_from_secs_f64(elapsed.as_secs_f64() * speed)
        .map_err(|e| format!("--speed {speed} overflows the frame time: {e}"))
}

fn print_status(sim: &Simulation, played: Duration) {
    let eco = sim.ecosystem();
    println!(
        "  {} tick {}: {} plants, {} prey, {} predators",
        format!("[{:>5.1}s]", played.as_secs_f64()).dimmed(),
        eco.current_tick(),
        eco.count(Species::Plante).to_string().green(),
        eco.count(Species::Proie).to_string().yellow(),
        eco.count(Species::Predateur).to_string().red(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaled_multiplies_frame_time() {
        let stretched = scaled(Duration::from_millis(500), 3.0).unwrap();
        assert_eq!(stretched, Duration::from_millis(1500));
    }

    #[test]
    fn scaled_rejects_overflow() {
        assert!(scaled(Duration::from_secs(1), 1e300).is_err());
    }
}
