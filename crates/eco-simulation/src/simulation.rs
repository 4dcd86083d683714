use std::path::Path;
use std::time::Duration;

use eco_core::EntitySnapshot;
use serde::Serialize;
use tracing::info;

use crate::clock::SimulationClock;
use crate::command::Command;
use crate::config::SimConfig;
use crate::ecosystem::Ecosysteme;
use crate::error::SimResult;
use crate::persist::SavedState;
use crate::stats::StatsSnapshot;

/// Immutable view of the committed world handed to a renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameSnapshot {
    /// Last committed tick.
    pub tick: u64,
    /// Whether the clock is paused.
    pub paused: bool,
    /// Every live entity, ascending by id.
    pub entities: Vec<EntitySnapshot>,
    /// Statistics history and totals.
    pub stats: StatsSnapshot,
}

/// What one call to [`Simulation::frame`] did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameReport {
    /// Ticks committed during this frame.
    pub ticks_run: u32,
    /// Fraction of a tick left over, for interpolation.
    pub alpha: f64,
    /// State after the frame's ticks.
    pub snapshot: FrameSnapshot,
}

/// The top-level simulation: one ecosystem driven by a fixed-step clock.
///
/// This is the surface a UI talks to. It forwards [`Command`]s, turns
/// frame time into ticks, and hands out owned snapshots.
pub struct Simulation {
    eco: Ecosysteme,
    clock: SimulationClock,
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("tick", &self.eco.current_tick())
            .field("population", &self.eco.population())
            .field("paused", &self.clock.is_paused())
            .finish()
    }
}

impl Simulation {
    /// Create a new simulation from a configuration.
    pub fn new(config: SimConfig) -> SimResult<Self> {
        Ok(Self::from_ecosystem(Ecosysteme::new(config)?))
    }

    /// Drive an existing ecosystem, e.g. one restored from a save.
    pub fn from_ecosystem(eco: Ecosysteme) -> Self {
        let clock = SimulationClock::new(eco.config().timestep, eco.config().max_catch_up_ticks);
        Self { eco, clock }
    }

    /// Load a saved state and drive it.
    pub fn load(path: impl AsRef<Path>) -> SimResult<Self> {
        let eco = SavedState::load(path)?.restore()?;
        Ok(Self::from_ecosystem(eco))
    }

    /// Write the committed state to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> SimResult<()> {
        SavedState::capture(&self.eco).save(path)
    }

    /// Feed one frame of wall-clock time and run the ticks that are due.
    pub fn frame(&mut self, elapsed: Duration) -> FrameReport {
        let ticks_run = self.clock.advance(elapsed);
        for _ in 0..ticks_run {
            self.eco.tick();
        }
        FrameReport {
            ticks_run,
            alpha: self.clock.alpha(),
            snapshot: self.snapshot(),
        }
    }

    /// Run `n` ticks immediately, ignoring the clock.
    pub fn run(&mut self, n: u64) {
        self.eco.run(n);
    }

    /// Apply a control command.
    pub fn apply(&mut self, command: Command) -> SimResult<()> {
        match command {
            Command::Pause => self.clock.pause(),
            Command::Resume => self.clock.resume(),
            Command::Step => self.clock.step(),
            Command::SetParameter { name, value } => {
                self.eco.set_parameter(&name, value)?;
                self.clock.set_timestep(self.eco.config().timestep);
                self.clock
                    .set_max_catch_up(self.eco.config().max_catch_up_ticks);
            }
            Command::SpawnEntity { species, position } => {
                self.eco.spawn_entity(species, position)?;
            }
            Command::Reset { seed } => {
                self.eco.reset(seed);
                self.clock.reset();
                info!(seed, "simulation reset");
            }
        }
        Ok(())
    }

    /// Owned copy of the committed state.
    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            tick: self.eco.current_tick(),
            paused: self.clock.is_paused(),
            entities: self.eco.snapshot(),
            stats: self.eco.stats().snapshot(),
        }
    }

    /// The driven ecosystem.
    pub fn ecosystem(&self) -> &Ecosysteme {
        &self.eco
    }

    /// The frame clock.
    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    /// Last committed tick.
    pub fn current_tick(&self) -> u64 {
        self.eco.current_tick()
    }
}

#[cfg(test)]
mod tests {
    use eco_core::{Species, Vec2};

    use super::*;

    fn sim() -> Simulation {
        let config = SimConfig::default()
            .with_seed(4)
            .with_timestep(0.5)
            .with_initial(5, 3, 1);
        Simulation::new(config).unwrap()
    }

    #[test]
    fn frame_runs_due_ticks() {
        let mut sim = sim();
        let report = sim.frame(Duration::from_millis(1250));
        assert_eq!(report.ticks_run, 2);
        assert_eq!(report.snapshot.tick, 2);
        assert!((report.alpha - 0.5).abs() < 1e-9);
        assert_eq!(report.snapshot.stats.history.len(), 2);
    }

    #[test]
    fn pause_withholds_ticks_and_step_runs_one() {
        let mut sim = sim();
        sim.apply(Command::Pause).unwrap();
        assert_eq!(sim.frame(Duration::from_secs(5)).ticks_run, 0);
        sim.apply(Command::Step).unwrap();
        let report = sim.frame(Duration::from_secs(5));
        assert_eq!(report.ticks_run, 1);
        assert!(report.snapshot.paused);
        sim.apply(Command::Resume).unwrap();
        assert_eq!(sim.frame(Duration::from_millis(500)).ticks_run, 1);
    }

    #[test]
    fn set_parameter_reaches_clock() {
        let mut sim = sim();
        sim.apply(Command::SetParameter {
            name: "timestep".into(),
            value: 0.25,
        })
        .unwrap();
        assert_eq!(sim.clock().timestep(), 0.25);
        assert_eq!(sim.frame(Duration::from_millis(500)).ticks_run, 2);
    }

    #[test]
    fn bad_parameter_is_reported() {
        let mut sim = sim();
        let err = sim
            .apply(Command::SetParameter {
                name: "population_cap".into(),
                value: 0.0,
            })
            .unwrap_err();
        assert!(err.to_string().contains("population_cap"));
    }

    #[test]
    fn spawn_command_adds_entity() {
        let mut sim = sim();
        let before = sim.snapshot().entities.len();
        sim.apply(Command::SpawnEntity {
            species: Species::Predateur,
            position: Vec2::new(200.0, 200.0),
        })
        .unwrap();
        assert_eq!(sim.snapshot().entities.len(), before + 1);
    }

    #[test]
    fn reset_command_restarts() {
        let mut sim = sim();
        sim.run(10);
        sim.apply(Command::Reset { seed: 4 }).unwrap();
        assert_eq!(sim.current_tick(), 0);
        assert_eq!(sim.clock().tick(), 0);
        let fresh = self::sim();
        assert_eq!(sim.snapshot(), fresh.snapshot());
    }
}
