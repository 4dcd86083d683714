use std::time::Duration;

/// Fixed-timestep accumulator driving the ecosystem from wall-clock frames.
///
/// Each frame feeds the elapsed real time in; the clock answers how many
/// fixed ticks are due and keeps the remainder for the next frame.
#[derive(Debug, Clone)]
pub struct SimulationClock {
    timestep: f64,
    max_catch_up: u32,
    accumulator: f64,
    paused: bool,
    step_requested: bool,
    ticks: u64,
    simulated: f64,
}

impl SimulationClock {
    /// Create a running clock with the given tick length (seconds) and
    /// catch-up limit per frame.
    pub fn new(timestep: f64, max_catch_up: u32) -> Self {
        Self {
            timestep,
            max_catch_up: max_catch_up.max(1),
            accumulator: 0.0,
            paused: false,
            step_requested: false,
            ticks: 0,
            simulated: 0.0,
        }
    }

    /// Add a frame's elapsed time and return the number of ticks to run now.
    ///
    /// While paused nothing accumulates and only a requested single step is
    /// returned. When more ticks are due than the catch-up limit allows, the
    /// whole ticks beyond the limit are discarded.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        let mut due = u32::from(std::mem::take(&mut self.step_requested));
        if !self.paused {
            self.accumulator += elapsed.as_secs_f64();
            let mut caught_up = 0;
            while self.accumulator >= self.timestep && caught_up < self.max_catch_up {
                self.accumulator -= self.timestep;
                caught_up += 1;
            }
            if self.accumulator >= self.timestep {
                self.accumulator %= self.timestep;
            }
            due += caught_up;
        }
        self.ticks += u64::from(due);
        self.simulated += f64::from(due) * self.timestep;
        due
    }

    /// Stop handing out ticks.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume handing out ticks. Time spent paused is not replayed.
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Whether the clock is paused.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Ask for exactly one extra tick on the next [`SimulationClock::advance`],
    /// paused or not.
    pub fn step(&mut self) {
        self.step_requested = true;
    }

    /// Fraction of a tick left in the accumulator, for render interpolation.
    pub fn alpha(&self) -> f64 {
        (self.accumulator / self.timestep).clamp(0.0, 1.0)
    }

    /// Ticks handed out so far.
    pub fn tick(&self) -> u64 {
        self.ticks
    }

    /// Simulated seconds handed out so far.
    pub fn simulated_time(&self) -> f64 {
        self.simulated
    }

    /// Seconds per tick.
    pub fn timestep(&self) -> f64 {
        self.timestep
    }

    /// Change the tick length; the accumulated remainder is kept.
    pub fn set_timestep(&mut self, timestep: f64) {
        self.timestep = timestep;
    }

    /// Change the per-frame catch-up limit.
    pub fn set_max_catch_up(&mut self, max_catch_up: u32) {
        self.max_catch_up = max_catch_up.max(1);
    }

    /// Drop accumulated time and pending steps and zero the counters.
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.step_requested = false;
        self.ticks = 0;
        self.simulated = 0.0;
    }
}
