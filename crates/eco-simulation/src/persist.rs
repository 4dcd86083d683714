use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use eco_core::Entity;
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::ecosystem::Ecosysteme;
use crate::error::{SimError, SimResult};

/// Everything needed to continue a run exactly where it stopped.
///
/// Per-entity randomness is derived from `(seed, tick, id)`, so no RNG
/// state beyond the seed and the tick counter has to be stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedState {
    /// Format version, checked on load.
    pub version: u32,
    /// When the state was captured.
    pub saved_at: DateTime<Utc>,
    /// Seed of the run.
    pub seed: u64,
    /// Last committed tick.
    pub tick: u64,
    /// Next entity id to hand out.
    pub next_id: u64,
    /// Seconds accumulated toward the next plant regrowth.
    pub regrowth_timer: f64,
    /// Configuration in effect.
    pub config: SimConfig,
    /// Live entities in ascending id order.
    pub entities: Vec<Entity>,
}

impl SavedState {
    /// Current save format version.
    pub const VERSION: u32 = 1;

    /// Capture the committed state of an ecosystem.
    pub fn capture(eco: &Ecosysteme) -> Self {
        Self {
            version: Self::VERSION,
            saved_at: Utc::now(),
            seed: eco.config().seed,
            tick: eco.current_tick(),
            next_id: eco.next_id(),
            regrowth_timer: eco.regrowth_timer(),
            config: eco.config().clone(),
            entities: eco.entities().cloned().collect(),
        }
    }

    /// Rebuild the ecosystem this state describes.
    pub fn restore(self) -> SimResult<Ecosysteme> {
        let mut config = self.config;
        config.seed = self.seed;
        Ecosysteme::restore(
            config,
            self.tick,
            self.next_id,
            self.regrowth_timer,
            self.entities,
        )
    }

    /// Encode as pretty-printed JSON.
    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode from JSON, rejecting other format versions.
    pub fn from_json(json: &str) -> SimResult<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let found = value
            .get("version")
            .and_then(serde_json::Value::as_u64)
            .ok_or_else(|| SimError::CorruptState("missing version field".into()))?;
        if found != u64::from(Self::VERSION) {
            return Err(SimError::VersionMismatch {
                expected: Self::VERSION,
                found: u32::try_from(found).unwrap_or(u32::MAX),
            });
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Write to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> SimResult<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Read from a file.
    pub fn load(path: impl AsRef<Path>) -> SimResult<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}
