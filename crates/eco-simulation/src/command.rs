use eco_core::{Species, Vec2};
use serde::{Deserialize, Serialize};

/// Control commands a UI or driver sends to a [`crate::Simulation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// Stop running ticks on frame updates.
    Pause,
    /// Start running ticks again.
    Resume,
    /// Run exactly one tick on the next frame, paused or not.
    Step,
    /// Change a parameter by dotted name.
    SetParameter {
        /// Dotted parameter name, e.g. `prey.flee_radius`.
        name: String,
        /// New value.
        value: f64,
    },
    /// Add one entity at a position.
    SpawnEntity {
        /// Species to create.
        species: Species,
        /// Where to place it (clamped into the world).
        position: Vec2,
    },
    /// Rebuild the world from a new seed.
    Reset {
        /// Seed for the new world.
        seed: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_json_shape() {
        let cmd = Command::SetParameter {
            name: "prey.speed".into(),
            value: 60.0,
        };
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["command"], "set_parameter");
        assert_eq!(json["name"], "prey.speed");
        let back: Command = serde_json::from_value(json).unwrap();
        assert_eq!(back, cmd);
    }

    #[test]
    fn unit_commands_parse() {
        let cmd: Command = serde_json::from_str(r#"{"command":"pause"}"#).unwrap();
        assert_eq!(cmd, Command::Pause);
    }
}
