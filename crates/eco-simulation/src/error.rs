use eco_core::CoreError;

/// Alias for `Result<T, SimError>`.
pub type SimResult<T> = Result<T, SimError>;

/// A configuration value was rejected before any tick could use it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A parameter holds a value outside its valid range.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Dotted parameter path, e.g. `prey.flee_radius`.
        name: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// No parameter with this name exists.
    #[error("unknown parameter `{0}`")]
    UnknownParameter(String),
}

impl ConfigError {
    pub(crate) fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Errors surfaced by the simulation engine.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// The configuration failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Entity data was malformed.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A spawn was requested at a non-finite position.
    #[error("cannot spawn at non-finite position ({x}, {y})")]
    InvalidPosition {
        /// Requested x coordinate.
        x: f64,
        /// Requested y coordinate.
        y: f64,
    },

    /// Reading or writing a save file failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A save file could not be encoded or decoded.
    #[error("save file format error: {0}")]
    Json(#[from] serde_json::Error),

    /// A save file was written by an incompatible version.
    #[error("save file version {found} is not supported (expected {expected})")]
    VersionMismatch {
        /// The version this build reads.
        expected: u32,
        /// The version found in the file.
        found: u32,
    },

    /// A restored state violates an engine invariant.
    #[error("corrupt save state: {0}")]
    CorruptState(String),
}
