/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur when building or parsing core entity data.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A species name did not match any known species.
    #[error("unknown species: \"{0}\" (expected plante, proie or predateur)")]
    UnknownSpecies(String),

    /// A body variant did not match the species it was paired with.
    #[error("species {species} cannot carry a {body} body")]
    BodyMismatch {
        /// The species that was requested.
        species: String,
        /// The body variant that was supplied.
        body: &'static str,
    },
}
