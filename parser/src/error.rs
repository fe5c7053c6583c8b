use thiserror::Error;

/// Errors that can occur while decoding a single replay file.
///
/// None of these escape a batch run: the folder driver logs the error and
/// skips the file so one bad replay cannot poison the rest of the set.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to read replay file: {0}")]
    Io(#[from] std::io::Error),

    /// No JSON object in the data segment matched the battle metadata shape.
    #[error("no battle metadata found in replay")]
    MissingMetadata,

    /// No JSON object matched the expected battle results shape.
    #[error("no battle results found in replay")]
    MissingResults,

    /// The observing player does not appear in the metadata vehicle roster.
    #[error("player {0:?} not present in the vehicle roster")]
    PlayerNotInRoster(String),

    /// The `personal` block had no entry carrying combat stats.
    #[error("no personal stats entry with damage data")]
    MissingPersonalStats,
}
