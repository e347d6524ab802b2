use thiserror::Error;

/// Library error type for signage-player setup operations.
///
/// Playback has no fatal paths; these cover configuration loading and
/// playlist assembly only.
#[derive(Debug, Error)]
pub enum Error {
    /// The configured assets directory is missing or unreadable.
    #[error("invalid assets directory: {0}")]
    BadAssetDir(String),

    /// Underlying IO error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML/serde configuration error.
    #[error(transparent)]
    Config(#[from] serde_yaml::Error),
}
