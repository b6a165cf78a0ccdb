use thiserror::Error;

#[derive(Error, Debug)]
pub enum PkgFactsError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(
        "Could not detect a supported package manager from the following list: {attempted:?}. Check warnings for details."
    )]
    NoUsableManager { attempted: Vec<String> },

    /// The external command could not be spawned at all.
    #[error("Failed to run '{command}': {reason}")]
    CommandFailed { command: String, reason: String },

    /// The external command ran but exited non-zero or produced
    /// unexpected diagnostic output.
    #[error("Unable to query packages with {manager}: {reason}")]
    ExecutionError { manager: String, reason: String },

    #[error("System dependency missing: {0}")]
    DependencyMissing(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PkgFactsError>;
