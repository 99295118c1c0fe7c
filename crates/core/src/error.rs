use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RefscopeError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Resolver has been disposed")]
    Disposed,
    #[error("Project manifest not found: {}", path.display())]
    MissingManifest { path: PathBuf },
    #[error("Malformed project manifest {}: {reason}", path.display())]
    MalformedManifest { path: PathBuf, reason: String },
    #[error("Companion properties file not found: {}", path.display())]
    MissingCompanionFile { path: PathBuf },
    #[error("Malformed companion properties file {}: {reason}", path.display())]
    MalformedCompanionFile { path: PathBuf, reason: String },
    #[error("Dependency lock file not found: {}", path.display())]
    MissingAssetsFile { path: PathBuf },
    #[error("Malformed dependency lock file {}: {reason}", path.display())]
    MalformedAssetsFile { path: PathBuf, reason: String },
    #[error("Package {name} {version} has no entry in the dependency lock file")]
    UnresolvedReference { name: String, version: String },
    #[error("Watch error: {0}")]
    Watch(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RefscopeError {
    /// Errors raised because the caller handed in something unusable, as
    /// opposed to a problem with the project files on disk.
    pub fn is_configuration(&self) -> bool {
        matches!(self, RefscopeError::Configuration(_) | RefscopeError::Disposed)
    }
}

impl From<notify::Error> for RefscopeError {
    fn from(err: notify::Error) -> Self {
        RefscopeError::Watch(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RefscopeError>;
