//! Error types for remote execution and configuration.

use svp_dict_core::ValidationError;
use thiserror::Error;

/// Errors that can occur while talking to the remote system.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Spawning or reading from the local process failed.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Configuration file parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// The command did not finish in time and was killed.
    #[error("command timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// The command exited with a non-zero status and wrote to stderr.
    #[error("exit {status}:\n{stderr}")]
    CommandFailed { status: i32, stderr: String },

    /// No remote host configured.
    #[error("missing remote host (use --host or host.host in the config file)")]
    MissingHost,

    /// No remote user configured.
    #[error("missing remote user (use --user or host.user in the config file)")]
    MissingUser,

    /// The configured password variable is not set.
    #[error("environment variable {0} is not set")]
    MissingPassword(String),

    /// A required argument was empty.
    #[error("{0} cannot be empty")]
    EmptyInput(&'static str),

    /// An object name failed validation before interpolation.
    #[error(transparent)]
    InvalidName(#[from] ValidationError),
}

/// Convenience alias for results with [`RemoteError`].
pub type Result<T> = std::result::Result<T, RemoteError>;
