//! CLI-specific error types and exit code mapping

use sluice_core::error::SluiceError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to standard Unix exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// JSON serialisation failed during output rendering or event parsing.
    #[error("json error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from the pipeline.
    #[error("{0}")]
    Core(#[from] SluiceError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                          |
    /// |------|----------------------------------|
    /// | 0    | Success                          |
    /// | 1    | General / command / parse error  |
    /// | 2    | Configuration error              |
    /// | 10   | IO error                         |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Core(SluiceError::Config(_)) => 2,
            Self::Io(_) => 10,
            Self::JsonSerialize(_) | Self::Command(_) | Self::Core(_) => 1,
        }
    }
}
