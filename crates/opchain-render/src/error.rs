//! Render error types.
//!
//! A render can fail in two different places: while the command line is
//! being built (operators, chains, I/O spec) or after the external tool
//! was started. [`RenderError`] keeps the two apart.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for render operations.
pub type Result<T> = std::result::Result<T, RenderError>;

/// Errors from assembling or executing an external tool invocation.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The command line could not be built. No process was spawned.
    #[error("cannot build command: {0}")]
    Build(#[from] opchain_core::Error),

    /// A config file could not be read.
    #[error("cannot read config {path}: {source}")]
    ConfigIo {
        /// Config path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// A config file is not valid YAML for the expected type.
    #[error("invalid config: {0}")]
    Config(#[from] serde_yaml::Error),

    /// The external tool could not be started.
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        /// Program name or path
        program: String,
        /// Underlying error
        source: std::io::Error,
    },

    /// The external tool ran and exited unsuccessfully.
    #[error("render failed (exit code {}): {}", fmt_code(.code), .stderr.trim())]
    RenderFailed {
        /// Exit code, `None` when the process was killed by a signal
        code: Option<i32>,
        /// Captured standard output
        stdout: String,
        /// Captured standard error
        stderr: String,
    },
}

fn fmt_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "none".to_string(), |c| c.to_string())
}

impl RenderError {
    /// Returns true when the failure happened before any process was
    /// spawned.
    pub fn is_build_error(&self) -> bool {
        matches!(self, Self::Build(_) | Self::ConfigIo { .. } | Self::Config(_))
    }

    /// Returns true when the external tool ran and failed.
    pub fn is_render_failure(&self) -> bool {
        matches!(self, Self::RenderFailed { .. })
    }

    /// Exit code of a failed render.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::RenderFailed { code, .. } => *code,
            _ => None,
        }
    }
}
