//! LR-003: Dispatcher error kinds.
//!
//! Delegated-tool failures are not errors: they surface as
//! `Outcome::Failed(code)` so the tool's exit status passes through untouched.

use std::path::PathBuf;

/// Exit code used when a required tool is not on `PATH` (shell convention).
pub const EXIT_TOOL_NOT_FOUND: i32 = 127;

#[derive(thiserror::Error, Debug)]
pub enum DispatchError {
    #[error("required tool not found: {0}")]
    ToolNotFound(String),
    #[error("config template missing: {}", .0.display())]
    MissingTemplate(PathBuf),
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("manifest {}: {source}", path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },
    /// A command reached the operation path without a plan behind it.
    #[error("command {0} has no operation plan")]
    Unplanned(String),
    #[error("{} manifest validation error(s)", .0.len())]
    Invalid(Vec<String>),
    #[error("glob: {0}")]
    Glob(#[from] glob::PatternError),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    /// Prompt I/O on the controlling terminal (stderr out, stdin in).
    #[error("terminal I/O: {0}")]
    Terminal(#[from] std::io::Error),
}

impl DispatchError {
    /// Wrap an I/O error with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ToolNotFound(_) => EXIT_TOOL_NOT_FOUND,
            _ => 1,
        }
    }
}

pub type DispatchResult<T> = Result<T, DispatchError>;
