//! CLI failures and their exit codes.
//!
//! Exit code scheme:
//! - 0:  success
//! - 2:  clap arg parse error (automatic, before our code runs)
//! - 10: the chain does not compile (unknown primitive, runaway nesting)
//! - 11: a file could not be read or written
//! - 12: a chain or scene file is not a valid description
//! - 13: the graphics backend rejected the scene
//! - 14: JSON output could not be produced

use std::path::Path;

use shadegraph_core::GraphError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("unknown primitive '{0}' (see `shadegraph list`)")]
    UnknownPrimitive(String),

    #[error("side-chains nest deeper than {0} levels")]
    TooDeep(usize),

    #[error("{path}: {message}")]
    Io { path: String, message: String },

    #[error("{path}: {message}")]
    Parse { path: String, message: String },

    /// Any pipeline failure that is not about the chain itself.
    #[error(transparent)]
    Pipeline(GraphError),

    #[error("cannot encode output: {0}")]
    Output(#[from] serde_json::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::UnknownPrimitive(_) | CliError::TooDeep(_) => 10,
            CliError::Io { .. } => 11,
            CliError::Parse { .. } => 12,
            CliError::Pipeline(_) => 13,
            CliError::Output(_) => 14,
        }
    }

    /// Attributes a failure to the file being processed.
    pub fn in_file(path: &Path, err: GraphError) -> Self {
        let path = path.display().to_string();
        match err {
            GraphError::Io(message) => CliError::Io { path, message },
            GraphError::Scene(message) => CliError::Parse { path, message },
            other => other.into(),
        }
    }
}

impl From<GraphError> for CliError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::UnknownPrimitive(name) => CliError::UnknownPrimitive(name),
            GraphError::CycleDetected(depth) => CliError::TooDeep(depth),
            other => CliError::Pipeline(other),
        }
    }
}
