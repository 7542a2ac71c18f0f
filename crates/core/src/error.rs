//! Error types for the shadegraph core.
//!
//! Only structural problems surface as `GraphError`. Recoverable conditions
//! (bad provider output, missing type conversion, unknown blend mode) are
//! logged and degraded in place; they never reach the caller.

use thiserror::Error;

/// Errors produced by graph compilation and pipeline operations.
#[derive(Debug, Error)]
pub enum GraphError {
    /// A chain referenced a primitive name that is not in the registry.
    #[error("unknown primitive: {0}")]
    UnknownPrimitive(String),

    /// A primitive was declared with a kind string that maps to no signature.
    #[error("unknown primitive kind '{kind}' for primitive '{primitive}'")]
    UnknownKind { primitive: String, kind: String },

    /// Side-chain nesting exceeded the compiler's depth bound.
    #[error("side-chain nesting deeper than {0} levels; the graph is cyclic or runaway")]
    CycleDetected(usize),

    /// Width or height was zero when allocating render targets.
    #[error("invalid dimensions: width and height must be non-zero")]
    InvalidDimensions,

    /// An output index did not refer to an existing output.
    #[error("output {index} out of range ({count} outputs)")]
    UnknownOutput { index: usize, count: usize },

    /// The graphics backend was asked about a target it never allocated.
    #[error("unknown render target: {0}")]
    UnknownTarget(u32),

    /// The graphics backend was asked to draw with a program it never built.
    #[error("unknown program: {0}")]
    UnknownProgram(u32),

    /// The graphics-API collaborator failed (e.g. shader rejected).
    #[error("graphics backend error: {0}")]
    Backend(String),

    /// A scene or chain description could not be interpreted.
    #[error("invalid scene description: {0}")]
    Scene(String),

    /// Reading a scene description failed.
    #[error("i/o error: {0}")]
    Io(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_primitive_includes_name() {
        let err = GraphError::UnknownPrimitive("oscillate".into());
        let msg = format!("{err}");
        assert!(msg.contains("oscillate"), "missing name in: {msg}");
    }

    #[test]
    fn unknown_kind_includes_primitive_and_kind() {
        let err = GraphError::UnknownKind {
            primitive: "warp".into(),
            kind: "genTypo".into(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("warp"), "missing primitive in: {msg}");
        assert!(msg.contains("genTypo"), "missing kind in: {msg}");
    }

    #[test]
    fn cycle_detected_includes_depth() {
        let msg = GraphError::CycleDetected(64).to_string();
        assert!(msg.contains("64"), "missing depth in: {msg}");
    }

    #[test]
    fn unknown_output_includes_index_and_count() {
        let msg = GraphError::UnknownOutput { index: 7, count: 4 }.to_string();
        assert!(msg.contains('7'), "missing index in: {msg}");
        assert!(msg.contains('4'), "missing count in: {msg}");
    }

    #[test]
    fn backend_error_includes_message() {
        let msg = GraphError::Backend("link failed".into()).to_string();
        assert!(msg.contains("link failed"), "missing message in: {msg}");
    }

    #[test]
    fn graph_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GraphError>();
    }

    #[test]
    fn graph_error_implements_std_error() {
        fn assert_std_error<T: std::error::Error>() {}
        assert_std_error::<GraphError>();
    }
}
