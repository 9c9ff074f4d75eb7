//! ConfError: Unified error type for star-conf public APIs
//!
//! Every fallible operation in the crate (graph construction, capacity
//! planning, cube building, validation) reports through this enum. Errors are
//! deterministic: the same parameters always fail the same way, so there is
//! nothing to retry.

use thiserror::Error;

use crate::topology::vertex::VertexId;

/// Unified error type for star-conf operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfError {
    /// A caller-supplied parameter is out of its supported range.
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: i64,
        reason: &'static str,
    },
    /// A vertex id does not belong to the star graph.
    #[error("vertex {vertex} out of range (graph has {vertex_count} vertices)")]
    VertexOutOfRange { vertex: VertexId, vertex_count: usize },
    /// A token index does not belong to the configuration.
    #[error("token {token} out of range (configuration has {tokens} tokens)")]
    TokenOutOfRange { token: usize, tokens: usize },
    /// A configuration has the wrong number of tokens for the run.
    #[error("configuration has {found} tokens, expected {expected}")]
    ConfigurationLength { expected: usize, found: usize },
    /// A coordinate tuple or cube does not match the embedding dimension.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
    /// An internal consistency check failed; the whole computation is void.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

impl ConfError {
    pub(crate) fn invalid(name: &'static str, value: impl Into<i64>, reason: &'static str) -> Self {
        ConfError::InvalidParameter {
            name,
            value: value.into(),
            reason,
        }
    }

    pub(crate) fn invariant(message: impl Into<String>) -> Self {
        ConfError::InvariantViolation(message.into())
    }
}
