//! Error types for the list engine.

use thiserror::Error;

use crate::models::ErrorInfo;

/// Request type tag carried by entity load failures.
pub const LOAD_ENTITIES: &str = "LOAD_ENTITIES";

/// Failures raised while dispatching a list request.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The data source failed to return a page.
    #[error("failed to load entities")]
    LoadEntities {
        /// Underlying transport or decode failure.
        #[source]
        original: anyhow::Error,
    },
}

impl DispatchError {
    /// Request type tag for the failure.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::LoadEntities { .. } => LOAD_ENTITIES,
        }
    }

    /// Snapshot suitable for storing in list state.
    #[must_use]
    pub fn to_info(&self) -> ErrorInfo {
        let message = match self {
            Self::LoadEntities { original } => format!("{self}: {original:#}"),
        };
        ErrorInfo {
            kind: self.kind().to_string(),
            message,
        }
    }
}

/// Failures raised by batched fetches.
#[derive(Debug, Error)]
pub enum BatchError {
    /// One chunk failed, which fails the whole batch.
    #[error("batched fetch failed on chunk {chunk} of {chunks}")]
    Chunk {
        /// 1-based position of the failing chunk.
        chunk: usize,
        /// Number of chunks in the batch.
        chunks: usize,
        /// Underlying failure.
        #[source]
        source: anyhow::Error,
    },
}

/// Convenience alias for dispatcher results.
pub type DispatchResult<T> = Result<T, DispatchError>;
