//! Error types for inference execution.

use thiserror::Error;

/// Errors that can occur while validating a query, mutating the network,
/// or running the elimination pipeline.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in the future without breaking changes.
///
/// All public APIs return `Result<T, InferError>` to avoid panics in library
/// code. The core performs no I/O, so no variant is transient or retriable:
/// every failure is a precondition violation surfaced to the caller.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum InferError {
    /// The query is malformed: empty, names a variable absent from the
    /// network, or overlaps with the evidence set. Raised before any
    /// network mutation takes place.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// The network or a factor is internally inconsistent (e.g., a parent
    /// with no node, a CPT whose shape does not match its variables).
    /// Treated as a programming/data error and propagated immediately.
    #[error("structural inconsistency: {0}")]
    Structural(String),

    /// Numerical failure (NaN/Inf entries, zero total mass on normalize).
    #[error("numerical error: {0}")]
    Numerical(String),
}
