//! Error types for the tick-stage debugger core.

use crate::stage::StageKind;
use crate::types::StageId;
use thiserror::Error;

/// Fatal protocol/consistency violations.
///
/// These indicate the host's instrumentation points are firing out of order,
/// which makes all derived debugging state untrustworthy. They are never
/// silently corrected; callers must treat them as fatal.
#[derive(Debug, Error)]
pub enum ConsistencyError {
    #[error("pushed stage declares parent {declared:?}, but the active stage is {active:?}")]
    ParentMismatch {
        declared: Option<StageId>,
        active: Option<StageId>,
    },

    #[error("popped stage expected to be {expected:?}, got {actual:?}")]
    KindMismatch {
        expected: StageKind,
        actual: StageKind,
    },

    #[error("pop called on an empty stage tree")]
    PopOnEmpty,

    #[error("stage tree is not empty after popping all stages: {remaining} stage(s) remain")]
    TreeNotEmpty { remaining: usize },
}

/// Session persistence errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("session storage error: {0}")]
    Backend(#[from] sled::Error),

    #[error("breakpoint entry codec error: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("session storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Umbrella error for the public debugger API.
#[derive(Debug, Error)]
pub enum DebugError {
    #[error("consistency error: {0}")]
    Consistency(#[from] ConsistencyError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<config::ConfigError> for DebugError {
    fn from(err: config::ConfigError) -> Self {
        DebugError::Config(err.to_string())
    }
}
