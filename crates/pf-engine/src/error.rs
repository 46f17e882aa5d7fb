//! Error types for the generation engine.

/// Errors that can occur while setting up a generation run.
///
/// The search itself never fails; these only guard its inputs.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Power levels run from 1 to 30.
    #[error("invalid level {0}: expected 1 to 30")]
    InvalidLevel(u32),

    /// A tool profile that cannot seed a power.
    #[error("invalid tool profile: {0}")]
    InvalidToolProfile(String),

    /// A tool or class profile file could not be read.
    #[error("invalid profile JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
