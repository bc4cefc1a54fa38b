use thiserror::Error;

/// Failures the engine reports to its caller.
///
/// Degenerate pricing inputs and empty option selections are not errors:
/// the sensitivity estimator answers `0.0` and the selector answers `None`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("Insufficient data: need at least {required} bars, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("Invalid bar at index {index}: {reason}")]
    InvalidBar { index: usize, reason: String },

    #[error("Bar at index {index} is not strictly after the previous bar")]
    UnorderedSeries { index: usize },

    #[error("Invalid chain row at index {index}: {reason}")]
    InvalidChainRow { index: usize, reason: String },
}

impl EngineError {
    /// True when the caller should present "no signal available".
    pub fn is_no_signal(&self) -> bool {
        matches!(self, EngineError::InsufficientData { .. })
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
