use thiserror::Error;

/// Misuse of the episode state machine by the caller.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageError {
    #[error("step() called before reset()")]
    NotReset,
    #[error("step() called after the episode ended; call reset() first")]
    EpisodeDone,
    #[error("environment has been closed")]
    Closed,
}

/// Failures surfaced by [`EnvInstance`](crate::EnvInstance) operations.
#[derive(Error, Debug)]
pub enum EnvError {
    #[error("usage error: {0}")]
    Usage(#[from] UsageError),
    #[error("action {action} is not a member of action space {space} (n = {n})")]
    InvalidAction { action: usize, space: String, n: usize },
    #[error("observation shape {actual:?} does not match declared shape {expected:?} of space {space}")]
    ShapeMismatch {
        space: String,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },
    #[error("provider error: {0}")]
    Provider(String),
}

/// Reasons a provider refuses to build an environment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstructionError {
    #[error("unknown observation space: {0}")]
    UnknownObservationSpace(String),
    #[error("unknown reward space: {0}")]
    UnknownRewardSpace(String),
    #[error("unknown benchmark: {0}")]
    UnknownBenchmark(String),
    #[error("provider failed to start: {0}")]
    Provider(String),
}

impl From<ConstructionError> for EnvError {
    fn from(err: ConstructionError) -> Self {
        EnvError::Provider(err.to_string())
    }
}
