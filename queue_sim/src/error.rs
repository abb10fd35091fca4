use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("number of runs must be positive, got {0}")]
    InvalidRunCount(usize),

    #[error("run {run_index} panicked: {message}")]
    RunPanicked { run_index: usize, message: String },

    #[error("could not build thread pool: {0}")]
    ThreadPool(String),
}

pub type SimResult<T> = Result<T, SimError>;
