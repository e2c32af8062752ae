use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlowError {
    #[error("Task execution failed: {0}")]
    TaskExecutionFailed(String),

    #[error("Context error: {0}")]
    ContextError(String),
}

pub type Result<T> = std::result::Result<T, FlowError>;
