use thiserror::Error;

/// Outcome classification handed to the transport layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status { Ok, NotFound, InvalidInput, InternalError }

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("invalid input: {0}")]
    Validation(String),

    /// Also covers tasks owned by someone else.
    #[error("task not found")]
    NotFound,

    #[error("store failure: {0:#}")]
    Store(#[from] anyhow::Error),
}

impl TaskError {
    pub fn status(&self) -> Status {
        match self {
            TaskError::Validation(_) => Status::InvalidInput,
            TaskError::NotFound => Status::NotFound,
            TaskError::Store(_) => Status::InternalError,
        }
    }
}

pub type TaskResult<T> = Result<T, TaskError>;
