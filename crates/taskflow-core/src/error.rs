use thiserror::Error;

use crate::domain::TaskDefinitionId;

/// Protocol-level errors.
///
/// A task's own failure is never one of these: it becomes a
/// [`TaskFailure`](crate::domain::TaskFailure) and then an ERROR result.
#[derive(Debug, Error)]
pub enum TaskflowError {
    #[error("unhandled response status: {0:?}")]
    UnhandledStatus(String),

    #[error("duplicate task definition: {0}")]
    DuplicateDefinition(TaskDefinitionId),

    #[error("invalid payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
}
