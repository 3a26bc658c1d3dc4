//! Task response status: the discriminant of every task result.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TaskflowError;

/// Closed set of outcomes an orchestrator understands.
///
/// Serialized as SCREAMING_SNAKE_CASE: CONTINUE / DONE / ERROR / ABORTED.
///
/// - `CONTINUE`: re-invoke the task (after `wait`, if given) with a new input.
/// - `DONE`: the task finished.
/// - `ERROR`: the task failed; the result carries a normalized error.
/// - `ABORTED`: the task was stopped without producing output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskResponseStatus {
    Continue,
    Done,
    Error,
    Aborted,
}

impl TaskResponseStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Continue => "CONTINUE",
            Self::Done => "DONE",
            Self::Error => "ERROR",
            Self::Aborted => "ABORTED",
        }
    }

    /// Is this the last result the orchestrator will see for the task?
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Continue)
    }
}

impl fmt::Display for TaskResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskResponseStatus {
    type Err = TaskflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CONTINUE" => Ok(Self::Continue),
            "DONE" => Ok(Self::Done),
            "ERROR" => Ok(Self::Error),
            "ABORTED" => Ok(Self::Aborted),
            other => Err(TaskflowError::UnhandledStatus(other.to_string())),
        }
    }
}
