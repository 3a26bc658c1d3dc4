//! Task results: the typed outcome of one task invocation.
//!
//! Every result is a terminal snapshot. There are no transitions between
//! variants; the orchestrator reads `status` and decides what to do next
//! (re-invoke, finish, report, drop).

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::event::TaskEvent;
use super::failure::NormalizedError;
use super::ids::{TaskDefinitionId, TaskId};
use super::status::TaskResponseStatus;

/// Identifying fields carried from the event into every result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Correlation {
    pub task_id: TaskId,
    pub task_definition_id: TaskDefinitionId,
    pub tenant: String,
    pub locale: String,
}

impl Correlation {
    /// Correlation taken verbatim from the event.
    pub fn of(event: &TaskEvent) -> Self {
        Self {
            task_id: event.task_id.clone(),
            task_definition_id: event.task_definition_id.clone(),
            tenant: event.tenant.clone(),
            locale: event.locale.clone(),
        }
    }
}

/// Shared capability of every result variant.
pub trait Correlated {
    fn status(&self) -> TaskResponseStatus;
    fn correlation(&self) -> &Correlation;

    fn task_id(&self) -> &TaskId {
        &self.correlation().task_id
    }

    fn task_definition_id(&self) -> &TaskDefinitionId {
        &self.correlation().task_definition_id
    }

    fn tenant(&self) -> &str {
        &self.correlation().tenant
    }

    fn locale(&self) -> &str {
        &self.correlation().locale
    }
}

/// CONTINUE: run the task again with `input`, optionally after `wait` seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinueResult {
    #[serde(flatten)]
    correlation: Correlation,

    input: serde_json::Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    wait: Option<u64>,
}

impl ContinueResult {
    pub(crate) fn new(correlation: Correlation, input: serde_json::Value, wait: Option<u64>) -> Self {
        Self {
            correlation,
            input,
            wait,
        }
    }

    pub fn input(&self) -> &serde_json::Value {
        &self.input
    }

    /// Raw wait hint, in seconds.
    pub fn wait_secs(&self) -> Option<u64> {
        self.wait
    }

    pub fn wait(&self) -> Option<Duration> {
        self.wait.map(Duration::from_secs)
    }
}

/// DONE: the task finished.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoneResult {
    #[serde(flatten)]
    correlation: Correlation,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl DoneResult {
    pub(crate) fn new(correlation: Correlation, message: Option<String>) -> Self {
        Self {
            correlation,
            message,
        }
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

/// ERROR: the task failed. `error` is always normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResult {
    #[serde(flatten)]
    correlation: Correlation,

    error: NormalizedError,
}

impl ErrorResult {
    pub(crate) fn new(correlation: Correlation, error: NormalizedError) -> Self {
        Self { correlation, error }
    }

    pub fn error(&self) -> &NormalizedError {
        &self.error
    }
}

/// ABORTED: the task was stopped; nothing beyond correlation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbortedResult {
    #[serde(flatten)]
    correlation: Correlation,
}

impl AbortedResult {
    pub(crate) fn new(correlation: Correlation) -> Self {
        Self { correlation }
    }
}

macro_rules! impl_correlated {
    ($ty:ty, $status:expr) => {
        impl Correlated for $ty {
            fn status(&self) -> TaskResponseStatus {
                $status
            }

            fn correlation(&self) -> &Correlation {
                &self.correlation
            }
        }
    };
}

impl_correlated!(ContinueResult, TaskResponseStatus::Continue);
impl_correlated!(DoneResult, TaskResponseStatus::Done);
impl_correlated!(ErrorResult, TaskResponseStatus::Error);
impl_correlated!(AbortedResult, TaskResponseStatus::Aborted);

/// The outcome of one task invocation.
///
/// Wire shape: `{"status": "CONTINUE" | "DONE" | "ERROR" | "ABORTED", ...}`
/// with the correlation fields and the variant payload side by side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskResult {
    Continue(ContinueResult),
    Done(DoneResult),
    Error(ErrorResult),
    Aborted(AbortedResult),
}

impl TaskResult {
    pub fn is_terminal(&self) -> bool {
        self.status().is_terminal()
    }

    pub fn as_continue(&self) -> Option<&ContinueResult> {
        match self {
            Self::Continue(result) => Some(result),
            _ => None,
        }
    }

    pub fn as_done(&self) -> Option<&DoneResult> {
        match self {
            Self::Done(result) => Some(result),
            _ => None,
        }
    }

    pub fn as_error(&self) -> Option<&ErrorResult> {
        match self {
            Self::Error(result) => Some(result),
            _ => None,
        }
    }
}

impl Correlated for TaskResult {
    fn status(&self) -> TaskResponseStatus {
        match self {
            Self::Continue(result) => result.status(),
            Self::Done(result) => result.status(),
            Self::Error(result) => result.status(),
            Self::Aborted(result) => result.status(),
        }
    }

    fn correlation(&self) -> &Correlation {
        match self {
            Self::Continue(result) => result.correlation(),
            Self::Done(result) => result.correlation(),
            Self::Error(result) => result.correlation(),
            Self::Aborted(result) => result.correlation(),
        }
    }
}

impl From<ContinueResult> for TaskResult {
    fn from(result: ContinueResult) -> Self {
        Self::Continue(result)
    }
}

impl From<DoneResult> for TaskResult {
    fn from(result: DoneResult) -> Self {
        Self::Done(result)
    }
}

impl From<ErrorResult> for TaskResult {
    fn from(result: ErrorResult) -> Self {
        Self::Error(result)
    }
}

impl From<AbortedResult> for TaskResult {
    fn from(result: AbortedResult) -> Self {
        Self::Aborted(result)
    }
}
