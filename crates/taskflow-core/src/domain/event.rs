//! Task event: the inbound description of one task invocation.

use serde::{Deserialize, Serialize};

use super::ids::{TaskDefinitionId, TaskId};

/// Everything the orchestrator tells a task about the current invocation.
///
/// Built by the orchestrator before the task runs. The response layer only
/// ever borrows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskEvent {
    pub task_id: TaskId,
    pub task_definition_id: TaskDefinitionId,
    pub tenant: String,
    pub locale: String,

    /// Opaque payload for the task logic.
    #[serde(default)]
    pub input: serde_json::Value,
}

impl TaskEvent {
    pub fn new(
        task_id: impl Into<TaskId>,
        task_definition_id: impl Into<TaskDefinitionId>,
        tenant: impl Into<String>,
        locale: impl Into<String>,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            task_definition_id: task_definition_id.into(),
            tenant: tenant.into(),
            locale: locale.into(),
            input: serde_json::Value::Null,
        }
    }

    pub fn with_input(mut self, input: serde_json::Value) -> Self {
        self.input = input;
        self
    }
}
