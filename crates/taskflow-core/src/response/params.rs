//! Parameters accepted by the response builder.
//!
//! All params share one [`Overrides`] set; the builder resolves it against
//! the bound event with a single merge rule (see [`Correlation::resolve`]).

use serde::{Deserialize, Serialize};

use crate::domain::{Correlation, TaskEvent, TaskFailure, TaskId, TaskResponseStatus};
use crate::error::TaskflowError;

/// Caller-supplied replacements for the event's correlation fields.
///
/// `taskDefinitionId` is deliberately absent: it always comes from the event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

impl Overrides {
    pub fn task_id(mut self, task_id: impl Into<TaskId>) -> Self {
        self.task_id = Some(task_id.into());
        self
    }

    pub fn tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }

    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }
}

impl Correlation {
    /// Merge overrides onto the event's correlation.
    ///
    /// An override that is missing or empty falls back to the event value.
    pub fn resolve(event: &TaskEvent, overrides: Overrides) -> Self {
        Self {
            task_id: overrides
                .task_id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| event.task_id.clone()),
            task_definition_id: event.task_definition_id.clone(),
            tenant: non_empty(overrides.tenant).unwrap_or_else(|| event.tenant.clone()),
            locale: non_empty(overrides.locale).unwrap_or_else(|| event.locale.clone()),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinueParams {
    /// Input for the next invocation.
    pub input: serde_json::Value,

    /// Seconds the orchestrator should wait before re-invoking.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait: Option<u64>,

    #[serde(flatten)]
    pub overrides: Overrides,
}

impl ContinueParams {
    pub fn new(input: serde_json::Value) -> Self {
        Self {
            input,
            wait: None,
            overrides: Overrides::default(),
        }
    }

    pub fn with_wait(mut self, seconds: u64) -> Self {
        self.wait = Some(seconds);
        self
    }

    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        self.overrides = overrides;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoneParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(flatten)]
    pub overrides: Overrides,
}

impl DoneParams {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            overrides: Overrides::default(),
        }
    }

    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        self.overrides = overrides;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorParams {
    pub error: TaskFailure,

    #[serde(flatten)]
    pub overrides: Overrides,
}

impl ErrorParams {
    pub fn new(error: impl Into<TaskFailure>) -> Self {
        Self {
            error: error.into(),
            overrides: Overrides::default(),
        }
    }

    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        self.overrides = overrides;
        self
    }
}

impl From<TaskFailure> for ErrorParams {
    fn from(error: TaskFailure) -> Self {
        Self::new(error)
    }
}

/// Params for [`Response::from`](super::Response::from), tagged by `status`.
///
/// ABORTED is not part of this set: aborting takes no params.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseFromParams {
    Continue(ContinueParams),
    Done(DoneParams),
    Error(ErrorParams),
}

impl ResponseFromParams {
    pub fn status(&self) -> TaskResponseStatus {
        match self {
            Self::Continue(_) => TaskResponseStatus::Continue,
            Self::Done(_) => TaskResponseStatus::Done,
            Self::Error(_) => TaskResponseStatus::Error,
        }
    }

    /// Decode params received as JSON.
    ///
    /// A missing or unknown `status` is reported as
    /// [`TaskflowError::UnhandledStatus`], not as a generic decode error, so
    /// callers can tell a protocol mismatch from a malformed payload.
    pub fn from_value(value: serde_json::Value) -> Result<Self, TaskflowError> {
        let status = match value.get("status") {
            Some(serde_json::Value::String(s)) => s.parse::<TaskResponseStatus>()?,
            Some(other) => return Err(TaskflowError::UnhandledStatus(other.to_string())),
            None => return Err(TaskflowError::UnhandledStatus(String::new())),
        };
        if status == TaskResponseStatus::Aborted {
            return Err(TaskflowError::UnhandledStatus(status.to_string()));
        }
        Ok(serde_json::from_value(value)?)
    }
}

impl From<ContinueParams> for ResponseFromParams {
    fn from(params: ContinueParams) -> Self {
        Self::Continue(params)
    }
}

impl From<DoneParams> for ResponseFromParams {
    fn from(params: DoneParams) -> Self {
        Self::Done(params)
    }
}

impl From<ErrorParams> for ResponseFromParams {
    fn from(params: ErrorParams) -> Self {
        Self::Error(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn event() -> TaskEvent {
        TaskEvent::new("t1", "d1", "T", "en-US")
    }

    #[test]
    fn resolve_prefers_overrides() {
        let c = Correlation::resolve(
            &event(),
            Overrides::default().task_id("t2").tenant("U").locale("de-DE"),
        );
        assert_eq!(c.task_id.as_str(), "t2");
        assert_eq!(c.task_definition_id.as_str(), "d1");
        assert_eq!(c.tenant, "U");
        assert_eq!(c.locale, "de-DE");
    }

    #[test]
    fn empty_overrides_fall_back_to_event() {
        let c = Correlation::resolve(
            &event(),
            Overrides::default().task_id("").tenant("").locale(""),
        );
        assert_eq!(c, Correlation::of(&event()));
    }

    #[test]
    fn params_decode_with_flattened_overrides() {
        let params = ResponseFromParams::from_value(json!({
            "status": "CONTINUE",
            "input": { "page": 2 },
            "wait": 10,
            "tenant": "U",
        }))
        .unwrap();

        let ResponseFromParams::Continue(p) = params else {
            panic!("expected CONTINUE params");
        };
        assert_eq!(p.input, json!({ "page": 2 }));
        assert_eq!(p.wait, Some(10));
        assert_eq!(p.overrides.tenant.as_deref(), Some("U"));
        assert!(p.overrides.task_id.is_none());
    }

    #[test]
    fn error_params_keep_normalized_errors_as_is() {
        let params = ResponseFromParams::from_value(json!({
            "status": "ERROR",
            "error": { "kind": "Timeout", "message": "slow", "data": {} },
        }))
        .unwrap();
        let ResponseFromParams::Error(p) = params else {
            panic!("expected ERROR params");
        };
        assert!(p.error.is_normalized());
    }

    #[rstest]
    #[case::unknown(json!({ "status": "UNKNOWN" }), "UNKNOWN")]
    #[case::aborted(json!({ "status": "ABORTED" }), "ABORTED")]
    #[case::not_a_string(json!({ "status": 7 }), "7")]
    #[case::missing(json!({ "input": 1 }), "")]
    fn unknown_status_is_unhandled(#[case] value: serde_json::Value, #[case] expected: &str) {
        let err = ResponseFromParams::from_value(value).unwrap_err();
        assert!(matches!(err, TaskflowError::UnhandledStatus(ref s) if s == expected));
    }

    #[test]
    fn malformed_payload_is_not_reported_as_unhandled_status() {
        let err = ResponseFromParams::from_value(json!({ "status": "CONTINUE" })).unwrap_err();
        assert!(matches!(err, TaskflowError::InvalidPayload(_)));
    }
}
