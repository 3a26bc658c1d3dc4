//! Response builder: shapes a task's intended outcome into a [`TaskResult`].
//!
//! The builder is bound to one event and does no I/O. It only fills in
//! correlation fields and normalizes errors; what happens with the result is
//! up to the orchestrator.
//!
//! ```ignore
//! let response = Response::new(&event);
//! let result = response.continue_with(ContinueParams::new(json!({"page": 2})).with_wait(30));
//! ```

pub mod params;

pub use self::params::{ContinueParams, DoneParams, ErrorParams, Overrides, ResponseFromParams};

use crate::domain::{
    AbortedResult, ContinueResult, Correlated, Correlation, DoneResult, ErrorResult, TaskEvent,
    TaskResult,
};

#[derive(Debug, Clone, Copy)]
pub struct Response<'a> {
    event: &'a TaskEvent,
}

impl<'a> Response<'a> {
    pub fn new(event: &'a TaskEvent) -> Self {
        Self { event }
    }

    pub fn event(&self) -> &'a TaskEvent {
        self.event
    }

    /// Dispatch on the params' status tag.
    pub fn from(&self, params: ResponseFromParams) -> TaskResult {
        match params {
            ResponseFromParams::Continue(p) => self.continue_with(p).into(),
            ResponseFromParams::Done(p) => self.done(p).into(),
            ResponseFromParams::Error(p) => self.error(p).into(),
        }
    }

    pub fn continue_with(&self, params: ContinueParams) -> ContinueResult {
        let ContinueParams {
            input,
            wait,
            overrides,
        } = params;
        let result = ContinueResult::new(Correlation::resolve(self.event, overrides), input, wait);
        trace_result(&result);
        result
    }

    /// `None` means "done, nothing to add": every field comes from the event.
    pub fn done(&self, params: impl Into<Option<DoneParams>>) -> DoneResult {
        let DoneParams { message, overrides } = params.into().unwrap_or_default();
        let result = DoneResult::new(Correlation::resolve(self.event, overrides), message);
        trace_result(&result);
        result
    }

    pub fn error(&self, params: impl Into<ErrorParams>) -> ErrorResult {
        let ErrorParams { error, overrides } = params.into();
        let result = ErrorResult::new(Correlation::resolve(self.event, overrides), error.normalize());
        tracing::debug!(
            task_id = %result.task_id(),
            definition_id = %result.task_definition_id(),
            status = %result.status(),
            kind = %result.error().kind(),
            message = %result.error().message(),
            "task response"
        );
        result
    }

    /// Aborting never takes overrides.
    pub fn aborted(&self) -> AbortedResult {
        let result = AbortedResult::new(Correlation::of(self.event));
        trace_result(&result);
        result
    }
}

fn trace_result(result: &impl Correlated) {
    tracing::debug!(
        task_id = %result.task_id(),
        definition_id = %result.task_definition_id(),
        status = %result.status(),
        "task response"
    );
}
