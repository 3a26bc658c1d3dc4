//! Task definitions: the task logic the runner dispatches to.
//!
//! # Layers
//! - **TaskDefinition**: one unit of task logic, looked up by `taskDefinitionId`
//! - **DefinitionRegistry**: `taskDefinitionId -> Arc<dyn TaskDefinition>`

pub mod registry;

pub use self::registry::DefinitionRegistry;

use async_trait::async_trait;

use crate::abort::AbortSignal;
use crate::domain::{TaskDefinitionId, TaskEvent, TaskFailure, TaskResult};
use crate::response::Response;

/// Task logic for one task definition.
///
/// Returning `Err` is the normal way to fail: the runner turns the failure
/// into an ERROR result. Any `std::error::Error` converts into
/// [`TaskFailure`], so `?` works inside `run`.
///
/// ```ignore
/// struct ReindexPages;
///
/// #[async_trait]
/// impl TaskDefinition for ReindexPages {
///     fn id(&self) -> TaskDefinitionId {
///         TaskDefinitionId::new("pages.reindex")
///     }
///
///     async fn run(&self, ctx: &TaskContext<'_>) -> Result<TaskResult, TaskFailure> {
///         let cursor: Cursor = serde_json::from_value(ctx.input().clone())?;
///         // ...
///         Ok(ctx.response().done(None).into())
///     }
/// }
/// ```
#[async_trait]
pub trait TaskDefinition: Send + Sync {
    fn id(&self) -> TaskDefinitionId;

    fn title(&self) -> Option<&str> {
        None
    }

    async fn run(&self, ctx: &TaskContext<'_>) -> Result<TaskResult, TaskFailure>;
}

/// What a definition sees while it runs.
pub struct TaskContext<'a> {
    event: &'a TaskEvent,
    response: Response<'a>,
    abort: &'a AbortSignal,
}

impl<'a> TaskContext<'a> {
    pub fn new(event: &'a TaskEvent, abort: &'a AbortSignal) -> Self {
        Self {
            event,
            response: Response::new(event),
            abort,
        }
    }

    pub fn event(&self) -> &'a TaskEvent {
        self.event
    }

    pub fn input(&self) -> &'a serde_json::Value {
        &self.event.input
    }

    pub fn response(&self) -> &Response<'a> {
        &self.response
    }

    /// The runner drops a running definition as soon as abort is requested;
    /// checking this between steps lets a definition stop at a clean point.
    pub fn is_aborted(&self) -> bool {
        self.abort.is_aborted()
    }

    pub fn abort_signal(&self) -> &'a AbortSignal {
        self.abort
    }
}
