use std::sync::Arc;

use tracing::Instrument;

use crate::abort::AbortSignal;
use crate::definition::{DefinitionRegistry, TaskContext};
use crate::domain::{Correlated, NormalizedError, TaskEvent, TaskFailure, TaskResult};
use crate::response::Response;

/// Kind reported when an event names a definition nobody registered.
pub const DEFINITION_NOT_FOUND: &str = "DefinitionNotFound";

/// Runs one event through its task definition.
///
/// `run` always produces a [`TaskResult`]: a missing definition or a failing
/// task becomes an ERROR result, an abort becomes ABORTED.
pub struct TaskRunner {
    registry: Arc<DefinitionRegistry>,
}

impl TaskRunner {
    pub fn new(registry: Arc<DefinitionRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &DefinitionRegistry {
        &self.registry
    }

    pub async fn run(&self, event: &TaskEvent, abort: &AbortSignal) -> TaskResult {
        let span = tracing::info_span!(
            "task",
            task_id = %event.task_id,
            definition_id = %event.task_definition_id
        );
        self.run_event(event, abort).instrument(span).await
    }

    async fn run_event(&self, event: &TaskEvent, abort: &AbortSignal) -> TaskResult {
        let response = Response::new(event);

        let Some(definition) = self.registry.get(&event.task_definition_id) else {
            tracing::warn!("task definition not found");
            let error = NormalizedError::new(
                DEFINITION_NOT_FOUND,
                format!("task definition {} is not registered", event.task_definition_id),
            );
            return response.error(TaskFailure::normalized(error)).into();
        };

        if abort.is_aborted() {
            tracing::info!("abort requested before start");
            return response.aborted().into();
        }

        let ctx = TaskContext::new(event, abort);
        let outcome = tokio::select! {
            outcome = definition.run(&ctx) => outcome,
            _ = abort.aborted() => {
                tracing::info!("abort requested while running, cancelling task");
                return response.aborted().into();
            }
        };

        if abort.is_aborted() {
            tracing::info!("abort requested while running, discarding outcome");
            return response.aborted().into();
        }

        match outcome {
            Ok(result) => {
                tracing::info!(status = %result.status(), "task invocation finished");
                result
            }
            Err(failure) => response.error(failure).into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abort::AbortHandle;
    use crate::definition::testing::{AbortsItself, AlwaysFail, Countdown, Sleeper};
    use crate::domain::TaskResponseStatus;
    use serde_json::json;
    use std::time::{Duration, Instant};

    fn runner() -> TaskRunner {
        let mut registry = DefinitionRegistry::new();
        registry.register(Arc::new(Countdown)).unwrap();
        registry.register(Arc::new(AlwaysFail)).unwrap();
        TaskRunner::new(Arc::new(registry))
    }

    fn event(definition: &str, input: serde_json::Value) -> TaskEvent {
        TaskEvent::new("t1", definition, "root", "en-US").with_input(input)
    }

    #[tokio::test]
    async fn runner_returns_definition_result_unchanged() {
        let result = runner()
            .run(&event("test.countdown", json!({ "remaining": 2 })), &AbortSignal::never())
            .await;

        let cont = result.as_continue().expect("CONTINUE");
        assert_eq!(cont.input(), &json!({ "remaining": 1 }));
        assert_eq!(cont.wait_secs(), Some(1));
        assert_eq!(result.task_definition_id().as_str(), "test.countdown");
    }

    #[tokio::test]
    async fn runner_reports_missing_definition_as_error() {
        let result = runner()
            .run(&event("nope", json!(null)), &AbortSignal::never())
            .await;

        let error = result.as_error().expect("ERROR").error();
        assert_eq!(error.kind(), DEFINITION_NOT_FOUND);
        assert!(error.message().contains("nope"));
    }

    #[tokio::test]
    async fn runner_normalizes_task_failures() {
        let result = runner()
            .run(&event("test.fail", json!(null)), &AbortSignal::never())
            .await;

        assert_eq!(result.status(), TaskResponseStatus::Error);
        let error = result.as_error().unwrap().error();
        assert_eq!(error.kind(), "RuntimeFailure");
        assert_eq!(error.message(), "boom");
    }

    #[tokio::test]
    async fn runner_skips_definition_when_already_aborted() {
        let handle = AbortHandle::new();
        handle.abort();

        let result = runner()
            .run(&event("test.fail", json!(null)), &handle.signal())
            .await;
        assert_eq!(result.status(), TaskResponseStatus::Aborted);
    }

    #[tokio::test]
    async fn runner_discards_outcome_when_aborted_mid_run() {
        let handle = AbortHandle::new();
        let signal = handle.signal();
        let mut registry = DefinitionRegistry::new();
        registry.register(Arc::new(AbortsItself(handle))).unwrap();
        let runner = TaskRunner::new(Arc::new(registry));

        let result = runner
            .run(&event("test.aborts-itself", json!(null)), &signal)
            .await;
        assert_eq!(result.status(), TaskResponseStatus::Aborted);
        assert_eq!(result.task_id().as_str(), "t1");
    }

    #[tokio::test]
    async fn abort_interrupts_a_running_definition() {
        let handle = AbortHandle::new();
        let signal = handle.signal();
        let mut registry = DefinitionRegistry::new();
        registry.register(Arc::new(Sleeper(Duration::from_secs(3)))).unwrap();
        let runner = TaskRunner::new(Arc::new(registry));

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            handle.abort();
        });

        let started = Instant::now();
        let result = runner.run(&event("test.sleeper", json!(null)), &signal).await;

        assert_eq!(result.status(), TaskResponseStatus::Aborted);
        assert!(started.elapsed() < Duration::from_millis(1000));
    }

    #[tokio::test]
    async fn countdown_reaches_done_when_reinvoked() {
        let runner = runner();
        let mut event = event("test.countdown", json!({ "remaining": 3 }));
        let mut steps = 0;

        let last = loop {
            let result = runner.run(&event, &AbortSignal::never()).await;
            steps += 1;
            match result {
                TaskResult::Continue(ref cont) => event = event.with_input(cont.input().clone()),
                other => break other,
            }
        };

        assert_eq!(steps, 4);
        assert_eq!(last.status(), TaskResponseStatus::Done);
    }
}
