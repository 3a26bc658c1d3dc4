use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tokio::time::sleep;
use tracing_subscriber::EnvFilter;

use taskflow_core::response::ContinueParams;
use taskflow_core::{
    AbortHandle, Correlated, DefinitionRegistry, DoneParams, Response, ResponseFromParams,
    TaskContext, TaskDefinition, TaskDefinitionId, TaskEvent, TaskFailure, TaskId, TaskResult,
    TaskRunner,
};

/// taskflow - shape and drive task responses locally
#[derive(Parser)]
#[command(name = "taskflow")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, env = "TASKFLOW_LOG", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a result from a task event and response params
    Respond {
        /// Path to the task event (JSON)
        #[arg(long)]
        event: PathBuf,

        /// Path to the response params (JSON, tagged by `status`)
        #[arg(long)]
        params: PathBuf,
    },

    /// Print the ABORTED result for a task event
    Abort {
        /// Path to the task event (JSON)
        #[arg(long)]
        event: PathBuf,
    },

    /// Run a built-in task definition until it stops continuing
    Run {
        /// Task definition id (see `definitions`)
        #[arg(long)]
        definition: String,

        /// Task input (JSON)
        #[arg(long, default_value = "null")]
        input: String,

        #[arg(long, default_value = "root")]
        tenant: String,

        #[arg(long, default_value = "en-US")]
        locale: String,

        /// Give up after this many invocations
        #[arg(long, default_value_t = 100)]
        max_steps: u32,

        /// Sleep for the `wait` hint between invocations
        #[arg(long)]
        honor_wait: bool,
    },

    /// List the built-in task definitions
    Definitions,
}

#[derive(Debug, Deserialize)]
struct HelloInput {
    name: String,
}

/// Greets `input.name`; fails when the input does not decode.
struct HelloDefinition;

#[async_trait]
impl TaskDefinition for HelloDefinition {
    fn id(&self) -> TaskDefinitionId {
        TaskDefinitionId::new("hello")
    }

    fn title(&self) -> Option<&str> {
        Some("Say hello")
    }

    async fn run(&self, ctx: &TaskContext<'_>) -> Result<TaskResult, TaskFailure> {
        let input: HelloInput = serde_json::from_value(ctx.input().clone())?;
        let message = format!("Hello, {}!", input.name);
        Ok(ctx.response().done(DoneParams::message(message)).into())
    }
}

/// Counts `input.remaining` down, continuing once per step.
struct CountdownDefinition;

#[async_trait]
impl TaskDefinition for CountdownDefinition {
    fn id(&self) -> TaskDefinitionId {
        TaskDefinitionId::new("countdown")
    }

    fn title(&self) -> Option<&str> {
        Some("Count down to zero")
    }

    async fn run(&self, ctx: &TaskContext<'_>) -> Result<TaskResult, TaskFailure> {
        let remaining = ctx.input()["remaining"].as_u64().unwrap_or(0);
        if remaining == 0 {
            return Ok(ctx.response().done(DoneParams::message("liftoff")).into());
        }
        let next = serde_json::json!({ "remaining": remaining - 1 });
        Ok(ctx
            .response()
            .continue_with(ContinueParams::new(next).with_wait(1))
            .into())
    }
}

fn builtin_registry() -> Result<DefinitionRegistry> {
    let mut registry = DefinitionRegistry::new();
    registry.register(Arc::new(HelloDefinition))?;
    registry.register(Arc::new(CountdownDefinition))?;
    Ok(registry)
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_json(path: &Path) -> Result<serde_json::Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid JSON in {}", path.display()))
}

fn read_event(path: &Path) -> Result<TaskEvent> {
    serde_json::from_value(read_json(path)?)
        .with_context(|| format!("invalid task event in {}", path.display()))
}

/// `respond`: shape the result described by a params file.
fn respond(event_path: &Path, params_path: &Path) -> Result<TaskResult> {
    let event = read_event(event_path)?;
    let params = ResponseFromParams::from_value(read_json(params_path)?)
        .with_context(|| format!("invalid response params in {}", params_path.display()))?;
    Ok(Response::new(&event).from(params))
}

fn abort_result(event_path: &Path) -> Result<TaskResult> {
    let event = read_event(event_path)?;
    Ok(Response::new(&event).aborted().into())
}

fn print_result(result: &TaskResult) -> Result<()> {
    println!("{}", serde_json::to_string(result)?);
    Ok(())
}

/// Orchestrator stand-in: re-invoke on CONTINUE, stop on anything else.
async fn drive(
    runner: &TaskRunner,
    mut event: TaskEvent,
    max_steps: u32,
    honor_wait: bool,
) -> Result<()> {
    let handle = AbortHandle::new();
    let signal = handle.signal();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, aborting task");
            handle.abort();
        }
    });

    for step in 1..=max_steps {
        let result = runner.run(&event, &signal).await;
        print_result(&result)?;

        let cont = match result {
            TaskResult::Continue(cont) => cont,
            other => {
                tracing::info!(step, status = %other.status(), "task stopped");
                return Ok(());
            }
        };

        if honor_wait && let Some(wait) = cont.wait() {
            tracing::debug!(?wait, "waiting before next invocation");
            sleep(wait).await;
        }

        event = TaskEvent {
            task_id: cont.task_id().clone(),
            task_definition_id: event.task_definition_id,
            tenant: cont.tenant().to_string(),
            locale: cont.locale().to_string(),
            input: cont.input().clone(),
        };
    }

    anyhow::bail!("task {} still continuing after {max_steps} steps", event.task_id)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match cli.command {
        Commands::Respond {
            event: event_path,
            params: params_path,
        } => {
            print_result(&respond(&event_path, &params_path)?)?;
        }
        Commands::Abort { event: event_path } => {
            print_result(&abort_result(&event_path)?)?;
        }
        Commands::Run {
            definition,
            input,
            tenant,
            locale,
            max_steps,
            honor_wait,
        } => {
            let input: serde_json::Value =
                serde_json::from_str(&input).context("--input is not valid JSON")?;
            let event = TaskEvent::new(TaskId::generate(), definition, tenant, locale)
                .with_input(input);
            tracing::info!(task_id = %event.task_id, "starting task");

            let runner = TaskRunner::new(Arc::new(builtin_registry()?));
            drive(&runner, event, max_steps, honor_wait).await?;
        }
        Commands::Definitions => {
            let registry = builtin_registry()?;
            for id in registry.registered_ids() {
                let title = registry
                    .get(&id)
                    .and_then(|definition| definition.title().map(str::to_string))
                    .unwrap_or_default();
                println!("{id}\t{title}");
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use taskflow_core::{AbortSignal, TaskResponseStatus};

    fn runner() -> TaskRunner {
        TaskRunner::new(Arc::new(builtin_registry().unwrap()))
    }

    fn event(definition: &str, input: serde_json::Value) -> TaskEvent {
        TaskEvent::new("t1", definition, "root", "en-US").with_input(input)
    }

    #[tokio::test]
    async fn hello_greets_by_name() {
        let event = event("hello", json!({ "name": "taskflow" }));
        let result = runner().run(&event, &AbortSignal::never()).await;
        assert_eq!(result.as_done().unwrap().message(), Some("Hello, taskflow!"));
    }

    #[tokio::test]
    async fn hello_with_bad_input_is_an_error_result() {
        let event = event("hello", json!({ "nom": 1 }));
        let result = runner().run(&event, &AbortSignal::never()).await;

        assert_eq!(result.status(), TaskResponseStatus::Error);
        let error = result.as_error().unwrap().error();
        assert_eq!(error.kind(), "Error");
        assert!(error.message().contains("name"));
    }

    #[tokio::test]
    async fn drive_stops_at_done() {
        let event = event("countdown", json!({ "remaining": 2 }));
        drive(&runner(), event, 10, false).await.unwrap();
    }

    #[tokio::test]
    async fn drive_gives_up_after_max_steps() {
        let event = event("countdown", json!({ "remaining": 5 }));
        let err = drive(&runner(), event, 2, false).await.unwrap_err();
        assert!(err.to_string().contains("after 2 steps"));
    }

    fn write_json(dir: &tempfile::TempDir, name: &str, value: serde_json::Value) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, value.to_string()).unwrap();
        path
    }

    fn event_file(dir: &tempfile::TempDir) -> PathBuf {
        write_json(
            dir,
            "event.json",
            json!({
                "taskId": "t1",
                "taskDefinitionId": "pages.reindex",
                "tenant": "root",
                "locale": "en-US",
                "input": { "page": 1 },
            }),
        )
    }

    #[test]
    fn respond_builds_result_from_files() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let event = event_file(&dir);
        let params = write_json(
            &dir,
            "params.json",
            json!({ "status": "CONTINUE", "input": { "page": 2 }, "wait": 5 }),
        );

        let result = respond(&event, &params).unwrap();
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "status": "CONTINUE",
                "taskId": "t1",
                "taskDefinitionId": "pages.reindex",
                "tenant": "root",
                "locale": "en-US",
                "input": { "page": 2 },
                "wait": 5,
            })
        );
    }

    #[test]
    fn respond_rejects_unknown_status() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let event = event_file(&dir);
        let params = write_json(&dir, "params.json", json!({ "status": "PAUSED" }));

        let err = respond(&event, &params).unwrap_err();
        assert!(err.to_string().contains("invalid response params"));
        assert!(
            err.chain()
                .any(|cause| cause.to_string().contains("unhandled response status"))
        );
    }

    #[test]
    fn respond_reports_missing_event_file() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let params = write_json(&dir, "params.json", json!({ "status": "DONE" }));

        let err = respond(&dir.path().join("missing.json"), &params).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }

    #[test]
    fn abort_uses_event_correlation() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let result = abort_result(&event_file(&dir)).unwrap();

        assert_eq!(result.status(), TaskResponseStatus::Aborted);
        assert_eq!(result.task_id().as_str(), "t1");
        assert_eq!(result.task_definition_id().as_str(), "pages.reindex");
    }

    #[test]
    fn builtin_definitions_are_listed_in_order() {
        let ids = builtin_registry().unwrap().registered_ids();
        assert_eq!(
            ids,
            vec![
                TaskDefinitionId::new("countdown"),
                TaskDefinitionId::new("hello"),
            ]
        );
    }
}
