//! taskflow-core
//!
//! Task response protocol: turns the outcome of one task invocation into a
//! typed, serializable result (CONTINUE / DONE / ERROR / ABORTED) for an
//! orchestrator to act on.
//!
//! # Modules
//! - **domain**: domain model (ids, event, status, result, failure)
//! - **response**: Response builder (continue / done / error / aborted / from)
//! - **definition**: TaskDefinition trait + DefinitionRegistry
//! - **runtime**: TaskRunner (run a definition -> TaskResult)
//! - **abort**: AbortHandle / AbortSignal
//! - **error**: protocol-level error type

pub mod abort;
pub mod definition;
pub mod domain;
pub mod error;
pub mod response;
pub mod runtime;

pub use abort::{AbortHandle, AbortSignal};
pub use definition::{DefinitionRegistry, TaskContext, TaskDefinition};
pub use domain::{
    Correlated, NormalizedError, TaskDefinitionId, TaskEvent, TaskFailure, TaskId,
    TaskResponseStatus, TaskResult,
};
pub use error::TaskflowError;
pub use response::{ContinueParams, DoneParams, ErrorParams, Overrides, Response, ResponseFromParams};
pub use runtime::TaskRunner;
