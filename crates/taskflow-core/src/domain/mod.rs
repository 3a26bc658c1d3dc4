//! Domain model (ids, events, statuses, results, failures).

pub mod event;
pub mod failure;
pub mod ids;
pub mod result;
pub mod status;

pub use event::TaskEvent;
pub use failure::{NormalizedError, TaskFailure};
pub use ids::{TaskDefinitionId, TaskId};
pub use result::{
    AbortedResult, ContinueResult, Correlated, Correlation, DoneResult, ErrorResult, TaskResult,
};
pub use status::TaskResponseStatus;
