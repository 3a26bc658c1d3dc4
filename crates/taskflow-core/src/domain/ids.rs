//! Domain identifiers (strongly-typed IDs).
//!
//! The orchestrator hands us opaque string ids. We keep them opaque, but wrap
//! them in a phantom-typed `Id<T>` so a task id can never be passed where a
//! definition id is expected.
//!
//! ## Phantom type pattern
//! `Id<T>` carries the shared implementation; `T` is a marker type that never
//! exists at runtime and only adds compile-time safety.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use ulid::Ulid;

/// Marker trait for each id kind.
pub trait IdMarker: Send + Sync + 'static {
    /// Human-readable name of the id kind, used in debug output.
    fn kind() -> &'static str;
}

/// Generic opaque id.
///
/// Serializes as a bare JSON string; the marker never reaches the wire.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id<T: IdMarker> {
    value: String,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            _marker: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn into_inner(self) -> String {
        self.value
    }
}

impl<T: IdMarker> From<&str> for Id<T> {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl<T: IdMarker> From<String> for Id<T> {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl<T: IdMarker> AsRef<str> for Id<T> {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl<T: IdMarker> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})", T::kind(), self.value)
    }
}

// ========================================
// Marker types
// ========================================

/// Task instance marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Task {}

impl IdMarker for Task {
    fn kind() -> &'static str {
        "TaskId"
    }
}

/// Task definition marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskDefinition {}

impl IdMarker for TaskDefinition {
    fn kind() -> &'static str {
        "TaskDefinitionId"
    }
}

/// Identifier of one running task instance.
pub type TaskId = Id<Task>;

/// Identifier of a task definition (the "type" of a task).
pub type TaskDefinitionId = Id<TaskDefinition>;

impl TaskId {
    /// Mint a fresh, time-sortable task id.
    ///
    /// Orchestrators normally assign ids themselves; this is for local
    /// harnesses that need to build an event from scratch.
    pub fn generate() -> Self {
        Self::new(Ulid::new().to_string())
    }
}
