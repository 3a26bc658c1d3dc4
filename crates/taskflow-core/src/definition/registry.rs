//! DefinitionRegistry - registration and lookup of task definitions

use std::collections::HashMap;
use std::sync::Arc;

use super::TaskDefinition;
use crate::domain::TaskDefinitionId;
use crate::error::TaskflowError;

/// Registry of task definitions (`taskDefinitionId -> definition`).
///
/// Built during initialization (mutable), shared behind `Arc` at runtime
/// (immutable), so lookups need no locks.
#[derive(Default)]
pub struct DefinitionRegistry {
    definitions: HashMap<TaskDefinitionId, Arc<dyn TaskDefinition>>,
}

impl DefinitionRegistry {
    pub fn new() -> Self {
        Self {
            definitions: HashMap::new(),
        }
    }

    pub fn register(&mut self, definition: Arc<dyn TaskDefinition>) -> Result<(), TaskflowError> {
        let id = definition.id();
        if self.definitions.contains_key(&id) {
            return Err(TaskflowError::DuplicateDefinition(id));
        }
        tracing::debug!(definition_id = %id, "registered task definition");
        self.definitions.insert(id, definition);
        Ok(())
    }

    pub fn get(&self, id: &TaskDefinitionId) -> Option<&Arc<dyn TaskDefinition>> {
        self.definitions.get(id)
    }

    /// Registered ids, sorted.
    pub fn registered_ids(&self) -> Vec<TaskDefinitionId> {
        let mut ids: Vec<_> = self.definitions.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
