//! Action registry: id → implementation directory
//!
//! A single injected indirection between callers and action
//! implementations. Replacing an entry upgrades the implementation
//! without changing any caller; the executor only ever reads.

use crate::action::Action;
use crate::types::ActionId;
use dashmap::DashMap;
use std::sync::Arc;
use thiserror::Error;

/// Registry lookup/registration errors
#[derive(Error, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum RegistryError {
    /// No action registered under the id
    #[error("no action registered under id {id}")]
    NotFound {
        /// The missing id
        id: ActionId,
    },

    /// Id already taken; use `replace` to upgrade
    #[error("action id {id} is already registered")]
    AlreadyRegistered {
        /// The conflicting id
        id: ActionId,
    },
}

/// Concurrent id → action directory
#[derive(Default)]
pub struct ActionRegistry {
    actions: DashMap<ActionId, Arc<dyn Action>>,
}

impl ActionRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new action implementation
    ///
    /// # Errors
    ///
    /// Returns error if the id is already registered
    pub fn register(&self, action: Arc<dyn Action>) -> Result<(), RegistryError> {
        let id = action.id();
        if self.actions.contains_key(&id) {
            return Err(RegistryError::AlreadyRegistered { id });
        }
        tracing::debug!(%id, name = action.name(), "registering action");
        self.actions.insert(id, action);
        Ok(())
    }

    /// Replace an implementation, registering it if absent
    ///
    /// Upgrade path: callers resolving through the registry pick up the
    /// new implementation on their next lookup.
    pub fn replace(&self, action: Arc<dyn Action>) {
        let id = action.id();
        tracing::debug!(%id, name = action.name(), "replacing action");
        self.actions.insert(id, action);
    }

    /// Resolve an action by id
    ///
    /// # Errors
    ///
    /// Returns error if nothing is registered under the id
    pub fn get(&self, id: ActionId) -> Result<Arc<dyn Action>, RegistryError> {
        self.actions
            .get(&id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(RegistryError::NotFound { id })
    }

    /// Number of registered actions
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Check whether the registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
