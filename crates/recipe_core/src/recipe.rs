//! Recipe value types: ordered, parameterized action call lists

use crate::params::ParamSource;
use crate::types::ActionId;
use serde::{Deserialize, Serialize};

/// One encoded action invocation inside a recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionCall {
    /// Registry key of the target action
    pub action_id: ActionId,
    /// Opaque serialized parameters, decoded by the action itself
    pub payload: Vec<u8>,
    /// One source per substitutable slot the action declares
    pub param_mapping: Vec<ParamSource>,
}

impl ActionCall {
    /// Build a call with an explicit mapping
    #[must_use]
    pub const fn new(
        action_id: ActionId,
        payload: Vec<u8>,
        param_mapping: Vec<ParamSource>,
    ) -> Self {
        Self {
            action_id,
            payload,
            param_mapping,
        }
    }

    /// Build an all-literal call with `slot_count` slots
    #[must_use]
    pub fn literal(action_id: ActionId, payload: Vec<u8>, slot_count: usize) -> Self {
        Self {
            action_id,
            payload,
            param_mapping: vec![ParamSource::Literal; slot_count],
        }
    }
}

/// An ordered list of action calls executed atomically
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    /// Human-readable recipe name, used in logs and errors
    pub name: String,
    /// Steps in strict execution order
    pub calls: Vec<ActionCall>,
}

impl Recipe {
    /// Build a recipe
    #[must_use]
    pub fn new(name: impl Into<String>, calls: Vec<ActionCall>) -> Self {
        Self {
            name: name.into(),
            calls,
        }
    }
}
