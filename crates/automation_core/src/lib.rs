//! # `RecipeIO` Automation Core
//!
//! Bot-automation layer over the recipe engine: durable subscription
//! records, capability-based bot authorization, a trusted forwarder
//! into proxy-owned state, and the strategy dispatch pipeline that
//! ties them together.
//!
//! ## Flow
//! Strategy executor → subscription lookup → bot capability check →
//! trigger evaluation → proxy-auth forwarder → recipe executor.
//! Every gate fails closed; there is no retry at any layer.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::unreachable,
    clippy::indexing_slicing
)]
#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::undocumented_unsafe_blocks
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::must_use_candidate
)]
#![cfg_attr(
    test,
    allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing, clippy::panic)
)]

use recipe_core::types::{ActionId, Address, StrategyIndex, SubId};
use recipe_core::RecipeError;
use thiserror::Error;

pub mod auth;
pub mod strategy;
pub mod subscription;
pub mod trigger;

pub use auth::{BotAuth, ProxyAuth};
pub use strategy::StrategyExecutor;
pub use subscription::{Subscription, SubscriptionStore, TriggerSpec};
pub use trigger::{TriggerChecker, TriggerRegistry, TriggerVerdict};

/// Automation-layer error type
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AutomationError {
    /// Subscription id was never issued
    #[error("subscription {sub_id} not found")]
    SubNotFound {
        /// The unknown id
        sub_id: SubId,
    },

    /// Subscription exists but is deactivated
    #[error("subscription {sub_id} is not active")]
    SubNotActive {
        /// The inactive subscription
        sub_id: SubId,
    },

    /// Caller is missing from the subscription's capability list
    #[error("bot {caller} is not approved for subscription {sub_id}")]
    BotNotApproved {
        /// The gated subscription
        sub_id: SubId,
        /// The rejected caller
        caller: Address,
    },

    /// Proxy has not granted the forwarder execution authority
    #[error("forwarder {forwarder} is not authorized on proxy {proxy}")]
    ProxyNotAuthorized {
        /// The proxy whose state was targeted
        proxy: Address,
        /// The rejected forwarder
        forwarder: Address,
    },

    /// Supplied strategy index differs from the registered one
    #[error("subscription {sub_id} registered strategy {expected}, got {got}")]
    StrategyIndexMismatch {
        /// The subscription
        sub_id: SubId,
        /// Registered index
        expected: StrategyIndex,
        /// Supplied index
        got: StrategyIndex,
    },

    /// Trigger call data arity differs from the stored specs
    #[error("subscription has {expected} trigger specs, {got} call data entries supplied")]
    TriggerCountMismatch {
        /// Stored spec count
        expected: usize,
        /// Supplied call data count
        got: usize,
    },

    /// A trigger condition does not hold
    #[error("trigger {index} is not satisfied")]
    TriggerNotSatisfied {
        /// Position of the failing spec
        index: usize,
    },

    /// No checker registered for a spec kind
    #[error("no trigger checker registered for kind `{kind}`")]
    UnknownTrigger {
        /// The unresolved kind
        kind: String,
    },

    /// Malformed trigger spec or call data
    #[error("trigger data error for kind `{kind}`: {message}")]
    TriggerData {
        /// Checker kind
        kind: String,
        /// Decoder failure detail
        message: String,
    },

    /// Supplied call count differs from the registered template
    #[error("subscription registered {expected} actions, {got} calls supplied")]
    ActionCountMismatch {
        /// Registered action count
        expected: usize,
        /// Supplied call count
        got: usize,
    },

    /// Supplied call targets a different action than registered
    #[error("call {index} targets action {got}, subscription registered {expected}")]
    ActionMismatch {
        /// Position of the mismatch
        index: usize,
        /// Registered action id
        expected: ActionId,
        /// Supplied action id
        got: ActionId,
    },

    /// Too many trigger specs at registration
    #[error("subscription declares {len} triggers, limit is {max}")]
    TriggerLimitExceeded {
        /// Declared trigger count
        len: usize,
        /// Configured maximum
        max: usize,
    },

    /// Too many action specs at registration
    #[error("subscription declares {len} actions, limit is {max}")]
    ActionLimitExceeded {
        /// Declared action count
        len: usize,
        /// Configured maximum
        max: usize,
    },

    /// Recipe engine failure, propagated unchanged
    #[error("recipe error: {0}")]
    Recipe(#[from] RecipeError),
}

/// Result type for automation operations
pub type AutomationResult<T> = Result<T, AutomationError>;

/// Automation-layer limits injected at construction
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct AutomationConfig {
    /// Maximum trigger specs per subscription
    pub max_triggers_per_sub: usize,
    /// Maximum action specs per subscription
    pub max_actions_per_sub: usize,
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            max_triggers_per_sub: 8,
            max_actions_per_sub: 32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn automation_config_default() {
        let config = AutomationConfig::default();
        assert_eq!(config.max_triggers_per_sub, 8);
        assert_eq!(config.max_actions_per_sub, 32);
    }

    #[test]
    fn recipe_errors_convert() {
        let err = AutomationError::from(RecipeError::EmptyRecipe {
            name: "noop".to_owned(),
        });
        assert!(matches!(err, AutomationError::Recipe(_)));
        assert!(format!("{err}").contains("noop"));
    }
}
