//! Subscription store: durable records of registered recipes
//!
//! A subscription is created once and referenced by id everywhere
//! else; after creation only the `active` flag ever changes. Records
//! survive unsubscribe (deactivated, not deleted) so bot accounting
//! can still resolve historical ids.

use crate::{AutomationConfig, AutomationError, AutomationResult};
use dashmap::DashMap;
use recipe_core::types::{ActionId, Address, StrategyIndex, SubId};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Stored trigger condition, evaluated by a matching checker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerSpec {
    /// Checker kind this spec binds to
    pub kind: String,
    /// Opaque serialized condition parameters
    pub data: Vec<u8>,
}

impl TriggerSpec {
    /// Build a spec
    #[must_use]
    pub fn new(kind: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            kind: kind.into(),
            data,
        }
    }
}

/// A user's registered recipe and its trigger conditions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Subscription {
    /// Store-assigned identifier
    pub id: SubId,
    /// Proxy whose assets the recipe operates on
    pub owner_proxy: Address,
    /// Conditions that must all hold for a bot to execute
    pub trigger_specs: Vec<TriggerSpec>,
    /// Registered action sequence, by id
    pub action_specs: Vec<ActionId>,
    /// Whether the subscription may execute
    pub active: bool,
    /// `false` deactivates after one successful execution
    pub continuous: bool,
    /// Strategy variant this subscription was registered under
    pub strategy_index: StrategyIndex,
}

/// Concurrent id → subscription store with monotonic ids
pub struct SubscriptionStore {
    subs: DashMap<SubId, Subscription>,
    next_id: AtomicU64,
    config: AutomationConfig,
}

impl SubscriptionStore {
    /// Create an empty store
    #[must_use]
    pub fn new(config: AutomationConfig) -> Self {
        Self {
            subs: DashMap::new(),
            next_id: AtomicU64::new(1),
            config,
        }
    }

    /// Register a recipe for automated execution
    ///
    /// # Errors
    ///
    /// Returns error if the trigger or action list exceeds configured
    /// limits
    pub fn subscribe(
        &self,
        owner_proxy: Address,
        trigger_specs: Vec<TriggerSpec>,
        action_specs: Vec<ActionId>,
        continuous: bool,
        strategy_index: StrategyIndex,
    ) -> AutomationResult<SubId> {
        if trigger_specs.len() > self.config.max_triggers_per_sub {
            return Err(AutomationError::TriggerLimitExceeded {
                len: trigger_specs.len(),
                max: self.config.max_triggers_per_sub,
            });
        }
        if action_specs.len() > self.config.max_actions_per_sub {
            return Err(AutomationError::ActionLimitExceeded {
                len: action_specs.len(),
                max: self.config.max_actions_per_sub,
            });
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subs.insert(
            id,
            Subscription {
                id,
                owner_proxy,
                trigger_specs,
                action_specs,
                active: true,
                continuous,
                strategy_index,
            },
        );
        info!(sub_id = id, %owner_proxy, "subscription registered");
        Ok(id)
    }

    /// Load a subscription by id
    ///
    /// # Errors
    ///
    /// Returns error if the id was never issued
    pub fn get_sub(&self, id: SubId) -> AutomationResult<Subscription> {
        self.subs
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or(AutomationError::SubNotFound { sub_id: id })
    }

    /// Flip a subscription inactive
    ///
    /// # Errors
    ///
    /// Returns error if the id was never issued
    pub fn deactivate(&self, id: SubId) -> AutomationResult<()> {
        self.set_active(id, false)
    }

    /// Flip a subscription back active
    ///
    /// # Errors
    ///
    /// Returns error if the id was never issued
    pub fn reactivate(&self, id: SubId) -> AutomationResult<()> {
        self.set_active(id, true)
    }

    /// Unsubscribe: deactivates, the record stays for audit
    ///
    /// # Errors
    ///
    /// Returns error if the id was never issued
    pub fn unsubscribe(&self, id: SubId) -> AutomationResult<()> {
        info!(sub_id = id, "unsubscribing");
        self.set_active(id, false)
    }

    /// Number of stored subscriptions, active or not
    #[must_use]
    pub fn len(&self) -> usize {
        self.subs.len()
    }

    /// Check whether the store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subs.is_empty()
    }

    fn set_active(&self, id: SubId, active: bool) -> AutomationResult<()> {
        let mut entry = self
            .subs
            .get_mut(&id)
            .ok_or(AutomationError::SubNotFound { sub_id: id })?;
        entry.value_mut().active = active;
        Ok(())
    }
}
