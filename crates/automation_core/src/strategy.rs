//! Strategy executor: the automated dispatch pipeline
//!
//! Load subscription → check bot capability → evaluate triggers →
//! verify the supplied calls against the registered template → execute
//! the recipe through the trusted forwarder under the proxy's
//! identity. Every gate fails closed and nothing retries; a failed
//! dispatch is a failed call the bot re-submits.

use crate::auth::{BotAuth, ProxyAuth};
use crate::subscription::SubscriptionStore;
use crate::trigger::TriggerRegistry;
use crate::{AutomationError, AutomationResult};
use recipe_core::executor::{RecipeExecutor, RecipeReceipt};
use recipe_core::recipe::{ActionCall, Recipe};
use recipe_core::state::Ledger;
use recipe_core::types::{Address, StrategyIndex, SubId, Word};
use std::sync::Arc;
use tracing::{info, warn};

/// Orchestrates automated recipe execution for registered subscriptions
pub struct StrategyExecutor {
    store: Arc<SubscriptionStore>,
    bot_auth: Arc<BotAuth>,
    proxy_auth: Arc<ProxyAuth>,
    triggers: Arc<TriggerRegistry>,
    engine: Arc<RecipeExecutor>,
    /// Identity proxies must have authorized as their forwarder
    executor_address: Address,
}

impl StrategyExecutor {
    /// Wire the executor over its injected collaborators
    #[must_use]
    pub fn new(
        store: Arc<SubscriptionStore>,
        bot_auth: Arc<BotAuth>,
        proxy_auth: Arc<ProxyAuth>,
        triggers: Arc<TriggerRegistry>,
        engine: Arc<RecipeExecutor>,
        executor_address: Address,
    ) -> Self {
        info!(%executor_address, "strategy executor ready");
        Self {
            store,
            bot_auth,
            proxy_auth,
            triggers,
            engine,
            executor_address,
        }
    }

    /// Check whether `caller` may trigger `sub_id`
    ///
    /// Pure read over the capability list; unchanged state gives an
    /// unchanged answer.
    #[must_use]
    pub fn check_caller_auth(&self, sub_id: SubId, caller: Address) -> bool {
        self.bot_auth.is_approved(sub_id, caller)
    }

    /// Execute a registered strategy on behalf of its owner
    ///
    /// # Errors
    ///
    /// Returns error on any failed gate (inactive subscription,
    /// unapproved bot, index or template mismatch, unsatisfied
    /// trigger, missing proxy grant) or on recipe failure; no effect
    /// is committed in any error case
    pub fn execute_strategy(
        &self,
        caller: Address,
        sub_id: SubId,
        strategy_index: StrategyIndex,
        trigger_call_data: &[Vec<u8>],
        calls: &[ActionCall],
        ledger: &mut Ledger,
    ) -> AutomationResult<RecipeReceipt> {
        let sub = self.store.get_sub(sub_id)?;
        if !sub.active {
            return Err(AutomationError::SubNotActive { sub_id });
        }
        if !self.check_caller_auth(sub_id, caller) {
            warn!(sub_id, %caller, "unapproved bot attempted execution");
            return Err(AutomationError::BotNotApproved { sub_id, caller });
        }
        if strategy_index != sub.strategy_index {
            return Err(AutomationError::StrategyIndexMismatch {
                sub_id,
                expected: sub.strategy_index,
                got: strategy_index,
            });
        }

        let sub_data = self.evaluate_triggers(&sub.trigger_specs, trigger_call_data)?;
        Self::verify_calls(&sub.action_specs, calls)?;

        let recipe = Recipe::new(format!("sub-{sub_id}"), calls.to_vec());
        info!(sub_id, %caller, steps = calls.len(), "dispatching strategy");
        let receipt = self
            .proxy_auth
            .execute_as(self.executor_address, sub.owner_proxy, || {
                self.engine
                    .execute_recipe(&recipe, &sub_data, sub.owner_proxy, caller, ledger)
                    .map_err(AutomationError::from)
            })?;

        if !sub.continuous {
            self.store.deactivate(sub_id)?;
            info!(sub_id, "one-shot subscription deactivated");
        }
        Ok(receipt)
    }

    fn evaluate_triggers(
        &self,
        specs: &[crate::subscription::TriggerSpec],
        call_data: &[Vec<u8>],
    ) -> AutomationResult<Vec<Word>> {
        if specs.len() != call_data.len() {
            return Err(AutomationError::TriggerCountMismatch {
                expected: specs.len(),
                got: call_data.len(),
            });
        }

        let mut sub_data = Vec::with_capacity(specs.len());
        for (index, (spec, data)) in specs.iter().zip(call_data).enumerate() {
            let checker = self.triggers.get(&spec.kind)?;
            let verdict = checker.check(&spec.data, data)?;
            if !verdict.satisfied {
                return Err(AutomationError::TriggerNotSatisfied { index });
            }
            if let Some(value) = verdict.sub_value {
                sub_data.push(value);
            }
        }
        Ok(sub_data)
    }

    fn verify_calls(
        expected: &[recipe_core::types::ActionId],
        calls: &[ActionCall],
    ) -> AutomationResult<()> {
        if expected.len() != calls.len() {
            return Err(AutomationError::ActionCountMismatch {
                expected: expected.len(),
                got: calls.len(),
            });
        }
        for (index, (want, call)) in expected.iter().zip(calls).enumerate() {
            if *want != call.action_id {
                return Err(AutomationError::ActionMismatch {
                    index,
                    expected: *want,
                    got: call.action_id,
                });
            }
        }
        Ok(())
    }
}
