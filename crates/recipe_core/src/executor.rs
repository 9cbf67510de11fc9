//! Recipe executor: the sequencing state machine
//!
//! Runs each action call in strict array order, resolving parameters
//! against the output buffer built so far and appending each action's
//! single result. The whole recipe executes against a scratch copy of
//! the ledger; the copy is committed only when every step succeeded, so
//! a failure at any step leaves no observable effect.
//!
//! A flashloan action at step 0 drives the remaining steps itself: the
//! executor hands it a continuation that runs steps `1..n` with the
//! loan value as output `$1`, and the provider collects principal plus
//! fee before the outer call returns.

use crate::action::{ActionLog, ActionType, ExecutionContext};
use crate::params::resolve_params;
use crate::recipe::{ActionCall, Recipe};
use crate::registry::ActionRegistry;
use crate::state::Ledger;
use crate::types::{Address, Word};
use crate::{EngineConfig, RecipeError, RecipeResult};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

/// Lifecycle of one recipe execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum RecipeStatus {
    /// Accepted, not yet running
    Pending,
    /// Steps are executing
    Running,
    /// Every step succeeded and the ledger was committed
    Completed,
    /// A step failed; no effect was committed
    Reverted,
}

/// Ordered sequence of per-step result values
///
/// One slot is appended per executed action; reads are 1-based (`$1` is
/// the first action's output). Values never change once written and the
/// buffer never shrinks; it lives only for one recipe execution.
#[derive(Debug, Default)]
pub struct OutputBuffer {
    values: Vec<Word>,
}

impl OutputBuffer {
    /// Create an empty buffer
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the next action's result
    pub fn push(&mut self, value: Word) {
        self.values.push(value);
    }

    /// Read a prior output, 1-based; `None` when out of range
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Word> {
        index
            .checked_sub(1)
            .and_then(|i| self.values.get(i).copied())
    }

    /// Number of values written so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check whether nothing has been written yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Consume the buffer into its backing vector
    #[must_use]
    pub fn into_inner(self) -> Vec<Word> {
        self.values
    }
}

/// What a completed recipe execution produced
#[derive(Debug)]
#[non_exhaustive]
pub struct RecipeReceipt {
    /// Terminal status; `Completed` for every returned receipt
    pub status: RecipeStatus,
    /// Per-step result values in execution order
    pub outputs: Vec<Word>,
    /// Per-step log records in emission order
    pub logs: Vec<ActionLog>,
}

/// The recipe sequencer
pub struct RecipeExecutor {
    registry: Arc<ActionRegistry>,
    config: EngineConfig,
    recipes_executed: AtomicU64,
}

impl RecipeExecutor {
    /// Create an executor over an injected action registry
    #[must_use]
    pub fn new(registry: Arc<ActionRegistry>, config: EngineConfig) -> Self {
        tracing::info!(
            actions = registry.len(),
            max_actions = config.max_actions_per_recipe,
            "recipe executor ready"
        );
        Self {
            registry,
            config,
            recipes_executed: AtomicU64::new(0),
        }
    }

    /// Recipes completed since construction
    #[must_use]
    pub fn recipes_executed(&self) -> u64 {
        self.recipes_executed.load(Ordering::Relaxed)
    }

    /// Execute a recipe atomically against `ledger`
    ///
    /// On success the ledger reflects every step's effect and the
    /// receipt carries one output and one log per step. On any failure
    /// the ledger is untouched and no partial buffer is observable.
    ///
    /// # Errors
    ///
    /// Returns the first step failure: decode, registry miss,
    /// out-of-range reference, or effect failure
    pub fn execute_recipe(
        &self,
        recipe: &Recipe,
        sub_data: &[Word],
        proxy: Address,
        caller: Address,
        ledger: &mut Ledger,
    ) -> RecipeResult<RecipeReceipt> {
        let status = RecipeStatus::Pending;
        trace!(recipe = %recipe.name, ?status, "recipe accepted");
        self.validate_shape(recipe, sub_data)?;

        let status = RecipeStatus::Running;
        debug!(
            recipe = %recipe.name,
            steps = recipe.calls.len(),
            %proxy,
            ?status,
            "executing recipe"
        );

        let mut scratch = ledger.clone();
        let mut outputs = OutputBuffer::new();
        let mut logs = Vec::with_capacity(recipe.calls.len());
        {
            let mut ctx = ExecutionContext {
                proxy,
                caller,
                ledger: &mut scratch,
            };
            self.run(recipe, sub_data, &mut ctx, &mut outputs, &mut logs)
                .inspect_err(|err| {
                    debug!(
                        recipe = %recipe.name,
                        status = ?RecipeStatus::Reverted,
                        error = %err,
                        "recipe reverted"
                    );
                })?;
        }

        *ledger = scratch;
        self.recipes_executed.fetch_add(1, Ordering::Relaxed);
        debug!(recipe = %recipe.name, outputs = outputs.len(), "recipe completed");
        Ok(RecipeReceipt {
            status: RecipeStatus::Completed,
            outputs: outputs.into_inner(),
            logs,
        })
    }

    /// Execute a single action outside a recipe, no substitution
    ///
    /// Same atomicity contract as a one-step recipe.
    ///
    /// # Errors
    ///
    /// Returns error if decoding or the effect fails
    pub fn execute_action_direct(
        &self,
        call: &ActionCall,
        proxy: Address,
        caller: Address,
        ledger: &mut Ledger,
    ) -> RecipeResult<crate::action::ActionOutcome> {
        let action = self.registry.get(call.action_id)?;
        let mut scratch = ledger.clone();
        let outcome = {
            let mut ctx = ExecutionContext {
                proxy,
                caller,
                ledger: &mut scratch,
            };
            action.execute_direct(&call.payload, &mut ctx)?
        };
        *ledger = scratch;
        Ok(outcome)
    }

    fn validate_shape(&self, recipe: &Recipe, sub_data: &[Word]) -> RecipeResult<()> {
        if recipe.calls.is_empty() {
            return Err(RecipeError::EmptyRecipe {
                name: recipe.name.clone(),
            });
        }
        if recipe.calls.len() > self.config.max_actions_per_recipe {
            return Err(RecipeError::RecipeTooLong {
                name: recipe.name.clone(),
                len: recipe.calls.len(),
                max: self.config.max_actions_per_recipe,
            });
        }
        if sub_data.len() > self.config.max_sub_data_len {
            return Err(RecipeError::SubDataTooLong {
                len: sub_data.len(),
                max: self.config.max_sub_data_len,
            });
        }
        Ok(())
    }

    fn run(
        &self,
        recipe: &Recipe,
        sub_data: &[Word],
        ctx: &mut ExecutionContext<'_>,
        outputs: &mut OutputBuffer,
        logs: &mut Vec<ActionLog>,
    ) -> RecipeResult<()> {
        let Some(head) = recipe.calls.first() else {
            return Err(RecipeError::EmptyRecipe {
                name: recipe.name.clone(),
            });
        };
        let head_action = self.registry.get(head.action_id)?;

        if head_action.action_type() == ActionType::FlashLoan {
            let slots = head_action.parse_inputs(&head.payload)?;
            let resolved = resolve_params(&slots, &head.param_mapping, outputs, sub_data)?;
            let tail = recipe.calls.get(1..).unwrap_or_default();
            let outcome = head_action.execute_flash(
                &head.payload,
                &resolved,
                ctx,
                &mut |ctx: &mut ExecutionContext<'_>, loaned: Word| {
                    outputs.push(loaned);
                    self.run_steps(tail, 1, sub_data, ctx, outputs, logs)
                },
            )?;
            // The loan value was appended as $1 before the remaining
            // steps ran; only the log record is left to place.
            logs.insert(0, outcome.log);
            return Ok(());
        }

        self.run_steps(&recipe.calls, 0, sub_data, ctx, outputs, logs)
    }

    fn run_steps(
        &self,
        calls: &[ActionCall],
        first_index: usize,
        sub_data: &[Word],
        ctx: &mut ExecutionContext<'_>,
        outputs: &mut OutputBuffer,
        logs: &mut Vec<ActionLog>,
    ) -> RecipeResult<()> {
        for (offset, call) in calls.iter().enumerate() {
            let index = first_index + offset;
            let action = self.registry.get(call.action_id)?;
            if action.action_type() == ActionType::FlashLoan {
                return Err(RecipeError::FlashLoanPosition {
                    action: action.name().to_owned(),
                    index,
                });
            }

            trace!(step = index, action = action.name(), "executing recipe step");
            let slots = action.parse_inputs(&call.payload)?;
            let resolved = resolve_params(&slots, &call.param_mapping, outputs, sub_data)?;
            let outcome = action.execute(&call.payload, &resolved, ctx)?;
            outputs.push(outcome.value);
            logs.push(outcome.log);
        }
        Ok(())
    }
}
