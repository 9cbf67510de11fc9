//! # `RecipeIO` Recipe Core
//!
//! Atomic execution engine for DeFi recipes: ordered lists of
//! parameterized actions run against a proxy-owned asset ledger with
//! all-or-nothing semantics.
//!
//! ## Architecture
//! - **Registry**: injected id → action directory, the single
//!   indirection enabling implementation upgrades without caller changes
//! - **Action**: polymorphic unit of effect with decode/execute split
//! - **Parameter Resolver**: typed late-binding of action inputs from
//!   prior outputs (`$1`-style references) or trigger subdata
//! - **Recipe Executor**: the sequencing state machine; scratch-ledger
//!   commit gives atomicity, flashloans wrap the remaining steps as a
//!   continuation
//!
//! ## Safety
//! - No `unwrap()`, `expect()` or `panic!()` in production code
//! - All balance arithmetic is checked; fee math uses `rust_decimal`
//! - Execution is strictly synchronous and single-threaded per
//!   invocation; shared directories are concurrently readable

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

use thiserror::Error;

pub mod action;
pub mod actions;
pub mod executor;
pub mod params;
pub mod recipe;
pub mod registry;
pub mod state;
pub mod types;

pub use action::{Action, ActionLog, ActionOutcome, ActionType, ExecutionContext, SlotValue};
pub use executor::{OutputBuffer, RecipeExecutor, RecipeReceipt, RecipeStatus};
pub use params::{ParamSource, SUB_DATA_OFFSET};
pub use recipe::{ActionCall, Recipe};
pub use registry::ActionRegistry;
pub use state::Ledger;
pub use types::{ActionId, Address, StrategyIndex, SubId, TokenAmount, Word};

/// Core error type for recipe execution
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RecipeError {
    /// Malformed action payload
    #[error("payload decode error in `{action}`: {message}")]
    Decode {
        /// Action that rejected the payload
        action: String,
        /// Decoder failure detail
        message: String,
    },

    /// Registry lookup or registration failure
    #[error("registry error: {0}")]
    Registry(#[from] registry::RegistryError),

    /// Parameter resolution failure
    #[error("parameter resolution error: {0}")]
    Param(#[from] params::ParamError),

    /// Ledger bookkeeping failure
    #[error("ledger error: {0}")]
    Ledger(#[from] state::LedgerError),

    /// Flashloan lifecycle failure
    #[error("flash loan error: {message}")]
    FlashLoan {
        /// Failure detail
        message: String,
    },

    /// Flashloan action placed after step 0
    #[error("flash loan action `{action}` at step {index}; only step 0 may borrow")]
    FlashLoanPosition {
        /// Offending action name
        action: String,
        /// Step index where it appeared
        index: usize,
    },

    /// Action asked to wrap a recipe it cannot wrap
    #[error("action `{action}` does not support flash loan re-entry")]
    FlashLoanReentryUnsupported {
        /// Offending action name
        action: String,
    },

    /// Recipe with no actions
    #[error("recipe `{name}` contains no actions")]
    EmptyRecipe {
        /// Recipe name
        name: String,
    },

    /// Recipe longer than the configured limit
    #[error("recipe `{name}` has {len} actions, limit is {max}")]
    RecipeTooLong {
        /// Recipe name
        name: String,
        /// Number of actions supplied
        len: usize,
        /// Configured maximum
        max: usize,
    },

    /// More subdata values than the configured limit
    #[error("subdata has {len} entries, limit is {max}")]
    SubDataTooLong {
        /// Number of values supplied
        len: usize,
        /// Configured maximum
        max: usize,
    },

    /// Action effect failure, propagated unchanged
    #[error("action `{action}` failed: {message}")]
    Action {
        /// Failing action name
        action: String,
        /// External failure detail
        message: String,
    },
}

/// Result type for recipe operations
pub type RecipeResult<T> = Result<T, RecipeError>;

/// Engine limits injected at construction
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct EngineConfig {
    /// Maximum actions in one recipe
    pub max_actions_per_recipe: usize,
    /// Maximum trigger-supplied subdata values per execution
    pub max_sub_data_len: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_actions_per_recipe: 32,
            max_sub_data_len: 16,
        }
    }
}
