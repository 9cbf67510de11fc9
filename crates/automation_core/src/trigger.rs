//! Trigger interface: conditions gating automated execution
//!
//! Trigger evaluation internals are external collaborators; the engine
//! only needs a verdict and an optional value to surface to the recipe
//! as subdata. Checkers are resolved by kind through a registry shaped
//! like the action registry.

use crate::{AutomationError, AutomationResult};
use dashmap::DashMap;
use recipe_core::types::Word;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Outcome of evaluating one trigger spec
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerVerdict {
    /// Whether the condition holds
    pub satisfied: bool,
    /// Value observed during the check, surfaced to the recipe as
    /// subdata when present
    pub sub_value: Option<Word>,
}

/// A condition evaluator bound to a spec kind
pub trait TriggerChecker: Send + Sync {
    /// Spec kind this checker evaluates
    fn kind(&self) -> &'static str;

    /// Evaluate the stored spec against bot-supplied call data
    ///
    /// # Errors
    ///
    /// Returns error if either side is malformed
    fn check(&self, spec_data: &[u8], call_data: &[u8]) -> AutomationResult<TriggerVerdict>;
}

/// Concurrent kind → checker directory
#[derive(Default)]
pub struct TriggerRegistry {
    checkers: DashMap<String, Arc<dyn TriggerChecker>>,
}

impl TriggerRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a checker under its kind, replacing any previous one
    pub fn register(&self, checker: Arc<dyn TriggerChecker>) {
        self.checkers.insert(checker.kind().to_owned(), checker);
    }

    /// Resolve a checker by kind
    ///
    /// # Errors
    ///
    /// Returns error if no checker is registered for the kind
    pub fn get(&self, kind: &str) -> AutomationResult<Arc<dyn TriggerChecker>> {
        self.checkers
            .get(kind)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| AutomationError::UnknownTrigger {
                kind: kind.to_owned(),
            })
    }
}

/// Stored condition of [`PriceFloorTrigger`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceFloorSpec {
    /// Price at or below which the trigger fires
    pub floor: u128,
}

/// Call data the bot supplies to [`PriceFloorTrigger`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceObservation {
    /// Price observed at check time
    pub price: u128,
}

/// Fires when an observed price is at or below a stored floor
///
/// The observed price is surfaced as subdata so recipe steps can bind
/// against the price the check actually saw.
#[derive(Debug, Default)]
pub struct PriceFloorTrigger;

impl PriceFloorTrigger {
    /// Registry kind
    pub const KIND: &'static str = "price-floor";

    fn decode<T: for<'de> Deserialize<'de>>(raw: &[u8]) -> AutomationResult<T> {
        bincode::deserialize(raw).map_err(|err| AutomationError::TriggerData {
            kind: Self::KIND.to_owned(),
            message: err.to_string(),
        })
    }
}

impl TriggerChecker for PriceFloorTrigger {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn check(&self, spec_data: &[u8], call_data: &[u8]) -> AutomationResult<TriggerVerdict> {
        let spec: PriceFloorSpec = Self::decode(spec_data)?;
        let observation: PriceObservation = Self::decode(call_data)?;
        Ok(TriggerVerdict {
            satisfied: observation.price <= spec.floor,
            sub_value: Some(Word::from_u128(observation.price)),
        })
    }
}
