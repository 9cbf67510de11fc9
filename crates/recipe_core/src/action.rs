//! Action contract: the polymorphic unit of effect
//!
//! Every action variant decodes its own payload, declares which of its
//! parameters are substitutable, and performs its effect against an
//! explicit acting-as context. Parsing is split from execution so the
//! resolver substitutes against typed slots instead of raw bytes.

use crate::state::Ledger;
use crate::types::{ActionId, Address, TokenAmount, Word};
use crate::{RecipeError, RecipeResult};
use serde::{Deserialize, Serialize};

/// Scheduling classification of an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ActionType {
    /// Plain effect, executes in list order
    Standard,
    /// Borrows up front and wraps the remaining recipe as a callback
    FlashLoan,
    /// Engine-specific behavior outside the other classes
    Custom,
    /// Service-fee skim
    Fee,
}

/// Structured per-action log record for off-chain observability
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionLog {
    /// Name of the emitting action
    pub action: &'static str,
    /// Action-specific payload
    pub data: serde_json::Value,
}

impl ActionLog {
    /// Build a log record
    #[must_use]
    pub const fn new(action: &'static str, data: serde_json::Value) -> Self {
        Self { action, data }
    }
}

/// What a single action execution produced
#[derive(Debug, Clone)]
pub struct ActionOutcome {
    /// The action's single 32-byte result value
    pub value: Word,
    /// Log record appended to the recipe's emitted-log sequence
    pub log: ActionLog,
}

/// Typed substitutable parameter slot
///
/// Actions expose their late-bindable parameters as an ordered slot
/// list; the resolver overwrites slots from prior outputs or subdata
/// while preserving each slot's kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum SlotValue {
    /// An identity or token reference
    Address(Address),
    /// A token amount in base units
    Amount(TokenAmount),
    /// An uninterpreted 32-byte value
    Raw(Word),
}

impl SlotValue {
    /// Widen the slot into a 32-byte word
    #[must_use]
    pub fn to_word(self) -> Word {
        match self {
            Self::Address(addr) => Word::from_address(addr),
            Self::Amount(amount) => Word::from_u128(amount),
            Self::Raw(word) => word,
        }
    }

    /// Kind label used in resolution errors
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Address(_) => "address",
            Self::Amount(_) => "amount",
            Self::Raw(_) => "raw",
        }
    }

    /// Rebuild this slot from a substituted word, keeping the kind
    ///
    /// Returns `None` when the word cannot represent the slot's kind,
    /// e.g. an amount word with high bytes set being narrowed into an
    /// address slot.
    #[must_use]
    pub fn with_word(&self, word: Word) -> Option<Self> {
        match self {
            Self::Address(_) => word.to_address().map(Self::Address),
            Self::Amount(_) => word.to_u128().map(Self::Amount),
            Self::Raw(_) => Some(Self::Raw(word)),
        }
    }
}

/// Explicit acting-as identity for one recipe execution
///
/// Replaces ambient delegate-call context: balances observed and
/// mutated are the proxy's, and the caller identity travels with the
/// call instead of being read from the environment.
#[derive(Debug)]
pub struct ExecutionContext<'a> {
    /// The user-owned identity whose assets actions operate on
    pub proxy: Address,
    /// The agent that triggered execution (bot or user)
    pub caller: Address,
    /// The asset book, already a scratch copy under the executor
    pub ledger: &'a mut Ledger,
}

/// Continuation the executor hands to a flashloan action: run the
/// remaining steps with the loan value as output `$1`.
pub type FlashContinuation<'c> =
    dyn FnMut(&mut ExecutionContext<'_>, Word) -> RecipeResult<()> + 'c;

/// The contract every action variant implements
pub trait Action: Send + Sync {
    /// Registry key for this action
    fn id(&self) -> ActionId;

    /// Human-readable action name, used in logs and errors
    fn name(&self) -> &'static str;

    /// Scheduling classification
    fn action_type(&self) -> ActionType {
        ActionType::Standard
    }

    /// Decode the payload and return the declared substitutable slots
    ///
    /// Pure and deterministic. The returned order is the action's
    /// whitelist contract: `param_mapping[i]` governs slot `i`.
    ///
    /// # Errors
    ///
    /// Returns a decode error on a malformed payload
    fn parse_inputs(&self, payload: &[u8]) -> RecipeResult<Vec<SlotValue>>;

    /// Perform the effect with resolved slots and return one result
    ///
    /// # Errors
    ///
    /// Returns error if the effect fails; the executor reverts the
    /// whole recipe
    fn execute(
        &self,
        payload: &[u8],
        slots: &[SlotValue],
        ctx: &mut ExecutionContext<'_>,
    ) -> RecipeResult<ActionOutcome>;

    /// Execute outside a recipe: no substitution, literal slots only
    ///
    /// # Errors
    ///
    /// Returns error if decoding or the effect fails
    fn execute_direct(
        &self,
        payload: &[u8],
        ctx: &mut ExecutionContext<'_>,
    ) -> RecipeResult<ActionOutcome> {
        let slots = self.parse_inputs(payload)?;
        self.execute(payload, &slots, ctx)
    }

    /// Flashloan entry point: borrow, drive `rest`, collect repayment
    ///
    /// Only `ActionType::FlashLoan` actions override this; the default
    /// rejects re-entry.
    ///
    /// # Errors
    ///
    /// Returns error if the action does not support wrapping a recipe
    fn execute_flash(
        &self,
        _payload: &[u8],
        _slots: &[SlotValue],
        _ctx: &mut ExecutionContext<'_>,
        _rest: &mut FlashContinuation<'_>,
    ) -> RecipeResult<ActionOutcome> {
        Err(RecipeError::FlashLoanReentryUnsupported {
            action: self.name().to_owned(),
        })
    }
}

/// Decode a bincode payload into an action's typed params
///
/// # Errors
///
/// Returns a decode error naming the action on malformed input
pub fn decode_payload<'de, T: Deserialize<'de>>(
    action: &'static str,
    payload: &'de [u8],
) -> RecipeResult<T> {
    bincode::deserialize(payload).map_err(|err| RecipeError::Decode {
        action: action.to_owned(),
        message: err.to_string(),
    })
}

/// Encode an action's typed params into a payload
///
/// # Errors
///
/// Returns a decode error if serialization fails
pub fn encode_payload<T: Serialize>(action: &'static str, params: &T) -> RecipeResult<Vec<u8>> {
    bincode::serialize(params).map_err(|err| RecipeError::Decode {
        action: action.to_owned(),
        message: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_word_round_trip_preserves_kind() {
        let addr = Address([7_u8; 20]);
        let slot = SlotValue::Address(addr);
        let resolved = slot.with_word(slot.to_word()).unwrap();
        assert_eq!(resolved, SlotValue::Address(addr));

        let slot = SlotValue::Amount(42);
        let resolved = slot.with_word(Word::from_u128(99)).unwrap();
        assert_eq!(resolved, SlotValue::Amount(99));
    }

    #[test]
    fn slot_narrowing_can_fail() {
        let slot = SlotValue::Amount(0);
        let mut bytes = [0_u8; 32];
        bytes[0] = 0xff;
        assert_eq!(slot.with_word(Word(bytes)), None);
    }

    #[test]
    fn payload_codec_round_trip() {
        #[derive(Serialize, Deserialize, PartialEq, Debug)]
        struct Params {
            token: Address,
            amount: TokenAmount,
        }

        let params = Params {
            token: Address([9_u8; 20]),
            amount: u128::MAX,
        };
        let payload = encode_payload("Test", &params).unwrap();
        let decoded: Params = decode_payload("Test", &payload).unwrap();
        assert_eq!(decoded, params);
    }

    #[test]
    fn malformed_payload_is_decode_error() {
        let err = decode_payload::<Address>("Test", &[1, 2, 3]).unwrap_err();
        assert!(matches!(err, RecipeError::Decode { .. }));
    }
}
