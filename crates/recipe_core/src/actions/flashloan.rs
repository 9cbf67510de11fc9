//! Flashloan action and provider collaborators
//!
//! The provider credits the loan, runs the continuation it is handed
//! ("the remaining recipe steps"), then collects principal plus fee
//! inside the same atomic unit. Missing repayment funds fail the whole
//! recipe, which is exactly the uncommitted-scratch rollback path.

use crate::action::{
    decode_payload, Action, ActionLog, ActionOutcome, ActionType, ExecutionContext,
    FlashContinuation, SlotValue,
};
use crate::types::{ActionId, Address, TokenAmount, Word};
use crate::{RecipeError, RecipeResult};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// A lender able to advance funds for the duration of one recipe
pub trait FlashLoanProvider: Send + Sync {
    /// Provider name, used in logs and errors
    fn name(&self) -> &'static str;

    /// Fee charged on `amount`, in token base units
    ///
    /// # Errors
    ///
    /// Returns error if the fee cannot be computed for the amount
    fn fee(&self, amount: TokenAmount) -> RecipeResult<TokenAmount>;

    /// Advance `amount`, drive `rest`, then collect principal plus fee
    ///
    /// # Errors
    ///
    /// Returns error if liquidity is missing, the continuation fails,
    /// or repayment cannot be collected
    fn flash_loan(
        &self,
        token: Address,
        amount: TokenAmount,
        ctx: &mut ExecutionContext<'_>,
        rest: &mut FlashContinuation<'_>,
    ) -> RecipeResult<Word>;
}

/// Pool-backed provider: liquidity lives in a ledger account
///
/// The fee is a percentage of the principal, rounded up in the pool's
/// favor, matching how lending pools quote flashloan premiums.
#[derive(Debug, Clone)]
pub struct PoolFlashLoanProvider {
    /// Ledger account holding pool liquidity
    pool: Address,
    /// Fee percentage, e.g. `0.09` for nine basis points
    fee_percentage: Decimal,
}

impl PoolFlashLoanProvider {
    /// Create a provider over a pool account
    #[must_use]
    pub const fn new(pool: Address, fee_percentage: Decimal) -> Self {
        Self {
            pool,
            fee_percentage,
        }
    }

    /// The pool's ledger account
    #[must_use]
    pub const fn pool(&self) -> Address {
        self.pool
    }
}

impl FlashLoanProvider for PoolFlashLoanProvider {
    fn name(&self) -> &'static str {
        "LendingPool"
    }

    fn fee(&self, amount: TokenAmount) -> RecipeResult<TokenAmount> {
        let principal = Decimal::from_u128(amount).ok_or_else(|| RecipeError::FlashLoan {
            message: format!("loan amount {amount} exceeds fee precision"),
        })?;
        let fee = (principal * self.fee_percentage / Decimal::ONE_HUNDRED).ceil();
        fee.to_u128().ok_or_else(|| RecipeError::FlashLoan {
            message: format!("fee for amount {amount} is not representable"),
        })
    }

    fn flash_loan(
        &self,
        token: Address,
        amount: TokenAmount,
        ctx: &mut ExecutionContext<'_>,
        rest: &mut FlashContinuation<'_>,
    ) -> RecipeResult<Word> {
        let fee = self.fee(amount)?;
        debug!(provider = self.name(), %token, amount, fee, "opening flash loan");

        ctx.ledger.transfer(self.pool, ctx.proxy, token, amount)?;
        rest(ctx, Word::from_u128(amount))?;

        let owed = amount
            .checked_add(fee)
            .ok_or_else(|| RecipeError::FlashLoan {
                message: format!("repayment amount overflows for principal {amount}"),
            })?;
        ctx.ledger
            .transfer(ctx.proxy, self.pool, token, owed)
            .map_err(|err| RecipeError::FlashLoan {
                message: format!("repayment of {owed} failed: {err}"),
            })?;

        debug!(provider = self.name(), %token, owed, "flash loan repaid");
        Ok(Word::from_u128(amount))
    }
}

/// Parameters for [`FlashLoanAction`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashLoanParams {
    /// Token to borrow
    pub token: Address,
    /// Principal in base units
    pub amount: TokenAmount,
}

/// Borrow up front and wrap the remaining recipe as the loan body
///
/// Substitutable slots, in order: token, amount. Only valid as the
/// first action of a recipe; the executor enforces the position.
pub struct FlashLoanAction {
    provider: Arc<dyn FlashLoanProvider>,
}

impl FlashLoanAction {
    /// Registry id
    pub const ID: ActionId = ActionId(*b"flsh");

    /// Create the action over an injected provider
    #[must_use]
    pub fn new(provider: Arc<dyn FlashLoanProvider>) -> Self {
        Self { provider }
    }

    fn decode_slots(&self, slots: &[SlotValue]) -> RecipeResult<(Address, TokenAmount)> {
        match (slots.first(), slots.get(1)) {
            (Some(SlotValue::Address(token)), Some(SlotValue::Amount(amount))) => {
                Ok((*token, *amount))
            }
            _ => Err(RecipeError::Action {
                action: self.name().to_owned(),
                message: "expected token and amount slots".to_owned(),
            }),
        }
    }
}

impl Action for FlashLoanAction {
    fn id(&self) -> ActionId {
        Self::ID
    }

    fn name(&self) -> &'static str {
        "FlashLoan"
    }

    fn action_type(&self) -> ActionType {
        ActionType::FlashLoan
    }

    fn parse_inputs(&self, payload: &[u8]) -> RecipeResult<Vec<SlotValue>> {
        let params: FlashLoanParams = decode_payload(self.name(), payload)?;
        Ok(vec![
            SlotValue::Address(params.token),
            SlotValue::Amount(params.amount),
        ])
    }

    /// A flashloan without a recipe body has nothing to repay from
    fn execute(
        &self,
        _payload: &[u8],
        _slots: &[SlotValue],
        _ctx: &mut ExecutionContext<'_>,
    ) -> RecipeResult<ActionOutcome> {
        Err(RecipeError::FlashLoan {
            message: "flash loan requires a recipe body to run inside".to_owned(),
        })
    }

    fn execute_flash(
        &self,
        _payload: &[u8],
        slots: &[SlotValue],
        ctx: &mut ExecutionContext<'_>,
        rest: &mut FlashContinuation<'_>,
    ) -> RecipeResult<ActionOutcome> {
        let (token, amount) = self.decode_slots(slots)?;
        let value = self.provider.flash_loan(token, amount, ctx, rest)?;
        Ok(ActionOutcome {
            value,
            log: ActionLog::new(
                self.name(),
                serde_json::json!({
                    "provider": self.provider.name(),
                    "token": token.to_hex(),
                    "amount": amount.to_string(),
                }),
            ),
        })
    }
}
