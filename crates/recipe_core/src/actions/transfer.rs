//! Token movement actions: pull into the proxy, send out of it

use crate::action::{
    decode_payload, Action, ActionLog, ActionOutcome, ExecutionContext, SlotValue,
};
use crate::types::{ActionId, Address, TokenAmount, Word};
use crate::{RecipeError, RecipeResult};
use serde::{Deserialize, Serialize};

/// Sentinel amount meaning "the sender's entire balance"
pub const MAX_AMOUNT: TokenAmount = TokenAmount::MAX;

fn slot_address(slots: &[SlotValue], position: usize, action: &'static str) -> RecipeResult<Address> {
    match slots.get(position) {
        Some(SlotValue::Address(addr)) => Ok(*addr),
        other => Err(RecipeError::Action {
            action: action.to_owned(),
            message: format!("slot {position} is not an address: {other:?}"),
        }),
    }
}

fn slot_amount(slots: &[SlotValue], position: usize, action: &'static str) -> RecipeResult<TokenAmount> {
    match slots.get(position) {
        Some(SlotValue::Amount(amount)) => Ok(*amount),
        other => Err(RecipeError::Action {
            action: action.to_owned(),
            message: format!("slot {position} is not an amount: {other:?}"),
        }),
    }
}

/// Parameters for [`PullTokenAction`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullTokenParams {
    /// Token to move
    pub token: Address,
    /// Account the tokens leave
    pub from: Address,
    /// Amount in base units; [`MAX_AMOUNT`] pulls the full balance
    pub amount: TokenAmount,
}

/// Pull tokens from an owner account into the proxy
///
/// Substitutable slots, in order: token, from, amount.
#[derive(Debug, Default)]
pub struct PullTokenAction;

impl PullTokenAction {
    /// Registry id
    pub const ID: ActionId = ActionId(*b"pltk");
}

impl Action for PullTokenAction {
    fn id(&self) -> ActionId {
        Self::ID
    }

    fn name(&self) -> &'static str {
        "PullToken"
    }

    fn parse_inputs(&self, payload: &[u8]) -> RecipeResult<Vec<SlotValue>> {
        let params: PullTokenParams = decode_payload(self.name(), payload)?;
        Ok(vec![
            SlotValue::Address(params.token),
            SlotValue::Address(params.from),
            SlotValue::Amount(params.amount),
        ])
    }

    fn execute(
        &self,
        _payload: &[u8],
        slots: &[SlotValue],
        ctx: &mut ExecutionContext<'_>,
    ) -> RecipeResult<ActionOutcome> {
        let token = slot_address(slots, 0, self.name())?;
        let from = slot_address(slots, 1, self.name())?;
        let requested = slot_amount(slots, 2, self.name())?;

        let amount = if requested == MAX_AMOUNT {
            ctx.ledger.balance_of(from, token)
        } else {
            requested
        };
        ctx.ledger.transfer(from, ctx.proxy, token, amount)?;

        Ok(ActionOutcome {
            value: Word::from_u128(amount),
            log: ActionLog::new(
                self.name(),
                serde_json::json!({
                    "token": token.to_hex(),
                    "from": from.to_hex(),
                    "amount": amount.to_string(),
                }),
            ),
        })
    }
}

/// Parameters for [`SendTokenAction`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendTokenParams {
    /// Token to move
    pub token: Address,
    /// Recipient account
    pub to: Address,
    /// Amount in base units; [`MAX_AMOUNT`] sends the full proxy balance
    pub amount: TokenAmount,
}

/// Send tokens from the proxy to a recipient
///
/// Substitutable slots, in order: token, to, amount.
#[derive(Debug, Default)]
pub struct SendTokenAction;

impl SendTokenAction {
    /// Registry id
    pub const ID: ActionId = ActionId(*b"sndt");
}

impl Action for SendTokenAction {
    fn id(&self) -> ActionId {
        Self::ID
    }

    fn name(&self) -> &'static str {
        "SendToken"
    }

    fn parse_inputs(&self, payload: &[u8]) -> RecipeResult<Vec<SlotValue>> {
        let params: SendTokenParams = decode_payload(self.name(), payload)?;
        Ok(vec![
            SlotValue::Address(params.token),
            SlotValue::Address(params.to),
            SlotValue::Amount(params.amount),
        ])
    }

    fn execute(
        &self,
        _payload: &[u8],
        slots: &[SlotValue],
        ctx: &mut ExecutionContext<'_>,
    ) -> RecipeResult<ActionOutcome> {
        let token = slot_address(slots, 0, self.name())?;
        let to = slot_address(slots, 1, self.name())?;
        let requested = slot_amount(slots, 2, self.name())?;

        let amount = if requested == MAX_AMOUNT {
            ctx.ledger.balance_of(ctx.proxy, token)
        } else {
            requested
        };
        ctx.ledger.transfer(ctx.proxy, to, token, amount)?;

        Ok(ActionOutcome {
            value: Word::from_u128(amount),
            log: ActionLog::new(
                self.name(),
                serde_json::json!({
                    "token": token.to_hex(),
                    "to": to.to_hex(),
                    "amount": amount.to_string(),
                }),
            ),
        })
    }
}
