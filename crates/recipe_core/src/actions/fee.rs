//! Service-fee skim action

use crate::action::{
    decode_payload, Action, ActionLog, ActionOutcome, ActionType, ExecutionContext, SlotValue,
};
use crate::types::{ActionId, Address, TokenAmount, Word};
use crate::{RecipeError, RecipeResult};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Parameters for [`TakeFeeAction`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TakeFeeParams {
    /// Token the fee is taken in
    pub token: Address,
    /// Gross amount the fee is computed from, typically piped in
    pub amount: TokenAmount,
}

/// Skim a percentage service fee from the proxy to a collector
///
/// Substitutable slots, in order: token, amount. The fee rounds down,
/// never overtaking; returns the amount net of fee so downstream steps
/// can pipe the remainder.
#[derive(Debug)]
pub struct TakeFeeAction {
    collector: Address,
    fee_percentage: Decimal,
}

impl TakeFeeAction {
    /// Registry id
    pub const ID: ActionId = ActionId(*b"tfee");

    /// Create the action with an injected collector and percentage
    #[must_use]
    pub const fn new(collector: Address, fee_percentage: Decimal) -> Self {
        Self {
            collector,
            fee_percentage,
        }
    }

    fn fee_for(&self, amount: TokenAmount) -> RecipeResult<TokenAmount> {
        let gross = Decimal::from_u128(amount).ok_or_else(|| RecipeError::Action {
            action: "TakeFee".to_owned(),
            message: format!("amount {amount} exceeds fee precision"),
        })?;
        let fee = (gross * self.fee_percentage / Decimal::ONE_HUNDRED).floor();
        fee.to_u128().ok_or_else(|| RecipeError::Action {
            action: "TakeFee".to_owned(),
            message: format!("fee for amount {amount} is not representable"),
        })
    }
}

impl Action for TakeFeeAction {
    fn id(&self) -> ActionId {
        Self::ID
    }

    fn name(&self) -> &'static str {
        "TakeFee"
    }

    fn action_type(&self) -> ActionType {
        ActionType::Fee
    }

    fn parse_inputs(&self, payload: &[u8]) -> RecipeResult<Vec<SlotValue>> {
        let params: TakeFeeParams = decode_payload(self.name(), payload)?;
        Ok(vec![
            SlotValue::Address(params.token),
            SlotValue::Amount(params.amount),
        ])
    }

    fn execute(
        &self,
        _payload: &[u8],
        slots: &[SlotValue],
        ctx: &mut ExecutionContext<'_>,
    ) -> RecipeResult<ActionOutcome> {
        let (token, amount) = match (slots.first(), slots.get(1)) {
            (Some(SlotValue::Address(token)), Some(SlotValue::Amount(amount))) => {
                (*token, *amount)
            }
            _ => {
                return Err(RecipeError::Action {
                    action: self.name().to_owned(),
                    message: "expected token and amount slots".to_owned(),
                })
            }
        };

        let fee = self.fee_for(amount)?;
        let net = amount.checked_sub(fee).ok_or_else(|| RecipeError::Action {
            action: self.name().to_owned(),
            message: format!("fee {fee} exceeds gross amount {amount}"),
        })?;
        if fee > 0 {
            ctx.ledger.transfer(ctx.proxy, self.collector, token, fee)?;
        }

        Ok(ActionOutcome {
            value: Word::from_u128(net),
            log: ActionLog::new(
                self.name(),
                serde_json::json!({
                    "token": token.to_hex(),
                    "gross": amount.to_string(),
                    "fee": fee.to_string(),
                }),
            ),
        })
    }
}
