//! Reference action implementations
//!
//! The small closed set of actions the engine ships with: token
//! movement in and out of the proxy, flashloan wrapping, and the
//! service-fee skim. Protocol-specific actions register alongside these
//! through the same `ActionRegistry`.

pub mod fee;
pub mod flashloan;
pub mod transfer;

pub use fee::TakeFeeAction;
pub use flashloan::{FlashLoanAction, FlashLoanProvider, PoolFlashLoanProvider};
pub use transfer::{PullTokenAction, SendTokenAction};

use crate::registry::ActionRegistry;
use crate::types::Address;
use crate::RecipeResult;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Build a registry pre-loaded with the reference actions
///
/// # Errors
///
/// Returns error if an id collides, which only happens when the
/// reference set itself is inconsistent
pub fn standard_registry(
    flash_provider: Arc<dyn FlashLoanProvider>,
    fee_collector: Address,
    fee_percentage: Decimal,
) -> RecipeResult<ActionRegistry> {
    let registry = ActionRegistry::new();
    registry.register(Arc::new(PullTokenAction))?;
    registry.register(Arc::new(SendTokenAction))?;
    registry.register(Arc::new(FlashLoanAction::new(flash_provider)))?;
    registry.register(Arc::new(TakeFeeAction::new(fee_collector, fee_percentage)))?;
    Ok(registry)
}
