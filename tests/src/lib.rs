//! Shared fixtures for the `RecipeIO` integration test suite

use automation_core::trigger::PriceFloorTrigger;
use automation_core::{
    AutomationConfig, BotAuth, ProxyAuth, StrategyExecutor, SubscriptionStore, TriggerRegistry,
};
use recipe_core::actions::{standard_registry, PoolFlashLoanProvider};
use recipe_core::executor::RecipeExecutor;
use recipe_core::types::Address;
use recipe_core::EngineConfig;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Bot identity used across scenarios
pub const BOT: Address = Address([0x01_u8; 20]);
/// Proxy identity actions operate on
pub const PROXY: Address = Address([0xaa_u8; 20]);
/// External owner account funds are pulled from
pub const OWNER: Address = Address([0xbb_u8; 20]);
/// Recipient account for outgoing transfers
pub const SINK: Address = Address([0xcc_u8; 20]);
/// Service-fee collector account
pub const FEES: Address = Address([0xfe_u8; 20]);
/// Flashloan pool liquidity account
pub const POOL: Address = Address([0xf0_u8; 20]);
/// Strategy executor forwarder identity
pub const FORWARDER: Address = Address([0xee_u8; 20]);
/// Test token
pub const DAI: Address = Address([0x03_u8; 20]);

/// Flashloan premium used in fixtures: nine basis points
#[must_use]
pub fn flash_fee_percentage() -> Decimal {
    Decimal::new(9, 2)
}

/// Install a fmt subscriber honoring `RUST_LOG`, once per process
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    tracing::debug!("test tracing initialized");
}

/// Build a recipe executor over the reference action set
#[must_use]
pub fn engine() -> Arc<RecipeExecutor> {
    let registry = standard_registry(
        Arc::new(PoolFlashLoanProvider::new(POOL, flash_fee_percentage())),
        FEES,
        Decimal::new(25, 2), // 0.25% service fee
    )
    .expect("reference action ids are distinct");
    Arc::new(RecipeExecutor::new(Arc::new(registry), EngineConfig::default()))
}

/// Everything the automation-layer scenarios need, pre-wired
pub struct AutomationFixture {
    /// The dispatch pipeline under test
    pub executor: StrategyExecutor,
    /// Subscription records
    pub store: Arc<SubscriptionStore>,
    /// Bot capability list
    pub bot_auth: Arc<BotAuth>,
    /// Proxy grant table
    pub proxy_auth: Arc<ProxyAuth>,
}

/// Build a strategy executor with the price-floor trigger registered
/// and `PROXY` already trusting `FORWARDER`
#[must_use]
pub fn automation_fixture() -> AutomationFixture {
    let store = Arc::new(SubscriptionStore::new(AutomationConfig::default()));
    let bot_auth = Arc::new(BotAuth::new());
    let proxy_auth = Arc::new(ProxyAuth::new());
    let triggers = Arc::new(TriggerRegistry::new());
    triggers.register(Arc::new(PriceFloorTrigger));

    let executor = StrategyExecutor::new(
        Arc::clone(&store),
        Arc::clone(&bot_auth),
        Arc::clone(&proxy_auth),
        triggers,
        engine(),
        FORWARDER,
    );
    proxy_auth.authorize(PROXY, FORWARDER);

    AutomationFixture {
        executor,
        store,
        bot_auth,
        proxy_auth,
    }
}
