//! # `RecipeIO` Automation Core Integration Tests
//!
//! Full-stack dispatch scenarios: subscription lifecycle, bot and
//! proxy authorization gates, trigger-fed subdata reaching recipe
//! steps, and one-shot execution policies.

use automation_core::subscription::TriggerSpec;
use automation_core::trigger::{PriceFloorSpec, PriceFloorTrigger, PriceObservation};
use automation_core::AutomationError;
use pretty_assertions::assert_eq;
use recipe_core::action::encode_payload;
use recipe_core::actions::transfer::{PullTokenParams, SendTokenParams};
use recipe_core::actions::{PullTokenAction, SendTokenAction};
use recipe_core::params::ParamSource;
use recipe_core::recipe::ActionCall;
use recipe_core::state::Ledger;
use recipe_core::RecipeError;
use recipeio_tests::{automation_fixture, AutomationFixture, BOT, DAI, OWNER, PROXY, SINK};

fn floor_spec(floor: u128) -> TriggerSpec {
    TriggerSpec::new(
        PriceFloorTrigger::KIND,
        bincode::serialize(&PriceFloorSpec { floor }).unwrap(),
    )
}

fn observed(price: u128) -> Vec<Vec<u8>> {
    vec![bincode::serialize(&PriceObservation { price }).unwrap()]
}

fn pull_call(amount: u128, mapping: Vec<ParamSource>) -> ActionCall {
    ActionCall::new(
        PullTokenAction::ID,
        encode_payload(
            "PullToken",
            &PullTokenParams {
                token: DAI,
                from: OWNER,
                amount,
            },
        )
        .unwrap(),
        mapping,
    )
}

fn send_call(amount: u128, mapping: Vec<ParamSource>) -> ActionCall {
    ActionCall::new(
        SendTokenAction::ID,
        encode_payload(
            "SendToken",
            &SendTokenParams {
                token: DAI,
                to: SINK,
                amount,
            },
        )
        .unwrap(),
        mapping,
    )
}

fn literal3() -> Vec<ParamSource> {
    vec![ParamSource::Literal; 3]
}

/// Register a close-position subscription: pull from the owner, send
/// the piped amount to the sink, gated on a price floor of 1_000.
fn close_position_sub(fix: &AutomationFixture, continuous: bool) -> u64 {
    fix.store
        .subscribe(
            PROXY,
            vec![floor_spec(1_000)],
            vec![PullTokenAction::ID, SendTokenAction::ID],
            continuous,
            0,
        )
        .unwrap()
}

fn close_position_calls() -> Vec<ActionCall> {
    vec![
        pull_call(750, literal3()),
        send_call(
            0,
            vec![
                ParamSource::Literal,
                ParamSource::Literal,
                ParamSource::Output(1),
            ],
        ),
    ]
}

#[test]
fn end_to_end_dispatch_moves_funds() {
    recipeio_tests::init_test_tracing();
    let fix = automation_fixture();
    let sub_id = close_position_sub(&fix, true);
    fix.bot_auth.approve(sub_id, BOT);

    let mut ledger = Ledger::new();
    ledger.deposit(OWNER, DAI, 750).unwrap();

    let receipt = fix
        .executor
        .execute_strategy(BOT, sub_id, 0, &observed(900), &close_position_calls(), &mut ledger)
        .unwrap();

    assert_eq!(receipt.outputs.len(), 2);
    assert_eq!(receipt.logs.len(), 2);
    assert_eq!(ledger.balance_of(SINK, DAI), 750);
    assert_eq!(ledger.balance_of(OWNER, DAI), 0);
}

#[test]
fn trigger_subdata_binds_into_recipe_steps() {
    let fix = automation_fixture();
    // One step: pull exactly the price the trigger observed.
    let sub_id = fix
        .store
        .subscribe(
            PROXY,
            vec![floor_spec(1_000)],
            vec![PullTokenAction::ID],
            true,
            0,
        )
        .unwrap();
    fix.bot_auth.approve(sub_id, BOT);

    let mut ledger = Ledger::new();
    ledger.deposit(OWNER, DAI, 2_000).unwrap();

    let calls = vec![pull_call(
        0,
        vec![
            ParamSource::Literal,
            ParamSource::Literal,
            ParamSource::SubData(0),
        ],
    )];
    fix.executor
        .execute_strategy(BOT, sub_id, 0, &observed(864), &calls, &mut ledger)
        .unwrap();

    assert_eq!(ledger.balance_of(PROXY, DAI), 864);
}

#[test]
fn caller_auth_is_idempotent_and_bot_scoped() {
    let fix = automation_fixture();
    let sub_id = close_position_sub(&fix, true);

    assert!(!fix.executor.check_caller_auth(sub_id, BOT));
    assert!(!fix.executor.check_caller_auth(sub_id, BOT));

    fix.bot_auth.approve(sub_id, BOT);
    assert!(fix.executor.check_caller_auth(sub_id, BOT));
    assert!(fix.executor.check_caller_auth(sub_id, BOT));
}

#[test]
fn unapproved_then_approved_bot() {
    let fix = automation_fixture();
    let sub_id = close_position_sub(&fix, true);

    let mut ledger = Ledger::new();
    ledger.deposit(OWNER, DAI, 750).unwrap();

    let err = fix
        .executor
        .execute_strategy(BOT, sub_id, 0, &observed(900), &close_position_calls(), &mut ledger)
        .unwrap_err();
    assert!(matches!(err, AutomationError::BotNotApproved { .. }));
    assert_eq!(ledger.balance_of(SINK, DAI), 0);

    // The identical call from an approved bot succeeds.
    fix.bot_auth.approve(sub_id, BOT);
    fix.executor
        .execute_strategy(BOT, sub_id, 0, &observed(900), &close_position_calls(), &mut ledger)
        .unwrap();
    assert_eq!(ledger.balance_of(SINK, DAI), 750);
}

#[test]
fn unsubscribe_blocks_future_dispatch() {
    let fix = automation_fixture();
    let sub_id = close_position_sub(&fix, true);
    fix.bot_auth.approve(sub_id, BOT);
    fix.store.unsubscribe(sub_id).unwrap();

    let mut ledger = Ledger::new();
    ledger.deposit(OWNER, DAI, 750).unwrap();
    let err = fix
        .executor
        .execute_strategy(BOT, sub_id, 0, &observed(900), &close_position_calls(), &mut ledger)
        .unwrap_err();
    assert!(matches!(err, AutomationError::SubNotActive { .. }));
}

#[test]
fn failed_recipe_leaves_subscription_usable() {
    let fix = automation_fixture();
    // One-shot subscription: deactivation must only happen on success.
    let sub_id = close_position_sub(&fix, false);
    fix.bot_auth.approve(sub_id, BOT);

    // Owner has less than the recipe pulls: the recipe fails inside
    // the engine.
    let mut ledger = Ledger::new();
    ledger.deposit(OWNER, DAI, 100).unwrap();

    let err = fix
        .executor
        .execute_strategy(BOT, sub_id, 0, &observed(900), &close_position_calls(), &mut ledger)
        .unwrap_err();
    assert!(matches!(
        err,
        AutomationError::Recipe(RecipeError::Ledger(_))
    ));
    // Nothing moved and the one-shot subscription is still active.
    assert_eq!(ledger.balance_of(OWNER, DAI), 100);
    assert!(fix.store.get_sub(sub_id).unwrap().active);

    // Funding the owner lets the same subscription execute, and only
    // then does the one-shot policy deactivate it.
    ledger.deposit(OWNER, DAI, 650).unwrap();
    fix.executor
        .execute_strategy(BOT, sub_id, 0, &observed(900), &close_position_calls(), &mut ledger)
        .unwrap();
    assert!(!fix.store.get_sub(sub_id).unwrap().active);
}

#[test]
fn trigger_arity_mismatch_rejected() {
    let fix = automation_fixture();
    let sub_id = close_position_sub(&fix, true);
    fix.bot_auth.approve(sub_id, BOT);

    let mut ledger = Ledger::new();
    let err = fix
        .executor
        .execute_strategy(BOT, sub_id, 0, &[], &close_position_calls(), &mut ledger)
        .unwrap_err();
    assert!(matches!(
        err,
        AutomationError::TriggerCountMismatch { expected: 1, got: 0 }
    ));
}

#[test]
fn reactivated_subscription_dispatches_again() {
    let fix = automation_fixture();
    let sub_id = close_position_sub(&fix, true);
    fix.bot_auth.approve(sub_id, BOT);
    fix.store.deactivate(sub_id).unwrap();
    fix.store.reactivate(sub_id).unwrap();

    let mut ledger = Ledger::new();
    ledger.deposit(OWNER, DAI, 750).unwrap();
    fix.executor
        .execute_strategy(BOT, sub_id, 0, &observed(900), &close_position_calls(), &mut ledger)
        .unwrap();
    assert_eq!(ledger.balance_of(SINK, DAI), 750);
}
