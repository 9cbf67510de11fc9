//! Criterion benchmarks for recipe execution throughput

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use recipe_core::action::encode_payload;
use recipe_core::actions::transfer::{PullTokenParams, SendTokenParams};
use recipe_core::actions::{PullTokenAction, SendTokenAction};
use recipe_core::params::ParamSource;
use recipe_core::recipe::{ActionCall, Recipe};
use recipe_core::state::Ledger;
use recipeio_tests::{engine, BOT, DAI, OWNER, PROXY, SINK};

fn pipeline_recipe(steps: usize) -> Recipe {
    let pull = ActionCall::new(
        PullTokenAction::ID,
        encode_payload(
            "PullToken",
            &PullTokenParams {
                token: DAI,
                from: OWNER,
                amount: 1_000,
            },
        )
        .unwrap(),
        vec![ParamSource::Literal; 3],
    );
    let send = ActionCall::new(
        SendTokenAction::ID,
        encode_payload(
            "SendToken",
            &SendTokenParams {
                token: DAI,
                to: SINK,
                amount: 0,
            },
        )
        .unwrap(),
        vec![
            ParamSource::Literal,
            ParamSource::Literal,
            ParamSource::Output(1),
        ],
    );

    let mut calls = Vec::with_capacity(steps);
    for i in 0..steps {
        calls.push(if i % 2 == 0 { pull.clone() } else { send.clone() });
    }
    Recipe::new("bench-pipeline", calls)
}

fn bench_recipe_execution(c: &mut Criterion) {
    let engine = engine();
    let mut base = Ledger::new();
    base.deposit(OWNER, DAI, u128::from(u64::MAX)).unwrap();

    for steps in [2_usize, 8, 32] {
        let recipe = pipeline_recipe(steps);
        c.bench_function(&format!("execute_recipe_{steps}_steps"), |b| {
            b.iter(|| {
                let mut ledger = base.clone();
                let receipt = engine
                    .execute_recipe(black_box(&recipe), &[], PROXY, BOT, &mut ledger)
                    .unwrap();
                black_box(receipt)
            });
        });
    }
}

criterion_group!(benches, bench_recipe_execution);
criterion_main!(benches);
