use indexmap::IndexMap;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::{
    Categorical, ChainError, Distribution, FiniteDeterministicPolicy, FinitePolicy, NonTerminal,
    PROB_TOLERANCE, Policy,
};

fn stochastic_policy() -> FinitePolicy<u32, Categorical<char>> {
    let mut policy_map = IndexMap::new();
    policy_map.insert(
        1_u32,
        Categorical::new([('x', 0.25), ('y', 0.75)]).expect("valid weights"),
    );

    FinitePolicy::new(policy_map)
}

#[test]
fn act_returns_the_stored_distribution() {
    let policy = stochastic_policy();
    let distribution = policy
        .act_finite(&NonTerminal(1))
        .expect("state is covered");

    assert!((distribution.probability(&'x') - 0.25).abs() <= PROB_TOLERANCE);
    assert!((distribution.probability(&'y') - 0.75).abs() <= PROB_TOLERANCE);
}

#[test]
fn act_fails_for_uncovered_state() {
    let policy = stochastic_policy();
    let err = policy
        .act_finite(&NonTerminal(2))
        .expect_err("state is not covered");

    assert!(matches!(err, ChainError::UnknownState { .. }));
}

#[test]
fn deterministic_policy_always_picks_its_action() {
    let policy = FiniteDeterministicPolicy::deterministic([(1_u32, 'x'), (2, 'y')]);

    assert_eq!(policy.action_for(&NonTerminal(1)).expect("covered"), &'x');

    let distribution = policy.act(&NonTerminal(2)).expect("covered");
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    for _ in 0..8 {
        assert_eq!(distribution.sample(&mut rng), 'y');
    }
}

#[test]
fn policy_map_iteration_preserves_insertion_order() {
    let policy = FiniteDeterministicPolicy::deterministic([(3_u32, 'a'), (1, 'b'), (2, 'c')]);
    let states: Vec<u32> = policy.iter().map(|(state, _)| *state).collect();

    assert_eq!(states, vec![3, 1, 2]);
}
