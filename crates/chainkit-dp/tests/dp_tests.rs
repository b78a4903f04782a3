use indexmap::IndexMap;

use chainkit_core::{Categorical, FiniteMarkovRewardProcess, NonTerminal};
use chainkit_dp::domains::{Croak, Pad, frog_escape};
use chainkit_dp::{
    converge, evaluate_mrp, greedy_policy, policy_iteration, value_iteration, vf_close,
};

/// Deterministic chain 1 -> 2 -> 3 with rewards 1.0 then 2.0; 3 is terminal.
fn chain_mrp() -> FiniteMarkovRewardProcess<u32> {
    let mut transition_map = IndexMap::new();
    transition_map.insert(
        1_u32,
        Categorical::new([((2_u32, 1.0), 1.0)]).expect("valid weights"),
    );
    transition_map.insert(
        2_u32,
        Categorical::new([((3_u32, 2.0), 1.0)]).expect("valid weights"),
    );

    FiniteMarkovRewardProcess::new(transition_map).expect("valid process")
}

#[test]
fn evaluate_mrp_reaches_the_analytic_value() {
    let mrp = chain_mrp();

    let vf = converge(evaluate_mrp(&mrp, 0.5), |a, b| vf_close(a, b, 1e-12))
        .expect("evaluation sequence is infinite");

    // V(2) = 2, V(1) = 1 + 0.5 * V(2) = 2.
    assert!((vf[&NonTerminal(1)] - 2.0).abs() <= 1e-9);
    assert!((vf[&NonTerminal(2)] - 2.0).abs() <= 1e-9);
}

#[test]
fn converge_returns_the_last_element_of_a_finite_sequence() {
    let last = converge([1, 2, 3].into_iter(), |_, _| false);
    assert_eq!(last, Some(3));

    let empty = converge(std::iter::empty::<u32>(), |_, _| false);
    assert_eq!(empty, None);
}

#[test]
fn value_iteration_solves_the_short_river() {
    // For a river three pads wide, croaking B on pad 1 and A on pad 2 is
    // optimal, with escape probabilities 4/7 and 5/7.
    let mdp = frog_escape(3).expect("valid decision process");

    let vf = converge(value_iteration(&mdp, 1.0), |a, b| vf_close(a, b, 1e-12))
        .expect("value iteration is infinite");

    assert!((vf[&NonTerminal(Pad { position: 1 })] - 4.0 / 7.0).abs() <= 1e-6);
    assert!((vf[&NonTerminal(Pad { position: 2 })] - 5.0 / 7.0).abs() <= 1e-6);

    let policy = greedy_policy(&mdp, &vf, 1.0);
    assert_eq!(
        policy
            .action_for(&NonTerminal(Pad { position: 1 }))
            .expect("covered"),
        &Croak::B
    );
    assert_eq!(
        policy
            .action_for(&NonTerminal(Pad { position: 2 }))
            .expect("covered"),
        &Croak::A
    );
}

#[test]
fn policy_iteration_agrees_with_value_iteration() {
    let mdp = frog_escape(3).expect("valid decision process");

    let optimal = converge(value_iteration(&mdp, 1.0), |a, b| vf_close(a, b, 1e-12))
        .expect("value iteration is infinite");

    let (vf, policy) = converge(policy_iteration(&mdp, 1.0), |(a, _), (b, _)| {
        vf_close(a, b, 1e-9)
    })
    .expect("policy iteration is infinite");

    for (state, value) in &optimal {
        assert!((value - vf[state]).abs() <= 1e-6);
    }

    assert_eq!(
        policy
            .action_for(&NonTerminal(Pad { position: 1 }))
            .expect("covered"),
        &Croak::B
    );
    assert_eq!(
        policy
            .action_for(&NonTerminal(Pad { position: 2 }))
            .expect("covered"),
        &Croak::A
    );
}

#[test]
fn solver_sequences_are_restartable() {
    let mdp = frog_escape(4).expect("valid decision process");

    let first: Vec<_> = value_iteration(&mdp, 1.0).take(5).collect();
    let second: Vec<_> = value_iteration(&mdp, 1.0).take(5).collect();

    assert_eq!(first, second);
}
