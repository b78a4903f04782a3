use indexmap::IndexMap;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::{
    Categorical, ChainError, Constant, Distribution, FiniteMarkovProcess,
    FiniteMarkovRewardProcess, MarkovProcess, MarkovRewardProcess, NonTerminal, PROB_TOLERANCE,
    State, Terminal, TransitionStep,
};

/// One non-terminal state 0 that either loops or falls into terminal 1.
fn coin_flip_process() -> FiniteMarkovProcess<u32> {
    let mut transition_map = IndexMap::new();
    transition_map.insert(
        0_u32,
        Categorical::new([(0_u32, 0.5), (1_u32, 0.5)]).expect("valid weights"),
    );

    FiniteMarkovProcess::new(transition_map).expect("valid process")
}

/// Deterministic chain 1 -> 2 -> 3 with rewards 1.0 then 2.0; 3 is terminal.
fn chain_reward_process() -> FiniteMarkovRewardProcess<u32> {
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
fn support_only_states_become_terminal() {
    let process = coin_flip_process();
    let distribution = process
        .transition_map(&NonTerminal(0))
        .expect("state is a source");

    assert!(
        (distribution.probability(&State::NonTerminal(NonTerminal(0))) - 0.5).abs()
            <= PROB_TOLERANCE
    );
    assert!(
        (distribution.probability(&State::Terminal(Terminal(1))) - 0.5).abs() <= PROB_TOLERANCE
    );
}

#[test]
fn transition_fails_for_unknown_state() {
    let process = coin_flip_process();
    let err = process
        .transition_map(&NonTerminal(9))
        .expect_err("state is not a source");

    assert!(matches!(err, ChainError::UnknownState { .. }));
}

#[test]
fn wrapped_construction_rejects_unknown_non_terminal_successor() {
    let mut transition_map = IndexMap::new();
    transition_map.insert(
        NonTerminal(0_u32),
        Categorical::new([(State::NonTerminal(NonTerminal(1_u32)), 1.0)]).expect("valid weights"),
    );

    let err = FiniteMarkovProcess::from_wrapped(transition_map)
        .expect_err("successor 1 is not a source");
    assert!(matches!(err, ChainError::InvalidTransitionMap { .. }));
}

#[test]
fn wrapped_construction_rejects_ambiguous_terminal() {
    let mut transition_map = IndexMap::new();
    transition_map.insert(
        NonTerminal(0_u32),
        Categorical::new([(State::Terminal(Terminal(1_u32)), 1.0)]).expect("valid weights"),
    );
    transition_map.insert(
        NonTerminal(1_u32),
        Categorical::new([(State::Terminal(Terminal(0_u32)), 1.0)]).expect("valid weights"),
    );

    let err = FiniteMarkovProcess::from_wrapped(transition_map)
        .expect_err("state 1 is both terminal and a source");
    assert!(matches!(err, ChainError::InvalidTransitionMap { .. }));
}

#[test]
fn trace_starts_at_start_and_ends_at_terminal() {
    let process = coin_flip_process();
    let start = Constant::new(NonTerminal(0_u32));

    let states: Vec<State<u32>> = process
        .simulate(&start, 3)
        .take(1000)
        .collect::<Result<_, _>>()
        .expect("complete transition map");

    assert_eq!(states.first(), Some(&State::NonTerminal(NonTerminal(0))));
    assert!(states.last().expect("non-empty trace").is_terminal());
    assert!(
        states[..states.len() - 1]
            .iter()
            .all(|state| !state.is_terminal())
    );
}

#[test]
fn traces_with_equal_seeds_are_identical() {
    let process = coin_flip_process();
    let start = Constant::new(NonTerminal(0_u32));

    let trace_a: Vec<State<u32>> = process
        .simulate(&start, 42)
        .take(100)
        .collect::<Result<_, _>>()
        .expect("complete transition map");
    let trace_b: Vec<State<u32>> = process
        .simulate(&start, 42)
        .take(100)
        .collect::<Result<_, _>>()
        .expect("complete transition map");

    assert_eq!(trace_a, trace_b);
}

#[test]
fn trace_stream_restarts_with_fresh_seeds() {
    let process = coin_flip_process();
    let start = Constant::new(NonTerminal(0_u32));

    let lengths: Vec<usize> = process
        .traces(&start, 9)
        .take(10)
        .map(|trace| trace.take(1000).count())
        .collect();

    assert_eq!(lengths.len(), 10);
    assert!(lengths.iter().all(|&len| len >= 1));
}

#[test]
fn reward_trace_yields_every_transition_step() {
    let process = chain_reward_process();
    let start = Constant::new(NonTerminal(1_u32));

    let steps: Vec<TransitionStep<u32>> = process
        .simulate_reward(&start, 0)
        .collect::<Result<_, _>>()
        .expect("complete transition map");

    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0].state, NonTerminal(1));
    assert_eq!(steps[0].next_state, State::NonTerminal(NonTerminal(2)));
    assert_eq!(steps[0].reward, 1.0);
    assert_eq!(steps[1].next_state, State::Terminal(Terminal(3)));
    assert_eq!(steps[1].reward, 2.0);
}

#[test]
fn reward_process_exposes_state_marginal() {
    let process = chain_reward_process();
    let distribution = process
        .transition(&NonTerminal(1))
        .expect("state is a source");

    let mut rng = ChaCha8Rng::seed_from_u64(1);
    for _ in 0..8 {
        assert_eq!(
            distribution.sample(&mut rng),
            State::NonTerminal(NonTerminal(2))
        );
    }
}
