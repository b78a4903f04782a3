use std::fmt::Debug;
use std::hash::Hash;

use indexmap::IndexMap;

use chainkit_core::{
    ActionMap, Categorical, FiniteDeterministicPolicy, FiniteDistribution,
    FiniteMarkovDecisionProcess, FiniteMarkovRewardProcess, NonTerminal, State,
};

/// Expected-return estimate for every non-terminal state, in the process's
/// state enumeration order.
pub type ValueFn<S> = IndexMap<NonTerminal<S>, f64>;

/// Convergence tolerance used for the policy-evaluation inner loop of
/// [`policy_iteration`].
const EVALUATION_TOLERANCE: f64 = 1e-10;

/// Drive an iterator until `done(previous, next)` holds, returning the last
/// element produced. Returns the final element of a finite iterator that
/// never satisfies `done`, or `None` for an empty one.
pub fn converge<T>(
    mut iter: impl Iterator<Item = T>,
    mut done: impl FnMut(&T, &T) -> bool,
) -> Option<T> {
    let mut previous = iter.next()?;

    for next in iter {
        if done(&previous, &next) {
            return Some(next);
        }
        previous = next;
    }

    Some(previous)
}

/// Sup-norm closeness predicate over two value functions.
pub fn vf_close<S>(a: &ValueFn<S>, b: &ValueFn<S>, tolerance: f64) -> bool
where
    S: Clone + Eq + Hash + Debug,
{
    a.iter()
        .all(|(state, value)| (value - b.get(state).copied().unwrap_or(0.0)).abs() <= tolerance)
}

/// Expected one-step return of an outcome table under a value function:
/// reward plus discounted continuation, zero continuation into terminals.
fn backup<S>(distribution: &Categorical<(State<S>, f64)>, vf: &ValueFn<S>, gamma: f64) -> f64
where
    S: Clone + Eq + Hash + Debug,
{
    let mut value = 0.0;
    for ((next, reward), p) in distribution.table() {
        let continuation = match next {
            State::NonTerminal(nt) => gamma * vf.get(nt).copied().unwrap_or(0.0),
            State::Terminal(_) => 0.0,
        };
        value += p * (reward + continuation);
    }

    value
}

fn zero_vf<'a, S>(states: impl Iterator<Item = &'a NonTerminal<S>>) -> ValueFn<S>
where
    S: Clone + Eq + Hash + Debug + 'a,
{
    states.map(|state| (state.clone(), 0.0)).collect()
}

/// Iterative policy evaluation: the unbounded sequence of Bellman
/// expectation sweeps for a finite reward process, starting from the zero
/// value function. Restart by calling again.
pub fn evaluate_mrp<'a, S>(
    mrp: &'a FiniteMarkovRewardProcess<S>,
    gamma: f64,
) -> impl Iterator<Item = ValueFn<S>> + 'a
where
    S: Clone + Eq + Hash + Debug,
{
    assert!((0.0..=1.0).contains(&gamma), "gamma must lie in [0, 1]");

    let mut sweep = 0_usize;
    std::iter::successors(Some(zero_vf(mrp.non_terminal_states())), move |vf| {
        sweep += 1;
        log::debug!("policy evaluation sweep {sweep}");

        let mut next = ValueFn::with_capacity(vf.len());
        for state in mrp.non_terminal_states() {
            let distribution = mrp
                .transition_reward_map(state)
                .expect("state enumerated from the same process");
            next.insert(state.clone(), backup(distribution, vf, gamma));
        }

        Some(next)
    })
}

/// Value iteration: the unbounded sequence of Bellman optimality sweeps for
/// a finite decision process, starting from the zero value function.
pub fn value_iteration<'a, S, A>(
    mdp: &'a FiniteMarkovDecisionProcess<S, A>,
    gamma: f64,
) -> impl Iterator<Item = ValueFn<S>> + 'a
where
    S: Clone + Eq + Hash + Debug,
    A: Clone + Eq + Hash + Debug,
{
    assert!((0.0..=1.0).contains(&gamma), "gamma must lie in [0, 1]");

    let mut sweep = 0_usize;
    std::iter::successors(Some(zero_vf(mdp.non_terminal_states())), move |vf| {
        sweep += 1;
        log::debug!("value iteration sweep {sweep}");

        let mut next = ValueFn::with_capacity(vf.len());
        for state in mdp.non_terminal_states() {
            let action_map = mdp
                .action_map(state)
                .expect("state enumerated from the same process");
            next.insert(state.clone(), best_action(action_map, vf, gamma).1);
        }

        Some(next)
    })
}

/// The greedy deterministic policy with respect to a value function. Ties
/// are broken in favour of the earliest action in enumeration order.
pub fn greedy_policy<S, A>(
    mdp: &FiniteMarkovDecisionProcess<S, A>,
    vf: &ValueFn<S>,
    gamma: f64,
) -> FiniteDeterministicPolicy<S, A>
where
    S: Clone + Eq + Hash + Debug,
    A: Clone + Eq + Hash + Debug,
{
    let choices = mdp.non_terminal_states().map(|state| {
        let action_map = mdp
            .action_map(state)
            .expect("state enumerated from the same process");
        (state.0.clone(), best_action(action_map, vf, gamma).0.clone())
    });

    FiniteDeterministicPolicy::deterministic(choices)
}

/// The highest-valued action of a non-empty action map and its q-value;
/// earlier actions win ties.
fn best_action<'m, S, A>(
    action_map: &'m ActionMap<S, A>,
    vf: &ValueFn<S>,
    gamma: f64,
) -> (&'m A, f64)
where
    S: Clone + Eq + Hash + Debug,
    A: Clone + Eq + Hash + Debug,
{
    let mut best: Option<(&A, f64)> = None;
    for (action, distribution) in action_map {
        let q = backup(distribution, vf, gamma);
        match best {
            Some((_, held)) if q <= held => {}
            _ => best = Some((action, q)),
        }
    }

    best.expect("action maps are non-empty by construction")
}

/// Policy iteration: alternate exact policy evaluation (through
/// [`FiniteMarkovDecisionProcess::apply_finite_policy`]) with greedy
/// improvement, yielding each evaluated value function together with the
/// policy improved on it. The first policy is greedy on the zero value
/// function.
pub fn policy_iteration<'a, S, A>(
    mdp: &'a FiniteMarkovDecisionProcess<S, A>,
    gamma: f64,
) -> PolicyIteration<'a, S, A>
where
    S: Clone + Eq + Hash + Debug,
    A: Clone + Eq + Hash + Debug,
{
    assert!((0.0..=1.0).contains(&gamma), "gamma must lie in [0, 1]");

    let zero = zero_vf(mdp.non_terminal_states());
    let policy = greedy_policy(mdp, &zero, gamma);

    PolicyIteration {
        mdp,
        gamma,
        policy,
        step: 0,
    }
}

/// Iterator state for [`policy_iteration`].
pub struct PolicyIteration<'a, S, A>
where
    S: Clone + Eq + Hash + Debug,
    A: Clone + Eq + Hash + Debug,
{
    mdp: &'a FiniteMarkovDecisionProcess<S, A>,
    gamma: f64,
    policy: FiniteDeterministicPolicy<S, A>,
    step: usize,
}

impl<S, A> Iterator for PolicyIteration<'_, S, A>
where
    S: Clone + Eq + Hash + Debug,
    A: Clone + Eq + Hash + Debug,
{
    type Item = (ValueFn<S>, FiniteDeterministicPolicy<S, A>);

    fn next(&mut self) -> Option<Self::Item> {
        self.step += 1;
        log::debug!("policy iteration step {}", self.step);

        let mrp = self
            .mdp
            .apply_finite_policy(&self.policy)
            .expect("greedy policies cover every state of the process");

        let vf = converge(evaluate_mrp(&mrp, self.gamma), |a, b| {
            vf_close(a, b, EVALUATION_TOLERANCE)
        })
        .expect("evaluation sequence is non-empty");

        let improved = greedy_policy(self.mdp, &vf, self.gamma);
        self.policy = improved.clone();

        Some((vf, improved))
    }
}
