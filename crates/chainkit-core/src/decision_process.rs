use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

use indexmap::IndexMap;
use rand::RngCore;

use crate::distribution::{Categorical, Distribution, FiniteDistribution, Sampled};
use crate::error::ChainError;
use crate::policy::{FinitePolicy, Policy};
use crate::process::{validate_wrapping, wrap_state};
use crate::reward_process::{FiniteMarkovRewardProcess, MarkovRewardProcess};
use crate::state::{NonTerminal, State};

/// Outcome table for one action: a finite distribution over
/// `(successor state, reward)` pairs.
pub type StateReward<S> = Categorical<(State<S>, f64)>;

/// The legal actions at one state and their outcome tables, in insertion
/// order.
pub type ActionMap<S, A> = IndexMap<A, StateReward<S>>;

#[derive(Debug, Clone)]
/// A Markov decision process over finite state and action spaces: for every
/// non-terminal state, a non-empty map from action to an outcome table.
pub struct FiniteMarkovDecisionProcess<S, A>
where
    S: Clone + Eq + Hash + Debug,
    A: Clone + Eq + Hash + Debug,
{
    mapping: IndexMap<NonTerminal<S>, ActionMap<S, A>>,
}

impl<S, A> FiniteMarkovDecisionProcess<S, A>
where
    S: Clone + Eq + Hash + Debug,
    A: Clone + Eq + Hash + Debug,
{
    /// Build a decision process from a mapping over raw states. Keys become
    /// non-terminal; states appearing only in outcome supports are terminal.
    ///
    /// Fails with [`ChainError::InvalidMdp`] if any state maps to an empty
    /// action set.
    pub fn new(
        mapping: IndexMap<S, IndexMap<A, Categorical<(S, f64)>>>,
    ) -> Result<Self, ChainError> {
        let sources: HashSet<S> = mapping.keys().cloned().collect();

        let mut wrapped = IndexMap::with_capacity(mapping.len());
        for (source, action_map) in mapping {
            if action_map.is_empty() {
                return Err(ChainError::invalid_mdp(&source));
            }

            let action_map: ActionMap<S, A> = action_map
                .into_iter()
                .map(|(action, distribution)| {
                    let distribution =
                        distribution.map(|(next, reward)| (wrap_state(next, &sources), reward));
                    (action, distribution)
                })
                .collect();

            wrapped.insert(NonTerminal(source), action_map);
        }

        validate_wrapping(&wrapped, |action_map| {
            action_map
                .values()
                .flat_map(|distribution| distribution.table().iter().map(|((next, _), _)| next))
        })?;

        Ok(Self { mapping: wrapped })
    }

    /// The non-terminal states, complete and in insertion order.
    pub fn non_terminal_states(&self) -> impl Iterator<Item = &NonTerminal<S>> {
        self.mapping.keys()
    }

    /// The legal actions at `state`, in insertion order. Fails with
    /// [`ChainError::UnknownState`] rather than returning an empty sequence.
    pub fn actions(&self, state: &NonTerminal<S>) -> Result<impl Iterator<Item = &A>, ChainError> {
        Ok(self.action_map(state)?.keys())
    }

    /// The full action-to-outcome table for `state`.
    pub fn action_map(&self, state: &NonTerminal<S>) -> Result<&ActionMap<S, A>, ChainError> {
        self.mapping
            .get(state)
            .ok_or_else(|| ChainError::unknown_state(&state.0))
    }

    /// Combine with an arbitrary policy into a reward process whose
    /// transitions are drawn by two-stage sampling: an action from the
    /// policy, then an outcome from that action's table. Nothing is
    /// enumerated, so this works for any [`Policy`], at the cost of the
    /// result being a sampler rather than a table.
    pub fn apply_policy<'a, P>(&'a self, policy: &'a P) -> PolicyRewardProcess<'a, S, A, P>
    where
        P: Policy<S, A>,
    {
        PolicyRewardProcess { mdp: self, policy }
    }

    /// Combine with a finite policy into the exact finite reward process,
    /// marginalizing out the action: every `(successor, reward)` outcome
    /// accumulates `p_action * p_outcome`, and contributions from different
    /// actions to the same outcome are summed. Because the policy's action
    /// distribution and each outcome table individually sum to one, so does
    /// every combined distribution.
    pub fn apply_finite_policy<D>(
        &self,
        policy: &FinitePolicy<S, D>,
    ) -> Result<FiniteMarkovRewardProcess<S>, ChainError>
    where
        D: FiniteDistribution<A>,
    {
        let mut transition_map = IndexMap::with_capacity(self.mapping.len());

        for (state, action_map) in &self.mapping {
            let action_distribution = policy.act_finite(state)?;
            let mut outcomes: Vec<((State<S>, f64), f64)> = Vec::new();

            for (action, p_action) in action_distribution.table() {
                let outcome_distribution = action_map
                    .get(action)
                    .ok_or_else(|| ChainError::unknown_action(&state.0, action))?;

                for ((next, reward), p_outcome) in outcome_distribution.table() {
                    outcomes.push(((next.clone(), *reward), p_action * p_outcome));
                }
            }

            transition_map.insert(state.clone(), Categorical::new(outcomes)?);
        }

        FiniteMarkovRewardProcess::from_wrapped(transition_map)
    }
}

/// A reward process defined by a decision process and a policy, sampled in
/// two stages. Produced by
/// [`FiniteMarkovDecisionProcess::apply_policy`]; it holds references to
/// both and owns nothing itself.
pub struct PolicyRewardProcess<'a, S, A, P>
where
    S: Clone + Eq + Hash + Debug,
    A: Clone + Eq + Hash + Debug,
{
    mdp: &'a FiniteMarkovDecisionProcess<S, A>,
    policy: &'a P,
}

impl<S, A, P> MarkovRewardProcess<S> for PolicyRewardProcess<'_, S, A, P>
where
    S: Clone + Eq + Hash + Debug,
    A: Clone + Eq + Hash + Debug,
    P: Policy<S, A>,
{
    /// A sampled distribution: each draw samples an action from the policy,
    /// then a `(successor, reward)` pair from that action's outcome table.
    /// Each call is one independent draw from the true marginal, which is
    /// never materialized.
    ///
    /// Panics at draw time if the policy produces an action the decision
    /// process does not offer in `state`; such a pairing is malformed.
    fn transition_reward<'b>(
        &'b self,
        state: &NonTerminal<S>,
    ) -> Result<Box<dyn Distribution<(State<S>, f64)> + 'b>, ChainError> {
        let action_map = self.mdp.action_map(state)?;
        let action_distribution = self.policy.act(state)?;

        Ok(Box::new(Sampled::new(move |rng: &mut dyn RngCore| {
            let action = action_distribution.sample(rng);
            action_map
                .get(&action)
                .expect("policy action must be offered by the decision process")
                .sample(rng)
        })))
    }
}
