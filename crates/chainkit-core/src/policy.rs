use std::fmt::Debug;
use std::hash::Hash;

use indexmap::IndexMap;

use crate::distribution::{Constant, Distribution, FiniteDistribution};
use crate::error::ChainError;
use crate::state::NonTerminal;

/// A policy: what a decision-maker does at each non-terminal state,
/// expressed as a distribution over actions.
pub trait Policy<S, A> {
    /// The action distribution for `state`. Fails with
    /// [`ChainError::UnknownState`] if the policy does not cover it; a
    /// decision process paired with a policy that lacks coverage is
    /// malformed, so this is not recoverable.
    fn act<'a>(
        &'a self,
        state: &NonTerminal<S>,
    ) -> Result<Box<dyn Distribution<A> + 'a>, ChainError>;
}

#[derive(Debug, Clone, PartialEq)]
/// A policy over finite state and action spaces, stored as an explicit map
/// from state to a finite action distribution.
pub struct FinitePolicy<S, D>
where
    S: Clone + Eq + Hash + Debug,
{
    policy_map: IndexMap<S, D>,
}

/// A finite policy that picks a single fixed action per state.
pub type FiniteDeterministicPolicy<S, A> = FinitePolicy<S, Constant<A>>;

impl<S, D> FinitePolicy<S, D>
where
    S: Clone + Eq + Hash + Debug,
{
    pub fn new(policy_map: IndexMap<S, D>) -> Self {
        Self { policy_map }
    }

    /// The stored action distribution for `state`.
    pub fn act_finite(&self, state: &NonTerminal<S>) -> Result<&D, ChainError> {
        self.policy_map
            .get(&state.0)
            .ok_or_else(|| ChainError::unknown_state(&state.0))
    }

    /// The covered states and their action distributions, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&S, &D)> {
        self.policy_map.iter()
    }
}

impl<S, A> FiniteDeterministicPolicy<S, A>
where
    S: Clone + Eq + Hash + Debug,
    A: Clone,
{
    /// Build the deterministic policy choosing `action` at each listed state.
    pub fn deterministic(choices: impl IntoIterator<Item = (S, A)>) -> Self {
        let policy_map = choices
            .into_iter()
            .map(|(state, action)| (state, Constant::new(action)))
            .collect();

        Self { policy_map }
    }

    /// The single action chosen at `state`.
    pub fn action_for(&self, state: &NonTerminal<S>) -> Result<&A, ChainError> {
        Ok(self.act_finite(state)?.value())
    }
}

impl<S, A, D> Policy<S, A> for FinitePolicy<S, D>
where
    S: Clone + Eq + Hash + Debug,
    D: FiniteDistribution<A>,
{
    fn act<'a>(
        &'a self,
        state: &NonTerminal<S>,
    ) -> Result<Box<dyn Distribution<A> + 'a>, ChainError> {
        Ok(Box::new(self.act_finite(state)?))
    }
}
