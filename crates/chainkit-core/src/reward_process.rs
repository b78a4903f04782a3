use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

use indexmap::IndexMap;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::distribution::{Categorical, Distribution, FiniteDistribution};
use crate::error::ChainError;
use crate::process::{MarkovProcess, validate_wrapping, wrap_state};
use crate::state::{NonTerminal, State};

/// A Markov process whose transitions also carry a scalar reward.
pub trait MarkovRewardProcess<S: Clone> {
    /// The distribution over `(successor state, reward)` pairs for `state`.
    fn transition_reward<'a>(
        &'a self,
        state: &NonTerminal<S>,
    ) -> Result<Box<dyn Distribution<(State<S>, f64)> + 'a>, ChainError>;

    /// One simulated path yielding each transition together with its reward,
    /// ending with the step into the first terminal state.
    fn simulate_reward<'a>(
        &'a self,
        start: &'a dyn Distribution<NonTerminal<S>>,
        seed: u64,
    ) -> RewardTrace<'a, S, Self>
    where
        Self: Sized,
    {
        RewardTrace {
            process: self,
            start,
            rng: ChaCha8Rng::seed_from_u64(seed),
            current: None,
            started: false,
            done: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// One sampled transition of a reward process.
pub struct TransitionStep<S> {
    pub state: NonTerminal<S>,
    pub next_state: State<S>,
    pub reward: f64,
}

/// Lazy iterator over the transition steps of one simulated path.
pub struct RewardTrace<'a, S, P: ?Sized> {
    process: &'a P,
    start: &'a dyn Distribution<NonTerminal<S>>,
    rng: ChaCha8Rng,
    current: Option<NonTerminal<S>>,
    started: bool,
    done: bool,
}

impl<S, P> Iterator for RewardTrace<'_, S, P>
where
    S: Clone,
    P: MarkovRewardProcess<S> + ?Sized,
{
    type Item = Result<TransitionStep<S>, ChainError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if !self.started {
            self.started = true;
            self.current = Some(self.start.sample(&mut self.rng));
        }

        let state = match self.current.take() {
            Some(state) => state,
            None => {
                self.done = true;
                return None;
            }
        };

        let distribution = match self.process.transition_reward(&state) {
            Ok(distribution) => distribution,
            Err(err) => {
                self.done = true;
                return Some(Err(err));
            }
        };

        let (next_state, reward) = distribution.sample(&mut self.rng);
        match &next_state {
            State::NonTerminal(nt) => self.current = Some(nt.clone()),
            State::Terminal(_) => self.done = true,
        }

        Some(Ok(TransitionStep {
            state,
            next_state,
            reward,
        }))
    }
}

#[derive(Debug, Clone)]
/// A Markov reward process over a finite state space, with the complete
/// transition-reward table held explicitly.
pub struct FiniteMarkovRewardProcess<S>
where
    S: Clone + Eq + Hash + Debug,
{
    transition_map: IndexMap<NonTerminal<S>, Categorical<(State<S>, f64)>>,
}

impl<S> FiniteMarkovRewardProcess<S>
where
    S: Clone + Eq + Hash + Debug,
{
    /// Build a finite reward process from a transition map over raw states.
    /// Keys become non-terminal; support-only states become terminal.
    pub fn new(transition_map: IndexMap<S, Categorical<(S, f64)>>) -> Result<Self, ChainError> {
        let sources: HashSet<S> = transition_map.keys().cloned().collect();

        let mut wrapped = IndexMap::with_capacity(transition_map.len());
        for (source, distribution) in transition_map {
            let distribution =
                distribution.map(|(next, reward)| (wrap_state(next, &sources), reward));
            wrapped.insert(NonTerminal(source), distribution);
        }

        Self::from_wrapped(wrapped)
    }

    /// Build from an already-wrapped transition map, validating wrapping
    /// consistency against the key set.
    pub fn from_wrapped(
        transition_map: IndexMap<NonTerminal<S>, Categorical<(State<S>, f64)>>,
    ) -> Result<Self, ChainError> {
        validate_wrapping(&transition_map, |distribution| {
            distribution.table().iter().map(|((next, _), _)| next)
        })?;

        Ok(Self { transition_map })
    }

    /// The non-terminal states, complete and in insertion order.
    pub fn non_terminal_states(&self) -> impl Iterator<Item = &NonTerminal<S>> {
        self.transition_map.keys()
    }

    /// The stored `(successor, reward)` distribution for `state`.
    pub fn transition_reward_map(
        &self,
        state: &NonTerminal<S>,
    ) -> Result<&Categorical<(State<S>, f64)>, ChainError> {
        self.transition_map
            .get(state)
            .ok_or_else(|| ChainError::unknown_state(&state.0))
    }
}

impl<S> MarkovRewardProcess<S> for FiniteMarkovRewardProcess<S>
where
    S: Clone + Eq + Hash + Debug,
{
    fn transition_reward<'a>(
        &'a self,
        state: &NonTerminal<S>,
    ) -> Result<Box<dyn Distribution<(State<S>, f64)> + 'a>, ChainError> {
        Ok(Box::new(self.transition_reward_map(state)?))
    }
}

impl<S> MarkovProcess<S> for FiniteMarkovRewardProcess<S>
where
    S: Clone + Eq + Hash + Debug,
{
    /// The successor-state marginal, with rewards dropped and any successors
    /// that differ only in reward merged.
    fn transition<'a>(
        &'a self,
        state: &NonTerminal<S>,
    ) -> Result<Box<dyn Distribution<State<S>> + 'a>, ChainError> {
        let marginal = self
            .transition_reward_map(state)?
            .clone()
            .map(|(next, _)| next);

        Ok(Box::new(marginal))
    }
}
