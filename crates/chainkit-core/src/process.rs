use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

use indexmap::IndexMap;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::distribution::{Categorical, Distribution, FiniteDistribution};
use crate::error::ChainError;
use crate::state::{NonTerminal, State, Terminal};

/// A Markov process: a distribution over successor states for every
/// non-terminal state.
pub trait MarkovProcess<S: Clone> {
    /// The successor-state distribution for `state`. Fails with
    /// [`ChainError::UnknownState`] if the process has no entry for it.
    fn transition<'a>(
        &'a self,
        state: &NonTerminal<S>,
    ) -> Result<Box<dyn Distribution<State<S>> + 'a>, ChainError>;

    /// One simulated path through the process, drawn with a deterministic
    /// seed. The trace yields the sampled start state and every successor,
    /// ending after the first terminal state; it is infinite if no terminal
    /// state is ever reached. Re-invoke to restart.
    fn simulate<'a>(
        &'a self,
        start: &'a dyn Distribution<NonTerminal<S>>,
        seed: u64,
    ) -> Trace<'a, S, Self>
    where
        Self: Sized,
    {
        Trace::new(self, start, seed)
    }

    /// An unbounded stream of fresh traces with seeds derived from `seed`.
    fn traces<'a>(
        &'a self,
        start: &'a dyn Distribution<NonTerminal<S>>,
        seed: u64,
    ) -> Traces<'a, S, Self>
    where
        Self: Sized,
    {
        Traces {
            process: self,
            start,
            seed,
            drawn: 0,
        }
    }
}

/// Lazy iterator over the states of one simulated path.
///
/// Items are `Ok(state)` in visit order; an error (possible only for
/// hand-written processes with incomplete transition maps) is yielded once
/// and ends the trace.
pub struct Trace<'a, S, P: ?Sized> {
    process: &'a P,
    start: &'a dyn Distribution<NonTerminal<S>>,
    rng: ChaCha8Rng,
    current: Option<NonTerminal<S>>,
    started: bool,
    done: bool,
}

impl<'a, S, P> Trace<'a, S, P>
where
    S: Clone,
    P: MarkovProcess<S> + ?Sized,
{
    pub(crate) fn new(
        process: &'a P,
        start: &'a dyn Distribution<NonTerminal<S>>,
        seed: u64,
    ) -> Self {
        Self {
            process,
            start,
            rng: ChaCha8Rng::seed_from_u64(seed),
            current: None,
            started: false,
            done: false,
        }
    }
}

impl<S, P> Iterator for Trace<'_, S, P>
where
    S: Clone,
    P: MarkovProcess<S> + ?Sized,
{
    type Item = Result<State<S>, ChainError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if !self.started {
            self.started = true;
            let first = self.start.sample(&mut self.rng);
            self.current = Some(first.clone());
            return Some(Ok(State::NonTerminal(first)));
        }

        let current = match self.current.take() {
            Some(state) => state,
            None => {
                self.done = true;
                return None;
            }
        };

        let distribution = match self.process.transition(&current) {
            Ok(distribution) => distribution,
            Err(err) => {
                self.done = true;
                return Some(Err(err));
            }
        };

        let next = distribution.sample(&mut self.rng);
        match &next {
            State::NonTerminal(nt) => self.current = Some(nt.clone()),
            State::Terminal(_) => self.done = true,
        }

        Some(Ok(next))
    }
}

/// Infinite iterator of independently seeded [`Trace`]s.
pub struct Traces<'a, S, P: ?Sized> {
    process: &'a P,
    start: &'a dyn Distribution<NonTerminal<S>>,
    seed: u64,
    drawn: u64,
}

impl<'a, S, P> Iterator for Traces<'a, S, P>
where
    S: Clone,
    P: MarkovProcess<S>,
{
    type Item = Trace<'a, S, P>;

    fn next(&mut self) -> Option<Self::Item> {
        let trace = Trace::new(self.process, self.start, self.seed.wrapping_add(self.drawn));
        self.drawn += 1;
        Some(trace)
    }
}

#[derive(Debug, Clone)]
/// A Markov process over a finite, fully enumerated state space, with the
/// complete transition table held explicitly.
pub struct FiniteMarkovProcess<S>
where
    S: Clone + Eq + Hash + Debug,
{
    transition_map: IndexMap<NonTerminal<S>, Categorical<State<S>>>,
}

impl<S> FiniteMarkovProcess<S>
where
    S: Clone + Eq + Hash + Debug,
{
    /// Build a finite process from a transition map over raw states.
    ///
    /// Every key becomes a non-terminal state; a state appearing only in
    /// distribution supports is terminal.
    pub fn new(transition_map: IndexMap<S, Categorical<S>>) -> Result<Self, ChainError> {
        let sources: HashSet<S> = transition_map.keys().cloned().collect();

        let mut wrapped = IndexMap::with_capacity(transition_map.len());
        for (source, distribution) in transition_map {
            let distribution = distribution.map(|next| wrap_state(next, &sources));
            wrapped.insert(NonTerminal(source), distribution);
        }

        Self::from_wrapped(wrapped)
    }

    /// Build a finite process from an already-wrapped transition map,
    /// validating that the wrapping is consistent with the key set: a
    /// non-terminal successor must itself be a transition source, and a
    /// terminal successor must not be one.
    pub fn from_wrapped(
        transition_map: IndexMap<NonTerminal<S>, Categorical<State<S>>>,
    ) -> Result<Self, ChainError> {
        validate_wrapping(&transition_map, |distribution| {
            distribution.table().iter().map(|(next, _)| next)
        })?;

        Ok(Self { transition_map })
    }

    /// The non-terminal states, complete and in insertion order.
    pub fn non_terminal_states(&self) -> impl Iterator<Item = &NonTerminal<S>> {
        self.transition_map.keys()
    }

    /// The stored successor-state distribution for `state`.
    pub fn transition_map(
        &self,
        state: &NonTerminal<S>,
    ) -> Result<&Categorical<State<S>>, ChainError> {
        self.transition_map
            .get(state)
            .ok_or_else(|| ChainError::unknown_state(&state.0))
    }
}

impl<S> MarkovProcess<S> for FiniteMarkovProcess<S>
where
    S: Clone + Eq + Hash + Debug,
{
    fn transition<'a>(
        &'a self,
        state: &NonTerminal<S>,
    ) -> Result<Box<dyn Distribution<State<S>> + 'a>, ChainError> {
        Ok(Box::new(self.transition_map(state)?))
    }
}

/// Wrap a raw successor state against the set of transition sources.
pub(crate) fn wrap_state<S>(state: S, sources: &HashSet<S>) -> State<S>
where
    S: Eq + Hash,
{
    if sources.contains(&state) {
        State::NonTerminal(NonTerminal(state))
    } else {
        State::Terminal(Terminal(state))
    }
}

/// Check every successor state in every stored distribution against the
/// transition-map key set.
pub(crate) fn validate_wrapping<'a, S, V, I>(
    transition_map: &'a IndexMap<NonTerminal<S>, V>,
    successors: impl Fn(&'a V) -> I,
) -> Result<(), ChainError>
where
    S: Clone + Eq + Hash + Debug + 'a,
    V: 'a,
    I: Iterator<Item = &'a State<S>>,
{
    for distribution in transition_map.values() {
        for next in successors(distribution) {
            match next {
                State::NonTerminal(nt) if !transition_map.contains_key(nt) => {
                    return Err(ChainError::InvalidTransitionMap {
                        reason: format!(
                            "successor {:?} is wrapped non-terminal but is not a transition source",
                            nt.0
                        ),
                    });
                }
                State::Terminal(Terminal(s))
                    if transition_map.contains_key(&NonTerminal(s.clone())) =>
                {
                    return Err(ChainError::InvalidTransitionMap {
                        reason: format!(
                            "state {s:?} appears both as terminal and as a transition source"
                        ),
                    });
                }
                _ => {}
            }
        }
    }

    Ok(())
}
