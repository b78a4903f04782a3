mod decision_process;
mod distribution;
mod error;
mod policy;
mod process;
mod reward_process;
mod state;

#[cfg(test)]
mod tests;

pub use decision_process::{
    ActionMap, FiniteMarkovDecisionProcess, PolicyRewardProcess, StateReward,
};
pub use distribution::{
    Categorical, Constant, Distribution, FiniteDistribution, PROB_TOLERANCE, Sampled,
};
pub use error::ChainError;
pub use policy::{FiniteDeterministicPolicy, FinitePolicy, Policy};
pub use process::{FiniteMarkovProcess, MarkovProcess, Trace, Traces};
pub use reward_process::{
    FiniteMarkovRewardProcess, MarkovRewardProcess, RewardTrace, TransitionStep,
};
pub use state::{NonTerminal, State, Terminal};
