use std::fmt::Debug;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Error type for distribution, process, policy, and decision-process
/// construction and queries.
pub enum ChainError {
    #[error("no transition entry for state {state}")]
    UnknownState { state: String },

    #[error("no outcome entry for action {action} in state {state}")]
    UnknownAction { state: String, action: String },

    #[error("invalid distribution: {reason}")]
    InvalidDistribution { reason: String },

    #[error("invalid transition map: {reason}")]
    InvalidTransitionMap { reason: String },

    #[error("invalid decision process: state {state} has no actions")]
    InvalidMdp { state: String },
}

impl ChainError {
    pub(crate) fn unknown_state<S: Debug>(state: &S) -> Self {
        ChainError::UnknownState {
            state: format!("{state:?}"),
        }
    }

    pub(crate) fn unknown_action<S: Debug, A: Debug>(state: &S, action: &A) -> Self {
        ChainError::UnknownAction {
            state: format!("{state:?}"),
            action: format!("{action:?}"),
        }
    }

    pub(crate) fn invalid_mdp<S: Debug>(state: &S) -> Self {
        ChainError::InvalidMdp {
            state: format!("{state:?}"),
        }
    }
}
