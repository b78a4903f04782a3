use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use chainkit_core::{Categorical, FiniteMarkovDecisionProcess, PROB_TOLERANCE};

use crate::ModelError;

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Serializable decision-process schema with string state and action ids,
/// used for YAML IO and validation.
pub struct ModelSpec {
    /// Schema version for future compatibility checks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    /// All state declarations in the model.
    pub states: Vec<StateSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// A single state declaration in the model schema.
pub struct StateSpec {
    /// Unique state id.
    pub id: String,
    /// Whether this state is terminal (defaults to `false` if omitted).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminal: Option<bool>,
    /// Available actions from this state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<ActionSpec>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// A named action and its stochastic outcomes.
pub struct ActionSpec {
    pub id: String,
    pub outcomes: Vec<OutcomeSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// One probabilistic transition for an action.
pub struct OutcomeSpec {
    pub next: String,
    pub prob: f64,
    pub reward: f64,
}

impl ModelSpec {
    /// Validate schema invariants using the crate default tolerance.
    pub fn validate(&self) -> Result<(), ModelError> {
        self.validate_with_tolerance(PROB_TOLERANCE)
    }

    /// Validate ids, transitions, and probability constraints.
    pub fn validate_with_tolerance(&self, tolerance: f64) -> Result<(), ModelError> {
        // State ids must be unique.
        let mut ids = HashSet::with_capacity(self.states.len());
        for state in &self.states {
            if !ids.insert(state.id.clone()) {
                return Err(ModelError::DuplicateStateId {
                    id: state.id.clone(),
                });
            }
        }

        for state in &self.states {
            let terminal = state.terminal.unwrap_or(false);
            let actions = state.actions.as_deref().unwrap_or(&[]);

            if terminal && !actions.is_empty() {
                return Err(ModelError::TerminalStateHasActions {
                    state: state.id.clone(),
                });
            }

            if !terminal && actions.is_empty() {
                return Err(ModelError::MissingActions {
                    state: state.id.clone(),
                });
            }

            let mut action_ids = HashSet::with_capacity(actions.len());
            for action in actions {
                if !action_ids.insert(action.id.clone()) {
                    return Err(ModelError::DuplicateActionId {
                        state: state.id.clone(),
                        action: action.id.clone(),
                    });
                }

                if action.outcomes.is_empty() {
                    return Err(ModelError::EmptyOutcomes {
                        state: state.id.clone(),
                        action: action.id.clone(),
                    });
                }

                let mut sum = 0.0_f64;
                for (i, outcome) in action.outcomes.iter().enumerate() {
                    if !outcome.prob.is_finite() || outcome.prob < 0.0 {
                        return Err(ModelError::InvalidProbability {
                            state: state.id.clone(),
                            action: action.id.clone(),
                            outcome_index: i,
                            value: outcome.prob,
                        });
                    }

                    if !outcome.reward.is_finite() {
                        return Err(ModelError::InvalidReward {
                            state: state.id.clone(),
                            action: action.id.clone(),
                            outcome_index: i,
                            value: outcome.reward,
                        });
                    }

                    if !ids.contains(&outcome.next) {
                        return Err(ModelError::UnknownNextState {
                            state: state.id.clone(),
                            action: action.id.clone(),
                            next: outcome.next.clone(),
                        });
                    }

                    sum += outcome.prob;
                }

                // Outcome probabilities for an action must sum to 1 within tolerance.
                if (sum - 1.0).abs() > tolerance {
                    return Err(ModelError::ProbabilitySum {
                        state: state.id.clone(),
                        action: action.id.clone(),
                        sum,
                        tolerance,
                    });
                }
            }
        }

        Ok(())
    }

    /// Validate and build the finite decision process this schema declares.
    /// Terminal states appear only as transition targets.
    pub fn build(&self) -> Result<FiniteMarkovDecisionProcess<String, String>, ModelError> {
        self.validate()?;

        let mut mapping = IndexMap::new();
        for state in &self.states {
            if state.terminal.unwrap_or(false) {
                continue;
            }

            let mut action_map = IndexMap::new();
            for action in state.actions.as_deref().unwrap_or(&[]) {
                let outcomes = action
                    .outcomes
                    .iter()
                    .map(|outcome| ((outcome.next.clone(), outcome.reward), outcome.prob));
                action_map.insert(action.id.clone(), Categorical::new(outcomes)?);
            }

            mapping.insert(state.id.clone(), action_map);
        }

        Ok(FiniteMarkovDecisionProcess::new(mapping)?)
    }
}
