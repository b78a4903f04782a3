pub mod domains;
mod dynamic_programming;
mod error;
mod io;
mod model;

pub use dynamic_programming::{
    PolicyIteration, ValueFn, converge, evaluate_mrp, greedy_policy, policy_iteration,
    value_iteration, vf_close,
};
pub use error::ModelError;
pub use io::{build_yaml, load_yaml, save_yaml};
pub use model::{ActionSpec, ModelSpec, OutcomeSpec, StateSpec};
