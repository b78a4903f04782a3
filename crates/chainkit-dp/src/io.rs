use std::{fs, path::Path};

use chainkit_core::FiniteMarkovDecisionProcess;

use crate::{ModelError, ModelSpec};

/// Load a model spec from YAML on disk.
pub fn load_yaml(path: impl AsRef<Path>) -> Result<ModelSpec, ModelError> {
    let yaml = fs::read_to_string(path)?;
    let spec: ModelSpec = serde_yaml::from_str(&yaml)?;
    Ok(spec)
}

/// Load a YAML file and build the decision process it declares.
pub fn build_yaml(
    path: impl AsRef<Path>,
) -> Result<FiniteMarkovDecisionProcess<String, String>, ModelError> {
    let spec = load_yaml(path)?;
    spec.build()
}

/// Serialize and write a model spec to YAML.
pub fn save_yaml(path: impl AsRef<Path>, spec: &ModelSpec) -> Result<(), ModelError> {
    let yaml = serde_yaml::to_string(spec)?;
    fs::write(path, yaml)?;
    Ok(())
}
