use std::{fs, path::Path};

use crate::{ScenarioSpec, SimError};

/// Load and validate a scenario from YAML on disk.
pub fn load_yaml(path: impl AsRef<Path>) -> Result<ScenarioSpec, SimError> {
    let yaml = fs::read_to_string(path)?;
    from_yaml_str(&yaml)
}

/// Parse and validate a scenario from YAML text.
pub fn from_yaml_str(yaml: &str) -> Result<ScenarioSpec, SimError> {
    let spec: ScenarioSpec = serde_yaml::from_str(yaml)?;
    spec.validate()?;
    Ok(spec)
}

/// Serialize and write a scenario to YAML.
pub fn save_yaml(path: impl AsRef<Path>, spec: &ScenarioSpec) -> Result<(), SimError> {
    let yaml = serde_yaml::to_string(spec)?;
    fs::write(path, yaml)?;
    Ok(())
}
