use anyhow::{anyhow, Context, Result};
use indexmap::IndexMap;
use log::debug;
use serde::Deserialize;
use serde_yaml::Value;
use std::path::Path;

/// Values used when a flag is not given on the command line.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Defaults {
    pub product: String,
    #[serde(rename = "type")]
    pub element_type: String,
    pub software_version: String,
    pub api_version: String,
    pub kind: String,
    pub template_name: String,
    pub template_version: String,
}

pub struct ConfigManager {
    base_defs: IndexMap<String, Value>,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManager {
    pub fn new() -> Self {
        ConfigManager {
            base_defs: IndexMap::new(),
        }
    }

    /// Loads the built-in defaults, then the override file if one is given.
    pub fn init(&mut self, overrides: Option<&Path>) -> Result<()> {
        let builtin = read_config_map(include_str!("config/defaults.yaml"))?;
        self.base_defs.extend(builtin);

        if let Some(path) = overrides {
            debug!("Loading defaults override file: {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let override_map = read_config_map(&content)
                .with_context(|| format!("Invalid defaults file {}", path.display()))?;
            self.base_defs.extend(override_map);
        }

        Ok(())
    }

    pub fn defaults(&self) -> Result<Defaults> {
        let mapping: serde_yaml::Mapping = self
            .base_defs
            .iter()
            .map(|(key, value)| (Value::String(key.clone()), value.clone()))
            .collect();
        Ok(serde_yaml::from_value(Value::Mapping(mapping))?)
    }
}

fn read_config_map(yaml_content: &str) -> Result<IndexMap<String, Value>> {
    let value: Value = serde_yaml::from_str(yaml_content)?;

    value
        .as_mapping()
        .cloned()
        .ok_or_else(|| anyhow!("YAML root is not a mapping"))?
        .into_iter()
        .map(|(key, value)| {
            let key_str = key
                .as_str()
                .ok_or_else(|| anyhow!("YAML key is not a string"))?
                .to_string();
            Ok((key_str, value))
        })
        .collect::<Result<IndexMap<String, Value>>>()
}
