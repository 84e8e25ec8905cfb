//! Merges a config set directory into template parameters and a derived
//! provisioning request.
//!
//! Expected layout:
//!
//! ```text
//! ├── ccd_env.yaml
//! ├── cluster_config
//! │   └── input
//! │       └── params.yaml
//! ├── single-server-configuration.yaml
//! └── user-secrets.yaml
//! ```

use crate::linediff::canonicalize;
use indexmap::IndexMap;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const SINGLE_SERVER_CONFIGURATION_YAML: &str = "single-server-configuration.yaml";
pub const CCD_ENV_YAML: &str = "ccd_env.yaml";
pub const CLUSTER_CONFIG_INPUT_PARAMS_YAML: &str = "cluster_config/input/params.yaml";
pub const USER_SECRETS_YAML: &str = "user-secrets.yaml";

pub const REQUIRED_FILES: [&str; 4] = [
    CCD_ENV_YAML,
    CLUSTER_CONFIG_INPUT_PARAMS_YAML,
    SINGLE_SERVER_CONFIGURATION_YAML,
    USER_SECRETS_YAML,
];

#[derive(Debug, Error)]
pub enum ConfigSetError {
    #[error("{file} is missing in {dir}")]
    MissingFile { file: String, dir: String },
    #[error("Failed to read {file}: {source}")]
    Io {
        file: String,
        source: std::io::Error,
    },
    #[error("{file} is not a valid yaml file: {source}")]
    InvalidYaml {
        file: String,
        source: serde_yaml::Error,
    },
    #[error("{0} does not contain a 'params' field")]
    MissingParamsField(String),
    #[error("managed element {0} must be provided")]
    MissingManagedElementField(&'static str),
    #[error("Failed to serialize {file}: {source}")]
    Serialize {
        file: String,
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagedElement {
    pub product: String,
    #[serde(rename = "type")]
    pub element_type: String,
    pub software_version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisioningRequestSpec {
    pub template_name: String,
    pub template_version: String,
    pub description: String,
    pub template_parameters: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisioningRequest {
    pub api_version: String,
    pub kind: String,
    pub metadata: Metadata,
    pub spec: ProvisioningRequestSpec,
}

/// Identity of the managed element and the template it is provisioned from.
#[derive(Debug, Clone, PartialEq)]
pub struct ProvisioningConfig {
    pub name: String,
    pub description: String,
    pub api_version: String,
    pub kind: String,
    pub template_name: String,
    pub template_version: String,
}

impl ProvisioningConfig {
    pub fn validate(&self) -> Result<(), ConfigSetError> {
        if self.name.trim().is_empty() {
            return Err(ConfigSetError::MissingManagedElementField("name"));
        }
        if self.description.trim().is_empty() {
            return Err(ConfigSetError::MissingManagedElementField("description"));
        }
        Ok(())
    }

    pub fn provisioning_request(&self, template_params: &Value) -> ProvisioningRequest {
        let template_parameters = template_params
            .get("templateParameters")
            .cloned()
            .unwrap_or(Value::Null);

        ProvisioningRequest {
            api_version: self.api_version.clone(),
            kind: self.kind.clone(),
            metadata: Metadata {
                name: self.name.clone(),
            },
            spec: ProvisioningRequestSpec {
                template_name: self.template_name.clone(),
                template_version: self.template_version.clone(),
                description: self.description.clone(),
                template_parameters,
            },
        }
    }
}

/// Returns the first required file that does not exist under `directory`.
pub fn check_directory_structure(directory: &Path) -> Result<(), ConfigSetError> {
    for file in REQUIRED_FILES {
        if !directory.join(file).exists() {
            return Err(ConfigSetError::MissingFile {
                file: file.to_string(),
                dir: directory.display().to_string(),
            });
        }
    }
    Ok(())
}

fn load_yaml_files(directory: &Path) -> Result<IndexMap<&'static str, Value>, ConfigSetError> {
    let mut yaml_files = IndexMap::new();

    for file in REQUIRED_FILES {
        let path = directory.join(file);
        debug!("Loading config set file: {}", path.display());
        let content = std::fs::read_to_string(&path).map_err(|source| ConfigSetError::Io {
            file: file.to_string(),
            source,
        })?;
        let value: Value =
            serde_yaml::from_str(&content).map_err(|source| ConfigSetError::InvalidYaml {
                file: file.to_string(),
                source,
            })?;
        yaml_files.insert(file, value);
    }

    Ok(yaml_files)
}

fn mapping<const N: usize>(entries: [(&str, Value); N]) -> Value {
    Value::Mapping(
        entries
            .into_iter()
            .map(|(key, value)| (Value::String(key.to_string()), value))
            .collect(),
    )
}

/// Reads the config set in `directory` and assembles the template parameters
/// document for `managed_element`.
pub fn extract_yaml_files(
    directory: &Path,
    managed_element: &ManagedElement,
) -> Result<Value, ConfigSetError> {
    check_directory_structure(directory)?;
    let mut yaml_files = load_yaml_files(directory)?;
    let mut take = |file: &str| yaml_files.swap_remove(file).unwrap_or(Value::Null);

    let params = match take(CLUSTER_CONFIG_INPUT_PARAMS_YAML) {
        Value::Mapping(mut map) => map.remove("params"),
        _ => None,
    }
    .ok_or_else(|| {
        ConfigSetError::MissingParamsField(CLUSTER_CONFIG_INPUT_PARAMS_YAML.to_string())
    })?;

    let managed_element =
        serde_yaml::to_value(managed_element).map_err(|source| ConfigSetError::Serialize {
            file: "managed_element".to_string(),
            source,
        })?;

    info!("Formatting template parameters from {}", directory.display());
    Ok(mapping([(
        "templateParameters",
        mapping([
            (
                "resourceParams",
                mapping([
                    ("managed_element", managed_element),
                    (
                        "single-server-configuration",
                        take(SINGLE_SERVER_CONFIGURATION_YAML),
                    ),
                ]),
            ),
            (
                "clusterParams",
                mapping([
                    ("ccd_env", take(CCD_ENV_YAML)),
                    ("params", params),
                    ("user_secrets", take(USER_SECRETS_YAML)),
                ]),
            ),
        ]),
    )]))
}

/// Writes `document` as block-style YAML with sorted keys.
pub fn generate_template_param_file<T: Serialize>(
    document: &T,
    path: &Path,
) -> Result<(), ConfigSetError> {
    let serialize_error = |source| ConfigSetError::Serialize {
        file: path.display().to_string(),
        source,
    };
    let value = serde_yaml::to_value(document).map_err(serialize_error)?;
    let content = serde_yaml::to_string(&canonicalize(&value)).map_err(serialize_error)?;

    std::fs::write(path, content).map_err(|source| ConfigSetError::Io {
        file: path.display().to_string(),
        source,
    })?;
    info!("Wrote {}", path.display());
    Ok(())
}

/// `dir/templateParams.yaml` becomes `dir/templateParams_crd.yaml`.
pub fn crd_file_path(template_param_file: &Path) -> PathBuf {
    let stem = template_param_file
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    template_param_file.with_file_name(format!("{stem}_crd.yaml"))
}

/// Runs the whole conversion and returns the paths written.
pub fn configset_to_template(
    configset: &Path,
    template_param_file: &Path,
    managed_element: &ManagedElement,
    provisioning: &ProvisioningConfig,
) -> Result<(PathBuf, PathBuf), ConfigSetError> {
    provisioning.validate()?;

    let template_params = extract_yaml_files(configset, managed_element)?;
    generate_template_param_file(&template_params, template_param_file)?;

    let request = provisioning.provisioning_request(&template_params);
    let crd_path = crd_file_path(template_param_file);
    generate_template_param_file(&request, &crd_path)?;

    Ok((template_param_file.to_path_buf(), crd_path))
}
