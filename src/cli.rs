use crate::config::Defaults;
use crate::configset::{ManagedElement, ProvisioningConfig};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Report keys added and deleted between two templates, per nesting path
    CompareKeys {
        /// first template file
        #[arg(value_name = "FILE")]
        first: PathBuf,

        /// second template file
        #[arg(value_name = "FILE")]
        second: PathBuf,
    },
    /// Print lines added and removed between two YAML files after re-serializing them
    Compare {
        #[arg(value_name = "FILE")]
        first: PathBuf,

        #[arg(value_name = "FILE")]
        second: PathBuf,
    },
    /// Merge a config set directory into template parameters and a provisioning request
    ConfigsetToTemplate(ConfigSetArgs),
}

#[derive(Args, Debug)]
pub struct ConfigSetArgs {
    /// managed element name
    #[arg(short, long)]
    pub name: String,

    /// managed element description
    #[arg(short, long)]
    pub description: String,

    /// path to the config set directory
    #[arg(short, long, value_name = "DIR", default_value = "./configset")]
    pub configset: PathBuf,

    /// template param file to write, the provisioning request is written next to it
    #[arg(short, long, value_name = "FILE", default_value = "./templateParams.yaml")]
    pub output: PathBuf,

    #[arg(long)]
    pub product: Option<String>,

    #[arg(long = "type", value_name = "TYPE")]
    pub element_type: Option<String>,

    #[arg(long)]
    pub software_version: Option<String>,

    #[arg(long)]
    pub template_name: Option<String>,

    #[arg(long)]
    pub template_version: Option<String>,

    /// YAML file overriding the built-in defaults
    #[arg(long, value_name = "FILE")]
    pub defaults: Option<PathBuf>,
}

impl ConfigSetArgs {
    pub fn managed_element(&self, defaults: &Defaults) -> ManagedElement {
        ManagedElement {
            product: or_default(&self.product, &defaults.product),
            element_type: or_default(&self.element_type, &defaults.element_type),
            software_version: or_default(&self.software_version, &defaults.software_version),
        }
    }

    pub fn provisioning(&self, defaults: &Defaults) -> ProvisioningConfig {
        ProvisioningConfig {
            name: self.name.clone(),
            description: self.description.clone(),
            api_version: defaults.api_version.clone(),
            kind: defaults.kind.clone(),
            template_name: or_default(&self.template_name, &defaults.template_name),
            template_version: or_default(&self.template_version, &defaults.template_version),
        }
    }
}

fn or_default(value: &Option<String>, default: &str) -> String {
    value.clone().unwrap_or_else(|| default.to_string())
}
