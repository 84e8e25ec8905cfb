pub mod cli;
pub mod config;
pub mod configset;
pub mod document;
pub mod keydiff;
pub mod linediff;

use crate::cli::{Commands, ConfigSetArgs};
use crate::config::ConfigManager;
use anyhow::{Context, Result};
use log::info;
use std::io::Write;
use std::path::Path;

pub fn run<W: Write>(cmd: &Commands, out: &mut W) -> Result<()> {
    match cmd {
        Commands::CompareKeys { first, second } => compare_keys_files(first, second, out),
        Commands::Compare { first, second } => {
            for line in linediff::compare_yaml_files(first, second)? {
                writeln!(out, "{line}")?;
            }
            Ok(())
        }
        Commands::ConfigsetToTemplate(args) => configset_to_template(args),
    }
}

fn compare_keys_files<W: Write>(first: &Path, second: &Path, out: &mut W) -> Result<()> {
    let first_doc = document::load_document_file(first)
        .with_context(|| format!("Failed to load {}", first.display()))?;
    let second_doc = document::load_document_file(second)
        .with_context(|| format!("Failed to load {}", second.display()))?;

    let report = keydiff::compare_keys(&first_doc, &second_doc)?;
    report.write_to(out)?;
    Ok(())
}

fn configset_to_template(args: &ConfigSetArgs) -> Result<()> {
    let mut manager = ConfigManager::new();
    manager.init(args.defaults.as_deref())?;
    let defaults = manager.defaults()?;

    let (template_file, crd_file) = configset::configset_to_template(
        &args.configset,
        &args.output,
        &args.managed_element(&defaults),
        &args.provisioning(&defaults),
    )?;

    info!(
        "Generated {} and {}",
        template_file.display(),
        crd_file.display()
    );
    Ok(())
}
