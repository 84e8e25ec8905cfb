use anyhow::Result;
use o2ims_template::cli::Commands;
use o2ims_template::document::load_document_file;
use o2ims_template::keydiff::compare_keys;
use o2ims_template::linediff::{compare_yaml_files, DiffLine};
use std::path::PathBuf;

fn template(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data/templates")
        .join(name)
}

#[test]
fn test_compare_keys_between_template_versions() -> Result<()> {
    let first = load_document_file(&template("template-v1.yaml"))?;
    let second = load_document_file(&template("template-v2.yaml"))?;

    let report = compare_keys(&first, &second)?;

    assert_eq!(
        report.lines(),
        vec![
            "Added keys in templateParameters.clusterParams.ccd_env.: {'proxy'}",
            "Deleted keys in templateParameters.clusterParams.params.: {'dns'}",
            "Added keys in templateParameters.resourceParams.single-server-configuration.server.: {'vlan'}",
            "Deleted keys in templateParameters.resourceParams.single-server-configuration.server.: {'bmc_address'}",
            "Added keys in templateParameters.: {'networkParams'}",
        ]
    );

    // user_secrets is a mapping in v1 and a string in v2
    assert!(report.get("templateParameters.clusterParams.user_secrets.").is_none());
    assert!(report.lines().iter().all(|line| !line.contains("user_secrets")));
    Ok(())
}

#[test]
fn test_compare_keys_command_output() -> Result<()> {
    let cmd = Commands::CompareKeys {
        first: template("template-v2.yaml"),
        second: template("template-v1.yaml"),
    };
    let mut out = Vec::new();

    o2ims_template::run(&cmd, &mut out)?;

    let output = String::from_utf8(out)?;
    assert!(output.contains("Deleted keys in templateParameters.: {'networkParams'}\n"));
    assert!(output.contains("Added keys in templateParameters.clusterParams.params.: {'dns'}\n"));
    Ok(())
}

#[test]
fn test_compare_same_template_is_silent() -> Result<()> {
    let cmd = Commands::CompareKeys {
        first: template("template-v1.yaml"),
        second: template("template-v1.yaml"),
    };
    let mut out = Vec::new();

    o2ims_template::run(&cmd, &mut out)?;

    assert!(out.is_empty());
    Ok(())
}

#[test]
fn test_compare_keys_missing_file() {
    let cmd = Commands::CompareKeys {
        first: template("missing.yaml"),
        second: template("template-v1.yaml"),
    };
    let mut out = Vec::new();

    let err = o2ims_template::run(&cmd, &mut out).unwrap_err();

    assert!(err.to_string().starts_with("Failed to load"));
}

#[test]
fn test_line_diff_between_template_versions() -> Result<()> {
    let lines = compare_yaml_files(&template("template-v1.yaml"), &template("template-v2.yaml"))?;

    assert!(lines.contains(&DiffLine::Added("  networkParams:".to_string())));
    assert!(lines
        .iter()
        .any(|line| matches!(line, DiffLine::Removed(text) if text.contains("dns:"))));
    assert!(lines
        .iter()
        .any(|line| matches!(line, DiffLine::Added(text) if text.contains("/dev/sdb"))));
    assert!(lines.iter().all(|line| match line {
        DiffLine::Added(text) | DiffLine::Removed(text) => !text.contains("cluster_name"),
    }));
    Ok(())
}

#[test]
fn test_compare_command_prints_prefixed_lines() -> Result<()> {
    let cmd = Commands::Compare {
        first: template("template-v1.yaml"),
        second: template("template-v2.yaml"),
    };
    let mut out = Vec::new();

    o2ims_template::run(&cmd, &mut out)?;

    let output = String::from_utf8(out)?;
    assert!(!output.is_empty());
    assert!(output
        .lines()
        .all(|line| line.starts_with("+ ") || line.starts_with("- ")));
    Ok(())
}
