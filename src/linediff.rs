use crate::document::get_value_type;
use anyhow::{Context, Result};
use log::debug;
use serde_yaml::{Mapping, Value};
use similar::{ChangeTag, TextDiff};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffLine {
    Added(String),
    Removed(String),
}

impl fmt::Display for DiffLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffLine::Added(line) => write!(f, "+ {line}"),
            DiffLine::Removed(line) => write!(f, "- {line}"),
        }
    }
}

fn sort_key(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_else(|_| get_value_type(other).to_string()),
    }
}

/// Returns a copy of `value` with every mapping's keys sorted.
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Mapping(map) => {
            let mut entries: Vec<(&Value, &Value)> = map.iter().collect();
            entries.sort_by_cached_key(|(key, _)| sort_key(key));

            let mut sorted = Mapping::with_capacity(entries.len());
            for (key, val) in entries {
                sorted.insert(key.clone(), canonicalize(val));
            }
            Value::Mapping(sorted)
        }
        Value::Sequence(seq) => Value::Sequence(seq.iter().map(canonicalize).collect()),
        Value::Tagged(tagged) => {
            let mut tagged = (**tagged).clone();
            tagged.value = canonicalize(&tagged.value);
            Value::Tagged(Box::new(tagged))
        }
        scalar => scalar.clone(),
    }
}

/// Serializes `value` in block style with sorted keys.
pub fn to_canonical_string(value: &Value) -> Result<String> {
    Ok(serde_yaml::to_string(&canonicalize(value))?)
}

/// Diffs two YAML texts line by line after canonical re-serialization and
/// returns only the inserted and deleted lines.
pub fn compare_yaml(first: &str, second: &str) -> Result<Vec<DiffLine>> {
    let first: Value = serde_yaml::from_str(first).context("first document is not valid YAML")?;
    let second: Value =
        serde_yaml::from_str(second).context("second document is not valid YAML")?;

    let first = to_canonical_string(&first)?;
    let second = to_canonical_string(&second)?;

    let diff = TextDiff::from_lines(first.as_str(), second.as_str());
    let lines = diff
        .iter_all_changes()
        .filter_map(|change| {
            let text = change.value().trim_end_matches(['\r', '\n']).to_string();
            match change.tag() {
                ChangeTag::Insert => Some(DiffLine::Added(text)),
                ChangeTag::Delete => Some(DiffLine::Removed(text)),
                ChangeTag::Equal => None,
            }
        })
        .collect::<Vec<_>>();

    debug!("Line diff produced {} changed lines", lines.len());
    Ok(lines)
}

pub fn compare_yaml_files(first: &Path, second: &Path) -> Result<Vec<DiffLine>> {
    let first_text = std::fs::read_to_string(first)
        .with_context(|| format!("Failed to read {}", first.display()))?;
    let second_text = std::fs::read_to_string(second)
        .with_context(|| format!("Failed to read {}", second.display()))?;
    compare_yaml(&first_text, &second_text)
}
