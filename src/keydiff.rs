//! Structural key diff between two YAML documents.
//!
//! Only key presence is compared. A key shared by both mappings is descended
//! into when its value is a mapping on both sides; any other shared key is a
//! leaf and its value is never inspected. In particular a key that holds a
//! mapping on one side and a scalar or sequence on the other is not reported
//! at all.
//!
//! Key sets render like Python set literals; non-string keys appear in paths
//! as their YAML text.

use crate::document::{Document, Key, Mapping};
use log::debug;
use std::collections::BTreeSet;
use std::fmt;
use std::io::Write;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    First,
    Second,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::First => write!(f, "first"),
            Side::Second => write!(f, "second"),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum KeyDiffError {
    #[error("Type mismatch at path \"{path}\": {side} document should be a mapping, got: {found}")]
    TypeMismatch {
        path: String,
        side: Side,
        found: &'static str,
    },
}

/// Added and removed keys at one path.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PathDiff {
    pub path: String,
    pub added: BTreeSet<Key>,
    pub removed: BTreeSet<Key>,
}

impl PathDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Every visited path in post-order, deepest paths first.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DiffReport {
    pub entries: Vec<PathDiff>,
}

impl DiffReport {
    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(PathDiff::is_empty)
    }

    pub fn get(&self, path: &str) -> Option<&PathDiff> {
        self.entries.iter().find(|entry| entry.path == path)
    }

    pub fn paths(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.path.as_str()).collect()
    }

    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for entry in &self.entries {
            if !entry.added.is_empty() {
                lines.push(format!(
                    "Added keys in {}: {}",
                    entry.path,
                    format_key_set(&entry.added)
                ));
            }
            if !entry.removed.is_empty() {
                lines.push(format!(
                    "Deleted keys in {}: {}",
                    entry.path,
                    format_key_set(&entry.removed)
                ));
            }
        }
        lines
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        for line in self.lines() {
            writeln!(out, "{line}")?;
        }
        Ok(())
    }
}

impl fmt::Display for DiffReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.lines() {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

fn format_key_set(keys: &BTreeSet<Key>) -> String {
    let quoted: Vec<String> = keys.iter().map(Key::repr).collect();
    format!("{{{}}}", quoted.join(", "))
}

fn expect_mapping<'a>(
    doc: &'a Document,
    path: &str,
    side: Side,
) -> Result<&'a Mapping, KeyDiffError> {
    doc.as_mapping().ok_or_else(|| KeyDiffError::TypeMismatch {
        path: path.to_string(),
        side,
        found: doc.kind(),
    })
}

/// Compares the keys of two documents starting at the root path.
pub fn compare_keys(first: &Document, second: &Document) -> Result<DiffReport, KeyDiffError> {
    compare_keys_at(first, second, "")
}

/// Compares the keys of two documents that sit at `path`. Both must be
/// mappings, otherwise `TypeMismatch` is returned before anything is compared.
pub fn compare_keys_at(
    first: &Document,
    second: &Document,
    path: &str,
) -> Result<DiffReport, KeyDiffError> {
    let first = expect_mapping(first, path, Side::First)?;
    let second = expect_mapping(second, path, Side::Second)?;

    let mut report = DiffReport::default();
    walk(first, second, path, &mut report);
    Ok(report)
}

fn walk(first: &Mapping, second: &Mapping, path: &str, report: &mut DiffReport) {
    let first_keys: BTreeSet<&Key> = first.keys().collect();
    let second_keys: BTreeSet<&Key> = second.keys().collect();

    let added: BTreeSet<Key> = second_keys
        .difference(&first_keys)
        .map(|key| (*key).clone())
        .collect();
    let removed: BTreeSet<Key> = first_keys
        .difference(&second_keys)
        .map(|key| (*key).clone())
        .collect();

    for key in first_keys.intersection(&second_keys) {
        if let (Some(Document::Mapping(a)), Some(Document::Mapping(b))) =
            (first.get(*key), second.get(*key))
        {
            let child_path = format!("{path}{key}.");
            debug!("Descending into {child_path}");
            walk(a, b, &child_path, report);
        }
    }

    report.entries.push(PathDiff {
        path: path.to_string(),
        added,
        removed,
    });
}
