use indexmap::IndexMap;
use log::debug;
use serde_yaml::Value;
use std::fmt;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

pub type Sequence = Vec<Document>;
pub type Mapping = IndexMap<Key, Document>;

/// Scalar mapping key. `1` and `"1"` are different keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Null,
    Bool(bool),
    Number(String),
    String(String),
}

impl Key {
    /// Python-style literal: strings quoted, `None`, `True`, `False`.
    pub fn repr(&self) -> String {
        match self {
            Key::Null => "None".to_string(),
            Key::Bool(true) => "True".to_string(),
            Key::Bool(false) => "False".to_string(),
            Key::Number(n) => n.clone(),
            Key::String(s) => {
                let escaped = s.replace('\\', "\\\\");
                if s.contains('\'') && !s.contains('"') {
                    format!("\"{escaped}\"")
                } else {
                    format!("'{}'", escaped.replace('\'', "\\'"))
                }
            }
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Null => write!(f, "null"),
            Key::Bool(b) => write!(f, "{b}"),
            Key::Number(n) | Key::String(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::String(s.to_string())
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum Number {
    Int(i64),
    Float(f64),
}

#[derive(Debug, PartialEq, Clone)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

/// Parsed YAML document. Mapping keys keep their source order.
#[derive(Debug, PartialEq, Clone)]
pub enum Document {
    Mapping(Mapping),
    Sequence(Sequence),
    Scalar(Scalar),
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Unsupported mapping key, expected a scalar, got: {0}")]
    UnsupportedKey(&'static str),
    #[error("Duplicate mapping key: {0}")]
    DuplicateKey(Key),
    #[error("Invalid number format: {0}")]
    InvalidNumber(String),
}

impl Document {
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Document::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Document::Mapping(_) => "Mapping",
            Document::Sequence(_) => "Sequence",
            Document::Scalar(Scalar::Null) => "Null",
            Document::Scalar(Scalar::Bool(_)) => "Bool",
            Document::Scalar(Scalar::Number(_)) => "Number",
            Document::Scalar(Scalar::String(_)) => "String",
        }
    }
}

pub fn get_value_type(val: &Value) -> &'static str {
    match val {
        Value::String(_) => "String",
        Value::Null => "Null",
        Value::Bool(_) => "Bool",
        Value::Number(_) => "Number",
        Value::Sequence(_) => "Sequence",
        Value::Mapping(_) => "Mapping",
        Value::Tagged(_) => "Tagged",
    }
}

fn key_from_value(key: &Value) -> Result<Key, DocumentError> {
    match key {
        Value::String(s) => Ok(Key::String(s.clone())),
        Value::Null => Ok(Key::Null),
        Value::Bool(b) => Ok(Key::Bool(*b)),
        Value::Number(n) => Ok(Key::Number(n.to_string())),
        Value::Tagged(tagged) => key_from_value(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => {
            Err(DocumentError::UnsupportedKey(get_value_type(key)))
        }
    }
}

impl TryFrom<&Value> for Document {
    type Error = DocumentError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Null => Ok(Document::Scalar(Scalar::Null)),
            Value::Bool(b) => Ok(Document::Scalar(Scalar::Bool(*b))),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Document::Scalar(Scalar::Number(Number::Int(i))))
                } else if let Some(f) = n.as_f64() {
                    Ok(Document::Scalar(Scalar::Number(Number::Float(f))))
                } else {
                    Err(DocumentError::InvalidNumber(n.to_string()))
                }
            }
            Value::String(s) => Ok(Document::Scalar(Scalar::String(s.clone()))),
            Value::Sequence(s) => s
                .iter()
                .map(Document::try_from)
                .collect::<Result<Sequence, _>>()
                .map(Document::Sequence),
            Value::Mapping(m) => {
                let mut mapping = Mapping::with_capacity(m.len());
                for (k, v) in m {
                    let key = key_from_value(k)?;
                    if mapping.contains_key(&key) {
                        return Err(DocumentError::DuplicateKey(key));
                    }
                    mapping.insert(key, Document::try_from(v)?);
                }
                Ok(Document::Mapping(mapping))
            }
            Value::Tagged(tagged) => Document::try_from(&tagged.value),
        }
    }
}

pub fn load_document<R: Read>(reader: R) -> Result<Document, DocumentError> {
    let value: Value = serde_yaml::from_reader(reader)?;
    Document::try_from(&value)
}

pub fn load_document_file(path: &Path) -> Result<Document, DocumentError> {
    debug!("Loading YAML document: {}", path.display());
    let file = std::fs::File::open(path).map_err(|source| DocumentError::Io {
        path: path.display().to_string(),
        source,
    })?;
    load_document(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Cursor;

    #[test]
    fn test_load_nested_mapping() {
        let yaml_data = r#"
        a: 1
        b:
          c: two
          d: [1, 2.5, null]
        "#;

        let doc = load_document(Cursor::new(yaml_data)).unwrap();
        let root = doc.as_mapping().unwrap();

        assert_eq!(
            root.keys().collect::<Vec<_>>(),
            vec![&Key::from("a"), &Key::from("b")]
        );
        assert_eq!(
            root[&Key::from("a")],
            Document::Scalar(Scalar::Number(Number::Int(1)))
        );

        let b = root[&Key::from("b")].as_mapping().unwrap();
        assert_eq!(
            b[&Key::from("c")],
            Document::Scalar(Scalar::String("two".to_string()))
        );
        assert_eq!(
            b[&Key::from("d")],
            Document::Sequence(vec![
                Document::Scalar(Scalar::Number(Number::Int(1))),
                Document::Scalar(Scalar::Number(Number::Float(2.5))),
                Document::Scalar(Scalar::Null),
            ])
        );
    }

    #[test]
    fn test_non_string_keys_keep_their_type() {
        let yaml_data = "1: one\ntrue: yes\n~: nothing\n";

        let doc = load_document(Cursor::new(yaml_data)).unwrap();
        let keys: Vec<_> = doc.as_mapping().unwrap().keys().cloned().collect();

        assert_eq!(
            keys,
            vec![Key::Number("1".to_string()), Key::Bool(true), Key::Null]
        );
        let rendered: Vec<_> = keys.iter().map(Key::to_string).collect();
        assert_eq!(rendered, vec!["1", "true", "null"]);
    }

    #[test]
    fn test_composite_key_is_rejected() {
        let yaml_data = "? [a, b]\n: value\n";

        let result = load_document(Cursor::new(yaml_data));

        assert!(matches!(result, Err(DocumentError::UnsupportedKey("Sequence"))));
    }

    #[rstest]
    #[case("1: x\n\"1\": y\n", Key::Number("1".to_string()))]
    #[case("true: 1\n\"true\": 2\n", Key::Bool(true))]
    #[case("~: 1\n\"null\": 2\n", Key::Null)]
    fn test_typed_and_string_keys_stay_distinct(#[case] yaml_data: &str, #[case] typed: Key) {
        let doc = load_document(Cursor::new(yaml_data)).unwrap();
        let root = doc.as_mapping().unwrap();

        assert_eq!(root.len(), 2);
        let string_key = Key::String(typed.to_string());
        assert!(root.contains_key(&typed));
        assert!(root.contains_key(&string_key));
        assert_ne!(root[&typed], root[&string_key]);
    }

    #[test]
    fn test_tagged_key_colliding_with_plain_key_is_rejected() {
        let yaml_data = "!name a: 1\na: 2\n";

        let result = load_document(Cursor::new(yaml_data));

        let err = result.unwrap_err();
        assert!(matches!(err, DocumentError::DuplicateKey(Key::String(ref k)) if k == "a"));
    }

    #[rstest]
    #[case(Key::from("plain"), "'plain'")]
    #[case(Key::from("it's"), "\"it's\"")]
    #[case(Key::from("both ' and \""), "'both \\' and \"'")]
    #[case(Key::from("back\\slash"), "'back\\\\slash'")]
    #[case(Key::Number("1".to_string()), "1")]
    #[case(Key::Bool(false), "False")]
    #[case(Key::Null, "None")]
    fn test_key_repr(#[case] key: Key, #[case] expected: &str) {
        assert_eq!(key.repr(), expected);
    }

    #[test]
    fn test_tagged_value_is_unwrapped() {
        let yaml_data = "secret: !vault abc\n";

        let doc = load_document(Cursor::new(yaml_data)).unwrap();

        assert_eq!(
            doc.as_mapping().unwrap()[&Key::from("secret")],
            Document::Scalar(Scalar::String("abc".to_string()))
        );
    }

    #[test]
    fn test_invalid_yaml() {
        let invalid_yaml = "group1:\n  hosts: { invalid_yaml\n";

        let result = load_document(Cursor::new(invalid_yaml));

        assert!(matches!(result, Err(DocumentError::Yaml(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = load_document_file(Path::new("/nonexistent/template.yaml"));

        assert!(matches!(result, Err(DocumentError::Io { .. })));
    }

    #[test]
    fn test_kind() {
        assert_eq!(Document::Mapping(Mapping::new()).kind(), "Mapping");
        assert_eq!(Document::Sequence(Vec::new()).kind(), "Sequence");
        assert_eq!(Document::Scalar(Scalar::Bool(true)).kind(), "Bool");
    }
}
