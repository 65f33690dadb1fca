use std::fmt;

use serde_json::{Map, Value};

use crate::error::FormatError;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Parsed JSON metadata of a container.
///
/// Reads go through [`Node`], whose accessors fail with a [`ShapeError`]
/// naming the JSON path instead of yielding defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Value,
}

impl Document {
    /// Decodes UTF-8 JSON text. A leading byte order mark is skipped.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, FormatError> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        let text = std::str::from_utf8(bytes).map_err(|err| {
            FormatError::InvalidMetadataEncoding(format!("metadata is not UTF-8: {err}"))
        })?;
        let root = serde_json::from_str(text).map_err(|err| {
            FormatError::InvalidMetadataEncoding(format!("metadata is not valid JSON: {err}"))
        })?;
        Ok(Self { root })
    }

    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    pub fn value(&self) -> &Value {
        &self.root
    }

    /// Cursor positioned at the document root.
    pub fn root(&self) -> Node<'_> {
        Node {
            value: &self.root,
            path: String::from("$"),
        }
    }
}

/// Shape mismatch found while walking a [`Document`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShapeError {
    #[error("{path} is missing")]
    Missing { path: String },

    #[error("{path} is {found}, expected {expected}")]
    Mismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Borrowed position inside a [`Document`].
#[derive(Debug, Clone)]
pub struct Node<'a> {
    value: &'a Value,
    path: String,
}

impl<'a> Node<'a> {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn value(&self) -> &'a Value {
        self.value
    }

    pub fn kind(&self) -> Kind {
        Kind::of(self.value)
    }

    pub fn field(&self, key: &str) -> Result<Node<'a>, ShapeError> {
        let object = self.value.as_object().ok_or_else(|| self.mismatch(Kind::Object))?;
        let path = format!("{}.{key}", self.path);
        match object.get(key) {
            Some(value) => Ok(Node { value, path }),
            None => Err(ShapeError::Missing { path }),
        }
    }

    pub fn index(&self, index: usize) -> Result<Node<'a>, ShapeError> {
        let items = self.as_array()?;
        let path = format!("{}[{index}]", self.path);
        match items.get(index) {
            Some(value) => Ok(Node { value, path }),
            None => Err(ShapeError::Missing { path }),
        }
    }

    pub fn as_array(&self) -> Result<&'a [Value], ShapeError> {
        self.value
            .as_array()
            .map(Vec::as_slice)
            .ok_or_else(|| self.mismatch(Kind::Array))
    }

    /// Iterates the elements of an array node.
    pub fn items(&self) -> Result<impl Iterator<Item = Node<'a>> + '_, ShapeError> {
        let items = self.as_array()?;
        Ok(items.iter().enumerate().map(move |(index, value)| Node {
            value,
            path: format!("{}[{index}]", self.path),
        }))
    }

    pub fn as_object(&self) -> Result<&'a Map<String, Value>, ShapeError> {
        self.value
            .as_object()
            .ok_or_else(|| self.mismatch(Kind::Object))
    }

    pub fn as_str(&self) -> Result<&'a str, ShapeError> {
        self.value.as_str().ok_or_else(|| self.mismatch(Kind::String))
    }

    pub fn as_u64(&self) -> Result<u64, ShapeError> {
        self.value.as_u64().ok_or_else(|| self.mismatch(Kind::Number))
    }

    fn mismatch(&self, expected: Kind) -> ShapeError {
        ShapeError::Mismatch {
            path: self.path.clone(),
            expected: expected.name(),
            found: self.kind().name(),
        }
    }
}

/// Variant tag of a JSON value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Object,
    Array,
    String,
    Number,
    Bool,
    Null,
}

impl Kind {
    fn of(value: &Value) -> Self {
        match value {
            Value::Object(_) => Self::Object,
            Value::Array(_) => Self::Array,
            Value::String(_) => Self::String,
            Value::Number(_) => Self::Number,
            Value::Bool(_) => Self::Bool,
            Value::Null => Self::Null,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Object => "an object",
            Self::Array => "an array",
            Self::String => "a string",
            Self::Number => "a number",
            Self::Bool => "a boolean",
            Self::Null => "null",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Document {
        Document::from_value(json!({
            "asset": { "version": "2.0" },
            "meshes": [
                { "name": "Cube", "primitives": [{ "attributes": { "POSITION": 0 } }] }
            ]
        }))
    }

    #[test]
    fn walks_nested_fields() {
        let doc = sample();
        let name = doc
            .root()
            .field("meshes")
            .and_then(|meshes| meshes.index(0))
            .and_then(|mesh| mesh.field("name"))
            .and_then(|name| name.as_str().map(str::to_owned))
            .unwrap();
        assert_eq!(name, "Cube");

        let position = doc
            .root()
            .field("meshes")
            .unwrap()
            .index(0)
            .unwrap()
            .field("primitives")
            .unwrap()
            .index(0)
            .unwrap()
            .field("attributes")
            .unwrap()
            .field("POSITION")
            .unwrap();
        assert_eq!(position.as_u64().unwrap(), 0);
        assert_eq!(position.path(), "$.meshes[0].primitives[0].attributes.POSITION");
    }

    #[test]
    fn missing_field_reports_path() {
        let doc = sample();
        let err = doc.root().field("nodes").unwrap_err();
        assert_eq!(
            err,
            ShapeError::Missing {
                path: "$.nodes".into()
            }
        );
    }

    #[test]
    fn wrong_kind_is_a_mismatch() {
        let doc = sample();
        let err = doc.root().field("asset").unwrap().index(0).unwrap_err();
        assert_eq!(
            err,
            ShapeError::Mismatch {
                path: "$.asset".into(),
                expected: "an array",
                found: "an object",
            }
        );
    }

    #[test]
    fn items_carry_indexed_paths() {
        let doc = Document::from_slice(br#"{"list": [1, "two", null]}"#).unwrap();
        let list = doc.root().field("list").unwrap();
        let kinds: Vec<_> = list.items().unwrap().map(|node| node.kind()).collect();
        assert_eq!(kinds, vec![Kind::Number, Kind::String, Kind::Null]);
        let paths: Vec<_> = list
            .items()
            .unwrap()
            .map(|node| node.path().to_string())
            .collect();
        assert_eq!(paths[2], "$.list[2]");
    }

    #[test]
    fn object_accessor_rejects_other_kinds() {
        let doc = Document::from_slice(br#"{"items": [{"a": 1}, null, false, 3]}"#).unwrap();
        let items = doc.root().field("items").unwrap();
        assert_eq!(items.index(0).unwrap().as_object().unwrap().len(), 1);
        for index in 1..4 {
            let err = items.index(index).unwrap().as_object().unwrap_err();
            assert!(
                matches!(err, ShapeError::Mismatch { expected: "an object", .. }),
                "{err}"
            );
        }
    }

    #[test]
    fn skips_leading_byte_order_mark() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(br#"{"asset": {"version": "2.0"}}"#);
        let doc = Document::from_slice(&bytes).unwrap();
        let version = doc.root().field("asset").unwrap().field("version").unwrap();
        assert_eq!(version.as_str().unwrap(), "2.0");
    }

    #[test]
    fn rejects_invalid_utf8_and_json() {
        let err = Document::from_slice(&[0xff, 0xfe]).unwrap_err();
        assert_eq!(err.code(), "invalid-metadata-encoding");
        let err = Document::from_slice(b"{\"meshes\": [").unwrap_err();
        assert_eq!(err.code(), "invalid-metadata-encoding");
    }
}
