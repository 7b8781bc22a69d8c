use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{AppError, Result};

const TEXT_KIND: &str = "text";

/// A node of the rich-text tree produced by the editor.
///
/// Anything that is neither a `"text"` leaf nor exposes a `children` array
/// is kept as `Opaque` so a single odd node never spoils the whole body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentNode {
    Text(String),
    Container {
        kind: String,
        children: Vec<DocumentNode>,
    },
    Opaque,
}

impl DocumentNode {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn container(kind: impl Into<String>, children: Vec<DocumentNode>) -> Self {
        Self::Container {
            kind: kind.into(),
            children,
        }
    }

    pub fn from_value(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::Opaque;
        };

        let kind = object.get("type").and_then(Value::as_str);

        // The leaf marker wins over a stray children array
        if kind == Some(TEXT_KIND) {
            return match object.get("text").and_then(Value::as_str) {
                Some(text) => Self::Text(text.to_string()),
                None => Self::Opaque,
            };
        }

        match object.get("children").and_then(Value::as_array) {
            Some(children) => Self::Container {
                kind: kind.unwrap_or_default().to_string(),
                children: children.iter().map(Self::from_value).collect(),
            },
            None => Self::Opaque,
        }
    }
}

impl<'de> Deserialize<'de> for DocumentNode {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

/// Parsed article body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub root: DocumentNode,
}

impl Document {
    /// Parse a serialized editor state (`{"root": {...}}`).
    pub fn parse(body: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| AppError::MalformedDocument(e.to_string()))?;

        // Bodies saved without the editor envelope are a bare root node
        let root = value.get("root").unwrap_or(&value);

        Ok(Self {
            root: DocumentNode::from_value(root),
        })
    }
}
