//! Block identity and the property bag handed to block components.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::FrameError;

/// Which third-party component to load
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockIdentity {
    pub owner: String,
    pub repo: String,
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Navigational context: `owner`, `repo`, `path`, `sha`, plus whatever else
/// the host sends. Kept as a map so unknown fields survive merging.
pub type Context = Map<String, Value>;

/// Properties for the rendered block: identity, context and block-specific fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Properties(Map<String, Value>);

impl Properties {
    pub fn from_value(value: Value) -> Result<Self, FrameError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(FrameError::InvalidProps(format!(
                "expected an object, got {}",
                json_kind(&other)
            ))),
        }
    }

    pub fn block(&self) -> Result<BlockIdentity, FrameError> {
        let block = self
            .0
            .get("block")
            .ok_or_else(|| FrameError::InvalidProps("missing 'block'".to_string()))?;
        BlockIdentity::deserialize(block)
            .map_err(|e| FrameError::InvalidProps(format!("invalid 'block': {}", e)))
    }

    pub fn context(&self) -> Option<&Context> {
        self.0.get("context").and_then(Value::as_object)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Replace the `content` field.
    pub fn set_content(&mut self, content: Value) {
        self.0.insert("content".to_string(), content);
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_block_identity() {
        let props = Properties::from_value(json!({
            "block": {"owner": "o", "repo": "r", "id": "1", "type": "file"},
            "content": "hi"
        }))
        .unwrap();
        let block = props.block().unwrap();
        assert_eq!(block.owner, "o");
        assert_eq!(block.kind, "file");
        assert_eq!(props.get("content"), Some(&json!("hi")));
    }

    #[test]
    fn test_missing_block() {
        let props = Properties::from_value(json!({"content": "hi"})).unwrap();
        assert!(matches!(props.block(), Err(FrameError::InvalidProps(_))));
    }

    #[test]
    fn test_rejects_non_object() {
        let err = Properties::from_value(json!([1, 2])).unwrap_err();
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn test_set_content() {
        let mut props = Properties::from_value(json!({"content": "old", "path": "a.md"})).unwrap();
        props.set_content(json!("new"));
        assert_eq!(props.to_value(), json!({"content": "new", "path": "a.md"}));
    }
}
