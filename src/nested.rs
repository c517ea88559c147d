//! Nested block frames.
//!
//! A hosted block can render another block through the `BlockComponent` prop.
//! The child runs in its own sandboxed iframe whose URL fragment carries the
//! child's identity and context.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FrameError;
use crate::props::{BlockIdentity, Context};

/// Revision pointer meaning "latest"
pub const LATEST_SHA: &str = "HEAD";

/// Sandbox permissions for nested frames: no top-level navigation, no popups
pub const NESTED_SANDBOX: &str = "allow-scripts allow-same-origin allow-forms allow-downloads";

/// Characters `encodeURIComponent` escapes
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Merge a child's context over its parent's.
///
/// When the merged owner/repo differs from the parent's, the parent's `sha`
/// may not exist in the other repository, so it is replaced with the child's
/// own non-empty `sha` or [`LATEST_SHA`].
pub fn merge_context(parent: &Context, child: &Context) -> Context {
    let mut merged = parent.clone();
    for (key, value) in child {
        merged.insert(key.clone(), value.clone());
    }

    if repo_key(parent) != repo_key(&merged) {
        let sha = child
            .get("sha")
            .filter(|sha| is_truthy(sha))
            .cloned()
            .unwrap_or_else(|| Value::String(LATEST_SHA.to_string()));
        merged.insert("sha".to_string(), sha);
    }
    merged
}

fn repo_key(context: &Context) -> (Option<&Value>, Option<&Value>) {
    (context.get("owner"), context.get("repo"))
}

/// JavaScript truthiness of a JSON value
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().map(|n| n != 0.0).unwrap_or(true),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// What a nested frame's URL fragment carries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameTarget {
    pub block: BlockIdentity,
    pub context: Context,
}

impl FrameTarget {
    /// `encodeURIComponent(JSON.stringify({block, context}))`
    pub fn fragment(&self) -> Result<String, FrameError> {
        let json = serde_json::to_string(self)?;
        Ok(utf8_percent_encode(&json, URI_COMPONENT).to_string())
    }

    /// Parse a location hash (with or without the leading `#`).
    pub fn decode_fragment(hash: &str) -> Result<Self, FrameError> {
        let encoded = hash.strip_prefix('#').unwrap_or(hash);
        let json = percent_decode_str(encoded)
            .decode_utf8()
            .map_err(|e| FrameError::InvalidMessage(format!("fragment is not UTF-8: {}", e)))?;
        Ok(serde_json::from_str(&json)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameStyle {
    pub width: &'static str,
    pub height: &'static str,
    pub border: u8,
}

/// Attributes of the iframe element rendered for a nested block
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NestedFrame {
    pub src: String,
    pub sandbox: &'static str,
    pub style: FrameStyle,
}

impl NestedFrame {
    pub fn new(block: BlockIdentity, context: Context) -> Result<Self, FrameError> {
        let fragment = FrameTarget { block, context }.fragment()?;
        Ok(Self {
            src: format!("/#{}", fragment),
            sandbox: NESTED_SANDBOX,
            style: FrameStyle {
                width: "100%",
                height: "100%",
                border: 0,
            },
        })
    }

    /// Build the frame for a child block rendered by a parent viewing `parent`.
    pub fn for_child(
        parent: &Context,
        block: BlockIdentity,
        child: &Context,
    ) -> Result<Self, FrameError> {
        Self::new(block, merge_context(parent, child))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx(value: Value) -> Context {
        value.as_object().cloned().unwrap()
    }

    fn block() -> BlockIdentity {
        BlockIdentity {
            owner: "b".into(),
            repo: "y".into(),
            id: "viewer".into(),
            kind: "file".into(),
        }
    }

    #[test]
    fn test_cross_repo_resets_sha() {
        let parent = ctx(json!({"owner": "a", "repo": "x", "sha": "S", "path": "README.md"}));
        let child = ctx(json!({"owner": "b", "repo": "y"}));
        let merged = merge_context(&parent, &child);
        assert_eq!(merged["sha"], json!(LATEST_SHA));
        assert_eq!(merged["owner"], json!("b"));
        assert_eq!(merged["path"], json!("README.md"));
    }

    #[test]
    fn test_cross_repo_keeps_child_sha() {
        let parent = ctx(json!({"owner": "a", "repo": "x", "sha": "S"}));
        let child = ctx(json!({"owner": "b", "repo": "y", "sha": "T"}));
        assert_eq!(merge_context(&parent, &child)["sha"], json!("T"));
    }

    #[test]
    fn test_cross_repo_empty_child_sha_is_latest() {
        let parent = ctx(json!({"owner": "a", "repo": "x", "sha": "S"}));
        let child = ctx(json!({"repo": "y", "sha": ""}));
        assert_eq!(merge_context(&parent, &child)["sha"], json!(LATEST_SHA));
    }

    #[test]
    fn test_same_repo_preserves_sha() {
        let parent = ctx(json!({"owner": "a", "repo": "x", "sha": "S"}));
        let child = ctx(json!({"owner": "a", "repo": "x", "path": "src"}));
        let merged = merge_context(&parent, &child);
        assert_eq!(merged["sha"], json!("S"));
        assert_eq!(merged["path"], json!("src"));

        let child = ctx(json!({"sha": "T"}));
        assert_eq!(merge_context(&parent, &child)["sha"], json!("T"));
    }

    #[test]
    fn test_nested_frame_attributes() {
        let frame = NestedFrame::new(block(), ctx(json!({"path": "a b.md"}))).unwrap();
        assert!(frame.src.starts_with("/#%7B%22block%22"));
        assert!(!frame.src.contains(' '));
        assert_eq!(frame.sandbox, NESTED_SANDBOX);
        assert!(!frame.sandbox.contains("allow-top-navigation"));
        assert!(!frame.sandbox.contains("allow-popups"));

        let value = serde_json::to_value(&frame).unwrap();
        assert_eq!(value["style"], json!({"width": "100%", "height": "100%", "border": 0}));
    }

    #[test]
    fn test_fragment_decodes_back() {
        let target = FrameTarget {
            block: block(),
            context: ctx(json!({"owner": "b", "repo": "y", "path": "docs/100% done.md"})),
        };
        let frame = NestedFrame::new(target.block.clone(), target.context.clone()).unwrap();
        let hash = frame.src.trim_start_matches('/');
        assert_eq!(FrameTarget::decode_fragment(hash).unwrap(), target);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(FrameTarget::decode_fragment("#not-json").is_err());
    }
}
