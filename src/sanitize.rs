//! Sanitize callback arguments relayed from block code.
//!
//! Block code is untrusted; before its callback arguments reach the parent
//! frame, keys like `__proto__`, `constructor` and `prototype` that could
//! pollute the host's `Object.prototype` are rejected, as is unbounded nesting.

use anyhow::{anyhow, Result};
use serde_json::{Map, Value};

/// Maximum recursion depth for nested objects/arrays
const MAX_DEPTH: usize = 32;

const DANGEROUS_KEYS: &[&str] = &["__proto__", "constructor", "prototype"];

/// Check every relayed argument.
///
/// # Errors
/// Fails if a dangerous key appears anywhere or nesting exceeds MAX_DEPTH.
pub fn sanitize_args(args: Vec<Value>) -> Result<Vec<Value>> {
    args.into_iter().map(|arg| sanitize(arg, 0)).collect()
}

fn sanitize(value: Value, depth: usize) -> Result<Value> {
    if depth > MAX_DEPTH {
        return Err(anyhow!(
            "callback arguments nested too deep (max {} levels)",
            MAX_DEPTH
        ));
    }

    match value {
        Value::Object(map) => {
            if let Some(key) = map.keys().find(|k| DANGEROUS_KEYS.contains(&k.as_str())) {
                return Err(anyhow!("'{}' key is forbidden in callback arguments", key));
            }
            let mut clean = Map::new();
            for (key, val) in map {
                clean.insert(key, sanitize(val, depth + 1)?);
            }
            Ok(Value::Object(clean))
        }
        Value::Array(items) => Ok(Value::Array(
            items
                .into_iter()
                .map(|v| sanitize(v, depth + 1))
                .collect::<Result<_>>()?,
        )),
        other => Ok(other),
    }
}
