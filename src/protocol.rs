//! Messages exchanged with the parent frame.
//!
//! Inbound, the parent sends `setProps` events:
//!
//! ```text
//! { "type": "setProps", "props": { "bundle": null } }        block not found
//! { "type": "setProps", "props": { "bundle": [] } }          load from the dev server
//! { "type": "setProps", "props": { "bundle": [assets..] } }  inject this bundle
//! { "type": "setProps", "props": { "props": {..} } }         render with these props
//! { "type": "setProps", "props": {} }                        render the current state again
//! ```
//!
//! A message carrying `bundle` is a bundle message even if it also carries
//! `props`. Outbound, the frame reports `loaded` on every hash change and
//! relays block callbacks.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::bundle::Bundle;
use crate::error::FrameError;
use crate::nested::is_truthy;
use crate::props::Properties;

/// An inbound event, decoded
#[derive(Debug, Clone, PartialEq)]
pub enum FrameMessage {
    BundleReady(Bundle),
    BundleNotFound,
    UseDevServer,
    PropsUpdate(Properties),
    /// `setProps` with neither a bundle nor truthy props: no state change,
    /// but the current state is rendered again.
    Refresh,
}

impl FrameMessage {
    /// Decode a message event's data.
    ///
    /// Returns `Ok(None)` for events that aren't `setProps`. Falsy `props`
    /// (`null`, `false`, `0`, `""`) count as absent.
    pub fn from_event(data: &Value) -> Result<Option<Self>, FrameError> {
        if data.get("type").and_then(Value::as_str) != Some("setProps") {
            return Ok(None);
        }
        let payload = data
            .get("props")
            .and_then(Value::as_object)
            .ok_or_else(|| FrameError::InvalidMessage("setProps without a props object".into()))?;

        if let Some(bundle) = payload.get("bundle") {
            return match bundle {
                Value::Null => Ok(Some(FrameMessage::BundleNotFound)),
                Value::Array(assets) if assets.is_empty() => Ok(Some(FrameMessage::UseDevServer)),
                Value::Array(_) => Ok(Some(FrameMessage::BundleReady(Bundle::deserialize(
                    bundle,
                )?))),
                _ => Err(FrameError::InvalidMessage(
                    "bundle must be null or an array of assets".into(),
                )),
            };
        }

        match payload.get("props") {
            Some(props) if is_truthy(props) => Ok(Some(FrameMessage::PropsUpdate(
                Properties::from_value(props.clone())?,
            ))),
            _ => Ok(Some(FrameMessage::Refresh)),
        }
    }
}

/// An event posted to the parent frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OutboundMessage {
    /// The frame finished loading for `hash`
    Loaded { hash: String },
    /// A block invoked a host callback
    Callback { name: String, args: Vec<Value> },
}

/// Where outbound messages go
pub trait ParentFrame {
    fn post(&mut self, message: OutboundMessage);
}
