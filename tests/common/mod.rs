#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use block_frame::{
    CallbackSets, Flavor, Frame, OutboundMessage, ParentFrame, Properties, Realm, RealmError,
    RelayedCall, ScriptScope, Session,
};
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct Executed {
    pub origin: String,
    pub source: String,
    /// Export the script was shimmed under, `None` for global scripts
    pub shimmed: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Render {
    pub flavor: Flavor,
    pub props: Value,
    pub callbacks: Vec<String>,
}

/// Realm that records what it is asked to do. Queued interactions are
/// "invoked by the block" one per render.
#[derive(Debug, Default)]
pub struct RecordingRealm {
    pub executed: Vec<Executed>,
    pub instantiated: Vec<Flavor>,
    pub renders: Vec<Render>,
    pub interactions: VecDeque<RelayedCall>,
    /// Invoked by the block on every render, after any queued interaction
    pub repeated: Option<RelayedCall>,
    relayed: Vec<RelayedCall>,
}

impl RecordingRealm {
    pub fn interact(&mut self, name: &str, args: Vec<Value>) {
        self.interactions.push_back(RelayedCall::new(name, args));
    }

    pub fn interact_on_every_render(&mut self, name: &str, args: Vec<Value>) {
        self.repeated = Some(RelayedCall::new(name, args));
    }
}

impl Realm for RecordingRealm {
    fn execute(
        &mut self,
        origin: &str,
        source: &str,
        scope: ScriptScope<'_>,
    ) -> Result<(), RealmError> {
        let shimmed = match scope {
            ScriptScope::Global => None,
            ScriptScope::Shimmed { export } => Some(export.to_string()),
        };
        self.executed.push(Executed {
            origin: origin.to_string(),
            source: source.to_string(),
            shimmed,
        });
        Ok(())
    }

    fn instantiate(&mut self, flavor: Flavor) -> Result<(), RealmError> {
        self.instantiated.push(flavor);
        Ok(())
    }

    fn render(
        &mut self,
        flavor: Flavor,
        props: &Properties,
        callbacks: &[String],
    ) -> Result<(), RealmError> {
        self.renders.push(Render {
            flavor,
            props: props.to_value(),
            callbacks: callbacks.to_vec(),
        });
        if let Some(call) = self.interactions.pop_front() {
            self.relayed.push(call);
        }
        if let Some(call) = &self.repeated {
            self.relayed.push(call.clone());
        }
        Ok(())
    }

    fn drain_relayed(&mut self) -> Vec<RelayedCall> {
        std::mem::take(&mut self.relayed)
    }
}

/// Parent frame that keeps every posted message
#[derive(Debug, Clone, Default)]
pub struct RecordingParent(Rc<RefCell<Vec<OutboundMessage>>>);

impl RecordingParent {
    pub fn messages(&self) -> Vec<OutboundMessage> {
        self.0.borrow().clone()
    }

    pub fn callbacks(&self) -> Vec<(String, Vec<Value>)> {
        self.messages()
            .into_iter()
            .filter_map(|m| match m {
                OutboundMessage::Callback { name, args } => Some((name, args)),
                OutboundMessage::Loaded { .. } => None,
            })
            .collect()
    }
}

impl ParentFrame for RecordingParent {
    fn post(&mut self, message: OutboundMessage) {
        self.0.borrow_mut().push(message);
    }
}

pub fn recording_session() -> (Session<RecordingRealm>, RecordingParent) {
    let parent = RecordingParent::default();
    let session = Session::new(
        Frame::new(RecordingRealm::default()),
        CallbackSets::default(),
        Box::new(parent.clone()),
    );
    (session, parent)
}

pub fn bundle_event(assets: Value) -> Value {
    json!({"type": "setProps", "props": {"bundle": assets}})
}

pub fn props_event(props: Value) -> Value {
    json!({"type": "setProps", "props": {"props": props}})
}

pub fn block_props(owner: &str, content: &str) -> Value {
    json!({
        "block": {"owner": owner, "repo": "r", "id": "1", "type": "file"},
        "context": {"owner": owner, "repo": "r", "path": "README.md", "sha": "main"},
        "content": content
    })
}
