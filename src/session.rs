//! The frame's protocol state machine.
//!
//! A [`Session`] owns everything one frame knows: the current bundle, the last
//! props, the active setter and the frame it renders into. It processes
//! parent messages one at a time; `handle` takes `&mut self`, so a message
//! that arrives while a dev-server load is in flight is only processed after
//! that load resolves, and then supersedes it.

use std::collections::VecDeque;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::bundle::Bundle;
use crate::callbacks::{CallbackSets, RelayedCall, ON_UPDATE_CONTENT};
use crate::dom::Placeholder;
use crate::error::FrameError;
use crate::frame::Frame;
use crate::loader::{load_bundle, DevServerLoader};
use crate::nested::FrameTarget;
use crate::props::Properties;
use crate::protocol::{FrameMessage, OutboundMessage, ParentFrame};
use crate::realm::Realm;
use crate::sanitize::sanitize_args;
use crate::setter::SetProps;

/// Content-update re-renders allowed while handling one message
pub const MAX_CONTENT_RERENDERS: usize = 64;

/// What the session knows about the bundle
#[derive(Debug, Clone, PartialEq)]
pub enum BundleState {
    Unknown,
    NotFound,
    /// An empty bundle means "use the dev server".
    Present(Bundle),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NoBundle,
    NotFound,
    /// A bundle is known but no setter exists yet.
    Loading,
    Ready,
}

pub struct Session<R: Realm> {
    frame: Frame<R>,
    bundle: BundleState,
    props: Option<Properties>,
    setter: Option<Box<dyn SetProps<R>>>,
    dev_server: Option<Box<dyn DevServerLoader<R>>>,
    callbacks: CallbackSets,
    parent: Box<dyn ParentFrame>,
}

impl<R: Realm> Session<R> {
    pub fn new(frame: Frame<R>, callbacks: CallbackSets, parent: Box<dyn ParentFrame>) -> Self {
        Self {
            frame,
            bundle: BundleState::Unknown,
            props: None,
            setter: None,
            dev_server: None,
            callbacks,
            parent,
        }
    }

    pub fn with_dev_server(mut self, loader: Box<dyn DevServerLoader<R>>) -> Self {
        self.dev_server = Some(loader);
        self
    }

    pub fn frame(&self) -> &Frame<R> {
        &self.frame
    }

    pub fn frame_mut(&mut self) -> &mut Frame<R> {
        &mut self.frame
    }

    pub fn props(&self) -> Option<&Properties> {
        self.props.as_ref()
    }

    pub fn bundle(&self) -> &BundleState {
        &self.bundle
    }

    pub fn placeholder(&self) -> Placeholder {
        self.frame.document().placeholder()
    }

    pub fn phase(&self) -> Phase {
        match (&self.bundle, &self.setter) {
            (BundleState::NotFound, _) => Phase::NotFound,
            (BundleState::Unknown, _) => Phase::NoBundle,
            (BundleState::Present(_), None) => Phase::Loading,
            (BundleState::Present(_), Some(_)) => Phase::Ready,
        }
    }

    /// Handle a raw message event from the parent frame.
    pub async fn handle_event(&mut self, data: &Value) -> Result<(), FrameError> {
        match FrameMessage::from_event(data)? {
            Some(message) => self.handle(message).await,
            None => Ok(()),
        }
    }

    pub async fn handle(&mut self, message: FrameMessage) -> Result<(), FrameError> {
        match message {
            FrameMessage::BundleReady(bundle) => self.replace_bundle(BundleState::Present(bundle)),
            FrameMessage::UseDevServer => {
                self.replace_bundle(BundleState::Present(Bundle::default()))
            }
            FrameMessage::BundleNotFound => self.replace_bundle(BundleState::NotFound),
            FrameMessage::PropsUpdate(props) => self.props = Some(props),
            FrameMessage::Refresh => {}
        }

        if self.setter.is_none() {
            if let (BundleState::Present(bundle), Some(props)) = (&self.bundle, &self.props) {
                let block = props.block()?;
                let setter = load_bundle(
                    &mut self.frame,
                    bundle,
                    &block,
                    self.dev_server.as_deref(),
                )
                .await?;
                self.setter = Some(setter);
            }
        }

        self.render()
    }

    /// Report the current location hash to the parent. Called once at startup
    /// and on every hash change.
    pub fn on_hash_change(&mut self, hash: &str) {
        if let Ok(target) = FrameTarget::decode_fragment(hash) {
            debug!(owner = %target.block.owner, repo = %target.block.repo, id = %target.block.id, "frame target");
        }
        self.parent.post(OutboundMessage::Loaded {
            hash: hash.to_string(),
        });
    }

    fn replace_bundle(&mut self, bundle: BundleState) {
        self.setter = None;
        self.frame.unload();
        self.bundle = bundle;
    }

    fn render(&mut self) -> Result<(), FrameError> {
        let document = self.frame.document_mut();
        document.clear_placeholder();

        if self.bundle == BundleState::NotFound {
            return document.show_placeholder(Placeholder::NotFound);
        }
        if self.setter.is_none() {
            return document.show_placeholder(Placeholder::Loading);
        }
        let Some(props) = self.props.clone() else {
            return document.show_placeholder(Placeholder::Loading);
        };
        self.set_props(props)
    }

    /// Invoke the setter, then process whatever the block relayed while
    /// rendering. Content updates are applied locally and re-rendered before
    /// being forwarded; the parent's echo of them is never waited for.
    fn set_props(&mut self, props: Properties) -> Result<(), FrameError> {
        let mut queue = VecDeque::new();
        self.invoke_setter(&props, &mut queue)?;

        let mut rerenders = 0;
        while let Some(call) = queue.pop_front() {
            if call.name == ON_UPDATE_CONTENT {
                rerenders += 1;
                if rerenders > MAX_CONTENT_RERENDERS {
                    return Err(FrameError::RenderLoop(MAX_CONTENT_RERENDERS));
                }
                let content = call.args.first().cloned().unwrap_or(Value::Null);
                let mut updated = self.props.clone().unwrap_or_else(|| props.clone());
                updated.set_content(content);
                self.props = Some(updated.clone());
                self.invoke_setter(&updated, &mut queue)?;
            }
            self.forward(call);
        }
        Ok(())
    }

    fn invoke_setter(
        &mut self,
        props: &Properties,
        queue: &mut VecDeque<RelayedCall>,
    ) -> Result<(), FrameError> {
        let Some(setter) = self.setter.as_mut() else {
            return Ok(());
        };
        let owner = props.block()?.owner;
        let mut callbacks = self.callbacks.for_owner(&owner).to_vec();
        if !callbacks.iter().any(|name| name == ON_UPDATE_CONTENT) {
            callbacks.push(ON_UPDATE_CONTENT.to_string());
        }
        setter.set_props(&mut self.frame, props, &callbacks)?;
        queue.extend(self.frame.realm_mut().drain_relayed());
        Ok(())
    }

    fn forward(&mut self, call: RelayedCall) {
        match sanitize_args(call.args) {
            Ok(args) => {
                info!(callback = %call.name, "relaying callback");
                self.parent.post(OutboundMessage::Callback {
                    name: call.name,
                    args,
                });
            }
            Err(e) => warn!(callback = %call.name, error = %e, "dropping relayed callback"),
        }
    }
}
