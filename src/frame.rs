//! The frame: document, injected assets and the realm they run in.

use crate::bundle::Bundle;
use crate::dom::{Document, NodeId};
use crate::error::FrameError;
use crate::inject::AssetInjector;
use crate::realm::Realm;

pub struct Frame<R: Realm> {
    document: Document,
    injector: AssetInjector,
    realm: R,
    rendering_root: Option<NodeId>,
}

impl<R: Realm> Frame<R> {
    /// A frame over a fresh document containing `#root`
    pub fn new(realm: R) -> Self {
        Self::with_document(Document::with_root(), realm)
    }

    pub fn with_document(document: Document, realm: R) -> Self {
        Self {
            document,
            injector: AssetInjector::new(),
            realm,
            rendering_root: None,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn realm(&self) -> &R {
        &self.realm
    }

    pub fn realm_mut(&mut self) -> &mut R {
        &mut self.realm
    }

    /// Nodes injected for the current bundle
    pub fn injected(&self) -> &[NodeId] {
        self.injector.elements()
    }

    pub fn inject(&mut self, bundle: &Bundle, bundle_name: &str) -> Result<(), FrameError> {
        self.injector
            .inject(&mut self.document, &mut self.realm, bundle, bundle_name)
    }

    pub fn unload(&mut self) {
        self.injector.unload(&mut self.document);
    }

    /// The page's single rendering root, located on first use and kept for
    /// the lifetime of the frame, across bundles.
    pub fn rendering_root(&mut self) -> Result<NodeId, FrameError> {
        if let Some(root) = self.rendering_root {
            return Ok(root);
        }
        let root = self.document.root()?;
        self.rendering_root = Some(root);
        Ok(root)
    }

    pub fn has_rendering_root(&self) -> bool {
        self.rendering_root.is_some()
    }
}
