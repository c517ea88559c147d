//! Asset injection.
//!
//! Turns bundle assets into `style`/`script` nodes on the document body and
//! keeps them so a later bundle can remove every one of them.

use tracing::debug;

use crate::bundle::{Asset, AssetKind, Bundle, Flavor};
use crate::dom::{Document, NodeId};
use crate::error::FrameError;
use crate::realm::{Realm, ScriptScope};

#[derive(Debug, Default)]
pub struct AssetInjector {
    elements: Vec<NodeId>,
}

struct Pending<'a> {
    node: NodeId,
    script: Option<(&'a Asset, Flavor)>,
}

impl AssetInjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nodes injected for the current bundle
    pub fn elements(&self) -> &[NodeId] {
        &self.elements
    }

    /// Inject every asset of `bundle`.
    ///
    /// Scripts of the hosted flavor run inside the module shim; framework-free
    /// scripts run unmodified. Nodes are attached in bundle order and each
    /// script executes as its node is attached.
    ///
    /// # Errors
    /// [`FrameError::UnknownFlavor`] if the bundle has a script and
    /// `bundle_name` names neither flavor; realm errors from script execution.
    pub fn inject<R: Realm>(
        &mut self,
        document: &mut Document,
        realm: &mut R,
        bundle: &Bundle,
        bundle_name: &str,
    ) -> Result<(), FrameError> {
        let mut pending = Vec::with_capacity(bundle.len());
        for asset in bundle.assets() {
            match asset.kind() {
                AssetKind::Style => {
                    let node = document.create_element("style");
                    document.set_text(node, &asset.content);
                    pending.push(Pending { node, script: None });
                }
                AssetKind::Script => {
                    let flavor = Flavor::from_export_name(bundle_name)?;
                    let node = document.create_element("script");
                    document.set_text(node, &asset.content);
                    pending.push(Pending {
                        node,
                        script: Some((asset, flavor)),
                    });
                }
                AssetKind::Other => debug!(asset = %asset.name, "skipping asset"),
            }
        }

        for Pending { node, script } in pending {
            document.append_to_body(node);
            self.elements.push(node);
            if let Some((asset, flavor)) = script {
                let scope = if flavor.needs_shim() {
                    ScriptScope::Shimmed {
                        export: bundle_name,
                    }
                } else {
                    ScriptScope::Global
                };
                debug!(asset = %asset.name, ?scope, "executing script");
                realm.execute(&asset.name, &asset.content, scope)?;
            }
        }
        Ok(())
    }

    /// Remove every injected node. Safe to call repeatedly or when nothing
    /// was injected.
    pub fn unload(&mut self, document: &mut Document) {
        for node in self.elements.drain(..) {
            document.remove_from_body(node);
        }
    }
}
