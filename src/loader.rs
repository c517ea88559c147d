//! Bundle loading.
//!
//! A populated bundle is classified, injected and turned into a setter. An
//! empty bundle means the block is served by a local dev server, and loading
//! is delegated to a [`DevServerLoader`].

use async_trait::async_trait;
use tracing::info;

use crate::bundle::{classify, Bundle};
use crate::error::FrameError;
use crate::frame::Frame;
use crate::props::BlockIdentity;
use crate::realm::Realm;
use crate::setter::{make_setter, SetProps};

/// Loads a block from a development server and returns its setter
#[async_trait(?Send)]
pub trait DevServerLoader<R: Realm> {
    async fn load(
        &self,
        frame: &mut Frame<R>,
        block: &BlockIdentity,
    ) -> Result<Box<dyn SetProps<R>>, FrameError>;
}

/// Load `bundle` into `frame`.
///
/// Injects the bundle exactly once per call; callers must not call again until
/// a new bundle arrives.
///
/// # Errors
/// [`FrameError::MissingDevServerLoader`] for an empty bundle without a
/// loader, plus everything [`install_bundle`] can return.
pub async fn load_bundle<R: Realm>(
    frame: &mut Frame<R>,
    bundle: &Bundle,
    block: &BlockIdentity,
    dev_server: Option<&dyn DevServerLoader<R>>,
) -> Result<Box<dyn SetProps<R>>, FrameError> {
    if bundle.is_empty() {
        let loader = dev_server.ok_or(FrameError::MissingDevServerLoader)?;
        info!(owner = %block.owner, repo = %block.repo, id = %block.id, "loading block from dev server");
        return loader.load(frame, block).await;
    }
    install_bundle(frame, bundle)
}

/// Classify, inject and build the setter for a populated bundle.
///
/// # Errors
/// [`FrameError::MalformedBundle`] if no script declares an export,
/// [`FrameError::UnknownFlavor`] if the export names neither flavor, and realm
/// errors from the bundle's own code.
pub fn install_bundle<R: Realm>(
    frame: &mut Frame<R>,
    bundle: &Bundle,
) -> Result<Box<dyn SetProps<R>>, FrameError> {
    let bundle_name = classify(bundle)?;
    info!(bundle = %bundle_name, assets = bundle.len(), "injecting bundle");
    frame.inject(bundle, &bundle_name)?;
    make_setter(frame, &bundle_name)
}
