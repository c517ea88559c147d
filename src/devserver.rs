//! Dev-server block loading.
//!
//! During block development the host signals an empty bundle; the frame then
//! fetches the block's current assets from a local dev server and loads them
//! like any other bundle.
//!
//! Security model:
//! - Only the dev server's own origin can be fetched
//! - Redirects only followed if they stay within that origin

use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::bundle::Bundle;
use crate::error::FrameError;
use crate::frame::Frame;
use crate::loader::{install_bundle, DevServerLoader};
use crate::props::BlockIdentity;
use crate::realm::Realm;
use crate::setter::SetProps;

const MAX_REDIRECTS: usize = 5;

/// Loads blocks from `GET <base>/bundle/<owner>/<repo>/<id>`, which returns
/// the bundle as a JSON array of `{name, content}` assets.
pub struct HttpDevServerLoader {
    base: Url,
    client: Client,
}

impl HttpDevServerLoader {
    pub fn new(base: &str) -> anyhow::Result<Self> {
        let base = Url::parse(base).map_err(|e| anyhow!("Invalid dev server URL '{}': {}", base, e))?;
        if base.cannot_be_a_base() {
            return Err(anyhow!("Dev server URL '{}' cannot be a base", base));
        }
        let client = Client::builder()
            // Redirects are checked and followed by hand
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client: {}", e))?;
        Ok(Self { base, client })
    }

    pub fn bundle_url(&self, block: &BlockIdentity) -> Result<Url, FrameError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| FrameError::DevServer(format!("'{}' cannot be a base", self.base)))?
            .pop_if_empty()
            .extend(["bundle", block.owner.as_str(), block.repo.as_str(), block.id.as_str()]);
        Ok(url)
    }

    fn is_origin_allowed(&self, url: &Url) -> bool {
        url.origin() == self.base.origin()
    }

    pub async fn fetch_bundle(&self, block: &BlockIdentity) -> Result<Bundle, FrameError> {
        let mut url = self.bundle_url(block)?;

        for _ in 0..=MAX_REDIRECTS {
            if !self.is_origin_allowed(&url) {
                return Err(FrameError::DevServer(format!(
                    "fetch blocked: origin '{}' is not the dev server's",
                    url.origin().ascii_serialization()
                )));
            }

            debug!(%url, "fetching dev-server bundle");
            let response = self
                .client
                .get(url.clone())
                .send()
                .await
                .map_err(|e| FrameError::DevServer(format!("fetch failed: {}", e)))?;
            let status = response.status();

            if status.is_redirection() {
                let location = response
                    .headers()
                    .get("location")
                    .and_then(|l| l.to_str().ok())
                    .ok_or_else(|| FrameError::DevServer("redirect without a location".into()))?;
                url = response
                    .url()
                    .join(location)
                    .map_err(|e| FrameError::DevServer(format!("invalid redirect URL: {}", e)))?;
                continue;
            }

            if !status.is_success() {
                return Err(FrameError::DevServer(format!(
                    "{} returned {}",
                    response.url(),
                    status
                )));
            }

            return response
                .json::<Bundle>()
                .await
                .map_err(|e| FrameError::DevServer(format!("invalid bundle: {}", e)));
        }

        Err(FrameError::DevServer(format!(
            "too many redirects (max {})",
            MAX_REDIRECTS
        )))
    }
}

#[async_trait(?Send)]
impl<R: Realm> DevServerLoader<R> for HttpDevServerLoader {
    async fn load(
        &self,
        frame: &mut Frame<R>,
        block: &BlockIdentity,
    ) -> Result<Box<dyn SetProps<R>>, FrameError> {
        let bundle = self.fetch_bundle(block).await?;
        install_bundle(frame, &bundle)
    }
}
