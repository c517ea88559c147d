//! # Block Frame
//!
//! A sandboxed frame that loads third-party block bundles, feeds them props from
//! the parent frame and relays their callbacks back.
//!
//! ## Protocol
//!
//! - The parent sends `setProps` messages carrying either a bundle (assets to
//!   inject, `null` for "not found", `[]` for "use the dev server") or props.
//! - The bundle is injected once, when both a bundle and props are known.
//!   Later props only re-render.
//! - A new bundle always unloads every asset of the previous one first.
//! - The frame posts `loaded` with its location hash at startup and on every
//!   hash change.
//!
//! ## Security Guarantees
//!
//! - **No system access**: block code runs in a V8 isolate without fs, net,
//!   env or process APIs
//! - **Narrowed imports**: `require` inside hosted bundles only resolves a fixed
//!   table of host libraries
//! - **Sanitized relays**: callback arguments are checked before they reach
//!   the parent
//! - **Nested blocks sandboxed**: child blocks get an iframe without top-level
//!   navigation or popups
//!
//! ## Usage
//!
//! ```rust,ignore
//! use block_frame::{Frame, FrameConfig, JsRealm, ModuleResolver, Session};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let config = FrameConfig::default();
//!     let realm = JsRealm::new(&config, ModuleResolver::standard())?;
//!     let mut session = Session::new(Frame::new(realm), config.callbacks, parent);
//!
//!     session.on_hash_change("");
//!     session.handle_event(&serde_json::json!({
//!         "type": "setProps",
//!         "props": { "bundle": [{ "name": "index.js", "content": "var VanillaBlockBundle = ..." }] }
//!     })).await?;
//!     Ok(())
//! }
//! ```

pub mod bundle;
pub mod callbacks;
mod config;
pub mod devserver;
pub mod dom;
mod error;
mod frame;
mod inject;
mod libs;
pub mod loader;
pub mod nested;
mod ops;
pub mod props;
pub mod protocol;
pub mod realm;
mod runtime;
mod sanitize;
pub mod session;
pub mod setter;
pub mod shim;

pub use bundle::{classify, Asset, Bundle, Flavor};
pub use callbacks::{CallbackSets, RelayedCall};
pub use config::FrameConfig;
pub use devserver::HttpDevServerLoader;
pub use dom::{Document, Placeholder};
pub use error::{FrameError, RealmError};
pub use frame::Frame;
pub use inject::AssetInjector;
pub use libs::LibraryDir;
pub use loader::{install_bundle, load_bundle, DevServerLoader};
pub use ops::ConsoleOutput;
pub use props::{BlockIdentity, Properties};
pub use protocol::{FrameMessage, OutboundMessage, ParentFrame};
pub use realm::{Realm, ScriptScope};
pub use runtime::JsRealm;
pub use sanitize::sanitize_args;
pub use session::{Phase, Session};
pub use setter::SetProps;
pub use shim::{HostLibrary, ModuleResolver};
