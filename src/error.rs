//! Error types for the block frame.
//!
//! Every variant of [`FrameError`] except the serialization and realm wrappers is
//! fatal to the frame: the host treats a crashed frame as a block that failed to load.

use thiserror::Error;

/// Errors raised while loading or driving a block
#[derive(Debug, Error)]
pub enum FrameError {
    /// No script asset declares an exported bundle name
    #[error("couldn't find block bundle name")]
    MalformedBundle,

    #[error("unknown block bundle name '{0}'")]
    UnknownFlavor(String),

    #[error("empty bundle but no dev-server loader")]
    MissingDevServerLoader,

    #[error("document has no element with id '{0}'")]
    MissingRoot(String),

    #[error("invalid message: {0}")]
    InvalidMessage(String),

    #[error("invalid block props: {0}")]
    InvalidProps(String),

    /// A block kept updating its content from inside its own render
    #[error("block re-rendered {0} times from content updates in one message")]
    RenderLoop(usize),

    #[error("dev server: {0}")]
    DevServer(String),

    #[error(transparent)]
    Realm(#[from] RealmError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised by the script realm while executing block code
#[derive(Debug, Error)]
pub enum RealmError {
    #[error("script failed: {0:#}")]
    Script(anyhow::Error),

    #[error("script timed out after {0}ms")]
    Timeout(u64),

    #[error("bundle export '{0}' is not available")]
    MissingExport(String),
}
