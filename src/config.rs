//! Frame configuration.

use std::path::PathBuf;

use crate::callbacks::CallbackSets;

/// Configuration for a block frame
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Directory containing host library scripts (only this dir is readable)
    pub libs_dir: Option<PathBuf>,
    /// Scripts in `libs_dir` evaluated at startup, in order. Together they
    /// must define the host library globals hosted bundles import.
    pub preload: Vec<String>,
    /// Maximum heap size in bytes (default: 64MB, None = unlimited)
    pub max_heap_size: Option<usize>,
    /// Maximum time for a single script run in milliseconds (default: 30000ms, None = unlimited)
    pub script_timeout_ms: Option<u64>,
    /// Base URL of a local dev server serving block bundles
    pub dev_server: Option<String>,
    pub callbacks: CallbackSets,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            libs_dir: None,
            preload: vec![],
            max_heap_size: Some(64 * 1024 * 1024),
            script_timeout_ms: Some(30_000),
            dev_server: None,
            callbacks: CallbackSets::default(),
        }
    }
}
