//! Host library scripts, read only from one directory.
//!
//! Host libraries are trusted, but the paths naming them come from the command
//! line, so reads are confined to the configured directory:
//! - No filesystem escape (traversal and symlinks resolved via canonicalization)
//! - Only .js files

use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};

pub struct LibraryDir {
    allowed_dir: PathBuf,
}

impl LibraryDir {
    pub fn new(allowed_dir: impl AsRef<Path>) -> Result<Self> {
        let canonical = allowed_dir
            .as_ref()
            .canonicalize()
            .map_err(|e| anyhow!("Failed to canonicalize libs dir: {}", e))?;

        if !canonical.is_dir() {
            return Err(anyhow!("libs dir must be a directory"));
        }

        Ok(Self {
            allowed_dir: canonical,
        })
    }

    pub fn path(&self) -> &Path {
        &self.allowed_dir
    }

    fn is_path_allowed(&self, path: &Path) -> bool {
        match path.canonicalize() {
            Ok(canonical) => canonical.starts_with(&self.allowed_dir),
            Err(_) => false,
        }
    }

    fn is_extension_allowed(path: &Path) -> bool {
        matches!(path.extension().and_then(|e| e.to_str()), Some("js"))
    }

    /// Read the script `name`, relative to the directory.
    pub fn read(&self, name: &str) -> Result<String> {
        let path = self.allowed_dir.join(name);

        if !Self::is_extension_allowed(&path) {
            return Err(anyhow!("Only .js host libraries allowed, got: {}", name));
        }

        if !self.is_path_allowed(&path) {
            return Err(anyhow!(
                "Access denied: '{}' is outside the libs dir",
                path.display()
            ));
        }

        std::fs::read_to_string(&path)
            .map_err(|e| anyhow!("Failed to read '{}': {}", path.display(), e))
    }
}
