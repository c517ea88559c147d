//! Bundle assets and flavor classification.
//!
//! The build toolchain names a bundle's root export differently depending on the
//! runtime it targets, and that name is the only signal of which shimming the
//! bundle needs.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::FrameError;

/// Export name of bundles built against the hosted rendering library
pub const HOSTED_EXPORT: &str = "BlockBundle";

/// Export name of framework-free bundles
pub const VANILLA_EXPORT: &str = "VanillaBlockBundle";

/// A named text asset. Only the name's suffix is meaningful.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub name: String,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Style,
    Script,
    Other,
}

impl Asset {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    pub fn kind(&self) -> AssetKind {
        if self.name.ends_with(".css") {
            AssetKind::Style
        } else if self.name.ends_with(".js") {
            AssetKind::Script
        } else {
            AssetKind::Other
        }
    }
}

/// Ordered set of assets implementing one block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bundle(Vec<Asset>);

impl Bundle {
    pub fn new(assets: Vec<Asset>) -> Self {
        Self(assets)
    }

    /// An empty bundle means "load the block from the dev server".
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn assets(&self) -> &[Asset] {
        &self.0
    }

    pub fn scripts(&self) -> impl Iterator<Item = &Asset> {
        self.0.iter().filter(|a| a.kind() == AssetKind::Script)
    }
}

impl From<Vec<Asset>> for Bundle {
    fn from(assets: Vec<Asset>) -> Self {
        Self(assets)
    }
}

/// Packaging convention a bundle was built with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    /// Built against the host's rendering library; imports are shimmed.
    Hosted,
    /// Plain script exposing a `default` function.
    FrameworkFree,
}

impl Flavor {
    pub fn from_export_name(name: &str) -> Result<Self, FrameError> {
        match name {
            HOSTED_EXPORT => Ok(Flavor::Hosted),
            VANILLA_EXPORT => Ok(Flavor::FrameworkFree),
            other => Err(FrameError::UnknownFlavor(other.to_string())),
        }
    }

    pub fn export_name(self) -> &'static str {
        match self {
            Flavor::Hosted => HOSTED_EXPORT,
            Flavor::FrameworkFree => VANILLA_EXPORT,
        }
    }

    /// Whether scripts of this flavor run inside the module shim
    pub fn needs_shim(self) -> bool {
        matches!(self, Flavor::Hosted)
    }
}

fn export_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\bvar\s+([A-Za-z_$][A-Za-z0-9_$]*)\s*=").expect("export pattern is valid")
    })
}

/// Find the bundle's exported name: the first `var <name> =` in any script
/// asset, scanning assets in bundle order.
///
/// # Errors
/// Returns [`FrameError::MalformedBundle`] when no script asset matches.
pub fn classify(bundle: &Bundle) -> Result<String, FrameError> {
    bundle
        .scripts()
        .find_map(|asset| {
            export_pattern()
                .captures(&asset.content)
                .map(|caps| caps[1].to_string())
        })
        .ok_or(FrameError::MalformedBundle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_kind_by_suffix() {
        assert_eq!(Asset::new("index.css", "").kind(), AssetKind::Style);
        assert_eq!(Asset::new("index.js", "").kind(), AssetKind::Script);
        assert_eq!(Asset::new("index.js.map", "").kind(), AssetKind::Other);
    }

    #[test]
    fn test_classify_returns_export_name() {
        let bundle = Bundle::new(vec![
            Asset::new("index.css", "body { color: red; }"),
            Asset::new("index.js", "var BlockBundle = (() => { return {}; })();"),
        ]);
        assert_eq!(classify(&bundle).unwrap(), "BlockBundle");
    }

    #[test]
    fn test_classify_compact_assignment() {
        let bundle = Bundle::new(vec![Asset::new("x.js", "var VanillaBlockBundle=1;")]);
        assert_eq!(classify(&bundle).unwrap(), "VanillaBlockBundle");
    }

    #[test]
    fn test_classify_first_match_wins() {
        let bundle = Bundle::new(vec![
            Asset::new("a.js", "var First = 1;"),
            Asset::new("b.js", "var Second = 2;"),
        ]);
        assert_eq!(classify(&bundle).unwrap(), "First");
    }

    #[test]
    fn test_classify_ignores_stylesheets() {
        let bundle = Bundle::new(vec![
            Asset::new("a.css", "var Styled = 1;"),
            Asset::new("b.js", "var BlockBundle = 2;"),
        ]);
        assert_eq!(classify(&bundle).unwrap(), "BlockBundle");
    }

    #[test]
    fn test_classify_malformed() {
        let bundle = Bundle::new(vec![
            Asset::new("a.css", "body {}"),
            Asset::new("b.js", "console.log('no export');"),
        ]);
        assert!(matches!(classify(&bundle), Err(FrameError::MalformedBundle)));
        assert!(matches!(classify(&Bundle::default()), Err(FrameError::MalformedBundle)));
    }

    #[test]
    fn test_flavor_from_export_name() {
        assert_eq!(Flavor::from_export_name("BlockBundle").unwrap(), Flavor::Hosted);
        assert_eq!(
            Flavor::from_export_name("VanillaBlockBundle").unwrap(),
            Flavor::FrameworkFree
        );
        let err = Flavor::from_export_name("Other").unwrap_err();
        assert!(err.to_string().contains("unknown block bundle name 'Other'"));
    }

    #[test]
    fn test_bundle_deserializes_from_asset_array() {
        let bundle: Bundle =
            serde_json::from_str(r#"[{"name":"x.js","content":"var BlockBundle=1;"}]"#).unwrap();
        assert_eq!(bundle.len(), 1);
        assert_eq!(bundle.assets()[0].name, "x.js");
    }
}
