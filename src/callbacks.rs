//! Callback functions a block may invoke on the host.
//!
//! Blocks owned by the privileged owner get the full set; everyone else gets
//! the restricted set. The functions themselves are created inside the realm
//! and relay each call back to the frame as a [`RelayedCall`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Name of the callback the frame handles locally before relaying
pub const ON_UPDATE_CONTENT: &str = "onUpdateContent";

const RESTRICTED: &[&str] = &[
    "onUpdateMetadata",
    "onUpdateContent",
    "onNavigateToPath",
    "onRequestUpdateContent",
    "onRequestGitHubData",
    "onStoreGet",
    "onStoreSet",
    "onRequestBlocksRepos",
];

const PRIVILEGED_ONLY: &[&str] = &["private__onFetchInternalEndpoint"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackSets {
    /// Owner whose blocks receive the privileged set
    pub privileged_owner: String,
    pub privileged: Vec<String>,
    pub restricted: Vec<String>,
}

impl Default for CallbackSets {
    fn default() -> Self {
        let restricted: Vec<String> = RESTRICTED.iter().map(|s| s.to_string()).collect();
        let privileged = restricted
            .iter()
            .cloned()
            .chain(PRIVILEGED_ONLY.iter().map(|s| s.to_string()))
            .collect();
        Self {
            privileged_owner: String::from("githubnext"),
            privileged,
            restricted,
        }
    }
}

impl CallbackSets {
    pub fn for_owner(&self, owner: &str) -> &[String] {
        if owner == self.privileged_owner {
            &self.privileged
        } else {
            &self.restricted
        }
    }
}

/// A callback invocation made by block code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayedCall {
    pub name: String,
    pub args: Vec<Value>,
}

impl RelayedCall {
    pub fn new(name: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}
