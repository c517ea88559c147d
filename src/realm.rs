//! The script realm block code runs in.
//!
//! Injected scripts execute with full access to the realm's globals; the only
//! narrowed surface is `require`, which hosted bundles see through the module
//! shim. [`crate::JsRealm`] is the V8-backed implementation.

use crate::bundle::Flavor;
use crate::callbacks::RelayedCall;
use crate::error::RealmError;
use crate::props::Properties;

/// How an injected script is evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptScope<'a> {
    /// Run the text unmodified at global scope.
    Global,
    /// Run the text inside the module shim, publishing a factory under `export`.
    Shimmed { export: &'a str },
}

pub trait Realm: 'static {
    /// Execute a script asset. Called when its script node is attached.
    fn execute(&mut self, origin: &str, source: &str, scope: ScriptScope<'_>)
        -> Result<(), RealmError>;

    /// Locate the global export for `flavor` and prepare the component.
    ///
    /// For hosted bundles this invokes the factory with the host libraries and
    /// keeps its `default` export.
    fn instantiate(&mut self, flavor: Flavor) -> Result<(), RealmError>;

    /// Render the component with `props`, adding one relay function per
    /// callback name.
    fn render(
        &mut self,
        flavor: Flavor,
        props: &Properties,
        callbacks: &[String],
    ) -> Result<(), RealmError>;

    /// Take the callback invocations made since the last drain.
    fn drain_relayed(&mut self) -> Vec<RelayedCall>;
}
