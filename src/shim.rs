//! Module shim for hosted-flavor bundles.
//!
//! Hosted bundles are compiled with `require(...)` calls for the rendering
//! library and friends. Instead of a module system, the frame resolves those
//! ids through a fixed table of host libraries. Ids outside the table resolve
//! to `null` after a diagnostic; bundles may import optional names defensively.

use std::collections::BTreeMap;

use tracing::warn;

/// A host-provided library instance a bundle may import
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HostLibrary {
    React,
    JsxRuntime,
    ReactDom,
    ReactDomClient,
    ComponentKit,
}

impl HostLibrary {
    pub const ALL: [HostLibrary; 5] = [
        HostLibrary::React,
        HostLibrary::JsxRuntime,
        HostLibrary::ReactDom,
        HostLibrary::ReactDomClient,
        HostLibrary::ComponentKit,
    ];

    /// Key of this library in the host-library bag handed to bundle factories.
    /// Preloaded host scripts define a global of the same name.
    pub fn global_name(self) -> &'static str {
        match self {
            HostLibrary::React => "React",
            HostLibrary::JsxRuntime => "ReactJSXRuntime",
            HostLibrary::ReactDom => "ReactDOM",
            HostLibrary::ReactDomClient => "ReactDOMClient",
            HostLibrary::ComponentKit => "PrimerReact",
        }
    }
}

/// Table from import id to host library
#[derive(Debug, Clone, Default)]
pub struct ModuleResolver {
    table: BTreeMap<String, HostLibrary>,
}

impl ModuleResolver {
    /// The import ids hosted bundles are built against
    pub fn standard() -> Self {
        Self::default()
            .with("react", HostLibrary::React)
            .with("react/jsx-runtime", HostLibrary::JsxRuntime)
            .with("react-dom", HostLibrary::ReactDom)
            .with("react-dom/client", HostLibrary::ReactDomClient)
            .with("@primer/react", HostLibrary::ComponentKit)
            .with("@primer/components", HostLibrary::ComponentKit)
    }

    pub fn with(mut self, id: impl Into<String>, library: HostLibrary) -> Self {
        self.table.insert(id.into(), library);
        self
    }

    pub fn resolve(&self, id: &str) -> Option<HostLibrary> {
        let resolved = self.table.get(id).copied();
        if resolved.is_none() {
            warn!(module = id, "no module '{}'", id);
        }
        resolved
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.table.keys().map(String::as_str)
    }
}

/// Wrap hosted bundle text in a factory scaffold.
///
/// Executing the result defines a global `export` function taking the
/// host-library bag and returning the bundle's own `export` value. Inside the
/// factory a local `require` shadows any ambient one and resolves through
/// `globalThis.__blockFrame.resolve`, captured once when the scaffold runs so
/// later changes to the global don't affect it.
pub fn wrap_source(export: &str, content: &str) -> String {
    format!(
        r#"var {export} = (function (resolve) {{
  return function (libs) {{
    function require(name) {{
      return resolve(libs, name);
    }}
{content}
    return {export};
  }};
}})(globalThis.__blockFrame.resolve);
"#
    )
}
