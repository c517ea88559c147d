//! V8-backed realm - executes block code in a sandboxed isolate.
//!
//! Provides only the globals block code needs:
//! - console.log/info/debug/warn/error (captured and traced)
//! - atob, btoa
//! - crypto.randomUUID, crypto.getRandomValues
//! - `require` inside hosted bundles, resolved through the module shim
//! - No fs, net, env, or other system access

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use deno_core::{JsRuntime, OpState, RuntimeOptions};
use tracing::{debug, warn};

use crate::bundle::Flavor;
use crate::callbacks::RelayedCall;
use crate::config::FrameConfig;
use crate::error::RealmError;
use crate::libs::LibraryDir;
use crate::ops::{block_frame, ConsoleOutput, RelayQueue};
use crate::props::Properties;
use crate::realm::{Realm, ScriptScope};
use crate::shim::{wrap_source, HostLibrary, ModuleResolver};

pub struct JsRealm {
    runtime: JsRuntime,
    state: Rc<RefCell<OpState>>,
    timeout_ms: Option<u64>,
}

impl JsRealm {
    /// Create the isolate, install `resolver` as the module shim's table and
    /// evaluate the configured host library scripts.
    pub fn new(config: &FrameConfig, resolver: ModuleResolver) -> Result<Self> {
        // Configure V8 heap limits if specified
        let create_params = config.max_heap_size.map(|max_bytes| {
            deno_core::v8::Isolate::create_params().heap_limits(0, max_bytes)
        });

        let mut runtime = JsRuntime::new(RuntimeOptions {
            extensions: vec![block_frame::init_ops_and_esm()],
            create_params,
            ..Default::default()
        });

        if config.max_heap_size.is_some() {
            runtime.add_near_heap_limit_callback(|current, initial| {
                // Keep the limit so V8 fails the script instead of growing
                warn!(
                    current_mb = current / (1024 * 1024),
                    initial_mb = initial / (1024 * 1024),
                    "block code near heap limit"
                );
                current
            });
        }

        debug!(modules = ?resolver.ids().collect::<Vec<_>>(), "module shim table");
        let state = runtime.op_state();
        {
            let mut state = state.borrow_mut();
            state.put(resolver);
            state.put(ConsoleOutput::default());
            state.put(RelayQueue::default());
        }

        let mut realm = Self {
            runtime,
            state,
            timeout_ms: config.script_timeout_ms,
        };
        realm.preload(config)?;
        Ok(realm)
    }

    fn preload(&mut self, config: &FrameConfig) -> Result<()> {
        if config.preload.is_empty() {
            return Ok(());
        }
        let dir = config
            .libs_dir
            .as_ref()
            .ok_or_else(|| anyhow!("preload scripts given without a libs dir"))?;
        let libs = LibraryDir::new(dir)?;
        debug!(dir = %libs.path().display(), count = config.preload.len(), "loading host libraries");
        for name in &config.preload {
            let source = libs.read(name)?;
            debug!(library = %name, "preloading host library");
            self.run("<block-frame:library>", source)
                .map_err(|e| anyhow!("host library '{}' failed: {}", name, e))?;
        }

        for library in HostLibrary::ALL {
            let check = format!("typeof globalThis.{} !== 'undefined'", library.global_name());
            if !self.evaluate_bool(check)? {
                warn!(global = library.global_name(), "host library global is not defined");
            }
        }
        Ok(())
    }

    fn evaluate_bool(&mut self, code: String) -> Result<bool> {
        let value = self.runtime.execute_script("<block-frame:check>", code)?;
        let scope = &mut self.runtime.handle_scope();
        let local = deno_core::v8::Local::new(scope, &value);
        Ok(local.is_true())
    }

    /// Fail with [`RealmError::MissingExport`] unless the bundle published
    /// `flavor`'s global.
    fn require_export(&mut self, flavor: Flavor) -> Result<(), RealmError> {
        let check = format!("typeof globalThis.{} !== 'undefined'", flavor.export_name());
        if !self.evaluate_bool(check).map_err(RealmError::Script)? {
            return Err(RealmError::MissingExport(flavor.export_name().to_string()));
        }
        Ok(())
    }

    /// Console output captured since the realm was created (or last taken)
    pub fn console(&self) -> ConsoleOutput {
        self.state.borrow().borrow::<ConsoleOutput>().clone()
    }

    pub fn take_console(&mut self) -> ConsoleOutput {
        std::mem::take(self.state.borrow_mut().borrow_mut::<ConsoleOutput>())
    }

    /// Run a classic script at global scope, terminating it if it exceeds the
    /// configured timeout.
    fn run(&mut self, name: &'static str, code: String) -> Result<(), RealmError> {
        let Some(ms) = self.timeout_ms else {
            return self
                .runtime
                .execute_script(name, code)
                .map(|_| ())
                .map_err(RealmError::Script);
        };

        let isolate_handle = self.runtime.v8_isolate().thread_safe_handle();
        let (done_tx, done_rx) = mpsc::channel::<()>();
        let watchdog = std::thread::spawn(move || {
            if let Err(mpsc::RecvTimeoutError::Timeout) =
                done_rx.recv_timeout(Duration::from_millis(ms))
            {
                isolate_handle.terminate_execution();
                return true;
            }
            false
        });

        let result = self.runtime.execute_script(name, code);
        let _ = done_tx.send(());
        let timed_out = watchdog.join().unwrap_or(false);

        if timed_out {
            self.runtime.v8_isolate().cancel_terminate_execution();
            return Err(RealmError::Timeout(ms));
        }
        result.map(|_| ()).map_err(RealmError::Script)
    }
}

impl Realm for JsRealm {
    fn execute(
        &mut self,
        origin: &str,
        source: &str,
        scope: ScriptScope<'_>,
    ) -> Result<(), RealmError> {
        let code = match scope {
            ScriptScope::Global => source.to_string(),
            ScriptScope::Shimmed { export } => wrap_source(export, source),
        };
        debug!(asset = origin, bytes = code.len(), "executing block script");
        self.run("<block-frame:asset>", code)
    }

    fn instantiate(&mut self, flavor: Flavor) -> Result<(), RealmError> {
        self.require_export(flavor)?;
        let code = format!(
            "globalThis.__blockFrame.instantiate({})",
            serde_json::to_string(flavor.export_name()).map_err(|e| RealmError::Script(e.into()))?
        );
        self.run("<block-frame:instantiate>", code)
    }

    fn render(
        &mut self,
        flavor: Flavor,
        props: &Properties,
        callbacks: &[String],
    ) -> Result<(), RealmError> {
        let encode = |e: serde_json::Error| RealmError::Script(e.into());
        let props_json = serde_json::to_string(props).map_err(encode)?;
        let names_json = serde_json::to_string(callbacks).map_err(encode)?;
        let code = match flavor {
            Flavor::Hosted => format!(
                "globalThis.__blockFrame.renderHosted({}, {})",
                props_json, names_json
            ),
            Flavor::FrameworkFree => {
                self.require_export(flavor)?;
                format!(
                    "globalThis.__blockFrame.renderVanilla({}, {}, {})",
                    serde_json::to_string(flavor.export_name()).map_err(encode)?,
                    props_json,
                    names_json
                )
            }
        };
        self.run("<block-frame:render>", code)
    }

    fn drain_relayed(&mut self) -> Vec<RelayedCall> {
        std::mem::take(&mut self.state.borrow_mut().borrow_mut::<RelayQueue>().0)
    }
}
