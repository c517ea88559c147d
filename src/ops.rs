//! Ops backing the frame's JS bootstrap, and the extension definition.

use anyhow::{anyhow, Error};
use deno_core::{op2, OpState};
use tracing::{error, info, warn};

use crate::callbacks::RelayedCall;
use crate::nested::NestedFrame;
use crate::props::{BlockIdentity, Context};
use crate::shim::ModuleResolver;

// ============================================================================
// Console Output Capture
// ============================================================================

/// Console output produced by block code
#[derive(Debug, Default, Clone)]
pub struct ConsoleOutput {
    pub logs: Vec<String>,
    pub warns: Vec<String>,
    pub errors: Vec<String>,
}

#[op2(fast)]
pub fn op_block_console_log(state: &mut OpState, #[string] msg: &str) {
    info!(target: "block_frame::console", "{}", msg);
    if let Some(output) = state.try_borrow_mut::<ConsoleOutput>() {
        output.logs.push(msg.to_string());
    }
}

#[op2(fast)]
pub fn op_block_console_warn(state: &mut OpState, #[string] msg: &str) {
    warn!(target: "block_frame::console", "{}", msg);
    if let Some(output) = state.try_borrow_mut::<ConsoleOutput>() {
        output.warns.push(msg.to_string());
    }
}

#[op2(fast)]
pub fn op_block_console_error(state: &mut OpState, #[string] msg: &str) {
    error!(target: "block_frame::console", "{}", msg);
    if let Some(output) = state.try_borrow_mut::<ConsoleOutput>() {
        output.errors.push(msg.to_string());
    }
}

// ============================================================================
// Module Shim and Callback Relay
// ============================================================================

/// Callbacks invoked by block code, waiting to be drained
#[derive(Debug, Default)]
pub struct RelayQueue(pub Vec<RelayedCall>);

/// Resolve an import id to the key of a host library, or null.
#[op2]
#[string]
pub fn op_block_require(state: &mut OpState, #[string] name: &str) -> Option<String> {
    state
        .borrow::<ModuleResolver>()
        .resolve(name)
        .map(|library| library.global_name().to_string())
}

/// Queue a callback invocation. `args` is the JSON-encoded argument list.
#[op2(fast)]
pub fn op_block_relay(state: &mut OpState, #[string] name: &str, #[string] args: &str) {
    match serde_json::from_str(args) {
        Ok(args) => state
            .borrow_mut::<RelayQueue>()
            .0
            .push(RelayedCall::new(name, args)),
        Err(e) => warn!(callback = name, error = %e, "dropping callback with unserializable arguments"),
    }
}

/// Attributes of the iframe for a nested block rendered under `parent`.
#[op2]
#[serde]
pub fn op_block_nested_frame(
    #[serde] parent: Context,
    #[serde] block: BlockIdentity,
    #[serde] child: Context,
) -> Result<NestedFrame, Error> {
    NestedFrame::for_child(&parent, block, &child).map_err(Error::from)
}

// ============================================================================
// Browser Globals
// ============================================================================

#[op2]
#[string]
pub fn op_crypto_random_uuid() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[op2(fast)]
pub fn op_crypto_get_random_values(#[buffer] buf: &mut [u8]) {
    use rand::RngCore;
    rand::thread_rng().fill_bytes(buf);
}

#[op2]
#[string]
pub fn op_btoa(#[string] data: &str) -> Result<String, Error> {
    use base64::Engine;
    // btoa expects Latin-1, but UTF-8 input is accepted
    Ok(base64::engine::general_purpose::STANDARD.encode(data.as_bytes()))
}

#[op2]
#[string]
pub fn op_atob(#[string] data: &str) -> Result<String, Error> {
    use base64::Engine;
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(data)
        .map_err(|e| anyhow!("Invalid base64: {}", e))?;
    String::from_utf8(bytes).map_err(|e| anyhow!("Invalid UTF-8 in decoded data: {}", e))
}

// ============================================================================
// Extension Definition
// ============================================================================

deno_core::extension!(
    block_frame,
    ops = [
        op_block_console_log,
        op_block_console_warn,
        op_block_console_error,
        op_block_require,
        op_block_relay,
        op_block_nested_frame,
        op_crypto_random_uuid,
        op_crypto_get_random_values,
        op_btoa,
        op_atob,
    ],
    esm_entry_point = "ext:block_frame/bootstrap.js",
    esm = ["ext:block_frame/bootstrap.js" = "src/bootstrap.js"],
);
