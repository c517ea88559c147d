//! Block frame CLI
//!
//! Runs one frame as a persistent process. The parent frame talks to it over
//! stdio, one JSON message per line.
//!
//!   block-frame [--libs-dir <dir> --preload <file>...] [--dev-server <url>]
//!
//! Input (stdin):
//!   {"type":"setProps","props":{"bundle":[{"name":"index.js","content":"..."}]}}
//!   {"type":"setProps","props":{"props":{"block":{...},"context":{...}}}}
//!   {"type":"hashchange","hash":"#..."}
//!
//! Output (stdout):
//!   {"type":"loaded","hash":"#..."}
//!   {"type":"callback","name":"onUpdateContent","args":["..."]}
//!
//! Any fatal frame error ends the process with a non-zero status; the parent
//! treats that as the block failing to load.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use block_frame::{
    Frame, FrameConfig, HttpDevServerLoader, JsRealm, ModuleResolver, OutboundMessage,
    ParentFrame, Session,
};
use clap::Parser;
use serde_json::Value;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "block-frame", version, about = "Sandboxed block frame runtime")]
struct Cli {
    /// Directory containing host library scripts
    #[arg(long)]
    libs_dir: Option<PathBuf>,

    /// Host library script to evaluate at startup, relative to --libs-dir (repeatable)
    #[arg(long = "preload", value_name = "FILE")]
    preload: Vec<String>,

    /// Base URL of a local dev server serving block bundles
    #[arg(long)]
    dev_server: Option<String>,

    /// Location hash the frame starts with
    #[arg(long, default_value = "")]
    hash: String,

    /// V8 heap limit in megabytes
    #[arg(long, default_value_t = 64)]
    max_heap_mb: usize,

    /// Per-script timeout in milliseconds (0 = unlimited)
    #[arg(long, default_value_t = 30_000)]
    timeout_ms: u64,

    /// Owner whose blocks receive the privileged callback set
    #[arg(long)]
    privileged_owner: Option<String>,
}

impl Cli {
    fn into_config(self) -> Result<(FrameConfig, String)> {
        let max_heap_size = self
            .max_heap_mb
            .checked_mul(1024 * 1024)
            .ok_or_else(|| anyhow!("--max-heap-mb {} is too large", self.max_heap_mb))?;
        let mut config = FrameConfig {
            libs_dir: self.libs_dir,
            preload: self.preload,
            max_heap_size: Some(max_heap_size),
            script_timeout_ms: (self.timeout_ms > 0).then_some(self.timeout_ms),
            dev_server: self.dev_server,
            ..Default::default()
        };
        if let Some(owner) = self.privileged_owner {
            config.callbacks.privileged_owner = owner;
        }
        Ok((config, self.hash))
    }
}

/// Posts outbound messages as JSON lines on stdout
struct StdoutParent;

impl ParentFrame for StdoutParent {
    fn post(&mut self, message: OutboundMessage) {
        if let Err(e) = write_message(&message) {
            error!(error = %e, "failed to post message to parent");
        }
    }
}

/// Write one outbound message as a JSON line
fn write_message(message: &OutboundMessage) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer(&mut stdout, message)?;
    writeln!(stdout)?;
    stdout.flush()?;
    Ok(())
}

async fn run(config: FrameConfig, initial_hash: String) -> Result<()> {
    let realm = JsRealm::new(&config, ModuleResolver::standard())?;
    let mut session = Session::new(
        Frame::new(realm),
        config.callbacks.clone(),
        Box::new(StdoutParent),
    );
    if let Some(base) = &config.dev_server {
        session = session.with_dev_server(Box::new(HttpDevServerLoader::new(base)?));
    }

    session.on_hash_change(&initial_hash);
    info!("frame ready, reading from stdin...");

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let data: Value =
            serde_json::from_str(&line).map_err(|e| anyhow!("Invalid message JSON: {}", e))?;

        if data.get("type").and_then(Value::as_str) == Some("hashchange") {
            let hash = data.get("hash").and_then(Value::as_str).unwrap_or_default();
            session.on_hash_change(hash);
            continue;
        }
        session.handle_event(&data).await?;
    }

    info!("stdin closed, frame shutting down");
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let (config, hash) = Cli::parse().into_config()?;
    if let Err(e) = run(config, hash).await {
        error!(error = %e, "frame crashed");
        return Err(e);
    }
    Ok(())
}
