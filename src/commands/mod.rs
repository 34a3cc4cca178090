//! Command handlers for the CLI application.
//!
//! This module organizes command handlers by category:
//! - `query`: Read-only commands (list, info)
//! - `set`: Setting commands (brightness, led, effect, reset)
//! - `matrix`: Per-key frame commands (fill, row, animate)

pub mod matrix;
pub mod query;
pub mod set;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use chroma_device::{ChromaDevice, ModelRegistry};
use chroma_driver::DriverConfig;
use hidapi::HidApi;

/// Result type for command handlers
pub type CommandResult = Result<()>;

/// Shared state for all command handlers
pub struct Context {
    pub api: HidApi,
    pub registry: ModelRegistry,
    pub config: DriverConfig,
    pub pid: Option<u16>,
}

impl Context {
    pub fn new(config: DriverConfig, pid: Option<u16>) -> Result<Self> {
        let api = HidApi::new().context("Failed to initialize HID API")?;
        Ok(Self {
            api,
            registry: config.registry(),
            config,
            pid,
        })
    }

    /// Open the selected device
    pub fn open(&self) -> Result<ChromaDevice> {
        chroma_driver::open_device(
            &self.api,
            &self.registry,
            self.pid,
            self.config.transaction.clone(),
        )
    }
}

/// Set up a Ctrl-C handler that sets the given flag to false when triggered.
/// Returns the Arc<AtomicBool> for use in the main loop.
pub fn setup_interrupt_handler() -> Arc<AtomicBool> {
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);

    ctrlc::set_handler(move || {
        running_clone.store(false, Ordering::SeqCst);
    })
    .ok();

    running
}
