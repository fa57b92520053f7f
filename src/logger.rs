//! Logging setup.
//!
//! Code logs through the `log` macros. [`init`] installs a `fern` dispatch
//! that formats each record once and fans it out to an in-memory [`Logger`]
//! (so a front end can show recent activity) and, when enabled, to a file.

use crate::config::LoggingConfig;
use crate::constants::{CONFIG_DIR_NAME, LOG_FILE_NAME};
use anyhow::{Context, Result};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

const MAX_BUFFERED_LOGS: usize = 1000;

/// Shared in-memory log buffer
#[derive(Clone)]
pub struct Logger {
    logs: Arc<Mutex<VecDeque<String>>>,
}

impl Logger {
    pub fn new() -> Self {
        Self {
            logs: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Add a log entry, evicting the oldest once the buffer is full
    pub fn log(&self, message: String) {
        if let Ok(mut logs) = self.logs.lock() {
            if logs.len() == MAX_BUFFERED_LOGS {
                logs.pop_front();
            }
            logs.push_back(message);
        }
    }

    /// Get all logs, newest first
    pub fn get_logs(&self) -> Vec<String> {
        if let Ok(logs) = self.logs.lock() {
            logs.iter().rev().cloned().collect()
        } else {
            Vec::new()
        }
    }

    pub fn len(&self) -> usize {
        self.logs.lock().map(|logs| logs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear all logs
    pub fn clear(&self) {
        if let Ok(mut logs) = self.logs.lock() {
            logs.clear();
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

/// Default log file location: `<data_dir>/portal/portal.log`
pub fn get_log_file_path() -> Result<PathBuf> {
    dirs::data_local_dir()
        .or_else(dirs::data_dir)
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))
        .map(|dir| dir.join(CONFIG_DIR_NAME).join(LOG_FILE_NAME))
}

/// Build the dispatch for `config` without installing it.
pub fn build_dispatch(config: &LoggingConfig, sink: &Logger) -> Result<fern::Dispatch> {
    let level = config.level_filter()?;
    let buffer = sink.clone();

    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}] {:<5} {}: {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(fern::Output::call(move |record| buffer.log(record.args().to_string())));

    if config.enabled {
        let path = match &config.file {
            Some(path) => path.clone(),
            None => get_log_file_path()?,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
        }
        let file = fern::log_file(&path).with_context(|| format!("Failed to open log file: {}", path.display()))?;
        dispatch = dispatch.chain(file);
    }

    Ok(dispatch)
}

/// Install the global logger. Returns the in-memory buffer it feeds.
pub fn init(config: &LoggingConfig) -> Result<Logger> {
    let logger = Logger::new();
    build_dispatch(config, &logger)?
        .apply()
        .context("Failed to install logger")?;
    Ok(logger)
}
