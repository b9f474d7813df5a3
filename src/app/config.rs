//! Application configuration
//!
//! Process-level settings derived from the command line.

use std::path::PathBuf;

/// Application configuration structure
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Verbosity level for logging
    pub verbose: u8,
    /// Explicit config file passed with `--config`
    pub config_path: Option<PathBuf>,
    /// Filter from the config file, used when no `-v` is given
    pub configured_log_level: Option<String>,
}

impl AppConfig {
    pub fn new(verbose: u8) -> Self {
        Self {
            verbose,
            ..Self::default()
        }
    }

    pub fn with_config_path(mut self, path: Option<PathBuf>) -> Self {
        self.config_path = path;
        self
    }

    pub fn with_log_level(mut self, level: Option<String>) -> Self {
        self.configured_log_level = level;
        self
    }

    /// Get the log filter based on verbosity
    pub fn log_level(&self) -> String {
        match self.verbose {
            0 => self
                .configured_log_level
                .clone()
                .unwrap_or_else(|| "info".to_string()),
            1 => "debug".to_string(),
            2 => "trace".to_string(),
            _ => "trace,hyper=debug,reqwest=debug".to_string(),
        }
    }
}
