//! Command-line arguments for `ragchat`.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

use crate::config::{ClientConfig, DEFAULT_CONFIG_FILENAME};
use crate::logging::LogDestination;

/// Terminal client for the recommendation chat.
#[derive(Parser, Debug)]
#[command(name = "ragchat", version, about)]
pub struct CliArgs {
    /// Path to the RON configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Server origin that relative endpoint URLs are resolved against.
    #[arg(long = "base-url")]
    pub base_url: Option<String>,

    /// Forgery-protection token sent with every POST.
    #[arg(long = "csrf-token")]
    pub csrf_token: Option<String>,

    /// Where log output goes.
    #[arg(long = "log", value_enum)]
    pub log: Option<LogDestination>,

    /// Log at debug level instead of info.
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl CliArgs {
    /// Priority: --config flag > RAGCHAT_CONFIG env var > ./ragchat.ron.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("RAGCHAT_CONFIG") {
            return PathBuf::from(p);
        }
        PathBuf::from(DEFAULT_CONFIG_FILENAME)
    }

    pub fn log_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }

    /// Overlay flags and env vars onto a loaded config.
    pub fn apply(&self, config: &mut ClientConfig) {
        if let Some(ref url) = self.base_url {
            config.base_url = url.clone();
        }
        if let Some(ref token) = self.csrf_token {
            config.csrf_token = token.clone();
        } else if let Ok(token) = std::env::var("RAGCHAT_CSRF_TOKEN") {
            config.csrf_token = token;
        }
        if let Some(log) = self.log {
            config.log = log;
        }
    }
}
