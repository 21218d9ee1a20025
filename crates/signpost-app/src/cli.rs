//! CLI argument definitions for the Signpost console.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

/// Signpost: a menu-driven help desk assistant with free-text search.
#[derive(Parser, Debug)]
#[command(name = "signpost", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Conversation document to serve, overriding the configured source.
    #[arg(short = 'd', long = "document")]
    pub document: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// User id the console session speaks as.
    #[arg(long = "user-id", default_value_t = 1)]
    pub user_id: i64,

    /// Username the console session speaks as. Usernames listed under
    /// `[admin]` get the admin menu.
    #[arg(short = 'u', long = "username")]
    pub username: Option<String>,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > SIGNPOST_CONFIG env var > ~/.signpost/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("SIGNPOST_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the conversation source.
    ///
    /// Priority: --document flag > SIGNPOST_DOCUMENT env var > config file value.
    pub fn resolve_document(&self, config_source: &str) -> String {
        if let Some(ref d) = self.document {
            return d.clone();
        }
        if let Ok(d) = std::env::var("SIGNPOST_DOCUMENT") {
            return d;
        }
        config_source.to_string()
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_level.to_string())
    }
}

fn default_config_path() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".signpost").join("config.toml");
    }
    PathBuf::from("config.toml")
}
