//! Configuration module for the checksend server.
//!
//! Supports both command-line arguments and TOML configuration file.
//! CLI arguments take precedence over config file values.

use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;

/// Command-line arguments for the payload server
#[derive(Parser, Debug)]
#[command(name = "checksend")]
#[command(author = "checksend authors")]
#[command(version = "0.1.0")]
#[command(about = "Serve a checksummed synthetic payload to one client", long_about = None)]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to bind to (e.g., 127.0.0.1:12345)
    #[arg(short = 'l', long)]
    pub listen: Option<String>,

    /// Payload size in KiB
    #[arg(short = 's', long)]
    pub size_kb: Option<u64>,

    /// Path of the generated payload artifact
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// TOML configuration file structure
#[derive(Debug, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub payload: PayloadConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server-related configuration
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

/// Payload-related configuration
#[derive(Debug, Deserialize)]
pub struct PayloadConfig {
    /// Payload size in KiB
    #[serde(default = "default_size_kb")]
    pub size_kb: u64,
    /// Path of the generated artifact
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

impl Default for PayloadConfig {
    fn default() -> Self {
        Self {
            size_kb: default_size_kb(),
            output: default_output(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_listen() -> String {
    "127.0.0.1:12345".to_string()
}

fn default_size_kb() -> u64 {
    1
}

fn default_output() -> PathBuf {
    PathBuf::from("random_text_file.txt")
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Final resolved configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub listen: String,
    pub size_kb: u64,
    pub output: PathBuf,
    pub log_level: String,
}

impl Config {
    /// Load configuration from CLI args and optional TOML file.
    /// CLI arguments take precedence over TOML file values.
    pub fn load() -> Result<Self, ConfigError> {
        Self::resolve(CliArgs::parse())
    }

    fn resolve(cli: CliArgs) -> Result<Self, ConfigError> {
        // Load TOML config if specified
        let toml_config = if let Some(ref config_path) = cli.config {
            let contents = std::fs::read_to_string(config_path)
                .map_err(|e| ConfigError::FileRead(config_path.clone(), e))?;
            toml::from_str(&contents)
                .map_err(|e| ConfigError::TomlParse(config_path.clone(), e))?
        } else {
            TomlConfig::default()
        };

        // Merge CLI args with TOML config (CLI takes precedence)
        let config = Config {
            listen: cli.listen.unwrap_or(toml_config.server.listen),
            size_kb: cli.size_kb.unwrap_or(toml_config.payload.size_kb),
            output: cli.output.unwrap_or(toml_config.payload.output),
            log_level: if cli.log_level != "info" {
                cli.log_level
            } else {
                toml_config.logging.level
            },
        };

        // The wire contract requires a non-empty payload
        if config.size_kb == 0 {
            return Err(ConfigError::ZeroSize);
        }

        Ok(config)
    }

    /// Requested payload size in bytes.
    pub fn size_bytes(&self) -> usize {
        self.size_kb as usize * 1024
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file '{0}': {1}")]
    FileRead(PathBuf, #[source] std::io::Error),

    #[error("failed to parse config file '{0}': {1}")]
    TomlParse(PathBuf, #[source] toml::de::Error),

    #[error("payload size must be greater than zero")]
    ZeroSize,
}
