//! logging
//!
//! Tracing subscriber setup for hosts that do not install their own.
//!
//! Environment variables (in priority order):
//! - `RUST_LOG`: Standard filter directives (takes precedence over config)
//! - `SPECMETA_LOG_FORMAT`: Override format (`json`, `pretty`)
//!
//! Output always goes to stderr.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::core::config::{Config, LogFormat};

/// Install a global subscriber built from `config`.
///
/// Returns `false` when a subscriber was already installed; the existing
/// one is kept.
pub fn initialize(config: &Config) -> bool {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level().to_lowercase()));

    let format = std::env::var("SPECMETA_LOG_FORMAT")
        .ok()
        .and_then(|f| parse_format(&f))
        .unwrap_or_else(|| config.log_format());

    let installed = match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .try_init(),
    };
    installed.is_ok()
}

fn parse_format(name: &str) -> Option<LogFormat> {
    match name.to_lowercase().as_str() {
        "json" => Some(LogFormat::Json),
        "pretty" | "human" => Some(LogFormat::Pretty),
        _ => None,
    }
}
