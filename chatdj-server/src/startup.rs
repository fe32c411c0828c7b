//! Startup shared by both binaries: configuration, tracing and build id

use anyhow::{Context, Result};
use chatdj_common::config::{resolve_config_path, ConfigSource, TomlConfig};
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Load the config file (or defaults) and overlay environment variables
pub fn load_config(cli_path: Option<&Path>) -> Result<(TomlConfig, ConfigSource)> {
    let path = resolve_config_path(cli_path);
    let (mut config, source) = TomlConfig::load_or_default(path.as_deref())
        .context("Failed to load configuration")?;
    config.apply_env();
    Ok((config, source))
}

/// Log level for this run: the command-line value, else the configured one
pub fn log_level<'a>(cli_level: Option<&'a str>, config: &'a TomlConfig) -> &'a str {
    cli_level
        .filter(|level| !level.trim().is_empty())
        .unwrap_or(&config.logging.level)
}

/// Install the global subscriber
///
/// `RUST_LOG` wins over the configured level.
pub fn init_tracing(level: &str) {
    let default_filter = format!("chatdj_server={level},chatdj_common={level},tower_http={level}");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Log build identification and where configuration came from
pub fn log_startup(binary: &str, source: &ConfigSource) {
    info!(
        "{} v{} [{}] built {} ({})",
        binary,
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE"),
    );

    match source {
        ConfigSource::File(path) => info!("Configuration loaded from {}", path.display()),
        ConfigSource::Defaults(Some(path)) => warn!(
            "Config file {} not found, using defaults",
            path.display()
        ),
        ConfigSource::Defaults(None) => info!("No config file, using defaults"),
    }
}
