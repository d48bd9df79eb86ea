//! CLI configuration
//!
//! Layered: built-in defaults, then an optional TOML file, then `GOLDEX__`
//! environment variables (`GOLDEX__PROTOCOL__INITIAL_GOLD_PRICE=...`).

use anyhow::Context;
use goldex_economics::ProtocolConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Log output format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset
    #[serde(default)]
    pub level: Option<String>,

    #[serde(default)]
    pub format: LogFormat,
}

/// Everything the `goldex` binary reads from configuration
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub protocol: ProtocolConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load from `path` (if given) with environment overrides, then validate
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).format(config::FileFormat::Toml));
        }
        builder = builder.add_source(
            config::Environment::with_prefix("GOLDEX")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let app: AppConfig = builder
            .build()
            .context("failed to read configuration")?
            .try_deserialize()
            .context("invalid configuration")?;
        app.protocol
            .validate()
            .map_err(|e| anyhow::anyhow!("invalid protocol configuration: {e}"))?;
        Ok(app)
    }

    /// Defaults rendered as TOML
    pub fn default_toml() -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(&AppConfig::default())?)
    }
}
