//! Server configuration.
//!
//! Layered as: built-in defaults, then an optional `coreport.toml` in the
//! working directory, then `COREPORT__*` environment variables
//! (`COREPORT__DB__URL`, `COREPORT__LINKS__STRICT_UNLINK`, ...).

use std::net::SocketAddr;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use coreport_db::DbConfig;
use coreport_links::LinkConfig;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub bind_addr: String,
    /// `EnvFilter` directive, e.g. `info` or `coreport_links=debug,info`.
    pub log_level: String,
    /// `json` or `text`.
    pub log_format: String,
    #[serde(default)]
    pub db: DbConfig,
    #[serde(default)]
    pub links: LinkConfig,
}

impl Settings {
    /// Load settings from the file and environment layers.
    pub fn load() -> Result<Self, SettingsError> {
        let builder = Self::defaults()?
            .add_source(File::with_name("coreport").required(false))
            .add_source(
                Environment::with_prefix("COREPORT")
                    .prefix_separator("__")
                    .separator("__"),
            );
        Self::build(builder)
    }

    pub fn from_toml(source: &str) -> Result<Self, SettingsError> {
        let builder =
            Self::defaults()?.add_source(File::from_str(source, config::FileFormat::Toml));
        Self::build(builder)
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, SettingsError> {
        Ok(Config::builder()
            .set_default("bind_addr", "0.0.0.0:8080")?
            .set_default("log_level", "info")?
            .set_default("log_format", "json")?)
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> Result<Self, SettingsError> {
        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        self.socket_addr()?;
        match self.log_format.to_lowercase().as_str() {
            "json" | "text" => Ok(()),
            other => Err(SettingsError::Validation(format!(
                "log_format must be json or text, got {other}"
            ))),
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, SettingsError> {
        self.bind_addr.parse().map_err(|e| {
            SettingsError::Validation(format!("invalid bind_addr {}: {e}", self.bind_addr))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_empty_source() {
        let settings = Settings::from_toml("").unwrap();
        assert_eq!(settings.bind_addr, "0.0.0.0:8080");
        assert_eq!(settings.log_format, "json");
        assert_eq!(settings.db.namespace, "coreport");
        assert!(!settings.links.strict_unlink);
    }

    #[test]
    fn file_overrides_nested_sections() {
        let settings = Settings::from_toml(
            r#"
            bind_addr = "127.0.0.1:9000"
            log_format = "text"

            [db]
            url = "db.internal:8000"

            [links]
            strict_unlink = true
            "#,
        )
        .unwrap();
        assert_eq!(settings.socket_addr().unwrap().port(), 9000);
        assert_eq!(settings.db.url, "db.internal:8000");
        assert_eq!(settings.db.database, "main");
        assert!(settings.links.strict_unlink);
    }

    #[test]
    fn rejects_unknown_log_format() {
        let err = Settings::from_toml(r#"log_format = "xml""#).unwrap_err();
        assert!(matches!(err, SettingsError::Validation(_)));
    }

    #[test]
    fn rejects_bad_bind_addr() {
        let err = Settings::from_toml(r#"bind_addr = "nowhere""#).unwrap_err();
        assert!(matches!(err, SettingsError::Validation(_)));
    }
}
