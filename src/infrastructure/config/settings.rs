use std::env;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::package::AmentIndex;

/// Prefix for environment overrides, e.g. `RESOURCE_PUBLISHER__SERVER__PORT`
pub const ENV_PREFIX: &str = "RESOURCE_PUBLISHER";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub packages: PackagesConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Serve the HTTP introspection surface while latched
    #[serde(default = "default_server_enabled")]
    pub enabled: bool,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// SSE keep-alive interval in seconds
    #[serde(default = "default_sse_keepalive")]
    pub sse_keepalive_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackagesConfig {
    /// Install prefixes searched for packages; empty means `AMENT_PREFIX_PATH`
    #[serde(default)]
    pub prefixes: Vec<PathBuf>,
}

fn default_server_enabled() -> bool {
    true
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8090
}

fn default_sse_keepalive() -> u64 {
    15
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Settings {
    /// Load settings, layering an optional explicit file over the defaults
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let mut builder = Config::builder()
            // Start with default values
            .set_default("server.enabled", default_server_enabled())?
            .set_default("server.host", default_host())?
            .set_default("server.port", i64::from(default_port()))?
            .set_default("server.sse_keepalive_secs", default_sse_keepalive() as i64)?
            .set_default("log.level", default_log_level())?
            .set_default("log.format", "pretty")?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false));

        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path).required(true));
        }

        // RESOURCE_PUBLISHER__SERVER__PORT, RESOURCE_PUBLISHER__PACKAGES__PREFIXES=/a,/b, ...
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("packages.prefixes"),
        );

        builder.build()?.try_deserialize()
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Package index for the configured prefixes
    pub fn package_index(&self) -> AmentIndex {
        if self.packages.prefixes.is_empty() {
            AmentIndex::from_env()
        } else {
            AmentIndex::new(self.packages.prefixes.clone())
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: default_server_enabled(),
            host: default_host(),
            port: default_port(),
            sse_keepalive_secs: default_sse_keepalive(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_default_values() {
        let server = ServerConfig::default();
        assert!(server.enabled);
        assert_eq!(server.host, "127.0.0.1");
        assert_eq!(server.port, 8090);

        let log = LogConfig::default();
        assert_eq!(log.level, "info");
        assert_eq!(log.format, LogFormat::Pretty);
    }

    #[test]
    fn test_explicit_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("publisher.toml");
        fs::write(
            &file,
            r#"
[server]
enabled = false
port = 9100

[log]
format = "json"

[packages]
prefixes = ["/opt/ros/overlay", "/opt/ros/humble"]
"#,
        )
        .unwrap();

        let settings = Settings::load(Some(file.as_path())).unwrap();
        assert!(!settings.server.enabled);
        assert_eq!(settings.server.port, 9100);
        assert_eq!(settings.log.format, LogFormat::Json);
        assert_eq!(
            settings.package_index().prefixes(),
            &[
                PathBuf::from("/opt/ros/overlay"),
                PathBuf::from("/opt/ros/humble")
            ]
        );
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Settings::load(Some(dir.path().join("absent.toml").as_path())).is_err());
    }
}
