use std::env;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::telemetry::SinkConfig;

const DEFAULT_CONFIG_PATH: &str = "roster.toml";
const DEFAULT_PORT: u16 = 4545;
const DEFAULT_ROLLBAR_ENDPOINT: &str = "https://api.rollbar.com";

/// Top-level application configuration loaded from file + environment.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub telemetry: TelemetrySection,
    pub logging: LoggingSection,
}

impl AppConfig {
    /// Load configuration from disk and environment.
    ///
    /// `PORT` is honoured last so platform-assigned ports always win.
    pub fn load() -> Result<Self> {
        let config_path =
            env::var("ROSTER_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let builder = with_file(config::Config::builder(), Path::new(&config_path)).add_source(
            config::Environment::with_prefix("ROSTER")
                .separator("__")
                .try_parsing(true),
        );

        let mut config: Self = builder.build()?.try_deserialize()?;
        config.apply_port_override(env::var("PORT").ok().as_deref())?;
        config.normalize();

        Ok(config)
    }

    /// Load configuration from a single TOML file, ignoring the environment.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            bail!("configuration file {} does not exist", path.display());
        }

        let settings = with_file(config::Config::builder(), path)
            .build()
            .with_context(|| format!("failed to read {}", path.display()))?;
        let mut config: Self = settings.try_deserialize()?;
        config.normalize();

        Ok(config)
    }

    /// Apply the value of the `PORT` variable. Unset or blank values keep the
    /// configured port.
    pub fn apply_port_override(&mut self, port: Option<&str>) -> Result<()> {
        let Some(raw) = port.map(str::trim).filter(|p| !p.is_empty()) else {
            return Ok(());
        };

        self.server.port = raw
            .parse()
            .with_context(|| format!("invalid PORT value: {raw:?}"))?;
        Ok(())
    }

    /// Address the HTTP listener binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Path of the landing page served on `GET /`
    pub fn index_page(&self) -> PathBuf {
        self.server.static_dir.join("index.html")
    }

    fn normalize(&mut self) {
        if self.logging.level.trim().is_empty() {
            self.logging.level = "info".to_string();
        }

        if let Some(token) = self.telemetry.access_token.as_mut() {
            let trimmed = token.trim();
            if trimmed.is_empty() {
                self.telemetry.access_token = None;
            } else if trimmed.len() != token.len() {
                *token = trimmed.to_string();
            }
        }
    }
}

fn with_file(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
    path: &Path,
) -> config::ConfigBuilder<config::builder::DefaultState> {
    if path.exists() {
        builder.add_source(config::File::from(PathBuf::from(path)))
    } else {
        builder
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub static_dir: PathBuf,
    /// Reject malformed student submissions with 400 instead of a generic 500.
    pub strict_validation: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            static_dir: PathBuf::from("public"),
            strict_validation: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelemetrySection {
    pub enabled: bool,
    pub access_token: Option<String>,
    pub environment: String,
    pub endpoint: String,
    /// Report panics anywhere in the process
    pub capture_uncaught: bool,
}

impl TelemetrySection {
    /// Decide which sink events are delivered to.
    pub fn sink_config(&self) -> SinkConfig {
        match (&self.access_token, self.enabled) {
            (Some(token), true) => SinkConfig::Rollbar {
                access_token: token.clone(),
                environment: self.environment.clone(),
                endpoint: self.endpoint.trim_end_matches('/').to_string(),
            },
            _ => SinkConfig::Log,
        }
    }
}

impl Default for TelemetrySection {
    fn default() -> Self {
        Self {
            enabled: true,
            access_token: None,
            environment: "development".to_string(),
            endpoint: DEFAULT_ROLLBAR_ENDPOINT.to_string(),
            capture_uncaught: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LoggingSection {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}
