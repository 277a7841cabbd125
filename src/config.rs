//! Application settings.
//!
//! Sources are layered, later ones winning:
//! built-in defaults, `config/default.toml`, `config/{RUN_ENV}.toml`,
//! then `APP__<SECTION>__<KEY>` environment variables
//! (e.g. `APP__DATABASE__URL`, `APP__LISTING__PAGE_SIZE`).

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};
use validator::{Validate, ValidationError, ValidationErrors};

const CONFIG_DIR: &str = "config";
const DEVELOPMENT: &str = "development";
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Deployment profile; `development` relaxes CORS and logs SQL
    pub environment: String,
    #[validate]
    pub server: ServerSettings,
    #[validate]
    pub database: DatabaseSettings,
    #[validate]
    pub logging: LoggingSettings,
    #[validate]
    pub listing: ListingSettings,
}

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSettings {
    #[validate(length(min = 1))]
    pub host: String,
    pub port: u16,
    /// Comma-separated origins allowed to call the API from a browser
    pub cors_allowed_origins: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseSettings {
    #[validate(length(min = 1))]
    pub url: String,
    #[validate(range(min = 1))]
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub acquire_timeout_secs: u64,
    /// Apply pending migrations before serving
    pub auto_migrate: bool,
}

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSettings {
    #[validate(custom = "validate_log_level")]
    pub level: String,
    /// One JSON object per event instead of human readable lines
    pub json: bool,
}

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct ListingSettings {
    /// Products per page of the product list
    #[validate(range(min = 1, max = 100))]
    pub page_size: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: DEVELOPMENT.to_string(),
            server: ServerSettings::default(),
            database: DatabaseSettings::default(),
            logging: LoggingSettings::default(),
            listing: ListingSettings::default(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cors_allowed_origins: None,
        }
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: "sqlite://catalog.db?mode=rwc".to_string(),
            max_connections: 16,
            min_connections: 2,
            connect_timeout_secs: 30,
            idle_timeout_secs: 600,
            acquire_timeout_secs: 8,
            auto_migrate: false,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Default for ListingSettings {
    fn default() -> Self {
        Self {
            page_size: 10,
        }
    }
}

impl DatabaseSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}

impl AppConfig {
    /// Defaults everywhere except the database, bind address and profile
    pub fn new(database_url: String, host: String, port: u16, environment: String) -> Self {
        let mut cfg = Self {
            environment,
            ..Self::default()
        };
        cfg.database.url = database_url;
        cfg.server.host = host;
        cfg.server.port = port;
        cfg
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case(DEVELOPMENT)
    }

    /// Configured CORS origins with blanks dropped
    pub fn cors_origins(&self) -> Vec<String> {
        let Some(raw) = self.server.cors_allowed_origins.as_deref() else {
            return Vec::new();
        };
        raw.split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Field rules plus the constraints spanning several fields
    pub fn check(&self) -> Result<(), ValidationErrors> {
        self.validate()?;

        let mut errors = ValidationErrors::new();
        if self.database.min_connections > self.database.max_connections {
            errors.add(
                "database",
                invalid("min_connections", "min_connections exceeds max_connections"),
            );
        }

        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    if LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
        Ok(())
    } else {
        Err(invalid("log_level", "expected trace, debug, info, warn or error"))
    }
}

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("failed to read configuration: {0}")]
    Load(#[from] ConfigError),

    #[error("invalid configuration: {0}")]
    Validation(#[from] ValidationErrors),
}

/// Installs the global subscriber. `RUST_LOG` overrides the configured level.
pub fn init_tracing(logging: &LoggingSettings) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "product_catalog={level},tower_http=debug,sea_orm=warn",
            level = logging.level
        ))
    });

    let builder = fmt().with_env_filter(filter).with_target(true);
    let _ = if logging.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

/// Reads settings from `./config` and the environment
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    load_config_from(Path::new(CONFIG_DIR))
}

/// Reads settings with TOML files taken from `config_dir`
pub fn load_config_from(config_dir: &Path) -> Result<AppConfig, AppConfigError> {
    let profile = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEVELOPMENT.to_string());

    if !config_dir.is_dir() {
        warn!(dir = %config_dir.display(), "config directory missing, using defaults and environment");
    }

    let cfg: AppConfig = Config::builder()
        .add_source(File::from(config_dir.join("default")).required(false))
        .add_source(File::from(config_dir.join(&profile)).required(false))
        .add_source(
            Environment::with_prefix("APP")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()?;

    cfg.check()?;

    info!(
        profile = %profile,
        environment = %cfg.environment,
        port = cfg.server.port,
        "configuration loaded"
    );
    Ok(cfg)
}
