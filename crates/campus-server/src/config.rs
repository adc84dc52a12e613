//! Server configuration loading from file and environment variables.

use campus_live::{validate_announcement, UpdateStore};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use thiserror::Error;

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server network settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Database settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Club token settings.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Live announcement channel settings.
    #[serde(default)]
    pub live: LiveConfig,
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,

    /// SQLite busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Maximum number of pooled connections.
    #[serde(default = "default_pool_max_size")]
    pub pool_max_size: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "campus_live=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

/// Token signing configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HS256 signing secret. When empty a random one is generated at
    /// startup and tokens do not survive a restart.
    #[serde(default)]
    pub jwt_secret: String,

    /// Token lifetime in hours.
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
}

/// Live channel configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LiveConfig {
    /// Capacity of each observer's outbound frame queue.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Announcements loaded into the store at startup, in order.
    #[serde(default = "default_seed")]
    pub seed: Vec<SeedAnnouncement>,
}

impl LiveConfig {
    /// Builds the startup store from `seed`, numbered from 1.
    ///
    /// Each entry passes the same check as a published announcement and is
    /// stored trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSeed`] for the first entry with a blank
    /// field.
    pub fn seed_store(&self) -> Result<UpdateStore, ConfigError> {
        let mut store = UpdateStore::new();
        for (index, seed) in self.seed.iter().enumerate() {
            let (event, update) = validate_announcement(&seed.event, &seed.update).map_err(
                |e| ConfigError::InvalidSeed {
                    index,
                    reason: e.to_string(),
                },
            )?;
            store.append(event, update);
        }
        Ok(store)
    }
}

/// One startup announcement.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SeedAnnouncement {
    pub event: String,
    #[serde(alias = "message")]
    pub update: String,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

fn default_port() -> u16 {
    5000
}

fn default_db_path() -> String {
    "campus.db".to_string()
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

fn default_pool_max_size() -> u32 {
    8
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_token_ttl_hours() -> i64 {
    campus_auth::DEFAULT_TOKEN_TTL_HOURS
}

fn default_queue_capacity() -> usize {
    campus_live::DEFAULT_QUEUE_CAPACITY
}

fn default_seed() -> Vec<SeedAnnouncement> {
    vec![
        SeedAnnouncement {
            event: "Seminar".to_string(),
            update: "Starts at 5 PM".to_string(),
        },
        SeedAnnouncement {
            event: "Photography Club".to_string(),
            update: "New event announced".to_string(),
        },
    ]
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
            pool_max_size: default_pool_max_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_hours: default_token_ttl_hours(),
        }
    }
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            seed: default_seed(),
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// A `[[live.seed]]` entry would store a blank field.
    #[error("invalid live.seed entry {index}: {reason}")]
    InvalidSeed { index: usize, reason: String },
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `CAMPUS_HOST` overrides `server.host`
/// - `CAMPUS_PORT` overrides `server.port`
/// - `CAMPUS_DB_PATH` overrides `database.path`
/// - `CAMPUS_LOG_LEVEL` overrides `logging.level`
/// - `CAMPUS_LOG_JSON` overrides `logging.json` (set to "true" to enable)
/// - `CAMPUS_JWT_SECRET` overrides `auth.jwt_secret`
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    apply_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

/// Applies `CAMPUS_*` overrides looked up through `var`.
///
/// Unparsable values are ignored and the file value is kept.
fn apply_overrides(config: &mut Config, var: impl Fn(&str) -> Option<String>) {
    if let Some(host) = var("CAMPUS_HOST") {
        if let Ok(parsed) = host.parse() {
            config.server.host = parsed;
        }
    }
    if let Some(port) = var("CAMPUS_PORT") {
        if let Ok(parsed) = port.parse() {
            config.server.port = parsed;
        }
    }
    if let Some(path) = var("CAMPUS_DB_PATH") {
        config.database.path = path;
    }
    if let Some(level) = var("CAMPUS_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = var("CAMPUS_LOG_JSON") {
        config.logging.json = json.eq_ignore_ascii_case("true") || json == "1";
    }
    if let Some(secret) = var("CAMPUS_JWT_SECRET") {
        config.auth.jwt_secret = secret;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn empty_file_gives_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.database.path, "campus.db");
        assert_eq!(config.auth.token_ttl_hours, 24);
        assert_eq!(config.live.queue_capacity, 256);
        assert_eq!(config.live.seed.len(), 2);
        assert_eq!(config.live.seed[0].event, "Seminar");
    }

    #[test]
    fn sections_are_parsed() {
        let config: Config = toml::from_str(
            r#"
            [server]
            host = "0.0.0.0"
            port = 8080

            [logging]
            level = "debug"
            json = true

            [live]
            queue_capacity = 16

            [[live.seed]]
            event = "Orientation"
            message = "Main hall, 9 AM"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert!(config.logging.json);
        assert_eq!(config.live.queue_capacity, 16);
        assert_eq!(
            config.live.seed,
            vec![SeedAnnouncement {
                event: "Orientation".to_string(),
                update: "Main hall, 9 AM".to_string(),
            }]
        );
    }

    #[test]
    fn empty_seed_list_is_respected() {
        let config: Config = toml::from_str("[live]\nseed = []\n").unwrap();
        assert!(config.live.seed.is_empty());
    }

    #[test]
    fn seed_store_trims_and_numbers_entries() {
        let config: Config = toml::from_str(
            r#"
            [[live.seed]]
            event = "  Orientation "
            update = "Main hall, 9 AM"

            [[live.seed]]
            event = "Quiz"
            update = "Round two"
            "#,
        )
        .unwrap();
        let records = config.live.seed_store().unwrap().snapshot();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, 1);
        assert_eq!(records[0].event, "Orientation");
        assert_eq!(records[1].id, 2);
    }

    #[test]
    fn blank_seed_entry_is_rejected() {
        let config: Config = toml::from_str(
            r#"
            [[live.seed]]
            event = "Seminar"
            update = "Starts at 5 PM"

            [[live.seed]]
            event = "Workshop"
            update = "   "
            "#,
        )
        .unwrap();
        let err = config.live.seed_store().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSeed { index: 1, .. }), "{err}");
    }

    #[test]
    fn env_overrides_win() {
        let vars: HashMap<&str, &str> = [
            ("CAMPUS_PORT", "6001"),
            ("CAMPUS_HOST", "not-an-ip"),
            ("CAMPUS_DB_PATH", "/tmp/x.db"),
            ("CAMPUS_LOG_JSON", "TRUE"),
            ("CAMPUS_JWT_SECRET", "s3cret"),
        ]
        .into_iter()
        .collect();
        let mut config = Config::default();
        apply_overrides(&mut config, |key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.server.port, 6001);
        assert_eq!(config.server.host, default_host());
        assert_eq!(config.database.path, "/tmp/x.db");
        assert!(config.logging.json);
        assert_eq!(config.auth.jwt_secret, "s3cret");
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let config = load_config(path.to_str()).unwrap();
        assert_eq!(config.database.busy_timeout_ms, 5_000);
    }
}
