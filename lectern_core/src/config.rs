use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

static DATA_DIR_NAME: &str = "lectern";
static LECTERN_DB_NAME: &str = "lectern_db.sqlite";
static CONFIG_FILE_NAME: &str = "config.json";

// data_dir_path
// |- lectern
//    |- lectern_db.sqlite
//    |- config.json

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to find a data directory on this platform")]
    NoDataDir,

    #[error("config file io error")]
    Io(#[from] std::io::Error),

    #[error("malformed config file")]
    Parse(#[from] serde_json::Error),

    #[error("invalid value for {name}: {value}")]
    InvalidOverride { name: &'static str, value: String },
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_max_connections() -> u32 {
    // SQLite serializes writers anyway
    1
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LecternConfig {
    /// Any sea-orm connection string; defaults to a SQLite file in the data dir.
    pub database_url: String,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// `serde(default)` keeps older config.json files loadable.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl LecternConfig {
    /// Creates a config whose SQLite database lives in `data_dir`
    fn new(data_dir: &Path) -> Self {
        let database_path = data_dir.join(LECTERN_DB_NAME);

        LecternConfig {
            database_url: format!("sqlite://{}?mode=rwc", database_path.display()),
            host: default_host(),
            port: default_port(),
            max_connections: default_max_connections(),
        }
    }

    /// Applies `LECTERN_*` overrides fetched through `lookup`.
    ///
    /// | Variable                  | Field             |
    /// |---------------------------|-------------------|
    /// | `LECTERN_DATABASE_URL`    | `database_url`    |
    /// | `LECTERN_HOST`            | `host`            |
    /// | `LECTERN_PORT`            | `port`            |
    /// | `LECTERN_MAX_CONNECTIONS` | `max_connections` |
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("LECTERN_DATABASE_URL") {
            self.database_url = url;
        }
        if let Some(host) = lookup("LECTERN_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("LECTERN_PORT") {
            self.port = port.parse().map_err(|_| ConfigError::InvalidOverride {
                name: "LECTERN_PORT",
                value: port,
            })?;
        }
        if let Some(max) = lookup("LECTERN_MAX_CONNECTIONS") {
            self.max_connections = max.parse().map_err(|_| ConfigError::InvalidOverride {
                name: "LECTERN_MAX_CONNECTIONS",
                value: max,
            })?;
        }
        Ok(self)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Gets the existing config from the platform data dir or initializes a new
/// one, then applies environment overrides.
pub async fn get_or_init() -> Result<LecternConfig, ConfigError> {
    let data_dir = dirs::data_dir().ok_or(ConfigError::NoDataDir)?;
    let config = load_or_init(&data_dir.join(DATA_DIR_NAME)).await?;
    config.with_overrides(|name| std::env::var(name).ok())
}

/// Reads `config.json` from `lectern_dir`, writing a fresh one first if it
/// doesn't exist yet.
pub async fn load_or_init(lectern_dir: &Path) -> Result<LecternConfig, ConfigError> {
    let config_path: PathBuf = lectern_dir.join(CONFIG_FILE_NAME);

    fs::create_dir_all(lectern_dir).await?;

    if config_path.exists() {
        let mut file = fs::File::open(&config_path).await?;
        let mut contents = String::new();
        file.read_to_string(&mut contents).await?;

        let config: LecternConfig = serde_json::from_str(&contents)?;
        tracing::debug!(path = %config_path.display(), "loaded config");
        Ok(config)
    } else {
        let config = LecternConfig::new(lectern_dir);

        let json = serde_json::to_string_pretty(&config)?;
        let mut file = fs::File::create(&config_path).await?;
        file.write_all(json.as_bytes()).await?;

        tracing::info!(path = %config_path.display(), "wrote default config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("lectern-config-{}", uuid::Uuid::now_v7()))
    }

    #[tokio::test]
    async fn test_first_run_writes_config_and_second_run_reads_it() {
        let dir = scratch_dir();

        let created = load_or_init(&dir).await.unwrap();
        assert!(dir.join(CONFIG_FILE_NAME).exists());
        assert!(created.database_url.starts_with("sqlite://"));
        assert!(created.database_url.contains(LECTERN_DB_NAME));

        let reloaded = load_or_init(&dir).await.unwrap();
        assert_eq!(created, reloaded);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_missing_optional_fields_fall_back_to_defaults() {
        let dir = scratch_dir();
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join(CONFIG_FILE_NAME),
            r#"{ "database_url": "sqlite::memory:" }"#,
        )
        .unwrap();

        let config = load_or_init(&dir).await.unwrap();
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.port, 3000);
        assert_eq!(config.max_connections, 1);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("LECTERN_DATABASE_URL", "postgres://localhost/lectern"),
            ("LECTERN_PORT", "8080"),
        ]);

        let config = LecternConfig::new(Path::new("/tmp/lectern"))
            .with_overrides(|name| env.get(name).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.database_url, "postgres://localhost/lectern");
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_bad_port_override_is_rejected() {
        let result = LecternConfig::new(Path::new("/tmp/lectern"))
            .with_overrides(|name| (name == "LECTERN_PORT").then(|| "eighty".to_string()));

        assert!(matches!(
            result,
            Err(ConfigError::InvalidOverride { name: "LECTERN_PORT", .. })
        ));
    }
}
