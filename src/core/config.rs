//! Configuration file management.
//!
//! Settings live in `cryptic.toml`, searched for in the current directory
//! and then `/etc/cryptic/`. A missing file is not an error (every key has
//! a default) but a malformed file is.
//!
//! The loaded [`Config`] is an immutable value passed from the entry point
//! into encryptor and store construction; there is no global accessor.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::error::{ConfigError, Result};

/// Configuration file name.
const CONFIG_FILE: &str = "cryptic.toml";

/// Directories searched for the configuration file, first match wins.
const SEARCH_PATH: [&str; 2] = [".", "/etc/cryptic"];

/// Root configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage backend: `redis` or `db`.
    pub store: String,
    /// Encryptor composition: `aes`, `aes-gcm`, `aes-pbkdf2`,
    /// `aes-gcm-pbkdf2` or `kms`.
    pub encryptor: String,
    pub aes: AesConfig,
    pub kms: KmsConfig,
    pub redis: RedisConfig,
    pub db: DbConfig,
}

/// Keys for the AES-based encryptors. `key` doubles as the PBKDF2 source
/// key for the `*-pbkdf2` compositions.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AesConfig {
    pub key: String,
    pub hmac_key: String,
}

/// Remote KMS wrapper parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KmsConfig {
    pub key_id: String,
    pub region: String,
}

/// Redis driver tuning.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    /// `ip:port`
    pub host: String,
    pub db_index: i64,
    pub password: String,
    pub max_retries: u32,
    pub read_timeout_secs: u64,
    pub write_timeout_secs: u64,
}

/// Database driver tuning. The schema names are expected to be trusted
/// input.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    /// `ip:port`
    pub host: String,
    pub username: String,
    pub password: String,
    /// Database name.
    pub name: String,
    pub table: String,
    pub key_column: String,
    pub value_column: String,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            store: "redis".to_string(),
            encryptor: "kms".to_string(),
            aes: AesConfig::default(),
            kms: KmsConfig::default(),
            redis: RedisConfig::default(),
            db: DbConfig::default(),
        }
    }
}

impl Default for KmsConfig {
    fn default() -> KmsConfig {
        KmsConfig {
            key_id: String::new(),
            region: "eu-west-1".to_string(),
        }
    }
}

impl Default for RedisConfig {
    fn default() -> RedisConfig {
        RedisConfig {
            host: "127.0.0.1:6379".to_string(),
            db_index: 0,
            password: String::new(),
            max_retries: 0,
            read_timeout_secs: 3,
            write_timeout_secs: 5,
        }
    }
}

impl Default for DbConfig {
    fn default() -> DbConfig {
        DbConfig {
            host: "127.0.0.1:3306".to_string(),
            username: "root".to_string(),
            password: String::new(),
            name: "cryptic".to_string(),
            table: "secrets".to_string(),
            key_column: "name".to_string(),
            value_column: "data".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the search path, falling back to defaults
    /// when no file is present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a file exists but cannot be read or parsed.
    pub fn load() -> Result<Config> {
        for dir in SEARCH_PATH {
            let path = Path::new(dir).join(CONFIG_FILE);
            if path.exists() {
                return Config::load_from(&path);
            }
        }

        info!("no config file found, using defaults");
        Ok(Config::default())
    }

    /// Load configuration from an explicit path.
    pub fn load_from(path: &PathBuf) -> Result<Config> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let config: Config = toml::from_str(&contents).map_err(ConfigError::Parse)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();

        assert_eq!(config.store, "redis");
        assert_eq!(config.encryptor, "kms");
        assert_eq!(config.kms.region, "eu-west-1");
        assert_eq!(config.redis.host, "127.0.0.1:6379");
        assert_eq!(config.redis.read_timeout_secs, 3);
        assert_eq!(config.redis.write_timeout_secs, 5);
        assert_eq!(config.db.host, "127.0.0.1:3306");
        assert_eq!(config.db.username, "root");
        assert_eq!(config.db.name, "cryptic");
        assert_eq!(config.db.table, "secrets");
        assert_eq!(config.db.key_column, "name");
        assert_eq!(config.db.value_column, "data");
    }

    #[test]
    fn partial_file_keeps_defaults_for_the_rest() {
        let config: Config = toml::from_str(
            r#"
            encryptor = "aes"

            [aes]
            key = "anAesTestKey1234"
            hmac_key = "hmacKey"
            "#,
        )
        .unwrap();

        assert_eq!(config.encryptor, "aes");
        assert_eq!(config.aes.key, "anAesTestKey1234");
        assert_eq!(config.aes.hmac_key, "hmacKey");
        // Untouched sections fall back to defaults.
        assert_eq!(config.store, "redis");
        assert_eq!(config.kms.region, "eu-west-1");
    }

    #[test]
    fn load_from_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "store = \"db\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.store, "db");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "store = [not toml").unwrap();

        assert!(Config::load_from(&path).is_err());
    }
}
