//! Command implementations.
//!
//! Handler functions for each CLI command, plus the glue that maps
//! configuration values onto concrete encryptors and stores.

use std::io::Write;

use colored::Colorize;
use tracing::debug;

use crate::cli::{Cli, Command};
use crate::core::config::Config;
use crate::core::encryptor::{aes_gcm_factory, AesCtr, AesGcm, Encryptor, Kdf, Kms};
use crate::core::store::{Db, Redis, Store};
use crate::error::{ConfigError, Result};

/// Execute a parsed command.
///
/// # Errors
///
/// Returns error if configuration loading, construction, or the underlying
/// encrypt/store operation fails.
pub fn execute(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Command::Put { name, value } => cmd_put(&config, &name, &value),
        Command::Get { name } => cmd_get(&config, &name),
    }
}

/// Encrypt a secret and store it.
fn cmd_put(config: &Config, name: &str, value: &str) -> Result<()> {
    let encryptor = build_encryptor(config)?;
    let store = build_store(config)?;

    let record = encryptor.encrypt(value.as_bytes())?;
    store.put(name, &record)?;

    println!("{} {}", "stored:".green().bold(), name);
    Ok(())
}

/// Fetch a secret and print the decrypted value verbatim, no trailing
/// newline.
fn cmd_get(config: &Config, name: &str) -> Result<()> {
    let encryptor = build_encryptor(config)?;
    let store = build_store(config)?;

    let record = store.get(name)?;
    let plain = encryptor.decrypt(&record)?;

    let mut stdout = std::io::stdout();
    stdout.write_all(&plain)?;
    stdout.flush()?;
    Ok(())
}

/// Build the configured encryptor composition.
///
/// The `Nop` encryptor is deliberately absent from this table.
pub fn build_encryptor(config: &Config) -> Result<Box<dyn Encryptor>> {
    let name = config.encryptor.to_lowercase();
    debug!(encryptor = %name, "building encryptor");

    match name.as_str() {
        "aes" => Ok(Box::new(AesCtr::new(
            config.aes.key.as_bytes(),
            config.aes.hmac_key.as_bytes(),
        )?)),

        "aes-gcm" => Ok(Box::new(AesGcm::new(config.aes.key.as_bytes())?)),

        "aes-pbkdf2" => Ok(Box::new(Kdf::new(config.aes.key.as_bytes())?)),

        "aes-gcm-pbkdf2" => Ok(Box::new(
            Kdf::new(config.aes.key.as_bytes())?.with_factory(aes_gcm_factory()),
        )),

        "kms" => {
            if config.kms.key_id.is_empty() {
                return Err(ConfigError::MissingKmsKeyId.into());
            }
            Ok(Box::new(Kms::new(&config.kms.key_id, &config.kms.region)))
        }

        _ => Err(ConfigError::UnknownEncryptor(name).into()),
    }
}

/// Build the configured storage backend.
pub fn build_store(config: &Config) -> Result<Box<dyn Store>> {
    let name = config.store.to_lowercase();
    debug!(store = %name, "building store");

    match name.as_str() {
        "redis" => Ok(Box::new(Redis::connect(&config.redis)?)),
        "db" => Ok(Box::new(Db::connect(&config.db)?)),
        _ => Err(ConfigError::UnknownStore(name).into()),
    }
}
