//! Redis store.
//!
//! Secrets are stored one key per name, values are the raw serialized
//! record bytes, and no expiry is ever set.

use std::time::Duration;

use redis::Commands;
use tracing::trace;

use super::Store;
use crate::core::config::RedisConfig;
use crate::core::record::Record;
use crate::error::{Error, Result, StoreError};

/// Redis-backed store.
///
/// Holds a client handle only; a connection is established per operation, so
/// the store can be shared freely across threads.
pub struct Redis {
    client: redis::Client,
    max_retries: u32,
    read_timeout: Duration,
    write_timeout: Duration,
}

impl Redis {
    /// Create a store from redis driver settings.
    ///
    /// `host` is `ip:port`; a missing port falls back to 6379. No network
    /// traffic happens until the first operation.
    pub fn connect(cfg: &RedisConfig) -> Result<Redis> {
        let (host, port) = match cfg.host.split_once(':') {
            Some((host, port)) => (host, port.parse().unwrap_or(6379)),
            None => (cfg.host.as_str(), 6379),
        };

        let info = redis::ConnectionInfo {
            addr: redis::ConnectionAddr::Tcp(host.to_string(), port),
            redis: redis::RedisConnectionInfo {
                db: cfg.db_index,
                password: (!cfg.password.is_empty()).then(|| cfg.password.clone()),
                ..Default::default()
            },
        };

        let client = redis::Client::open(info).map_err(StoreError::Redis)?;

        Ok(Redis {
            client,
            max_retries: cfg.max_retries,
            read_timeout: Duration::from_secs(cfg.read_timeout_secs),
            write_timeout: Duration::from_secs(cfg.write_timeout_secs),
        })
    }

    fn connection(&self) -> Result<redis::Connection> {
        let mut attempt = 0;
        loop {
            match self.client.get_connection() {
                Ok(conn) => {
                    if !self.read_timeout.is_zero() {
                        conn.set_read_timeout(Some(self.read_timeout))
                            .map_err(StoreError::Redis)?;
                    }
                    if !self.write_timeout.is_zero() {
                        conn.set_write_timeout(Some(self.write_timeout))
                            .map_err(StoreError::Redis)?;
                    }
                    return Ok(conn);
                }
                Err(e) => {
                    if attempt >= self.max_retries {
                        return Err(StoreError::Redis(e).into());
                    }
                    attempt += 1;
                    trace!(attempt, "retrying redis connection");
                }
            }
        }
    }
}

impl Store for Redis {
    /// Store the record under `name` with no expiration.
    ///
    /// TODO: wrap the existence check and the SET in a WATCH transaction so
    /// two concurrent writers cannot both pass the check.
    fn put(&self, name: &str, record: &Record) -> Result<()> {
        if name.is_empty() {
            return Err(StoreError::InvalidName.into());
        }

        match self.get(name) {
            Err(Error::Store(StoreError::NotFound)) => {}
            Ok(_) => return Err(StoreError::AlreadyExists.into()),
            Err(e) => return Err(e),
        }

        let buf = record.to_bytes()?;

        let mut conn = self.connection()?;
        conn.set::<_, _, ()>(name, buf).map_err(StoreError::Redis)?;

        Ok(())
    }

    fn get(&self, name: &str) -> Result<Record> {
        if name.is_empty() {
            return Err(StoreError::InvalidName.into());
        }

        let mut conn = self.connection()?;
        let data: Option<Vec<u8>> = conn.get(name).map_err(StoreError::Redis)?;

        match data {
            // No bytes, no results.
            None => Err(StoreError::NotFound.into()),
            Some(buf) if buf.is_empty() => Err(StoreError::NotFound.into()),
            Some(buf) => Record::from_bytes(&buf),
        }
    }

    fn delete(&self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(StoreError::InvalidName.into());
        }

        // Existence check first so a vanished key reports NotFound.
        self.get(name)?;

        let mut conn = self.connection()?;
        conn.del::<_, ()>(name).map_err(StoreError::Redis)?;

        Ok(())
    }
}
