//! SQL store.
//!
//! One row per secret in a table with a UNIQUE key column. The table, key
//! column and value column names are configurable; they are expected to come
//! from trusted input (free from SQL injection vectors). The value column
//! must be a BLOB wide enough for the serialized record.
//!
//! Unlike the other stores, `put` does not normalize a duplicate key to
//! `AlreadyExists`: the UNIQUE constraint enforces no-overwrite and each
//! driver words that violation differently, so the driver error is surfaced
//! verbatim.

use sqlx::mysql::MySqlPool;

use super::Store;
use crate::core::config::DbConfig;
use crate::core::record::Record;
use crate::error::{Result, StoreError};

/// MySQL-backed store.
///
/// The async driver runs on a store-owned current-thread runtime so the
/// store contract stays synchronous.
pub struct Db {
    pool: MySqlPool,
    runtime: tokio::runtime::Runtime,
    get_sql: String,
    put_sql: String,
    delete_sql: String,
}

/// Compose the three statements for the configured schema.
fn statements(table: &str, key: &str, value: &str) -> (String, String, String) {
    (
        format!("SELECT `{value}` FROM `{table}` WHERE `{key}` = ? LIMIT 1"),
        format!("INSERT INTO `{table}` (`{key}`, `{value}`) VALUES (?, ?)"),
        format!("DELETE FROM `{table}` WHERE `{key}` = ?"),
    )
}

impl Db {
    /// Connect to the configured database and prepare the statement text.
    pub fn connect(cfg: &DbConfig) -> Result<Db> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let url = format!(
            "mysql://{}:{}@{}/{}",
            cfg.username, cfg.password, cfg.host, cfg.name
        );
        let pool = runtime
            .block_on(MySqlPool::connect(&url))
            .map_err(StoreError::Database)?;

        let (get_sql, put_sql, delete_sql) =
            statements(&cfg.table, &cfg.key_column, &cfg.value_column);

        Ok(Db {
            pool,
            runtime,
            get_sql,
            put_sql,
            delete_sql,
        })
    }
}

impl Store for Db {
    fn put(&self, name: &str, record: &Record) -> Result<()> {
        if name.is_empty() {
            return Err(StoreError::InvalidName.into());
        }

        let buf = record.to_bytes()?;

        self.runtime
            .block_on(
                sqlx::query(&self.put_sql)
                    .bind(name)
                    .bind(buf)
                    .execute(&self.pool),
            )
            .map_err(StoreError::Database)?;

        Ok(())
    }

    fn get(&self, name: &str) -> Result<Record> {
        if name.is_empty() {
            return Err(StoreError::InvalidName.into());
        }

        let row: Option<(Vec<u8>,)> = self
            .runtime
            .block_on(
                sqlx::query_as(&self.get_sql)
                    .bind(name)
                    .fetch_optional(&self.pool),
            )
            .map_err(StoreError::Database)?;

        match row {
            Some((buf,)) => Record::from_bytes(&buf),
            None => Err(StoreError::NotFound.into()),
        }
    }

    fn delete(&self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(StoreError::InvalidName.into());
        }

        let result = self
            .runtime
            .block_on(sqlx::query(&self.delete_sql).bind(name).execute(&self.pool))
            .map_err(StoreError::Database)?;

        if result.rows_affected() < 1 {
            return Err(StoreError::NotFound.into());
        }

        Ok(())
    }
}
