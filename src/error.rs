//! Error types for Cryptic.
//!
//! One enum per domain, folded into the top-level [`Error`]. The encryption
//! core maps structural failures onto this fixed taxonomy and propagates
//! foreign errors (remote KMS, store drivers, the random source) verbatim.

use thiserror::Error;

/// Encryption provider errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EncryptError {
    /// The record was produced by a different encryptor than the one invoked.
    #[error("wrong encryptor kind")]
    WrongKind,

    /// Message authentication failed.
    ///
    /// Deliberately indistinguishable from a truncated ciphertext; callers
    /// learn nothing about where verification failed.
    #[error("invalid HMAC")]
    InvalidHmac,

    /// The ciphertext is structurally invalid: too short to carry an
    /// IV/nonce, or the AEAD tag did not verify.
    #[error("invalid ciphertext")]
    InvalidCiphertext,

    /// The encryption key fails its length precondition.
    #[error("key provided is too short")]
    KeyTooShort,

    /// The HMAC key is empty.
    #[error("HMAC key is required")]
    HmacKeyTooShort,

    /// A wrapping provider could not recover required metadata from the
    /// record context.
    #[error("missing required context data")]
    MissingContext,
}

/// Store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The secret name is empty.
    #[error("invalid secret name")]
    InvalidName,

    /// No secret is stored under the given name.
    #[error("secret not found")]
    NotFound,

    /// A secret already exists under the given name; overwrite is refused.
    #[error("secret already exists")]
    AlreadyExists,

    /// The record could not be encoded or decoded.
    #[error("record codec failure: {0}")]
    Codec(#[source] serde_json::Error),

    #[error(transparent)]
    Redis(#[from] redis::RedisError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Remote KMS failures, passed through the envelope wrapper unchanged.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum KmsError {
    #[error("failed to start KMS runtime: {0}")]
    Runtime(String),

    #[error("KMS request failed: {0}")]
    Request(String),

    #[error("KMS response missing {0}")]
    MissingField(&'static str),
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("unknown encryptor: {0}")]
    UnknownEncryptor(String),

    #[error("unknown store: {0}")]
    UnknownStore(String),

    #[error("kms: no key ID set")]
    MissingKmsKeyId,
}

/// Top-level Cryptic error type.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Encrypt(#[from] EncryptError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Kms(#[from] KmsError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The cryptographically secure random source failed. Fatal, no fallback.
    #[error("random source failure: {0}")]
    Rng(#[from] rand::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Cryptic operations.
pub type Result<T> = std::result::Result<T, Error>;
