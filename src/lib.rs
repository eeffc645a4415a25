//! Encrypted secret storage with composable encryption providers.
//!
//! Cryptic encrypts named secrets with one of several interchangeable
//! encryptors, persists the resulting self-describing [`Record`] in a
//! pluggable key-value store, and reverses the process on read.
//!
//! # Quick start
//!
//! ```no_run
//! use cryptic::{AesCtr, Encryptor, Memory, Store};
//!
//! # fn main() -> cryptic::Result<()> {
//! let store = Memory::new();
//!
//! // The AES key has to be either 16, 24, or 32 bytes.
//! let encryptor = AesCtr::new(b"anAesTestKey1234", b"superSecretHmacKey")?;
//!
//! // Encrypt the secret and store it
//! let record = encryptor.encrypt(b"something secret")?;
//! store.put("example", &record)?;
//!
//! // Time passes...
//!
//! // Fetch and decrypt
//! let record = store.get("example")?;
//! let plain = encryptor.decrypt(&record)?;
//! assert_eq!(plain, b"something secret");
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Primitives**: [`AesCtr`] (encrypt-then-MAC) and [`AesGcm`] (AEAD)
//!   perform the actual symmetric encryption.
//! - **Wrappers**: [`Kdf`] (PBKDF2 passphrase derivation) and [`Kms`] (AWS
//!   KMS envelope encryption) fetch or derive key material, delegate to an
//!   inner primitive, and stash recovery metadata in the record context.
//! - **Stores**: [`Memory`], [`Redis`] and [`Db`] persist serialized
//!   records under user-supplied names and refuse overwrites.
//!
//! Wrappers compose with primitives through a plain factory value, so the
//! cipher underneath a KDF or KMS envelope can be swapped freely. Every
//! record carries the kind tag of the encryptor that produced it; decryption
//! with the wrong encryptor fails fast rather than emitting garbage.

pub mod cli;
pub mod core;
pub mod error;

// Re-export the public API
pub use crate::core::config::{AesConfig, Config, DbConfig, KmsConfig, RedisConfig};
pub use crate::core::encryptor::{
    aes_gcm_factory, AesCtr, AesGcm, AwsKms, DataKey, DataKeyService, Encryptor, Kdf, KeyFactory,
    Kms, Nop,
};
pub use crate::core::record::{Context, ContextValue, KdfParameters, Kind, Record};
pub use crate::core::store::{Db, Memory, Redis, Store};
pub use crate::error::{
    ConfigError, EncryptError, Error, KmsError, Result, StoreError,
};
