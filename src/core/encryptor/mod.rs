//! Encryption providers.
//!
//! Two primitives do the actual symmetric work:
//! - **aes-ctr**: AES in CTR mode with HMAC-SHA256 (encrypt-then-MAC)
//! - **aes-gcm**: AES-GCM AEAD
//!
//! Two wrappers derive or fetch the key material and delegate to an inner
//! primitive, stashing recovery metadata in the record context:
//! - **kdf**: PBKDF2-HMAC-SHA512 over a passphrase
//! - **kms**: AWS KMS envelope encryption with per-record data keys
//!
//! The [`Nop`] pass-through exists so wrapper behavior can be tested without
//! cryptographic confounds; it is never selectable from configuration.

use crate::core::record::Record;
use crate::error::Result;

mod aes_ctr;
mod aes_gcm;
mod kdf;
mod kms;
mod nop;

pub use aes_ctr::AesCtr;
pub use aes_gcm::AesGcm;
pub use kdf::{aes_gcm_factory, Kdf};
pub use kms::{AwsKms, DataKey, DataKeyService, Kms};
pub use nop::Nop;

/// An encryption provider.
///
/// Implementations hold only immutable configuration (keys, iteration
/// counts, remote client handles) and are safe to call concurrently.
pub trait Encryptor: Send + Sync {
    /// Encrypt a secret into a fresh record tagged with this encryptor's
    /// kind.
    fn encrypt(&self, secret: &[u8]) -> Result<Record>;

    /// Recover the plaintext from a record.
    ///
    /// # Errors
    ///
    /// Fails with `WrongKind` if the record was produced by a different
    /// encryptor kind, and with an encryptor-specific error otherwise.
    fn decrypt(&self, record: &Record) -> Result<Vec<u8>>;
}

/// Builds an initialized inner encryptor from raw key material.
///
/// Held by the wrapping encryptors so the primitive underneath a KDF or KMS
/// envelope can be swapped without touching the wrapper.
pub type KeyFactory = Box<dyn Fn(&[u8]) -> Result<Box<dyn Encryptor>> + Send + Sync>;
