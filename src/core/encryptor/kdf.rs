//! Password-based key derivation wrapper.
//!
//! Derives a 64-byte key from a passphrase with PBKDF2-HMAC-SHA512, hands it
//! to an inner encryptor built by the configured factory, and records the
//! salt, iteration count and inner kind in the record context so decryption
//! can re-derive the same key.
//!
//! The iteration count is read back from the record on decrypt. That makes
//! records self-describing and iteration bumps painless, at the documented
//! cost that whoever controls the stored record controls the count. Store
//! records in trusted backends only.

use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha512;
use zeroize::Zeroize;

use super::{AesCtr, AesGcm, Encryptor, KeyFactory};
use crate::core::record::{ContextValue, KdfParameters, Kind, Record};
use crate::error::{EncryptError, Result};

/// Length of the derived key handed to the inner factory.
const DERIVED_KEY_SIZE: usize = 64;

/// Context key under which the KDF parameters are stored.
const CONTEXT_KEY: &str = "kdf";

const DEFAULT_SALT_SIZE: usize = 16;
const DEFAULT_ITERATIONS: u32 = 4096;

/// The default inner encryptor: AES-256-CTR keyed from the first half of the
/// derived key, HMAC keyed from the second half.
fn aes_ctr_factory() -> KeyFactory {
    Box::new(|key: &[u8]| {
        let aes = key.get(..32).ok_or(EncryptError::KeyTooShort)?;
        let hmac = key.get(32..).ok_or(EncryptError::KeyTooShort)?;
        Ok(Box::new(AesCtr::new(aes, hmac)?) as Box<dyn Encryptor>)
    })
}

/// An alternate inner factory: AES-256-GCM over the first half of the
/// derived key. The tail is unused.
pub fn aes_gcm_factory() -> KeyFactory {
    Box::new(|key: &[u8]| {
        let aes = key.get(..32).ok_or(EncryptError::KeyTooShort)?;
        Ok(Box::new(AesGcm::new(aes)?) as Box<dyn Encryptor>)
    })
}

/// PBKDF2 wrapping encryptor.
pub struct Kdf {
    factory: KeyFactory,
    salt_size: usize,
    iterations: u32,
    source_key: Vec<u8>,
}

impl Kdf {
    /// Create a wrapper around the default AES-CTR inner encryptor.
    ///
    /// # Errors
    ///
    /// `KeyTooShort` if the source key is empty.
    pub fn new(source_key: &[u8]) -> Result<Kdf> {
        if source_key.is_empty() {
            return Err(EncryptError::KeyTooShort.into());
        }

        Ok(Kdf {
            factory: aes_ctr_factory(),
            salt_size: DEFAULT_SALT_SIZE,
            iterations: DEFAULT_ITERATIONS,
            source_key: source_key.to_vec(),
        })
    }

    /// Replace the inner encryptor factory.
    pub fn with_factory(mut self, factory: KeyFactory) -> Kdf {
        self.factory = factory;
        self
    }

    /// Override the PBKDF2 iteration count used for new records.
    pub fn with_iterations(mut self, iterations: u32) -> Kdf {
        self.iterations = iterations;
        self
    }

    /// Override the salt length used for new records.
    pub fn with_salt_size(mut self, salt_size: usize) -> Kdf {
        self.salt_size = salt_size;
        self
    }

    fn build_inner(&self, salt: &[u8], iterations: u32) -> Result<Box<dyn Encryptor>> {
        let mut derived = [0u8; DERIVED_KEY_SIZE];
        pbkdf2_hmac::<Sha512>(&self.source_key, salt, iterations, &mut derived);

        let inner = (self.factory)(&derived);
        derived.zeroize();
        inner
    }
}

impl Encryptor for Kdf {
    fn encrypt(&self, secret: &[u8]) -> Result<Record> {
        let mut salt = vec![0u8; self.salt_size];
        OsRng.try_fill_bytes(&mut salt)?;

        let inner = self.build_inner(&salt, self.iterations)?;
        let mut record = inner.encrypt(secret)?;

        let orig_kind = record.kind.into();
        record.context_mut().insert(
            CONTEXT_KEY.to_string(),
            ContextValue::Kdf(KdfParameters {
                salt,
                orig_kind,
                iterations: self.iterations as i32,
            }),
        );
        record.kind = Kind::Pbkdf2;

        Ok(record)
    }

    fn decrypt(&self, record: &Record) -> Result<Vec<u8>> {
        if record.kind != Kind::Pbkdf2 {
            return Err(EncryptError::WrongKind.into());
        }

        let params = match record.context_get(CONTEXT_KEY) {
            Some(ContextValue::Kdf(params)) => params,
            _ => return Err(EncryptError::MissingContext.into()),
        };

        let iterations = u32::try_from(params.iterations)
            .ok()
            .filter(|&n| n > 0)
            .ok_or(EncryptError::MissingContext)?;
        let orig_kind =
            Kind::try_from(params.orig_kind).map_err(|_| EncryptError::MissingContext)?;

        let inner = self.build_inner(&params.salt, iterations)?;

        // Decrypt a copy carrying the inner kind; the caller's record stays
        // untouched.
        inner.decrypt(&record.with_kind(orig_kind))
    }
}
