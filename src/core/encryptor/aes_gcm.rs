//! AES-GCM AEAD encryptor.
//!
//! Wire format: 12-byte nonce followed by the sealed ciphertext with the
//! authentication tag appended. The record `mac` field is unused; integrity
//! comes from the GCM tag.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes128Gcm, Aes256Gcm, KeyInit, Nonce};
use rand::rngs::OsRng;
use rand::RngCore;

use super::Encryptor;
use crate::core::record::{Kind, Record};
use crate::error::{EncryptError, Result};

type Aes192Gcm = aes_gcm::AesGcm<aes::Aes192, aes_gcm::aead::generic_array::typenum::U12>;

const NONCE_SIZE: usize = 12;

enum GcmCipher {
    Aes128(Box<Aes128Gcm>),
    Aes192(Box<Aes192Gcm>),
    Aes256(Box<Aes256Gcm>),
}

impl GcmCipher {
    fn from_key(key: &[u8]) -> Result<Self> {
        let cipher = match key.len() {
            16 => GcmCipher::Aes128(Box::new(
                Aes128Gcm::new_from_slice(key).map_err(|_| EncryptError::KeyTooShort)?,
            )),
            24 => GcmCipher::Aes192(Box::new(
                Aes192Gcm::new_from_slice(key).map_err(|_| EncryptError::KeyTooShort)?,
            )),
            32 => GcmCipher::Aes256(Box::new(
                Aes256Gcm::new_from_slice(key).map_err(|_| EncryptError::KeyTooShort)?,
            )),
            _ => return Err(EncryptError::KeyTooShort.into()),
        };
        Ok(cipher)
    }

    fn seal(&self, nonce: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
        match self {
            GcmCipher::Aes128(c) => c.encrypt(Nonce::from_slice(nonce), plaintext),
            GcmCipher::Aes192(c) => c.encrypt(Nonce::from_slice(nonce), plaintext),
            GcmCipher::Aes256(c) => c.encrypt(Nonce::from_slice(nonce), plaintext),
        }
        .map_err(|_| EncryptError::InvalidCiphertext.into())
    }

    fn open(&self, nonce: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
        match self {
            GcmCipher::Aes128(c) => c.decrypt(Nonce::from_slice(nonce), ciphertext),
            GcmCipher::Aes192(c) => c.decrypt(Nonce::from_slice(nonce), ciphertext),
            GcmCipher::Aes256(c) => c.decrypt(Nonce::from_slice(nonce), ciphertext),
        }
        .map_err(|_| EncryptError::InvalidCiphertext.into())
    }
}

/// AES-GCM encryptor.
pub struct AesGcm {
    cipher: GcmCipher,
}

impl AesGcm {
    /// Create an encryptor from an AES key of 16, 24 or 32 bytes.
    ///
    /// # Errors
    ///
    /// `KeyTooShort` for any other key length.
    pub fn new(aes_key: &[u8]) -> Result<AesGcm> {
        Ok(AesGcm {
            cipher: GcmCipher::from_key(aes_key)?,
        })
    }
}

impl Encryptor for AesGcm {
    /// Generate a unique nonce and seal the secret.
    fn encrypt(&self, secret: &[u8]) -> Result<Record> {
        let mut nonce = [0u8; NONCE_SIZE];
        OsRng.try_fill_bytes(&mut nonce)?;

        let sealed = self.cipher.seal(&nonce, secret)?;

        let mut ciphertext = Vec::with_capacity(NONCE_SIZE + sealed.len());
        ciphertext.extend_from_slice(&nonce);
        ciphertext.extend_from_slice(&sealed);

        Ok(Record {
            ciphertext,
            mac: Vec::new(),
            kind: Kind::AesGcm,
            context: None,
        })
    }

    /// Open the ciphertext; the GCM tag check covers integrity.
    ///
    /// A tag mismatch and a structurally broken ciphertext both surface as
    /// `InvalidCiphertext`; callers cannot distinguish tampering from
    /// truncation.
    fn decrypt(&self, record: &Record) -> Result<Vec<u8>> {
        if record.kind != Kind::AesGcm {
            return Err(EncryptError::WrongKind.into());
        }

        if record.ciphertext.len() < NONCE_SIZE {
            return Err(EncryptError::InvalidCiphertext.into());
        }

        let (nonce, body) = record.ciphertext.split_at(NONCE_SIZE);
        self.cipher.open(nonce, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn new_accepts_valid_key_lengths() {
        for len in [16, 24, 32] {
            assert!(AesGcm::new(&vec![0x61; len]).is_ok());
        }
    }

    #[test]
    fn new_rejects_bad_key_lengths() {
        for key in [&b""[..], b"short", b"seventeen bytes!!"] {
            assert!(matches!(
                AesGcm::new(key),
                Err(Error::Encrypt(EncryptError::KeyTooShort))
            ));
        }
    }

    #[test]
    fn round_trip() {
        let e = AesGcm::new(b"anAesTestKey1234").unwrap();

        let cases: [&[u8]; 3] = [
            b"i am a secret",
            &[
                0xb0, 0x75, 0x11, 0x62, 0xa2, 0x3e, 0x5f, 0x2f, 0xca, 0xa3, 0x00, 0x1d, 0x51,
                0x89, 0xc8, 0xe7, 0xb5, 0x15, 0xb9, 0x5c, 0x9b, 0x3e, 0x26, 0x5f, 0xb2, 0x6b,
                0x97, 0x41, 0x16, 0x2c, 0x47, 0x10,
            ],
            b"",
        ];

        for want in cases {
            let record = e.encrypt(want).unwrap();
            assert_eq!(record.kind, Kind::AesGcm);
            assert!(record.mac.is_empty());
            let got = e.decrypt(&record).unwrap();
            assert_eq!(got, want);
        }
    }

    #[test]
    fn fresh_nonce_each_encrypt() {
        let e = AesGcm::new(b"anAesTestKey1234").unwrap();
        let a = e.encrypt(b"same secret").unwrap();
        let b = e.encrypt(b"same secret").unwrap();
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn decrypt_rejects_wrong_kind() {
        let e = AesGcm::new(b"anAesTestKey1234").unwrap();
        let record = e.encrypt(b"secret").unwrap().with_kind(Kind::AesCtr);
        assert!(matches!(
            e.decrypt(&record),
            Err(Error::Encrypt(EncryptError::WrongKind))
        ));
    }

    #[test]
    fn short_ciphertext_is_invalid() {
        let e = AesGcm::new(b"anAesTestKey1234").unwrap();
        let record = Record {
            ciphertext: vec![0x42],
            mac: Vec::new(),
            kind: Kind::AesGcm,
            context: None,
        };
        assert!(matches!(
            e.decrypt(&record),
            Err(Error::Encrypt(EncryptError::InvalidCiphertext))
        ));
    }

    #[test]
    fn tampered_ciphertext_fails() {
        let e = AesGcm::new(b"anAesTestKey1234").unwrap();
        let record = e.encrypt(b"important secret").unwrap();

        for idx in [0, NONCE_SIZE, record.ciphertext.len() - 1] {
            let mut tampered = record.clone();
            tampered.ciphertext[idx] ^= 0x01;
            assert!(matches!(
                e.decrypt(&tampered),
                Err(Error::Encrypt(EncryptError::InvalidCiphertext))
            ));
        }
    }

    #[test]
    fn wrong_key_fails() {
        let a = AesGcm::new(b"anAesTestKey1234").unwrap();
        let b = AesGcm::new(b"aDifferentKey!!!").unwrap();
        let record = a.encrypt(b"secret").unwrap();
        assert!(b.decrypt(&record).is_err());
    }
}
