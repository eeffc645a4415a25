//! AES-CTR with HMAC-SHA256 message authentication.
//!
//! Encrypt-then-MAC: the HMAC covers the IV and the ciphertext, and is
//! verified in constant time before anything else happens on decrypt.

use aes::{Aes128, Aes192, Aes256};
use ctr::cipher::{KeyIvInit, StreamCipher};
use ctr::Ctr128BE;
use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;

use super::Encryptor;
use crate::core::record::{Kind, Record};
use crate::error::{EncryptError, Result};

type HmacSha256 = Hmac<Sha256>;

/// AES block size; the IV occupies one full block at the head of the
/// ciphertext.
const IV_SIZE: usize = 16;

/// AES key material, sized at construction.
#[derive(Clone)]
enum CtrKey {
    Aes128([u8; 16]),
    Aes192([u8; 24]),
    Aes256([u8; 32]),
}

impl CtrKey {
    fn from_slice(key: &[u8]) -> Result<Self> {
        match key.len() {
            16 => {
                let mut k = [0u8; 16];
                k.copy_from_slice(key);
                Ok(CtrKey::Aes128(k))
            }
            24 => {
                let mut k = [0u8; 24];
                k.copy_from_slice(key);
                Ok(CtrKey::Aes192(k))
            }
            32 => {
                let mut k = [0u8; 32];
                k.copy_from_slice(key);
                Ok(CtrKey::Aes256(k))
            }
            _ => Err(EncryptError::KeyTooShort.into()),
        }
    }

    /// XOR the CTR keystream into `buf`. The counter block is the full
    /// 16-byte IV, incremented big-endian.
    fn apply_keystream(&self, iv: &[u8; IV_SIZE], buf: &mut [u8]) {
        match self {
            CtrKey::Aes128(k) => Ctr128BE::<Aes128>::new(k.into(), iv.into()).apply_keystream(buf),
            CtrKey::Aes192(k) => Ctr128BE::<Aes192>::new(k.into(), iv.into()).apply_keystream(buf),
            CtrKey::Aes256(k) => Ctr128BE::<Aes256>::new(k.into(), iv.into()).apply_keystream(buf),
        }
    }
}

/// AES-CTR encryptor with SHA-256 message authentication.
pub struct AesCtr {
    key: CtrKey,
    hmac_key: Vec<u8>,
}

impl AesCtr {
    /// Create an encryptor from an AES key (16, 24 or 32 bytes) and a
    /// non-empty HMAC key.
    ///
    /// # Errors
    ///
    /// `KeyTooShort` for an invalid AES key length, `HmacKeyTooShort` for an
    /// empty HMAC key.
    pub fn new(aes_key: &[u8], hmac_key: &[u8]) -> Result<AesCtr> {
        if hmac_key.is_empty() {
            return Err(EncryptError::HmacKeyTooShort.into());
        }

        Ok(AesCtr {
            key: CtrKey::from_slice(aes_key)?,
            hmac_key: hmac_key.to_vec(),
        })
    }

    fn mac(&self, data: &[u8]) -> HmacSha256 {
        let mut mac = HmacSha256::new_from_slice(&self.hmac_key)
            .expect("HMAC accepts keys of any length");
        mac.update(data);
        mac
    }
}

impl Encryptor for AesCtr {
    /// Generate a unique IV, encrypt the secret, and authenticate
    /// IV-plus-ciphertext with HMAC-SHA256.
    fn encrypt(&self, secret: &[u8]) -> Result<Record> {
        let mut ciphertext = vec![0u8; IV_SIZE + secret.len()];

        // Random IV in the first block
        OsRng.try_fill_bytes(&mut ciphertext[..IV_SIZE])?;

        let mut iv = [0u8; IV_SIZE];
        iv.copy_from_slice(&ciphertext[..IV_SIZE]);

        ciphertext[IV_SIZE..].copy_from_slice(secret);
        self.key.apply_keystream(&iv, &mut ciphertext[IV_SIZE..]);

        let mac = self.mac(&ciphertext).finalize().into_bytes().to_vec();

        Ok(Record {
            ciphertext,
            mac,
            kind: Kind::AesCtr,
            context: None,
        })
    }

    /// Verify the HMAC in constant time, then decrypt.
    ///
    /// The HMAC check runs before any length inspection, so a ciphertext too
    /// short to hold an IV surfaces as `InvalidHmac` rather than leaking a
    /// length oracle.
    fn decrypt(&self, record: &Record) -> Result<Vec<u8>> {
        if record.kind != Kind::AesCtr {
            return Err(EncryptError::WrongKind.into());
        }

        self.mac(&record.ciphertext)
            .verify_slice(&record.mac)
            .map_err(|_| EncryptError::InvalidHmac)?;

        if record.ciphertext.len() < IV_SIZE {
            return Err(EncryptError::InvalidCiphertext.into());
        }

        let mut iv = [0u8; IV_SIZE];
        iv.copy_from_slice(&record.ciphertext[..IV_SIZE]);

        let mut buf = record.ciphertext[IV_SIZE..].to_vec();
        self.key.apply_keystream(&iv, &mut buf);

        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    // Ciphertext of "I am a super secret secret" under the key
    // "iamakey!iamakey!" (IV in the first block).
    const KNOWN_CIPHERTEXT: [u8; 42] = [
        0x50, 0xc7, 0x16, 0xf8, 0xe8, 0x26, 0x4a, 0xe1, 0xed, 0x1f, 0xe7, 0x82, 0xc2, 0x6f, 0x41,
        0xa3, 0x63, 0x17, 0x18, 0xd9, 0x04, 0x92, 0xbe, 0x68, 0x4d, 0xb3, 0x59, 0xbf, 0x59, 0x9d,
        0xef, 0x3b, 0x92, 0x99, 0x12, 0x3f, 0xc6, 0x59, 0xd9, 0x81, 0xad, 0x78,
    ];

    // HMAC-SHA256 of KNOWN_CIPHERTEXT under "hmacKey".
    const KNOWN_HMAC: [u8; 32] = [
        0xe8, 0xda, 0xfc, 0x58, 0x5a, 0x84, 0x27, 0x97, 0x13, 0x39, 0x04, 0x7c, 0x85, 0x8e, 0x10,
        0xc4, 0x88, 0x4d, 0x2e, 0xfe, 0x90, 0x5f, 0xc1, 0x8d, 0x93, 0xf5, 0xe5, 0xb4, 0x8a, 0xc5,
        0xd6, 0xca,
    ];

    fn known_record() -> Record {
        Record {
            ciphertext: KNOWN_CIPHERTEXT.to_vec(),
            mac: KNOWN_HMAC.to_vec(),
            kind: Kind::AesCtr,
            context: None,
        }
    }

    #[test]
    fn new_accepts_valid_key_lengths() {
        for len in [16, 24, 32] {
            assert!(AesCtr::new(&vec![0x61; len], b"SECRETSM8").is_ok());
        }
    }

    #[test]
    fn new_rejects_empty_aes_key() {
        assert!(matches!(
            AesCtr::new(b"", b"SECRETSM8"),
            Err(Error::Encrypt(EncryptError::KeyTooShort))
        ));
    }

    #[test]
    fn new_rejects_wrong_aes_key_length() {
        assert!(matches!(
            AesCtr::new(b"short", b"SECRETSM8"),
            Err(Error::Encrypt(EncryptError::KeyTooShort))
        ));
    }

    #[test]
    fn new_rejects_empty_hmac_key() {
        assert!(matches!(
            AesCtr::new(b"12345678901234567890123456789012", b""),
            Err(Error::Encrypt(EncryptError::HmacKeyTooShort))
        ));
    }

    #[test]
    fn round_trip() {
        let e = AesCtr::new(b"anAesTestKey1234", b"hmacKey").unwrap();

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
            let got = e.decrypt(&record).unwrap();
            assert_eq!(got, want);
        }
    }

    #[test]
    fn encrypt_sets_kind_and_valid_hmac() {
        let e = AesCtr::new(b"iamakey!iamakey!", b"hmacKey").unwrap();
        let secret = b"I am a super secret secret";
        let record = e.encrypt(secret).unwrap();

        assert_eq!(record.kind, Kind::AesCtr);
        assert_eq!(record.ciphertext.len(), IV_SIZE + secret.len());
        assert!(record.context.is_none());

        // The MAC must cover the entire IV-plus-ciphertext buffer.
        e.mac(&record.ciphertext).verify_slice(&record.mac).unwrap();

        assert_eq!(e.decrypt(&record).unwrap(), secret);
    }

    #[test]
    fn fresh_iv_each_encrypt() {
        let e = AesCtr::new(b"anAesTestKey1234", b"hmacKey").unwrap();
        let a = e.encrypt(b"same secret").unwrap();
        let b = e.encrypt(b"same secret").unwrap();
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn decrypt_known_vector() {
        let e = AesCtr::new(b"iamakey!iamakey!", b"hmacKey").unwrap();
        let got = e.decrypt(&known_record()).unwrap();
        assert_eq!(got, b"I am a super secret secret");
    }

    #[test]
    fn decrypt_rejects_wrong_kind() {
        let e = AesCtr::new(b"iamakey!iamakey!", b"hmacKey").unwrap();
        let record = known_record().with_kind(Kind::Nop);
        assert!(matches!(
            e.decrypt(&record),
            Err(Error::Encrypt(EncryptError::WrongKind))
        ));
    }

    #[test]
    fn decrypt_rejects_bad_hmac() {
        let e = AesCtr::new(b"iamakey!iamakey!", b"hmacKey").unwrap();
        let mut record = known_record();
        record.mac = vec![0x42; 32];
        assert!(matches!(
            e.decrypt(&record),
            Err(Error::Encrypt(EncryptError::InvalidHmac))
        ));
    }

    #[test]
    fn short_ciphertext_fails_as_invalid_hmac() {
        // The HMAC check runs first, so a one-byte ciphertext is an HMAC
        // failure, not a length error.
        let e = AesCtr::new(b"iamakey!iamakey!", b"hmacKey").unwrap();
        let mut record = known_record();
        record.ciphertext = vec![0x42];
        assert!(matches!(
            e.decrypt(&record),
            Err(Error::Encrypt(EncryptError::InvalidHmac))
        ));
    }

    #[test]
    fn tampered_ciphertext_fails() {
        let e = AesCtr::new(b"anAesTestKey1234", b"hmacKey").unwrap();
        let record = e.encrypt(b"important secret").unwrap();

        for idx in [0, IV_SIZE, record.ciphertext.len() - 1] {
            let mut tampered = record.clone();
            tampered.ciphertext[idx] ^= 0x01;
            assert!(matches!(
                e.decrypt(&tampered),
                Err(Error::Encrypt(EncryptError::InvalidHmac))
            ));
        }

        let mut tampered = record.clone();
        tampered.mac[0] ^= 0x01;
        assert!(matches!(
            e.decrypt(&tampered),
            Err(Error::Encrypt(EncryptError::InvalidHmac))
        ));
    }
}
