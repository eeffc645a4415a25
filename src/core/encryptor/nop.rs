//! Pass-through encryptor for tests.

use super::Encryptor;
use crate::core::record::{Kind, Record};
use crate::error::Result;

/// Returns records that are not encrypted in any way.
///
/// Exists so the wrapping encryptors can be tested without cryptographic
/// confounds. It is never selectable from configuration, and must stay that
/// way.
pub struct Nop;

impl Encryptor for Nop {
    fn encrypt(&self, secret: &[u8]) -> Result<Record> {
        Ok(Record {
            ciphertext: secret.to_vec(),
            mac: b"--ignored--".to_vec(),
            kind: Kind::Nop,
            context: None,
        })
    }

    /// Returns the stored bytes regardless of the record kind.
    fn decrypt(&self, record: &Record) -> Result<Vec<u8>> {
        Ok(record.ciphertext.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let e = Nop;
        let record = e.encrypt(b"secret").unwrap();

        assert_eq!(record.ciphertext, b"secret");
        assert_eq!(record.mac, b"--ignored--");
        assert_eq!(record.kind, Kind::Nop);
        assert!(record.context.is_none());

        assert_eq!(e.decrypt(&record).unwrap(), b"secret");
    }

    #[test]
    fn decrypt_ignores_kind() {
        let record = Record {
            ciphertext: b"anything".to_vec(),
            mac: Vec::new(),
            kind: Kind::AesGcm,
            context: None,
        };
        assert_eq!(Nop.decrypt(&record).unwrap(), b"anything");
    }
}
