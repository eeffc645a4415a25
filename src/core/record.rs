//! The ciphertext envelope persisted by the stores.
//!
//! A [`Record`] holds the output of a single `encrypt` call: the opaque
//! ciphertext, an encryptor-designated MAC, the [`Kind`] tag naming the
//! outermost encryptor that produced it, and a context map wrapping
//! encryptors use to stash key-recovery metadata.
//!
//! The context must never hold secret material: the whole record is stored
//! in plain text by the storage backend.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{Result, StoreError};

/// Identifies the encryptor that produced a record.
///
/// The tag is a closed set; the integer values are part of the storage
/// format and must not be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Kind {
    /// Pass-through encryptor, tests only.
    Nop = 0,
    /// AES-CTR with HMAC-SHA256 message authentication.
    AesCtr = 1,
    /// Envelope-wrapped by a remote KMS data key.
    KmsWrapped = 2,
    /// Key derived from a passphrase via PBKDF2.
    Pbkdf2 = 3,
    /// AES-GCM AEAD.
    AesGcm = 4,
}

/// A kind tag outside the closed registry.
#[derive(Error, Debug, PartialEq, Eq)]
#[error("unknown encryptor kind tag {0}")]
pub struct UnknownKind(pub u8);

impl From<Kind> for u8 {
    fn from(kind: Kind) -> u8 {
        kind as u8
    }
}

impl TryFrom<u8> for Kind {
    type Error = UnknownKind;

    fn try_from(tag: u8) -> std::result::Result<Self, UnknownKind> {
        match tag {
            0 => Ok(Kind::Nop),
            1 => Ok(Kind::AesCtr),
            2 => Ok(Kind::KmsWrapped),
            3 => Ok(Kind::Pbkdf2),
            4 => Ok(Kind::AesGcm),
            other => Err(UnknownKind(other)),
        }
    }
}

/// Recovery metadata attached to a record by wrapping encryptors.
pub type Context = BTreeMap<String, ContextValue>;

/// A single context entry.
///
/// Exactly the shapes the wrappers need: raw bytes, a small integer, or the
/// nested KDF parameter struct. The serialized form is tagged, so a byte
/// sequence is always distinguishable from an integer after a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContextValue {
    Bytes(Vec<u8>),
    U8(u8),
    Kdf(KdfParameters),
}

/// Parameters needed to re-derive a PBKDF2 key at decrypt time.
///
/// Stored in plain text alongside the ciphertext; none of these fields are
/// secret, though `iterations` is attacker-visible by design.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParameters {
    pub salt: Vec<u8>,
    pub orig_kind: u8,
    pub iterations: i32,
}

/// The result of a call to `encrypt`.
///
/// `ciphertext` layout is defined by the producing encryptor (primitives
/// prepend an IV or nonce); `mac` is encryptor-defined and may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub ciphertext: Vec<u8>,
    pub mac: Vec<u8>,
    pub kind: Kind,
    pub context: Option<Context>,
}

impl Record {
    /// Serialize the record for storage.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| StoreError::Codec(e).into())
    }

    /// Deserialize a record previously produced by [`Record::to_bytes`].
    pub fn from_bytes(data: &[u8]) -> Result<Record> {
        serde_json::from_slice(data).map_err(|e| StoreError::Codec(e).into())
    }

    /// Look up a context entry. Absent context reads as empty.
    pub fn context_get(&self, key: &str) -> Option<&ContextValue> {
        self.context.as_ref().and_then(|c| c.get(key))
    }

    /// The context map, created lazily on first use.
    pub(crate) fn context_mut(&mut self) -> &mut Context {
        self.context.get_or_insert_with(Context::new)
    }

    /// A copy of this record carrying a different kind tag.
    ///
    /// Wrapping encryptors hand the copy to their inner encryptor so the
    /// caller's record is never mutated.
    pub(crate) fn with_kind(&self, kind: Kind) -> Record {
        let mut inner = self.clone();
        inner.kind = kind;
        inner
    }
}
