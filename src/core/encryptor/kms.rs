//! Remote-KMS envelope wrapper.
//!
//! Each encryption asks the KMS for a fresh data key, encrypts with an inner
//! encryptor keyed from its plaintext half, and stores the wrapped half in
//! the record context. Decryption unwraps the data key remotely and hands it
//! back to the inner encryptor. The KMS never sees the secret itself.

use aws_config::{BehaviorVersion, Region};
use aws_sdk_kms::primitives::Blob;
use tracing::trace;
use zeroize::Zeroize;

use super::{AesCtr, Encryptor, KeyFactory};
use crate::core::record::{ContextValue, Kind, Record};
use crate::error::{EncryptError, KmsError, Result};

/// Context key holding the inner encryptor kind.
const CONTEXT_TYPE_KEY: &str = "kms_type";

/// Context key holding the KMS-wrapped data key.
const CONTEXT_KEY_KEY: &str = "kms_key";

const DEFAULT_KEY_SIZE: u32 = 64;

/// A data key issued by the remote service: the plaintext key material and
/// the wrapped blob that recovers it later.
pub struct DataKey {
    pub plaintext: Vec<u8>,
    pub blob: Vec<u8>,
}

/// The two remote operations the envelope wrapper consumes.
///
/// Implemented by [`AwsKms`] in production and by mocks in tests.
pub trait DataKeyService: Send + Sync {
    /// Ask the service for a fresh data key of `num_bytes` bytes under the
    /// given master key.
    fn generate_data_key(&self, key_id: &str, num_bytes: u32) -> Result<DataKey>;

    /// Unwrap a data key previously issued by `generate_data_key`.
    fn decrypt(&self, blob: &[u8]) -> Result<Vec<u8>>;
}

/// AWS KMS client.
///
/// Credentials come from the environment or the default provider chain. The
/// async SDK runs on a throwaway current-thread runtime so the encryptor API
/// stays synchronous.
pub struct AwsKms {
    region: String,
}

impl AwsKms {
    pub fn new(region: &str) -> AwsKms {
        AwsKms {
            region: region.to_string(),
        }
    }

    fn runtime(&self) -> Result<tokio::runtime::Runtime> {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| KmsError::Runtime(e.to_string()).into())
    }

    async fn client(&self) -> aws_sdk_kms::Client {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(self.region.clone()))
            .load()
            .await;
        aws_sdk_kms::Client::new(&config)
    }
}

impl DataKeyService for AwsKms {
    fn generate_data_key(&self, key_id: &str, num_bytes: u32) -> Result<DataKey> {
        trace!(key_id, num_bytes, "requesting data key from KMS");

        self.runtime()?.block_on(async {
            let resp = self
                .client()
                .await
                .generate_data_key()
                .key_id(key_id)
                .number_of_bytes(num_bytes as i32)
                .send()
                .await
                .map_err(|e| KmsError::Request(e.to_string()))?;

            let plaintext = resp
                .plaintext()
                .ok_or(KmsError::MissingField("plaintext key"))?
                .as_ref()
                .to_vec();
            let blob = resp
                .ciphertext_blob()
                .ok_or(KmsError::MissingField("ciphertext blob"))?
                .as_ref()
                .to_vec();

            trace!(blob_len = blob.len(), "received data key");
            Ok(DataKey { plaintext, blob })
        })
    }

    fn decrypt(&self, blob: &[u8]) -> Result<Vec<u8>> {
        trace!(blob_len = blob.len(), "unwrapping data key via KMS");

        self.runtime()?.block_on(async {
            // The key id travels inside the wrapped blob; no need to pass it.
            let resp = self
                .client()
                .await
                .decrypt()
                .ciphertext_blob(Blob::new(blob.to_vec()))
                .send()
                .await
                .map_err(|e| KmsError::Request(e.to_string()))?;

            let plaintext = resp
                .plaintext()
                .ok_or(KmsError::MissingField("plaintext key"))?
                .as_ref()
                .to_vec();
            Ok(plaintext)
        })
    }
}

/// KMS envelope wrapping encryptor.
pub struct Kms {
    service: Box<dyn DataKeyService>,
    key_id: String,
    key_size: u32,
    factory: KeyFactory,
}

impl Kms {
    /// Create a wrapper backed by AWS KMS in the given region.
    ///
    /// The default inner encryptor is AES-256-CTR with the data key split
    /// across the cipher and HMAC keys, which requires a data key of at
    /// least 64 bytes.
    pub fn new(key_id: &str, region: &str) -> Kms {
        Kms::with_service(Box::new(AwsKms::new(region)), key_id)
    }

    /// Create a wrapper around any [`DataKeyService`] implementation.
    pub fn with_service(service: Box<dyn DataKeyService>, key_id: &str) -> Kms {
        Kms {
            service,
            key_id: key_id.to_string(),
            key_size: DEFAULT_KEY_SIZE,
            factory: Box::new(|key: &[u8]| {
                if key.len() < 64 {
                    return Err(EncryptError::KeyTooShort.into());
                }
                Ok(Box::new(AesCtr::new(&key[..32], &key[32..])?) as Box<dyn Encryptor>)
            }),
        }
    }

    /// Replace the inner encryptor factory.
    pub fn with_factory(mut self, factory: KeyFactory) -> Kms {
        self.factory = factory;
        self
    }

    /// Override the data key length requested from the service.
    pub fn with_key_size(mut self, key_size: u32) -> Kms {
        self.key_size = key_size;
        self
    }
}

impl Encryptor for Kms {
    /// Fetch a fresh data key, encrypt with the inner encryptor, and stash
    /// the wrapped key and inner kind in the context.
    fn encrypt(&self, secret: &[u8]) -> Result<Record> {
        let mut data_key = self.service.generate_data_key(&self.key_id, self.key_size)?;

        let inner = (self.factory)(&data_key.plaintext);
        data_key.plaintext.zeroize();

        let mut record = inner?.encrypt(secret)?;

        let orig_kind = record.kind.into();
        let context = record.context_mut();
        context.insert(CONTEXT_TYPE_KEY.to_string(), ContextValue::U8(orig_kind));
        context.insert(
            CONTEXT_KEY_KEY.to_string(),
            ContextValue::Bytes(data_key.blob),
        );
        record.kind = Kind::KmsWrapped;

        Ok(record)
    }

    /// Unwrap the embedded data key and delegate to the inner encryptor.
    fn decrypt(&self, record: &Record) -> Result<Vec<u8>> {
        if record.kind != Kind::KmsWrapped {
            return Err(EncryptError::WrongKind.into());
        }

        // Pull everything out of the context before going near the network;
        // a malformed record must not cost a billable KMS call.
        let blob = match record.context_get(CONTEXT_KEY_KEY) {
            Some(ContextValue::Bytes(blob)) => blob,
            _ => return Err(EncryptError::MissingContext.into()),
        };
        let orig_kind = match record.context_get(CONTEXT_TYPE_KEY) {
            Some(ContextValue::U8(tag)) => {
                Kind::try_from(*tag).map_err(|_| EncryptError::MissingContext)?
            }
            _ => return Err(EncryptError::MissingContext.into()),
        };

        let mut key = self.service.decrypt(blob)?;
        let inner = (self.factory)(&key);
        key.zeroize();

        inner?.decrypt(&record.with_kind(orig_kind))
    }
}
