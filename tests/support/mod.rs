//! Shared helpers for integration tests.

pub mod skip;

use cryptic::{Kind, Record};

/// A small record with recognizable contents.
pub fn sample_record(ciphertext: &[u8]) -> Record {
    Record {
        ciphertext: ciphertext.to_vec(),
        mac: b"mac".to_vec(),
        kind: Kind::AesCtr,
        context: None,
    }
}

/// A name unlikely to collide across test runs against a shared backend.
pub fn unique_name(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock before epoch")
        .subsec_nanos();
    format!("cryptic-test-{}-{}-{:x}", prefix, std::process::id(), nanos)
}
