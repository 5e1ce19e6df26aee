//! Dual-hash digest computation.
//!
//! Streams a byte source once through SHA-256 and MD5 in parallel, so
//! memory use stays independent of payload size and both digests always
//! cover identical bytes.

use md5::Md5;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Read chunk size. Any value >= 1 yields identical final digests.
const CHUNK_SIZE: usize = 8192;

/// Hex-encoded digests of one payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestPair {
    /// 64 lowercase hex characters
    pub sha256: String,
    /// 32 lowercase hex characters
    pub md5: String,
}

/// Errors while hashing a payload source
#[derive(Debug, thiserror::Error)]
pub enum DigestError {
    #[error("failed to read payload source: {0}")]
    Read(#[from] std::io::Error),
}

/// Compute both digests over a bounded byte stream in a single pass.
///
/// Either both digests are produced or the call fails as a whole; a read
/// error is propagated without retry.
pub fn digest_reader<R: Read>(mut reader: R) -> Result<DigestPair, DigestError> {
    let mut sha256 = Sha256::new();
    let mut md5 = Md5::new();
    let mut buf = [0u8; CHUNK_SIZE];

    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        sha256.update(&buf[..n]);
        md5.update(&buf[..n]);
    }

    Ok(DigestPair {
        sha256: hex::encode(sha256.finalize()),
        md5: hex::encode(md5.finalize()),
    })
}

/// Compute both digests over the artifact file at `path`.
pub fn digest_file(path: &Path) -> Result<DigestPair, DigestError> {
    let file = File::open(path)?;
    digest_reader(file)
}
