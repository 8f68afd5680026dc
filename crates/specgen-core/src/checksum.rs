use sha2::{Digest, Sha256};

/// SHA-256 digest of the UTF-8 bytes of `content`, rendered as lowercase hex.
///
/// Integrity check only; there is no secret material involved.
pub fn checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
