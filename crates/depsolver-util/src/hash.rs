use sha1::{Digest, Sha1};

/// Lowercase hex SHA-1 of `data`. Filtered universe files are named after
/// the hash of their contents.
pub fn sha1_bytes(data: &[u8]) -> String {
    format!("{:x}", Sha1::digest(data))
}
