//! Content digests — hex SHA-256, matching the side-car format chunks are
//! stored with on disk (`<chunk_id>.sha256`).

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_vector() {
        // sha256("") — well-known test vector
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn differs_on_single_bit_flip() {
        let a = sha256_hex(b"hello world");
        let b = sha256_hex(b"hello worlx");
        assert_ne!(a, b);
    }
}
