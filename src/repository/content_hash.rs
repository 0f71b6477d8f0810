//! Content digests for file bytes.

use sha2::{Digest, Sha256};

/// Compute the digest of the given bytes: SHA-256, lowercase hexadecimal.
pub fn hash_content(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_known_values() {
        assert_eq!(
            hash_content(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            hash_content(b"hello"),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_hash_is_stable_and_content_sensitive() {
        assert_eq!(hash_content(b"abc"), hash_content(b"abc"));
        assert_ne!(hash_content(b"abc"), hash_content(b"abd"));
        assert_eq!(hash_content(b"abc").len(), 64);
    }
}
