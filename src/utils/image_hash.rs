//! Cache key derivation for uploaded food photos
//!
//! Only a fixed-length prefix of the base64 payload is hashed. Photos are
//! several megabytes once encoded, and the prefix (which covers the image
//! header and the first scanlines) is stable for a given upload. Two
//! different images that share an identical prefix will share a key; that
//! is an accepted trade-off.

use sha2::{Digest, Sha256};

/// Derive the cache key of a base64-encoded image.
///
/// Hashes the first `prefix_len` characters with SHA-256 and returns the
/// lowercase hex digest. Inputs shorter than the prefix are hashed in full.
pub fn image_cache_key(image_base64: &str, prefix_len: usize) -> String {
    let prefix = match image_base64.char_indices().nth(prefix_len) {
        Some((byte_index, _)) => &image_base64[..byte_index],
        None => image_base64,
    };

    let mut hasher = Sha256::new();
    hasher.update(prefix.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_stable_hex_sha256() {
        let key = image_cache_key("abc", 10_000);
        // sha256("abc")
        assert_eq!(
            key,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(key, image_cache_key("abc", 10_000));
    }

    #[test]
    fn only_the_prefix_contributes() {
        let shared = "A".repeat(10_000);
        let first = format!("{shared}BBBB");
        let second = format!("{shared}CCCC");

        assert_eq!(image_cache_key(&first, 10_000), image_cache_key(&second, 10_000));
        assert_eq!(image_cache_key(&first, 10_000), image_cache_key(&shared, 10_000));
    }

    #[test]
    fn differing_prefixes_produce_different_keys() {
        let first = format!("X{}", "A".repeat(20_000));
        let second = format!("Y{}", "A".repeat(20_000));
        assert_ne!(image_cache_key(&first, 10_000), image_cache_key(&second, 10_000));
    }

    #[test]
    fn multibyte_input_is_cut_on_char_boundary() {
        let input = "é".repeat(20);
        let key = image_cache_key(&input, 5);
        assert_eq!(key, image_cache_key(&"é".repeat(5), 5));
    }
}
