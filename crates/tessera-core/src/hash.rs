use crate::value::Scalar;
use md5::{Digest, Md5};
use std::fmt;
use xxhash_rust::xxh3::xxh3_128_with_seed;

/// Fan-out hash format version.
///
/// Every array fan-out entry is addressed by this hash; changing the
/// algorithm or its input form invalidates all stored fan-out entries.
pub const FANOUT_HASH_VERSION: u8 = 1;

/// Stable XXH3 seed for index identifiers.
pub(crate) const INDEX_ID_SEED: u64 = 0;

///
/// ElementHash
///
/// MD5 digest of an array element's JavaScript string form.
/// Used purely as key-space compression for fan-out entries, not for security.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ElementHash([u8; 16]);

impl ElementHash {
    #[must_use]
    pub fn of(element: &Scalar) -> Self {
        let mut hasher = Md5::new();
        hasher.update(element.to_js_string().as_bytes());

        let mut out = [0u8; 16];
        out.copy_from_slice(&hasher.finalize());
        Self(out)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Display for ElementHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }

        Ok(())
    }
}

/// 128-bit XXH3 digest used to derive fixed-width index identifiers.
#[must_use]
pub(crate) fn xxh3_128(bytes: &[u8]) -> [u8; 16] {
    xxh3_128_with_seed(bytes, INDEX_ID_SEED).to_be_bytes()
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_hash_matches_reference_md5_of_js_string() {
        assert_eq!(
            ElementHash::of(&Scalar::from(1)).to_string(),
            "c4ca4238a0b923820dcc509a6f75849b"
        );
        assert_eq!(
            ElementHash::of(&Scalar::from(2)).to_string(),
            "c81e728d9d4c2f636f067f89cc14862c"
        );
        assert_eq!(
            ElementHash::of(&Scalar::from(3)).to_string(),
            "eccbc87e4b5ce2fe28308fd9f2a7baf3"
        );
    }

    #[test]
    fn element_hash_uses_string_form_across_types() {
        // String(1) === "1" in the reference runtime, so these collide on purpose.
        assert_eq!(
            ElementHash::of(&Scalar::from(1)),
            ElementHash::of(&Scalar::from("1"))
        );
        assert_ne!(
            ElementHash::of(&Scalar::Null),
            ElementHash::of(&Scalar::from(false))
        );
    }

    #[test]
    fn xxh3_digest_is_deterministic() {
        assert_eq!(xxh3_128(b"age:asc"), xxh3_128(b"age:asc"));
        assert_ne!(xxh3_128(b"age:asc"), xxh3_128(b"age:desc"));
    }
}
