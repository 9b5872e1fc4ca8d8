//! Stable hashing for query plans.

use blake3::Hasher;
use serde::{Deserialize, Serialize};

/// A blake3 digest. Displays as 64 lowercase hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    pub fn to_hex(&self) -> String {
        blake3::Hash::from(self.0).to_hex().to_string()
    }
}

impl From<blake3::Hash> for Hash256 {
    fn from(h: blake3::Hash) -> Self {
        Self(*h.as_bytes())
    }
}

impl std::fmt::Display for Hash256 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

pub fn hash_bytes(bytes: &[u8]) -> Hash256 {
    blake3::hash(bytes).into()
}

/// Hash a serde value through its JSON encoding, streamed straight into the
/// hasher.
pub fn hash_serde<T: Serialize>(v: &T) -> crate::error::Result<Hash256> {
    let mut hasher = Hasher::new();
    serde_json::to_writer(&mut hasher, v)?;
    Ok(hasher.finalize().into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_values_hash_equal() {
        let a = hash_serde(&("select", 3)).unwrap();
        let b = hash_serde(&("select", 3)).unwrap();
        let c = hash_serde(&("filter", 3)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.to_hex().len(), 64);
    }

    #[test]
    fn streamed_matches_buffered() {
        let bytes = serde_json::to_vec(&["a", "b"]).unwrap();
        assert_eq!(hash_serde(&["a", "b"]).unwrap(), hash_bytes(&bytes));
        assert_eq!(hash_bytes(b"x").to_string(), blake3::hash(b"x").to_hex().as_str());
    }
}
