//! Hash abstraction and object identifiers.
//!
//! The object database is written against a small hashing capability
//! (`sum`, `raw_size`, `null`, hex/raw parsing) rather than against SHA-1
//! directly, so a SHA-256 repository format is a second `Hasher` impl away.
//! Everywhere an OID's byte width matters, code reads [`Oid::RAW_SIZE`]
//! rather than a literal `20`.

use std::fmt;

use sha1::{Digest, Sha1};

use crate::error::OidError;

/// Width in bytes of a SHA-1 object id. `Oid::RAW_SIZE` is the name to use;
/// this constant exists only to give that associated constant a value.
const SHA1_RAW_SIZE: usize = 20;

/// A content-addressed object identifier.
///
/// Two zero-copy forms are supported: raw bytes ([`Oid::as_bytes`]) and
/// lowercase hex ([`Oid::to_hex`]). OIDs order lexicographically by raw
/// byte value, and the all-zero OID is the sentinel "no object".
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Oid([u8; Oid::RAW_SIZE]);

impl Oid {
    /// Width in bytes of an OID under the active hash algorithm.
    pub const RAW_SIZE: usize = SHA1_RAW_SIZE;

    /// The all-zero sentinel OID ("no object").
    pub const fn null() -> Self {
        Oid([0u8; Self::RAW_SIZE])
    }

    /// True iff every byte is zero.
    pub fn is_null(&self) -> bool {
        self.0 == [0u8; Self::RAW_SIZE]
    }

    /// Hash `data` under the active algorithm (SHA-1).
    pub fn sum(data: &[u8]) -> Self {
        let digest = Sha1::digest(data);
        let mut bytes = [0u8; Self::RAW_SIZE];
        bytes.copy_from_slice(&digest);
        Oid(bytes)
    }

    /// Parse a lowercase-or-uppercase hex string of exactly `RAW_SIZE * 2`
    /// characters.
    pub fn from_hex(s: &str) -> Result<Self, OidError> {
        if s.len() != Self::RAW_SIZE * 2 {
            return Err(OidError::InvalidLength(s.len()));
        }
        let mut bytes = [0u8; Self::RAW_SIZE];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| OidError::InvalidHex)?;
        Ok(Oid(bytes))
    }

    /// Parse exactly `RAW_SIZE` raw bytes.
    pub fn from_raw(bytes: &[u8]) -> Result<Self, OidError> {
        if bytes.len() != Self::RAW_SIZE {
            return Err(OidError::InvalidLength(bytes.len()));
        }
        let mut out = [0u8; Self::RAW_SIZE];
        out.copy_from_slice(bytes);
        Ok(Oid(out))
    }

    pub fn as_bytes(&self) -> &[u8; Self::RAW_SIZE] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl From<[u8; Oid::RAW_SIZE]> for Oid {
    fn from(bytes: [u8; Oid::RAW_SIZE]) -> Self {
        Oid(bytes)
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Oid({})", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_roundtrip() {
        let oid = Oid::sum(b"blob 4\0data");
        let hex = oid.to_hex();
        assert_eq!(Oid::from_hex(&hex).unwrap(), oid);
    }

    #[test]
    fn equal_iff_same_hex() {
        let a = Oid::sum(b"a");
        let b = Oid::sum(b"b");
        assert_ne!(a.to_hex(), b.to_hex());
        assert_eq!(a, Oid::from_hex(&a.to_hex()).unwrap());
    }

    #[test]
    fn null_is_all_zero() {
        assert!(Oid::null().is_null());
        assert!(!Oid::sum(b"x").is_null());
    }

    #[test]
    fn ordering_is_lexicographic() {
        let a = Oid::from_raw(&[0u8; 20]).unwrap();
        let mut hi = [0u8; 20];
        hi[0] = 1;
        let b = Oid::from_raw(&hi).unwrap();
        assert!(a < b);
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(matches!(Oid::from_hex("abcd"), Err(OidError::InvalidLength(_))));
        assert!(matches!(Oid::from_raw(&[0u8; 3]), Err(OidError::InvalidLength(_))));
    }

    #[test]
    fn empty_tree_oid_matches_canonical_git() {
        let oid = Oid::sum(b"tree 0\0");
        assert_eq!(oid.to_hex(), "4b825dc642cb6eb9a060e54bf8d69288fbee4904");
    }
}
