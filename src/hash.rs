// src/hash.rs

//! Hash algorithms used in metalink verification blocks and mirror probes
//!
//! | Algorithm | Used for |
//! |-----------|----------|
//! | MD5, SHA-1 | Legacy verification entries still read by old yum clients |
//! | SHA-256 | Verification entries and mirror content comparison |
//! | SHA-512, RIPEMD-160 | Verification entries |

use crate::error::Error;
use md5::Md5;
use ripemd::Ripemd160;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};
use std::fmt;
use std::str::FromStr;

/// Hash algorithm selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum HashAlgorithm {
    Md5,
    Sha1,
    /// SHA-256, the algorithm mirror probes compare content with
    #[default]
    Sha256,
    Sha512,
    Ripemd160,
}

impl HashAlgorithm {
    /// Every supported algorithm, in the order metalinks list them by default
    pub const ALL: [HashAlgorithm; 5] = [
        Self::Md5,
        Self::Sha1,
        Self::Sha256,
        Self::Sha512,
        Self::Ripemd160,
    ];

    /// Get the hash output length in bytes
    #[inline]
    pub const fn output_len(&self) -> usize {
        match self {
            Self::Md5 => 16,
            Self::Sha1 | Self::Ripemd160 => 20,
            Self::Sha256 => 32,
            Self::Sha512 => 64,
        }
    }

    /// Get the hash output length as a hex string
    #[inline]
    pub const fn hex_len(&self) -> usize {
        self.output_len() * 2
    }

    /// Name as it appears in `<hash type="...">`
    #[inline]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
            Self::Ripemd160 => "ripemd160",
        }
    }

    /// Position in [`HashAlgorithm::ALL`]
    #[inline]
    pub(crate) const fn index(&self) -> usize {
        match self {
            Self::Md5 => 0,
            Self::Sha1 => 1,
            Self::Sha256 => 2,
            Self::Sha512 => 3,
            Self::Ripemd160 => 4,
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "md5" => Ok(Self::Md5),
            "sha1" | "sha-1" => Ok(Self::Sha1),
            "sha256" | "sha-256" => Ok(Self::Sha256),
            "sha512" | "sha-512" => Ok(Self::Sha512),
            "ripemd160" | "ripemd-160" => Ok(Self::Ripemd160),
            _ => Err(Error::UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Incremental hasher for any supported algorithm
pub struct Hasher {
    algorithm: HashAlgorithm,
    state: HasherState,
}

enum HasherState {
    Md5(Md5),
    Sha1(Sha1),
    Sha256(Sha256),
    Sha512(Sha512),
    Ripemd160(Ripemd160),
}

impl Hasher {
    /// Create a new hasher with the specified algorithm
    pub fn new(algorithm: HashAlgorithm) -> Self {
        let state = match algorithm {
            HashAlgorithm::Md5 => HasherState::Md5(Md5::new()),
            HashAlgorithm::Sha1 => HasherState::Sha1(Sha1::new()),
            HashAlgorithm::Sha256 => HasherState::Sha256(Sha256::new()),
            HashAlgorithm::Sha512 => HasherState::Sha512(Sha512::new()),
            HashAlgorithm::Ripemd160 => HasherState::Ripemd160(Ripemd160::new()),
        };
        Self { algorithm, state }
    }

    /// Update the hasher with more data
    pub fn update(&mut self, data: &[u8]) {
        match &mut self.state {
            HasherState::Md5(h) => h.update(data),
            HasherState::Sha1(h) => h.update(data),
            HasherState::Sha256(h) => h.update(data),
            HasherState::Sha512(h) => h.update(data),
            HasherState::Ripemd160(h) => h.update(data),
        }
    }

    /// Finalize and return the lowercase hex digest
    pub fn finalize(self) -> String {
        match self.state {
            HasherState::Md5(h) => format!("{:x}", h.finalize()),
            HasherState::Sha1(h) => format!("{:x}", h.finalize()),
            HasherState::Sha256(h) => format!("{:x}", h.finalize()),
            HasherState::Sha512(h) => format!("{:x}", h.finalize()),
            HasherState::Ripemd160(h) => format!("{:x}", h.finalize()),
        }
    }

    /// Get the algorithm being used
    #[inline]
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }
}

/// Compute the hex digest of a byte slice
pub fn hash_bytes(algorithm: HashAlgorithm, data: &[u8]) -> String {
    let mut hasher = Hasher::new(algorithm);
    hasher.update(data);
    hasher.finalize()
}

/// Compute SHA-256 hash (convenience function)
#[inline]
pub fn sha256(data: &[u8]) -> String {
    hash_bytes(HashAlgorithm::Sha256, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hash() {
        assert_eq!(
            sha256(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_known_digests() {
        assert_eq!(
            hash_bytes(HashAlgorithm::Md5, b"abc"),
            "900150983cd24fb0d6963f7d28e17f72"
        );
        assert_eq!(
            hash_bytes(HashAlgorithm::Sha1, b"abc"),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
        assert_eq!(
            hash_bytes(HashAlgorithm::Ripemd160, b"abc"),
            "8eb208f7e05d987a9b044a8e98c6b087f15a0bfc"
        );
    }

    #[test]
    fn test_hex_len_matches_output() {
        for algo in HashAlgorithm::ALL {
            assert_eq!(hash_bytes(algo, b"").len(), algo.hex_len(), "{algo}");
        }
    }

    #[test]
    fn test_incremental_matches_oneshot() {
        let mut hasher = Hasher::new(HashAlgorithm::Sha512);
        hasher.update(b"Hello, ");
        hasher.update(b"World!");
        assert_eq!(hasher.algorithm(), HashAlgorithm::Sha512);
        assert_eq!(
            hasher.finalize(),
            hash_bytes(HashAlgorithm::Sha512, b"Hello, World!")
        );
    }

    #[test]
    fn test_algorithm_parsing() {
        assert_eq!("SHA256".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha256);
        assert_eq!("ripemd160".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Ripemd160);
        assert!("crc32".parse::<HashAlgorithm>().is_err());
    }

    #[test]
    fn test_index_matches_all() {
        for (i, algo) in HashAlgorithm::ALL.iter().enumerate() {
            assert_eq!(algo.index(), i);
        }
    }
}
