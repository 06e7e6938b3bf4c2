//! Content digests over a fully loaded buffer.

use md5::Md5;
use sha2::{Digest, Sha256};
use std::fmt;
use whirlpool::Whirlpool;

/// Digest algorithms computed for every file, in report order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    /// SHA-256, the strong cryptographic hash
    Sha256,
    /// MD5, kept for compatibility with older tooling
    Md5,
    /// CRC-32 (IEEE) checksum
    Crc32,
    /// Whirlpool
    Whirlpool,
}

impl DigestAlgorithm {
    /// Every algorithm in report order
    pub const ALL: [DigestAlgorithm; 4] = [
        DigestAlgorithm::Sha256,
        DigestAlgorithm::Md5,
        DigestAlgorithm::Crc32,
        DigestAlgorithm::Whirlpool,
    ];

    /// Display name
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            DigestAlgorithm::Sha256 => "SHA256",
            DigestAlgorithm::Md5 => "MD5",
            DigestAlgorithm::Crc32 => "CRC32",
            DigestAlgorithm::Whirlpool => "Whirlpool",
        }
    }

    /// Hex digest of `data`
    ///
    /// CRC32 renders as 8 uppercase digits, the hashes as lowercase hex.
    #[must_use]
    pub fn hex_digest(&self, data: &[u8]) -> String {
        match self {
            DigestAlgorithm::Sha256 => hex::encode(Sha256::digest(data)),
            DigestAlgorithm::Md5 => hex::encode(Md5::digest(data)),
            DigestAlgorithm::Crc32 => format!("{:08X}", crc32fast::hash(data)),
            DigestAlgorithm::Whirlpool => hex::encode(Whirlpool::digest(data)),
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Digest results, immutable once computed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digests {
    entries: Vec<(DigestAlgorithm, String)>,
}

impl Digests {
    /// Compute every [`DigestAlgorithm`] over `data`
    ///
    /// # Example
    ///
    /// ```
    /// use ghdump_core::{DigestAlgorithm, Digests};
    ///
    /// let digests = Digests::compute(b"");
    /// assert_eq!(digests.get(DigestAlgorithm::Crc32), Some("00000000"));
    /// ```
    #[must_use]
    pub fn compute(data: &[u8]) -> Self {
        let entries = DigestAlgorithm::ALL
            .iter()
            .map(|alg| (*alg, alg.hex_digest(data)))
            .collect();
        Self { entries }
    }

    /// Hex digest for `algorithm`
    #[must_use]
    pub fn get(&self, algorithm: DigestAlgorithm) -> Option<&str> {
        self.entries
            .iter()
            .find(|(alg, _)| *alg == algorithm)
            .map(|(_, hex)| hex.as_str())
    }

    /// Iterate as `(name, hex)` pairs in report order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.entries.iter().map(|(alg, hex)| (alg.name(), hex.as_str()))
    }

    /// Number of digests
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no digest was computed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
