use std::io::Read;

use crate::{AnyHasher, HashAlgorithm, Hasher, Result, VerificationError, VerifiedReader};

/// An expected digest paired with the algorithm that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checksum {
    algorithm: HashAlgorithm,
    expected:  Vec<u8>,
}

impl Checksum {
    pub fn new(algorithm: HashAlgorithm, expected: impl Into<Vec<u8>>) -> Self {
        Self {
            algorithm,
            expected: expected.into(),
        }
    }

    /// Parses a hex digest, rejecting lengths that do not fit `algorithm`.
    pub fn from_hex(algorithm: HashAlgorithm, digest: &str) -> Result<Self> {
        let expected = hex::decode(digest.trim())
            .map_err(|e| VerificationError::InvalidDigest(format!("{digest}: {e}")))?;
        if expected.len() != algorithm.digest_len() {
            return Err(VerificationError::InvalidDigest(format!(
                "{algorithm} digest must be {} bytes, got {}",
                algorithm.digest_len(),
                expected.len()
            )));
        }
        Ok(Self::new(algorithm, expected))
    }

    pub fn algorithm(&self) -> HashAlgorithm { self.algorithm }

    pub fn expected(&self) -> &[u8] { &self.expected }

    pub fn hasher(&self) -> AnyHasher { self.algorithm.hasher() }

    pub fn verify_bytes(&self, data: &[u8]) -> Result<()> {
        let mut hasher = self.hasher();
        hasher.update(data);
        self.verify_digest(hasher.finalize())
    }

    pub fn verify_reader<R: Read>(&self, reader: R) -> Result<()> {
        VerifiedReader::new(reader, self.hasher()).finish(&self.expected)
    }

    pub fn verify_digest(&self, actual: Vec<u8>) -> Result<()> {
        verify_digest(&self.expected, actual)
    }
}

/// Compares a computed digest against the expected one.
pub fn verify_digest(expected: &[u8], actual: Vec<u8>) -> Result<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(VerificationError::Mismatch {
            expected: expected.to_vec(),
            actual,
        })
    }
}
