use std::fmt;
use std::str::FromStr;

use sha2::Digest;

use crate::VerificationError;

/// Incremental digest computation.
pub trait Hasher: Send {
    fn update(&mut self, data: &[u8]);
    fn finalize(self) -> Vec<u8>;
}

/// Adapter from any RustCrypto [`Digest`] to [`Hasher`].
pub struct DigestHasher<D: Digest + Send>(D);

impl<D: Digest + Send> Hasher for DigestHasher<D> {
    fn update(&mut self, data: &[u8]) { Digest::update(&mut self.0, data); }
    fn finalize(self) -> Vec<u8> { self.0.finalize().to_vec() }
}

impl<D: Digest + Send> DigestHasher<D> {
    pub fn new() -> Self { Self(D::new()) }

    pub fn digest(data: &[u8]) -> Vec<u8> { D::digest(data).to_vec() }
}

impl<D: Digest + Send> Default for DigestHasher<D> {
    fn default() -> Self { Self::new() }
}

pub type Sha256Hasher = DigestHasher<sha2::Sha256>;

pub type Sha512Hasher = DigestHasher<sha2::Sha512>;

pub type Md5Hasher = DigestHasher<md5::Md5>;

pub type Sha1Hasher = DigestHasher<sha1::Sha1>;

#[cfg(feature = "blake3")]
pub struct Blake3Hasher(blake3::Hasher);

#[cfg(feature = "blake3")]
impl Hasher for Blake3Hasher {
    fn update(&mut self, data: &[u8]) { self.0.update(data); }
    fn finalize(self) -> Vec<u8> { self.0.finalize().as_bytes().to_vec() }
}

#[cfg(feature = "blake3")]
impl Blake3Hasher {
    pub fn new() -> Self { Self(blake3::Hasher::new()) }

    pub fn digest(data: &[u8]) -> Vec<u8> { blake3::hash(data).as_bytes().to_vec() }
}

#[cfg(feature = "blake3")]
impl Default for Blake3Hasher {
    fn default() -> Self { Self::new() }
}

/// Hash algorithm selector used when the algorithm is only known at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    Md5,
    Sha1,
    Sha256,
    Sha512,
    #[cfg(feature = "blake3")]
    Blake3,
}

impl HashAlgorithm {
    /// Digest length in bytes.
    pub fn digest_len(self) -> usize {
        match self {
            HashAlgorithm::Md5 => 16,
            HashAlgorithm::Sha1 => 20,
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha512 => 64,
            #[cfg(feature = "blake3")]
            HashAlgorithm::Blake3 => 32,
        }
    }

    pub fn hasher(self) -> AnyHasher {
        match self {
            HashAlgorithm::Md5 => AnyHasher::Md5(Md5Hasher::new()),
            HashAlgorithm::Sha1 => AnyHasher::Sha1(Sha1Hasher::new()),
            HashAlgorithm::Sha256 => AnyHasher::Sha256(Sha256Hasher::new()),
            HashAlgorithm::Sha512 => AnyHasher::Sha512(Sha512Hasher::new()),
            #[cfg(feature = "blake3")]
            HashAlgorithm::Blake3 => AnyHasher::Blake3(Blake3Hasher::new()),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HashAlgorithm::Md5 => "md5",
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha512 => "sha512",
            #[cfg(feature = "blake3")]
            HashAlgorithm::Blake3 => "blake3",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for HashAlgorithm {
    type Err = VerificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "md5" => Ok(HashAlgorithm::Md5),
            "sha1" => Ok(HashAlgorithm::Sha1),
            "sha256" => Ok(HashAlgorithm::Sha256),
            "sha512" => Ok(HashAlgorithm::Sha512),
            #[cfg(feature = "blake3")]
            "blake3" => Ok(HashAlgorithm::Blake3),
            other => Err(VerificationError::InvalidDigest(format!(
                "unknown hash algorithm `{other}`"
            ))),
        }
    }
}

/// A [`Hasher`] whose algorithm was picked through [`HashAlgorithm`].
pub enum AnyHasher {
    Md5(Md5Hasher),
    Sha1(Sha1Hasher),
    Sha256(Sha256Hasher),
    Sha512(Sha512Hasher),
    #[cfg(feature = "blake3")]
    Blake3(Blake3Hasher),
}

impl Hasher for AnyHasher {
    fn update(&mut self, data: &[u8]) {
        match self {
            AnyHasher::Md5(h) => h.update(data),
            AnyHasher::Sha1(h) => h.update(data),
            AnyHasher::Sha256(h) => h.update(data),
            AnyHasher::Sha512(h) => h.update(data),
            #[cfg(feature = "blake3")]
            AnyHasher::Blake3(h) => h.update(data),
        }
    }

    fn finalize(self) -> Vec<u8> {
        match self {
            AnyHasher::Md5(h) => h.finalize(),
            AnyHasher::Sha1(h) => h.finalize(),
            AnyHasher::Sha256(h) => h.finalize(),
            AnyHasher::Sha512(h) => h.finalize(),
            #[cfg(feature = "blake3")]
            AnyHasher::Blake3(h) => h.finalize(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELLO_SHA256: &str = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";
    const HELLO_MD5: &str = "5eb63bbbe01eeed093cb22bb8f5acdc3";
    const HELLO_SHA1: &str = "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed";

    #[test]
    fn test_sha256_hasher() {
        let mut hasher = Sha256Hasher::new();
        hasher.update(b"hello ");
        hasher.update(b"world");

        assert_eq!(hasher.finalize(), hex::decode(HELLO_SHA256).unwrap());
    }

    #[test]
    fn test_md5_hasher() {
        let mut hasher = HashAlgorithm::Md5.hasher();
        hasher.update(b"hello ");
        hasher.update(b"world");
        let hash = hasher.finalize();

        assert_eq!(hash.len(), HashAlgorithm::Md5.digest_len());
        assert_eq!(hash, hex::decode(HELLO_MD5).unwrap());
        assert_eq!(Md5Hasher::digest(b"hello world"), hash);
    }

    #[test]
    fn test_sha1_hasher() {
        let mut hasher = HashAlgorithm::Sha1.hasher();
        hasher.update(b"hello world");
        let hash = hasher.finalize();

        assert_eq!(hash.len(), HashAlgorithm::Sha1.digest_len());
        assert_eq!(hash, hex::decode(HELLO_SHA1).unwrap());
        assert_eq!(Sha1Hasher::digest(b"hello world"), hash);
    }

    #[test]
    fn test_any_hasher_matches_one_shot_digest() {
        let mut hasher = HashAlgorithm::Sha512.hasher();
        hasher.update(b"hello world");

        assert_eq!(hasher.finalize(), Sha512Hasher::digest(b"hello world"));
    }

    #[cfg(feature = "blake3")]
    #[test]
    fn test_blake3_hasher() {
        let mut hasher = HashAlgorithm::Blake3.hasher();
        hasher.update(b"hello world");
        let hash = hasher.finalize();

        assert_eq!(hash.len(), HashAlgorithm::Blake3.digest_len());
        assert_eq!(hash, Blake3Hasher::digest(b"hello world"));
    }

    #[test]
    fn test_algorithm_parse() {
        assert_eq!("SHA256".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha256);
        assert_eq!(" sha512 ".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha512);
        assert_eq!("MD5".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Md5);
        assert_eq!("sha1".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha1);
        assert!("md4".parse::<HashAlgorithm>().is_err());
        assert_eq!(HashAlgorithm::Sha256.to_string(), "sha256");
    }
}
