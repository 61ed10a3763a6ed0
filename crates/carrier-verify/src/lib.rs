//! Checksum primitives for downloaded files.
//!
//! Provides incremental hashing and digest comparison. Nothing here performs
//! network or filesystem work on its own: callers feed bytes through a
//! [`Hasher`] (or wrap a reader in [`VerifiedReader`]) and compare the result
//! against a [`Checksum`].
//!
//! # Example
//!
//! ```
//! use carrier_verify::{Checksum, HashAlgorithm, Sha256Hasher};
//!
//! let expected = Sha256Hasher::digest(b"hello world");
//! let checksum = Checksum::new(HashAlgorithm::Sha256, expected);
//!
//! checksum.verify_reader(&b"hello world"[..]).unwrap();
//! assert!(checksum.verify_bytes(b"hello there").is_err());
//! ```

pub use self::checksum::{Checksum, verify_digest};
pub use self::error::{Result, VerificationError};
pub use self::hasher::{
    AnyHasher, DigestHasher, HashAlgorithm, Hasher, Md5Hasher, Sha1Hasher, Sha256Hasher,
    Sha512Hasher,
};
pub use self::reader::VerifiedReader;

#[cfg(feature = "blake3")]
pub use self::hasher::Blake3Hasher;

mod checksum;
mod error;
mod hasher;
mod reader;
