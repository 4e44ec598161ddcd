//! Functionality to hash packets, and generate hashes.

use digest::DynDigest;
use md5::Md5;
use ripemd::Ripemd160;
use sha1collisiondetection::Sha1CD;
use sha2::{Sha224, Sha256, Sha384, Sha512};

use crate::types::HashAlgorithm;
use crate::Error;
use crate::Result;

/// State of a hash function.
///
/// Wraps one of the RustCrypto digest implementations behind a
/// trait object so callers can hash packets without caring which
/// algorithm backs a given signature.
pub struct Context {
    algo: HashAlgorithm,
    ctx: Box<dyn DynDigest + Send + Sync>,
}

impl Clone for Context {
    fn clone(&self) -> Self {
        Context { algo: self.algo, ctx: self.ctx.box_clone() }
    }
}

impl Context {
    /// Returns the algorithm.
    pub fn algo(&self) -> HashAlgorithm {
        self.algo
    }

    /// Size of the digest in bytes.
    pub fn digest_size(&self) -> usize {
        self.ctx.output_size()
    }

    /// Writes data into the hash function.
    pub fn update<D: AsRef<[u8]>>(&mut self, data: D) {
        self.ctx.update(data.as_ref());
    }

    /// Finalizes the hash function, returning the digest.
    ///
    /// Does not consume the context; callers that need a running
    /// hash (signature verification over a streamed body) should
    /// `clone` before finalizing.
    pub fn digest(&self) -> Vec<u8> {
        self.ctx.box_clone().finalize_reset().to_vec()
    }
}

impl std::io::Write for Context {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl HashAlgorithm {
    /// Whether this crate implements this algorithm.
    pub fn is_supported(self) -> bool {
        matches!(self,
                 HashAlgorithm::SHA1 | HashAlgorithm::SHA224
                 | HashAlgorithm::SHA256 | HashAlgorithm::SHA384
                 | HashAlgorithm::SHA512 | HashAlgorithm::RipeMD
                 | HashAlgorithm::MD5)
    }

    /// Creates a new hash context for this algorithm.
    ///
    /// Fails with `Error::UnsupportedHashAlgorithm` if this crate
    /// does not implement the algorithm. MD5 is implemented only to
    /// validate legacy V3 signatures on read; it is never selected
    /// for new signing operations.
    pub fn context(self) -> Result<Context> {
        let ctx: Box<dyn DynDigest + Send + Sync> = match self {
            HashAlgorithm::SHA1 => Box::new(Sha1CD::default()),
            HashAlgorithm::SHA224 => Box::new(Sha224::default()),
            HashAlgorithm::SHA256 => Box::new(Sha256::default()),
            HashAlgorithm::SHA384 => Box::new(Sha384::default()),
            HashAlgorithm::SHA512 => Box::new(Sha512::default()),
            HashAlgorithm::RipeMD => Box::new(Ripemd160::default()),
            HashAlgorithm::MD5 => Box::new(Md5::default()),
            HashAlgorithm::Private(_) | HashAlgorithm::Unknown(_) =>
                return Err(Error::UnsupportedHashAlgorithm(self).into()),
        };
        Ok(Context { algo: self, ctx })
    }
}

/// Hashes OpenPGP packets and related types.
pub trait Hash {
    /// Updates the given hash with this object.
    fn hash(&self, hash: &mut Context);
}

impl Hash for crate::packet::UserID {
    /// Updates the hash with the V4 user ID hashing prefix, per
    /// Section 5.2.4 of RFC 4880.
    fn hash(&self, hash: &mut Context) {
        let mut header = [0u8; 5];
        header[0] = 0xB4;
        let len = self.value().len() as u32;
        header[1..5].copy_from_slice(&len.to_be_bytes());
        hash.update(&header[..]);
        hash.update(self.value());
    }
}

impl Hash for crate::packet::UserAttribute {
    /// Updates the hash with the V4 user attribute hashing prefix.
    fn hash(&self, hash: &mut Context) {
        let mut header = [0u8; 5];
        header[0] = 0xD1;
        let len = self.value().len() as u32;
        header[1..5].copy_from_slice(&len.to_be_bytes());
        hash.update(&header[..]);
        hash.update(self.value());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_digest_size() {
        let ctx = HashAlgorithm::SHA256.context().unwrap();
        assert_eq!(ctx.digest_size(), 32);
    }

    #[test]
    fn unsupported_private_algorithm_errors() {
        assert!(HashAlgorithm::Private(100).context().is_err());
    }
}
