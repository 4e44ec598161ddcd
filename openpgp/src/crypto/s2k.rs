//! String-to-Key (S2K) specifiers.
//!
//! Derives a symmetric key from a password, per [Section 3.7 of RFC
//! 4880]. Three specifiers are defined: a bare hash of the password,
//! a salted hash, and a salted hash iterated a configurable number of
//! times. The iteration count itself is stored on the wire as a
//! single octet using the non-linear encoding from Section 3.7.1.3.
//!
//! [Section 3.7 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-3.7

use std::io;

use crate::crypto::hash::Context as HashContext;
use crate::crypto::mem::Protected;
use crate::serialize::Marshal;
use crate::types::HashAlgorithm;
use crate::Error;
use crate::Result;

/// An S2K specifier, with the password-derivation parameters it
/// carries.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum S2K {
    /// Bare hash of the password.
    Simple {
        /// Hash algorithm.
        hash: HashAlgorithm,
    },
    /// Hash of a salt prepended to the password.
    Salted {
        /// Hash algorithm.
        hash: HashAlgorithm,
        /// Eight bytes of salt.
        salt: [u8; 8],
    },
    /// Hash of a salt and password, repeated until a target byte
    /// count has been hashed.
    IteratedSalted {
        /// Hash algorithm.
        hash: HashAlgorithm,
        /// Eight bytes of salt.
        salt: [u8; 8],
        /// Decoded iteration count, in bytes of (salt || password)
        /// hashed, not in number of repetitions.
        iterations: u32,
    },
    /// An unrecognized specifier, kept as raw bytes.
    Unknown {
        /// Wire tag octet.
        tag: u8,
        /// Remaining raw parameters.
        parameters: Box<[u8]>,
    },
}

/// Decodes the non-linear iteration count octet of Section 3.7.1.3:
/// `count = (16 + (c & 15)) << ((c >> 4) + 6)`.
pub fn decode_count(c: u8) -> u32 {
    (16u32 + (c as u32 & 15)) << ((c >> 4) as u32 + 6)
}

/// Encodes an iteration count as the nearest representable octet,
/// rounding up so the derived key is at least as expensive to guess
/// as requested.
pub fn encode_count(iterations: u32) -> u8 {
    for c in 0..=255u8 {
        if decode_count(c) >= iterations {
            return c;
        }
    }
    255
}

impl S2K {
    /// The default iteration count used when none is requested:
    /// 65536, matching common OpenPGP implementations' default.
    pub const DEFAULT_ITERATIONS: u32 = 65536;

    /// Derives a `key_size`-byte key from `password`.
    pub fn derive_key(&self, password: &[u8], key_size: usize) -> Result<Protected> {
        match self {
            S2K::Simple { hash } => derive(*hash, &[], 0, password, key_size),
            S2K::Salted { hash, salt } => derive(*hash, salt, 0, password, key_size),
            S2K::IteratedSalted { hash, salt, iterations } =>
                derive(*hash, salt, *iterations, password, key_size),
            S2K::Unknown { tag, .. } =>
                Err(Error::InvalidOperation(
                    format!("unknown S2K specifier {}", tag)).into()),
        }
    }
}

impl S2K {
    /// Parses an S2K specifier, per [Section 3.7.1 of RFC 4880].
    ///
    /// [Section 3.7.1 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-3.7.1
    pub(crate) fn parse<R: io::Read>(r: &mut R) -> Result<S2K> {
        let mut tag = [0u8; 1];
        r.read_exact(&mut tag)?;
        Ok(match tag[0] {
            0 => {
                let mut h = [0u8; 1];
                r.read_exact(&mut h)?;
                S2K::Simple { hash: HashAlgorithm::from_octet(h[0]) }
            }
            1 => {
                let mut h = [0u8; 1];
                r.read_exact(&mut h)?;
                let mut salt = [0u8; 8];
                r.read_exact(&mut salt)?;
                S2K::Salted { hash: HashAlgorithm::from_octet(h[0]), salt }
            }
            3 => {
                let mut h = [0u8; 1];
                r.read_exact(&mut h)?;
                let mut salt = [0u8; 8];
                r.read_exact(&mut salt)?;
                let mut c = [0u8; 1];
                r.read_exact(&mut c)?;
                S2K::IteratedSalted {
                    hash: HashAlgorithm::from_octet(h[0]),
                    salt,
                    iterations: decode_count(c[0]),
                }
            }
            101 => {
                // GnuPG's "gnu-dummy" extension: hash octet, then a
                // 3-octet "GNU" marker plus a one-octet mode.
                let mut rest = [0u8; 4];
                r.read_exact(&mut rest)?;
                S2K::Unknown { tag: 101, parameters: Box::new(rest) }
            }
            t => {
                // We don't know this specifier's parameter length, so
                // we can't reliably keep parsing past it.
                S2K::Unknown { tag: t, parameters: Box::new([]) }
            }
        })
    }
}

impl Marshal for S2K {
    /// Writes this specifier, per [Section 3.7.1 of RFC 4880].
    ///
    /// [Section 3.7.1 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-3.7.1
    fn serialize(&self, sink: &mut dyn io::Write) -> Result<()> {
        match self {
            S2K::Simple { hash } => {
                sink.write_all(&[0, hash.octet()])?;
            }
            S2K::Salted { hash, salt } => {
                sink.write_all(&[1, hash.octet()])?;
                sink.write_all(salt)?;
            }
            S2K::IteratedSalted { hash, salt, iterations } => {
                sink.write_all(&[3, hash.octet()])?;
                sink.write_all(salt)?;
                sink.write_all(&[encode_count(*iterations)])?;
            }
            S2K::Unknown { tag, parameters } => {
                sink.write_all(&[*tag])?;
                sink.write_all(parameters)?;
            }
        }
        Ok(())
    }
}

/// Runs the actual hash-and-truncate/expand loop shared by all three
/// specifiers.
///
/// When `key_size` exceeds the hash's output, successive contexts
/// are preloaded with an increasing number of leading zero octets
/// (the "multiple hash instances" construction from Section 3.7.1.1
/// footnote), so this returns as many digest-sized chunks as needed
/// and truncates the last one.
fn derive(
    hash: HashAlgorithm,
    salt: &[u8],
    iteration_byte_count: u32,
    password: &[u8],
    key_size: usize,
) -> Result<Protected> {
    let mut out = Vec::with_capacity(key_size);
    let mut zero_padding = 0usize;

    while out.len() < key_size {
        let mut ctx: HashContext = hash.context()?;
        for _ in 0..zero_padding {
            ctx.update([0u8]);
        }

        if iteration_byte_count == 0 {
            ctx.update(salt);
            ctx.update(password);
        } else {
            let unit_len = salt.len() + password.len();
            let mut fed = 0u64;
            let target = iteration_byte_count as u64;
            while fed < target {
                let remaining = target - fed;
                if (remaining as usize) >= unit_len {
                    ctx.update(salt);
                    ctx.update(password);
                    fed += unit_len as u64;
                } else {
                    // Partial final unit: feed salt, then as much of
                    // the password as fits.
                    let mut buf = Vec::with_capacity(unit_len);
                    buf.extend_from_slice(salt);
                    buf.extend_from_slice(password);
                    buf.truncate(remaining as usize);
                    ctx.update(&buf);
                    fed = target;
                }
            }
        }

        let digest = ctx.digest();
        out.extend_from_slice(&digest);
        zero_padding += 1;
    }

    out.truncate(key_size);
    Ok(out.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iteration_count_roundtrips_approximately() {
        for c in 0..=255u8 {
            let n = decode_count(c);
            assert_eq!(encode_count(n), c);
        }
    }

    #[test]
    fn encode_count_rounds_up() {
        let encoded = encode_count(S2K::DEFAULT_ITERATIONS);
        assert!(decode_count(encoded) >= S2K::DEFAULT_ITERATIONS);
    }

    #[test]
    fn simple_derives_requested_length() {
        let s2k = S2K::Simple { hash: HashAlgorithm::SHA256 };
        let key = s2k.derive_key(b"hunter2", 32).unwrap();
        assert_eq!(key.len(), 32);
        let key2 = s2k.derive_key(b"hunter2", 32).unwrap();
        assert_eq!(&*key, &*key2);
    }

    #[test]
    fn derive_key_longer_than_digest_expands() {
        let s2k = S2K::Salted { hash: HashAlgorithm::SHA256, salt: [1; 8] };
        let key = s2k.derive_key(b"password", 40).unwrap();
        assert_eq!(key.len(), 40);
    }

    #[test]
    fn different_salts_produce_different_keys() {
        let a = S2K::Salted { hash: HashAlgorithm::SHA256, salt: [1; 8] }
            .derive_key(b"password", 16).unwrap();
        let b = S2K::Salted { hash: HashAlgorithm::SHA256, salt: [2; 8] }
            .derive_key(b"password", 16).unwrap();
        assert_ne!(&*a, &*b);
    }
}
