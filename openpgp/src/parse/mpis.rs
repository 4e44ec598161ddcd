//! Parsers for the algorithm-specific MPI (and raw key material)
//! fields embedded in key, signature, and session-key packet bodies.
//!
//! These are the inverse of the `Marshal` impls in
//! [`crate::crypto::mpi`]; see [Section 3.2, 5.5.2, 5.5.3, and 5.2.2
//! of RFC 4880] and [Section 9 of RFC 6637] for the wire formats.
//!
//! [Section 3.2, 5.5.2, 5.5.3, and 5.2.2 of RFC 4880]: https://tools.ietf.org/html/rfc4880
//! [Section 9 of RFC 6637]: https://tools.ietf.org/html/rfc6637#section-9

use crate::crypto::mpi::{Ciphertext, MPI, PublicKey, Signature};
use crate::types::{Curve, HashAlgorithm, PublicKeyAlgorithm, SymmetricAlgorithm};
use crate::Error;
use crate::Result;

/// Reads a single MPI off the front of `buf`, returning it along with
/// the remaining bytes.
///
/// An MPI is a two-octet, big-endian bit count followed by that many
/// bits' worth of octets, per Section 3.2 of RFC 4880.
fn read_mpi(buf: &[u8]) -> Result<(MPI, &[u8])> {
    if buf.len() < 2 {
        return Err(Error::MalformedMPI("truncated length".into()).into());
    }
    let bits = u16::from_be_bytes([buf[0], buf[1]]) as usize;
    let bytes = (bits + 7) / 8;
    if buf.len() < 2 + bytes {
        return Err(Error::MalformedMPI("truncated value".into()).into());
    }
    Ok((MPI::new(&buf[2..2 + bytes]), &buf[2 + bytes..]))
}

/// Reads a curve OID, a one-octet length followed by that many
/// octets, off the front of `buf`.
fn read_curve(buf: &[u8]) -> Result<(Curve, &[u8])> {
    if buf.is_empty() {
        return Err(Error::MalformedMPI("truncated OID length".into()).into());
    }
    let len = buf[0] as usize;
    if buf.len() < 1 + len {
        return Err(Error::MalformedMPI("truncated OID".into()).into());
    }
    Ok((Curve::from_oid(&buf[1..1 + len]), &buf[1 + len..]))
}

/// Reads as many MPIs as will fit, for an algorithm this crate
/// doesn't know the shape of.
fn read_unknown_mpis(mut buf: &[u8]) -> (Vec<MPI>, &[u8]) {
    let mut mpis = Vec::new();
    while let Ok((mpi, rest)) = read_mpi(buf) {
        mpis.push(mpi);
        buf = rest;
    }
    (mpis, buf)
}

impl PublicKey {
    /// Parses the algorithm-specific fields of a public key packet
    /// body, per [Section 5.5.2 of RFC 4880] and [Section 9 of RFC
    /// 6637].
    ///
    /// [Section 5.5.2 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.5.2
    /// [Section 9 of RFC 6637]: https://tools.ietf.org/html/rfc6637#section-9
    pub fn parse(algo: PublicKeyAlgorithm, buf: &[u8]) -> Result<Self> {
        use PublicKeyAlgorithm::*;
        #[allow(deprecated)]
        match algo {
            RSAEncryptSign | RSAEncrypt | RSASign => {
                let (n, rest) = read_mpi(buf)?;
                let (e, rest) = read_mpi(rest)?;
                let _ = rest;
                Ok(PublicKey::RSA { e, n })
            }
            DSA => {
                let (p, rest) = read_mpi(buf)?;
                let (q, rest) = read_mpi(rest)?;
                let (g, rest) = read_mpi(rest)?;
                let (y, rest) = read_mpi(rest)?;
                let _ = rest;
                Ok(PublicKey::DSA { p, q, g, y })
            }
            ElGamalEncrypt | ElGamalEncryptSign => {
                let (p, rest) = read_mpi(buf)?;
                let (g, rest) = read_mpi(rest)?;
                let (y, rest) = read_mpi(rest)?;
                let _ = rest;
                Ok(PublicKey::ElGamal { p, g, y })
            }
            EdDSA => {
                let (curve, rest) = read_curve(buf)?;
                let (q, rest) = read_mpi(rest)?;
                let _ = rest;
                Ok(PublicKey::EdDSA { curve, q })
            }
            ECDSA => {
                let (curve, rest) = read_curve(buf)?;
                let (q, rest) = read_mpi(rest)?;
                let _ = rest;
                Ok(PublicKey::ECDSA { curve, q })
            }
            ECDH => {
                let (curve, rest) = read_curve(buf)?;
                let (q, rest) = read_mpi(rest)?;
                if rest.len() != 3 || rest[0] != 1 {
                    return Err(Error::MalformedPacket(
                        "malformed ECDH KDF parameters".into()).into());
                }
                let hash = HashAlgorithm::from_octet(rest[1]);
                let sym = SymmetricAlgorithm::from_octet(rest[2]);
                Ok(PublicKey::ECDH { curve, q, hash, sym })
            }
            SM2 | Unknown(_) => {
                let (mpis, rest) = read_unknown_mpis(buf);
                Ok(PublicKey::Unknown {
                    mpis: mpis.into_boxed_slice(),
                    rest: rest.to_vec().into_boxed_slice(),
                })
            }
        }
    }
}

impl Ciphertext {
    /// Parses the algorithm-specific fields of an encrypted session
    /// key, per [Section 5.1 of RFC 4880] and [Section 8 of RFC
    /// 6637].
    ///
    /// [Section 5.1 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.1
    /// [Section 8 of RFC 6637]: https://tools.ietf.org/html/rfc6637#section-8
    pub fn parse(algo: PublicKeyAlgorithm, buf: &[u8]) -> Result<Self> {
        use PublicKeyAlgorithm::*;
        #[allow(deprecated)]
        match algo {
            RSAEncryptSign | RSAEncrypt | RSASign => {
                let (c, rest) = read_mpi(buf)?;
                let _ = rest;
                Ok(Ciphertext::RSA { c })
            }
            ElGamalEncrypt | ElGamalEncryptSign => {
                let (e, rest) = read_mpi(buf)?;
                let (c, rest) = read_mpi(rest)?;
                let _ = rest;
                Ok(Ciphertext::ElGamal { e, c })
            }
            ECDH => {
                let (e, rest) = read_mpi(buf)?;
                if rest.is_empty() {
                    return Err(Error::MalformedMPI(
                        "truncated wrapped key length".into()).into());
                }
                let len = rest[0] as usize;
                let rest = &rest[1..];
                if rest.len() != len {
                    return Err(Error::MalformedMPI(
                        "truncated wrapped key".into()).into());
                }
                Ok(Ciphertext::ECDH { e, key: rest.to_vec().into_boxed_slice() })
            }
            _ => {
                let (mpis, rest) = read_unknown_mpis(buf);
                Ok(Ciphertext::Unknown {
                    mpis: mpis.into_boxed_slice(),
                    rest: rest.to_vec().into_boxed_slice(),
                })
            }
        }
    }
}

impl Signature {
    /// Parses the algorithm-specific fields of a signature's value,
    /// per [Section 5.2.2 of RFC 4880].
    ///
    /// [Section 5.2.2 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.2.2
    pub fn parse(algo: PublicKeyAlgorithm, buf: &[u8]) -> Result<Self> {
        use PublicKeyAlgorithm::*;
        #[allow(deprecated)]
        match algo {
            RSAEncryptSign | RSAEncrypt | RSASign => {
                let (s, rest) = read_mpi(buf)?;
                let _ = rest;
                Ok(Signature::RSA { s })
            }
            DSA => {
                let (r, rest) = read_mpi(buf)?;
                let (s, rest) = read_mpi(rest)?;
                let _ = rest;
                Ok(Signature::DSA { r, s })
            }
            ElGamalEncrypt | ElGamalEncryptSign => {
                let (r, rest) = read_mpi(buf)?;
                let (s, rest) = read_mpi(rest)?;
                let _ = rest;
                Ok(Signature::ElGamal { r, s })
            }
            EdDSA => {
                let (r, rest) = read_mpi(buf)?;
                let (s, rest) = read_mpi(rest)?;
                let _ = rest;
                Ok(Signature::EdDSA { r, s })
            }
            ECDSA => {
                let (r, rest) = read_mpi(buf)?;
                let (s, rest) = read_mpi(rest)?;
                let _ = rest;
                Ok(Signature::ECDSA { r, s })
            }
            _ => {
                let (mpis, rest) = read_unknown_mpis(buf);
                Ok(Signature::Unknown {
                    mpis: mpis.into_boxed_slice(),
                    rest: rest.to_vec().into_boxed_slice(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rsa_public_key() {
        let buf = b"\x00\x01\x01\x00\x02\x02";
        match PublicKey::parse(PublicKeyAlgorithm::RSAEncryptSign, buf).unwrap() {
            PublicKey::RSA { n, e } => {
                assert_eq!(n.bits(), 1);
                assert_eq!(n.value(), &[1]);
                assert_eq!(e.bits(), 2);
                assert_eq!(e.value(), &[2]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn rsa_ciphertext() {
        let buf = b"\x00\x02\x02";
        match Ciphertext::parse(PublicKeyAlgorithm::RSAEncryptSign, buf).unwrap() {
            Ciphertext::RSA { c } => assert_eq!(c.value(), &[2]),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn truncated_mpi_is_an_error() {
        // The length says 9 bits, but only zero bytes follow.
        let buf = b"\x00\x09";
        assert!(PublicKey::parse(PublicKeyAlgorithm::RSAEncryptSign, buf).is_err());
    }

    #[test]
    fn unknown_algorithm_collects_trailing_bytes() {
        let buf = b"\x00\x08\xffrest-bytes";
        match Signature::parse(PublicKeyAlgorithm::Unknown(100), buf).unwrap() {
            Signature::Unknown { mpis, rest } => {
                assert_eq!(mpis.len(), 1);
                assert_eq!(&*rest, b"rest-bytes");
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
