//! Multi Precision Integers and the typed key-material containers
//! built out of them.

use std::cmp::Ordering;
use std::fmt;
use std::io;

use crate::crypto::hash::{self, Hash};
use crate::crypto::mem::{secure_cmp, Protected};
use crate::serialize::{write_mpi, Marshal};
use crate::types::{Curve, HashAlgorithm, PublicKeyAlgorithm, SymmetricAlgorithm};
use crate::Error;
use crate::Result;

/// Holds a single MPI.
#[derive(Clone)]
pub struct MPI {
    /// Integer value as big-endian, without leading zero octets.
    value: Box<[u8]>,
}

impl From<Vec<u8>> for MPI {
    fn from(v: Vec<u8>) -> Self {
        Self::new(&v)
    }
}

impl MPI {
    /// Creates a new MPI, stripping leading zero octets.
    pub fn new(value: &[u8]) -> Self {
        let offset = value.iter().take_while(|&&b| b == 0).count();
        MPI { value: value[offset..].to_vec().into_boxed_slice() }
    }

    /// Encodes an uncompressed elliptic curve point (`0x04 || x || y`)
    /// as an MPI, per Section 6 of RFC 6637.
    pub fn new_point(x: &[u8], y: &[u8], field_bits: usize) -> Self {
        let field_sz = (field_bits + 7) / 8;
        let mut val = vec![0u8; 1 + 2 * field_sz];
        val[0] = 0x04;
        val[1 + (field_sz - x.len())..1 + field_sz].copy_from_slice(x);
        val[1 + field_sz + (field_sz - y.len())..].copy_from_slice(y);
        MPI { value: val.into_boxed_slice() }
    }

    /// Encodes a compressed Curve25519/Ed25519 point (`0x40 || x`).
    pub fn new_compressed_point(x: &[u8]) -> Self {
        let mut val = vec![0u8; 1 + x.len()];
        val[0] = 0x40;
        val[1..].copy_from_slice(x);
        MPI { value: val.into_boxed_slice() }
    }

    /// Returns the length of the MPI in bits.
    pub fn bits(&self) -> usize {
        self.value.len() * 8
            - self.value.first().map(|&b| b.leading_zeros() as usize).unwrap_or(0)
    }

    /// Returns the value of this MPI.
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Dissects this MPI describing an EC point into its coordinates.
    ///
    /// Cv25519 and Ed25519 use a custom compression that only
    /// contains the `x` coordinate, so `y` is returned empty for
    /// those curves.
    pub fn decode_point(&self, curve: &Curve) -> Result<(&[u8], &[u8])> {
        match curve {
            Curve::Ed25519 | Curve::Cv25519 => {
                if self.value.len() != 33 {
                    return Err(Error::MalformedMPI(
                        format!("bad size of Curve25519 point: {} (expected 33)",
                                self.value.len())).into());
                }
                if self.value[0] != 0x40 {
                    return Err(Error::MalformedMPI(
                        "bad encoding of Curve25519 point".into()).into());
                }
                Ok((&self.value[1..], &[]))
            }
            _ => {
                let bits = curve.bits().ok_or_else(
                    || Error::UnsupportedEllipticCurve(curve.clone()))?;
                let coordinate_length = (bits + 7) / 8;
                let expected_length = 1 + 2 * coordinate_length;
                if self.value.len() != expected_length {
                    return Err(Error::MalformedMPI(
                        format!("invalid length of point MPI: {} (expected {})",
                                self.value.len(), expected_length)).into());
                }
                if self.value[0] != 0x04 {
                    return Err(Error::MalformedMPI(
                        format!("bad prefix: {:?} (expected 0x04)",
                                self.value.first())).into());
                }
                Ok((&self.value[1..1 + coordinate_length],
                    &self.value[1 + coordinate_length..]))
            }
        }
    }
}

impl fmt::Debug for MPI {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} bits: {}", self.bits(), crate::utils::hex_pretty(&self.value))
    }
}

impl Hash for MPI {
    fn hash(&self, hash: &mut hash::Context) {
        let len = self.bits() as u16;
        hash.update(len.to_be_bytes());
        hash.update(&self.value);
    }
}

impl PartialOrd for MPI {
    fn partial_cmp(&self, other: &MPI) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MPI {
    fn cmp(&self, other: &MPI) -> Ordering {
        secure_cmp(&self.value, &other.value)
    }
}

impl PartialEq for MPI {
    fn eq(&self, other: &MPI) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for MPI {}

impl std::hash::Hash for MPI {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl Marshal for MPI {
    fn serialize(&self, sink: &mut dyn io::Write) -> Result<()> {
        write_mpi(sink, self.bits(), self.value())
    }
}

/// Holds a single MPI containing secrets.
///
/// The memory is cleared on drop.
#[derive(Clone)]
pub struct ProtectedMPI {
    value: Protected,
}

impl From<Vec<u8>> for ProtectedMPI {
    fn from(m: Vec<u8>) -> Self {
        MPI::from(m).into()
    }
}

impl From<MPI> for ProtectedMPI {
    fn from(m: MPI) -> Self {
        ProtectedMPI { value: Vec::from(m.value).into() }
    }
}

impl std::hash::Hash for ProtectedMPI {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        (&*self.value).hash(state);
    }
}

impl ProtectedMPI {
    /// Returns the length of the MPI in bits.
    pub fn bits(&self) -> usize {
        self.value.len() * 8
            - self.value.first().map(|&b| b.leading_zeros() as usize).unwrap_or(0)
    }

    /// Returns the value of this MPI.
    pub fn value(&self) -> &[u8] {
        &self.value
    }
}

impl fmt::Debug for ProtectedMPI {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if cfg!(debug_assertions) {
            write!(f, "{} bits: {}", self.bits(), crate::utils::hex_pretty(&self.value))
        } else {
            f.write_str("<Redacted>")
        }
    }
}

impl PartialEq for ProtectedMPI {
    fn eq(&self, other: &Self) -> bool {
        secure_cmp(&self.value, &other.value) == Ordering::Equal
    }
}
impl Eq for ProtectedMPI {}

impl Marshal for ProtectedMPI {
    fn serialize(&self, sink: &mut dyn io::Write) -> Result<()> {
        write_mpi(sink, self.bits(), self.value())
    }
}

/// Holds a public key.
///
/// Provides a typed and structured way of storing the MPIs (and
/// occasional elliptic curve) that make up a public key, keyed by
/// the algorithm that produced them.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum PublicKey {
    /// RSA public key.
    RSA {
        /// Public exponent.
        e: MPI,
        /// Public modulus N = pq.
        n: MPI,
    },
    /// NIST DSA public key.
    DSA {
        /// Prime of the ring Zp.
        p: MPI,
        /// Order of `g` in Zp.
        q: MPI,
        /// Public generator of Zp.
        g: MPI,
        /// Public key g^x mod p.
        y: MPI,
    },
    /// ElGamal public key.
    ElGamal {
        /// Prime of the ring Zp.
        p: MPI,
        /// Generator of Zp.
        g: MPI,
        /// Public key g^x mod p.
        y: MPI,
    },
    /// DJB's "Twisted" Edwards curve DSA public key.
    EdDSA {
        /// Curve, must be Ed25519.
        curve: Curve,
        /// Public point.
        q: MPI,
    },
    /// NIST Elliptic Curve DSA public key.
    ECDSA {
        /// Curve.
        curve: Curve,
        /// Public point.
        q: MPI,
    },
    /// Elliptic Curve Diffie-Hellman public key.
    ECDH {
        /// Curve.
        curve: Curve,
        /// Public point.
        q: MPI,
        /// Hash algorithm used for key derivation.
        hash: HashAlgorithm,
        /// Symmetric algorithm used with the derived key.
        sym: SymmetricAlgorithm,
    },
    /// Unknown number of MPIs for an unknown algorithm.
    Unknown {
        /// The successfully parsed MPIs.
        mpis: Box<[MPI]>,
        /// Any data that failed to parse.
        rest: Box<[u8]>,
    },
}

impl PublicKey {
    /// Returns the size of the key material in bits.
    ///
    /// For finite field algorithms this is the size of the modulus;
    /// for ECC it is `Curve::bits()`.
    pub fn bits(&self) -> Option<usize> {
        match self {
            PublicKey::RSA { n, .. } => Some(n.bits()),
            PublicKey::DSA { p, .. } => Some(p.bits()),
            PublicKey::ElGamal { p, .. } => Some(p.bits()),
            PublicKey::EdDSA { curve, .. } => curve.bits(),
            PublicKey::ECDSA { curve, .. } => curve.bits(),
            PublicKey::ECDH { curve, .. } => curve.bits(),
            PublicKey::Unknown { .. } => None,
        }
    }

    /// Returns, if known, the public-key algorithm for this key.
    pub fn algo(&self) -> Option<PublicKeyAlgorithm> {
        match self {
            PublicKey::RSA { .. } => Some(PublicKeyAlgorithm::RSAEncryptSign),
            PublicKey::DSA { .. } => Some(PublicKeyAlgorithm::DSA),
            PublicKey::ElGamal { .. } => Some(PublicKeyAlgorithm::ElGamalEncrypt),
            PublicKey::EdDSA { .. } => Some(PublicKeyAlgorithm::EdDSA),
            PublicKey::ECDSA { .. } => Some(PublicKeyAlgorithm::ECDSA),
            PublicKey::ECDH { .. } => Some(PublicKeyAlgorithm::ECDH),
            PublicKey::Unknown { .. } => None,
        }
    }
}

impl Marshal for PublicKey {
    /// Writes the algorithm-specific fields, per [Section 5.5.2 of RFC
    /// 4880] and [Section 9 of RFC 6637].
    ///
    /// [Section 5.5.2 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.5.2
    /// [Section 9 of RFC 6637]: https://tools.ietf.org/html/rfc6637#section-9
    fn serialize(&self, sink: &mut dyn io::Write) -> Result<()> {
        match self {
            PublicKey::RSA { e, n } => {
                n.serialize(sink)?;
                e.serialize(sink)?;
            }
            PublicKey::DSA { p, q, g, y } => {
                p.serialize(sink)?;
                q.serialize(sink)?;
                g.serialize(sink)?;
                y.serialize(sink)?;
            }
            PublicKey::ElGamal { p, g, y } => {
                p.serialize(sink)?;
                g.serialize(sink)?;
                y.serialize(sink)?;
            }
            PublicKey::EdDSA { curve, q } | PublicKey::ECDSA { curve, q } => {
                let oid = curve.oid();
                sink.write_all(&[oid.len() as u8])?;
                sink.write_all(oid)?;
                q.serialize(sink)?;
            }
            PublicKey::ECDH { curve, q, hash, sym } => {
                let oid = curve.oid();
                sink.write_all(&[oid.len() as u8])?;
                sink.write_all(oid)?;
                q.serialize(sink)?;
                // KDF parameters: length, reserved, hash, symmetric algo.
                sink.write_all(&[3, 1, hash.octet(), sym.octet()])?;
            }
            PublicKey::Unknown { mpis, rest } => {
                for m in mpis.iter() {
                    m.serialize(sink)?;
                }
                sink.write_all(rest)?;
            }
        }
        Ok(())
    }
}

/// Holds a secret key.
///
/// `PartialEq` compares in constant time since these values are
/// secrets.
#[derive(Clone, std::hash::Hash)]
pub enum SecretKeyMaterial {
    /// RSA secret key.
    RSA {
        /// Secret exponent, the inverse of `e` mod phi(N).
        d: ProtectedMPI,
        /// Smaller secret prime.
        p: ProtectedMPI,
        /// Larger secret prime.
        q: ProtectedMPI,
        /// Inverse of `p` mod `q`.
        u: ProtectedMPI,
    },
    /// NIST DSA secret key.
    DSA {
        /// Secret key log_g(y) in Zp.
        x: ProtectedMPI,
    },
    /// ElGamal secret key.
    ElGamal {
        /// Secret key log_g(y) in Zp.
        x: ProtectedMPI,
    },
    /// DJB's "Twisted" Edwards curve DSA secret key.
    EdDSA {
        /// Secret scalar.
        scalar: ProtectedMPI,
    },
    /// NIST Elliptic Curve DSA secret key.
    ECDSA {
        /// Secret scalar.
        scalar: ProtectedMPI,
    },
    /// Elliptic Curve Diffie-Hellman secret key.
    ECDH {
        /// Secret scalar.
        scalar: ProtectedMPI,
    },
    /// Unknown number of MPIs for an unknown algorithm.
    Unknown {
        /// The successfully parsed MPIs.
        mpis: Box<[ProtectedMPI]>,
        /// Any data that failed to parse.
        rest: Protected,
    },
}

impl fmt::Debug for SecretKeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if cfg!(debug_assertions) {
            match self {
                SecretKeyMaterial::RSA { d, p, q, u } =>
                    write!(f, "RSA {{ d: {:?}, p: {:?}, q: {:?}, u: {:?} }}", d, p, q, u),
                SecretKeyMaterial::DSA { x } => write!(f, "DSA {{ x: {:?} }}", x),
                SecretKeyMaterial::ElGamal { x } => write!(f, "ElGamal {{ x: {:?} }}", x),
                SecretKeyMaterial::EdDSA { scalar } => write!(f, "EdDSA {{ scalar: {:?} }}", scalar),
                SecretKeyMaterial::ECDSA { scalar } => write!(f, "ECDSA {{ scalar: {:?} }}", scalar),
                SecretKeyMaterial::ECDH { scalar } => write!(f, "ECDH {{ scalar: {:?} }}", scalar),
                SecretKeyMaterial::Unknown { mpis, rest } =>
                    write!(f, "Unknown {{ mpis: {:?}, rest: {:?} }}", mpis, rest),
            }
        } else {
            f.write_str("<Redacted>")
        }
    }
}

impl SecretKeyMaterial {
    /// Returns, if known, the public-key algorithm for this key.
    pub fn algo(&self) -> Option<PublicKeyAlgorithm> {
        match self {
            SecretKeyMaterial::RSA { .. } => Some(PublicKeyAlgorithm::RSAEncryptSign),
            SecretKeyMaterial::DSA { .. } => Some(PublicKeyAlgorithm::DSA),
            SecretKeyMaterial::ElGamal { .. } => Some(PublicKeyAlgorithm::ElGamalEncrypt),
            SecretKeyMaterial::EdDSA { .. } => Some(PublicKeyAlgorithm::EdDSA),
            SecretKeyMaterial::ECDSA { .. } => Some(PublicKeyAlgorithm::ECDSA),
            SecretKeyMaterial::ECDH { .. } => Some(PublicKeyAlgorithm::ECDH),
            SecretKeyMaterial::Unknown { .. } => None,
        }
    }
}

impl PartialEq for SecretKeyMaterial {
    fn eq(&self, other: &Self) -> bool {
        use SecretKeyMaterial::*;
        match (self, other) {
            (RSA { d: d1, p: p1, q: q1, u: u1 }, RSA { d: d2, p: p2, q: q2, u: u2 }) =>
                d1 == d2 && p1 == p2 && q1 == q2 && u1 == u2,
            (DSA { x: x1 }, DSA { x: x2 }) => x1 == x2,
            (ElGamal { x: x1 }, ElGamal { x: x2 }) => x1 == x2,
            (EdDSA { scalar: s1 }, EdDSA { scalar: s2 }) => s1 == s2,
            (ECDSA { scalar: s1 }, ECDSA { scalar: s2 }) => s1 == s2,
            (ECDH { scalar: s1 }, ECDH { scalar: s2 }) => s1 == s2,
            (Unknown { mpis: m1, rest: r1 }, Unknown { mpis: m2, rest: r2 }) =>
                m1 == m2 && r1 == r2,
            _ => false,
        }
    }
}
impl Eq for SecretKeyMaterial {}

impl Marshal for SecretKeyMaterial {
    /// Writes the unencrypted algorithm-specific fields, per [Section
    /// 5.5.3 of RFC 4880].
    ///
    /// [Section 5.5.3 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.5.3
    fn serialize(&self, sink: &mut dyn io::Write) -> Result<()> {
        match self {
            SecretKeyMaterial::RSA { d, p, q, u } => {
                d.serialize(sink)?;
                p.serialize(sink)?;
                q.serialize(sink)?;
                u.serialize(sink)?;
            }
            SecretKeyMaterial::DSA { x } | SecretKeyMaterial::ElGamal { x } =>
                x.serialize(sink)?,
            SecretKeyMaterial::EdDSA { scalar }
            | SecretKeyMaterial::ECDSA { scalar }
            | SecretKeyMaterial::ECDH { scalar } =>
                scalar.serialize(sink)?,
            SecretKeyMaterial::Unknown { mpis, rest } => {
                for m in mpis.iter() {
                    m.serialize(sink)?;
                }
                sink.write_all(rest)?;
            }
        }
        Ok(())
    }
}

/// Holds a ciphertext.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Ciphertext {
    /// RSA ciphertext.
    RSA {
        /// m^e mod N.
        c: MPI,
    },
    /// ElGamal ciphertext.
    ElGamal {
        /// Ephemeral key.
        e: MPI,
        /// Encrypted value.
        c: MPI,
    },
    /// Elliptic Curve Diffie-Hellman ciphertext.
    ECDH {
        /// Ephemeral key.
        e: MPI,
        /// Symmetrically (AES key wrap) encrypted session key.
        key: Box<[u8]>,
    },
    /// Unknown number of MPIs for an unknown algorithm.
    Unknown {
        /// The successfully parsed MPIs.
        mpis: Box<[MPI]>,
        /// Any data that failed to parse.
        rest: Box<[u8]>,
    },
}

impl Ciphertext {
    /// Returns, if known, the public-key algorithm for this ciphertext.
    pub fn pk_algo(&self) -> Option<PublicKeyAlgorithm> {
        match self {
            Ciphertext::RSA { .. } => Some(PublicKeyAlgorithm::RSAEncryptSign),
            Ciphertext::ElGamal { .. } => Some(PublicKeyAlgorithm::ElGamalEncrypt),
            Ciphertext::ECDH { .. } => Some(PublicKeyAlgorithm::ECDH),
            Ciphertext::Unknown { .. } => None,
        }
    }
}

impl Marshal for Ciphertext {
    fn serialize(&self, sink: &mut dyn io::Write) -> Result<()> {
        match self {
            Ciphertext::RSA { c } => c.serialize(sink)?,
            Ciphertext::ElGamal { e, c } => {
                e.serialize(sink)?;
                c.serialize(sink)?;
            }
            Ciphertext::ECDH { e, key } => {
                e.serialize(sink)?;
                sink.write_all(&[key.len() as u8])?;
                sink.write_all(key)?;
            }
            Ciphertext::Unknown { mpis, rest } => {
                for m in mpis.iter() {
                    m.serialize(sink)?;
                }
                sink.write_all(rest)?;
            }
        }
        Ok(())
    }
}

/// Holds a signature.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Signature {
    /// RSA signature.
    RSA {
        /// m^d mod N.
        s: MPI,
    },
    /// NIST DSA signature.
    DSA {
        /// `r` value.
        r: MPI,
        /// `s` value.
        s: MPI,
    },
    /// ElGamal signature.
    ElGamal {
        /// `r` value.
        r: MPI,
        /// `s` value.
        s: MPI,
    },
    /// DJB's "Twisted" Edwards curve DSA signature.
    EdDSA {
        /// `r` value.
        r: MPI,
        /// `s` value.
        s: MPI,
    },
    /// NIST Elliptic Curve DSA signature.
    ECDSA {
        /// `r` value.
        r: MPI,
        /// `s` value.
        s: MPI,
    },
    /// Unknown number of MPIs for an unknown algorithm.
    Unknown {
        /// The successfully parsed MPIs.
        mpis: Box<[MPI]>,
        /// Any data that failed to parse.
        rest: Box<[u8]>,
    },
}

impl Marshal for Signature {
    fn serialize(&self, sink: &mut dyn io::Write) -> Result<()> {
        match self {
            Signature::RSA { s } => s.serialize(sink)?,
            Signature::DSA { r, s }
            | Signature::ElGamal { r, s }
            | Signature::EdDSA { r, s }
            | Signature::ECDSA { r, s } => {
                r.serialize(sink)?;
                s.serialize(sink)?;
            }
            Signature::Unknown { mpis, rest } => {
                for m in mpis.iter() {
                    m.serialize(sink)?;
                }
                sink.write_all(rest)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mpi_strips_leading_zeros() {
        let mpi = MPI::new(&[0, 0, 0x01, 0x02]);
        assert_eq!(mpi.value(), &[0x01, 0x02]);
        assert_eq!(mpi.bits(), 9);
    }

    #[test]
    fn decode_curve25519_point_roundtrip() {
        let x = [0x42u8; 32];
        let mpi = MPI::new_compressed_point(&x);
        let (gotx, goty) = mpi.decode_point(&Curve::Cv25519).unwrap();
        assert_eq!(gotx, &x[..]);
        assert!(goty.is_empty());
    }

    #[test]
    fn decode_nistp256_point_roundtrip() {
        let x = [0x11u8; 32];
        let y = [0x22u8; 32];
        let mpi = MPI::new_point(&x, &y, 256);
        let (gotx, goty) = mpi.decode_point(&Curve::NistP256).unwrap();
        assert_eq!(gotx, &x[..]);
        assert_eq!(goty, &y[..]);
    }

    #[test]
    fn protected_mpi_is_constant_time_equal() {
        let a: ProtectedMPI = MPI::new(&[1, 2, 3]).into();
        let b: ProtectedMPI = MPI::new(&[1, 2, 3]).into();
        let c: ProtectedMPI = MPI::new(&[1, 2, 4]).into();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
