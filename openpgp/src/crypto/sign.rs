//! Sign and verify oracles.
//!
//! Maps the closed set of `PublicKeyAlgorithm`s this crate actually
//! implements cryptographic operations for onto the matching
//! RustCrypto (and dalek) crate. Algorithms outside that set --
//! ElGamal signing, SM2 -- are represented in the type model
//! ([`crate::crypto::mpi`]) for read compatibility but fail with
//! `Error::UnsupportedPublicKeyAlgorithm` here.

use ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};

use crate::crypto::mpi::{self, MPI};
use crate::types::{Curve, HashAlgorithm, PublicKeyAlgorithm};
use crate::Error;
use crate::Result;

/// Produces a signature over a pre-computed hash digest, per the
/// given key material.
pub fn sign(
    secret: &mpi::SecretKeyMaterial,
    public: &mpi::PublicKey,
    hash_algo: HashAlgorithm,
    digest: &[u8],
) -> Result<mpi::Signature> {
    match (secret, public) {
        (mpi::SecretKeyMaterial::RSA { d, p, q, .. },
         mpi::PublicKey::RSA { e, n }) => {
            let key = rsa_private_key(n, e, d, p, q)?;
            let sig = sign_rsa(&key, hash_algo, digest)?;
            Ok(mpi::Signature::RSA { s: MPI::new(&sig) })
        }
        (mpi::SecretKeyMaterial::ECDSA { scalar },
         mpi::PublicKey::ECDSA { curve, .. }) => {
            sign_ecdsa(curve, scalar.value(), digest)
        }
        (mpi::SecretKeyMaterial::EdDSA { scalar },
         mpi::PublicKey::EdDSA { curve, .. }) => {
            sign_eddsa(curve, scalar.value(), digest)
        }
        (mpi::SecretKeyMaterial::DSA { .. }, mpi::PublicKey::DSA { .. }) =>
            Err(Error::UnsupportedPublicKeyAlgorithm(PublicKeyAlgorithm::DSA).into()),
        _ => Err(Error::InvalidOperation(
            "secret and public key material don't agree on the algorithm".into()).into()),
    }
}

/// Verifies a signature over a pre-computed hash digest.
pub fn verify(
    public: &mpi::PublicKey,
    hash_algo: HashAlgorithm,
    digest: &[u8],
    sig: &mpi::Signature,
) -> Result<()> {
    match (public, sig) {
        (mpi::PublicKey::RSA { e, n }, mpi::Signature::RSA { s }) => {
            let key = RsaPublicKey::new(
                BigUint::from_bytes_be(n.value()),
                BigUint::from_bytes_be(e.value()))
                .map_err(|e| Error::BadSignature(e.to_string()))?;
            verify_rsa(&key, hash_algo, digest, s.value())
        }
        (mpi::PublicKey::ECDSA { curve, q }, mpi::Signature::ECDSA { r, s }) =>
            verify_ecdsa(curve, q.value(), digest, r.value(), s.value()),
        (mpi::PublicKey::EdDSA { curve, q }, mpi::Signature::EdDSA { r, s }) =>
            verify_eddsa(curve, q.value(), digest, r.value(), s.value()),
        (mpi::PublicKey::DSA { .. }, mpi::Signature::DSA { .. }) =>
            Err(Error::UnsupportedPublicKeyAlgorithm(PublicKeyAlgorithm::DSA).into()),
        _ => Err(Error::BadSignature("key and signature algorithms disagree".into()).into()),
    }
}

/// ASN.1 `DigestInfo` prefix for SHA-1, as used by PKCS#1 v1.5
/// signatures (RFC 8017, Section 9.2, Note 1).
const SHA1_ASN1_PREFIX: [u8; 15] = [
    0x30, 0x21, 0x30, 0x09, 0x06, 0x05, 0x2b, 0x0e, 0x03, 0x02, 0x1a, 0x05, 0x00, 0x04, 0x14,
];

fn rsa_private_key(n: &MPI, e: &MPI, d: &MPI, p: &MPI, q: &MPI) -> Result<RsaPrivateKey> {
    let n = BigUint::from_bytes_be(n.value());
    let e = BigUint::from_bytes_be(e.value());
    let d = BigUint::from_bytes_be(d.value());
    let primes = vec![BigUint::from_bytes_be(p.value()), BigUint::from_bytes_be(q.value())];
    RsaPrivateKey::from_components(n, e, d, primes)
        .map_err(|e| Error::KeyGenerationFailure(e.to_string()).into())
}

/// Maps an OpenPGP hash algorithm onto the PKCS#1 DigestInfo OID
/// prefix the `rsa` crate needs to build a `Pkcs1v15Sign` padding.
fn rsa_pkcs1_padding(hash_algo: HashAlgorithm) -> Result<rsa::Pkcs1v15Sign> {
    use sha2::{Sha224, Sha256, Sha384, Sha512};
    Ok(match hash_algo {
        HashAlgorithm::SHA224 => rsa::Pkcs1v15Sign::new::<Sha224>(),
        HashAlgorithm::SHA256 => rsa::Pkcs1v15Sign::new::<Sha256>(),
        HashAlgorithm::SHA384 => rsa::Pkcs1v15Sign::new::<Sha384>(),
        HashAlgorithm::SHA512 => rsa::Pkcs1v15Sign::new::<Sha512>(),
        HashAlgorithm::SHA1 => rsa::Pkcs1v15Sign {
            hash_len: Some(20),
            prefix: SHA1_ASN1_PREFIX.into(),
        },
        _ => return Err(Error::UnsupportedHashAlgorithm(hash_algo).into()),
    })
}

fn sign_rsa(key: &RsaPrivateKey, hash_algo: HashAlgorithm, digest: &[u8]) -> Result<Vec<u8>> {
    let padding = rsa_pkcs1_padding(hash_algo)?;
    key.sign(padding, digest)
        .map_err(|e| Error::KeyGenerationFailure(e.to_string()).into())
}

fn verify_rsa(key: &RsaPublicKey, hash_algo: HashAlgorithm, digest: &[u8], sig: &[u8]) -> Result<()> {
    let padding = rsa_pkcs1_padding(hash_algo)?;
    let want_len = key.size();
    let mut padded = vec![0u8; want_len.saturating_sub(sig.len())];
    padded.extend_from_slice(sig);
    key.verify(padding, digest, &padded)
        .map_err(|e| Error::BadSignature(e.to_string()).into())
}

fn sign_ecdsa(curve: &Curve, scalar: &[u8], digest: &[u8]) -> Result<mpi::Signature> {
    macro_rules! with_curve {
        ($curve:ty) => {{
            let sk = ecdsa::SigningKey::<$curve>::from_slice(scalar)
                .map_err(|e| Error::KeyGenerationFailure(e.to_string()))?;
            let sig: ecdsa::Signature<$curve> = sk.sign_prehash(digest)
                .map_err(|e| Error::KeyGenerationFailure(e.to_string()))?;
            let bytes = sig.to_bytes();
            let half = bytes.len() / 2;
            Ok(mpi::Signature::ECDSA {
                r: MPI::new(&bytes[..half]),
                s: MPI::new(&bytes[half..]),
            })
        }};
    }
    match curve {
        Curve::NistP256 => with_curve!(p256::NistP256),
        Curve::NistP384 => with_curve!(p384::NistP384),
        Curve::NistP521 => with_curve!(p521::NistP521),
        other => Err(Error::UnsupportedEllipticCurve(other.clone()).into()),
    }
}

fn verify_ecdsa(curve: &Curve, point: &[u8], digest: &[u8], r: &[u8], s: &[u8]) -> Result<()> {
    macro_rules! with_curve {
        ($curve:ty, $field_bytes:expr) => {{
            let vk = ecdsa::VerifyingKey::<$curve>::from_sec1_bytes(point)
                .map_err(|e| Error::BadSignature(e.to_string()))?;
            let mut bytes = vec![0u8; 2 * $field_bytes];
            bytes[$field_bytes - r.len()..$field_bytes].copy_from_slice(r);
            bytes[2 * $field_bytes - s.len()..].copy_from_slice(s);
            let sig = ecdsa::Signature::<$curve>::try_from(bytes.as_slice())
                .map_err(|e| Error::BadSignature(e.to_string()))?;
            vk.verify_prehash(digest, &sig)
                .map_err(|e| Error::BadSignature(e.to_string()).into())
        }};
    }
    match curve {
        Curve::NistP256 => with_curve!(p256::NistP256, 32),
        Curve::NistP384 => with_curve!(p384::NistP384, 48),
        Curve::NistP521 => with_curve!(p521::NistP521, 66),
        other => Err(Error::UnsupportedEllipticCurve(other.clone()).into()),
    }
}

fn sign_eddsa(curve: &Curve, scalar: &[u8], digest: &[u8]) -> Result<mpi::Signature> {
    if *curve != Curve::Ed25519 {
        return Err(Error::UnsupportedEllipticCurve(curve.clone()).into());
    }
    let mut seed = [0u8; 32];
    seed[32 - scalar.len().min(32)..].copy_from_slice(&scalar[scalar.len().saturating_sub(32)..]);
    let sk = ed25519_dalek::SigningKey::from_bytes(&seed);
    let sig = sk.sign(digest);
    let bytes = sig.to_bytes();
    Ok(mpi::Signature::EdDSA {
        r: MPI::new(&bytes[..32]),
        s: MPI::new(&bytes[32..]),
    })
}

fn verify_eddsa(curve: &Curve, point: &[u8], digest: &[u8], r: &[u8], s: &[u8]) -> Result<()> {
    if *curve != Curve::Ed25519 {
        return Err(Error::UnsupportedEllipticCurve(curve.clone()).into());
    }
    let mut pk_bytes = [0u8; 32];
    pk_bytes[32 - point.len().min(32)..].copy_from_slice(&point[point.len().saturating_sub(32)..]);
    let vk = ed25519_dalek::VerifyingKey::from_bytes(&pk_bytes)
        .map_err(|e| Error::BadSignature(e.to_string()))?;

    let mut sig_bytes = [0u8; 64];
    sig_bytes[32 - r.len().min(32)..32].copy_from_slice(&r[r.len().saturating_sub(32)..]);
    sig_bytes[64 - s.len().min(32)..].copy_from_slice(&s[s.len().saturating_sub(32)..]);
    let sig = ed25519_dalek::Signature::from_bytes(&sig_bytes);

    vk.verify_strict(digest, &sig)
        .map_err(|e| Error::BadSignature(e.to_string()).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rsa_sign_verify_roundtrip() {
        use rand::rngs::OsRng;
        let priv_key = RsaPrivateKey::new(&mut OsRng, 1024).unwrap();
        let pub_key = RsaPublicKey::from(&priv_key);

        let secret = mpi::SecretKeyMaterial::RSA {
            d: MPI::new(&priv_key.d().to_bytes_be()).into(),
            p: MPI::new(&priv_key.primes()[0].to_bytes_be()).into(),
            q: MPI::new(&priv_key.primes()[1].to_bytes_be()).into(),
            u: MPI::new(&[0]).into(),
        };
        let public = mpi::PublicKey::RSA {
            e: MPI::new(&pub_key.e().to_bytes_be()),
            n: MPI::new(&pub_key.n().to_bytes_be()),
        };

        let digest = [0x42u8; 32];
        let sig = sign(&secret, &public, HashAlgorithm::SHA256, &digest).unwrap();
        verify(&public, HashAlgorithm::SHA256, &digest, &sig).unwrap();
    }

    #[test]
    fn ed25519_sign_verify_roundtrip() {
        use ed25519_dalek::SigningKey;
        let mut csprng = rand::rngs::OsRng;
        let sk = SigningKey::generate(&mut csprng);
        let vk = sk.verifying_key();

        let secret = mpi::SecretKeyMaterial::EdDSA { scalar: MPI::new(sk.as_bytes()).into() };
        let public = mpi::PublicKey::EdDSA {
            curve: Curve::Ed25519,
            q: MPI::new_compressed_point(vk.as_bytes()),
        };

        let digest = [0x11u8; 32];
        let sig = sign(&secret, &public, HashAlgorithm::SHA256, &digest).unwrap();
        verify(&public, HashAlgorithm::SHA256, &digest, &sig).unwrap();
    }
}
