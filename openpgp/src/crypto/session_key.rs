//! Session key wrapping for Public-Key and Symmetric-Key Encrypted
//! Session Key packets (Tags 1 and 3).

use hkdf::Hkdf;
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;

use crate::crypto::mem::Protected;
use crate::crypto::mpi::{self, MPI};
use crate::types::{Curve, HashAlgorithm, SymmetricAlgorithm};
use crate::Error;
use crate::Result;

/// Builds an RSA public key from the wire MPIs, for the `rsa_wrap`/
/// `rsa_unwrap` entry points that take a whole `Key4`.
pub fn rsa_public_key(public: &mpi::PublicKey) -> Result<RsaPublicKey> {
    match public {
        mpi::PublicKey::RSA { e, n } =>
            RsaPublicKey::new(BigUint::from_bytes_be(n.value()), BigUint::from_bytes_be(e.value()))
                .map_err(|e| Error::InvalidArgument(e.to_string()).into()),
        _ => Err(Error::InvalidOperation("not an RSA public key".into()).into()),
    }
}

/// Builds an RSA private key from the wire MPIs.
pub fn rsa_private_key(public: &mpi::PublicKey, secret: &mpi::SecretKeyMaterial) -> Result<RsaPrivateKey> {
    match (public, secret) {
        (mpi::PublicKey::RSA { e, n }, mpi::SecretKeyMaterial::RSA { d, p, q, .. }) => {
            let n = BigUint::from_bytes_be(n.value());
            let e = BigUint::from_bytes_be(e.value());
            let d = BigUint::from_bytes_be(d.value());
            let primes = vec![BigUint::from_bytes_be(p.value()), BigUint::from_bytes_be(q.value())];
            RsaPrivateKey::from_components(n, e, d, primes)
                .map_err(|e| Error::InvalidArgument(e.to_string()).into())
        }
        _ => Err(Error::InvalidOperation("not an RSA key pair".into()).into()),
    }
}

/// A decrypted session key together with the symmetric algorithm it
/// is to be used with, as recovered from a PK-ESK or SK-ESK packet.
pub struct SessionKey {
    /// Algorithm the key is for.
    pub algo: SymmetricAlgorithm,
    /// The raw key bytes.
    pub key: Protected,
}

/// Wraps `session_key` (prefixed with `algo`'s wire octet and a
/// two-octet additive checksum, per Section 5.1 of RFC 4880) for the
/// given RSA public key.
pub fn rsa_wrap(public: &RsaPublicKey, algo: SymmetricAlgorithm, session_key: &[u8]) -> Result<mpi::Ciphertext> {
    let payload = frame_session_key(algo, session_key);
    let c = public.encrypt(&mut rand::thread_rng(), rsa::Pkcs1v15Encrypt, &payload)
        .map_err(|e| Error::KeyGenerationFailure(e.to_string()))?;
    Ok(mpi::Ciphertext::RSA { c: MPI::new(&c) })
}

/// Unwraps an RSA PK-ESK ciphertext, returning the symmetric
/// algorithm and session key it carries.
pub fn rsa_unwrap(private: &RsaPrivateKey, ct: &mpi::Ciphertext) -> Result<SessionKey> {
    let c = match ct {
        mpi::Ciphertext::RSA { c } => c.value(),
        _ => return Err(Error::InvalidOperation("not an RSA ciphertext".into()).into()),
    };
    let mut n_bytes = vec![0u8; private.size().saturating_sub(c.len())];
    n_bytes.extend_from_slice(c);
    let payload = private.decrypt(rsa::Pkcs1v15Encrypt, &n_bytes)
        .map_err(|_| Error::BadSignature("RSA session key decryption failed".into()))?;
    unframe_session_key(&payload)
}

/// Derives the ECDH KEK and AES-key-wraps a session key for an
/// ECDH-over-Curve25519 recipient, per RFC 6637 and the Curve25519
/// conventions from `draft-ietf-openpgp-rfc4880bis`.
pub fn ecdh_curve25519_wrap(
    recipient_point: &[u8],
    recipient_fingerprint: &[u8],
    curve: &Curve,
    kdf_hash: HashAlgorithm,
    kek_algo: SymmetricAlgorithm,
    session_key: &[u8],
) -> Result<(MPI, Vec<u8>)> {
    use rand::RngCore;
    use x25519_dalek::{EphemeralSecret, PublicKey, StaticSecret};

    let mut recipient_fixed = [0u8; 32];
    recipient_fixed.copy_from_slice(&recipient_point[recipient_point.len() - 32..]);
    let recipient_pk = PublicKey::from(recipient_fixed);

    let mut rng = rand::rngs::OsRng;
    let mut seed = [0u8; 32];
    rng.fill_bytes(&mut seed);
    let ephemeral = StaticSecret::from(seed);
    let ephemeral_pk = PublicKey::from(&ephemeral);

    let shared = ephemeral.diffie_hellman(&recipient_pk);
    let kek = ecdh_kdf(shared.as_bytes(), curve, kdf_hash, kek_algo, recipient_fingerprint)?;

    let wrapped = aes_key_wrap(&kek, &frame_session_key(kek_algo, session_key))?;
    Ok((MPI::new_compressed_point(ephemeral_pk.as_bytes()), wrapped))
}

/// The KDF construction of RFC 6637 Section 7: hash the DH shared
/// secret together with a fixed "Anonymous Sender" param block
/// derived from the curve OID, the KEK algorithm, and the
/// recipient's fingerprint.
fn ecdh_kdf(
    shared_secret: &[u8],
    curve: &Curve,
    kdf_hash: HashAlgorithm,
    kek_algo: SymmetricAlgorithm,
    recipient_fingerprint: &[u8],
) -> Result<Protected> {
    let mut ctx = kdf_hash.context()?;
    ctx.update([curve.oid().len() as u8]);
    ctx.update(curve.oid());
    ctx.update([18u8]); // ECDH public key algorithm octet.
    ctx.update([0x03, 0x01, kdf_hash.octet(), kek_algo.octet()]);
    ctx.update(b"Anonymous Sender    ");
    ctx.update(&recipient_fingerprint[recipient_fingerprint.len().saturating_sub(20)..]);
    ctx.update(shared_secret);
    let digest = ctx.digest();
    let key_len = kek_algo.key_size().ok_or(Error::UnsupportedSymmetricAlgorithm(kek_algo))?;
    Ok(digest[..key_len].to_vec().into())
}

/// AES key wrap (RFC 3394), used to wrap the session key under the
/// ECDH-derived KEK.
fn aes_key_wrap(kek: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    use aes::cipher::{BlockEncrypt, KeyInit};
    use aes::Aes128;

    if plaintext.len() % 8 != 0 {
        return Err(Error::InvalidArgument("key wrap input must be a multiple of 8 bytes".into()).into());
    }
    let n = plaintext.len() / 8;
    let mut r = vec![[0u8; 8]; n + 1];
    for i in 0..n {
        r[i + 1].copy_from_slice(&plaintext[i * 8..i * 8 + 8]);
    }
    let mut a = [0xA6u8; 8];

    let cipher = Aes128::new_from_slice(kek)
        .map_err(|e| Error::InvalidArgument(e.to_string()))?;

    for j in 0..6u64 {
        for i in 1..=n as u64 {
            let mut block = [0u8; 16];
            block[..8].copy_from_slice(&a);
            block[8..].copy_from_slice(&r[i as usize]);
            let mut ga = aes::cipher::generic_array::GenericArray::clone_from_slice(&block);
            cipher.encrypt_block(&mut ga);
            let t = j * n as u64 + i;
            a.copy_from_slice(&ga[..8]);
            for (k, b) in a.iter_mut().enumerate() {
                *b ^= (t >> (8 * (7 - k))) as u8;
            }
            r[i as usize].copy_from_slice(&ga[8..]);
        }
    }

    let mut out = Vec::with_capacity(8 * (n + 1));
    out.extend_from_slice(&a);
    for block in &r[1..] {
        out.extend_from_slice(block);
    }
    Ok(out)
}

/// Recovers the ECDH-wrapped session key for a Curve25519 recipient,
/// the inverse of [`ecdh_curve25519_wrap`].
pub fn ecdh_curve25519_unwrap(
    ephemeral_point: &[u8],
    wrapped: &[u8],
    recipient_scalar: &[u8],
    recipient_fingerprint: &[u8],
    curve: &Curve,
    kdf_hash: HashAlgorithm,
    kek_algo: SymmetricAlgorithm,
) -> Result<SessionKey> {
    use x25519_dalek::{PublicKey, StaticSecret};

    let mut ephemeral_fixed = [0u8; 32];
    ephemeral_fixed.copy_from_slice(&ephemeral_point[ephemeral_point.len() - 32..]);
    let ephemeral_pk = PublicKey::from(ephemeral_fixed);

    let mut scalar = [0u8; 32];
    scalar.copy_from_slice(&recipient_scalar[recipient_scalar.len() - 32..]);
    let secret = StaticSecret::from(scalar);

    let shared = secret.diffie_hellman(&ephemeral_pk);
    let kek = ecdh_kdf(shared.as_bytes(), curve, kdf_hash, kek_algo, recipient_fingerprint)?;

    let payload = aes_key_unwrap(&kek, wrapped)?;
    unframe_session_key(&payload)
}

/// The inverse of [`aes_key_wrap`] (RFC 3394 key unwrap).
fn aes_key_unwrap(kek: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    use aes::cipher::{BlockDecrypt, KeyInit};
    use aes::Aes128;

    if ciphertext.len() % 8 != 0 || ciphertext.len() < 16 {
        return Err(Error::InvalidArgument("key unwrap input must be a multiple of 8 bytes, at least 16".into()).into());
    }
    let n = ciphertext.len() / 8 - 1;
    let mut a = [0u8; 8];
    a.copy_from_slice(&ciphertext[..8]);
    let mut r = vec![[0u8; 8]; n + 1];
    for i in 0..n {
        r[i + 1].copy_from_slice(&ciphertext[(i + 1) * 8..(i + 2) * 8]);
    }

    let cipher = Aes128::new_from_slice(kek)
        .map_err(|e| Error::InvalidArgument(e.to_string()))?;

    for j in (0..6u64).rev() {
        for i in (1..=n as u64).rev() {
            let t = j * n as u64 + i;
            for (k, b) in a.iter_mut().enumerate() {
                *b ^= (t >> (8 * (7 - k))) as u8;
            }
            let mut block = [0u8; 16];
            block[..8].copy_from_slice(&a);
            block[8..].copy_from_slice(&r[i as usize]);
            let mut ga = aes::cipher::generic_array::GenericArray::clone_from_slice(&block);
            cipher.decrypt_block(&mut ga);
            a.copy_from_slice(&ga[..8]);
            r[i as usize].copy_from_slice(&ga[8..]);
        }
    }

    if a != [0xA6u8; 8] {
        return Err(Error::BadPassword.into());
    }

    let mut out = Vec::with_capacity(8 * n);
    for block in &r[1..] {
        out.extend_from_slice(block);
    }
    Ok(out)
}

/// Builds the `[algo][key][checksum]` payload wrapped by PK-ESK
/// packets, per Section 5.1 of RFC 4880.
fn frame_session_key(algo: SymmetricAlgorithm, key: &[u8]) -> Vec<u8> {
    let mut v = Vec::with_capacity(1 + key.len() + 2);
    v.push(algo.octet());
    v.extend_from_slice(key);
    let checksum: u16 = key.iter().fold(0u16, |acc, &b| acc.wrapping_add(b as u16));
    v.extend_from_slice(&checksum.to_be_bytes());
    v
}

fn unframe_session_key(payload: &[u8]) -> Result<SessionKey> {
    if payload.len() < 3 {
        return Err(Error::MalformedPacket("PK-ESK payload too short".into()).into());
    }
    let algo = SymmetricAlgorithm::from_octet(payload[0]);
    let key = &payload[1..payload.len() - 2];
    let want: u16 = key.iter().fold(0u16, |acc, &b| acc.wrapping_add(b as u16));
    let got = u16::from_be_bytes([payload[payload.len() - 2], payload[payload.len() - 1]]);
    if want != got {
        return Err(Error::BadPassword.into());
    }
    Ok(SessionKey { algo, key: key.to_vec().into() })
}

/// Derives a KDF-only HKDF key -- used by this crate's own AEAD
/// chunking (not part of the classic RFC 4880 pipeline, but shared
/// infrastructure for the protected key-store formats).
pub fn hkdf_sha256(ikm: &[u8], salt: &[u8], info: &[u8], out_len: usize) -> Protected {
    let hk = Hkdf::<Sha256>::new(Some(salt), ikm);
    let mut okm = vec![0u8; out_len];
    hk.expand(info, &mut okm).expect("requested output is within HKDF limits");
    okm.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_and_unframe_roundtrip() {
        let key = [0x01u8, 0x02, 0x03, 0x04];
        let framed = frame_session_key(SymmetricAlgorithm::AES128, &key);
        let sk = unframe_session_key(&framed).unwrap();
        assert_eq!(&*sk.key, &key[..]);
        assert_eq!(sk.algo, SymmetricAlgorithm::AES128);
    }

    #[test]
    fn unframe_rejects_bad_checksum() {
        let mut framed = frame_session_key(SymmetricAlgorithm::AES128, &[1, 2, 3, 4]);
        let last = framed.len() - 1;
        framed[last] ^= 0xff;
        assert!(unframe_session_key(&framed).is_err());
    }

    #[test]
    fn rsa_session_key_roundtrip() {
        use rand::rngs::OsRng;
        let private = RsaPrivateKey::new(&mut OsRng, 1024).unwrap();
        let public = RsaPublicKey::from(&private);
        let key = [0x11u8; 16];
        let ct = rsa_wrap(&public, SymmetricAlgorithm::AES128, &key).unwrap();
        let sk = rsa_unwrap(&private, &ct).unwrap();
        assert_eq!(&*sk.key, &key[..]);
    }

    #[test]
    fn key_wrap_is_deterministic_length() {
        let kek = [0u8; 16];
        let wrapped = aes_key_wrap(&kek, &[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        assert_eq!(wrapped.len(), 16);
    }

    #[test]
    fn key_wrap_unwrap_roundtrip() {
        let kek = [0x2bu8; 16];
        let plaintext = [1u8, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16];
        let wrapped = aes_key_wrap(&kek, &plaintext).unwrap();
        let unwrapped = aes_key_unwrap(&kek, &wrapped).unwrap();
        assert_eq!(&unwrapped, &plaintext);
    }

    #[test]
    fn ecdh_curve25519_wrap_unwrap_roundtrip() {
        use rand::RngCore;
        use x25519_dalek::{PublicKey, StaticSecret};

        let mut seed = [0u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut seed);
        let recipient_secret = StaticSecret::from(seed);
        let recipient_public = PublicKey::from(&recipient_secret);

        let fingerprint = [0x42u8; 20];
        let key = [0x11u8; 16];

        let (ephemeral, wrapped) = ecdh_curve25519_wrap(
            recipient_public.as_bytes(),
            &fingerprint,
            &Curve::Cv25519,
            HashAlgorithm::SHA256,
            SymmetricAlgorithm::AES128,
            &key,
        ).unwrap();

        let sk = ecdh_curve25519_unwrap(
            ephemeral.value(),
            &wrapped,
            seed.as_ref(),
            &fingerprint,
            &Curve::Cv25519,
            HashAlgorithm::SHA256,
            SymmetricAlgorithm::AES128,
        ).unwrap();

        assert_eq!(&*sk.key, &key[..]);
        assert_eq!(sk.algo, SymmetricAlgorithm::AES128);
    }
}
