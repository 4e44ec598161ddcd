//! Keys.
//!
//! A key packet binds a creation time and an algorithm to a piece of
//! public key material, and optionally a corresponding piece of
//! secret key material. The wire format distinguishes primary keys
//! from subkeys (Tags 5/6/7/14) and public from secret packets (Tags
//! 5/7 vs 6/14), but the packet body is otherwise identical, so this
//! crate represents all four with one concrete struct and a role
//! field rather than a compile-time `Key<P, R>` type state.

use std::convert::TryFrom;
use std::io;
use std::time::SystemTime;

use rand::rngs::OsRng;
use rsa::RsaPrivateKey;
use rsa::traits::PublicKeyParts;

use crate::crypto::mpi::{self, MPI};
use crate::crypto::s2k::S2K;
use crate::crypto::{hash, sign, symmetric};
use crate::packet::{self, Packet};
use crate::serialize::Marshal;
use crate::types::{Curve, PublicKeyAlgorithm, Timestamp};
use crate::{Error, Fingerprint, KeyID, Result};

/// Whether a key packet is a primary key or a subkey.
///
/// This only distinguishes the packet's position in a certificate;
/// the key material and its handling are otherwise identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyRole {
    /// A certificate's primary key.
    Primary,
    /// A certificate's subkey.
    Subordinate,
}

/// A key's passphrase protection: the S2K parameters used to derive
/// the protection key, and the resulting encrypted body.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Protection {
    /// The S2K specifier used to derive the protection key.
    pub s2k: S2K,
    /// The symmetric algorithm the material is encrypted with.
    pub sym_algo: crate::types::SymmetricAlgorithm,
    /// The initialization vector.
    pub iv: Box<[u8]>,
    /// CFB-encrypted, serialized secret key material, including its
    /// trailing SHA-1 checksum (usage octet 254, per Section 5.5.3 of
    /// RFC 4880).
    pub ciphertext: Box<[u8]>,
}

/// The state of a key's secret material.
///
/// A key's secret material is always in exactly one of three states:
/// locked (only the encrypted body and S2K parameters are present),
/// unlocked-and-protected (plaintext is present, with the encrypted
/// body and S2K parameters retained alongside it so the key can be
/// locked again without re-deriving anything), or
/// unlocked-and-unprotected (plaintext only, no passphrase has ever
/// been attached). The fourth combination -- locked with no stored
/// protection -- cannot be constructed.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum SecretKeyMaterialState {
    /// Plaintext secret key material that has never been protected by
    /// a passphrase.
    Unprotected(mpi::SecretKeyMaterial),
    /// Plaintext secret key material, with its encrypted form
    /// retained alongside it.
    Unlocked {
        /// The secret key material, in the clear.
        plain: mpi::SecretKeyMaterial,
        /// The retained encrypted form.
        protection: Protection,
    },
    /// Only the encrypted body and S2K parameters; the plaintext has
    /// been zeroised.
    Locked(Protection),
}

impl std::fmt::Debug for SecretKeyMaterialState {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            SecretKeyMaterialState::Unprotected(_) => f.write_str("Unprotected(..)"),
            SecretKeyMaterialState::Unlocked { protection, .. } =>
                write!(f, "Unlocked {{ sym_algo: {:?}, .. }}", protection.sym_algo),
            SecretKeyMaterialState::Locked(p) =>
                write!(f, "Locked {{ sym_algo: {:?}, .. }}", p.sym_algo),
        }
    }
}

/// A version 4 key packet, public or secret, primary or subordinate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key4 {
    pub(crate) common: packet::Common,
    role: KeyRole,
    creation_time: Timestamp,
    pk_algo: PublicKeyAlgorithm,
    mpis: mpi::PublicKey,
    secret: Option<SecretKeyMaterialState>,
}

/// A key, either public or secret, primary or subordinate.
///
/// An alias for [`Key4`]: this crate only emits and fully supports
/// the version 4 packet format. V3 keys are represented the same way
/// after parsing (with `creation_time` filled in and no validity
/// period support, since V3's was removed upstream long before this
/// was written).
pub type Key = Key4;
/// A key carrying no secret material, or whose secret material has
/// not been examined.
pub type PublicKey = Key4;
/// A key that may carry secret material.
pub type SecretKey = Key4;

impl Key4 {
    /// Creates a new key from its creation time, algorithm, and
    /// public key material.
    pub fn new(role: KeyRole, creation_time: Timestamp,
               pk_algo: PublicKeyAlgorithm, mpis: mpi::PublicKey) -> Self {
        Key4 {
            common: Default::default(),
            role,
            creation_time,
            pk_algo,
            mpis,
            secret: None,
        }
    }

    /// Returns whether this is a primary key or a subkey.
    pub fn role(&self) -> KeyRole {
        self.role
    }

    /// Returns the key's creation time.
    pub fn creation_time(&self) -> SystemTime {
        self.creation_time.into()
    }

    /// Overrides the key's creation time.
    ///
    /// Used when generating a certificate so every component --
    /// primary key, subkeys, and their binding signatures -- can
    /// share one caller-chosen creation time instead of each
    /// defaulting to "now" independently.
    pub fn set_creation_time<T: Into<SystemTime>>(&mut self, t: T) -> Result<()> {
        self.creation_time = Timestamp::try_from(t.into())?;
        Ok(())
    }

    /// Returns the key's public-key algorithm.
    pub fn pk_algo(&self) -> PublicKeyAlgorithm {
        self.pk_algo
    }

    /// Returns the key's public key material.
    pub fn mpis(&self) -> &mpi::PublicKey {
        &self.mpis
    }

    /// Returns the key's secret material, if any is present,
    /// regardless of whether it is locked.
    pub fn secret(&self) -> Option<&SecretKeyMaterialState> {
        self.secret.as_ref()
    }

    /// Returns whether the key carries secret material.
    pub fn has_secret(&self) -> bool {
        self.secret.is_some()
    }

    /// Returns whether the key's secret material (if any) is
    /// currently unlocked, i.e. the plaintext is available.
    pub fn is_unlocked(&self) -> bool {
        matches!(self.secret,
                 Some(SecretKeyMaterialState::Unprotected(_)) |
                 Some(SecretKeyMaterialState::Unlocked { .. }))
    }

    /// Returns whether the key's secret material (if any) is
    /// protected by a passphrase, whether or not it is presently
    /// locked.
    pub fn is_protected(&self) -> bool {
        matches!(self.secret,
                 Some(SecretKeyMaterialState::Unlocked { .. }) |
                 Some(SecretKeyMaterialState::Locked(_)))
    }

    /// Returns the key's plaintext secret key material, if it is
    /// currently available.
    pub(crate) fn plaintext(&self) -> Result<&mpi::SecretKeyMaterial> {
        match &self.secret {
            Some(SecretKeyMaterialState::Unprotected(s)) => Ok(s),
            Some(SecretKeyMaterialState::Unlocked { plain, .. }) => Ok(plain),
            Some(SecretKeyMaterialState::Locked(_)) =>
                Err(Error::InvalidOperation("key is locked".into()).into()),
            None => Err(Error::InvalidOperation("key has no secret material".into()).into()),
        }
    }

    /// Attaches secret key material to this key, in the clear and
    /// unprotected.
    pub fn with_secret(mut self, secret: mpi::SecretKeyMaterial) -> Self {
        self.secret = Some(SecretKeyMaterialState::Unprotected(secret));
        self
    }

    /// Attaches still-encrypted secret key material to this key, as
    /// parsed off the wire (usage octet 254).
    pub(crate) fn with_secret_encrypted(mut self, s2k: S2K,
                                         sym_algo: crate::types::SymmetricAlgorithm,
                                         iv: Box<[u8]>, ciphertext: Box<[u8]>) -> Self {
        self.secret = Some(SecretKeyMaterialState::Locked(Protection {
            s2k, sym_algo, iv, ciphertext,
        }));
        self
    }

    /// Returns the serialized public key packet body, as hashed into
    /// the fingerprint and into signatures over this key (Section
    /// 5.2.4 and 12.2 of RFC 4880: the four-octet length-prefixed
    /// body of the public key packet, independent of the actual
    /// packet framing used on the wire).
    pub fn hash_body(&self) -> Vec<u8> {
        self.fingerprint_body()
    }

    fn mpis_as_slice(&self) -> Vec<&MPI> {
        match &self.mpis {
            mpi::PublicKey::RSA { e, n } => vec![n, e],
            mpi::PublicKey::DSA { p, q, g, y } => vec![p, q, g, y],
            mpi::PublicKey::ElGamal { p, g, y } => vec![p, g, y],
            mpi::PublicKey::EdDSA { q, .. } => vec![q],
            mpi::PublicKey::ECDSA { q, .. } => vec![q],
            mpi::PublicKey::ECDH { q, .. } => vec![q],
            mpi::PublicKey::Unknown { mpis, .. } => mpis.iter().collect(),
        }
    }

    /// Returns the fingerprint of this key, computed as the SHA-1
    /// hash of the public key packet body per Section 12.2 of RFC
    /// 4880, with the curve's OID folded in ahead of its public
    /// point for EdDSA/ECDSA/ECDH keys.
    pub fn fingerprint(&self) -> Fingerprint {
        let mut ctx = crate::types::HashAlgorithm::SHA1.context()
            .expect("SHA-1 is always supported");
        let body = self.fingerprint_body();
        ctx.update([0x99]);
        ctx.update((body.len() as u16).to_be_bytes());
        ctx.update(&body);
        Fingerprint::from_bytes(&ctx.digest())
    }

    fn fingerprint_body(&self) -> Vec<u8> {
        let mut body = Vec::new();
        body.push(4);
        body.extend_from_slice(&self.creation_time.as_u32().to_be_bytes());
        body.push(self.pk_algo.octet());
        match &self.mpis {
            mpi::PublicKey::EdDSA { curve, q } | mpi::PublicKey::ECDSA { curve, q } => {
                let oid = curve.oid();
                body.push(oid.len() as u8);
                body.extend_from_slice(oid);
                body.extend_from_slice(&(q.bits() as u16).to_be_bytes());
                body.extend_from_slice(q.value());
            }
            mpi::PublicKey::ECDH { curve, q, hash, sym } => {
                let oid = curve.oid();
                body.push(oid.len() as u8);
                body.extend_from_slice(oid);
                body.extend_from_slice(&(q.bits() as u16).to_be_bytes());
                body.extend_from_slice(q.value());
                body.extend_from_slice(&[3, 1, hash.octet(), sym.octet()]);
            }
            _ => {
                for mpi in self.mpis_as_slice() {
                    body.extend_from_slice(&(mpi.bits() as u16).to_be_bytes());
                    body.extend_from_slice(mpi.value());
                }
            }
        }
        body
    }

    /// Returns the Key ID of this key (the low 8 octets of its
    /// fingerprint).
    pub fn keyid(&self) -> KeyID {
        self.fingerprint().to_keyid()
    }

    /// Returns this key's grip.
    ///
    /// The grip is a 20-octet SHA-1 hash of a canonical S-expression
    /// over the algorithm-specific public parameters only -- no
    /// version octet, no creation time, no packet framing. Two
    /// representations of the same key material (a freshly generated
    /// public/secret pair, or the same key re-emitted by a different
    /// implementation) always agree on the grip even when their
    /// fingerprints would not yet be comparable, which is why the key
    /// store indexes by grip rather than by fingerprint.
    pub fn grip(&self) -> [u8; 20] {
        let mut buf = Vec::new();
        self.grip_sexp().serialize(&mut buf);
        let mut ctx = crate::types::HashAlgorithm::SHA1.context()
            .expect("SHA-1 is always supported");
        ctx.update(&buf);
        let digest = ctx.digest();
        let mut out = [0u8; 20];
        out.copy_from_slice(&digest);
        out
    }

    fn grip_sexp(&self) -> crate::crypto::sexp::Sexp {
        use crate::crypto::sexp::Sexp;
        let s = |v: &[u8]| Sexp::String(v.into());
        let param = |name: &str, v: &MPI| {
            Sexp::List(vec![s(name.as_bytes()), s(v.value())])
        };

        let (algo, params) = match &self.mpis {
            mpi::PublicKey::RSA { e, n } =>
                ("rsa", vec![param("n", n), param("e", e)]),
            mpi::PublicKey::DSA { p, q, g, y } =>
                ("dsa", vec![param("p", p), param("q", q),
                             param("g", g), param("y", y)]),
            mpi::PublicKey::ElGamal { p, g, y } =>
                ("elg", vec![param("p", p), param("g", g), param("y", y)]),
            mpi::PublicKey::EdDSA { curve, q } =>
                ("eddsa", vec![
                    Sexp::List(vec![s(b"curve"), s(curve.oid())]),
                    param("q", q),
                ]),
            mpi::PublicKey::ECDSA { curve, q } =>
                ("ecdsa", vec![
                    Sexp::List(vec![s(b"curve"), s(curve.oid())]),
                    param("q", q),
                ]),
            mpi::PublicKey::ECDH { curve, q, .. } =>
                ("ecdh", vec![
                    Sexp::List(vec![s(b"curve"), s(curve.oid())]),
                    param("q", q),
                ]),
            mpi::PublicKey::Unknown { mpis, rest } => {
                let mut params: Vec<Sexp> = mpis.iter().enumerate()
                    .map(|(i, m)| param(&format!("m{}", i), m))
                    .collect();
                params.push(s(rest));
                ("unknown", params)
            }
        };

        Sexp::List(vec![
            s(b"public-key"),
            Sexp::List(std::iter::once(s(algo.as_bytes()))
                       .chain(params).collect()),
        ])
    }

    /// Generates a fresh RSA key of the given bit size.
    ///
    /// The key is generated as a primary key; callers that need a
    /// subkey use [`Key4::subordinate`] to retag it.
    pub fn generate_rsa(bits: usize) -> Result<Key4> {
        let sk = RsaPrivateKey::new(&mut OsRng, bits)
            .map_err(|e| Error::KeyGenerationFailure(e.to_string()))?;
        let public = mpi::PublicKey::RSA {
            e: MPI::new(&sk.e().to_bytes_be()),
            n: MPI::new(&sk.n().to_bytes_be()),
        };
        let secret = mpi::SecretKeyMaterial::RSA {
            d: MPI::new(&sk.d().to_bytes_be()).into(),
            p: MPI::new(&sk.primes()[0].to_bytes_be()).into(),
            q: MPI::new(&sk.primes()[1].to_bytes_be()).into(),
            u: MPI::new(&[0]).into(),
        };
        Ok(Key4::new(KeyRole::Primary, Timestamp::now(), PublicKeyAlgorithm::RSAEncryptSign, public)
            .with_secret(secret))
    }

    /// Generates a fresh elliptic curve key, as a primary key.
    ///
    /// `for_signing` selects EdDSA/ECDSA for the NIST and Ed25519
    /// curves and ECDH for Cv25519; Cv25519 can only be used for
    /// encryption and NIST curves can be used for either, matching
    /// what a real OpenPGP implementation would generate. Callers
    /// that need a subkey use [`Key4::subordinate`] to retag it.
    pub fn generate_ecc(for_signing: bool, curve: Curve) -> Result<Key4> {
        let role = KeyRole::Primary;
        match curve {
            Curve::Ed25519 => {
                if !for_signing {
                    return Err(Error::InvalidArgument(
                        "Ed25519 only supports signing".into()).into());
                }
                let sk = ed25519_dalek::SigningKey::generate(&mut OsRng);
                let vk = sk.verifying_key();
                let public = mpi::PublicKey::EdDSA {
                    curve: Curve::Ed25519,
                    q: MPI::new_compressed_point(vk.as_bytes()),
                };
                let secret = mpi::SecretKeyMaterial::EdDSA {
                    scalar: MPI::new(sk.as_bytes()).into(),
                };
                Ok(Key4::new(role, Timestamp::now(), PublicKeyAlgorithm::EdDSA, public)
                    .with_secret(secret))
            }
            Curve::Cv25519 => {
                if for_signing {
                    return Err(Error::InvalidArgument(
                        "Curve25519 only supports ECDH".into()).into());
                }
                let sk = x25519_dalek::StaticSecret::random_from_rng(OsRng);
                let pk = x25519_dalek::PublicKey::from(&sk);
                let public = mpi::PublicKey::ECDH {
                    curve: Curve::Cv25519,
                    q: MPI::new_compressed_point(pk.as_bytes()),
                    hash: crate::types::HashAlgorithm::SHA256,
                    sym: crate::types::SymmetricAlgorithm::AES128,
                };
                let secret = mpi::SecretKeyMaterial::ECDH {
                    scalar: MPI::new(sk.to_bytes().as_slice()).into(),
                };
                Ok(Key4::new(role, Timestamp::now(), PublicKeyAlgorithm::ECDH, public)
                    .with_secret(secret))
            }
            Curve::NistP256 | Curve::NistP384 | Curve::NistP521 => {
                generate_nist_ecc(role, for_signing, curve)
            }
            other => Err(Error::UnsupportedEllipticCurve(other).into()),
        }
    }

    /// Retags this key as a certificate subkey.
    pub fn subordinate(mut self) -> Self {
        self.role = KeyRole::Subordinate;
        self
    }

    /// Zeroises the key's secret key material in place, retaining the
    /// encrypted body and S2K parameters already attached to the key.
    ///
    /// The key must already carry a stored protection (i.e. have
    /// previously been [`Key4::protect`]ed, or been read off the wire
    /// with usage octet 254) -- otherwise there is nothing to retain
    /// and the plaintext would simply be lost. Use [`Key4::protect`]
    /// first if the key has no stored protection yet.
    pub fn lock(&mut self) -> Result<()> {
        match self.secret.take() {
            Some(SecretKeyMaterialState::Unlocked { protection, .. }) => {
                self.secret = Some(SecretKeyMaterialState::Locked(protection));
                Ok(())
            }
            other @ (Some(SecretKeyMaterialState::Locked(_)) |
                     Some(SecretKeyMaterialState::Unprotected(_))) => {
                let err = match &other {
                    Some(SecretKeyMaterialState::Locked(_)) =>
                        Error::InvalidOperation("key is already locked".into()),
                    _ => Error::InvalidOperation(
                        "key has no stored protection to lock with".into()),
                };
                self.secret = other;
                Err(err.into())
            }
            None => Err(Error::InvalidOperation("key has no secret material".into()).into()),
        }
    }

    /// Unlocks the key's secret material with a passphrase, retaining
    /// the encrypted body and S2K parameters so the key can be
    /// [`Key4::lock`]ed again without re-deriving anything.
    ///
    /// Fails with [`Error::BadPassword`] if the derived key does not
    /// reproduce the stored checksum.
    pub fn unlock(&mut self, password: &[u8]) -> Result<()> {
        let protection = match self.secret.take() {
            Some(SecretKeyMaterialState::Locked(p)) => p,
            other @ Some(SecretKeyMaterialState::Unlocked { .. }) => {
                self.secret = other;
                return Err(Error::InvalidOperation("key is already unlocked".into()).into());
            }
            other @ Some(SecretKeyMaterialState::Unprotected(_)) => {
                self.secret = other;
                return Err(Error::InvalidOperation(
                    "key has no protection to unlock".into()).into());
            }
            None => return Err(Error::InvalidOperation("key has no secret material".into()).into()),
        };

        let plain = decrypt_and_verify(self.pk_algo, &protection, password)?;
        self.secret = Some(SecretKeyMaterialState::Unlocked { plain, protection });
        Ok(())
    }

    /// Protects the key's secret material with `password`, deriving
    /// the protection key via `s2k` and CFB-encrypting the serialized
    /// secret material plus a trailing SHA-1 checksum (usage octet
    /// 254, per Section 5.5.3 of RFC 4880).
    ///
    /// Requires the plaintext to be present, either because the key
    /// was never protected or because it is currently unlocked. Any
    /// previously stored protection is discarded. Leaves the key
    /// locked, with the freshly computed protection in place.
    pub fn protect(&mut self, password: &[u8], s2k: S2K,
                    sym_algo: crate::types::SymmetricAlgorithm) -> Result<()> {
        let plain = self.plaintext()?.clone();
        let protection = encrypt_secret(&plain, password, s2k, sym_algo)?;
        self.secret = Some(SecretKeyMaterialState::Locked(protection));
        Ok(())
    }

    /// Unlocks the key with `password`, then discards the stored S2K
    /// parameters and ciphertext, leaving only the plaintext.
    pub fn unprotect(&mut self, password: &[u8]) -> Result<()> {
        let plain = match self.secret.take() {
            Some(SecretKeyMaterialState::Locked(protection)) =>
                decrypt_and_verify(self.pk_algo, &protection, password)?,
            Some(SecretKeyMaterialState::Unlocked { plain, protection }) => {
                // Confirm the passphrase against the stored
                // protection before discarding it.
                decrypt_and_verify(self.pk_algo, &protection, password)?;
                plain
            }
            other @ Some(SecretKeyMaterialState::Unprotected(_)) => {
                self.secret = other;
                return Err(Error::InvalidOperation(
                    "key is already unprotected".into()).into());
            }
            None => return Err(Error::InvalidOperation("key has no secret material".into()).into()),
        };
        self.secret = Some(SecretKeyMaterialState::Unprotected(plain));
        Ok(())
    }

    /// Converts this key into a key pair suitable for signing,
    /// consuming the public material along with the (necessarily
    /// unlocked) secret material.
    pub fn into_keypair(self) -> Result<KeyPair> {
        let secret = self.plaintext()?.clone();
        Ok(KeyPair { public: self, secret })
    }

    /// Writes the public key packet body, per [Section 5.5.2 of RFC
    /// 4880].
    ///
    /// [Section 5.5.2 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.5.2
    pub(crate) fn serialize_public_body(&self, sink: &mut dyn io::Write) -> Result<()> {
        sink.write_all(&self.fingerprint_body())?;
        Ok(())
    }

    /// Writes the secret key packet body, per [Section 5.5.3 of RFC
    /// 4880].
    ///
    /// [Section 5.5.3 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.5.3
    pub(crate) fn serialize_secret_body(&self, sink: &mut dyn io::Write) -> Result<()> {
        sink.write_all(&self.fingerprint_body())?;
        match &self.secret {
            None => return Err(Error::InvalidOperation(
                "key has no secret material".into()).into()),
            Some(SecretKeyMaterialState::Unprotected(s)) => {
                sink.write_all(&[0])?;
                let mpis = serialize_secret_mpis(s);
                sink.write_all(&mpis)?;
                let checksum = mpis.iter()
                    .fold(0u16, |acc, &b| acc.wrapping_add(b as u16));
                sink.write_all(&checksum.to_be_bytes())?;
            }
            // Whether or not the plaintext happens to be unlocked in
            // memory, a retained protection is always serialized --
            // never the plaintext -- so writing a cert back out never
            // silently drops passphrase protection.
            Some(SecretKeyMaterialState::Unlocked { protection, .. }) |
            Some(SecretKeyMaterialState::Locked(protection)) => {
                sink.write_all(&[254, protection.sym_algo.octet()])?;
                protection.s2k.serialize(sink)?;
                sink.write_all(&protection.iv)?;
                sink.write_all(&protection.ciphertext)?;
            }
        }
        Ok(())
    }
}

/// Encrypts `plain` under `password`, producing a fresh [`Protection`].
fn encrypt_secret(plain: &mpi::SecretKeyMaterial, password: &[u8], s2k: S2K,
                   sym_algo: crate::types::SymmetricAlgorithm) -> Result<Protection> {
    let mut body = serialize_secret_mpis(plain);
    let mut digest = sha1(&body);
    body.append(&mut digest);

    let key_size = sym_algo.key_size()
        .ok_or(Error::UnsupportedSymmetricAlgorithm(sym_algo))?;
    let key = s2k.derive_key(password, key_size)?;
    let bs = sym_algo.block_size().ok_or(Error::UnsupportedSymmetricAlgorithm(sym_algo))?;
    let mut iv = vec![0u8; bs];
    use rand::RngCore;
    OsRng.fill_bytes(&mut iv);

    symmetric::cfb_encrypt(sym_algo, &key, &iv, &mut body)?;

    Ok(Protection {
        s2k,
        sym_algo,
        iv: iv.into_boxed_slice(),
        ciphertext: body.into_boxed_slice(),
    })
}

/// Decrypts `protection` with `password`, verifying the trailing
/// checksum before returning the plaintext secret key material.
fn decrypt_and_verify(pk_algo: PublicKeyAlgorithm, protection: &Protection, password: &[u8])
    -> Result<mpi::SecretKeyMaterial>
{
    let key_size = protection.sym_algo.key_size()
        .ok_or(Error::UnsupportedSymmetricAlgorithm(protection.sym_algo))?;
    let key = protection.s2k.derive_key(password, key_size)?;

    let mut plain = protection.ciphertext.to_vec();
    symmetric::cfb_decrypt(protection.sym_algo, &key, &protection.iv, &mut plain)?;

    if plain.len() < 20 {
        return Err(Error::BadPassword.into());
    }
    let (body, checksum) = plain.split_at(plain.len() - 20);
    let want = sha1(body);
    if crate::crypto::mem::secure_cmp(&want, checksum) != std::cmp::Ordering::Equal {
        return Err(Error::BadPassword.into());
    }

    parse_secret_mpis(pk_algo, body)
}

fn generate_nist_ecc(role: KeyRole, for_signing: bool, curve: Curve) -> Result<Key4> {
    macro_rules! with_curve {
        ($curve:ty, $hash:expr) => {{
            let sk = ecdsa::SigningKey::<$curve>::random(&mut OsRng);
            let vk = sk.verifying_key();
            let point = vk.to_encoded_point(false);
            let (x, y) = (point.x().unwrap(), point.y().unwrap());
            let field_bits = curve.bits().unwrap();
            let scalar = sk.to_bytes().to_vec();
            if for_signing {
                let public = mpi::PublicKey::ECDSA {
                    curve: curve.clone(),
                    q: MPI::new_point(x, y, field_bits),
                };
                let secret = mpi::SecretKeyMaterial::ECDSA { scalar: MPI::new(&scalar).into() };
                Ok(Key4::new(role, Timestamp::now(), PublicKeyAlgorithm::ECDSA, public)
                    .with_secret(secret))
            } else {
                let public = mpi::PublicKey::ECDH {
                    curve: curve.clone(),
                    q: MPI::new_point(x, y, field_bits),
                    hash: $hash,
                    sym: crate::types::SymmetricAlgorithm::AES256,
                };
                let secret = mpi::SecretKeyMaterial::ECDH { scalar: MPI::new(&scalar).into() };
                Ok(Key4::new(role, Timestamp::now(), PublicKeyAlgorithm::ECDH, public)
                    .with_secret(secret))
            }
        }};
    }
    use crate::types::HashAlgorithm;
    match curve {
        Curve::NistP256 => with_curve!(p256::NistP256, HashAlgorithm::SHA256),
        Curve::NistP384 => with_curve!(p384::NistP384, HashAlgorithm::SHA384),
        Curve::NistP521 => with_curve!(p521::NistP521, HashAlgorithm::SHA512),
        other => Err(Error::UnsupportedEllipticCurve(other).into()),
    }
}

fn sha1(data: &[u8]) -> Vec<u8> {
    let mut ctx = crate::types::HashAlgorithm::SHA1.context()
        .expect("SHA-1 is always supported");
    ctx.update(data);
    ctx.digest()
}

impl hash::Hash for Key4 {
    fn hash(&self, ctx: &mut hash::Context) {
        let body = self.fingerprint_body();
        ctx.update([0x99]);
        ctx.update((body.len() as u16).to_be_bytes());
        ctx.update(&body);
    }
}

fn serialize_secret_mpis(secret: &mpi::SecretKeyMaterial) -> Vec<u8> {
    let mut out = Vec::new();
    let mut push = |mpi: &MPI| {
        out.extend_from_slice(&(mpi.bits() as u16).to_be_bytes());
        out.extend_from_slice(mpi.value());
    };
    match secret {
        mpi::SecretKeyMaterial::RSA { d, p, q, u } => {
            push(&MPI::new(d.value())); push(&MPI::new(p.value()));
            push(&MPI::new(q.value())); push(&MPI::new(u.value()));
        }
        mpi::SecretKeyMaterial::DSA { x } | mpi::SecretKeyMaterial::ElGamal { x } =>
            push(&MPI::new(x.value())),
        mpi::SecretKeyMaterial::EdDSA { scalar }
        | mpi::SecretKeyMaterial::ECDSA { scalar }
        | mpi::SecretKeyMaterial::ECDH { scalar } => push(&MPI::new(scalar.value())),
        mpi::SecretKeyMaterial::Unknown { mpis, rest } => {
            for m in mpis.iter() { push(&MPI::new(m.value())); }
            out.extend_from_slice(rest);
        }
    }
    out
}

pub(crate) fn parse_secret_mpis(pk_algo: PublicKeyAlgorithm, body: &[u8]) -> Result<mpi::SecretKeyMaterial> {
    let mut cur = body;
    let mut read_mpi = |cur: &mut &[u8]| -> Result<MPI> {
        if cur.len() < 2 {
            return Err(Error::MalformedMPI("truncated MPI length".into()).into());
        }
        let bits = u16::from_be_bytes([cur[0], cur[1]]) as usize;
        let bytes = (bits + 7) / 8;
        *cur = &cur[2..];
        if cur.len() < bytes {
            return Err(Error::MalformedMPI("truncated MPI value".into()).into());
        }
        let (value, rest) = cur.split_at(bytes);
        *cur = rest;
        Ok(MPI::new(value))
    };

    Ok(match pk_algo {
        PublicKeyAlgorithm::RSAEncryptSign | PublicKeyAlgorithm::RSAEncrypt
        | PublicKeyAlgorithm::RSASign => {
            let d = read_mpi(&mut cur)?;
            let p = read_mpi(&mut cur)?;
            let q = read_mpi(&mut cur)?;
            let u = read_mpi(&mut cur)?;
            mpi::SecretKeyMaterial::RSA {
                d: d.into(), p: p.into(), q: q.into(), u: u.into(),
            }
        }
        PublicKeyAlgorithm::DSA =>
            mpi::SecretKeyMaterial::DSA { x: read_mpi(&mut cur)?.into() },
        PublicKeyAlgorithm::ElGamalEncrypt | PublicKeyAlgorithm::ElGamalEncryptSign =>
            mpi::SecretKeyMaterial::ElGamal { x: read_mpi(&mut cur)?.into() },
        PublicKeyAlgorithm::EdDSA =>
            mpi::SecretKeyMaterial::EdDSA { scalar: read_mpi(&mut cur)?.into() },
        PublicKeyAlgorithm::ECDSA =>
            mpi::SecretKeyMaterial::ECDSA { scalar: read_mpi(&mut cur)?.into() },
        PublicKeyAlgorithm::ECDH =>
            mpi::SecretKeyMaterial::ECDH { scalar: read_mpi(&mut cur)?.into() },
        other => return Err(Error::UnsupportedPublicKeyAlgorithm(other).into()),
    })
}

/// A key with its secret material unlocked, ready to sign or decrypt.
#[derive(Clone)]
pub struct KeyPair {
    public: Key4,
    secret: mpi::SecretKeyMaterial,
}

impl KeyPair {
    /// Returns the public half of this key pair.
    pub fn public(&self) -> &Key4 {
        &self.public
    }

    /// Returns this key pair's Key ID.
    pub fn keyid(&self) -> KeyID {
        self.public.keyid()
    }

    /// Returns this key pair's fingerprint.
    pub fn fingerprint(&self) -> Fingerprint {
        self.public.fingerprint()
    }

    /// Signs a pre-computed hash digest with this key pair's secret
    /// material.
    pub fn sign_hash(&self, hash_algo: crate::types::HashAlgorithm,
                      digest: &[u8]) -> Result<mpi::Signature> {
        sign::sign(&self.secret, &self.public.mpis, hash_algo, digest)
    }
}

impl From<Key4> for Packet {
    fn from(k: Key4) -> Self {
        match k.role {
            KeyRole::Primary =>
                if k.has_secret() { Packet::SecretKey(k) } else { Packet::PublicKey(k) },
            KeyRole::Subordinate =>
                if k.has_secret() { Packet::SecretSubkey(k) } else { Packet::PublicSubkey(k) },
        }
    }
}
