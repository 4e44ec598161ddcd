//! Pipeline orchestration: the Sign, Verify, Encrypt, and Decrypt
//! message flows that glue the packet, cert, and crypto layers
//! together into the operations a caller actually wants to perform.
//!
//! A [`Context`] holds a certificate store, a [`Policy`], and
//! optional [`KeyProvider`]/[`PasswordProvider`] callbacks the
//! pipelines consult whenever they need secret material they don't
//! already have in hand -- unlocking a protected secret key, or
//! deriving a key from a passphrase.

use rand::RngCore;

use crate::cert::Cert;
use crate::crypto::mem::Protected;
use crate::crypto::session_key::{self, SessionKey};
use crate::crypto::symmetric;
use crate::fingerprint::Fingerprint;
use crate::keyid::KeyID;
use crate::packet::key::Key4;
use crate::packet::signature::{Signature, SignatureBuilder};
use crate::packet::{CompressedData, Literal, OnePassSig, Packet, Tag, PKESK, SEIP1, SKESK};
use crate::policy::{Policy, StandardPolicy};
use crate::serialize::{Marshal, MarshalInto};
use crate::types::{
    Curve, DataFormat, HashAlgorithm, PublicKeyAlgorithm, SignatureType, SymmetricAlgorithm,
};
use crate::{Error, PacketPile, Result};

/// The reason a [`KeyProvider`] or [`PasswordProvider`] is being
/// consulted, passed through so a caller's UI can explain itself
/// ("enter the password to decrypt this message" vs. "... to sign
/// this message").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Unwrapping a PK-ESK packet requires the recipient's secret key.
    DecryptPk,
    /// Unwrapping an SK-ESK packet requires a passphrase.
    DecryptSymmetric,
    /// A protected secret key must be unlocked before it can be used.
    Unlock,
    /// An unprotected secret key is being encrypted under a new
    /// passphrase.
    Protect,
    /// A protected secret key is being decrypted to expose the raw
    /// secret material.
    Unprotect,
    /// A signature is about to be produced.
    Sign,
    /// A new User ID is about to be bound to a certificate.
    AddUserid,
    /// A new subkey is about to be bound to a certificate.
    AddSubkey,
}

/// How a key is identified in a lookup request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierType {
    /// A User ID string, e.g. `"Alice <alice@example.org>"`.
    UserID,
    /// A 64-bit Key ID, formatted as 16 hex digits.
    KeyID,
    /// A fingerprint, formatted as 40 (v4) or 64 (v5) hex digits.
    Fingerprint,
    /// A gpg-agent "keygrip", formatted as 40 hex digits.
    Grip,
}

/// A caller-supplied source of secret certificates.
///
/// Implementations typically wrap a `private-keys-v1.d/` directory,
/// a smartcard, or an in-memory cache; [`Context`] calls this
/// whenever a pipeline needs a secret key it doesn't already hold.
pub trait KeyProvider {
    /// Looks up the certificate carrying the secret key identified by
    /// `identifier` (interpreted according to `kind`), for the given
    /// `operation`.
    fn provide_key(&self, operation: Operation, identifier: &str, kind: IdentifierType) -> Option<Cert>;
}

/// A caller-supplied source of passphrases.
pub trait PasswordProvider {
    /// Returns the passphrase to use for `operation` on the entity
    /// named by `identifier`, or `None` to decline (the pipeline then
    /// tries the next recipient/candidate, if any).
    fn provide_password(&self, operation: Operation, identifier: &str) -> Option<Protected>;
}

/// A password recipient for [`Context::encrypt`], carrying its own
/// S2K parameters and wrap cipher independent of both the other
/// recipients and the message's data cipher.
#[derive(Clone, Copy)]
pub struct PasswordRecipient<'a> {
    password: &'a [u8],
    hash: HashAlgorithm,
    iterations: u32,
    cipher: SymmetricAlgorithm,
}

impl<'a> PasswordRecipient<'a> {
    /// A password recipient using the default S2K hash (SHA-256),
    /// the default iteration count, and AES-256 to wrap the session
    /// key.
    pub fn new(password: &'a [u8]) -> Self {
        PasswordRecipient {
            password,
            hash: HashAlgorithm::SHA256,
            iterations: crate::crypto::s2k::S2K::DEFAULT_ITERATIONS,
            cipher: SymmetricAlgorithm::AES256,
        }
    }

    /// Overrides the S2K hash algorithm.
    pub fn with_hash(mut self, hash: HashAlgorithm) -> Self {
        self.hash = hash;
        self
    }

    /// Overrides the requested S2K iteration count. The stored
    /// iteration-count byte is re-quantised to the nearest
    /// representable value; see [`crate::crypto::s2k::S2K`].
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    /// Overrides the cipher used to wrap the session key for this
    /// password. Independent of the message's data cipher.
    pub fn with_cipher(mut self, cipher: SymmetricAlgorithm) -> Self {
        self.cipher = cipher;
        self
    }
}

/// The encryption-capable subkey chosen for a recipient, together
/// with the algorithm-specific parameters needed to wrap a session
/// key for it.
struct EncryptionTarget<'a> {
    key: &'a Key4,
    fingerprint: Fingerprint,
}

/// Picks the newest live subkey with transport- or
/// storage-encryption capability from `cert`, preferring RSA and
/// ECDH (Curve25519) since those are the only recipient algorithms
/// this crate's [`session_key`] module currently wraps for.
fn encryption_subkey(cert: &Cert) -> Result<EncryptionTarget<'_>> {
    let mut best: Option<(&Key4, std::time::SystemTime)> = None;
    for sk in cert.subkeys() {
        let Some(sig) = sk.binding_signature() else { continue };
        let Some(flags) = sig.hashed_area().key_flags() else { continue };
        if !flags.for_transport_encryption() && !flags.for_storage_encryption() {
            continue;
        }
        let key = sk.key();
        match key.pk_algo() {
            PublicKeyAlgorithm::RSAEncryptSign | PublicKeyAlgorithm::RSAEncrypt => {}
            PublicKeyAlgorithm::ECDH => {}
            _ => continue,
        }
        let creation = key.creation_time();
        if best.map(|(_, t)| creation > t).unwrap_or(true) {
            best = Some((key, creation));
        }
    }
    let (key, _) = best.ok_or(Error::NoSuitableKey)?;
    Ok(EncryptionTarget { key, fingerprint: key.fingerprint() })
}

/// Wraps `session_key` for one recipient certificate, producing its
/// PK-ESK packet.
fn wrap_for_recipient(cert: &Cert, sym_algo: SymmetricAlgorithm, session_key: &[u8]) -> Result<PKESK> {
    let target = encryption_subkey(cert)?;
    match target.key.mpis() {
        crate::crypto::mpi::PublicKey::RSA { .. } => {
            let public = session_key::rsa_public_key(target.key.mpis())?;
            let esk = session_key::rsa_wrap(&public, sym_algo, session_key)?;
            Ok(PKESK::new(target.key.keyid(), PublicKeyAlgorithm::RSAEncryptSign, esk))
        }
        crate::crypto::mpi::PublicKey::ECDH { curve, q, hash, sym } => {
            if *curve != Curve::Cv25519 {
                return Err(Error::UnsupportedEllipticCurve(curve.clone()).into());
            }
            let (ephemeral, wrapped) = session_key::ecdh_curve25519_wrap(
                q.value(),
                target.fingerprint.as_bytes(),
                curve,
                *hash,
                *sym,
                session_key,
            )?;
            let esk = crate::crypto::mpi::Ciphertext::ECDH {
                e: ephemeral,
                key: wrapped.into_boxed_slice(),
            };
            Ok(PKESK::new(target.key.keyid(), PublicKeyAlgorithm::ECDH, esk))
        }
        _ => Err(Error::UnsupportedPublicKeyAlgorithm(target.key.pk_algo()).into()),
    }
}

/// Attempts to recover the session key from one PK-ESK packet, given
/// the matching unlocked secret key.
fn unwrap_pkesk(pkesk: &PKESK, key: &Key4) -> Result<SessionKey> {
    let secret = match key.plaintext() {
        Ok(s) => s,
        Err(_) => return Err(Error::InvalidOperation("recipient key is locked".into()).into()),
    };
    match (key.mpis(), secret, pkesk.esk()) {
        (crate::crypto::mpi::PublicKey::RSA { .. }, _, ct) => {
            let private = session_key::rsa_private_key(key.mpis(), secret)?;
            session_key::rsa_unwrap(&private, ct)
        }
        (
            crate::crypto::mpi::PublicKey::ECDH { curve, hash, sym, .. },
            crate::crypto::mpi::SecretKeyMaterial::ECDH { scalar },
            crate::crypto::mpi::Ciphertext::ECDH { e, key: wrapped },
        ) => {
            if *curve != Curve::Cv25519 {
                return Err(Error::UnsupportedEllipticCurve(curve.clone()).into());
            }
            session_key::ecdh_curve25519_unwrap(
                e.value(),
                wrapped,
                scalar.value(),
                key.fingerprint().as_bytes(),
                curve,
                *hash,
                *sym,
            )
        }
        _ => Err(Error::UnsupportedPublicKeyAlgorithm(key.pk_algo()).into()),
    }
}

/// A pipeline orchestrator: holds the certificates, policy, and
/// provider callbacks shared across a sequence of sign/verify/
/// encrypt/decrypt operations.
pub struct Context {
    certs: Vec<Cert>,
    policy: Box<dyn Policy>,
    key_provider: Option<Box<dyn KeyProvider>>,
    password_provider: Option<Box<dyn PasswordProvider>>,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    /// Creates a context with the standard policy and no providers.
    pub fn new() -> Self {
        Context {
            certs: Vec::new(),
            policy: Box::new(StandardPolicy::new()),
            key_provider: None,
            password_provider: None,
        }
    }

    /// Replaces the policy used to evaluate signatures, keys, and
    /// packets.
    pub fn set_policy(&mut self, policy: Box<dyn Policy>) {
        self.policy = policy;
    }

    /// Installs a key provider, consulted when a pipeline needs
    /// secret material not already present in the context's store.
    pub fn set_key_provider(&mut self, provider: Box<dyn KeyProvider>) {
        self.key_provider = Some(provider);
    }

    /// Installs a password provider, consulted for passphrase-based
    /// decryption and key unlocking.
    pub fn set_password_provider(&mut self, provider: Box<dyn PasswordProvider>) {
        self.password_provider = Some(provider);
    }

    /// Adds certificates to the context's in-memory store.
    pub fn add_certs<I: IntoIterator<Item = Cert>>(&mut self, certs: I) {
        self.certs.extend(certs);
    }

    /// Returns the certificates currently held by the context.
    pub fn certs(&self) -> &[Cert] {
        &self.certs
    }

    /// Locates a certificate in the context's store by Key ID.
    pub fn locate_by_keyid(&self, id: &KeyID) -> Option<&Cert> {
        self.certs.iter().find(|c| c.key_by_keyid(id).is_some())
    }

    /// Locates a certificate in the context's store by fingerprint.
    pub fn locate_by_fingerprint(&self, fp: &Fingerprint) -> Option<&Cert> {
        self.certs.iter().find(|c| c.key_by_fingerprint(fp).is_some())
    }

    /// Locates certificates in the context's store carrying a
    /// matching User ID.
    pub fn locate_by_userid(&self, userid: &[u8]) -> Vec<&Cert> {
        self.certs
            .iter()
            .filter(|c| c.userids().iter().any(|u| u.value() == userid))
            .collect()
    }

    /// Iterates over every key identifier (fingerprints of the
    /// primary and every subkey) known to the context, per the
    /// abstract library surface's key-iteration operation.
    pub fn iterate_identifiers(&self) -> impl Iterator<Item = Fingerprint> + '_ {
        self.certs.iter().flat_map(|c| c.keys().map(|k| k.fingerprint()))
    }

    /// Produces a detached signature over `data` using `signer`'s
    /// primary key (or, for a subkey-only signer, whatever secret
    /// material `into_keypair` can extract).
    pub fn sign_detached(&self, signer: &Cert, signing_key: &Key4, data: &[u8]) -> Result<Signature> {
        let hash_algo = HashAlgorithm::SHA512;
        let mut ctx = hash_algo.context()?;
        ctx.update(data);

        let mut keypair = signing_key.clone().into_keypair()?;
        let builder = SignatureBuilder::new(SignatureType::Binary)
            .set_hash_algo(hash_algo);
        let builder = stamp_issuer(builder, signer, signing_key);
        builder.sign_hash(&mut keypair, ctx)
    }

    /// Verifies a detached `signature` over `data` against the
    /// issuer's certificate, applying the context's policy.
    pub fn verify_detached(&self, signature: &Signature, data: &[u8]) -> Result<()> {
        let cert = self.resolve_signer(signature)?;
        let key = signer_key(&cert, signature)?;
        self.policy.key(key)?;
        self.policy.signature(signature)?;
        check_signature_liveness(signature)?;

        let hash_algo = signature.hash_algo();
        let mut ctx = hash_algo.context()?;
        ctx.update(data);
        signature.verify(key, ctx)
    }

    /// Builds an inline signed message: one-pass-signature header(s),
    /// the literal data, then the signature(s) in reverse order, per
    /// Section 5.4 of RFC 4880.
    pub fn sign_inline(
        &self,
        signers: &[(&Cert, &Key4)],
        data: &[u8],
        format: DataFormat,
    ) -> Result<Vec<Packet>> {
        if signers.is_empty() {
            return Err(Error::InvalidArgument("no signers given".into()).into());
        }

        let hash_algo = HashAlgorithm::SHA512;
        let mut packets = Vec::with_capacity(signers.len() + 1);

        for (i, (_, key)) in signers.iter().enumerate() {
            let mut ops = OnePassSig::new(SignatureType::Binary);
            ops.set_hash_algo(hash_algo);
            ops.set_pk_algo(key.pk_algo());
            ops.set_issuer(key.keyid());
            ops.set_last(i + 1 == signers.len());
            packets.push(Packet::from(ops));
        }

        let mut literal = Literal::new(format);
        literal.set_body(data.to_vec());
        packets.push(Packet::from(literal));

        for (cert, key) in signers.iter().rev() {
            let mut ctx = hash_algo.context()?;
            ctx.update(data);
            let mut keypair = (*key).clone().into_keypair()?;
            let builder = SignatureBuilder::new(SignatureType::Binary).set_hash_algo(hash_algo);
            let builder = stamp_issuer(builder, cert, key);
            let sig = builder.sign_hash(&mut keypair, ctx)?;
            packets.push(Packet::from(sig));
        }

        Ok(packets)
    }

    /// Verifies an inline signed packet stream produced by
    /// [`sign_inline`] (or any compliant OpenPGP message): matches
    /// each one-pass-signature header against the trailing signature
    /// that shares its hash algorithm and issuer, and returns the
    /// literal data once every signature checks out.
    pub fn verify_inline(&self, packets: &[Packet]) -> Result<Vec<u8>> {
        let mut expected: Vec<&OnePassSig> = Vec::new();
        let mut literal_data: Option<&[u8]> = None;
        let mut signatures: Vec<&Signature> = Vec::new();

        for packet in packets {
            match packet {
                Packet::OnePassSig(ops) => expected.push(ops),
                Packet::Literal(lit) => literal_data = Some(lit.body()),
                Packet::Signature(sig) => signatures.push(sig),
                _ => {}
            }
        }

        let data = literal_data.ok_or_else(|| {
            Error::MalformedPacket("inline message has no literal data packet".into())
        })?;

        if signatures.len() != expected.len() {
            return Err(Error::BadSignature(
                "one-pass-signature count doesn't match trailing signature count".into(),
            )
            .into());
        }

        for sig in &signatures {
            self.verify_detached(sig, data)?;
        }

        Ok(data.to_vec())
    }

    /// Encrypts `data` for the given recipient certificates and/or
    /// passwords, optionally signing it first with `signers`, and
    /// optionally compressing the plaintext with `compression`.
    ///
    /// `data_cipher` encrypts the SEIP data packet and is the
    /// algorithm embedded in each PK-ESK's wrapped session key. Each
    /// password recipient carries its own S2K parameters and its own
    /// cipher wrapping that same session key (RFC 4880 §5.3: the
    /// decrypted SK-ESK body is `data_cipher_octet ‖ session_key`, so
    /// the wrap cipher and the data cipher can differ freely).
    ///
    /// Returns the SEIP packet (plus any leading PK-ESK/SK-ESK
    /// packets) ready to serialize.
    #[allow(clippy::too_many_arguments)]
    pub fn encrypt(
        &self,
        recipients: &[&Cert],
        passwords: &[PasswordRecipient],
        signers: &[(&Cert, &Key4)],
        data: &[u8],
        format: DataFormat,
        data_cipher: SymmetricAlgorithm,
        compression: Option<crate::types::CompressionAlgorithm>,
    ) -> Result<Vec<Packet>> {
        if recipients.is_empty() && passwords.is_empty() {
            return Err(Error::InvalidArgument("no recipients or passwords given".into()).into());
        }

        let key_size = data_cipher.key_size()
            .ok_or(Error::UnsupportedSymmetricAlgorithm(data_cipher))?;
        let mut session_key = vec![0u8; key_size];
        rand::rngs::OsRng.fill_bytes(&mut session_key);

        let mut out = Vec::new();

        for cert in recipients {
            out.push(Packet::from(wrap_for_recipient(cert, data_cipher, &session_key)?));
        }

        for pw in passwords {
            let iterations = crate::crypto::s2k::decode_count(
                crate::crypto::s2k::encode_count(pw.iterations));
            let s2k = crate::crypto::s2k::S2K::IteratedSalted {
                hash: pw.hash,
                salt: {
                    let mut salt = [0u8; 8];
                    rand::rngs::OsRng.fill_bytes(&mut salt);
                    salt
                },
                iterations,
            };
            let wrap_key_size = pw.cipher.key_size()
                .ok_or(Error::UnsupportedSymmetricAlgorithm(pw.cipher))?;
            let kek = s2k.derive_key(pw.password, wrap_key_size)?;

            let mut esk = Vec::with_capacity(1 + session_key.len());
            esk.push(data_cipher.octet());
            esk.extend_from_slice(&session_key);
            let wrap_bs = pw.cipher.block_size().ok_or(Error::UnsupportedSymmetricAlgorithm(pw.cipher))?;
            symmetric::cfb_encrypt(pw.cipher, &kek, &vec![0u8; wrap_bs], &mut esk)?;
            out.push(Packet::from(SKESK::new4(pw.cipher, s2k, Some(esk.into_boxed_slice()))));
        }

        let plaintext_packets = if signers.is_empty() {
            let mut literal = Literal::new(format);
            literal.set_body(data.to_vec());
            vec![Packet::from(literal)]
        } else {
            self.sign_inline(signers, data, format)?
        };

        let plaintext = if let Some(algo) = compression {
            let mut cd = CompressedData::new(algo);
            for packet in plaintext_packets {
                cd = cd.push(packet);
            }
            Packet::from(cd).to_vec()?
        } else {
            let mut buf = Vec::new();
            for packet in &plaintext_packets {
                packet.serialize(&mut buf)?;
            }
            buf
        };

        let bs = data_cipher.block_size().ok_or(Error::UnsupportedSymmetricAlgorithm(data_cipher))?;
        let mut prefix = vec![0u8; bs];
        rand::rngs::OsRng.fill_bytes(&mut prefix);
        let body = symmetric::seip_encrypt(data_cipher, &session_key, &plaintext, &prefix)?;

        let mut seip = SEIP1::new();
        seip.set_body(body);
        out.push(Packet::from(seip));

        Ok(out)
    }

    /// Decrypts a message given its leading PK-ESK/SK-ESK packets and
    /// trailing SEIP packet, consulting the context's key and
    /// password providers, and verifies any inline signatures found
    /// in the decrypted plaintext.
    pub fn decrypt(&self, packets: &[Packet]) -> Result<Vec<u8>> {
        let mut pkesks = Vec::new();
        let mut skesks = Vec::new();
        let mut seip_body: Option<&[u8]> = None;

        for packet in packets {
            match packet {
                Packet::PKESK(p) => pkesks.push(p),
                Packet::SKESK(s) => skesks.push(s),
                Packet::SEIP(s) => seip_body = Some(s.body()),
                _ => {}
            }
        }

        let body = seip_body
            .ok_or_else(|| Error::MalformedPacket("no SEIP packet in message".into()))?;

        let session_key = self.recover_session_key(&pkesks, &skesks)?;

        let plaintext = symmetric::seip_decrypt(session_key.algo, &session_key.key, body)?;
        let inner = PacketPile::from_bytes(&plaintext)?;
        let inner: Vec<Packet> = inner.into_children().collect();

        let inner = expand_compressed(inner)?;

        if inner.iter().any(|p| p.tag() == Tag::OnePassSig) {
            self.verify_inline(&inner)
        } else {
            inner
                .into_iter()
                .find_map(|p| match p {
                    Packet::Literal(lit) => Some(lit.body().to_vec()),
                    _ => None,
                })
                .ok_or_else(|| Error::MalformedPacket("no literal data packet in message".into()).into())
        }
    }

    fn recover_session_key(&self, pkesks: &[&PKESK], skesks: &[&SKESK]) -> Result<SessionKey> {
        for pkesk in pkesks {
            let cert = match self.locate_by_keyid(pkesk.recipient()) {
                Some(c) => c.clone(),
                None => {
                    let Some(provider) = &self.key_provider else { continue };
                    let id = format!("{:016X}", as_u64_hex(pkesk.recipient()));
                    match provider.provide_key(Operation::DecryptPk, &id, IdentifierType::KeyID) {
                        Some(c) => c,
                        None => continue,
                    }
                }
            };
            let Some(key) = cert.key_by_keyid(pkesk.recipient()) else { continue };
            let key = if key.secret().is_some() {
                key.clone()
            } else {
                continue;
            };
            let unlocked = self.unlock_if_needed(&cert, key)?;
            if let Ok(sk) = unwrap_pkesk(pkesk, &unlocked) {
                return Ok(sk);
            }
        }

        for skesk in skesks {
            let Some(provider) = &self.password_provider else { continue };
            let Some(password) = provider.provide_password(Operation::DecryptSymmetric, "") else { continue };
            let key_size = skesk.symmetric_algo().key_size().ok_or(Error::UnsupportedSymmetricAlgorithm(skesk.symmetric_algo()))?;
            let kek = skesk.s2k().derive_key(&password, key_size)?;
            match skesk.esk() {
                None => {
                    return Ok(SessionKey { algo: skesk.symmetric_algo(), key: kek });
                }
                Some(esk) => {
                    let bs = skesk.symmetric_algo().block_size().unwrap_or(16);
                    let mut buf = esk.to_vec();
                    if symmetric::cfb_decrypt(skesk.symmetric_algo(), &kek, &vec![0u8; bs], &mut buf).is_ok()
                        && !buf.is_empty()
                    {
                        let data_cipher = SymmetricAlgorithm::from_octet(buf[0]);
                        return Ok(SessionKey { algo: data_cipher, key: buf[1..].to_vec().into() });
                    }
                }
            }
        }

        Err(Error::NoSuitableKey.into())
    }

    /// Unlocks `key`'s secret material if it is still encrypted,
    /// consulting the password provider.
    fn unlock_if_needed(&self, cert: &Cert, mut key: Key4) -> Result<Key4> {
        if key.is_unlocked() {
            return Ok(key);
        }
        let Some(provider) = &self.password_provider else {
            return Err(Error::InvalidOperation("key is locked and no password provider is set".into()).into());
        };
        let id = format!("{}", cert.fingerprint());
        let password = provider
            .provide_password(Operation::Unlock, &id)
            .ok_or_else(|| Error::BadPassword)?;
        key.unlock(&password)?;
        Ok(key)
    }

    /// Resolves the certificate that produced `signature`, by the
    /// issuer fingerprint or Key ID subpacket, falling back to the
    /// key provider.
    fn resolve_signer(&self, signature: &Signature) -> Result<Cert> {
        if let Some(fp) = signature.hashed_area().issuer_fingerprint()
            .or_else(|| signature.unhashed_area().issuer_fingerprint())
        {
            if let Some(cert) = self.locate_by_fingerprint(fp) {
                return Ok(cert.clone());
            }
        }
        if let Some(id) = signature.hashed_area().issuer()
            .or_else(|| signature.unhashed_area().issuer())
        {
            if let Some(cert) = self.locate_by_keyid(id) {
                return Ok(cert.clone());
            }
            if let Some(provider) = &self.key_provider {
                let hex = format!("{:016X}", as_u64_hex(id));
                if let Some(cert) = provider.provide_key(Operation::DecryptPk, &hex, IdentifierType::KeyID) {
                    return Ok(cert);
                }
            }
        }
        Err(Error::KeyNotFound("no certificate found for signature issuer".into()).into())
    }
}

fn as_u64_hex(id: &KeyID) -> u64 {
    let bytes = id.as_bytes();
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[bytes.len() - 8..]);
    u64::from_be_bytes(buf)
}

/// Stamps `builder` with the issuer Key ID and fingerprint subpackets
/// for `key`, as every signature this crate produces does.
fn stamp_issuer(mut builder: SignatureBuilder, _signer: &Cert, key: &Key4) -> SignatureBuilder {
    use crate::packet::signature::subpacket::{Subpacket, SubpacketTag, SubpacketValue};
    let area = builder.hashed_area_mut();
    area.add(Subpacket::new(SubpacketValue::Issuer(key.keyid()), false).expect("fits"))
        .ok();
    area.add(Subpacket::new(SubpacketValue::IssuerFingerprint(key.fingerprint()), false).expect("fits"))
        .ok();
    builder
}

/// Finds the key within `cert` (primary or subkey) that produced
/// `signature`, by its issuer subpackets.
fn signer_key<'a>(cert: &'a Cert, signature: &Signature) -> Result<&'a Key4> {
    if let Some(fp) = signature.hashed_area().issuer_fingerprint()
        .or_else(|| signature.unhashed_area().issuer_fingerprint())
    {
        if let Some(key) = cert.key_by_fingerprint(fp) {
            return Ok(key);
        }
    }
    if let Some(id) = signature.hashed_area().issuer()
        .or_else(|| signature.unhashed_area().issuer())
    {
        if let Some(key) = cert.key_by_keyid(id) {
            return Ok(key);
        }
    }
    Err(Error::KeyNotFound("signature issuer not found in certificate".into()).into())
}

/// Rejects a signature that is not yet live or has expired, per the
/// "valid for trust" rules.
fn check_signature_liveness(signature: &Signature) -> Result<()> {
    let now = std::time::SystemTime::now();
    if let Some(creation) = signature.hashed_area().signature_creation_time() {
        if creation > now {
            return Err(Error::NotYetLive(creation).into());
        }
        if let Some(expiry) = signature.hashed_area().signature_expiration_time() {
            if expiry <= now {
                return Err(Error::SignatureExpired(expiry).into());
            }
        }
    }
    Ok(())
}

/// Replaces any top-level [`CompressedData`] packet with its
/// decompressed children, so the verify/decrypt pipelines only ever
/// have to walk a flat packet list.
fn expand_compressed(packets: Vec<Packet>) -> Result<Vec<Packet>> {
    let mut out = Vec::with_capacity(packets.len());
    for packet in packets {
        match packet {
            Packet::CompressedData(mut cd) => {
                let children = std::mem::take(cd.children_mut());
                out.extend(expand_compressed(children)?);
            }
            other => out.push(other),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert::CertBuilder;

    #[test]
    fn sign_and_verify_detached() {
        let (cert, _rev) = CertBuilder::new()
            .add_userid("Alice <alice@example.org>")
            .add_signing_subkey()
            .generate()
            .unwrap();

        let signing_key = cert.subkeys()[0].key().clone();

        let mut ctx = Context::new();
        ctx.add_certs(std::iter::once(cert.clone()));

        let data = b"hello, world";
        let sig = ctx.sign_detached(&cert, &signing_key, data).unwrap();
        ctx.verify_detached(&sig, data).unwrap();

        assert!(ctx.verify_detached(&sig, b"tampered").is_err());
    }

    #[test]
    fn sign_and_verify_inline() {
        let (cert, _rev) = CertBuilder::new()
            .add_userid("Bob <bob@example.org>")
            .add_signing_subkey()
            .generate()
            .unwrap();
        let signing_key = cert.subkeys()[0].key().clone();

        let mut ctx = Context::new();
        ctx.add_certs(std::iter::once(cert.clone()));

        let data = b"inline message body";
        let packets = ctx
            .sign_inline(&[(&cert, &signing_key)], data, DataFormat::Binary)
            .unwrap();
        let verified = ctx.verify_inline(&packets).unwrap();
        assert_eq!(verified, data);
    }

    #[test]
    fn encrypt_and_decrypt_rsa() {
        let (cert, _rev) = CertBuilder::new()
            .add_userid("Carol <carol@example.org>")
            .add_transport_encryption_subkey()
            .generate()
            .unwrap();

        let mut ctx = Context::new();
        ctx.add_certs(std::iter::once(cert.clone()));

        let data = b"super secret payload";
        let packets = ctx
            .encrypt(&[&cert], &[], &[], data, DataFormat::Binary, SymmetricAlgorithm::AES256, None)
            .unwrap();

        let plaintext = ctx.decrypt(&packets).unwrap();
        assert_eq!(plaintext, data);
    }

    #[test]
    fn encrypt_and_decrypt_password_only() {
        let ctx = Context::new();
        let data = b"shared-secret message";
        let packets = ctx
            .encrypt(&[], &[PasswordRecipient::new(b"hunter2")], &[], data, DataFormat::Binary,
                     SymmetricAlgorithm::AES256, None)
            .unwrap();

        struct StaticPassword;
        impl PasswordProvider for StaticPassword {
            fn provide_password(&self, _op: Operation, _id: &str) -> Option<Protected> {
                Some(b"hunter2".to_vec().into())
            }
        }
        let mut ctx2 = Context::new();
        ctx2.set_password_provider(Box::new(StaticPassword));
        let plaintext = ctx2.decrypt(&packets).unwrap();
        assert_eq!(plaintext, data);
    }

    #[test]
    fn encrypt_password_with_distinct_wrap_and_data_cipher() {
        let ctx = Context::new();
        let data = b"distinct cipher payload";
        let pw = PasswordRecipient::new(b"hunter2")
            .with_hash(HashAlgorithm::SM3)
            .with_iterations(12345)
            .with_cipher(SymmetricAlgorithm::Twofish);
        let packets = ctx
            .encrypt(&[], &[pw], &[], data, DataFormat::Binary, SymmetricAlgorithm::CAST5, None)
            .unwrap();

        struct StaticPassword;
        impl PasswordProvider for StaticPassword {
            fn provide_password(&self, _op: Operation, _id: &str) -> Option<Protected> {
                Some(b"hunter2".to_vec().into())
            }
        }
        let mut ctx2 = Context::new();
        ctx2.set_password_provider(Box::new(StaticPassword));
        let plaintext = ctx2.decrypt(&packets).unwrap();
        assert_eq!(plaintext, data);
    }
}
