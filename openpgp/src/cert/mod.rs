//! Certificates.
//!
//! A certificate is a primary key plus everything vouching for it:
//! user IDs and user attributes, the self-signatures and third-party
//! certifications that bind them to the primary key, subkeys and
//! their binding signatures, and any revocations. Readers accept
//! packets in whatever order they come in on the wire; writers always
//! emit primary, its signatures, then each user ID/attribute followed
//! by its signatures, then each subkey followed by its binding
//! signature.
//!
//! Keys are modeled concretely ([`Key4`]), not as a compile-time type
//! state, so a [`Cert`]'s subkeys carry their own secret material
//! state independently of the primary key's.

use std::io::Read;
use std::path::Path;
use std::time::SystemTime;

use crate::crypto::hash::Hash as HashUpdate;
use crate::packet::key::{Key4, KeyPair};
use crate::packet::signature::SignatureBuilder;
use crate::packet::{Signature, UserAttribute, UserID};
use crate::parse::{PacketParserResult, Parse};
use crate::types::{HashAlgorithm, ReasonForRevocation, SignatureType};
use crate::{Error, Fingerprint, KeyID, Packet, PacketPile, Result};

pub mod builder;
pub mod request;
pub use builder::{CertBuilder, CipherSuite};
pub use request::GenerateRequest;

/// Whether an entity (a cert or one of its components) has been
/// revoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevocationStatus<'a> {
    /// Revoked; the revocation signatures, newest first.
    Revoked(Vec<&'a Signature>),
    /// No revocation found among the signatures this cert carries.
    NotAsFarAsWeKnow,
}

fn newest_first<'a, I: IntoIterator<Item = &'a Signature>>(sigs: I) -> Vec<&'a Signature> {
    let mut v: Vec<&Signature> = sigs.into_iter().collect();
    v.sort_by(|a, b| b.signature_creation_time().cmp(&a.signature_creation_time()));
    v
}

fn newest<'a, I: IntoIterator<Item = &'a Signature>>(sigs: I) -> Option<&'a Signature> {
    sigs.into_iter().max_by_key(|s| s.signature_creation_time())
}

/// A user ID and the signatures attached to it.
#[derive(Debug, Clone, PartialEq)]
pub struct UserIDBinding {
    userid: UserID,
    self_signatures: Vec<Signature>,
    certifications: Vec<Signature>,
    revocations: Vec<Signature>,
}

impl UserIDBinding {
    /// Returns the user ID itself.
    pub fn userid(&self) -> &UserID {
        &self.userid
    }

    /// Returns the self-signatures over this user ID, in the order
    /// they were encountered.
    pub fn self_signatures(&self) -> &[Signature] {
        &self.self_signatures
    }

    /// Returns the third-party certifications over this user ID.
    pub fn certifications(&self) -> &[Signature] {
        &self.certifications
    }

    /// Returns the revocations of this user ID.
    pub fn revocations(&self) -> &[Signature] {
        &self.revocations
    }

    /// Returns the newest self-signature, the binding signature used
    /// to determine this user ID's current preferences and flags.
    pub fn binding_signature(&self) -> Option<&Signature> {
        newest(self.self_signatures.iter().copied())
    }

    /// Returns whether this user ID is marked as revoked.
    pub fn revoked(&self) -> RevocationStatus {
        if self.revocations.is_empty() {
            RevocationStatus::NotAsFarAsWeKnow
        } else {
            RevocationStatus::Revoked(newest_first(self.revocations.iter().copied()))
        }
    }

    /// Returns whether the newest self-signature marks this as the
    /// primary user ID.
    pub fn is_primary(&self) -> bool {
        self.binding_signature()
            .and_then(|s| s.hashed_area().primary_userid())
            .unwrap_or(false)
    }
}

/// A user attribute and the signatures attached to it.
#[derive(Debug, Clone, PartialEq)]
pub struct UserAttributeBinding {
    user_attribute: UserAttribute,
    self_signatures: Vec<Signature>,
    certifications: Vec<Signature>,
    revocations: Vec<Signature>,
}

impl UserAttributeBinding {
    /// Returns the user attribute itself.
    pub fn user_attribute(&self) -> &UserAttribute {
        &self.user_attribute
    }

    /// Returns the self-signatures over this user attribute.
    pub fn self_signatures(&self) -> &[Signature] {
        &self.self_signatures
    }

    /// Returns the newest self-signature.
    pub fn binding_signature(&self) -> Option<&Signature> {
        newest(self.self_signatures.iter().copied())
    }

    /// Returns whether this user attribute is marked as revoked.
    pub fn revoked(&self) -> RevocationStatus {
        if self.revocations.is_empty() {
            RevocationStatus::NotAsFarAsWeKnow
        } else {
            RevocationStatus::Revoked(newest_first(self.revocations.iter().copied()))
        }
    }
}

/// A subkey and the signatures binding it to the primary key.
#[derive(Debug, Clone, PartialEq)]
pub struct SubkeyBinding {
    key: Key4,
    self_signatures: Vec<Signature>,
    revocations: Vec<Signature>,
}

impl SubkeyBinding {
    /// Returns the subkey itself.
    pub fn key(&self) -> &Key4 {
        &self.key
    }

    /// Returns the binding signatures attached to this subkey.
    pub fn self_signatures(&self) -> &[Signature] {
        &self.self_signatures
    }

    /// Returns the newest binding signature.
    pub fn binding_signature(&self) -> Option<&Signature> {
        newest(self.self_signatures.iter().copied())
    }

    /// Returns whether this subkey is marked as revoked.
    pub fn revoked(&self) -> RevocationStatus {
        if self.revocations.is_empty() {
            RevocationStatus::NotAsFarAsWeKnow
        } else {
            RevocationStatus::Revoked(newest_first(self.revocations.iter().copied()))
        }
    }
}

/// A certificate: a primary key, its user IDs, its subkeys, and every
/// signature that binds them together.
#[derive(Debug, Clone, PartialEq)]
pub struct Cert {
    primary: Key4,
    direct_signatures: Vec<Signature>,
    revocations: Vec<Signature>,
    userids: Vec<UserIDBinding>,
    user_attributes: Vec<UserAttributeBinding>,
    subkeys: Vec<SubkeyBinding>,
    /// Packets of a recognized tag that didn't fit anywhere above,
    /// e.g. a certification whose issuer we can't place.
    unknowns: Vec<Packet>,
    /// Signatures that could not be attached to any component.
    bad: Vec<Signature>,
}

impl Cert {
    /// Returns the primary key.
    pub fn primary_key(&self) -> &Key4 {
        &self.primary
    }

    /// Returns this cert's fingerprint (that of its primary key).
    pub fn fingerprint(&self) -> Fingerprint {
        self.primary.fingerprint()
    }

    /// Returns this cert's key ID.
    pub fn keyid(&self) -> KeyID {
        self.primary.keyid()
    }

    /// Returns this cert's grip.
    pub fn grip(&self) -> [u8; 20] {
        self.primary.grip()
    }

    /// Returns the direct-key signatures (signatures made over the
    /// primary key itself, not over a user ID).
    pub fn direct_signatures(&self) -> &[Signature] {
        &self.direct_signatures
    }

    /// Returns the newest direct-key signature.
    pub fn direct_key_signature(&self) -> Option<&Signature> {
        newest(self.direct_signatures.iter().copied())
    }

    /// Returns the whole-key revocations.
    pub fn revocations(&self) -> &[Signature] {
        &self.revocations
    }

    /// Returns this cert's user IDs.
    pub fn userids(&self) -> &[UserIDBinding] {
        &self.userids
    }

    /// Returns this cert's user attributes.
    pub fn user_attributes(&self) -> &[UserAttributeBinding] {
        &self.user_attributes
    }

    /// Returns this cert's subkeys.
    pub fn subkeys(&self) -> &[SubkeyBinding] {
        &self.subkeys
    }

    /// Returns an iterator over every key in this cert: the primary
    /// key, then each subkey.
    pub fn keys(&self) -> impl Iterator<Item = &Key4> {
        std::iter::once(&self.primary).chain(self.subkeys.iter().map(|sk| &sk.key))
    }

    /// Returns packets of a known tag that this cert couldn't attach
    /// anywhere (e.g. a certification by an unreachable issuer).
    pub fn unknowns(&self) -> &[Packet] {
        &self.unknowns
    }

    /// Returns signatures that failed to attach to a component.
    pub fn bad_signatures(&self) -> &[Signature] {
        &self.bad
    }

    /// Returns the user ID marked primary by its newest binding
    /// signature, falling back to the first user ID with any binding
    /// signature at all.
    pub fn primary_userid(&self) -> Option<&UserIDBinding> {
        self.userids.iter().find(|u| u.is_primary())
            .or_else(|| self.userids.iter().find(|u| u.binding_signature().is_some()))
    }

    /// Returns whether this cert is revoked, considering only
    /// whole-key revocations.
    pub fn revoked(&self) -> RevocationStatus {
        if self.revocations.is_empty() {
            RevocationStatus::NotAsFarAsWeKnow
        } else {
            RevocationStatus::Revoked(newest_first(self.revocations.iter().copied()))
        }
    }

    /// Returns whether this cert carries any secret key material, on
    /// the primary key or on any subkey.
    pub fn is_tsk(&self) -> bool {
        self.primary.has_secret() || self.subkeys.iter().any(|sk| sk.key.has_secret())
    }

    /// Finds the subkey or primary key with the given Key ID.
    pub fn key_by_keyid(&self, id: &KeyID) -> Option<&Key4> {
        self.keys().find(|k| k.keyid() == *id)
    }

    /// Finds the subkey or primary key with the given fingerprint.
    pub fn key_by_fingerprint(&self, fp: &Fingerprint) -> Option<&Key4> {
        self.keys().find(|k| k.fingerprint() == *fp)
    }

    /// Finds the subkey or primary key with the given grip.
    pub fn key_by_grip(&self, grip: &[u8; 20]) -> Option<&Key4> {
        self.keys().find(|k| &k.grip() == grip)
    }

    /// Returns the packets that constitute this cert, in the
    /// canonical writing order: primary, its direct signatures and
    /// revocations, each user ID/attribute and its signatures, each
    /// subkey and its signatures.
    pub fn into_packets(self) -> impl Iterator<Item = Packet> {
        let mut out = Vec::new();
        out.push(self.primary.into());
        for s in self.direct_signatures { out.push(s.into()); }
        for s in self.revocations { out.push(s.into()); }
        for u in self.userids {
            out.push(Packet::UserID(u.userid));
            for s in u.self_signatures { out.push(s.into()); }
            for s in u.certifications { out.push(s.into()); }
            for s in u.revocations { out.push(s.into()); }
        }
        for a in self.user_attributes {
            out.push(Packet::UserAttribute(a.user_attribute));
            for s in a.self_signatures { out.push(s.into()); }
            for s in a.certifications { out.push(s.into()); }
            for s in a.revocations { out.push(s.into()); }
        }
        for sk in self.subkeys {
            out.push(sk.key.into());
            for s in sk.self_signatures { out.push(s.into()); }
            for s in sk.revocations { out.push(s.into()); }
        }
        out.extend(self.unknowns);
        out.extend(self.bad.into_iter().map(Into::into));
        out.into_iter()
    }

    /// Collects this cert's packets into a [`PacketPile`].
    pub fn into_packet_pile(self) -> PacketPile {
        PacketPile::from(self.into_packets().collect::<Vec<_>>())
    }

    /// Parses a cert from an already-assembled [`PacketPile`].
    pub fn from_packet_pile(pile: PacketPile) -> Result<Cert> {
        Self::from_packets(pile.into_children().collect())
    }

    /// Parses a cert from the result of running a [`PacketParser`]
    /// to completion.
    ///
    /// [`PacketParser`]: crate::parse::PacketParser
    pub fn from_packet_parser(ppr: PacketParserResult) -> Result<Cert> {
        Self::from_packet_pile(PacketPile::from_packet_parser(ppr)?)
    }

    fn from_packets(packets: Vec<Packet>) -> Result<Cert> {
        let mut iter = packets.into_iter();
        let primary = match iter.next() {
            Some(Packet::PublicKey(k)) | Some(Packet::SecretKey(k)) => k,
            Some(_) => return Err(Error::MalformedCert(
                "cert does not start with a primary key".into()).into()),
            None => return Err(Error::MalformedCert("empty cert".into()).into()),
        };

        let mut cert = Cert {
            primary,
            direct_signatures: Vec::new(),
            revocations: Vec::new(),
            userids: Vec::new(),
            user_attributes: Vec::new(),
            subkeys: Vec::new(),
            unknowns: Vec::new(),
            bad: Vec::new(),
        };

        #[derive(Clone, Copy, PartialEq)]
        enum Target { Primary, UserID(usize), UserAttribute(usize), Subkey(usize) }
        let mut target = Target::Primary;

        for packet in iter {
            match packet {
                Packet::UserID(u) => {
                    cert.userids.push(UserIDBinding {
                        userid: u,
                        self_signatures: Vec::new(),
                        certifications: Vec::new(),
                        revocations: Vec::new(),
                    });
                    target = Target::UserID(cert.userids.len() - 1);
                }
                Packet::UserAttribute(a) => {
                    cert.user_attributes.push(UserAttributeBinding {
                        user_attribute: a,
                        self_signatures: Vec::new(),
                        certifications: Vec::new(),
                        revocations: Vec::new(),
                    });
                    target = Target::UserAttribute(cert.user_attributes.len() - 1);
                }
                Packet::PublicSubkey(k) | Packet::SecretSubkey(k) => {
                    cert.subkeys.push(SubkeyBinding {
                        key: k,
                        self_signatures: Vec::new(),
                        revocations: Vec::new(),
                    });
                    target = Target::Subkey(cert.subkeys.len() - 1);
                }
                Packet::Signature(sig) => {
                    let revocation = matches!(sig.typ(),
                        SignatureType::KeyRevocation
                            | SignatureType::SubkeyRevocation
                            | SignatureType::CertificationRevocation);
                    match target {
                        Target::Primary => {
                            if revocation {
                                cert.revocations.push(sig);
                            } else {
                                cert.direct_signatures.push(sig);
                            }
                        }
                        Target::UserID(i) => {
                            let u = &mut cert.userids[i];
                            if revocation {
                                u.revocations.push(sig);
                            } else if sig.issuer().map(|id| *id == cert.primary.keyid())
                                .unwrap_or(false)
                                || sig.issuer_fingerprint()
                                    .map(|fp| *fp == cert.primary.fingerprint())
                                    .unwrap_or(false)
                            {
                                u.self_signatures.push(sig);
                            } else {
                                u.certifications.push(sig);
                            }
                        }
                        Target::UserAttribute(i) => {
                            let a = &mut cert.user_attributes[i];
                            if revocation {
                                a.revocations.push(sig);
                            } else if sig.issuer().map(|id| *id == cert.primary.keyid())
                                .unwrap_or(false)
                            {
                                a.self_signatures.push(sig);
                            } else {
                                a.certifications.push(sig);
                            }
                        }
                        Target::Subkey(i) => {
                            let sk = &mut cert.subkeys[i];
                            if revocation {
                                sk.revocations.push(sig);
                            } else {
                                sk.self_signatures.push(sig);
                            }
                        }
                    }
                }
                other => cert.unknowns.push(other),
            }
        }

        Ok(cert)
    }

    /// Merges the packets of `packets` into this cert, returning the
    /// updated cert.
    ///
    /// This is how a freshly generated binding signature, subkey, or
    /// revocation gets attached: generation produces loose packets,
    /// and `merge_packets` folds them back in following the same
    /// rules as parsing.
    pub fn merge_packets(self, packets: Vec<Packet>) -> Result<Cert> {
        let mut all = self.into_packets().collect::<Vec<_>>();
        all.extend(packets);
        Cert::from_packets(all)
    }

    /// Merges another copy of (conceptually) the same cert into this
    /// one.
    ///
    /// No secret material is silently replaced by public material or
    /// vice versa: if exactly one side carries secret key material
    /// for the primary key, that side's copy is kept.
    pub fn merge(self, other: Cert) -> Result<Cert> {
        if self.primary.fingerprint() != other.primary.fingerprint() {
            return Err(Error::InvalidArgument(
                "cannot merge certs with different fingerprints".into()).into());
        }
        let primary = if !self.primary.has_secret() && other.primary.has_secret() {
            other.primary.clone()
        } else {
            self.primary.clone()
        };
        let mut merged = self.merge_packets(other.into_packets().collect())?;
        merged.primary = primary;
        Ok(merged)
    }

    /// Revokes this cert in place, merging a whole-key revocation
    /// signature generated with `reason` and `message`.
    pub fn revoke_in_place(
        self, signer: &mut KeyPair, reason: ReasonForRevocation, message: &[u8],
    ) -> Result<Cert> {
        let sig = CertRevocationBuilder::new()
            .set_reason_for_revocation(reason, message)?
            .build(signer, &self, None)?;
        self.merge_packets(vec![sig.into()])
    }

    /// Generates a self-signed certification for `uid` and merges the
    /// user ID and the new signature into this cert.
    pub fn add_userid(
        self, signer: &mut KeyPair, uid: UserID, primary: bool,
    ) -> Result<Cert> {
        let mut builder = SignatureBuilder::new(SignatureType::GenericCertification)
            .set_hash_algo(HashAlgorithm::SHA512);
        if primary {
            builder = builder.set_primary_userid(true)?;
        }
        let sig = bind_userid(signer, &self.primary, &uid, builder)?;
        self.merge_packets(vec![uid.into(), sig.into()])
    }
}

impl<'a> Parse<'a, Cert> for Cert {
    fn from_reader<R: 'a + Read>(reader: R) -> Result<Self> {
        Cert::from_packet_pile(PacketPile::from_reader(reader)?)
    }

    fn from_bytes<D: AsRef<[u8]> + ?Sized>(data: &'a D) -> Result<Self> {
        Cert::from_packet_pile(PacketPile::from_bytes(data)?)
    }

    fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Cert::from_packet_pile(PacketPile::from_file(path)?)
    }
}

/// Hashes the preimage of a direct-key signature or key revocation:
/// just the primary key body (Section 5.2.4 of RFC 4880).
fn direct_key_hash(primary: &Key4, algo: HashAlgorithm) -> Result<crate::crypto::hash::Context> {
    let mut ctx = algo.context()?;
    primary.hash(&mut ctx);
    Ok(ctx)
}

/// Hashes the preimage of a user ID certification, revocation, or
/// subkey binding/revocation: the primary key body followed by the
/// bound component's body.
fn bound_hash(
    primary: &Key4, component: &dyn HashUpdate, algo: HashAlgorithm,
) -> Result<crate::crypto::hash::Context> {
    let mut ctx = algo.context()?;
    primary.hash(&mut ctx);
    component.hash(&mut ctx);
    Ok(ctx)
}

/// Creates a self-certification (or third-party certification) over
/// `uid`, signed by `signer`.
pub fn bind_userid(
    signer: &mut KeyPair, primary: &Key4, uid: &UserID, builder: SignatureBuilder,
) -> Result<Signature> {
    let ctx = bound_hash(primary, uid, builder.hash_algo())?;
    builder.sign_hash(signer, ctx)
}

/// Creates a certification over `ua`, signed by `signer`.
pub fn bind_user_attribute(
    signer: &mut KeyPair, primary: &Key4, ua: &UserAttribute, builder: SignatureBuilder,
) -> Result<Signature> {
    let ctx = bound_hash(primary, ua, builder.hash_algo())?;
    builder.sign_hash(signer, ctx)
}

/// Creates a subkey binding signature over `subkey`, signed by the
/// primary key (via `signer`).
pub fn bind_subkey(
    signer: &mut KeyPair, primary: &Key4, subkey: &Key4, builder: SignatureBuilder,
) -> Result<Signature> {
    let ctx = bound_hash(primary, subkey, builder.hash_algo())?;
    builder.sign_hash(signer, ctx)
}

/// Creates a primary key binding signature ("backsig"), signed by the
/// subkey itself, asserting that the subkey's holder also holds the
/// primary key's secret half.
pub fn sign_primary_key_binding(
    signer: &mut KeyPair, primary: &Key4, subkey: &Key4, builder: SignatureBuilder,
) -> Result<Signature> {
    let ctx = bound_hash(primary, subkey, builder.hash_algo())?;
    builder.sign_hash(signer, ctx)
}

/// Builds a whole-key revocation signature.
#[derive(Debug, Clone)]
pub struct CertRevocationBuilder(SignatureBuilder);

impl CertRevocationBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        CertRevocationBuilder(
            SignatureBuilder::new(SignatureType::KeyRevocation)
                .set_hash_algo(HashAlgorithm::SHA512))
    }

    /// Sets the signature creation time.
    pub fn set_signature_creation_time<T: Into<SystemTime>>(mut self, t: T) -> Result<Self> {
        self.0 = self.0.set_signature_creation_time(t)?;
        Ok(self)
    }

    /// Sets the reason for revocation subpacket.
    pub fn set_reason_for_revocation<R: AsRef<[u8]>>(
        mut self, code: ReasonForRevocation, reason: R,
    ) -> Result<Self> {
        self.0 = self.0.set_reason_for_revocation(code, reason)?;
        Ok(self)
    }

    /// Finalizes the revocation, signed by `signer` over `cert`'s
    /// primary key. `_target` is accepted for symmetry with the
    /// other revocation builders; a whole-key revocation has no
    /// target beyond the primary key itself.
    pub fn build(self, signer: &mut KeyPair, cert: &Cert, _target: Option<()>) -> Result<Signature> {
        let ctx = direct_key_hash(cert.primary_key(), self.0.hash_algo())?;
        self.0.sign_hash(signer, ctx)
    }
}

impl Default for CertRevocationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds a user ID revocation signature.
#[derive(Debug, Clone)]
pub struct UserIDRevocationBuilder(SignatureBuilder);

impl UserIDRevocationBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        UserIDRevocationBuilder(
            SignatureBuilder::new(SignatureType::CertificationRevocation)
                .set_hash_algo(HashAlgorithm::SHA512))
    }

    /// Sets the signature creation time.
    pub fn set_signature_creation_time<T: Into<SystemTime>>(mut self, t: T) -> Result<Self> {
        self.0 = self.0.set_signature_creation_time(t)?;
        Ok(self)
    }

    /// Sets the reason for revocation subpacket.
    pub fn set_reason_for_revocation<R: AsRef<[u8]>>(
        mut self, code: ReasonForRevocation, reason: R,
    ) -> Result<Self> {
        self.0 = self.0.set_reason_for_revocation(code, reason)?;
        Ok(self)
    }

    /// Finalizes the revocation over `uid`, signed by `signer`.
    pub fn build(
        self, signer: &mut KeyPair, cert: &Cert, uid: &UserID,
    ) -> Result<Signature> {
        let ctx = bound_hash(cert.primary_key(), uid, self.0.hash_algo())?;
        self.0.sign_hash(signer, ctx)
    }
}

impl Default for UserIDRevocationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds a subkey revocation signature.
#[derive(Debug, Clone)]
pub struct SubkeyRevocationBuilder(SignatureBuilder);

impl SubkeyRevocationBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        SubkeyRevocationBuilder(
            SignatureBuilder::new(SignatureType::SubkeyRevocation)
                .set_hash_algo(HashAlgorithm::SHA512))
    }

    /// Sets the signature creation time.
    pub fn set_signature_creation_time<T: Into<SystemTime>>(mut self, t: T) -> Result<Self> {
        self.0 = self.0.set_signature_creation_time(t)?;
        Ok(self)
    }

    /// Sets the reason for revocation subpacket.
    pub fn set_reason_for_revocation<R: AsRef<[u8]>>(
        mut self, code: ReasonForRevocation, reason: R,
    ) -> Result<Self> {
        self.0 = self.0.set_reason_for_revocation(code, reason)?;
        Ok(self)
    }

    /// Finalizes the revocation over `subkey`, signed by `signer`
    /// (the primary key's signer, not the subkey's).
    pub fn build(
        self, signer: &mut KeyPair, cert: &Cert, subkey: &Key4,
    ) -> Result<Signature> {
        let ctx = bound_hash(cert.primary_key(), subkey, self.0.hash_algo())?;
        self.0.sign_hash(signer, ctx)
    }
}

impl Default for SubkeyRevocationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::KeyFlags;

    #[test]
    fn builder_roundtrip() {
        let (cert, _) = CertBuilder::new()
            .set_cipher_suite(CipherSuite::Cv25519)
            .add_signing_subkey()
            .generate().unwrap();
        let packets = cert.clone().into_packets().collect::<Vec<_>>();
        let exp = Cert::from_packets(packets).unwrap();
        assert_eq!(cert, exp);
    }

    #[test]
    fn revocation_roundtrip() {
        let (cert, revocation) = CertBuilder::new()
            .set_cipher_suite(CipherSuite::Cv25519)
            .generate().unwrap();
        assert_eq!(cert.revoked(), RevocationStatus::NotAsFarAsWeKnow);

        let cert = cert.merge_packets(vec![revocation.clone().into()]).unwrap();
        assert_eq!(cert.revoked(), RevocationStatus::Revoked(vec![&revocation]));
    }

    #[test]
    fn add_userid_and_search() {
        let (cert, _) = CertBuilder::new()
            .set_cipher_suite(CipherSuite::Cv25519)
            .generate().unwrap();
        let mut signer = cert.primary_key().clone().into_keypair().unwrap();
        let uid = UserID::from("Alice <alice@example.org>");
        let cert = cert.add_userid(&mut signer, uid, true).unwrap();

        assert_eq!(cert.userids().len(), 1);
        assert!(cert.primary_userid().is_some());
        assert_eq!(cert.key_by_fingerprint(&cert.fingerprint()).unwrap().fingerprint(),
                   cert.fingerprint());
    }

    #[test]
    fn subkey_revocation() {
        let (cert, _) = CertBuilder::new()
            .set_cipher_suite(CipherSuite::Cv25519)
            .add_subkey(KeyFlags::default().set_signing(true), None)
            .generate().unwrap();
        let mut signer = cert.primary_key().clone().into_keypair().unwrap();
        let subkey = cert.subkeys()[0].key().clone();

        let revocation = SubkeyRevocationBuilder::new()
            .set_reason_for_revocation(ReasonForRevocation::KeyRetired, b"unused")
            .unwrap()
            .build(&mut signer, &cert, &subkey)
            .unwrap();
        let cert = cert.merge_packets(vec![revocation.into()]).unwrap();
        assert!(matches!(cert.subkeys()[0].revoked(), RevocationStatus::Revoked(_)));
    }
}
