//! Signature packets.
//!
//! See [Section 5.2 of RFC 4880] for details.
//!
//! [Section 5.2 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.2

use std::io;
use std::ops::{Deref, DerefMut};
use std::time::SystemTime;

use crate::crypto::hash::{self, Hash};
use crate::packet::key::KeyPair;
use crate::packet::{self, Key};
use crate::serialize::{Marshal, MarshalInto};
use crate::types::{HashAlgorithm, PublicKeyAlgorithm, SignatureType};
use crate::{Error, Fingerprint, KeyID, Packet, Result};

pub mod subpacket;
pub use subpacket::{SubpacketArea, SubpacketAreas, SubpacketTag, SubpacketValue, Subpacket};

/// Generates a bounded, recursion-safe [`quickcheck::Arbitrary`]
/// implementation for a type whose generation needs to terminate a
/// recursive structure (an embedded signature inside a signature's
/// own subpackets).
///
/// Types implementing this cap their own recursive generation at
/// `depth == 0` rather than unconditionally recursing, which is what
/// a plain [`quickcheck::Arbitrary::arbitrary`] impl would otherwise
/// do forever.
#[cfg(test)]
pub trait ArbitraryBounded {
    /// Generates an arbitrary value, refusing to recurse past `depth`.
    fn arbitrary_bounded<G: quickcheck::Gen>(g: &mut G, depth: usize) -> Self;
}

/// The recursion depth used by the blanket [`quickcheck::Arbitrary`]
/// impl generated by [`impl_arbitrary_with_bound`].
#[cfg(test)]
pub(crate) const DEFAULT_ARBITRARY_DEPTH: usize = 2;

/// Implements [`quickcheck::Arbitrary`] for a type that implements
/// [`ArbitraryBounded`], starting generation at
/// [`DEFAULT_ARBITRARY_DEPTH`].
#[cfg(test)]
macro_rules! impl_arbitrary_with_bound {
    ($typ:path) => {
        impl quickcheck::Arbitrary for $typ {
            fn arbitrary<G: quickcheck::Gen>(g: &mut G) -> Self {
                <$typ as crate::packet::signature::ArbitraryBounded>::arbitrary_bounded(
                    g, crate::packet::signature::DEFAULT_ARBITRARY_DEPTH)
            }
        }
    }
}
#[cfg(test)]
pub(crate) use impl_arbitrary_with_bound;

/// The fixed, non-subpacket fields of a version 4 signature packet:
/// version, signature type, public-key algorithm, and hash algorithm
/// (Section 5.2.3 of RFC 4880).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignatureFields {
    version: u8,
    sigtype: SignatureType,
    pk_algo: PublicKeyAlgorithm,
    hash_algo: HashAlgorithm,
}

impl SignatureFields {
    /// Creates a new set of fields for a version 4 signature.
    pub fn new(sigtype: SignatureType, pk_algo: PublicKeyAlgorithm,
               hash_algo: HashAlgorithm) -> Self {
        SignatureFields { version: 4, sigtype, pk_algo, hash_algo }
    }

    /// Returns the packet version.
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Returns the signature type.
    pub fn typ(&self) -> SignatureType {
        self.sigtype
    }

    /// Returns the public-key algorithm used to create the signature.
    pub fn pk_algo(&self) -> PublicKeyAlgorithm {
        self.pk_algo
    }

    /// Returns the hash algorithm used to create the signature.
    pub fn hash_algo(&self) -> HashAlgorithm {
        self.hash_algo
    }

    /// Assembles fields parsed directly off the wire, at whatever
    /// version octet was actually present.
    pub(crate) fn from_parts(version: u8, sigtype: SignatureType,
                              pk_algo: PublicKeyAlgorithm,
                              hash_algo: HashAlgorithm) -> Self {
        SignatureFields { version, sigtype, pk_algo, hash_algo }
    }
}

/// A version 4 signature packet, per Section 5.2 of RFC 4880.
#[derive(Debug, Clone, PartialEq, Eq, std::hash::Hash)]
pub struct Signature4 {
    pub(crate) common: packet::Common,
    pub(crate) fields: SignatureFields,
    pub(crate) areas: SubpacketAreas,
    /// The first two bytes of the hashed digest, used as a quick
    /// sanity check before a full verification.
    digest_prefix: [u8; 2],
    mpis: crate::crypto::mpi::Signature,
}

// `Deref`/`DerefMut` to `SignatureFields`, plus the `version`/`typ`/
// `pk_algo`/`hash_algo` forwarders, live in `subpacket.rs` alongside
// the rest of this type's accessors.
impl Signature4 {
    /// Returns the signature's hashed subpacket area.
    pub fn hashed_area(&self) -> &SubpacketArea {
        self.areas.hashed_area()
    }

    /// Returns the signature's unhashed subpacket area.
    pub fn unhashed_area(&self) -> &SubpacketArea {
        self.areas.unhashed_area()
    }

    /// Returns the raw signature MPIs.
    pub fn mpis(&self) -> &crate::crypto::mpi::Signature {
        &self.mpis
    }

    /// Returns the first two bytes of the signed digest.
    ///
    /// Used as a quick check before running a full (and potentially
    /// expensive) signature verification.
    pub fn digest_prefix(&self) -> [u8; 2] {
        self.digest_prefix
    }

    /// Returns the value of the Signature Creation Time subpacket.
    pub fn signature_creation_time(&self) -> Option<SystemTime> {
        self.areas.signature_creation_time()
    }

    /// Returns the value of the Signature Expiration Time subpacket,
    /// converted to an absolute point in time.
    pub fn signature_expiration_time(&self) -> Option<SystemTime> {
        self.areas.signature_expiration_time()
    }

    /// Returns whether the signature is alive at the given time.
    pub fn signature_alive<T, U>(&self, time: T, tolerance: U) -> Result<()>
        where T: Into<Option<SystemTime>>, U: Into<Option<std::time::Duration>>
    {
        self.areas.signature_alive(time, tolerance)
    }

    /// Returns the time when `key` (whose validity this signature
    /// asserts) expires.
    pub fn key_expiration_time(&self, key: &Key) -> Option<SystemTime> {
        self.areas.key_expiration_time(key)
    }

    /// Returns whether `key` is alive at `t`, per this signature's
    /// key validity period.
    pub fn key_alive<T>(&self, key: &Key, t: T) -> Result<()>
        where T: Into<Option<SystemTime>>
    {
        self.areas.key_alive(key, t)
    }

    /// Returns the value of the Issuer subpacket.
    pub fn issuer(&self) -> Option<&KeyID> {
        self.areas.issuer()
    }

    /// Returns the value of the Issuer Fingerprint subpacket.
    pub fn issuer_fingerprint(&self) -> Option<&Fingerprint> {
        self.areas.issuer_fingerprint()
    }

    /// Returns the value of the Embedded Signature subpacket.
    pub fn embedded_signature(&self) -> Option<&Signature> {
        self.areas.embedded_signature()
    }

    /// Hashes this signature's "to be signed" data into `ctx`, per
    /// Section 5.2.4 of RFC 4880: the fixed fields, the hashed
    /// subpacket area, and a version-specific trailer covering their
    /// combined length.
    fn hash_signature_data(&self, ctx: &mut hash::Context) -> Result<()> {
        use crate::serialize::MarshalInto;

        ctx.update([self.fields.version, self.fields.sigtype.octet(),
                    self.fields.pk_algo.octet(), self.fields.hash_algo.octet()]);

        let hashed = self.areas.hashed_area().to_vec()?;
        ctx.update((hashed.len() as u16).to_be_bytes());
        ctx.update(&hashed);

        let len = 4 + 2 + hashed.len();
        ctx.update([4u8, 0xff]);
        ctx.update((len as u32).to_be_bytes());
        Ok(())
    }

    /// Verifies this signature over a pre-hashed digest, matching it
    /// against `key`'s public key material.
    pub fn verify_digest(&self, key: &Key, digest: &[u8]) -> Result<()> {
        if digest.len() < 2 || digest[..2] != self.digest_prefix[..] {
            return Err(Error::BadSignature("digest prefix mismatch".into()).into());
        }
        crate::crypto::sign::verify(key.mpis(), self.fields.hash_algo, digest, &self.mpis)
    }

    /// Verifies this signature given a hash context that has already
    /// absorbed the signed data (and, for a binding or certification
    /// signature, the key material or User ID it binds).
    pub fn verify(&self, key: &Key, mut hash: hash::Context) -> Result<()> {
        self.hash_signature_data(&mut hash)?;
        let digest = hash.digest();
        self.verify_digest(key, &digest)
    }

    /// Writes this packet's body, per [Section 5.2.3 of RFC 4880].
    ///
    /// [Section 5.2.3 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.2.3
    pub(crate) fn serialize_body(&self, sink: &mut dyn io::Write) -> Result<()> {
        sink.write_all(&[self.fields.version, self.fields.sigtype.octet(),
                          self.fields.pk_algo.octet(),
                          self.fields.hash_algo.octet()])?;

        let hashed = self.areas.hashed_area().to_vec()?;
        sink.write_all(&(hashed.len() as u16).to_be_bytes())?;
        sink.write_all(&hashed)?;

        let unhashed = self.areas.unhashed_area().to_vec()?;
        sink.write_all(&(unhashed.len() as u16).to_be_bytes())?;
        sink.write_all(&unhashed)?;

        sink.write_all(&self.digest_prefix)?;
        self.mpis.serialize(sink)?;
        Ok(())
    }
}

impl Marshal for Signature4 {
    fn serialize(&self, sink: &mut dyn io::Write) -> Result<()> {
        self.serialize_body(sink)
    }
}

impl Signature4 {
    /// Assembles a signature packet from parsed fields, subpacket
    /// areas, digest prefix, and MPIs.
    pub(crate) fn from_parts(fields: SignatureFields, areas: SubpacketAreas,
                              digest_prefix: [u8; 2],
                              mpis: crate::crypto::mpi::Signature) -> Self {
        Signature4 {
            common: Default::default(),
            fields,
            areas,
            digest_prefix,
            mpis,
        }
    }
}

/// A signature packet.
///
/// This crate only emits and fully supports the version 4 format; V3
/// signatures are parsed for read compatibility but cannot be
/// produced.
#[derive(Debug, Clone, PartialEq, Eq, std::hash::Hash)]
#[non_exhaustive]
pub enum Signature {
    /// Version 4 signature.
    V4(Signature4),
}

impl Deref for Signature {
    type Target = Signature4;

    fn deref(&self) -> &Self::Target {
        match self {
            Signature::V4(s) => s,
        }
    }
}

impl DerefMut for Signature {
    fn deref_mut(&mut self) -> &mut Self::Target {
        match self {
            Signature::V4(s) => s,
        }
    }
}

impl From<Signature4> for Signature {
    fn from(s: Signature4) -> Self {
        Signature::V4(s)
    }
}

impl From<Signature> for Packet {
    fn from(s: Signature) -> Self {
        Packet::Signature(s)
    }
}

impl Hash for Signature4 {
    fn hash(&self, ctx: &mut hash::Context) {
        use crate::serialize::MarshalInto;
        // Framed the way a top-level packet body is framed when one
        // signature is hashed as data by another (third-party
        // confirmations, embedded signatures).
        if let Ok(body) = self.to_vec() {
            ctx.update([0x88]);
            ctx.update((body.len() as u32).to_be_bytes());
            ctx.update(&body);
        }
    }
}

impl Hash for Signature {
    fn hash(&self, ctx: &mut hash::Context) {
        match self {
            Signature::V4(s) => s.hash(ctx),
        }
    }
}

/// A builder for [`Signature`]s.
///
/// Accumulates the fixed fields and the hashed/unhashed subpacket
/// areas, then signs a pre-hashed digest to produce a finished
/// [`Signature`].
#[derive(Debug, Clone)]
pub struct SignatureBuilder {
    version: u8,
    sigtype: SignatureType,
    pk_algo: PublicKeyAlgorithm,
    hash_algo: HashAlgorithm,
    pub(crate) hashed_area: SubpacketArea,
    pub(crate) unhashed_area: SubpacketArea,
    pub(crate) overrode_creation_time: bool,
}

// Most of `SignatureArea`'s accessors (`signature_creation_time`,
// `signature_validity_period`, ...) are useful while building a
// signature too, so make them reachable through the hashed area
// rather than re-forwarding each one by hand.
impl Deref for SignatureBuilder {
    type Target = SubpacketArea;

    fn deref(&self) -> &Self::Target {
        &self.hashed_area
    }
}

impl SignatureBuilder {
    /// Creates a new builder for a signature of the given type.
    ///
    /// The hash algorithm defaults to SHA-512; use
    /// [`SignatureBuilder::set_hash_algo`] to change it.
    pub fn new(sigtype: SignatureType) -> Self {
        SignatureBuilder {
            version: 4,
            sigtype,
            pk_algo: PublicKeyAlgorithm::RSAEncryptSign,
            hash_algo: HashAlgorithm::SHA512,
            hashed_area: SubpacketArea::default(),
            unhashed_area: SubpacketArea::default(),
            overrode_creation_time: false,
        }
    }

    /// Returns the signature type this builder will produce.
    pub fn typ(&self) -> SignatureType {
        self.sigtype
    }

    /// Sets the hash algorithm used to create the signature.
    pub fn set_hash_algo(mut self, algo: HashAlgorithm) -> Self {
        self.hash_algo = algo;
        self
    }

    /// Returns the hash algorithm this builder will sign with.
    pub fn hash_algo(&self) -> HashAlgorithm {
        self.hash_algo
    }

    /// Returns the public-key algorithm this builder will stamp the
    /// signature with. Overwritten by [`SignatureBuilder::sign_hash`]
    /// to match the actual signer.
    pub fn pk_algo(&self) -> PublicKeyAlgorithm {
        self.pk_algo
    }

    /// Returns a reference to the hashed subpacket area being built.
    pub fn hashed_area(&self) -> &SubpacketArea {
        &self.hashed_area
    }

    /// Returns a mutable reference to the hashed subpacket area.
    pub fn hashed_area_mut(&mut self) -> &mut SubpacketArea {
        &mut self.hashed_area
    }

    /// Returns a reference to the unhashed subpacket area being built.
    pub fn unhashed_area(&self) -> &SubpacketArea {
        &self.unhashed_area
    }

    /// Returns a mutable reference to the unhashed subpacket area.
    pub fn unhashed_area_mut(&mut self) -> &mut SubpacketArea {
        &mut self.unhashed_area
    }

    /// Signs a pre-hashed digest context with `signer`'s secret key
    /// material, producing a finished [`Signature`].
    ///
    /// Unless the caller already stamped a Signature Creation Time
    /// subpacket, this stamps the hashed area with the current time
    /// before signing.
    pub fn sign_hash(mut self, signer: &mut KeyPair, mut hash: hash::Context) -> Result<Signature> {
        if !self.overrode_creation_time {
            self = self.set_signature_creation_time(SystemTime::now())?;
        }

        self.pk_algo = signer.public().pk_algo();

        let fields = SignatureFields::new(self.sigtype, self.pk_algo, self.hash_algo);
        let areas = SubpacketAreas::new(self.hashed_area, self.unhashed_area);

        let sig4_stub = Signature4 {
            common: Default::default(),
            fields,
            areas,
            digest_prefix: [0, 0],
            mpis: crate::crypto::mpi::Signature::Unknown {
                mpis: Vec::new().into_boxed_slice(),
                rest: Vec::new().into_boxed_slice(),
            },
        };
        sig4_stub.hash_signature_data(&mut hash)?;
        let digest = hash.digest();

        let mpis = signer.sign_hash(self.hash_algo, &digest)?;

        Ok(Signature::V4(Signature4 {
            digest_prefix: [digest[0], digest[1]],
            mpis,
            ..sig4_stub
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::key::Key4;
    use crate::types::Curve;

    #[test]
    fn sign_verify_roundtrip() {
        let key: Key4 = Key4::generate_ecc(true, Curve::Ed25519).unwrap();
        let mut keypair = key.clone().into_keypair().unwrap();

        let builder = SignatureBuilder::new(SignatureType::Binary)
            .set_hash_algo(HashAlgorithm::SHA256);
        let doc_hash = HashAlgorithm::SHA256.context().unwrap();
        let sig = builder.sign_hash(&mut keypair, doc_hash.clone()).unwrap();

        if let Signature::V4(sig4) = &sig {
            sig4.verify(&key, doc_hash).unwrap();
        } else {
            panic!("expected a V4 signature");
        }
    }
}
