//! One-Pass Signature packets.
//!
//! A One-Pass Signature packet precedes the signed data in a stream,
//! announcing the signature that follows it so that a verifier does
//! not need to buffer the whole message. See [Section 5.4 of RFC
//! 4880] for details.
//!
//! [Section 5.4 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.4

use std::io;

use crate::packet;
use crate::types::{HashAlgorithm, PublicKeyAlgorithm, SignatureType};
use crate::KeyID;
use crate::Packet;
use crate::Result;

/// Holds a one-pass signature packet.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OnePassSig {
    pub(crate) common: packet::Common,
    version: u8,
    sigtype: SignatureType,
    hash_algo: HashAlgorithm,
    pk_algo: PublicKeyAlgorithm,
    issuer: KeyID,
    last: bool,
}

impl OnePassSig {
    /// Creates a new one-pass signature packet.
    pub fn new(sigtype: SignatureType) -> Self {
        OnePassSig {
            common: Default::default(),
            version: 3,
            sigtype,
            hash_algo: HashAlgorithm::SHA512,
            pk_algo: PublicKeyAlgorithm::RSAEncryptSign,
            issuer: KeyID::wildcard(),
            last: true,
        }
    }

    /// Returns the packet version.
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Returns the signature type this packet announces.
    pub fn typ(&self) -> SignatureType {
        self.sigtype
    }

    /// Sets the signature type this packet announces.
    pub fn set_type(&mut self, sigtype: SignatureType) -> SignatureType {
        std::mem::replace(&mut self.sigtype, sigtype)
    }

    /// Returns the hash algorithm used to compute the signature.
    pub fn hash_algo(&self) -> HashAlgorithm {
        self.hash_algo
    }

    /// Sets the hash algorithm used to compute the signature.
    pub fn set_hash_algo(&mut self, algo: HashAlgorithm) -> HashAlgorithm {
        std::mem::replace(&mut self.hash_algo, algo)
    }

    /// Returns the public-key algorithm of the issuer.
    pub fn pk_algo(&self) -> PublicKeyAlgorithm {
        self.pk_algo
    }

    /// Sets the public-key algorithm of the issuer.
    pub fn set_pk_algo(&mut self, algo: PublicKeyAlgorithm) -> PublicKeyAlgorithm {
        std::mem::replace(&mut self.pk_algo, algo)
    }

    /// Returns the issuer's Key ID.
    pub fn issuer(&self) -> &KeyID {
        &self.issuer
    }

    /// Sets the issuer's Key ID.
    pub fn set_issuer(&mut self, issuer: KeyID) -> KeyID {
        std::mem::replace(&mut self.issuer, issuer)
    }

    /// Returns whether this is the last one-pass signature before the
    /// signed data, i.e. the first one to be verified.
    pub fn last(&self) -> bool {
        self.last
    }

    /// Sets whether this is the last one-pass signature before the
    /// signed data.
    pub fn set_last(&mut self, last: bool) -> bool {
        std::mem::replace(&mut self.last, last)
    }

    /// Writes this packet's body, per [Section 5.4 of RFC 4880].
    ///
    /// [Section 5.4 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.4
    pub(crate) fn serialize_body(&self, sink: &mut dyn io::Write) -> Result<()> {
        sink.write_all(&[
            self.version,
            self.sigtype.octet(),
            self.hash_algo.octet(),
            self.pk_algo.octet(),
        ])?;
        sink.write_all(self.issuer.as_bytes())?;
        sink.write_all(&[if self.last { 1 } else { 0 }])?;
        Ok(())
    }
}

impl From<OnePassSig> for Packet {
    fn from(p: OnePassSig) -> Self {
        Packet::OnePassSig(p)
    }
}
