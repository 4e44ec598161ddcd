//! Small wire types shared by several [MODULE]-less corners of the
//! type system: validity periods, the AEAD algorithm registry, and
//! the revocation-key subpacket payload.

use std::convert::TryFrom;
use std::fmt;
use std::time;

use crate::{Error, Result};

/// A difference between two points in time, in whole seconds, as
/// used by the Signature/Key Expiration Time subpackets.
///
/// A value of zero means "does not expire".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Duration(u32);

impl Duration {
    /// Returns the number of seconds.
    pub fn as_secs(&self) -> u64 {
        self.0 as u64
    }
}

impl From<u32> for Duration {
    fn from(v: u32) -> Self {
        Duration(v)
    }
}

impl From<Duration> for u32 {
    fn from(v: Duration) -> Self {
        v.0
    }
}

impl TryFrom<time::Duration> for Duration {
    type Error = anyhow::Error;

    fn try_from(d: time::Duration) -> Result<Self> {
        u32::try_from(d.as_secs())
            .map(Duration)
            .map_err(|_| Error::InvalidArgument("duration overflows u32".into()).into())
    }
}

impl From<Duration> for time::Duration {
    fn from(d: Duration) -> Self {
        time::Duration::new(d.0 as u64, 0)
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

#[cfg(test)]
impl quickcheck::Arbitrary for Duration {
    fn arbitrary<G: quickcheck::Gen>(g: &mut G) -> Self {
        Duration(u32::arbitrary(g))
    }
}

/// An AEAD algorithm, per [Section 9.6 of RFC 4880bis].
///
/// [Section 9.6 of RFC 4880bis]: https://tools.ietf.org/html/draft-ietf-openpgp-rfc4880bis-08#section-9.6
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum AEADAlgorithm {
    /// EAX mode.
    EAX,
    /// OCB mode.
    OCB,
    /// An unknown algorithm, with its wire octet preserved.
    Unknown(u8),
}

impl AEADAlgorithm {
    /// Returns the wire octet.
    pub fn octet(&self) -> u8 {
        match self {
            AEADAlgorithm::EAX => 1,
            AEADAlgorithm::OCB => 2,
            AEADAlgorithm::Unknown(o) => *o,
        }
    }

    /// Parses the wire octet.
    pub fn from_octet(o: u8) -> Self {
        match o {
            1 => AEADAlgorithm::EAX,
            2 => AEADAlgorithm::OCB,
            o => AEADAlgorithm::Unknown(o),
        }
    }

    /// Returns the size, in octets, of this algorithm's authentication
    /// tag.
    pub fn digest_size(&self) -> Result<usize> {
        match self {
            AEADAlgorithm::EAX | AEADAlgorithm::OCB => Ok(16),
            AEADAlgorithm::Unknown(o) =>
                Err(Error::InvalidArgument(
                    format!("unknown AEAD algorithm {}", o)).into()),
        }
    }

    /// Returns the size, in octets, of this algorithm's initialization
    /// vector/nonce.
    pub(crate) fn iv_size(&self) -> Result<usize> {
        match self {
            AEADAlgorithm::EAX | AEADAlgorithm::OCB => Ok(15),
            AEADAlgorithm::Unknown(o) =>
                Err(Error::InvalidArgument(
                    format!("unknown AEAD algorithm {}", o)).into()),
        }
    }
}

impl fmt::Display for AEADAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AEADAlgorithm::EAX => f.write_str("EAX"),
            AEADAlgorithm::OCB => f.write_str("OCB"),
            AEADAlgorithm::Unknown(o) => write!(f, "Unknown({})", o),
        }
    }
}

#[cfg(test)]
impl quickcheck::Arbitrary for AEADAlgorithm {
    fn arbitrary<G: quickcheck::Gen>(g: &mut G) -> Self {
        Self::from_octet(u8::arbitrary(g))
    }
}

/// The payload of a Revocation Key subpacket: a third party
/// authorized to issue revocations for this key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RevocationKey {
    class: u8,
    pk_algo: crate::types::PublicKeyAlgorithm,
    fp: crate::Fingerprint,
}

/// Sensitive, per RFC 4880: the relationship should not be revealed
/// without the key holder's consent.
const REVOCATION_KEY_CLASS_SENSITIVE: u8 = 0x40;
const REVOCATION_KEY_CLASS_MANDATORY: u8 = 0x80;

impl RevocationKey {
    /// Creates a new revocation key designation.
    pub fn new(pk_algo: crate::types::PublicKeyAlgorithm,
               fp: crate::Fingerprint, sensitive: bool) -> Self {
        let mut class = REVOCATION_KEY_CLASS_MANDATORY;
        if sensitive {
            class |= REVOCATION_KEY_CLASS_SENSITIVE;
        }
        RevocationKey { class, pk_algo, fp }
    }

    /// Creates a revocation key designation from a raw subpacket
    /// body, preserving the class octet verbatim.
    pub(crate) fn from_raw(class: u8, pk_algo: crate::types::PublicKeyAlgorithm,
                            fp: crate::Fingerprint) -> Self {
        RevocationKey { class, pk_algo, fp }
    }

    /// Returns the public-key algorithm of the designated key.
    pub fn pk_algo(&self) -> crate::types::PublicKeyAlgorithm {
        self.pk_algo
    }

    /// Returns the designated key's fingerprint.
    pub fn fingerprint(&self) -> &crate::Fingerprint {
        &self.fp
    }

    /// Returns whether this designation is marked sensitive.
    pub fn sensitive(&self) -> bool {
        self.class & REVOCATION_KEY_CLASS_SENSITIVE > 0
    }

    /// Returns the raw class octet.
    pub fn class(&self) -> u8 {
        self.class
    }
}

#[cfg(test)]
impl quickcheck::Arbitrary for RevocationKey {
    fn arbitrary<G: quickcheck::Gen>(g: &mut G) -> Self {
        let bytes: Vec<u8> = (0..20).map(|_| u8::arbitrary(g)).collect();
        RevocationKey::new(
            crate::types::PublicKeyAlgorithm::from_octet(u8::arbitrary(g)),
            crate::Fingerprint::from_bytes(&bytes),
            bool::arbitrary(g))
    }
}

/// The revocation code carried by a Reason For Revocation subpacket,
/// per Section 5.2.3.23 of RFC 4880.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ReasonForRevocation {
    /// No reason given.
    Unspecified,
    /// The key has been replaced by a new one.
    KeySuperseded,
    /// The secret key material has been compromised.
    KeyCompromised,
    /// The key is no longer used.
    KeyRetired,
    /// The user ID is no longer valid.
    UIDRetired,
    /// An unknown reason code.
    Unknown(u8),
}

impl From<u8> for ReasonForRevocation {
    fn from(c: u8) -> Self {
        match c {
            0 => ReasonForRevocation::Unspecified,
            1 => ReasonForRevocation::KeySuperseded,
            2 => ReasonForRevocation::KeyCompromised,
            3 => ReasonForRevocation::KeyRetired,
            32 => ReasonForRevocation::UIDRetired,
            c => ReasonForRevocation::Unknown(c),
        }
    }
}

impl From<ReasonForRevocation> for u8 {
    fn from(c: ReasonForRevocation) -> Self {
        match c {
            ReasonForRevocation::Unspecified => 0,
            ReasonForRevocation::KeySuperseded => 1,
            ReasonForRevocation::KeyCompromised => 2,
            ReasonForRevocation::KeyRetired => 3,
            ReasonForRevocation::UIDRetired => 32,
            ReasonForRevocation::Unknown(c) => c,
        }
    }
}

#[cfg(test)]
impl quickcheck::Arbitrary for ReasonForRevocation {
    fn arbitrary<G: quickcheck::Gen>(g: &mut G) -> Self {
        Self::from(u8::arbitrary(g))
    }
}
