//! Packet-related types.
//!
//! An OpenPGP message, keyring, or certificate is a sequence of
//! packets, some of which contain other packets, forming a tree.
//! This module defines the packet tag, the [`Packet`] enum that
//! wraps every concrete packet type, and the small bits of state
//! (`Common`, `Iter`) shared across packet implementations.
//!
//! See [Section 4 of RFC 4880] for the packet framing, and [Section
//! 5] for the packet bodies.
//!
//! [Section 4 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-4
//! [Section 5]: https://tools.ietf.org/html/rfc4880#section-5

use std::fmt;
use std::slice;

use crate::Result;

pub mod header;
pub use header::{BodyLength, CTB};

#[macro_use]
pub(crate) mod container;
pub(crate) use container::Container;

pub mod signature;
pub use self::signature::Signature;

pub mod key;
pub use self::key::{Key, PublicKey, SecretKey, Key4};

pub mod userid;
pub use userid::UserID;

mod user_attribute;
pub use user_attribute::UserAttribute;

mod trust;
pub use trust::Trust;

mod literal;
pub use literal::Literal;

mod compressed_data;
pub use compressed_data::CompressedData;

mod onepass_sig;
pub use onepass_sig::OnePassSig;

mod pkesk;
pub use pkesk::PKESK;

mod skesk;
pub use skesk::SKESK;

mod marker;
pub use marker::Marker;

pub mod aed;
pub use aed::AED1;

pub mod seip;
pub use seip::SEIP1;

mod unknown;
pub use unknown::Unknown;

/// The packet tag, i.e. the type of a packet as encoded on the wire.
///
/// See [Section 4.3 of RFC 4880].
///
/// [Section 4.3 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-4.3
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tag {
    /// Reserved, a packet with this tag is malformed.
    Reserved,
    /// Public-Key Encrypted Session Key packet.
    PKESK,
    /// Signature packet.
    Signature,
    /// Symmetric-Key Encrypted Session Key packet.
    SKESK,
    /// One-Pass Signature packet.
    OnePassSig,
    /// Secret-Key packet.
    SecretKey,
    /// Public-Key packet.
    PublicKey,
    /// Secret-Subkey packet.
    SecretSubkey,
    /// Compressed Data packet.
    CompressedData,
    /// Symmetrically Encrypted Data packet.
    SED,
    /// Marker packet.
    Marker,
    /// Literal Data packet.
    Literal,
    /// Trust packet.
    Trust,
    /// User ID packet.
    UserID,
    /// Public-Subkey packet.
    PublicSubkey,
    /// User Attribute packet.
    UserAttribute,
    /// Symmetrically Encrypted and Integrity Protected Data packet.
    SEIP,
    /// Modification Detection Code packet.
    MDC,
    /// AEAD Encrypted Data packet (RFC 4880bis).
    AED,
    /// Unknown tag.
    Unknown(u8),
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Tag::Reserved => write!(f, "Reserved"),
            Tag::PKESK => write!(f, "PKESK"),
            Tag::Signature => write!(f, "Signature"),
            Tag::SKESK => write!(f, "SKESK"),
            Tag::OnePassSig => write!(f, "OnePassSig"),
            Tag::SecretKey => write!(f, "SecretKey"),
            Tag::PublicKey => write!(f, "PublicKey"),
            Tag::SecretSubkey => write!(f, "SecretSubkey"),
            Tag::CompressedData => write!(f, "CompressedData"),
            Tag::SED => write!(f, "SED"),
            Tag::Marker => write!(f, "Marker"),
            Tag::Literal => write!(f, "Literal"),
            Tag::Trust => write!(f, "Trust"),
            Tag::UserID => write!(f, "UserID"),
            Tag::PublicSubkey => write!(f, "PublicSubkey"),
            Tag::UserAttribute => write!(f, "UserAttribute"),
            Tag::SEIP => write!(f, "SEIP"),
            Tag::MDC => write!(f, "MDC"),
            Tag::AED => write!(f, "AED"),
            Tag::Unknown(n) => write!(f, "Unknown({})", n),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl From<u8> for Tag {
    fn from(u: u8) -> Self {
        match u {
            0 => Tag::Reserved,
            1 => Tag::PKESK,
            2 => Tag::Signature,
            3 => Tag::SKESK,
            4 => Tag::OnePassSig,
            5 => Tag::SecretKey,
            6 => Tag::PublicKey,
            7 => Tag::SecretSubkey,
            8 => Tag::CompressedData,
            9 => Tag::SED,
            10 => Tag::Marker,
            11 => Tag::Literal,
            12 => Tag::Trust,
            13 => Tag::UserID,
            14 => Tag::PublicSubkey,
            17 => Tag::UserAttribute,
            18 => Tag::SEIP,
            19 => Tag::MDC,
            20 => Tag::AED,
            n => Tag::Unknown(n),
        }
    }
}

impl From<Tag> for u8 {
    fn from(t: Tag) -> Self {
        match t {
            Tag::Reserved => 0,
            Tag::PKESK => 1,
            Tag::Signature => 2,
            Tag::SKESK => 3,
            Tag::OnePassSig => 4,
            Tag::SecretKey => 5,
            Tag::PublicKey => 6,
            Tag::SecretSubkey => 7,
            Tag::CompressedData => 8,
            Tag::SED => 9,
            Tag::Marker => 10,
            Tag::Literal => 11,
            Tag::Trust => 12,
            Tag::UserID => 13,
            Tag::PublicSubkey => 14,
            Tag::UserAttribute => 17,
            Tag::SEIP => 18,
            Tag::MDC => 19,
            Tag::AED => 20,
            Tag::Unknown(n) => n,
        }
    }
}

/// Fields shared by every packet, regardless of its type.
///
/// Currently empty; reserved so that cross-cutting packet state
/// (e.g. a future "this packet used the deprecated length encoding"
/// flag) has somewhere to live without changing every packet struct's
/// field list.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Common {}

/// A version-dispatching wrapper around the AEAD Encrypted Data
/// packet body.
///
/// See [`AED1`] for the only defined version.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum AED {
    /// Version 1 of the format.
    V1(AED1),
}

impl std::ops::Deref for AED {
    type Target = AED1;
    fn deref(&self) -> &Self::Target {
        match self { AED::V1(p) => p }
    }
}

impl std::ops::DerefMut for AED {
    fn deref_mut(&mut self) -> &mut Self::Target {
        match self { AED::V1(p) => p }
    }
}

/// A version-dispatching wrapper around the Symmetrically Encrypted
/// and Integrity Protected Data packet body.
///
/// See [`SEIP1`] for the only defined version.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum SEIP {
    /// Version 1 of the format.
    V1(SEIP1),
}

impl std::ops::Deref for SEIP {
    type Target = SEIP1;
    fn deref(&self) -> &Self::Target {
        match self { SEIP::V1(p) => p }
    }
}

impl std::ops::DerefMut for SEIP {
    fn deref_mut(&mut self) -> &mut Self::Target {
        match self { SEIP::V1(p) => p }
    }
}

/// An OpenPGP packet.
///
/// This enum wraps every concrete packet type this crate knows how
/// to parse and emit. See [Section 4.3 of RFC 4880] for the complete
/// list of defined packet tags.
///
/// [Section 4.3 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-4.3
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Packet {
    /// Unknown packet, kept as raw bytes together with the reason it
    /// could not be parsed.
    Unknown(Unknown),
    /// Signature packet.
    Signature(Signature),
    /// One-Pass Signature packet.
    OnePassSig(OnePassSig),
    /// Public-Key Encrypted Session Key packet.
    PKESK(PKESK),
    /// Symmetric-Key Encrypted Session Key packet.
    SKESK(SKESK),
    /// Primary public key.
    PublicKey(Key4),
    /// Primary secret key.
    SecretKey(Key4),
    /// Subkey public key.
    PublicSubkey(Key4),
    /// Subkey secret key.
    SecretSubkey(Key4),
    /// User ID packet.
    UserID(UserID),
    /// User Attribute packet.
    UserAttribute(UserAttribute),
    /// Literal Data packet.
    Literal(Literal),
    /// Compressed Data packet.
    CompressedData(CompressedData),
    /// Symmetrically Encrypted and Integrity Protected Data packet.
    SEIP(SEIP),
    /// AEAD Encrypted Data packet.
    AED(AED),
    /// Marker packet.
    Marker(Marker),
    /// Trust packet.
    Trust(Trust),
}

impl Packet {
    /// Returns the packet's tag.
    pub fn tag(&self) -> Tag {
        match self {
            Packet::Unknown(p) => p.tag(),
            Packet::Signature(_) => Tag::Signature,
            Packet::OnePassSig(_) => Tag::OnePassSig,
            Packet::PKESK(_) => Tag::PKESK,
            Packet::SKESK(_) => Tag::SKESK,
            Packet::PublicKey(_) => Tag::PublicKey,
            Packet::SecretKey(_) => Tag::SecretKey,
            Packet::PublicSubkey(_) => Tag::PublicSubkey,
            Packet::SecretSubkey(_) => Tag::SecretSubkey,
            Packet::UserID(_) => Tag::UserID,
            Packet::UserAttribute(_) => Tag::UserAttribute,
            Packet::Literal(_) => Tag::Literal,
            Packet::CompressedData(_) => Tag::CompressedData,
            Packet::SEIP(_) => Tag::SEIP,
            Packet::AED(_) => Tag::AED,
            Packet::Marker(_) => Tag::Marker,
            Packet::Trust(_) => Tag::Trust,
        }
    }
}

/// An iterator over a packet (or packet pile's) descendants, visited
/// in depth-first order.
#[derive(Default)]
pub struct Iter<'a> {
    pub(crate) children: slice::Iter<'a, Packet>,
    pub(crate) child: Option<Box<Packet>>,
    pub(crate) grandchildren: Option<Box<Iter<'a>>>,
    pub(crate) depth: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Packet;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(ref mut grandchildren) = self.grandchildren {
            if let Some(p) = grandchildren.next() {
                return Some(p);
            }
            self.grandchildren = None;
        }

        let child = self.children.next()?;
        self.grandchildren =
            Some(Box::new(child.descendants()));
        Some(child)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_roundtrip() {
        for t in 0u8..=21 {
            assert_eq!(u8::from(Tag::from(t)), t);
        }
    }
}
