//! User Attribute packets.
//!
//! A User Attribute packet is a sequence of subpackets, each of which
//! holds some image or other metadata about the owner. Only the JPEG
//! image subpacket is widely used. See [Section 5.12 of RFC 4880] for
//! details.
//!
//! [Section 5.12 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.12

use std::fmt;
use std::io;
#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

use crate::packet;
use crate::serialize::Marshal;
use crate::{Packet, Result};

/// Holds a User Attribute packet.
///
/// The subpacket structure is not parsed; callers that need to pick
/// apart the embedded image subpackets can do so via [`subpackets`].
///
/// [`subpackets`]: UserAttribute::subpackets()
#[derive(PartialEq, Eq, Hash, Clone)]
pub struct UserAttribute {
    pub(crate) common: packet::Common,
    value: Vec<u8>,
}

/// The one-octet subpacket type tag for a JPEG image, per Section
/// 5.12.1.
const JPEG_SUBPACKET_TYPE: u8 = 1;

impl From<Vec<u8>> for UserAttribute {
    fn from(u: Vec<u8>) -> Self {
        UserAttribute {
            common: Default::default(),
            value: u,
        }
    }
}

impl fmt::Display for UserAttribute {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "UserAttribute ({} bytes)", self.value.len())
    }
}

impl fmt::Debug for UserAttribute {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("UserAttribute")
            .field("value", &crate::fmt::hex::encode(&self.value))
            .finish()
    }
}

impl UserAttribute {
    /// Creates a new User Attribute packet from an already-encoded
    /// sequence of subpackets.
    pub fn new(subpackets: &[Subpacket]) -> Self {
        let mut value = Vec::new();
        for s in subpackets {
            let len = s.body.len();
            if len < 192 {
                value.push(len as u8);
            } else if len < 8384 {
                let len = len - 192;
                value.push(((len >> 8) + 192) as u8);
                value.push((len & 0xff) as u8);
            } else {
                value.push(255);
                value.extend_from_slice(&(len as u32).to_be_bytes());
            }
            value.push(s.tag);
            value.extend_from_slice(&s.body);
        }
        value.into()
    }

    /// Gets the User Attribute packet's raw value.
    pub fn value(&self) -> &[u8] {
        self.value.as_slice()
    }

    /// Iterates over the subpackets contained in this User Attribute.
    pub fn subpackets(&self) -> impl Iterator<Item = Subpacket> + '_ {
        SubpacketParser { data: &self.value }
    }
}

/// A single subpacket of a User Attribute, e.g. a JPEG image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Subpacket<'a> {
    tag: u8,
    body: std::borrow::Cow<'a, [u8]>,
}

impl<'a> Subpacket<'a> {
    /// Returns whether this subpacket holds a JPEG image.
    pub fn is_jpeg(&self) -> bool {
        self.tag == JPEG_SUBPACKET_TYPE
    }

    /// Returns the subpacket's body.
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

struct SubpacketParser<'a> {
    data: &'a [u8],
}

impl<'a> Iterator for SubpacketParser<'a> {
    type Item = Subpacket<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.data.is_empty() {
            return None;
        }

        let (len, rest) = match self.data[0] {
            n @ 0..=191 => (n as usize, &self.data[1..]),
            n @ 192..=254 if self.data.len() >= 2 => {
                let len = ((n as usize - 192) << 8) + self.data[1] as usize + 192;
                (len, &self.data[2..])
            }
            255 if self.data.len() >= 5 => {
                let len = u32::from_be_bytes([
                    self.data[1], self.data[2], self.data[3], self.data[4],
                ]) as usize;
                (len, &self.data[5..])
            }
            _ => {
                self.data = &[];
                return None;
            }
        };

        if rest.is_empty() || len == 0 || len > rest.len() {
            self.data = &[];
            return None;
        }

        let tag = rest[0];
        let body = &rest[1..len];
        self.data = &rest[len..];
        Some(Subpacket { tag, body: body.into() })
    }
}

impl From<UserAttribute> for Packet {
    fn from(s: UserAttribute) -> Self {
        Packet::UserAttribute(s)
    }
}

impl Marshal for UserAttribute {
    /// Writes this packet's body, per [Section 5.12 of RFC 4880].
    ///
    /// [Section 5.12 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.12
    fn serialize(&self, sink: &mut dyn io::Write) -> Result<()> {
        sink.write_all(&self.value)?;
        Ok(())
    }
}

#[cfg(test)]
impl Arbitrary for UserAttribute {
    fn arbitrary<G: Gen>(g: &mut G) -> Self {
        Vec::<u8>::arbitrary(g).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::Parse;
    use crate::serialize::MarshalInto;

    quickcheck! {
        fn roundtrip(p: UserAttribute) -> bool {
            let q = UserAttribute::from_bytes(&p.to_vec().unwrap()).unwrap();
            assert_eq!(p, q);
            true
        }
    }

    #[test]
    fn iterates_subpackets() {
        let mut body = vec![4u8, JPEG_SUBPACKET_TYPE];
        body.extend_from_slice(&[0xff, 0xd8, 0xff]);
        let ua = UserAttribute::from(body);
        let subs: Vec<_> = ua.subpackets().collect();
        assert_eq!(subs.len(), 1);
        assert!(subs[0].is_jpeg());
        assert_eq!(subs[0].body(), &[0xff, 0xd8, 0xff]);
    }
}
