//! Marker packets.
//!
//! A Marker packet's content is fixed; implementations emit it to
//! mark the start of an OpenPGP message stream and ignore it on
//! input. See [Section 5.8 of RFC 4880] for details.
//!
//! [Section 5.8 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.8

use crate::packet;
use crate::Packet;

/// The fixed body of a Marker packet: the three octets "PGP".
pub const BODY: [u8; 3] = [0x50, 0x47, 0x50];

/// Holds a marker packet.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Marker {
    pub(crate) common: packet::Common,
}

impl Marker {
    /// Creates a new marker packet.
    pub fn new() -> Self {
        Marker { common: Default::default() }
    }
}

impl From<Marker> for Packet {
    fn from(p: Marker) -> Self {
        Packet::Marker(p)
    }
}
