//! Compressed data packets.
//!
//! See [Section 5.6 of RFC 4880] for details.
//!
//! [Section 5.6 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.6

use std::io;

use crate::packet;
use crate::serialize::Marshal;
use crate::types::CompressionAlgorithm;
use crate::Error;
use crate::Packet;
use crate::Result;

/// Holds a compressed data packet.
///
/// A compressed data packet is a container: once decompressed, its
/// body is itself a sequence of OpenPGP packets.
// IMPORTANT: If you add fields to this struct, you need to explicitly
// IMPORTANT: implement PartialEq, Eq, and Hash.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CompressedData {
    pub(crate) common: packet::Common,
    algo: CompressionAlgorithm,
    container: packet::Container,
}

impl_container_forwards!(CompressedData);

impl CompressedData {
    /// Creates a new compressed data packet using the given algorithm.
    pub fn new(algo: CompressionAlgorithm) -> Self {
        CompressedData {
            common: Default::default(),
            algo,
            container: Default::default(),
        }
    }

    /// Returns the compression algorithm used.
    pub fn algorithm(&self) -> CompressionAlgorithm {
        self.algo
    }

    /// Sets the compression algorithm used.
    pub fn set_algorithm(&mut self, algo: CompressionAlgorithm) -> CompressionAlgorithm {
        std::mem::replace(&mut self.algo, algo)
    }

    /// Adds a new packet to the container, returning `self` for
    /// chaining.
    pub fn push(mut self, packet: Packet) -> Self {
        self.container.children_mut().push(packet);
        self
    }

    /// Writes this packet's body, per [Section 5.6 of RFC 4880].
    ///
    /// The uncompressed body is the concatenation of the serialized
    /// children; that stream is then compressed with [`algorithm`].
    ///
    /// [Section 5.6 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.6
    /// [`algorithm`]: CompressedData::algorithm()
    pub(crate) fn serialize_body(&self, sink: &mut dyn io::Write) -> Result<()> {
        sink.write_all(&[self.algo.octet()])?;

        let mut plain = Vec::new();
        for p in self.container.children() {
            p.serialize(&mut plain)?;
        }
        if plain.is_empty() {
            plain.extend_from_slice(self.container.body());
        }

        match self.algo {
            CompressionAlgorithm::Uncompressed => sink.write_all(&plain)?,
            #[cfg(feature = "compression-deflate")]
            CompressionAlgorithm::Zip => {
                let mut w = flate2::write::DeflateEncoder::new(
                    sink, flate2::Compression::default());
                io::Write::write_all(&mut w, &plain)?;
                w.finish()?;
            }
            #[cfg(feature = "compression-deflate")]
            CompressionAlgorithm::Zlib => {
                let mut w = flate2::write::ZlibEncoder::new(
                    sink, flate2::Compression::default());
                io::Write::write_all(&mut w, &plain)?;
                w.finish()?;
            }
            #[cfg(feature = "compression-bzip2")]
            CompressionAlgorithm::BZip2 => {
                let mut w = bzip2::write::BzEncoder::new(
                    sink, bzip2::Compression::default());
                io::Write::write_all(&mut w, &plain)?;
                w.finish()?;
            }
            _ => return Err(Error::UnsupportedCompressionAlgorithm(self.algo).into()),
        }

        Ok(())
    }
}

impl From<CompressedData> for Packet {
    fn from(p: CompressedData) -> Self {
        Packet::CompressedData(p)
    }
}
