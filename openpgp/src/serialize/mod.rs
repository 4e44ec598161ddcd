//! Serializes OpenPGP packets back into their wire format.
//!
//! [`Marshal`] writes a value to an `io::Write` sink; [`MarshalInto`]
//! builds on top of it for callers who want an owned buffer or need
//! to know the serialized length up front (e.g. to size a header).
//!
//! See [Section 4 and 5 of RFC 4880] for the wire format this module
//! produces.
//!
//! [Section 4 and 5 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-4

use std::io;

use crate::packet::header;
use crate::Packet;
use crate::Result;

/// Serializes a value to a `std::io::Write`r.
pub trait Marshal {
    /// Writes a serialized version of the object to `sink`.
    fn serialize(&self, sink: &mut dyn io::Write) -> Result<()>;
}

/// Serializes a value, and computes the length of the serialized
/// representation without allocating.
///
/// A blanket implementation based on [`Marshal::serialize`] is
/// provided for every type that implements it; types that can cheaply
/// compute their length without actually encoding (e.g. a packet
/// whose body length is a sum of known-size fields) may override
/// [`serialized_len`] to avoid the extra allocation.
///
/// [`serialized_len`]: MarshalInto::serialized_len()
pub trait MarshalInto: Marshal {
    /// Computes the length of the serialized representation.
    fn serialized_len(&self) -> usize {
        let mut counter = WriteCounter(0);
        // A `WriteCounter` never fails, so this is safe to unwrap.
        self.serialize(&mut counter).expect("counting writes never fails");
        counter.0
    }

    /// Exports a serialized version of the object into a new vector.
    fn to_vec(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.serialized_len());
        self.serialize(&mut buf)?;
        Ok(buf)
    }
}

impl<T: Marshal + ?Sized> MarshalInto for T {}

/// A sink that only counts the bytes written to it.
struct WriteCounter(usize);

impl io::Write for WriteCounter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0 += buf.len();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Encodes a new-format OpenPGP MPI: a two-octet, big-endian bit
/// count followed by the value, without leading zero octets.
///
/// See [Section 3.2 of RFC 4880].
///
/// [Section 3.2 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-3.2
pub(crate) fn write_mpi(sink: &mut dyn io::Write, bits: usize, value: &[u8])
    -> Result<()>
{
    sink.write_all(&(bits as u16).to_be_bytes())?;
    sink.write_all(value)?;
    Ok(())
}

impl Marshal for Packet {
    fn serialize(&self, sink: &mut dyn io::Write) -> Result<()> {
        let mut body = Vec::new();
        match self {
            Packet::Unknown(p) => body.extend_from_slice(p.body()),
            Packet::Signature(p) => p.serialize_body(&mut body)?,
            Packet::OnePassSig(p) => p.serialize_body(&mut body)?,
            Packet::PKESK(p) => p.serialize_body(&mut body)?,
            Packet::SKESK(p) => p.serialize_body(&mut body)?,
            Packet::PublicKey(p) | Packet::PublicSubkey(p) =>
                p.serialize_public_body(&mut body)?,
            Packet::SecretKey(p) | Packet::SecretSubkey(p) =>
                p.serialize_secret_body(&mut body)?,
            Packet::UserID(p) => body.extend_from_slice(p.value()),
            Packet::UserAttribute(p) => body.extend_from_slice(p.value()),
            Packet::Literal(p) => p.serialize_body(&mut body)?,
            Packet::CompressedData(p) => p.serialize_body(&mut body)?,
            Packet::SEIP(p) => body.extend_from_slice(p.body()),
            Packet::AED(p) => p.serialize_body(&mut body)?,
            Packet::Marker(_) => body.extend_from_slice(&crate::packet::marker::BODY),
            Packet::Trust(p) => body.extend_from_slice(p.value()),
        }

        header::write_new_format(sink, self.tag(), &body)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_counter_matches_vec_len() {
        let mut counter = WriteCounter(0);
        let mut buf = Vec::new();
        let data = b"hello world";
        io::Write::write_all(&mut counter, data).unwrap();
        io::Write::write_all(&mut buf, data).unwrap();
        assert_eq!(counter.0, buf.len());
    }
}
