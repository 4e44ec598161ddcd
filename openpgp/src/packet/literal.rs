//! Literal data packets.
//!
//! See [Section 5.9 of RFC 4880] for details.
//!
//! [Section 5.9 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.9

use std::io;

use crate::packet;
use crate::types::{DataFormat, Timestamp};
use crate::Packet;
use crate::Result;

/// Holds a literal data packet.
///
/// A literal data packet is not a container: its content is simply
/// the packet's body.
// IMPORTANT: If you add fields to this struct, you need to explicitly
// IMPORTANT: implement PartialEq, Eq, and Hash.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Literal {
    pub(crate) common: packet::Common,
    format: DataFormat,
    filename: Option<Box<[u8]>>,
    date: Option<Timestamp>,
    container: packet::Container,
}

impl_body_forwards!(Literal);

impl Literal {
    /// Creates a new literal data packet of the given format.
    pub fn new(format: DataFormat) -> Self {
        Literal {
            common: Default::default(),
            format,
            filename: None,
            date: None,
            container: Default::default(),
        }
    }

    /// Gets the content's format.
    pub fn format(&self) -> DataFormat {
        self.format
    }

    /// Sets the content's format.
    pub fn set_format(&mut self, format: DataFormat) -> DataFormat {
        std::mem::replace(&mut self.format, format)
    }

    /// Gets the filename, if any.
    pub fn filename(&self) -> Option<&[u8]> {
        self.filename.as_deref()
    }

    /// Sets the filename.
    ///
    /// Fails if the filename is longer than 255 octets, as mandated
    /// by the packet format.
    pub fn set_filename(&mut self, filename: &[u8])
        -> crate::Result<Option<Box<[u8]>>>
    {
        if filename.len() > 255 {
            return Err(crate::Error::InvalidArgument(
                "filename exceeds 255 octets".into()).into());
        }
        Ok(std::mem::replace(&mut self.filename,
                              Some(filename.to_vec().into_boxed_slice())))
    }

    /// Gets the date, if any.
    pub fn date(&self) -> Option<std::time::SystemTime> {
        self.date.map(Into::into)
    }

    /// Sets the date.
    pub fn set_date<T>(&mut self, timestamp: T) -> Option<std::time::SystemTime>
        where T: Into<Option<std::time::SystemTime>>
    {
        use std::convert::TryFrom;
        let new = timestamp.into().and_then(|t| Timestamp::try_from(t).ok());
        std::mem::replace(&mut self.date, new).map(Into::into)
    }

    /// Writes this packet's body, per [Section 5.9 of RFC 4880].
    ///
    /// [Section 5.9 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.9
    pub(crate) fn serialize_body(&self, sink: &mut dyn io::Write) -> Result<()> {
        sink.write_all(&[self.format.octet()])?;

        let filename = self.filename.as_deref().unwrap_or(&[]);
        sink.write_all(&[filename.len() as u8])?;
        sink.write_all(filename)?;

        let date: u32 = self.date.map(Into::into).unwrap_or(0);
        sink.write_all(&date.to_be_bytes())?;

        sink.write_all(self.body())?;
        Ok(())
    }
}

impl From<Literal> for Packet {
    fn from(s: Literal) -> Self {
        Packet::Literal(s)
    }
}

#[cfg(test)]
impl quickcheck::Arbitrary for Literal {
    fn arbitrary<G: quickcheck::Gen>(g: &mut G) -> Self {
        let mut l = Literal::new(
            *g.choose(&[DataFormat::Binary, DataFormat::Text, DataFormat::Unicode])
                .unwrap());
        l.set_body(Vec::<u8>::arbitrary(g));
        l
    }
}
