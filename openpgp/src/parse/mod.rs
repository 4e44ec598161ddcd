//! Deserializes an OpenPGP packet stream into [`Packet`]s.
//!
//! A message is parsed one packet at a time by a pull-based
//! [`PacketParser`]: each call to [`PacketParser::next`] or
//! [`PacketParser::recurse`] consumes exactly one packet's header and
//! body from the underlying reader and hands back the constructed
//! [`Packet`] plus either another `PacketParser` positioned at the
//! next packet, or [`PacketParserEOF`] if the stream (at the current
//! nesting level) is exhausted.
//!
//! Containers -- [`CompressedData`](crate::packet::CompressedData),
//! `SEIP`, and `AED` packets -- carry their raw, still-encoded body
//! alongside them; [`PacketParser::recurse`] decompresses it and
//! descends into the packets nested inside, while
//! [`PacketParser::next`] always stays at the same nesting level.
//! [`PacketPile::from_packet_parser`](crate::PacketPile::from_packet_parser)
//! and [`PacketPileParser`] build the resulting tree for callers who
//! would rather have the whole message in memory.

use std::io::{self, Read};
use std::path::Path;

use buffered_reader::BufferedReader;

use crate::crypto::mpi;
use crate::crypto::s2k::S2K;
use crate::packet::{self, Container, Tag};
use crate::packet::header::{self, BodyLength, CTB};
use crate::packet::key::{Key4, KeyRole};
use crate::packet::signature::{Signature4, SignatureFields};
use crate::packet::{
    CompressedData, Literal, Marker, OnePassSig, PKESK, SKESK, Trust, Unknown,
    UserAttribute, UserID,
};
use crate::types::{CompressionAlgorithm, DataFormat, PublicKeyAlgorithm, SignatureType,
                    SymmetricAlgorithm, Timestamp};
use crate::{Error, Fingerprint, KeyID, Packet, Result};

pub mod subpacket;
pub mod mpis;
pub mod packet_pile_parser;

pub use packet_pile_parser::PacketPileParser;

/// The cookie threaded through the `BufferedReader` stack used by
/// this module.
///
/// `level` records the packet-nesting depth the reader was created
/// at; it has no effect on parsing and exists so that debugging
/// dumps of the reader stack can show where each layer came from.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Cookie {
    pub(crate) level: isize,
}

/// Deserializes a value of type `T` from a reader, a file, or a byte
/// buffer.
pub trait Parse<'a, T> {
    /// Deserializes `T` from `reader`.
    fn from_reader<R: 'a + Read>(reader: R) -> Result<T>;

    /// Deserializes `T` from the file named by `path`.
    fn from_file<P: AsRef<Path>>(path: P) -> Result<T> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Deserializes `T` from `data`.
    fn from_bytes<D: AsRef<[u8]> + ?Sized>(data: &'a D) -> Result<T>;
}

/// The result of advancing a [`PacketParser`]: either the next
/// packet, or the end of the stream at the current nesting level.
#[derive(Debug)]
pub enum PacketParserResult<'a> {
    /// A packet was parsed.
    Some(PacketParser<'a>),
    /// The stream is exhausted.
    EOF(PacketParserEOF),
}

impl<'a> PacketParserResult<'a> {
    /// Returns whether this holds a packet.
    pub fn is_some(&self) -> bool {
        matches!(self, PacketParserResult::Some(_))
    }

    /// Returns whether the stream is exhausted.
    pub fn is_none(&self) -> bool {
        !self.is_some()
    }

    /// Returns the wrapped `PacketParser`.
    ///
    /// # Panics
    ///
    /// Panics if this is [`PacketParserResult::EOF`].
    pub fn unwrap(self) -> PacketParser<'a> {
        match self {
            PacketParserResult::Some(pp) => pp,
            PacketParserResult::EOF(_) =>
                panic!("called `PacketParserResult::unwrap()` on an `EOF` value"),
        }
    }

    /// Returns the recursion depth of the packet that would be
    /// returned by [`unwrap`](Self::unwrap), if any.
    pub fn recursion_depth(&self) -> Option<isize> {
        match self {
            PacketParserResult::Some(pp) => Some(pp.recursion_depth),
            PacketParserResult::EOF(_) => None,
        }
    }

    /// Returns the recursion depth of the packet that was just
    /// parsed, whether or not this result holds a further packet.
    pub fn last_recursion_depth(&self) -> Option<isize> {
        match self {
            PacketParserResult::Some(pp) => Some(pp.recursion_depth),
            PacketParserResult::EOF(eof) => Some(eof.last_recursion_depth),
        }
    }
}

/// Signals that a [`PacketParser`] has reached the end of the stream
/// at a given nesting level.
#[derive(Debug)]
pub struct PacketParserEOF {
    last_recursion_depth: isize,
}

/// A recursive descent parser for an OpenPGP packet stream.
///
/// Each `PacketParser` holds exactly one already-parsed packet
/// ([`packet`](PacketParser::packet)) and the reader positioned right
/// after it. [`next`](PacketParser::next) reads this packet's next
/// sibling; [`recurse`](PacketParser::recurse) does the same, except
/// that if `packet` is a container (so far, only
/// [`CompressedData`](crate::packet::CompressedData)), it instead
/// descends into its first child.
pub struct PacketParser<'a> {
    /// The packet parsed by the previous step.
    pub packet: Packet,
    recursion_depth: isize,
    max_recursion_depth: u8,
    body_cursor: usize,
    reader: Box<dyn BufferedReader<Cookie> + 'a>,
    parents: Vec<Box<dyn BufferedReader<Cookie> + 'a>>,
}

impl<'a> std::fmt::Debug for PacketParser<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("PacketParser")
            .field("packet", &self.packet)
            .field("recursion_depth", &self.recursion_depth)
            .finish()
    }
}

impl<'a> PacketParser<'a> {
    /// Returns this packet's recursion depth.
    ///
    /// A top-level packet has depth 0; a packet nested one container
    /// deep has depth 1, and so on.
    pub fn recursion_depth(&self) -> isize {
        self.recursion_depth
    }

    /// Finishes parsing the current packet and returns the next one
    /// at the same recursion depth, without descending into it even
    /// if it is a container.
    pub fn next(self) -> Result<(Packet, PacketParserResult<'a>)> {
        let PacketParser { packet, recursion_depth, max_recursion_depth,
                            reader, mut parents, .. } = self;
        let ppr = advance(reader, &mut parents, recursion_depth,
                           max_recursion_depth)?;
        Ok((packet, ppr))
    }

    /// Finishes parsing the current packet and returns the next
    /// packet, descending into it first if it is a container whose
    /// contents this crate knows how to decode.
    pub fn recurse(self) -> Result<(Packet, PacketParserResult<'a>)> {
        let PacketParser { packet, recursion_depth, max_recursion_depth,
                            reader, mut parents, .. } = self;

        if recursion_depth + 1 <= max_recursion_depth as isize {
            if let Some(child) = decompressing_reader(&packet, recursion_depth + 1)? {
                parents.push(reader);
                let ppr = advance(child, &mut parents, recursion_depth + 1,
                                   max_recursion_depth)?;
                return Ok((packet, ppr));
            }
        }

        let ppr = advance(reader, &mut parents, recursion_depth,
                           max_recursion_depth)?;
        Ok((packet, ppr))
    }
}

impl<'a> Read for PacketParser<'a> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let body = self.packet.container_ref()
            .map(Container::body)
            .or_else(|| self.packet.body())
            .unwrap_or(&[]);
        if self.body_cursor >= body.len() {
            return Ok(0);
        }
        let n = std::cmp::min(buf.len(), body.len() - self.body_cursor);
        buf[..n].copy_from_slice(&body[self.body_cursor..self.body_cursor + n]);
        self.body_cursor += n;
        Ok(n)
    }
}

impl<'a> Parse<'a, PacketParserResult<'a>> for PacketParser<'a> {
    fn from_reader<R: 'a + Read>(reader: R) -> Result<PacketParserResult<'a>> {
        PacketParserBuilder::from_reader(reader)?.finalize()
    }

    fn from_bytes<D: AsRef<[u8]> + ?Sized>(data: &'a D) -> Result<PacketParserResult<'a>> {
        PacketParserBuilder::from_bytes(data)?.finalize()
    }
}

/// Reads one packet (header plus body) off `reader`, or pops back to
/// an enclosing container's reader at EOF.
///
/// This is the shared engine behind [`PacketParser::next`] and
/// [`PacketParser::recurse`]: both just decide which reader to pass
/// in (the current one, or a freshly created decompressing reader for
/// a child container), push the right number of parents, and let this
/// function do the EOF bookkeeping.
fn advance<'a>(
    mut reader: Box<dyn BufferedReader<Cookie> + 'a>,
    parents: &mut Vec<Box<dyn BufferedReader<Cookie> + 'a>>,
    mut recursion_depth: isize,
    max_recursion_depth: u8,
) -> Result<PacketParserResult<'a>> {
    loop {
        if reader.eof()? {
            match parents.pop() {
                Some(parent) => {
                    reader = parent;
                    recursion_depth -= 1;
                    continue;
                }
                None => {
                    return Ok(PacketParserResult::EOF(PacketParserEOF {
                        last_recursion_depth: recursion_depth,
                    }));
                }
            }
        }

        let ctb_octet = reader.data_consume_hard(1)?[0];
        let ctb = CTB::from_octet(ctb_octet)?;
        let body = if ctb.new_format {
            let first = header::read_new_format_length(&mut reader)?;
            header::read_new_format_body(&mut reader, first)?
        } else {
            let length_type = (ctb_octet >> 0) & 0x03;
            let len = header::read_old_format_length(&mut reader, length_type)?;
            header::read_old_format_body(&mut reader, len)?
        };

        let packet = packet_from_tag_and_body(ctb.tag, body);

        return Ok(PacketParserResult::Some(PacketParser {
            packet,
            recursion_depth,
            max_recursion_depth,
            body_cursor: 0,
            reader,
            parents: std::mem::take(parents),
        }));
    }
}

/// Returns a reader over the decompressed contents of `packet`, if it
/// is a container this crate knows how to recurse into.
///
/// Only [`CompressedData`](crate::packet::CompressedData) is handled
/// here: decrypting a `SEIP` or `AED` packet needs a session key,
/// which is a higher-level concern than this module's pull parser.
fn decompressing_reader<'a>(packet: &Packet, level: isize)
    -> Result<Option<Box<dyn BufferedReader<Cookie> + 'a>>>
{
    let cd = match packet {
        Packet::CompressedData(cd) => cd,
        _ => return Ok(None),
    };

    let bytes = cd.body().to_vec();
    let cookie = Cookie { level };
    let cursor = io::Cursor::new(bytes);
    let bio: Box<dyn BufferedReader<Cookie>> =
        Box::new(buffered_reader::Generic::with_cookie(cursor, cookie));

    let bio = match cd.algorithm() {
        CompressionAlgorithm::Uncompressed => bio,
        #[cfg(feature = "compression-deflate")]
        CompressionAlgorithm::Zip =>
            Box::new(buffered_reader::Deflate::new(bio)),
        #[cfg(feature = "compression-deflate")]
        CompressionAlgorithm::Zlib =>
            Box::new(buffered_reader::Zlib::new(bio)),
        #[cfg(feature = "compression-bzip2")]
        CompressionAlgorithm::BZip2 =>
            Box::new(buffered_reader::Bzip::new(bio)),
        _ => return Err(Error::UnsupportedCompressionAlgorithm(
            cd.algorithm()).into()),
    };

    Ok(Some(bio))
}

/// Constructs a [`Packet`] from a raw, already length-delimited body.
///
/// Never fails: any tag this crate doesn't represent, or any body
/// that doesn't parse as its tag demands, becomes a
/// [`Packet::Unknown`] carrying the original bytes so that the
/// surrounding message is not lost.
fn packet_from_tag_and_body(tag: Tag, body: Vec<u8>) -> Packet {
    match parse_known_packet(tag, &body) {
        Ok(Some(packet)) => packet,
        Ok(None) => {
            let mut u = Unknown::new(tag, Error::UnknownTag(u8::from(tag)).into());
            u.set_body(body);
            u.into()
        }
        Err(e) => {
            let mut u = Unknown::new(tag, e);
            u.set_body(body);
            u.into()
        }
    }
}

/// Parses `body` according to `tag`.
///
/// Returns `Ok(None)` for a tag this crate has no `Packet` variant
/// for (`Reserved`, `SED`, `MDC`, or an unassigned tag number).
fn parse_known_packet(tag: Tag, body: &[u8]) -> Result<Option<Packet>> {
    Ok(Some(match tag {
        Tag::Signature => parse_signature(body)?.into(),
        Tag::OnePassSig => parse_one_pass_sig(body)?.into(),
        Tag::PKESK => parse_pkesk(body)?.into(),
        Tag::SKESK => parse_skesk(body)?.into(),
        Tag::PublicKey => parse_public_key(body, KeyRole::Primary)?.into(),
        Tag::PublicSubkey => parse_public_key(body, KeyRole::Subordinate)?.into(),
        Tag::SecretKey => parse_secret_key(body, KeyRole::Primary)?.into(),
        Tag::SecretSubkey => parse_secret_key(body, KeyRole::Subordinate)?.into(),
        Tag::UserID => UserID::from(body.to_vec()).into(),
        Tag::UserAttribute => UserAttribute::from(body.to_vec()).into(),
        Tag::Literal => parse_literal(body)?.into(),
        Tag::CompressedData => parse_compressed_data(body)?.into(),
        Tag::SEIP => parse_seip(body)?.into(),
        Tag::AED => parse_aed(body)?.into(),
        Tag::Marker => Marker::new().into(),
        Tag::Trust => Trust::from(body.to_vec()).into(),
        Tag::Reserved | Tag::SED | Tag::MDC | Tag::Unknown(_) => return Ok(None),
    }))
}

fn parse_signature(body: &[u8]) -> Result<crate::packet::Signature> {
    if body.len() < 4 {
        return Err(Error::MalformedPacket("truncated signature".into()).into());
    }
    let version = body[0];
    if version != 4 {
        return Err(Error::MalformedPacket(
            format!("unsupported signature version {}", version)).into());
    }
    let sigtype = SignatureType::from_octet(body[1]);
    let pk_algo = PublicKeyAlgorithm::from_octet(body[2]);
    let hash_algo = crate::types::HashAlgorithm::from_octet(body[3]);
    let fields = SignatureFields::from_parts(version, sigtype, pk_algo, hash_algo);

    let rest = &body[4..];
    let (hashed, rest) = subpacket::SubpacketArea::parse(rest)?;
    let (unhashed, rest) = subpacket::SubpacketArea::parse(rest)?;
    if rest.len() < 2 {
        return Err(Error::MalformedPacket("truncated digest prefix".into()).into());
    }
    let digest_prefix = [rest[0], rest[1]];
    let mpis = mpi::Signature::parse(pk_algo, &rest[2..])?;

    let areas = crate::packet::signature::subpacket::SubpacketAreas::new(hashed, unhashed);
    Ok(Signature4::from_parts(fields, areas, digest_prefix, mpis).into())
}

fn parse_one_pass_sig(body: &[u8]) -> Result<OnePassSig> {
    if body.len() != 13 {
        return Err(Error::MalformedPacket("bad one-pass signature length".into()).into());
    }
    if body[0] != 3 {
        return Err(Error::MalformedPacket(
            format!("unsupported one-pass signature version {}", body[0])).into());
    }
    let mut ops = OnePassSig::new(SignatureType::from_octet(body[1]));
    ops.set_hash_algo(crate::types::HashAlgorithm::from_octet(body[2]));
    ops.set_pk_algo(PublicKeyAlgorithm::from_octet(body[3]));
    ops.set_issuer(KeyID::from_bytes(&body[4..12]));
    ops.set_last(body[12] != 0);
    Ok(ops)
}

fn parse_pkesk(body: &[u8]) -> Result<PKESK> {
    if body.len() < 10 {
        return Err(Error::MalformedPacket("truncated PKESK".into()).into());
    }
    if body[0] != 3 {
        return Err(Error::MalformedPacket(
            format!("unsupported PKESK version {}", body[0])).into());
    }
    let recipient = KeyID::from_bytes(&body[1..9]);
    let pk_algo = PublicKeyAlgorithm::from_octet(body[9]);
    let esk = mpi::Ciphertext::parse(pk_algo, &body[10..])?;
    Ok(PKESK::new(recipient, pk_algo, esk))
}

fn parse_skesk(body: &[u8]) -> Result<SKESK> {
    if body.len() < 2 {
        return Err(Error::MalformedPacket("truncated SKESK".into()).into());
    }
    match body[0] {
        4 => {
            let sym_algo = SymmetricAlgorithm::from_octet(body[1]);
            let mut cur = &body[2..];
            let s2k = S2K::parse(&mut cur)?;
            let esk = if cur.is_empty() { None } else { Some(cur.to_vec().into_boxed_slice()) };
            Ok(SKESK::new4(sym_algo, s2k, esk))
        }
        5 => {
            if body.len() < 3 {
                return Err(Error::MalformedPacket("truncated SKESK".into()).into());
            }
            let sym_algo = SymmetricAlgorithm::from_octet(body[1]);
            let aead = crate::types::AEADAlgorithm::from_octet(body[2]);
            let mut cur = &body[3..];
            let s2k = S2K::parse(&mut cur)?;
            Ok(SKESK::new5(sym_algo, aead, s2k, cur.to_vec().into_boxed_slice()))
        }
        v => Err(Error::MalformedPacket(
            format!("unsupported SKESK version {}", v)).into()),
    }
}

/// Parses the common version/creation-time/algorithm/MPI prefix
/// shared by public and secret key packet bodies, per [Section 5.5.2
/// of RFC 4880].
///
/// [Section 5.5.2 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.5.2
fn parse_key_common(body: &[u8]) -> Result<(PublicKeyAlgorithm, Timestamp, mpi::PublicKey, usize)> {
    if body.len() < 6 {
        return Err(Error::MalformedPacket("truncated key".into()).into());
    }
    if body[0] != 4 {
        return Err(Error::MalformedPacket(
            format!("unsupported key version {}", body[0])).into());
    }
    let creation_time = Timestamp::from(u32::from_be_bytes(
        [body[1], body[2], body[3], body[4]]));
    let pk_algo = PublicKeyAlgorithm::from_octet(body[5]);
    let mpis = mpi::PublicKey::parse(pk_algo, &body[6..])?;
    Ok((pk_algo, creation_time, mpis, 6))
}

fn parse_public_key(body: &[u8], role: KeyRole) -> Result<Key4> {
    let (pk_algo, creation_time, mpis, _) = parse_key_common(body)?;
    Ok(Key4::new(role, creation_time, pk_algo, mpis))
}

fn parse_secret_key(body: &[u8], role: KeyRole) -> Result<Key4> {
    let (pk_algo, creation_time, mpis, _) = parse_key_common(body)?;
    let public_len = Fingerprint::from_bytes(&[]).as_bytes().len(); // unused; kept for clarity below
    let _ = public_len;

    // Re-derive the length of the already-consumed public prefix so
    // we know where the secret-specific fields start.
    let mut public_len = 6;
    {
        use crate::serialize::Marshal;
        let mut buf = Vec::new();
        mpis.serialize(&mut buf)?;
        public_len += buf.len();
    }
    let rest = &body[public_len..];

    if rest.is_empty() {
        return Err(Error::MalformedPacket("truncated secret key".into()).into());
    }

    let key = Key4::new(role, creation_time, pk_algo, mpis);
    match rest[0] {
        0 => {
            if rest.len() < 3 {
                return Err(Error::MalformedPacket("truncated secret key".into()).into());
            }
            let (material_and_checksum, _) = (&rest[1..], ());
            if material_and_checksum.len() < 2 {
                return Err(Error::MalformedPacket("truncated checksum".into()).into());
            }
            let (material, checksum) =
                material_and_checksum.split_at(material_and_checksum.len() - 2);
            let want = material.iter().fold(0u16, |acc, &b| acc.wrapping_add(b as u16));
            let got = u16::from_be_bytes([checksum[0], checksum[1]]);
            if want != got {
                return Err(Error::MalformedMPI("secret key checksum mismatch".into()).into());
            }
            let secret = crate::packet::key::parse_secret_mpis(pk_algo, material)?;
            Ok(key.with_secret(secret))
        }
        254 => {
            if rest.len() < 2 {
                return Err(Error::MalformedPacket("truncated secret key".into()).into());
            }
            let sym_algo = SymmetricAlgorithm::from_octet(rest[1]);
            let mut cur = &rest[2..];
            let s2k = S2K::parse(&mut cur)?;
            let iv_len = sym_algo.block_size()
                .ok_or(Error::UnsupportedSymmetricAlgorithm(sym_algo))?;
            if cur.len() < iv_len {
                return Err(Error::MalformedPacket("truncated IV".into()).into());
            }
            let (iv, ciphertext) = cur.split_at(iv_len);
            Ok(key.with_secret_encrypted(
                s2k, sym_algo, iv.to_vec().into_boxed_slice(),
                ciphertext.to_vec().into_boxed_slice()))
        }
        v => Err(Error::MalformedPacket(
            format!("unsupported secret key usage octet {}", v)).into()),
    }
}

fn parse_literal(body: &[u8]) -> Result<Literal> {
    if body.len() < 6 {
        return Err(Error::MalformedPacket("truncated literal data packet".into()).into());
    }
    let format = DataFormat::from_octet(body[0]);
    let filename_len = body[1] as usize;
    if body.len() < 2 + filename_len + 4 {
        return Err(Error::MalformedPacket("truncated literal data packet".into()).into());
    }
    let filename = &body[2..2 + filename_len];
    let date_off = 2 + filename_len;
    let date = u32::from_be_bytes([
        body[date_off], body[date_off + 1], body[date_off + 2], body[date_off + 3],
    ]);

    let mut lit = Literal::new(format);
    if !filename.is_empty() {
        lit.set_filename(filename)?;
    }
    if date != 0 {
        lit.set_date(Some(Timestamp::from(date).into()))?;
    }
    lit.set_body(body[date_off + 4..].to_vec());
    Ok(lit)
}

fn parse_compressed_data(body: &[u8]) -> Result<CompressedData> {
    if body.is_empty() {
        return Err(Error::MalformedPacket("truncated compressed data packet".into()).into());
    }
    let algo = CompressionAlgorithm::from_octet(body[0]);
    let mut cd = CompressedData::new(algo);
    cd.set_body(body[1..].to_vec());
    Ok(cd)
}

fn parse_seip(body: &[u8]) -> Result<packet::seip::SEIP1> {
    if body.is_empty() || body[0] != 1 {
        return Err(Error::MalformedPacket("unsupported SEIP version".into()).into());
    }
    let mut seip = packet::seip::SEIP1::new();
    seip.set_body(body[1..].to_vec());
    Ok(seip)
}

fn parse_aed(body: &[u8]) -> Result<packet::aed::AED1> {
    if body.len() < 4 || body[0] != 1 {
        return Err(Error::MalformedPacket("unsupported AED version".into()).into());
    }
    let sym_algo = SymmetricAlgorithm::from_octet(body[1]);
    let aead = crate::types::AEADAlgorithm::from_octet(body[2]);
    let chunk_size = 1usize << (body[3] as u32 + 6);
    let iv_len = aead.iv_size()?;
    if body.len() < 4 + iv_len {
        return Err(Error::MalformedPacket("truncated AED IV".into()).into());
    }
    let iv = body[4..4 + iv_len].to_vec().into_boxed_slice();
    let mut aed = packet::aed::AED1::new(sym_algo, aead, chunk_size, iv)?;
    aed.set_body(body[4 + iv_len..].to_vec());
    Ok(aed)
}

/// Configures and constructs a [`PacketParser`].
pub struct PacketParserBuilder<'a> {
    bio: Box<dyn BufferedReader<Cookie> + 'a>,
    max_recursion_depth: u8,
}

/// The default limit on how many containers deep a `PacketParser`
/// will recurse, chosen to comfortably exceed any sane message while
/// still bounding maliciously deep nesting.
const DEFAULT_MAX_RECURSION_DEPTH: u8 = 255;

impl<'a> PacketParserBuilder<'a> {
    /// Creates a builder from an already constructed buffered reader.
    pub fn from_buffered_reader(bio: Box<dyn BufferedReader<Cookie> + 'a>)
        -> Result<Self>
    {
        Ok(PacketParserBuilder {
            bio,
            max_recursion_depth: DEFAULT_MAX_RECURSION_DEPTH,
        })
    }

    /// Causes unread packet content to be buffered rather than
    /// dropped.
    ///
    /// Every packet body parsed by this module is already buffered in
    /// memory, so this setting exists for interface compatibility and
    /// has no further effect.
    pub fn buffer_unread_content(self) -> Self {
        self
    }

    /// Sets the maximum recursion (container nesting) depth.
    pub fn max_recursion_depth(mut self, value: u8) -> Self {
        self.max_recursion_depth = value;
        self
    }

    /// Finishes configuring the parser and parses the first packet.
    pub fn finalize(self) -> Result<PacketParserResult<'a>> {
        let mut parents = Vec::new();
        advance(self.bio, &mut parents, 0, self.max_recursion_depth)
    }

    /// Finishes configuring the parser and wraps it in a
    /// [`PacketPileParser`] for incremental tree assembly.
    pub fn into_packet_pile_parser(self) -> Result<PacketPileParser<'a>> {
        Ok(PacketPileParser { ppr: self.finalize()? })
    }
}

impl<'a> Parse<'a, PacketParserBuilder<'a>> for PacketParserBuilder<'a> {
    fn from_reader<R: 'a + Read>(reader: R) -> Result<Self> {
        let bio = buffered_reader::Generic::with_cookie(reader, Cookie::default());
        Self::from_buffered_reader(Box::new(bio))
    }

    fn from_bytes<D: AsRef<[u8]> + ?Sized>(data: &'a D) -> Result<Self> {
        let bio = buffered_reader::Memory::with_cookie(data.as_ref(), Cookie::default());
        Self::from_buffered_reader(Box::new(bio))
    }
}
