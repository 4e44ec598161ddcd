//! The transferable key format: a flat sequence of OpenPGP packets,
//! binary or ASCII-armored, as produced by `gpg --export`.
//!
//! On read the packet stream is split into one group per primary key
//! (every `public-key`/`secret-key` packet starts a new group, every
//! other packet attaches to the group currently open) and each group
//! is handed to [`Cert::from_packet_pile`]. On write, each cert's
//! packets are emitted in [`Cert::into_packets`]'s canonical order,
//! back to back.

use std::io::{self, Read, Write};

use crate::armor;
use crate::cert::Cert;
use crate::packet::Tag;
use crate::parse::Parse;
use crate::serialize::Marshal;
use crate::{Error, Packet, PacketPile, Result};

/// Splits a flat packet sequence into per-primary-key groups.
fn split_by_primary(packets: Vec<Packet>) -> Vec<Vec<Packet>> {
    let mut groups: Vec<Vec<Packet>> = Vec::new();
    for packet in packets {
        let starts_primary = matches!(
            packet.tag(),
            Tag::PublicKey | Tag::SecretKey
        );
        if starts_primary || groups.is_empty() {
            groups.push(Vec::new());
        }
        groups.last_mut().unwrap().push(packet);
    }
    groups
}

/// Whether `data` looks like an ASCII-armored block.
fn looks_armored(data: &[u8]) -> bool {
    data.starts_with(b"-----")
}

/// Reads every certificate found in `data`, which may be binary or
/// ASCII-armored OpenPGP.
pub fn read_certs(data: &[u8]) -> Result<Vec<Cert>> {
    let pile = if looks_armored(data) {
        let mut reader = armor::Reader::from_bytes(data, None);
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)
            .map_err(|e| Error::MalformedArmor(e.to_string()))?;
        PacketPile::from_bytes(&buf)?
    } else {
        PacketPile::from_bytes(data)?
    };

    split_by_primary(pile.into_children().collect())
        .into_iter()
        .map(|group| Cert::from_packet_pile(PacketPile::from(group)))
        .collect()
}

/// Reads every certificate found at `path`.
pub fn read_certs_from_reader<R: Read>(mut reader: R) -> Result<Vec<Cert>> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    read_certs(&buf)
}

/// Serializes `certs` back-to-back in binary transferable-key format.
pub fn write_certs<'a, W, I>(sink: &mut W, certs: I) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a Cert>,
{
    for cert in certs {
        for packet in cert.clone().into_packets() {
            packet.serialize(sink)?;
        }
    }
    Ok(())
}

/// Serializes `certs` as one ASCII-armored block of `kind`.
pub fn write_certs_armored<'a, I>(
    sink: &mut dyn Write,
    kind: armor::Kind,
    certs: I,
) -> Result<()>
where
    I: IntoIterator<Item = &'a Cert>,
{
    let mut writer = armor::Writer::new(sink, kind)?;
    write_certs(&mut writer, certs)?;
    writer.finalize()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert::CertBuilder;

    #[test]
    fn roundtrip_single_cert() {
        let (cert, _rev) = CertBuilder::new()
            .add_userid("Alice <alice@example.org>")
            .generate()
            .unwrap();

        let mut buf = Vec::new();
        write_certs(&mut buf, std::iter::once(&cert)).unwrap();

        let parsed = read_certs(&buf).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].fingerprint(), cert.fingerprint());
        assert_eq!(parsed[0].userids().len(), cert.userids().len());
    }

    #[test]
    fn roundtrip_keyring() {
        let (cert_a, _) = CertBuilder::new()
            .add_userid("Alice <alice@example.org>")
            .generate()
            .unwrap();
        let (cert_b, _) = CertBuilder::new()
            .add_userid("Bob <bob@example.org>")
            .generate()
            .unwrap();

        let mut buf = Vec::new();
        write_certs(&mut buf, [&cert_a, &cert_b]).unwrap();

        let parsed = read_certs(&buf).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].fingerprint(), cert_a.fingerprint());
        assert_eq!(parsed[1].fingerprint(), cert_b.fingerprint());
    }

    #[test]
    fn armored_roundtrip() {
        let (cert, _rev) = CertBuilder::new()
            .add_userid("Carol <carol@example.org>")
            .generate()
            .unwrap();

        let mut buf = Vec::new();
        write_certs_armored(&mut buf, armor::Kind::PublicKey, std::iter::once(&cert))
            .unwrap();
        assert!(looks_armored(&buf));

        let parsed = read_certs(&buf).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].fingerprint(), cert.fingerprint());
    }
}
