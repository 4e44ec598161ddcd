//! The keybox format: a header blob followed by one framed blob per
//! primary key, each bundling the key's transferable-format bytes
//! plus a small index of fingerprints and flags.
//!
//! Every blob starts with a 4-octet big-endian length (counting the
//! length field itself), a 1-octet blob type, a 1-octet version, and
//! 2 reserved octets; the magic `KBXf` follows immediately at offset
//! 8 in the header blob, which is how callers recognise a keybox
//! without fully parsing it (see the format-detection heuristic in
//! [`super::detect`]).

use std::convert::TryInto;

use crate::cert::Cert;
use crate::key_store::transferable;
use crate::{Error, Result};

const BLOB_TYPE_HEADER: u8 = 1;
const BLOB_TYPE_OPENPGP: u8 = 2;
const BLOB_VERSION: u8 = 1;

/// The magic four octets that mark a keybox header blob.
pub const MAGIC: &[u8; 4] = b"KBXf";

fn header_blob() -> Vec<u8> {
    let mut out = Vec::with_capacity(16);
    out.extend_from_slice(&0u32.to_be_bytes()); // length, patched below
    out.push(BLOB_TYPE_HEADER);
    out.push(BLOB_VERSION);
    out.extend_from_slice(&[0, 0]); // reserved
    out.extend_from_slice(MAGIC);
    let len = out.len() as u32;
    out[0..4].copy_from_slice(&len.to_be_bytes());
    out
}

/// Builds the framed blob for one primary key: its transferable-key
/// bytes plus a fingerprint/flags index (one entry per key in the
/// cert: the primary, then each subkey).
fn openpgp_blob(cert: &Cert) -> Result<Vec<u8>> {
    let mut key_bytes = Vec::new();
    transferable::write_certs(&mut key_bytes, std::iter::once(cert))?;

    let fingerprints: Vec<[u8; 20]> = std::iter::once(cert.primary_key())
        .chain(cert.subkeys().iter().map(|sk| sk.key()))
        .map(|k| {
            let fp = k.fingerprint();
            let bytes = fp.as_bytes();
            let mut buf = [0u8; 20];
            // Non-V4 (MD5) fingerprints pad on the right; the index
            // is advisory and only used to locate a cert by
            // fingerprint, never to reconstruct key material.
            buf[..bytes.len().min(20)].copy_from_slice(&bytes[..bytes.len().min(20)]);
            buf
        })
        .collect();

    let mut body = Vec::new();
    body.push(BLOB_TYPE_OPENPGP);
    body.push(BLOB_VERSION);
    body.extend_from_slice(&[0, 0]); // reserved
    body.extend_from_slice(&(key_bytes.len() as u32).to_be_bytes());
    body.extend_from_slice(&(fingerprints.len() as u16).to_be_bytes());
    for fp in &fingerprints {
        body.extend_from_slice(fp);
        body.extend_from_slice(&0u32.to_be_bytes()); // flags: none set
    }
    body.extend_from_slice(&key_bytes);

    let mut out = Vec::with_capacity(body.len() + 4);
    out.extend_from_slice(&0u32.to_be_bytes());
    out.extend_from_slice(&body);
    let len = out.len() as u32;
    out[0..4].copy_from_slice(&len.to_be_bytes());
    Ok(out)
}

/// Whether `data` starts with a keybox header blob, per the
/// format-detection heuristic: bytes 8..12 equal `KBXf`.
pub fn looks_like_keybox(data: &[u8]) -> bool {
    data.len() >= 12 && &data[8..12] == MAGIC
}

/// Reads every certificate stored in a keybox.
pub fn read_keybox(data: &[u8]) -> Result<Vec<Cert>> {
    if !looks_like_keybox(data) {
        return Err(Error::MalformedCert("not a keybox (missing KBXf magic)".into()).into());
    }

    let mut certs = Vec::new();
    let mut pos = 0usize;
    while pos < data.len() {
        let remaining = &data[pos..];
        if remaining.len() < 6 {
            break;
        }
        let blob_len = u32::from_be_bytes(remaining[0..4].try_into().unwrap()) as usize;
        if blob_len < 6 || pos + blob_len > data.len() {
            return Err(Error::MalformedCert("truncated keybox blob".into()).into());
        }
        let blob_type = remaining[4];
        if blob_type == BLOB_TYPE_OPENPGP {
            let body = &remaining[6..blob_len];
            if body.len() < 6 {
                return Err(Error::MalformedCert("truncated OpenPGP blob".into()).into());
            }
            let key_block_len = u32::from_be_bytes(body[0..4].try_into().unwrap()) as usize;
            let nfp = u16::from_be_bytes(body[4..6].try_into().unwrap()) as usize;
            let index_len = nfp * 24;
            let key_block_start = 6 + index_len;
            let key_block_end = key_block_start + key_block_len;
            if key_block_end > body.len() {
                return Err(Error::MalformedCert("OpenPGP blob key block overruns index".into()).into());
            }
            let key_bytes = &body[key_block_start..key_block_end];
            certs.extend(transferable::read_certs(key_bytes)?);
        }
        pos += blob_len;
    }
    Ok(certs)
}

/// Serializes `certs` as a keybox: header blob, then one OpenPGP blob
/// per cert.
pub fn write_keybox<'a, I>(certs: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = &'a Cert>,
{
    let mut out = header_blob();
    for cert in certs {
        out.extend_from_slice(&openpgp_blob(cert)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert::CertBuilder;

    #[test]
    fn detects_header() {
        let blob = header_blob();
        assert!(looks_like_keybox(&blob));
    }

    #[test]
    fn roundtrip_single_cert() {
        let (cert, _rev) = CertBuilder::new()
            .add_userid("Dora <dora@example.org>")
            .add_signing_subkey()
            .generate()
            .unwrap();

        let bytes = write_keybox(std::iter::once(&cert)).unwrap();
        assert!(looks_like_keybox(&bytes));

        let parsed = read_keybox(&bytes).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].fingerprint(), cert.fingerprint());
        assert_eq!(parsed[0].subkeys().len(), cert.subkeys().len());
    }

    #[test]
    fn roundtrip_multiple_certs() {
        let (cert_a, _) = CertBuilder::new()
            .add_userid("Eve <eve@example.org>")
            .generate()
            .unwrap();
        let (cert_b, _) = CertBuilder::new()
            .add_userid("Frank <frank@example.org>")
            .generate()
            .unwrap();

        let bytes = write_keybox([&cert_a, &cert_b]).unwrap();
        let parsed = read_keybox(&bytes).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].fingerprint(), cert_a.fingerprint());
        assert_eq!(parsed[1].fingerprint(), cert_b.fingerprint());
    }
}
