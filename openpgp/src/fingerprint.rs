use std::fmt;

use crate::utils::hex_pretty;

/// Uniquely identifies a public key.
///
/// A V4 fingerprint is the 20-byte SHA-1 hash of the key's public
/// fields, computed per [Section 12.2 of RFC 4880]. Keys predating V4
/// use a 16-byte MD5 fingerprint; this crate only parses those for
/// read compatibility and rejects them for any certification or
/// signing operation.
///
/// [Section 12.2 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-12.2
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Hash)]
pub enum Fingerprint {
    /// 20 byte SHA-1 hash (V4 keys).
    V4([u8; 20]),
    /// 16 byte MD5 hash (V3 keys, read-only).
    V3([u8; 16]),
    /// A fingerprint of a length or origin we don't understand, kept
    /// around so surrounding data (e.g. an Issuer Fingerprint
    /// subpacket) isn't silently dropped.
    Invalid(Box<[u8]>),
}

impl Fingerprint {
    /// Parses a fingerprint from its raw bytes, picking the variant
    /// that matches the known lengths.
    pub fn from_bytes(raw: &[u8]) -> Self {
        match raw.len() {
            20 => {
                let mut buf = [0u8; 20];
                buf.copy_from_slice(raw);
                Fingerprint::V4(buf)
            }
            16 => {
                let mut buf = [0u8; 16];
                buf.copy_from_slice(raw);
                Fingerprint::V3(buf)
            }
            _ => Fingerprint::Invalid(raw.to_vec().into_boxed_slice()),
        }
    }

    /// Returns the raw bytes of this fingerprint.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Fingerprint::V4(b) => b,
            Fingerprint::V3(b) => b,
            Fingerprint::Invalid(b) => b,
        }
    }

    /// Derives the Key ID for this fingerprint (its low 8 octets, for
    /// V4; V3 Key IDs are the low 8 octets of the RSA modulus and are
    /// not derivable from the fingerprint alone, so this returns
    /// `KeyID::Invalid` for `V3`).
    pub fn to_keyid(&self) -> crate::KeyID {
        match self {
            Fingerprint::V4(b) => {
                let mut buf = [0u8; 8];
                buf.copy_from_slice(&b[12..20]);
                crate::KeyID::V4(buf)
            }
            _ => crate::KeyID::Invalid(self.as_bytes().to_vec().into_boxed_slice()),
        }
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", hex_pretty(self.as_bytes()).to_uppercase().replace(' ', ""))
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Fingerprint({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn v4_roundtrip() {
        let raw = [0x42u8; 20];
        let fp = Fingerprint::from_bytes(&raw);
        assert_eq!(fp.as_bytes(), &raw[..]);
        assert!(matches!(fp, Fingerprint::V4(_)));
    }

    #[test]
    fn to_keyid_takes_low_eight_octets() {
        let mut raw = [0u8; 20];
        for (i, b) in raw.iter_mut().enumerate() {
            *b = i as u8;
        }
        let fp = Fingerprint::from_bytes(&raw);
        let keyid = fp.to_keyid();
        assert_eq!(keyid.as_bytes(), &raw[12..20]);
    }
}
