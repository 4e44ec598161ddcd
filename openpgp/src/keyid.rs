use std::fmt;

use crate::utils::hex_pretty;

/// Identifies a public key.
///
/// A KeyID is a fingerprint fragment: the low 8 octets of a V4
/// fingerprint. It is cheap to forge and exists only to name a key in
/// wire formats (the Issuer subpacket, old-style PK-ESK packets) that
/// predate full-fingerprint references. See [Section 12.2 of RFC
/// 4880].
///
/// [Section 12.2 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-12.2
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Hash)]
pub enum KeyID {
    /// Low 8 byte SHA-1 hash (V4 keys).
    V4([u8; 8]),
    /// A KeyID of a length we don't understand.
    Invalid(Box<[u8]>),
}

impl KeyID {
    /// The wildcard KeyID, `0x0000000000000000`, used when the
    /// intended recipient of a PK-ESK packet is deliberately hidden.
    pub fn wildcard() -> Self {
        KeyID::V4([0; 8])
    }

    /// Parses a KeyID from its raw bytes.
    pub fn from_bytes(raw: &[u8]) -> Self {
        match raw.len() {
            8 => {
                let mut buf = [0u8; 8];
                buf.copy_from_slice(raw);
                KeyID::V4(buf)
            }
            _ => KeyID::Invalid(raw.to_vec().into_boxed_slice()),
        }
    }

    /// Returns the raw bytes of this Key ID.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            KeyID::V4(b) => b,
            KeyID::Invalid(b) => b,
        }
    }

    /// Whether this is the wildcard KeyID.
    pub fn is_wildcard(&self) -> bool {
        matches!(self, KeyID::V4([0, 0, 0, 0, 0, 0, 0, 0]))
    }
}

impl fmt::Display for KeyID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", hex_pretty(self.as_bytes()).to_uppercase().replace(' ', ""))
    }
}

impl fmt::Debug for KeyID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "KeyID({})", self)
    }
}

impl From<crate::Fingerprint> for KeyID {
    fn from(fp: crate::Fingerprint) -> Self {
        fp.to_keyid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_is_all_zero() {
        assert!(KeyID::wildcard().is_wildcard());
        assert!(!KeyID::from_bytes(&[1, 0, 0, 0, 0, 0, 0, 0]).is_wildcard());
    }
}
