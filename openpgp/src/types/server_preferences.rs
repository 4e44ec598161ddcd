use std::fmt;
use std::hash::{Hash, Hasher};

use crate::utils::{bitfield_remove_padding, hex_pretty};

/// Preferences regarding key servers.
///
/// Key server preferences are specified in [Section 5.2.3.17 of RFC
/// 4880] and [Section 5.2.3.18 of RFC 4880bis].
///
/// # A note on equality
///
/// `PartialEq` implements semantic equality, i.e. it ignores trailing
/// zero padding.
///
/// [Section 5.2.3.17 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.2.3.17
/// [Section 5.2.3.18 of RFC 4880bis]: https://tools.ietf.org/html/draft-ietf-openpgp-rfc4880bis-09#section-5.2.3.18
#[derive(Clone)]
pub struct KeyServerPreferences {
    no_modify: bool,
    unknown: Box<[u8]>,
    pad_to: usize,
}

const NO_MODIFY: u8 = 0x80;
const N_KNOWN_BYTES: usize = 1;

impl Default for KeyServerPreferences {
    fn default() -> Self {
        KeyServerPreferences::new(&[0])
    }
}

impl fmt::Debug for KeyServerPreferences {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut dirty = false;
        if self.no_modify() {
            f.write_str("no modify")?;
            dirty = true;
        }
        if !self.unknown.is_empty() {
            if dirty { f.write_str(", ")?; }
            write!(f, "+0x{}", hex_pretty(&self.unknown))?;
            dirty = true;
        }
        if self.pad_to > N_KNOWN_BYTES + self.unknown.len() {
            if dirty { f.write_str(", ")?; }
            write!(f, "+padding({} bytes)", self.pad_to - self.unknown.len())?;
        }
        Ok(())
    }
}

impl PartialEq for KeyServerPreferences {
    fn eq(&self, other: &Self) -> bool {
        self.no_modify == other.no_modify && self.unknown == other.unknown
    }
}

impl Eq for KeyServerPreferences {}

impl Hash for KeyServerPreferences {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.no_modify.hash(state);
        self.unknown.hash(state);
    }
}

impl KeyServerPreferences {
    /// Creates a new instance from the raw subpacket body.
    pub fn new<B: AsRef<[u8]>>(bits: B) -> Self {
        let bits = bits.as_ref();
        let mut pad_to = 0;

        let no_modify = bits.first().map(|x| x & NO_MODIFY != 0).unwrap_or(false);
        let unknown = if bits.is_empty() {
            Box::default()
        } else {
            let mut cpy = Vec::from(bits);
            cpy[0] &= !NO_MODIFY;
            pad_to = bitfield_remove_padding(&mut cpy);
            cpy.into_boxed_slice()
        };

        KeyServerPreferences { no_modify, unknown, pad_to }
    }

    /// Serializes back to the raw subpacket body.
    pub(crate) fn to_vec(&self) -> Vec<u8> {
        let mut ret: Vec<u8> = if self.unknown.is_empty() {
            vec![0]
        } else {
            self.unknown.clone().into()
        };

        if self.no_modify {
            ret[0] |= NO_MODIFY;
        }

        if ret.len() == 1 && ret[0] == 0 {
            ret.pop();
        }
        for _ in ret.len()..self.pad_to {
            ret.push(0);
        }
        ret
    }

    /// Whether keyservers are disallowed from modifying this key.
    pub fn no_modify(&self) -> bool {
        self.no_modify
    }

    /// Sets whether keyservers are disallowed from modifying this key.
    pub fn set_no_modify(mut self, v: bool) -> Self {
        self.no_modify = v;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basics() {
        let p = KeyServerPreferences::default();
        assert!(!p.no_modify());
        let p = KeyServerPreferences::new([0xffu8]);
        assert!(p.no_modify());
    }

    #[test]
    fn roundtrip() {
        let val = KeyServerPreferences::new([0xffu8, 0x01]);
        let q = KeyServerPreferences::new(val.to_vec());
        assert_eq!(val, q);
    }
}
