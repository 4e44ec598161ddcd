use std::fmt;
use std::hash::{Hash, Hasher};

use crate::utils::{bitfield_remove_padding, hex_pretty};

/// What a key (or subkey) may be used for, per [Section 5.2.3.21 of
/// RFC 4880].
///
/// [Section 5.2.3.21 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.2.3.21
#[derive(Clone)]
pub struct KeyFlags {
    can_certify: bool,
    can_sign: bool,
    can_encrypt_comms: bool,
    can_encrypt_storage: bool,
    can_authenticate: bool,
    is_split_key: bool,
    is_group_key: bool,
    unknown: Box<[u8]>,
    pad_to: usize,
}

const CERTIFY: u8 = 0x01;
const SIGN: u8 = 0x02;
const ENCRYPT_COMMS: u8 = 0x04;
const ENCRYPT_STORAGE: u8 = 0x08;
const SPLIT: u8 = 0x10;
const AUTHENTICATE: u8 = 0x20;
const GROUP: u8 = 0x80;
const KNOWN: u8 = CERTIFY | SIGN | ENCRYPT_COMMS | ENCRYPT_STORAGE | SPLIT | AUTHENTICATE | GROUP;

impl Default for KeyFlags {
    fn default() -> Self {
        KeyFlags::new(&[0])
    }
}

impl fmt::Debug for KeyFlags {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut parts = Vec::new();
        if self.can_certify { parts.push("C"); }
        if self.can_sign { parts.push("S"); }
        if self.can_encrypt_comms { parts.push("Ec"); }
        if self.can_encrypt_storage { parts.push("Es"); }
        if self.can_authenticate { parts.push("A"); }
        if self.is_split_key { parts.push("split"); }
        if self.is_group_key { parts.push("group"); }
        write!(f, "{}", parts.join("|"))?;
        if !self.unknown.is_empty() {
            write!(f, " +0x{}", hex_pretty(&self.unknown))?;
        }
        Ok(())
    }
}

impl PartialEq for KeyFlags {
    fn eq(&self, other: &Self) -> bool {
        self.can_certify == other.can_certify
            && self.can_sign == other.can_sign
            && self.can_encrypt_comms == other.can_encrypt_comms
            && self.can_encrypt_storage == other.can_encrypt_storage
            && self.can_authenticate == other.can_authenticate
            && self.is_split_key == other.is_split_key
            && self.is_group_key == other.is_group_key
            && self.unknown == other.unknown
    }
}
impl Eq for KeyFlags {}

impl Hash for KeyFlags {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_vec().hash(state);
    }
}

impl KeyFlags {
    /// Creates an empty flag set (no capabilities).
    pub fn empty() -> Self {
        Self::new(&[])
    }

    /// Parses a raw subpacket body.
    pub fn new<B: AsRef<[u8]>>(bits: B) -> Self {
        let bits = bits.as_ref();
        let b0 = bits.first().copied().unwrap_or(0);
        let mut cpy = Vec::from(bits);
        let pad_to = if !cpy.is_empty() {
            cpy[0] &= !KNOWN;
            bitfield_remove_padding(&mut cpy)
        } else {
            0
        };

        KeyFlags {
            can_certify: b0 & CERTIFY != 0,
            can_sign: b0 & SIGN != 0,
            can_encrypt_comms: b0 & ENCRYPT_COMMS != 0,
            can_encrypt_storage: b0 & ENCRYPT_STORAGE != 0,
            can_authenticate: b0 & AUTHENTICATE != 0,
            is_split_key: b0 & SPLIT != 0,
            is_group_key: b0 & GROUP != 0,
            unknown: cpy.into_boxed_slice(),
            pad_to,
        }
    }

    pub(crate) fn to_vec(&self) -> Vec<u8> {
        let mut ret: Vec<u8> = if self.unknown.is_empty() { vec![0] } else { self.unknown.clone().into() };
        if self.can_certify { ret[0] |= CERTIFY; }
        if self.can_sign { ret[0] |= SIGN; }
        if self.can_encrypt_comms { ret[0] |= ENCRYPT_COMMS; }
        if self.can_encrypt_storage { ret[0] |= ENCRYPT_STORAGE; }
        if self.can_authenticate { ret[0] |= AUTHENTICATE; }
        if self.is_split_key { ret[0] |= SPLIT; }
        if self.is_group_key { ret[0] |= GROUP; }
        if ret.len() == 1 && ret[0] == 0 { ret.pop(); }
        for _ in ret.len()..self.pad_to { ret.push(0); }
        ret
    }

    /// Sets the certification capability.
    pub fn set_certification(mut self, v: bool) -> Self { self.can_certify = v; self }
    /// Sets the signing capability.
    pub fn set_signing(mut self, v: bool) -> Self { self.can_sign = v; self }
    /// Sets the encrypt-communications capability.
    pub fn set_encrypt_for_transport(mut self, v: bool) -> Self { self.can_encrypt_comms = v; self }
    /// Sets the encrypt-storage capability.
    pub fn set_encrypt_at_rest(mut self, v: bool) -> Self { self.can_encrypt_storage = v; self }
    /// Sets the authentication capability.
    pub fn set_authentication(mut self, v: bool) -> Self { self.can_authenticate = v; self }

    /// Whether this key may certify other keys/User IDs.
    pub fn for_certification(&self) -> bool { self.can_certify }
    /// Whether this key may make signatures.
    pub fn for_signing(&self) -> bool { self.can_sign }
    /// Whether this key may encrypt data in transport.
    pub fn for_transport_encryption(&self) -> bool { self.can_encrypt_comms }
    /// Whether this key may encrypt data at rest.
    pub fn for_storage_encryption(&self) -> bool { self.can_encrypt_storage }
    /// Whether this key may authenticate.
    pub fn for_authentication(&self) -> bool { self.can_authenticate }
    /// Whether this key can encrypt in either sense.
    pub fn for_encryption(&self) -> bool { self.can_encrypt_comms || self.can_encrypt_storage }
}
