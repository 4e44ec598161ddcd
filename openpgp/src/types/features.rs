use std::fmt;
use std::hash::{Hash, Hasher};

use crate::utils::{bitfield_remove_padding, hex_pretty};

/// Features the certificate holder's software claims to support, per
/// [Section 5.2.3.24 of RFC 4880bis].
///
/// [Section 5.2.3.24 of RFC 4880bis]: https://tools.ietf.org/html/draft-ietf-openpgp-rfc4880bis-09#section-5.2.3.24
#[derive(Clone)]
pub struct Features {
    mdc: bool,
    aead: bool,
    unknown: Box<[u8]>,
    pad_to: usize,
}

const MDC: u8 = 0x01;
const AEAD: u8 = 0x02;
const KNOWN: u8 = MDC | AEAD;

impl Default for Features {
    fn default() -> Self {
        Features::new(&[0])
    }
}

impl fmt::Debug for Features {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut parts = Vec::new();
        if self.mdc { parts.push("mdc"); }
        if self.aead { parts.push("aead"); }
        write!(f, "{}", parts.join("|"))?;
        if !self.unknown.is_empty() {
            write!(f, " +0x{}", hex_pretty(&self.unknown))?;
        }
        Ok(())
    }
}

impl PartialEq for Features {
    fn eq(&self, other: &Self) -> bool {
        self.mdc == other.mdc && self.aead == other.aead && self.unknown == other.unknown
    }
}
impl Eq for Features {}

impl Hash for Features {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_vec().hash(state);
    }
}

impl Features {
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
        Features { mdc: b0 & MDC != 0, aead: b0 & AEAD != 0, unknown: cpy.into_boxed_slice(), pad_to }
    }

    pub(crate) fn to_vec(&self) -> Vec<u8> {
        let mut ret: Vec<u8> = if self.unknown.is_empty() { vec![0] } else { self.unknown.clone().into() };
        if self.mdc { ret[0] |= MDC; }
        if self.aead { ret[0] |= AEAD; }
        if ret.len() == 1 && ret[0] == 0 { ret.pop(); }
        for _ in ret.len()..self.pad_to { ret.push(0); }
        ret
    }

    /// The feature set this implementation supports: MDC and AEAD.
    pub fn implemented() -> Self {
        Features::default().set_mdc(true).set_aead(true)
    }

    /// Whether MDC (SEIP) is supported.
    pub fn supports_mdc(&self) -> bool { self.mdc }
    /// Sets MDC support.
    pub fn set_mdc(mut self, v: bool) -> Self { self.mdc = v; self }
    /// Whether AEAD encryption is supported.
    pub fn supports_aead(&self) -> bool { self.aead }
    /// Sets AEAD support.
    pub fn set_aead(mut self, v: bool) -> Self { self.aead = v; self }
}
