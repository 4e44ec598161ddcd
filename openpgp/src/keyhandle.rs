use std::convert::TryFrom;
use std::cmp;
use std::cmp::Ordering;
use std::borrow::Borrow;

use crate::{Error, Fingerprint, KeyID, Result};

/// Identifies an OpenPGP key, either by `Fingerprint` or by `KeyID`.
#[derive(Debug, Clone, Hash)]
pub enum KeyHandle {
    /// A Fingerprint.
    Fingerprint(Fingerprint),
    /// A KeyID.
    KeyID(KeyID),
}

impl std::fmt::Display for KeyHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            KeyHandle::Fingerprint(v) => v.fmt(f),
            KeyHandle::KeyID(v) => v.fmt(f),
        }
    }
}

impl From<KeyID> for KeyHandle {
    fn from(i: KeyID) -> Self { KeyHandle::KeyID(i) }
}

impl From<&KeyID> for KeyHandle {
    fn from(i: &KeyID) -> Self { KeyHandle::KeyID(i.clone()) }
}

impl From<KeyHandle> for KeyID {
    fn from(i: KeyHandle) -> Self {
        match i {
            KeyHandle::Fingerprint(i) => i.to_keyid(),
            KeyHandle::KeyID(i) => i,
        }
    }
}

impl From<&KeyHandle> for KeyID {
    fn from(i: &KeyHandle) -> Self {
        match i {
            KeyHandle::Fingerprint(i) => i.to_keyid(),
            KeyHandle::KeyID(i) => i.clone(),
        }
    }
}

impl From<Fingerprint> for KeyHandle {
    fn from(i: Fingerprint) -> Self { KeyHandle::Fingerprint(i) }
}

impl From<&Fingerprint> for KeyHandle {
    fn from(i: &Fingerprint) -> Self { KeyHandle::Fingerprint(i.clone()) }
}

impl TryFrom<KeyHandle> for Fingerprint {
    type Error = anyhow::Error;
    fn try_from(i: KeyHandle) -> Result<Self> {
        match i {
            KeyHandle::Fingerprint(i) => Ok(i),
            KeyHandle::KeyID(i) => Err(Error::InvalidOperation(
                format!("cannot convert key ID {} to a fingerprint", i)).into()),
        }
    }
}

impl TryFrom<&KeyHandle> for Fingerprint {
    type Error = anyhow::Error;
    fn try_from(i: &KeyHandle) -> Result<Self> {
        match i {
            KeyHandle::Fingerprint(i) => Ok(i.clone()),
            KeyHandle::KeyID(i) => Err(Error::InvalidOperation(
                format!("cannot convert key ID {} to a fingerprint", i)).into()),
        }
    }
}

impl PartialOrd for KeyHandle {
    fn partial_cmp(&self, other: &KeyHandle) -> Option<Ordering> {
        let a = self.as_bytes();
        let b = other.as_bytes();

        let l = cmp::min(a.len(), b.len());

        // Little-endian comparison, so that for V4 keys (where the Key
        // ID is a suffix of the fingerprint) equivalent KeyIDs and
        // fingerprints sort next to each other.
        for (a, b) in a[a.len() - l..].iter().zip(b[b.len() - l..].iter()) {
            let cmp = a.cmp(b);
            if cmp != Ordering::Equal {
                return Some(cmp);
            }
        }

        if a.len() == b.len() {
            Some(Ordering::Equal)
        } else {
            // One (a KeyID) is a suffix of the other (a Fingerprint).
            None
        }
    }
}

impl PartialEq for KeyHandle {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl KeyHandle {
    /// Returns a reference to the raw identifier.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            KeyHandle::Fingerprint(i) => i.as_bytes(),
            KeyHandle::KeyID(i) => i.as_bytes(),
        }
    }

    /// Returns whether `self` and `other` could be aliases of each
    /// other.
    ///
    /// `PartialEq` cannot assert that a `Fingerprint` and a `KeyID`
    /// are equal in general, because two distinct fingerprints can
    /// share a Key ID and `PartialEq` must stay transitive. This
    /// answers the weaker, non-transitive question actually needed
    /// when matching a wire-level Key ID reference against a known
    /// fingerprint: could these two handles name the same key?
    pub fn aliases<H>(&self, other: H) -> bool
        where H: Borrow<KeyHandle>
    {
        self.partial_cmp(other.borrow()).unwrap_or(Ordering::Equal) == Ordering::Equal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_and_its_keyid_alias() {
        let fp = Fingerprint::from_bytes(&[0x11; 20]);
        let keyid = fp.to_keyid();
        let h1: KeyHandle = fp.into();
        let h2: KeyHandle = keyid.into();
        assert!(h1.aliases(&h2));
    }

    #[test]
    fn distinct_fingerprints_sharing_a_keyid_do_not_alias() {
        let mut raw1 = [0u8; 20];
        let mut raw2 = [0u8; 20];
        for i in 0..12 {
            raw1[i] = i as u8;
            raw2[i] = 0xff - i as u8;
        }
        for i in 12..20 {
            raw1[i] = i as u8;
            raw2[i] = i as u8;
        }
        let h1: KeyHandle = Fingerprint::from_bytes(&raw1).into();
        let h2: KeyHandle = Fingerprint::from_bytes(&raw2).into();
        assert!(!h1.aliases(&h2));
    }
}
