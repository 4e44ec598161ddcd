//! Symmetric-Key Encrypted Session Key packets.
//!
//! See [Section 5.3 of RFC 4880] for details.
//!
//! [Section 5.3 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.3

use std::io;

use crate::crypto::s2k::S2K;
use crate::packet;
use crate::serialize::Marshal;
use crate::types::{AEADAlgorithm, SymmetricAlgorithm};
use crate::Packet;
use crate::Result;

/// Holds a symmetric-key encrypted session key packet.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SKESK {
    pub(crate) common: packet::Common,
    version: u8,
    sym_algo: SymmetricAlgorithm,
    s2k: S2K,
    /// AEAD algorithm used to protect `esk`, for version 5 packets.
    aead: Option<AEADAlgorithm>,
    /// The session key, encrypted with the S2K-derived key. `None`
    /// means the S2K-derived key *is* the session key (version 4,
    /// no ESK field).
    esk: Option<Box<[u8]>>,
}

impl SKESK {
    /// Creates a new version 4 SKESK packet.
    pub fn new4(sym_algo: SymmetricAlgorithm, s2k: S2K, esk: Option<Box<[u8]>>)
        -> Self
    {
        SKESK {
            common: Default::default(),
            version: 4,
            sym_algo,
            s2k,
            aead: None,
            esk,
        }
    }

    /// Creates a new version 5 (AEAD) SKESK packet.
    pub fn new5(sym_algo: SymmetricAlgorithm, aead: AEADAlgorithm, s2k: S2K,
                esk: Box<[u8]>) -> Self
    {
        SKESK {
            common: Default::default(),
            version: 5,
            sym_algo,
            s2k,
            aead: Some(aead),
            esk: Some(esk),
        }
    }

    /// Returns the packet version.
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Returns the symmetric algorithm protecting the session key.
    pub fn symmetric_algo(&self) -> SymmetricAlgorithm {
        self.sym_algo
    }

    /// Returns the S2K specifier used to derive the protection key.
    pub fn s2k(&self) -> &S2K {
        &self.s2k
    }

    /// Returns the AEAD algorithm, for version 5 packets.
    pub fn aead_algo(&self) -> Option<AEADAlgorithm> {
        self.aead
    }

    /// Returns the encrypted session key, if present.
    pub fn esk(&self) -> Option<&[u8]> {
        self.esk.as_deref()
    }

    /// Writes this packet's body, per [Section 5.3 of RFC 4880].
    ///
    /// [Section 5.3 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.3
    pub(crate) fn serialize_body(&self, sink: &mut dyn io::Write) -> Result<()> {
        sink.write_all(&[self.version, self.sym_algo.octet()])?;
        if let Some(aead) = self.aead {
            sink.write_all(&[aead.octet()])?;
        }
        self.s2k.serialize(sink)?;
        if let Some(esk) = &self.esk {
            sink.write_all(esk)?;
        }
        Ok(())
    }
}

impl From<SKESK> for Packet {
    fn from(p: SKESK) -> Self {
        Packet::SKESK(p)
    }
}
