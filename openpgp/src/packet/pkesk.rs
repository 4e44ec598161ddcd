//! Public-Key Encrypted Session Key packets.
//!
//! See [Section 5.1 of RFC 4880] for details.
//!
//! [Section 5.1 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.1

use std::io;

use crate::crypto::mpi;
use crate::packet;
use crate::serialize::Marshal;
use crate::types::PublicKeyAlgorithm;
use crate::KeyID;
use crate::Packet;
use crate::Result;

/// Holds a public-key encrypted session key packet.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PKESK {
    pub(crate) common: packet::Common,
    version: u8,
    recipient: KeyID,
    pk_algo: PublicKeyAlgorithm,
    esk: mpi::Ciphertext,
}

impl PKESK {
    /// Creates a new PKESK packet.
    pub fn new(recipient: KeyID, pk_algo: PublicKeyAlgorithm,
               esk: mpi::Ciphertext) -> Self {
        PKESK {
            common: Default::default(),
            version: 3,
            recipient,
            pk_algo,
            esk,
        }
    }

    /// Returns the packet version.
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Returns the Key ID of the recipient's key.
    pub fn recipient(&self) -> &KeyID {
        &self.recipient
    }

    /// Returns the recipient's public-key algorithm.
    pub fn pk_algo(&self) -> PublicKeyAlgorithm {
        self.pk_algo
    }

    /// Returns the encrypted session key.
    pub fn esk(&self) -> &mpi::Ciphertext {
        &self.esk
    }

    /// Writes this packet's body, per [Section 5.1 of RFC 4880].
    ///
    /// [Section 5.1 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.1
    pub(crate) fn serialize_body(&self, sink: &mut dyn io::Write) -> Result<()> {
        sink.write_all(&[self.version])?;
        sink.write_all(self.recipient.as_bytes())?;
        sink.write_all(&[self.pk_algo.octet()])?;
        self.esk.serialize(sink)?;
        Ok(())
    }
}

impl From<PKESK> for Packet {
    fn from(p: PKESK) -> Self {
        Packet::PKESK(p)
    }
}
