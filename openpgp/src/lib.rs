//! An OpenPGP implementation.
//!
//! This crate implements the wire format, key model, and
//! cryptographic operations defined by [RFC 4880] plus selected
//! extensions from [RFC 4880bis] and the ECC additions in [RFC 6637].
//! It covers the packet stream engine (framing, partial lengths,
//! armor), the typed packet parser/emitter, the in-memory key model,
//! on-disk key store codecs (transferable keyrings, keybox, protected
//! s-expression files), the secret-key protection lifecycle, and the
//! high-level sign/verify/encrypt/decrypt pipelines.
//!
//! A non-goal of this crate is any sort of bolted-on trust model: it
//! implements the mechanisms RFC 4880 defines for certification (User
//! ID self-signatures, revocations) but does not evaluate a web of
//! trust. It also does not implement the historical V3 packet format
//! as an emitter -- V3 is only parsed, for read compatibility.
//!
//! [RFC 4880]: https://tools.ietf.org/html/rfc4880
//! [RFC 4880bis]: https://tools.ietf.org/html/draft-ietf-openpgp-rfc4880bis-08
//! [RFC 6637]: https://tools.ietf.org/html/rfc6637

#![warn(missing_docs)]

#[cfg(test)]
#[macro_use]
extern crate quickcheck;

#[macro_use]
mod macros;

pub mod types;
use crate::types::{
    HashAlgorithm,
    PublicKeyAlgorithm,
    SignatureType,
    SymmetricAlgorithm,
};

pub mod crypto;
pub mod armor;
pub mod packet;
use crate::packet::Container;

mod packet_pile;

pub mod parse;
pub mod serialize;

pub mod cert;
pub use cert::{Cert, RevocationStatus};

pub mod policy;
pub mod key_store;
pub mod context;

mod fingerprint;
mod keyid;
mod keyhandle;
pub use keyhandle::KeyHandle;

pub(crate) mod utils;
pub mod fmt;

/// Crate-wide result type.
///
/// Operations that need to carry a structured [`Error`] downcast it
/// out of the `anyhow::Error`; this keeps `Error` a closed, matchable
/// enum while letting callers use `?` freely across unrelated failure
/// sources (I/O, serde, etc).
pub type Result<T> = std::result::Result<T, anyhow::Error>;

/// Errors returned by this crate.
///
/// The variants below are a direct embedding of the closed error
/// taxonomy from the design: every fallible operation fails with one
/// of these. The enum is non-exhaustive so new wire features can add
/// variants without a semver break.
#[derive(thiserror::Error, Debug, Clone)]
#[non_exhaustive]
pub enum Error {
    /// Invalid argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Invalid operation for the current state.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Malformed packet, invalid length encoding, or premature EOF
    /// inside a structured packet.
    #[error("Malformed packet: {0}")]
    MalformedPacket(String),

    /// Not enough data to complete a partial-length continuation.
    #[error("Not enough data: {0}")]
    NotEnoughData(String),

    /// An unknown packet tag was encountered where a known one was
    /// required.
    #[error("Unknown packet tag: {0}")]
    UnknownTag(u8),

    /// A packet was not fully consumed by its typed parser.
    #[error("Packet not fully consumed: {0} bytes left")]
    PacketNotConsumed(usize),

    /// Unsupported packet type.
    #[error("Unsupported packet type: {0:?}")]
    UnsupportedPacketType(packet::Tag),

    /// Unsupported hash algorithm.
    #[error("Unsupported hash algorithm: {0}")]
    UnsupportedHashAlgorithm(HashAlgorithm),

    /// Unsupported public-key algorithm (for the requested operation).
    #[error("Unsupported public key algorithm: {0}")]
    UnsupportedPublicKeyAlgorithm(PublicKeyAlgorithm),

    /// Unsupported elliptic curve.
    #[error("Unsupported elliptic curve: {0}")]
    UnsupportedEllipticCurve(types::Curve),

    /// Unsupported symmetric algorithm (for the requested operation).
    #[error("Unsupported symmetric algorithm: {0}")]
    UnsupportedSymmetricAlgorithm(SymmetricAlgorithm),

    /// Unsupported compression algorithm.
    #[error("Unsupported compression algorithm: {0}")]
    UnsupportedCompressionAlgorithm(types::CompressionAlgorithm),

    /// Unsupported signature type.
    #[error("Unsupported signature type: {0}")]
    UnsupportedSignatureType(SignatureType),

    /// Malformed MPI.
    #[error("Malformed MPI: {0}")]
    MalformedMPI(String),

    /// The armor CRC-24 checksum did not match, or the armor framing
    /// was otherwise malformed.
    #[error("Malformed armor: {0}")]
    MalformedArmor(String),

    /// A signature failed to verify cryptographically, referenced an
    /// unknown critical subpacket, or its issuer did not match.
    #[error("Bad signature: {0}")]
    BadSignature(String),

    /// The signature is structurally valid but its creation time is
    /// after the verification time, or after its own expiration.
    #[error("Signature expired at {0:?}")]
    SignatureExpired(std::time::SystemTime),

    /// A signature or key expired at the given time.
    #[error("Expired at {0:?}")]
    Expired(std::time::SystemTime),

    /// A signature or key is not yet valid at the given time.
    #[error("Not yet live at {0:?}")]
    NotYetLive(std::time::SystemTime),

    /// An authenticated container (MDC, AEAD chunk) failed its
    /// integrity check, or the stored checksum/tag on a secret key
    /// did not match the decrypted plaintext.
    #[error("MAC/integrity check failed: {0}")]
    ManipulatedMessage(String),

    /// No secret key in the operation's key store decrypts any of the
    /// message's recipients.
    #[error("No suitable key found")]
    NoSuitableKey,

    /// A key lookup by grip, key ID, fingerprint, or User ID found
    /// nothing.
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    /// Password-based decryption or unlock failed: the S2K-derived
    /// key did not open the ciphertext.
    #[error("Bad password")]
    BadPassword,

    /// Key-pair generation failed.
    #[error("Key generation failed: {0}")]
    KeyGenerationFailure(String),

    /// A verify operation was asked to check a message that carries
    /// no signatures.
    #[error("No signatures found")]
    NoSignaturesFound,

    /// A certification operation (add User ID, sign, generate) has no
    /// User ID to work with.
    #[error("No User ID")]
    NoUserID,

    /// Malformed certificate (orphaned subkey, dangling signature
    /// index, missing primary).
    #[error("Malformed certificate: {0}")]
    MalformedCert(String),

    /// The certificate or key uses an unsupported format, notably a
    /// V3 primary key presented for a certification operation.
    #[error("Unsupported certificate: {0}")]
    UnsupportedCert(String),

    /// The CSPRNG failed to produce randomness.
    #[error("RNG failure: {0}")]
    Rng(String),

    /// Generic I/O failure from a source or sink.
    #[error("I/O error: {0}")]
    Io(String),

    /// A path into a `PacketPile` or similar tree referred to a
    /// packet, or a number of packets, that don't exist.
    #[error("Index out of range")]
    IndexOutOfRange,

    /// A [`Policy`](crate::policy::Policy) rejected an algorithm,
    /// packet type, or key for the reference time in effect.
    #[error("Policy violation: {0}")]
    PolicyViolation(String),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}

pub use packet::Packet;

/// A deserialized sequence of OpenPGP packets, retaining their tree
/// structure.
///
/// To deserialize a byte stream into a `PacketPile`, use
/// [`Parse`](parse::Parse), e.g. `PacketPile::from_bytes`. Most
/// callers will instead want to turn the stream into a [`Cert`] or
/// read it with a streaming [`PacketParser`](parse::PacketParser),
/// since buffering the whole message in memory as a `PacketPile` is
/// wasteful for anything but small messages or tests.
#[derive(PartialEq, Eq, Clone)]
pub struct PacketPile {
    top_level: Container,
}

pub use fingerprint::Fingerprint;
pub use keyid::KeyID;
pub use types::SignatureType;
