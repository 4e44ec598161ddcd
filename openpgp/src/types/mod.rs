//! Algorithm identifiers and other wire-level enumerations.
//!
//! OpenPGP identifies most things -- public-key algorithms, symmetric
//! ciphers, hash functions, compression schemes, elliptic curves,
//! signature types -- by a single octet registered in [RFC 4880]'s IANA
//! considerations. Each enum below round-trips that octet and carries
//! the capability profile the rest of the crate needs to reason about
//! it (what operations an algorithm supports, its key or digest
//! length, and so on).
//!
//! [RFC 4880]: https://tools.ietf.org/html/rfc4880#section-9

use std::fmt;

mod server_preferences;
pub use server_preferences::KeyServerPreferences;
mod key_flags;
pub use key_flags::KeyFlags;
mod features;
pub use features::Features;
mod timestamp;
pub use timestamp::Timestamp;
mod misc;
pub use misc::{AEADAlgorithm, Duration, ReasonForRevocation, RevocationKey};

/// Truncates `t` to whole-second resolution, matching the precision
/// OpenPGP timestamps carry on the wire.
pub fn normalize_systemtime(t: std::time::SystemTime) -> std::time::SystemTime {
    match t.duration_since(std::time::UNIX_EPOCH) {
        Ok(d) => std::time::UNIX_EPOCH + std::time::Duration::new(d.as_secs(), 0),
        Err(e) => std::time::UNIX_EPOCH - std::time::Duration::new(
            e.duration().as_secs(), 0),
    }
}

/// An operation a public-key algorithm may or may not support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Can produce and verify signatures.
    Sign,
    /// Can only verify signatures (e.g. RSA Sign-Only used as a
    /// verifier).
    Verify,
    /// Can wrap/unwrap a session key (the recipient side of PK-ESK).
    EncryptSessionKey,
    /// Can unwrap a session key it is the recipient of.
    DecryptSessionKey,
}

/// The public-key algorithm of a key or signature.
///
/// See [Section 9.1 of RFC 4880] and the ECC additions in
/// [RFC 6637]/[RFC 4880bis].
///
/// [Section 9.1 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-9.1
/// [RFC 6637]: https://tools.ietf.org/html/rfc6637
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[non_exhaustive]
pub enum PublicKeyAlgorithm {
    /// RSA, usable for both signing and encryption.
    RSAEncryptSign,
    /// RSA, encryption only (deprecated).
    RSAEncrypt,
    /// RSA, signing only (deprecated).
    RSASign,
    /// ElGamal, encryption only.
    ElGamalEncrypt,
    /// DSA.
    DSA,
    /// ElGamal, encryption and signing (deprecated, never emitted).
    ElGamalEncryptSign,
    /// Elliptic-curve Diffie-Hellman (RFC 6637).
    ECDH,
    /// Elliptic-curve DSA (RFC 6637).
    ECDSA,
    /// EdDSA (RFC 4880bis).
    EdDSA,
    /// SM2 (Chinese national standard signature/encryption).
    SM2,
    /// An unknown algorithm, with its wire octet preserved.
    Unknown(u8),
}

impl PublicKeyAlgorithm {
    /// Returns the wire octet for this algorithm.
    pub fn octet(&self) -> u8 {
        use PublicKeyAlgorithm::*;
        match self {
            RSAEncryptSign => 1,
            RSAEncrypt => 2,
            RSASign => 3,
            ElGamalEncrypt => 16,
            DSA => 17,
            ECDH => 18,
            ECDSA => 19,
            ElGamalEncryptSign => 20,
            EdDSA => 22,
            SM2 => 21, // matches rnp's private assignment for SM2 signatures
            Unknown(o) => *o,
        }
    }

    /// Parses the wire octet.
    pub fn from_octet(o: u8) -> Self {
        use PublicKeyAlgorithm::*;
        match o {
            1 => RSAEncryptSign,
            2 => RSAEncrypt,
            3 => RSASign,
            16 => ElGamalEncrypt,
            17 => DSA,
            18 => ECDH,
            19 => ECDSA,
            20 => ElGamalEncryptSign,
            21 => SM2,
            22 => EdDSA,
            o => Unknown(o),
        }
    }

    /// Returns whether this algorithm supports `capability`.
    pub fn supports(&self, capability: Capability) -> bool {
        use Capability::*;
        use PublicKeyAlgorithm::*;
        match (self, capability) {
            (RSAEncryptSign, Sign | Verify | EncryptSessionKey | DecryptSessionKey) => true,
            (RSAEncrypt, EncryptSessionKey | DecryptSessionKey) => true,
            (RSASign, Sign | Verify) => true,
            (ElGamalEncrypt, EncryptSessionKey | DecryptSessionKey) => true,
            (ElGamalEncryptSign, _) => true,
            (DSA, Sign | Verify) => true,
            (ECDH, EncryptSessionKey | DecryptSessionKey) => true,
            (ECDSA, Sign | Verify) => true,
            (EdDSA, Sign | Verify) => true,
            (SM2, Sign | Verify | EncryptSessionKey | DecryptSessionKey) => true,
            _ => false,
        }
    }
}

impl fmt::Display for PublicKeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use PublicKeyAlgorithm::*;
        match self {
            RSAEncryptSign => write!(f, "RSA"),
            RSAEncrypt => write!(f, "RSA (Encrypt-Only)"),
            RSASign => write!(f, "RSA (Sign-Only)"),
            ElGamalEncrypt => write!(f, "ElGamal (Encrypt-Only)"),
            DSA => write!(f, "DSA"),
            ECDH => write!(f, "ECDH"),
            ECDSA => write!(f, "ECDSA"),
            ElGamalEncryptSign => write!(f, "ElGamal (Encrypt and Sign)"),
            EdDSA => write!(f, "EdDSA"),
            SM2 => write!(f, "SM2"),
            Unknown(o) => write!(f, "Unknown({})", o),
        }
    }
}

/// The symmetric-key algorithm used to protect a data packet or a
/// secret key.
///
/// See [Section 9.2 of RFC 4880].
///
/// [Section 9.2 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-9.2
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum SymmetricAlgorithm {
    /// Plaintext, unencrypted data (only valid for the S2K "usage"
    /// octet of a secret key, never for a data packet).
    Plaintext,
    /// IDEA.
    IDEA,
    /// Triple-DES (EDE, 168 bit).
    TripleDES,
    /// CAST5, 128-bit key.
    CAST5,
    /// Blowfish.
    Blowfish,
    /// AES with a 128-bit key.
    AES128,
    /// AES with a 192-bit key.
    AES192,
    /// AES with a 256-bit key.
    AES256,
    /// Twofish, 256-bit key.
    Twofish,
    /// Camellia with a 128-bit key.
    Camellia128,
    /// Camellia with a 192-bit key.
    Camellia192,
    /// Camellia with a 256-bit key.
    Camellia256,
    /// SM4.
    SM4,
    /// An unknown algorithm, with its wire octet preserved.
    Unknown(u8),
}

impl SymmetricAlgorithm {
    /// Returns the wire octet.
    pub fn octet(&self) -> u8 {
        use SymmetricAlgorithm::*;
        match self {
            Plaintext => 0,
            IDEA => 1,
            TripleDES => 2,
            CAST5 => 3,
            Blowfish => 4,
            AES128 => 7,
            AES192 => 8,
            AES256 => 9,
            Twofish => 10,
            Camellia128 => 11,
            Camellia192 => 12,
            Camellia256 => 13,
            SM4 => 104,
            Unknown(o) => *o,
        }
    }

    /// Parses the wire octet.
    pub fn from_octet(o: u8) -> Self {
        use SymmetricAlgorithm::*;
        match o {
            0 => Plaintext,
            1 => IDEA,
            2 => TripleDES,
            3 => CAST5,
            4 => Blowfish,
            7 => AES128,
            8 => AES192,
            9 => AES256,
            10 => Twofish,
            11 => Camellia128,
            12 => Camellia192,
            13 => Camellia256,
            104 => SM4,
            o => Unknown(o),
        }
    }

    /// Returns the cipher's block size in octets.
    pub fn block_size(&self) -> Option<usize> {
        use SymmetricAlgorithm::*;
        match self {
            Plaintext => None,
            IDEA | TripleDES | CAST5 | Blowfish => Some(8),
            AES128 | AES192 | AES256 | Twofish | Camellia128 | Camellia192
            | Camellia256 | SM4 => Some(16),
            Unknown(_) => None,
        }
    }

    /// Returns the cipher's key size in octets.
    pub fn key_size(&self) -> Option<usize> {
        use SymmetricAlgorithm::*;
        match self {
            Plaintext => Some(0),
            IDEA => Some(16),
            TripleDES => Some(24),
            CAST5 => Some(16),
            Blowfish => Some(16),
            AES128 => Some(16),
            AES192 => Some(24),
            AES256 | Twofish => Some(32),
            Camellia128 => Some(16),
            Camellia192 => Some(24),
            Camellia256 | SM4 => Some(32),
            Unknown(_) => None,
        }
    }
}

impl fmt::Display for SymmetricAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use SymmetricAlgorithm::*;
        let s = match self {
            Plaintext => "Plaintext",
            IDEA => "IDEA",
            TripleDES => "TripleDES",
            CAST5 => "CAST5",
            Blowfish => "Blowfish",
            AES128 => "AES128",
            AES192 => "AES192",
            AES256 => "AES256",
            Twofish => "Twofish",
            Camellia128 => "Camellia128",
            Camellia192 => "Camellia192",
            Camellia256 => "Camellia256",
            SM4 => "SM4",
            Unknown(o) => return write!(f, "Unknown({})", o),
        };
        f.write_str(s)
    }
}

/// A hash algorithm.
///
/// See [Section 9.4 of RFC 4880].
///
/// [Section 9.4 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-9.4
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum HashAlgorithm {
    /// MD5.
    MD5,
    /// SHA-1.
    SHA1,
    /// RIPEMD-160.
    RipeMD160,
    /// SHA-224.
    SHA224,
    /// SHA-256.
    SHA256,
    /// SHA-384.
    SHA384,
    /// SHA-512.
    SHA512,
    /// SM3.
    SM3,
    /// An unknown algorithm, with its wire octet preserved.
    Unknown(u8),
}

impl HashAlgorithm {
    /// Returns the wire octet.
    pub fn octet(&self) -> u8 {
        use HashAlgorithm::*;
        match self {
            MD5 => 1,
            SHA1 => 2,
            RipeMD160 => 3,
            SHA256 => 8,
            SHA384 => 9,
            SHA512 => 10,
            SHA224 => 11,
            SM3 => 105,
            Unknown(o) => *o,
        }
    }

    /// Parses the wire octet.
    pub fn from_octet(o: u8) -> Self {
        use HashAlgorithm::*;
        match o {
            1 => MD5,
            2 => SHA1,
            3 => RipeMD160,
            8 => SHA256,
            9 => SHA384,
            10 => SHA512,
            11 => SHA224,
            105 => SM3,
            o => Unknown(o),
        }
    }

    /// Returns the digest length in octets.
    pub fn digest_size(&self) -> Option<usize> {
        use HashAlgorithm::*;
        match self {
            MD5 => Some(16),
            SHA1 | RipeMD160 => Some(20),
            SHA224 => Some(28),
            SHA256 | SM3 => Some(32),
            SHA384 => Some(48),
            SHA512 => Some(64),
            Unknown(_) => None,
        }
    }

    /// Name as it appears in a `VerifyResult`, e.g. `"SHA256"`.
    pub fn name(&self) -> String {
        self.to_string()
    }
}

impl From<HashAlgorithm> for u8 {
    fn from(h: HashAlgorithm) -> Self {
        h.octet()
    }
}

impl From<u8> for HashAlgorithm {
    fn from(o: u8) -> Self {
        HashAlgorithm::from_octet(o)
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use HashAlgorithm::*;
        let s = match self {
            MD5 => "MD5",
            SHA1 => "SHA1",
            RipeMD160 => "RIPEMD160",
            SHA224 => "SHA224",
            SHA256 => "SHA256",
            SHA384 => "SHA384",
            SHA512 => "SHA512",
            SM3 => "SM3",
            Unknown(o) => return write!(f, "Unknown({})", o),
        };
        f.write_str(s)
    }
}

/// A compression algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CompressionAlgorithm {
    /// No compression.
    Uncompressed,
    /// Raw DEFLATE.
    Zip,
    /// Zlib-wrapped DEFLATE.
    Zlib,
    /// BZip2.
    BZip2,
    /// An unknown algorithm.
    Unknown(u8),
}

impl CompressionAlgorithm {
    /// Returns the wire octet.
    pub fn octet(&self) -> u8 {
        use CompressionAlgorithm::*;
        match self {
            Uncompressed => 0,
            Zip => 1,
            Zlib => 2,
            BZip2 => 3,
            Unknown(o) => *o,
        }
    }

    /// Parses the wire octet.
    pub fn from_octet(o: u8) -> Self {
        use CompressionAlgorithm::*;
        match o {
            0 => Uncompressed,
            1 => Zip,
            2 => Zlib,
            3 => BZip2,
            o => Unknown(o),
        }
    }
}

impl fmt::Display for CompressionAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use CompressionAlgorithm::*;
        let s = match self {
            Uncompressed => "Uncompressed",
            Zip => "ZIP",
            Zlib => "ZLIB",
            BZip2 => "BZip2",
            Unknown(o) => return write!(f, "Unknown({})", o),
        };
        f.write_str(s)
    }
}

/// The format of a Literal Data packet's content, per [Section 5.9 of
/// RFC 4880].
///
/// [Section 5.9 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.9
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum DataFormat {
    /// Binary data.
    Binary,
    /// Text data, possibly with line endings normalized to CRLF on
    /// the wire.
    Text,
    /// Text data, declared to be UTF-8.
    Unicode,
    /// An unknown format octet.
    Unknown(u8),
}

impl DataFormat {
    /// Returns the wire octet.
    pub fn octet(&self) -> u8 {
        use DataFormat::*;
        match self {
            Binary => b'b',
            Text => b't',
            Unicode => b'u',
            Unknown(o) => *o,
        }
    }

    /// Parses the wire octet.
    pub fn from_octet(o: u8) -> Self {
        use DataFormat::*;
        match o {
            b'b' => Binary,
            b't' => Text,
            b'u' => Unicode,
            o => Unknown(o),
        }
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use DataFormat::*;
        let s = match self {
            Binary => "Binary",
            Text => "Text",
            Unicode => "Unicode",
            Unknown(o) => return write!(f, "Unknown({})", o),
        };
        f.write_str(s)
    }
}

/// A named elliptic curve.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Curve {
    /// NIST P-256.
    NistP256,
    /// NIST P-384.
    NistP384,
    /// NIST P-521.
    NistP521,
    /// Curve25519, as used for ECDH.
    Cv25519,
    /// Ed25519, as used for EdDSA.
    Ed25519,
    /// SM2 over a 256-bit prime field.
    SM2P256,
    /// An unrecognized curve, with its wire OID preserved.
    Unknown(Box<[u8]>),
}

impl Curve {
    /// Returns the curve's field size in bits.
    pub fn bits(&self) -> Option<usize> {
        use Curve::*;
        match self {
            NistP256 | Cv25519 | Ed25519 | SM2P256 => Some(256),
            NistP384 => Some(384),
            NistP521 => Some(521),
            Unknown(_) => None,
        }
    }

    /// Returns the curve's registered wire OID.
    pub fn oid(&self) -> &[u8] {
        use Curve::*;
        match self {
            NistP256 => &[0x2A, 0x86, 0x48, 0xCE, 0x3D, 0x03, 0x01, 0x07],
            NistP384 => &[0x2B, 0x81, 0x04, 0x00, 0x22],
            NistP521 => &[0x2B, 0x81, 0x04, 0x00, 0x23],
            Cv25519 => &[0x2B, 0x06, 0x01, 0x04, 0x01, 0x97, 0x55, 0x01, 0x05, 0x01],
            Ed25519 => &[0x2B, 0x06, 0x01, 0x04, 0x01, 0xDA, 0x47, 0x0F, 0x01],
            SM2P256 => &[0x2A, 0x81, 0x1C, 0xCF, 0x55, 0x01, 0x82, 0x2D],
            Unknown(oid) => oid,
        }
    }

    /// Looks up a curve by its wire OID.
    pub fn from_oid(oid: &[u8]) -> Self {
        use Curve::*;
        for c in [NistP256, NistP384, NistP521, Cv25519, Ed25519, SM2P256] {
            if c.oid() == oid {
                return c;
            }
        }
        Unknown(oid.into())
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use Curve::*;
        match self {
            NistP256 => write!(f, "NIST P-256"),
            NistP384 => write!(f, "NIST P-384"),
            NistP521 => write!(f, "NIST P-521"),
            Cv25519 => write!(f, "Curve25519"),
            Ed25519 => write!(f, "Ed25519"),
            SM2P256 => write!(f, "SM2 P-256"),
            Unknown(oid) => write!(f, "Unknown curve (OID {:?})", oid),
        }
    }
}

/// The type of a signature, per [Section 5.2.1 of RFC 4880].
///
/// [Section 5.2.1 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.2.1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum SignatureType {
    /// Signature over a binary document.
    Binary,
    /// Signature over a canonicalized text document.
    Text,
    /// Standalone signature (no signed data beyond the trailer).
    Standalone,
    /// Generic User ID certification (no assertion about checking).
    GenericCertification,
    /// Persona certification (no verification at all).
    PersonaCertification,
    /// Casual certification (some verification).
    CasualCertification,
    /// Positive certification (substantial verification).
    PositiveCertification,
    /// Subkey binding signature.
    SubkeyBinding,
    /// Primary key binding signature (embedded in a SubkeyBinding to
    /// prove the subkey holds the primary's private half too, i.e. it
    /// is sign-capable).
    PrimaryKeyBinding,
    /// Direct signature over a key, not over a User ID.
    DirectKey,
    /// Whole-key revocation.
    KeyRevocation,
    /// Subkey revocation.
    SubkeyRevocation,
    /// User ID / certification revocation.
    CertificationRevocation,
    /// Timestamp signature.
    Timestamp,
    /// Third-party confirmation signature.
    ThirdPartyConfirmation,
    /// An unknown type.
    Unknown(u8),
}

impl SignatureType {
    /// Returns the wire octet.
    pub fn octet(&self) -> u8 {
        use SignatureType::*;
        match self {
            Binary => 0x00,
            Text => 0x01,
            Standalone => 0x02,
            GenericCertification => 0x10,
            PersonaCertification => 0x11,
            CasualCertification => 0x12,
            PositiveCertification => 0x13,
            SubkeyBinding => 0x18,
            PrimaryKeyBinding => 0x19,
            DirectKey => 0x1F,
            KeyRevocation => 0x20,
            SubkeyRevocation => 0x28,
            CertificationRevocation => 0x30,
            Timestamp => 0x40,
            ThirdPartyConfirmation => 0x50,
            Unknown(o) => *o,
        }
    }

    /// Parses the wire octet.
    pub fn from_octet(o: u8) -> Self {
        use SignatureType::*;
        match o {
            0x00 => Binary,
            0x01 => Text,
            0x02 => Standalone,
            0x10 => GenericCertification,
            0x11 => PersonaCertification,
            0x12 => CasualCertification,
            0x13 => PositiveCertification,
            0x18 => SubkeyBinding,
            0x19 => PrimaryKeyBinding,
            0x1F => DirectKey,
            0x20 => KeyRevocation,
            0x28 => SubkeyRevocation,
            0x30 => CertificationRevocation,
            0x40 => Timestamp,
            0x50 => ThirdPartyConfirmation,
            o => Unknown(o),
        }
    }

    /// True for any of the four User ID certification flavors.
    pub fn is_certification(&self) -> bool {
        use SignatureType::*;
        matches!(self, GenericCertification | PersonaCertification
                 | CasualCertification | PositiveCertification)
    }
}

impl fmt::Display for SignatureType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A reason code for a revocation signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum RevocationReason {
    /// No reason given.
    Unspecified,
    /// The key has been superseded.
    KeySuperseded,
    /// The key material has been compromised.
    KeyCompromised,
    /// The key is retired and no longer used.
    KeyRetired,
    /// The User ID is no longer valid.
    UIDRetired,
    /// An unknown reason code.
    Unknown(u8),
}

impl RevocationReason {
    /// Returns the wire octet.
    pub fn octet(&self) -> u8 {
        use RevocationReason::*;
        match self {
            Unspecified => 0,
            KeySuperseded => 1,
            KeyCompromised => 2,
            KeyRetired => 3,
            UIDRetired => 32,
            Unknown(o) => *o,
        }
    }

    /// Parses the wire octet.
    pub fn from_octet(o: u8) -> Self {
        use RevocationReason::*;
        match o {
            0 => Unspecified,
            1 => KeySuperseded,
            2 => KeyCompromised,
            3 => KeyRetired,
            32 => UIDRetired,
            o => Unknown(o),
        }
    }
}
