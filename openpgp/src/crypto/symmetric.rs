//! Symmetric encryption.
//!
//! Implements the CFB-mode constructions OpenPGP uses: the plain
//! (unauthenticated, pre-RFC-4880bis) construction and the
//! Modification Detection Code (MDC, Symmetrically Encrypted
//! Integrity Protected Data) construction that wraps it with a
//! SHA-1 MAC over the plaintext, per Section 5.13 of RFC 4880.

use aes::{Aes128, Aes192, Aes256};
use cast5::Cast5;
use cfb_mode::cipher::{AsyncStreamCipher, KeyIvInit};
use cfb_mode::{Decryptor, Encryptor};
use twofish::Twofish;

use crate::types::{HashAlgorithm, SymmetricAlgorithm};
use crate::Error;
use crate::Result;

impl SymmetricAlgorithm {
    /// Whether this crate implements this algorithm for actual
    /// encryption/decryption (as opposed to just representing its
    /// wire octet).
    pub fn is_supported(self) -> bool {
        matches!(self,
                 SymmetricAlgorithm::AES128 | SymmetricAlgorithm::AES192
                 | SymmetricAlgorithm::AES256 | SymmetricAlgorithm::CAST5
                 | SymmetricAlgorithm::Twofish)
    }
}

macro_rules! cfb_encrypt {
    ($cipher:ty, $key:expr, $iv:expr, $buf:expr) => {{
        Encryptor::<$cipher>::new_from_slices($key, $iv)
            .map_err(|e| Error::InvalidArgument(e.to_string()))?
            .encrypt($buf);
    }};
}

macro_rules! cfb_decrypt {
    ($cipher:ty, $key:expr, $iv:expr, $buf:expr) => {{
        Decryptor::<$cipher>::new_from_slices($key, $iv)
            .map_err(|e| Error::InvalidArgument(e.to_string()))?
            .decrypt($buf);
    }};
}

/// Encrypts `plaintext` in place using plain (unchained-resync) CFB
/// mode with an all-zero IV, as used by Symmetrically Encrypted Data
/// packets (Tag 9) and by the S2K-protected private key blobs.
pub fn cfb_encrypt(algo: SymmetricAlgorithm, key: &[u8], iv: &[u8], buf: &mut [u8]) -> Result<()> {
    match algo {
        SymmetricAlgorithm::AES128 => cfb_encrypt!(Aes128, key, iv, buf),
        SymmetricAlgorithm::AES192 => cfb_encrypt!(Aes192, key, iv, buf),
        SymmetricAlgorithm::AES256 => cfb_encrypt!(Aes256, key, iv, buf),
        SymmetricAlgorithm::CAST5 => cfb_encrypt!(Cast5, key, iv, buf),
        SymmetricAlgorithm::Twofish => cfb_encrypt!(Twofish, key, iv, buf),
        _ => return Err(Error::UnsupportedSymmetricAlgorithm(algo).into()),
    }
    Ok(())
}

/// Decrypts `ciphertext` in place; see [`cfb_encrypt`].
pub fn cfb_decrypt(algo: SymmetricAlgorithm, key: &[u8], iv: &[u8], buf: &mut [u8]) -> Result<()> {
    match algo {
        SymmetricAlgorithm::AES128 => cfb_decrypt!(Aes128, key, iv, buf),
        SymmetricAlgorithm::AES192 => cfb_decrypt!(Aes192, key, iv, buf),
        SymmetricAlgorithm::AES256 => cfb_decrypt!(Aes256, key, iv, buf),
        SymmetricAlgorithm::CAST5 => cfb_decrypt!(Cast5, key, iv, buf),
        SymmetricAlgorithm::Twofish => cfb_decrypt!(Twofish, key, iv, buf),
        _ => return Err(Error::UnsupportedSymmetricAlgorithm(algo).into()),
    }
    Ok(())
}

/// Encrypts `plaintext` for a Symmetrically Encrypted Integrity
/// Protected Data packet (Tag 18): prepends a block-size-plus-two
/// random-prefix-with-repeat (the OpenPGP "quick check"), appends
/// the MDC trailer `0xD3 0x14 || SHA1(prefix || plaintext ||
/// 0xD3 0x14)`, then CFB-encrypts the whole thing with a zero IV
/// and the CFB "resync" disabled (true OpenPGP CFB, not plain CFB:
/// the first two prefix-repeat bytes are re-fed as part of the
/// stream rather than skipped).
pub fn seip_encrypt(
    algo: SymmetricAlgorithm,
    key: &[u8],
    plaintext: &[u8],
    prefix_random: &[u8],
) -> Result<Vec<u8>> {
    let bs = algo.block_size().ok_or(Error::UnsupportedSymmetricAlgorithm(algo))?;
    if prefix_random.len() != bs {
        return Err(Error::InvalidArgument("prefix must be one block".into()).into());
    }

    let mut body = Vec::with_capacity(bs + 2 + plaintext.len() + 22);
    body.extend_from_slice(prefix_random);
    body.push(prefix_random[bs - 2]);
    body.push(prefix_random[bs - 1]);
    body.extend_from_slice(plaintext);

    let mut hash = HashAlgorithm::SHA1.context()?;
    hash.update(&body);
    hash.update([0xD3, 0x14]);
    let mdc = hash.digest();
    body.push(0xD3);
    body.push(0x14);
    body.extend_from_slice(&mdc);

    let iv = vec![0u8; bs];
    cfb_encrypt(algo, key, &iv, &mut body)?;
    Ok(body)
}

/// Decrypts and verifies a SEIP packet body produced by
/// [`seip_encrypt`], returning the plaintext with the prefix and MDC
/// trailer stripped.
pub fn seip_decrypt(algo: SymmetricAlgorithm, key: &[u8], body: &[u8]) -> Result<Vec<u8>> {
    let bs = algo.block_size().ok_or(Error::UnsupportedSymmetricAlgorithm(algo))?;
    if body.len() < bs + 2 + 22 {
        return Err(Error::MalformedPacket("SEIP body too short".into()).into());
    }

    let mut plain = body.to_vec();
    let iv = vec![0u8; bs];
    cfb_decrypt(algo, key, &iv, &mut plain)?;

    if plain[bs] != plain[bs - 2] || plain[bs + 1] != plain[bs - 1] {
        return Err(Error::ManipulatedMessage(
            "SEIP quick-check failed, wrong session key?".into()).into());
    }

    let trailer_start = plain.len() - 22;
    if plain[trailer_start] != 0xD3 || plain[trailer_start + 1] != 0x14 {
        return Err(Error::ManipulatedMessage(
            "SEIP packet missing MDC marker".into()).into());
    }

    let mut hash = HashAlgorithm::SHA1.context()?;
    hash.update(&plain[..trailer_start + 2]);
    let want = hash.digest();
    let got = &plain[trailer_start + 2..];
    if crate::crypto::mem::secure_cmp(&want, got) != std::cmp::Ordering::Equal {
        return Err(Error::ManipulatedMessage(
            "SEIP MDC digest mismatch".into()).into());
    }

    plain.drain(trailer_start..);
    plain.drain(..bs + 2);
    Ok(plain)
}

/// Encrypts `plaintext` in place with CBC mode and no padding; the
/// caller is responsible for padding `plaintext` to a block boundary
/// (used by the gpg-agent private-key file format, which pads with
/// `X` octets rather than PKCS#7).
///
/// Only AES-128 and AES-256 are needed here, since those are the only
/// ciphers the private-key file format's protection modes name.
pub fn cbc_encrypt_nopad(
    algo: SymmetricAlgorithm,
    key: &[u8],
    iv: &[u8],
    buf: &mut [u8],
) -> Result<()> {
    use cbc::cipher::{BlockEncryptMut, KeyIvInit};
    match algo {
        SymmetricAlgorithm::AES128 => {
            let enc = cbc::Encryptor::<Aes128>::new_from_slices(key, iv)
                .map_err(|e| Error::InvalidArgument(e.to_string()))?;
            enc.encrypt_padded_mut::<block_padding::NoPadding>(buf, buf.len())
                .map_err(|e| Error::InvalidArgument(e.to_string()))?;
        }
        SymmetricAlgorithm::AES256 => {
            let enc = cbc::Encryptor::<Aes256>::new_from_slices(key, iv)
                .map_err(|e| Error::InvalidArgument(e.to_string()))?;
            enc.encrypt_padded_mut::<block_padding::NoPadding>(buf, buf.len())
                .map_err(|e| Error::InvalidArgument(e.to_string()))?;
        }
        _ => return Err(Error::UnsupportedSymmetricAlgorithm(algo).into()),
    }
    Ok(())
}

/// Decrypts `ciphertext` in place with CBC mode and no padding; see
/// [`cbc_encrypt_nopad`].
pub fn cbc_decrypt_nopad(
    algo: SymmetricAlgorithm,
    key: &[u8],
    iv: &[u8],
    buf: &mut [u8],
) -> Result<()> {
    use cbc::cipher::{BlockDecryptMut, KeyIvInit};
    match algo {
        SymmetricAlgorithm::AES128 => {
            let dec = cbc::Decryptor::<Aes128>::new_from_slices(key, iv)
                .map_err(|e| Error::InvalidArgument(e.to_string()))?;
            dec.decrypt_padded_mut::<block_padding::NoPadding>(buf)
                .map_err(|e| Error::InvalidArgument(e.to_string()))?;
        }
        SymmetricAlgorithm::AES256 => {
            let dec = cbc::Decryptor::<Aes256>::new_from_slices(key, iv)
                .map_err(|e| Error::InvalidArgument(e.to_string()))?;
            dec.decrypt_padded_mut::<block_padding::NoPadding>(buf)
                .map_err(|e| Error::InvalidArgument(e.to_string()))?;
        }
        _ => return Err(Error::UnsupportedSymmetricAlgorithm(algo).into()),
    }
    Ok(())
}

/// Seals `plaintext` with AES-128 in OCB mode, as used by the
/// `openpgp-s2k3-ocb-aes` private-key protection mode.
pub fn ocb_aes128_seal(key: &[u8], nonce: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    use ocb3::aead::{Aead, KeyInit};
    use ocb3::aead::generic_array::GenericArray;
    let cipher = ocb3::Ocb3::<Aes128>::new_from_slice(key)
        .map_err(|e| Error::InvalidArgument(e.to_string()))?;
    cipher.encrypt(GenericArray::from_slice(nonce), plaintext)
        .map_err(|_| Error::InvalidOperation("OCB seal failed".into()).into())
}

/// Opens a ciphertext produced by [`ocb_aes128_seal`]; fails if the
/// authentication tag does not verify.
pub fn ocb_aes128_open(key: &[u8], nonce: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    use ocb3::aead::{Aead, KeyInit};
    use ocb3::aead::generic_array::GenericArray;
    let cipher = ocb3::Ocb3::<Aes128>::new_from_slice(key)
        .map_err(|e| Error::InvalidArgument(e.to_string()))?;
    cipher.decrypt(GenericArray::from_slice(nonce), ciphertext)
        .map_err(|_| Error::BadPassword.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cfb_roundtrip() {
        let key = [0x42u8; 16];
        let iv = [0u8; 16];
        let mut buf = b"hello, openpgp!!".to_vec();
        let orig = buf.clone();
        cfb_encrypt(SymmetricAlgorithm::AES128, &key, &iv, &mut buf).unwrap();
        assert_ne!(buf, orig);
        cfb_decrypt(SymmetricAlgorithm::AES128, &key, &iv, &mut buf).unwrap();
        assert_eq!(buf, orig);
    }

    #[test]
    fn seip_roundtrip() {
        let key = [0x11u8; 16];
        let prefix = [0x22u8; 16];
        let plaintext = b"the quick brown fox jumps over the lazy dog";
        let ct = seip_encrypt(SymmetricAlgorithm::AES128, &key, plaintext, &prefix).unwrap();
        let pt = seip_decrypt(SymmetricAlgorithm::AES128, &key, &ct).unwrap();
        assert_eq!(pt, plaintext);
    }

    #[test]
    fn seip_detects_tampering() {
        let key = [0x11u8; 16];
        let prefix = [0x22u8; 16];
        let mut ct = seip_encrypt(SymmetricAlgorithm::AES128, &key, b"payload", &prefix).unwrap();
        let last = ct.len() - 1;
        ct[last] ^= 0xff;
        assert!(seip_decrypt(SymmetricAlgorithm::AES128, &key, &ct).is_err());
    }

    #[test]
    fn cbc_roundtrip() {
        let key = [0x33u8; 32];
        let iv = [0x44u8; 16];
        let mut buf = b"sixteen byte blk".to_vec();
        let orig = buf.clone();
        cbc_encrypt_nopad(SymmetricAlgorithm::AES256, &key, &iv, &mut buf).unwrap();
        assert_ne!(buf, orig);
        cbc_decrypt_nopad(SymmetricAlgorithm::AES256, &key, &iv, &mut buf).unwrap();
        assert_eq!(buf, orig);
    }

    #[test]
    fn ocb_roundtrip_and_detects_tampering() {
        let key = [0x55u8; 16];
        let nonce = [0x66u8; 12];
        let ct = ocb_aes128_seal(&key, &nonce, b"protected private key").unwrap();
        let pt = ocb_aes128_open(&key, &nonce, &ct).unwrap();
        assert_eq!(pt, b"protected private key");

        let mut tampered = ct.clone();
        let last = tampered.len() - 1;
        tampered[last] ^= 1;
        assert!(ocb_aes128_open(&key, &nonce, &tampered).is_err());
    }
}
