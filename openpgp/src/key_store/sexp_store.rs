//! Per-key protected secret-key files.
//!
//! Each file holds exactly one top-level canonical S-expression,
//! either `(private-key (alg ...))` (unprotected) or
//! `(protected-private-key (alg (...public...) (protected MODE
//! (PARAMS) CIPHERTEXT) (protected-at "YYYYMMDDTHHMMSS")))`. These
//! live one-per-key, named by the key's grip, alongside a keybox or
//! transferable-format file holding the matching public material.

use rand::rngs::OsRng;
use rand::RngCore;

use crate::crypto::mpi::{self, MPI, ProtectedMPI};
use crate::crypto::s2k::S2K;
use crate::crypto::sexp::{Sexp, String_};
use crate::crypto::symmetric;
use crate::types::{Curve, PublicKeyAlgorithm, SymmetricAlgorithm};
use crate::{Error, Result};

/// The cipher/mode/KDF-hash triple named by a `(protected MODE ...)`
/// block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtectionMode {
    /// `openpgp-s2k3-sha1-aes-cbc`: AES-128, CBC, SHA-1 KDF.
    Sha1AesCbc,
    /// `openpgp-s2k3-sha1-aes256-cbc`: AES-256, CBC, SHA-1 KDF.
    Sha1Aes256Cbc,
    /// `openpgp-s2k3-ocb-aes`: AES-128, OCB, SHA-1 KDF.
    Sha1OcbAes,
}

impl ProtectionMode {
    fn name(self) -> &'static str {
        match self {
            ProtectionMode::Sha1AesCbc => "openpgp-s2k3-sha1-aes-cbc",
            ProtectionMode::Sha1Aes256Cbc => "openpgp-s2k3-sha1-aes256-cbc",
            ProtectionMode::Sha1OcbAes => "openpgp-s2k3-ocb-aes",
        }
    }

    fn from_name(name: &[u8]) -> Result<Self> {
        match name {
            b"openpgp-s2k3-sha1-aes-cbc" => Ok(ProtectionMode::Sha1AesCbc),
            b"openpgp-s2k3-sha1-aes256-cbc" => Ok(ProtectionMode::Sha1Aes256Cbc),
            b"openpgp-s2k3-ocb-aes" => Ok(ProtectionMode::Sha1OcbAes),
            _ => Err(Error::UnsupportedCert(format!(
                "unsupported protection mode {:?}", String::from_utf8_lossy(name))).into()),
        }
    }

    fn sym_algo(self) -> SymmetricAlgorithm {
        match self {
            ProtectionMode::Sha1Aes256Cbc => SymmetricAlgorithm::AES256,
            ProtectionMode::Sha1AesCbc | ProtectionMode::Sha1OcbAes => SymmetricAlgorithm::AES128,
        }
    }

    /// Nonce/IV size: 16 for the CBC modes, 12 for OCB.
    fn nonce_size(self) -> usize {
        match self {
            ProtectionMode::Sha1OcbAes => 12,
            ProtectionMode::Sha1AesCbc | ProtectionMode::Sha1Aes256Cbc => 16,
        }
    }

    fn is_ocb(self) -> bool {
        matches!(self, ProtectionMode::Sha1OcbAes)
    }
}

/// The public-key-algorithm/secret-material pair a protected file
/// resolves to; the caller supplies the creation time (not stored in
/// this format) to build a full [`crate::packet::key::Key4`].
pub struct ParsedSecretKey {
    /// The public-key algorithm named by the `alg` symbol.
    pub pk_algo: PublicKeyAlgorithm,
    /// The public key material, read back from the unprotected half.
    pub public: mpi::PublicKey,
    /// The secret key material, present only if a password was given
    /// and it unlocked a protected file, or the file was unprotected.
    pub secret: Option<mpi::SecretKeyMaterial>,
}

fn atom(s: &str) -> Sexp {
    Sexp::String(String_::from(s.as_bytes()))
}

fn bytes_atom(b: &[u8]) -> Sexp {
    Sexp::String(String_::from(b))
}

/// Canonical-s-expression MPI encoding prepends a zero octet when the
/// value's high bit is set, so the big-number isn't misread as
/// negative; strips back off on the way in.
fn mpi_bytes(value: &[u8]) -> Vec<u8> {
    if value.first().map(|b| b & 0x80 != 0).unwrap_or(false) {
        let mut v = Vec::with_capacity(value.len() + 1);
        v.push(0);
        v.extend_from_slice(value);
        v
    } else {
        value.to_vec()
    }
}

fn mpi_from_bytes(bytes: &[u8]) -> MPI {
    if bytes.len() > 1 && bytes[0] == 0 && bytes[1] & 0x80 != 0 {
        MPI::new(&bytes[1..])
    } else {
        MPI::new(bytes)
    }
}

fn alg_name(pk_algo: PublicKeyAlgorithm) -> Result<&'static str> {
    use PublicKeyAlgorithm::*;
    #[allow(deprecated)]
    Ok(match pk_algo {
        RSAEncryptSign | RSAEncrypt | RSASign => "rsa",
        DSA => "dsa",
        ElGamalEncrypt | ElGamalEncryptSign => "elg",
        ECDSA => "ecdsa",
        ECDH => "ecdh",
        EdDSA => "eddsa",
        other => return Err(Error::UnsupportedPublicKeyAlgorithm(other).into()),
    })
}

fn alg_from_name(name: &[u8]) -> Result<PublicKeyAlgorithm> {
    use PublicKeyAlgorithm::*;
    Ok(match name {
        b"rsa" | b"openpgp-rsa" | b"oid.1.2.840.113549.1.1.1" => RSAEncryptSign,
        b"dsa" | b"openpgp-dsa" => DSA,
        b"elg" | b"elgamal" | b"openpgp-elg" | b"openpgp-elg-sig" => ElGamalEncrypt,
        b"ecc" | b"ecdsa" => ECDSA,
        b"ecdh" => ECDH,
        b"eddsa" => EdDSA,
        _ => return Err(Error::UnsupportedCert(format!(
            "unknown algorithm alias {:?}", String::from_utf8_lossy(name))).into()),
    })
}

fn curve_for(pk_algo: PublicKeyAlgorithm, name: &[u8]) -> Result<Curve> {
    let fail = || Error::UnsupportedCert(format!(
        "unknown curve alias {:?}", String::from_utf8_lossy(name))).into();
    let s = std::str::from_utf8(name).map_err(|_| fail())?;
    Ok(match s {
        "NIST P-256" | "1.2.840.10045.3.1.7" | "prime256v1" | "secp256r1" | "nistp256" =>
            Curve::NistP256,
        "NIST P-384" | "secp384r1" | "1.3.132.0.34" | "nistp384" => Curve::NistP384,
        "NIST P-521" | "secp521r1" | "1.3.132.0.35" | "nistp521" => Curve::NistP521,
        "Curve25519" | "1.3.6.1.4.1.3029.1.5.1" | "1.3.6.1.4.1.11591.15.1" | "Ed25519" => {
            if pk_algo == PublicKeyAlgorithm::ECDH { Curve::Cv25519 } else { Curve::Ed25519 }
        }
        _ => return Err(fail()),
    })
}

fn find_param<'s>(items: &'s [Sexp], name: &str) -> Option<&'s Sexp> {
    items.iter().find_map(|item| {
        let l = item.as_list()?;
        let head = l.first()?.as_string()?;
        if head.value() == name.as_bytes() { Some(item) } else { None }
    })
}

fn param_bytes<'s>(items: &'s [Sexp], name: &str) -> Result<&'s [u8]> {
    let list = find_param(items, name)
        .ok_or_else(|| Error::MalformedCert(format!("missing '{}' parameter", name)))?
        .as_list().unwrap();
    let v = list.get(1).and_then(Sexp::as_string)
        .ok_or_else(|| Error::MalformedCert(format!("'{}' has no value", name)))?;
    Ok(v.value())
}

/// Reads the public-key-algorithm-specific parameters off `children`
/// (the `(x VALUE) (y VALUE) ...` siblings following the algorithm
/// name), building the public half of the key material.
fn read_public(pk_algo: PublicKeyAlgorithm, children: &[Sexp]) -> Result<mpi::PublicKey> {
    use PublicKeyAlgorithm::*;
    Ok(match pk_algo {
        RSAEncryptSign | RSAEncrypt | RSASign => mpi::PublicKey::RSA {
            n: mpi_from_bytes(param_bytes(children, "n")?),
            e: mpi_from_bytes(param_bytes(children, "e")?),
        },
        DSA => mpi::PublicKey::DSA {
            p: mpi_from_bytes(param_bytes(children, "p")?),
            q: mpi_from_bytes(param_bytes(children, "q")?),
            g: mpi_from_bytes(param_bytes(children, "g")?),
            y: mpi_from_bytes(param_bytes(children, "y")?),
        },
        ElGamalEncrypt | ElGamalEncryptSign => mpi::PublicKey::ElGamal {
            p: mpi_from_bytes(param_bytes(children, "p")?),
            g: mpi_from_bytes(param_bytes(children, "g")?),
            y: mpi_from_bytes(param_bytes(children, "y")?),
        },
        ECDSA => mpi::PublicKey::ECDSA {
            curve: curve_for(pk_algo, param_bytes(children, "curve")?)?,
            q: mpi_from_bytes(param_bytes(children, "q")?),
        },
        EdDSA => mpi::PublicKey::EdDSA {
            curve: curve_for(pk_algo, param_bytes(children, "curve")?)?,
            q: mpi_from_bytes(param_bytes(children, "q")?),
        },
        ECDH => {
            let curve = curve_for(pk_algo, param_bytes(children, "curve")?)?;
            mpi::PublicKey::ECDH {
                curve,
                q: mpi_from_bytes(param_bytes(children, "q")?),
                hash: crate::types::HashAlgorithm::SHA256,
                sym: SymmetricAlgorithm::AES128,
            }
        }
        other => return Err(Error::UnsupportedPublicKeyAlgorithm(other).into()),
    })
}

/// Reads the secret-key-algorithm-specific parameters (`x`, `d`, or
/// `p`/`q`/`u` depending on algorithm) off `children`.
fn read_secret(pk_algo: PublicKeyAlgorithm, children: &[Sexp]) -> Result<mpi::SecretKeyMaterial> {
    use PublicKeyAlgorithm::*;
    Ok(match pk_algo {
        RSAEncryptSign | RSAEncrypt | RSASign => mpi::SecretKeyMaterial::RSA {
            d: ProtectedMPI::from(mpi_from_bytes(param_bytes(children, "d")?)),
            p: ProtectedMPI::from(mpi_from_bytes(param_bytes(children, "p")?)),
            q: ProtectedMPI::from(mpi_from_bytes(param_bytes(children, "q")?)),
            u: ProtectedMPI::from(mpi_from_bytes(param_bytes(children, "u")?)),
        },
        DSA => mpi::SecretKeyMaterial::DSA {
            x: ProtectedMPI::from(mpi_from_bytes(param_bytes(children, "x")?)),
        },
        ElGamalEncrypt | ElGamalEncryptSign => mpi::SecretKeyMaterial::ElGamal {
            x: ProtectedMPI::from(mpi_from_bytes(param_bytes(children, "x")?)),
        },
        ECDSA => mpi::SecretKeyMaterial::ECDSA {
            scalar: ProtectedMPI::from(mpi_from_bytes(param_bytes(children, "d")?)),
        },
        EdDSA => mpi::SecretKeyMaterial::EdDSA {
            scalar: ProtectedMPI::from(mpi_from_bytes(param_bytes(children, "d")?)),
        },
        ECDH => mpi::SecretKeyMaterial::ECDH {
            scalar: ProtectedMPI::from(mpi_from_bytes(param_bytes(children, "d")?)),
        },
        other => return Err(Error::UnsupportedPublicKeyAlgorithm(other).into()),
    })
}

fn public_params(pk_algo: PublicKeyAlgorithm, public: &mpi::PublicKey) -> Vec<Sexp> {
    use mpi::PublicKey::*;
    let pair = |name: &str, m: &MPI| Sexp::List(vec![atom(name), bytes_atom(&mpi_bytes(m.value()))]);
    match public {
        RSA { e, n } => vec![pair("n", n), pair("e", e)],
        DSA { p, q, g, y } => vec![pair("p", p), pair("q", q), pair("g", g), pair("y", y)],
        ElGamal { p, g, y } => vec![pair("p", p), pair("g", g), pair("y", y)],
        EdDSA { curve, q } | ECDSA { curve, q } => vec![
            Sexp::List(vec![atom("curve"), atom(&curve_name(pk_algo, *curve))]),
            pair("q", q),
        ],
        ECDH { curve, q, .. } => vec![
            Sexp::List(vec![atom("curve"), atom(&curve_name(pk_algo, *curve))]),
            pair("q", q),
        ],
        Unknown { .. } => vec![],
    }
}

fn curve_name(pk_algo: PublicKeyAlgorithm, curve: Curve) -> String {
    match (pk_algo, curve) {
        (PublicKeyAlgorithm::ECDH, Curve::Cv25519) => "Curve25519".to_string(),
        _ => curve.to_string(),
    }
}

fn secret_params(pk_algo: PublicKeyAlgorithm, secret: &mpi::SecretKeyMaterial) -> Vec<Sexp> {
    use mpi::SecretKeyMaterial::*;
    let pair = |name: &str, m: &ProtectedMPI|
        Sexp::List(vec![atom(name), bytes_atom(&mpi_bytes(m.value()))]);
    match secret {
        RSA { d, p, q, u } => vec![pair("d", d), pair("p", p), pair("q", q), pair("u", u)],
        DSA { x } | ElGamal { x } => vec![pair("x", x)],
        EdDSA { scalar } | ECDSA { scalar } | ECDH { scalar } => {
            let _ = pk_algo;
            vec![pair("d", scalar)]
        }
        Unknown { .. } => vec![],
    }
}

/// SHA-1 over the canonical encoding of the public parameters, the
/// secret parameters, and the `protected-at` block, concatenated in
/// that order; this is what the protection tag authenticates.
fn protection_hash(
    pk_algo: PublicKeyAlgorithm,
    public: &mpi::PublicKey,
    secret: &mpi::SecretKeyMaterial,
    protected_at: &[u8],
) -> Result<[u8; 20]> {
    let mut ctx = crate::types::HashAlgorithm::SHA1.context()?;
    let mut buf = Vec::new();
    for p in public_params(pk_algo, public) { p.serialize(&mut buf); }
    for p in secret_params(pk_algo, secret) { p.serialize(&mut buf); }
    Sexp::List(vec![atom("protected-at"), bytes_atom(protected_at)]).serialize(&mut buf);
    ctx.update(&buf);
    let digest = ctx.digest();
    let mut out = [0u8; 20];
    out.copy_from_slice(&digest);
    Ok(out)
}

/// Parses a `(private-key ...)` or `(protected-private-key ...)` file.
///
/// If the file is protected and `password` is `None`, `secret` comes
/// back empty rather than attempting decryption; the caller still
/// gets the public half and knows the key exists.
pub fn parse(data: &[u8], password: Option<&[u8]>) -> Result<ParsedSecretKey> {
    let top = Sexp::from_bytes(data)?;
    let top = top.as_list()
        .ok_or_else(|| Error::MalformedCert("expected a top-level list".into()))?;
    let kind = top.first().and_then(Sexp::as_string)
        .ok_or_else(|| Error::MalformedCert("missing private-key tag".into()))?;
    let protected = match kind.value() {
        b"private-key" => false,
        b"protected-private-key" => true,
        other => return Err(Error::MalformedCert(format!(
            "unsupported top-level tag {:?}", String::from_utf8_lossy(other))).into()),
    };

    let alg_sexp = top.get(1).and_then(Sexp::as_list)
        .ok_or_else(|| Error::MalformedCert("missing algorithm list".into()))?;
    let alg_name_bytes = alg_sexp.first().and_then(Sexp::as_string)
        .ok_or_else(|| Error::MalformedCert("missing algorithm name".into()))?;
    let pk_algo = alg_from_name(alg_name_bytes.value())?;
    let public = read_public(pk_algo, &alg_sexp[1..])?;

    if !protected {
        let secret = Some(read_secret(pk_algo, &alg_sexp[1..])?);
        return Ok(ParsedSecretKey { pk_algo, public, secret });
    }

    let protected_list = find_param(&alg_sexp[1..], "protected")
        .and_then(Sexp::as_list)
        .ok_or_else(|| Error::MalformedCert("missing protected block".into()))?;
    if protected_list.len() != 4 {
        return Err(Error::MalformedCert(
            "expected (protected MODE (PARAMS) CIPHERTEXT)".into()).into());
    }
    let mode = ProtectionMode::from_name(
        protected_list[1].as_string()
            .ok_or_else(|| Error::MalformedCert("protected mode is not a string".into()))?
            .value())?;
    let params = protected_list[2].as_list()
        .ok_or_else(|| Error::MalformedCert("expected (PARAMS) list".into()))?;
    if params.len() != 2 {
        return Err(Error::MalformedCert(
            "expected ((hash salt iterations) iv)".into()).into());
    }
    let kdf = params[0].as_list()
        .ok_or_else(|| Error::MalformedCert("expected (hash salt iterations)".into()))?;
    if kdf.len() != 3 {
        return Err(Error::MalformedCert("malformed KDF parameters".into()).into());
    }
    let hash_name = kdf[0].as_string()
        .ok_or_else(|| Error::MalformedCert("KDF hash is not a string".into()))?;
    if hash_name.value() != b"sha1" {
        return Err(Error::UnsupportedCert("only the sha1 KDF is supported".into()).into());
    }
    let salt = kdf[1].as_string()
        .ok_or_else(|| Error::MalformedCert("missing salt".into()))?.value();
    if salt.len() != 8 {
        return Err(Error::MalformedCert("salt must be 8 octets".into()).into());
    }
    let mut salt8 = [0u8; 8];
    salt8.copy_from_slice(salt);
    let iterations = kdf[2].as_string()
        .ok_or_else(|| Error::MalformedCert("missing iteration count".into()))?
        .value();
    let iterations = be_bytes_to_u32(iterations)?;
    let iv = params[1].as_string()
        .ok_or_else(|| Error::MalformedCert("missing IV".into()))?.value();
    if iv.len() != mode.nonce_size() {
        return Err(Error::MalformedCert("IV/nonce has the wrong size".into()).into());
    }
    let ciphertext = protected_list[3].as_string()
        .ok_or_else(|| Error::MalformedCert("ciphertext is not a string".into()))?.value();

    let password = match password {
        Some(p) => p,
        None => return Ok(ParsedSecretKey { pk_algo, public, secret: None }),
    };

    let s2k = S2K::IteratedSalted {
        hash: crate::types::HashAlgorithm::SHA1,
        salt: salt8,
        iterations,
    };
    let sym_algo = mode.sym_algo();
    let key_size = sym_algo.key_size()
        .ok_or(Error::UnsupportedSymmetricAlgorithm(sym_algo))?;
    let kek = s2k.derive_key(password, key_size)?;

    let plain = if mode.is_ocb() {
        symmetric::ocb_aes128_open(&kek, iv, ciphertext)
            .map_err(|_| Error::BadPassword)?
    } else {
        let mut buf = ciphertext.to_vec();
        if buf.len() % 16 != 0 {
            return Err(Error::MalformedCert("ciphertext is not block-aligned".into()).into());
        }
        symmetric::cbc_decrypt_nopad(sym_algo, &kek, iv, &mut buf)?;
        strip_x_padding(buf)
    };

    let inner = Sexp::from_bytes(&plain)?;
    let inner = inner.as_list()
        .ok_or_else(|| Error::MalformedCert("decrypted body is not a list".into()))?;
    if inner.len() != 3 {
        return Err(Error::MalformedCert(
            "expected ((alg ...) (hash sha1 DIGEST) (protected-at TS))".into()).into());
    }
    let sec_alg_sexp = inner[0].as_list()
        .ok_or_else(|| Error::MalformedCert("malformed decrypted algorithm list".into()))?;
    let secret = read_secret(pk_algo, sec_alg_sexp)?;

    let hash_sexp = inner[1].as_list()
        .ok_or_else(|| Error::MalformedCert("malformed hash block".into()))?;
    if hash_sexp.len() != 3
        || hash_sexp[0].as_string().map(String_::value) != Some(b"hash")
        || hash_sexp[1].as_string().map(String_::value) != Some(b"sha1")
    {
        return Err(Error::MalformedCert("expected (hash sha1 DIGEST)".into()).into());
    }
    let want_digest = hash_sexp[2].as_string()
        .ok_or_else(|| Error::MalformedCert("hash digest is not a string".into()))?.value();

    let protected_at_sexp = inner[2].as_list()
        .ok_or_else(|| Error::MalformedCert("malformed protected-at block".into()))?;
    let protected_at = protected_at_sexp.get(1).and_then(Sexp::as_string)
        .ok_or_else(|| Error::MalformedCert("missing protected-at value".into()))?.value();

    let got_digest = protection_hash(pk_algo, &public, &secret, protected_at)?;
    if crate::crypto::mem::secure_cmp(&got_digest, want_digest) != std::cmp::Ordering::Equal {
        return Err(Error::BadPassword.into());
    }

    Ok(ParsedSecretKey { pk_algo, public, secret: Some(secret) })
}

fn be_bytes_to_u32(bytes: &[u8]) -> Result<u32> {
    if bytes.len() > 4 {
        return Err(Error::MalformedCert("iteration count too large".into()).into());
    }
    let mut buf = [0u8; 4];
    buf[4 - bytes.len()..].copy_from_slice(bytes);
    Ok(u32::from_be_bytes(buf))
}

fn strip_x_padding(mut buf: Vec<u8>) -> Vec<u8> {
    while buf.last() == Some(&b'X') {
        buf.pop();
    }
    buf
}

/// Writes an unprotected `(private-key (alg ...))` file.
pub fn serialize_unprotected(
    pk_algo: PublicKeyAlgorithm,
    public: &mpi::PublicKey,
    secret: &mpi::SecretKeyMaterial,
) -> Result<Vec<u8>> {
    let mut children = public_params(pk_algo, public);
    children.extend(secret_params(pk_algo, secret));
    let alg = Sexp::List({
        let mut v = vec![atom(alg_name(pk_algo)?)];
        v.extend(children);
        v
    });
    let top = Sexp::List(vec![atom("private-key"), alg]);
    let mut out = Vec::new();
    top.serialize(&mut out);
    Ok(out)
}

/// Writes a `(protected-private-key ...)` file, encrypting `secret`
/// under `password` via `mode`.
///
/// `protected_at` is the 15-octet `YYYYMMDDTHHMMSS` timestamp
/// recorded alongside the ciphertext and folded into its integrity
/// tag.
pub fn serialize_protected(
    pk_algo: PublicKeyAlgorithm,
    public: &mpi::PublicKey,
    secret: &mpi::SecretKeyMaterial,
    password: &[u8],
    mode: ProtectionMode,
    protected_at: &str,
) -> Result<Vec<u8>> {
    if protected_at.len() != 15 {
        return Err(Error::InvalidArgument(
            "protected-at must be a 15-octet YYYYMMDDTHHMMSS string".into()).into());
    }

    let mut salt = [0u8; 8];
    OsRng.fill_bytes(&mut salt);
    let iterations = S2K::DEFAULT_ITERATIONS;
    let s2k = S2K::IteratedSalted { hash: crate::types::HashAlgorithm::SHA1, salt, iterations };
    let sym_algo = mode.sym_algo();
    let key_size = sym_algo.key_size()
        .ok_or(Error::UnsupportedSymmetricAlgorithm(sym_algo))?;
    let kek = s2k.derive_key(password, key_size)?;

    let mut iv = vec![0u8; mode.nonce_size()];
    OsRng.fill_bytes(&mut iv);

    let digest = protection_hash(pk_algo, public, secret, protected_at.as_bytes())?;
    let inner = Sexp::List(vec![
        Sexp::List({
            let mut v = vec![atom(alg_name(pk_algo)?)];
            v.extend(secret_params(pk_algo, secret));
            v
        }),
        Sexp::List(vec![atom("hash"), atom("sha1"), bytes_atom(&digest)]),
        Sexp::List(vec![atom("protected-at"), bytes_atom(protected_at.as_bytes())]),
    ]);
    let mut plain = Vec::new();
    inner.serialize(&mut plain);

    let ciphertext = if mode.is_ocb() {
        symmetric::ocb_aes128_seal(&kek, &iv, &plain)?
    } else {
        while plain.len() % 16 != 0 {
            plain.push(b'X');
        }
        symmetric::cbc_encrypt_nopad(sym_algo, &kek, &iv, &mut plain)?;
        plain
    };

    let iteration_bytes = {
        let be = iterations.to_be_bytes();
        let offset = be.iter().take_while(|&&b| b == 0).count().min(3);
        be[offset..].to_vec()
    };

    let protected = Sexp::List(vec![
        atom("protected"),
        atom(mode.name()),
        Sexp::List(vec![
            Sexp::List(vec![atom("sha1"), bytes_atom(&salt), bytes_atom(&iteration_bytes)]),
            bytes_atom(&iv),
        ]),
        bytes_atom(&ciphertext),
    ]);

    let alg = Sexp::List({
        let mut v = vec![atom(alg_name(pk_algo)?)];
        v.extend(public_params(pk_algo, public));
        v.push(protected);
        v.push(Sexp::List(vec![atom("protected-at"), bytes_atom(protected_at.as_bytes())]));
        v
    });
    let top = Sexp::List(vec![atom("protected-private-key"), alg]);
    let mut out = Vec::new();
    top.serialize(&mut out);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::key::Key4;

    fn rsa_key() -> Key4 {
        Key4::generate_rsa(1024).unwrap()
    }

    fn material(key: &Key4) -> (mpi::PublicKey, mpi::SecretKeyMaterial) {
        let secret = key.plaintext()
            .expect("freshly generated key should be unlocked")
            .clone();
        (key.mpis().clone(), secret)
    }

    #[test]
    fn unprotected_roundtrip() {
        let key = rsa_key();
        let (public, secret) = material(&key);
        let bytes = serialize_unprotected(key.pk_algo(), &public, &secret).unwrap();
        let parsed = parse(&bytes, None).unwrap();
        assert_eq!(parsed.pk_algo, key.pk_algo());
        assert_eq!(parsed.public, public);
        assert_eq!(parsed.secret, Some(secret));
    }

    #[test]
    fn protected_cbc_roundtrip() {
        let key = rsa_key();
        let (public, secret) = material(&key);
        let bytes = serialize_protected(
            key.pk_algo(), &public, &secret, b"hunter2",
            ProtectionMode::Sha1AesCbc, "20260730T120000").unwrap();

        let no_password = parse(&bytes, None).unwrap();
        assert_eq!(no_password.public, public);
        assert!(no_password.secret.is_none());

        let unlocked = parse(&bytes, Some(b"hunter2")).unwrap();
        assert_eq!(unlocked.secret, Some(secret));
    }

    #[test]
    fn protected_wrong_password_fails() {
        let key = rsa_key();
        let (public, secret) = material(&key);
        let bytes = serialize_protected(
            key.pk_algo(), &public, &secret, b"hunter2",
            ProtectionMode::Sha1Aes256Cbc, "20260730T120000").unwrap();
        assert!(parse(&bytes, Some(b"wrong")).is_err());
    }

    #[test]
    fn protected_ocb_roundtrip() {
        let key = rsa_key();
        let (public, secret) = material(&key);
        let bytes = serialize_protected(
            key.pk_algo(), &public, &secret, b"hunter2",
            ProtectionMode::Sha1OcbAes, "20260730T120000").unwrap();
        let unlocked = parse(&bytes, Some(b"hunter2")).unwrap();
        assert_eq!(unlocked.secret, Some(secret));
    }
}
