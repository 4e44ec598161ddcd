//! JSON-described key-generation requests.
//!
//! The request shape -- a `primary` key description plus zero or more
//! `sub` descriptions, each giving a key `type`, optional `length` or
//! `curve`, a `usage` list, and an optional `expiration` -- mirrors
//! what GnuPG-compatible tooling accepts for scripted key generation.
//! Deserialized with `serde`/`serde_json` and compiled down to a
//! [`CertBuilder`] by [`GenerateRequest::build`].

use serde::Deserialize;

use crate::cert::builder::CipherSuite;
use crate::cert::CertBuilder;
use crate::packet::signature::Signature;
use crate::packet::UserID;
use crate::types::KeyFlags;
use crate::{Cert, Error, Result};

/// One key's cryptographic parameters: an algorithm `type` plus
/// whatever that algorithm needs (`length` for RSA, `curve` for ECC).
#[derive(Debug, Clone, Deserialize)]
pub struct KeyCrypto {
    #[serde(rename = "type")]
    pub key_type: String,
    pub length: Option<u32>,
    pub curve: Option<String>,
}

impl KeyCrypto {
    fn cipher_suite(&self) -> Result<CipherSuite> {
        match self.key_type.to_ascii_lowercase().as_str() {
            "rsa" => match self.length.unwrap_or(3072) {
                n if n <= 2048 => Ok(CipherSuite::RSA2k),
                n if n <= 3072 => Ok(CipherSuite::RSA3k),
                _ => Ok(CipherSuite::RSA4k),
            },
            "eddsa" | "ecdh" | "ecdsa" => match self
                .curve
                .as_deref()
                .unwrap_or("ed25519")
                .to_ascii_lowercase()
                .as_str()
            {
                "ed25519" | "cv25519" | "curve25519" => Ok(CipherSuite::Cv25519),
                "nistp256" | "p-256" | "p256" => Ok(CipherSuite::P256),
                "nistp384" | "p-384" | "p384" => Ok(CipherSuite::P384),
                "nistp521" | "p-521" | "p521" => Ok(CipherSuite::P521),
                other => Err(Error::InvalidArgument(format!("unknown curve {:?}", other)).into()),
            },
            other => Err(Error::InvalidArgument(format!("unknown key type {:?}", other)).into()),
        }
    }
}

/// The primary key's description: its crypto parameters, the User
/// IDs to bind, its usage flags, and an optional expiration in
/// seconds from creation.
#[derive(Debug, Clone, Deserialize)]
pub struct PrimaryKeyRequest {
    #[serde(flatten)]
    pub crypto: KeyCrypto,
    #[serde(default)]
    pub userid: Vec<String>,
    #[serde(default)]
    pub usage: Vec<String>,
    pub expiration: Option<u64>,
}

/// A subkey's description: crypto parameters, usage flags, and an
/// optional expiration.
#[derive(Debug, Clone, Deserialize)]
pub struct SubkeyRequest {
    #[serde(flatten)]
    pub crypto: KeyCrypto,
    #[serde(default)]
    pub usage: Vec<String>,
    pub expiration: Option<u64>,
}

/// A full key-generation request: one primary key plus its subkeys.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    pub primary: PrimaryKeyRequest,
    #[serde(default)]
    pub sub: Vec<SubkeyRequest>,
}

fn usage_flags(usage: &[String]) -> Result<KeyFlags> {
    let mut flags = KeyFlags::empty();
    for u in usage {
        flags = match u.to_ascii_lowercase().as_str() {
            "sign" => flags.set_signing(true),
            "certify" => flags.set_certification(true),
            "encrypt" => flags.set_encrypt_for_transport(true).set_encrypt_at_rest(true),
            "authenticate" => flags.set_authentication(true),
            other => return Err(Error::InvalidArgument(format!("unknown usage {:?}", other)).into()),
        };
    }
    Ok(flags)
}

impl GenerateRequest {
    /// Parses a request from its JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Compiles this request into a [`CertBuilder`] and generates the
    /// certificate, per [`CertBuilder::generate`].
    pub fn build(&self) -> Result<(Cert, Signature)> {
        let mut builder = CertBuilder::new().set_cipher_suite(self.primary.crypto.cipher_suite()?);

        for uid in &self.primary.userid {
            builder = builder.add_userid(UserID::from(uid.clone()));
        }

        if !self.primary.usage.is_empty() {
            builder = builder.primary_key_flags(usage_flags(&self.primary.usage)?);
        }

        if let Some(secs) = self.primary.expiration {
            builder = builder.set_expiration(std::time::Duration::from_secs(secs));
        }

        // The underlying builder generates every subkey with the
        // primary's cipher suite; a subkey requesting a different
        // algorithm is accepted (so existing request files keep
        // working) but its `type`/`curve`/`length` are otherwise
        // unused.
        for sub in &self.sub {
            let flags = if sub.usage.is_empty() {
                KeyFlags::empty().set_signing(true)
            } else {
                usage_flags(&sub.usage)?
            };
            let expiration = sub.expiration.map(std::time::Duration::from_secs);
            builder = builder.add_subkey(flags, expiration);
        }

        builder.generate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_builds_minimal_request() {
        let json = r#"{
            "primary": {
                "type": "eddsa",
                "curve": "ed25519",
                "userid": ["Dora <dora@example.org>"],
                "usage": ["sign", "certify"]
            },
            "sub": [
                {"type": "ecdh", "curve": "cv25519", "usage": ["encrypt"]}
            ]
        }"#;

        let request = GenerateRequest::from_json(json).unwrap();
        let (cert, _rev) = request.build().unwrap();
        assert_eq!(cert.userids().len(), 1);
        assert_eq!(cert.subkeys().len(), 1);
    }
}
