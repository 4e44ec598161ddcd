//! Certificate generation.

use std::time;

use crate::packet;
use crate::packet::key::{Key4, KeyPair};
use crate::packet::signature::SignatureBuilder;
use crate::packet::Signature;
use crate::crypto::s2k::S2K;
use crate::crypto::Password;
use crate::cert::CertRevocationBuilder;
use crate::Cert;
use crate::Error;
use crate::Result;
use crate::types::{
    Curve,
    Features,
    HashAlgorithm,
    KeyFlags,
    ReasonForRevocation,
    SignatureType,
    SymmetricAlgorithm,
};

/// Groups symmetric and asymmetric algorithms.
#[derive(Clone, Copy, PartialEq, PartialOrd, Eq, Ord, Debug)]
pub enum CipherSuite {
    /// EdDSA and ECDH over Curve25519 with SHA512 and AES256.
    Cv25519,
    /// 3072 bit RSA with SHA512 and AES256.
    RSA3k,
    /// EdDSA and ECDH over NIST P-256 with SHA256 and AES256.
    P256,
    /// EdDSA and ECDH over NIST P-384 with SHA384 and AES256.
    P384,
    /// EdDSA and ECDH over NIST P-521 with SHA512 and AES256.
    P521,
    /// 2048 bit RSA with SHA512 and AES256.
    RSA2k,
    /// 4096 bit RSA with SHA512 and AES256.
    RSA4k,
}

impl Default for CipherSuite {
    fn default() -> Self {
        CipherSuite::Cv25519
    }
}

impl CipherSuite {
    fn generate_key(self, flags: &KeyFlags) -> Result<Key4> {
        match self {
            CipherSuite::RSA2k => Key4::generate_rsa(2048),
            CipherSuite::RSA3k => Key4::generate_rsa(3072),
            CipherSuite::RSA4k => Key4::generate_rsa(4096),
            CipherSuite::Cv25519 | CipherSuite::P256 |
            CipherSuite::P384 | CipherSuite::P521 => {
                let sign = flags.for_certification() || flags.for_signing()
                    || flags.for_authentication();
                let encrypt = flags.for_transport_encryption()
                    || flags.for_storage_encryption();
                let curve = match self {
                    CipherSuite::Cv25519 if sign => Curve::Ed25519,
                    CipherSuite::Cv25519 if encrypt => Curve::Cv25519,
                    CipherSuite::Cv25519 => {
                        return Err(Error::InvalidOperation(
                            "No key flags set".into()).into());
                    }
                    CipherSuite::P256 => Curve::NistP256,
                    CipherSuite::P384 => Curve::NistP384,
                    CipherSuite::P521 => Curve::NistP521,
                    _ => unreachable!(),
                };

                match (sign, encrypt) {
                    (true, false) => Key4::generate_ecc(true, curve),
                    (false, true) => Key4::generate_ecc(false, curve),
                    (true, true) => Err(Error::InvalidOperation(
                        "Can't use key for encryption and signing".into()).into()),
                    (false, false) => Err(Error::InvalidOperation(
                        "No key flags set".into()).into()),
                }
            }
        }
    }
}

#[derive(Clone, Debug)]
struct KeyBlueprint {
    flags: KeyFlags,
    expiration: Option<time::Duration>,
}

/// Builds a [`Cert`] from scratch: a primary key, optional user IDs
/// and user attributes, optional subkeys, all self-signed with a
/// consistent creation time.
#[derive(Clone, Debug)]
pub struct CertBuilder {
    creation_time: Option<time::SystemTime>,
    ciphersuite: CipherSuite,
    primary: KeyBlueprint,
    subkeys: Vec<KeyBlueprint>,
    userids: Vec<packet::UserID>,
    user_attributes: Vec<packet::UserAttribute>,
    password: Option<Password>,
}

impl Default for CertBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CertBuilder {
    /// Returns a new `CertBuilder`.
    ///
    /// The returned builder produces a certification-capable primary
    /// key with no user IDs and no subkeys using the default cipher
    /// suite. Add subkeys with e.g. [`add_signing_subkey`], and user
    /// IDs with [`add_userid`].
    ///
    /// [`add_signing_subkey`]: CertBuilder::add_signing_subkey
    /// [`add_userid`]: CertBuilder::add_userid
    pub fn new() -> Self {
        CertBuilder {
            creation_time: None,
            ciphersuite: CipherSuite::default(),
            primary: KeyBlueprint {
                flags: KeyFlags::default().set_certification(true),
                expiration: None,
            },
            subkeys: vec![],
            userids: vec![],
            user_attributes: vec![],
            password: None,
        }
    }

    /// Generates a general-purpose key: a certification- and
    /// signing-capable primary key with one transport- and
    /// storage-encryption-capable subkey, expiring in three years.
    pub fn general_purpose<C, U>(ciphersuite: C, userid: Option<U>) -> Self
        where C: Into<Option<CipherSuite>>,
              U: Into<packet::UserID>,
    {
        CertBuilder {
            creation_time: None,
            ciphersuite: ciphersuite.into().unwrap_or_default(),
            primary: KeyBlueprint {
                flags: KeyFlags::default()
                    .set_certification(true)
                    .set_signing(true),
                expiration: Some(time::Duration::new(3 * 52 * 7 * 24 * 60 * 60, 0)),
            },
            subkeys: vec![
                KeyBlueprint {
                    flags: KeyFlags::default()
                        .set_encrypt_for_transport(true)
                        .set_encrypt_at_rest(true),
                    expiration: None,
                }
            ],
            userids: userid.into_iter().map(Into::into).collect(),
            user_attributes: vec![],
            password: None,
        }
    }

    /// Sets the creation time shared by the primary key, every
    /// subkey, and every self-signature.
    pub fn set_creation_time<T: Into<time::SystemTime>>(mut self, creation_time: T) -> Self {
        self.creation_time = Some(creation_time.into());
        self
    }

    /// Sets the cipher suite used for the primary key and all
    /// subkeys added after this call.
    pub fn set_cipher_suite(mut self, cs: CipherSuite) -> Self {
        self.ciphersuite = cs;
        self
    }

    /// Adds a user ID. The first user ID added becomes the primary
    /// user ID.
    pub fn add_userid<U: Into<packet::UserID>>(mut self, uid: U) -> Self {
        self.userids.push(uid.into());
        self
    }

    /// Adds a user attribute.
    pub fn add_user_attribute<U: Into<packet::UserAttribute>>(mut self, ua: U) -> Self {
        self.user_attributes.push(ua.into());
        self
    }

    /// Adds a signing-capable subkey.
    pub fn add_signing_subkey(self) -> Self {
        self.add_subkey(KeyFlags::default().set_signing(true), None)
    }

    /// Adds a transport-encryption-capable subkey.
    pub fn add_transport_encryption_subkey(self) -> Self {
        self.add_subkey(KeyFlags::default().set_encrypt_for_transport(true), None)
    }

    /// Adds a storage-encryption-capable subkey.
    pub fn add_storage_encryption_subkey(self) -> Self {
        self.add_subkey(KeyFlags::default().set_encrypt_at_rest(true), None)
    }

    /// Adds a certification-capable subkey.
    pub fn add_certification_subkey(self) -> Self {
        self.add_subkey(KeyFlags::default().set_certification(true), None)
    }

    /// Adds an authentication-capable subkey.
    pub fn add_authentication_subkey(self) -> Self {
        self.add_subkey(KeyFlags::default().set_authentication(true), None)
    }

    /// Adds a subkey with custom flags and, optionally, its own
    /// expiration time (defaulting to the primary key's expiration).
    pub fn add_subkey<T: Into<Option<time::Duration>>>(
        mut self, flags: KeyFlags, expiration: T,
    ) -> Self {
        self.subkeys.push(KeyBlueprint { flags, expiration: expiration.into() });
        self
    }

    /// Sets the primary key's capabilities. Adding any subkey forces
    /// certification capability back on regardless of this setting.
    pub fn primary_key_flags(mut self, flags: KeyFlags) -> Self {
        self.primary.flags = flags;
        self
    }

    /// Sets a password used to encrypt every generated secret key.
    pub fn set_password(mut self, password: Option<Password>) -> Self {
        self.password = password;
        self
    }

    /// Sets the primary key's expiration, used by subkeys that don't
    /// specify their own. `None` means the key never expires.
    pub fn set_expiration<T: Into<Option<time::Duration>>>(mut self, expiration: T) -> Self {
        self.primary.expiration = expiration.into();
        self
    }

    fn lock_if_requested(&self, key: &mut Key4) -> Result<()> {
        if let Some(ref password) = self.password {
            let s2k = S2K::IteratedSalted {
                hash: HashAlgorithm::SHA256,
                salt: {
                    use rand::RngCore;
                    let mut salt = [0u8; 8];
                    rand::rngs::OsRng.fill_bytes(&mut salt);
                    salt
                },
                iterations: S2K::DEFAULT_ITERATIONS,
            };
            key.protect(password.as_bytes(), s2k, SymmetricAlgorithm::AES256)?;
        }
        Ok(())
    }

    /// Generates the certificate, returning it together with a
    /// ready-to-use revocation signature the holder can publish later
    /// to disown the key.
    pub fn generate(mut self) -> Result<(Cert, Signature)> {
        let creation_time = self.creation_time.unwrap_or_else(time::SystemTime::now);

        if !self.subkeys.is_empty() {
            self.primary.flags = self.primary.flags.set_certification(true);
        }

        let (mut primary, direct_sig) = self.primary_key(creation_time)?;
        let mut signer = primary.clone().into_keypair()?;

        self.lock_if_requested(&mut primary)?;

        let mut cert = Cert::from_packets(vec![
            primary.clone().into(),
            direct_sig.into(),
        ])?;

        for uid in std::mem::take(&mut self.userids) {
            let builder = SignatureBuilder::new(SignatureType::PositiveCertification)
                .set_signature_creation_time(creation_time)?
                // GnuPG wants at least a 512-bit hash for P521 keys.
                .set_hash_algo(HashAlgorithm::SHA512);
            let sig = super::bind_userid(&mut signer, &primary, &uid, builder)?;
            cert = cert.merge_packets(vec![uid.into(), sig.into()])?;
        }

        for ua in std::mem::take(&mut self.user_attributes) {
            let builder = SignatureBuilder::new(SignatureType::PositiveCertification)
                .set_signature_creation_time(creation_time)?
                .set_hash_algo(HashAlgorithm::SHA512);
            let sig = super::bind_user_attribute(&mut signer, &primary, &ua, builder)?;
            cert = cert.merge_packets(vec![ua.into(), sig.into()])?;
        }

        for blueprint in std::mem::take(&mut self.subkeys) {
            let flags = &blueprint.flags;
            let mut subkey = self.ciphersuite.generate_key(flags)?.subordinate();
            subkey.set_creation_time(creation_time)?;

            let expiration = blueprint.expiration.or(self.primary.expiration)
                .map(|d| creation_time + d);

            let mut builder = SignatureBuilder::new(SignatureType::SubkeyBinding)
                .set_signature_creation_time(creation_time)?
                // GnuPG wants at least a 512-bit hash for P521 keys.
                .set_hash_algo(HashAlgorithm::SHA512)
                .set_features(&Features::implemented())?
                .set_key_flags(flags)?
                .set_key_expiration_time(&subkey, expiration)?;

            if flags.for_transport_encryption() || flags.for_storage_encryption() {
                builder = builder.set_preferred_symmetric_algorithms(
                    vec![SymmetricAlgorithm::AES256])?;
            }

            if flags.for_certification() || flags.for_signing() {
                builder = builder.set_preferred_hash_algorithms(
                    vec![HashAlgorithm::SHA512])?;

                // The subkey asserts, in its own voice, that it
                // belongs with this primary key.
                let mut subkey_signer = subkey.clone().into_keypair()?;
                let backsig_builder = SignatureBuilder::new(SignatureType::PrimaryKeyBinding)
                    .set_signature_creation_time(creation_time)?
                    .set_hash_algo(HashAlgorithm::SHA512)
                    .set_issuer_fingerprint(subkey.fingerprint())?
                    .set_issuer(subkey.keyid())?;
                let backsig = super::sign_primary_key_binding(
                    &mut subkey_signer, &primary, &subkey, backsig_builder)?;
                builder = builder.set_embedded_signature(backsig)?;
            }

            let sig = super::bind_subkey(&mut signer, &primary, &subkey, builder)?;

            self.lock_if_requested(&mut subkey)?;

            cert = cert.merge_packets(vec![subkey.into(), sig.into()])?;
        }

        let revocation = CertRevocationBuilder::new()
            .set_signature_creation_time(creation_time)?
            .set_reason_for_revocation(ReasonForRevocation::Unspecified, b"Unspecified")?
            .build(&mut signer, &cert, None)?;

        assert!(cert.bad_signatures().is_empty());
        assert!(cert.unknowns().is_empty());

        Ok((cert, revocation))
    }

    fn primary_key(&self, creation_time: time::SystemTime) -> Result<(Key4, Signature)> {
        let mut key = self.ciphersuite.generate_key(
            &KeyFlags::default().set_certification(true))?;
        key.set_creation_time(creation_time)?;

        let mut signer = key.clone().into_keypair()?;

        let builder = SignatureBuilder::new(SignatureType::DirectKey)
            // GnuPG wants at least a 512-bit hash for P521 keys.
            .set_hash_algo(HashAlgorithm::SHA512)
            .set_features(&Features::implemented())?
            .set_key_flags(&self.primary.flags)?
            .set_signature_creation_time(creation_time)?
            .set_key_expiration_time(&key, self.primary.expiration.map(|d| creation_time + d))?
            .set_issuer_fingerprint(key.fingerprint())?
            .set_issuer(key.keyid())?
            .set_preferred_hash_algorithms(vec![HashAlgorithm::SHA512])?;

        let ctx = super::direct_key_hash(&key, builder.hash_algo())?;
        let sig = builder.sign_hash(&mut signer, ctx)?;

        Ok((key, sig))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::signature::subpacket::{SubpacketTag, SubpacketValue};
    use crate::types::PublicKeyAlgorithm;
    use crate::RevocationStatus;

    #[test]
    fn all_opts() {
        let (cert, _) = CertBuilder::new()
            .set_cipher_suite(CipherSuite::Cv25519)
            .add_userid("test1@example.com")
            .add_userid("test2@example.com")
            .add_signing_subkey()
            .add_transport_encryption_subkey()
            .add_certification_subkey()
            .generate().unwrap();

        let mut userids = cert.userids().iter()
            .map(|u| String::from_utf8_lossy(u.userid().value()).into_owned())
            .collect::<Vec<String>>();
        userids.sort();

        assert_eq!(userids, &["test1@example.com", "test2@example.com"][..]);
        assert_eq!(cert.subkeys().len(), 3);
    }

    #[test]
    fn direct_key_sig() {
        let (cert, _) = CertBuilder::new()
            .set_cipher_suite(CipherSuite::Cv25519)
            .add_signing_subkey()
            .add_transport_encryption_subkey()
            .add_certification_subkey()
            .generate().unwrap();

        assert_eq!(cert.userids().len(), 0);
        assert_eq!(cert.subkeys().len(), 3);
        let sig = cert.direct_key_signature().unwrap();
        assert_eq!(sig.typ(), SignatureType::DirectKey);
    }

    #[test]
    fn setter() {
        let (cert1, _) = CertBuilder::new()
            .set_cipher_suite(CipherSuite::Cv25519)
            .set_cipher_suite(CipherSuite::RSA3k)
            .set_cipher_suite(CipherSuite::Cv25519)
            .generate().unwrap();
        assert_eq!(cert1.primary_key().pk_algo(), PublicKeyAlgorithm::EdDSA);

        let (cert2, _) = CertBuilder::new()
            .set_cipher_suite(CipherSuite::RSA3k)
            .add_userid("test2@example.com")
            .add_transport_encryption_subkey()
            .generate().unwrap();
        assert_eq!(cert2.primary_key().pk_algo(), PublicKeyAlgorithm::RSAEncryptSign);
        assert_eq!(cert2.subkeys()[0].key().pk_algo(), PublicKeyAlgorithm::RSAEncryptSign);
    }

    #[test]
    fn defaults() {
        let (cert1, _) = CertBuilder::new()
            .add_userid("test2@example.com")
            .generate().unwrap();
        assert_eq!(cert1.primary_key().pk_algo(), PublicKeyAlgorithm::EdDSA);
        assert!(cert1.subkeys().is_empty());
        assert!(cert1.primary_userid().is_some());
    }

    #[test]
    fn always_certify() {
        let (cert1, _) = CertBuilder::new()
            .set_cipher_suite(CipherSuite::Cv25519)
            .primary_key_flags(KeyFlags::default())
            .add_transport_encryption_subkey()
            .generate().unwrap();
        assert!(cert1.direct_key_signature().unwrap()
            .hashed_area().key_flags().unwrap().for_certification());
        assert_eq!(cert1.subkeys().len(), 1);
    }

    #[test]
    fn gen_wired_subkeys() {
        let (cert1, _) = CertBuilder::new()
            .set_cipher_suite(CipherSuite::Cv25519)
            .primary_key_flags(KeyFlags::default())
            .add_subkey(KeyFlags::default().set_certification(true), None)
            .generate().unwrap();
        let sig_pkts = cert1.subkeys()[0].self_signatures()[0].hashed_area();

        match sig_pkts.lookup(SubpacketTag::KeyFlags).unwrap().value() {
            SubpacketValue::KeyFlags(ref ks) => assert!(ks.for_certification()),
            v => panic!("Unexpected subpacket: {:?}", v),
        }

        assert_eq!(cert1.subkeys().len(), 1);
    }

    #[test]
    fn generate_revocation_certificate() {
        let (cert, revocation) = CertBuilder::new()
            .set_cipher_suite(CipherSuite::Cv25519)
            .generate().unwrap();
        assert_eq!(cert.revoked(), RevocationStatus::NotAsFarAsWeKnow);

        let cert = cert.merge_packets(vec![revocation.clone().into()]).unwrap();
        assert_eq!(cert.revoked(), RevocationStatus::Revoked(vec![&revocation]));
    }

    #[test]
    fn encrypted_secrets() {
        let (cert, _) = CertBuilder::new()
            .set_cipher_suite(CipherSuite::Cv25519)
            .set_password(Some(String::from("streng geheim").into()))
            .generate().unwrap();
        assert!(matches!(cert.primary_key().secret().unwrap(),
                          crate::packet::key::SecretKeyMaterialState::Locked(_)));
    }

    #[test]
    fn all_ciphersuites() {
        use self::CipherSuite::*;

        for cs in vec![Cv25519, RSA3k, P256, P384, P521, RSA2k, RSA4k] {
            assert!(CertBuilder::new()
                .set_cipher_suite(cs)
                .generate().is_ok());
        }
    }

    #[test]
    fn expiration_times() {
        let s = time::Duration::new(1, 0);
        let (cert, _) = CertBuilder::new()
            .set_cipher_suite(CipherSuite::Cv25519)
            .set_expiration(600 * s)
            .add_subkey(KeyFlags::default().set_signing(true), 300 * s)
            .add_subkey(KeyFlags::default().set_authentication(true), None)
            .generate().unwrap();

        let now = cert.primary_key().creation_time() + 5 * s;
        let signing = cert.subkeys().iter()
            .find(|sk| sk.binding_signature().unwrap()
                .hashed_area().key_flags().unwrap().for_signing())
            .unwrap();
        let sig = signing.binding_signature().unwrap();
        assert!(sig.key_alive(signing.key(), now).is_ok());
        assert!(sig.key_alive(signing.key(), now + 290 * s).is_ok());
        assert!(!sig.key_alive(signing.key(), now + 310 * s).is_ok());
    }

    #[test]
    fn creation_time() {
        use std::time::UNIX_EPOCH;
        let (cert, rev) = CertBuilder::new()
            .set_creation_time(UNIX_EPOCH)
            .set_cipher_suite(CipherSuite::Cv25519)
            .add_userid("foo")
            .add_signing_subkey()
            .generate().unwrap();

        assert_eq!(cert.primary_key().creation_time(), UNIX_EPOCH);
        assert_eq!(cert.direct_key_signature().unwrap()
                   .signature_creation_time().unwrap(), UNIX_EPOCH);
        assert_eq!(rev.signature_creation_time().unwrap(), UNIX_EPOCH);

        assert_eq!(cert.subkeys().len(), 1);
        for sk in cert.subkeys() {
            assert_eq!(sk.key().creation_time(), UNIX_EPOCH);
            assert_eq!(sk.binding_signature().unwrap()
                       .signature_creation_time().unwrap(), UNIX_EPOCH);
        }

        assert_eq!(cert.userids().len(), 1);
        for ui in cert.userids() {
            assert_eq!(ui.binding_signature().unwrap()
                       .signature_creation_time().unwrap(), UNIX_EPOCH);
        }
    }
}
