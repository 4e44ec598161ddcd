//! A mechanism to specify policy.
//!
//! A major goal of this OpenPGP crate is to be policy free.
//! However, many mid-level operations build on low-level primitives.
//! For instance, finding a certificate's primary User ID means
//! examining each of its User IDs and their current self-signature.
//! Some algorithms are considered broken (e.g., MD5) and some are
//! considered weak (e.g. SHA-1).  When dealing with data from an
//! untrusted source, for instance, callers will often prefer to
//! ignore signatures that rely on these algorithms even though [RFC
//! 4880] says that "[i]mplementations MUST implement SHA-1."  When
//! trying to decrypt old archives, however, users probably don't want
//! to ignore keys using MD5, even though [RFC 4880] deprecates MD5.
//!
//! Rather than not provide this mid-level functionality, the `Policy`
//! trait allows callers to specify their preferred policy.  This can
//! be highly customized by providing a custom implementation of the
//! `Policy` trait, or it can be slightly refined by tweaking the
//! `StandardPolicy`'s parameters.
//!
//! When implementing the `Policy` trait, it is *essential* that the
//! functions are [idempotent].  That is, if the same `Policy` is used
//! to determine whether a given `Signature` is valid, it must always
//! return the same value.
//!
//! [RFC 4880]: https://tools.ietf.org/html/rfc4880#section-9.4
//! [idempotent]: https://en.wikipedia.org/wiki/Idempotence
use std::fmt;
use std::time::{SystemTime, Duration};

use anyhow::Context;

use crate::{
    Packet,
    packet::Tag,
    packet::key::Key4,
    packet::signature::Signature,
    Result,
    types::HashAlgorithm,
    types::SignatureType,
    types::Timestamp,
};

#[macro_use] mod cutofflist;
use cutofflist::{
    CutoffList,
    REJECT,
    ACCEPT,
};

/// A policy for cryptographic operations.
pub trait Policy : fmt::Debug {
    /// Returns an error if the signature violates the policy.
    ///
    /// This function performs the last check before the library
    /// decides that a signature is valid.  That is, after the library
    /// has determined that the signature is well-formed, alive, not
    /// revoked, etc., it calls this function to allow you to
    /// implement any additional policy.  For instance, you may reject
    /// signatures that make use of cryptographically insecure
    /// algorithms like SHA-1.
    ///
    /// Note: Whereas it is generally better to reject suspicious
    /// signatures, one should be more liberal when considering
    /// revocations: if you reject a revocation certificate, it may
    /// inadvertently make something else valid!
    fn signature(&self, _sig: &Signature) -> Result<()> {
        Ok(())
    }

    /// Returns an error if the key violates the policy.
    ///
    /// Internally, the library calls this before using a key for any
    /// cryptographic operation. Implement this to reject keys that
    /// use insecure algorithms, aren't a sufficient size (e.g.,
    /// 1024-bit RSA), or are on a denylist, without having to inspect
    /// every signature and binding that touches the key individually.
    fn key(&self, _key: &Key4) -> Result<()> {
        Ok(())
    }

    /// Returns an error if the packet violates the policy.
    ///
    /// This function performs the last check before a packet is
    /// considered by the high-level verify/decrypt operations.
    ///
    /// With this function, you can prevent the use of insecure
    /// encryption containers, notably the *Symmetrically Encrypted
    /// Data Packet*.
    fn packet(&self, _packet: &Packet) -> Result<()> {
        Ok(())
    }
}

/// The standard policy.
///
/// The standard policy stores when each algorithm in a family of
/// algorithms is no longer considered safe.  Attempts to use an
/// algorithm after its cutoff time should fail.
///
/// When validating a signature, we normally want to know whether the
/// algorithms used are safe *now*.  That is, we don't use the
/// signature's alleged creation time when considering whether an
/// algorithm is safe, because if an algorithm is discovered to be
/// compromised at time X, then an attacker could forge a message
/// after time X with a signature creation time that is prior to X,
/// which would be incorrectly accepted.
///
/// Occasionally, we know that a signature has not been tampered with
/// since some time in the past.  We might know this if the signature
/// was stored on some tamper-proof medium.  In those cases, it is
/// reasonable to use the time that the signature was saved, since an
/// attacker could not have taken advantage of any weaknesses found
/// after that time.
#[derive(Debug, Clone)]
pub struct StandardPolicy {
    // The time.  If None, the current time is used.
    time: Option<Timestamp>,

    // Hash algorithms.
    hash_algos_normal: NormalHashCutoffList,
    hash_algos_revocation: RevocationHashCutoffList,

    // Packet types.
    packet_tags: PacketTagCutoffList,
}

impl Default for StandardPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> From<&'a StandardPolicy> for Option<&'a dyn Policy> {
    fn from(p: &'a StandardPolicy) -> Self {
        Some(p as &dyn Policy)
    }
}

a_cutoff_list!(NormalHashCutoffList, HashAlgorithm, 12,
               [
                   REJECT,                 // 0. Not assigned.
                   Some(Timestamp::Y1997), // 1. MD5
                   Some(Timestamp::Y2013), // 2. SHA-1
                   Some(Timestamp::Y2013), // 3. RIPE-MD/160
                   REJECT,                 // 4. Reserved.
                   REJECT,                 // 5. Reserved.
                   REJECT,                 // 6. Reserved.
                   REJECT,                 // 7. Reserved.
                   ACCEPT,                 // 8. SHA256
                   ACCEPT,                 // 9. SHA384
                   ACCEPT,                 // 10. SHA512
                   ACCEPT,                 // 11. SHA224
               ]);
a_cutoff_list!(RevocationHashCutoffList, HashAlgorithm, 12,
               [
                   REJECT,                 // 0. Not assigned.
                   Some(Timestamp::Y2004), // 1. MD5
                   Some(Timestamp::Y2020), // 2. SHA-1
                   Some(Timestamp::Y2020), // 3. RIPE-MD/160
                   REJECT,                 // 4. Reserved.
                   REJECT,                 // 5. Reserved.
                   REJECT,                 // 6. Reserved.
                   REJECT,                 // 7. Reserved.
                   ACCEPT,                 // 8. SHA256
                   ACCEPT,                 // 9. SHA384
                   ACCEPT,                 // 10. SHA512
                   ACCEPT,                 // 11. SHA224
               ]);

a_cutoff_list!(PacketTagCutoffList, Tag, 21,
               [
                   REJECT,                 // 0. Reserved.
                   ACCEPT,                 // 1. PKESK.
                   ACCEPT,                 // 2. Signature.
                   ACCEPT,                 // 3. SKESK.
                   ACCEPT,                 // 4. OnePassSig.
                   ACCEPT,                 // 5. SecretKey.
                   ACCEPT,                 // 6. PublicKey.
                   ACCEPT,                 // 7. SecretSubkey.
                   ACCEPT,                 // 8. CompressedData.
                   Some(Timestamp::Y2004), // 9. SED.
                   ACCEPT,                 // 10. Marker.
                   ACCEPT,                 // 11. Literal.
                   ACCEPT,                 // 12. Trust.
                   ACCEPT,                 // 13. UserID.
                   ACCEPT,                 // 14. PublicSubkey.
                   REJECT,                 // 15. Not assigned.
                   REJECT,                 // 16. Not assigned.
                   ACCEPT,                 // 17. UserAttribute.
                   ACCEPT,                 // 18. SEIP.
                   ACCEPT,                 // 19. MDC.
                   ACCEPT,                 // 20. AED.
               ]);

// We need to convert a `SystemTime` to a `Timestamp` in
// `StandardPolicy::reject_hash_at`.  Unfortunately, a `SystemTime`
// can represent a larger range of time than a `Timestamp` can.  Since
// the times passed to this function are cutoff points, and we only
// compare them to OpenPGP timestamps, any `SystemTime` that is prior
// to the Unix Epoch is equivalent to the Unix Epoch: it will reject
// all timestamps.  Similarly, any `SystemTime` that is later than the
// latest time representable by a `Timestamp` is equivalent to
// accepting all time stamps, which is equivalent to passing None.
fn system_time_cutoff_to_timestamp(t: SystemTime) -> Option<Timestamp> {
    let t = t
        .duration_since(SystemTime::UNIX_EPOCH)
        // An error can only occur if the SystemTime is less than the
        // reference time (SystemTime::UNIX_EPOCH).  Map that to
        // SystemTime::UNIX_EPOCH, as above.
        .unwrap_or(Duration::new(0, 0));
    let t = t.as_secs();
    if t > u32::MAX as u64 {
        // Map to None, as above.
        None
    } else {
        Some((t as u32).into())
    }
}

impl StandardPolicy {
    /// Instantiates a new `StandardPolicy` with the default parameters.
    pub const fn new() -> Self {
        Self {
            time: None,
            hash_algos_normal: NormalHashCutoffList::Default(),
            hash_algos_revocation: RevocationHashCutoffList::Default(),
            packet_tags: PacketTagCutoffList::Default(),
        }
    }

    /// Instantiates a new `StandardPolicy` with parameters
    /// appropriate for `time`.
    ///
    /// `time` is a meta-parameter that selects a security profile
    /// that is appropriate for the given point in time.  When
    /// evaluating an object, the reference time should be set to the
    /// time that the object was stored to non-tamperable storage.
    /// Since most applications don't record when they received an
    /// object, they should conservatively use the current time.
    ///
    /// Note that the reference time is a security parameter and is
    /// different from the time that the object was allegedly created.
    /// Consider evaluating a signature whose `Signature Creation
    /// Time` subpacket indicates that it was created in 2007.  Since
    /// the subpacket is under the control of the sender, setting the
    /// reference time according to the subpacket means that the
    /// sender chooses the security profile.  If the sender were an
    /// attacker, she could have forged this to take advantage of
    /// security weaknesses found since 2007.  This is why the
    /// reference time must be set---at the earliest---to the time
    /// that the message was stored to non-tamperable storage.  When
    /// that is not available, the current time should be used.
    pub fn at(time: SystemTime) -> Self {
        let mut p = Self::new();
        p.time = Some(system_time_cutoff_to_timestamp(time)
                          // Map "ACCEPT" to the end of time (None
                          // here means the current time).
                          .unwrap_or(Timestamp::MAX));
        p
    }

    /// Returns the policy's reference time.
    ///
    /// The current time is None.
    ///
    /// See `StandardPolicy::at` for details.
    pub fn time(&self) -> Option<SystemTime> {
        self.time.map(Into::into)
    }

    /// Always considers `h` to be secure.
    pub fn accept_hash(&mut self, h: HashAlgorithm) {
        self.hash_algos_normal.set(h, ACCEPT);
        self.hash_algos_revocation.set(h, ACCEPT);
    }

    /// Always considers `h` to be insecure.
    pub fn reject_hash(&mut self, h: HashAlgorithm) {
        self.hash_algos_normal.set(h, REJECT);
        self.hash_algos_revocation.set(h, REJECT);
    }

    /// Considers `h` to be insecure starting at `normal` for normal
    /// signatures and at `revocation` for revocation certificates.
    ///
    /// For each algorithm, there are two different cutoffs: when the
    /// algorithm is no longer safe for normal use (e.g., binding
    /// signatures, document signatures), and when the algorithm is no
    /// longer safe for revocations.  Normally, an algorithm should be
    /// allowed for use in a revocation longer than it should be
    /// allowed for normal use, because once we consider a revocation
    /// certificate to be invalid, it may cause something else to be
    /// considered valid!
    ///
    /// A cutoff of `None` means that there is no cutoff and the
    /// algorithm has no known vulnerabilities.
    pub fn reject_hash_at<N, R>(&mut self, h: HashAlgorithm,
                                normal: N, revocation: R)
        where N: Into<Option<SystemTime>>,
              R: Into<Option<SystemTime>>,
    {
        self.hash_algos_normal.set(
            h,
            normal.into().and_then(system_time_cutoff_to_timestamp));
        self.hash_algos_revocation.set(
            h,
            revocation.into().and_then(system_time_cutoff_to_timestamp));
    }

    /// Returns the cutoff times for the specified hash algorithm.
    pub fn hash_cutoffs(&self, h: HashAlgorithm)
        -> (Option<SystemTime>, Option<SystemTime>)
    {
        (self.hash_algos_normal.cutoff(h).map(|t| t.into()),
         self.hash_algos_revocation.cutoff(h).map(|t| t.into()))
    }

    /// Always accept packets with the given tag.
    pub fn accept_packet_tag(&mut self, tag: Tag) {
        self.packet_tags.set(tag, ACCEPT);
    }

    /// Always reject packets with the given tag.
    pub fn reject_packet_tag(&mut self, tag: Tag) {
        self.packet_tags.set(tag, REJECT);
    }

    /// Start rejecting packets with the given tag at `t`.
    ///
    /// A cutoff of `None` means that there is no cutoff and the
    /// packet has no known vulnerabilities.
    ///
    /// By default, we consider the *Symmetrically Encrypted Data
    /// Packet* (SED) insecure in messages created in the year 2004 or
    /// later.  The rationale here is that *Symmetrically Encrypted
    /// Integrity Protected Data Packet* (SEIP) can be downgraded to
    /// SED packets, enabling attacks exploiting the malleability of
    /// the CFB stream (see [EFAIL]).
    ///
    ///   [EFAIL]: https://en.wikipedia.org/wiki/EFAIL
    pub fn reject_packet_tag_at<C>(&mut self, tag: Tag, cutoff: C)
        where C: Into<Option<SystemTime>>,
    {
        self.packet_tags.set(
            tag,
            cutoff.into().and_then(system_time_cutoff_to_timestamp));
    }

    /// Returns the cutoff time for the specified packet tag.
    pub fn packet_tag_cutoff(&self, tag: Tag) -> Option<SystemTime> {
        self.packet_tags.cutoff(tag).map(|t| t.into())
    }
}

impl Policy for StandardPolicy {
    fn signature(&self, sig: &Signature) -> Result<()> {
        let time = self.time.unwrap_or_else(Timestamp::now);

        match sig.typ() {
            t @ SignatureType::KeyRevocation
                | t @ SignatureType::SubkeyRevocation
                | t @ SignatureType::CertificationRevocation =>
            {
                self.hash_algos_revocation.check(sig.hash_algo(), time)
                    .context(format!("revocation signature ({})", t))?
            }
            t =>
            {
                self.hash_algos_normal.check(sig.hash_algo(), time)
                    .context(format!("non-revocation signature ({})", t))?
            }
        }

        Ok(())
    }

    fn packet(&self, packet: &Packet) -> Result<()> {
        let time = self.time.unwrap_or_else(Timestamp::now);
        self.packet_tags.check(packet.tag(), time)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::cert::{CertBuilder, CertRevocationBuilder, SubkeyRevocationBuilder,
                       UserIDRevocationBuilder};
    use crate::packet::signature::SignatureBuilder;
    use crate::types::{PublicKeyAlgorithm, ReasonForRevocation};

    #[test]
    fn accepts_fresh_self_signatures() -> Result<()> {
        let p = StandardPolicy::new();

        let (cert, _) = CertBuilder::new()
            .add_userid("Alice <alice@example.org>")
            .add_signing_subkey()
            .add_transport_encryption_subkey()
            .generate()?;

        p.signature(cert.direct_key_signature().unwrap())?;
        for uid in cert.userids() {
            p.signature(uid.binding_signature().unwrap())?;
        }
        for subkey in cert.subkeys() {
            p.signature(subkey.binding_signature().unwrap())?;
        }

        Ok(())
    }

    #[test]
    fn custom_policy_can_reject_by_signature_type() -> Result<()> {
        #[derive(Debug)]
        struct NoDirectKeySigs;
        impl Policy for NoDirectKeySigs {
            fn signature(&self, sig: &Signature) -> Result<()> {
                if sig.typ() == SignatureType::DirectKey {
                    Err(anyhow::anyhow!("direct key signatures are not allowed"))
                } else {
                    Ok(())
                }
            }
        }

        let (cert, _) = CertBuilder::new().generate()?;
        let direct_sig = cert.direct_key_signature().unwrap();

        assert!(StandardPolicy::new().signature(direct_sig).is_ok());
        assert!(NoDirectKeySigs.signature(direct_sig).is_err());

        Ok(())
    }

    #[test]
    fn revocations_carry_their_own_signature_type() -> Result<()> {
        let p = StandardPolicy::new();

        let (cert, _) = CertBuilder::new()
            .add_userid("Alice <alice@example.org>")
            .add_signing_subkey()
            .generate()?;
        let mut signer = cert.primary_key().clone().into_keypair()?;

        let cert_revocation = CertRevocationBuilder::new()
            .set_reason_for_revocation(ReasonForRevocation::Unspecified, b"")?
            .build(&mut signer, &cert, None)?;
        assert_eq!(cert_revocation.typ(), SignatureType::KeyRevocation);
        p.signature(&cert_revocation)?;

        let uid = cert.userids()[0].userid().clone();
        let uid_revocation = UserIDRevocationBuilder::new()
            .set_reason_for_revocation(ReasonForRevocation::UIDRetired, b"left the project")?
            .build(&mut signer, &cert, &uid)?;
        assert_eq!(uid_revocation.typ(), SignatureType::CertificationRevocation);
        p.signature(&uid_revocation)?;

        let subkey = cert.subkeys()[0].key().clone();
        let subkey_revocation = SubkeyRevocationBuilder::new()
            .set_reason_for_revocation(ReasonForRevocation::KeyRetired, b"rotated")?
            .build(&mut signer, &cert, &subkey)?;
        assert_eq!(subkey_revocation.typ(), SignatureType::SubkeyRevocation);
        p.signature(&subkey_revocation)?;

        Ok(())
    }

    #[test]
    fn hash_algo_cutoffs() -> Result<()> {
        // A `const fn` is only guaranteed to be evaluated at compile
        // time if the result is assigned to a `const` variable.  Make
        // sure that works.
        const DEFAULT: StandardPolicy = StandardPolicy::new();

        let (cert, _) = CertBuilder::new().generate()?;
        let mut signer = cert.primary_key().clone().into_keypair()?;
        let sig = SignatureBuilder::new(SignatureType::Binary)
            .set_hash_algo(HashAlgorithm::SHA256)
            .sign_hash(&mut signer, HashAlgorithm::SHA256.context()?)?;

        // SHA256 is accepted by default.
        assert!(DEFAULT.signature(&sig).is_ok());

        // Reject it unconditionally.
        let mut reject = StandardPolicy::new();
        reject.reject_hash(HashAlgorithm::SHA256);
        assert!(reject.signature(&sig).is_err());
        assert_eq!(reject.hash_cutoffs(HashAlgorithm::SHA256),
                   (Some(Timestamp::UNIX_EPOCH.into()),
                    Some(Timestamp::UNIX_EPOCH.into())));

        // Reject it starting next year: still accepted now.
        const SECS_IN_YEAR: u64 = 365 * 24 * 60 * 60;
        let mut reject = StandardPolicy::new();
        reject.reject_hash_at(
            HashAlgorithm::SHA256,
            SystemTime::now() + Duration::from_secs(SECS_IN_YEAR),
            SystemTime::now() + Duration::from_secs(SECS_IN_YEAR));
        assert!(reject.signature(&sig).is_ok());

        // Reject it starting last year: no longer accepted.
        let mut reject = StandardPolicy::new();
        reject.reject_hash_at(
            HashAlgorithm::SHA256,
            SystemTime::now() - Duration::from_secs(SECS_IN_YEAR),
            SystemTime::now() - Duration::from_secs(SECS_IN_YEAR));
        assert!(reject.signature(&sig).is_err());

        // Explicitly re-accepting it overrides the rejection.
        reject.accept_hash(HashAlgorithm::SHA256);
        assert!(reject.signature(&sig).is_ok());

        Ok(())
    }

    #[test]
    fn packet_tag_cutoffs() {
        let p = StandardPolicy::new();

        // SEIP has no cutoff by default; SED has been unsafe since
        // 2004.
        assert_eq!(p.packet_tag_cutoff(Tag::SEIP), None);
        assert!(p.packet_tag_cutoff(Tag::SED).is_some());

        let mut p = StandardPolicy::new();
        p.reject_packet_tag(Tag::SEIP);
        assert_eq!(p.packet_tag_cutoff(Tag::SEIP),
                   Some(Timestamp::UNIX_EPOCH.into()));

        p.accept_packet_tag(Tag::SEIP);
        assert_eq!(p.packet_tag_cutoff(Tag::SEIP), None);
    }

    #[test]
    fn key_policy_rejects_by_algorithm() -> Result<()> {
        #[derive(Debug)]
        struct NoRsa;
        impl Policy for NoRsa {
            fn key(&self, key: &Key4) -> Result<()> {
                if key.pk_algo() == PublicKeyAlgorithm::RSAEncryptSign {
                    Err(anyhow::anyhow!("RSA is not allowed"))
                } else {
                    Ok(())
                }
            }
        }

        let (cert, _) = CertBuilder::new()
            .set_cipher_suite(crate::cert::CipherSuite::RSA3k)
            .generate()?;

        assert!(StandardPolicy::new().key(cert.primary_key()).is_ok());
        assert!(NoRsa.key(cert.primary_key()).is_err());

        Ok(())
    }
}
