//! Formatting helpers used by `Debug` implementations throughout the
//! packet types.

/// Lowercase hex encoding, with no separators -- used for `Debug`
/// output of opaque byte blobs (packet bodies, digests, unknown
/// subpacket payloads).
pub mod hex {
    /// Encodes `bytes` as a lowercase hex string.
    pub fn encode<T: AsRef<[u8]>>(bytes: T) -> String {
        let bytes = bytes.as_ref();
        let mut s = String::with_capacity(bytes.len() * 2);
        for b in bytes {
            s.push_str(&format!("{:02x}", b));
        }
        s
    }
}
