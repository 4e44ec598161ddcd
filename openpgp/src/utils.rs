//! Small helpers shared across the crate.

/// Strips trailing zero octets from a bitfield, returning the
/// original length so equality can still compare semantically (a
/// subpacket's flag byte and the same byte padded with zeros mean the
/// same thing).
pub(crate) fn bitfield_remove_padding(v: &mut Vec<u8>) -> usize {
    let len = v.len();
    while v.last() == Some(&0) {
        v.pop();
    }
    len
}

/// Encodes `bytes` as lowercase hex, grouped in pairs separated by
/// spaces every four octets -- used only for `Debug` output.
pub(crate) fn hex_pretty(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 && i % 4 == 0 {
            s.push(' ');
        }
        s.push_str(&format!("{:02x}", b));
    }
    s
}

/// `Vec::truncate`, spelled out so a future debug-build fast path can
/// be dropped in without touching call sites.
pub(crate) fn vec_truncate(v: &mut Vec<u8>, len: usize) {
    v.truncate(len);
}

/// Removes the first `amount` bytes of `v` in place, shifting the
/// remainder down rather than reallocating.
pub(crate) fn vec_drain_prefix(v: &mut Vec<u8>, amount: usize) {
    v.drain(..amount);
}
