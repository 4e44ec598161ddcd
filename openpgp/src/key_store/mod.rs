//! Key store codecs: reading and writing certificates and protected
//! secret-key material from the on-disk formats GnuPG-compatible
//! tooling uses.
//!
//! Three independent codecs live here:
//!
//! - [`transferable`]: the flat, possibly-armored packet-sequence
//!   format (`gpg --export`'s output).
//! - [`keybox`]: the framed `KBXf` blob format, which bundles
//!   transferable-key bytes per primary key alongside a fingerprint
//!   index.
//! - [`sexp_store`]: the per-key canonical-S-expression protected
//!   secret-key file format used by `private-keys-v1.d/`.
//!
//! [`Format`] and [`detect`] implement the store-agnostic format
//! sniffing and default-homedir discovery described for this
//! component.

pub mod keybox;
pub mod sexp_store;
pub mod transferable;

use std::path::Path;

/// A recognised on-disk key material encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// One top-level canonical S-expression (`sexp_store`).
    SExpression,
    /// A `KBXf`-framed keybox (`keybox`).
    Keybox,
    /// ASCII-armored OpenPGP (`transferable`, dearmored first).
    Armored,
    /// Raw binary OpenPGP packets (`transferable`).
    Raw,
}

/// Sniffs `data`'s format.
///
/// - starts with `(` and ends with `)` → [`Format::SExpression`];
/// - bytes 8..12 equal `KBXf` → [`Format::Keybox`];
/// - starts with `-----` → [`Format::Armored`];
/// - high bit of the first octet is set → [`Format::Raw`];
/// - otherwise `None` (unknown).
pub fn detect(data: &[u8]) -> Option<Format> {
    let trimmed_end = {
        let mut end = data.len();
        while end > 0 && data[end - 1].is_ascii_whitespace() {
            end -= 1;
        }
        end
    };
    if data.first() == Some(&b'(') && trimmed_end > 0 && data[trimmed_end - 1] == b')' {
        return Some(Format::SExpression);
    }
    if keybox::looks_like_keybox(data) {
        return Some(Format::Keybox);
    }
    if data.starts_with(b"-----") {
        return Some(Format::Armored);
    }
    if data.first().map(|b| b & 0x80 != 0).unwrap_or(false) {
        return Some(Format::Raw);
    }
    None
}

/// The public/secret codec pair a homedir uses, per
/// [`discover_homedir`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomedirLayout {
    /// `pubring.kbx` (keybox) + `private-keys-v1.d/` (one s-expression
    /// file per key, named by grip).
    KeyboxAndSExpressionDir,
    /// `pubring.gpg` + `secring.gpg`, both transferable format.
    TransferablePair,
}

/// Inspects a GnuPG-style homedir `h` and decides which layout it
/// uses, per the default-homedir discovery rule: prefer the keybox
/// layout when both its files are present, fall back to the legacy
/// pair, otherwise report unknown so the caller supplies formats
/// explicitly.
pub fn discover_homedir(h: &Path) -> Option<HomedirLayout> {
    if h.join("pubring.kbx").is_file() && h.join("private-keys-v1.d").is_dir() {
        return Some(HomedirLayout::KeyboxAndSExpressionDir);
    }
    if h.join("pubring.gpg").is_file() && h.join("secring.gpg").is_file() {
        return Some(HomedirLayout::TransferablePair);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_sexp() {
        assert_eq!(detect(b"(private-key (rsa (n #00#)))"), Some(Format::SExpression));
    }

    #[test]
    fn detects_armored() {
        assert_eq!(
            detect(b"-----BEGIN PGP PUBLIC KEY BLOCK-----\n"),
            Some(Format::Armored)
        );
    }

    #[test]
    fn detects_raw() {
        assert_eq!(detect(&[0x99, 0x01, 0x00]), Some(Format::Raw));
    }

    #[test]
    fn unknown_is_none() {
        assert_eq!(detect(b"not a key at all"), None);
    }

    #[test]
    fn no_homedir_layout_when_absent() {
        let dir = std::env::temp_dir().join(format!(
            "rpgp-core-test-homedir-{:?}", std::thread::current().id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        assert_eq!(discover_homedir(&dir), None);
        std::fs::remove_dir_all(&dir).ok();
    }
}
