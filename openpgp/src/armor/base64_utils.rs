//! A thin shim reproducing the `base64` 0.13-era free functions
//! (`encode_config`, `decode_config_slice`, ...) on top of the
//! `Engine`-based API that crate versions >= 0.21 settled on.
//!
//! Keeping the call sites in [`super`] written against the old,
//! config-argument style makes the armor code read like the RFC 4880
//! section it implements, rather than threading an `Engine` value
//! through every call.

use base64::engine::{general_purpose, Engine};
use base64::DecodeError;

/// Standard alphabet, with `=` padding -- matches the old
/// `base64::STANDARD` config.
pub(crate) const STANDARD: &general_purpose::GeneralPurpose = &general_purpose::STANDARD;
/// Standard alphabet, no padding -- matches the old
/// `base64::STANDARD_NO_PAD` config.
pub(crate) const STANDARD_NO_PAD: &general_purpose::GeneralPurpose =
    &general_purpose::STANDARD_NO_PAD;

pub(crate) fn encode_config(input: &[u8], engine: &general_purpose::GeneralPurpose) -> String {
    engine.encode(input)
}

pub(crate) fn encode_config_slice(
    input: &[u8],
    engine: &general_purpose::GeneralPurpose,
    output: &mut [u8],
) -> usize {
    // The 0.13 API wrote directly into `output`; the `Engine` trait
    // only hands back an owned `String`, so encode into a scratch
    // buffer and copy the bytes actually produced.
    let encoded = engine.encode(input);
    let n = encoded.len().min(output.len());
    output[..n].copy_from_slice(&encoded.as_bytes()[..n]);
    n
}

pub(crate) fn decode_config(
    input: &[u8],
    engine: &general_purpose::GeneralPurpose,
) -> Result<Vec<u8>, DecodeError> {
    engine.decode(input)
}

pub(crate) fn decode_config_slice(
    input: &[u8],
    engine: &general_purpose::GeneralPurpose,
    output: &mut [u8],
) -> Result<usize, DecodeError> {
    engine.decode_slice(input, output)
}
