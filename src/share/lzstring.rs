//! LZ-string compression with the URI-safe output alphabet
//!
//! Thin layer over the `lz-str` crate's `*_encoded_uri_component` pair,
//! which is bit-compatible with the JavaScript `lz-string` library used by
//! browser dashboards. This layer adds what links need on top:
//! - a space is read back as `+` (query parsers decode `+` to a space)
//! - characters outside the alphabet reject the token up front
//! - tokens longer than [`MAX_TOKEN_LEN`] are never decompressed
//!
//! Decompressed size can grow quadratically with token length, so the
//! token cap is what bounds decode memory.

/// Alphabet accepted on input
///
/// Only the first 64 symbols are ever emitted; `$` is accepted when
/// reading, as the JavaScript library does, and carries no bits.
pub const URI_ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+-$";

/// Longest token that will be decompressed or produced
pub const MAX_TOKEN_LEN: usize = 16 * 1024;

/// Compress `input` into a string over the URI alphabet
///
/// Deterministic; the empty string compresses to `"Q"`. No length check
/// happens here, see [`MAX_TOKEN_LEN`].
pub fn compress_to_uri(input: &str) -> String {
    lz_str::compress_to_encoded_uri_component(input)
}

/// Decompress a string produced by [`compress_to_uri`]
///
/// Returns `None` for empty input, input longer than [`MAX_TOKEN_LEN`],
/// symbols outside [`URI_ALPHABET`], a malformed stream, or a payload that
/// is not valid UTF-16.
pub fn decompress_from_uri(input: &str) -> Option<String> {
    if input.is_empty() || input.len() > MAX_TOKEN_LEN {
        return None;
    }

    let cleaned: String = input
        .chars()
        .map(|c| if c == ' ' { '+' } else { c })
        .collect();
    if !cleaned.chars().all(|c| URI_ALPHABET.contains(c)) {
        return None;
    }

    let units = lz_str::decompress_from_encoded_uri_component(cleaned.as_str())?;
    String::from_utf16(&units).ok()
}
