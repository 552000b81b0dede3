//! Shareable-state codec
//!
//! The whole dataset travels in a dashboard link instead of server-side
//! storage. This module encodes the record list into a URL-safe token,
//! decodes tokens of every historical format, and builds/parses the links
//! that carry them.
//!
//! ## Architecture
//!
//! - **lzstring**: LZ-string compression over the URI-safe alphabet
//! - **codec**: JSON wire form, encode, ordered multi-format decode
//! - **link**: putting a token into a URL and getting it back out

pub mod codec;
pub mod error;
pub mod link;
pub mod lzstring;

pub use codec::{decode, encode, parse_records, to_json, Decoded, ShareFormat};
pub use error::{CodecError, DecodeFailure};
pub use link::{share_url, token_from_link, DEFAULT_PARAM};
