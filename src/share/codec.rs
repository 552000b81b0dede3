//! Shareable-state codec
//!
//! Turns the ordered record list into a URL-safe token and back.
//!
//! Encoding always produces the current format:
//! 1. Serialize records to compact JSON (field and record order kept)
//! 2. LZ-string compress into the URI-safe alphabet
//!
//! Decoding tries every format that links have ever used, in
//! [`ShareFormat::DECODE_ORDER`], and stops at the first that yields a valid
//! record array. Any other outcome is a [`DecodeFailure`]; no partial lists.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::{CodecError, DecodeFailure};
use super::lzstring;
use crate::board::{CategoryCounts, TriageRecord};

/// Base64 reader with `atob` leniency: padding optional, trailing bits ignored
const FORGIVING_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Generations of the share-link format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShareFormat {
    /// LZ-string compressed JSON in the URI alphabet (current)
    Compressed,
    /// Base64 of UTF-8 JSON
    Utf8Base64,
    /// Base64 of JSON, one character per byte
    Latin1Base64,
}

impl ShareFormat {
    /// Order in which decoding attempts formats
    pub const DECODE_ORDER: [ShareFormat; 3] = [
        ShareFormat::Compressed,
        ShareFormat::Utf8Base64,
        ShareFormat::Latin1Base64,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ShareFormat::Compressed => "compressed",
            ShareFormat::Utf8Base64 => "utf8-base64",
            ShareFormat::Latin1Base64 => "latin1-base64",
        }
    }

    pub fn is_legacy(&self) -> bool {
        !matches!(self, ShareFormat::Compressed)
    }

    /// Recover the JSON text carried by `token` in this format
    fn payload(self, token: &str) -> Result<String, CodecError> {
        let text = match self {
            ShareFormat::Compressed => {
                check_token_len(token)?;
                lzstring::decompress_from_uri(token).ok_or_else(|| {
                    CodecError::Decompress("not a valid LZ-string URI stream".to_string())
                })?
            }
            ShareFormat::Utf8Base64 => String::from_utf8(base64_bytes(token)?)?,
            ShareFormat::Latin1Base64 => base64_bytes(token)?
                .into_iter()
                .map(char::from)
                .collect(),
        };

        if text.trim().is_empty() {
            return Err(CodecError::Empty);
        }
        Ok(text)
    }
}

impl fmt::Display for ShareFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Base64-decode like `atob`. A space stands for a `+` mangled by query
/// parsing; other whitespace is dropped.
fn base64_bytes(token: &str) -> Result<Vec<u8>, CodecError> {
    let cleaned: String = token
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('+'),
            '\t' | '\n' | '\r' | '\x0C' => None,
            other => Some(other),
        })
        .collect();
    Ok(FORGIVING_BASE64.decode(cleaned)?)
}

/// Successful decode result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub records: Vec<TriageRecord>,
    /// Format that accepted the token
    pub format: ShareFormat,
}

/// Record ids written by older dashboards were sometimes bare numbers
#[derive(Deserialize)]
#[serde(untagged)]
enum WireId {
    Text(String),
    Number(u64),
}

#[derive(Deserialize)]
struct WireRecord {
    id: WireId,
    dia: NaiveDate,
    #[serde(flatten)]
    counts: CategoryCounts,
    #[serde(default)]
    total: Option<u64>,
}

impl WireRecord {
    fn into_record(self, index: usize) -> Result<TriageRecord, CodecError> {
        let id = match self.id {
            WireId::Text(id) => id,
            WireId::Number(n) => n.to_string(),
        };
        let record = TriageRecord::new(id, self.dia, self.counts);

        match self.total {
            Some(total) if total != record.total => Err(CodecError::InvalidRecord {
                index,
                reason: format!(
                    "total {} does not match category sum {}",
                    total, record.total
                ),
            }),
            _ => Ok(record),
        }
    }
}

fn check_token_len(token: &str) -> Result<(), CodecError> {
    let length = token.chars().count();
    if length > lzstring::MAX_TOKEN_LEN {
        return Err(CodecError::TooLong {
            length,
            max: lzstring::MAX_TOKEN_LEN,
        });
    }
    Ok(())
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Parse and validate the JSON form of a record list
///
/// The value must be an array whose entries are record-shaped. A missing
/// `total` is derived; a `total` that disagrees with the counts is rejected.
pub fn parse_records(json: &str) -> Result<Vec<TriageRecord>, CodecError> {
    let value: serde_json::Value = serde_json::from_str(json)?;

    let entries = match value {
        serde_json::Value::Array(entries) => entries,
        other => return Err(CodecError::NotASequence(json_kind(&other))),
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let wire: WireRecord =
                serde_json::from_value(entry).map_err(|e| CodecError::InvalidRecord {
                    index,
                    reason: e.to_string(),
                })?;
            wire.into_record(index)
        })
        .collect()
}

/// Compact JSON form of a record list
pub fn to_json(records: &[TriageRecord]) -> Result<String, CodecError> {
    serde_json::to_string(records).map_err(CodecError::from)
}

/// Encode records into a URL-safe share token
///
/// Deterministic. Output uses only `A-Z a-z 0-9 + -`. Fails with
/// [`CodecError::TooLong`] when the token would exceed
/// [`lzstring::MAX_TOKEN_LEN`], since decoding would refuse it.
pub fn encode(records: &[TriageRecord]) -> Result<String, CodecError> {
    let json = to_json(records)?;
    let token = lzstring::compress_to_uri(&json);
    check_token_len(&token)?;

    tracing::debug!(
        records = records.len(),
        json_bytes = json.len(),
        token_bytes = token.len(),
        "Encoded share token"
    );

    Ok(token)
}

/// Decode a share token, trying each format in [`ShareFormat::DECODE_ORDER`]
pub fn decode(token: &str) -> Result<Decoded, DecodeFailure> {
    let mut attempts = Vec::with_capacity(ShareFormat::DECODE_ORDER.len());

    for format in ShareFormat::DECODE_ORDER {
        match format.payload(token).and_then(|text| parse_records(&text)) {
            Ok(records) => {
                if format.is_legacy() {
                    tracing::info!(format = %format, records = records.len(), "Decoded legacy share token");
                }
                return Ok(Decoded { records, format });
            }
            Err(err) => {
                tracing::debug!(format = %format, error = %err, "Share format rejected token");
                attempts.push((format, err));
            }
        }
    }

    Err(DecodeFailure { attempts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn two_records() -> Vec<TriageRecord> {
        vec![
            TriageRecord::new("1", day(2023, 10, 1), CategoryCounts::new(2, 5, 15, 30, 10)),
            TriageRecord::new("2", day(2023, 10, 2), CategoryCounts::new(1, 8, 12, 35, 8)),
        ]
    }

    const TWO_RECORDS_TOKEN: &str = "NobwRAlgJmBcYEYwBoxQgQzmATABhwGYBaBPYvJVANwFMAnAW1oBsALAezh1RY3owA7AFZZYAVlQZG-Vl1gJJYOvSi04hPFIBeAVxZwyqAC4djGA7ABsOAL7Jw0bDhRpMzgiTIUXNBs3Z5BF5+IVE4AA4pGXo5Qx5lBjUNJQw9SyiwU3NLKwAWWwBdIA";

    #[test]
    fn test_two_record_scenario() {
        let records = two_records();
        let token = encode(&records).unwrap();
        assert_eq!(token, TWO_RECORDS_TOKEN);

        let decoded = decode(&token).unwrap();
        assert_eq!(decoded.format, ShareFormat::Compressed);
        assert_eq!(decoded.records, records);
    }

    #[test]
    fn test_empty_list_round_trip() {
        let token = encode(&[]).unwrap();
        let decoded = decode(&token).unwrap();
        assert!(decoded.records.is_empty());
    }

    #[test]
    fn test_encode_is_deterministic_and_url_safe() {
        let records = two_records();
        let a = encode(&records).unwrap();
        let b = encode(&records).unwrap();
        assert_eq!(a, b);
        assert!(a.chars().all(|c| lzstring::URI_ALPHABET[..64].contains(c)));
    }

    #[test]
    fn test_legacy_utf8_base64() {
        // base64 of UTF-8 JSON for a record with id "manhã-1"
        let token = "W3siaWQiOiJtYW5ow6MtMSIsImRpYSI6IjIwMjMtMTAtMDEiLCJ2ZXJtZWxobyI6MiwibGFyYW5qYSI6NSwiYW1hcmVsbyI6MTUsInZlcmRlIjozMCwiYXp1bCI6MTAsInRvdGFsIjo2Mn1d";
        let decoded = decode(token).unwrap();
        assert_eq!(decoded.format, ShareFormat::Utf8Base64);
        assert_eq!(
            decoded.records,
            vec![TriageRecord::new(
                "manhã-1",
                day(2023, 10, 1),
                CategoryCounts::new(2, 5, 15, 30, 10)
            )]
        );
    }

    #[test]
    fn test_legacy_latin1_base64() {
        // Same record, but the JSON bytes are Latin-1 so UTF-8 decoding fails
        let token = "W3siaWQiOiJtYW5o4y0xIiwiZGlhIjoiMjAyMy0xMC0wMSIsInZlcm1lbGhvIjoyLCJsYXJhbmphIjo1LCJhbWFyZWxvIjoxNSwidmVyZGUiOjMwLCJhenVsIjoxMCwidG90YWwiOjYyfV0=";
        let decoded = decode(token).unwrap();
        assert_eq!(decoded.format, ShareFormat::Latin1Base64);
        assert_eq!(decoded.records[0].id, "manhã-1");
        assert_eq!(decoded.records[0].total, 62);
    }

    #[test]
    fn test_legacy_ascii_base64_is_read_by_first_legacy_format() {
        let token = "W3siaWQiOiIxIiwiZGlhIjoiMjAyMy0xMC0wMSIsInZlcm1lbGhvIjoyLCJsYXJhbmphIjo1LCJhbWFyZWxvIjoxNSwidmVyZGUiOjMwLCJhenVsIjoxMCwidG90YWwiOjYyfSx7ImlkIjoiMiIsImRpYSI6IjIwMjMtMTAtMDIiLCJ2ZXJtZWxobyI6MSwibGFyYW5qYSI6OCwiYW1hcmVsbyI6MTIsInZlcmRlIjozNSwiYXp1bCI6OCwidG90YWwiOjY0fV0=";
        let decoded = decode(token).unwrap();
        assert_eq!(decoded.format, ShareFormat::Utf8Base64);
        assert_eq!(decoded.records, two_records());

        // Unpadded, as some links were truncated
        let decoded = decode(token.trim_end_matches('=')).unwrap();
        assert_eq!(decoded.records, two_records());
    }

    #[test]
    fn test_malformed_token_fails_closed() {
        let failure = decode("not-a-valid-token!!").unwrap_err();
        assert_eq!(failure.attempts.len(), 3);
        let formats: Vec<ShareFormat> = failure.attempts.iter().map(|(f, _)| *f).collect();
        assert_eq!(formats, ShareFormat::DECODE_ORDER.to_vec());
    }

    #[test]
    fn test_empty_token_fails_closed() {
        let failure = decode("").unwrap_err();
        assert_eq!(failure.attempts.len(), 3);
        assert!(matches!(failure.attempts[0].1, CodecError::Decompress(_)));
    }

    #[test]
    fn test_non_sequence_is_rejected() {
        // LZ-compressed {"id":"1","dia":"2023-10-01"}
        let failure = decode("N4IglgJiBcIIwgDQgmAhjEAmADFgzALRw6E4IC+QA").unwrap_err();
        assert_eq!(failure.attempts[0].1, CodecError::NotASequence("object"));

        // base64 of {"id":"1"}
        let failure = decode("eyJpZCI6IjEifQ==").unwrap_err();
        assert_eq!(failure.attempts[1].1, CodecError::NotASequence("object"));
    }

    #[test]
    fn test_total_mismatch_is_rejected() {
        // LZ-compressed record whose total is 99 instead of 62
        let failure = decode("NobwRAlgJmBcYEYwBoxQgQzmATABhwGYBaBPYvJVANwFMAnAW1oBsALAezh1RY3owA7AFZZYAVlQZG-Vl1gJJYOvSi04hPFIBeAVxZwyqAC4djGA7ACcVgL4BdIA").unwrap_err();
        assert!(matches!(
            failure.attempts[0].1,
            CodecError::InvalidRecord { index: 0, .. }
        ));
    }

    #[test]
    fn test_missing_total_is_derived() {
        let decoded = decode("NobwRAlgJmBcYEYwBoxQgQzmATABhwGYBaBPYvJVANwFMAnAW1oBsALAezh1RY3owA7AFZZYAVlQZG-Vl1gJJYOvSi04hPFIBeAVxZwyAXwC6QA").unwrap();
        assert_eq!(decoded.records[0].total, 62);
    }

    #[test]
    fn test_oversized_token_is_refused_before_decompression() {
        let token = "A".repeat(lzstring::MAX_TOKEN_LEN + 1);
        let failure = decode(&token).unwrap_err();
        assert_eq!(
            failure.attempts[0].1,
            CodecError::TooLong {
                length: lzstring::MAX_TOKEN_LEN + 1,
                max: lzstring::MAX_TOKEN_LEN,
            }
        );
    }

    #[test]
    fn test_encode_refuses_tokens_decode_would_reject() {
        // Pseudo-random counts and ids so the JSON does not compress away
        let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
        let mut next = move || {
            seed = seed
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            (seed >> 33) as u32
        };
        let start = day(2000, 1, 1);
        let records: Vec<TriageRecord> = (0..1500u64)
            .map(|i| {
                TriageRecord::new(
                    next().to_string(),
                    start + chrono::Days::new(i),
                    CategoryCounts::new(
                        next() % 1000,
                        next() % 1000,
                        next() % 1000,
                        next() % 1000,
                        next() % 1000,
                    ),
                )
            })
            .collect();

        let err = encode(&records).unwrap_err();
        assert!(matches!(err, CodecError::TooLong { max, .. } if max == lzstring::MAX_TOKEN_LEN));

        // A year of typical daily records still fits
        let year: Vec<TriageRecord> = (0..365u64)
            .map(|i| {
                let n = i as u32;
                TriageRecord::new(
                    (1_672_531_200_000 + i * 86_400_000).to_string(),
                    start + chrono::Days::new(i),
                    CategoryCounts::new(n % 5, n % 11, 10 + n % 17, 25 + n % 23, n % 13),
                )
            })
            .collect();
        assert!(encode(&year).is_ok());
    }

    #[test]
    fn test_parse_records_accepts_numeric_ids() {
        let records = parse_records(
            r#"[{"id":1696118400000,"dia":"2023-10-01","vermelho":1,"laranja":0,"amarelo":0,"verde":0,"azul":0,"total":1}]"#,
        )
        .unwrap();
        assert_eq!(records[0].id, "1696118400000");
    }

    #[test]
    fn test_parse_records_rejects_bad_dates() {
        let err = parse_records(r#"[{"id":"1","dia":"01/10/2023"}]"#).unwrap_err();
        assert!(matches!(err, CodecError::InvalidRecord { index: 0, .. }));
    }

    fn arb_record() -> impl Strategy<Value = TriageRecord> {
        (
            "\\PC{0,12}",
            2000i32..2100,
            1u32..=12,
            1u32..=28,
            proptest::array::uniform5(0u32..10_000),
        )
            .prop_map(|(id, y, m, d, [r, o, a, g, b])| {
                TriageRecord::new(id, day(y, m, d), CategoryCounts::new(r, o, a, g, b))
            })
    }

    proptest! {
        #[test]
        fn prop_round_trip(records in proptest::collection::vec(arb_record(), 0..40)) {
            let token = encode(&records).unwrap();
            prop_assert!(token.chars().all(|c| lzstring::URI_ALPHABET[..64].contains(c)));

            let decoded = decode(&token).unwrap();
            prop_assert_eq!(decoded.format, ShareFormat::Compressed);
            prop_assert_eq!(decoded.records, records);
        }
    }
}
