//! Byte patterns and their normalization.
//!
//! A [`Pattern`] is either a human-readable hex string or raw bytes. Both
//! forms go through [`normalize`] before they reach the file, so the engine
//! only ever sees canonical byte sequences.
//!
//! Accepted hex forms:
//!
//! ```text
//! 4C 8D 05 82        spaced pairs
//! 4C8D0582           packed pairs
//! \x4C\x8D\x05\x82   backslash-x escapes
//! b'4C 8D 05 82'     either of the above inside a byte literal
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A find or replace pattern as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Pattern {
    Hex(String),
    Raw(Vec<u8>),
}

impl Pattern {
    pub fn hex<S: Into<String>>(s: S) -> Self {
        Pattern::Hex(s.into())
    }

    pub fn raw<B: Into<Vec<u8>>>(bytes: B) -> Self {
        Pattern::Raw(bytes.into())
    }

    /// Canonical byte sequence for this pattern.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        normalize(self)
    }
}

impl From<&str> for Pattern {
    fn from(s: &str) -> Self {
        Pattern::Hex(s.to_string())
    }
}

impl From<String> for Pattern {
    fn from(s: String) -> Self {
        Pattern::Hex(s)
    }
}

impl From<Vec<u8>> for Pattern {
    fn from(bytes: Vec<u8>) -> Self {
        Pattern::Raw(bytes)
    }
}

impl From<&[u8]> for Pattern {
    fn from(bytes: &[u8]) -> Self {
        Pattern::Raw(bytes.to_vec())
    }
}

impl<const N: usize> From<[u8; N]> for Pattern {
    fn from(bytes: [u8; N]) -> Self {
        Pattern::Raw(bytes.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for Pattern {
    fn from(bytes: &[u8; N]) -> Self {
        Pattern::Raw(bytes.to_vec())
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Hex(s) => f.write_str(s.trim()),
            Pattern::Raw(bytes) => f.write_str(&format_hex(bytes)),
        }
    }
}

/// Convert a pattern into its canonical byte sequence.
///
/// Raw bytes pass through unchanged; hex strings are decoded with
/// [`parse_hex`]. Empty patterns are rejected in both forms since they can
/// neither be searched for nor written.
pub fn normalize(pattern: &Pattern) -> Result<Vec<u8>> {
    let bytes = match pattern {
        Pattern::Raw(bytes) => bytes.clone(),
        Pattern::Hex(s) => parse_hex(s)?,
    };

    if bytes.is_empty() {
        return Err(Error::MalformedPattern("pattern is empty".to_string()));
    }

    Ok(bytes)
}

/// Decode a hex pattern string into bytes.
pub fn parse_hex(input: &str) -> Result<Vec<u8>> {
    let body = strip_byte_literal(input.trim());

    if body.contains("\\x") {
        parse_escaped(body)
    } else {
        parse_pairs(body)
    }
}

/// Format bytes as space-separated uppercase hex pairs.
pub fn format_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_byte_literal(s: &str) -> &str {
    for quote in ['\'', '"'] {
        let inner = s
            .strip_prefix('b')
            .and_then(|rest| rest.strip_prefix(quote))
            .and_then(|rest| rest.strip_suffix(quote));
        if let Some(inner) = inner {
            return inner.trim();
        }
    }
    s
}

fn parse_pairs(s: &str) -> Result<Vec<u8>> {
    let mut bytes = Vec::with_capacity(s.len() / 2);
    let mut chars = s.char_indices();

    while let Some((pos, c)) = chars.next() {
        if c.is_whitespace() {
            continue;
        }

        let hi = hex_digit(c, pos)?;
        let lo = match chars.next() {
            Some((pos, c)) if c.is_whitespace() => {
                return Err(Error::MalformedPattern(format!(
                    "whitespace splits a hex pair at position {}",
                    pos
                )));
            }
            Some((pos, c)) => hex_digit(c, pos)?,
            None => {
                return Err(Error::MalformedPattern(
                    "odd number of hex digits".to_string(),
                ));
            }
        };

        bytes.push((hi << 4) | lo);
    }

    Ok(bytes)
}

fn parse_escaped(s: &str) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    let mut rest = s.trim_start();

    while !rest.is_empty() {
        let pos = s.len() - rest.len();
        let Some(tail) = rest.strip_prefix("\\x") else {
            return Err(Error::MalformedPattern(format!(
                "expected \\x escape at position {}",
                pos
            )));
        };

        let mut digits = tail.chars();
        let (Some(h), Some(l)) = (digits.next(), digits.next()) else {
            return Err(Error::MalformedPattern(format!(
                "truncated \\x escape at position {}",
                pos
            )));
        };

        let hi = hex_digit(h, pos + 2)?;
        let lo = hex_digit(l, pos + 2 + h.len_utf8())?;
        bytes.push((hi << 4) | lo);

        rest = digits.as_str().trim_start();
    }

    Ok(bytes)
}

fn hex_digit(c: char, pos: usize) -> Result<u8> {
    c.to_digit(16).map(|d| d as u8).ok_or_else(|| {
        Error::MalformedPattern(format!("invalid hex character {:?} at position {}", c, pos))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_and_raw_are_equivalent() {
        let hex = normalize(&Pattern::hex("4C 8D 05")).unwrap();
        let raw = normalize(&Pattern::raw([0x4Cu8, 0x8D, 0x05])).unwrap();
        assert_eq!(hex, raw);
        assert_eq!(hex, vec![0x4C, 0x8D, 0x05]);
    }

    #[test]
    fn test_raw_is_identity() {
        let bytes: Vec<u8> = vec![0x00, 0xFF, 0x20, 0x0A];
        assert_eq!(Pattern::from(bytes.clone()).to_bytes().unwrap(), bytes);
    }

    #[test]
    fn test_parse_hex_packed_and_mixed_case() {
        assert_eq!(parse_hex("4c8D05").unwrap(), vec![0x4C, 0x8D, 0x05]);
        assert_eq!(parse_hex("  4C\t8d\n05  ").unwrap(), vec![0x4C, 0x8D, 0x05]);
    }

    #[test]
    fn test_parse_hex_escaped() {
        assert_eq!(parse_hex("\\x4C\\x8D\\x05").unwrap(), vec![0x4C, 0x8D, 0x05]);
        assert_eq!(parse_hex("\\x4C \\x8D \\x05").unwrap(), vec![0x4C, 0x8D, 0x05]);
    }

    #[test]
    fn test_parse_hex_byte_literal() {
        assert_eq!(parse_hex("b'4C 8D 05'").unwrap(), vec![0x4C, 0x8D, 0x05]);
        assert_eq!(parse_hex("b\"\\x4C\\x8D\\x05\"").unwrap(), vec![0x4C, 0x8D, 0x05]);
    }

    #[test]
    fn test_parse_hex_odd_digit_count() {
        let err = parse_hex("4C 8D 0").unwrap_err();
        assert!(matches!(err, Error::MalformedPattern(_)));
    }

    #[test]
    fn test_parse_hex_invalid_character() {
        assert!(matches!(
            parse_hex("4C ZZ"),
            Err(Error::MalformedPattern(_))
        ));
        assert!(matches!(parse_hex("0x4C"), Err(Error::MalformedPattern(_))));
    }

    #[test]
    fn test_parse_hex_split_pair() {
        let err = parse_hex("4 C 8D").unwrap_err();
        assert!(err.to_string().contains("whitespace splits"));
    }

    #[test]
    fn test_parse_hex_bad_escape() {
        assert!(matches!(parse_hex("\\x4"), Err(Error::MalformedPattern(_))));
        assert!(matches!(
            parse_hex("\\x4C 8D"),
            Err(Error::MalformedPattern(_))
        ));
        assert!(matches!(parse_hex("\\xG1"), Err(Error::MalformedPattern(_))));
    }

    #[test]
    fn test_empty_pattern_rejected() {
        assert!(matches!(
            normalize(&Pattern::hex("   ")),
            Err(Error::MalformedPattern(_))
        ));
        assert!(matches!(
            normalize(&Pattern::raw(Vec::new())),
            Err(Error::MalformedPattern(_))
        ));
    }

    #[test]
    fn test_format_hex() {
        assert_eq!(format_hex(&[0x4C, 0x8D, 0x05]), "4C 8D 05");
        assert_eq!(format_hex(&[]), "");
    }

    #[test]
    fn test_pattern_display() {
        assert_eq!(Pattern::hex(" 4c 8d ").to_string(), "4c 8d");
        assert_eq!(Pattern::raw(b"\x4C\x8D").to_string(), "4C 8D");
    }

    #[test]
    fn test_pattern_deserialize_untagged() {
        let hex: Pattern = serde_json::from_str("\"AA BB\"").unwrap();
        assert_eq!(hex, Pattern::hex("AA BB"));

        let raw: Pattern = serde_json::from_str("[170, 187]").unwrap();
        assert_eq!(raw, Pattern::raw([0xAAu8, 0xBB]));
    }
}
