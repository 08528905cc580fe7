//! Representation of a shared secret, either "raw" \[u8\], hex encoded or base32 encoded
//!
//! # Examples
//!
//! - Decode whatever the user typed in
//! ```
//! use totp_gen::decode_secret;
//!
//! let from_hex = decode_secret("3132333435363738393031323334353637383930").unwrap();
//! let from_base32 = decode_secret("gezd gnbv gy3t qojq gezd gnbv gy3t qojq").unwrap();
//!
//! assert_eq!(from_hex, b"12345678901234567890");
//! assert_eq!(from_hex, from_base32);
//! ```
//!
//! - Keep the secret around without decoding it yet
//! ```
//! use totp_gen::Secret;
//!
//! let secret: Secret = "JBSWY3DPEHPK3PXP".parse().unwrap();
//!
//! assert!(matches!(secret, Secret::Base32(_)));
//! assert_eq!(secret.to_raw().unwrap().to_string(), "48656c6c6f21deadbeef");
//! ```

use std::str::FromStr;

use base32::{self, Alphabet};
use constant_time_eq::constant_time_eq;

#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};

use crate::SecretParseError;

/// Returns `true` when `secret` is a non-empty, even-length run of hex digits.
pub fn is_hex(secret: &str) -> bool {
    !secret.is_empty()
        && secret.len() % 2 == 0
        && secret.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Decode a hex string, case-insensitively.
///
/// An odd-length input gets a single leading `'0'` before being split into pairs.
pub fn decode_hex(secret: &str) -> Result<Vec<u8>, SecretParseError> {
    if secret.len() % 2 == 1 {
        return Ok(hex::decode(format!("0{}", secret))?);
    }
    Ok(hex::decode(secret)?)
}

fn base32_value(c: char) -> Result<u8, SecretParseError> {
    match c {
        'A'..='Z' => Ok(c as u8 - b'A'),
        'a'..='z' => Ok(c as u8 - b'a'),
        '2'..='7' => Ok(c as u8 - b'2' + 26),
        _ => Err(SecretParseError::InvalidBase32Character(c)),
    }
}

/// Decode an RFC 4648 base32 string.
///
/// Whitespace anywhere and `=` padding at the end are ignored, lowercase letters are accepted.
/// Bits left over once the last full byte is out are dropped.
pub fn decode_base32(secret: &str) -> Result<Vec<u8>, SecretParseError> {
    let chars: Vec<char> = secret.chars().filter(|c| !c.is_whitespace()).collect();
    let end = chars.iter().rposition(|c| *c != '=').map_or(0, |i| i + 1);
    let chars = &chars[..end];

    let mut bytes = Vec::with_capacity(chars.len() * 5 / 8);
    let mut buffer: u16 = 0;
    let mut bits: u32 = 0;
    for &c in chars {
        buffer = (buffer << 5) | u16::from(base32_value(c)?);
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            bytes.push((buffer >> bits) as u8);
            buffer &= (1 << bits) - 1;
        }
    }
    Ok(bytes)
}

/// Turn a user supplied secret into key bytes.
///
/// Anything matching `^([0-9a-fA-F]{2})+$` is read as hex, everything else as base32.
///
/// # Errors
///
/// Will return [SecretParseError::InvalidBase32Character] when the secret is not hex and
/// contains something outside the base32 alphabet
pub fn decode_secret(secret: &str) -> Result<Vec<u8>, SecretParseError> {
    if is_hex(secret) {
        tracing::trace!(encoding = "hex", "decoding secret");
        decode_hex(secret)
    } else {
        tracing::trace!(encoding = "base32", "decoding secret");
        decode_base32(secret)
    }
}

/// Shared secret between the authenticator and us to generate codes from.
///
/// Equality is about the key: a `Raw` and an encoded secret are equal when they decode to the same bytes.
/// Secrets that don't decode are only equal to the same variant holding the same text.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "zeroize", derive(zeroize::Zeroize, zeroize::ZeroizeOnDrop))]
pub enum Secret {
    /// Non-encoded "raw" secret.
    Raw(Vec<u8>),
    /// Hex encoded secret.
    Hex(String),
    /// Base32 encoded secret, whitespace and padding allowed.
    Base32(String),
}

impl PartialEq for Secret {
    /// Will check that to_bytes() returns the same.
    /// One secret can be Raw, and the other encoded.
    fn eq(&self, other: &Self) -> bool {
        match (self.to_bytes(), other.to_bytes()) {
            (Ok(a), Ok(b)) => constant_time_eq(&a, &b),
            _ => match (self, other) {
                (Secret::Hex(a), Secret::Hex(b)) | (Secret::Base32(a), Secret::Base32(b)) => {
                    constant_time_eq(a.as_bytes(), b.as_bytes())
                }
                _ => false,
            },
        }
    }
}

impl FromStr for Secret {
    type Err = SecretParseError;

    /// Detect the encoding the same way [decode_secret](fn.decode_secret.html) does, and make sure it decodes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let secret = if is_hex(s) {
            Secret::Hex(s.to_string())
        } else {
            Secret::Base32(s.to_string())
        };
        secret.to_bytes()?;
        Ok(secret)
    }
}

impl Secret {
    /// Get the inner value as a Vec of bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SecretParseError> {
        match self {
            Secret::Raw(s) => Ok(s.to_vec()),
            Secret::Hex(s) => decode_hex(s),
            Secret::Base32(s) => decode_base32(s),
        }
    }

    /// Try to transform an encoded secret into a `Secret::Raw`
    pub fn to_raw(&self) -> Result<Self, SecretParseError> {
        match self {
            Secret::Raw(_) => Ok(self.clone()),
            _ => Ok(Secret::Raw(self.to_bytes()?)),
        }
    }

    /// Try to transform the secret into an unpadded `Secret::Base32`, the form authenticator apps expect.
    pub fn to_base32(&self) -> Result<Self, SecretParseError> {
        let bytes = self.to_bytes()?;
        Ok(Secret::Base32(base32::encode(
            Alphabet::Rfc4648 { padding: false },
            &bytes,
        )))
    }
}

impl std::fmt::Display for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Secret::Raw(bytes) => f.write_str(&hex::encode(bytes)),
            Secret::Hex(s) | Secret::Base32(s) => write!(f, "{}", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_base32, decode_hex, decode_secret, is_hex, Secret};
    use crate::SecretParseError;

    const BASE32: &str = "OBWGC2LOFVZXI4TJNZTS243FMNZGK5BNGEZDG";
    const BYTES: [u8; 23] = [
        0x70, 0x6c, 0x61, 0x69, 0x6e, 0x2d, 0x73, 0x74, 0x72, 0x69, 0x6e, 0x67, 0x2d, 0x73, 0x65,
        0x63, 0x72, 0x65, 0x74, 0x2d, 0x31, 0x32, 0x33,
    ];
    const BYTES_DISPLAY: &str = "706c61696e2d737472696e672d7365637265742d313233";

    #[test]
    fn hex_detection() {
        assert!(is_hex("00"));
        assert!(is_hex("aBcDeF09"));
        assert!(!is_hex(""));
        assert!(!is_hex("abc"));
        assert!(!is_hex("JBSWY3DP"));
        assert!(!is_hex("ab cd"));
    }

    #[test]
    fn hex_is_case_insensitive() {
        assert_eq!(decode_secret("DEADbeef").unwrap(), vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(decode_secret(BYTES_DISPLAY).unwrap(), BYTES.to_vec());
    }

    #[test]
    fn hex_odd_length_is_left_padded() {
        assert_eq!(decode_hex("abc").unwrap(), vec![0x0a, 0xbc]);
        assert_eq!(decode_hex("1").unwrap(), vec![0x01]);
    }

    #[test]
    fn hex_rejects_garbage() {
        assert!(matches!(
            decode_hex("zz"),
            Err(SecretParseError::InvalidHex(_))
        ));
    }

    #[test]
    fn base32_known_value() {
        assert_eq!(decode_secret(BASE32).unwrap(), BYTES.to_vec());
        assert_eq!(
            decode_secret("JBSWY3DPEHPK3PXP").unwrap(),
            vec![0x48, 0x65, 0x6c, 0x6c, 0x6f, 0x21, 0xde, 0xad, 0xbe, 0xef]
        );
    }

    #[test]
    fn base32_lowercase_whitespace_padding() {
        let expected = decode_secret(BASE32).unwrap();
        assert_eq!(decode_secret(&BASE32.to_lowercase()).unwrap(), expected);
        assert_eq!(
            decode_secret("OBWG C2LO FVZX I4TJ\tNZTS 243F\nMNZG K5BN GEZD G===").unwrap(),
            expected
        );
        assert_eq!(decode_secret("OBWGC2LOFVZXI4TJNZTS243FMNZGK5BNGEZDG=").unwrap(), expected);
    }

    #[test]
    fn base32_keeps_leading_zero_bytes() {
        assert_eq!(decode_base32("AAAAAAAA").unwrap(), vec![0; 5]);
        assert_eq!(decode_base32("AAAQEAYE").unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn base32_drops_incomplete_trailing_bits() {
        // "MY" carries 10 bits: one full byte plus two leftover bits.
        assert_eq!(decode_base32("MY").unwrap(), b"f".to_vec());
        assert_eq!(decode_base32("M").unwrap(), Vec::<u8>::new());
        assert_eq!(decode_base32("====").unwrap(), Vec::<u8>::new());
        assert_eq!(decode_base32("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn base32_rejects_invalid_characters() {
        assert_eq!(
            decode_secret("not-valid-!!"),
            Err(SecretParseError::InvalidBase32Character('-'))
        );
        assert_eq!(
            decode_base32("JBSW1"),
            Err(SecretParseError::InvalidBase32Character('1'))
        );
        assert_eq!(
            decode_base32("MY=A"),
            Err(SecretParseError::InvalidBase32Character('='))
        );
    }

    #[test]
    fn secret_display() {
        let secret_raw = Secret::Raw(BYTES.to_vec());
        let secret_base32 = Secret::Base32(BASE32.to_string());
        assert_eq!(secret_raw.to_string(), BYTES_DISPLAY.to_string());
        assert_eq!(secret_base32.to_string(), BASE32.to_string());
    }

    #[test]
    fn secret_convert() {
        let secret_raw = Secret::Raw(BYTES.to_vec());
        let secret_hex = Secret::Hex(BYTES_DISPLAY.to_uppercase());
        let secret_base32 = Secret::Base32(BASE32.to_string());

        assert_eq!(&secret_raw.to_base32().unwrap(), &secret_base32);
        assert_eq!(&secret_hex.to_raw().unwrap(), &secret_raw);
        assert_eq!(&secret_base32.to_raw().unwrap(), &secret_hex);
        assert!(matches!(secret_hex.to_raw().unwrap(), Secret::Raw(_)));
        assert_eq!(secret_raw.to_base32().unwrap().to_string(), BASE32);
    }

    #[test]
    fn secret_from_str() {
        let hex: Secret = BYTES_DISPLAY.parse().unwrap();
        let encoded: Secret = BASE32.parse().unwrap();
        assert!(matches!(hex, Secret::Hex(_)));
        assert!(matches!(encoded, Secret::Base32(_)));
        assert_eq!(hex, encoded);
        assert!("not-valid-!!".parse::<Secret>().is_err());
    }

    #[test]
    fn undecodable_secrets_compare_by_text() {
        let broken = Secret::Base32("!!".to_string());
        assert_eq!(broken, broken.clone());
        assert_ne!(broken, Secret::Base32("??".to_string()));
        assert_ne!(broken, Secret::Hex("!!".to_string()));
        assert_ne!(broken, Secret::Raw(Vec::new()));
        assert_ne!(Secret::Hex("zz".to_string()), Secret::Raw(Vec::new()));
    }
}
