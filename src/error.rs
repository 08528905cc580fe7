use std::time::SystemTimeError;

use thiserror::Error;

/// Different ways secret parsing failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SecretParseError {
    /// A character outside of `A-Z`, `a-z` and `2-7` was found once whitespace and trailing padding were removed.
    #[error("cannot decode secret: invalid base32 character {0:?}")]
    InvalidBase32Character(char),
    /// Hex decoding was forced on something that isn't hex.
    #[error("cannot decode secret: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

/// Errors raised while generating a code.
#[derive(Debug, Error)]
pub enum TotpError {
    /// Codes are between [MIN_DIGITS](constant.MIN_DIGITS.html) and [MAX_DIGITS](constant.MAX_DIGITS.html) long
    #[error(
        "codes must be between {min} and {max} digits long, {0} is not allowed",
        min = crate::MIN_DIGITS,
        max = crate::MAX_DIGITS
    )]
    InvalidDigits(usize),
    #[error(transparent)]
    Secret(#[from] SecretParseError),
    #[error("HMAC rejected the key: {0}")]
    Key(hmac::digest::InvalidLength),
    #[error("system clock is set before the unix epoch: {0}")]
    SystemTime(#[from] SystemTimeError),
}

/// Errors raised by a [SecretProvider](trait.SecretProvider.html).
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("no secret stored for account \"{0}\"")]
    UnknownAccount(String),
    #[error("a secret is already stored for account \"{0}\"")]
    AccountExists(String),
    #[error("account name can't be empty")]
    EmptyAccount,
    #[error(transparent)]
    Secret(#[from] SecretParseError),
    #[error(transparent)]
    Totp(#[from] TotpError),
}
