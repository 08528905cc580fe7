//! This library generates [rfc-6238](https://tools.ietf.org/html/rfc6238) TOTP codes from a shared secret typed in by a user,
//! either as hex or as base32, the way authenticator apps expect them.
//!
//! Codes are always computed with `HMAC-SHA1` over 30 seconds steps, which is what virtually every authenticator app
//! implements. Nothing here touches the network, a disk or any global state: every function is pure given its inputs,
//! save for the ones reading the system clock.
//!
//! # Examples
//!
//! ```rust
//! use totp_gen::{decode_secret, generate_code};
//!
//! let key = decode_secret("GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ").unwrap();
//! let code = generate_code(&key, Some(59), Some(8)).unwrap();
//! assert_eq!(code, "94287082");
//! ```
//!
//! ```rust
//! use totp_gen::TOTP;
//!
//! let totp = TOTP::from_secret_str(6, "JBSW Y3DP EHPK 3PXP").unwrap();
//! let token = totp.generate_current().unwrap();
//! println!("{} (valid for {}s)", token, totp.ttl().unwrap());
//! ```

mod error;
mod provider;
mod secret;

pub use error::{ProviderError, SecretParseError, TotpError};
pub use provider::{code_for_account, MemoryProvider, SecretProvider};
pub use secret::{decode_base32, decode_hex, decode_secret, is_hex, Secret};

use constant_time_eq::constant_time_eq;

#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};

use core::fmt;

use hmac::Mac;
use std::time::{SystemTime, SystemTimeError, UNIX_EPOCH};

type HmacSha1 = hmac::Hmac<sha1::Sha1>;

/// Duration in seconds of a step, per [rfc-6238](https://tools.ietf.org/html/rfc6238#section-5.2)
pub const STEP: u64 = 30;
/// Number of digits used when the caller doesn't ask for anything else
pub const DEFAULT_DIGITS: usize = 6;
/// Per [rfc-4226](https://tools.ietf.org/html/rfc4226#section-5.3), implementations MUST extract a 6-digit code at a minimum
pub const MIN_DIGITS: usize = 6;
/// The truncated value is 31 bits wide, so anything above 10 digits would only add leading zeroes
pub const MAX_DIGITS: usize = 10;

fn assert_digits(digits: usize) -> Result<(), TotpError> {
    if !(MIN_DIGITS..=MAX_DIGITS).contains(&digits) {
        Err(TotpError::InvalidDigits(digits))
    } else {
        Ok(())
    }
}

fn system_time() -> Result<u64, SystemTimeError> {
    let t = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
    Ok(t)
}

/// Index of the step `time` falls in
pub fn counter(time: u64) -> u64 {
    time / STEP
}

fn sign(key: &[u8], counter: u64) -> Result<Vec<u8>, TotpError> {
    let mut mac = HmacSha1::new_from_slice(key).map_err(TotpError::Key)?;
    mac.update(&counter.to_be_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Dynamic truncation from [rfc-4226](https://tools.ietf.org/html/rfc4226#section-5.3).
fn truncate(mac: &[u8]) -> u32 {
    let offset = (mac[mac.len() - 1] & 0x0f) as usize;
    let bytes = [mac[offset], mac[offset + 1], mac[offset + 2], mac[offset + 3]];
    u32::from_be_bytes(bytes) & 0x7fff_ffff
}

/// [rfc-4226](https://tools.ietf.org/html/rfc4226) HOTP value for `counter`, zero-padded to `digits` characters
///
/// # Errors
///
/// Will return [TotpError::InvalidDigits] when `digits` is outside of [MIN_DIGITS]..=[MAX_DIGITS]
pub fn hotp(key: &[u8], counter: u64, digits: usize) -> Result<String, TotpError> {
    assert_digits(digits)?;
    Ok(format_code(truncate(&sign(key, counter)?), digits))
}

/// Last `digits` decimal digits of `value`, left-padded with zeroes
fn format_code(value: u32, digits: usize) -> String {
    format!(
        "{1:00$}",
        digits,
        u64::from(value) % 10_u64.pow(digits as u32)
    )
}

/// Generate the code for `key` at `time` seconds since the epoch.
///
/// `time` defaults to the current system time and `digits` to [DEFAULT_DIGITS].
///
/// # Errors
///
/// Will return an error when `digits` is out of range, or when the system clock is before the epoch
pub fn generate_code(
    key: &[u8],
    time: Option<u64>,
    digits: Option<usize>,
) -> Result<String, TotpError> {
    let digits = digits.unwrap_or(DEFAULT_DIGITS);
    let time = match time {
        Some(t) => t,
        None => system_time()?,
    };
    TOTP::new(digits, key)?.generate(time)
}

/// TOTP holds informations as to how to generate an auth code. Its [secret](struct.TOTP.html#structfield.secret) field is sensitive data, treat it accordingly
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub struct TOTP<T = Vec<u8>> {
    /// The number of digits composing the auth code, between [MIN_DIGITS] and [MAX_DIGITS]
    pub digits: usize,
    /// As per [rfc-4226](https://tools.ietf.org/html/rfc4226#section-4) the secret should come from a strong source, most likely a CSPRNG. It should be at least 128 bits, but 160 are recommended
    ///
    /// non-encoded value
    pub secret: T,
}

impl<T: AsRef<[u8]>> PartialEq for TOTP<T> {
    fn eq(&self, other: &Self) -> bool {
        if self.digits != other.digits {
            return false;
        }
        constant_time_eq(self.secret.as_ref(), other.secret.as_ref())
    }
}

impl<T> fmt::Display for TOTP<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "digits: {}; step: {}; alg: SHA1", self.digits, STEP)
    }
}

impl TOTP {
    /// Will create a new instance of TOTP from a hex or base32 secret, as typed in by a user
    ///
    /// ```rust
    /// use totp_gen::TOTP;
    /// let totp = TOTP::from_secret_str(8, "3132333435363738393031323334353637383930").unwrap();
    /// assert_eq!(totp.generate(1111111109).unwrap(), "07081804");
    /// ```
    ///
    /// # Errors
    ///
    /// Will return an error when the secret can't be decoded or `digits` is out of range
    pub fn from_secret_str(digits: usize, secret: &str) -> Result<TOTP, TotpError> {
        TOTP::new(digits, decode_secret(secret)?)
    }
}

impl<T: AsRef<[u8]>> TOTP<T> {
    /// Will create a new instance of TOTP with given parameters.
    ///
    /// # Description
    /// * `secret`: expect a non-encoded value, to pass in an encoded string use [decode_secret](fn.decode_secret.html)
    /// * `digits`: MUST be between 6 & 10
    ///
    /// # Errors
    ///
    /// Will return [TotpError::InvalidDigits] when `digits` is out of range
    pub fn new(digits: usize, secret: T) -> Result<TOTP<T>, TotpError> {
        assert_digits(digits)?;
        Ok(TOTP { digits, secret })
    }

    /// Will sign the step containing the given timestamp
    pub fn sign(&self, time: u64) -> Result<Vec<u8>, TotpError> {
        sign(self.secret.as_ref(), counter(time))
    }

    /// Will generate a token given the provided timestamp in seconds
    pub fn generate(&self, time: u64) -> Result<String, TotpError> {
        tracing::debug!(counter = counter(time), digits = self.digits, "generating code");
        hotp(self.secret.as_ref(), counter(time), self.digits)
    }

    /// Generate a token from the current system time
    pub fn generate_current(&self) -> Result<String, TotpError> {
        let t = system_time()?;
        self.generate(t)
    }

    /// Returns the timestamp of the first second for the next step
    /// given the provided timestamp in seconds, or `None` when it doesn't fit in a `u64`
    pub fn next_step(&self, time: u64) -> Option<u64> {
        (counter(time) + 1).checked_mul(STEP)
    }

    /// Returns the timestamp of the first second of the next step
    /// According to system time
    pub fn next_step_current(&self) -> Result<Option<u64>, SystemTimeError> {
        let t = system_time()?;
        Ok(self.next_step(t))
    }

    /// Give the ttl (in seconds) of the current token
    pub fn ttl(&self) -> Result<u64, SystemTimeError> {
        let t = system_time()?;
        Ok(STEP - (t % STEP))
    }

    /// Will check if token is the one for the step containing `time`. No neighbouring step is accepted
    ///
    /// # Errors
    ///
    /// Will return [TotpError::InvalidDigits] when `digits` was changed to something out of range
    pub fn check(&self, token: &str, time: u64) -> Result<bool, TotpError> {
        let code = self.generate(time)?;
        Ok(constant_time_eq(code.as_bytes(), token.as_bytes()))
    }

    /// Will check if token is the one for the current step
    pub fn check_current(&self, token: &str) -> Result<bool, TotpError> {
        let t = system_time()?;
        self.check(token, t)
    }

    /// Will return the base32 representation of the secret, which might be useful when users want to manually add the secret to their authenticator
    pub fn get_secret_base32(&self) -> String {
        base32::encode(
            base32::Alphabet::Rfc4648 { padding: false },
            self.secret.as_ref(),
        )
    }
}
