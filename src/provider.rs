//! Where secrets come from.
//!
//! Storage is left to the caller: anything able to look a secret up by account name, store a new one
//! and list what it knows can implement [SecretProvider]. [MemoryProvider] keeps everything in memory.
//!
//! ```
//! use totp_gen::{code_for_account, MemoryProvider, SecretProvider};
//!
//! let mut provider = MemoryProvider::default();
//! provider.create("github", "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ").unwrap();
//!
//! assert_eq!(provider.accounts(), vec!["github".to_string()]);
//! assert_eq!(code_for_account(&provider, "github", Some(59), Some(8)).unwrap(), "94287082");
//! ```

use std::collections::BTreeMap;

use crate::{decode_secret, generate_code, ProviderError};

/// Storage for the secrets of named accounts.
pub trait SecretProvider {
    /// Secret text stored for `account`, if any.
    fn lookup(&self, account: &str) -> Result<Option<String>, ProviderError>;

    /// Store `secret` for a new `account`.
    fn create(&mut self, account: &str, secret: &str) -> Result<(), ProviderError>;

    /// Names of every account with a stored secret.
    fn accounts(&self) -> Vec<String>;
}

/// In-memory [SecretProvider], accounts are listed in lexicographic order.
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    secrets: BTreeMap<String, String>,
}

impl MemoryProvider {
    /// Create a provider holding no secret
    pub fn new() -> Self {
        Self::default()
    }
}

impl SecretProvider for MemoryProvider {
    fn lookup(&self, account: &str) -> Result<Option<String>, ProviderError> {
        tracing::trace!(account, "looking up secret");
        Ok(self.secrets.get(account).cloned())
    }

    /// # Errors
    ///
    /// Will return an error when `account` is empty or already known, or when `secret` doesn't decode
    fn create(&mut self, account: &str, secret: &str) -> Result<(), ProviderError> {
        if account.is_empty() {
            return Err(ProviderError::EmptyAccount);
        }
        if self.secrets.contains_key(account) {
            return Err(ProviderError::AccountExists(account.to_string()));
        }
        decode_secret(secret)?;
        self.secrets.insert(account.to_string(), secret.to_string());
        tracing::debug!(account, "stored new secret");
        Ok(())
    }

    fn accounts(&self) -> Vec<String> {
        self.secrets.keys().cloned().collect()
    }
}

/// Generate the code of `account` using the secret `provider` holds for it.
///
/// `time` and `digits` default the same way they do for [generate_code](fn.generate_code.html).
///
/// # Errors
///
/// Will return [ProviderError::UnknownAccount] when there is no secret for `account`
pub fn code_for_account<P: SecretProvider + ?Sized>(
    provider: &P,
    account: &str,
    time: Option<u64>,
    digits: Option<usize>,
) -> Result<String, ProviderError> {
    let secret = provider
        .lookup(account)?
        .ok_or_else(|| ProviderError::UnknownAccount(account.to_string()))?;
    let key = decode_secret(&secret)?;
    Ok(generate_code(&key, time, digits)?)
}
