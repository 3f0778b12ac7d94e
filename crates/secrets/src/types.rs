//! Secure secret value with automatic memory zeroing
//!
//! [`SecureSecret`] wraps `secrecy::SecretString` so a secret read from the
//! environment is zeroed when dropped and never shows up in debug output.

use secrecy::{ExposeSecret, SecretString};

/// A secret value read from an environment, zeroed on drop.
///
/// - Debug and Display print `[REDACTED]`
/// - The value is only reachable through [`expose`](Self::expose)
#[derive(Clone)]
pub struct SecureSecret {
    inner: SecretString,
}

impl SecureSecret {
    /// Move a string into secure storage.
    #[must_use]
    pub fn new(value: String) -> Self {
        Self {
            inner: SecretString::from(value),
        }
    }

    /// Expose the secret value.
    ///
    /// Callers must not log, print or persist the returned string; it is
    /// meant only for writing into the target environment slot.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.inner.expose_secret()
    }

    /// Length of the value without exposing it.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.expose_secret().len()
    }

    /// Whether the value is the empty string.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.expose_secret().is_empty()
    }
}

impl std::fmt::Debug for SecureSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl std::fmt::Display for SecureSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}
