//! Process-wide redaction of injected secrets.
//!
//! Every value a [`SecretScope`](crate::SecretScope) injects is registered
//! here first, so test binaries can scrub captured output and log lines with
//! [`redact`] before printing them.
//!
//! Values stay registered after their scope closes, because output captured
//! while the scope was open is often printed later. They are held as
//! [`SecretString`]s, so the copy is zeroed when [`unregister_secret`] drops
//! it.

use secrecy::{ExposeSecret, SecretString};
use std::sync::{LazyLock, PoisonError, RwLock};

/// Minimum secret length to redact (shorter values cause false positives)
pub const MIN_SECRET_LENGTH: usize = 4;

/// Placeholder for redacted secrets
pub const REDACTED_PLACEHOLDER: &str = "*_*";

static SECRET_REGISTRY: LazyLock<RwLock<Vec<SecretString>>> =
    LazyLock::new(|| RwLock::new(Vec::new()));

/// Register a secret value for redaction.
///
/// Values shorter than [`MIN_SECRET_LENGTH`] are ignored.
///
/// ```
/// use envscope_secrets::redaction::{redact, register_secret};
///
/// register_secret("doc-example-token-1234");
/// assert_eq!(redact("token=doc-example-token-1234"), "token=*_*");
/// ```
pub fn register_secret(secret: impl Into<String>) {
    let secret = SecretString::from(secret.into());
    if secret.expose_secret().len() < MIN_SECRET_LENGTH {
        return;
    }
    let mut registry = SECRET_REGISTRY
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    if !registry
        .iter()
        .any(|s| s.expose_secret() == secret.expose_secret())
    {
        registry.push(secret);
    }
}

/// Stop redacting `secret` and zero the registered copy.
///
/// Returns `true` if the value was registered.
pub fn unregister_secret(secret: &str) -> bool {
    let mut registry = SECRET_REGISTRY
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    let before = registry.len();
    registry.retain(|s| s.expose_secret() != secret);
    registry.len() != before
}

/// Replace every registered secret in `input` with [`REDACTED_PLACEHOLDER`].
///
/// Longer secrets are replaced first so overlapping values are fully hidden.
#[must_use]
pub fn redact(input: &str) -> String {
    let registry = SECRET_REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner);
    if registry.is_empty() {
        return input.to_string();
    }

    let mut sorted: Vec<&str> = registry.iter().map(|s| s.expose_secret()).collect();
    sorted.sort_by_key(|s| std::cmp::Reverse(s.len()));

    let mut result = input.to_string();
    for secret in sorted {
        result = result.replace(secret, REDACTED_PLACEHOLDER);
    }
    result
}

/// Number of registered secrets
#[must_use]
pub fn secret_count() -> usize {
    SECRET_REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .len()
}

#[cfg(test)]
mod tests {
    use super::*;

    // The registry is global and other tests register values concurrently,
    // so each test uses values nobody else registers.

    #[test]
    fn test_simple_redaction() {
        register_secret("redaction-simple-1234");
        let result = redact("The token is redaction-simple-1234, don't share it");
        assert_eq!(result, "The token is *_*, don't share it");
    }

    #[test]
    fn test_short_secret_ignored() {
        register_secret("zq9");
        assert_eq!(redact("value zq9 stays"), "value zq9 stays");
    }

    #[test]
    fn test_overlapping_secrets_longest_first() {
        register_secret("overlap-abcd");
        register_secret("overlap-abcd-efgh");
        let result = redact("x overlap-abcd-efgh y overlap-abcd z");
        assert_eq!(result, "x *_* y *_* z");
    }

    #[test]
    fn test_unregister_stops_redaction() {
        register_secret("redaction-unregister-4321");
        assert_eq!(redact("t=redaction-unregister-4321"), "t=*_*");

        assert!(unregister_secret("redaction-unregister-4321"));
        assert_eq!(redact("t=redaction-unregister-4321"), "t=redaction-unregister-4321");
        assert!(!unregister_secret("redaction-unregister-4321"));
    }

    #[test]
    fn test_register_twice_keeps_one_copy() {
        register_secret("redaction-dedup-5555");
        register_secret("redaction-dedup-5555".to_string());
        let registry = SECRET_REGISTRY.read().unwrap();
        let copies = registry
            .iter()
            .filter(|s| s.expose_secret() == "redaction-dedup-5555")
            .count();
        assert_eq!(copies, 1);
    }

    #[test]
    fn test_count_includes_registered() {
        register_secret("redaction-count-98765");
        assert!(secret_count() >= 1);
    }
}
