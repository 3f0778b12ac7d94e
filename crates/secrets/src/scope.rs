//! Scoped injection of a single secret
//!
//! A [`SecretScope`] copies a secret from its source variable into its target
//! variable for the duration of one unit of work and removes the target
//! afterwards. Missing secrets are either tolerated or turned into a [`Skip`]
//! depending on the binding's [`Policy`].

use crate::redaction;
use crate::{EnvStore, Policy, SecretBinding, SecureSecret};
use std::fmt;

/// Instruction to skip a unit of work instead of running it.
///
/// Not an error: the unit is bypassed, not failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skip {
    reason: String,
}

impl Skip {
    /// Create a skip signal with a human-readable reason
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// Why the unit should be skipped
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl fmt::Display for Skip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

/// Outcome of a successful [`SecretScope::enter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Injection {
    /// The secret was written to the target variable
    Injected,
    /// The source was absent or empty and the binding is optional; nothing
    /// was written
    NotAvailable,
}

/// Manages the lifecycle of secrets bound to one environment.
pub struct SecretScope<'a, S: EnvStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: EnvStore + ?Sized> SecretScope<'a, S> {
    /// Create a scope manager over `store`
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Check whether entering `binding` would skip, without writing anything.
    ///
    /// # Errors
    ///
    /// Returns a [`Skip`] when the binding is required and its source is
    /// absent or empty.
    pub fn check(&self, binding: &SecretBinding) -> Result<(), Skip> {
        self.acquire(binding).map(|_| ())
    }

    /// Expose the binding's secret under its target name.
    ///
    /// # Errors
    ///
    /// Returns a [`Skip`] when the binding is required and its source is
    /// absent or empty. The store is left untouched in that case.
    pub fn enter(&self, binding: &SecretBinding) -> Result<Injection, Skip> {
        let Some(secret) = self.acquire(binding)? else {
            return Ok(Injection::NotAvailable);
        };

        if self.store.contains(binding.target()) {
            tracing::warn!(
                target_var = binding.target(),
                "Target variable already set; it will be replaced and then removed"
            );
        }

        redaction::register_secret(secret.expose());
        self.store.set(binding.target(), secret.expose());

        tracing::debug!(
            source_var = binding.source(),
            target_var = binding.target(),
            "Injected scoped secret"
        );
        Ok(Injection::Injected)
    }

    /// Remove `target` from the store. Removing an absent key is a no-op.
    pub fn leave(&self, target: &str) {
        self.store.remove(target);
        tracing::debug!(target_var = target, "Removed scoped secret");
    }

    /// Enter `binding` and return a guard that leaves it on drop.
    ///
    /// The guard removes the target even when the unit panics, and even when
    /// nothing was injected.
    ///
    /// # Errors
    ///
    /// Same as [`enter`](Self::enter); no guard is created for a skip.
    pub fn guard(&self, binding: &SecretBinding) -> Result<ScopeGuard<'a, S>, Skip> {
        let injection = self.enter(binding)?;
        Ok(ScopeGuard {
            store: self.store,
            target: binding.target().to_string(),
            injection,
        })
    }

    /// Run `unit` with `binding` in scope.
    ///
    /// # Errors
    ///
    /// Returns a [`Skip`] without calling `unit` when the binding is required
    /// and its source is absent or empty.
    pub fn run<R>(&self, binding: &SecretBinding, unit: impl FnOnce() -> R) -> Result<R, Skip> {
        let guard = self.guard(binding)?;
        let out = unit();
        guard.close();
        Ok(out)
    }

    fn acquire(&self, binding: &SecretBinding) -> Result<Option<SecureSecret>, Skip> {
        let found = self.store.get(binding.source()).map(SecureSecret::new);
        let state = match found {
            Some(secret) if !secret.is_empty() => return Ok(Some(secret)),
            Some(_) => "is not set (empty value)",
            None => "is not set",
        };

        match binding.policy() {
            Policy::Optional => {
                tracing::debug!(
                    source_var = binding.source(),
                    target_var = binding.target(),
                    "Optional secret {state}; skipping injection"
                );
                Ok(None)
            }
            Policy::Required => {
                tracing::info!(
                    source_var = binding.source(),
                    "Required secret {state}; skipping unit"
                );
                Err(Skip::new(format!("{} {state}", binding.source())))
            }
        }
    }
}

impl<S: EnvStore + ?Sized> fmt::Debug for SecretScope<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretScope").finish_non_exhaustive()
    }
}

/// Removes a scoped secret's target variable when dropped.
#[must_use = "dropping the guard immediately removes the injected secret"]
pub struct ScopeGuard<'a, S: EnvStore + ?Sized> {
    store: &'a S,
    target: String,
    injection: Injection,
}

impl<S: EnvStore + ?Sized> ScopeGuard<'_, S> {
    /// Target variable removed by this guard
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// What happened when the scope was entered
    pub const fn injection(&self) -> Injection {
        self.injection
    }

    /// Whether the secret was written on entry
    #[must_use]
    pub fn is_injected(&self) -> bool {
        self.injection == Injection::Injected
    }

    /// Leave the scope now rather than at the end of the enclosing block
    pub fn close(self) {
        drop(self);
    }
}

impl<S: EnvStore + ?Sized> Drop for ScopeGuard<'_, S> {
    fn drop(&mut self) {
        SecretScope::new(self.store).leave(&self.target);
    }
}

impl<S: EnvStore + ?Sized> fmt::Debug for ScopeGuard<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeGuard")
            .field("target", &self.target)
            .field("injection", &self.injection)
            .finish_non_exhaustive()
    }
}
