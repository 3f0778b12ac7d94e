//! Key-value environments a secret can be read from and written to
//!
//! [`ProcessEnv`] binds to the real process environment. [`MemoryEnv`] keeps
//! its own map so tests and concurrently running scenarios stay isolated.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A mutable key-value environment.
///
/// Methods take `&self` so a single store can back several scopes.
/// Implementations must treat removal of an absent key as a no-op.
pub trait EnvStore {
    /// Read a value; `None` when the key is absent.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str);

    /// Remove a key entirely.
    fn remove(&self, key: &str);

    /// Whether the key is present, regardless of its value.
    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

impl<S: EnvStore + ?Sized> EnvStore for &S {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) {
        (**self).set(key, value);
    }

    fn remove(&self, key: &str) {
        (**self).remove(key);
    }
}

/// The process environment.
///
/// The process environment is shared by every thread. Only one scope may be
/// active for a given target variable at a time; concurrent units need their
/// own [`MemoryEnv`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl ProcessEnv {
    /// Create a handle to the process environment
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl EnvStore for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        // Non-unicode values are treated as absent
        std::env::var(key).ok()
    }

    #[allow(unsafe_code)]
    fn set(&self, key: &str, value: &str) {
        // SAFETY: callers run one scope per target at a time; bindings reject
        // keys containing '=' or NUL before they reach this point.
        unsafe {
            std::env::set_var(key, value);
        }
    }

    #[allow(unsafe_code)]
    fn remove(&self, key: &str) {
        // SAFETY: see `set`
        unsafe {
            std::env::remove_var(key);
        }
    }
}

/// An isolated in-memory environment.
#[derive(Default)]
pub struct MemoryEnv {
    vars: Mutex<BTreeMap<String, String>>,
}

impl MemoryEnv {
    /// Create an empty environment
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an environment seeded with the given variables
    #[must_use]
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let vars = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            vars: Mutex::new(vars),
        }
    }

    /// Copy of every variable currently set.
    ///
    /// Intended for test assertions; the copy includes injected secrets.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.lock().clone()
    }

    /// Number of variables currently set
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no variables are set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        // A panicking unit must not block the cleanup that follows it
        self.vars.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl EnvStore for MemoryEnv {
    fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.lock().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.lock().remove(key);
    }
}

impl std::fmt::Debug for MemoryEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Keys only: values may be secrets
        let keys: Vec<String> = self.lock().keys().cloned().collect();
        f.debug_struct("MemoryEnv").field("keys", &keys).finish()
    }
}
