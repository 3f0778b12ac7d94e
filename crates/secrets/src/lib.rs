//! Scoped secret injection for envscope
//!
//! Exposes a credential held in one environment variable to a bounded unit of
//! work under another name, and guarantees the exposed copy is removed when
//! the unit ends.
//!
//! # Usage
//!
//! ```
//! use envscope_secrets::{EnvStore, MemoryEnv, Policy, SecretBinding, SecretScope};
//!
//! let store = MemoryEnv::from_pairs([("K9S_CIRCLECI_CLI_TOKEN", "abc123")]);
//! let binding =
//!     SecretBinding::new("K9S_CIRCLECI_CLI_TOKEN", "CIRCLECI_CLI_TOKEN", Policy::Required)?;
//!
//! let scope = SecretScope::new(&store);
//! let seen = scope
//!     .run(&binding, || store.get("CIRCLECI_CLI_TOKEN"))
//!     .map_err(|skip| skip.to_string());
//!
//! assert_eq!(seen, Ok(Some("abc123".to_string())));
//! assert_eq!(store.get("CIRCLECI_CLI_TOKEN"), None);
//! # Ok::<(), envscope_secrets::SecretError>(())
//! ```
//!
//! A missing secret under [`Policy::Optional`] is a silent no-op. Under
//! [`Policy::Required`] it yields a [`Skip`] and the unit is never run.

mod binding;
pub mod redaction;
mod scope;
mod store;
mod types;

pub use binding::{Policy, SecretBinding};
pub use scope::{Injection, ScopeGuard, SecretScope, Skip};
pub use store::{EnvStore, MemoryEnv, ProcessEnv};
pub use types::SecureSecret;

use thiserror::Error;

/// Error types for secret bindings
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SecretError {
    /// Binding cannot be applied to an environment
    #[error("Invalid secret binding '{source_name}' -> '{target_name}': {reason}")]
    InvalidBinding {
        /// Variable the secret is read from
        source_name: String,
        /// Variable the secret is exposed as
        target_name: String,
        /// Why the binding was rejected
        reason: String,
    },

    /// Unknown injection policy name
    #[error("Unknown secret policy '{policy}' (expected 'optional' or 'required')")]
    InvalidPolicy {
        /// The policy string that failed to parse
        policy: String,
    },
}
