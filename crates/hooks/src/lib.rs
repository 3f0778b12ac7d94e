//! Tag-keyed secret hooks for envscope
//!
//! This crate wires [`envscope_secrets`] into a behavior-driven test run:
//! - Hook definitions loaded from `envscope.toml`
//! - "Before" and "after" logic applied to each scenario's tags
//! - Helpers for the `cucumber` crate's extension points
//!
//! # Overview
//!
//! ```toml
//! [[hook]]
//! tag = "k9s"
//! source = "K9S_CIRCLECI_CLI_TOKEN"
//! target = "CIRCLECI_CLI_TOKEN"
//! ```
//!
//! With this configuration every scenario tagged `@k9s` sees
//! `CIRCLECI_CLI_TOKEN` for its duration when the CI secret is available, and
//! the variable is gone once the scenario finishes. Setting
//! `policy = "required"` skips the scenario instead when the secret is
//! missing.
//!
//! # Concurrency
//!
//! Hooks applied to the process environment assume one scenario at a time.
//! Runs that execute scenarios concurrently should give each scenario its own
//! [`envscope_secrets::MemoryEnv`].

pub mod config;
pub mod error;
pub mod logging;
pub mod runner;
pub mod tagged;

pub use config::{HookConfig, HooksConfig};
pub use error::{Error, Result};
pub use logging::{TracingConfig, init_tracing};
pub use runner::scenario_tags;
pub use tagged::{ActiveScopes, TaggedHooks};
