//! Hook configuration loaded from `envscope.toml`
//!
//! ```toml
//! [[hook]]
//! tag = "k9s"
//! source = "K9S_CIRCLECI_CLI_TOKEN"
//! target = "CIRCLECI_CLI_TOKEN"
//! policy = "optional"
//! ```

use crate::{Error, Result};
use envscope_secrets::{Policy, SecretBinding};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Default configuration file name looked up by [`HooksConfig::discover`]
pub const CONFIG_FILE_NAME: &str = "envscope.toml";

/// Environment variable overriding the configuration file path
pub const CONFIG_PATH_ENV: &str = "ENVSCOPE_CONFIG";

/// One `[[hook]]` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HookConfig {
    /// Scenario tag the hook applies to, with or without a leading `@`
    pub tag: String,
    /// Variable the secret is read from
    pub source: String,
    /// Variable the secret is exposed as during the scenario
    pub target: String,
    /// What to do when the source is absent or empty
    #[serde(default)]
    pub policy: Policy,
}

/// The full hook configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HooksConfig {
    /// Hooks in declaration order
    #[serde(default, rename = "hook")]
    pub hooks: Vec<HookConfig>,
}

impl HooksConfig {
    /// Parse a configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] for malformed TOML or unknown keys.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        toml::from_str(input).map_err(|e| Error::parse(e.message().to_string(), None))
    }

    /// Load a configuration file
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when the file cannot be read and
    /// [`Error::Parse`] when it is not a valid configuration.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::io(e, Some(path.to_path_buf()), "reading hook configuration")
        })?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::parse(e.message().to_string(), Some(path.to_path_buf())))?;

        tracing::debug!(
            path = %path.display(),
            hooks = config.hooks.len(),
            "Loaded hook configuration"
        );
        Ok(config)
    }

    /// Find and load the configuration for `dir`.
    ///
    /// Uses the file named by `ENVSCOPE_CONFIG` when set (it must exist),
    /// otherwise `<dir>/envscope.toml`. A missing default file yields an
    /// empty configuration.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load).
    pub fn discover(dir: &Path) -> Result<Self> {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
            return Self::load(&PathBuf::from(path));
        }

        let path = dir.join(CONFIG_FILE_NAME);
        if path.is_file() {
            Self::load(&path)
        } else {
            tracing::debug!(dir = %dir.display(), "No hook configuration found");
            Ok(Self::default())
        }
    }

    /// Validate every entry into a `(tag, binding)` pair.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] for an empty tag or two hooks under
    /// one tag writing the same target, and [`Error::Secret`] for entries
    /// that do not form a valid [`SecretBinding`].
    pub fn into_bindings(self) -> Result<Vec<(String, SecretBinding)>> {
        let mut seen = HashSet::new();
        let mut bindings = Vec::with_capacity(self.hooks.len());

        for hook in self.hooks {
            let tag = normalize_tag(&hook.tag);
            if tag.is_empty() {
                return Err(Error::configuration(format!(
                    "hook for '{}' has an empty tag",
                    hook.target
                )));
            }
            if !seen.insert((tag.clone(), hook.target.clone())) {
                return Err(Error::configuration(format!(
                    "tag '@{tag}' binds '{}' more than once",
                    hook.target
                )));
            }

            let binding = SecretBinding::new(hook.source, hook.target, hook.policy)
                .map_err(|e| Error::secret(tag.clone(), e))?;
            bindings.push((tag, binding));
        }

        Ok(bindings)
    }
}

/// Strip surrounding whitespace and a leading `@` from a tag
#[must_use]
pub fn normalize_tag(tag: &str) -> String {
    let tag = tag.trim();
    tag.strip_prefix('@').unwrap_or(tag).to_string()
}
