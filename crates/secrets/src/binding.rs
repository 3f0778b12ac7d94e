//! Secret binding definitions

use crate::SecretError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What to do when the source secret is absent or empty
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Policy {
    /// Skip the injection and let the unit run without the secret
    #[default]
    Optional,
    /// Skip the whole unit of work
    Required,
}

impl Policy {
    /// Lower-case name as used in configuration files
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Optional => "optional",
            Self::Required => "required",
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Policy {
    type Err = SecretError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "optional" => Ok(Self::Optional),
            "required" => Ok(Self::Required),
            _ => Err(SecretError::InvalidPolicy {
                policy: s.to_string(),
            }),
        }
    }
}

/// A secret to copy from one environment variable into another.
///
/// The binding only names variables; the value itself is read when a scope
/// is entered and never stored here.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SecretBinding {
    source: String,
    target: String,
    policy: Policy,
}

impl SecretBinding {
    /// Create a validated binding.
    ///
    /// # Errors
    ///
    /// Returns [`SecretError::InvalidBinding`] when either name is empty,
    /// contains `=` or a NUL byte, or when source and target are the same
    /// variable (leaving the scope would delete the source).
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        policy: Policy,
    ) -> Result<Self, SecretError> {
        let source = source.into();
        let target = target.into();

        let reject = |reason: &str| SecretError::InvalidBinding {
            source_name: source.clone(),
            target_name: target.clone(),
            reason: reason.to_string(),
        };

        if let Some(reason) = invalid_name(&source) {
            return Err(reject(&format!("source {reason}")));
        }
        if let Some(reason) = invalid_name(&target) {
            return Err(reject(&format!("target {reason}")));
        }
        if source == target {
            return Err(reject("source and target are the same variable"));
        }

        Ok(Self {
            source,
            target,
            policy,
        })
    }

    /// Shorthand for an [`Policy::Optional`] binding
    ///
    /// # Errors
    ///
    /// See [`SecretBinding::new`].
    pub fn optional(
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Result<Self, SecretError> {
        Self::new(source, target, Policy::Optional)
    }

    /// Shorthand for a [`Policy::Required`] binding
    ///
    /// # Errors
    ///
    /// See [`SecretBinding::new`].
    pub fn required(
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Result<Self, SecretError> {
        Self::new(source, target, Policy::Required)
    }

    /// Variable the secret is read from
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Variable the secret is exposed as
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Policy applied when the source is absent or empty
    #[must_use]
    pub const fn policy(&self) -> Policy {
        self.policy
    }
}

fn invalid_name(name: &str) -> Option<&'static str> {
    if name.is_empty() {
        Some("name is empty")
    } else if name.contains('=') {
        Some("name contains '='")
    } else if name.contains('\0') {
        Some("name contains a NUL byte")
    } else {
        None
    }
}
