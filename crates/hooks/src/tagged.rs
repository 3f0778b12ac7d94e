//! Before/after hook logic keyed by scenario tag

use crate::config::{HooksConfig, normalize_tag};
use crate::Result;
use envscope_secrets::{EnvStore, Injection, SecretBinding, SecretScope, Skip};

/// Secret bindings registered against scenario tags.
///
/// The test framework calls [`before`](Self::before) and
/// [`after`](Self::after) with the effective tags of each scenario; only
/// bindings registered under one of those tags are applied.
#[derive(Debug, Clone, Default)]
pub struct TaggedHooks {
    hooks: Vec<(String, SecretBinding)>,
}

impl TaggedHooks {
    /// Create an empty hook set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build hooks from a loaded configuration
    ///
    /// # Errors
    ///
    /// See [`HooksConfig::into_bindings`].
    pub fn from_config(config: HooksConfig) -> Result<Self> {
        Ok(Self {
            hooks: config.into_bindings()?,
        })
    }

    /// Register `binding` for scenarios tagged `tag` (leading `@` optional)
    pub fn register(&mut self, tag: &str, binding: SecretBinding) -> &mut Self {
        self.hooks.push((normalize_tag(tag), binding));
        self
    }

    /// Number of registered hooks
    #[must_use]
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Whether no hooks are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Bindings that apply to a scenario with `tags`, in registration order.
    ///
    /// A binding registered under several matching tags is returned once.
    #[must_use]
    pub fn bindings_for<'t>(&self, tags: impl IntoIterator<Item = &'t str>) -> Vec<&SecretBinding> {
        let tags: Vec<String> = tags.into_iter().map(normalize_tag).collect();
        let mut matched: Vec<&SecretBinding> = Vec::new();
        for (tag, binding) in &self.hooks {
            if tags.contains(tag) && !matched.contains(&binding) {
                matched.push(binding);
            }
        }
        matched
    }

    /// Check every matching binding without writing anything.
    ///
    /// # Errors
    ///
    /// Returns the first [`Skip`] produced by a required binding whose
    /// source is absent or empty.
    pub fn preflight<'t, S: EnvStore + ?Sized>(
        &self,
        store: &S,
        tags: impl IntoIterator<Item = &'t str>,
    ) -> std::result::Result<(), Skip> {
        let scope = SecretScope::new(store);
        self.bindings_for(tags)
            .into_iter()
            .try_for_each(|binding| scope.check(binding))
    }

    /// "Before" hook: inject every matching binding.
    ///
    /// # Errors
    ///
    /// Returns a [`Skip`] when a required secret is missing. Nothing is left
    /// written in that case: targets entered before the skip are removed
    /// again.
    pub fn before<'t, S: EnvStore + ?Sized>(
        &self,
        store: &S,
        tags: impl IntoIterator<Item = &'t str>,
    ) -> std::result::Result<ActiveScopes, Skip> {
        let bindings = self.bindings_for(tags);
        let scope = SecretScope::new(store);

        for binding in &bindings {
            scope.check(binding)?;
        }

        let mut active = ActiveScopes::default();
        for binding in bindings {
            match scope.enter(binding) {
                Ok(injection) => active.push(binding.target(), injection),
                Err(skip) => {
                    // Source vanished between check and enter
                    active.close(store);
                    return Err(skip);
                }
            }
        }

        tracing::debug!(
            entered = active.len(),
            injected = active.injected().count(),
            "Scenario secrets in scope"
        );
        Ok(active)
    }

    /// "After" hook: remove every matching target.
    ///
    /// Runs unconditionally, whether or not the target was injected and
    /// whatever the scenario outcome.
    pub fn after<'t, S: EnvStore + ?Sized>(
        &self,
        store: &S,
        tags: impl IntoIterator<Item = &'t str>,
    ) {
        let scope = SecretScope::new(store);
        for binding in self.bindings_for(tags) {
            scope.leave(binding.target());
        }
    }
}

/// Targets entered by [`TaggedHooks::before`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveScopes {
    entries: Vec<(String, Injection)>,
}

impl ActiveScopes {
    fn push(&mut self, target: &str, injection: Injection) {
        self.entries.push((target.to_string(), injection));
    }

    /// Number of targets entered
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no binding matched
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every target entered, injected or not
    pub fn targets(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(target, _)| target.as_str())
    }

    /// Targets whose secret was actually written
    pub fn injected(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, injection)| *injection == Injection::Injected)
            .map(|(target, _)| target.as_str())
    }

    /// Leave every entered target
    pub fn close<S: EnvStore + ?Sized>(self, store: &S) {
        let scope = SecretScope::new(store);
        for (target, _) in &self.entries {
            scope.leave(target);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use envscope_secrets::MemoryEnv;

    const SOURCE: &str = "K9S_CIRCLECI_CLI_TOKEN";
    const TARGET: &str = "CIRCLECI_CLI_TOKEN";

    fn k9s_hooks() -> TaggedHooks {
        let mut hooks = TaggedHooks::new();
        hooks
            .register("@k9s", SecretBinding::optional(SOURCE, TARGET).unwrap())
            .register(
                "k9s-required",
                SecretBinding::required(SOURCE, TARGET).unwrap(),
            );
        hooks
    }

    #[test]
    fn test_bindings_for_matches_tags() {
        let hooks = k9s_hooks();
        assert_eq!(hooks.len(), 2);
        assert_eq!(hooks.bindings_for(["k9s"]).len(), 1);
        assert_eq!(hooks.bindings_for(["@k9s", "smoke"]).len(), 1);
        assert_eq!(hooks.bindings_for(["k9s", "k9s-required"]).len(), 2);
        assert!(hooks.bindings_for(["smoke"]).is_empty());
        assert!(hooks.bindings_for(std::iter::empty::<&str>()).is_empty());
    }

    #[test]
    fn test_bindings_for_deduplicates() {
        let binding = SecretBinding::optional(SOURCE, TARGET).unwrap();
        let mut hooks = TaggedHooks::new();
        hooks.register("a", binding.clone()).register("b", binding);

        assert_eq!(hooks.bindings_for(["a", "b"]).len(), 1);
    }

    #[test]
    fn test_before_and_after_for_tagged_scenario() {
        let store = MemoryEnv::from_pairs([(SOURCE, "abc123")]);
        let hooks = k9s_hooks();

        let active = hooks.before(&store, ["k9s"]).unwrap();
        assert_eq!(active.injected().collect::<Vec<_>>(), vec![TARGET]);
        assert_eq!(store.get(TARGET), Some("abc123".to_string()));

        hooks.after(&store, ["k9s"]);
        assert!(!store.contains(TARGET));
        assert_eq!(store.get(SOURCE), Some("abc123".to_string()));
    }

    #[test]
    fn test_untagged_scenario_untouched() {
        let store = MemoryEnv::from_pairs([(SOURCE, "abc123"), (TARGET, "user-value")]);
        let hooks = k9s_hooks();

        let active = hooks.before(&store, ["smoke"]).unwrap();
        assert!(active.is_empty());
        hooks.after(&store, ["smoke"]);

        assert_eq!(store.get(TARGET), Some("user-value".to_string()));
    }

    #[test]
    fn test_optional_missing_runs_without_secret() {
        let store = MemoryEnv::new();
        let hooks = k9s_hooks();

        let active = hooks.before(&store, ["k9s"]).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active.injected().count(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_required_missing_skips() {
        let store = MemoryEnv::new();
        let hooks = k9s_hooks();

        let skip = hooks.before(&store, ["k9s-required"]).unwrap_err();
        assert!(skip.reason().contains("not set"));
        assert!(store.is_empty());
        assert_eq!(hooks.preflight(&store, ["k9s-required"]), Err(skip));
        assert_eq!(hooks.preflight(&store, ["k9s"]), Ok(()));
    }

    #[test]
    fn test_multi_binding_skip_leaves_store_unmodified() {
        let store = MemoryEnv::from_pairs([("GITHUB_SOURCE", "gh-token")]);
        let mut hooks = TaggedHooks::new();
        hooks
            .register(
                "ci",
                SecretBinding::required("GITHUB_SOURCE", "GITHUB_TOKEN").unwrap(),
            )
            .register("ci", SecretBinding::required(SOURCE, TARGET).unwrap());
        let before = store.snapshot();

        assert!(hooks.before(&store, ["ci"]).is_err());
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_after_removes_value_mutated_by_scenario() {
        let store = MemoryEnv::from_pairs([(SOURCE, "abc123")]);
        let hooks = k9s_hooks();

        let _active = hooks.before(&store, ["k9s"]).unwrap();
        store.set(TARGET, "changed-by-scenario");
        hooks.after(&store, ["k9s"]);

        assert!(!store.contains(TARGET));
    }

    #[test]
    fn test_active_scopes_close() {
        let store = MemoryEnv::from_pairs([(SOURCE, "abc123")]);
        let hooks = k9s_hooks();

        let active = hooks.before(&store, ["k9s"]).unwrap();
        assert_eq!(active.targets().collect::<Vec<_>>(), vec![TARGET]);
        active.close(&store);

        assert!(!store.contains(TARGET));
    }

    #[test]
    fn test_from_config() {
        let config = HooksConfig::from_toml_str(
            "[[hook]]\ntag = \"k9s\"\nsource = \"K9S_CIRCLECI_CLI_TOKEN\"\ntarget = \"CIRCLECI_CLI_TOKEN\"\n",
        )
        .unwrap();
        let hooks = TaggedHooks::from_config(config).unwrap();
        assert_eq!(hooks.bindings_for(["k9s"]).len(), 1);
    }
}
