//! Glue for the `cucumber` crate's `before`, `after` and `filter_run` hooks

use crate::TaggedHooks;
use crate::config::normalize_tag;
use cucumber::gherkin::{Feature, Rule, Scenario};
use envscope_secrets::{EnvStore, Skip};

/// Effective tags of a scenario: its own plus those inherited from the
/// enclosing rule and feature, without `@` and without duplicates.
#[must_use]
pub fn scenario_tags(feature: &Feature, rule: Option<&Rule>, scenario: &Scenario) -> Vec<String> {
    let inherited = rule.map(|r| r.tags.as_slice()).unwrap_or_default();
    let mut tags: Vec<String> = Vec::new();
    for tag in feature.tags.iter().chain(inherited).chain(&scenario.tags) {
        let tag = normalize_tag(tag);
        if !tag.is_empty() && !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}

impl TaggedHooks {
    /// Decide whether a scenario should run, for use in `filter_run`.
    ///
    /// # Errors
    ///
    /// Returns the [`Skip`] of a required secret missing from `store`; the
    /// reason is also logged since the framework drops filtered scenarios
    /// silently.
    pub fn filter_scenario<S: EnvStore + ?Sized>(
        &self,
        store: &S,
        feature: &Feature,
        rule: Option<&Rule>,
        scenario: &Scenario,
    ) -> Result<(), Skip> {
        let tags = scenario_tags(feature, rule, scenario);
        self.preflight(store, tags.iter().map(String::as_str))
            .inspect_err(|skip| {
                tracing::warn!(scenario = %scenario.name, reason = %skip, "Skipping scenario");
            })
    }
}
