//! End-to-end hook behaviour against the real process environment

#![allow(clippy::unwrap_used, clippy::expect_used)]

use envscope_hooks::{HooksConfig, TaggedHooks};
use envscope_secrets::{EnvStore, ProcessEnv};

// Distinct names so parallel tests in other binaries cannot collide
const SOURCE: &str = "ENVSCOPE_IT_K9S_CIRCLECI_CLI_TOKEN";
const TARGET: &str = "ENVSCOPE_IT_CIRCLECI_CLI_TOKEN";

fn hooks() -> TaggedHooks {
    let config = HooksConfig::from_toml_str(&format!(
        r#"
[[hook]]
tag = "k9s"
source = "{SOURCE}"
target = "{TARGET}"

[[hook]]
tag = "k9s-required"
source = "{SOURCE}"
target = "{TARGET}"
policy = "required"
"#
    ))
    .unwrap();
    TaggedHooks::from_config(config).unwrap()
}

#[test]
fn token_is_scoped_to_tagged_scenario() {
    temp_env::with_vars([(SOURCE, Some("abc123")), (TARGET, None)], || {
        let env = ProcessEnv::new();
        let hooks = hooks();

        let active = hooks.before(&env, ["@k9s"]).unwrap();
        assert_eq!(active.injected().count(), 1);
        assert_eq!(std::env::var(TARGET).unwrap(), "abc123");

        hooks.after(&env, ["@k9s"]);
        assert!(std::env::var(TARGET).is_err());
        assert_eq!(std::env::var(SOURCE).unwrap(), "abc123");
    });
}

#[test]
fn missing_required_token_skips_without_exposing_target() {
    temp_env::with_vars_unset([SOURCE, TARGET], || {
        let env = ProcessEnv::new();
        let hooks = hooks();

        let skip = hooks.before(&env, ["k9s-required"]).unwrap_err();
        assert!(skip.reason().contains("not set"));
        assert!(!env.contains(TARGET));

        hooks.after(&env, ["k9s-required"]);
        assert!(!env.contains(TARGET));
    });
}

#[test]
fn empty_optional_token_is_not_injected() {
    temp_env::with_vars([(SOURCE, Some("")), (TARGET, None)], || {
        let env = ProcessEnv::new();
        let hooks = hooks();

        let active = hooks.before(&env, ["k9s"]).unwrap();
        assert_eq!(active.injected().count(), 0);
        assert!(!env.contains(TARGET));
    });
}

#[test]
fn cleanup_runs_after_failing_scenario() {
    temp_env::with_vars([(SOURCE, Some("abc123")), (TARGET, None)], || {
        let env = ProcessEnv::new();
        let hooks = hooks();

        let _active = hooks.before(&env, ["k9s"]).unwrap();
        let scenario = std::panic::catch_unwind(|| {
            assert_eq!(std::env::var(TARGET).unwrap(), "abc123");
            panic!("scenario assertion failed");
        });
        hooks.after(&env, ["k9s"]);

        assert!(scenario.is_err());
        assert!(std::env::var(TARGET).is_err());
    });
}
