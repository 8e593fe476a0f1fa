// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use rstest::rstest;
use serde::Deserialize;

use super::{Config, apply_env_overrides};
use crate::Error;

#[rstest]
fn test_config_defaults() {
    let config = Config::default();
    assert_eq!(config.resolve.max_passes, 16);
    assert_eq!(config.interpreters.python.as_deref(), Some("3.6"));
    assert_eq!(config.interpreters.numpy.as_deref(), Some("1.11"));
    assert!(config.platform.subdir.is_none());
}

#[rstest]
fn test_config_load_string() {
    let config = Config::load_string(
        r#"
[resolve]
max_passes = 4

[interpreters]
python = "27"

[platform]
subdir = "win-32"
"#,
    )
    .expect("valid config should load");
    assert_eq!(config.resolve.max_passes, 4);
    assert_eq!(config.interpreters.python.as_deref(), Some("27"));
    // unspecified values keep their defaults
    assert_eq!(config.interpreters.lua.as_deref(), Some("2.0"));
    assert_eq!(config.platform.subdir.as_deref(), Some("win-32"));
}

#[rstest]
#[case("KILN_RESOLVE_MAX_PASSES", "3", 3)]
#[case("KILN_LOG", "debug", 16)]
#[case("OTHER_RESOLVE_MAX_PASSES", "3", 16)]
fn test_config_env_overrides(#[case] var: &str, #[case] value: &str, #[case] expected: u32) {
    let builder = apply_env_overrides(
        config::Config::builder(),
        [(var.to_string(), value.to_string())],
    )
    .expect("overrides should apply");
    let config = Config::deserialize(builder.build().expect("config should build"))
        .expect("config should deserialize");
    assert_eq!(config.resolve.max_passes, expected);
}

#[rstest]
fn test_config_env_override_interpreter() {
    let builder = apply_env_overrides(
        config::Config::builder(),
        [("KILN_INTERPRETERS_NUMPY".to_string(), "1.15".to_string())],
    )
    .unwrap();
    let config = Config::deserialize(builder.build().unwrap()).unwrap();
    assert_eq!(config.interpreters.numpy.as_deref(), Some("1.15"));
}

#[rstest]
fn test_config_rejects_zero_passes() {
    let err = Config::load_string("[resolve]\nmax_passes = 0\n").unwrap_err();
    assert!(matches!(err, Error::InvalidMaxPasses(0)), "{err}");
}
