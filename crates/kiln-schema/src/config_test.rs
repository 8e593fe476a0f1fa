// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use kiln_config::Config;
use rstest::rstest;

use super::context_from_config_and_environ;
use crate::{Interpreter, Os};

#[rstest]
fn test_context_from_default_config() {
    let config = Config::default();
    let context = context_from_config_and_environ(&config, [("HOME", "/root")]).unwrap();
    assert_eq!(context.interpreter_version(Interpreter::Python), Some("3.6"));
    assert_eq!(context.interpreter_version(Interpreter::R), Some("3.3.1"));
    assert_eq!(context.environ().get("HOME").map(String::as_str), Some("/root"));
}

#[rstest]
fn test_context_from_loaded_config() {
    let config = Config::load_string(
        r#"
[platform]
subdir = "win-32"

[interpreters]
python = "27"
numpy = ""
"#,
    )
    .unwrap();
    let context = context_from_config_and_environ(&config, Vec::<(String, String)>::new()).unwrap();
    assert_eq!(context.platform().os(), Os::Win);
    assert_eq!(context.platform().bits(), 32);
    assert_eq!(context.interpreter_version(Interpreter::Python), Some("27"));
    assert_eq!(context.interpreter_version(Interpreter::Numpy), None);
}

#[rstest]
fn test_invalid_platform_subdir() {
    let config = Config::load_string("[platform]\nsubdir = \"beos-16\"\n").unwrap();
    assert!(context_from_config_and_environ(&config, Vec::<(String, String)>::new()).is_err());
}

#[rstest]
fn test_feature_flags_from_environ() {
    let config = Config::default();
    let context = context_from_config_and_environ(
        &config,
        [("FEATURE_NOMKL", "1"), ("FEATURE_OPT", "0"), ("OTHER", "1")],
    )
    .unwrap();
    assert_eq!(context.features().get("nomkl"), Some(&true));
    assert_eq!(context.features().get("opt"), Some(&false));
    assert_eq!(context.features().len(), 2);
}
