// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::str::FromStr;

use kiln_config::Config;
use kiln_schema_foundation::{Context, Interpreter, Platform};

use crate::Result;

#[cfg(test)]
#[path = "./config_test.rs"]
mod config_test;

/// Environment variables with this prefix enable or disable build features
const FEATURE_PREFIX: &str = "FEATURE_";

/// Build the resolution context described by the given config,
/// with the environment of the current process.
pub fn context_from_config(config: &Config) -> Result<Context> {
    context_from_config_and_environ(config, std::env::vars())
}

/// Build the resolution context described by the given config,
/// with the given environment variables.
///
/// Each `FEATURE_<NAME>` variable turns the lowercase feature `<name>`
/// on when it is set to `1`, and off otherwise.
pub fn context_from_config_and_environ<I, K, V>(config: &Config, environ: I) -> Result<Context>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let platform = match config.platform.subdir.as_deref() {
        Some(subdir) if !subdir.is_empty() => Platform::from_str(subdir)?,
        _ => Platform::host(),
    };

    let interpreters = &config.interpreters;
    let versions = [
        (Interpreter::Python, &interpreters.python),
        (Interpreter::Numpy, &interpreters.numpy),
        (Interpreter::Perl, &interpreters.perl),
        (Interpreter::Lua, &interpreters.lua),
        (Interpreter::R, &interpreters.r),
    ];
    let environ: Vec<(String, String)> = environ
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect();

    let mut context = Context::new(platform);
    for (interpreter, version) in versions {
        if let Some(version) = version.as_deref().filter(|v| !v.is_empty()) {
            context = context.with_interpreter(interpreter, version);
        }
    }
    for (name, value) in environ.iter() {
        if let Some(feature) = name.strip_prefix(FEATURE_PREFIX) {
            context = context.with_feature(feature.to_lowercase(), value == "1");
        }
    }
    Ok(context.with_environ(environ))
}
