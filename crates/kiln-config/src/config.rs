// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::sync::{Arc, RwLock};

use config::builder::DefaultState;
use config::{ConfigBuilder, File, FileFormat};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::Result;

#[cfg(test)]
#[path = "./config_test.rs"]
mod config_test;

static CONFIG: OnceCell<RwLock<Arc<Config>>> = OnceCell::new();

/// The prefix for environment variables that override config values
pub const ENV_PREFIX: &str = "KILN_";

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Resolve {
    /// The maximum number of permissive rendering passes
    ///
    /// Recipes whose set of undefined template variables does not
    /// settle within this many passes fail to resolve. The final,
    /// post-convergence pass is not counted.
    pub max_passes: u32,
}

impl Default for Resolve {
    fn default() -> Self {
        Self { max_passes: 16 }
    }
}

/// The interpreter versions that recipes are resolved against.
///
/// Versions may be given with or without a decimal point,
/// eg: `3.6` and `36` are equivalent for python. An empty
/// value leaves the interpreter unconfigured.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Interpreters {
    pub python: Option<String>,
    pub numpy: Option<String>,
    pub perl: Option<String>,
    pub lua: Option<String>,
    pub r: Option<String>,
}

impl Default for Interpreters {
    fn default() -> Self {
        Self {
            python: Some("3.6".into()),
            numpy: Some("1.11".into()),
            perl: Some("5.20.3".into()),
            lua: Some("2.0".into()),
            r: Some("3.3.1".into()),
        }
    }
}

#[derive(Clone, Default, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Platform {
    /// Resolve recipes for this platform instead of the host one (eg: `linux-64`)
    pub subdir: Option<String>,
}

/// Configuration values for kiln.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    // These sub-types should aim to only have one level of
    // values within them, otherwise they become impossible to address
    // with environment variables.
    pub resolve: Resolve,
    pub interpreters: Interpreters,
    pub platform: Platform,
}

impl Config {
    /// Get the current loaded config, loading it if needed
    pub fn current() -> Result<Arc<Self>> {
        get_config()
    }

    /// Load the config from disk, even if it's already been loaded before
    pub fn load() -> Result<Self> {
        load_config()
    }

    /// Load a config from a toml string, with no other sources applied
    pub fn load_string<S: AsRef<str>>(conf: S) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(File::from_str(conf.as_ref(), FileFormat::Toml))
            .build()?;
        Config::deserialize(config)?.validated()
    }

    fn validated(self) -> Result<Self> {
        if self.resolve.max_passes == 0 {
            return Err(crate::Error::InvalidMaxPasses(self.resolve.max_passes));
        }
        Ok(self)
    }

    /// Make this config the current global one
    pub fn make_current(self) -> Result<Arc<Self>> {
        // Note we don't know if we won the race to set the value here,
        // so we still need to try to update it.
        let config = CONFIG.get_or_try_init(|| -> Result<RwLock<Arc<Config>>> {
            Ok(RwLock::new(Arc::new(self.clone())))
        })?;

        let mut lock = config
            .write()
            .map_err(|err| crate::Error::LockPoisonedWrite(err.to_string()))?;
        *Arc::make_mut(&mut lock) = self;
        Ok(Arc::clone(&lock))
    }
}

/// Get the current kiln config, fetching it from disk if needed.
pub fn get_config() -> Result<Arc<Config>> {
    let config = CONFIG.get_or_try_init(|| -> Result<RwLock<Arc<Config>>> {
        Ok(RwLock::new(Arc::new(load_config()?)))
    })?;
    let lock = config
        .read()
        .map_err(|err| crate::Error::LockPoisonedRead(err.to_string()))?;
    Ok(Arc::clone(&*lock))
}

/// Load the kiln configuration from disk, even if it has already been loaded.
///
/// This includes the default, user, and system configurations (if they exist),
/// with any `KILN_<SECTION>_<NAME>` environment variables applied on top.
pub fn load_config() -> Result<Config> {
    let mut config_builder = config::Config::builder()
        // the system config can also be in any support format: toml, yaml, json, ini, etc
        .add_source(File::with_name("/etc/kiln").required(false));

    if let Some(user_config) = dirs::config_dir().map(|dir| dir.join("kiln").join("kiln")) {
        // the user config can also be in any support format: toml, yaml, json, ini, etc
        config_builder = config_builder
            .add_source(File::with_name(&format!("{}", user_config.display())).required(false));
    }

    let config_builder = apply_env_overrides(config_builder, std::env::vars())?;
    let config = config_builder.build()?;
    Config::deserialize(config)?.validated()
}

/// Apply `KILN_<SECTION>_<NAME>` variables as overrides to the given builder.
pub(crate) fn apply_env_overrides<I>(
    mut config_builder: ConfigBuilder<DefaultState>,
    vars: I,
) -> Result<ConfigBuilder<DefaultState>>
where
    I: IntoIterator<Item = (String, String)>,
{
    for (var, value) in vars {
        let Some(tail) = var.strip_prefix(ENV_PREFIX) else {
            continue;
        };
        let Some((section, name)) = tail.split_once('_') else {
            // typically, a value with no section is not a configuration
            // value, and can be skipped (eg: KILN_LOG)
            continue;
        };

        let key = format!("{}.{}", section.to_lowercase(), name.to_lowercase());
        config_builder = config_builder.set_override(key, value)?;
    }
    Ok(config_builder)
}
