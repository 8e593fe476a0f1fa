// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::collections::HashMap;

use serde_json::Value;

#[cfg(test)]
#[path = "./filter_short_version_test.rs"]
mod filter_short_version_test;

/// Truncates a version to its first few dotted parts, eg `1.2.3` => `1.2`
pub struct ShortVersion;

impl ShortVersion {
    pub const FILTER_NAME: &'static str = "short_version";

    /// The number of parts to keep
    pub const ARG_PARTS: &'static str = "parts";
    pub const DEFAULT_PARTS: usize = 2;
}

impl tera::Filter for ShortVersion {
    fn filter(&self, value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
        let parts = match args.get(Self::ARG_PARTS) {
            None => Self::DEFAULT_PARTS,
            Some(Value::Number(n)) => n
                .as_u64()
                .and_then(|n| usize::try_from(n).ok())
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    tera::Error::msg(format!(
                        "{}: {} must be a positive integer, got {n}",
                        Self::FILTER_NAME,
                        Self::ARG_PARTS,
                    ))
                })?,
            Some(other) => {
                return Err(tera::Error::msg(format!(
                    "{}: {} argument expected a number, got {other:?}",
                    Self::FILTER_NAME,
                    Self::ARG_PARTS,
                )));
            }
        };

        let version = match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => {
                return Err(tera::Error::msg(format!(
                    "{}: expected a version string, got {value:?}",
                    Self::FILTER_NAME,
                )));
            }
        };

        let short = version.split('.').take(parts).collect::<Vec<_>>().join(".");
        Ok(Value::String(short))
    }
}
