// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::{HashAlgorithm, file_digest};

#[cfg(test)]
#[path = "./function_file_hash_test.rs"]
mod function_file_hash_test;

/// Computes the digest of a file next to the recipe,
/// eg `{{ file_hash(path="src.tar.gz", algorithm="md5") }}`
pub struct FileHash {
    root: Option<PathBuf>,
}

impl FileHash {
    pub const FUNCTION_NAME: &'static str = "file_hash";

    /// The file to hash, relative to the recipe directory
    pub const ARG_PATH: &'static str = "path";
    /// One of the supported [`HashAlgorithm`]s
    pub const ARG_ALGORITHM: &'static str = "algorithm";
    pub const ARGS: &'static [&'static str] = &[Self::ARG_PATH, Self::ARG_ALGORITHM];

    pub fn new(root: Option<&Path>) -> Self {
        Self {
            root: root.map(ToOwned::to_owned),
        }
    }
}

impl tera::Function for FileHash {
    fn call(&self, args: &HashMap<String, Value>) -> tera::Result<Value> {
        let Some(path) = args.get(Self::ARG_PATH) else {
            return Err(tera::Error::msg(format!(
                "{}: missing required argument {:?}",
                Self::FUNCTION_NAME,
                Self::ARG_PATH,
            )));
        };
        let Value::String(path) = path else {
            return Err(tera::Error::msg(format!(
                "{}: {} argument expected a string value, got {path:?}",
                Self::FUNCTION_NAME,
                Self::ARG_PATH,
            )));
        };

        let algorithm = match args.get(Self::ARG_ALGORITHM) {
            None => HashAlgorithm::default(),
            Some(Value::String(name)) => name.parse().map_err(|_| {
                tera::Error::msg(format!(
                    "{}: unsupported algorithm {name:?}, expected one of {:?}",
                    Self::FUNCTION_NAME,
                    <HashAlgorithm as strum::VariantNames>::VARIANTS,
                ))
            })?,
            Some(other) => {
                return Err(tera::Error::msg(format!(
                    "{}: {} argument expected a string value, got {other:?}",
                    Self::FUNCTION_NAME,
                    Self::ARG_ALGORITHM,
                )));
            }
        };

        if args.len() > Self::ARGS.len() {
            return Err(tera::Error::msg(format!(
                "{}: one or more unsupported arguments provided, supported args: {:?}",
                Self::FUNCTION_NAME,
                Self::ARGS
            )));
        }

        let path = match &self.root {
            Some(root) => root.join(path),
            None => PathBuf::from(path),
        };
        let digest = file_digest(&path, algorithm).map_err(|err| {
            tera::Error::chain(
                format!("{}: failed to read {}", Self::FUNCTION_NAME, path.display()),
                err,
            )
        })?;
        Ok(Value::String(digest))
    }

    fn is_safe(&self) -> bool {
        true
    }
}
