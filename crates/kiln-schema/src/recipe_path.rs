// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::path::{Path, PathBuf};

use crate::{Error, Result};

#[cfg(test)]
#[path = "./recipe_path_test.rs"]
mod recipe_path_test;

/// The file names that are recognized as recipes
pub const RECIPE_FILE_NAMES: &[&str] = &["meta.yaml", "conda.yaml"];

/// Locate the recipe file within a directory tree.
///
/// When more than one recipe is found, a `meta.yaml` at the top
/// of the directory is preferred over the others.
pub fn find_recipe<P: AsRef<Path>>(dir: P) -> Result<PathBuf> {
    let dir = dir.as_ref();
    let root = glob::Pattern::escape(&dir.to_string_lossy());

    let mut found = Vec::new();
    for name in RECIPE_FILE_NAMES {
        let mut glob_results = glob::glob(&format!("{root}/**/{name}"))?;
        while let Some(path) = glob_results.next().transpose()? {
            if path.is_file() {
                found.push(path);
            }
        }
    }
    found.sort();
    found.dedup();

    match found.len() {
        0 => Err(Error::RecipeNotFound(dir.to_path_buf())),
        1 => Ok(found.remove(0)),
        _ => {
            let base_recipe = dir.join(RECIPE_FILE_NAMES[0]);
            if found.contains(&base_recipe) {
                tracing::debug!(?found, "using the top level recipe of several");
                return Ok(base_recipe);
            }
            Err(Error::MultipleRecipes {
                dir: dir.to_path_buf(),
                found,
            })
        }
    }
}
