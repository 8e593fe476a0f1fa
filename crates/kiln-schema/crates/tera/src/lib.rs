// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

//! Defines the default configuration for rendering recipe templates in kiln

use std::path::Path;

mod conditions;
mod digest;
mod error;
mod filter_short_version;
mod function_file_hash;
mod render;

pub use digest::{HashAlgorithm, file_digest};
pub use error::Error;
pub use render::{Rendered, Template, render_template};

/// Build the default template renderer for kiln
///
/// This renderer has all configuration and extensions
/// needed for rendering recipe templates. Paths given to
/// template functions are relative to `recipe_dir`, when set.
pub fn default_renderer(recipe_dir: Option<&Path>) -> tera::Tera {
    let mut renderer = tera::Tera::default();
    renderer.register_filter(
        filter_short_version::ShortVersion::FILTER_NAME,
        filter_short_version::ShortVersion,
    );
    renderer.register_function(
        function_file_hash::FileHash::FUNCTION_NAME,
        function_file_hash::FileHash::new(recipe_dir),
    );
    renderer
}
