// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

//! The recognized recipe sections, their keys and the
//! kind of value expected for typed fields.

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "./fields_test.rs"]
mod fields_test;

/// The free-form section, which is kept verbatim
pub const EXTRA: &str = "extra";

/// A recognized recipe section
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
    strum::AsRefStr,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Section {
    Package,
    Source,
    Build,
    Requirements,
    App,
    Test,
    About,
}

impl Section {
    /// The keys that may appear in this section
    pub fn allowed_keys(&self) -> &'static [&'static str] {
        match self {
            Self::Package => &["name", "version"],
            Self::Source => &[
                "fn",
                "url",
                "md5",
                "sha1",
                "sha256",
                "path",
                "git_url",
                "git_tag",
                "git_branch",
                "git_rev",
                "git_depth",
                "hg_url",
                "hg_tag",
                "svn_url",
                "svn_rev",
                "svn_ignore_externals",
                "patches",
            ],
            Self::Build => &[
                "number",
                "string",
                "entry_points",
                "osx_is_app",
                "features",
                "track_features",
                "preserve_egg_dir",
                "no_link",
                "binary_relocation",
                "script",
                "noarch_python",
                "has_prefix_files",
                "binary_has_prefix_files",
                "ignore_prefix_files",
                "detect_binary_files_with_prefix",
                "rpaths",
                "script_env",
                "always_include_files",
                "skip",
                "msvc_compiler",
                // still experimental
                "pin_depends",
                "include_recipe",
            ],
            Self::Requirements => &["build", "run", "conflicts"],
            Self::App => &[
                "entry",
                "icon",
                "summary",
                "type",
                "cli_opts",
                "own_environment",
            ],
            Self::Test => &["requires", "commands", "files", "imports"],
            Self::About => &[
                // urls
                "home",
                "dev_url",
                "doc_url",
                "license_url",
                // text
                "license",
                "summary",
                "description",
                "license_family",
                // paths in the source tree
                "license_file",
                "readme",
            ],
        }
    }

    pub fn allows_key(&self, key: &str) -> bool {
        self.allowed_keys().contains(&key)
    }
}

/// The kind of value expected for a typed field
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum FieldKind {
    Bool,
    String,
    List,
}

/// The expected kind of value for `section/key`, if the field is typed.
///
/// Fields without an entry are coerced based on the value found.
pub fn field_kind(section: &str, key: &str) -> Option<FieldKind> {
    let kind = match (section, key) {
        ("source", "patches")
        | ("build", "entry_points")
        | ("build", "script_env")
        | ("build", "features")
        | ("build", "track_features")
        | ("requirements", "build")
        | ("requirements", "run")
        | ("requirements", "conflicts")
        | ("test", "requires")
        | ("test", "files")
        | ("test", "commands")
        | ("test", "imports") => FieldKind::List,

        ("package", "version")
        | ("build", "string")
        | ("build", "pin_depends")
        | ("source", "svn_rev")
        | ("source", "git_tag")
        | ("source", "git_branch")
        | ("source", "md5")
        | ("source", "git_rev")
        | ("source", "path")
        | ("source", "git_url") => FieldKind::String,

        ("build", "osx_is_app")
        | ("build", "preserve_egg_dir")
        | ("build", "binary_relocation")
        | ("build", "noarch_python")
        | ("build", "detect_binary_files_with_prefix")
        | ("build", "skip")
        | ("app", "own_environment") => FieldKind::Bool,

        _ => return None,
    };
    Some(kind)
}

/// Split a `section/key` field path into its parts
pub fn split_field(field: &str) -> Option<(&str, &str)> {
    field.split_once('/')
}
