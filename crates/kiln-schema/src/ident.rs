// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use kiln_schema_foundation::Interpreter;
use once_cell::sync::Lazy;
use regex::Regex;
use strum::IntoEnumIterator;

use crate::DependencySpec;

#[cfg(test)]
#[path = "./ident_test.rs"]
mod ident_test;

/// The file extension of a built package
pub const PACKAGE_EXTENSION: &str = ".tar.bz2";

/// A `major.minor` version, possibly with a leading `==`
static TWO_PART_VERSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:==)?(\d+)\.(\d+)").expect("a valid regular expression")
});

/// Characters that make a version a range, which cannot
/// be represented in a build string
const RANGE_CHARACTERS: &[char] = &[',', '|', '>', '!', '<'];

/// Derive the build string of a package from its runtime dependencies.
///
/// Each interpreter that the package runs against adds a short tag,
/// eg `py36` or `np111`, followed by the build features and number,
/// eg `py36np111_vc9_0`.
pub fn build_string(
    run_depends: &[DependencySpec],
    features: &[String],
    build_number: Option<u64>,
) -> String {
    let mut build = String::new();
    let packages = Interpreter::iter().flat_map(|interpreter| {
        interpreter
            .package_names()
            .iter()
            .map(move |name| (interpreter, *name))
    });
    for (interpreter, name) in packages {
        let Some(dep) = run_depends.iter().find(|dep| dep.name == name) else {
            continue;
        };
        let tag = interpreter.build_tag();
        let Some(version) = &dep.version else {
            if interpreter != Interpreter::Numpy {
                build.push_str(tag);
            }
            continue;
        };
        if version.contains(RANGE_CHARACTERS) {
            continue;
        }
        match interpreter {
            Interpreter::Numpy | Interpreter::Python => {
                if let Some(captures) = TWO_PART_VERSION.captures(version) {
                    build.push_str(tag);
                    build.push_str(&captures[1]);
                    build.push_str(&captures[2]);
                }
            }
            Interpreter::Perl | Interpreter::Lua | Interpreter::R => {
                build.push_str(tag);
                build.push_str(version.trim_matches('*'));
            }
        }
    }

    if !build.is_empty() {
        build.push('_');
    }
    if !features.is_empty() {
        build.push_str(&features.join("_"));
        build.push('_');
    }
    build.push_str(&build_number.unwrap_or_default().to_string());
    build
}

/// The distribution string of a package, `{name}-{version}-{build}`
pub fn dist_string(name: &str, version: &str, build: &str) -> String {
    format!("{name}-{version}-{build}")
}
