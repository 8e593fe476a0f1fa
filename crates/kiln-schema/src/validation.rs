// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

//! Value checks applied to normalized recipes and derived identifiers

use std::str::FromStr;

use itertools::Itertools;
use kiln_schema_foundation::fields::EXTRA;
use kiln_schema_foundation::Section;

use crate::{Error, Normalized, Result};

#[cfg(test)]
#[path = "./validation_test.rs"]
mod validation_test;

/// The allowed values of `about/license_family`
pub const LICENSE_FAMILIES: &[&str] = &[
    "AGPL",
    "Apache",
    "BSD",
    "GPL2",
    "GPL3",
    "LGPL",
    "MIT",
    "Other",
    "PSF",
    "Proprietary",
    "Public-Domain",
];

/// The allowed values of `build/pin_depends`
pub const PIN_DEPENDS: &[&str] = &["", "record", "strict"];

/// Characters that may never appear in a package identifier
pub const BAD_CHARACTERS: &str = "=!@#$%^&*:;\"'\\|<>?/ ";

/// Fields which also disallow a hyphen, since it
/// separates the parts of a distribution string
const HYPHENLESS_FIELDS: &[&str] = &["package/version", "build/string"];

/// Ensure that an identifier contains none of the disallowed characters.
///
/// `field` names the value being checked, eg `package/name`.
pub fn check_bad_chrs(s: &str, field: &str) -> Result<()> {
    let hyphen = HYPHENLESS_FIELDS.contains(&field).then_some('-');
    match BAD_CHARACTERS.chars().chain(hyphen).find(|c| s.contains(*c)) {
        Some(c) => Err(Error::invalid_field(format!(
            "bad character '{c}' in {field}: {s}"
        ))),
        None => Ok(()),
    }
}

/// Run the checks that every resolved recipe must pass
pub fn validate(recipe: &Normalized) -> Result<()> {
    ensure_valid_fields(recipe)?;
    ensure_valid_license_family(recipe)
}

/// `build/pin_depends` must be one of [`PIN_DEPENDS`]
pub fn ensure_valid_fields(recipe: &Normalized) -> Result<()> {
    let Some(pin_depends) = field(recipe, Section::Build, "pin_depends") else {
        return Ok(());
    };
    if pin_depends.as_str().is_some_and(|s| PIN_DEPENDS.contains(&s)) {
        return Ok(());
    }
    Err(Error::invalid_field(format!(
        "build/pin_depends cannot be '{pin_depends}'"
    )))
}

/// `about/license_family` must be one of [`LICENSE_FAMILIES`], exactly
pub fn ensure_valid_license_family(recipe: &Normalized) -> Result<()> {
    let Some(family) = field(recipe, Section::About, "license_family") else {
        return Ok(());
    };
    if family.as_str().is_some_and(|s| LICENSE_FAMILIES.contains(&s)) {
        return Ok(());
    }
    Err(Error::invalid_field(format!(
        "about/license_family '{family}' not allowed. Allowed families are {}.",
        LICENSE_FAMILIES.iter().sorted().join(", ")
    )))
}

/// Ensure that every section and key of the recipe is a known one.
///
/// Anything goes in the `extra` section.
pub fn check_fields(recipe: &Normalized) -> Result<()> {
    if let Some(name) = recipe.other.iter().find(|name| name.as_str() != EXTRA) {
        return Err(Error::invalid_field(format!("unknown section: {name}")));
    }
    for (name, fields) in recipe.sections.iter() {
        let section = Section::from_str(name)
            .map_err(|_| Error::invalid_field(format!("unknown section: {name}")))?;
        if let Some(key) = fields.keys().find(|key| !section.allows_key(key)) {
            return Err(Error::invalid_field(format!(
                "in section \"{name}\": unknown key \"{key}\""
            )));
        }
    }
    Ok(())
}

fn field<'a>(
    recipe: &'a Normalized,
    section: Section,
    key: &str,
) -> Option<&'a kiln_schema_foundation::FieldValue> {
    recipe.sections.get(section.as_ref())?.get(key)
}
