// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::str::FromStr;

use rstest::rstest;
use strum::IntoEnumIterator;

use super::{FieldKind, Section, field_kind};

#[rstest]
#[case("requirements", "run", Some(FieldKind::List))]
#[case("package", "version", Some(FieldKind::String))]
#[case("build", "noarch_python", Some(FieldKind::Bool))]
#[case("package", "name", None)]
#[case("build", "number", None)]
fn test_field_kind(#[case] section: &str, #[case] key: &str, #[case] expected: Option<FieldKind>) {
    assert_eq!(field_kind(section, key), expected);
}

#[rstest]
fn test_typed_fields_are_allowed_keys() {
    // every typed field must also be a known key of its section
    for section in Section::iter() {
        for key in ["patches", "version", "string", "skip", "run", "imports"] {
            if field_kind(section.as_ref(), key).is_some() {
                assert!(
                    section.allows_key(key),
                    "{section}/{key} is typed but not allowed"
                );
            }
        }
    }
}

#[rstest]
fn test_section_names() {
    assert_eq!(Section::from_str("requirements").unwrap(), Section::Requirements);
    assert_eq!(Section::About.to_string(), "about");
    assert!(Section::from_str("extra").is_err());
}
