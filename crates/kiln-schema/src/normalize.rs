// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::str::FromStr;

use indexmap::IndexMap;
use kiln_schema_foundation::fields::{EXTRA, field_kind};
use kiln_schema_foundation::value::yaml11_bool;
use kiln_schema_foundation::{FieldKind, FieldValue, Section};
use serde_yaml::{Mapping, Value};

use crate::{Error, Result, SectionMap};

#[cfg(test)]
#[path = "./normalize_test.rs"]
mod normalize_test;

/// The canonical key for a source revision
const GIT_REV: &str = "git_rev";
/// Deprecated aliases of [`GIT_REV`], in the order that they are checked
const GIT_REV_ALIASES: [&str; 2] = ["git_branch", "git_tag"];

/// A recipe document after structural checks and value coercion
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Normalized {
    /// Every section that holds a mapping, recognized or not,
    /// in the order that they appear in the recipe
    pub sections: IndexMap<String, SectionMap>,
    /// The free-form `extra` section, kept as written
    pub extra: Option<Mapping>,
    /// Top-level entries that are not sections at all
    pub other: Vec<String>,
}

/// Check the structure of a parsed recipe and coerce its values.
///
/// `path` is only used to identify the recipe in error messages.
pub fn normalize(document: &Value, path: &str) -> Result<Normalized> {
    let mapping = match document {
        Value::Null => return Ok(Normalized::default()),
        Value::Mapping(mapping) => mapping,
        other => {
            return Err(Error::StructuralType {
                section: "recipe".into(),
                found: type_name(other),
                path: path.into(),
            });
        }
    };

    let mut normalized = Normalized::default();
    for (name, value) in mapping.iter() {
        let name = scalar_text(name).ok_or_else(|| {
            Error::invalid_field(format!("section names must be strings, found a {}", type_name(name)))
        })?;

        if name == EXTRA {
            normalized.extra = match value {
                Value::Mapping(extra) => Some(extra.clone()),
                empty if is_empty(empty) => Some(Mapping::new()),
                other => {
                    return Err(Error::StructuralType {
                        section: name,
                        found: type_name(other),
                        path: path.into(),
                    });
                }
            };
            continue;
        }

        let recognized = Section::from_str(&name).is_ok();
        let section = match value {
            Value::Mapping(fields) => normalize_section(&name, fields)?,
            empty if recognized && is_empty(empty) => SectionMap::new(),
            other if recognized => {
                return Err(Error::StructuralType {
                    section: name,
                    found: type_name(other),
                    path: path.into(),
                });
            }
            _ => {
                normalized.other.push(name);
                continue;
            }
        };
        normalized.sections.insert(name, section);
    }

    if let Some(source) = normalized.sections.get_mut(Section::Source.as_ref()) {
        *source = git_clean(source)?;
    }
    Ok(normalized)
}

/// Reduce the git revision fields of a source section to `git_rev`.
///
/// At most one of `git_rev`, `git_branch` and `git_tag` may be set.
/// The value of whichever is set is stored as `git_rev`, and the
/// other two keys are removed. The given section is not modified.
pub fn git_clean(source: &SectionMap) -> Result<SectionMap> {
    let is_set = |key: &str| source.get(key).map(FieldValue::is_truthy).unwrap_or(false);
    let set: Vec<_> = std::iter::once(GIT_REV)
        .chain(GIT_REV_ALIASES)
        .filter(|key| is_set(key))
        .collect();
    if set.len() > 1 {
        return Err(Error::invalid_field(format!(
            "multiple git_revs: {}",
            set.join(", ")
        )));
    }

    let mut cleaned = source.clone();
    for alias in GIT_REV_ALIASES {
        let Some(value) = cleaned.shift_remove(alias) else {
            continue;
        };
        if value.is_truthy() {
            cleaned.insert(GIT_REV.to_string(), value);
        }
    }
    Ok(cleaned)
}

fn normalize_section(section: &str, fields: &Mapping) -> Result<SectionMap> {
    let mut normalized = SectionMap::with_capacity(fields.len());
    for (key, value) in fields.iter() {
        let key = scalar_text(key).ok_or_else(|| {
            Error::invalid_field(format!(
                "in section \"{section}\": keys must be strings, found a {}",
                type_name(key)
            ))
        })?;
        let value = coerce(section, &key, value)?;
        let value = apply_kind(section, &key, value)?;
        normalized.insert(key, value);
    }
    Ok(normalized)
}

/// Turn a yaml value into text or a list of text
fn coerce(section: &str, key: &str, value: &Value) -> Result<FieldValue> {
    if let Some(text) = scalar_text(value) {
        return Ok(FieldValue::String(text));
    }
    match value {
        Value::Sequence(items) => items
            .iter()
            .map(|item| {
                scalar_text(item).ok_or_else(|| {
                    Error::invalid_field(format!(
                        "{section}/{key} should be a list of plain values, found a {} inside of it",
                        type_name(item)
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()
            .map(FieldValue::List),
        other => Err(Error::invalid_field(format!(
            "{section}/{key} should be a string, boolean or list, not a {}",
            type_name(other)
        ))),
    }
}

fn apply_kind(section: &str, key: &str, value: FieldValue) -> Result<FieldValue> {
    let field = format!("{section}/{key}");
    let coerced = match (field_kind(section, key), value) {
        (Some(FieldKind::Bool), value) if !value.is_truthy() => FieldValue::Bool(false),
        (Some(FieldKind::Bool), FieldValue::String(text)) => match yaml11_bool(&text) {
            Some(b) => FieldValue::Bool(b),
            None => {
                return Err(Error::invalid_field(format!(
                    "{field} should be a boolean, got '{text}'"
                )));
            }
        },
        (Some(FieldKind::Bool), other) => {
            return Err(Error::invalid_field(format!(
                "{field} should be a boolean, not a {}",
                other.kind()
            )));
        }
        (Some(FieldKind::List), FieldValue::String(text)) if text.is_empty() => {
            FieldValue::List(Vec::new())
        }
        (Some(FieldKind::List), FieldValue::String(text)) => FieldValue::List(vec![text]),
        (Some(FieldKind::String), FieldValue::List(_)) => {
            return Err(Error::invalid_field(format!(
                "{field} should be a string, not a list"
            )));
        }
        (None, FieldValue::String(text)) => match yaml11_bool(&text) {
            Some(b) => FieldValue::Bool(b),
            None => FieldValue::String(text),
        },
        (_, value) => value,
    };
    Ok(coerced)
}

/// The text of a scalar value, or None for mappings and sequences
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

/// Whether a value is empty in the sense of a falsy section
fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Sequence(s) => s.is_empty(),
        Value::Mapping(m) => m.is_empty(),
        Value::Tagged(_) => false,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "list",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}
