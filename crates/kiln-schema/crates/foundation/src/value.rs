// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use serde::{Deserialize, Serialize};

use crate::FieldKind;

#[cfg(test)]
#[path = "./value_test.rs"]
mod value_test;

/// Strings that yaml 1.1 treats as true, compared case-insensitively
pub const TRUES: &[&str] = &["y", "on", "true", "yes"];
/// Strings that yaml 1.1 treats as false, compared case-insensitively
pub const FALSES: &[&str] = &["n", "no", "false", "off"];

/// Interpret a string as a yaml 1.1 boolean, if it is one
pub fn yaml11_bool(value: &str) -> Option<bool> {
    let lower = value.to_lowercase();
    if TRUES.contains(&lower.as_str()) {
        Some(true)
    } else if FALSES.contains(&lower.as_str()) {
        Some(false)
    } else {
        None
    }
}

/// A single value in a recipe section.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    String(String),
    List(Vec<String>),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Bool(_) => FieldKind::Bool,
            Self::String(_) => FieldKind::String,
            Self::List(_) => FieldKind::List,
        }
    }

    /// Truthiness in the same sense as the recipe format: empty
    /// strings and lists, and `false`, are not set
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::String(s) => !s.is_empty(),
            Self::List(l) => !l.is_empty(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(l) => Some(l),
            _ => None,
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(b) => b.fmt(f),
            Self::String(s) => f.write_str(s),
            Self::List(l) => write!(f, "[{}]", l.join(", ")),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(value: Vec<&str>) -> Self {
        Self::List(value.into_iter().map(String::from).collect())
    }
}
