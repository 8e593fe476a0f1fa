// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::collections::BTreeMap;

use kiln_schema_foundation::{Context, Fact};

use crate::Value;

/// The names visible to a selector expression.
///
/// A namespace holds only values derived from a [`Context`],
/// which bounds what any recipe selector is able to observe.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Namespace {
    names: BTreeMap<String, Value>,
}

impl Namespace {
    pub fn from_context(context: &Context) -> Self {
        let names = context
            .facts()
            .into_iter()
            .map(|(name, fact)| (name, Value::from(fact)))
            .collect();
        Self { names }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.names.get(name)
    }

    pub fn insert<S: Into<String>>(&mut self, name: S, value: Value) -> Option<Value> {
        self.names.insert(name.into(), value)
    }
}

impl From<Fact> for Value {
    fn from(fact: Fact) -> Self {
        match fact {
            Fact::Bool(b) => Value::Bool(b),
            Fact::Int(i) => Value::Int(i),
            Fact::Str(s) => Value::Str(s),
            Fact::Mapping(m) => Value::Map(m),
        }
    }
}

impl<S: Into<String>> FromIterator<(S, Value)> for Namespace {
    fn from_iter<T: IntoIterator<Item = (S, Value)>>(iter: T) -> Self {
        Self {
            names: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
