// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::collections::HashMap;

use format_serde_error::{ErrorTypes, SerdeError};
use serde_yaml::{Mapping, Value};
use yaml_rust2::parser::{EventReceiver, Parser};
use yaml_rust2::scanner::TScalarStyle;
use yaml_rust2::{Event, ScanError};

#[cfg(test)]
#[path = "./yaml_test.rs"]
mod yaml_test;

/// Plain scalars that are read as null rather than as text
const NULLS: &[&str] = &["", "~", "null", "Null", "NULL"];

/// Carries the position of a yaml scan error into a SerdeError.
pub struct YamlScanError(pub ScanError);

impl From<YamlScanError> for ErrorTypes {
    fn from(err: YamlScanError) -> Self {
        let mark = *err.0.marker();
        Self::Custom {
            error: Box::new(err.0),
            line: Some(mark.line()),
            column: Some(mark.col()),
        }
    }
}

/// Parse resolved recipe text into a generic yaml value.
///
/// Every scalar is kept as the text that it was written as, so
/// `1.10` stays `"1.10"` and `yes` stays `"yes"`. Interpreting
/// values is left to the field table. Only empty and explicitly
/// null plain scalars become [`Value::Null`].
///
/// Text with no content at all (eg: every line was removed by
/// a selector) is a null document rather than an error.
pub fn parse_yaml_value<S: Into<String>>(yaml: S) -> Result<Value, SerdeError> {
    let yaml = yaml.into();
    let mut loader = TextLoader::default();
    let loaded = Parser::new_from_str(&yaml).load(&mut loader, false);
    match loaded {
        Ok(()) => Ok(loader.root.unwrap_or(Value::Null)),
        Err(err) => Err(SerdeError::new(yaml, YamlScanError(err))),
    }
}

/// Builds a yaml value from parser events, keeping scalars as text
#[derive(Default)]
struct TextLoader {
    stack: Vec<Collection>,
    anchors: HashMap<usize, Value>,
    root: Option<Value>,
}

enum Collection {
    Sequence {
        items: Vec<Value>,
        anchor: usize,
    },
    Mapping {
        entries: Mapping,
        key: Option<Value>,
        anchor: usize,
    },
}

impl EventReceiver for TextLoader {
    fn on_event(&mut self, event: Event) {
        match event {
            Event::Scalar(text, style, anchor, _) => {
                let value = match style {
                    TScalarStyle::Plain if NULLS.contains(&text.as_str()) => Value::Null,
                    _ => Value::String(text),
                };
                self.complete(value, anchor);
            }
            Event::Alias(anchor) => {
                let value = self.anchors.get(&anchor).cloned().unwrap_or(Value::Null);
                self.complete(value, 0);
            }
            Event::SequenceStart(anchor, _) => self.stack.push(Collection::Sequence {
                items: Vec::new(),
                anchor,
            }),
            Event::MappingStart(anchor, _) => self.stack.push(Collection::Mapping {
                entries: Mapping::new(),
                key: None,
                anchor,
            }),
            Event::SequenceEnd | Event::MappingEnd => {
                let (value, anchor) = match self.stack.pop() {
                    Some(Collection::Sequence { items, anchor }) => (Value::Sequence(items), anchor),
                    Some(Collection::Mapping {
                        entries, anchor, ..
                    }) => (Value::Mapping(entries), anchor),
                    None => return,
                };
                self.complete(value, anchor);
            }
            _ => {}
        }
    }
}

impl TextLoader {
    /// Place a finished value into the collection being built
    fn complete(&mut self, value: Value, anchor: usize) {
        // anchor ids start at 1
        if anchor > 0 {
            self.anchors.insert(anchor, value.clone());
        }
        match self.stack.last_mut() {
            Some(Collection::Sequence { items, .. }) => items.push(value),
            Some(Collection::Mapping { entries, key, .. }) => match key.take() {
                Some(key) => {
                    entries.insert(key, value);
                }
                None => *key = Some(value),
            },
            None => {
                self.root.get_or_insert(value);
            }
        }
    }
}
